//! Error category classification

use super::codes::PrintErrorKind;
use serde::{Deserialize, Serialize};

/// Where in the pipeline a print error originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Caller input, rejected before connecting
    Input,
    /// Driver availability
    Driver,
    /// TCP connect/write
    Connection,
    /// Print kind -> printer resolution
    Routing,
}

impl ErrorCategory {
    /// Whether errors of this category come from the printer side
    ///
    /// These are logged at `warn` level; the rest are caller mistakes.
    pub fn is_device_side(&self) -> bool {
        matches!(self, Self::Connection)
    }
}

impl PrintErrorKind {
    /// Get the category of this error kind
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidPayload
            | Self::MissingPrinterFields
            | Self::PortInvalid
            | Self::UnknownDriver => ErrorCategory::Input,

            Self::DriverNotSupported | Self::DriverLibraryMissing => ErrorCategory::Driver,

            Self::ConnectTimeout
            | Self::ConnectRefused
            | Self::HostUnreachable
            | Self::ConnectFailed
            | Self::PrinterTimeout
            | Self::WriteFailed
            | Self::PrintCancelled => ErrorCategory::Connection,

            Self::NoPrinterConfigured | Self::PrinterInactive => ErrorCategory::Routing,
        }
    }
}
