//! Print error kinds
//!
//! Every failure a print job can surface maps to exactly one kind. Kinds are
//! serialized as SCREAMING_SNAKE_CASE strings so the frontend can switch on
//! them without parsing messages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Print job error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrintErrorKind {
    // ==================== Caller input ====================
    /// Request body could not be parsed
    InvalidPayload,
    /// Printer host or driver missing
    MissingPrinterFields,
    /// Port outside 1..=65535
    PortInvalid,
    /// Driver name not recognized
    UnknownDriver,

    // ==================== Driver ====================
    /// Recognized driver without an implementation (STARPRNT)
    DriverNotSupported,
    /// Vendor encoder not compiled into this build
    DriverLibraryMissing,

    // ==================== Connection ====================
    /// No TCP handshake within the connect budget
    ConnectTimeout,
    /// Peer actively refused the connection
    ConnectRefused,
    /// Network-layer unreachable
    HostUnreachable,
    /// Any other connect failure
    ConnectFailed,
    /// Printer stalled before the payload was written
    PrinterTimeout,
    /// Write aborted before the payload was written
    WriteFailed,
    /// Job cancelled by the caller while in flight
    PrintCancelled,

    // ==================== Routing ====================
    /// No route and no default route for the tenant
    NoPrinterConfigured,
    /// Routed printer is disabled
    PrinterInactive,
}

impl PrintErrorKind {
    /// Wire code, e.g. `CONNECT_TIMEOUT`
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPayload => "INVALID_PAYLOAD",
            Self::MissingPrinterFields => "MISSING_PRINTER_FIELDS",
            Self::PortInvalid => "PORT_INVALID",
            Self::UnknownDriver => "UNKNOWN_DRIVER",
            Self::DriverNotSupported => "DRIVER_NOT_SUPPORTED",
            Self::DriverLibraryMissing => "DRIVER_LIBRARY_MISSING",
            Self::ConnectTimeout => "CONNECT_TIMEOUT",
            Self::ConnectRefused => "CONNECT_REFUSED",
            Self::HostUnreachable => "HOST_UNREACHABLE",
            Self::ConnectFailed => "CONNECT_FAILED",
            Self::PrinterTimeout => "PRINTER_TIMEOUT",
            Self::WriteFailed => "WRITE_FAILED",
            Self::PrintCancelled => "PRINT_CANCELLED",
            Self::NoPrinterConfigured => "NO_PRINTER_CONFIGURED",
            Self::PrinterInactive => "PRINTER_INACTIVE",
        }
    }

    /// Default human-readable message
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidPayload => "Invalid request payload",
            Self::MissingPrinterFields => "Printer driver and host are required",
            Self::PortInvalid => "Printer port must be between 1 and 65535",
            Self::UnknownDriver => "Unknown printer driver",
            Self::DriverNotSupported => "Printer driver is not supported yet",
            Self::DriverLibraryMissing => "Printer driver library is not available in this build",
            Self::ConnectTimeout => "Timed out connecting to printer",
            Self::ConnectRefused => "Printer refused the connection",
            Self::HostUnreachable => "Printer host is unreachable",
            Self::ConnectFailed => "Could not connect to printer",
            Self::PrinterTimeout => "Printer did not accept data in time",
            Self::WriteFailed => "Sending data to printer failed",
            Self::PrintCancelled => "Print job was cancelled",
            Self::NoPrinterConfigured => "No printer configured for this print kind",
            Self::PrinterInactive => "Configured printer is inactive",
        }
    }

    /// Whether the failure happened before any connection attempt
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPayload
                | Self::MissingPrinterFields
                | Self::PortInvalid
                | Self::UnknownDriver
        )
    }
}

impl fmt::Display for PrintErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
