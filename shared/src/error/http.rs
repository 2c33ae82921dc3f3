//! HTTP status code mapping for print error kinds

use super::codes::PrintErrorKind;
use http::StatusCode;

impl PrintErrorKind {
    /// Get the appropriate HTTP status code for this error kind
    pub fn http_status(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            Self::InvalidPayload
            | Self::MissingPrinterFields
            | Self::PortInvalid
            | Self::UnknownDriver
            | Self::DriverNotSupported => StatusCode::BAD_REQUEST,

            // 501 Not Implemented
            Self::DriverLibraryMissing => StatusCode::NOT_IMPLEMENTED,

            // 404 Not Found
            Self::NoPrinterConfigured => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::PrinterInactive => StatusCode::CONFLICT,

            // 504 Gateway Timeout
            Self::ConnectTimeout | Self::PrinterTimeout => StatusCode::GATEWAY_TIMEOUT,

            // 502 Bad Gateway
            Self::ConnectRefused
            | Self::HostUnreachable
            | Self::ConnectFailed
            | Self::WriteFailed => StatusCode::BAD_GATEWAY,

            // 503 Service Unavailable
            Self::PrintCancelled => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}
