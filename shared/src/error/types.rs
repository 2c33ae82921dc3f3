//! Error types and API response structures

use super::codes::PrintErrorKind;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application error surfaced to API callers
///
/// - `kind`: taxonomy entry (drives HTTP status)
/// - `error`: wire code shown to the caller, usually `kind.code()`
/// - `message`: human-readable message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}: {message}")]
pub struct AppError {
    pub kind: PrintErrorKind,
    pub error: String,
    pub message: String,
}

impl AppError {
    /// Create a new error with the default message for the kind
    pub fn new(kind: PrintErrorKind) -> Self {
        Self {
            error: kind.code().to_string(),
            message: kind.message().to_string(),
            kind,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(kind: PrintErrorKind, message: impl Into<String>) -> Self {
        Self {
            error: kind.code().to_string(),
            message: message.into(),
            kind,
        }
    }

    /// Override the wire code while keeping the kind
    ///
    /// STARPRNT is reported as `STARPRNT_NOT_SUPPORTED_YET` but classified as
    /// `DRIVER_NOT_SUPPORTED`.
    pub fn with_wire_code(mut self, code: impl Into<String>) -> Self {
        self.error = code.into();
        self
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.kind.http_status()
    }

    // ==================== Convenience constructors ====================

    /// Malformed request body
    pub fn invalid_payload(msg: impl Into<String>) -> Self {
        Self::with_message(PrintErrorKind::InvalidPayload, msg)
    }

    /// Missing host/driver
    pub fn missing_printer_fields(msg: impl Into<String>) -> Self {
        Self::with_message(PrintErrorKind::MissingPrinterFields, msg)
    }

    /// Invalid port
    pub fn port_invalid(msg: impl Into<String>) -> Self {
        Self::with_message(PrintErrorKind::PortInvalid, msg)
    }

    /// Unknown driver
    pub fn unknown_driver(driver: impl Into<String>) -> Self {
        Self::with_message(
            PrintErrorKind::UnknownDriver,
            format!("Unknown driver: {}", driver.into()),
        )
    }
}

/// Error detail block of the envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: PrintErrorKind,
    pub message: String,
}

/// Unified API response envelope
///
/// ```json
/// { "ok": true, "data": { ... } }
/// { "ok": false, "error": "CONNECT_REFUSED", "details": { "code": "CONNECT_REFUSED", "message": "..." } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

impl<T> ApiResponse<T> {
    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
            details: None,
        }
    }
}

impl ApiResponse<()> {
    /// Create a success response without data
    pub fn ok() -> Self {
        Self {
            ok: true,
            data: None,
            error: None,
            details: None,
        }
    }

    /// Create an error response from an AppError
    pub fn error(err: &AppError) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(err.error.clone()),
            details: Some(ErrorDetails {
                code: err.kind,
                message: err.message.clone(),
            }),
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();
        let body = ApiResponse::<()>::error(&self);

        if self.kind.category().is_device_side() {
            tracing::warn!(code = %self.kind, message = %self.message, "Printer error");
        } else {
            tracing::debug!(code = %self.kind, message = %self.message, "Request rejected");
        }

        (status, Json(body)).into_response()
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = match &self.details {
            Some(details) if !self.ok => details.code.http_status(),
            _ => StatusCode::OK,
        };

        (status, Json(self)).into_response()
    }
}
