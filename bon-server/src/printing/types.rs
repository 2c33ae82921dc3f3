//! Print job types

use bon_printer::{EncodeError, SendReport, TransportError};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, PrintErrorKind};
use thiserror::Error;

use super::router::RouteError;

/// Successful job outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintReport {
    pub printer_id: String,
    pub bytes_sent: usize,
    /// Printer closed the connection itself after receiving the job
    pub peer_closed: bool,
    pub elapsed_ms: u64,
}

impl PrintReport {
    pub fn new(printer_id: impl Into<String>, report: SendReport) -> Self {
        Self {
            printer_id: printer_id.into(),
            bytes_sent: report.bytes_sent,
            peer_closed: report.peer_closed,
            elapsed_ms: report.elapsed.as_millis() as u64,
        }
    }
}

/// Failure of a single print job
#[derive(Debug, Error)]
pub enum PrintJobError {
    #[error("Invalid printer: {0}")]
    InvalidPrinter(AppError),

    #[error("Invalid job: {0}")]
    InvalidJob(AppError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type PrintJobResult<T> = Result<T, PrintJobError>;

impl PrintJobError {
    pub fn kind(&self) -> PrintErrorKind {
        match self {
            Self::InvalidPrinter(e) | Self::InvalidJob(e) => e.kind,
            Self::Route(e) => e.kind(),
            Self::Encode(e) => e.kind(),
            Self::Transport(e) => e.kind(),
        }
    }
}

impl From<PrintJobError> for AppError {
    fn from(err: PrintJobError) -> Self {
        match err {
            PrintJobError::InvalidPrinter(e) | PrintJobError::InvalidJob(e) => e,
            other => AppError::with_message(other.kind(), other.to_string()),
        }
    }
}
