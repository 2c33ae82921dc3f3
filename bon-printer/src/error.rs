//! Error types for the printer library

use shared::error::PrintErrorKind;
use shared::models::Vendor;
use thiserror::Error;

/// Encoder error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Vendor dialect not compiled into this build
    #[error("Encoder for {0} is not available in this build")]
    DriverLibraryMissing(Vendor),

    /// QR payload larger than one symbol holds
    #[error("QR data too long: {len} bytes (max {max})")]
    QrDataTooLong { len: usize, max: usize },
}

impl EncodeError {
    pub fn kind(&self) -> PrintErrorKind {
        match self {
            Self::DriverLibraryMissing(_) => PrintErrorKind::DriverLibraryMissing,
            Self::QrDataTooLong { .. } => PrintErrorKind::InvalidPayload,
        }
    }
}

/// Transport error types
///
/// Every variant carries the `host:port` it happened on.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No handshake within the connect budget
    #[error("Connection timeout after {timeout_ms}ms: {addr}")]
    ConnectTimeout { addr: String, timeout_ms: u64 },

    /// Peer refused (RST on SYN)
    #[error("Connection refused: {addr}")]
    ConnectRefused { addr: String },

    /// No route to host or network
    #[error("Host unreachable: {addr}: {source}")]
    HostUnreachable {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Any other connect failure (DNS, permissions, ...)
    #[error("Connection failed: {addr}: {source}")]
    ConnectFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Printer stopped draining the socket before the payload was written
    #[error("Printer timeout after {timeout_ms}ms: {addr}")]
    PrinterTimeout { addr: String, timeout_ms: u64 },

    /// Write aborted before the payload was written
    #[error("Write failed after {written} bytes: {addr}: {source}")]
    WriteFailed {
        addr: String,
        written: usize,
        #[source]
        source: std::io::Error,
    },

    /// Job cancelled by the caller
    #[error("Print cancelled: {addr}")]
    Cancelled { addr: String },
}

impl TransportError {
    /// Map to the print error taxonomy
    pub fn kind(&self) -> PrintErrorKind {
        match self {
            Self::ConnectTimeout { .. } => PrintErrorKind::ConnectTimeout,
            Self::ConnectRefused { .. } => PrintErrorKind::ConnectRefused,
            Self::HostUnreachable { .. } => PrintErrorKind::HostUnreachable,
            Self::ConnectFailed { .. } => PrintErrorKind::ConnectFailed,
            Self::PrinterTimeout { .. } => PrintErrorKind::PrinterTimeout,
            Self::WriteFailed { .. } => PrintErrorKind::WriteFailed,
            Self::Cancelled { .. } => PrintErrorKind::PrintCancelled,
        }
    }

    /// Printer address the error happened on
    pub fn addr(&self) -> &str {
        match self {
            Self::ConnectTimeout { addr, .. }
            | Self::ConnectRefused { addr }
            | Self::HostUnreachable { addr, .. }
            | Self::ConnectFailed { addr, .. }
            | Self::PrinterTimeout { addr, .. }
            | Self::WriteFailed { addr, .. }
            | Self::Cancelled { addr } => addr,
        }
    }
}

/// Result type for transport operations
pub type PrintResult<T> = Result<T, TransportError>;
