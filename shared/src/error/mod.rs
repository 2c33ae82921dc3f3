//! Unified error system for the print pipeline
//!
//! - [`PrintErrorKind`]: the error taxonomy every job failure maps to
//! - [`ErrorCategory`]: which pipeline stage a kind belongs to
//! - [`AppError`]: kind + wire code + message, renders as the API envelope
//! - [`ApiResponse`]: `{ ok, data?, error?, details? }`
//!
//! # Example
//!
//! ```
//! use shared::error::{ApiResponse, AppError, PrintErrorKind};
//!
//! let err = AppError::with_message(PrintErrorKind::ConnectRefused, "192.168.2.13:9100");
//! let body = ApiResponse::<()>::error(&err);
//! assert!(!body.ok);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::PrintErrorKind;
pub use types::{ApiResponse, AppError, AppResult, ErrorDetails};
