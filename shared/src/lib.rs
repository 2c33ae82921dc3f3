//! Shared types for the bon print stack
//!
//! Printer/receipt models, the print error taxonomy and the API response
//! envelope used by both the printer library and the server.

pub mod error;
pub mod models;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, PrintErrorKind};
