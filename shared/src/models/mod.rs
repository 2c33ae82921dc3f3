//! Data models
//!
//! Shared between the print pipeline and its HTTP surface.
//! Wire names are camelCase; enums use SCREAMING_SNAKE_CASE.

pub mod print_route;
pub mod printer;
pub mod receipt;

// Re-exports
pub use print_route::*;
pub use printer::*;
pub use receipt::*;
