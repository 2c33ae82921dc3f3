//! bon-server - receipt and kitchen printing service
//!
//! # Overview
//!
//! Accepts print jobs over HTTP, resolves the target printer per tenant and
//! print kind, and delivers ESC/POS over raw TCP through `bon-printer`.
//!
//! # Module layout
//!
//! ```text
//! bon-server/src/
//! ├── core/          # configuration, state
//! ├── printing/      # routing, rendering, job orchestration
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logging
//! ```

pub mod api;
pub mod core;
pub mod printing;
pub mod utils;

// Re-exports
pub use api::build_app;
pub use core::{Config, ServerState};
pub use printing::{PrintReport, PrintRouter, PrintService};

pub use utils::logger::init_logger_with_file;
