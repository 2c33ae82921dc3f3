//! Printing module
//!
//! - [`PrintRouter`] - print kind -> printer resolution
//! - [`ReceiptRenderer`] - receipt and test page layout
//! - [`PrintService`] - job orchestration
//! - [`PrinterLocks`] - one job at a time per printer

pub mod locks;
pub mod renderer;
pub mod router;
pub mod service;
pub mod types;

pub use locks::{PrinterGuard, PrinterLocks};
pub use renderer::ReceiptRenderer;
pub use router::{
    InMemoryDirectory, PrintRouter, PrinterDirectory, RouteError, RoutesFile, RoutesFileError,
    TenantRoutes,
};
pub use service::PrintService;
pub use types::{PrintJobError, PrintJobResult, PrintReport};
