//! Server state

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::core::Config;
use crate::printing::{InMemoryDirectory, PrintService, PrinterDirectory, RoutesFileError};

/// State shared by all handlers
///
/// Cheap to clone; everything inside is reference counted.
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub print_service: PrintService,
    /// Cancelled on shutdown; aborts in-flight print jobs
    pub shutdown: CancellationToken,
}

impl ServerState {
    /// Build state with the env printer and the optional routes file
    pub fn new(config: Config) -> Result<Self, RoutesFileError> {
        let directory = InMemoryDirectory::from_config(&config)?;
        Ok(Self::with_directory(config, Arc::new(directory)))
    }

    /// Build state over an existing printer directory
    pub fn with_directory(config: Config, directory: Arc<dyn PrinterDirectory>) -> Self {
        let shutdown = CancellationToken::new();
        let print_service = PrintService::new(&config, directory, shutdown.clone());
        Self {
            config: Arc::new(config),
            print_service,
            shutdown,
        }
    }

    /// Tenant used when a request names none
    pub fn default_tenant(&self) -> &str {
        &self.config.default_tenant
    }
}
