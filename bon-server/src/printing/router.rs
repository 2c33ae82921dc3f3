//! Print routing
//!
//! Resolves a logical print kind for a tenant to one concrete printer:
//! explicit route for the kind, else the tenant's default route, else
//! `NO_PRINTER_CONFIGURED`. The resolved printer must be active.

use dashmap::DashMap;
use serde::Deserialize;
use shared::error::PrintErrorKind;
use shared::models::{PrintKind, PrintRoute, PrinterConfig};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::core::Config;
use crate::core::config::STAR_PRINTER_ID;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("No printer configured for {kind} (tenant {tenant})")]
    NoPrinterConfigured { tenant: String, kind: PrintKind },

    #[error("Route for {kind} points at unknown printer {printer_id} (tenant {tenant})")]
    UnknownPrinter {
        tenant: String,
        kind: PrintKind,
        printer_id: String,
    },

    #[error("Printer {printer_id} is inactive")]
    PrinterInactive { printer_id: String },
}

impl RouteError {
    pub fn kind(&self) -> PrintErrorKind {
        match self {
            Self::NoPrinterConfigured { .. } | Self::UnknownPrinter { .. } => {
                PrintErrorKind::NoPrinterConfigured
            }
            Self::PrinterInactive { .. } => PrintErrorKind::PrinterInactive,
        }
    }
}

#[derive(Debug, Error)]
pub enum RoutesFileError {
    #[error("Failed to read routes file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse routes file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid printer {printer_id} in routes file: {message}")]
    InvalidPrinter { printer_id: String, message: String },
}

/// Read-only view of printer records and routing tables
pub trait PrinterDirectory: Send + Sync {
    /// Routes of a tenant, in priority order
    fn routes(&self, tenant: &str) -> Vec<PrintRoute>;

    /// Printer record by id
    fn printer(&self, tenant: &str, printer_id: &str) -> Option<PrinterConfig>;
}

/// Routes file layout
///
/// ```json
/// {
///   "tenants": {
///     "default": {
///       "printers": [{ "id": "kitchen-1", "vendor": "EPSON", "host": "192.168.2.20" }],
///       "routes": [{ "kind": "KITCHEN", "printerId": "kitchen-1" }]
///     }
///   }
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct RoutesFile {
    #[serde(default)]
    pub tenants: HashMap<String, TenantRoutes>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct TenantRoutes {
    #[serde(default)]
    pub printers: Vec<PrinterConfig>,
    #[serde(default)]
    pub routes: Vec<PrintRoute>,
}

/// In-memory printer directory
///
/// Per-tenant tables in a [`DashMap`]; lookups clone the records they return.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    tenants: DashMap<String, TenantRoutes>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from configuration
    ///
    /// Loads the routes file (if any), then registers the env-configured Star
    /// printer for the default tenant. The Star printer becomes the default
    /// route unless the routes file already set one.
    pub fn from_config(config: &Config) -> Result<Self, RoutesFileError> {
        let directory = Self::new();

        if let Some(path) = &config.routes_file {
            let count = directory.load_file(path)?;
            info!(path = %path, routes = count, "Loaded print routes");
        }

        let tenant = &config.default_tenant;
        directory.upsert_printer(tenant, config.star_printer.clone());
        if !directory.has_default(tenant) {
            directory.add_route(
                tenant,
                PrintRoute::new(PrintKind::Receipt, STAR_PRINTER_ID, true),
            );
        }

        Ok(directory)
    }

    /// Merge a routes file; returns the number of routes added
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<usize, RoutesFileError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| RoutesFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: RoutesFile =
            serde_json::from_str(&content).map_err(|source| RoutesFileError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        self.load(file)
    }

    /// Merge parsed routes; returns the number of routes added
    pub fn load(&self, file: RoutesFile) -> Result<usize, RoutesFileError> {
        let mut count = 0;
        for (tenant, table) in file.tenants {
            for printer in table.printers {
                printer
                    .validate()
                    .map_err(|e| RoutesFileError::InvalidPrinter {
                        printer_id: printer.id.clone(),
                        message: e.message,
                    })?;
                self.upsert_printer(&tenant, printer);
            }
            for route in table.routes {
                self.add_route(&tenant, route);
                count += 1;
            }
        }
        Ok(count)
    }

    /// Insert or replace a printer record
    pub fn upsert_printer(&self, tenant: &str, printer: PrinterConfig) {
        let mut table = self.tenants.entry(tenant.to_string()).or_default();
        match table.printers.iter_mut().find(|p| p.id == printer.id) {
            Some(existing) => *existing = printer,
            None => table.printers.push(printer),
        }
    }

    /// Append a route (earlier routes take precedence)
    pub fn add_route(&self, tenant: &str, route: PrintRoute) {
        self.tenants
            .entry(tenant.to_string())
            .or_default()
            .routes
            .push(route);
    }

    /// Whether the tenant has a default route
    pub fn has_default(&self, tenant: &str) -> bool {
        self.tenants
            .get(tenant)
            .is_some_and(|t| t.routes.iter().any(|r| r.is_default))
    }
}

impl PrinterDirectory for InMemoryDirectory {
    fn routes(&self, tenant: &str) -> Vec<PrintRoute> {
        self.tenants
            .get(tenant)
            .map(|t| t.routes.clone())
            .unwrap_or_default()
    }

    fn printer(&self, tenant: &str, printer_id: &str) -> Option<PrinterConfig> {
        self.tenants
            .get(tenant)
            .and_then(|t| t.printers.iter().find(|p| p.id == printer_id).cloned())
    }
}

/// Print kind -> printer resolution
#[derive(Clone)]
pub struct PrintRouter {
    directory: Arc<dyn PrinterDirectory>,
}

impl PrintRouter {
    pub fn new(directory: Arc<dyn PrinterDirectory>) -> Self {
        Self { directory }
    }

    /// Resolve the printer for `kind`
    #[instrument(skip(self))]
    pub fn resolve(&self, tenant: &str, kind: PrintKind) -> Result<PrinterConfig, RouteError> {
        let routes = self.directory.routes(tenant);

        let route = match routes.iter().find(|r| r.kind == kind) {
            Some(route) => {
                debug!(printer_id = %route.printer_id, "Explicit route");
                route
            }
            None => match routes.iter().find(|r| r.is_default) {
                Some(route) => {
                    debug!(printer_id = %route.printer_id, "Falling back to default route");
                    route
                }
                None => {
                    return Err(RouteError::NoPrinterConfigured {
                        tenant: tenant.to_string(),
                        kind,
                    });
                }
            },
        };

        let printer = self
            .directory
            .printer(tenant, &route.printer_id)
            .ok_or_else(|| RouteError::UnknownPrinter {
                tenant: tenant.to_string(),
                kind,
                printer_id: route.printer_id.clone(),
            })?;

        if !printer.is_active {
            return Err(RouteError::PrinterInactive {
                printer_id: printer.id,
            });
        }

        Ok(printer)
    }
}
