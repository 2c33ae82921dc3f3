//! Server configuration
//!
//! Read once at start-up; business logic never touches the environment.

use shared::models::{
    CutMode, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_FEED_LINES_BEFORE_CUT, DEFAULT_PORT, DrawerPin,
    PaperWidth, PrinterConfig, Vendor,
};
use std::time::Duration;

/// Printer id of the env-configured Star printer
pub const STAR_PRINTER_ID: &str = "star-default";

/// Server configuration
///
/// # Environment
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | HTTP_PORT | 3000 | HTTP port |
/// | DEFAULT_TENANT | default | Tenant used when no `X-Tenant-Id` header is sent |
/// | STAR_PRINTER_IP | 192.168.2.13 | Star printer host |
/// | STAR_PRINTER_PORT | 9100 | Star printer raw TCP port |
/// | STAR_PAPER_WIDTH_MM | 80 | 58 or 80 |
/// | STAR_ASCII_SAFE | false | Transliterate text to ASCII |
/// | STAR_FEED_BEFORE_CUT | 3 | Lines fed before the cut |
/// | STAR_CUT_MODE | full | full, partial or none |
/// | STAR_DRAWER_ENABLED | true | Printer has a cash drawer |
/// | STAR_DRAWER_PIN | 2 | 2 or 5 |
/// | STAR_CONNECT_TIMEOUT_MS | 2500 | Connect budget |
/// | PRINT_WRITE_TIMEOUT_MS | 5000 | Write budget |
/// | PRINT_POST_WRITE_GRACE_MS | 100 | Wait after the last byte |
/// | PRINT_ROUTES_FILE | - | JSON file with extra printers and routes |
/// | LOG_LEVEL | info | Log filter when RUST_LOG is unset |
/// | LOG_JSON | false | JSON log lines |
/// | LOG_DIR | - | Daily rolling log files |
///
/// # Example
///
/// ```ignore
/// STAR_PRINTER_IP=10.0.0.20 STAR_CUT_MODE=partial cargo run -p bon-server
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API port
    pub http_port: u16,
    /// Tenant for requests without a tenant header
    pub default_tenant: String,
    /// Star receipt printer; default route of the default tenant
    pub star_printer: PrinterConfig,
    pub write_timeout_ms: u64,
    pub post_write_grace_ms: u64,
    /// Optional routes file
    pub routes_file: Option<String>,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());
        let flag = |key: &str, default: bool| {
            lookup(key)
                .and_then(|v| parse_bool(&v))
                .unwrap_or(default)
        };

        let star_printer = PrinterConfig {
            id: STAR_PRINTER_ID.to_string(),
            vendor: Vendor::Star,
            host: lookup("STAR_PRINTER_IP").unwrap_or_else(|| "192.168.2.13".into()),
            port: lookup("STAR_PRINTER_PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(DEFAULT_PORT),
            paper_width_mm: lookup("STAR_PAPER_WIDTH_MM")
                .and_then(|w| w.trim().parse::<u8>().ok())
                .and_then(|w| PaperWidth::try_from(w).ok())
                .unwrap_or_default(),
            ascii_safe_mode: flag("STAR_ASCII_SAFE", false),
            cut_mode: lookup("STAR_CUT_MODE")
                .and_then(|m| m.parse::<CutMode>().ok())
                .unwrap_or_default(),
            drawer_enabled: flag("STAR_DRAWER_ENABLED", true),
            drawer_pin: lookup("STAR_DRAWER_PIN")
                .and_then(|p| p.trim().parse::<u8>().ok())
                .and_then(|p| DrawerPin::try_from(p).ok())
                .unwrap_or_default(),
            feed_lines_before_cut: lookup("STAR_FEED_BEFORE_CUT")
                .and_then(|n| n.trim().parse().ok())
                .unwrap_or(DEFAULT_FEED_LINES_BEFORE_CUT),
            connect_timeout_ms: parse("STAR_CONNECT_TIMEOUT_MS")
                .filter(|ms| *ms > 0)
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_MS),
            is_active: true,
        };

        Self {
            http_port: lookup("HTTP_PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(3000),
            default_tenant: lookup("DEFAULT_TENANT")
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "default".into()),
            star_printer,
            write_timeout_ms: parse("PRINT_WRITE_TIMEOUT_MS")
                .filter(|ms| *ms > 0)
                .unwrap_or(5000),
            post_write_grace_ms: parse("PRINT_POST_WRITE_GRACE_MS").unwrap_or(100),
            routes_file: lookup("PRINT_ROUTES_FILE").filter(|p| !p.trim().is_empty()),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_json: flag("LOG_JSON", false),
            log_dir: lookup("LOG_DIR").filter(|d| !d.trim().is_empty()),
        }
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn post_write_grace(&self) -> Duration {
        Duration::from_millis(self.post_write_grace_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
