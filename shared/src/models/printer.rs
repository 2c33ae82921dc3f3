//! Printer Model
//!
//! Resolved printer configuration consumed by the print pipeline. Records are
//! owned by configuration storage; a job only ever reads them.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default raw-TCP port of thermal printers
pub const DEFAULT_PORT: u16 = 9100;
/// Default connect budget (milliseconds)
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 2500;
/// Default lines fed before the guillotine cuts
pub const DEFAULT_FEED_LINES_BEFORE_CUT: u8 = 3;

/// Printer vendor (ESC/POS dialect)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Vendor {
    /// Star Micronics in ESC/POS emulation
    Star,
    /// Epson TM series
    Epson,
    /// Any other ESC/POS compatible printer
    GenericEscpos,
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Star => "STAR",
            Self::Epson => "EPSON",
            Self::GenericEscpos => "GENERIC_ESCPOS",
        };
        f.write_str(s)
    }
}

/// Paper cut performed at the end of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutMode {
    #[default]
    Full,
    Partial,
    /// No cut bytes at all; paper is separated by hand
    None,
}

impl std::str::FromStr for CutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "partial" => Ok(Self::Partial),
            "none" => Ok(Self::None),
            other => Err(format!("Invalid cut mode: {}", other)),
        }
    }
}

/// Cash drawer connector pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum DrawerPin {
    #[default]
    Pin2,
    Pin5,
}

impl DrawerPin {
    /// The `m` parameter of `ESC p m t1 t2`
    pub fn selector(self) -> u8 {
        match self {
            Self::Pin2 => 0,
            Self::Pin5 => 1,
        }
    }
}

impl From<DrawerPin> for u8 {
    fn from(pin: DrawerPin) -> Self {
        match pin {
            DrawerPin::Pin2 => 2,
            DrawerPin::Pin5 => 5,
        }
    }
}

impl TryFrom<u8> for DrawerPin {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Self::Pin2),
            5 => Ok(Self::Pin5),
            other => Err(format!("Invalid drawer pin: {} (expected 2 or 5)", other)),
        }
    }
}

/// Paper roll width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PaperWidth {
    Mm58,
    #[default]
    Mm80,
}

impl PaperWidth {
    /// Characters per line in font A
    ///
    /// - 58mm paper: 32 characters
    /// - 80mm paper: 48 characters
    pub fn chars(self) -> usize {
        match self {
            Self::Mm58 => 32,
            Self::Mm80 => 48,
        }
    }
}

impl From<PaperWidth> for u8 {
    fn from(width: PaperWidth) -> Self {
        match width {
            PaperWidth::Mm58 => 58,
            PaperWidth::Mm80 => 80,
        }
    }
}

impl TryFrom<u8> for PaperWidth {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            58 => Ok(Self::Mm58),
            80 => Ok(Self::Mm80),
            other => Err(format!("Invalid paper width: {}mm (expected 58 or 80)", other)),
        }
    }
}

/// Resolved printer configuration
///
/// Immutable per job. Wire names are camelCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterConfig {
    #[serde(default = "default_id")]
    pub id: String,
    pub vendor: Vendor,
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub paper_width_mm: PaperWidth,
    #[serde(default)]
    pub ascii_safe_mode: bool,
    #[serde(default)]
    pub cut_mode: CutMode,
    #[serde(default)]
    pub drawer_enabled: bool,
    #[serde(default)]
    pub drawer_pin: DrawerPin,
    #[serde(default = "default_feed_lines")]
    pub feed_lines_before_cut: u8,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_id() -> String {
    "adhoc".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_feed_lines() -> u8 {
    DEFAULT_FEED_LINES_BEFORE_CUT
}

fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

fn default_true() -> bool {
    true
}

impl PrinterConfig {
    /// Create a config with defaults for everything but vendor and address
    pub fn new(id: impl Into<String>, vendor: Vendor, host: impl Into<String>, port: u16) -> Self {
        Self {
            id: id.into(),
            vendor,
            host: host.into(),
            port,
            paper_width_mm: PaperWidth::default(),
            ascii_safe_mode: false,
            cut_mode: CutMode::default(),
            drawer_enabled: false,
            drawer_pin: DrawerPin::default(),
            feed_lines_before_cut: DEFAULT_FEED_LINES_BEFORE_CUT,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            is_active: true,
        }
    }

    /// `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Characters per printed line
    pub fn char_width(&self) -> usize {
        self.paper_width_mm.chars()
    }

    /// Check the fields that cannot be enforced by the type system
    pub fn validate(&self) -> Result<(), AppError> {
        if self.host.trim().is_empty() {
            return Err(AppError::missing_printer_fields("Printer host is required"));
        }
        if self.port == 0 {
            return Err(AppError::port_invalid("Printer port must be between 1 and 65535"));
        }
        if self.connect_timeout_ms == 0 {
            return Err(AppError::invalid_payload("connectTimeoutMs must be positive"));
        }
        Ok(())
    }
}

/// Driver name accepted by the HTTP surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrintDriver {
    /// Plain ESC/POS over raw TCP
    EscPosTcp,
    /// Star printer in ESC/POS emulation over raw TCP
    StarEscPosTcp,
    /// Star native StarPRNT; recognized, not implemented
    Starprnt,
}

impl PrintDriver {
    /// Vendor dialect for this driver, `None` when the driver is not implemented
    pub fn vendor(self) -> Option<Vendor> {
        match self {
            Self::EscPosTcp => Some(Vendor::GenericEscpos),
            Self::StarEscPosTcp => Some(Vendor::Star),
            Self::Starprnt => None,
        }
    }
}

impl std::str::FromStr for PrintDriver {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ESC_POS_TCP" => Ok(Self::EscPosTcp),
            "STAR_ESC_POS_TCP" => Ok(Self::StarEscPosTcp),
            "STARPRNT" => Ok(Self::Starprnt),
            other => Err(format!("Unknown driver: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrintErrorKind;

    #[test]
    fn test_printer_config_defaults_from_json() {
        let json = r#"{"vendor":"STAR","host":"192.168.2.13"}"#;
        let cfg: PrinterConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.port, 9100);
        assert_eq!(cfg.paper_width_mm, PaperWidth::Mm80);
        assert_eq!(cfg.cut_mode, CutMode::Full);
        assert_eq!(cfg.drawer_pin, DrawerPin::Pin2);
        assert_eq!(cfg.connect_timeout_ms, 2500);
        assert!(cfg.is_active);
        assert_eq!(cfg.char_width(), 48);
    }

    #[test]
    fn test_printer_config_camel_case() {
        let json = r#"{
            "id": "bar-1",
            "vendor": "GENERIC_ESCPOS",
            "host": "10.0.0.5",
            "port": 9101,
            "paperWidthMm": 58,
            "asciiSafeMode": true,
            "cutMode": "none",
            "drawerEnabled": true,
            "drawerPin": 5,
            "feedLinesBeforeCut": 4,
            "connectTimeoutMs": 1000,
            "isActive": false
        }"#;
        let cfg: PrinterConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.vendor, Vendor::GenericEscpos);
        assert_eq!(cfg.paper_width_mm, PaperWidth::Mm58);
        assert_eq!(cfg.char_width(), 32);
        assert_eq!(cfg.cut_mode, CutMode::None);
        assert_eq!(cfg.drawer_pin, DrawerPin::Pin5);
        assert_eq!(cfg.address(), "10.0.0.5:9101");
        assert!(!cfg.is_active);
    }

    #[test]
    fn test_invalid_drawer_pin_rejected() {
        let json = r#"{"vendor":"EPSON","host":"h","drawerPin":3}"#;
        assert!(serde_json::from_str::<PrinterConfig>(json).is_err());
    }

    #[test]
    fn test_validate() {
        let mut cfg = PrinterConfig::new("p1", Vendor::Epson, "10.0.0.1", 9100);
        assert!(cfg.validate().is_ok());
        cfg.port = 0;
        assert_eq!(cfg.validate().unwrap_err().kind, PrintErrorKind::PortInvalid);
        cfg.host = "  ".to_string();
        assert_eq!(
            cfg.validate().unwrap_err().kind,
            PrintErrorKind::MissingPrinterFields
        );
    }

    #[test]
    fn test_driver_parse() {
        assert_eq!("ESC_POS_TCP".parse::<PrintDriver>(), Ok(PrintDriver::EscPosTcp));
        assert_eq!(PrintDriver::StarEscPosTcp.vendor(), Some(Vendor::Star));
        assert_eq!(PrintDriver::Starprnt.vendor(), None);
        assert!("USB".parse::<PrintDriver>().is_err());
    }

    #[test]
    fn test_cut_mode_parse() {
        assert_eq!("Partial".parse::<CutMode>(), Ok(CutMode::Partial));
        assert!("half".parse::<CutMode>().is_err());
    }
}
