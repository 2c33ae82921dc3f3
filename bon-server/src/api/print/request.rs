//! Print request bodies
//!
//! Printer targets arrive loosely typed (driver names, ports as strings) and
//! are checked here before any job is built.

use serde::Deserialize;
use serde_json::Value;
use shared::error::{AppError, AppResult, PrintErrorKind};
use shared::models::{
    CutMode, DEFAULT_PORT, DrawerPin, PaperWidth, PrintDriver, PrintKind, PrinterConfig,
    ReceiptContent, Vendor,
};

/// Wire code for the recognized but unimplemented StarPRNT driver
pub const STARPRNT_NOT_SUPPORTED_YET: &str = "STARPRNT_NOT_SUPPORTED_YET";

/// Ad-hoc printer in a request body
///
/// Either `driver` (`ESC_POS_TCP`, `STAR_ESC_POS_TCP`, `STARPRNT`) or
/// `vendor` (`STAR`, `EPSON`, `GENERIC_ESCPOS`) selects the dialect.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterTarget {
    pub id: Option<String>,
    pub driver: Option<String>,
    pub vendor: Option<Vendor>,
    pub host: Option<String>,
    /// Number or numeric string
    pub port: Option<Value>,
    pub paper_width_mm: Option<u8>,
    pub ascii_safe_mode: Option<bool>,
    pub cut_mode: Option<CutMode>,
    pub drawer_enabled: Option<bool>,
    pub drawer_pin: Option<u8>,
    pub feed_lines_before_cut: Option<u8>,
    pub connect_timeout_ms: Option<u64>,
}

impl PrinterTarget {
    /// Validate and turn into a printer configuration
    pub fn into_config(self) -> AppResult<PrinterConfig> {
        let vendor = self.vendor()?;

        let host = self
            .host
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .ok_or_else(|| AppError::missing_printer_fields("Printer host is required"))?;
        let port = parse_port(self.port.as_ref())?;

        let mut printer =
            PrinterConfig::new(self.id.unwrap_or_else(|| "adhoc".into()), vendor, host, port);

        if let Some(width) = self.paper_width_mm {
            printer.paper_width_mm = PaperWidth::try_from(width).map_err(AppError::invalid_payload)?;
        }
        if let Some(pin) = self.drawer_pin {
            printer.drawer_pin = DrawerPin::try_from(pin).map_err(AppError::invalid_payload)?;
        }
        if let Some(ascii_safe) = self.ascii_safe_mode {
            printer.ascii_safe_mode = ascii_safe;
        }
        if let Some(cut_mode) = self.cut_mode {
            printer.cut_mode = cut_mode;
        }
        if let Some(enabled) = self.drawer_enabled {
            printer.drawer_enabled = enabled;
        }
        if let Some(lines) = self.feed_lines_before_cut {
            printer.feed_lines_before_cut = lines;
        }
        if let Some(ms) = self.connect_timeout_ms {
            printer.connect_timeout_ms = ms;
        }

        printer.validate()?;
        Ok(printer)
    }

    fn vendor(&self) -> AppResult<Vendor> {
        let Some(driver) = self.driver.as_deref().map(str::trim).filter(|d| !d.is_empty()) else {
            return self
                .vendor
                .ok_or_else(|| AppError::missing_printer_fields("Printer driver is required"));
        };

        let driver: PrintDriver = driver
            .parse()
            .map_err(|_| AppError::unknown_driver(driver))?;
        driver.vendor().ok_or_else(|| {
            AppError::with_message(
                PrintErrorKind::DriverNotSupported,
                "StarPRNT driver is not supported yet",
            )
            .with_wire_code(STARPRNT_NOT_SUPPORTED_YET)
        })
    }
}

/// Port from a JSON number or numeric string; missing means 9100
fn parse_port(value: Option<&Value>) -> AppResult<u16> {
    let port = match value {
        None | Some(Value::Null) => return Ok(DEFAULT_PORT),
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        Some(_) => None,
    };

    port.filter(|p| (1..=65535).contains(p))
        .map(|p| p as u16)
        .ok_or_else(|| AppError::port_invalid(format!("Invalid printer port: {}", display(value))))
}

fn display(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

/// Printer may be omitted when the server routes the job
pub fn optional_printer(target: Option<PrinterTarget>) -> AppResult<Option<PrinterConfig>> {
    target.map(PrinterTarget::into_config).transpose()
}

/// POST /print/test
#[derive(Debug, Deserialize)]
pub struct TestPrintRequest {
    pub printer: Option<PrinterTarget>,
}

/// POST /print/receipt
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRequest {
    pub printer: Option<PrinterTarget>,
    #[serde(flatten)]
    pub content: ReceiptContent,
}

/// POST /print/epson/qr
#[derive(Debug, Deserialize)]
pub struct QrRequest {
    pub printer: Option<PrinterTarget>,
    pub data: String,
    pub caption: Option<String>,
}

/// POST /print/test-kind
#[derive(Debug, Deserialize)]
pub struct TestKindRequest {
    pub kind: PrintKind,
}

/// POST /print/drawer
#[derive(Debug, Default, Deserialize)]
pub struct DrawerRequest {
    pub printer: Option<PrinterTarget>,
}
