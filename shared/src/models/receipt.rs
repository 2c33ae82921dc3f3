//! Receipt Model
//!
//! An already-computed receipt: lines, totals and VAT come from the order
//! domain. The print pipeline only lays it out.

use serde::{Deserialize, Serialize};

use super::printer::PrinterConfig;
use crate::error::AppError;

/// Single receipt line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price_cents: Option<i64>,
}

impl ReceiptLine {
    /// Line with quantity and unit price
    pub fn priced(title: impl Into<String>, qty: i64, unit_price_cents: i64) -> Self {
        Self {
            title: title.into(),
            qty: Some(qty),
            unit_price_cents: Some(unit_price_cents),
        }
    }

    /// Text-only line (no price column)
    pub fn text(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            qty: None,
            unit_price_cents: None,
        }
    }

    /// qty × unit price; `None` for text-only lines and on overflow
    pub fn total_cents(&self) -> Option<i64> {
        self.qty
            .and_then(|qty| qty.checked_mul(self.unit_price_cents.unwrap_or(0)))
    }

    /// Reject a priced line whose total does not fit in cents
    pub fn validate(&self) -> Result<(), AppError> {
        if self.qty.is_some() && self.total_cents().is_none() {
            return Err(AppError::invalid_payload(format!(
                "Line total out of range: {}",
                self.title
            )));
        }
        Ok(())
    }
}

/// Receipt header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptHeader {
    pub business_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// e.g. "Tafel 4" or "Bon #0012"
    #[serde(default)]
    pub job_label: String,
}

/// VAT amount for one rate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VatLine {
    pub rate_percent: u32,
    pub amount_cents: i64,
}

/// Receipt totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptTotals {
    pub subtotal_cents: i64,
    #[serde(default)]
    pub vat_breakdown: Vec<VatLine>,
    pub total_cents: i64,
}

/// Receipt footer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptFooter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_with: Option<String>,
    #[serde(default)]
    pub free_text: Vec<String>,
}

/// Receipt content without a target printer
///
/// Used when the printer is resolved through routing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptContent {
    pub header: ReceiptHeader,
    #[serde(default)]
    pub lines: Vec<ReceiptLine>,
    #[serde(default)]
    pub totals: ReceiptTotals,
    #[serde(default)]
    pub footer: ReceiptFooter,
    #[serde(default = "default_true")]
    pub cut: bool,
    /// Kick the cash drawer (only when the printer has a drawer)
    #[serde(default)]
    pub open_drawer: bool,
}

fn default_true() -> bool {
    true
}

impl ReceiptContent {
    /// Bind to a printer
    pub fn into_job(self, printer: PrinterConfig) -> ReceiptJob {
        ReceiptJob {
            printer,
            header: self.header,
            lines: self.lines,
            totals: self.totals,
            footer: self.footer,
            cut: self.cut,
            open_drawer: self.open_drawer,
        }
    }
}

/// A single print request, consumed once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptJob {
    pub printer: PrinterConfig,
    pub header: ReceiptHeader,
    #[serde(default)]
    pub lines: Vec<ReceiptLine>,
    #[serde(default)]
    pub totals: ReceiptTotals,
    #[serde(default)]
    pub footer: ReceiptFooter,
    #[serde(default = "default_true")]
    pub cut: bool,
    #[serde(default)]
    pub open_drawer: bool,
}

impl ReceiptJob {
    /// Check line totals before anything is rendered
    pub fn validate(&self) -> Result<(), AppError> {
        self.lines.iter().try_for_each(ReceiptLine::validate)
    }
}
