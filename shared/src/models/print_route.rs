//! Print Route Model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical purpose of a print job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrintKind {
    /// Customer receipt
    Receipt,
    /// Kitchen ticket
    Kitchen,
    /// Bar ticket
    Bar,
    /// QR loyalty card
    QrCard,
}

impl fmt::Display for PrintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Receipt => "RECEIPT",
            Self::Kitchen => "KITCHEN",
            Self::Bar => "BAR",
            Self::QrCard => "QR_CARD",
        };
        f.write_str(s)
    }
}

/// Routing entry: logical kind -> printer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintRoute {
    pub kind: PrintKind,
    pub printer_id: String,
    #[serde(default)]
    pub is_default: bool,
}

impl PrintRoute {
    pub fn new(kind: PrintKind, printer_id: impl Into<String>, is_default: bool) -> Self {
        Self {
            kind,
            printer_id: printer_id.into(),
            is_default,
        }
    }
}
