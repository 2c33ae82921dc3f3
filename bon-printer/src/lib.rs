//! # bon-printer
//!
//! ESC/POS thermal printer library - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - ESC/POS encoding for Generic, Epson and Star (emulation) printers
//! - WPC1252 / ASCII-safe text encoding
//! - Column layout of receipt lines and totals
//! - Network printing (TCP port 9100) with failure classification
//!
//! Deciding WHAT to print and WHERE (routing, receipt composition) stays in
//! the server.
//!
//! ## Example
//!
//! ```ignore
//! use bon_printer::{EscPosBuilder, NetworkPrinter, Printer};
//! use shared::models::{CutMode, Vendor};
//!
//! let mut builder = EscPosBuilder::new(48);
//! builder.code_page();
//! builder.center().double_size().line("Cafe de Hoek").reset_size();
//! builder.sep_double();
//! builder.left().line("Tafel 4");
//! builder.finish(3, None, CutMode::Full);
//!
//! let printer = NetworkPrinter::new("192.168.2.13", 9100);
//! printer.print(&builder.build(Vendor::Star, false)?).await?;
//! ```

mod encoding;
mod error;
mod escpos;
mod printer;
pub mod receipt;

// Re-exports
pub use encoding::{
    encode_text, encode_wpc1252, pad_text, text_width, to_ascii_safe, to_wpc1252_text,
    truncate_text,
};
pub use error::{EncodeError, PrintResult, TransportError};
pub use escpos::{
    Align, Dialect, Directive, Encoder, EpsonEncoder, EscPosBuilder, GenericEncoder, QR_MAX_BYTES,
    encode, is_supported,
};
pub use printer::{
    ConnectionState, Connector, DEFAULT_POST_WRITE_GRACE, DEFAULT_WRITE_TIMEOUT, NetworkPrinter,
    Printer, SendReport, TcpConnector,
};
pub use receipt::ReceiptFormatter;

#[cfg(feature = "star")]
pub use escpos::StarEncoder;
