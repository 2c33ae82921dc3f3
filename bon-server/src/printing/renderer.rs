//! Receipt renderer
//!
//! Lays receipts, test pages and QR cards out as ESC/POS directives for one
//! printer. Vendor bytes are produced later by the encoder.

use bon_printer::{EscPosBuilder, ReceiptFormatter, receipt};
use shared::models::{CutMode, PrintKind, PrinterConfig, ReceiptJob};
use tracing::debug;

/// QR module size in dots
const QR_MODULE_SIZE: u8 = 6;

/// Receipt renderer bound to one printer configuration
pub struct ReceiptRenderer<'a> {
    printer: &'a PrinterConfig,
    fmt: ReceiptFormatter,
}

impl<'a> ReceiptRenderer<'a> {
    pub fn new(printer: &'a PrinterConfig) -> Self {
        Self {
            printer,
            fmt: ReceiptFormatter::new(printer.char_width(), printer.ascii_safe_mode),
        }
    }

    /// Render a customer receipt
    pub fn render(&self, job: &ReceiptJob) -> EscPosBuilder {
        let mut b = self.start();

        self.render_header(&mut b, job);

        for row in self.fmt.lines(&job.lines) {
            b.line(&row);
        }
        b.sep_single();

        self.render_totals(&mut b, job);
        self.render_footer(&mut b, job);

        let cut = if job.cut {
            self.printer.cut_mode
        } else {
            CutMode::None
        };
        let drawer = if job.open_drawer && self.printer.drawer_enabled {
            Some(self.printer.drawer_pin)
        } else {
            if job.open_drawer {
                debug!(printer_id = %self.printer.id, "Drawer requested but not enabled on printer");
            }
            None
        };
        b.finish(self.printer.feed_lines_before_cut, drawer, cut);
        b
    }

    /// Render a test page
    ///
    /// `kind` labels a routed test print with the kind it was routed for.
    pub fn render_test(&self, kind: Option<PrintKind>) -> EscPosBuilder {
        let mut b = self.start();
        let now = chrono::Local::now().format("%d-%m-%Y %H:%M").to_string();

        b.center().double_size().bold();
        b.line(&self.large("TESTPRINT"));
        b.reset_size().bold_off();
        if let Some(kind) = kind {
            b.line(&kind.to_string());
        }
        b.line(&now);
        b.left().sep_double();

        b.line(&self.fmt.pair("Printer", &self.printer.id));
        b.line(&self.fmt.pair("Vendor", &self.printer.vendor.to_string()));
        b.line(&self.fmt.pair("Adres", &self.printer.address()));
        b.line(&self.fmt.pair("Breedte", &format!("{} tekens", self.fmt.width())));
        b.sep_single();

        // Code page check
        b.line(&self.fmt.truncate("Café — Crème brûlée"));
        b.line(&self.fmt.pair("Totaal", &self.fmt.money(850)));

        b.finish(
            self.printer.feed_lines_before_cut,
            None,
            self.printer.cut_mode,
        );
        b
    }

    /// Render a QR card with an optional caption
    pub fn render_qr(&self, data: &str, caption: Option<&str>) -> EscPosBuilder {
        let mut b = self.start();

        b.center();
        b.qr_code(data, QR_MODULE_SIZE);
        b.newline();
        if let Some(caption) = caption.filter(|c| !c.trim().is_empty()) {
            b.line(&self.fmt.truncate(caption));
        }
        b.left();

        b.finish(
            self.printer.feed_lines_before_cut,
            None,
            self.printer.cut_mode,
        );
        b
    }

    /// Drawer pulse only, no paper movement
    pub fn render_drawer(&self) -> EscPosBuilder {
        let mut b = EscPosBuilder::new(self.fmt.width());
        b.open_drawer(self.printer.drawer_pin);
        b
    }

    /// Double-width text gets half the columns
    fn large(&self, s: &str) -> String {
        receipt::truncate(&self.fmt.text(s), self.fmt.width() / 2)
    }

    /// Initialize and select the code page
    fn start(&self) -> EscPosBuilder {
        let mut b = EscPosBuilder::new(self.fmt.width());
        if !self.printer.ascii_safe_mode {
            b.code_page();
        }
        b
    }

    fn render_header(&self, b: &mut EscPosBuilder, job: &ReceiptJob) {
        let header = &job.header;

        // Business name (large, centered); double width halves the columns
        b.center();
        b.double_size();
        b.bold();
        b.line(&self.large(&header.business_name));
        b.bold_off();
        b.reset_size();

        if let Some(address) = header.address.as_deref().filter(|a| !a.is_empty()) {
            b.line(&self.fmt.truncate(address));
        }

        if !header.job_label.is_empty() {
            b.bold();
            b.line(&self.fmt.truncate(&header.job_label));
            b.bold_off();
        }

        b.left();
        b.sep_double();
    }

    fn render_totals(&self, b: &mut EscPosBuilder, job: &ReceiptJob) {
        let rows = self.fmt.totals(&job.totals);
        let last = rows.len().saturating_sub(1);
        for (i, row) in rows.iter().enumerate() {
            if i == last {
                b.bold();
                b.line(row);
                b.bold_off();
            } else {
                b.line(row);
            }
        }
        b.sep_double();
    }

    fn render_footer(&self, b: &mut EscPosBuilder, job: &ReceiptJob) {
        let footer = &job.footer;

        if let Some(paid_with) = footer.paid_with.as_deref().filter(|p| !p.is_empty()) {
            b.line(&self.fmt.pair("Betaald met", paid_with));
        }

        if !footer.free_text.is_empty() {
            b.center();
            for text in &footer.free_text {
                b.line(&self.fmt.truncate(text));
            }
            b.left();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bon_printer::Directive;
    use shared::models::{
        DrawerPin, ReceiptFooter, ReceiptHeader, ReceiptLine, ReceiptTotals, Vendor, VatLine,
    };

    fn job(printer: PrinterConfig) -> ReceiptJob {
        ReceiptJob {
            printer,
            header: ReceiptHeader {
                business_name: "Café de Hoek".to_string(),
                address: Some("Markt 1, Utrecht".to_string()),
                job_label: "Tafel 4".to_string(),
            },
            lines: vec![
                ReceiptLine::priced("Koffie", 2, 250),
                ReceiptLine::priced("Appeltaart", 1, 350),
            ],
            totals: ReceiptTotals {
                subtotal_cents: 780,
                vat_breakdown: vec![VatLine {
                    rate_percent: 9,
                    amount_cents: 70,
                }],
                total_cents: 850,
            },
            footer: ReceiptFooter {
                paid_with: Some("PIN".to_string()),
                free_text: vec!["Bedankt en tot ziens!".to_string()],
            },
            cut: true,
            open_drawer: false,
        }
    }

    fn lines(b: &EscPosBuilder) -> Vec<&str> {
        b.directives()
            .iter()
            .filter_map(|d| match d {
                Directive::Line(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    fn star(width_58: bool) -> PrinterConfig {
        let mut p = PrinterConfig::new("star-default", Vendor::Star, "192.168.2.13", 9100);
        if width_58 {
            p.paper_width_mm = shared::models::PaperWidth::Mm58;
        }
        p
    }

    #[test]
    fn test_receipt_layout() {
        let printer = star(true);
        let job = job(printer.clone());
        let b = ReceiptRenderer::new(&printer).render(&job);

        let text = lines(&b);
        assert!(text.contains(&"Café de Hoek"));
        assert!(text.contains(&"2x Koffie                 € 5,00"));
        assert!(text.contains(&"1x Appeltaart             € 3,50"));
        assert!(text.contains(&"Totaal                    € 8,50"));
        assert!(text.contains(&"Betaald met                  PIN"));

        assert_eq!(b.directives()[0], Directive::Initialize);
        assert_eq!(b.directives()[1], Directive::SelectCodePage);
        assert_eq!(
            b.directives().last(),
            Some(&Directive::Cut(CutMode::Full))
        );
    }

    #[test]
    fn test_receipt_ascii_safe() {
        let mut printer = star(true);
        printer.ascii_safe_mode = true;
        let job = job(printer.clone());
        let b = ReceiptRenderer::new(&printer).render(&job);

        assert!(!b.directives().contains(&Directive::SelectCodePage));
        let text = lines(&b);
        assert!(text.contains(&"Cafe de Hoek"));
        assert!(text.contains(&"Totaal                  EUR 8,50"));
    }

    #[test]
    fn test_drawer_only_when_enabled() {
        let mut printer = star(false);
        printer.drawer_enabled = true;
        printer.drawer_pin = DrawerPin::Pin5;
        let mut job = job(printer.clone());
        job.open_drawer = true;

        let b = ReceiptRenderer::new(&printer).render(&job);
        let tail = &b.directives()[b.directives().len() - 3..];
        assert_eq!(
            tail,
            &[
                Directive::Feed(3),
                Directive::KickDrawer(DrawerPin::Pin5),
                Directive::Cut(CutMode::Full),
            ]
        );

        printer.drawer_enabled = false;
        let b = ReceiptRenderer::new(&printer).render(&job);
        assert!(
            !b.directives()
                .iter()
                .any(|d| matches!(d, Directive::KickDrawer(_)))
        );
    }

    #[test]
    fn test_no_cut_requested() {
        let printer = star(false);
        let mut job = job(printer.clone());
        job.cut = false;

        let b = ReceiptRenderer::new(&printer).render(&job);
        assert_eq!(b.directives().last(), Some(&Directive::Cut(CutMode::None)));
    }

    #[test]
    fn test_qr_card() {
        let printer = PrinterConfig::new("qr", Vendor::Epson, "10.0.0.5", 9100);
        let b = ReceiptRenderer::new(&printer).render_qr("https://hoek.nl/kaart/42", Some("Spaarkaart"));

        assert!(b.directives().iter().any(|d| matches!(
            d,
            Directive::QrCode { data, .. } if data == "https://hoek.nl/kaart/42"
        )));
        assert!(lines(&b).contains(&"Spaarkaart"));
    }

    #[test]
    fn test_drawer_page() {
        let mut printer = star(false);
        printer.drawer_pin = DrawerPin::Pin5;
        let b = ReceiptRenderer::new(&printer).render_drawer();
        assert_eq!(
            b.directives(),
            &[Directive::Initialize, Directive::KickDrawer(DrawerPin::Pin5)]
        );
    }

    #[test]
    fn test_test_page_labels_kind() {
        let printer = star(false);
        let b = ReceiptRenderer::new(&printer).render_test(Some(PrintKind::Kitchen));
        let text = lines(&b);
        assert!(text.contains(&"TESTPRINT"));
        assert!(text.contains(&"KITCHEN"));
    }
}
