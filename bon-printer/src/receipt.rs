//! Receipt text layout
//!
//! Turns receipt lines and totals into width-bounded text rows. Every row is
//! at most `width` characters and right columns end exactly at `width`.

use crate::encoding::{pad_text, text_width, to_ascii_safe, to_wpc1252_text, truncate_text};
use shared::models::{ReceiptLine, ReceiptTotals};

/// Column layout for one paper width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptFormatter {
    width: usize,
    ascii_safe: bool,
}

impl ReceiptFormatter {
    pub fn new(width: usize, ascii_safe: bool) -> Self {
        Self { width, ascii_safe }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn ascii_safe(&self) -> bool {
        self.ascii_safe
    }

    /// Text as the printer will show it, one character per column
    ///
    /// ASCII-safe transform when enabled, otherwise the WPC1252 fallbacks.
    pub fn text(&self, s: &str) -> String {
        if self.ascii_safe {
            to_ascii_safe(s)
        } else {
            to_wpc1252_text(s)
        }
    }

    /// Format an amount in cents, e.g. `€ 5,00` / `-€ 1,25` / `EUR 5,00`
    pub fn money(&self, cents: i64) -> String {
        let symbol = if self.ascii_safe { "EUR" } else { "€" };
        let sign = if cents < 0 { "-" } else { "" };
        let abs = cents.unsigned_abs();
        format!("{}{} {},{:02}", sign, symbol, abs / 100, abs % 100)
    }

    /// Line items: `{qty}x {title}` on the left, line total on the right
    ///
    /// The price column is as wide as the widest price in the batch so all
    /// prices are right-aligned at the paper edge. Lines without a quantity
    /// are printed as plain text.
    pub fn lines(&self, lines: &[ReceiptLine]) -> Vec<String> {
        let prices: Vec<Option<String>> = lines
            .iter()
            .map(|line| line.total_cents().map(|cents| self.money(cents)))
            .collect();

        let price_width = prices
            .iter()
            .flatten()
            .map(|p| text_width(p))
            .max()
            .unwrap_or(0)
            .min(self.width);

        lines
            .iter()
            .zip(prices)
            .map(|(line, price)| match (line.qty, price) {
                (Some(qty), Some(price)) => {
                    let left = self.text(&format!("{}x {}", qty, line.title));
                    self.columns(&left, &price, price_width)
                }
                _ => truncate_text(&self.text(&line.title), self.width),
            })
            .collect()
    }

    /// Label left, value right-aligned at the paper edge
    pub fn pair(&self, label: &str, value: &str) -> String {
        let value = self.text(value);
        let value_width = text_width(&value).min(self.width);
        self.columns(&self.text(label), &value, value_width)
    }

    /// Subtotal, one row per VAT rate, total
    pub fn totals(&self, totals: &ReceiptTotals) -> Vec<String> {
        let mut rows = Vec::with_capacity(totals.vat_breakdown.len() + 2);
        rows.push(self.pair("Subtotaal", &self.money(totals.subtotal_cents)));
        for vat in &totals.vat_breakdown {
            rows.push(self.pair(
                &format!("BTW {}%", vat.rate_percent),
                &self.money(vat.amount_cents),
            ));
        }
        rows.push(self.pair("Totaal", &self.money(totals.total_cents)));
        rows
    }

    /// Center within the paper width (left padding only)
    pub fn center(&self, s: &str) -> String {
        center(&self.text(s), self.width)
    }

    /// Truncate to the paper width
    pub fn truncate(&self, s: &str) -> String {
        truncate(&self.text(s), self.width)
    }

    fn columns(&self, left: &str, right: &str, right_width: usize) -> String {
        let gap = usize::from(right_width < self.width);
        let left_width = self.width - right_width - gap;
        format!(
            "{}{}{}",
            pad_text(left, left_width, false),
            " ".repeat(gap),
            pad_text(right, right_width, true)
        )
    }
}

/// Format receipt lines for a paper width
pub fn format(lines: &[ReceiptLine], width: usize, ascii_safe: bool) -> Vec<String> {
    ReceiptFormatter::new(width, ascii_safe).lines(lines)
}

/// Label/value row ending at column `width`
pub fn format_pair(label: &str, value: &str, width: usize) -> String {
    ReceiptFormatter::new(width, false).pair(label, value)
}

/// Totals block
pub fn format_totals(totals: &ReceiptTotals, width: usize, ascii_safe: bool) -> Vec<String> {
    ReceiptFormatter::new(width, ascii_safe).totals(totals)
}

/// Center text by left padding; truncated when wider than `width`
pub fn center(s: &str, width: usize) -> String {
    let w = text_width(s);
    if w >= width {
        return truncate_text(s, width);
    }
    format!("{}{}", " ".repeat((width - w) / 2), s)
}

/// Hard truncate by character count, no ellipsis
pub fn truncate(s: &str, width: usize) -> String {
    truncate_text(s, width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::encode_text;
    use pretty_assertions::assert_eq;
    use shared::models::VatLine;

    fn koffie_appeltaart() -> Vec<ReceiptLine> {
        vec![
            ReceiptLine::priced("Koffie", 2, 250),
            ReceiptLine::priced("Appeltaart", 1, 350),
        ]
    }

    #[test]
    fn test_money() {
        let f = ReceiptFormatter::new(32, false);
        assert_eq!(f.money(500), "€ 5,00");
        assert_eq!(f.money(5), "€ 0,05");
        assert_eq!(f.money(123456), "€ 1234,56");
        assert_eq!(f.money(-125), "-€ 1,25");

        let safe = ReceiptFormatter::new(32, true);
        assert_eq!(safe.money(500), "EUR 5,00");
        assert_eq!(safe.money(-125), "-EUR 1,25");
    }

    #[test]
    fn test_lines_right_aligned() {
        let rows = format(&koffie_appeltaart(), 32, false);
        assert_eq!(
            rows,
            vec![
                "2x Koffie                 € 5,00".to_string(),
                "1x Appeltaart             € 3,50".to_string(),
            ]
        );
        for row in &rows {
            assert_eq!(text_width(row), 32);
        }
        assert!(rows[0].ends_with("€ 5,00"));
        assert!(rows[1].ends_with("€ 3,50"));
    }

    #[test]
    fn test_price_column_widest_in_batch() {
        let lines = vec![
            ReceiptLine::priced("Fles wijn", 1, 2450),
            ReceiptLine::priced("Water", 1, 250),
        ];
        let rows = format(&lines, 32, false);
        assert!(rows[0].ends_with(" € 24,50"));
        assert!(rows[1].ends_with("  € 2,50"));
        assert_eq!(text_width(&rows[1]), 32);
    }

    #[test]
    fn test_long_title_truncated() {
        let lines = vec![ReceiptLine::priced(
            "Huisgemaakte appeltaart met slagroom en extra kaneel",
            1,
            450,
        )];
        let rows = format(&lines, 32, false);
        assert_eq!(rows[0], "1x Huisgemaakte appeltaar € 4,50");
        assert_eq!(text_width(&rows[0]), 32);
    }

    #[test]
    fn test_text_only_line() {
        let lines = vec![ReceiptLine::text(
            "** Allergie: noten, gluten en lactose vrij graag **",
        )];
        let rows = format(&lines, 32, false);
        assert_eq!(rows[0], "** Allergie: noten, gluten en la");
        assert_eq!(text_width(&rows[0]), 32);
    }

    #[test]
    fn test_ascii_safe_lines() {
        let lines = vec![ReceiptLine::priced("Café — Crème", 1, 500)];

        let rows = format(&lines, 32, true);
        assert_eq!(rows[0], "1x Cafe - Creme         EUR 5,00");

        let rows = format(&lines, 32, false);
        assert!(rows[0].starts_with("1x Café — Crème"));
        assert!(rows[0].ends_with("€ 5,00"));
    }

    #[test]
    fn test_outside_code_page_fits_width_when_printed() {
        let lines = vec![
            ReceiptLine::priced("Ĳsje met ĳs", 1, 350),
            ReceiptLine::priced("Łódź pierogi met extra zure room", 2, 1250),
            ReceiptLine::text("寿司 ✓ bestelling ĳs ĳs ĳs ĳs ĳs ĳs"),
        ];
        let rows = format(&lines, 32, false);
        assert_eq!(rows[0], "1x IJsje met ijs          € 3,50");

        for row in &rows {
            let printed = encode_text(row, false);
            assert!(printed.len() <= 32, "{row:?} prints {} columns", printed.len());
        }
        assert_eq!(encode_text(&rows[0], false).len(), 32);
        assert!(encode_text(&rows[1], false).ends_with(b"\x80 25,00"));
    }

    #[test]
    fn test_totals() {
        let totals = ReceiptTotals {
            subtotal_cents: 780,
            vat_breakdown: vec![VatLine {
                rate_percent: 9,
                amount_cents: 70,
            }],
            total_cents: 850,
        };
        let rows = format_totals(&totals, 32, false);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], "Subtotaal                 € 7,80");
        assert_eq!(rows[1], "BTW 9%                    € 0,70");
        assert_eq!(rows[2], "Totaal                    € 8,50");
    }

    #[test]
    fn test_pair_and_helpers() {
        assert_eq!(format_pair("Tafel", "4", 10), "Tafel    4");
        assert_eq!(format_pair("Betaald met", "PIN", 10), "Betaal PIN");
        assert_eq!(center("Bon", 9), "   Bon");
        assert_eq!(center("Cafe de Hoek", 4), "Cafe");
        assert_eq!(truncate("Appeltaart", 5), "Appel");
    }

    #[test]
    fn test_narrow_width_never_overflows() {
        let rows = format(&koffie_appeltaart(), 4, false);
        for row in &rows {
            assert!(text_width(row) <= 4);
        }
    }
}
