//! Text encoding utilities for Western thermal printers
//!
//! Printers are driven in code page WPC1252 (`ESC t 16`), one byte and one
//! column per character. This module provides utilities for:
//! - ASCII-safe transliteration for printers without a usable code page
//! - Converting UTF-8 text to WPC1252 bytes
//! - Character-count width, truncation and padding

use tracing::instrument;

/// `ESC t n` value selecting WPC1252
pub const WPC1252_CODE_PAGE: u8 = 16;

/// Replacement for characters with no mapping
pub const REPLACEMENT: char = '?';

/// ASCII replacement for a non-ASCII character, if one exists
///
/// Covers typographic punctuation, the euro sign and Latin accented letters.
pub fn transliterate(c: char) -> Option<&'static str> {
    let s = match c {
        // Currency
        '€' => "EUR",
        '£' => "GBP",

        // Quotes
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => "'",
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => "\"",
        '«' => "<<",
        '»' => ">>",

        // Dashes and ellipsis
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}' | '\u{2212}' => {
            "-"
        }
        '\u{2026}' => "...",

        // Spaces
        '\u{00A0}' | '\u{2007}' | '\u{2009}' | '\u{202F}' => " ",

        // Symbols
        '\u{2022}' | '·' => "*",
        '×' => "x",
        '°' => "o",

        // Latin-1 letters
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => "A",
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'Æ' => "AE",
        'æ' => "ae",
        'Ç' => "C",
        'ç' => "c",
        'È' | 'É' | 'Ê' | 'Ë' => "E",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'Ì' | 'Í' | 'Î' | 'Ï' => "I",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'Ñ' => "N",
        'ñ' => "n",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => "O",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => "o",
        'Ù' | 'Ú' | 'Û' | 'Ü' => "U",
        'ù' | 'ú' | 'û' | 'ü' => "u",
        'Ý' => "Y",
        'ý' | 'ÿ' => "y",
        'ß' => "ss",

        // Latin Extended-A seen on Dutch/French/Central European menus
        'Œ' => "OE",
        'œ' => "oe",
        'Ĳ' => "IJ",
        'ĳ' => "ij",
        'Š' => "S",
        'š' => "s",
        'Ž' => "Z",
        'ž' => "z",
        'Ł' => "L",
        'ł' => "l",
        'Č' => "C",
        'č' => "c",

        _ => return None,
    };
    Some(s)
}

/// Make a string printable on an ASCII-only printer
///
/// ASCII passes through, known characters are transliterated and anything
/// else becomes `?`.
pub fn to_ascii_safe(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii() {
            out.push(c);
        } else if let Some(rep) = transliterate(c) {
            out.push_str(rep);
        } else {
            out.push(REPLACEMENT);
        }
    }
    out
}

/// Whether `c` has a single-byte WPC1252 code
fn in_wpc1252(c: char) -> bool {
    let mut buf = [0u8; 4];
    let (_, _, had_errors) = encoding_rs::WINDOWS_1252.encode(c.encode_utf8(&mut buf));
    !had_errors
}

/// Replace characters outside WPC1252 with what the printer will show
///
/// Same fallbacks as [`encode_wpc1252`], so the character count of the
/// result is the printed width.
pub fn to_wpc1252_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii() || in_wpc1252(c) {
            out.push(c);
        } else if let Some(rep) = transliterate(c) {
            out.push_str(rep);
        } else {
            out.push(REPLACEMENT);
        }
    }
    out
}

/// Convert UTF-8 text to WPC1252 bytes
///
/// Characters outside the code page fall back to their ASCII
/// transliteration, then to `?`.
#[instrument(skip(s), fields(len = s.len()))]
pub fn encode_wpc1252(s: &str) -> Vec<u8> {
    let text = to_wpc1252_text(s);
    let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode(&text);
    bytes.into_owned()
}

/// Encode a text run for the printer
pub fn encode_text(s: &str, ascii_safe: bool) -> Vec<u8> {
    if ascii_safe {
        to_ascii_safe(s).into_bytes()
    } else {
        encode_wpc1252(s)
    }
}

/// Printed width of a string in columns
///
/// Single-byte code page: one column per character.
pub fn text_width(s: &str) -> usize {
    s.chars().count()
}

/// Truncate a string to at most `max_width` columns (no ellipsis)
pub fn truncate_text(s: &str, max_width: usize) -> String {
    s.chars().take(max_width).collect()
}

/// Pad a string to a specific width
///
/// If the string is longer than the width, it will be truncated.
pub fn pad_text(s: &str, width: usize, align_right: bool) -> String {
    let current_width = text_width(s);
    if current_width >= width {
        return truncate_text(s, width);
    }
    let spaces = width - current_width;
    if align_right {
        format!("{}{}", " ".repeat(spaces), s)
    } else {
        format!("{}{}", s, " ".repeat(spaces))
    }
}
