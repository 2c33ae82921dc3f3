//! ESC/POS command encoding
//!
//! Print content is described as a list of [`Directive`]s and turned into
//! bytes by a vendor [`Encoder`]. Vendors differ only in a handful of
//! commands (cut, character size, QR); everything else is shared through
//! the [`Dialect`] default methods.

use crate::encoding::{WPC1252_CODE_PAGE, encode_text};
use crate::error::EncodeError;
use shared::models::{CutMode, DrawerPin, Vendor};
use tracing::{debug, warn};

const ESC: u8 = 0x1B;
const GS: u8 = 0x1D;
const LF: u8 = 0x0A;

/// Drawer pulse on/off time (`t1`, `t2`), in 2ms units
const DRAWER_PULSE: u8 = 0x40;

/// Byte-mode capacity of a Model 2 symbol (version 40, error correction M)
pub const QR_MAX_BYTES: usize = 2331;

/// Little-endian `nL nH` for a QR store command
///
/// `extra` counts the function bytes the length field also covers.
fn qr_store_len(data: &[u8], extra: usize) -> Result<[u8; 2], EncodeError> {
    if data.len() > QR_MAX_BYTES {
        return Err(EncodeError::QrDataTooLong {
            len: data.len(),
            max: QR_MAX_BYTES,
        });
    }
    let len = u16::try_from(data.len() + extra).map_err(|_| EncodeError::QrDataTooLong {
        len: data.len(),
        max: QR_MAX_BYTES,
    })?;
    Ok(len.to_le_bytes())
}

/// Text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    fn n(self) -> u8 {
        match self {
            Self::Left => 0x00,
            Self::Center => 0x01,
            Self::Right => 0x02,
        }
    }
}

/// Vendor-neutral print instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `ESC @`, reset printer state
    Initialize,
    /// Select the WPC1252 code page
    SelectCodePage,
    Align(Align),
    Bold(bool),
    Size {
        double_width: bool,
        double_height: bool,
    },
    /// Text without line break
    Text(String),
    /// Text followed by LF
    Line(String),
    /// Full-width rule of `ch`
    Separator { ch: char, width: usize },
    /// Print and feed n lines
    Feed(u8),
    Cut(CutMode),
    KickDrawer(DrawerPin),
    QrCode { data: String, module_size: u8 },
}

/// Per-vendor command set
///
/// Default methods emit standard Epson ESC/POS; vendors override what differs.
pub trait Dialect {
    fn vendor(&self) -> Vendor;

    /// Partial cut; no universal command exists
    fn partial_cut(&self, out: &mut Vec<u8>);

    fn initialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&[ESC, b'@']);
    }

    fn select_code_page(&self, out: &mut Vec<u8>, page: u8) {
        // ESC t n
        out.extend_from_slice(&[ESC, b't', page]);
    }

    fn align(&self, out: &mut Vec<u8>, align: Align) {
        // ESC a n
        out.extend_from_slice(&[ESC, b'a', align.n()]);
    }

    fn bold(&self, out: &mut Vec<u8>, on: bool) {
        // ESC E n
        out.extend_from_slice(&[ESC, b'E', on as u8]);
    }

    fn size(&self, out: &mut Vec<u8>, double_width: bool, double_height: bool) {
        // GS ! n - bits 4-6 width, bits 0-2 height
        let n = ((double_width as u8) << 4) | double_height as u8;
        out.extend_from_slice(&[GS, b'!', n]);
    }

    fn feed(&self, out: &mut Vec<u8>, lines: u8) {
        // ESC d n
        out.extend_from_slice(&[ESC, b'd', lines]);
    }

    fn full_cut(&self, out: &mut Vec<u8>) {
        // GS V 66 0 - feed to cutter position and cut
        out.extend_from_slice(&[GS, b'V', 0x42, 0x00]);
    }

    fn kick_drawer(&self, out: &mut Vec<u8>, pin: DrawerPin) {
        // ESC p m t1 t2
        out.extend_from_slice(&[ESC, b'p', pin.selector(), DRAWER_PULSE, DRAWER_PULSE]);
    }

    fn qr_code(&self, out: &mut Vec<u8>, data: &[u8], module_size: u8) -> Result<(), EncodeError> {
        let size = module_size.clamp(1, 16);
        let [p_l, p_h] = qr_store_len(data, 3)?;

        // Function 165: Select model (Model 2)
        out.extend_from_slice(&[GS, b'(', b'k', 0x04, 0x00, 0x31, 0x41, 0x32, 0x00]);

        // Function 167: Set module size
        out.extend_from_slice(&[GS, b'(', b'k', 0x03, 0x00, 0x31, 0x43, size]);

        // Function 169: Set error correction (M)
        out.extend_from_slice(&[GS, b'(', b'k', 0x03, 0x00, 0x31, 0x45, 0x31]);

        // Function 180: Store data
        out.extend_from_slice(&[GS, b'(', b'k', p_l, p_h, 0x31, 0x50, 0x30]);
        out.extend_from_slice(data);

        // Function 181: Print
        out.extend_from_slice(&[GS, b'(', b'k', 0x03, 0x00, 0x31, 0x51, 0x30]);
        Ok(())
    }
}

/// Printer of unknown make speaking basic ESC/POS
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericEncoder;

impl Dialect for GenericEncoder {
    fn vendor(&self) -> Vendor {
        Vendor::GenericEscpos
    }

    fn partial_cut(&self, out: &mut Vec<u8>) {
        warn!("Partial cut not supported by generic ESC/POS, using full cut");
        self.full_cut(out);
    }
}

/// Epson TM series
#[derive(Debug, Clone, Copy, Default)]
pub struct EpsonEncoder;

impl Dialect for EpsonEncoder {
    fn vendor(&self) -> Vendor {
        Vendor::Epson
    }

    fn partial_cut(&self, out: &mut Vec<u8>) {
        // GS V 65 0
        out.extend_from_slice(&[GS, b'V', 0x41, 0x00]);
    }
}

/// Star Micronics in ESC/POS emulation
#[cfg(feature = "star")]
#[derive(Debug, Clone, Copy, Default)]
pub struct StarEncoder;

#[cfg(feature = "star")]
impl Dialect for StarEncoder {
    fn vendor(&self) -> Vendor {
        Vendor::Star
    }

    fn full_cut(&self, out: &mut Vec<u8>) {
        // ESC i
        out.extend_from_slice(&[ESC, b'i']);
    }

    fn partial_cut(&self, out: &mut Vec<u8>) {
        // ESC m
        out.extend_from_slice(&[ESC, b'm']);
    }

    fn size(&self, out: &mut Vec<u8>, double_width: bool, double_height: bool) {
        // ESC ! n - bit 4 double height, bit 5 double width
        let mut n = 0u8;
        if double_height {
            n |= 0x10;
        }
        if double_width {
            n |= 0x20;
        }
        out.extend_from_slice(&[ESC, b'!', n]);
    }

    fn qr_code(&self, out: &mut Vec<u8>, data: &[u8], module_size: u8) -> Result<(), EncodeError> {
        let size = module_size.clamp(1, 8);
        let [n_l, n_h] = qr_store_len(data, 0)?;

        // ESC GS y S 0 n - model 2
        out.extend_from_slice(&[ESC, GS, b'y', b'S', b'0', 0x02]);
        // ESC GS y S 1 n - error correction M
        out.extend_from_slice(&[ESC, GS, b'y', b'S', b'1', 0x01]);
        // ESC GS y S 2 n - cell size
        out.extend_from_slice(&[ESC, GS, b'y', b'S', b'2', size]);

        // ESC GS y D 1 m nL nH data - store, m=0 auto
        out.extend_from_slice(&[ESC, GS, b'y', b'D', b'1', 0x00, n_l, n_h]);
        out.extend_from_slice(data);

        // ESC GS y P - print
        out.extend_from_slice(&[ESC, GS, b'y', b'P']);
        Ok(())
    }
}

/// Vendor encoder selected once per job
#[derive(Debug, Clone, Copy)]
pub enum Encoder {
    Generic(GenericEncoder),
    Epson(EpsonEncoder),
    #[cfg(feature = "star")]
    Star(StarEncoder),
}

impl Encoder {
    /// Select the encoder for a vendor
    ///
    /// Fails when the vendor's dialect is not compiled into this build.
    pub fn for_vendor(vendor: Vendor) -> Result<Self, EncodeError> {
        match vendor {
            Vendor::GenericEscpos => Ok(Self::Generic(GenericEncoder)),
            Vendor::Epson => Ok(Self::Epson(EpsonEncoder)),
            #[cfg(feature = "star")]
            Vendor::Star => Ok(Self::Star(StarEncoder)),
            #[cfg(not(feature = "star"))]
            Vendor::Star => Err(EncodeError::DriverLibraryMissing(vendor)),
        }
    }

    fn dialect(&self) -> &dyn Dialect {
        match self {
            Self::Generic(d) => d,
            Self::Epson(d) => d,
            #[cfg(feature = "star")]
            Self::Star(d) => d,
        }
    }

    pub fn vendor(&self) -> Vendor {
        self.dialect().vendor()
    }

    /// Encode directives into the printer byte stream
    ///
    /// Fails on content the printer cannot take, e.g. an oversized QR code.
    pub fn encode(&self, directives: &[Directive], ascii_safe: bool) -> Result<Vec<u8>, EncodeError> {
        let dialect = self.dialect();
        let mut out = Vec::with_capacity(4096);

        for directive in directives {
            match directive {
                Directive::Initialize => dialect.initialize(&mut out),
                Directive::SelectCodePage => dialect.select_code_page(&mut out, WPC1252_CODE_PAGE),
                Directive::Align(align) => dialect.align(&mut out, *align),
                Directive::Bold(on) => dialect.bold(&mut out, *on),
                Directive::Size {
                    double_width,
                    double_height,
                } => dialect.size(&mut out, *double_width, *double_height),
                Directive::Text(s) => out.extend_from_slice(&encode_text(s, ascii_safe)),
                Directive::Line(s) => {
                    out.extend_from_slice(&encode_text(s, ascii_safe));
                    out.push(LF);
                }
                Directive::Separator { ch, width } => {
                    let rule: String = std::iter::repeat_n(*ch, *width).collect();
                    out.extend_from_slice(&encode_text(&rule, ascii_safe));
                    out.push(LF);
                }
                Directive::Feed(lines) => dialect.feed(&mut out, *lines),
                Directive::Cut(CutMode::Full) => dialect.full_cut(&mut out),
                Directive::Cut(CutMode::Partial) => dialect.partial_cut(&mut out),
                Directive::Cut(CutMode::None) => {
                    debug!(vendor = %dialect.vendor(), "Cut mode none, no cut emitted");
                }
                Directive::KickDrawer(pin) => dialect.kick_drawer(&mut out, *pin),
                Directive::QrCode { data, module_size } => {
                    dialect.qr_code(&mut out, data.as_bytes(), *module_size)?
                }
            }
        }

        Ok(out)
    }
}

/// Whether this build can encode for `vendor`
pub fn is_supported(vendor: Vendor) -> bool {
    Encoder::for_vendor(vendor).is_ok()
}

/// Encode directives for a vendor
pub fn encode(
    vendor: Vendor,
    directives: &[Directive],
    ascii_safe: bool,
) -> Result<Vec<u8>, EncodeError> {
    Encoder::for_vendor(vendor)?.encode(directives, ascii_safe)
}

/// ESC/POS command builder
///
/// Accumulates directives with a fluent API; vendor bytes are produced by
/// [`EscPosBuilder::build`].
#[derive(Debug, Clone)]
pub struct EscPosBuilder {
    directives: Vec<Directive>,
    width: usize,
}

impl EscPosBuilder {
    /// Create a new builder with the specified paper width in characters
    ///
    /// Common widths:
    /// - 58mm paper: 32 characters
    /// - 80mm paper: 48 characters
    pub fn new(width: usize) -> Self {
        Self {
            directives: vec![Directive::Initialize],
            width,
        }
    }

    /// Get the configured paper width
    pub fn width(&self) -> usize {
        self.width
    }

    fn push(&mut self, directive: Directive) -> &mut Self {
        self.directives.push(directive);
        self
    }

    /// Select WPC1252 (skip for ASCII-safe printers)
    pub fn code_page(&mut self) -> &mut Self {
        self.push(Directive::SelectCodePage)
    }

    // === Text Output ===

    /// Write raw text
    pub fn text(&mut self, s: &str) -> &mut Self {
        self.push(Directive::Text(s.to_string()))
    }

    /// Write text followed by newline
    pub fn line(&mut self, s: &str) -> &mut Self {
        self.push(Directive::Line(s.to_string()))
    }

    /// Write empty line
    pub fn newline(&mut self) -> &mut Self {
        self.push(Directive::Line(String::new()))
    }

    /// Print and feed n lines
    pub fn feed(&mut self, lines: u8) -> &mut Self {
        self.push(Directive::Feed(lines))
    }

    // === Alignment ===

    pub fn center(&mut self) -> &mut Self {
        self.push(Directive::Align(Align::Center))
    }

    pub fn left(&mut self) -> &mut Self {
        self.push(Directive::Align(Align::Left))
    }

    pub fn right(&mut self) -> &mut Self {
        self.push(Directive::Align(Align::Right))
    }

    // === Text Style ===

    pub fn bold(&mut self) -> &mut Self {
        self.push(Directive::Bold(true))
    }

    pub fn bold_off(&mut self) -> &mut Self {
        self.push(Directive::Bold(false))
    }

    /// Double width and height
    pub fn double_size(&mut self) -> &mut Self {
        self.push(Directive::Size {
            double_width: true,
            double_height: true,
        })
    }

    /// Double height only
    pub fn double_height(&mut self) -> &mut Self {
        self.push(Directive::Size {
            double_width: false,
            double_height: true,
        })
    }

    /// Reset to normal size
    pub fn reset_size(&mut self) -> &mut Self {
        self.push(Directive::Size {
            double_width: false,
            double_height: false,
        })
    }

    // === Separators ===

    /// Print a line of '=' characters
    pub fn sep_double(&mut self) -> &mut Self {
        let width = self.width;
        self.push(Directive::Separator { ch: '=', width })
    }

    /// Print a line of '-' characters
    pub fn sep_single(&mut self) -> &mut Self {
        let width = self.width;
        self.push(Directive::Separator { ch: '-', width })
    }

    // === QR Code ===

    /// Print a QR code
    ///
    /// Module size in dots; clamped per vendor.
    pub fn qr_code(&mut self, data: &str, module_size: u8) -> &mut Self {
        self.push(Directive::QrCode {
            data: data.to_string(),
            module_size,
        })
    }

    // === Paper Control ===

    /// Cut paper
    pub fn cut(&mut self, mode: CutMode) -> &mut Self {
        self.push(Directive::Cut(mode))
    }

    /// Pulse the cash drawer
    pub fn open_drawer(&mut self, pin: DrawerPin) -> &mut Self {
        self.push(Directive::KickDrawer(pin))
    }

    /// Feed, optional drawer kick, then cut
    ///
    /// The cut is always the last command of the job so the paper leaves the
    /// printer only after everything else was processed.
    pub fn finish(&mut self, feed_lines: u8, drawer: Option<DrawerPin>, mode: CutMode) -> &mut Self {
        self.feed(feed_lines);
        if let Some(pin) = drawer {
            self.open_drawer(pin);
        }
        self.cut(mode)
    }

    // === Build ===

    /// Accumulated directives
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    pub fn into_directives(self) -> Vec<Directive> {
        self.directives
    }

    /// Encode for a vendor
    pub fn build(&self, vendor: Vendor, ascii_safe: bool) -> Result<Vec<u8>, EncodeError> {
        encode(vendor, &self.directives, ascii_safe)
    }
}

impl Default for EscPosBuilder {
    fn default() -> Self {
        Self::new(48)
    }
}
