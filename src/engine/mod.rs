//! The document engine seam.
//!
//! Detection, erasure and filling never touch a document format directly.
//! They talk to a [`DocumentEngine`]: something that can report a page's
//! text layout, search it, paint and redact regions, rasterize for colour
//! sampling, and install and measure fonts.
//!
//! [`MemoryDocument`] is a complete in-process engine used by the
//! command-line tool and the test suite.
//!
//! Coordinates are page units with the origin at the top-left corner and
//! `y` growing downwards.

pub mod memory;
pub mod snapshot;

pub use memory::MemoryDocument;
pub use snapshot::LayoutSnapshot;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fonts::FontStyle;
use crate::geometry::{Point, Rect};
use crate::layout::{Color, PageLayout};

/// Process-unique id of an open document.
pub type DocumentId = u64;

/// Id of a font in a document's font table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FontId(pub u32);

/// Drawing handle of a font installed in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontHandle(pub u32);

/// One entry of a page's font table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontRecord {
    /// Font id
    pub id: FontId,
    /// Name as recorded in the document (may carry a subset tag)
    pub name: String,
    /// Base font name
    pub base_name: String,
}

/// Format of a font program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontExtension {
    /// TrueType
    Ttf,
    /// OpenType
    Otf,
    /// Anything else (Type 1, CFF, unknown)
    Unknown,
}

impl FontExtension {
    /// Parse a file extension, with or without the leading dot.
    ///
    /// ```
    /// use placeholder_oxide::engine::FontExtension;
    ///
    /// assert_eq!(FontExtension::from_extension(".TTF"), FontExtension::Ttf);
    /// assert_eq!(FontExtension::from_extension("otf"), FontExtension::Otf);
    /// assert_eq!(FontExtension::from_extension("pfb"), FontExtension::Unknown);
    /// ```
    pub fn from_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "ttf" => FontExtension::Ttf,
            "otf" => FontExtension::Otf,
            _ => FontExtension::Unknown,
        }
    }

    /// Format of a font file by its extension.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .map(|e| Self::from_extension(&e.to_string_lossy()))
            .unwrap_or(FontExtension::Unknown)
    }

    /// True for TrueType/OpenType outline programs.
    pub fn is_outline(&self) -> bool {
        matches!(self, FontExtension::Ttf | FontExtension::Otf)
    }
}

/// An extracted font program.
#[derive(Debug, Clone, PartialEq)]
pub struct FontPayload {
    /// Program format
    pub extension: FontExtension,
    /// Raw program bytes (empty when the font is not embedded)
    pub bytes: Vec<u8>,
}

/// Font data to install in a document.
#[derive(Debug, Clone, Copy)]
pub enum FontSource<'a> {
    /// An in-memory program
    Bytes {
        /// Label for the installed font
        name: &'a str,
        /// Program bytes
        data: &'a [u8],
    },
    /// A font file on disk
    Path(&'a Path),
}

/// Vertical font metrics as fractions of the em.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    /// Ascender (positive)
    pub ascender: f32,
    /// Descender (negative)
    pub descender: f32,
    /// Capital letter height
    pub cap_height: f32,
}

impl FontMetrics {
    /// Distance from ascender to descender.
    pub fn extent(&self) -> f32 {
        self.ascender - self.descender
    }
}

/// Horizontal alignment of drawn text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush left
    #[default]
    Left,
    /// Centered
    Center,
    /// Flush right
    Right,
}

/// Everything needed to draw a string.
#[derive(Debug, Clone, Copy)]
pub struct DrawSpec<'a> {
    /// Text to draw
    pub text: &'a str,
    /// Installed font
    pub font: FontHandle,
    /// Font size in points
    pub size: f32,
    /// Fill colour
    pub color: Color,
    /// Horizontal alignment
    pub align: TextAlign,
    /// Style the engine should simulate when the font lacks it
    pub synthetic: FontStyle,
}

/// Result of a box draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawOutcome {
    /// Some text did not fit the rectangle
    pub overflow: bool,
}

/// One laid-out line of a text box.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutLine {
    /// Line content
    pub text: String,
    /// Measured width in points
    pub width: f32,
}

/// Off-page layout of text inside a rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBoxLayout {
    /// Lines that fit, top to bottom
    pub lines: Vec<LaidOutLine>,
    /// Line advance in points
    pub line_height: f32,
    /// Some text was left over
    pub overflow: bool,
}

/// RGB samples of a rasterized region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PixelSamples {
    /// Columns
    pub width: usize,
    /// Rows
    pub height: usize,
    /// Packed RGB bytes, row-major
    pub rgb: Vec<u8>,
}

impl PixelSamples {
    /// Number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.rgb.len() / 3
    }

    /// Per-channel mean colour, `None` when there are no pixels.
    pub fn average(&self) -> Option<Color> {
        let n = self.pixel_count();
        if n == 0 {
            return None;
        }
        let mut sums = [0u64; 3];
        for px in self.rgb.chunks_exact(3) {
            for (sum, v) in sums.iter_mut().zip(px) {
                *sum += *v as u64;
            }
        }
        let mean = |s: u64| (s as f64 / n as f64).round() as u8;
        Some(Color::from_rgb8(mean(sums[0]), mean(sums[1]), mean(sums[2])))
    }
}

/// A FreeText annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnnotation {
    /// Annotation rectangle
    pub rect: Rect,
    /// Annotation text
    pub contents: String,
}

/// A text form field widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    /// Field name
    pub name: String,
    /// Widget rectangle
    pub rect: Rect,
    /// Current value
    pub value: String,
}

/// Operations the pipeline needs from a document.
///
/// Page indices are 0-based; out-of-range pages fail with
/// [`Error::PageOutOfRange`](crate::error::Error::PageOutOfRange).
pub trait DocumentEngine {
    /// Process-unique id of this document.
    fn document_id(&self) -> DocumentId;

    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Page rectangle.
    fn page_bounds(&self, page: usize) -> Result<Rect>;

    /// Text layout of a page.
    fn page_layout(&self, page: usize) -> Result<PageLayout>;

    /// Rectangles of every occurrence of `needle` on a page.
    fn search_literal(&self, page: usize, needle: &str) -> Result<Vec<Rect>>;

    /// Paint an opaque rectangle.
    fn paint_rect(&mut self, page: usize, rect: Rect, color: Color) -> Result<()>;

    /// Queue a redaction. Nothing changes until [`apply_redactions`](Self::apply_redactions).
    fn queue_redaction(&mut self, page: usize, rect: Rect) -> Result<()>;

    /// Apply every queued redaction of a page, removing the text underneath
    /// while keeping paint. Returns the number of redactions applied.
    fn apply_redactions(&mut self, page: usize) -> Result<usize>;

    /// Rasterize a region for colour sampling.
    fn rasterize(&self, page: usize, rect: Rect) -> Result<PixelSamples>;

    /// Font table of a page.
    fn list_fonts(&self, page: usize) -> Result<Vec<FontRecord>>;

    /// Program of a font in the font table.
    fn extract_font(&self, id: FontId) -> Result<FontPayload>;

    /// Install a font program and return its drawing handle.
    fn embed_font(&mut self, source: FontSource<'_>) -> Result<FontHandle>;

    /// Handle of a built-in generic font by standard name.
    fn builtin_font(&mut self, name: &str) -> Result<FontHandle>;

    /// Vertical metrics of an installed font.
    fn font_metrics(&self, font: FontHandle) -> Result<FontMetrics>;

    /// True when the font has a glyph for every visible character of `text`.
    fn covers_text(&self, font: FontHandle, text: &str) -> Result<bool>;

    /// Rendered width of `text`.
    fn measure_width(&self, text: &str, font: FontHandle, size: f32) -> Result<f32>;

    /// Lay text out inside `rect` without touching any page.
    fn layout_text_box(&self, rect: Rect, spec: &DrawSpec<'_>) -> Result<TextBoxLayout>;

    /// Draw wrapped text inside `rect`. Background is not painted.
    fn draw_text_in_rect(&mut self, page: usize, rect: Rect, spec: &DrawSpec<'_>) -> Result<DrawOutcome>;

    /// Draw one line of text with its baseline starting at `origin`.
    fn draw_text_at(&mut self, page: usize, origin: Point, spec: &DrawSpec<'_>) -> Result<()>;

    /// FreeText annotations of a page.
    fn text_annotations(&self, _page: usize) -> Result<Vec<TextAnnotation>> {
        Ok(Vec::new())
    }

    /// Text form fields of a page.
    fn form_fields(&self, _page: usize) -> Result<Vec<FormField>> {
        Ok(Vec::new())
    }

    /// True when at least one page carries text.
    fn has_text_layer(&self) -> Result<bool> {
        for page in 0..self.page_count() {
            if self.page_layout(page)?.has_text() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
