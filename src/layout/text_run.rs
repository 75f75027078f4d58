//! Text layout as reported by a document engine.
//!
//! A page is an ordered sequence of [`TextBlock`]s, each an ordered sequence
//! of [`TextLine`]s, each an ordered (left-to-right) sequence of
//! [`TextRun`]s. A run is the smallest unit with uniform font, size and
//! color. The core never mutates a run it has been handed.

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};

/// RGB color representation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel (0.0 - 1.0)
    pub r: f32,
    /// Green channel (0.0 - 1.0)
    pub g: f32,
    /// Blue channel (0.0 - 1.0)
    pub b: f32,
}

impl Color {
    /// Create a new color, clamping each channel into `0.0..=1.0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use placeholder_oxide::layout::Color;
    ///
    /// let red = Color::new(1.0, 0.0, 0.0);
    /// assert_eq!(red.to_rgb8(), [255, 0, 0]);
    /// assert_eq!(Color::new(2.0, -1.0, 0.5).r, 1.0);
    /// ```
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
        }
    }

    /// Create a black color.
    pub fn black() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Create a white color.
    pub fn white() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    /// Create a color from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Convert to 8-bit channels.
    pub fn to_rgb8(&self) -> [u8; 3] {
        let q = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Parse `#rrggbb` (leading `#` optional).
    ///
    /// Returns `None` for anything that is not six hex digits.
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Self::from_rgb8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Format as `#rrggbb`.
    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// A text run: a fragment with uniform font, size and color.
///
/// Runs are reported by the engine; the text of a run is laid out
/// left-to-right across `rect`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// Text content of the run
    pub text: String,
    /// Bounding box of the whole run
    pub rect: Rect,
    /// Font name as recorded by the engine (may carry a subset prefix)
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Fill color of the glyphs
    #[serde(default)]
    pub color: Color,
}

impl TextRun {
    /// Create a new run.
    pub fn new(
        text: impl Into<String>,
        rect: Rect,
        font_name: impl Into<String>,
        font_size: f32,
        color: Color,
    ) -> Self {
        Self {
            text: text.into(),
            rect,
            font_name: font_name.into(),
            font_size,
            color,
        }
    }

    /// Number of characters (not bytes) in the run.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Rectangle of characters `start..end` of this run, assuming every
    /// character takes the same share of the run's width.
    ///
    /// Offsets past the end are clamped. The vertical extent is the run's.
    ///
    /// ```
    /// use placeholder_oxide::geometry::Rect;
    /// use placeholder_oxide::layout::{Color, TextRun};
    ///
    /// let run = TextRun::new("abcd", Rect::new(0.0, 0.0, 40.0, 12.0), "Helvetica", 10.0, Color::black());
    /// assert_eq!(run.span_rect(1, 3), Rect::new(10.0, 0.0, 30.0, 12.0));
    /// ```
    pub fn span_rect(&self, start: usize, end: usize) -> Rect {
        let n = self.char_count().max(1) as f32;
        let start = (start as f32).min(n);
        let end = (end as f32).clamp(start, n);
        let w = self.rect.width();
        Rect::new(
            self.rect.x0 + w * start / n,
            self.rect.y0,
            self.rect.x0 + w * end / n,
            self.rect.y1,
        )
    }
}

/// A line of runs in reading order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    /// Runs, left to right
    pub runs: Vec<TextRun>,
}

impl TextLine {
    /// Create a line from runs.
    pub fn new(runs: Vec<TextRun>) -> Self {
        Self { runs }
    }

    /// Concatenated text of all runs, without separators.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Union of all run rectangles, `None` for an empty line.
    pub fn bbox(&self) -> Option<Rect> {
        self.runs.iter().map(|r| r.rect).reduce(|a, b| a.union(&b))
    }
}

/// A block of lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Lines, top to bottom
    pub lines: Vec<TextLine>,
}

impl TextBlock {
    /// Create a block from lines.
    pub fn new(lines: Vec<TextLine>) -> Self {
        Self { lines }
    }

    /// Union of all line boxes.
    pub fn bbox(&self) -> Option<Rect> {
        self.lines.iter().filter_map(TextLine::bbox).reduce(|a, b| a.union(&b))
    }
}

/// The text layout of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// Page index (0-based)
    pub page: usize,
    /// Page bounds
    pub bounds: Rect,
    /// Blocks in reading order
    pub blocks: Vec<TextBlock>,
}

impl PageLayout {
    /// Iterate over every line on the page.
    pub fn lines(&self) -> impl Iterator<Item = &TextLine> {
        self.blocks.iter().flat_map(|b| b.lines.iter())
    }

    /// Iterate over every run on the page.
    pub fn runs(&self) -> impl Iterator<Item = &TextRun> {
        self.lines().flat_map(|l| l.runs.iter())
    }

    /// True when at least one run carries non-whitespace text.
    pub fn has_text(&self) -> bool {
        self.runs().any(|r| !r.text.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, x0: f32, x1: f32) -> TextRun {
        TextRun::new(text, Rect::new(x0, 0.0, x1, 12.0), "Helvetica", 12.0, Color::black())
    }

    #[test]
    fn test_color_hex_roundtrip() {
        let c = Color::from_hex("#1a2B3c").unwrap();
        assert_eq!(c.to_hex(), "#1a2b3c");
        assert!(Color::from_hex("#12345").is_none());
        assert!(Color::from_hex("zzzzzz").is_none());
        assert!(Color::from_hex("ğğğ").is_none());
    }

    #[test]
    fn test_line_text_and_bbox() {
        let line = TextLine::new(vec![run("Name: {{na", 0.0, 60.0), run("me}}", 60.0, 84.0)]);
        assert_eq!(line.text(), "Name: {{name}}");
        assert_eq!(line.bbox(), Some(Rect::new(0.0, 0.0, 84.0, 12.0)));
        assert_eq!(TextLine::default().bbox(), None);
    }

    #[test]
    fn test_char_count_is_not_byte_count() {
        assert_eq!(run("Özgür", 0.0, 10.0).char_count(), 5);
    }

    #[test]
    fn test_page_has_text() {
        let mut page = PageLayout {
            page: 0,
            bounds: Rect::new(0.0, 0.0, 100.0, 100.0),
            blocks: vec![TextBlock::new(vec![TextLine::new(vec![run("   ", 0.0, 5.0)])])],
        };
        assert!(!page.has_text());
        page.blocks[0].lines[0].runs.push(run("x", 5.0, 10.0));
        assert!(page.has_text());
        assert_eq!(page.runs().count(), 2);
    }
}
