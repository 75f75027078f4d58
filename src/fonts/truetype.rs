//! TrueType/OpenType font programs.
//!
//! Wraps `ttf-parser` to answer the two questions the resolver and the
//! auto-fit renderer ask of an external font: can it draw this text, and
//! how wide is the text at a given size.

use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;

use ttf_parser::Face;

use crate::engine::FontMetrics;
use crate::error::Error;

/// Error types for font program parsing.
#[derive(Debug, thiserror::Error)]
pub enum FontProgramError {
    /// Failed to parse font file
    #[error("Failed to parse font program: {0}")]
    ParseError(String),

    /// Font file is empty
    #[error("Font program is empty")]
    EmptyFont,

    /// IO error while reading a font file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<FontProgramError> for Error {
    fn from(err: FontProgramError) -> Self {
        match err {
            FontProgramError::Io(e) => Error::Io(e),
            other => Error::Font(other.to_string()),
        }
    }
}

/// A validated TrueType/OpenType font program.
///
/// The bytes are shared, so clones are cheap and can cross threads.
#[derive(Clone)]
pub struct FontProgram {
    name: String,
    data: Arc<Vec<u8>>,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    cap_height: Option<i16>,
    family_name: Option<String>,
    postscript_name: Option<String>,
    glyph_count: u16,
}

impl fmt::Debug for FontProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontProgram")
            .field("name", &self.name)
            .field("bytes", &self.data.len())
            .field("glyph_count", &self.glyph_count)
            .finish()
    }
}

impl FontProgram {
    /// Parse a font program from raw bytes.
    ///
    /// # Arguments
    /// * `name` - Label used in diagnostics (usually the file name)
    /// * `data` - Raw font file bytes (TTF or OTF)
    pub fn parse(name: impl Into<String>, data: Vec<u8>) -> Result<Self, FontProgramError> {
        if data.is_empty() {
            return Err(FontProgramError::EmptyFont);
        }
        let face = Face::parse(&data, 0).map_err(|e| FontProgramError::ParseError(e.to_string()))?;

        let find_name = |id: u16| {
            face.names()
                .into_iter()
                .find(|n| n.name_id == id)
                .and_then(|n| n.to_string())
        };
        let family_name = find_name(ttf_parser::name_id::FAMILY);
        let postscript_name = find_name(ttf_parser::name_id::POST_SCRIPT_NAME);
        let units_per_em = face.units_per_em();
        let ascender = face.ascender();
        let descender = face.descender();
        let cap_height = face.capital_height();
        let glyph_count = face.number_of_glyphs();

        Ok(Self {
            name: name.into(),
            data: Arc::new(data),
            units_per_em,
            ascender,
            descender,
            cap_height,
            family_name,
            postscript_name,
            glyph_count,
        })
    }

    /// Read and parse a font file. The file name becomes the label.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FontProgramError> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::parse(name, data)
    }

    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, 0).ok()
    }

    /// Label of this program.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Family name from the `name` table.
    pub fn family_name(&self) -> Option<&str> {
        self.family_name.as_deref()
    }

    /// PostScript name from the `name` table.
    pub fn postscript_name(&self) -> Option<&str> {
        self.postscript_name.as_deref()
    }

    /// Raw program bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Size of the program in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Number of glyphs in the program.
    pub fn glyph_count(&self) -> u16 {
        self.glyph_count
    }

    /// Characters of `text` without a glyph. Whitespace and control
    /// characters never count as missing.
    pub fn missing_chars(&self, text: &str) -> Vec<char> {
        let Some(face) = self.face() else {
            return text.chars().filter(|c| !c.is_whitespace()).collect();
        };
        let mut missing: Vec<char> = text
            .chars()
            .filter(|c| !c.is_whitespace() && !c.is_control())
            .filter(|c| face.glyph_index(*c).is_none())
            .collect();
        missing.sort_unstable();
        missing.dedup();
        missing
    }

    /// True when every visible character of `text` has a glyph.
    pub fn covers(&self, text: &str) -> bool {
        self.missing_chars(text).is_empty()
    }

    /// Advance width of a character in 1/1000 em (500 when unmapped).
    pub fn char_width(&self, ch: char) -> f32 {
        self.face()
            .and_then(|face| self.advance(&face, ch))
            .unwrap_or(500.0)
    }

    fn advance(&self, face: &Face<'_>, ch: char) -> Option<f32> {
        let glyph = face.glyph_index(ch)?;
        let advance = face.glyph_hor_advance(glyph)?;
        Some(advance as f32 * 1000.0 / self.units_per_em.max(1) as f32)
    }

    /// Width of `text` in points at `size`.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let Some(face) = self.face() else {
            return text.chars().count() as f32 * 0.5 * size;
        };
        let units: f32 = text
            .chars()
            .map(|c| self.advance(&face, c).unwrap_or(500.0))
            .sum();
        units * size / 1000.0
    }

    /// Vertical metrics as fractions of the em.
    pub fn metrics(&self) -> FontMetrics {
        let upem = self.units_per_em.max(1) as f32;
        let ascender = self.ascender as f32 / upem;
        FontMetrics {
            ascender,
            descender: self.descender as f32 / upem,
            cap_height: self
                .cap_height
                .map(|h| h as f32 / upem)
                .unwrap_or(ascender * 0.9),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_program_rejected() {
        assert!(matches!(
            FontProgram::parse("empty.ttf", Vec::new()),
            Err(FontProgramError::EmptyFont)
        ));
    }

    #[test]
    fn test_garbage_program_rejected() {
        let result = FontProgram::parse("junk.ttf", vec![0x42; 64]);
        assert!(matches!(result, Err(FontProgramError::ParseError(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = FontProgram::from_file("/nonexistent/dir/font.ttf");
        assert!(matches!(result, Err(FontProgramError::Io(_))));
        let err: Error = result.unwrap_err().into();
        assert!(matches!(err, Error::Io(_)));
    }
}
