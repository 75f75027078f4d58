//! Built-in generic fonts (the standard Helvetica/Times/Courier families).
//!
//! Widths are the standard PostScript metrics in units of 1/1000 em for the
//! printable ASCII range. Accented Latin letters are measured as their base
//! letter. Bold-italic and italic Times share the roman widths.

use super::transliterate::ascii_fold;
use super::FontStyle;
use crate::engine::FontMetrics;

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    278, 278, 564, 564, 564, 444, 921,
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,
    722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,
    333, 278, 333, 469, 500, 333,
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,
    500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,
    480, 200, 480, 541,
];

/// Width data.
#[derive(Debug, Clone, Copy)]
enum WidthTable {
    /// Per-character widths for ASCII 32..=126
    Proportional(&'static [u16; 95]),
    /// Fixed advance
    Monospace(u16),
}

/// A built-in generic font with standard metrics.
#[derive(Debug, Clone)]
pub struct BuiltinFont {
    name: &'static str,
    widths: WidthTable,
    /// Ascender in 1/1000 em
    ascender: f32,
    /// Descender in 1/1000 em (negative)
    descender: f32,
    /// Cap height in 1/1000 em
    cap_height: f32,
}

impl BuiltinFont {
    /// Look up a built-in font by its standard name or a short alias
    /// (`helv`, `tiro`, `cour`, ...). Matching ignores case.
    ///
    /// # Examples
    ///
    /// ```
    /// use placeholder_oxide::fonts::BuiltinFont;
    ///
    /// let font = BuiltinFont::by_name("helvetica-bold").unwrap();
    /// assert_eq!(font.name(), "Helvetica-Bold");
    /// assert!(BuiltinFont::by_name("Comic Sans").is_none());
    /// ```
    pub fn by_name(name: &str) -> Option<Self> {
        let canonical = match name.trim().to_ascii_lowercase().as_str() {
            "helvetica" | "helv" => "Helvetica",
            "helvetica-bold" | "hebo" => "Helvetica-Bold",
            "helvetica-oblique" | "heit" => "Helvetica-Oblique",
            "helvetica-boldoblique" | "hebi" => "Helvetica-BoldOblique",
            "times-roman" | "times" | "tiro" => "Times-Roman",
            "times-bold" | "tibo" => "Times-Bold",
            "times-italic" | "tiit" => "Times-Italic",
            "times-bolditalic" | "tibi" => "Times-BoldItalic",
            "courier" | "cour" => "Courier",
            "courier-bold" | "cobo" => "Courier-Bold",
            "courier-oblique" | "coit" => "Courier-Oblique",
            "courier-boldoblique" | "cobi" => "Courier-BoldOblique",
            _ => return None,
        };
        Some(Self::standard(canonical))
    }

    /// Plain Helvetica, the default generic font.
    pub fn helvetica() -> Self {
        Self::standard("Helvetica")
    }

    fn standard(name: &'static str) -> Self {
        let widths = match name {
            "Helvetica" | "Helvetica-Oblique" => WidthTable::Proportional(&HELVETICA_WIDTHS),
            "Helvetica-Bold" | "Helvetica-BoldOblique" => {
                WidthTable::Proportional(&HELVETICA_BOLD_WIDTHS)
            },
            n if n.starts_with("Courier") => WidthTable::Monospace(600),
            _ => WidthTable::Proportional(&TIMES_ROMAN_WIDTHS),
        };
        let (ascender, descender, cap_height) = match name {
            "Helvetica" | "Helvetica-Oblique" | "Helvetica-Bold" | "Helvetica-BoldOblique" => {
                (718.0, -207.0, 718.0)
            },
            "Times-Roman" | "Times-Italic" => (683.0, -217.0, 662.0),
            "Times-Bold" | "Times-BoldItalic" => (676.0, -205.0, 676.0),
            "Courier" | "Courier-Oblique" => (629.0, -157.0, 562.0),
            _ => (626.0, -142.0, 562.0),
        };
        Self {
            name,
            widths,
            ascender,
            descender,
            cap_height,
        }
    }

    /// Standard font name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Width of a character in 1/1000 em.
    pub fn char_width(&self, ch: char) -> f32 {
        match self.widths {
            WidthTable::Monospace(w) => w as f32,
            WidthTable::Proportional(table) => {
                let lookup = |c: char| {
                    let code = c as u32;
                    (32..=126).contains(&code).then(|| table[(code - 32) as usize] as f32)
                };
                lookup(ch)
                    .or_else(|| ascii_fold(ch).and_then(|s| s.chars().next()).and_then(lookup))
                    .unwrap_or(table[('n' as usize) - 32] as f32)
            },
        }
    }

    /// Width of `text` in points at `size`.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: f32 = text.chars().map(|c| self.char_width(c)).sum();
        units * size / 1000.0
    }

    /// True when every character is in the font's single-byte encoding
    /// (printable ASCII, Latin-1 and the common typographic extras).
    pub fn covers(&self, text: &str) -> bool {
        text.chars().all(|c| {
            matches!(c as u32, 0x20..=0x7E | 0xA0..=0xFF)
                || c.is_whitespace()
                || matches!(
                    c,
                    '€' | '‘' | '’' | '‚' | '“' | '”' | '„' | '–' | '—' | '…' | '•' | '™'
                        | 'Œ' | 'œ' | 'Š' | 'š' | 'Ž' | 'ž' | 'Ÿ' | '†' | '‡' | '‰'
                )
        })
    }

    /// Vertical metrics as fractions of the em.
    pub fn metrics(&self) -> FontMetrics {
        FontMetrics {
            ascender: self.ascender / 1000.0,
            descender: self.descender / 1000.0,
            cap_height: self.cap_height / 1000.0,
        }
    }
}

/// Map an arbitrary font name to the closest built-in family.
///
/// ```
/// use placeholder_oxide::fonts::builtin_family_for;
///
/// assert_eq!(builtin_family_for("ABCDEF+TimesNewRomanPSMT"), "Times");
/// assert_eq!(builtin_family_for("Consolas"), "Courier");
/// assert_eq!(builtin_family_for("ArialMT"), "Helvetica");
/// ```
pub fn builtin_family_for(font_name: &str) -> &'static str {
    let lower = font_name.to_lowercase();
    if lower.contains("times")
        || lower.contains("georgia")
        || lower.contains("garamond")
        || (lower.contains("serif") && !lower.contains("sans"))
    {
        "Times"
    } else if lower.contains("courier")
        || lower.contains("mono")
        || lower.contains("consolas")
        || lower.contains("monaco")
    {
        "Courier"
    } else {
        "Helvetica"
    }
}

/// Standard name of a built-in family's style variant.
///
/// ```
/// use placeholder_oxide::fonts::{builtin_variant_name, FontStyle};
///
/// assert_eq!(builtin_variant_name("Helvetica", FontStyle::BoldItalic), "Helvetica-BoldOblique");
/// assert_eq!(builtin_variant_name("Times", FontStyle::Normal), "Times-Roman");
/// ```
pub fn builtin_variant_name(family: &str, style: FontStyle) -> &'static str {
    match builtin_family_for(family) {
        "Times" => match style {
            FontStyle::Normal => "Times-Roman",
            FontStyle::Bold => "Times-Bold",
            FontStyle::Italic => "Times-Italic",
            FontStyle::BoldItalic => "Times-BoldItalic",
        },
        "Courier" => match style {
            FontStyle::Normal => "Courier",
            FontStyle::Bold => "Courier-Bold",
            FontStyle::Italic => "Courier-Oblique",
            FontStyle::BoldItalic => "Courier-BoldOblique",
        },
        _ => match style {
            FontStyle::Normal => "Helvetica",
            FontStyle::Bold => "Helvetica-Bold",
            FontStyle::Italic => "Helvetica-Oblique",
            FontStyle::BoldItalic => "Helvetica-BoldOblique",
        },
    }
}
