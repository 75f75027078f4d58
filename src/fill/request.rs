//! Fill requests: replacement values and rendering options.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::detect::{fold_key, PlaceholderHit};
use crate::engine::TextAlign;
use crate::fonts::FontStyle;
use crate::layout::Color;

/// How the font size is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeMode {
    /// Start from a fraction of the rectangle height and shrink to fit
    #[default]
    Auto,
    /// Exactly this size, no measuring
    Fixed(f32),
    /// Auto-fit, then clamp into the range
    Range {
        /// Smallest size
        min: f32,
        /// Largest size
        max: f32,
    },
}

/// How text is fitted into the rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    /// One line, shrunk until its width fits
    #[default]
    SingleLine,
    /// Word-wrapped, largest size with no leftover text
    Box,
}

/// Whether placeholders are erased before drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EraseMode {
    /// Paint over and redact
    #[default]
    Redact,
    /// Draw over the untouched page
    None,
}

/// Per-key rendering overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyOptions {
    /// Size override
    pub size: Option<SizeMode>,
    /// Fit mode override
    pub fit: Option<FitMode>,
    /// Style override
    pub style: Option<FontStyle>,
    /// Alignment override
    pub align: Option<TextAlign>,
    /// Colour override
    pub color: Option<Color>,
    /// Manual horizontal shift in points
    pub offset_x: f32,
    /// Manual vertical shift in points
    pub offset_y: f32,
}

/// Values and options for a fill pass.
///
/// ```
/// use placeholder_oxide::fill::{FillRequest, FitMode, SizeMode};
///
/// let request = FillRequest::new()
///     .with_value("Name", "Özgür")
///     .with_size(SizeMode::Range { min: 8.0, max: 14.0 })
///     .with_fit(FitMode::Box);
/// assert_eq!(request.values.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillRequest {
    /// Replacement values by key or instance label (`key_N`)
    pub values: IndexMap<String, String>,
    /// Global size mode
    pub size: SizeMode,
    /// Global fit mode
    pub fit: FitMode,
    /// Global style
    pub style: FontStyle,
    /// Global alignment
    pub align: TextAlign,
    /// Global colour (else the placeholder's own colour, else black)
    pub color: Option<Color>,
    /// Expand the rectangle before fitting
    pub allow_overflow: bool,
    /// Erase before drawing
    pub erase: EraseMode,
    /// Caller-supplied font file
    pub font_override: Option<PathBuf>,
    /// Per-key overrides by key or instance label
    pub key_options: IndexMap<String, KeyOptions>,
}

impl FillRequest {
    /// Empty request with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request from a value map.
    pub fn from_values<K: Into<String>, V: Into<String>>(values: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            values: values.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            ..Self::default()
        }
    }

    /// Add a value.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Set the global size mode.
    pub fn with_size(mut self, size: SizeMode) -> Self {
        self.size = size;
        self
    }

    /// Set the global fit mode.
    pub fn with_fit(mut self, fit: FitMode) -> Self {
        self.fit = fit;
        self
    }

    /// Set the global style.
    pub fn with_style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the global alignment.
    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    /// Set the global colour.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Allow the rectangle to grow before fitting.
    pub fn with_overflow(mut self, allow: bool) -> Self {
        self.allow_overflow = allow;
        self
    }

    /// Set the erase mode.
    pub fn with_erase_mode(mut self, erase: EraseMode) -> Self {
        self.erase = erase;
        self
    }

    /// Use a caller font file.
    pub fn with_font_override(mut self, path: impl AsRef<Path>) -> Self {
        self.font_override = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set overrides for one key or instance label.
    pub fn with_key_options(mut self, key: impl Into<String>, options: KeyOptions) -> Self {
        self.key_options.insert(key.into(), options);
        self
    }

    /// Values with folded keys and repaired text.
    pub fn normalized_values(&self) -> IndexMap<String, String> {
        normalize_mapping(&self.values)
    }

    /// Overrides for `hit`: instance label first, then the plain key.
    pub fn options_for(&self, hit: &PlaceholderHit) -> KeyOptions {
        let options: IndexMap<String, &KeyOptions> =
            self.key_options.iter().map(|(k, v)| (fold_key(k), v)).collect();
        options
            .get(&hit.instance_label())
            .or_else(|| options.get(&hit.lookup_key()))
            .map(|o| (*o).clone())
            .unwrap_or_default()
    }
}

/// Settings for one hit after applying per-key overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveOptions {
    /// Size mode
    pub size: SizeMode,
    /// Fit mode
    pub fit: FitMode,
    /// Style
    pub style: FontStyle,
    /// Alignment
    pub align: TextAlign,
    /// Colour
    pub color: Color,
    /// Manual horizontal shift
    pub offset_x: f32,
    /// Manual vertical shift
    pub offset_y: f32,
}

impl EffectiveOptions {
    /// Resolve the options for `hit`.
    pub fn for_hit(request: &FillRequest, hit: &PlaceholderHit) -> Self {
        let key = request.options_for(hit);
        Self {
            size: key.size.unwrap_or(request.size),
            fit: key.fit.unwrap_or(request.fit),
            style: key.style.unwrap_or(request.style),
            align: key.align.unwrap_or(request.align),
            color: key
                .color
                .or(request.color)
                .or(hit.source_color)
                .unwrap_or_else(Color::black),
            offset_x: key.offset_x,
            offset_y: key.offset_y,
        }
    }
}

/// Trim and fold keys, drop empty keys, repair values.
///
/// A later key folding onto an earlier one replaces its value.
///
/// ```
/// use indexmap::IndexMap;
/// use placeholder_oxide::fill::normalize_mapping;
///
/// let mut raw = IndexMap::new();
/// raw.insert(" City ".to_string(), "Ä°stanbul".to_string());
/// raw.insert("  ".to_string(), "dropped".to_string());
/// let values = normalize_mapping(&raw);
/// assert_eq!(values.get("city").map(String::as_str), Some("İstanbul"));
/// assert_eq!(values.len(), 1);
/// ```
pub fn normalize_mapping(values: &IndexMap<String, String>) -> IndexMap<String, String> {
    let mut out = IndexMap::with_capacity(values.len());
    for (key, value) in values {
        let key = fold_key(key);
        if key.is_empty() {
            continue;
        }
        out.insert(key, repair_mojibake(value));
    }
    out
}

/// UTF-8 Turkish text that was decoded as Latin-1 / Windows-1252, longest
/// sequences first.
const MOJIBAKE: &[(&str, &str)] = &[
    ("Ã„ÂŸ", "ğ"),
    ("Ã„Â±", "ı"),
    ("Ã…Å¸", "ş"),
    ("Ã…Åž", "Ş"),
    ("Ã„Å¾", "Ğ"),
    ("ÄŸ", "ğ"),
    ("Äž", "Ğ"),
    ("Ä±", "ı"),
    ("Ä°", "İ"),
    ("ÅŸ", "ş"),
    ("Åž", "Ş"),
    ("Ã§", "ç"),
    ("Ã‡", "Ç"),
    ("Ã¼", "ü"),
    ("Ãœ", "Ü"),
    ("Ã¶", "ö"),
    ("Ã–", "Ö"),
];

/// Base letter plus combining mark, composed.
const COMPOSE: &[(&str, &str)] = &[
    ("c\u{327}", "ç"),
    ("C\u{327}", "Ç"),
    ("s\u{327}", "ş"),
    ("S\u{327}", "Ş"),
    ("g\u{306}", "ğ"),
    ("G\u{306}", "Ğ"),
    ("o\u{308}", "ö"),
    ("O\u{308}", "Ö"),
    ("u\u{308}", "ü"),
    ("U\u{308}", "Ü"),
    ("I\u{307}", "İ"),
];

/// Repair Turkish mojibake and compose decomposed Turkish letters.
///
/// ```
/// use placeholder_oxide::fill::repair_mojibake;
///
/// assert_eq!(repair_mojibake("Ã–zgÃ¼r"), "Özgür");
/// assert_eq!(repair_mojibake("Özgür"), "Özgür");
/// ```
pub fn repair_mojibake(text: &str) -> String {
    let mut text = reinterpret_latin1(text).unwrap_or_else(|| text.to_string());
    for _ in 0..3 {
        let before = text.clone();
        for (wrong, right) in MOJIBAKE {
            if text.contains(wrong) {
                text = text.replace(wrong, right);
            }
        }
        if text == before {
            break;
        }
    }
    for (decomposed, composed) in COMPOSE {
        if text.contains(decomposed) {
            text = text.replace(decomposed, composed);
        }
    }
    text
}

/// Undo a whole-string Latin-1 misdecode, when every char is Latin-1 and
/// the bytes form valid UTF-8.
fn reinterpret_latin1(text: &str) -> Option<String> {
    if !text.contains(['Ã', 'Ä', 'Å']) {
        return None;
    }
    let bytes: Option<Vec<u8>> = text.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect();
    String::from_utf8(bytes?).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::HitSource;
    use crate::geometry::Rect;
    use crate::pattern::PatternFamily;

    fn hit(key: &str, occurrence: usize, occurrences: usize) -> PlaceholderHit {
        PlaceholderHit {
            key: key.to_string(),
            raw_text: format!("{{{{{}}}}}", key),
            rect: Rect::new(0.0, 0.0, 50.0, 12.0),
            page: 0,
            source_font: None,
            source_size: None,
            source_color: Some(Color::from_rgb8(0, 0, 128)),
            source: HitSource::TextLayer,
            family: PatternFamily::DoubleBrace,
            context: String::new(),
            occurrence,
            occurrences,
        }
    }

    #[test]
    fn test_mojibake_table() {
        assert_eq!(repair_mojibake("ÅžiÅŸli"), "Şişli");
        assert_eq!(repair_mojibake("Ä°zmir"), "İzmir");
        assert_eq!(repair_mojibake("Ã‡aÄŸrÄ±"), "Çağrı");
    }

    #[test]
    fn test_latin1_reinterpretation() {
        // "Göç" encoded as UTF-8, read back as Latin-1
        let garbled: String = "Göç".bytes().map(char::from).collect();
        assert_eq!(repair_mojibake(&garbled), "Göç");
    }

    #[test]
    fn test_plain_scandinavian_text_untouched() {
        assert_eq!(repair_mojibake("Ångström"), "Ångström");
    }

    #[test]
    fn test_decomposed_letters_compose() {
        assert_eq!(repair_mojibake("Gu\u{308}l"), "Gül");
    }

    #[test]
    fn test_instance_options_override_key_options() {
        let request = FillRequest::new()
            .with_align(TextAlign::Right)
            .with_key_options(
                "Date",
                KeyOptions {
                    style: Some(FontStyle::Bold),
                    ..KeyOptions::default()
                },
            )
            .with_key_options(
                "date_2",
                KeyOptions {
                    style: Some(FontStyle::Italic),
                    offset_x: 3.0,
                    ..KeyOptions::default()
                },
            );

        let first = EffectiveOptions::for_hit(&request, &hit("date", 1, 2));
        assert_eq!(first.style, FontStyle::Bold);
        assert_eq!(first.align, TextAlign::Right);
        assert_eq!(first.color, Color::from_rgb8(0, 0, 128));

        let second = EffectiveOptions::for_hit(&request, &hit("date", 2, 2));
        assert_eq!(second.style, FontStyle::Italic);
        assert_eq!(second.offset_x, 3.0);
    }

    #[test]
    fn test_colour_precedence() {
        let request = FillRequest::new().with_color(Color::from_rgb8(200, 0, 0));
        assert_eq!(EffectiveOptions::for_hit(&request, &hit("a", 1, 1)).color, Color::from_rgb8(200, 0, 0));

        let mut plain = hit("a", 1, 1);
        plain.source_color = None;
        assert_eq!(EffectiveOptions::for_hit(&FillRequest::new(), &plain).color, Color::black());
    }

    #[test]
    fn test_request_from_json() {
        let json = r#"{
            "values": {"name": "Ada"},
            "size": {"range": {"min": 8.0, "max": 12.0}},
            "fit": "box",
            "key_options": {"name": {"align": "center"}}
        }"#;
        let request: FillRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.size, SizeMode::Range { min: 8.0, max: 12.0 });
        assert_eq!(request.fit, FitMode::Box);
        assert_eq!(request.erase, EraseMode::Redact);
        assert_eq!(request.key_options["name"].align, Some(TextAlign::Center));
    }
}
