//! Font handling for replacement text.
//!
//! This module provides the built-in generic fonts, TrueType/OpenType
//! program inspection, the subset heuristic, fallback font discovery,
//! style variant lookup and the resolver that picks a drawing font per
//! placeholder.

pub mod base14;
pub mod cache;
pub mod candidate;
pub mod fallback;
pub mod resolver;
pub mod transliterate;
pub mod truetype;
pub mod variants;

pub use base14::{builtin_family_for, builtin_variant_name, BuiltinFont};
pub use cache::{FontCache, FontKey};
pub use candidate::{
    analyze_document_fonts, has_subset_tag, strip_subset_prefix, FontCandidate, FontInventory, FontOrigin,
};
pub use fallback::{score_font_name, system_font_dirs, FallbackFont, FallbackFontSet};
pub use resolver::{first_success, FontRequest, FontResolver, FontStrategy, ResolvedFont};
pub use transliterate::{ascii_fold, needs_unicode, transliterate};
pub use truetype::{FontProgram, FontProgramError};
pub use variants::{family_from_stem, find_style_variant, stem_has_style, variant_names, VariantLookup};

use serde::{Deserialize, Serialize};

/// Font style of replacement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    /// Upright, regular weight
    #[default]
    Normal,
    /// Bold
    Bold,
    /// Italic or oblique
    Italic,
    /// Bold and italic
    BoldItalic,
}

impl FontStyle {
    /// True for bold and bold-italic.
    pub fn is_bold(&self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldItalic)
    }

    /// True for italic and bold-italic.
    pub fn is_italic(&self) -> bool {
        matches!(self, FontStyle::Italic | FontStyle::BoldItalic)
    }

    /// Parse a style name (`bold`, `italic`, `bold_italic`, `bold-italic`,
    /// `bolditalic`); anything else is normal.
    ///
    /// ```
    /// use placeholder_oxide::fonts::FontStyle;
    ///
    /// assert_eq!(FontStyle::parse("Bold-Italic"), FontStyle::BoldItalic);
    /// assert_eq!(FontStyle::parse("oblique"), FontStyle::Italic);
    /// assert_eq!(FontStyle::parse("heavy"), FontStyle::Normal);
    /// ```
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "bold" => FontStyle::Bold,
            "italic" | "oblique" => FontStyle::Italic,
            "bold_italic" | "bolditalic" | "bold_oblique" => FontStyle::BoldItalic,
            _ => FontStyle::Normal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_flags() {
        assert!(FontStyle::BoldItalic.is_bold());
        assert!(FontStyle::BoldItalic.is_italic());
        assert!(!FontStyle::Bold.is_italic());
        assert!(!FontStyle::Normal.is_bold());
    }

    #[test]
    fn test_style_serde_names() {
        assert_eq!(serde_json::to_string(&FontStyle::BoldItalic).unwrap(), "\"bold_italic\"");
        let style: FontStyle = serde_json::from_str("\"italic\"").unwrap();
        assert_eq!(style, FontStyle::Italic);
    }
}
