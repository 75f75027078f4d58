//! Style variant lookup among sibling font files.
//!
//! `DejaVuSans.ttf` with a bold request looks for `DejaVuSans-Bold.ttf`,
//! `DejaVuSans_Bold.ttf`, `DejaVuSans SemiBold.otf`, ... in the same
//! directory.

use std::path::{Path, PathBuf};

use super::FontStyle;

/// Style tokens stripped from a file stem to recover the family, longest first.
const STYLE_TOKENS: &[&str] = &[
    "SemiBoldItalic",
    "MediumItalic",
    "BoldOblique",
    "Bold-Italic",
    "BoldItalic",
    "SemiBold",
    "Regular",
    "Oblique",
    "Italic",
    "Medium",
    "Light",
    "Black",
    "Bold",
    "Book",
];

const SEPARATORS: [char; 3] = ['-', '_', ' '];
const EXTENSIONS: [&str; 4] = ["ttf", "otf", "TTF", "OTF"];

/// Family part of a font file stem.
///
/// ```
/// use placeholder_oxide::fonts::family_from_stem;
///
/// assert_eq!(family_from_stem("OpenSans-SemiBold"), "OpenSans");
/// assert_eq!(family_from_stem("DejaVuSans-BoldOblique"), "DejaVuSans");
/// assert_eq!(family_from_stem("Noto Sans Regular"), "Noto Sans");
/// assert_eq!(family_from_stem("FreeSans"), "FreeSans");
/// ```
pub fn family_from_stem(stem: &str) -> String {
    let mut family = stem.trim().to_string();
    loop {
        let lower = family.to_lowercase();
        let stripped = STYLE_TOKENS.iter().find_map(|token| {
            let token = token.to_lowercase();
            SEPARATORS.iter().find_map(|sep| {
                let suffix = format!("{}{}", sep, token);
                lower
                    .ends_with(&suffix)
                    .then(|| family[..family.len() - suffix.len()].to_string())
            })
        });
        match stripped {
            Some(s) if !s.is_empty() => family = s,
            _ => return family,
        }
    }
}

fn names_for(family: &str, tokens: &[&str], glued: &str) -> Vec<String> {
    let mut names = Vec::new();
    for token in tokens {
        for sep in SEPARATORS {
            names.push(format!("{}{}{}", family, sep, token));
        }
    }
    names.push(format!("{}{}", family, glued));
    names
}

/// Candidate file stems for `family` in `style`, in preference order.
///
/// A bold-italic request falls back to bold names, then italic names.
pub fn variant_names(family: &str, style: FontStyle) -> Vec<String> {
    let family = family.trim();
    match style {
        FontStyle::Normal => vec![family.to_string()],
        FontStyle::Bold => names_for(family, &["Bold", "SemiBold", "Medium"], "Bold"),
        FontStyle::Italic => names_for(family, &["Italic", "Oblique"], "Italic"),
        FontStyle::BoldItalic => {
            let mut names = names_for(
                family,
                &["BoldItalic", "Bold-Italic", "BoldOblique", "SemiBoldItalic", "MediumItalic"],
                "BoldItalic",
            );
            names.extend(variant_names(family, FontStyle::Bold));
            names.extend(variant_names(family, FontStyle::Italic));
            names
        },
    }
}

/// Whether a file stem names exactly `style` (`Regular` and untagged stems are normal).
///
/// ```
/// use placeholder_oxide::fonts::{stem_has_style, FontStyle};
///
/// assert!(stem_has_style("DejaVuSans-Bold", FontStyle::Bold));
/// assert!(!stem_has_style("DejaVuSans-BoldOblique", FontStyle::Bold));
/// ```
pub fn stem_has_style(stem: &str, style: FontStyle) -> bool {
    let s = stem.to_lowercase();
    let bold = s.contains("bold") || s.contains("semibold") || s.contains("medium");
    let italic = s.contains("italic") || s.contains("oblique");
    match style {
        FontStyle::Normal => !bold && !italic,
        FontStyle::Bold => bold && !italic,
        FontStyle::Italic => italic && !bold,
        FontStyle::BoldItalic => bold && italic,
    }
}

/// Outcome of a sibling variant search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantLookup {
    /// The variant file found, if any
    pub path: Option<PathBuf>,
    /// Every path examined, in order
    pub tried: Vec<PathBuf>,
}

/// Look for a sibling of `base` that carries `style`.
///
/// Files of `min_bytes` or less are ignored. A normal style, or a `base`
/// whose stem already carries `style`, returns `base` itself without
/// touching the file system.
pub fn find_style_variant(base: &Path, style: FontStyle, min_bytes: u64) -> VariantLookup {
    let already_styled = base
        .file_stem()
        .is_some_and(|stem| stem_has_style(&stem.to_string_lossy(), style));
    if style == FontStyle::Normal || already_styled {
        return VariantLookup {
            path: Some(base.to_path_buf()),
            tried: Vec::new(),
        };
    }
    let mut lookup = VariantLookup::default();
    let Some(stem) = base.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
        return lookup;
    };
    let dir = base.parent().unwrap_or_else(|| Path::new("."));
    let family = family_from_stem(&stem);

    for name in variant_names(&family, style) {
        for ext in EXTENSIONS {
            let candidate = dir.join(format!("{}.{}", name, ext));
            if lookup.tried.contains(&candidate) {
                continue;
            }
            lookup.tried.push(candidate.clone());
            let big_enough = std::fs::metadata(&candidate)
                .map(|m| m.is_file() && m.len() > min_bytes)
                .unwrap_or(false);
            if big_enough && candidate != base {
                log::debug!("style variant {:?} -> {}", style, candidate.display());
                lookup.path = Some(candidate);
                return lookup;
            }
        }
    }
    lookup
}
