//! Unicode-capable fallback fonts discovered on disk.
//!
//! The set is built once, validated, ranked and then shared read-only
//! (`Arc<FallbackFontSet>`) by every document processed concurrently.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::truetype::FontProgram;
use super::variants::{family_from_stem, stem_has_style};
use super::FontStyle;
use crate::config::FontConfig;

/// Family names that rank a file ahead of unknown fonts.
const PREFERRED_FONT_NAMES: &[&str] = &[
    "DejaVuSans",
    "NotoSans",
    "FreeSans",
    "Arial",
    "Tahoma",
    "Verdana",
    "Calibri",
    "Times New Roman",
    "Segoe UI",
    "Roboto",
    "Open Sans",
    "Source Sans Pro",
    "Ubuntu",
    "Cantarell",
    "PT Sans",
];

/// A validated fallback font file.
#[derive(Debug, Clone)]
pub struct FallbackFont {
    /// Location on disk
    pub path: PathBuf,
    /// Parsed program
    pub program: FontProgram,
}

impl FallbackFont {
    /// File name of the font.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Ranking score of a font file name. Higher is better.
///
/// ```
/// use placeholder_oxide::fonts::score_font_name;
///
/// assert!(score_font_name("DejaVuSans.ttf") > score_font_name("Unknown.ttf"));
/// assert!(score_font_name("NotoSans-Regular.ttf") > score_font_name("NotoSansMono-Bold.ttf"));
/// assert!(score_font_name("NotoColorEmoji.ttf") < 0);
/// ```
pub fn score_font_name(file_name: &str) -> i32 {
    let name = file_name.to_lowercase().replace(' ', "");
    let mut score = 0;
    for preferred in PREFERRED_FONT_NAMES {
        if name.contains(&preferred.to_lowercase().replace(' ', "")) {
            score += 20;
        }
    }
    if ["regular", "book", "normal"].iter().any(|t| name.contains(t)) {
        score += 5;
    }
    if name.contains("emoji") || name.contains("symbol") {
        score -= 10;
    }
    if name.contains("mono") {
        score -= 3;
    }
    score
}

/// Ranked list of Unicode-capable fallback fonts.
#[derive(Debug, Clone, Default)]
pub struct FallbackFontSet {
    fonts: Vec<FallbackFont>,
}

impl FallbackFontSet {
    /// An empty set (only built-in fonts remain as a last resort).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap already-validated fonts, keeping their order.
    pub fn from_fonts(fonts: Vec<FallbackFont>) -> Self {
        Self { fonts }
    }

    /// Scan `dirs` recursively for `.ttf`/`.otf` files, validate and rank them.
    ///
    /// Files that fail to parse are skipped. Files named in
    /// `config.fallback_priority` come first in that order, the rest follow
    /// by [`score_font_name`].
    pub fn discover(dirs: &[PathBuf], config: &FontConfig) -> Self {
        let mut seen = HashSet::new();
        let mut paths = Vec::new();
        for dir in dirs {
            collect_font_files(dir, &mut paths, 0);
        }
        paths.retain(|p| seen.insert(p.clone()));

        let mut fonts: Vec<FallbackFont> = paths
            .into_iter()
            .filter_map(|path| match FontProgram::from_file(&path) {
                Ok(program) => Some(FallbackFont { path, program }),
                Err(e) => {
                    log::debug!("skipping fallback font {}: {}", path.display(), e);
                    None
                },
            })
            .collect();

        let priority: Vec<String> = config
            .fallback_priority
            .iter()
            .map(|n| n.to_lowercase())
            .collect();
        fonts.sort_by_cached_key(|font| {
            let name = font.file_name();
            let rank = priority
                .iter()
                .position(|p| *p == name.to_lowercase())
                .unwrap_or(priority.len());
            (rank, -score_font_name(&name), name)
        });

        log::info!("discovered {} fallback fonts", fonts.len());
        Self { fonts }
    }

    /// Discover fonts in the configured directories plus the platform's
    /// system font directories, shared for concurrent use.
    pub fn shared_default(config: &FontConfig) -> Arc<Self> {
        let mut dirs = config.fallback_dirs.clone();
        dirs.extend(system_font_dirs());
        Arc::new(Self::discover(&dirs, config))
    }

    /// Fonts in priority order.
    pub fn fonts(&self) -> &[FallbackFont] {
        &self.fonts
    }

    /// Number of fonts.
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// True when no fallback font was found.
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// A font of the same family as `base` carrying `style`, preferring the
    /// shortest file stem.
    pub fn style_variant(&self, base: &FallbackFont, style: FontStyle) -> Option<&FallbackFont> {
        if style == FontStyle::Normal {
            return None;
        }
        let family = family_from_stem(&base.stem()).to_lowercase();
        self.fonts
            .iter()
            .filter(|f| f.path != base.path)
            .filter(|f| family_from_stem(&f.stem()).to_lowercase() == family)
            .filter(|f| stem_has_style(&f.stem(), style))
            .min_by_key(|f| f.stem().len())
    }
}

fn collect_font_files(dir: &Path, out: &mut Vec<PathBuf>, depth: usize) {
    // Guard against symlink cycles
    if depth > 8 {
        return;
    }
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    let mut entries: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
    entries.sort();
    for path in entries {
        if path.is_dir() {
            collect_font_files(&path, out, depth + 1);
        } else if path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"))
            .unwrap_or(false)
        {
            out.push(path);
        }
    }
}

/// Platform font directories.
pub fn system_font_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    #[cfg(target_os = "linux")]
    {
        dirs.push(PathBuf::from("/usr/share/fonts"));
        dirs.push(PathBuf::from("/usr/local/share/fonts"));
        if let Some(home) = std::env::var_os("HOME") {
            dirs.push(PathBuf::from(&home).join(".fonts"));
            dirs.push(PathBuf::from(home).join(".local/share/fonts"));
        }
    }
    #[cfg(target_os = "macos")]
    {
        dirs.push(PathBuf::from("/System/Library/Fonts"));
        dirs.push(PathBuf::from("/Library/Fonts"));
        if let Some(home) = std::env::var_os("HOME") {
            dirs.push(PathBuf::from(home).join("Library/Fonts"));
        }
    }
    #[cfg(target_os = "windows")]
    {
        let root = std::env::var_os("WINDIR").unwrap_or_else(|| "C:\\Windows".into());
        dirs.push(PathBuf::from(root).join("Fonts"));
    }
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_ordering() {
        assert_eq!(score_font_name("Roboto-Regular.ttf"), 25);
        assert_eq!(score_font_name("Times New Roman.ttf"), 20);
        assert_eq!(score_font_name("DejaVuSansMono.ttf"), 17);
        assert_eq!(score_font_name("Unknown.ttf"), 0);
        assert_eq!(score_font_name("symbol.ttf"), -10);
    }

    #[test]
    fn test_stem_style_tokens() {
        assert!(stem_has_style("DejaVuSans-BoldOblique", FontStyle::BoldItalic));
        assert!(stem_has_style("OpenSans-SemiBold", FontStyle::Bold));
        assert!(!stem_has_style("OpenSans-SemiBold", FontStyle::Italic));
        assert!(stem_has_style("Roboto-Regular", FontStyle::Normal));
    }

    #[test]
    fn test_discover_skips_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Broken.ttf"), vec![0u8; 64]).unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
        let set = FallbackFontSet::discover(&[dir.path().to_path_buf()], &FontConfig::default());
        assert!(set.is_empty());
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let set = FallbackFontSet::discover(&[PathBuf::from("/no/such/fonts/dir")], &FontConfig::default());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_collect_is_recursive_and_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("Deep.OTF"), b"x").unwrap();
        std::fs::write(dir.path().join("Top.ttf"), b"x").unwrap();
        let mut out = Vec::new();
        collect_font_files(dir.path(), &mut out, 0);
        assert_eq!(out.len(), 2);
    }
}
