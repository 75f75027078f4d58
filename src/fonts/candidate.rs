//! Font candidates and the subset heuristic.
//!
//! A subset font embedded for the original text of a document only carries
//! the glyphs that text used, so it cannot be trusted with replacement text.
//! Two signals mark a subset: the `ABCDEF+Name` tag prefix and a payload too
//! small to hold a full character set.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::FontConfig;
use crate::engine::{DocumentEngine, FontExtension, FontId, FontPayload, FontRecord};
use crate::error::Result;

/// Where a font candidate comes from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FontOrigin {
    /// A font file on disk
    File(PathBuf),
    /// A font embedded in the document
    Embedded {
        /// Page whose font table lists the font
        page: usize,
        /// Engine font id
        id: FontId,
        /// Recorded font name
        name: String,
    },
    /// A built-in generic font
    Builtin(String),
}

/// A font that could be used to draw replacement text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontCandidate {
    /// Where the font comes from
    pub origin: FontOrigin,
    /// Font program is embedded in the document
    pub is_embedded: bool,
    /// Program size in bytes (0 when unknown)
    pub byte_size: u64,
    /// Program format
    pub extension: FontExtension,
    /// Subset heuristic verdict
    pub looks_like_subset: bool,
}

impl FontCandidate {
    /// Candidate for an embedded font and its extracted payload.
    pub fn from_embedded(
        page: usize,
        record: &FontRecord,
        payload: &FontPayload,
        subset_min_bytes: u64,
    ) -> Self {
        let byte_size = payload.bytes.len() as u64;
        Self {
            origin: FontOrigin::Embedded {
                page,
                id: record.id,
                name: record.name.clone(),
            },
            is_embedded: true,
            byte_size,
            extension: payload.extension,
            looks_like_subset: has_subset_tag(&record.name)
                || has_subset_tag(&record.base_name)
                || byte_size < subset_min_bytes,
        }
    }

    /// Candidate for a font file on disk.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let byte_size = std::fs::metadata(path)?.len();
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        Ok(Self {
            origin: FontOrigin::File(path.to_path_buf()),
            is_embedded: false,
            byte_size,
            extension: FontExtension::from_path(path),
            looks_like_subset: has_subset_tag(&name),
        })
    }

    /// Candidate for a font the document references but does not embed.
    pub fn unembedded(page: usize, record: &FontRecord) -> Self {
        Self {
            origin: FontOrigin::Embedded {
                page,
                id: record.id,
                name: record.name.clone(),
            },
            is_embedded: false,
            byte_size: 0,
            extension: FontExtension::Unknown,
            looks_like_subset: has_subset_tag(&record.name),
        }
    }

    /// True for a full TrueType/OpenType program.
    pub fn is_usable(&self) -> bool {
        self.extension.is_outline() && !self.looks_like_subset
    }

    /// Human-readable label for diagnostics.
    pub fn label(&self) -> String {
        match &self.origin {
            FontOrigin::File(path) => path.display().to_string(),
            FontOrigin::Embedded { name, id, .. } => format!("embedded:{}#{}", name, id.0),
            FontOrigin::Builtin(name) => format!("builtin:{}", name),
        }
    }
}

/// True when `name` starts with a 5-7 letter upper-case subset tag and `+`.
///
/// ```
/// use placeholder_oxide::fonts::has_subset_tag;
///
/// assert!(has_subset_tag("ABCDEF+Arial-BoldMT"));
/// assert!(!has_subset_tag("Arial-BoldMT"));
/// assert!(!has_subset_tag("abcdef+Arial"));
/// ```
pub fn has_subset_tag(name: &str) -> bool {
    match name.split_once('+') {
        Some((tag, rest)) => {
            (5..=7).contains(&tag.len())
                && tag.chars().all(|c| c.is_ascii_uppercase())
                && !rest.is_empty()
        },
        None => false,
    }
}

/// Font name with any subset tag removed.
///
/// ```
/// use placeholder_oxide::fonts::strip_subset_prefix;
///
/// assert_eq!(strip_subset_prefix("XYZABC+DejaVuSans"), "DejaVuSans");
/// assert_eq!(strip_subset_prefix("DejaVuSans"), "DejaVuSans");
/// ```
pub fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((_, rest)) if has_subset_tag(name) => rest,
        _ => name,
    }
}

/// Every font the document's pages reference.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FontInventory {
    /// One candidate per distinct font id
    pub candidates: Vec<FontCandidate>,
    /// Index of the recommended primary embedded font
    pub primary: Option<usize>,
}

impl FontInventory {
    /// The recommended primary embedded font.
    pub fn primary(&self) -> Option<&FontCandidate> {
        self.primary.and_then(|i| self.candidates.get(i))
    }
}

/// List every font used in the document.
///
/// The primary font is the largest usable (full TrueType/OpenType, not
/// subset-like) embedded program.
pub fn analyze_document_fonts<E: DocumentEngine + ?Sized>(
    doc: &E,
    config: &FontConfig,
) -> Result<FontInventory> {
    let mut seen = HashSet::new();
    let mut inventory = FontInventory::default();

    for page in 0..doc.page_count() {
        for record in doc.list_fonts(page)? {
            if !seen.insert(record.id) {
                continue;
            }
            let candidate = match doc.extract_font(record.id) {
                Ok(payload) if !payload.bytes.is_empty() => {
                    FontCandidate::from_embedded(page, &record, &payload, config.subset_min_bytes)
                },
                Ok(_) => FontCandidate::unembedded(page, &record),
                Err(e) => {
                    log::debug!("font {} has no extractable program: {}", record.name, e);
                    FontCandidate::unembedded(page, &record)
                },
            };
            inventory.candidates.push(candidate);
        }
    }

    inventory.primary = inventory
        .candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_embedded && c.is_usable())
        .max_by_key(|(_, c)| c.byte_size)
        .map(|(i, _)| i);
    Ok(inventory)
}
