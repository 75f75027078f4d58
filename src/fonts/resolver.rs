//! Font resolution for replacement text.
//!
//! Strategies are tried in a fixed order and the first success wins:
//!
//! 1. caller override file (must exist, and cover non-ASCII text)
//! 2. the document's own embedded font for the original run, when it is a
//!    full TrueType/OpenType program rather than a subset
//! 3. a Unicode-capable fallback font from the shared [`FallbackFontSet`]
//! 4. a built-in generic font, transliterating text it cannot draw
//!
//! Installed handles are cached per document in a [`FontCache`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::cache::{FontCache, FontKey};
use super::candidate::{strip_subset_prefix, FontCandidate};
use super::fallback::FallbackFontSet;
use super::variants::find_style_variant;
use super::{builtin_family_for, builtin_variant_name, needs_unicode, transliterate, FontStyle};
use crate::config::FontConfig;
use crate::engine::{DocumentEngine, FontHandle, FontSource};
use crate::error::{Error, Result};

/// Run `attempt` on each item until one succeeds.
///
/// Returns the first success, or every failure in order.
///
/// ```
/// use placeholder_oxide::fonts::first_success;
///
/// let parsed = first_success(["x", "12", "7"], |s| s.parse::<u32>());
/// assert_eq!(parsed, Ok(12));
///
/// let failed = first_success(["a", "b"], |s| s.parse::<u32>());
/// assert_eq!(failed.unwrap_err().len(), 2);
/// ```
pub fn first_success<I, T, E>(items: I, mut attempt: impl FnMut(I::Item) -> std::result::Result<T, E>) -> std::result::Result<T, Vec<E>>
where
    I: IntoIterator,
{
    let mut errors = Vec::new();
    for item in items {
        match attempt(item) {
            Ok(value) => return Ok(value),
            Err(e) => errors.push(e),
        }
    }
    Err(errors)
}

/// Where a resolved font came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStrategy {
    /// Font file supplied by the caller
    CallerOverride,
    /// The document's own embedded font
    EmbeddedOriginal,
    /// A Unicode-capable fallback font file
    CachedFallback,
    /// A built-in generic font
    Builtin,
}

impl FontStrategy {
    /// Strategies in the order they are tried.
    pub const ORDER: [FontStrategy; 4] = [
        FontStrategy::CallerOverride,
        FontStrategy::EmbeddedOriginal,
        FontStrategy::CachedFallback,
        FontStrategy::Builtin,
    ];
}

/// What to resolve a font for.
#[derive(Debug, Clone, Copy)]
pub struct FontRequest<'a> {
    /// Replacement text
    pub text: &'a str,
    /// Page the text is drawn on
    pub page: usize,
    /// Font name of the original run
    pub source_font: Option<&'a str>,
    /// Requested style
    pub style: FontStyle,
    /// Caller-supplied font file
    pub override_path: Option<&'a Path>,
}

/// A font ready to draw with.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFont {
    /// Drawing handle in the document
    pub handle: FontHandle,
    /// Human-readable font label
    pub label: String,
    /// Strategy that produced the font
    pub source: FontStrategy,
    /// Text to draw (transliterated when the font cannot draw the original)
    pub text: String,
    /// `text` differs from the requested text
    pub transliterated: bool,
    /// Style the engine should simulate (the font itself lacks it)
    pub synthetic: FontStyle,
    /// Every candidate examined, in order
    pub candidates_tried: Vec<String>,
}

/// Distinct non-ASCII characters of `text`, used to probe glyph coverage.
fn probe_string(text: &str) -> String {
    let mut probe: Vec<char> = text.chars().filter(|c| !c.is_ascii()).collect();
    probe.sort_unstable();
    probe.dedup();
    probe.into_iter().collect()
}

/// Picks a drawing font for each placeholder.
#[derive(Debug, Clone, Copy)]
pub struct FontResolver<'a> {
    config: &'a FontConfig,
    fallbacks: &'a FallbackFontSet,
    cache: &'a FontCache,
}

impl<'a> FontResolver<'a> {
    /// Create a resolver over shared fallback fonts and a handle cache.
    pub fn new(config: &'a FontConfig, fallbacks: &'a FallbackFontSet, cache: &'a FontCache) -> Self {
        Self {
            config,
            fallbacks,
            cache,
        }
    }

    /// Resolve a font for `request`.
    ///
    /// Fails only when even the built-in font cannot be installed.
    pub fn resolve<D: DocumentEngine + ?Sized>(&self, doc: &mut D, request: &FontRequest<'_>) -> Result<ResolvedFont> {
        let mut tried = Vec::new();
        let outcome = first_success(FontStrategy::ORDER, |strategy| {
            let attempt = match strategy {
                FontStrategy::CallerOverride => self.caller_override(doc, request, &mut tried),
                FontStrategy::EmbeddedOriginal => self.embedded_original(doc, request, &mut tried),
                FontStrategy::CachedFallback => self.cached_fallback(doc, request, &mut tried),
                FontStrategy::Builtin => self.builtin(doc, request, &mut tried),
            };
            if let Err(e) = &attempt {
                log::debug!("font strategy {:?} skipped: {}", strategy, e);
            }
            attempt
        });

        match outcome {
            Ok(mut font) => {
                font.candidates_tried = tried;
                log::debug!("resolved font {} via {:?}", font.label, font.source);
                Ok(font)
            },
            Err(errors) => {
                let reasons: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                Err(Error::FontResolution(reasons.join("; ")))
            },
        }
    }

    fn resolved(&self, handle: FontHandle, label: String, source: FontStrategy, request: &FontRequest<'_>, synthetic: FontStyle) -> ResolvedFont {
        ResolvedFont {
            handle,
            label,
            source,
            text: request.text.to_string(),
            transliterated: false,
            synthetic,
            candidates_tried: Vec::new(),
        }
    }

    /// Install an external font file, preferring a sibling style variant.
    fn install_file<D: DocumentEngine + ?Sized>(
        &self,
        doc: &mut D,
        path: &Path,
        style: FontStyle,
        tried: &mut Vec<String>,
    ) -> Result<(FontHandle, String, FontStyle)> {
        let variant = find_style_variant(path, style, self.config.variant_min_bytes);
        tried.extend(variant.tried.iter().map(|p| p.display().to_string()));
        let (chosen, synthetic) = match variant.path {
            Some(p) => (p, FontStyle::Normal),
            None => (path.to_path_buf(), style),
        };
        if style != FontStyle::Normal && synthetic != FontStyle::Normal {
            log::debug!("no {:?} variant next to {}, simulating", style, path.display());
        }
        let doc_id = doc.document_id();
        let handle = self.cache.get_or_try_insert(doc_id, FontKey::Path(chosen.clone()), || {
            doc.embed_font(FontSource::Path(&chosen))
        })?;
        Ok((handle, chosen.display().to_string(), synthetic))
    }

    fn caller_override<D: DocumentEngine + ?Sized>(
        &self,
        doc: &mut D,
        request: &FontRequest<'_>,
        tried: &mut Vec<String>,
    ) -> Result<ResolvedFont> {
        let path = request
            .override_path
            .ok_or_else(|| Error::FontResolution("no caller override".to_string()))?;
        tried.push(path.display().to_string());
        if !path.is_file() {
            return Err(Error::FontResolution(format!("override {} does not exist", path.display())));
        }
        let (handle, label, synthetic) = self.install_file(doc, path, request.style, tried)?;
        if needs_unicode(request.text) && !doc.covers_text(handle, &probe_string(request.text))? {
            return Err(Error::FontResolution(format!("override {} cannot draw the text", label)));
        }
        Ok(self.resolved(handle, label, FontStrategy::CallerOverride, request, synthetic))
    }

    fn embedded_original<D: DocumentEngine + ?Sized>(
        &self,
        doc: &mut D,
        request: &FontRequest<'_>,
        tried: &mut Vec<String>,
    ) -> Result<ResolvedFont> {
        let source = request
            .source_font
            .ok_or_else(|| Error::FontResolution("no source font".to_string()))?;
        let wanted = strip_subset_prefix(source);
        let record = doc
            .list_fonts(request.page)?
            .into_iter()
            .find(|r| {
                r.name == source
                    || strip_subset_prefix(&r.name).eq_ignore_ascii_case(wanted)
                    || r.base_name.eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| Error::FontResolution(format!("{} is not in the font table", source)))?;

        let payload = doc.extract_font(record.id)?;
        let candidate = FontCandidate::from_embedded(request.page, &record, &payload, self.config.subset_min_bytes);
        tried.push(candidate.label());
        if !candidate.is_usable() {
            return Err(Error::FontResolution(format!(
                "{} is not a full TrueType/OpenType program",
                record.name
            )));
        }

        let doc_id = doc.document_id();
        let handle = self.cache.get_or_try_insert(doc_id, FontKey::Embedded(record.id), || {
            doc.embed_font(FontSource::Bytes {
                name: &record.name,
                data: &payload.bytes,
            })
        })?;
        if !doc.covers_text(handle, request.text)? {
            return Err(Error::FontResolution(format!("{} lacks glyphs for the text", record.name)));
        }
        Ok(self.resolved(handle, candidate.label(), FontStrategy::EmbeddedOriginal, request, request.style))
    }

    fn cached_fallback<D: DocumentEngine + ?Sized>(
        &self,
        doc: &mut D,
        request: &FontRequest<'_>,
        tried: &mut Vec<String>,
    ) -> Result<ResolvedFont> {
        let unicode = needs_unicode(request.text);
        for font in self.fallbacks.fonts() {
            tried.push(font.path.display().to_string());
            if unicode && !font.program.covers(request.text) {
                continue;
            }
            let base = match self.fallbacks.style_variant(font, request.style) {
                Some(variant) => variant,
                None => font,
            };
            match self.install_file(doc, &base.path, request.style, tried) {
                Ok((handle, label, synthetic)) => {
                    return Ok(self.resolved(handle, label, FontStrategy::CachedFallback, request, synthetic));
                },
                Err(e) => log::warn!("fallback font {} unusable: {}", font.path.display(), e),
            }
        }
        Err(Error::FontResolution("no fallback font can draw the text".to_string()))
    }

    fn builtin<D: DocumentEngine + ?Sized>(
        &self,
        doc: &mut D,
        request: &FontRequest<'_>,
        tried: &mut Vec<String>,
    ) -> Result<ResolvedFont> {
        let family = match request.source_font {
            Some(name) => builtin_family_for(name),
            None => builtin_family_for(&self.config.builtin_family),
        };
        let name = builtin_variant_name(family, request.style);
        tried.push(format!("builtin:{}", name));
        let doc_id = doc.document_id();
        let handle = self
            .cache
            .get_or_try_insert(doc_id, FontKey::Builtin(name.to_string()), || doc.builtin_font(name))?;

        let mut font = self.resolved(handle, name.to_string(), FontStrategy::Builtin, request, FontStyle::Normal);
        if !doc.covers_text(handle, request.text)? {
            font.text = transliterate(request.text);
            font.transliterated = font.text != request.text;
            log::info!("transliterated replacement text for built-in font {}", name);
        }
        Ok(font)
    }
}
