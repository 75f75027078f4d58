//! Fitted replacement of placeholders with caller values.
//!
//! For each hit with a value: resolve a drawing font, pick the largest size
//! that fits the hit's rectangle, draw once, and record a diagnostic.
//! A failure on one hit is recorded and the rest are still filled. Hits
//! without a value are left untouched.
//!
//! # Examples
//!
//! ```
//! use placeholder_oxide::config::{DetectionConfig, FitConfig, FontConfig};
//! use placeholder_oxide::detect::detect;
//! use placeholder_oxide::engine::{DocumentEngine, MemoryDocument};
//! use placeholder_oxide::fill::{fill, FillRequest};
//! use placeholder_oxide::fonts::{FallbackFontSet, FontCache, FontResolver};
//!
//! let mut doc = MemoryDocument::new();
//! let page = doc.add_page(595.0, 842.0);
//! doc.add_text(page, 72.0, 100.0, "Total: {{amount}}", "Helvetica", 12.0).unwrap();
//! let hits = detect(&doc, &DetectionConfig::default()).unwrap();
//!
//! let fonts = FontConfig::default();
//! let fallbacks = FallbackFontSet::empty();
//! let cache = FontCache::new(&fonts);
//! let resolver = FontResolver::new(&fonts, &fallbacks, &cache);
//!
//! let request = FillRequest::new().with_value("amount", "42 EUR").with_value("tax", "7");
//! let outcome = fill(&mut doc, &hits, &request, &resolver, &FitConfig::default()).unwrap();
//! assert_eq!(outcome.diagnostics.len(), 1);
//! assert_eq!(outcome.missing_keys, ["tax"]);
//! assert_eq!(doc.search_literal(page, "42 EUR").unwrap().len(), 1);
//! ```

pub mod autofit;
pub mod request;

pub use autofit::{aligned_x, baseline_y, expand_for_overflow, fit_box, fit_single_line, line_origin, BoxFit, LineFit, SizePlan};
pub use request::{
    normalize_mapping, repair_mojibake, EffectiveOptions, EraseMode, FillRequest, FitMode, KeyOptions, SizeMode,
};

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::FitConfig;
use crate::detect::PlaceholderHit;
use crate::engine::{DocumentEngine, DrawSpec};
use crate::error::Result;
use crate::fonts::{FontRequest, FontResolver, FontStrategy, FontStyle};
use crate::geometry::Rect;

/// What was drawn for one hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillDiagnostic {
    /// Hit key
    pub key: String,
    /// Instance label (`key_N` for repeated keys)
    pub instance: String,
    /// Page index
    pub page: usize,
    /// Rectangle the text was fitted into
    pub rect: Rect,
    /// Text drawn
    pub text: String,
    /// Font label
    pub font: String,
    /// Where the font came from
    pub font_source: Option<FontStrategy>,
    /// Chosen size
    pub size: f32,
    /// Requested style
    pub style: FontStyle,
    /// Fit mode used
    pub fit: FitMode,
    /// Text exceeds the rectangle at the chosen size
    pub clipped: bool,
    /// Text was transliterated for a font without the needed glyphs
    pub transliterated: bool,
    /// Font candidates examined, in order
    pub candidates_tried: Vec<String>,
    /// Failure that prevented drawing
    pub error: Option<String>,
}

/// Result of a fill pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FillOutcome {
    /// One entry per hit that had a value
    pub diagnostics: Vec<FillDiagnostic>,
    /// Request keys that matched no hit
    pub missing_keys: Vec<String>,
    /// Instance labels of hits without a value
    pub unfilled: Vec<String>,
    /// Instance labels of hits left alone because erasing them was refused
    pub protected: Vec<String>,
}

impl FillOutcome {
    /// Diagnostics of hits drawn clipped.
    pub fn clipped(&self) -> impl Iterator<Item = &FillDiagnostic> {
        self.diagnostics.iter().filter(|d| d.clipped)
    }

    /// Diagnostics of hits that could not be drawn.
    pub fn failed(&self) -> impl Iterator<Item = &FillDiagnostic> {
        self.diagnostics.iter().filter(|d| d.error.is_some())
    }
}

/// Value for `hit`: its instance label first, then its key.
fn value_for<'v>(values: &'v IndexMap<String, String>, hit: &PlaceholderHit) -> Option<&'v str> {
    values
        .get(&hit.instance_label())
        .or_else(|| values.get(&hit.lookup_key()))
        .map(String::as_str)
}

/// Draw the request's values into the hits' rectangles.
pub fn fill<D: DocumentEngine + ?Sized>(
    doc: &mut D,
    hits: &[PlaceholderHit],
    request: &FillRequest,
    resolver: &FontResolver<'_>,
    config: &FitConfig,
) -> Result<FillOutcome> {
    fill_except(doc, hits, &HashSet::new(), request, resolver, config)
}

/// Like [`fill`], but never draws over the hits whose indices are in
/// `protected`. Those still count as matched for `missing_keys` and are
/// listed in [`FillOutcome::protected`].
pub fn fill_except<D: DocumentEngine + ?Sized>(
    doc: &mut D,
    hits: &[PlaceholderHit],
    protected: &HashSet<usize>,
    request: &FillRequest,
    resolver: &FontResolver<'_>,
    config: &FitConfig,
) -> Result<FillOutcome> {
    let values = request.normalized_values();
    let mut outcome = FillOutcome::default();
    let mut matched: HashSet<String> = HashSet::new();

    for (index, hit) in hits.iter().enumerate() {
        let label = hit.instance_label();
        matched.insert(hit.lookup_key());
        matched.insert(label.clone());

        if protected.contains(&index) {
            log::debug!("'{}' is protected, not drawn", label);
            outcome.protected.push(label);
            continue;
        }

        let Some(value) = value_for(&values, hit) else {
            log::debug!("no value for '{}', left untouched", label);
            outcome.unfilled.push(label);
            continue;
        };

        let diagnostic = match fill_hit(doc, hit, value, request, resolver, config) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("filling '{}' on page {} failed: {}", label, hit.page, e);
                failed_diagnostic(hit, value, request, e.to_string())
            },
        };
        if diagnostic.clipped {
            log::warn!("'{}' drawn clipped at {:.2}pt", label, diagnostic.size);
        }
        outcome.diagnostics.push(diagnostic);
    }

    outcome.missing_keys = values
        .keys()
        .filter(|k| !matched.contains(k.as_str()))
        .cloned()
        .collect();
    if !outcome.missing_keys.is_empty() {
        log::info!("values without a placeholder: {}", outcome.missing_keys.join(", "));
    }
    Ok(outcome)
}

fn fill_hit<D: DocumentEngine + ?Sized>(
    doc: &mut D,
    hit: &PlaceholderHit,
    value: &str,
    request: &FillRequest,
    resolver: &FontResolver<'_>,
    config: &FitConfig,
) -> Result<FillDiagnostic> {
    let options = EffectiveOptions::for_hit(request, hit);
    let text = match options.fit {
        FitMode::SingleLine => value.replace(['\r', '\n'], " "),
        FitMode::Box => value.to_string(),
    };

    let mut target = hit.rect;
    if request.allow_overflow {
        target = expand_for_overflow(&target, &doc.page_bounds(hit.page)?, config);
    }
    let target = target.offset(options.offset_x, options.offset_y);
    let inner = target.inset(config.inner_pad);

    let font = resolver.resolve(
        doc,
        &FontRequest {
            text: &text,
            page: hit.page,
            source_font: hit.source_font.as_deref(),
            style: options.style,
            override_path: request.font_override.as_deref(),
        },
    )?;

    let mut diagnostic = FillDiagnostic {
        key: hit.key.clone(),
        instance: hit.instance_label(),
        page: hit.page,
        rect: target,
        text: font.text.clone(),
        font: font.label.clone(),
        font_source: Some(font.source),
        size: 0.0,
        style: options.style,
        fit: options.fit,
        clipped: false,
        transliterated: font.transliterated,
        candidates_tried: font.candidates_tried.clone(),
        error: None,
    };
    if font.text.trim().is_empty() {
        return Ok(diagnostic);
    }

    let spec = DrawSpec {
        text: &font.text,
        font: font.handle,
        size: 0.0,
        color: options.color,
        align: options.align,
        synthetic: font.synthetic,
    };

    match options.fit {
        FitMode::SingleLine => {
            let plan = SizePlan::single_line(options.size, target.height(), config);
            let fit = fit_single_line(|size| doc.measure_width(&font.text, font.handle, size), inner.width(), &plan, config)?;
            let origin = line_origin(&inner, &fit, options.align, config);
            doc.draw_text_at(hit.page, origin, &DrawSpec { size: fit.size, ..spec })?;
            diagnostic.size = fit.size;
            diagnostic.clipped = fit.clipped;
        },
        FitMode::Box => {
            let plan = SizePlan::boxed(options.size, config);
            let fit = fit_box(&*doc, inner, &spec, &plan, config)?;
            let drawn = doc.draw_text_in_rect(hit.page, inner, &DrawSpec { size: fit.size, ..spec })?;
            diagnostic.size = fit.size;
            diagnostic.clipped = fit.clipped || drawn.overflow;
        },
    }
    log::debug!(
        "filled '{}' with {} at {:.2}pt on page {}",
        diagnostic.instance,
        diagnostic.font,
        diagnostic.size,
        hit.page
    );
    Ok(diagnostic)
}

fn failed_diagnostic(hit: &PlaceholderHit, value: &str, request: &FillRequest, error: String) -> FillDiagnostic {
    let options = EffectiveOptions::for_hit(request, hit);
    FillDiagnostic {
        key: hit.key.clone(),
        instance: hit.instance_label(),
        page: hit.page,
        rect: hit.rect,
        text: value.to_string(),
        font: String::new(),
        font_source: None,
        size: 0.0,
        style: options.style,
        fit: options.fit,
        clipped: false,
        transliterated: false,
        candidates_tried: Vec::new(),
        error: Some(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DetectionConfig, FontConfig};
    use crate::detect::detect;
    use crate::engine::{MemoryDocument, TextAlign};
    use crate::fonts::{FallbackFontSet, FontCache};
    use crate::layout::Color;

    struct Fixture {
        fonts: FontConfig,
        fallbacks: FallbackFontSet,
        cache: FontCache,
    }

    impl Fixture {
        fn new() -> Self {
            let fonts = FontConfig::default();
            let cache = FontCache::new(&fonts);
            Self {
                fonts,
                fallbacks: FallbackFontSet::empty(),
                cache,
            }
        }

        fn resolver(&self) -> FontResolver<'_> {
            FontResolver::new(&self.fonts, &self.fallbacks, &self.cache)
        }
    }

    fn doc_with(text: &str) -> (MemoryDocument, Vec<PlaceholderHit>) {
        let mut doc = MemoryDocument::new();
        let page = doc.add_page(600.0, 800.0);
        doc.add_text(page, 50.0, 100.0, text, "Helvetica", 12.0).unwrap();
        let hits = detect(&doc, &DetectionConfig::default()).unwrap();
        (doc, hits)
    }

    #[test]
    fn test_protected_hits_are_matched_but_not_drawn() {
        let fixture = Fixture::new();
        let (mut doc, hits) = doc_with("{{a}} {{b}}");
        let request = FillRequest::new().with_value("a", "one").with_value("b", "two");
        let protected: HashSet<usize> = [0].into_iter().collect();

        let outcome = fill_except(&mut doc, &hits, &protected, &request, &fixture.resolver(), &FitConfig::default()).unwrap();
        assert_eq!(outcome.protected, ["a"]);
        assert!(outcome.missing_keys.is_empty());
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].key, "b");
        assert!(doc.search_literal(0, "one").unwrap().is_empty());
    }

    #[test]
    fn test_single_line_fits_inner_width() {
        let mut doc = MemoryDocument::new();
        let page = doc.add_page(600.0, 800.0);
        doc.add_text(page, 50.0, 100.0, "To: {{recipient}}", "Helvetica", 24.0).unwrap();
        let hits = detect(&doc, &DetectionConfig::default()).unwrap();
        let fixture = Fixture::new();
        let request = FillRequest::new().with_value("recipient", "A considerably longer replacement value");
        let outcome = fill(&mut doc, &hits, &request, &fixture.resolver(), &FitConfig::default()).unwrap();

        let d = &outcome.diagnostics[0];
        assert!(d.error.is_none());
        assert!(!d.clipped);
        let start = SizePlan::single_line(SizeMode::Auto, hits[0].rect.height(), &FitConfig::default()).start;
        assert!(d.size < start && d.size >= 6.0);
        let inner = hits[0].rect.inset(FitConfig::default().inner_pad);
        let drawn = doc.search_literal(0, "A considerably longer replacement value").unwrap();
        assert_eq!(drawn.len(), 1);
        assert!(drawn[0].width() <= inner.width() + 0.01);
        assert!(drawn[0].x0 >= inner.x0 - 1e-3);
    }

    #[test]
    fn test_instance_value_overrides_key() {
        let (mut doc, hits) = doc_with("{{d}} / {{d}}");
        let fixture = Fixture::new();
        let request = FillRequest::new().with_value("d", "base").with_value("d_2", "second");
        let outcome = fill(&mut doc, &hits, &request, &fixture.resolver(), &FitConfig::default()).unwrap();
        let texts: Vec<&str> = outcome.diagnostics.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(texts, ["base", "second"]);
        assert!(outcome.missing_keys.is_empty());
    }

    #[test]
    fn test_hits_without_values_untouched() {
        let (mut doc, hits) = doc_with("{{a}} {{b}}");
        let fixture = Fixture::new();
        let request = FillRequest::new().with_value("A", "x");
        let outcome = fill(&mut doc, &hits, &request, &fixture.resolver(), &FitConfig::default()).unwrap();
        assert_eq!(outcome.unfilled, ["b"]);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(doc.search_literal(0, "{{b}}").unwrap().len(), 1);
    }

    #[test]
    fn test_unfittable_text_is_clipped_not_failed() {
        let (mut doc, hits) = doc_with("{{x}}");
        let fixture = Fixture::new();
        let request = FillRequest::new().with_value("x", "W".repeat(80));
        let outcome = fill(&mut doc, &hits, &request, &fixture.resolver(), &FitConfig::default()).unwrap();
        let d = &outcome.diagnostics[0];
        assert!(d.clipped);
        assert!(d.error.is_none());
        assert_eq!(d.size, 6.0);
        assert_eq!(outcome.clipped().count(), 1);
    }

    #[test]
    fn test_box_mode_draws_wrapped_lines() {
        let mut doc = MemoryDocument::new();
        let page = doc.add_page(600.0, 800.0);
        doc.add_text(page, 50.0, 100.0, "{{address}}", "Helvetica", 30.0).unwrap();
        let hits = detect(&doc, &DetectionConfig::default()).unwrap();
        let fixture = Fixture::new();
        let request = FillRequest::new()
            .with_value("address", "12 Long Street Springfield")
            .with_fit(FitMode::Box)
            .with_align(TextAlign::Center);
        let outcome = fill(&mut doc, &hits, &request, &fixture.resolver(), &FitConfig::default()).unwrap();
        let d = &outcome.diagnostics[0];
        assert_eq!(d.fit, FitMode::Box);
        assert!(!d.clipped);
        assert!(doc.page_text(page).unwrap().contains("Springfield"));
    }

    #[test]
    fn test_overflow_expands_target() {
        let (mut doc, hits) = doc_with("{{x}}");
        let fixture = Fixture::new();
        let request = FillRequest::new().with_value("x", "wide value").with_overflow(true);
        let outcome = fill(&mut doc, &hits, &request, &fixture.resolver(), &FitConfig::default()).unwrap();
        let d = &outcome.diagnostics[0];
        assert!(d.rect.width() > hits[0].rect.width() * 1.49);
    }

    #[test]
    fn test_colour_and_builtin_style() {
        let (mut doc, hits) = doc_with("{{x}}");
        let fixture = Fixture::new();
        let request = FillRequest::new()
            .with_value("x", "v")
            .with_style(FontStyle::Bold)
            .with_color(Color::from_rgb8(255, 0, 0));
        let outcome = fill(&mut doc, &hits, &request, &fixture.resolver(), &FitConfig::default()).unwrap();
        assert_eq!(outcome.diagnostics[0].font, "Helvetica-Bold");
        let layout = doc.page_layout(0).unwrap();
        let run = layout.runs().find(|r| r.text == "v").unwrap();
        assert_eq!(run.color.to_rgb8(), [255, 0, 0]);
        assert_eq!(run.font_name, "Helvetica-Bold");
    }
}
