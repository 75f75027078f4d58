//! Placeholder detection.
//!
//! Each text line is concatenated from its runs and scanned by the
//! [`PatternMatcher`]. A match is mapped back to page space from the runs it
//! touches ([`reconstruct_span`]), or failing that by a literal search
//! restricted to the line's band ([`search_fallback`]). Annotation contents
//! and form-field values are scanned too. Hits are deduplicated, numbered
//! per key and returned in reading order.
//!
//! # Examples
//!
//! ```
//! use placeholder_oxide::config::DetectionConfig;
//! use placeholder_oxide::detect::detect;
//! use placeholder_oxide::engine::MemoryDocument;
//!
//! let mut doc = MemoryDocument::new();
//! let page = doc.add_page(595.0, 842.0);
//! doc.add_text(page, 72.0, 100.0, "Name: {{name}}, City: {{city}}", "Helvetica", 12.0).unwrap();
//!
//! let hits = detect(&doc, &DetectionConfig::default()).unwrap();
//! let keys: Vec<&str> = hits.iter().map(|h| h.key.as_str()).collect();
//! assert_eq!(keys, ["name", "city"]);
//! ```

pub mod dedupe;
pub mod instances;
pub mod reconstruct;

pub use dedupe::dedupe;
pub use instances::{assign_occurrences, reading_order};
pub use reconstruct::{dominant_run, reconstruct_span, search_fallback};

use serde::{Deserialize, Serialize};

use crate::config::DetectionConfig;
use crate::engine::DocumentEngine;
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::layout::{Color, TextLine};
use crate::pattern::{normalize_text, PatternFamily, PatternMatch, PatternMatcher};

/// Case-folded lookup form of a key.
///
/// ```
/// use placeholder_oxide::detect::fold_key;
///
/// assert_eq!(fold_key("  Customer_Name "), "customer_name");
/// ```
pub fn fold_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Where a hit was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitSource {
    /// Page text, geometry from the runs
    TextLayer,
    /// Page text, geometry from literal search
    LiteralSearch,
    /// FreeText annotation contents
    Annotation,
    /// Text form-field value
    FormField,
}

/// A detected placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderHit {
    /// Key as written, trimmed
    pub key: String,
    /// Matched text, delimiters included
    pub raw_text: String,
    /// Page-space rectangle, horizontally padded
    pub rect: Rect,
    /// Page index
    pub page: usize,
    /// Font name of the run with the largest overlap
    pub source_font: Option<String>,
    /// Font size of that run
    pub source_size: Option<f32>,
    /// Colour of that run
    pub source_color: Option<Color>,
    /// Where the hit came from
    pub source: HitSource,
    /// Delimiter family
    pub family: PatternFamily,
    /// Normalized text of the line (or annotation, or field) holding the hit
    pub context: String,
    /// 1-based position among hits with the same key, in reading order
    pub occurrence: usize,
    /// Number of hits with the same key
    pub occurrences: usize,
}

impl PlaceholderHit {
    /// Key used to look up replacement values.
    pub fn lookup_key(&self) -> String {
        fold_key(&self.key)
    }

    /// `key_N` for a key that occurs more than once, else the lookup key.
    pub fn instance_label(&self) -> String {
        if self.occurrences > 1 {
            format!("{}_{}", self.lookup_key(), self.occurrence)
        } else {
            self.lookup_key()
        }
    }
}

/// Finds placeholders in a document.
#[derive(Debug, Clone)]
pub struct Detector {
    config: DetectionConfig,
    matcher: PatternMatcher,
}

impl Detector {
    /// Create a detector.
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            config: config.clone(),
            matcher: PatternMatcher::new(config),
        }
    }

    /// The matcher used for line text.
    pub fn matcher(&self) -> &PatternMatcher {
        &self.matcher
    }

    /// Detect every placeholder in the document.
    ///
    /// A line whose matches cannot be located is skipped with a warning.
    /// A document without any text returns no hits.
    pub fn detect<D: DocumentEngine + ?Sized>(&self, doc: &D) -> Result<Vec<PlaceholderHit>> {
        if !doc.has_text_layer()? {
            log::info!("document {} has no text layer, nothing to detect", doc.document_id());
            return Ok(Vec::new());
        }

        let mut hits = Vec::new();
        for page in 0..doc.page_count() {
            self.detect_page(doc, page, &mut hits)?;
        }

        let mut hits = dedupe(hits);
        assign_occurrences(&mut hits);
        hits.sort_by(reading_order);
        log::info!("detected {} placeholders", hits.len());
        Ok(hits)
    }

    fn detect_page<D: DocumentEngine + ?Sized>(&self, doc: &D, page: usize, hits: &mut Vec<PlaceholderHit>) -> Result<()> {
        let layout = doc.page_layout(page)?;
        for (index, line) in layout.lines().enumerate() {
            match self.detect_line(doc, page, index, line) {
                Ok(found) => hits.extend(found),
                Err(e) => log::warn!("{}", e),
            }
        }

        if self.config.scan_annotations {
            for annotation in doc.text_annotations(page)? {
                let context = normalize_text(&annotation.contents);
                for m in self.matcher.find(&annotation.contents) {
                    hits.push(Self::area_hit(m, page, annotation.rect, HitSource::Annotation, &context));
                }
            }
        }
        if self.config.scan_form_fields {
            for field in doc.form_fields(page)? {
                let context = normalize_text(&field.value);
                for m in self.matcher.find(&field.value) {
                    hits.push(Self::area_hit(m, page, field.rect, HitSource::FormField, &context));
                }
            }
        }
        Ok(())
    }

    fn detect_line<D: DocumentEngine + ?Sized>(
        &self,
        doc: &D,
        page: usize,
        index: usize,
        line: &TextLine,
    ) -> Result<Vec<PlaceholderHit>> {
        let text = line.text();
        let matches = self.matcher.find(&text);
        if matches.is_empty() {
            return Ok(Vec::new());
        }
        let context = normalize_text(&text);

        let mut hits = Vec::with_capacity(matches.len());
        for (i, m) in matches.iter().enumerate() {
            let (rect, source) = match reconstruct_span(line, m.start, m.end, &self.config) {
                Some(rect) => (rect, HitSource::TextLayer),
                None => {
                    let nth = matches[..i].iter().filter(|p| p.raw == m.raw).count();
                    match search_fallback(doc, page, line, &m.raw, nth, &self.config)? {
                        Some(rect) => {
                            log::debug!("'{}' on page {} located by literal search", m.raw, page);
                            (rect, HitSource::LiteralSearch)
                        },
                        None => {
                            return Err(Error::Detection {
                                page,
                                line: index,
                                reason: format!("no geometry for '{}'", m.raw),
                            })
                        },
                    }
                },
            };

            let run = dominant_run(line, &rect);
            hits.push(PlaceholderHit {
                key: m.key.clone(),
                raw_text: m.raw.clone(),
                rect,
                page,
                source_font: run.map(|r| r.font_name.clone()),
                source_size: run.map(|r| r.font_size),
                source_color: run.map(|r| r.color),
                source,
                family: m.family,
                context: context.clone(),
                occurrence: 1,
                occurrences: 1,
            });
        }
        Ok(hits)
    }

    fn area_hit(m: PatternMatch, page: usize, rect: Rect, source: HitSource, context: &str) -> PlaceholderHit {
        PlaceholderHit {
            key: m.key,
            raw_text: m.raw,
            rect,
            page,
            source_font: None,
            source_size: None,
            source_color: None,
            source,
            family: m.family,
            context: context.to_string(),
            occurrence: 1,
            occurrences: 1,
        }
    }
}

/// Detect placeholders with a one-off [`Detector`].
pub fn detect<D: DocumentEngine + ?Sized>(doc: &D, config: &DetectionConfig) -> Result<Vec<PlaceholderHit>> {
    Detector::new(config).detect(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{FormField, MemoryDocument, TextAnnotation};
    use crate::layout::TextRun;

    #[test]
    fn test_split_placeholder_is_one_hit() {
        let mut doc = MemoryDocument::new();
        let page = doc.add_page(600.0, 800.0);
        let line = doc
            .add_text_runs(page, 50.0, 100.0, &["Dear {{first", "_name}},"], "Helvetica", 12.0, Color::black())
            .unwrap();
        let hits = detect(&doc, &DetectionConfig::default()).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].key, "first_name");
        assert_eq!(hits[0].source, HitSource::TextLayer);
        assert!(hits[0].rect.y0 == line.y0 && hits[0].rect.y1 == line.y1);
        assert!(hits[0].rect.x0 > line.x0 && hits[0].rect.x1 < line.x1);
        assert_eq!(hits[0].source_font.as_deref(), Some("Helvetica"));
        assert_eq!(hits[0].context, "Dear {{first_name}},");
    }

    #[test]
    fn test_literal_search_fallback() {
        let mut doc = MemoryDocument::new();
        let page = doc.add_page(600.0, 800.0);
        // Engine reports the line with a flat run: no sub-line geometry
        doc.add_line(
            page,
            vec![TextRun::new("Hi {{x_y}}", Rect::new(40.0, 100.0, 40.0, 112.0), "Helvetica", 10.0, Color::black())],
        )
        .unwrap();
        let hits = detect(&doc, &DetectionConfig::default()).unwrap();
        // Literal search over the same flat run finds a flat rect too
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source, HitSource::LiteralSearch);
    }

    #[test]
    fn test_annotations_and_fields() {
        let mut doc = MemoryDocument::new();
        let page = doc.add_page(600.0, 800.0);
        doc.add_text(page, 10.0, 10.0, "Body", "Helvetica", 10.0).unwrap();
        doc.add_annotation(
            page,
            TextAnnotation {
                rect: Rect::new(10.0, 300.0, 200.0, 320.0),
                contents: "Signed: {{signer}}".to_string(),
            },
        )
        .unwrap();
        doc.add_form_field(
            page,
            FormField {
                name: "f1".to_string(),
                rect: Rect::new(10.0, 400.0, 200.0, 420.0),
                value: "{{date}}".to_string(),
            },
        )
        .unwrap();

        let hits = detect(&doc, &DetectionConfig::default()).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].source, HitSource::Annotation);
        assert_eq!(hits[0].rect, Rect::new(10.0, 300.0, 200.0, 320.0));
        assert_eq!(hits[1].source, HitSource::FormField);

        let no_extras = detect(&doc, &DetectionConfig::default().with_annotations(false).with_form_fields(false)).unwrap();
        assert!(no_extras.is_empty());
    }

    #[test]
    fn test_empty_document() {
        let mut doc = MemoryDocument::new();
        doc.add_page(600.0, 800.0);
        assert!(detect(&doc, &DetectionConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn test_repeated_key_numbering() {
        let mut doc = MemoryDocument::new();
        let page = doc.add_page(600.0, 800.0);
        doc.add_text(page, 10.0, 200.0, "{{date}}", "Helvetica", 10.0).unwrap();
        doc.add_text(page, 10.0, 100.0, "{{Date}} and {{date}}", "Helvetica", 10.0).unwrap();
        let hits = detect(&doc, &DetectionConfig::default()).unwrap();
        let labels: Vec<String> = hits.iter().map(PlaceholderHit::instance_label).collect();
        assert_eq!(labels, ["date_1", "date_2", "date_3"]);
        assert_eq!(hits[0].key, "Date");
    }
}
