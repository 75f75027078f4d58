//! Detect, erase and fill over one document.
//!
//! A [`Pipeline`] owns the configuration, the shared fallback fonts and the
//! per-document font handle cache. It is `Send + Sync`: independent
//! documents can be processed on separate threads through one pipeline,
//! while the phases for a single document run strictly in sequence.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use placeholder_oxide::config::PipelineConfig;
//! use placeholder_oxide::engine::{DocumentEngine, MemoryDocument};
//! use placeholder_oxide::fill::FillRequest;
//! use placeholder_oxide::fonts::FallbackFontSet;
//! use placeholder_oxide::pipeline::Pipeline;
//!
//! let pipeline = Pipeline::with_fallbacks(PipelineConfig::default(), Arc::new(FallbackFontSet::empty())).unwrap();
//!
//! let mut doc = MemoryDocument::new();
//! let page = doc.add_page(595.0, 842.0);
//! doc.add_text(page, 72.0, 100.0, "Dear {{name}},", "Helvetica", 12.0).unwrap();
//!
//! let report = pipeline.process(&mut doc, &FillRequest::new().with_value("name", "Ada")).unwrap();
//! assert_eq!(report.hits.len(), 1);
//! assert!(doc.search_literal(page, "{{name}}").unwrap().is_empty());
//! assert_eq!(doc.search_literal(page, "Ada").unwrap().len(), 1);
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::detect::{Detector, PlaceholderHit};
use crate::engine::{DocumentEngine, DocumentId};
use crate::erase::{erase, EraseOutcome, EraseReport};
use crate::error::Result;
use crate::fill::{fill, fill_except, EraseMode, FillOutcome, FillRequest};
use crate::fonts::{FallbackFontSet, FontCache, FontResolver};

/// Everything a full run produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessReport {
    /// Detected placeholders, in reading order
    pub hits: Vec<PlaceholderHit>,
    /// Erase results (empty when erasing was skipped)
    pub erase: EraseReport,
    /// Fill results
    pub fill: FillOutcome,
}

/// Placeholder detection and replacement for documents.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    detector: Detector,
    fallbacks: Arc<FallbackFontSet>,
    cache: FontCache,
}

impl Pipeline {
    /// Create a pipeline, discovering fallback fonts in the configured and
    /// system font directories.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let fallbacks = FallbackFontSet::shared_default(&config.fonts);
        Self::with_fallbacks(config, fallbacks)
    }

    /// Create a pipeline over an already loaded fallback font set.
    pub fn with_fallbacks(config: PipelineConfig, fallbacks: Arc<FallbackFontSet>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            detector: Detector::new(&config.detection),
            cache: FontCache::new(&config.fonts),
            fallbacks,
            config,
        })
    }

    /// The configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The shared fallback fonts.
    pub fn fallbacks(&self) -> &Arc<FallbackFontSet> {
        &self.fallbacks
    }

    /// The font handle cache.
    pub fn font_cache(&self) -> &FontCache {
        &self.cache
    }

    /// Detect placeholders.
    pub fn detect<D: DocumentEngine + ?Sized>(&self, doc: &D) -> Result<Vec<PlaceholderHit>> {
        self.detector.detect(doc)
    }

    /// Erase the hits selected by `keys` (folded keys or instance labels;
    /// an empty set selects every hit).
    pub fn erase<D: DocumentEngine + ?Sized>(
        &self,
        doc: &mut D,
        hits: &[PlaceholderHit],
        keys: &HashSet<String>,
    ) -> Result<EraseReport> {
        erase(doc, hits, keys, &self.config.erase, self.detector.matcher())
    }

    /// Draw the request's values into the hits.
    pub fn fill<D: DocumentEngine + ?Sized>(
        &self,
        doc: &mut D,
        hits: &[PlaceholderHit],
        request: &FillRequest,
    ) -> Result<FillOutcome> {
        let resolver = FontResolver::new(&self.config.fonts, &self.fallbacks, &self.cache);
        fill(doc, hits, request, &resolver, &self.config.fit)
    }

    /// Detect, erase the placeholders that have a value, then fill them.
    ///
    /// Placeholders refused by the eraser are not drawn over.
    pub fn process<D: DocumentEngine + ?Sized>(&self, doc: &mut D, request: &FillRequest) -> Result<ProcessReport> {
        let hits = self.detect(doc)?;
        if hits.is_empty() {
            log::info!("no placeholders found in document {}", doc.document_id());
            return Ok(ProcessReport::default());
        }

        let keys: HashSet<String> = request.normalized_values().into_keys().collect();
        let erase_report = match request.erase {
            EraseMode::Redact if !keys.is_empty() => self.erase(doc, &hits, &keys)?,
            _ => EraseReport::default(),
        };

        let protected: HashSet<usize> = (0..hits.len())
            .filter(|&i| erase_report.outcome_of(i) == Some(EraseOutcome::Protected))
            .collect();
        let resolver = FontResolver::new(&self.config.fonts, &self.fallbacks, &self.cache);
        let fill_outcome = fill_except(doc, &hits, &protected, request, &resolver, &self.config.fit)?;

        Ok(ProcessReport {
            hits,
            erase: erase_report,
            fill: fill_outcome,
        })
    }

    /// Drop cached font handles of a closed document.
    pub fn release_document(&self, doc: DocumentId) -> usize {
        self.cache.invalidate_document(doc)
    }
}
