//! Background-preserving erasure of detected placeholders.
//!
//! For every hit whose key is selected: sample the background under the
//! rectangle, paint it over, and queue a redaction so the glyphs are gone
//! from the text layer rather than hidden. Redactions are applied once per
//! page after all of that page's hits are processed, so no hit is erased
//! with geometry already changed by another.
//!
//! Hits overlapping a protected region are left alone. A rasterization or
//! redaction failure degrades that hit to a paint-only cover.

pub mod background;
pub mod protected;

pub use background::sample_background;
pub use protected::{is_protected_run, overlapping_region, protected_regions};

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::EraseConfig;
use crate::detect::PlaceholderHit;
use crate::engine::DocumentEngine;
use crate::error::Result;
use crate::geometry::Rect;
use crate::layout::Color;
use crate::pattern::PatternMatcher;

/// What happened to one hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EraseOutcome {
    /// Painted over and removed from the text layer
    Redacted,
    /// Painted over only
    PaintOnly,
    /// Refused: overlaps protected text
    Protected,
    /// Not selected
    Skipped,
    /// Painting failed; left as it was
    Failed,
}

/// Per-hit erase result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EraseRecord {
    /// Index of the hit in the input slice
    pub hit_index: usize,
    /// Hit key
    pub key: String,
    /// Page index
    pub page: usize,
    /// Hit rectangle
    pub rect: Rect,
    /// Outcome
    pub outcome: EraseOutcome,
    /// Colour painted, if any
    pub fill: Option<Color>,
}

/// Result of an erase pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EraseReport {
    /// One record per input hit, in input order
    pub records: Vec<EraseRecord>,
}

impl EraseReport {
    /// Number of records with `outcome`.
    pub fn count(&self, outcome: EraseOutcome) -> usize {
        self.records.iter().filter(|r| r.outcome == outcome).count()
    }

    /// Outcome for the hit at `hit_index`.
    pub fn outcome_of(&self, hit_index: usize) -> Option<EraseOutcome> {
        self.records.iter().find(|r| r.hit_index == hit_index).map(|r| r.outcome)
    }
}

/// Erase the hits whose lookup key is in `keys` (folded keys; an empty set
/// selects every hit).
pub fn erase<D: DocumentEngine + ?Sized>(
    doc: &mut D,
    hits: &[PlaceholderHit],
    keys: &HashSet<String>,
    config: &EraseConfig,
    matcher: &PatternMatcher,
) -> Result<EraseReport> {
    let mut by_page: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    let mut records: HashMap<usize, EraseRecord> = HashMap::new();

    for (i, hit) in hits.iter().enumerate() {
        let selected = keys.is_empty() || keys.contains(&hit.lookup_key()) || keys.contains(&hit.instance_label());
        if selected {
            by_page.entry(hit.page).or_default().push(i);
        } else {
            records.insert(i, record(i, hit, EraseOutcome::Skipped, None));
        }
    }

    for (page, indices) in by_page {
        let regions = protected_regions(&doc.page_layout(page)?, config, matcher);
        let mut queued = Vec::new();

        for i in indices {
            let hit = &hits[i];
            if let Some(region) = overlapping_region(&hit.rect, &regions) {
                log::warn!(
                    "not erasing '{}' on page {}: overlaps protected text at {:?}",
                    hit.raw_text,
                    page,
                    region
                );
                records.insert(i, record(i, hit, EraseOutcome::Protected, None));
                continue;
            }

            let (fill, redact) = match sample_background(doc, page, hit.rect, config.default_background) {
                Ok(color) => (color, true),
                Err(e) => {
                    log::warn!("{}; painting white without redaction", e);
                    (Color::white(), false)
                },
            };
            if let Err(e) = doc.paint_rect(page, hit.rect, fill) {
                log::warn!("painting over '{}' on page {} failed: {}", hit.raw_text, page, e);
                records.insert(i, record(i, hit, EraseOutcome::Failed, None));
                continue;
            }

            let outcome = if redact {
                match doc.queue_redaction(page, hit.rect) {
                    Ok(()) => {
                        queued.push(i);
                        EraseOutcome::Redacted
                    },
                    Err(e) => {
                        log::warn!("redaction of '{}' on page {} failed: {}", hit.raw_text, page, e);
                        EraseOutcome::PaintOnly
                    },
                }
            } else {
                EraseOutcome::PaintOnly
            };
            records.insert(i, record(i, hit, outcome, Some(fill)));
        }

        if !queued.is_empty() {
            if let Err(e) = doc.apply_redactions(page) {
                log::warn!("applying redactions on page {} failed: {}; hits stay painted", page, e);
                for i in queued {
                    if let Some(r) = records.get_mut(&i) {
                        r.outcome = EraseOutcome::PaintOnly;
                    }
                }
            }
        }
    }

    let mut records: Vec<EraseRecord> = records.into_values().collect();
    records.sort_by_key(|r| r.hit_index);
    let report = EraseReport { records };
    log::info!(
        "erased {} placeholders ({} paint-only, {} protected, {} failed)",
        report.count(EraseOutcome::Redacted),
        report.count(EraseOutcome::PaintOnly),
        report.count(EraseOutcome::Protected),
        report.count(EraseOutcome::Failed)
    );
    Ok(report)
}

fn record(hit_index: usize, hit: &PlaceholderHit, outcome: EraseOutcome, fill: Option<Color>) -> EraseRecord {
    EraseRecord {
        hit_index,
        key: hit.key.clone(),
        page: hit.page,
        rect: hit.rect,
        outcome,
        fill,
    }
}
