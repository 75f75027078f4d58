//! Collapsing duplicate hits.

use indexmap::map::Entry;
use indexmap::IndexMap;

use super::PlaceholderHit;

/// Keep the first hit per `(page, folded key, rounded rectangle)`.
///
/// Attributes missing from the kept hit are taken from later duplicates.
/// Input order is preserved.
pub fn dedupe(hits: Vec<PlaceholderHit>) -> Vec<PlaceholderHit> {
    let mut unique: IndexMap<(usize, String, [i64; 4]), PlaceholderHit> = IndexMap::with_capacity(hits.len());
    let mut dropped = 0;

    for hit in hits {
        match unique.entry((hit.page, hit.lookup_key(), hit.rect.rounded_key())) {
            Entry::Vacant(slot) => {
                slot.insert(hit);
            },
            Entry::Occupied(mut slot) => {
                let kept = slot.get_mut();
                if kept.source_font.is_none() {
                    kept.source_font = hit.source_font;
                }
                if kept.source_size.is_none() {
                    kept.source_size = hit.source_size;
                }
                if kept.source_color.is_none() {
                    kept.source_color = hit.source_color;
                }
                dropped += 1;
            },
        }
    }

    if dropped > 0 {
        log::debug!("dropped {} duplicate hits", dropped);
    }
    unique.into_values().collect()
}
