//! Occurrence numbering for keys that appear more than once.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::PlaceholderHit;

/// Reading order: page, then top edge, then left edge.
pub fn reading_order(a: &PlaceholderHit, b: &PlaceholderHit) -> Ordering {
    a.page
        .cmp(&b.page)
        .then(a.rect.y0.total_cmp(&b.rect.y0))
        .then(a.rect.x0.total_cmp(&b.rect.x0))
}

/// Number the hits of each key 1, 2, ... in reading order.
pub fn assign_occurrences(hits: &mut [PlaceholderHit]) {
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, hit) in hits.iter().enumerate() {
        groups.entry(hit.lookup_key()).or_default().push(i);
    }
    for indices in groups.values_mut() {
        indices.sort_by(|&a, &b| reading_order(&hits[a], &hits[b]));
        let total = indices.len();
        for (n, &i) in indices.iter().enumerate() {
            hits[i].occurrence = n + 1;
            hits[i].occurrences = total;
        }
    }
}
