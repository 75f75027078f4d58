//! Protected regions: short, upper-case, large standalone text.
//!
//! A placeholder rectangle that over-estimates its extent can reach into a
//! big heading such as `NEW` printed next to it. Hits overlapping such text
//! are not erased.

use crate::config::EraseConfig;
use crate::geometry::Rect;
use crate::layout::{PageLayout, TextRun};
use crate::pattern::PatternMatcher;

const SYMBOLS: &[char] = &['{', '}', '[', ']', '(', ')', '@', '#', '$', '%'];

/// True when `run` is protected text.
pub fn is_protected_run(run: &TextRun, config: &EraseConfig, matcher: &PatternMatcher) -> bool {
    let text = run.text.trim();
    let len = text.chars().count();
    if len == 0 || len > config.protected_max_chars {
        return false;
    }
    if run.font_size <= config.protected_min_font_size {
        return false;
    }
    let has_cased = text.chars().any(|c| c.is_uppercase());
    let has_lower = text.chars().any(|c| c.is_lowercase());
    if !has_cased || has_lower {
        return false;
    }
    if text.contains(SYMBOLS) {
        return false;
    }
    !matcher.contains_placeholder(text)
}

/// Rectangles of every protected run on the page.
pub fn protected_regions(layout: &PageLayout, config: &EraseConfig, matcher: &PatternMatcher) -> Vec<Rect> {
    layout
        .runs()
        .filter(|run| is_protected_run(run, config, matcher))
        .map(|run| run.rect)
        .collect()
}

/// The first protected region `rect` overlaps with positive area.
pub fn overlapping_region<'a>(rect: &Rect, regions: &'a [Rect]) -> Option<&'a Rect> {
    regions.iter().find(|region| rect.intersection_area(region) > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Color;

    fn run(text: &str, size: f32) -> TextRun {
        TextRun::new(text, Rect::new(0.0, 0.0, 100.0, size), "Helvetica-Bold", size, Color::black())
    }

    #[test]
    fn test_protection_rules() {
        let config = EraseConfig::default();
        let matcher = PatternMatcher::default();
        assert!(is_protected_run(&run("NEW", 36.0), &config, &matcher));
        assert!(is_protected_run(&run(" SALE ", 48.0), &config, &matcher));
        assert!(is_protected_run(&run("A1", 31.0), &config, &matcher));

        // size must exceed the threshold
        assert!(!is_protected_run(&run("NEW", 30.0), &config, &matcher));
        assert!(!is_protected_run(&run("New", 36.0), &config, &matcher));
        assert!(!is_protected_run(&run("BRANDS", 36.0), &config, &matcher));
        assert!(!is_protected_run(&run("2024", 36.0), &config, &matcher));
        assert!(!is_protected_run(&run("{{A}}", 36.0), &config, &matcher));
        assert!(!is_protected_run(&run("(A)", 36.0), &config, &matcher));
    }

    #[test]
    fn test_overlap_needs_positive_area() {
        let regions = vec![Rect::new(100.0, 0.0, 200.0, 40.0)];
        assert!(overlapping_region(&Rect::new(50.0, 10.0, 100.0, 20.0), &regions).is_none());
        assert!(overlapping_region(&Rect::new(50.0, 10.0, 100.5, 20.0), &regions).is_some());
    }
}
