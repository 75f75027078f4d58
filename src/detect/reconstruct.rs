//! Mapping character-offset matches back to page space.
//!
//! Inside a run every character is assumed to take an equal share of the
//! run's width. This is exact for monospaced text and an approximation for
//! proportional fonts, absorbed by the horizontal pad.

use crate::config::DetectionConfig;
use crate::engine::DocumentEngine;
use crate::error::Result;
use crate::geometry::Rect;
use crate::layout::{TextLine, TextRun};

/// Rectangle of characters `start..end` of `line`, built from the runs the
/// span touches.
///
/// Runs without width contribute nothing. A partial narrower than
/// `min_partial_width` is widened around its midpoint. The union is padded
/// horizontally by `horizontal_pad`. Returns `None` when no run with
/// positive width overlaps the span.
///
/// # Examples
///
/// ```
/// use placeholder_oxide::config::DetectionConfig;
/// use placeholder_oxide::detect::reconstruct_span;
/// use placeholder_oxide::geometry::Rect;
/// use placeholder_oxide::layout::{Color, TextLine, TextRun};
///
/// let line = TextLine::new(vec![
///     TextRun::new("Hi {{na", Rect::new(0.0, 0.0, 70.0, 12.0), "Helvetica", 10.0, Color::black()),
///     TextRun::new("me}}!", Rect::new(70.0, 0.0, 120.0, 12.0), "Helvetica", 10.0, Color::black()),
/// ]);
/// let rect = reconstruct_span(&line, 3, 11, &DetectionConfig::default()).unwrap();
/// assert_eq!(rect, Rect::new(29.5, 0.0, 110.5, 12.0));
/// ```
pub fn reconstruct_span(line: &TextLine, start: usize, end: usize, config: &DetectionConfig) -> Option<Rect> {
    let mut pos = 0;
    let mut partials: Vec<Rect> = Vec::new();

    for run in &line.runs {
        let n = run.char_count();
        let ov0 = start.max(pos);
        let ov1 = end.min(pos + n);
        if ov0 < ov1 && run.rect.width() > 0.0 {
            let mut partial = run.span_rect(ov0 - pos, ov1 - pos);
            if partial.width() < config.min_partial_width {
                let mid = (partial.x0 + partial.x1) / 2.0;
                let half = config.min_partial_width / 2.0;
                partial = Rect::new(mid - half, partial.y0, mid + half, partial.y1);
            }
            partials.push(partial);
        }
        pos += n;
        if pos >= end {
            break;
        }
    }

    partials
        .into_iter()
        .reduce(|a, b| a.union(&b))
        .map(|r| r.pad_x(config.horizontal_pad))
}

/// Rectangle of `raw` by literal search, restricted to the vertical band of
/// `line`.
///
/// `nth` selects among several hits in the band (the n-th occurrence of the
/// same text in the line, left to right).
pub fn search_fallback<D: DocumentEngine + ?Sized>(
    doc: &D,
    page: usize,
    line: &TextLine,
    raw: &str,
    nth: usize,
    config: &DetectionConfig,
) -> Result<Option<Rect>> {
    let Some(band) = line.bbox() else {
        return Ok(None);
    };
    let tol = config.search_band_tolerance;
    let mut in_band: Vec<Rect> = doc
        .search_literal(page, raw)?
        .into_iter()
        .filter(|r| r.y0 >= band.y0 - tol && r.y1 <= band.y1 + tol)
        .collect();
    in_band.sort_by(|a, b| a.x0.total_cmp(&b.x0));
    let chosen = in_band.get(nth).or_else(|| in_band.last()).copied();
    Ok(chosen.map(|r| r.pad_x(config.horizontal_pad)))
}

/// The run sharing the largest area with `rect`.
pub fn dominant_run<'a>(line: &'a TextLine, rect: &Rect) -> Option<&'a TextRun> {
    line.runs
        .iter()
        .map(|run| (run, run.rect.intersection_area(rect)))
        .filter(|(_, area)| *area > 0.0)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(run, _)| run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Color;

    fn run(text: &str, x0: f32, x1: f32) -> TextRun {
        TextRun::new(text, Rect::new(x0, 100.0, x1, 112.0), "Helvetica", 10.0, Color::black())
    }

    #[test]
    fn test_whole_run_reconstructs_run_rect() {
        let line = TextLine::new(vec![run("{{name}}", 50.0, 130.0)]);
        let rect = reconstruct_span(&line, 0, 8, &DetectionConfig::default()).unwrap();
        assert_eq!(rect, Rect::new(49.5, 100.0, 130.5, 112.0));
    }

    #[test]
    fn test_zero_width_runs_are_skipped() {
        let line = TextLine::new(vec![run("{{", 10.0, 10.0), run("k}}", 10.0, 40.0)]);
        let rect = reconstruct_span(&line, 0, 5, &DetectionConfig::default().with_horizontal_pad(0.0)).unwrap();
        assert_eq!(rect, Rect::new(10.0, 100.0, 40.0, 112.0));

        let flat = TextLine::new(vec![run("{{k}}", 10.0, 10.0)]);
        assert!(reconstruct_span(&flat, 0, 5, &DetectionConfig::default()).is_none());
    }

    #[test]
    fn test_narrow_partial_is_widened() {
        // 100 chars over 10 units: one char is 0.1 wide
        let text = "x".repeat(100);
        let line = TextLine::new(vec![run(&text, 0.0, 10.0)]);
        let rect = reconstruct_span(&line, 50, 51, &DetectionConfig::default().with_horizontal_pad(0.0)).unwrap();
        assert!((rect.width() - 0.5).abs() < 1e-5);
        assert!((rect.center().x - 5.05).abs() < 1e-5);
    }

    #[test]
    fn test_dominant_run() {
        let line = TextLine::new(vec![run("ab", 0.0, 20.0), run("cdef", 20.0, 60.0)]);
        let picked = dominant_run(&line, &Rect::new(15.0, 100.0, 50.0, 112.0)).unwrap();
        assert_eq!(picked.text, "cdef");
        assert!(dominant_run(&line, &Rect::new(100.0, 0.0, 110.0, 5.0)).is_none());
    }
}
