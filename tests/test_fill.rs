//! Integration tests for fitted replacement.

mod common;

use common::{approx, one_line_document, unicode_font, write_font};
use placeholder_oxide::config::{DetectionConfig, FitConfig, FontConfig};
use placeholder_oxide::detect::{detect, PlaceholderHit};
use placeholder_oxide::engine::{DocumentEngine, MemoryDocument, TextAlign};
use placeholder_oxide::fill::{fill, fit_single_line, FillOutcome, FillRequest, FitMode, SizeMode, SizePlan};
use placeholder_oxide::fonts::{FallbackFontSet, FontCache, FontResolver};
use placeholder_oxide::layout::{Color, TextRun};
use proptest::prelude::*;
use tempfile::TempDir;

fn run_fill(doc: &mut MemoryDocument, request: &FillRequest) -> (Vec<PlaceholderHit>, FillOutcome) {
    let hits = detect(doc, &DetectionConfig::default()).unwrap();
    let fonts = FontConfig::default();
    let fallbacks = FallbackFontSet::empty();
    let cache = FontCache::new(&fonts);
    let resolver = FontResolver::new(&fonts, &fallbacks, &cache);
    let outcome = fill(doc, &hits, request, &resolver, &FitConfig::default()).unwrap();
    (hits, outcome)
}

fn drawn_run(doc: &MemoryDocument, page: usize, text: &str) -> TextRun {
    doc.page_layout(page)
        .unwrap()
        .runs()
        .find(|r| r.text == text)
        .cloned()
        .unwrap_or_else(|| panic!("no run '{}'", text))
}

mod sizing {
    use super::*;

    #[test]
    fn test_short_value_keeps_start_size() {
        let (mut doc, _) = one_line_document("Name: {{name}}", 20.0);
        let (hits, outcome) = run_fill(&mut doc, &FillRequest::new().with_value("name", "Al"));
        let plan = SizePlan::single_line(SizeMode::Auto, hits[0].rect.height(), &FitConfig::default());
        let diag = &outcome.diagnostics[0];
        assert!(approx(diag.size, plan.start, 1e-4));
        assert!(!diag.clipped);
    }

    #[test]
    fn test_long_value_shrinks_inside_rect() {
        let (mut doc, _) = one_line_document("Name: {{name}}", 20.0);
        let value = "Bartholomew";
        let (hits, outcome) = run_fill(&mut doc, &FillRequest::new().with_value("name", value));
        let diag = &outcome.diagnostics[0];
        assert!(!diag.clipped);

        let run = drawn_run(&doc, 0, value);
        let inner = hits[0].rect.inset(FitConfig::default().inner_pad);
        assert!(run.rect.x0 >= inner.x0 - 1e-3);
        assert!(run.rect.x1 <= inner.x1 + 0.01 + 1e-3);
        assert!(approx(run.font_size, diag.size, 1e-4));
    }

    #[test]
    fn test_hopeless_value_is_clipped_at_floor() {
        let (mut doc, _) = one_line_document("{{x}}", 10.0);
        let value = "a value far too long to ever fit into such a tiny placeholder";
        let (_, outcome) = run_fill(&mut doc, &FillRequest::new().with_value("x", value));
        assert_eq!(outcome.clipped().count(), 1);
        assert!(approx(outcome.diagnostics[0].size, FitConfig::default().min_size, 1e-4));
        assert_eq!(doc.search_literal(0, value).unwrap().len(), 1);
    }

    #[test]
    fn test_fixed_size_is_honoured() {
        let (mut doc, _) = one_line_document("Name: {{name}}", 20.0);
        let request = FillRequest::new().with_value("name", "Al").with_size(SizeMode::Fixed(9.0));
        let (_, outcome) = run_fill(&mut doc, &request);
        assert_eq!(outcome.diagnostics[0].size, 9.0);
    }

    #[test]
    fn test_overflow_grants_more_room() {
        let value = "Bartholomew Montgomery";
        let (mut tight, _) = one_line_document("Name: {{name}}", 20.0);
        let (_, tight_outcome) = run_fill(&mut tight, &FillRequest::new().with_value("name", value));

        let (mut loose, _) = one_line_document("Name: {{name}}", 20.0);
        let request = FillRequest::new().with_value("name", value).with_overflow(true);
        let (hits, loose_outcome) = run_fill(&mut loose, &request);

        assert!(loose_outcome.diagnostics[0].size >= tight_outcome.diagnostics[0].size);
        assert!(loose_outcome.diagnostics[0].rect.width() > hits[0].rect.width());
    }
}

mod box_mode {
    use super::*;

    #[test]
    fn test_box_mode_wraps_inside_rect() {
        let mut doc = MemoryDocument::new();
        let page = doc.add_page(595.0, 842.0);
        doc.add_text(page, 40.0, 100.0, "{{address_block}}", "Helvetica", 24.0).unwrap();
        let request = FillRequest::new()
            .with_value("address_block", "12 Long Street\nSpringfield")
            .with_fit(FitMode::Box);

        let (hits, outcome) = run_fill(&mut doc, &request);
        let diag = &outcome.diagnostics[0];
        assert_eq!(diag.fit, FitMode::Box);
        assert!(!diag.clipped);
        assert!(diag.size >= FitConfig::default().box_min_size && diag.size <= FitConfig::default().max_size);

        let text = doc.page_text(page).unwrap();
        assert!(text.contains("Springfield"));
        let drawn = drawn_run(&doc, page, "Springfield");
        assert!(hits[0].rect.contains(&drawn.rect) || drawn.rect.y1 <= hits[0].rect.y1 + 1.0);
    }

    #[test]
    fn test_box_mode_reports_leftover_text() {
        let (mut doc, _) = one_line_document("{{note}}", 8.0);
        let value = "word ".repeat(200);
        let request = FillRequest::new().with_value("note", value).with_fit(FitMode::Box);
        let (_, outcome) = run_fill(&mut doc, &request);
        assert!(outcome.diagnostics[0].clipped);
        assert_eq!(outcome.diagnostics[0].size, FitConfig::default().box_min_size);
    }
}

mod values {
    use super::*;

    #[test]
    fn test_instance_value_beats_key_value() {
        let mut doc = MemoryDocument::new();
        let page = doc.add_page(595.0, 842.0);
        doc.add_text(page, 40.0, 100.0, "From {{date}}", "Helvetica", 12.0).unwrap();
        doc.add_text(page, 40.0, 200.0, "To {{date}}", "Helvetica", 12.0).unwrap();
        let request = FillRequest::new().with_value("date_1", "Monday").with_value("date", "Friday");

        let (_, outcome) = run_fill(&mut doc, &request);
        let texts: Vec<&str> = outcome.diagnostics.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(texts, ["Monday", "Friday"]);
        assert!(outcome.missing_keys.is_empty());
        assert!(drawn_run(&doc, page, "Monday").rect.y0 < 150.0);
    }

    #[test]
    fn test_hits_without_values_are_untouched() {
        let (mut doc, _) = one_line_document("{{name}} from {{city}}", 12.0);
        let (_, outcome) = run_fill(&mut doc, &FillRequest::new().with_value("NAME", "Ada"));
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.unfilled, ["city"]);
        assert_eq!(doc.search_literal(0, "{{city}}").unwrap().len(), 1);
    }

    #[test]
    fn test_colour_and_alignment() {
        let mut doc = MemoryDocument::new();
        let page = doc.add_page(595.0, 842.0);
        doc.add_text_runs(page, 40.0, 100.0, &["{{amount_due}}"], "Helvetica", 14.0, Color::from_rgb8(200, 0, 0))
            .unwrap();
        let request = FillRequest::new().with_value("amount_due", "9.50").with_align(TextAlign::Right);

        let (hits, _) = run_fill(&mut doc, &request);
        let run = drawn_run(&doc, page, "9.50");
        assert_eq!(run.color, Color::from_rgb8(200, 0, 0));
        let inner = hits[0].rect.inset(FitConfig::default().inner_pad);
        assert!(approx(run.rect.x1, inner.x1, 1e-3));
    }

    #[test]
    fn test_mojibake_value_is_repaired_before_drawing() {
        let dir = TempDir::new().unwrap();
        let font = write_font(dir.path(), "Unicode.ttf", &unicode_font());
        let (mut doc, _) = one_line_document("Name: {{name}}", 14.0);
        let request = FillRequest::new()
            .with_value("name", "Ã–zgÃ¼r")
            .with_font_override(&font);

        let (_, outcome) = run_fill(&mut doc, &request);
        assert_eq!(outcome.diagnostics[0].text, "Özgür");
        assert_eq!(doc.search_literal(0, "Özgür").unwrap().len(), 1);
    }
}

mod properties {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn prop_fit_stays_inside_unless_clipped(
            per_point in 0.5f32..40.0,
            lead in 0.0f32..20.0,
            available in 1.0f32..400.0,
            height in 4.0f32..60.0,
        ) {
            let config = FitConfig::default();
            let plan = SizePlan::single_line(SizeMode::Auto, height, &config);
            let fit = fit_single_line(|size| Ok(lead + per_point * size), available, &plan, &config).unwrap();

            prop_assert!(fit.size >= plan.floor - 1e-4);
            prop_assert!(fit.size <= plan.start + 1e-4);
            if !fit.clipped {
                prop_assert!(fit.width <= available + config.width_tolerance + 1e-3);
            } else {
                prop_assert!(fit.width > available);
            }
        }

        #[test]
        fn prop_more_room_never_means_smaller_text(
            per_point in 0.5f32..40.0,
            available in 1.0f32..300.0,
            extra in 0.0f32..200.0,
            height in 4.0f32..60.0,
        ) {
            let config = FitConfig::default();
            let plan = SizePlan::single_line(SizeMode::Auto, height, &config);
            let narrow = fit_single_line(|size| Ok(per_point * size), available, &plan, &config).unwrap();
            let wide = fit_single_line(|size| Ok(per_point * size), available + extra, &plan, &config).unwrap();
            prop_assert!(wide.size >= narrow.size - 1e-3);
        }

        #[test]
        fn prop_lower_floor_never_means_larger_text(
            per_point in 0.5f32..40.0,
            lead in 0.0f32..20.0,
            available in 1.0f32..300.0,
            height in 4.0f32..60.0,
            low_frac in 0.05f32..1.0,
            high_frac in 0.05f32..1.0,
        ) {
            let config = FitConfig::default();
            let base = SizePlan::single_line(SizeMode::Auto, height, &config);
            let (low_frac, high_frac) = (low_frac.min(high_frac), low_frac.max(high_frac));
            let low = SizePlan { floor: base.start * low_frac, ..base };
            let high = SizePlan { floor: base.start * high_frac, ..base };

            let measure = |size: f32| -> placeholder_oxide::Result<f32> { Ok(lead + per_point * size) };
            let fit_low = fit_single_line(measure, available, &low, &config).unwrap();
            let fit_high = fit_single_line(measure, available, &high, &config).unwrap();
            prop_assert!(fit_low.size <= fit_high.size + 1e-3);
        }
    }
}
