//! Auto-fit: the largest font size at which text stays inside a rectangle.
//!
//! Single-line fitting shrinks the size proportionally to the width excess
//! and re-measures. Box fitting binary-searches the size against the
//! engine's off-page box layout, so no attempt is ever drawn.

use crate::config::FitConfig;
use crate::engine::{DocumentEngine, DrawSpec, TextAlign};
use crate::error::Result;
use crate::geometry::{Point, Rect};

use super::request::SizeMode;

/// Size bounds for one fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizePlan {
    /// First size tried
    pub start: f32,
    /// Smallest acceptable size
    pub floor: f32,
    /// Largest acceptable size
    pub ceiling: f32,
    /// Shrink to fit (false for a fixed size)
    pub shrink: bool,
}

impl SizePlan {
    /// Plan for a single-line fit into a rectangle of height `height`.
    ///
    /// ```
    /// use placeholder_oxide::config::FitConfig;
    /// use placeholder_oxide::fill::{SizeMode, SizePlan};
    ///
    /// let config = FitConfig::default();
    /// let plan = SizePlan::single_line(SizeMode::Auto, 20.0, &config);
    /// assert!((plan.start - 12.4).abs() < 1e-4);
    /// assert_eq!(SizePlan::single_line(SizeMode::Auto, 100.0, &config).start, 28.0);
    /// assert_eq!(SizePlan::single_line(SizeMode::Fixed(90.0), 10.0, &config).start, 72.0);
    /// ```
    pub fn single_line(mode: SizeMode, height: f32, config: &FitConfig) -> Self {
        let natural = height * config.start_ratio;
        match mode {
            SizeMode::Auto => Self {
                start: natural.clamp(config.min_size, config.max_size),
                floor: config.min_size,
                ceiling: config.max_size,
                shrink: true,
            },
            SizeMode::Range { min, max } => {
                let (min, max) = explicit_range(min, max, config);
                Self {
                    start: natural.clamp(min, max),
                    floor: min,
                    ceiling: max,
                    shrink: true,
                }
            },
            SizeMode::Fixed(size) => Self::fixed(size, config),
        }
    }

    /// Plan for a box fit.
    pub fn boxed(mode: SizeMode, config: &FitConfig) -> Self {
        match mode {
            SizeMode::Auto => Self {
                start: config.max_size,
                floor: config.box_min_size.min(config.max_size),
                ceiling: config.max_size,
                shrink: true,
            },
            SizeMode::Range { min, max } => {
                let (min, max) = explicit_range(min, max, config);
                Self {
                    start: max,
                    floor: min,
                    ceiling: max,
                    shrink: true,
                }
            },
            SizeMode::Fixed(size) => Self::fixed(size, config),
        }
    }

    fn fixed(size: f32, config: &FitConfig) -> Self {
        let size = size.clamp(config.explicit_min_size, config.explicit_max_size);
        Self {
            start: size,
            floor: size,
            ceiling: size,
            shrink: false,
        }
    }
}

fn explicit_range(min: f32, max: f32, config: &FitConfig) -> (f32, f32) {
    let lo = min.clamp(config.explicit_min_size, config.explicit_max_size);
    let hi = max.clamp(config.explicit_min_size, config.explicit_max_size);
    if lo <= hi {
        (lo, hi)
    } else {
        (hi, lo)
    }
}

/// Result of a single-line fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    /// Chosen size
    pub size: f32,
    /// Measured width at that size
    pub width: f32,
    /// Measurements taken
    pub iterations: usize,
    /// Wider than the available width even at the chosen size
    pub clipped: bool,
    /// Fitted within the iteration bound
    pub converged: bool,
}

/// Shrink from `plan.start` until `measure(size)` fits `available` width.
///
/// Each step scales the size by `available / width`. Reaching the floor
/// stops with the floor size, flagged as clipped if it is still too wide.
/// Running out of iterations keeps the last computed size.
pub fn fit_single_line<F>(mut measure: F, available: f32, plan: &SizePlan, config: &FitConfig) -> Result<LineFit>
where
    F: FnMut(f32) -> Result<f32>,
{
    let limit = available + config.width_tolerance;
    let mut size = plan.start;
    let mut width = measure(size)?;
    let mut iterations = 1;

    if !plan.shrink || width <= limit {
        return Ok(LineFit {
            size,
            width,
            iterations,
            clipped: width > limit,
            converged: true,
        });
    }

    while iterations < config.max_iterations.max(1) {
        let next = if available > 0.0 && width > 0.0 {
            size * (available / width)
        } else {
            plan.floor
        };
        if next <= plan.floor {
            size = plan.floor;
            width = measure(size)?;
            iterations += 1;
            return Ok(LineFit {
                size,
                width,
                iterations,
                clipped: width > limit,
                converged: true,
            });
        }
        // guard against a measure that does not shrink with the size
        size = next.min(size);
        width = measure(size)?;
        iterations += 1;
        if width <= limit {
            return Ok(LineFit {
                size,
                width,
                iterations,
                clipped: false,
                converged: true,
            });
        }
    }

    log::warn!(
        "single-line fit did not converge after {} measurements, keeping {:.2}pt",
        iterations,
        size
    );
    Ok(LineFit {
        size,
        width,
        iterations,
        clipped: width > limit,
        converged: false,
    })
}

/// Horizontal start of a line of `width` inside `inner`, kept inside it
/// when the line fits.
///
/// ```
/// use placeholder_oxide::engine::TextAlign;
/// use placeholder_oxide::fill::aligned_x;
/// use placeholder_oxide::geometry::Rect;
///
/// let inner = Rect::new(10.0, 0.0, 110.0, 20.0);
/// assert_eq!(aligned_x(&inner, 40.0, TextAlign::Left), 10.0);
/// assert_eq!(aligned_x(&inner, 40.0, TextAlign::Center), 40.0);
/// assert_eq!(aligned_x(&inner, 40.0, TextAlign::Right), 70.0);
/// assert_eq!(aligned_x(&inner, 140.0, TextAlign::Right), 10.0);
/// ```
pub fn aligned_x(inner: &Rect, width: f32, align: TextAlign) -> f32 {
    let x = match align {
        TextAlign::Left => inner.x0,
        TextAlign::Center => inner.x0 + (inner.width() - width) / 2.0,
        TextAlign::Right => inner.x1 - width,
    };
    x.clamp(inner.x0, (inner.x1 - width).max(inner.x0))
}

/// Baseline y for a line of text at `size` inside `inner`.
pub fn baseline_y(inner: &Rect, size: f32, config: &FitConfig) -> f32 {
    let mut y = inner.y0 + config.ascent_ratio * size;
    if config.vertical_centering {
        let slack = (inner.height() - config.cap_height_ratio * size) / 2.0;
        y += slack.clamp(-config.max_vertical_shift, config.max_vertical_shift);
    }
    y
}

/// Baseline origin for single-line text.
pub fn line_origin(inner: &Rect, fit: &LineFit, align: TextAlign, config: &FitConfig) -> Point {
    Point::new(aligned_x(inner, fit.width, align), baseline_y(inner, fit.size, config))
}

/// `rect` grown for overflowing content, kept on the page.
///
/// ```
/// use placeholder_oxide::config::FitConfig;
/// use placeholder_oxide::fill::expand_for_overflow;
/// use placeholder_oxide::geometry::Rect;
///
/// let page = Rect::new(0.0, 0.0, 600.0, 800.0);
/// let grown = expand_for_overflow(&Rect::new(100.0, 100.0, 200.0, 110.0), &page, &FitConfig::default());
/// assert_eq!(grown, Rect::new(75.0, 98.5, 225.0, 111.5));
/// ```
pub fn expand_for_overflow(rect: &Rect, page: &Rect, config: &FitConfig) -> Rect {
    rect.scale_about_center(config.overflow_width_scale, config.overflow_height_scale)
        .clamp_to(page)
}

/// Result of a box fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxFit {
    /// Chosen size
    pub size: f32,
    /// Layouts computed
    pub iterations: usize,
    /// Text is left over even at the chosen size
    pub clipped: bool,
}

/// Largest size in the plan's range at which the engine lays out all of
/// `spec.text` inside `rect`. Measurement only; nothing is drawn.
pub fn fit_box<D: DocumentEngine + ?Sized>(
    doc: &D,
    rect: Rect,
    spec: &DrawSpec<'_>,
    plan: &SizePlan,
    config: &FitConfig,
) -> Result<BoxFit> {
    let overflows = |size: f32| -> Result<bool> {
        let attempt = DrawSpec { size, ..*spec };
        Ok(doc.layout_text_box(rect, &attempt)?.overflow)
    };

    let mut iterations = 1;
    if !overflows(plan.ceiling)? {
        return Ok(BoxFit {
            size: plan.ceiling,
            iterations,
            clipped: false,
        });
    }
    if !plan.shrink || plan.floor >= plan.ceiling {
        return Ok(BoxFit {
            size: plan.ceiling,
            iterations,
            clipped: true,
        });
    }

    iterations += 1;
    if overflows(plan.floor)? {
        log::warn!("text does not fit even at {:.2}pt, drawing clipped", plan.floor);
        return Ok(BoxFit {
            size: plan.floor,
            iterations,
            clipped: true,
        });
    }

    // floor fits, ceiling does not
    let (mut lo, mut hi) = (plan.floor, plan.ceiling);
    for _ in 0..config.box_iterations {
        let mid = (lo + hi) / 2.0;
        iterations += 1;
        if overflows(mid)? {
            hi = mid;
        } else {
            lo = mid;
        }
        if hi - lo < 0.05 {
            break;
        }
    }
    Ok(BoxFit {
        size: lo,
        iterations,
        clipped: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemoryDocument;
    use crate::fonts::FontStyle;
    use crate::layout::Color;

    fn linear(per_point: f32) -> impl FnMut(f32) -> Result<f32> {
        move |size| Ok(size * per_point)
    }

    fn auto(height: f32) -> SizePlan {
        SizePlan::single_line(SizeMode::Auto, height, &FitConfig::default())
    }

    #[test]
    fn test_fits_without_shrinking() {
        let fit = fit_single_line(linear(2.0), 100.0, &auto(20.0), &FitConfig::default()).unwrap();
        assert!((fit.size - 12.4).abs() < 1e-4);
        assert_eq!(fit.iterations, 1);
        assert!(!fit.clipped);
    }

    #[test]
    fn test_shrinks_proportionally() {
        let fit = fit_single_line(linear(10.0), 100.0, &auto(20.0), &FitConfig::default()).unwrap();
        assert!((fit.size - 10.0).abs() < 1e-3);
        assert!(fit.width <= 100.01);
        assert!(!fit.clipped);
    }

    #[test]
    fn test_floor_reached_is_clipped() {
        let fit = fit_single_line(linear(100.0), 100.0, &auto(20.0), &FitConfig::default()).unwrap();
        assert_eq!(fit.size, 6.0);
        assert!(fit.clipped);
        assert!(fit.converged);
    }

    #[test]
    fn test_fixed_size_never_shrinks() {
        let plan = SizePlan::single_line(SizeMode::Fixed(14.0), 20.0, &FitConfig::default());
        let fit = fit_single_line(linear(10.0), 100.0, &plan, &FitConfig::default()).unwrap();
        assert_eq!(fit.size, 14.0);
        assert!(fit.clipped);
    }

    #[test]
    fn test_range_clamps_start_and_floor() {
        let config = FitConfig::default();
        let plan = SizePlan::single_line(SizeMode::Range { min: 9.0, max: 11.0 }, 40.0, &config);
        assert_eq!((plan.start, plan.floor, plan.ceiling), (11.0, 9.0, 11.0));
        let plan = SizePlan::single_line(SizeMode::Range { min: 80.0, max: 2.0 }, 40.0, &config);
        assert_eq!((plan.floor, plan.ceiling), (6.0, 72.0));
    }

    #[test]
    fn test_non_converging_keeps_last_size() {
        let config = FitConfig {
            max_iterations: 2,
            ..FitConfig::default()
        };
        // width ignores size: never fits, and each step stays above the floor
        let fit = fit_single_line(|_| Ok(500.0), 450.0, &auto(40.0), &config).unwrap();
        assert!(!fit.converged);
        assert!(fit.clipped);
        assert!(fit.size >= 6.0);
    }

    #[test]
    fn test_baseline_centering_is_bounded() {
        let config = FitConfig::default();
        let inner = Rect::new(0.0, 0.0, 100.0, 12.0);
        let y = baseline_y(&inner, 10.0, &config);
        assert!((y - (8.0 + 1.75)).abs() < 1e-4);

        let tall = Rect::new(0.0, 0.0, 100.0, 200.0);
        assert!((baseline_y(&tall, 10.0, &config) - 20.0).abs() < 1e-4);

        let flat = config.clone().with_vertical_centering(false);
        assert_eq!(baseline_y(&tall, 10.0, &flat), 8.0);
    }

    #[test]
    fn test_overflow_expansion_clamped_to_page() {
        let page = Rect::new(0.0, 0.0, 100.0, 100.0);
        let grown = expand_for_overflow(&Rect::new(0.0, 0.0, 40.0, 10.0), &page, &FitConfig::default());
        assert_eq!(grown.x0, 0.0);
        assert_eq!(grown.y0, 0.0);
        assert!((grown.x1 - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_box_fit_converges_below_ceiling() {
        let mut doc = MemoryDocument::new();
        let font = doc.builtin_font("Helvetica").unwrap();
        let spec = DrawSpec {
            text: "a fairly long sentence that needs wrapping inside a small box",
            font,
            size: 12.0,
            color: Color::black(),
            align: TextAlign::Left,
            synthetic: FontStyle::Normal,
        };
        let rect = Rect::new(0.0, 0.0, 120.0, 40.0);
        let config = FitConfig::default();
        let fit = fit_box(&doc, rect, &spec, &SizePlan::boxed(SizeMode::Auto, &config), &config).unwrap();
        assert!(!fit.clipped);
        assert!(fit.size > 4.0 && fit.size < 28.0);
        let layout = doc.layout_text_box(rect, &DrawSpec { size: fit.size, ..spec }).unwrap();
        assert!(!layout.overflow);
    }

    #[test]
    fn test_box_fit_clipped_at_floor() {
        let mut doc = MemoryDocument::new();
        let font = doc.builtin_font("Helvetica").unwrap();
        let spec = DrawSpec {
            text: "Supercalifragilisticexpialidocious",
            font,
            size: 12.0,
            color: Color::black(),
            align: TextAlign::Left,
            synthetic: FontStyle::Normal,
        };
        let config = FitConfig::default();
        let fit = fit_box(&doc, Rect::new(0.0, 0.0, 20.0, 10.0), &spec, &SizePlan::boxed(SizeMode::Auto, &config), &config)
            .unwrap();
        assert!(fit.clipped);
        assert_eq!(fit.size, 4.0);
    }
}
