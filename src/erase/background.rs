//! Background colour estimation under a rectangle.

use crate::engine::DocumentEngine;
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::layout::Color;

/// Mean colour of the rasterized rectangle.
///
/// An empty sample set yields `fallback`. A rasterization failure is an
/// [`Error::Erase`].
pub fn sample_background<D: DocumentEngine + ?Sized>(doc: &D, page: usize, rect: Rect, fallback: Color) -> Result<Color> {
    let samples = doc.rasterize(page, rect).map_err(|e| Error::Erase {
        page,
        reason: format!("rasterization failed: {}", e),
    })?;
    Ok(samples.average().unwrap_or(fallback))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::memory::Fault;
    use crate::engine::MemoryDocument;

    #[test]
    fn test_sampled_colour() {
        let mut doc = MemoryDocument::new();
        let page = doc.add_page(100.0, 100.0);
        doc.set_background(page, Color::from_rgb8(240, 230, 140)).unwrap();
        let color = sample_background(&doc, page, Rect::new(10.0, 10.0, 30.0, 20.0), Color::white()).unwrap();
        assert_eq!(color.to_rgb8(), [240, 230, 140]);
    }

    #[test]
    fn test_empty_sample_uses_fallback() {
        let mut doc = MemoryDocument::new();
        let page = doc.add_page(100.0, 100.0);
        let color = sample_background(&doc, page, Rect::new(500.0, 500.0, 510.0, 510.0), Color::black()).unwrap();
        assert_eq!(color, Color::black());
    }

    #[test]
    fn test_failure_is_erase_error() {
        let mut doc = MemoryDocument::new();
        let page = doc.add_page(100.0, 100.0);
        doc.set_fault(page, Fault::Rasterize).unwrap();
        let result = sample_background(&doc, page, Rect::new(0.0, 0.0, 5.0, 5.0), Color::white());
        assert!(matches!(result, Err(Error::Erase { page: 0, .. })));
    }
}
