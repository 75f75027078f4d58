//! Geometric primitives in page space.
//!
//! Rectangles are stored by their corners `(x0, y0, x1, y1)` with the
//! invariant `x0 <= x1` and `y0 <= y1`. The y axis grows downwards, as in
//! the text layout reported by a [`DocumentEngine`](crate::engine::DocumentEngine).

use serde::{Deserialize, Serialize};

/// A 2D point in page space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// use placeholder_oxide::geometry::Point;
    ///
    /// let point = Point::new(10.0, 20.0);
    /// assert_eq!(point.x, 10.0);
    /// assert_eq!(point.y, 20.0);
    /// ```
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in page space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl Rect {
    /// Create a rectangle from two corners.
    ///
    /// Corners are reordered so that the result always satisfies
    /// `x0 <= x1` and `y0 <= y1`.
    ///
    /// # Examples
    ///
    /// ```
    /// use placeholder_oxide::geometry::Rect;
    ///
    /// let rect = Rect::new(110.0, 70.0, 10.0, 20.0);
    /// assert_eq!(rect.x0, 10.0);
    /// assert_eq!(rect.y1, 70.0);
    /// assert_eq!(rect.width(), 100.0);
    /// ```
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Create a rectangle from its top-left corner and dimensions.
    pub fn from_size(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Get the center point of the rectangle.
    ///
    /// # Examples
    ///
    /// ```
    /// use placeholder_oxide::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    /// let center = rect.center();
    /// assert_eq!(center.x, 50.0);
    /// assert_eq!(center.y, 25.0);
    /// ```
    pub fn center(&self) -> Point {
        Point {
            x: (self.x0 + self.x1) / 2.0,
            y: (self.y0 + self.y1) / 2.0,
        }
    }

    /// Area of the rectangle.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// True when the rectangle has no area.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Check if this rectangle shares a positive-area region with another.
    ///
    /// Rectangles that only touch along an edge do not intersect.
    ///
    /// # Examples
    ///
    /// ```
    /// use placeholder_oxide::geometry::Rect;
    ///
    /// let r1 = Rect::new(0.0, 0.0, 100.0, 100.0);
    /// let r2 = Rect::new(50.0, 50.0, 150.0, 150.0);
    /// let r3 = Rect::new(100.0, 0.0, 200.0, 100.0);
    ///
    /// assert!(r1.intersects(&r2));
    /// assert!(!r1.intersects(&r3));
    /// ```
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x0 < other.x1 && self.x1 > other.x0 && self.y0 < other.y1 && self.y1 > other.y0
    }

    /// Intersection of two rectangles, or `None` when they do not overlap.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        Some(Rect {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        })
    }

    /// Area shared with another rectangle (zero when disjoint).
    pub fn intersection_area(&self, other: &Rect) -> f32 {
        self.intersection(other).map(|r| r.area()).unwrap_or(0.0)
    }

    /// Check if this rectangle contains a point (edges inclusive).
    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.x0 && p.x <= self.x1 && p.y >= self.y0 && p.y <= self.y1
    }

    /// Check if this rectangle fully contains another.
    pub fn contains(&self, other: &Rect) -> bool {
        other.x0 >= self.x0 && other.x1 <= self.x1 && other.y0 >= self.y0 && other.y1 <= self.y1
    }

    /// Smallest rectangle containing both rectangles.
    ///
    /// # Examples
    ///
    /// ```
    /// use placeholder_oxide::geometry::Rect;
    ///
    /// let r1 = Rect::new(0.0, 0.0, 50.0, 50.0);
    /// let r2 = Rect::new(25.0, 25.0, 75.0, 75.0);
    /// let union = r1.union(&r2);
    ///
    /// assert_eq!(union, Rect::new(0.0, 0.0, 75.0, 75.0));
    /// ```
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Grow (or shrink, for negative values) both horizontal sides.
    pub fn pad_x(&self, pad: f32) -> Rect {
        Rect::new(self.x0 - pad, self.y0, self.x1 + pad, self.y1)
    }

    /// Shrink every side by `pad`, never inverting the rectangle.
    pub fn inset(&self, pad: f32) -> Rect {
        let c = self.center();
        let half_w = (self.width() / 2.0 - pad).max(0.0);
        let half_h = (self.height() / 2.0 - pad).max(0.0);
        Rect::new(c.x - half_w, c.y - half_h, c.x + half_w, c.y + half_h)
    }

    /// Scale width and height around the center.
    pub fn scale_about_center(&self, sx: f32, sy: f32) -> Rect {
        let c = self.center();
        let half_w = self.width() * sx / 2.0;
        let half_h = self.height() * sy / 2.0;
        Rect::new(c.x - half_w, c.y - half_h, c.x + half_w, c.y + half_h)
    }

    /// Clamp this rectangle into `bounds`.
    pub fn clamp_to(&self, bounds: &Rect) -> Rect {
        Rect::new(
            self.x0.clamp(bounds.x0, bounds.x1),
            self.y0.clamp(bounds.y0, bounds.y1),
            self.x1.clamp(bounds.x0, bounds.x1),
            self.y1.clamp(bounds.y0, bounds.y1),
        )
    }

    /// Translate the rectangle.
    pub fn offset(&self, dx: f32, dy: f32) -> Rect {
        Rect {
            x0: self.x0 + dx,
            y0: self.y0 + dy,
            x1: self.x1 + dx,
            y1: self.y1 + dy,
        }
    }

    /// Corners rounded to hundredths, as integers, for equality checks that
    /// must tolerate floating point noise.
    pub fn rounded_key(&self) -> [i64; 4] {
        let r = |v: f32| (v as f64 * 100.0).round() as i64;
        [r(self.x0), r(self.y0), r(self.x1), r(self.y1)]
    }
}
