//! Axis-aligned rectangles in page space.
//!
//! Coordinates follow the page's own origin: x grows rightward and y grows
//! downward, so `y0` is the top edge and `y1` the bottom edge.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle `(x0, y0, x1, y1)`.
///
/// Constructors normalise the corners so that `x0 <= x1` and `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    /// Creates a rectangle from two corners, in any order.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfpatch::geometry::Rect;
    ///
    /// let r = Rect::new(10.0, 20.0, 0.0, 5.0);
    /// assert_eq!((r.x0, r.y0, r.x1, r.y1), (0.0, 5.0, 10.0, 20.0));
    /// ```
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    /// Returns true if the rectangle encloses no area.
    pub fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    /// Intersection of two rectangles, `None` when they do not overlap.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfpatch::geometry::Rect;
    ///
    /// let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    /// let b = Rect::new(5.0, 5.0, 20.0, 20.0);
    /// assert_eq!(a.intersection(&b), Some(Rect::new(5.0, 5.0, 10.0, 10.0)));
    /// assert_eq!(a.intersection(&Rect::new(30.0, 30.0, 40.0, 40.0)), None);
    /// ```
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let r = Rect {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        if r.is_empty() {
            None
        } else {
            Some(r)
        }
    }

    /// Area shared with `other`; zero when disjoint.
    pub fn intersection_area(&self, other: &Rect) -> f32 {
        self.intersection(other).map_or(0.0, |r| r.area())
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Grows the rectangle by independent amounts on each side.
    pub fn expand(&self, left: f32, top: f32, right: f32, bottom: f32) -> Rect {
        Rect::new(
            self.x0 - left,
            self.y0 - top,
            self.x1 + right,
            self.y1 + bottom,
        )
    }

    /// Grows the rectangle by `pad` on every side.
    pub fn pad(&self, pad: f32) -> Rect {
        self.expand(pad, pad, pad, pad)
    }

    /// Length of the shared vertical extent, zero when the rows do not meet.
    pub fn vertical_overlap(&self, other: &Rect) -> f32 {
        (self.y1.min(other.y1) - self.y0.max(other.y0)).max(0.0)
    }

    /// Horizontal distance between the nearest edges, zero when the
    /// rectangles overlap horizontally.
    pub fn horizontal_gap(&self, other: &Rect) -> f32 {
        if other.x1 <= self.x0 {
            self.x0 - other.x1
        } else if other.x0 >= self.x1 {
            other.x0 - self.x1
        } else {
            0.0
        }
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }
}
