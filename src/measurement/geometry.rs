//! Point and corner types for page-pixel and physical coordinates.
//!
//! Pixel space follows the rendered image: origin at the top-left corner of
//! the page, Y growing downward. Physical space is anchored per rectangle:
//! origin at the rectangle's bottom-left corner, Y growing upward, in
//! millimetres.

use serde::{Deserialize, Serialize};

/// A point in page-pixel space (sub-pixel precision is kept).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another pixel point.
    pub fn distance_to(&self, other: &PixelPoint) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx.hypot(dy)
    }
}

/// A point in physical space (millimetres).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhysicalPoint {
    pub x: f64,
    pub y: f64,
}

impl PhysicalPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The four corners of an axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Corners<P> {
    pub top_left: P,
    pub top_right: P,
    pub bottom_left: P,
    pub bottom_right: P,
}

impl<P: Copy> Corners<P> {
    /// Apply `f` to every corner, keeping the corner roles.
    pub fn map<Q>(&self, mut f: impl FnMut(P) -> Q) -> Corners<Q> {
        Corners {
            top_left: f(self.top_left),
            top_right: f(self.top_right),
            bottom_left: f(self.bottom_left),
            bottom_right: f(self.bottom_right),
        }
    }

    /// Corners in export order: TL, TR, BL, BR.
    pub fn to_array(&self) -> [P; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ]
    }
}

impl Corners<PixelPoint> {
    /// Axis-aligned corners spanned by two diagonal points.
    pub fn from_diagonal(a: PixelPoint, b: PixelPoint) -> Self {
        let min_x = a.x.min(b.x);
        let max_x = a.x.max(b.x);
        let min_y = a.y.min(b.y);
        let max_y = a.y.max(b.y);

        // Pixel Y grows downward, so the top edge has the smaller Y.
        Self {
            top_left: PixelPoint::new(min_x, min_y),
            top_right: PixelPoint::new(max_x, min_y),
            bottom_left: PixelPoint::new(min_x, max_y),
            bottom_right: PixelPoint::new(max_x, max_y),
        }
    }
}
