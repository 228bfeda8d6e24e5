//! Axis-aligned rectangles and the closed-form motion helper
//!
//! Everything here is pure. Coordinates are board pixels with y growing
//! downward, matching the host canvas.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box given by its top-left and bottom-right corners
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rect {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Box of `size` whose top-left corner sits at `origin`
    pub fn from_origin(origin: DVec2, size: DVec2) -> Self {
        Self::new(origin.x, origin.y, origin.x + size.x, origin.y + size.y)
    }

    /// Box of `size` centred on `center`
    pub fn from_center(center: DVec2, size: DVec2) -> Self {
        let half = size / 2.0;
        Self::new(
            center.x - half.x,
            center.y - half.y,
            center.x + half.x,
            center.y + half.y,
        )
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    #[inline]
    pub fn top_left(&self) -> DVec2 {
        DVec2::new(self.x1, self.y1)
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        DVec2::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Same box translated so its top-left corner is at `origin`
    pub fn moved_to(&self, origin: DVec2) -> Self {
        Self::from_origin(origin, DVec2::new(self.width(), self.height()))
    }

    /// Box grown by `margin` on every side
    pub fn inflated(&self, margin: f64) -> Self {
        Self::new(
            self.x1 - margin,
            self.y1 - margin,
            self.x2 + margin,
            self.y2 + margin,
        )
    }

    /// Strict interior test; points on an edge are outside
    #[inline]
    pub fn strictly_contains(&self, x: f64, y: f64) -> bool {
        x > self.x1 && x < self.x2 && y > self.y1 && y < self.y2
    }

    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.x1, self.y1),
            (self.x2, self.y2),
            (self.x2, self.y1),
            (self.x1, self.y2),
        ]
    }
}

/// Returns true if at least 3 of the 4 corners of `source` lie strictly
/// inside `dest`.
///
/// This is the hit test between a moving ball and every other body. It is
/// looser than an overlap test: a ball mostly covering the hole counts.
pub fn contains_at_least_three_corners(source: &Rect, dest: &Rect) -> bool {
    source
        .corners()
        .iter()
        .filter(|&&(x, y)| dest.strictly_contains(x, y))
        .count()
        >= 3
}

/// Constant-acceleration position on one axis: `origin + v0·t + ½·a·t²`
#[inline]
pub fn displacement(origin: f64, v0: f64, accel: f64, t: f64) -> f64 {
    origin + v0 * t + 0.5 * accel * t * t
}
