//! Proportional remapping between canvas sizes.

use super::is_valid_extent;
use crate::shapes::{Stroke, TextLabel, scale_point};
use kurbo::{Point, Size};

/// Per-axis scale factors from one canvas size to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rescale {
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Rescale {
    const IDENTITY: Self = Self {
        scale_x: 1.0,
        scale_y: 1.0,
    };

    /// Factors mapping geometry recorded on `from` onto `to`.
    ///
    /// Returns `None` when `from` has a zero, negative or non-finite extent.
    pub fn between(from: Size, to: Size) -> Option<Self> {
        if !is_valid_extent(from.width) || !is_valid_extent(from.height) {
            return None;
        }
        if from == to {
            return Some(Self::IDENTITY);
        }
        Some(Self {
            scale_x: to.width / from.width,
            scale_y: to.height / from.height,
        })
    }

    /// Factor applied to brush radii.
    pub fn scale_avg(&self) -> f64 {
        (self.scale_x + self.scale_y) / 2.0
    }

    /// Check if this maps every point onto itself.
    pub fn is_identity(&self) -> bool {
        self.scale_x == 1.0 && self.scale_y == 1.0
    }

    pub fn apply_point(&self, point: Point) -> Point {
        scale_point(point, self.scale_x, self.scale_y)
    }

    pub fn apply_points(&self, points: &mut [Point]) {
        for point in points {
            *point = self.apply_point(*point);
        }
    }

    pub fn apply_stroke(&self, stroke: &mut Stroke) {
        stroke.scale(self.scale_x, self.scale_y);
    }

    pub fn apply_text(&self, text: &mut TextLabel) {
        text.scale(self.scale_x, self.scale_y);
    }
}
