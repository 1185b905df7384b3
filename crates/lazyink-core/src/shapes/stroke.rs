//! Freehand stroke record and its smoothed path.

use super::{AuthorId, midpoint, scale_point};
use kurbo::{BezPath, Point};
use serde::{Deserialize, Serialize};

/// A committed freehand stroke (series of smoothed brush points).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    /// Brush points in canvas pixel space.
    pub points: Vec<Point>,
    /// CSS color string.
    #[serde(rename = "brushColor", alias = "color")]
    pub color: String,
    /// Brush radius; the stroke is `2 * radius` wide.
    #[serde(rename = "brushRadius", alias = "radius")]
    pub radius: f64,
    /// Author of the stroke, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<AuthorId>,
    /// Creation time in milliseconds since the UNIX epoch.
    #[serde(default)]
    pub timestamp: i64,
}

impl Stroke {
    /// Minimum number of points a committed stroke carries.
    pub const MIN_POINTS: usize = 2;

    /// Create a stroke from existing points.
    pub fn new(points: Vec<Point>, color: impl Into<String>, radius: f64) -> Self {
        Self {
            points,
            color: color.into(),
            radius,
            author_id: None,
            timestamp: 0,
        }
    }

    /// Set the author.
    pub fn with_author(mut self, author_id: Option<AuthorId>) -> Self {
        self.author_id = author_id;
        self
    }

    /// Set the creation timestamp.
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Whether the stroke has enough points to be committed.
    pub fn is_committable(&self) -> bool {
        self.points.len() >= Self::MIN_POINTS
    }

    /// Remap the stroke onto a canvas scaled by `(scale_x, scale_y)`.
    /// The radius follows the average of both factors.
    pub fn scale(&mut self, scale_x: f64, scale_y: f64) {
        for point in &mut self.points {
            *point = scale_point(*point, scale_x, scale_y);
        }
        self.radius *= (scale_x + scale_y) / 2.0;
    }
}

/// Build a smooth path through `points` using rolling midpoints.
///
/// Each consecutive pair contributes a quadratic segment whose control point
/// is the earlier point and whose end is the pair's midpoint; the path ends
/// with a straight segment to the last point. Fewer than two points yield an
/// empty path.
pub fn quadratic_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return path;
    };
    if points.len() < 2 {
        return path;
    }

    path.move_to(*first);
    for pair in points.windows(2) {
        path.quad_to(pair[0], midpoint(pair[0], pair[1]));
    }
    path.line_to(*last);
    path
}
