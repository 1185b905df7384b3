//! Drawable records: committed strokes and text labels.

mod color;
mod stroke;
mod text;

pub use color::{SerializableColor, parse_css_color};
pub use stroke::{Stroke, quadratic_path};
pub use text::{Padding, TextLabel, TextMetrics};

use kurbo::Point;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

/// Identifier of the participant that authored a stroke or label.
pub type AuthorId = i64;

/// Wall-clock milliseconds since the UNIX epoch, used to stamp new records.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Midpoint between two points.
pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new(a.x + (b.x - a.x) / 2.0, a.y + (b.y - a.y) / 2.0)
}

/// Scale a point independently on each axis.
pub fn scale_point(point: Point, scale_x: f64, scale_y: f64) -> Point {
    Point::new(point.x * scale_x, point.y * scale_y)
}
