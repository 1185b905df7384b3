//! Shared raster plumbing: errors, colors and path conversion.

use kurbo::{BezPath, PathEl};
use lazyink_core::shapes::parse_css_color;
use thiserror::Error;
use tiny_skia::{Color, PathBuilder};

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid surface size {width}x{height}")]
    InvalidSize { width: f64, height: f64 },
    #[error("Media frame of {width}x{height} needs {expected} bytes, got {actual}")]
    InvalidFrame {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("Encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Convert a CSS color string, or `None` if it does not parse.
pub fn css_color(value: &str) -> Option<Color> {
    parse_css_color(value).map(|c| Color::from_rgba8(c.r, c.g, c.b, c.a))
}

/// Convert a CSS color string, falling back to opaque black.
///
/// Stroke colors can arrive from remote peers, so an unknown color must not
/// abort a repaint.
pub fn css_color_or_black(value: &str) -> Color {
    css_color(value).unwrap_or_else(|| {
        log::debug!("Unparseable color {value:?}, painting black");
        Color::BLACK
    })
}

/// Pixel extent of a canvas dimension.
pub fn pixel_extent(value: f64) -> Option<u32> {
    if value.is_finite() && value >= 1.0 && value <= u32::MAX as f64 {
        Some(value.round() as u32)
    } else {
        None
    }
}

/// Convert a kurbo path into a tiny-skia path. Empty paths give `None`.
pub fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut builder = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => builder.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => builder.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}
