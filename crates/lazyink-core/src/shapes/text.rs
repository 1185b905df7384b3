//! Text label record.

use super::{AuthorId, scale_point};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Padding around a label's background chip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    /// Vertical padding in pixels.
    pub v: f64,
    /// Horizontal padding in pixels.
    pub h: f64,
}

impl Default for Padding {
    fn default() -> Self {
        Self { v: 2.0, h: 4.0 }
    }
}

fn default_font_family() -> String {
    TextLabel::DEFAULT_FONT_FAMILY.to_string()
}

fn default_text_color() -> String {
    "#000".to_string()
}

/// A committed text annotation.
///
/// `(x, y)` is the left end of the baseline. The glyph box spans
/// `[x, x + width] x [y - height, y]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLabel {
    /// The text content.
    pub text: String,
    pub x: f64,
    pub y: f64,
    /// Measured advance width at commit time.
    #[serde(default)]
    pub width: f64,
    /// Line height at commit time.
    #[serde(default)]
    pub height: f64,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Font size divided by the canvas width at commit time.
    #[serde(default)]
    pub size_ratio: f64,
    /// CSS color of the glyphs.
    #[serde(default = "default_text_color")]
    pub color: String,
    /// CSS color of the background chip, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default)]
    pub background_padding: Padding,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<AuthorId>,
    #[serde(default)]
    pub timestamp: i64,
}

impl TextLabel {
    /// Font size used when a label carries no size ratio.
    pub const DEFAULT_FONT_SIZE: f64 = 15.0;
    /// Font family used when none is configured.
    pub const DEFAULT_FONT_FAMILY: &'static str = "verdana";
    /// Line height as a multiple of the font size.
    pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

    /// Create a label at a baseline anchor with default styling.
    pub fn new(text: impl Into<String>, anchor: Point) -> Self {
        Self {
            text: text.into(),
            x: anchor.x,
            y: anchor.y,
            width: 0.0,
            height: 0.0,
            font_family: default_font_family(),
            size_ratio: 0.0,
            color: default_text_color(),
            background_color: None,
            background_padding: Padding::default(),
            author_id: None,
            timestamp: 0,
        }
    }

    /// Baseline anchor.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Absolute font size on a canvas of the given width.
    pub fn font_size(&self, canvas_width: f64) -> f64 {
        if self.size_ratio > 0.0 {
            self.size_ratio * canvas_width
        } else {
            Self::DEFAULT_FONT_SIZE
        }
    }

    /// Glyph box without background padding.
    pub fn glyph_bounds(&self) -> Rect {
        Rect::new(self.x, self.y - self.height, self.x + self.width, self.y)
    }

    /// Glyph box grown by the background padding.
    pub fn bounds(&self) -> Rect {
        self.glyph_bounds()
            .inflate(self.background_padding.h, self.background_padding.v)
    }

    /// Hit test against [`bounds`](Self::bounds), edges included.
    pub fn hit_test(&self, point: Point) -> bool {
        let b = self.bounds();
        point.x >= b.x0 && point.x <= b.x1 && point.y >= b.y0 && point.y <= b.y1
    }

    /// Move by a pointer delta.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Remap onto a canvas scaled by `(scale_x, scale_y)`.
    ///
    /// Sized labels follow the canvas width, so their measured extent scales
    /// with `scale_x`; labels without a size ratio keep their extent.
    pub fn scale(&mut self, scale_x: f64, scale_y: f64) {
        let p = scale_point(self.position(), scale_x, scale_y);
        self.x = p.x;
        self.y = p.y;
        if self.size_ratio > 0.0 {
            self.width *= scale_x;
            self.height *= scale_x;
        }
    }

    /// Re-measure the extent at the font size for `canvas_width`.
    pub fn fit(&mut self, canvas_width: f64, metrics: &dyn TextMetrics) {
        let font_size = self.font_size(canvas_width);
        self.width = metrics.measure(&self.text, &self.font_family, font_size);
        self.height = Self::LINE_HEIGHT_FACTOR * font_size;
    }
}

/// Glyph measurement used when committing and refitting labels.
pub trait TextMetrics {
    /// Advance width of `text` set in `font_family` at `font_size` pixels.
    fn measure(&self, text: &str, font_family: &str, font_size: f64) -> f64;
}
