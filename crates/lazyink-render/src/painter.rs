//! Painting routines for each layer.

use crate::renderer::{RenderError, RenderResult, css_color, css_color_or_black, to_skia_path};
use crate::text::TextRasterizer;
use kurbo::{Point, Rect};
use lazyink_core::catenary::Catenary;
use lazyink_core::lazy::LazyCursorState;
use lazyink_core::shapes::{Stroke, TextLabel, quadratic_path};
use tiny_skia::{
    Color, FillRule, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint,
    StrokeDash, Transform,
};

/// Radius of the dot under the raw pointer.
const POINTER_DOT_RADIUS: f32 = 4.0;
/// Radius of the dot in the middle of the brush preview.
const BRUSH_DOT_RADIUS: f32 = 2.0;
const CATENARY_WIDTH: f32 = 2.0;
const CATENARY_DASH: [f32; 2] = [2.0, 4.0];
const GRID_LINE_WIDTH: f32 = 0.5;

/// Colors and sizes used by the interface overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceStyle {
    pub brush_color: String,
    pub brush_radius: f64,
    pub catenary_color: String,
}

/// A decoded background image or video frame, premultiplied RGBA8.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl MediaFrame {
    /// Wrap premultiplied RGBA8 pixels, checking the buffer length.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> RenderResult<Self> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(RenderError::InvalidFrame {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Build from straight (non-premultiplied) RGBA8 pixels.
    pub fn from_straight_rgba(width: u32, height: u32, mut rgba: Vec<u8>) -> RenderResult<Self> {
        for px in rgba.chunks_exact_mut(4) {
            let a = px[3] as u16;
            for c in &mut px[..3] {
                *c = ((*c as u16 * a + 127) / 255) as u8;
            }
        }
        Self::new(width, height, rgba)
    }

    fn to_pixmap(&self) -> RenderResult<Pixmap> {
        let size = tiny_skia::IntSize::from_wh(self.width, self.height).ok_or(
            RenderError::InvalidSize {
                width: self.width as f64,
                height: self.height as f64,
            },
        )?;
        Pixmap::from_vec(self.rgba.clone(), size).ok_or(RenderError::InvalidFrame {
            width: self.width,
            height: self.height,
            expected: self.width as usize * self.height as usize * 4,
            actual: self.rgba.len(),
        })
    }
}

fn solid(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

fn fill_circle(pixmap: &mut Pixmap, center: Point, radius: f32, color: Color) {
    if radius <= 0.0 {
        return;
    }
    if let Some(circle) = PathBuilder::from_circle(center.x as f32, center.y as f32, radius) {
        pixmap.fill_path(&circle, &solid(color), FillRule::Winding, Transform::identity(), None);
    }
}

/// Paint a smoothed brush trail. Fewer than two points paint nothing.
pub fn stroke_points(pixmap: &mut Pixmap, points: &[Point], color: &str, radius: f64) {
    if points.len() < Stroke::MIN_POINTS {
        return;
    }
    let Some(path) = to_skia_path(&quadratic_path(points)) else {
        return;
    };
    let stroke = tiny_skia::Stroke {
        width: (radius * 2.0) as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    };
    let paint = solid(css_color_or_black(color));
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

/// Paint one committed stroke.
pub fn draw_stroke(pixmap: &mut Pixmap, stroke: &Stroke) {
    stroke_points(pixmap, &stroke.points, &stroke.color, stroke.radius);
}

/// Clear `pixmap` and repaint every stroke, oldest first.
pub fn redraw_strokes(pixmap: &mut Pixmap, strokes: &[Stroke]) {
    pixmap.fill(Color::TRANSPARENT);
    for stroke in strokes {
        draw_stroke(pixmap, stroke);
    }
}

/// Clear `pixmap` and rule it every `spacing` pixels.
pub fn draw_grid(pixmap: &mut Pixmap, spacing: f64, color: &str) {
    pixmap.fill(Color::TRANSPARENT);
    if !spacing.is_finite() || spacing <= 0.0 {
        return;
    }
    let Some(color) = css_color(color) else {
        return;
    };

    let width = pixmap.width() as f32;
    let height = pixmap.height() as f32;
    let spacing = spacing as f32;

    let mut builder = PathBuilder::new();
    let mut x = spacing;
    while x < width {
        builder.move_to(x, 0.0);
        builder.line_to(x, height);
        x += spacing;
    }
    let mut y = spacing;
    while y < height {
        builder.move_to(0.0, y);
        builder.line_to(width, y);
        y += spacing;
    }

    if let Some(path) = builder.finish() {
        let stroke = tiny_skia::Stroke {
            width: GRID_LINE_WIDTH,
            ..Default::default()
        };
        pixmap.stroke_path(&path, &solid(color), &stroke, Transform::identity(), None);
    }
}

/// Clear `pixmap` and paint the brush preview, pointer dot and catenary.
pub fn draw_interface(pixmap: &mut Pixmap, cursor: &LazyCursorState, style: &InterfaceStyle) {
    pixmap.fill(Color::TRANSPARENT);

    let guide = css_color_or_black(&style.catenary_color);
    let brush = cursor.brush_position;
    let pointer = cursor.pointer_position;

    fill_circle(
        pixmap,
        brush,
        style.brush_radius as f32,
        css_color_or_black(&style.brush_color),
    );
    fill_circle(pixmap, pointer, POINTER_DOT_RADIUS, guide);

    if cursor.string_length > 0.0 {
        let curve = Catenary::default().curve(brush, pointer, cursor.string_length);
        if let Some(path) = to_skia_path(&curve) {
            let stroke = tiny_skia::Stroke {
                width: CATENARY_WIDTH,
                line_cap: LineCap::Round,
                dash: StrokeDash::new(CATENARY_DASH.to_vec(), 0.0),
                ..Default::default()
            };
            pixmap.stroke_path(&path, &solid(guide), &stroke, Transform::identity(), None);
        }
    }

    fill_circle(pixmap, brush, BRUSH_DOT_RADIUS, guide);
}

/// Clear `pixmap` and paint every label at its size on a canvas of
/// `canvas_width`: background chip first, then the shaped glyphs.
pub fn draw_texts(
    pixmap: &mut Pixmap,
    texts: &[TextLabel],
    canvas_width: f64,
    rasterizer: &mut TextRasterizer,
) {
    pixmap.fill(Color::TRANSPARENT);
    for label in texts {
        if let Some(bg) = label.background_color.as_deref().and_then(css_color) {
            fill_rect(pixmap, label.bounds(), bg);
        }
        rasterizer.draw_label(pixmap, label, canvas_width, css_color_or_black(&label.color));
    }
}

fn fill_rect(pixmap: &mut Pixmap, rect: Rect, color: Color) {
    if let Some(r) = tiny_skia::Rect::from_ltrb(
        rect.x0 as f32,
        rect.y0 as f32,
        rect.x1 as f32,
        rect.y1 as f32,
    ) {
        pixmap.fill_rect(r, &solid(color), Transform::identity(), None);
    }
}

/// Placement of media scaled to fit inside a canvas, centered.
pub fn contain_rect(
    media_width: f64,
    media_height: f64,
    canvas_width: f64,
    canvas_height: f64,
) -> Rect {
    let scale = (canvas_width / media_width).min(canvas_height / media_height);
    let w = media_width * scale;
    let h = media_height * scale;
    let x = (canvas_width - w) / 2.0;
    let y = (canvas_height - h) / 2.0;
    Rect::new(x, y, x + w, y + h)
}

/// Clear `pixmap` and draw `frame` contain-fit and centered.
pub fn draw_media(pixmap: &mut Pixmap, frame: &MediaFrame) -> RenderResult<()> {
    pixmap.fill(Color::TRANSPARENT);
    let source = frame.to_pixmap()?;
    let target = contain_rect(
        frame.width as f64,
        frame.height as f64,
        pixmap.width() as f64,
        pixmap.height() as f64,
    );
    let scale = (target.width() / frame.width as f64) as f32;
    let (dx, dy) = (target.x0 as f32, target.y0 as f32);
    let transform = Transform::from_row(scale, 0.0, 0.0, scale, dx, dy);
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..Default::default()
    };
    pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> Pixmap {
        Pixmap::new(100, 100).unwrap()
    }

    fn alpha_at(pixmap: &Pixmap, x: u32, y: u32) -> u8 {
        pixmap.pixel(x, y).unwrap().alpha()
    }

    #[test]
    fn test_stroke_paints_along_path() {
        let mut pixmap = canvas();
        stroke_points(
            &mut pixmap,
            &[Point::new(10.0, 50.0), Point::new(50.0, 50.0), Point::new(90.0, 50.0)],
            "#f00",
            3.0,
        );
        assert_eq!(alpha_at(&pixmap, 50, 50), 255);
        assert_eq!(alpha_at(&pixmap, 50, 10), 0);
        assert_eq!(pixmap.pixel(50, 50).unwrap().red(), 255);
    }

    #[test]
    fn test_single_point_paints_nothing() {
        let mut pixmap = canvas();
        stroke_points(&mut pixmap, &[Point::new(50.0, 50.0)], "#000", 10.0);
        assert!(pixmap.pixels().iter().all(|p| p.alpha() == 0));
    }

    #[test]
    fn test_grid_lines() {
        let mut pixmap = canvas();
        draw_grid(&mut pixmap, 25.0, "#000");
        assert!(alpha_at(&pixmap, 24, 10).max(alpha_at(&pixmap, 25, 10)) > 0);
        assert_eq!(alpha_at(&pixmap, 12, 12), 0);
    }

    #[test]
    fn test_interface_draws_brush_and_pointer() {
        let mut pixmap = canvas();
        let cursor = LazyCursorState {
            pointer_position: Point::new(80.0, 50.0),
            brush_position: Point::new(20.0, 50.0),
            string_length: 60.0,
            enabled: true,
        };
        let style = InterfaceStyle {
            brush_color: "#444".to_string(),
            brush_radius: 10.0,
            catenary_color: "#0a0302".to_string(),
        };
        draw_interface(&mut pixmap, &cursor, &style);

        assert_eq!(alpha_at(&pixmap, 20, 50), 255);
        assert_eq!(alpha_at(&pixmap, 80, 50), 255);
        assert_eq!(alpha_at(&pixmap, 50, 10), 0);
    }

    #[test]
    fn test_text_chip() {
        let mut pixmap = canvas();
        let mut label = TextLabel::new("Hi", Point::new(10.0, 40.0));
        label.width = 20.0;
        label.height = 18.0;
        label.background_color = Some("#ff0".to_string());
        draw_texts(&mut pixmap, &[label], 100.0, &mut TextRasterizer::new());

        // Padding area is covered by the chip only
        let px = pixmap.pixel(8, 41).unwrap();
        assert_eq!((px.red(), px.green(), px.blue()), (255, 255, 0));
        assert_eq!(px.alpha(), 255);
        assert_eq!(alpha_at(&pixmap, 60, 60), 0);
    }

    #[test]
    fn test_labels_grow_with_canvas_width() {
        if crate::text::font_face_count() == 0 {
            return;
        }
        let mut label = TextLabel::new("HELLO", Point::new(5.0, 45.0));
        label.size_ratio = 0.1;
        let mut rasterizer = TextRasterizer::new();

        let inked_rows = |canvas_width: f64, rasterizer: &mut TextRasterizer| {
            let mut pixmap = canvas();
            draw_texts(&mut pixmap, std::slice::from_ref(&label), canvas_width, rasterizer);
            (0..100)
                .filter(|&y| (0..100).any(|x| alpha_at(&pixmap, x, y) > 0))
                .count()
        };
        let small = inked_rows(100.0, &mut rasterizer);
        let large = inked_rows(200.0, &mut rasterizer);
        assert!(small > 0);
        assert!(large >= small * 3 / 2);
    }

    #[test]
    fn test_contain_rect() {
        let r = contain_rect(200.0, 100.0, 100.0, 100.0);
        assert_eq!(r, Rect::new(0.0, 25.0, 100.0, 75.0));
    }

    #[test]
    fn test_media_is_centered() {
        let frame = MediaFrame::new(2, 1, vec![255; 8]).unwrap();
        let mut pixmap = canvas();
        draw_media(&mut pixmap, &frame).unwrap();

        assert_eq!(alpha_at(&pixmap, 50, 50), 255);
        assert_eq!(alpha_at(&pixmap, 50, 5), 0);
    }

    #[test]
    fn test_media_frame_length_is_checked() {
        assert!(matches!(
            MediaFrame::new(2, 2, vec![0; 3]),
            Err(RenderError::InvalidFrame { expected: 16, .. })
        ));
    }
}
