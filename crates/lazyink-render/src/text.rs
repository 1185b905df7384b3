//! Label shaping and glyph rasterization with cosmic-text.
//!
//! One font system is shared by every engine in the process; loading system
//! fonts is the expensive part.

use cosmic_text::{
    Attrs, Buffer, Color as GlyphColor, Family, FontSystem, Metrics, Shaping, SwashCache,
};
use lazyink_core::shapes::{TextLabel, TextMetrics};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use tiny_skia::{Color, Paint, Pixmap, Rect, Transform};

static FONT_SYSTEM: OnceLock<Mutex<FontSystem>> = OnceLock::new();

fn font_system() -> MutexGuard<'static, FontSystem> {
    FONT_SYSTEM
        .get_or_init(|| {
            let font_system = FontSystem::new();
            log::info!("Loaded {} font faces", font_system.db().len());
            Mutex::new(font_system)
        })
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Number of font faces available for shaping.
pub(crate) fn font_face_count() -> usize {
    font_system().db().len()
}

/// Map a CSS font family name onto a cosmic-text family.
fn family(name: &str) -> Family<'_> {
    match name.trim().to_ascii_lowercase().as_str() {
        "serif" => Family::Serif,
        "sans-serif" => Family::SansSerif,
        "monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        _ => Family::Name(name.trim()),
    }
}

/// Shape a single line. `None` for an unusable font size.
fn shape(
    font_system: &mut FontSystem,
    text: &str,
    font_family: &str,
    font_size: f64,
) -> Option<Buffer> {
    if !font_size.is_finite() || font_size <= 0.0 {
        return None;
    }
    let font_size = font_size as f32;
    let line_height = font_size * TextLabel::LINE_HEIGHT_FACTOR as f32;
    let mut buffer = Buffer::new(font_system, Metrics::new(font_size, line_height));
    buffer.set_size(font_system, None, None);
    let attrs = Attrs::new().family(family(font_family));
    buffer.set_text(font_system, text, &attrs, Shaping::Advanced, None);
    buffer.shape_until_scroll(font_system, false);
    Some(buffer)
}

/// Shapes, measures and rasterizes labels.
pub struct TextRasterizer {
    swash_cache: SwashCache,
}

impl Default for TextRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TextRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRasterizer").finish_non_exhaustive()
    }
}

impl TextRasterizer {
    pub fn new() -> Self {
        Self {
            swash_cache: SwashCache::new(),
        }
    }

    /// Paint the glyphs of `label` with its baseline at `label.y`.
    pub fn draw_label(
        &mut self,
        pixmap: &mut Pixmap,
        label: &TextLabel,
        canvas_width: f64,
        color: Color,
    ) {
        let font_size = label.font_size(canvas_width);
        let mut fonts = font_system();
        let Some(mut buffer) = shape(&mut fonts, &label.text, &label.font_family, font_size) else {
            return;
        };
        let Some(baseline) = buffer.layout_runs().next().map(|run| run.line_y) else {
            return;
        };

        let origin_x = label.x as f32;
        let origin_y = label.y as f32 - baseline;
        let c = color.to_color_u8();
        let glyph_color = GlyphColor::rgba(c.red(), c.green(), c.blue(), c.alpha());
        let mut paint = Paint {
            anti_alias: false,
            ..Default::default()
        };

        buffer.draw(&mut fonts, &mut self.swash_cache, glyph_color, |x, y, w, h, coverage| {
            if coverage.a() == 0 {
                return;
            }
            let (left, top) = (origin_x + x as f32, origin_y + y as f32);
            let Some(rect) = Rect::from_xywh(left, top, w as f32, h as f32) else {
                return;
            };
            paint.set_color_rgba8(coverage.r(), coverage.g(), coverage.b(), coverage.a());
            pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        });
    }
}

impl TextMetrics for TextRasterizer {
    fn measure(&self, text: &str, font_family: &str, font_size: f64) -> f64 {
        let mut fonts = font_system();
        shape(&mut fonts, text, font_family, font_size)
            .map(|buffer| buffer.layout_runs().map(|run| run.line_w).fold(0.0_f32, f32::max))
            .unwrap_or(0.0) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn test_generic_families() {
        assert_eq!(family("serif"), Family::Serif);
        assert_eq!(family(" Monospace "), Family::Monospace);
        assert_eq!(family("verdana"), Family::Name("verdana"));
    }

    #[test]
    fn test_measure_scales_with_font_size() {
        let text = TextRasterizer::new();
        let small = text.measure("Hello", "sans-serif", 15.0);
        let large = text.measure("Hello", "sans-serif", 30.0);

        assert!(small >= 0.0);
        assert!((large - 2.0 * small).abs() <= 1.0 + small * 0.02);
        assert!(text.measure("Hello", "sans-serif", 0.0).abs() < f64::EPSILON);
        assert!(text.measure("", "sans-serif", 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_measure_uses_glyph_advances() {
        if font_face_count() == 0 {
            return;
        }
        let text = TextRasterizer::new();
        let narrow = text.measure("iii", "sans-serif", 20.0);
        let wide = text.measure("WWW", "sans-serif", 20.0);
        assert!(narrow > 0.0);
        assert!(narrow < wide);
    }

    #[test]
    fn test_glyphs_land_above_baseline() {
        if font_face_count() == 0 {
            return;
        }
        let mut pixmap = Pixmap::new(120, 60).unwrap();
        let mut label = TextLabel::new("HH", Point::new(10.0, 40.0));
        label.size_ratio = 0.25;

        TextRasterizer::new().draw_label(&mut pixmap, &label, 120.0, Color::BLACK);

        let inked = |y0: u32, y1: u32| {
            (y0..y1).any(|y| {
                (0..120).any(|x| pixmap.pixel(x, y).is_some_and(|p| p.alpha() > 0))
            })
        };
        assert!(inked(20, 40));
        assert!(!inked(44, 60));
    }
}
