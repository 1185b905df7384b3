//! Flattening layers into an encoded image.

use crate::layers::{Compositor, LayerKind, blank};
use crate::painter::{MediaFrame, draw_media};
use crate::renderer::RenderResult;
use base64::{Engine, engine::general_purpose::STANDARD};
use image::ExtendedColorType;
use image::ImageEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use tiny_skia::{Color, FilterQuality, Pixmap, PixmapPaint, Transform};

/// Layers that make up an annotated export, back to front.
const ANNOTATION_LAYERS: [LayerKind; 3] = [LayerKind::Drawing, LayerKind::Text, LayerKind::Temp];

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Jpeg,
    Png,
}

impl ExportFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Png => "image/png",
        }
    }
}

/// What to put into an export and how to encode it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Draw the background media under the annotations.
    pub include_background: bool,
    /// JPEG quality in `[0, 1]`; ignored for PNG.
    pub quality: f64,
    /// Render at the background media's natural size instead of the canvas size.
    pub original_size: bool,
    /// Also produce a copy with the background only.
    pub with_unannotated: bool,
    pub format: ExportFormat,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_background: true,
            quality: 1.0,
            original_size: false,
            with_unannotated: false,
            format: ExportFormat::Jpeg,
        }
    }
}

/// Encoded export.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// `data:` URL of the annotated image.
    pub image: String,
    /// `data:` URL of the background-only image, when requested.
    pub unannotated: Option<String>,
    pub width: u32,
    pub height: u32,
}

/// Flatten the background fill, optional media and annotation layers.
pub fn export(
    compositor: &mut Compositor,
    media: Option<&MediaFrame>,
    background: Color,
    options: &ExportOptions,
) -> RenderResult<Snapshot> {
    let media = media.filter(|_| options.include_background);
    let (width, height) = match media {
        Some(frame) if options.original_size => (frame.width, frame.height),
        _ => (compositor.width(), compositor.height()),
    };

    let image = if (width, height) == (compositor.width(), compositor.height()) {
        let mut buffer = std::mem::replace(compositor.layer_mut(LayerKind::Export), blank(1, 1)?);
        let result = compose(&mut buffer, compositor, media, background, true)
            .and_then(|_| encode(&buffer, options));
        *compositor.layer_mut(LayerKind::Export) = buffer;
        result?
    } else {
        // Temporary surface at the media's natural resolution
        let mut buffer = blank(width, height)?;
        compose(&mut buffer, compositor, media, background, true)?;
        encode(&buffer, options)?
    };

    let unannotated = if options.with_unannotated {
        let mut buffer = blank(width, height)?;
        compose(&mut buffer, compositor, media, background, false)?;
        Some(encode(&buffer, options)?)
    } else {
        None
    };

    log::info!(
        "Exported {}x{} {} (unannotated: {})",
        width,
        height,
        options.format.mime_type(),
        unannotated.is_some()
    );

    Ok(Snapshot {
        image,
        unannotated,
        width,
        height,
    })
}

fn compose(
    buffer: &mut Pixmap,
    compositor: &Compositor,
    media: Option<&MediaFrame>,
    background: Color,
    annotated: bool,
) -> RenderResult<()> {
    buffer.fill(background);

    if let Some(frame) = media {
        let mut media_layer = blank(buffer.width(), buffer.height())?;
        draw_media(&mut media_layer, frame)?;
        buffer.draw_pixmap(
            0,
            0,
            media_layer.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    if annotated {
        let scale_x = buffer.width() as f32 / compositor.width() as f32;
        let scale_y = buffer.height() as f32 / compositor.height() as f32;
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..Default::default()
        };
        for kind in ANNOTATION_LAYERS {
            buffer.draw_pixmap(
                0,
                0,
                compositor.layer(kind).as_ref(),
                &paint,
                Transform::from_scale(scale_x, scale_y),
                None,
            );
        }
    }
    Ok(())
}

/// Encode a pixmap as a `data:` URL.
pub fn encode(pixmap: &Pixmap, options: &ExportOptions) -> RenderResult<String> {
    let (width, height) = (pixmap.width(), pixmap.height());
    let mut bytes = Vec::new();

    match options.format {
        ExportFormat::Jpeg => {
            let rgb: Vec<u8> = pixmap
                .pixels()
                .iter()
                .flat_map(|p| {
                    let c = p.demultiply();
                    [c.red(), c.green(), c.blue()]
                })
                .collect();
            let quality = (options.quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8;
            JpegEncoder::new_with_quality(&mut bytes, quality).write_image(
                &rgb,
                width,
                height,
                ExtendedColorType::Rgb8,
            )?;
        }
        ExportFormat::Png => {
            let rgba: Vec<u8> = pixmap
                .pixels()
                .iter()
                .flat_map(|p| {
                    let c = p.demultiply();
                    [c.red(), c.green(), c.blue(), c.alpha()]
                })
                .collect();
            PngEncoder::new(&mut bytes).write_image(
                &rgba,
                width,
                height,
                ExtendedColorType::Rgba8,
            )?;
        }
    }

    Ok(format!(
        "data:{};base64,{}",
        options.format.mime_type(),
        STANDARD.encode(&bytes)
    ))
}

/// Bytes carried by a base64 `data:` URL.
pub fn decode_data_url(url: &str) -> Option<Vec<u8>> {
    let (header, payload) = url.strip_prefix("data:")?.split_once(',')?;
    if !header.ends_with(";base64") {
        return None;
    }
    STANDARD.decode(payload).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::painter::stroke_points;
    use kurbo::{Point, Size};

    fn decode(url: &str) -> image::DynamicImage {
        image::load_from_memory(&decode_data_url(url).unwrap()).unwrap()
    }

    fn drawn_compositor() -> Compositor {
        let mut compositor = Compositor::new(Size::new(40.0, 20.0)).unwrap();
        stroke_points(
            compositor.layer_mut(LayerKind::Drawing),
            &[Point::new(0.0, 10.0), Point::new(40.0, 10.0)],
            "#000",
            3.0,
        );
        compositor
    }

    #[test]
    fn test_jpeg_data_url() {
        let mut compositor = drawn_compositor();
        let options = ExportOptions::default();
        let snapshot = export(&mut compositor, None, Color::WHITE, &options).unwrap();

        assert!(snapshot.image.starts_with("data:image/jpeg;base64,"));
        assert!(snapshot.unannotated.is_none());
        let decoded = decode(&snapshot.image).to_rgb8();
        assert_eq!(decoded.dimensions(), (40, 20));
        assert!(decoded.get_pixel(20, 10)[0] < 64);
        assert!(decoded.get_pixel(20, 1)[0] > 192);
        // The export surface is back in place at canvas size
        assert_eq!(compositor.layer(LayerKind::Export).width(), 40);
    }

    #[test]
    fn test_png_excludes_grid_and_interface() {
        let mut compositor = Compositor::new(Size::new(10.0, 10.0)).unwrap();
        compositor.layer_mut(LayerKind::Grid).fill(Color::BLACK);
        compositor.layer_mut(LayerKind::Interface).fill(Color::BLACK);

        let options = ExportOptions {
            format: ExportFormat::Png,
            ..Default::default()
        };
        let snapshot = export(&mut compositor, None, Color::WHITE, &options).unwrap();
        assert!(snapshot.image.starts_with("data:image/png;base64,"));
        let decoded = decode(&snapshot.image).to_rgba8();
        assert_eq!(decoded.get_pixel(5, 5).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_original_size_and_unannotated() {
        let mut compositor = drawn_compositor();
        let media = MediaFrame::new(80, 40, vec![255; 80 * 40 * 4]).unwrap();
        let options = ExportOptions {
            original_size: true,
            with_unannotated: true,
            format: ExportFormat::Png,
            ..Default::default()
        };
        let snapshot = export(&mut compositor, Some(&media), Color::BLACK, &options).unwrap();

        assert_eq!((snapshot.width, snapshot.height), (80, 40));
        let annotated = decode(&snapshot.image).to_rgba8();
        assert_eq!(annotated.dimensions(), (80, 40));
        // Stroke scaled up onto the larger surface
        assert_eq!(annotated.get_pixel(40, 20).0[0], 0);

        let plain = decode(snapshot.unannotated.as_deref().unwrap()).to_rgba8();
        assert_eq!(plain.get_pixel(40, 20).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_decode_data_url() {
        assert_eq!(decode_data_url("data:text/plain;base64,aGk="), Some(b"hi".to_vec()));
        assert_eq!(decode_data_url("data:text/plain,hi"), None);
        assert_eq!(decode_data_url("hi"), None);
    }

    #[test]
    fn test_background_can_be_skipped() {
        let mut compositor = Compositor::new(Size::new(8.0, 8.0)).unwrap();
        let media = MediaFrame::new(8, 8, vec![255; 8 * 8 * 4]).unwrap();
        let options = ExportOptions {
            include_background: false,
            format: ExportFormat::Png,
            ..Default::default()
        };
        let snapshot = export(&mut compositor, Some(&media), Color::BLACK, &options).unwrap();
        let decoded = decode(&snapshot.image).to_rgba8();
        assert_eq!(decoded.get_pixel(4, 4).0, [0, 0, 0, 255]);
    }
}
