//! Raster surfaces of a drawing canvas, one per [`LayerKind`].

use crate::renderer::{RenderError, RenderResult, pixel_extent};
use kurbo::Size;
use tiny_skia::{Color, Pixmap, PixmapPaint, Transform};

/// The surfaces a canvas is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Background image or current video frame.
    Media,
    Grid,
    /// Committed strokes.
    Drawing,
    /// Committed labels.
    Text,
    /// The stroke being drawn (local or remote).
    Temp,
    /// Brush preview, pointer dot and catenary guide.
    Interface,
    /// Scratch buffer for exports.
    Export,
}

impl LayerKind {
    /// Every layer, in table order.
    pub const ALL: [LayerKind; 7] = [
        LayerKind::Media,
        LayerKind::Grid,
        LayerKind::Drawing,
        LayerKind::Text,
        LayerKind::Temp,
        LayerKind::Interface,
        LayerKind::Export,
    ];

    /// On-screen layers, back to front.
    pub const PAINT_ORDER: [LayerKind; 6] = [
        LayerKind::Media,
        LayerKind::Grid,
        LayerKind::Drawing,
        LayerKind::Text,
        LayerKind::Temp,
        LayerKind::Interface,
    ];

    /// Layers that hold user content and are wiped by a clear.
    pub const CONTENT: [LayerKind; 3] = [LayerKind::Drawing, LayerKind::Text, LayerKind::Temp];

    fn index(self) -> usize {
        match self {
            LayerKind::Media => 0,
            LayerKind::Grid => 1,
            LayerKind::Drawing => 2,
            LayerKind::Text => 3,
            LayerKind::Temp => 4,
            LayerKind::Interface => 5,
            LayerKind::Export => 6,
        }
    }
}

/// Owns one pixmap per layer, all the same size.
#[derive(Debug, Clone)]
pub struct Compositor {
    width: u32,
    height: u32,
    layers: Vec<Pixmap>,
}

impl Compositor {
    /// Allocate transparent surfaces for a canvas of `size` pixels.
    pub fn new(size: Size) -> RenderResult<Self> {
        let (width, height) = extents(size)?;
        Ok(Self {
            width,
            height,
            layers: allocate(width, height)?,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }

    /// Replace every surface with a blank one of the new size.
    ///
    /// Either all layers are resized or, on error, none are. Content is not
    /// carried over; callers repaint from their drawing state.
    pub fn resize(&mut self, size: Size) -> RenderResult<()> {
        let (width, height) = extents(size)?;
        if width == self.width && height == self.height {
            return Ok(());
        }
        self.layers = allocate(width, height)?;
        self.width = width;
        self.height = height;
        log::debug!("Resized layers to {width}x{height}");
        Ok(())
    }

    pub fn layer(&self, kind: LayerKind) -> &Pixmap {
        &self.layers[kind.index()]
    }

    pub fn layer_mut(&mut self, kind: LayerKind) -> &mut Pixmap {
        &mut self.layers[kind.index()]
    }

    /// Make a layer fully transparent.
    pub fn clear(&mut self, kind: LayerKind) {
        self.layer_mut(kind).fill(Color::TRANSPARENT);
    }

    /// Clear the drawing, text and in-progress layers.
    pub fn clear_content(&mut self) {
        for kind in LayerKind::CONTENT {
            self.clear(kind);
        }
    }

    /// Flatten `kinds` over `background` into a new pixmap of the canvas size.
    pub fn flatten(&self, kinds: &[LayerKind], background: Color) -> RenderResult<Pixmap> {
        let mut out = blank(self.width, self.height)?;
        out.fill(background);
        for &kind in kinds {
            out.draw_pixmap(
                0,
                0,
                self.layer(kind).as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
        Ok(out)
    }

    /// The full on-screen stack, grid and interface included.
    pub fn composite(&self, background: Color) -> RenderResult<Pixmap> {
        self.flatten(&LayerKind::PAINT_ORDER, background)
    }
}

fn extents(size: Size) -> RenderResult<(u32, u32)> {
    match (pixel_extent(size.width), pixel_extent(size.height)) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(RenderError::InvalidSize {
            width: size.width,
            height: size.height,
        }),
    }
}

pub(crate) fn blank(width: u32, height: u32) -> RenderResult<Pixmap> {
    Pixmap::new(width, height).ok_or(RenderError::InvalidSize {
        width: width as f64,
        height: height as f64,
    })
}

fn allocate(width: u32, height: u32) -> RenderResult<Vec<Pixmap>> {
    LayerKind::ALL.iter().map(|_| blank(width, height)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_every_layer() {
        for (i, kind) in LayerKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        assert!(!LayerKind::PAINT_ORDER.contains(&LayerKind::Export));
    }

    #[test]
    fn test_new_rejects_empty_size() {
        assert!(matches!(
            Compositor::new(Size::new(0.0, 100.0)),
            Err(RenderError::InvalidSize { .. })
        ));
    }

    #[test]
    fn test_resize_all_layers() {
        let mut compositor = Compositor::new(Size::new(10.0, 10.0)).unwrap();
        compositor.resize(Size::new(30.0, 20.0)).unwrap();

        for kind in LayerKind::ALL {
            assert_eq!(compositor.layer(kind).width(), 30);
            assert_eq!(compositor.layer(kind).height(), 20);
        }

        // A failed resize leaves the old surfaces in place
        assert!(compositor.resize(Size::new(-1.0, 20.0)).is_err());
        assert_eq!(compositor.width(), 30);
    }

    #[test]
    fn test_paint_order() {
        let mut compositor = Compositor::new(Size::new(4.0, 4.0)).unwrap();
        compositor.layer_mut(LayerKind::Grid).fill(Color::from_rgba8(255, 0, 0, 255));
        compositor.layer_mut(LayerKind::Drawing).fill(Color::from_rgba8(0, 0, 255, 255));

        let out = compositor.composite(Color::WHITE).unwrap();
        let px = out.pixel(1, 1).unwrap();
        assert_eq!((px.red(), px.green(), px.blue()), (0, 0, 255));

        compositor.clear_content();
        let out = compositor.composite(Color::WHITE).unwrap();
        let px = out.pixel(1, 1).unwrap();
        assert_eq!((px.red(), px.green(), px.blue()), (255, 0, 0));
    }
}
