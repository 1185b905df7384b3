//! LazyInk Render Library
//!
//! CPU raster layers for the LazyInk drawing surface, built on tiny-skia:
//! one pixmap per layer, painters for each of them, cosmic-text labels and
//! JPEG/PNG export.

pub mod export;
pub mod layers;
pub mod painter;
mod renderer;
pub mod text;

pub use export::{ExportFormat, ExportOptions, Snapshot, decode_data_url};
pub use layers::{Compositor, LayerKind};
pub use painter::{InterfaceStyle, MediaFrame};
pub use renderer::{
    RenderError, RenderResult, css_color, css_color_or_black, pixel_extent, to_skia_path,
};
pub use text::TextRasterizer;

/// Re-exported so hosts can read pixels without naming tiny-skia themselves.
pub use tiny_skia::{Color, Pixmap};
