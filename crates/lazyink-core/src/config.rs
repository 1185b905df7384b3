//! Engine configuration with named defaults.

use crate::shapes::{AuthorId, Padding, TextLabel, parse_css_color};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid color for {field}: {value:?}")]
    InvalidColor { field: &'static str, value: String },
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },
}

/// A canvas dimension: absolute pixels or a share of the container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Pixels(f64),
    /// Percentage of the container extent (100.0 = full).
    Percent(f64),
}

impl Dimension {
    /// Resolve against the container extent along the same axis.
    pub fn resolve(self, container: f64) -> f64 {
        match self {
            Dimension::Pixels(px) => px,
            Dimension::Percent(pct) => container * pct / 100.0,
        }
    }

    fn raw(self) -> f64 {
        match self {
            Dimension::Pixels(v) | Dimension::Percent(v) => v,
        }
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Dimension::Pixels(400.0)
    }
}

/// Construction-time configuration of an engine.
///
/// Fields documented as live can later be changed through the engine's
/// setters; everything else is fixed once the engine is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Delay between replayed points when loading, in milliseconds.
    pub load_time_offset: u64,
    /// String length of the lazy brush (live).
    pub lazy_radius: f64,
    /// Brush radius for new strokes (live).
    pub brush_radius: f64,
    /// Brush color for new strokes (live).
    pub brush_color: String,
    /// Color of the catenary guide and pointer dots (live).
    pub catenary_color: String,
    /// Grid line color (live).
    pub grid_color: String,
    /// Fill behind every layer.
    pub background_color: String,
    /// Skip painting the grid (live).
    pub hide_grid: bool,
    /// Grid spacing in pixels.
    pub grid_spacing: f64,
    pub canvas_width: Dimension,
    pub canvas_height: Dimension,
    /// Ignore all pointer input (live).
    pub disabled: bool,
    /// Skip painting the interface overlay (live).
    pub hide_interface: bool,
    /// Load drawings at once instead of replaying them point by point.
    pub immediate_loading: bool,
    /// Still image shown behind the drawing. The host decodes it and hands
    /// the pixels over with `set_media_frame`.
    pub background_image: Option<String>,
    /// Glyph color of new labels.
    pub text_color: String,
    /// Chip color behind new labels.
    pub text_background: Option<String>,
    pub text_padding: Padding,
    /// Where the first text entry opens.
    pub input_anchor: Point,
    pub font_family: String,
    /// Font size as a fraction of the canvas width.
    pub font_size_ratio: f64,
    /// Author stamped on locally committed strokes and labels.
    pub author_id: Option<AuthorId>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            load_time_offset: 5,
            lazy_radius: 12.0,
            brush_radius: 10.0,
            brush_color: "#444".to_string(),
            catenary_color: "#0a0302".to_string(),
            grid_color: "rgba(150,150,150,0.17)".to_string(),
            background_color: "#FFF".to_string(),
            hide_grid: false,
            grid_spacing: 25.0,
            canvas_width: Dimension::default(),
            canvas_height: Dimension::default(),
            disabled: false,
            hide_interface: false,
            immediate_loading: false,
            background_image: None,
            text_color: "#000".to_string(),
            text_background: None,
            text_padding: Padding::default(),
            input_anchor: Point::new(10.0, 10.0),
            font_family: TextLabel::DEFAULT_FONT_FAMILY.to_string(),
            font_size_ratio: TextLabel::DEFAULT_FONT_SIZE / 400.0,
            author_id: None,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON configuration; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Set the canvas size in pixels.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.canvas_width = Dimension::Pixels(width);
        self.canvas_height = Dimension::Pixels(height);
        self
    }

    /// Set both brush and lazy radius.
    pub fn with_radii(mut self, brush_radius: f64, lazy_radius: f64) -> Self {
        self.brush_radius = brush_radius;
        self.lazy_radius = lazy_radius;
        self
    }

    /// Set the author id.
    pub fn with_author(mut self, author_id: AuthorId) -> Self {
        self.author_id = Some(author_id);
        self
    }

    /// Canvas size in pixels inside a container of the given size.
    pub fn canvas_size(&self, container: Size) -> Size {
        Size::new(
            self.canvas_width.resolve(container.width),
            self.canvas_height.resolve(container.height),
        )
    }

    /// Check every field for a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let colors = [
            ("brushColor", Some(&self.brush_color)),
            ("catenaryColor", Some(&self.catenary_color)),
            ("gridColor", Some(&self.grid_color)),
            ("backgroundColor", Some(&self.background_color)),
            ("textColor", Some(&self.text_color)),
            ("textBackground", self.text_background.as_ref()),
        ];
        for (field, value) in colors {
            if let Some(value) = value {
                check_color(field, value)?;
            }
        }

        let non_negative = [
            ("lazyRadius", self.lazy_radius),
            ("textPadding.v", self.text_padding.v),
            ("textPadding.h", self.text_padding.h),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }

        let positive = [
            ("brushRadius", self.brush_radius),
            ("gridSpacing", self.grid_spacing),
            ("canvasWidth", self.canvas_width.raw()),
            ("canvasHeight", self.canvas_height.raw()),
            ("fontSizeRatio", self.font_size_ratio),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }

        Ok(())
    }
}

/// Fail with [`ConfigError::InvalidColor`] unless `value` parses.
pub fn check_color(field: &'static str, value: &str) -> Result<(), ConfigError> {
    match parse_css_color(value) {
        Some(_) => Ok(()),
        None => Err(ConfigError::InvalidColor {
            field,
            value: value.to_string(),
        }),
    }
}
