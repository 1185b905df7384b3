//! Persistence format and resolution-independent rescaling.
//!
//! A drawing is saved as JSON `{lines, texts, width, height}` where
//! `width`/`height` are the canvas pixel dimensions the geometry was recorded
//! in. Loading onto a canvas of another size remaps every point so that the
//! relative layout is preserved.

mod rescale;

pub use rescale::Rescale;

use crate::canvas::DrawingState;
use crate::shapes::{AuthorId, Stroke, TextLabel};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors from parsing or validating saved drawings.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Save data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Save data must be a JSON object")]
    NotAnObject,
    #[error("Save data `lines` must be an array")]
    LinesNotArray,
    #[error("Save data `texts` must be an array")]
    TextsNotArray,
    #[error("Save data `{0}` must be a number")]
    MissingDimension(&'static str),
    #[error("Save data dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: f64, height: f64 },
}

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// A saved line as found on disk; color and radius may be absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredLine {
    points: Vec<Point>,
    #[serde(default, alias = "color")]
    brush_color: Option<String>,
    #[serde(default, alias = "radius")]
    brush_radius: Option<f64>,
    #[serde(default)]
    author_id: Option<AuthorId>,
    #[serde(default)]
    timestamp: i64,
}

/// Brush used for saved lines that carry no color or radius.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeDefaults {
    pub color: String,
    pub radius: f64,
}

/// Serialized drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub lines: Vec<Stroke>,
    #[serde(default)]
    pub texts: Vec<TextLabel>,
    pub width: f64,
    pub height: f64,
}

impl SaveData {
    /// Capture a drawing state.
    pub fn from_state(state: &DrawingState) -> Self {
        Self {
            lines: state.lines.clone(),
            texts: state.texts.clone(),
            width: state.canvas_width,
            height: state.canvas_height,
        }
    }

    /// Dimensions the geometry is expressed in.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Serialize to the JSON persistence format.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse and validate a saved drawing.
    ///
    /// Nothing is returned unless the whole payload is well formed, so a
    /// caller can validate before clearing its own state.
    pub fn parse(json: &str, defaults: &StrokeDefaults) -> LoadResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Object(mut map) = value else {
            return Err(LoadError::NotAnObject);
        };

        let lines = match map.remove("lines") {
            Some(lines @ Value::Array(_)) => lines,
            _ => return Err(LoadError::LinesNotArray),
        };
        let texts = match map.remove("texts") {
            Some(texts @ Value::Array(_)) => texts,
            None | Some(Value::Null) => Value::Array(Vec::new()),
            Some(_) => return Err(LoadError::TextsNotArray),
        };

        let width = dimension(&map, "width")?;
        let height = dimension(&map, "height")?;
        if !is_valid_extent(width) || !is_valid_extent(height) {
            return Err(LoadError::InvalidDimensions { width, height });
        }

        let stored: Vec<StoredLine> = serde_json::from_value(lines)?;
        let texts: Vec<TextLabel> = serde_json::from_value(texts)?;

        let lines = stored
            .into_iter()
            .map(|line| Stroke {
                points: line.points,
                color: line.brush_color.unwrap_or_else(|| defaults.color.clone()),
                radius: line
                    .brush_radius
                    .filter(|r| *r > 0.0)
                    .unwrap_or(defaults.radius),
                author_id: line.author_id,
                timestamp: line.timestamp,
            })
            .collect();

        Ok(Self {
            lines,
            texts,
            width,
            height,
        })
    }

    /// Remap onto a canvas of `target` size.
    ///
    /// Returns the data unchanged when the sizes match exactly.
    pub fn rescaled_to(mut self, target: Size) -> LoadResult<Self> {
        let rescale = Rescale::between(self.size(), target).ok_or(LoadError::InvalidDimensions {
            width: self.width,
            height: self.height,
        })?;

        if !rescale.is_identity() {
            log::debug!(
                "Rescaling drawing {}x{} -> {}x{} (x{:.3}, y{:.3})",
                self.width,
                self.height,
                target.width,
                target.height,
                rescale.scale_x,
                rescale.scale_y
            );
            for line in &mut self.lines {
                rescale.apply_stroke(line);
            }
            for text in &mut self.texts {
                rescale.apply_text(text);
            }
        }

        self.width = target.width;
        self.height = target.height;
        Ok(self)
    }

    /// Convert into a drawing state.
    pub fn into_state(self) -> DrawingState {
        let mut state = DrawingState::new(self.width, self.height);
        for line in self.lines {
            state.push_line(line);
        }
        state.texts = self.texts;
        state
    }
}

fn dimension(map: &serde_json::Map<String, Value>, key: &'static str) -> LoadResult<f64> {
    map.get(key)
        .and_then(Value::as_f64)
        .ok_or(LoadError::MissingDimension(key))
}

/// A canvas extent usable as a rescale denominator.
pub fn is_valid_extent(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
