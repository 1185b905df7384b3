//! Diff messages exchanged between drawing surfaces.
//!
//! Each local mutation produces one [`SyncEvent`]. Transport is the host's
//! business; the receiving engine replays events against its own state.
//! Geometry travels in the sender's pixel space together with the sender's
//! canvas size, and is remapped on arrival.

use crate::canvas::UndoMode;
use crate::shapes::{AuthorId, Stroke, TextLabel};
use crate::storage::{Rescale, is_valid_extent};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from validating incoming sync events.
#[derive(Debug, Error, PartialEq)]
pub enum SyncError {
    #[error("Sync event carries invalid canvas dimensions {width}x{height}")]
    InvalidDimensions { width: f64, height: f64 },
    #[error("Sync event could not be decoded: {0}")]
    Decode(String),
}

/// One mutation of a drawing surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    /// Everything was erased.
    Clear,
    /// The most recent record of one kind was removed.
    Undo { mode: UndoMode },
    /// A stroke in progress (not yet committed).
    #[serde(rename_all = "camelCase")]
    StrokeProgress {
        points: Vec<Point>,
        color: String,
        radius: f64,
        canvas_width: f64,
        canvas_height: f64,
    },
    /// A committed stroke.
    #[serde(rename_all = "camelCase")]
    StrokeCommit {
        points: Vec<Point>,
        color: String,
        radius: f64,
        canvas_width: f64,
        canvas_height: f64,
        #[serde(default)]
        author_id: Option<AuthorId>,
        #[serde(default)]
        timestamp: i64,
    },
    /// A new label.
    #[serde(rename_all = "camelCase")]
    TextNew {
        text: TextLabel,
        canvas_width: f64,
        canvas_height: f64,
    },
    /// A label moved to a new position.
    #[serde(rename_all = "camelCase")]
    TextMove {
        index: usize,
        text: TextLabel,
        canvas_width: f64,
        canvas_height: f64,
    },
}

impl SyncEvent {
    /// Progress event for an in-progress stroke.
    pub fn stroke_progress(points: &[Point], color: &str, radius: f64, canvas: Size) -> Self {
        SyncEvent::StrokeProgress {
            points: points.to_vec(),
            color: color.to_string(),
            radius,
            canvas_width: canvas.width,
            canvas_height: canvas.height,
        }
    }

    /// Commit event for a finished stroke.
    pub fn stroke_commit(stroke: &Stroke, canvas: Size) -> Self {
        SyncEvent::StrokeCommit {
            points: stroke.points.clone(),
            color: stroke.color.clone(),
            radius: stroke.radius,
            canvas_width: canvas.width,
            canvas_height: canvas.height,
            author_id: stroke.author_id,
            timestamp: stroke.timestamp,
        }
    }

    pub fn text_new(text: &TextLabel, canvas: Size) -> Self {
        SyncEvent::TextNew {
            text: text.clone(),
            canvas_width: canvas.width,
            canvas_height: canvas.height,
        }
    }

    pub fn text_move(index: usize, text: &TextLabel, canvas: Size) -> Self {
        SyncEvent::TextMove {
            index,
            text: text.clone(),
            canvas_width: canvas.width,
            canvas_height: canvas.height,
        }
    }

    /// Short name of the variant, as used in the `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncEvent::Clear => "clear",
            SyncEvent::Undo { .. } => "undo",
            SyncEvent::StrokeProgress { .. } => "stroke_progress",
            SyncEvent::StrokeCommit { .. } => "stroke_commit",
            SyncEvent::TextNew { .. } => "text_new",
            SyncEvent::TextMove { .. } => "text_move",
        }
    }

    /// Canvas size of the sender, for events that carry geometry.
    pub fn source_size(&self) -> Option<Size> {
        match self {
            SyncEvent::Clear | SyncEvent::Undo { .. } => None,
            SyncEvent::StrokeProgress {
                canvas_width,
                canvas_height,
                ..
            }
            | SyncEvent::StrokeCommit {
                canvas_width,
                canvas_height,
                ..
            }
            | SyncEvent::TextNew {
                canvas_width,
                canvas_height,
                ..
            }
            | SyncEvent::TextMove {
                canvas_width,
                canvas_height,
                ..
            } => Some(Size::new(*canvas_width, *canvas_height)),
        }
    }

    /// Reject events whose geometry cannot be remapped.
    pub fn validate(&self) -> Result<(), SyncError> {
        match self.source_size() {
            Some(size) if !is_valid_extent(size.width) || !is_valid_extent(size.height) => {
                Err(SyncError::InvalidDimensions {
                    width: size.width,
                    height: size.height,
                })
            }
            _ => Ok(()),
        }
    }

    /// Remap the event's geometry into a canvas of `target` size.
    ///
    /// Events without geometry come back unchanged.
    pub fn rescaled_to(self, target: Size) -> Result<SyncEvent, SyncError> {
        self.validate()?;
        let Some(source) = self.source_size() else {
            return Ok(self);
        };
        let rescale = Rescale::between(source, target).ok_or(SyncError::InvalidDimensions {
            width: source.width,
            height: source.height,
        })?;

        Ok(match self {
            SyncEvent::StrokeProgress {
                mut points,
                color,
                radius,
                ..
            } => {
                rescale.apply_points(&mut points);
                SyncEvent::StrokeProgress {
                    points,
                    color,
                    radius: radius * rescale.scale_avg(),
                    canvas_width: target.width,
                    canvas_height: target.height,
                }
            }
            SyncEvent::StrokeCommit {
                mut points,
                color,
                radius,
                author_id,
                timestamp,
                ..
            } => {
                rescale.apply_points(&mut points);
                SyncEvent::StrokeCommit {
                    points,
                    color,
                    radius: radius * rescale.scale_avg(),
                    canvas_width: target.width,
                    canvas_height: target.height,
                    author_id,
                    timestamp,
                }
            }
            SyncEvent::TextNew { mut text, .. } => {
                rescale.apply_text(&mut text);
                SyncEvent::TextNew {
                    text,
                    canvas_width: target.width,
                    canvas_height: target.height,
                }
            }
            SyncEvent::TextMove {
                index, mut text, ..
            } => {
                rescale.apply_text(&mut text);
                SyncEvent::TextMove {
                    index,
                    text,
                    canvas_width: target.width,
                    canvas_height: target.height,
                }
            }
            other => other,
        })
    }

    /// Stroke carried by a commit event.
    pub fn to_stroke(&self) -> Option<Stroke> {
        match self {
            SyncEvent::StrokeCommit {
                points,
                color,
                radius,
                author_id,
                timestamp,
                ..
            } => Some(Stroke {
                points: points.clone(),
                color: color.clone(),
                radius: *radius,
                author_id: *author_id,
                timestamp: *timestamp,
            }),
            _ => None,
        }
    }

    /// Encode as the JSON wire format.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode from the JSON wire format.
    pub fn from_json(json: &str) -> Result<Self, SyncError> {
        serde_json::from_str(json).map_err(|e| SyncError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_is_tagged() {
        let json = SyncEvent::Undo {
            mode: UndoMode::Text,
        }
        .to_json()
        .unwrap();
        assert_eq!(json, r#"{"type":"undo","mode":"text"}"#);

        let json = SyncEvent::Clear.to_json().unwrap();
        assert_eq!(json, r#"{"type":"clear"}"#);
    }

    #[test]
    fn test_commit_fields_are_camel_case() {
        let stroke = Stroke::new(vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)], "#444", 5.0)
            .with_author(Some(9))
            .with_timestamp(42);
        let event = SyncEvent::stroke_commit(&stroke, Size::new(200.0, 100.0));
        let value: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();

        assert_eq!(value["type"], "stroke_commit");
        assert_eq!(value["canvasWidth"], 200.0);
        assert_eq!(value["authorId"], 9);
        assert_eq!(SyncEvent::from_json(&event.to_json().unwrap()).unwrap(), event);
    }

    #[test]
    fn test_rescale_commit_between_peers() {
        let points = vec![Point::new(10.0, 10.0), Point::new(190.0, 190.0)];
        let stroke = Stroke::new(points, "#444", 4.0);
        let event = SyncEvent::stroke_commit(&stroke, Size::new(200.0, 200.0))
            .rescaled_to(Size::new(400.0, 400.0))
            .unwrap();

        let received = event.to_stroke().unwrap();
        assert_eq!(received.points, vec![Point::new(20.0, 20.0), Point::new(380.0, 380.0)]);
        assert!((received.radius - 8.0).abs() < f64::EPSILON);
        assert_eq!(event.source_size(), Some(Size::new(400.0, 400.0)));
    }

    #[test]
    fn test_rescale_text_events() {
        let label = TextLabel::new("hi", Point::new(50.0, 40.0));
        let event = SyncEvent::text_move(3, &label, Size::new(100.0, 100.0))
            .rescaled_to(Size::new(200.0, 50.0))
            .unwrap();

        match event {
            SyncEvent::TextMove { index, text, .. } => {
                assert_eq!(index, 3);
                assert_eq!(text.position(), Point::new(100.0, 20.0));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_zero_dimension_is_rejected() {
        let event = SyncEvent::stroke_progress(
            &[Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
            "#444",
            2.0,
            Size::new(0.0, 100.0),
        );
        assert_eq!(
            event.rescaled_to(Size::new(400.0, 400.0)),
            Err(SyncError::InvalidDimensions {
                width: 0.0,
                height: 100.0
            })
        );
    }

    #[test]
    fn test_events_without_geometry_pass_through() {
        let event = SyncEvent::Undo {
            mode: UndoMode::Brush,
        };
        assert_eq!(event.clone().rescaled_to(Size::new(1.0, 1.0)), Ok(event));
        assert_eq!(SyncEvent::Clear.kind(), "clear");
    }

    #[test]
    fn test_decode_error() {
        assert!(matches!(
            SyncEvent::from_json(r#"{"type":"explode"}"#),
            Err(SyncError::Decode(_))
        ));
    }
}
