//! Drawing state: the committed strokes and labels of one surface.

use crate::shapes::{Stroke, TextLabel};
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Which collection an undo applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UndoMode {
    /// Remove the most recent stroke.
    #[default]
    Brush,
    /// Remove the most recent text label.
    Text,
}

/// All committed content of a drawing surface.
///
/// Undo is last-in-first-out over each collection separately; there is no
/// redo history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingState {
    /// Committed strokes, oldest first.
    pub lines: Vec<Stroke>,
    /// Committed labels, oldest first.
    pub texts: Vec<TextLabel>,
    /// Canvas width in pixels the geometry is expressed in.
    pub canvas_width: f64,
    /// Canvas height in pixels the geometry is expressed in.
    pub canvas_height: f64,
}

impl DrawingState {
    /// Create an empty state for a canvas of the given size.
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            lines: Vec::new(),
            texts: Vec::new(),
            canvas_width,
            canvas_height,
        }
    }

    /// Canvas size.
    pub fn size(&self) -> Size {
        Size::new(self.canvas_width, self.canvas_height)
    }

    /// Record new canvas dimensions (geometry is not touched).
    pub fn set_size(&mut self, size: Size) {
        self.canvas_width = size.width;
        self.canvas_height = size.height;
    }

    /// Append a stroke. Returns false (and drops it) when it has fewer than
    /// two points.
    pub fn push_line(&mut self, stroke: Stroke) -> bool {
        if !stroke.is_committable() {
            return false;
        }
        self.lines.push(stroke);
        true
    }

    /// Remove the most recent stroke.
    pub fn pop_line(&mut self) -> Option<Stroke> {
        self.lines.pop()
    }

    /// Append a label.
    pub fn push_text(&mut self, label: TextLabel) {
        self.texts.push(label);
    }

    /// Remove the most recent label.
    pub fn pop_text(&mut self) -> Option<TextLabel> {
        self.texts.pop()
    }

    /// Replace the label at `index`. Returns false when out of range.
    pub fn replace_text(&mut self, index: usize, label: TextLabel) -> bool {
        match self.texts.get_mut(index) {
            Some(slot) => {
                *slot = label;
                true
            }
            None => false,
        }
    }

    /// Undo the most recent record of the given kind.
    /// Returns true if something was removed.
    pub fn undo(&mut self, mode: UndoMode) -> bool {
        match mode {
            UndoMode::Brush => self.pop_line().is_some(),
            UndoMode::Text => self.pop_text().is_some(),
        }
    }

    /// Drop all strokes and labels.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.texts.clear();
    }

    /// Check if nothing is committed.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.texts.is_empty()
    }

    /// Index of the topmost label under `point`.
    pub fn text_at_point(&self, point: kurbo::Point) -> Option<usize> {
        self.texts.iter().rposition(|t| t.hit_test(point))
    }
}
