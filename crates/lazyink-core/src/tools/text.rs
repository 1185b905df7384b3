//! Text annotation tool: placing, typing and dragging labels.

use crate::canvas::DrawingState;
use crate::shapes::{AuthorId, Padding, TextLabel, TextMetrics, now_millis};
use kurbo::{Point, Size};

/// Distance kept between the input anchor and the bottom edge.
const BOTTOM_MARGIN: f64 = 30.0;
/// Horizontal step to the next column when the anchor wraps.
const COLUMN_STEP: f64 = 50.0;
/// Top of a fresh column.
const COLUMN_TOP: f64 = 10.0;

/// Styling applied to newly committed labels.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_family: String,
    /// Font size as a fraction of the canvas width.
    pub size_ratio: f64,
    pub color: String,
    pub background_color: Option<String>,
    pub padding: Padding,
    pub author_id: Option<AuthorId>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: TextLabel::DEFAULT_FONT_FAMILY.to_string(),
            size_ratio: TextLabel::DEFAULT_FONT_SIZE / 400.0,
            color: "#000".to_string(),
            background_color: None,
            padding: Padding::default(),
            author_id: None,
        }
    }
}

/// Outcome of a text-mode press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextPress {
    /// A label was hit and is now being dragged.
    Selected(usize),
    /// Nothing was hit; the input anchor moved to the press position.
    Anchored(Point),
}

/// State of the text tool between events.
#[derive(Debug, Clone, PartialEq)]
pub struct TextTool {
    selected: Option<usize>,
    drag_origin: Point,
    input: String,
    anchor: Point,
}

impl TextTool {
    /// Create a tool whose first entry opens at `anchor`.
    pub fn new(anchor: Point) -> Self {
        Self {
            selected: None,
            drag_origin: anchor,
            input: String::new(),
            anchor,
        }
    }

    /// Index of the label being dragged.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Where the next committed label is placed.
    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Current contents of the input buffer.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the input buffer.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Hit-test the labels of `state` at `point`. The topmost label wins.
    pub fn press(&mut self, state: &DrawingState, point: Point) -> TextPress {
        self.drag_origin = point;
        match state.text_at_point(point) {
            Some(index) => {
                self.selected = Some(index);
                TextPress::Selected(index)
            }
            None => {
                self.selected = None;
                self.anchor = point;
                TextPress::Anchored(point)
            }
        }
    }

    /// Move the selected label by the pointer delta since the last event.
    /// Returns the index of the moved label.
    pub fn drag(&mut self, texts: &mut [TextLabel], point: Point) -> Option<usize> {
        let index = self.selected?;
        let delta = point - self.drag_origin;
        self.drag_origin = point;

        let Some(label) = texts.get_mut(index) else {
            // The label vanished under us (undo or clear)
            self.selected = None;
            return None;
        };
        label.translate(delta.x, delta.y);
        Some(index)
    }

    /// End a drag.
    pub fn release(&mut self) {
        self.selected = None;
    }

    /// Turn the input buffer into a label and advance the anchor.
    ///
    /// Returns `None` (and keeps the buffer) when the input is blank.
    pub fn commit(
        &mut self,
        style: &TextStyle,
        canvas: Size,
        metrics: &dyn TextMetrics,
    ) -> Option<TextLabel> {
        if self.input.trim().is_empty() {
            return None;
        }

        let text = std::mem::take(&mut self.input);
        let mut label = TextLabel::new(text, self.anchor);
        label.font_family = style.font_family.clone();
        label.size_ratio = style.size_ratio;
        label.fit(canvas.width, metrics);
        // The anchor is the top of the line; labels sit on their baseline
        label.y += label.font_size(canvas.width);
        label.color = style.color.clone();
        label.background_color = style.background_color.clone();
        label.background_padding = style.padding;
        label.author_id = style.author_id;
        label.timestamp = now_millis();

        self.anchor = next_anchor(&label, canvas);
        Some(label)
    }
}

/// Anchor one line below `label`, wrapping to a new column near the bottom.
fn next_anchor(label: &TextLabel, canvas: Size) -> Point {
    let next_y = label.y + label.height;
    if next_y > canvas.height - BOTTOM_MARGIN {
        Point::new(label.x + COLUMN_STEP, COLUMN_TOP)
    } else {
        Point::new(label.x, next_y)
    }
}
