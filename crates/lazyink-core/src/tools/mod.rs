//! Tool system: brush gestures and text annotation.

mod text;

pub use text::{TextPress, TextStyle, TextTool};

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Freehand strokes through the lazy brush.
    #[default]
    Brush,
    /// Place and drag text labels.
    Text,
}

/// Phase of a brush gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    /// No button or contact held.
    #[default]
    Idle,
    /// Pressed, but the lazy string has not pulled the brush yet.
    Pressing {
        /// Brush position at press time; becomes the first stroke point.
        anchor: Point,
    },
    /// Brush points are being collected.
    Drawing,
}

/// Collects the brush trail of one gesture.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current state of the brush gesture.
    pub state: GestureState,
    points: Vec<Point>,
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool, abandoning any gesture in progress.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.cancel();
    }

    /// Begin a gesture with the brush at `brush`.
    pub fn begin(&mut self, brush: Point) {
        self.points.clear();
        self.state = GestureState::Pressing { anchor: brush };
    }

    /// Feed the brush position after a pointer move.
    ///
    /// `taut` and `moved` come from the lazy cursor. Returns true when a
    /// point was appended to the trail.
    pub fn update(&mut self, brush: Point, taut: bool, moved: bool) -> bool {
        match self.state {
            GestureState::Idle => false,
            GestureState::Pressing { anchor } => {
                if !taut {
                    return false;
                }
                self.state = GestureState::Drawing;
                self.points.push(anchor);
                self.push_point(brush);
                true
            }
            GestureState::Drawing => moved && self.push_point(brush),
        }
    }

    /// End the gesture. Returns the trail if it is long enough to commit.
    pub fn end(&mut self) -> Option<Vec<Point>> {
        let was_drawing = self.state == GestureState::Drawing;
        self.state = GestureState::Idle;
        let points = std::mem::take(&mut self.points);
        (was_drawing && points.len() >= 2).then_some(points)
    }

    /// Drop the gesture without committing.
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
        self.points.clear();
    }

    /// Points collected so far.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Check if a button or contact is held.
    pub fn is_active(&self) -> bool {
        self.state != GestureState::Idle
    }

    fn push_point(&mut self, point: Point) -> bool {
        if self.points.last() == Some(&point) {
            return false;
        }
        self.points.push(point);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slack_press_does_not_draw() {
        let mut tools = ToolManager::new();
        tools.begin(Point::new(5.0, 5.0));
        assert!(!tools.update(Point::new(5.0, 5.0), false, false));
        assert!(tools.is_active());
        assert!(matches!(tools.state, GestureState::Pressing { .. }));
        assert_eq!(tools.end(), None);
    }

    #[test]
    fn test_taut_move_starts_stroke_at_anchor() {
        let mut tools = ToolManager::new();
        tools.begin(Point::new(50.0, 50.0));
        assert!(tools.update(Point::new(60.0, 50.0), true, true));
        assert!(tools.update(Point::new(70.0, 50.0), true, true));

        assert_eq!(
            tools.end(),
            Some(vec![
                Point::new(50.0, 50.0),
                Point::new(60.0, 50.0),
                Point::new(70.0, 50.0)
            ])
        );
        assert_eq!(tools.state, GestureState::Idle);
    }

    #[test]
    fn test_duplicate_points_are_skipped() {
        let mut tools = ToolManager::new();
        tools.begin(Point::new(1.0, 1.0));
        tools.update(Point::new(2.0, 2.0), true, true);
        assert!(!tools.update(Point::new(2.0, 2.0), true, true));
        assert!(!tools.update(Point::new(3.0, 3.0), false, false));
        assert_eq!(tools.points().len(), 2);
    }

    #[test]
    fn test_single_point_never_commits() {
        let mut tools = ToolManager::new();
        tools.begin(Point::new(1.0, 1.0));
        // Brush pulled straight onto the anchor: only one distinct point
        tools.update(Point::new(1.0, 1.0), true, true);
        assert_eq!(tools.points().len(), 1);
        assert_eq!(tools.end(), None);
    }

    #[test]
    fn test_set_tool_cancels_gesture() {
        let mut tools = ToolManager::new();
        tools.begin(Point::ZERO);
        tools.update(Point::new(4.0, 0.0), true, true);
        tools.set_tool(ToolKind::Text);

        assert_eq!(tools.current_tool, ToolKind::Text);
        assert!(tools.points().is_empty());
        assert!(!tools.is_active());
    }
}
