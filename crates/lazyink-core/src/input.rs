//! Pointer input in canvas pixel coordinates.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Device that produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    #[default]
    Mouse,
    /// Touch contacts snap the lazy brush to the contact point on press.
    Touch,
}

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Down { position: Point, kind: PointerKind },
    Move { position: Point },
    Up { position: Point },
    /// The pointer left the surface; ends a gesture like `Up`.
    Leave { position: Point },
}

impl PointerEvent {
    /// Position carried by the event.
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position }
            | PointerEvent::Leave { position } => *position,
        }
    }
}

/// Tracks the pointer between events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Whether a button or contact is held.
    pub is_pressed: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a pointer event.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { .. } => self.is_pressed = true,
            PointerEvent::Move { .. } => {}
            PointerEvent::Up { .. } | PointerEvent::Leave { .. } => self.is_pressed = false,
        }
    }
}
