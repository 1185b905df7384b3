//! Lazy brush: a brush point dragged behind the pointer by a fixed-length
//! string.
//!
//! The string never stretches. While the pointer stays within `radius` of the
//! brush the string is slack and the brush does not move; once the pointer
//! pulls further, the brush follows along the pointer direction so that the
//! distance is exactly `radius` again. The brush trail is the smoothed input
//! used for strokes.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Options for [`LazyCursor::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Snap both pointer and brush to the target, resetting any slack.
    pub both: bool,
}

impl UpdateOptions {
    /// Options that move both positions.
    pub const BOTH: Self = Self { both: true };
}

/// Snapshot of the cursor, used by the interface overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LazyCursorState {
    pub pointer_position: Point,
    pub brush_position: Point,
    pub string_length: f64,
    /// True while the string is taut and dragging the brush.
    pub enabled: bool,
}

/// Pointer/brush pair connected by an inextensible string.
#[derive(Debug, Clone, PartialEq)]
pub struct LazyCursor {
    pointer: Point,
    brush: Point,
    radius: f64,
    taut: bool,
    has_moved: bool,
}

impl LazyCursor {
    /// Create a cursor with both positions at `initial`.
    pub fn new(radius: f64, initial: Point) -> Self {
        Self {
            pointer: initial,
            brush: initial,
            radius: radius.max(0.0),
            taut: false,
            has_moved: false,
        }
    }

    /// Move the pointer to `target` and drag the brush along if needed.
    ///
    /// Returns false when the pointer was already at `target` and no snap was
    /// requested.
    pub fn update(&mut self, target: Point, options: UpdateOptions) -> bool {
        self.has_moved = false;

        if self.pointer == target && !options.both {
            self.taut = false;
            return false;
        }

        self.pointer = target;

        if options.both {
            self.brush = target;
            self.taut = false;
            self.has_moved = true;
            return true;
        }

        let delta = self.pointer - self.brush;
        let distance = delta.hypot();
        if distance > self.radius {
            // Keep the brush exactly `radius` behind the pointer
            self.brush = self.pointer - delta * (self.radius / distance);
            self.taut = true;
            self.has_moved = true;
        } else {
            self.taut = false;
        }
        true
    }

    /// Change the string length without touching either position.
    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius.max(0.0);
    }

    /// String length.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Whether the last update pulled the brush along a taut string.
    pub fn is_enabled(&self) -> bool {
        self.taut
    }

    /// Whether the last update displaced the brush.
    pub fn has_moved(&self) -> bool {
        self.has_moved
    }

    /// Raw pointer position.
    pub fn pointer(&self) -> Point {
        self.pointer
    }

    /// Smoothed brush position.
    pub fn brush(&self) -> Point {
        self.brush
    }

    /// Straight-line distance between brush and pointer.
    pub fn distance(&self) -> f64 {
        self.pointer.distance(self.brush)
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> LazyCursorState {
        LazyCursorState {
            pointer_position: self.pointer,
            brush_position: self.brush,
            string_length: self.radius,
            enabled: self.taut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_slack_keeps_brush_still() {
        let mut lazy = LazyCursor::new(10.0, Point::new(0.0, 0.0));
        assert!(lazy.update(Point::new(5.0, 0.0), UpdateOptions::default()));

        assert_eq!(lazy.brush(), Point::new(0.0, 0.0));
        assert_eq!(lazy.pointer(), Point::new(5.0, 0.0));
        assert!(!lazy.is_enabled());
        assert!(!lazy.has_moved());
    }

    #[test]
    fn test_taut_string_drags_brush() {
        let mut lazy = LazyCursor::new(10.0, Point::new(0.0, 0.0));
        lazy.update(Point::new(30.0, 40.0), UpdateOptions::default());

        assert!(lazy.is_enabled());
        assert!(lazy.has_moved());
        assert!((lazy.distance() - 10.0).abs() < TOLERANCE);
        assert!((lazy.brush().x - 24.0).abs() < TOLERANCE);
        assert!((lazy.brush().y - 32.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_both_snaps_and_resets_slack() {
        let mut lazy = LazyCursor::new(10.0, Point::new(0.0, 0.0));
        lazy.update(Point::new(100.0, 100.0), UpdateOptions::BOTH);

        assert_eq!(lazy.brush(), Point::new(100.0, 100.0));
        assert_eq!(lazy.pointer(), Point::new(100.0, 100.0));
        assert!(!lazy.is_enabled());
    }

    #[test]
    fn test_zero_radius_tracks_pointer_exactly() {
        let mut lazy = LazyCursor::new(0.0, Point::new(0.0, 0.0));
        for target in [Point::new(50.0, 50.0), Point::new(60.0, 50.0), Point::new(70.3, 49.1)] {
            lazy.update(target, UpdateOptions::default());
            assert_eq!(lazy.brush(), target);
        }
    }

    #[test]
    fn test_repeat_target_is_not_a_move() {
        let mut lazy = LazyCursor::new(0.0, Point::new(0.0, 0.0));
        lazy.update(Point::new(5.0, 5.0), UpdateOptions::default());
        assert!(!lazy.update(Point::new(5.0, 5.0), UpdateOptions::default()));
        assert!(!lazy.has_moved());
        assert!(!lazy.is_enabled());
    }

    #[test]
    fn test_set_radius_keeps_positions() {
        let mut lazy = LazyCursor::new(10.0, Point::new(0.0, 0.0));
        lazy.update(Point::new(5.0, 0.0), UpdateOptions::default());
        lazy.set_radius(2.0);

        assert_eq!(lazy.brush(), Point::new(0.0, 0.0));
        assert_eq!(lazy.pointer(), Point::new(5.0, 0.0));

        lazy.update(Point::new(6.0, 0.0), UpdateOptions::default());
        assert!((lazy.brush().x - 4.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_containment_over_a_walk() {
        let mut lazy = LazyCursor::new(12.0, Point::new(200.0, 200.0));
        let mut x: f64 = 200.0;
        let mut y: f64 = 200.0;
        for i in 0..500 {
            let t = i as f64 * 0.37;
            x += t.sin() * 17.0;
            y += (t * 1.3).cos() * 11.0;
            lazy.update(Point::new(x, y), UpdateOptions::default());
            assert!(lazy.distance() <= lazy.radius() + TOLERANCE);
        }
    }
}
