//! HUD placement: drag gesture handling and the anchored default position.

use serde::{Deserialize, Serialize};

/// Margin between the anchored HUD and the viewport edges.
const ANCHOR_MARGIN: f64 = 10.0;

/// A top-left position in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// JSON form used by the `hud_position` setting.
    #[must_use]
    pub fn to_value(self) -> serde_json::Value {
        serde_json::json!({ "x": self.x, "y": self.y })
    }

    /// Parse the `hud_position` setting value. Null or malformed values
    /// read as no saved position.
    #[must_use]
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Pointer offset within the HUD rectangle, captured at press.
#[derive(Debug, Clone, Copy)]
struct DragGesture {
    offset_x: f64,
    offset_y: f64,
}

/// Tracks where the HUD sits and the in-flight drag gesture.
///
/// With no saved position (or with dragging disabled) the HUD anchors to
/// the bottom-right of the viewport with a fixed margin.
#[derive(Debug)]
pub struct PlacementController {
    enabled: bool,
    hud_size: Size,
    saved: Option<Position>,
    drag: Option<DragGesture>,
}

impl PlacementController {
    #[must_use]
    pub const fn new(enabled: bool, hud_size: Size) -> Self {
        Self {
            enabled,
            hud_size,
            saved: None,
            drag: None,
        }
    }

    /// Adopt a previously persisted position (or none).
    pub fn set_position(&mut self, position: Option<Position>) {
        self.saved = position;
    }

    #[must_use]
    pub const fn saved_position(&self) -> Option<Position> {
        self.saved
    }

    /// Enable or disable dragging. Disabling snaps back to the anchored
    /// default and cancels any in-flight gesture.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.saved = None;
            self.drag = None;
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Where the HUD currently sits: the saved position, or the anchored
    /// bottom-right default computed from the viewport.
    #[must_use]
    pub fn position(&self, viewport: Size) -> Position {
        self.saved.unwrap_or_else(|| self.anchored(viewport))
    }

    /// Begin a drag. The pointer must land inside the HUD rectangle;
    /// presses elsewhere (or while dragging is disabled) are ignored.
    pub fn press(&mut self, pointer: Position, viewport: Size) {
        if !self.enabled {
            return;
        }
        let origin = self.position(viewport);
        let inside = pointer.x >= origin.x
            && pointer.x <= origin.x + self.hud_size.width
            && pointer.y >= origin.y
            && pointer.y <= origin.y + self.hud_size.height;
        if !inside {
            return;
        }
        self.drag = Some(DragGesture {
            offset_x: pointer.x - origin.x,
            offset_y: pointer.y - origin.y,
        });
    }

    /// Move the in-flight gesture. Returns the new top-left, clamped to
    /// non-negative coordinates, or `None` when no gesture is active.
    pub fn drag_to(&mut self, pointer: Position) -> Option<Position> {
        let gesture = self.drag?;
        let position = Position {
            x: (pointer.x - gesture.offset_x).max(0.0),
            y: (pointer.y - gesture.offset_y).max(0.0),
        };
        self.saved = Some(position);
        Some(position)
    }

    /// End the gesture, reporting the final position for persistence.
    pub fn release(&mut self) -> Option<Position> {
        self.drag.take()?;
        self.saved
    }

    fn anchored(&self, viewport: Size) -> Position {
        Position {
            x: (viewport.width - self.hud_size.width - ANCHOR_MARGIN).max(0.0),
            y: (viewport.height - self.hud_size.height - ANCHOR_MARGIN).max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size::new(1920.0, 1080.0);
    const HUD: Size = Size::new(300.0, 80.0);

    fn controller() -> PlacementController {
        PlacementController::new(true, HUD)
    }

    #[test]
    fn anchored_default_sits_bottom_right() {
        let controller = controller();
        let position = controller.position(VIEWPORT);
        assert_eq!(position, Position::new(1610.0, 990.0));
    }

    #[test]
    fn anchored_default_clamps_in_tiny_viewports() {
        let controller = controller();
        let position = controller.position(Size::new(200.0, 50.0));
        assert_eq!(position, Position::new(0.0, 0.0));
    }

    #[test]
    fn press_drag_release_moves_the_hud() {
        let mut controller = controller();

        // Grab 20,10 inside the anchored rectangle.
        controller.press(Position::new(1630.0, 1000.0), VIEWPORT);
        assert!(controller.is_dragging());

        let moved = controller.drag_to(Position::new(520.0, 310.0)).unwrap();
        assert_eq!(moved, Position::new(500.0, 300.0));

        let released = controller.release().unwrap();
        assert_eq!(released, Position::new(500.0, 300.0));
        assert!(!controller.is_dragging());
        assert_eq!(controller.position(VIEWPORT), Position::new(500.0, 300.0));
    }

    #[test]
    fn drag_clamps_to_non_negative_coordinates() {
        let mut controller = controller();
        controller.press(Position::new(1630.0, 1000.0), VIEWPORT);

        let moved = controller.drag_to(Position::new(5.0, 2.0)).unwrap();
        assert_eq!(moved, Position::new(0.0, 0.0));
    }

    #[test]
    fn press_outside_the_hud_is_ignored() {
        let mut controller = controller();
        controller.press(Position::new(10.0, 10.0), VIEWPORT);
        assert!(!controller.is_dragging());
        assert!(controller.drag_to(Position::new(50.0, 50.0)).is_none());
    }

    #[test]
    fn drag_and_release_without_press_are_noops() {
        let mut controller = controller();
        assert!(controller.drag_to(Position::new(100.0, 100.0)).is_none());
        assert!(controller.release().is_none());
        assert_eq!(controller.position(VIEWPORT), Position::new(1610.0, 990.0));
    }

    #[test]
    fn disabling_snaps_back_to_the_anchor() {
        let mut controller = controller();
        controller.set_position(Some(Position::new(40.0, 40.0)));

        controller.set_enabled(false);

        assert_eq!(controller.position(VIEWPORT), Position::new(1610.0, 990.0));
        controller.press(Position::new(1630.0, 1000.0), VIEWPORT);
        assert!(!controller.is_dragging());
    }

    #[test]
    fn restored_position_places_absolutely() {
        let mut controller = controller();
        controller.set_position(Some(Position::new(12.0, 700.0)));
        assert_eq!(controller.position(VIEWPORT), Position::new(12.0, 700.0));
    }

    #[test]
    fn position_value_roundtrip() {
        let position = Position::new(120.5, 44.0);
        let value = position.to_value();
        assert_eq!(Position::from_value(&value), Some(position));

        assert_eq!(Position::from_value(&serde_json::Value::Null), None);
        assert_eq!(Position::from_value(&serde_json::json!("corner")), None);
    }
}
