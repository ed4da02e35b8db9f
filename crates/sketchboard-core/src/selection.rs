//! Selection styling and drag tracking.

use crate::shapes::{SerializableColor, Shape, ShapeId};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Shape of the corner handles drawn around a selected drawable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CornerStyle {
    #[default]
    Circle,
    Rect,
}

/// How a selected drawable is decorated.
///
/// Every drawable carries its own copy; it is view state and never part of
/// a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelectionStyle {
    pub border_color: SerializableColor,
    pub corner_color: SerializableColor,
    /// Handle size in surface pixels.
    pub corner_size: f64,
    pub corner_style: CornerStyle,
    pub transparent_corners: bool,
    pub corner_stroke_color: SerializableColor,
    /// Gap between the drawable bounds and the selection border.
    pub padding: f64,
    pub border_scale_factor: f64,
    pub rotating_point: bool,
    /// Hide the edge midpoint handles (ml, mr, mt, mb).
    pub hide_middle_controls: bool,
}

impl Default for SelectionStyle {
    fn default() -> Self {
        let grey = SerializableColor::new(0x66, 0x66, 0x66, 255);
        Self {
            border_color: grey,
            corner_color: SerializableColor::white(),
            corner_size: 6.0,
            corner_style: CornerStyle::Circle,
            transparent_corners: false,
            corner_stroke_color: grey,
            padding: 0.0,
            border_scale_factor: 1.0,
            rotating_point: false,
            hide_middle_controls: true,
        }
    }
}

/// Give a drawable the board's selection decoration.
pub fn apply_selection_style(shape: &mut Shape, style: &SelectionStyle) {
    *shape.selection_style_mut() = style.clone();
}

/// An in-progress drag of a selected drawable.
#[derive(Debug, Clone)]
pub struct MoveState {
    pub shape_id: ShapeId,
    /// Pointer position at drag start.
    pub start_point: Point,
    /// Pointer position last applied to the drawable.
    pub last_point: Point,
}

impl MoveState {
    pub fn new(shape_id: ShapeId, start_point: Point) -> Self {
        Self {
            shape_id,
            start_point,
            last_point: start_point,
        }
    }

    /// Step since the last applied pointer position; records `point` as applied.
    pub fn advance(&mut self, point: Point) -> Vec2 {
        let step = point - self.last_point;
        self.last_point = point;
        step
    }

    /// Total offset from the drag start.
    pub fn delta(&self) -> Vec2 {
        self.last_point - self.start_point
    }

    pub fn has_moved(&self) -> bool {
        self.delta() != Vec2::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Rectangle;

    fn rect_shape() -> Shape {
        Shape::Rectangle(Rectangle::new(Point::new(0.0, 0.0), 100.0, 50.0))
    }

    #[test]
    fn test_default_style() {
        let style = SelectionStyle::default();
        assert_eq!(style.border_color.to_hex(), "#666666");
        assert_eq!(style.corner_color.to_hex(), "#FFFFFF");
        assert!((style.corner_size - 6.0).abs() < f64::EPSILON);
        assert_eq!(style.corner_style, CornerStyle::Circle);
        assert!(!style.transparent_corners);
        assert!(!style.rotating_point);
        assert!(style.hide_middle_controls);
    }

    #[test]
    fn test_apply_selection_style_copies_record() {
        let mut shape = rect_shape();
        let style = SelectionStyle {
            corner_size: 10.0,
            corner_style: CornerStyle::Rect,
            padding: 4.0,
            ..SelectionStyle::default()
        };
        apply_selection_style(&mut shape, &style);
        assert_eq!(*shape.selection_style(), style);

        // Each drawable owns its copy.
        let other = rect_shape();
        assert_eq!(*other.selection_style(), SelectionStyle::default());
    }

    #[test]
    fn test_move_state() {
        let id = rect_shape().id();
        let mut state = MoveState::new(id, Point::new(10.0, 10.0));
        assert!(!state.has_moved());
        assert_eq!(state.advance(Point::new(15.0, 12.0)), Vec2::new(5.0, 2.0));
        assert_eq!(state.advance(Point::new(20.0, 20.0)), Vec2::new(5.0, 8.0));
        assert_eq!(state.delta(), Vec2::new(10.0, 10.0));
        assert!(state.has_moved());
    }
}
