//! Shape geometry derived from drag gestures.
//!
//! Everything here is pure: two pointer positions in, geometry out.

use crate::shapes::{Arrow, Ellipse, Rectangle, Shape, ShapeStyle};
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Length of each arrow head stroke.
pub const ARROW_HEAD_LENGTH: f64 = 15.0;
/// Angle between the shaft and each head stroke.
pub const ARROW_HEAD_ANGLE: f64 = PI / 6.0;

/// Drawables that are created by dragging out a box or a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Arrow,
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Arrow => "arrow",
        }
    }
}

/// Arrow geometry: a shaft plus two head strokes ending at `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowPath {
    pub start: Point,
    pub end: Point,
    pub head_left: Point,
    pub head_right: Point,
}

impl ArrowPath {
    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.start);
        path.line_to(self.end);
        path.move_to(self.end);
        path.line_to(self.head_left);
        path.move_to(self.end);
        path.line_to(self.head_right);
        path
    }
}

/// Axis-aligned box spanned by two corners, in any drag direction.
pub fn rectangle_from(p0: Point, p1: Point) -> Rect {
    Rect::from_points(p0, p1)
}

/// Ellipse inscribed in the dragged box; radii are half the extents.
pub fn ellipse_from(p0: Point, p1: Point) -> Rect {
    rectangle_from(p0, p1)
}

/// Shaft from `p0` to `p1` with the head at `p1`.
pub fn arrow_from(p0: Point, p1: Point) -> ArrowPath {
    arrow_with_head(p0, p1, ARROW_HEAD_LENGTH, ARROW_HEAD_ANGLE)
}

/// Arrow geometry with an explicit head length and half-angle (radians).
pub fn arrow_with_head(p0: Point, p1: Point, length: f64, angle: f64) -> ArrowPath {
    let heading = (p1.y - p0.y).atan2(p1.x - p0.x);
    let head = |theta: f64| Point::new(p1.x - length * theta.cos(), p1.y - length * theta.sin());
    ArrowPath {
        start: p0,
        end: p1,
        head_left: head(heading - angle),
        head_right: head(heading + angle),
    }
}

/// Build the drawable for a drag from `p0` to `p1`.
pub fn shape_from_drag(kind: ShapeKind, p0: Point, p1: Point, style: ShapeStyle) -> Shape {
    match kind {
        ShapeKind::Rectangle => {
            let mut rect = Rectangle::from_rect(rectangle_from(p0, p1));
            rect.style = style;
            Shape::Rectangle(rect)
        }
        ShapeKind::Ellipse => {
            let mut ellipse = Ellipse::from_rect(ellipse_from(p0, p1));
            ellipse.style = style;
            Shape::Ellipse(ellipse)
        }
        ShapeKind::Arrow => {
            let mut arrow = Arrow::new(p0, p1);
            arrow.style = style;
            Shape::Arrow(arrow)
        }
    }
}
