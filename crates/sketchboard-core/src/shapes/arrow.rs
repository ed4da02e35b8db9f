//! Arrow drawable.

use super::{DrawableKind, Interaction, ShapeId, ShapeStyle, ShapeTrait, check_finite};
use crate::geometry::{self, ArrowPath};
use crate::selection::SelectionStyle;
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A straight arrow with a two-stroke head at the end point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrow {
    pub(crate) id: ShapeId,
    pub start_x: f64,
    pub start_y: f64,
    /// End point (where the head points).
    pub end_x: f64,
    pub end_y: f64,
    /// Style properties.
    pub style: ShapeStyle,
    #[serde(default)]
    pub interaction: Interaction,
    #[serde(skip)]
    pub selection_style: SelectionStyle,
}

impl Arrow {
    /// Create a new arrow.
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_x: start.x,
            start_y: start.y,
            end_x: end.x,
            end_y: end.y,
            style: ShapeStyle::default(),
            interaction: Interaction::default(),
            selection_style: SelectionStyle::default(),
        }
    }

    pub fn start(&self) -> Point {
        Point::new(self.start_x, self.start_y)
    }

    pub fn end(&self) -> Point {
        Point::new(self.end_x, self.end_y)
    }

    /// Shaft plus the derived head strokes.
    pub fn path(&self) -> ArrowPath {
        geometry::arrow_from(self.start(), self.end())
    }

    /// Get the length of the arrow shaft.
    pub fn length(&self) -> f64 {
        self.start().distance(self.end())
    }
}

impl ShapeTrait for Arrow {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> DrawableKind {
        DrawableKind::Arrow
    }

    fn bounds(&self) -> Rect {
        let path = self.path();
        Rect::from_points(path.start, path.end)
            .union_pt(path.head_left)
            .union_pt(path.head_right)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let path = self.path();
        let reach = tolerance + self.style.stroke_width / 2.0;
        super::point_to_segment_dist(point, path.start, path.end) <= reach
            || super::point_to_segment_dist(point, path.end, path.head_left) <= reach
            || super::point_to_segment_dist(point, path.end, path.head_right) <= reach
    }

    fn to_path(&self) -> BezPath {
        self.path().to_bez_path()
    }

    fn validate(&self) -> Result<(), String> {
        check_finite("arrow", &[self.start_x, self.start_y, self.end_x, self.end_y])
    }

    fn translate(&mut self, delta: Vec2) {
        self.start_x += delta.x;
        self.start_y += delta.y;
        self.end_x += delta.x;
        self.end_y += delta.y;
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }
}
