//! Rectangle drawable.

use super::{DrawableKind, Interaction, ShapeId, ShapeStyle, ShapeTrait, check_extent, check_finite};
use crate::selection::SelectionStyle;
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An axis-aligned rectangle outline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: ShapeId,
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Style properties.
    pub style: ShapeStyle,
    #[serde(default)]
    pub interaction: Interaction,
    #[serde(skip)]
    pub selection_style: SelectionStyle,
}

impl Rectangle {
    /// Create a new rectangle.
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            x: position.x,
            y: position.y,
            width,
            height,
            style: ShapeStyle::default(),
            interaction: Interaction::default(),
            selection_style: SelectionStyle::default(),
        }
    }

    /// Create a rectangle covering a kurbo Rect.
    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::new(Point::new(rect.x0, rect.y0), rect.width(), rect.height())
    }

    /// Get the rectangle as a kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

impl ShapeTrait for Rectangle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> DrawableKind {
        DrawableKind::Rectangle
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let rect = self.as_rect();
        if self.style.fill_color.is_some() {
            rect.inflate(tolerance, tolerance).contains(point)
        } else {
            // Outline only: hit on the border
            let reach = tolerance + self.style.stroke_width / 2.0;
            let outer = rect.inflate(reach, reach);
            let inner = rect.inflate(-reach, -reach);
            outer.contains(point) && !inner.contains(point)
        }
    }

    fn to_path(&self) -> BezPath {
        self.as_rect().to_path(0.1)
    }

    fn validate(&self) -> Result<(), String> {
        check_finite("rectangle", &[self.x, self.y, self.width, self.height])?;
        check_extent("rectangle", self.width, self.height)
    }

    fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_from_rect_normalizes() {
        let rect = Rectangle::from_rect(Rect::new(100.0, 100.0, 50.0, 50.0));
        assert!((rect.x - 50.0).abs() < f64::EPSILON);
        assert!((rect.y - 50.0).abs() < f64::EPSILON);
        assert!((rect.width - 50.0).abs() < f64::EPSILON);
        assert!((rect.height - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test_outline() {
        let rect = Rectangle::new(Point::new(0.0, 0.0), 100.0, 100.0);
        assert!(rect.hit_test(Point::new(0.0, 50.0), 2.0));
        assert!(!rect.hit_test(Point::new(50.0, 50.0), 2.0));
        assert!(!rect.hit_test(Point::new(150.0, 50.0), 2.0));
    }

    #[test]
    fn test_bounds() {
        let rect = Rectangle::new(Point::new(10.0, 20.0), 100.0, 50.0);
        let bounds = rect.bounds();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 20.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 110.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate() {
        assert!(Rectangle::new(Point::ZERO, 0.0, 0.0).validate().is_ok());
        assert!(Rectangle::new(Point::new(f64::INFINITY, 0.0), 1.0, 1.0).validate().is_err());
        assert!(Rectangle::new(Point::ZERO, -1.0, 1.0).validate().is_err());
    }
}
