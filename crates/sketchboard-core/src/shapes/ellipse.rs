//! Ellipse drawable.

use super::{DrawableKind, Interaction, ShapeId, ShapeStyle, ShapeTrait, check_extent, check_finite};
use crate::selection::SelectionStyle;
use kurbo::{BezPath, Ellipse as KurboEllipse, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An axis-aligned ellipse, stored by its bounding box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ellipse {
    pub(crate) id: ShapeId,
    /// Left edge of the bounding box.
    pub x: f64,
    /// Top edge of the bounding box.
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

impl Ellipse {
    /// Create an ellipse from a bounding rectangle.
    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Self {
            id: Uuid::new_v4(),
            x: rect.x0,
            y: rect.y0,
            width: rect.width(),
            height: rect.height(),
            style: ShapeStyle::default(),
            interaction: Interaction::default(),
            selection_style: SelectionStyle::default(),
        }
    }

    /// Horizontal radius.
    pub fn radius_x(&self) -> f64 {
        self.width / 2.0
    }

    /// Vertical radius.
    pub fn radius_y(&self) -> f64 {
        self.height / 2.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.radius_x(), self.y + self.radius_y())
    }

    /// Get as a kurbo Ellipse.
    pub fn as_kurbo(&self) -> KurboEllipse {
        KurboEllipse::new(self.center(), (self.radius_x(), self.radius_y()), 0.0)
    }
}

impl ShapeTrait for Ellipse {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> DrawableKind {
        DrawableKind::Ellipse
    }

    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let center = self.center();
        let half_sw = self.style.stroke_width / 2.0;
        let norm = |rx: f64, ry: f64| {
            if rx <= 0.0 || ry <= 0.0 {
                return f64::INFINITY;
            }
            let dx = (point.x - center.x) / rx;
            let dy = (point.y - center.y) / ry;
            dx * dx + dy * dy
        };

        let outer = norm(
            self.radius_x() + tolerance + half_sw,
            self.radius_y() + tolerance + half_sw,
        );
        if outer > 1.0 {
            return false;
        }
        if self.style.fill_color.is_some() {
            return true;
        }
        let inner = norm(
            self.radius_x() - tolerance - half_sw,
            self.radius_y() - tolerance - half_sw,
        );
        inner >= 1.0
    }

    fn to_path(&self) -> BezPath {
        self.as_kurbo().to_path(0.1)
    }

    fn validate(&self) -> Result<(), String> {
        check_finite("ellipse", &[self.x, self.y, self.width, self.height])?;
        check_extent("ellipse", self.width, self.height)
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
    fn test_radii_are_half_extents() {
        let ellipse = Ellipse::from_rect(Rect::new(10.0, 20.0, 110.0, 60.0));
        assert!((ellipse.radius_x() - 50.0).abs() < f64::EPSILON);
        assert!((ellipse.radius_y() - 20.0).abs() < f64::EPSILON);
        assert_eq!(ellipse.center(), Point::new(60.0, 40.0));
    }

    #[test]
    fn test_hit_test_outline() {
        let ellipse = Ellipse::from_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        assert!(ellipse.hit_test(Point::new(100.0, 50.0), 2.0));
        assert!(!ellipse.hit_test(Point::new(50.0, 50.0), 2.0));
        assert!(!ellipse.hit_test(Point::new(200.0, 50.0), 2.0));
    }

    #[test]
    fn test_degenerate_ellipse_is_valid() {
        let ellipse = Ellipse::from_rect(Rect::new(5.0, 5.0, 5.0, 5.0));
        assert!(ellipse.validate().is_ok());
        assert!(!ellipse.hit_test(Point::new(50.0, 50.0), 0.0));
    }
}
