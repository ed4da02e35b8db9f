//! Freehand stroke drawable (pen and eraser).

use super::{DrawableKind, Interaction, ShapeId, ShapeStyle, ShapeTrait, check_finite};
use crate::selection::SelectionStyle;
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a stroke combines with what is already painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Composite {
    /// Regular paint.
    #[default]
    Normal,
    /// Destructive paint: removes what lies beneath.
    Erase,
}

/// A freehand stroke (ordered series of points).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stroke {
    pub(crate) id: ShapeId,
    /// Points in drawing order.
    pub points: Vec<Point>,
    #[serde(default)]
    pub composite: Composite,
    /// Style properties.
    pub style: ShapeStyle,
    #[serde(default)]
    pub interaction: Interaction,
    #[serde(skip)]
    pub selection_style: SelectionStyle,
}

impl Stroke {
    /// Create from existing points.
    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
            composite: Composite::Normal,
            style: ShapeStyle::default(),
            interaction: Interaction::default(),
            selection_style: SelectionStyle::default(),
        }
    }

    /// Create an eraser stroke.
    pub fn eraser(points: Vec<Point>) -> Self {
        Self {
            composite: Composite::Erase,
            ..Self::from_points(points)
        }
    }

    pub fn is_eraser(&self) -> bool {
        self.composite == Composite::Erase
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl ShapeTrait for Stroke {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> DrawableKind {
        DrawableKind::Stroke
    }

    fn bounds(&self) -> Rect {
        let Some(first) = self.points.first() else {
            return Rect::ZERO;
        };
        self.points
            .iter()
            .fold(Rect::from_points(*first, *first), |acc, p| {
                acc.union_pt(*p)
            })
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        if self.points.is_empty() {
            return false;
        }
        let dist = super::point_to_polyline_dist(point, &self.points);
        dist <= tolerance + self.style.stroke_width / 2.0
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut points = self.points.iter();
        if let Some(first) = points.next() {
            path.move_to(*first);
            for p in points {
                path.line_to(*p);
            }
        }
        path
    }

    fn validate(&self) -> Result<(), String> {
        if self.points.is_empty() {
            return Err("stroke has no points".to_string());
        }
        let coords: Vec<f64> = self.points.iter().flat_map(|p| [p.x, p.y]).collect();
        check_finite("stroke", &coords)
    }

    fn translate(&mut self, delta: Vec2) {
        for p in &mut self.points {
            *p += delta;
        }
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
    fn test_bounds_cover_all_points() {
        let stroke = Stroke::from_points(vec![
            Point::new(10.0, 5.0),
            Point::new(-3.0, 20.0),
            Point::new(7.0, 1.0),
        ]);
        assert_eq!(stroke.bounds(), Rect::new(-3.0, 1.0, 10.0, 20.0));
    }

    #[test]
    fn test_eraser_composite_serializes() {
        let stroke = Stroke::eraser(vec![Point::ZERO, Point::new(1.0, 1.0)]);
        assert!(stroke.is_eraser());
        let value = serde_json::to_value(&stroke).unwrap();
        assert_eq!(value["composite"], "erase");
    }

    #[test]
    fn test_validate() {
        assert!(Stroke::from_points(Vec::new()).validate().is_err());
        assert!(Stroke::from_points(vec![Point::new(f64::NAN, 0.0)]).validate().is_err());
        assert!(Stroke::from_points(vec![Point::ZERO]).validate().is_ok());
    }

    #[test]
    fn test_translate_moves_every_point() {
        let mut stroke = Stroke::from_points(vec![Point::ZERO, Point::new(1.0, 2.0)]);
        stroke.translate(Vec2::new(5.0, -1.0));
        assert_eq!(stroke.points, vec![Point::new(5.0, -1.0), Point::new(6.0, 1.0)]);
    }
}
