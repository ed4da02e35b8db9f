//! Image drawable for placed raster pictures.

use super::{DrawableKind, Interaction, ShapeId, ShapeStyle, ShapeTrait, check_extent, check_finite};
use crate::selection::SelectionStyle;
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Largest share of the surface a freshly placed image may cover.
const MAX_SURFACE_SHARE: f64 = 0.8;

/// An image placed on the surface.
///
/// The pixels live with the rendering surface; the drawable only keeps a
/// reference to them (data URL or URL).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub(crate) id: ShapeId,
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Display width.
    pub width: f64,
    /// Display height.
    pub height: f64,
    /// Pixel source reference.
    pub source: String,
    /// Style properties (stroke used for optional border).
    pub style: ShapeStyle,
    #[serde(default)]
    pub interaction: Interaction,
    #[serde(skip)]
    pub selection_style: SelectionStyle,
}

impl Image {
    /// Create an image at its natural size.
    pub fn new(position: Point, source: String, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            x: position.x,
            y: position.y,
            width,
            height,
            source,
            style: ShapeStyle {
                stroke_width: 0.0,
                ..ShapeStyle::default()
            },
            interaction: Interaction::default(),
            selection_style: SelectionStyle::default(),
        }
    }

    /// Place an image centered on the surface, scaled down (never up) so it
    /// covers at most 80% of either surface dimension.
    pub fn placed_on(source: String, natural: Size, surface: Size) -> Self {
        let max_width = surface.width * MAX_SURFACE_SHARE;
        let max_height = surface.height * MAX_SURFACE_SHARE;
        let scale = if natural.width > max_width || natural.height > max_height {
            (max_width / natural.width).min(max_height / natural.height)
        } else {
            1.0
        };
        let width = natural.width * scale;
        let height = natural.height * scale;
        let position = Point::new(
            (surface.width - width) / 2.0,
            (surface.height - height) / 2.0,
        );
        Self::new(position, source, width, height)
    }

    /// Get the bounding rectangle.
    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

impl ShapeTrait for Image {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> DrawableKind {
        DrawableKind::Image
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.as_rect().inflate(tolerance, tolerance).contains(point)
    }

    fn to_path(&self) -> BezPath {
        // Bounding box as path (for selection rendering)
        self.as_rect().to_path(0.1)
    }

    fn validate(&self) -> Result<(), String> {
        check_finite("image", &[self.x, self.y, self.width, self.height])?;
        check_extent("image", self.width, self.height)?;
        if self.source.is_empty() {
            return Err("image has no pixel source".to_string());
        }
        Ok(())
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
    fn test_large_image_is_scaled_and_centered() {
        let img = Image::placed_on(
            "data:image/png;base64,AAAA".to_string(),
            Size::new(1000.0, 500.0),
            Size::new(800.0, 600.0),
        );
        // Width-limited: 640 / 1000 = 0.64.
        assert!((img.width - 640.0).abs() < 1e-9);
        assert!((img.height - 320.0).abs() < 1e-9);
        assert!((img.x - 80.0).abs() < 1e-9);
        assert!((img.y - 140.0).abs() < 1e-9);
    }

    #[test]
    fn test_small_image_keeps_natural_size() {
        let img = Image::placed_on("a.png".to_string(), Size::new(100.0, 50.0), Size::new(800.0, 600.0));
        assert!((img.width - 100.0).abs() < f64::EPSILON);
        assert!((img.height - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_requires_source() {
        let img = Image::new(Point::ZERO, String::new(), 10.0, 10.0);
        assert!(img.validate().is_err());
    }
}
