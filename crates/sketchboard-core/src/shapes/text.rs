//! Text drawable.

use super::{DrawableKind, Interaction, SerializableColor, ShapeId, ShapeStyle, ShapeTrait, check_finite};
use crate::selection::SelectionStyle;
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Line height as a multiple of the font size.
const LINE_HEIGHT: f64 = 1.16;

/// Average glyph advance as a multiple of the font size.
const CHAR_WIDTH_FACTOR: f64 = 0.6;

/// A wrapped, possibly multi-line text block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub(crate) id: ShapeId,
    /// Left edge of the text box.
    pub x: f64,
    /// Top edge of the text box.
    pub y: f64,
    /// The text content; `\n` separates lines.
    pub content: String,
    /// Font size in pixels.
    pub font_size: f64,
    /// Wrapping width of the text box.
    pub box_width: f64,
    /// Style properties; the fill color is the glyph color.
    pub style: ShapeStyle,
    #[serde(default)]
    pub interaction: Interaction,
    #[serde(skip)]
    pub selection_style: SelectionStyle,
}

impl Text {
    pub const DEFAULT_FONT_SIZE: f64 = 16.0;
    pub const DEFAULT_BOX_WIDTH: f64 = 200.0;

    /// Create a new text block with default font size and box width.
    pub fn new(position: Point, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            x: position.x,
            y: position.y,
            content,
            font_size: Self::DEFAULT_FONT_SIZE,
            box_width: Self::DEFAULT_BOX_WIDTH,
            style: ShapeStyle {
                stroke_color: SerializableColor::black(),
                stroke_width: 0.0,
                fill_color: Some(SerializableColor::black()),
            },
            interaction: Interaction::default(),
            selection_style: SelectionStyle::default(),
        }
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_box_width(mut self, width: f64) -> Self {
        self.box_width = width;
        self
    }

    /// Glyph color.
    pub fn color(&self) -> SerializableColor {
        self.style.fill_color.unwrap_or(self.style.stroke_color)
    }

    /// Number of rendered lines once wrapped at the box width.
    pub fn line_count(&self) -> usize {
        let per_line = (self.box_width / (self.font_size * CHAR_WIDTH_FACTOR))
            .floor()
            .max(1.0) as usize;
        self.content
            .split('\n')
            .map(|line| line.chars().count().div_ceil(per_line).max(1))
            .sum()
    }

    fn approximate_height(&self) -> f64 {
        self.line_count() as f64 * self.font_size * LINE_HEIGHT
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> DrawableKind {
        DrawableKind::Text
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.x,
            self.y,
            self.x + self.box_width,
            self.y + self.approximate_height(),
        )
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }

    fn to_path(&self) -> BezPath {
        self.bounds().to_path(0.1)
    }

    fn validate(&self) -> Result<(), String> {
        check_finite("text", &[self.x, self.y, self.font_size, self.box_width])?;
        if self.font_size <= 0.0 {
            return Err(format!("text has non-positive font size {}", self.font_size));
        }
        if self.box_width < 0.0 {
            return Err(format!("text has negative box width {}", self.box_width));
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
    fn test_text_creation() {
        let text = Text::new(Point::new(10.0, 20.0), "Hello".to_string());
        assert_eq!(text.content, "Hello");
        assert!((text.font_size - 16.0).abs() < f64::EPSILON);
        assert!((text.box_width - 200.0).abs() < f64::EPSILON);
        assert_eq!(text.color(), SerializableColor::black());
    }

    #[test]
    fn test_multiline_bounds_grow() {
        let one = Text::new(Point::ZERO, "a".to_string());
        let three = Text::new(Point::ZERO, "a\nb\nc".to_string());
        assert_eq!(three.line_count(), 3);
        assert!(three.bounds().height() > one.bounds().height() * 2.5);
    }

    #[test]
    fn test_long_line_wraps() {
        // 200 / (16 * 0.6) = 20 chars per line.
        let text = Text::new(Point::ZERO, "x".repeat(41));
        assert_eq!(text.line_count(), 3);
    }

    #[test]
    fn test_validate_font_size() {
        let text = Text::new(Point::ZERO, "a".to_string()).with_font_size(0.0);
        assert!(text.validate().is_err());
    }
}
