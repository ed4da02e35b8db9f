//! Drawable definitions for the sketch surface.

mod arrow;
mod ellipse;
mod image;
mod rectangle;
mod stroke;
mod text;

pub use arrow::Arrow;
pub use ellipse::Ellipse;
pub use image::Image;
pub use rectangle::Rectangle;
pub use stroke::{Composite, Stroke};
pub use text::Text;

use crate::selection::SelectionStyle;
use kurbo::{BezPath, Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Serializable color representation (RGBA8), stored as a hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa` or `transparent`.
    pub fn from_hex(color: &str) -> Option<Self> {
        let color = color.trim();
        if color.eq_ignore_ascii_case("transparent") {
            return Some(Self::transparent());
        }

        let hex = color.strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let r = channel(&hex[0..1])? * 17;
                let g = channel(&hex[1..2])? * 17;
                let b = channel(&hex[2..3])? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            )),
            8 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    /// Format as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Display for SerializableColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for SerializableColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SerializableColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_hex(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color: {raw}")))
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Style properties for drawables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStyle {
    /// Stroke color.
    pub stroke_color: SerializableColor,
    /// Stroke width.
    pub stroke_width: f64,
    /// Fill color (None = transparent). Text uses this as its glyph color.
    #[serde(default)]
    pub fill_color: Option<SerializableColor>,
}

impl ShapeStyle {
    /// Outline-only style with the given color and width.
    pub fn outline(stroke_color: SerializableColor, stroke_width: f64) -> Self {
        Self {
            stroke_color,
            stroke_width,
            fill_color: None,
        }
    }

    /// Get the stroke color as a peniko Color.
    pub fn stroke(&self) -> Color {
        self.stroke_color.into()
    }

    /// Get the fill color as a peniko Color.
    pub fn fill(&self) -> Option<Color> {
        self.fill_color.map(|c| c.into())
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self::outline(SerializableColor::black(), 2.0)
    }
}

/// Whether a drawable reacts to pointer input on the surface.
///
/// Committed drawables start inert; select mode flips both flags on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Interaction {
    pub selectable: bool,
    pub interactive: bool,
}

impl Interaction {
    pub fn enabled() -> Self {
        Self {
            selectable: true,
            interactive: true,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }
}

/// Unique identifier for drawables.
pub type ShapeId = Uuid;

/// Drawable kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawableKind {
    Stroke,
    Rectangle,
    Ellipse,
    Arrow,
    Text,
    Image,
}

impl DrawableKind {
    pub fn name(&self) -> &'static str {
        match self {
            DrawableKind::Stroke => "stroke",
            DrawableKind::Rectangle => "rectangle",
            DrawableKind::Ellipse => "ellipse",
            DrawableKind::Arrow => "arrow",
            DrawableKind::Text => "text",
            DrawableKind::Image => "image",
        }
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt()
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    if points.len() == 1 {
        return point.distance(points[0]);
    }
    points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Reject non-finite numbers in drawable geometry.
pub(crate) fn check_finite(what: &str, values: &[f64]) -> Result<(), String> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(format!("{what} has non-finite coordinates"))
    }
}

/// Reject negative extents.
pub(crate) fn check_extent(what: &str, width: f64, height: f64) -> Result<(), String> {
    if width < 0.0 || height < 0.0 {
        Err(format!("{what} has negative size {width}x{height}"))
    } else {
        Ok(())
    }
}

/// Common trait for all drawables.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// Get the drawable kind.
    fn kind(&self) -> DrawableKind;

    /// Get the bounding box in surface coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a point hits this drawable.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Get the path representation for rendering.
    fn to_path(&self) -> BezPath;

    /// Check the geometry is well-formed.
    fn validate(&self) -> Result<(), String>;

    /// Move the drawable by an offset.
    fn translate(&mut self, delta: Vec2);

    fn style(&self) -> &ShapeStyle;

    fn style_mut(&mut self) -> &mut ShapeStyle;
}

/// Enum wrapper for all drawable types (for serialization).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Stroke(Stroke),
    Rectangle(Rectangle),
    Ellipse(Ellipse),
    Arrow(Arrow),
    Text(Text),
    Image(Image),
}

impl Shape {
    fn as_trait(&self) -> &dyn ShapeTrait {
        match self {
            Shape::Stroke(s) => s,
            Shape::Rectangle(s) => s,
            Shape::Ellipse(s) => s,
            Shape::Arrow(s) => s,
            Shape::Text(s) => s,
            Shape::Image(s) => s,
        }
    }

    fn as_trait_mut(&mut self) -> &mut dyn ShapeTrait {
        match self {
            Shape::Stroke(s) => s,
            Shape::Rectangle(s) => s,
            Shape::Ellipse(s) => s,
            Shape::Arrow(s) => s,
            Shape::Text(s) => s,
            Shape::Image(s) => s,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.as_trait().id()
    }

    pub fn kind(&self) -> DrawableKind {
        self.as_trait().kind()
    }

    pub fn bounds(&self) -> Rect {
        self.as_trait().bounds()
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.as_trait().hit_test(point, tolerance)
    }

    pub fn to_path(&self) -> BezPath {
        self.as_trait().to_path()
    }

    /// Check the geometry and style are well-formed.
    pub fn validate(&self) -> Result<(), String> {
        let style = self.style();
        if !style.stroke_width.is_finite() || style.stroke_width < 0.0 {
            return Err(format!(
                "{} has invalid stroke width {}",
                self.kind().name(),
                style.stroke_width
            ));
        }
        self.as_trait().validate()
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.as_trait_mut().translate(delta);
    }

    pub fn style(&self) -> &ShapeStyle {
        self.as_trait().style()
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        self.as_trait_mut().style_mut()
    }

    pub fn interaction(&self) -> Interaction {
        match self {
            Shape::Stroke(s) => s.interaction,
            Shape::Rectangle(s) => s.interaction,
            Shape::Ellipse(s) => s.interaction,
            Shape::Arrow(s) => s.interaction,
            Shape::Text(s) => s.interaction,
            Shape::Image(s) => s.interaction,
        }
    }

    pub fn set_interaction(&mut self, interaction: Interaction) {
        match self {
            Shape::Stroke(s) => s.interaction = interaction,
            Shape::Rectangle(s) => s.interaction = interaction,
            Shape::Ellipse(s) => s.interaction = interaction,
            Shape::Arrow(s) => s.interaction = interaction,
            Shape::Text(s) => s.interaction = interaction,
            Shape::Image(s) => s.interaction = interaction,
        }
    }

    pub fn selection_style(&self) -> &SelectionStyle {
        match self {
            Shape::Stroke(s) => &s.selection_style,
            Shape::Rectangle(s) => &s.selection_style,
            Shape::Ellipse(s) => &s.selection_style,
            Shape::Arrow(s) => &s.selection_style,
            Shape::Text(s) => &s.selection_style,
            Shape::Image(s) => &s.selection_style,
        }
    }

    pub fn selection_style_mut(&mut self) -> &mut SelectionStyle {
        match self {
            Shape::Stroke(s) => &mut s.selection_style,
            Shape::Rectangle(s) => &mut s.selection_style,
            Shape::Ellipse(s) => &mut s.selection_style,
            Shape::Arrow(s) => &mut s.selection_style,
            Shape::Text(s) => &mut s.selection_style,
            Shape::Image(s) => &mut s.selection_style,
        }
    }

    /// Recolor the drawable: glyph fill for text, stroke for everything else.
    pub fn recolor(&mut self, color: SerializableColor) {
        match self {
            Shape::Text(text) => text.style.fill_color = Some(color),
            other => other.style_mut().stroke_color = color,
        }
    }
}
