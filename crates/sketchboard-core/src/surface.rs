//! Rendering surface abstraction.
//!
//! The board keeps the authoritative scene; a surface mirrors it for
//! display and hands back pixels for export.

use crate::selection::SelectionStyle;
use crate::shapes::{SerializableColor, Shape, ShapeId};
use crate::tools::SurfaceConfig;
use kurbo::{Point, Rect};
use thiserror::Error;

/// Surface errors.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Region is empty or outside the surface: {0:?}")]
    EmptyRegion(Rect),
    #[error("Rasterization failed: {0}")]
    RasterFailed(String),
}

/// Result type for surface operations.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Straight RGBA8 pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl RasterImage {
    /// A uniformly colored image.
    pub fn filled(width: u32, height: u32, color: SerializableColor) -> Self {
        let pixel = [color.r, color.g, color.b, color.a];
        let rgba = pixel.repeat(width as usize * height as usize);
        Self { width, height, rgba }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.rgba.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    fn put(&mut self, x: u32, y: u32, color: SerializableColor) {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        if let Some(px) = self.rgba.get_mut(i..i + 4) {
            px.copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    /// Nearest-neighbour downscale so the width is at most `max_width`.
    pub fn fit_width(&self, max_width: u32) -> RasterImage {
        if self.width <= max_width || max_width == 0 {
            return self.clone();
        }
        let ratio = max_width as f64 / self.width as f64;
        let height = ((self.height as f64 * ratio).round() as u32).max(1);
        let mut out = RasterImage::filled(max_width, height, SerializableColor::transparent());
        for y in 0..height {
            let sy = ((y as f64 / ratio) as u32).min(self.height - 1);
            for x in 0..max_width {
                let sx = ((x as f64 / ratio) as u32).min(self.width - 1);
                let i = (sy as usize * self.width as usize + sx as usize) * 4;
                let o = (y as usize * max_width as usize + x as usize) * 4;
                out.rgba[o..o + 4].copy_from_slice(&self.rgba[i..i + 4]);
            }
        }
        out
    }
}

/// A display target that mirrors the scene.
pub trait Surface {
    /// Draw a committed drawable on top.
    fn add(&mut self, shape: &Shape);

    /// Remove a drawable. Unknown ids are ignored.
    fn remove(&mut self, id: ShapeId);

    /// Replace a drawable in place (after a move or recolor).
    fn update(&mut self, shape: &Shape) {
        self.remove(shape.id());
        self.add(shape);
    }

    /// Drop every drawable.
    fn clear(&mut self);

    fn set_background(&mut self, color: SerializableColor);

    /// Show or hide the transient drag preview.
    fn set_preview(&mut self, preview: Option<&Shape>);

    /// Apply the brush, selection and cursor settings of a mode.
    fn apply_config(&mut self, config: &SurfaceConfig);

    /// Highlight the selected drawable, if any, using its selection style.
    fn set_selected(&mut self, selected: Option<&Shape>);

    /// Render `region` (surface units) at `scale` pixels per unit.
    fn rasterize(&self, region: Rect, scale: f64) -> SurfaceResult<RasterImage>;
}

/// Pixel dimensions of `region` at `scale`.
pub fn raster_size(region: Rect, scale: f64) -> SurfaceResult<(u32, u32)> {
    let width = (region.width() * scale).round();
    let height = (region.height() * scale).round();
    if !(width >= 1.0 && height >= 1.0) || !width.is_finite() || !height.is_finite() {
        return Err(SurfaceError::EmptyRegion(region));
    }
    Ok((width as u32, height as u32))
}

/// CPU rasterizer over the shape hit tests.
///
/// Strokes, rectangles, ellipses and arrows are painted; text and images
/// need a font or decoder and are left to display surfaces.
#[derive(Debug, Clone)]
pub struct SoftwareSurface {
    shapes: Vec<Shape>,
    background: SerializableColor,
    preview: Option<Shape>,
    selected: Option<(ShapeId, SelectionStyle)>,
    config: Option<SurfaceConfig>,
}

impl SoftwareSurface {
    pub fn new(background: SerializableColor) -> Self {
        Self {
            shapes: Vec::new(),
            background,
            preview: None,
            selected: None,
            config: None,
        }
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn background(&self) -> SerializableColor {
        self.background
    }

    pub fn preview(&self) -> Option<&Shape> {
        self.preview.as_ref()
    }

    pub fn selected(&self) -> Option<ShapeId> {
        self.selected.as_ref().map(|(id, _)| *id)
    }

    /// Decoration of the highlighted drawable.
    pub fn selection_style(&self) -> Option<&SelectionStyle> {
        self.selected.as_ref().map(|(_, style)| style)
    }

    /// Last applied mode settings.
    pub fn config(&self) -> Option<&SurfaceConfig> {
        self.config.as_ref()
    }

    fn paint(&self, image: &mut RasterImage, shape: &Shape, region: Rect, scale: f64) {
        let (stroke, fill, outline) = match shape {
            Shape::Stroke(s) => {
                let color = if s.is_eraser() {
                    self.background
                } else {
                    s.style.stroke_color
                };
                (color, None, shape.clone())
            }
            Shape::Rectangle(_) | Shape::Ellipse(_) | Shape::Arrow(_) => {
                let mut outline = shape.clone();
                outline.style_mut().fill_color = None;
                (shape.style().stroke_color, shape.style().fill_color, outline)
            }
            Shape::Text(_) | Shape::Image(_) => return,
        };

        let bounds = shape.bounds().inflate(shape.style().stroke_width, shape.style().stroke_width);
        for y in 0..image.height {
            for x in 0..image.width {
                let p = Point::new(
                    region.x0 + (x as f64 + 0.5) / scale,
                    region.y0 + (y as f64 + 0.5) / scale,
                );
                if !bounds.contains(p) {
                    continue;
                }
                if outline.hit_test(p, 0.0) {
                    image.put(x, y, stroke);
                } else if let Some(fill) = fill {
                    if shape.hit_test(p, 0.0) {
                        image.put(x, y, fill);
                    }
                }
            }
        }
    }
}

impl Surface for SoftwareSurface {
    fn add(&mut self, shape: &Shape) {
        self.shapes.push(shape.clone());
    }

    fn remove(&mut self, id: ShapeId) {
        self.shapes.retain(|s| s.id() != id);
    }

    fn update(&mut self, shape: &Shape) {
        match self.shapes.iter_mut().find(|s| s.id() == shape.id()) {
            Some(existing) => *existing = shape.clone(),
            None => self.shapes.push(shape.clone()),
        }
    }

    fn clear(&mut self) {
        self.shapes.clear();
        self.selected = None;
    }

    fn set_background(&mut self, color: SerializableColor) {
        self.background = color;
    }

    fn set_preview(&mut self, preview: Option<&Shape>) {
        self.preview = preview.cloned();
    }

    fn apply_config(&mut self, config: &SurfaceConfig) {
        self.config = Some(*config);
    }

    fn set_selected(&mut self, selected: Option<&Shape>) {
        self.selected = selected.map(|shape| (shape.id(), shape.selection_style().clone()));
    }

    fn rasterize(&self, region: Rect, scale: f64) -> SurfaceResult<RasterImage> {
        let (width, height) = raster_size(region, scale)?;
        let mut image = RasterImage::filled(width, height, self.background);
        for shape in &self.shapes {
            self.paint(&mut image, shape, region, scale);
        }
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Rectangle, Stroke};

    fn red() -> SerializableColor {
        SerializableColor::new(255, 0, 0, 255)
    }

    #[test]
    fn test_rasterize_background_only() {
        let surface = SoftwareSurface::new(SerializableColor::white());
        let image = surface.rasterize(Rect::new(0.0, 0.0, 4.0, 3.0), 1.0).unwrap();
        assert_eq!((image.width, image.height), (4, 3));
        assert_eq!(image.pixel(3, 2), Some([255, 255, 255, 255]));
        assert_eq!(image.pixel(4, 0), None);
    }

    #[test]
    fn test_rasterize_scale_doubles_pixels() {
        let surface = SoftwareSurface::new(SerializableColor::white());
        let image = surface.rasterize(Rect::new(10.0, 10.0, 20.0, 15.0), 2.0).unwrap();
        assert_eq!((image.width, image.height), (20, 10));
    }

    #[test]
    fn test_rasterize_rejects_empty_region() {
        let surface = SoftwareSurface::new(SerializableColor::white());
        assert!(matches!(
            surface.rasterize(Rect::new(5.0, 5.0, 5.0, 9.0), 1.0),
            Err(SurfaceError::EmptyRegion(_))
        ));
    }

    #[test]
    fn test_filled_rectangle_paints_fill_and_border() {
        let mut surface = SoftwareSurface::new(SerializableColor::white());
        let mut rect = Rectangle::new(Point::new(2.0, 2.0), 16.0, 16.0);
        rect.style.stroke_color = red();
        rect.style.stroke_width = 2.0;
        rect.style.fill_color = Some(SerializableColor::black());
        surface.add(&Shape::Rectangle(rect));

        let image = surface.rasterize(Rect::new(0.0, 0.0, 20.0, 20.0), 1.0).unwrap();
        assert_eq!(image.pixel(10, 10), Some([0, 0, 0, 255]));
        assert_eq!(image.pixel(2, 10), Some([255, 0, 0, 255]));
        assert_eq!(image.pixel(0, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_eraser_paints_background() {
        let mut surface = SoftwareSurface::new(SerializableColor::white());
        let mut ink = Stroke::from_points(vec![Point::new(0.0, 5.0), Point::new(10.0, 5.0)]);
        ink.style.stroke_width = 4.0;
        let mut eraser = Stroke::eraser(vec![Point::new(5.0, 0.0), Point::new(5.0, 10.0)]);
        eraser.style.stroke_width = 2.0;
        surface.add(&Shape::Stroke(ink));
        surface.add(&Shape::Stroke(eraser));

        let image = surface.rasterize(Rect::new(0.0, 0.0, 10.0, 10.0), 1.0).unwrap();
        assert_eq!(image.pixel(1, 5), Some([0, 0, 0, 255]));
        assert_eq!(image.pixel(5, 5), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_update_keeps_paint_order() {
        let mut surface = SoftwareSurface::new(SerializableColor::white());
        let a = Shape::Rectangle(Rectangle::new(Point::new(0.0, 0.0), 5.0, 5.0));
        let mut b = Shape::Rectangle(Rectangle::new(Point::new(1.0, 1.0), 5.0, 5.0));
        surface.add(&a);
        surface.add(&b);
        b.translate(kurbo::Vec2::new(3.0, 0.0));
        surface.update(&a);
        let ids: Vec<_> = surface.shapes().iter().map(Shape::id).collect();
        assert_eq!(ids, vec![a.id(), b.id()]);
    }

    #[test]
    fn test_fit_width() {
        let image = RasterImage::filled(1600, 400, red());
        let small = image.fit_width(800);
        assert_eq!((small.width, small.height), (800, 200));
        assert_eq!(small.pixel(799, 199), Some([255, 0, 0, 255]));
        assert_eq!(image.fit_width(2000).width, 1600);
    }
}
