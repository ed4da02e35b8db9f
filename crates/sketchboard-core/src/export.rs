//! PNG export of surface regions.

use crate::surface::{RasterImage, Surface, SurfaceError};
use kurbo::Rect;
use thiserror::Error;

/// Scale of the full-surface "save image" export.
pub const SAVE_IMAGE_SCALE: f64 = 2.0;

/// Largest width sent for text recognition.
pub const RECOGNITION_MAX_WIDTH: u32 = 800;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to rasterize surface: {0}")]
    Surface(#[from] SurfaceError),
    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] png::EncodingError),
}

/// Render `region` at 1:1 and encode it as PNG.
pub fn crop_and_encode<R: Surface + ?Sized>(surface: &R, region: Rect) -> Result<Vec<u8>, ExportError> {
    let image = surface.rasterize(region, 1.0)?;
    encode_png(&image)
}

/// Render the whole surface at double resolution.
pub fn save_image<R: Surface + ?Sized>(surface: &R, surface_rect: Rect) -> Result<Vec<u8>, ExportError> {
    let image = surface.rasterize(surface_rect, SAVE_IMAGE_SCALE)?;
    encode_png(&image)
}

/// Render `region`, shrunk to at most [`RECOGNITION_MAX_WIDTH`] pixels wide.
pub fn recognition_image<R: Surface + ?Sized>(surface: &R, region: Rect) -> Result<Vec<u8>, ExportError> {
    let image = surface.rasterize(region, 1.0)?;
    encode_png(&image.fit_width(RECOGNITION_MAX_WIDTH))
}

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(image: &RasterImage) -> Result<Vec<u8>, ExportError> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, image.width, image.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&image.rgba)?;
    }
    log::debug!(
        "Encoded {}x{} PNG ({} bytes)",
        image.width,
        image.height,
        png_data.len()
    );
    Ok(png_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Rectangle, SerializableColor, Shape};
    use crate::surface::SoftwareSurface;
    use kurbo::Point;

    fn decode(bytes: &[u8]) -> (png::OutputInfo, Vec<u8>) {
        let decoder = png::Decoder::new(bytes);
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        buf.truncate(info.buffer_size());
        (info, buf)
    }

    #[test]
    fn test_crop_and_encode_dimensions() {
        let mut surface = SoftwareSurface::new(SerializableColor::white());
        surface.add(&Shape::Rectangle(Rectangle::new(Point::new(10.0, 10.0), 30.0, 20.0)));
        let bytes = crop_and_encode(&surface, Rect::new(0.0, 0.0, 50.0, 40.0)).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");

        let (info, pixels) = decode(&bytes);
        assert_eq!((info.width, info.height), (50, 40));
        assert_eq!(&pixels[0..4], &[255, 255, 255, 255]);
    }

    #[test]
    fn test_save_image_is_double_size() {
        let surface = SoftwareSurface::new(SerializableColor::white());
        let bytes = save_image(&surface, Rect::new(0.0, 0.0, 30.0, 20.0)).unwrap();
        let (info, _) = decode(&bytes);
        assert_eq!((info.width, info.height), (60, 40));
    }

    #[test]
    fn test_recognition_image_is_width_capped() {
        let surface = SoftwareSurface::new(SerializableColor::white());
        let bytes = recognition_image(&surface, Rect::new(0.0, 0.0, 1000.0, 100.0)).unwrap();
        let (info, _) = decode(&bytes);
        assert_eq!((info.width, info.height), (800, 80));
    }

    #[test]
    fn test_empty_region_fails() {
        let surface = SoftwareSurface::new(SerializableColor::white());
        let result = crop_and_encode(&surface, Rect::new(0.0, 0.0, 0.0, 10.0));
        assert!(matches!(result, Err(ExportError::Surface(SurfaceError::EmptyRegion(_)))));
    }
}
