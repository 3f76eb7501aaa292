//! Drawable surfaces.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, Rgba, RgbaImage};

use pdfsnap_engine::Viewport;

use crate::error::{ExportError, RenderError};
use crate::export::PNG_DATA_URL_PREFIX;

/// Raster target that receives rendered frames and is read back at export.
pub trait Surface {
    /// Frame type this surface can present.
    type Frame;

    /// Resize to the viewport, discarding prior contents, and paint `frame`.
    fn present(&mut self, frame: Self::Frame, viewport: &Viewport) -> Result<(), RenderError>;

    /// Discard contents; the surface is unpainted afterwards.
    fn clear(&mut self);

    /// Whether a frame has been presented since the last clear.
    fn is_painted(&self) -> bool;

    /// Current size in pixels.
    fn size(&self) -> (u32, u32);

    /// Encode the current contents as a `data:image/png;base64,` URL.
    fn to_png_data_url(&self) -> Result<String, ExportError>;
}

/// In-memory RGBA surface.
#[derive(Debug, Clone, Default)]
pub struct RasterSurface {
    pixels: Option<RgbaImage>,
}

impl RasterSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Painted pixels, if any.
    pub fn pixels(&self) -> Option<&RgbaImage> {
        self.pixels.as_ref()
    }

    /// Encode the current contents as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>, ExportError> {
        let pixels = self.pixels.as_ref().ok_or(ExportError::EmptySurface)?;

        let mut png = Vec::new();
        pixels
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| ExportError::Encode(e.to_string()))?;
        Ok(png)
    }
}

impl Surface for RasterSurface {
    type Frame = RgbaImage;

    fn present(&mut self, frame: RgbaImage, viewport: &Viewport) -> Result<(), RenderError> {
        let (width, height) = viewport.checked_pixel_size().ok_or_else(|| {
            let (width, height) = viewport.pixel_size();
            RenderError::Surface(format!("surface too large: {}x{} pixels", width, height))
        })?;

        let pixels = if frame.dimensions() == (width, height) {
            frame
        } else {
            let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
            image::imageops::replace(&mut canvas, &frame, 0, 0);
            canvas
        };

        self.pixels = Some(pixels);
        Ok(())
    }

    fn clear(&mut self) {
        self.pixels = None;
    }

    fn is_painted(&self) -> bool {
        self.pixels.is_some()
    }

    fn size(&self) -> (u32, u32) {
        self.pixels
            .as_ref()
            .map(RgbaImage::dimensions)
            .unwrap_or((0, 0))
    }

    fn to_png_data_url(&self) -> Result<String, ExportError> {
        let png = self.to_png()?;
        Ok(format!("{}{}", PNG_DATA_URL_PREFIX, STANDARD.encode(png)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfsnap_engine::PageSize;
    use pretty_assertions::assert_eq;

    fn viewport(width: u32, height: u32) -> Viewport {
        Viewport::for_page(
            PageSize {
                width_pt: width as f32,
                height_pt: height as f32,
            },
            1.0,
        )
    }

    #[test]
    fn test_new_surface_is_unpainted() {
        let surface = RasterSurface::new();
        assert!(!surface.is_painted());
        assert_eq!(surface.size(), (0, 0));
        assert!(matches!(
            surface.to_png_data_url(),
            Err(ExportError::EmptySurface)
        ));
    }

    #[test]
    fn test_present_resizes_to_viewport() {
        let mut surface = RasterSurface::new();
        surface
            .present(RgbaImage::new(10, 20), &viewport(10, 20))
            .unwrap();
        assert_eq!(surface.size(), (10, 20));

        // A smaller frame still yields a viewport-sized surface.
        surface
            .present(RgbaImage::new(5, 5), &viewport(30, 40))
            .unwrap();
        assert_eq!(surface.size(), (30, 40));
    }

    #[test]
    fn test_present_refuses_oversized_viewport() {
        let mut surface = RasterSurface::new();
        surface.present(RgbaImage::new(2, 2), &viewport(2, 2)).unwrap();

        let err = surface
            .present(RgbaImage::new(1, 1), &viewport(100_000, 100_000))
            .unwrap_err();

        assert!(matches!(err, RenderError::Surface(_)));
        // The previous contents stay on screen.
        assert_eq!(surface.size(), (2, 2));
    }

    #[test]
    fn test_data_url_is_png() {
        let mut surface = RasterSurface::new();
        let frame = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        surface.present(frame, &viewport(4, 4)).unwrap();

        let url = surface.to_png_data_url().unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        let png = STANDARD.decode(&url[PNG_DATA_URL_PREFIX.len()..]).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (4, 4));
        assert_eq!(*decoded.get_pixel(2, 2), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_clear_discards_contents() {
        let mut surface = RasterSurface::new();
        surface.present(RgbaImage::new(2, 2), &viewport(2, 2)).unwrap();
        surface.clear();
        assert!(!surface.is_painted());
    }
}
