//! The visible `<canvas>`.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use pdfsnap_core::error::{ExportError, RenderError};
use pdfsnap_core::{Surface, Viewport};

use crate::bridge;

/// Surface backed by an on-page canvas element.
#[derive(Debug, Clone)]
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    painted: bool,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self {
            canvas,
            painted: false,
        }
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn context(&self) -> Result<CanvasRenderingContext2d, RenderError> {
        self.canvas
            .get_context("2d")
            .map_err(|e| RenderError::Surface(bridge::error_message(&e)))?
            .ok_or_else(|| RenderError::Surface("2d context unavailable".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RenderError::Surface("unexpected context type".into()))
    }
}

impl Surface for CanvasSurface {
    type Frame = HtmlCanvasElement;

    fn present(&mut self, frame: HtmlCanvasElement, viewport: &Viewport) -> Result<(), RenderError> {
        let context = self.context()?;
        let (width, height) = viewport.pixel_size();

        // Resizing a canvas also wipes it.
        self.canvas.set_width(width);
        self.canvas.set_height(height);

        context
            .draw_image_with_html_canvas_element(&frame, 0.0, 0.0)
            .map_err(|e| RenderError::Surface(bridge::error_message(&e)))?;

        self.painted = true;
        Ok(())
    }

    fn clear(&mut self) {
        if let Ok(context) = self.context() {
            context.clear_rect(
                0.0,
                0.0,
                f64::from(self.canvas.width()),
                f64::from(self.canvas.height()),
            );
        }
        self.painted = false;
    }

    fn is_painted(&self) -> bool {
        self.painted
    }

    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn to_png_data_url(&self) -> Result<String, ExportError> {
        if !self.painted {
            return Err(ExportError::EmptySurface);
        }

        self.canvas
            .to_data_url_with_type("image/png")
            .map_err(|e| ExportError::Encode(bridge::error_message(&e)))
    }
}
