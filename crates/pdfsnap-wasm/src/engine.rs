//! pdf.js engine for the browser.
//!
//! Pages are rasterized onto a detached canvas which is then drawn onto the
//! visible one, so the visible canvas only ever shows complete pages.

use js_sys::Uint8Array;
use serde::Deserialize;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlCanvasElement;

use pdfsnap_core::{EngineError, PageSize, PdfEngine, Viewport};

use crate::bridge;

/// Engine backed by the page's pdf.js.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfJsEngine;

/// A `PDFDocumentProxy`, destroyed on drop.
#[derive(Debug)]
pub struct PdfJsDocument {
    proxy: JsValue,
    page_count: u32,
}

impl Drop for PdfJsDocument {
    fn drop(&mut self) {
        let _ = bridge::destroy_document(&self.proxy);
    }
}

/// A `PDFPageProxy` with its natural size.
#[derive(Debug, Clone)]
pub struct PdfJsPage {
    proxy: JsValue,
    size: PageSize,
}

#[derive(Deserialize)]
struct JsPageSize {
    width: f32,
    height: f32,
}

impl PdfJsEngine {
    pub fn new() -> Self {
        Self
    }
}

impl PdfEngine for PdfJsEngine {
    type Document = PdfJsDocument;
    type Page = PdfJsPage;
    type Frame = HtmlCanvasElement;

    fn name(&self) -> &'static str {
        "pdf.js"
    }

    async fn load_document(&self, bytes: Vec<u8>) -> Result<PdfJsDocument, EngineError> {
        let data = Uint8Array::from(bytes.as_slice());
        let proxy = bridge::load_document(data).await.map_err(decode_error)?;
        let page_count = bridge::page_count(&proxy);

        Ok(PdfJsDocument { proxy, page_count })
    }

    fn page_count(&self, document: &PdfJsDocument) -> u32 {
        document.page_count
    }

    async fn get_page(&self, document: &PdfJsDocument, number: u32) -> Result<PdfJsPage, EngineError> {
        if number == 0 || number > document.page_count {
            return Err(EngineError::PageOutOfRange {
                page: number,
                page_count: document.page_count,
            });
        }

        let proxy = bridge::get_page(&document.proxy, number)
            .await
            .map_err(|e| EngineError::Backend(bridge::error_message(&e)))?;

        let size = bridge::page_size(&proxy)
            .and_then(|value| serde_wasm_bindgen::from_value::<JsPageSize>(value).map_err(Into::into))
            .map_err(|e| EngineError::Backend(bridge::error_message(&e)))?;

        Ok(PdfJsPage {
            proxy,
            size: PageSize {
                width_pt: size.width,
                height_pt: size.height,
            },
        })
    }

    fn viewport(&self, page: &PdfJsPage, scale: f32) -> Viewport {
        Viewport::for_page(page.size, scale)
    }

    async fn render(&self, page: &PdfJsPage, viewport: &Viewport) -> Result<HtmlCanvasElement, EngineError> {
        let (width, height) = viewport.checked_pixel_size().ok_or_else(|| {
            let (width, height) = viewport.pixel_size();
            EngineError::Render(format!("page too large: {}x{} pixels", width, height))
        })?;
        let frame = detached_canvas()?;
        frame.set_width(width);
        frame.set_height(height);

        bridge::render_page(&page.proxy, &frame, f64::from(viewport.scale))
            .await
            .map_err(|e| EngineError::Render(bridge::error_message(&e)))?;

        Ok(frame)
    }
}

fn decode_error(value: JsValue) -> EngineError {
    let is_password = value
        .dyn_ref::<js_sys::Error>()
        .is_some_and(|e| e.name() == "PasswordException");

    if is_password {
        EngineError::Encrypted
    } else {
        EngineError::Parse(bridge::error_message(&value))
    }
}

fn detached_canvas() -> Result<HtmlCanvasElement, EngineError> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| EngineError::Render("no document to create a canvas in".into()))?
        .create_element("canvas")
        .map_err(|e| EngineError::Render(bridge::error_message(&e)))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| EngineError::Render("created element is not a canvas".into()))
}
