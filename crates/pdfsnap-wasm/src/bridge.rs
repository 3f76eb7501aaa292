//! JavaScript bindings for pdf.js.

use js_sys::Uint8Array;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

#[wasm_bindgen(module = "/js/pdfjs_bridge.js")]
extern "C" {
    /// Point pdf.js at its worker script.
    #[wasm_bindgen(js_name = configureWorker, catch)]
    pub fn configure_worker(src: &str) -> Result<(), JsValue>;

    /// Resolves to a `PDFDocumentProxy`.
    #[wasm_bindgen(js_name = loadDocument, catch)]
    pub async fn load_document(data: Uint8Array) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_name = pageCount)]
    pub fn page_count(document: &JsValue) -> u32;

    #[wasm_bindgen(js_name = destroyDocument, catch)]
    pub fn destroy_document(document: &JsValue) -> Result<(), JsValue>;

    /// Resolves to a `PDFPageProxy` for a 1-based page number.
    #[wasm_bindgen(js_name = getPage, catch)]
    pub async fn get_page(document: &JsValue, number: u32) -> Result<JsValue, JsValue>;

    /// `{ width, height }` of the page at scale 1, rotation applied.
    #[wasm_bindgen(js_name = pageSize, catch)]
    pub fn page_size(page: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_name = renderPage, catch)]
    pub async fn render_page(
        page: &JsValue,
        canvas: &HtmlCanvasElement,
        scale: f64,
    ) -> Result<JsValue, JsValue>;
}

/// Best-effort text of a thrown JavaScript value.
pub fn error_message(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
