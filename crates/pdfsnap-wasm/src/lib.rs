//! WASM bindings for pdfsnap.
//!
//! `PdfPreview` drives a `<canvas>` through pdf.js: select a file, page
//! through it, download the shown page as `page_<n>.png`. pdf.js itself
//! (`pdfjsLib`) must be loaded by the host page.

mod bridge;
pub mod download;
pub mod engine;
pub mod file;
pub mod surface;

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Function, Promise};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::HtmlCanvasElement;

use pdfsnap_core::{LoadOutcome, Viewer};

pub use download::AnchorDownload;
pub use engine::PdfJsEngine;
pub use file::BrowserFile;
pub use surface::CanvasSurface;

type BrowserViewer = Viewer<PdfJsEngine, CanvasSurface>;

thread_local! {
    static WORKER_SRC: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Configure the pdf.js worker once per page.
///
/// Returns `true` if this call configured it; later calls keep the first
/// source and return `false`.
#[wasm_bindgen(js_name = configureWorker)]
pub fn configure_worker(src: &str) -> Result<bool, JsValue> {
    WORKER_SRC.with(|worker| {
        let mut worker = worker.borrow_mut();
        if worker.is_some() {
            return Ok(false);
        }

        bridge::configure_worker(src)?;
        *worker = Some(src.to_string());
        Ok(true)
    })
}

/// Worker source set by [`configure_worker`], if any.
#[wasm_bindgen(js_name = workerSrc)]
pub fn worker_src() -> Option<String> {
    WORKER_SRC.with(|worker| worker.borrow().clone())
}

/// PDF page preview bound to a canvas element.
#[wasm_bindgen]
pub struct PdfPreview {
    viewer: Rc<BrowserViewer>,
    /// Replaces `window.alert` when set.
    alert: Rc<RefCell<Option<Function>>>,
}

#[wasm_bindgen]
impl PdfPreview {
    /// Bind to the `<canvas>` with id `canvas_id`.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<PdfPreview, JsValue> {
        let canvas = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(canvas_id))
            .ok_or_else(|| JsValue::from_str(&format!("No element with id {:?}", canvas_id)))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str(&format!("Element {:?} is not a canvas", canvas_id)))?;

        Ok(Self::with_canvas(canvas))
    }

    /// Bind to a canvas element directly.
    #[wasm_bindgen(js_name = withCanvas)]
    pub fn with_canvas(canvas: HtmlCanvasElement) -> PdfPreview {
        Self {
            viewer: Rc::new(Viewer::new(PdfJsEngine::new(), CanvasSurface::new(canvas))),
            alert: Rc::new(RefCell::new(None)),
        }
    }

    /// Load a selected file and show its first page.
    ///
    /// A file that is not a PDF is also announced with an alert. Resolves to
    /// the viewer snapshot once the load settles.
    #[wasm_bindgen(js_name = selectFile)]
    pub fn select_file(&self, file: web_sys::File) -> Promise {
        let viewer = Rc::clone(&self.viewer);
        let alert = Rc::clone(&self.alert);
        future_to_promise(async move {
            let outcome = viewer.select_file(&BrowserFile::new(file)).await;
            if matches!(outcome, LoadOutcome::Rejected) {
                if let Some(error) = viewer.error() {
                    show_alert(alert.borrow().as_ref(), &error.message);
                }
            }
            snapshot_value(&viewer)
        })
    }

    /// Route alerts to `callback(message)` instead of `window.alert`.
    #[wasm_bindgen(js_name = onAlert)]
    pub fn on_alert(&self, callback: Function) {
        *self.alert.borrow_mut() = Some(callback);
    }

    /// Show page `number`; out-of-range numbers are ignored.
    #[wasm_bindgen(js_name = goToPage)]
    pub fn go_to_page(&self, number: u32) -> Promise {
        let viewer = Rc::clone(&self.viewer);
        future_to_promise(async move {
            viewer.go_to_page(number).await;
            snapshot_value(&viewer)
        })
    }

    /// Navigate from the numeric page input's text.
    #[wasm_bindgen(js_name = setPageInput)]
    pub fn set_page_input(&self, text: String) -> Promise {
        let viewer = Rc::clone(&self.viewer);
        future_to_promise(async move {
            viewer.go_to_page_input(&text).await;
            snapshot_value(&viewer)
        })
    }

    /// `[{ number, selected }]` for the pagination strip.
    #[wasm_bindgen(js_name = pageButtons)]
    pub fn page_buttons(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.viewer.page_buttons())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Download the shown page as `page_<n>.png`.
    ///
    /// Returns `false` when no page has been rendered yet.
    #[wasm_bindgen(js_name = downloadPage)]
    pub fn download_page(&self) -> Result<bool, JsValue> {
        let sink = AnchorDownload::for_window().map_err(|e| JsValue::from_str(&e.to_string()))?;

        match self.viewer.export(&sink) {
            Ok(Some(_)) => Ok(true),
            Ok(None) => {
                web_sys::console::warn_1(&"No rendered page to download".into());
                Ok(false)
            }
            Err(e) => Err(JsValue::from_str(&e.to_string())),
        }
    }

    /// Call `callback` with every viewer event.
    #[wasm_bindgen(js_name = onEvent)]
    pub fn on_event(&self, callback: Function) {
        self.viewer.subscribe(move |event| {
            match serde_wasm_bindgen::to_value(event) {
                Ok(value) => {
                    if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                        web_sys::console::error_2(&"Event listener failed:".into(), &e);
                    }
                }
                Err(e) => web_sys::console::error_1(&e.to_string().into()),
            }
        });
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        snapshot_value(&self.viewer)
    }

    #[wasm_bindgen(getter, js_name = pageCount)]
    pub fn page_count(&self) -> u32 {
        self.viewer.page_count()
    }

    #[wasm_bindgen(getter, js_name = currentPage)]
    pub fn current_page(&self) -> u32 {
        self.viewer.current_page()
    }

    #[wasm_bindgen(getter)]
    pub fn loading(&self) -> bool {
        self.viewer.is_loading()
    }

    /// Message of the current error, if any.
    #[wasm_bindgen(getter, js_name = errorMessage)]
    pub fn error_message(&self) -> Option<String> {
        self.viewer.error().map(|error| error.message)
    }

    #[wasm_bindgen(getter, js_name = hasDocument)]
    pub fn has_document(&self) -> bool {
        self.viewer.snapshot().has_document
    }
}

fn show_alert(handler: Option<&Function>, message: &str) {
    let shown = match handler {
        Some(handler) => handler
            .call1(&JsValue::NULL, &JsValue::from_str(message))
            .map(|_| ()),
        None => match web_sys::window() {
            Some(window) => window.alert_with_message(message),
            None => Ok(()),
        },
    };

    if let Err(e) = shown {
        web_sys::console::error_2(&"Alert failed:".into(), &e);
    }
}

fn snapshot_value(viewer: &BrowserViewer) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&viewer.snapshot()).map_err(|e| JsValue::from_str(&e.to_string()))
}
