//! Browser downloads through a temporary `<a download>` link.

use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlAnchorElement};

use pdfsnap_core::DownloadSink;
use pdfsnap_core::error::ExportError;

use crate::bridge;

/// Sink that triggers a browser download.
#[derive(Debug, Clone)]
pub struct AnchorDownload {
    document: Document,
}

impl AnchorDownload {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// Sink for the current window's document.
    pub fn for_window() -> Result<Self, ExportError> {
        web_sys::window()
            .and_then(|window| window.document())
            .map(Self::new)
            .ok_or_else(|| ExportError::Download("no document".into()))
    }
}

impl DownloadSink for AnchorDownload {
    fn save(&self, file_name: &str, data_url: &str) -> Result<(), ExportError> {
        let link = self
            .document
            .create_element("a")
            .map_err(|e| ExportError::Download(bridge::error_message(&e)))?
            .dyn_into::<HtmlAnchorElement>()
            .map_err(|_| ExportError::Download("created element is not a link".into()))?;

        link.set_href(data_url);
        link.set_download(file_name);
        link.click();
        Ok(())
    }
}
