//! Files picked through an `<input type="file">`.

use js_sys::{ArrayBuffer, Uint8Array};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::File;

use pdfsnap_core::error::ReadError;
use pdfsnap_core::{FileData, SourceFile};

use crate::bridge;

/// A browser `File` as a [`SourceFile`].
#[derive(Debug, Clone)]
pub struct BrowserFile {
    file: File,
    name: String,
    mime_type: String,
}

impl BrowserFile {
    pub fn new(file: File) -> Self {
        Self {
            name: file.name(),
            mime_type: file.type_(),
            file,
        }
    }
}

impl SourceFile for BrowserFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    async fn read(&self) -> Result<Option<FileData>, ReadError> {
        let result = JsFuture::from(self.file.array_buffer())
            .await
            .map_err(|e| ReadError::Host(bridge::error_message(&e)))?;

        if result.is_null() || result.is_undefined() {
            return Ok(None);
        }

        match result.dyn_into::<ArrayBuffer>() {
            Ok(buffer) => Ok(Some(FileData::Binary(Uint8Array::new(&buffer).to_vec()))),
            Err(other) => Ok(other.as_string().map(FileData::Text)),
        }
    }
}
