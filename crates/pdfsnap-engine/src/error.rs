//! Error types for the engine layer.

use thiserror::Error;

/// Errors that can occur while decoding or rasterizing a PDF.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine library could not be located or bound.
    #[error("failed to initialize engine: {0}")]
    Init(String),

    /// The bytes are not a valid or supported PDF.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be opened.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Requested page is outside the document.
    #[error("page {page} out of range (page_count={page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },

    /// Page rasterization failed.
    #[error("failed to render page: {0}")]
    Render(String),

    /// Any other backend failure.
    #[error("backend error: {0}")]
    Backend(String),
}
