//! Error types for the pdfsnap-core library.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use pdfsnap_engine::EngineError;

/// Main error type for the pdfsnap library.
#[derive(Error, Debug)]
pub enum PdfSnapError {
    /// Load/render/export pipeline error.
    #[error(transparent)]
    Viewer(#[from] ViewerError),

    /// Error from the PDF engine layer.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors surfaced by the preview pipeline.
///
/// Every variant is reported through the viewer's single error state.
#[derive(Error, Debug)]
pub enum ViewerError {
    /// The selected file is not a PDF.
    #[error("Please select a valid PDF file")]
    InvalidFileType { mime_type: String },

    /// The file could not be read into memory.
    #[error("Failed to read the file: {0}")]
    Read(#[from] ReadError),

    /// The bytes are not a valid or supported PDF.
    #[error("Error loading PDF: {0}")]
    Decode(#[source] EngineError),

    /// The page could not be rasterized or presented.
    #[error("Error rendering page {page}: {source}")]
    Render {
        page: u32,
        #[source]
        source: RenderError,
    },

    /// The surface could not be exported.
    #[error("Failed to export page: {0}")]
    Export(#[from] ExportError),
}

impl ViewerError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ViewerError::InvalidFileType { .. } => ErrorKind::InvalidFileType,
            ViewerError::Read(_) => ErrorKind::Read,
            ViewerError::Decode(_) => ErrorKind::Decode,
            ViewerError::Render { .. } => ErrorKind::Render,
            ViewerError::Export(_) => ErrorKind::Export,
        }
    }
}

/// Errors reading a source file.
#[derive(Error, Debug)]
pub enum ReadError {
    /// The underlying read failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The read completed without producing any data.
    #[error("no file data")]
    NoData,

    /// The read produced text instead of a binary buffer.
    #[error("file was not read as a binary buffer")]
    NotBinary,

    /// Host-specific failure (e.g. a browser `FileReader` error).
    #[error("{0}")]
    Host(String),
}

/// Errors rendering a page.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The engine failed to fetch or rasterize the page.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The drawable surface is missing or refused the frame.
    #[error("surface unavailable: {0}")]
    Surface(String),
}

/// Errors exporting the surface.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Nothing has been painted on the surface.
    #[error("surface is empty")]
    EmptySurface,

    /// PNG encoding failed.
    #[error("failed to encode PNG: {0}")]
    Encode(String),

    /// A data URL was not a base64 PNG.
    #[error("invalid PNG data URL: {0}")]
    InvalidDataUrl(String),

    /// The target file exists and overwriting is disabled.
    #[error("refusing to overwrite {}", .0.display())]
    Exists(PathBuf),

    /// The download could not be delivered.
    #[error("download failed: {0}")]
    Download(String),

    /// I/O error writing the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Category of a [`ViewerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidFileType,
    Read,
    Decode,
    Render,
    Export,
}

/// User-visible error state: the category and its message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorState {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ViewerError> for ErrorState {
    fn from(err: &ViewerError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Result type for the pdfsnap library.
pub type Result<T> = std::result::Result<T, PdfSnapError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_invalid_file_type_message() {
        let err = ViewerError::InvalidFileType {
            mime_type: "text/plain".to_string(),
        };
        assert_eq!(err.to_string(), "Please select a valid PDF file");
        assert_eq!(err.kind(), ErrorKind::InvalidFileType);
    }

    #[test]
    fn test_decode_message_includes_cause() {
        let err = ViewerError::Decode(EngineError::Parse("invalid file header".to_string()));
        let state = ErrorState::from(&err);

        assert_eq!(state.kind, ErrorKind::Decode);
        assert_eq!(
            state.message,
            "Error loading PDF: failed to parse PDF: invalid file header"
        );
    }

    #[test]
    fn test_render_message_names_page() {
        let err = ViewerError::Render {
            page: 4,
            source: RenderError::Surface("no 2d context".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Error rendering page 4: surface unavailable: no 2d context"
        );
    }
}
