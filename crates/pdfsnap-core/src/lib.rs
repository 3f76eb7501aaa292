//! Core library for the pdfsnap PDF page previewer.
//!
//! This crate provides:
//! - Document loading (file type check, binary read, decode)
//! - Page rendering onto a drawable surface
//! - Page navigation with single-flight rendering
//! - Export of the rendered page as a `page_<n>.png` data URL

pub mod error;
pub mod export;
pub mod flight;
pub mod loader;
pub mod models;
pub mod navigation;
pub mod renderer;
pub mod surface;
pub mod viewer;

pub use error::{ErrorKind, ErrorState, PdfSnapError, Result, ViewerError};
pub use export::{DownloadSink, MemorySink, PageExport, page_file_name};
#[cfg(feature = "native")]
pub use export::DirectorySink;
pub use models::config::PdfSnapConfig;
pub use models::source::{FileData, InMemoryFile, SourceFile};
#[cfg(feature = "native")]
pub use models::source::PathFile;
pub use navigation::{PageButton, PageNumber};
pub use surface::{RasterSurface, Surface};
pub use viewer::{LoadOutcome, NavigationOutcome, Viewer, ViewerEvent, ViewerSnapshot};

/// Re-export engine types.
pub use pdfsnap_engine::{EngineError, PageSize, PdfEngine, RgbaFrame, Viewport};

#[cfg(feature = "native")]
pub use pdfsnap_engine::{LopdfEngine, PdfiumEngine, init_pdfium};
