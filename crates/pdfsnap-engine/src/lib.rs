//! PDF engine abstraction layer for pdfsnap.
//!
//! This crate provides a unified interface over the component that decodes
//! PDF bytes and rasterizes pages:
//! - `pdfium` through `pdfium-render` for native platforms
//! - `lopdf` for a pure-Rust, geometry-only backend (page count and sizes,
//!   blank page frames)
//!
//! The browser binding supplies its own pdf.js backend.

mod backend;
mod error;
mod viewport;

#[cfg(all(feature = "lopdf", any(test, feature = "fixtures")))]
pub mod fixtures;

pub use backend::PdfEngine;
pub use error::EngineError;
pub use viewport::{MAX_SURFACE_PIXELS, MAX_SURFACE_SIDE, PageSize, Viewport};

#[cfg(feature = "lopdf")]
pub use backend::lopdf::{LopdfDocument, LopdfEngine, LopdfPage};

#[cfg(feature = "native")]
pub use backend::pdfium::{PdfiumDocument, PdfiumEngine, PdfiumPage, init_pdfium};

/// RGBA frame produced by the native backends.
pub type RgbaFrame = image::RgbaImage;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
