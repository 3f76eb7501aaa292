//! PDF engine implementations.

#[cfg(feature = "lopdf")]
pub mod lopdf;

#[cfg(feature = "native")]
pub mod pdfium;

use crate::{Result, Viewport};

/// Trait for PDF decoding/rendering engines.
///
/// This trait abstracts over the library that turns PDF bytes into a
/// document handle and pages into pixels, allowing the same pipeline to run
/// natively (via pdfium or lopdf) and in the browser (via pdf.js).
///
/// Operations are async because the browser engine is; the engines are
/// driven from a single thread, so no `Send` bounds are imposed.
#[allow(async_fn_in_trait)]
pub trait PdfEngine {
    /// Decoded document handle.
    type Document;

    /// Handle to one page of a decoded document.
    type Page;

    /// Rendered page pixels, not yet presented on a surface.
    type Frame;

    /// Short engine name used in logs.
    fn name(&self) -> &'static str;

    /// Decode a PDF from its raw bytes.
    async fn load_document(&self, bytes: Vec<u8>) -> Result<Self::Document>;

    /// Number of pages in a decoded document.
    fn page_count(&self, document: &Self::Document) -> u32;

    /// Fetch a page by 1-based page number.
    async fn get_page(&self, document: &Self::Document, number: u32) -> Result<Self::Page>;

    /// Natural viewport of a page at `scale`.
    fn viewport(&self, page: &Self::Page, scale: f32) -> Viewport;

    /// Rasterize a page at the given viewport.
    async fn render(&self, page: &Self::Page, viewport: &Viewport) -> Result<Self::Frame>;
}
