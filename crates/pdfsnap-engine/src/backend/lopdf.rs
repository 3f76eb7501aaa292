//! Pure-Rust lopdf backend.
//!
//! Decodes the page tree and page geometry only. Frames are blank pages of
//! the right size, which is enough for pagination, sizing and export on
//! hosts without a rasterizer library.

use image::Rgba;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace};

use crate::error::EngineError;
use crate::{PageSize, PdfEngine, Result, RgbaFrame, Viewport};

const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);
const EDGE: Rgba<u8> = Rgba([220, 220, 220, 255]);

/// Page tree walks stop after this many `Parent` hops.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Engine backed by lopdf.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfEngine;

/// Geometry of a decoded document.
#[derive(Debug, Clone)]
pub struct LopdfDocument {
    page_sizes: Vec<PageSize>,
}

impl LopdfDocument {
    /// Sizes of all pages, in page order.
    pub fn page_sizes(&self) -> &[PageSize] {
        &self.page_sizes
    }
}

/// A page of a [`LopdfDocument`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LopdfPage {
    /// Page number (1-indexed).
    pub number: u32,
    /// Page size after rotation.
    pub size: PageSize,
}

impl LopdfEngine {
    /// Create a new lopdf engine.
    pub fn new() -> Self {
        Self
    }

    fn parse_sizes(bytes: &[u8]) -> Result<Vec<PageSize>> {
        let doc = Document::load_mem(bytes).map_err(|e| EngineError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            return Err(EngineError::Encrypted);
        }

        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(EngineError::NoPages);
        }

        let sizes = pages
            .values()
            .map(|page_id| page_size(&doc, *page_id))
            .collect::<Vec<_>>();

        debug!("Parsed page tree with {} pages", sizes.len());
        Ok(sizes)
    }
}

impl PdfEngine for LopdfEngine {
    type Document = LopdfDocument;
    type Page = LopdfPage;
    type Frame = RgbaFrame;

    fn name(&self) -> &'static str {
        "lopdf"
    }

    async fn load_document(&self, bytes: Vec<u8>) -> Result<LopdfDocument> {
        let page_sizes = Self::parse_sizes(&bytes)?;
        Ok(LopdfDocument { page_sizes })
    }

    fn page_count(&self, document: &LopdfDocument) -> u32 {
        document.page_sizes.len() as u32
    }

    async fn get_page(&self, document: &LopdfDocument, number: u32) -> Result<LopdfPage> {
        let size = number
            .checked_sub(1)
            .and_then(|index| document.page_sizes.get(index as usize))
            .copied()
            .ok_or(EngineError::PageOutOfRange {
                page: number,
                page_count: self.page_count(document),
            })?;

        Ok(LopdfPage { number, size })
    }

    fn viewport(&self, page: &LopdfPage, scale: f32) -> Viewport {
        Viewport::for_page(page.size, scale)
    }

    async fn render(&self, page: &LopdfPage, viewport: &Viewport) -> Result<RgbaFrame> {
        let (width, height) = viewport.checked_pixel_size().ok_or_else(|| {
            let (width, height) = viewport.pixel_size();
            EngineError::Render(format!("page too large: {}x{} pixels", width, height))
        })?;
        trace!("Rendering blank page {} at {}x{}", page.number, width, height);

        let mut frame = RgbaFrame::from_pixel(width, height, PAPER);

        if width >= 4 && height >= 4 {
            for x in 0..width {
                frame.put_pixel(x, 0, EDGE);
                frame.put_pixel(x, height - 1, EDGE);
            }
            for y in 0..height {
                frame.put_pixel(0, y, EDGE);
                frame.put_pixel(width - 1, y, EDGE);
            }
        }

        Ok(frame)
    }
}

fn page_size(doc: &Document, page_id: ObjectId) -> PageSize {
    let size = inherited(doc, page_id, b"MediaBox")
        .and_then(|object| media_box_size(doc, object))
        .unwrap_or(PageSize::LETTER);

    let rotation = inherited(doc, page_id, b"Rotate")
        .and_then(|object| object.as_i64().ok())
        .unwrap_or(0);

    if rotation.rem_euclid(180) == 90 {
        size.rotated()
    } else {
        size
    }
}

fn media_box_size(doc: &Document, object: &Object) -> Option<PageSize> {
    let array = match object {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_array().ok()?,
        other => other.as_array().ok()?,
    };

    if array.len() != 4 {
        return None;
    }

    let x0 = array[0].as_float().ok()?;
    let y0 = array[1].as_float().ok()?;
    let x1 = array[2].as_float().ok()?;
    let y1 = array[3].as_float().ok()?;

    Some(PageSize {
        width_pt: (x1 - x0).abs(),
        height_pt: (y1 - y0).abs(),
    })
}

/// Look up a page attribute, following `Parent` links for inheritable keys.
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node: &Dictionary = doc.get_dictionary(page_id).ok()?;

    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }

        let parent_id = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent_id).ok()?;
    }

    None
}
