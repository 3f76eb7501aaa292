//! PDFium backend for native platforms.

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::OnceLock;

use pdfium_render::prelude::*;
use tracing::{debug, info};

use crate::error::EngineError;
use crate::{PageSize, PdfEngine, Result, RgbaFrame, Viewport};

static PDFIUM: OnceLock<Pdfium> = OnceLock::new();

/// Bind the PDFium library once for the whole process.
///
/// Later calls return the already bound instance and ignore `library_dir`.
///
/// Search order when binding:
/// 1. `library_dir`, if given
/// 2. The executable's directory
/// 3. The current working directory
/// 4. System library paths
pub fn init_pdfium(library_dir: Option<&Path>) -> Result<&'static Pdfium> {
    if let Some(pdfium) = PDFIUM.get() {
        return Ok(pdfium);
    }

    let bindings = bind(library_dir)?;
    Ok(PDFIUM.get_or_init(|| {
        info!("PDFium library bound");
        Pdfium::new(bindings)
    }))
}

fn bind(library_dir: Option<&Path>) -> Result<Box<dyn PdfiumLibraryBindings>> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(dir) = library_dir {
        candidates.push(dir.to_path_buf());
    }
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(dir);
    }
    candidates.push(PathBuf::from("./"));

    for dir in &candidates {
        let path = Pdfium::pdfium_platform_library_name_at_path(dir);
        match Pdfium::bind_to_library(&path) {
            Ok(bindings) => {
                debug!("Bound PDFium from {}", path.display());
                return Ok(bindings);
            }
            Err(e) => debug!("PDFium not found at {}: {}", path.display(), e),
        }
    }

    Pdfium::bind_to_system_library().map_err(|e| EngineError::Init(e.to_string()))
}

/// Engine backed by PDFium.
pub struct PdfiumEngine {
    pdfium: &'static Pdfium,
}

/// A document opened by PDFium.
#[derive(Clone)]
pub struct PdfiumDocument {
    inner: Rc<PdfDocument<'static>>,
}

/// A page of a [`PdfiumDocument`].
#[derive(Clone)]
pub struct PdfiumPage {
    document: Rc<PdfDocument<'static>>,
    index: u16,
    size: PageSize,
}

impl PdfiumPage {
    /// Page size in points.
    pub fn size(&self) -> PageSize {
        self.size
    }
}

impl PdfiumEngine {
    /// Create an engine, binding the library on first use.
    pub fn new(library_dir: Option<&Path>) -> Result<Self> {
        Ok(Self {
            pdfium: init_pdfium(library_dir)?,
        })
    }
}

impl PdfEngine for PdfiumEngine {
    type Document = PdfiumDocument;
    type Page = PdfiumPage;
    type Frame = RgbaFrame;

    fn name(&self) -> &'static str {
        "pdfium"
    }

    async fn load_document(&self, bytes: Vec<u8>) -> Result<PdfiumDocument> {
        debug!("Opening PDF with PDFium from {} bytes", bytes.len());

        let document = self
            .pdfium
            .load_pdf_from_byte_vec(bytes, None)
            .map_err(|e| match e {
                PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
                    EngineError::Encrypted
                }
                other => EngineError::Parse(other.to_string()),
            })?;

        if document.pages().len() == 0 {
            return Err(EngineError::NoPages);
        }

        Ok(PdfiumDocument {
            inner: Rc::new(document),
        })
    }

    fn page_count(&self, document: &PdfiumDocument) -> u32 {
        u32::from(document.inner.pages().len())
    }

    async fn get_page(&self, document: &PdfiumDocument, number: u32) -> Result<PdfiumPage> {
        let page_count = self.page_count(document);
        let out_of_range = EngineError::PageOutOfRange {
            page: number,
            page_count,
        };

        let index = match number.checked_sub(1).map(u16::try_from) {
            Some(Ok(index)) if u32::from(index) < page_count => index,
            _ => return Err(out_of_range),
        };

        let page = document
            .inner
            .pages()
            .get(index)
            .map_err(|e| EngineError::Backend(e.to_string()))?;

        Ok(PdfiumPage {
            document: Rc::clone(&document.inner),
            index,
            size: PageSize {
                width_pt: page.width().value,
                height_pt: page.height().value,
            },
        })
    }

    fn viewport(&self, page: &PdfiumPage, scale: f32) -> Viewport {
        Viewport::for_page(page.size, scale)
    }

    async fn render(&self, page: &PdfiumPage, viewport: &Viewport) -> Result<RgbaFrame> {
        let (width, height) = viewport
            .checked_pixel_size()
            .and_then(|(w, h)| Some((i32::try_from(w).ok()?, i32::try_from(h).ok()?)))
            .ok_or_else(|| {
                let (width, height) = viewport.pixel_size();
                EngineError::Render(format!("page too large: {}x{} pixels", width, height))
            })?;

        let pdf_page = page
            .document
            .pages()
            .get(page.index)
            .map_err(|e| EngineError::Render(e.to_string()))?;

        let config = PdfRenderConfig::new()
            .set_target_width(width)
            .set_target_height(height);

        let bitmap = pdf_page
            .render_with_config(&config)
            .map_err(|e| EngineError::Render(e.to_string()))?;

        let frame_width = bitmap.width() as u32;
        let frame_height = bitmap.height() as u32;

        RgbaFrame::from_raw(frame_width, frame_height, bitmap.as_rgba_bytes().to_vec()).ok_or_else(
            || {
                EngineError::Render(format!(
                    "bitmap buffer does not match {}x{}",
                    frame_width, frame_height
                ))
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Passes with or without a PDFium library on the machine.
    #[test]
    fn test_init_is_idempotent() {
        let first = init_pdfium(None);
        let second = init_pdfium(Some(Path::new("/nonexistent")));

        match (first, second) {
            (Ok(first), Ok(second)) => assert!(std::ptr::eq(first, second)),
            (Err(EngineError::Init(_)), Err(EngineError::Init(_))) => {}
            (first, second) => panic!(
                "inconsistent init results: first ok={}, second ok={}",
                first.is_ok(),
                second.is_ok()
            ),
        }
    }
}
