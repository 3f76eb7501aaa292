//! Page renderer: decoded document + page number → frame → surface.

use tracing::trace;

use pdfsnap_engine::{EngineError, PdfEngine, Viewport};

use crate::error::RenderError;
use crate::surface::Surface;

/// Pages are always rendered at their natural size.
pub const RENDER_SCALE: f32 = 1.0;

/// A rasterized page waiting to be presented.
#[derive(Debug)]
pub struct RenderedPage<F> {
    pub page: u32,
    pub viewport: Viewport,
    pub frame: F,
}

/// Fetch `page`, compute its viewport at [`RENDER_SCALE`] and rasterize it.
///
/// The page number is not validated here; callers pass numbers already
/// bounded by the document's page count.
pub async fn render_page<E: PdfEngine>(
    engine: &E,
    document: &E::Document,
    page: u32,
) -> Result<RenderedPage<E::Frame>, EngineError> {
    let handle = engine.get_page(document, page).await?;
    let viewport = engine.viewport(&handle, RENDER_SCALE);

    trace!(
        "Rendering page {} at {}x{}",
        page, viewport.width, viewport.height
    );
    let frame = engine.render(&handle, &viewport).await?;

    Ok(RenderedPage {
        page,
        viewport,
        frame,
    })
}

/// Present a rendered page, resizing the surface to its viewport.
pub fn present<S: Surface + ?Sized>(
    surface: &mut S,
    rendered: RenderedPage<S::Frame>,
) -> Result<(), RenderError> {
    surface.present(rendered.frame, &rendered.viewport)
}
