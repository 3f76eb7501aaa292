//! Viewer state machine.
//!
//! Ties the loader, renderer and export together around one decoded
//! document, one current page, one drawable surface and one error state.
//!
//! All operations take `&self` and may overlap on a single thread. Loads
//! and renders are single-flight: a newer request supersedes older ones and
//! only the newest result is applied. No `RefCell` borrow is held across an
//! `.await`.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use pdfsnap_engine::PdfEngine;

use crate::error::{ErrorKind, ErrorState, RenderError, ViewerError};
use crate::export::{self, DownloadSink, PageExport};
use crate::flight::SingleFlight;
use crate::loader::{self, LoadingGuard};
use crate::models::source::SourceFile;
use crate::navigation::{self, PageButton, PageNumber};
use crate::renderer;
use crate::surface::Surface;

/// Result of [`Viewer::select_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The document was decoded and published.
    Loaded { page_count: u32 },
    /// The file is not a PDF.
    Rejected,
    /// Reading or decoding failed.
    Failed(ErrorKind),
    /// A newer selection took over; this result was dropped.
    Superseded,
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The page is on the surface.
    Rendered,
    /// Invalid page or no document; nothing changed.
    Ignored,
    /// Rendering failed; the error state is set.
    Failed,
    /// A newer render took over; this result was dropped.
    Superseded,
}

/// Notifications for the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewerEvent {
    LoadStarted { file_name: String },
    DocumentLoaded { page_count: u32 },
    PageRendered { page: u32, width: u32, height: u32 },
    Exported { file_name: String },
    Error(ErrorState),
}

/// Point-in-time view of the viewer state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewerSnapshot {
    pub file_name: Option<String>,
    pub has_document: bool,
    pub page_count: u32,
    pub current_page: u32,
    pub rendered_page: Option<u32>,
    pub loading: bool,
    pub surface_size: Option<(u32, u32)>,
    pub error: Option<ErrorState>,
}

struct ViewerState<D> {
    document: Option<Rc<D>>,
    file_name: Option<String>,
    page_count: u32,
    current_page: u32,
    rendered_page: Option<u32>,
    error: Option<ErrorState>,
}

impl<D> ViewerState<D> {
    fn empty() -> Self {
        Self {
            document: None,
            file_name: None,
            page_count: 0,
            current_page: PageNumber::FIRST.get(),
            rendered_page: None,
            error: None,
        }
    }
}

type Listener = Box<dyn Fn(&ViewerEvent)>;

/// Single-document PDF page viewer.
pub struct Viewer<E: PdfEngine, S> {
    engine: E,
    surface: RefCell<S>,
    state: RefCell<ViewerState<E::Document>>,
    loading: Cell<bool>,
    loads: SingleFlight,
    renders: SingleFlight,
    listeners: RefCell<Vec<Listener>>,
}

impl<E, S> Viewer<E, S>
where
    E: PdfEngine,
    S: Surface<Frame = E::Frame>,
{
    /// Create a viewer with no document.
    pub fn new(engine: E, surface: S) -> Self {
        Self {
            engine,
            surface: RefCell::new(surface),
            state: RefCell::new(ViewerState::empty()),
            loading: Cell::new(false),
            loads: SingleFlight::new(),
            renders: SingleFlight::new(),
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Borrow the drawable surface.
    pub fn surface(&self) -> Ref<'_, S> {
        self.surface.borrow()
    }

    /// Register a listener for [`ViewerEvent`]s.
    ///
    /// Listeners may read the viewer but must not subscribe from inside a
    /// notification.
    pub fn subscribe(&self, listener: impl Fn(&ViewerEvent) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    pub fn snapshot(&self) -> ViewerSnapshot {
        let state = self.state.borrow();
        let surface = self.surface.borrow();

        ViewerSnapshot {
            file_name: state.file_name.clone(),
            has_document: state.document.is_some(),
            page_count: state.page_count,
            current_page: state.current_page,
            rendered_page: state.rendered_page,
            loading: self.loading.get(),
            surface_size: surface.is_painted().then(|| surface.size()),
            error: state.error.clone(),
        }
    }

    pub fn page_count(&self) -> u32 {
        self.state.borrow().page_count
    }

    pub fn current_page(&self) -> u32 {
        self.state.borrow().current_page
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    pub fn error(&self) -> Option<ErrorState> {
        self.state.borrow().error.clone()
    }

    /// One button per page, the current page selected.
    pub fn page_buttons(&self) -> Vec<PageButton> {
        let state = self.state.borrow();
        navigation::page_buttons(state.page_count, state.current_page)
    }

    /// Load a newly selected file and render its first page.
    ///
    /// A non-PDF file is rejected and clears the current document. A read or
    /// decode failure also clears it, so the view never shows a document
    /// other than the one last selected.
    pub async fn select_file<F: SourceFile + ?Sized>(&self, file: &F) -> LoadOutcome {
        let ticket = self.loads.begin();
        self.renders.begin();

        if let Err(err) = loader::validate_source(file) {
            self.loading.set(false);
            self.reset_document();
            self.report(&err);
            return LoadOutcome::Rejected;
        }

        info!("Loading {}", file.name());
        let result = {
            let _loading = LoadingGuard::raise(&self.loading, &self.loads, ticket);
            self.emit(&ViewerEvent::LoadStarted {
                file_name: file.name().to_string(),
            });

            match loader::read_source(file).await {
                Ok(bytes) => loader::decode_document(&self.engine, bytes)
                    .await
                    .map_err(ViewerError::Decode),
                Err(err) => Err(ViewerError::Read(err)),
            }
        };

        if !self.loads.is_current(ticket) {
            debug!("Discarding superseded load of {}", file.name());
            return LoadOutcome::Superseded;
        }

        let loaded = match result {
            Ok(loaded) => loaded,
            Err(err) => {
                let kind = err.kind();
                self.reset_document();
                self.report(&err);
                return LoadOutcome::Failed(kind);
            }
        };

        let page_count = loaded.page_count;
        {
            let mut state = self.state.borrow_mut();
            state.document = Some(Rc::new(loaded.document));
            state.file_name = Some(file.name().to_string());
            state.page_count = page_count;
            state.current_page = PageNumber::FIRST.get();
            state.rendered_page = None;
            state.error = None;
        }
        self.surface.borrow_mut().clear();

        info!("Loaded {} ({} pages)", file.name(), page_count);
        self.emit(&ViewerEvent::DocumentLoaded { page_count });

        self.render_current().await;
        LoadOutcome::Loaded { page_count }
    }

    /// Show page `number`. Numbers outside `[1, page_count]` are ignored.
    ///
    /// Only the page is re-rendered; the source file is not read again.
    pub async fn go_to_page(&self, number: u32) -> NavigationOutcome {
        let target = {
            let state = self.state.borrow();
            if state.document.is_none() {
                None
            } else {
                PageNumber::new(number, state.page_count)
            }
        };

        let Some(target) = target else {
            debug!("Ignoring navigation to page {}", number);
            return NavigationOutcome::Ignored;
        };

        self.state.borrow_mut().current_page = target.get();
        self.render_current().await
    }

    /// Navigate from the numeric page input.
    pub async fn go_to_page_input(&self, text: &str) -> NavigationOutcome {
        match navigation::parse_page_input(text, self.page_count()) {
            Some(page) => self.go_to_page(page.get()).await,
            None => {
                debug!("Ignoring page input {:?}", text);
                NavigationOutcome::Ignored
            }
        }
    }

    /// Export the rendered page to `sink` as `page_<n>.png`.
    ///
    /// `n` is the page actually on the surface, which can lag
    /// [`current_page`](Self::current_page) after a failed or superseded
    /// render. The file name always matches the exported pixels.
    ///
    /// Returns `Ok(None)` and logs a warning if no page has been rendered.
    pub fn export<D: DownloadSink + ?Sized>(
        &self,
        sink: &D,
    ) -> Result<Option<PageExport>, ViewerError> {
        let Some(page) = self.state.borrow().rendered_page else {
            warn!("No rendered page; cannot export");
            return Ok(None);
        };

        let result = export::export_page(&*self.surface.borrow(), page, sink);
        match result {
            Ok(Some(exported)) => {
                self.emit(&ViewerEvent::Exported {
                    file_name: exported.file_name.clone(),
                });
                Ok(Some(exported))
            }
            Ok(None) => Ok(None),
            Err(err) => {
                let err = ViewerError::Export(err);
                self.report(&err);
                Err(err)
            }
        }
    }

    async fn render_current(&self) -> NavigationOutcome {
        let ticket = self.renders.begin();
        let (document, page) = {
            let state = self.state.borrow();
            (state.document.clone(), state.current_page)
        };
        let Some(document) = document else {
            return NavigationOutcome::Ignored;
        };

        let rendered = renderer::render_page(&self.engine, &document, page).await;

        if !self.renders.is_current(ticket) {
            debug!("Discarding superseded render of page {}", page);
            return NavigationOutcome::Superseded;
        }

        let presented = rendered.map_err(RenderError::from).and_then(|rendered| {
            let mut surface = self.surface.borrow_mut();
            renderer::present(&mut *surface, rendered)?;
            Ok(surface.size())
        });

        match presented {
            Ok((width, height)) => {
                {
                    let mut state = self.state.borrow_mut();
                    state.rendered_page = Some(page);
                    if state
                        .error
                        .as_ref()
                        .is_some_and(|e| e.kind == ErrorKind::Render)
                    {
                        state.error = None;
                    }
                }
                debug!("Rendered page {} at {}x{}", page, width, height);
                self.emit(&ViewerEvent::PageRendered {
                    page,
                    width,
                    height,
                });
                NavigationOutcome::Rendered
            }
            Err(source) => {
                self.report(&ViewerError::Render { page, source });
                NavigationOutcome::Failed
            }
        }
    }

    fn reset_document(&self) {
        *self.state.borrow_mut() = ViewerState::empty();
        self.surface.borrow_mut().clear();
    }

    fn report(&self, err: &ViewerError) {
        match err {
            ViewerError::InvalidFileType { mime_type } => {
                warn!("Rejected file of type {:?}: {}", mime_type, err)
            }
            _ => error!("{}", err),
        }

        let state = ErrorState::from(err);
        self.state.borrow_mut().error = Some(state.clone());
        self.emit(&ViewerEvent::Error(state));
    }

    fn emit(&self, event: &ViewerEvent) {
        for listener in self.listeners.borrow().iter() {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::MemorySink;
    use crate::models::source::InMemoryFile;
    use crate::surface::RasterSurface;
    use pdfsnap_engine::LopdfEngine;
    use pdfsnap_engine::fixtures::{blank_pdf, corrupt_pdf};
    use pretty_assertions::assert_eq;

    fn viewer() -> Viewer<LopdfEngine, RasterSurface> {
        Viewer::new(LopdfEngine::new(), RasterSurface::new())
    }

    fn three_pages() -> InMemoryFile {
        InMemoryFile::pdf(
            "three.pdf",
            blank_pdf(&[(612, 792), (400, 300), (200, 500)]).unwrap(),
        )
    }

    #[test]
    fn test_initial_state() {
        let snapshot = viewer().snapshot();
        assert_eq!(
            snapshot,
            ViewerSnapshot {
                file_name: None,
                has_document: false,
                page_count: 0,
                current_page: 1,
                rendered_page: None,
                loading: false,
                surface_size: None,
                error: None,
            }
        );
    }

    #[tokio::test]
    async fn test_load_renders_first_page() {
        let viewer = viewer();
        let outcome = viewer.select_file(&three_pages()).await;

        assert_eq!(outcome, LoadOutcome::Loaded { page_count: 3 });
        let snapshot = viewer.snapshot();
        assert_eq!(snapshot.page_count, 3);
        assert_eq!(snapshot.current_page, 1);
        assert_eq!(snapshot.rendered_page, Some(1));
        assert_eq!(snapshot.surface_size, Some((612, 792)));
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn test_invalid_navigation_is_noop() {
        let viewer = viewer();
        viewer.select_file(&three_pages()).await;
        viewer.go_to_page(2).await;

        for page in [0, 4, u32::MAX] {
            assert_eq!(viewer.go_to_page(page).await, NavigationOutcome::Ignored);
        }
        assert_eq!(
            viewer.go_to_page_input("banana").await,
            NavigationOutcome::Ignored
        );
        assert_eq!(viewer.current_page(), 2);
        assert_eq!(viewer.snapshot().surface_size, Some((400, 300)));
    }

    #[tokio::test]
    async fn test_navigation_without_document_is_ignored() {
        let viewer = viewer();
        assert_eq!(viewer.go_to_page(1).await, NavigationOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_non_pdf_clears_previous_document() {
        let viewer = viewer();
        viewer.select_file(&three_pages()).await;

        let text = InMemoryFile::new("notes.txt", "text/plain", b"hello".to_vec());
        assert_eq!(viewer.select_file(&text).await, LoadOutcome::Rejected);

        let snapshot = viewer.snapshot();
        assert!(!snapshot.has_document);
        assert_eq!(snapshot.page_count, 0);
        assert_eq!(snapshot.surface_size, None);
        assert_eq!(
            snapshot.error,
            Some(ErrorState {
                kind: ErrorKind::InvalidFileType,
                message: "Please select a valid PDF file".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_successful_load_clears_error() {
        let viewer = viewer();
        viewer
            .select_file(&InMemoryFile::pdf("bad.pdf", corrupt_pdf()))
            .await;
        assert_eq!(viewer.error().map(|e| e.kind), Some(ErrorKind::Decode));

        viewer.select_file(&three_pages()).await;
        assert_eq!(viewer.error(), None);
    }

    #[tokio::test]
    async fn test_events_follow_pipeline() {
        let viewer = viewer();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        viewer.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        viewer.select_file(&three_pages()).await;
        viewer.export(&MemorySink::new()).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![
                ViewerEvent::LoadStarted {
                    file_name: "three.pdf".to_string()
                },
                ViewerEvent::DocumentLoaded { page_count: 3 },
                ViewerEvent::PageRendered {
                    page: 1,
                    width: 612,
                    height: 792
                },
                ViewerEvent::Exported {
                    file_name: "page_1.png".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = ViewerEvent::Error(ErrorState {
            kind: ErrorKind::Decode,
            message: "Error loading PDF: PDF has no pages".to_string(),
        });

        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({
                "type": "error",
                "kind": "decode",
                "message": "Error loading PDF: PDF has no pages",
            })
        );
    }

    #[tokio::test]
    async fn test_page_buttons_track_current_page() {
        let viewer = viewer();
        viewer.select_file(&three_pages()).await;
        viewer.go_to_page(3).await;

        let selected: Vec<u32> = viewer
            .page_buttons()
            .into_iter()
            .filter(|b| b.selected)
            .map(|b| b.number)
            .collect();
        assert_eq!(selected, vec![3]);
        assert_eq!(viewer.page_buttons().len(), 3);
    }
}
