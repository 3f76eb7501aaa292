//! End-to-end viewer scenarios over the lopdf engine.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use pdfsnap_core::error::ReadError;
use pdfsnap_core::export::decode_png_data_url;
use pdfsnap_core::{
    ErrorKind, FileData, InMemoryFile, LoadOutcome, MemorySink, NavigationOutcome, PdfEngine,
    RasterSurface, SourceFile, Surface, Viewer, ViewerEvent, Viewport,
};
use pdfsnap_engine::fixtures::{blank_pdf, corrupt_pdf};
use pdfsnap_engine::{EngineError, LopdfDocument, LopdfEngine, LopdfPage, RgbaFrame};
use pretty_assertions::assert_eq;

/// Lopdf engine with scripted latency and failures.
#[derive(Default)]
struct ScriptedEngine {
    inner: LopdfEngine,
    load_yields: RefCell<VecDeque<usize>>,
    render_yields: RefCell<VecDeque<usize>>,
    fail_renders: Cell<bool>,
}

impl ScriptedEngine {
    fn delay_loads(&self, yields: &[usize]) {
        self.load_yields.borrow_mut().extend(yields);
    }

    fn delay_renders(&self, yields: &[usize]) {
        self.render_yields.borrow_mut().extend(yields);
    }
}

async fn pause(queue: &RefCell<VecDeque<usize>>) {
    let yields = queue.borrow_mut().pop_front().unwrap_or(0);
    for _ in 0..yields {
        tokio::task::yield_now().await;
    }
}

impl PdfEngine for ScriptedEngine {
    type Document = LopdfDocument;
    type Page = LopdfPage;
    type Frame = RgbaFrame;

    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn load_document(&self, bytes: Vec<u8>) -> Result<LopdfDocument, EngineError> {
        pause(&self.load_yields).await;
        self.inner.load_document(bytes).await
    }

    fn page_count(&self, document: &LopdfDocument) -> u32 {
        self.inner.page_count(document)
    }

    async fn get_page(&self, document: &LopdfDocument, number: u32) -> Result<LopdfPage, EngineError> {
        self.inner.get_page(document, number).await
    }

    fn viewport(&self, page: &LopdfPage, scale: f32) -> Viewport {
        self.inner.viewport(page, scale)
    }

    async fn render(&self, page: &LopdfPage, viewport: &Viewport) -> Result<RgbaFrame, EngineError> {
        pause(&self.render_yields).await;
        if self.fail_renders.get() {
            return Err(EngineError::Render("rasterizer crashed".into()));
        }
        self.inner.render(page, viewport).await
    }
}

/// Source file that counts how often it is read.
struct CountingFile {
    inner: InMemoryFile,
    reads: Cell<u32>,
}

impl SourceFile for CountingFile {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn mime_type(&self) -> &str {
        self.inner.mime_type()
    }

    async fn read(&self) -> Result<Option<FileData>, ReadError> {
        self.reads.set(self.reads.get() + 1);
        self.inner.read().await
    }
}

fn viewer() -> Viewer<ScriptedEngine, RasterSurface> {
    Viewer::new(ScriptedEngine::default(), RasterSurface::new())
}

fn pdf(name: &str, sizes: &[(u32, u32)]) -> InMemoryFile {
    InMemoryFile::pdf(name, blank_pdf(sizes).unwrap())
}

#[tokio::test]
async fn test_select_navigate_and_export() {
    let viewer = viewer();
    let file = pdf("report.pdf", &[(612, 792), (300, 200), (150, 250)]);

    assert_eq!(
        viewer.select_file(&file).await,
        LoadOutcome::Loaded { page_count: 3 }
    );
    assert_eq!(viewer.page_buttons().len(), 3);

    assert_eq!(viewer.go_to_page(3).await, NavigationOutcome::Rendered);
    assert_eq!(viewer.current_page(), 3);

    let sink = MemorySink::new();
    let export = viewer.export(&sink).unwrap().unwrap();
    assert_eq!(export.page, 3);
    assert_eq!(sink.file_names(), vec!["page_3.png".to_string()]);

    let png = decode_png_data_url(&export.data_url).unwrap();
    let image = image::load_from_memory(&png).unwrap();
    assert_eq!((image.width(), image.height()), (150, 250));
}

#[tokio::test]
async fn test_page_input_navigation() {
    let viewer = viewer();
    viewer.select_file(&pdf("a.pdf", &[(100, 100); 4])).await;

    assert_eq!(
        viewer.go_to_page_input(" 3rd").await,
        NavigationOutcome::Rendered
    );
    assert_eq!(viewer.current_page(), 3);
    assert_eq!(viewer.go_to_page_input("9").await, NavigationOutcome::Ignored);
    assert_eq!(viewer.go_to_page_input("").await, NavigationOutcome::Ignored);
    assert_eq!(viewer.current_page(), 3);
}

#[tokio::test]
async fn test_text_file_is_rejected() {
    let viewer = viewer();
    let file = InMemoryFile::new("notes.txt", "text/plain", b"not a pdf".to_vec());

    assert_eq!(viewer.select_file(&file).await, LoadOutcome::Rejected);

    let snapshot = viewer.snapshot();
    assert!(!snapshot.has_document);
    assert!(!snapshot.loading);
    let error = snapshot.error.unwrap();
    assert_eq!(error.kind, ErrorKind::InvalidFileType);
    assert_eq!(error.message, "Please select a valid PDF file");
}

#[tokio::test]
async fn test_corrupt_pdf_reports_decode_error() {
    let viewer = viewer();
    let file = InMemoryFile::pdf("broken.pdf", corrupt_pdf());

    assert_eq!(
        viewer.select_file(&file).await,
        LoadOutcome::Failed(ErrorKind::Decode)
    );

    let snapshot = viewer.snapshot();
    assert!(!snapshot.loading);
    assert!(!snapshot.has_document);
    assert_eq!(snapshot.rendered_page, None);
    assert_eq!(snapshot.surface_size, None);
    assert!(
        snapshot
            .error
            .unwrap()
            .message
            .starts_with("Error loading PDF: ")
    );
}

#[tokio::test]
async fn test_empty_read_reports_read_error() {
    let viewer = viewer();
    let file = InMemoryFile::pdf("empty.pdf", Vec::new()).with_data(None);

    assert_eq!(
        viewer.select_file(&file).await,
        LoadOutcome::Failed(ErrorKind::Read)
    );
    assert_eq!(
        viewer.error().unwrap().message,
        "Failed to read the file: no file data"
    );
}

#[tokio::test]
async fn test_failed_load_clears_previous_document() {
    let viewer = viewer();
    viewer.select_file(&pdf("good.pdf", &[(100, 100); 2])).await;

    viewer
        .select_file(&InMemoryFile::pdf("bad.pdf", corrupt_pdf()))
        .await;

    let snapshot = viewer.snapshot();
    assert!(!snapshot.has_document);
    assert_eq!(snapshot.page_count, 0);
    assert_eq!(viewer.export(&MemorySink::new()).unwrap(), None);
}

#[tokio::test]
async fn test_export_before_render_does_nothing() {
    let viewer = viewer();
    let sink = MemorySink::new();

    assert_eq!(viewer.export(&sink).unwrap(), None);
    assert!(sink.downloads().is_empty());
}

#[tokio::test]
async fn test_newest_selection_wins() {
    let viewer = viewer();
    viewer.engine().delay_loads(&[5, 0]);

    let slow = pdf("slow.pdf", &[(100, 100); 3]);
    let fast = pdf("fast.pdf", &[(50, 80)]);

    let (first, second) = tokio::join!(viewer.select_file(&slow), viewer.select_file(&fast));

    assert_eq!(first, LoadOutcome::Superseded);
    assert_eq!(second, LoadOutcome::Loaded { page_count: 1 });

    let snapshot = viewer.snapshot();
    assert_eq!(snapshot.file_name.as_deref(), Some("fast.pdf"));
    assert_eq!(snapshot.page_count, 1);
    assert_eq!(snapshot.surface_size, Some((50, 80)));
    assert!(!snapshot.loading);
}

#[tokio::test]
async fn test_newest_navigation_wins() {
    let viewer = viewer();
    viewer
        .select_file(&pdf("a.pdf", &[(100, 100), (200, 200), (300, 300)]))
        .await;
    viewer.engine().delay_renders(&[5, 0]);

    let (slow, fast) = tokio::join!(viewer.go_to_page(2), viewer.go_to_page(3));

    assert_eq!(slow, NavigationOutcome::Superseded);
    assert_eq!(fast, NavigationOutcome::Rendered);
    assert_eq!(viewer.snapshot().rendered_page, Some(3));
    assert_eq!(viewer.surface().size(), (300, 300));
}

#[tokio::test]
async fn test_new_file_discards_pending_render() {
    let viewer = viewer();
    viewer
        .select_file(&pdf("old.pdf", &[(100, 100), (200, 200)]))
        .await;
    viewer.engine().delay_renders(&[5]);

    let new_file = pdf("new.pdf", &[(40, 60)]);
    let (navigation, load) = tokio::join!(viewer.go_to_page(2), viewer.select_file(&new_file));

    assert_eq!(navigation, NavigationOutcome::Superseded);
    assert_eq!(load, LoadOutcome::Loaded { page_count: 1 });
    assert_eq!(viewer.current_page(), 1);
    assert_eq!(viewer.surface().size(), (40, 60));
}

#[tokio::test]
async fn test_navigation_does_not_reread_file() {
    let viewer = viewer();
    let file = CountingFile {
        inner: pdf("a.pdf", &[(100, 100); 3]),
        reads: Cell::new(0),
    };

    viewer.select_file(&file).await;
    viewer.go_to_page(2).await;
    viewer.go_to_page(3).await;
    viewer.go_to_page(1).await;

    assert_eq!(file.reads.get(), 1);
}

#[tokio::test]
async fn test_render_error_is_reported_and_cleared() {
    let viewer = viewer();
    viewer.select_file(&pdf("a.pdf", &[(100, 100); 2])).await;

    viewer.engine().fail_renders.set(true);
    assert_eq!(viewer.go_to_page(2).await, NavigationOutcome::Failed);

    let error = viewer.error().unwrap();
    assert_eq!(error.kind, ErrorKind::Render);
    assert_eq!(
        error.message,
        "Error rendering page 2: failed to render page: rasterizer crashed"
    );
    // The last good frame is still what gets exported, named after itself.
    assert_eq!(viewer.current_page(), 2);
    let sink = MemorySink::new();
    viewer.export(&sink).unwrap();
    assert_eq!(sink.file_names(), vec!["page_1.png".to_string()]);

    viewer.engine().fail_renders.set(false);
    assert_eq!(viewer.go_to_page(2).await, NavigationOutcome::Rendered);
    assert_eq!(viewer.error(), None);
}

#[tokio::test]
async fn test_oversized_page_is_a_render_error() {
    let viewer = viewer();
    let file = pdf("poster.pdf", &[(u32::MAX, u32::MAX)]);

    assert_eq!(
        viewer.select_file(&file).await,
        LoadOutcome::Loaded { page_count: 1 }
    );

    let error = viewer.error().unwrap();
    assert_eq!(error.kind, ErrorKind::Render);
    assert!(error.message.starts_with("Error rendering page 1:"), "{}", error.message);
    assert!(!viewer.surface().is_painted());
    assert_eq!(viewer.export(&MemorySink::new()).unwrap(), None);
}

#[tokio::test]
async fn test_navigating_to_oversized_page_fails_cleanly() {
    let viewer = viewer();
    viewer
        .select_file(&pdf("mixed.pdf", &[(200, 100), (100_000, 100_000)]))
        .await;

    assert_eq!(viewer.go_to_page(2).await, NavigationOutcome::Failed);
    assert_eq!(viewer.error().map(|e| e.kind), Some(ErrorKind::Render));

    // Page 1 stays on screen and is what gets exported.
    let sink = MemorySink::new();
    viewer.export(&sink).unwrap();
    assert_eq!(sink.file_names(), vec!["page_1.png".to_string()]);

    assert_eq!(viewer.go_to_page(1).await, NavigationOutcome::Rendered);
    assert_eq!(viewer.error(), None);
}

#[tokio::test]
async fn test_loading_flag_is_up_when_load_starts() {
    let viewer = Rc::new(viewer());
    let observed = Rc::new(RefCell::new(Vec::new()));

    let weak = Rc::downgrade(&viewer);
    let record = Rc::clone(&observed);
    viewer.subscribe(move |event| {
        if let (ViewerEvent::LoadStarted { .. }, Some(viewer)) = (event, weak.upgrade()) {
            record.borrow_mut().push(viewer.is_loading());
        }
    });

    viewer.engine().delay_loads(&[3]);
    viewer.select_file(&pdf("a.pdf", &[(100, 100)])).await;

    assert_eq!(*observed.borrow(), vec![true]);
    assert!(!viewer.is_loading());
}
