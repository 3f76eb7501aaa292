//! Render command - load a PDF, render one page and export it as PNG.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use pdfsnap_core::models::config::EngineKind;
use pdfsnap_core::{
    DirectorySink, LoadOutcome, LopdfEngine, NavigationOutcome, PathFile, PdfEngine, PdfSnapConfig,
    RasterSurface, RgbaFrame, Surface, Viewer, ViewerEvent,
};

use super::{EngineArg, load_config, pdfium_engine};

/// Arguments for the render command.
#[derive(Args)]
pub struct RenderArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Page to render (1-based)
    #[arg(short, long, default_value_t = 1)]
    page: u32,

    /// Directory for page_<n>.png (default: from config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// PDF engine (default: from config)
    #[arg(short, long, value_enum)]
    engine: Option<EngineArg>,

    /// Refuse to replace an existing page_<n>.png
    #[arg(long)]
    no_overwrite: bool,
}

pub async fn run(args: RenderArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let engine = args.engine.map(EngineKind::from).unwrap_or(config.engine.backend);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );

    let result = match engine {
        EngineKind::Pdfium => render_with(pdfium_engine(&config)?, &args, &config, &pb).await,
        EngineKind::Lopdf => render_with(LopdfEngine::new(), &args, &config, &pb).await,
    };
    pb.finish_and_clear();
    let path = result?;

    println!(
        "{} Page {} written to {}",
        style("✓").green(),
        args.page,
        path.display()
    );
    debug!("Total render time: {:?}", start.elapsed());

    Ok(())
}

async fn render_with<E>(
    engine: E,
    args: &RenderArgs,
    config: &PdfSnapConfig,
    pb: &ProgressBar,
) -> anyhow::Result<PathBuf>
where
    E: PdfEngine<Frame = RgbaFrame>,
{
    let viewer = Viewer::new(engine, RasterSurface::new());

    let progress = pb.clone();
    viewer.subscribe(move |event| match event {
        ViewerEvent::LoadStarted { file_name } => {
            progress.set_message(format!("Loading {}...", file_name))
        }
        ViewerEvent::DocumentLoaded { page_count } => {
            progress.set_message(format!("Rendering ({} pages)...", page_count))
        }
        ViewerEvent::PageRendered { page, .. } => {
            progress.set_message(format!("Rendered page {}", page))
        }
        ViewerEvent::Exported { file_name } => {
            progress.set_message(format!("Saved {}", file_name))
        }
        ViewerEvent::Error(_) => {}
    });

    let file = PathFile::new(args.input.clone());
    let page_count = match viewer.select_file(&file).await {
        LoadOutcome::Loaded { page_count } => page_count,
        _ => anyhow::bail!("{}", error_message(&viewer)),
    };

    if args.page != viewer.current_page() {
        match viewer.go_to_page(args.page).await {
            NavigationOutcome::Rendered => {}
            NavigationOutcome::Ignored => anyhow::bail!(
                "Page {} is out of range (document has {} pages)",
                args.page,
                page_count
            ),
            NavigationOutcome::Failed | NavigationOutcome::Superseded => {
                anyhow::bail!("{}", error_message(&viewer))
            }
        }
    }

    if viewer.snapshot().rendered_page != Some(args.page) {
        anyhow::bail!("{}", error_message(&viewer));
    }

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.export.output_dir.clone());
    let sink = DirectorySink::new(output_dir).overwrite(config.export.overwrite && !args.no_overwrite);

    let export = viewer
        .export(&sink)?
        .ok_or_else(|| anyhow::anyhow!("Nothing was rendered"))?;

    Ok(sink.path_for(&export.file_name))
}

fn error_message<E, S>(viewer: &Viewer<E, S>) -> String
where
    E: PdfEngine,
    S: Surface<Frame = E::Frame>,
{
    viewer
        .error()
        .map(|error| error.message)
        .unwrap_or_else(|| "Page could not be rendered".to_string())
}
