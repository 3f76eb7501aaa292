//! Info command - show the page count and page sizes of a PDF.

use std::path::PathBuf;

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::info;

use pdfsnap_core::loader;
use pdfsnap_core::models::config::EngineKind;
use pdfsnap_core::renderer::RENDER_SCALE;
use pdfsnap_core::{LopdfEngine, PathFile, PdfEngine};

use super::{EngineArg, load_config, pdfium_engine};

/// Arguments for the info command.
#[derive(Args)]
pub struct InfoArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// PDF engine (default: from config)
    #[arg(short, long, value_enum)]
    engine: Option<EngineArg>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

#[derive(Debug, Serialize)]
struct DocumentInfo {
    file: String,
    engine: &'static str,
    page_count: u32,
    pages: Vec<PageInfo>,
}

/// Viewport of one page at the render scale, in pixels.
#[derive(Debug, Serialize)]
struct PageInfo {
    number: u32,
    width: u32,
    height: u32,
}

pub async fn run(args: InfoArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let file = PathFile::new(args.input.clone());
    let engine = args.engine.map(EngineKind::from).unwrap_or(config.engine.backend);

    let document = match engine {
        EngineKind::Pdfium => describe(&pdfium_engine(&config)?, &file).await?,
        EngineKind::Lopdf => describe(&LopdfEngine::new(), &file).await?,
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&document)?),
        OutputFormat::Text => print_text(&document),
    }

    Ok(())
}

async fn describe<E: PdfEngine>(engine: &E, file: &PathFile) -> anyhow::Result<DocumentInfo> {
    info!("Inspecting {} with {}", file.path().display(), engine.name());

    let loaded = loader::load_document(engine, file).await?;

    let mut pages = Vec::with_capacity(loaded.page_count as usize);
    for number in 1..=loaded.page_count {
        let page = engine.get_page(&loaded.document, number).await?;
        let (width, height) = engine.viewport(&page, RENDER_SCALE).pixel_size();
        pages.push(PageInfo {
            number,
            width,
            height,
        });
    }

    Ok(DocumentInfo {
        file: file.path().display().to_string(),
        engine: engine.name(),
        page_count: loaded.page_count,
        pages,
    })
}

fn print_text(document: &DocumentInfo) {
    println!("{}", style("PDF DOCUMENT").bold());
    println!("File:   {}", document.file);
    println!("Engine: {}", document.engine);
    println!("Pages:  {}", document.page_count);
    println!();

    for page in &document.pages {
        println!(
            "  {} {}x{}",
            style(format!("Page {}:", page.number)).cyan(),
            page.width,
            page.height
        );
    }
}
