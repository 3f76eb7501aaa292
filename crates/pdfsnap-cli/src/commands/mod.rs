//! Subcommands and the helpers they share.

pub mod config;
pub mod info;
pub mod render;

use std::path::{Path, PathBuf};

use anyhow::Context;
use pdfsnap_core::PdfSnapConfig;
use pdfsnap_core::models::config::EngineKind;
use pdfsnap_core::PdfiumEngine;

/// Engine selection on the command line.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum EngineArg {
    /// PDFium rasterizer (needs the PDFium shared library)
    Pdfium,
    /// Pure-Rust page geometry, renders blank pages
    Lopdf,
}

impl From<EngineArg> for EngineKind {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Pdfium => EngineKind::Pdfium,
            EngineArg::Lopdf => EngineKind::Lopdf,
        }
    }
}

/// `<config dir>/pdfsnap/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pdfsnap")
        .join("config.json")
}

/// The `--config` path if given, the default path otherwise.
pub fn config_path(config_path: Option<&str>) -> PathBuf {
    config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path)
}

/// Load configuration, falling back to defaults when no file exists.
///
/// An explicit `--config` path must exist.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<PdfSnapConfig> {
    match config_path {
        Some(path) => PdfSnapConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path)),
        None => {
            let path = default_config_path();
            if path.exists() {
                Ok(PdfSnapConfig::from_file(&path)?)
            } else {
                Ok(PdfSnapConfig::default())
            }
        }
    }
}

/// Bind PDFium, pointing at `--engine lopdf` when the library is missing.
pub fn pdfium_engine(config: &PdfSnapConfig) -> anyhow::Result<PdfiumEngine> {
    PdfiumEngine::new(config.engine.library_dir.as_deref())
        .context("PDFium library not available; set engine.library_dir or use --engine lopdf")
}
