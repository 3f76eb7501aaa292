//! Page export: surface → PNG data URL → download named `page_<n>.png`.

use std::cell::RefCell;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::ExportError;
use crate::surface::Surface;

/// Prefix of every exported data URL.
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// File name used when saving page `page`.
pub fn page_file_name(page: u32) -> String {
    format!("page_{}.png", page)
}

/// A completed export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageExport {
    /// Page that was exported.
    pub page: u32,
    /// Suggested file name, `page_<n>.png`.
    pub file_name: String,
    /// `data:image/png;base64,` URL of the surface contents.
    pub data_url: String,
}

/// Destination for exported pages, standing in for the browser's
/// download mechanism.
pub trait DownloadSink {
    /// Save `data_url` under `file_name`.
    fn save(&self, file_name: &str, data_url: &str) -> Result<(), ExportError>;
}

/// Serialize the surface and hand it to `sink` as `page_<page>.png`.
///
/// Returns `Ok(None)` without touching the sink when nothing has been
/// painted yet.
pub fn export_page<S, D>(surface: &S, page: u32, sink: &D) -> Result<Option<PageExport>, ExportError>
where
    S: Surface + ?Sized,
    D: DownloadSink + ?Sized,
{
    if !surface.is_painted() {
        warn!("Surface has not been painted; nothing to export");
        return Ok(None);
    }

    let data_url = surface.to_png_data_url()?;
    let file_name = page_file_name(page);
    sink.save(&file_name, &data_url)?;

    info!("Exported page {} as {}", page, file_name);
    Ok(Some(PageExport {
        page,
        file_name,
        data_url,
    }))
}

/// Decode a `data:image/png;base64,` URL back into PNG bytes.
pub fn decode_png_data_url(data_url: &str) -> Result<Vec<u8>, ExportError> {
    let payload = data_url
        .strip_prefix(PNG_DATA_URL_PREFIX)
        .ok_or_else(|| ExportError::InvalidDataUrl("missing image/png base64 prefix".into()))?;

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| ExportError::InvalidDataUrl(e.to_string()))?;

    if !bytes.starts_with(&PNG_SIGNATURE) {
        return Err(ExportError::InvalidDataUrl("payload is not a PNG".into()));
    }

    Ok(bytes)
}

/// Sink that records downloads in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    downloads: RefCell<Vec<(String, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(file_name, data_url)` pairs in save order.
    pub fn downloads(&self) -> Vec<(String, String)> {
        self.downloads.borrow().clone()
    }

    /// File names in save order.
    pub fn file_names(&self) -> Vec<String> {
        self.downloads
            .borrow()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl DownloadSink for MemorySink {
    fn save(&self, file_name: &str, data_url: &str) -> Result<(), ExportError> {
        self.downloads
            .borrow_mut()
            .push((file_name.to_string(), data_url.to_string()));
        Ok(())
    }
}

#[cfg(feature = "native")]
pub use native::DirectorySink;

#[cfg(feature = "native")]
mod native {
    use std::fs;
    use std::path::{Path, PathBuf};

    use tracing::debug;

    use super::{DownloadSink, decode_png_data_url};
    use crate::error::ExportError;

    /// Sink that writes PNG files into a directory.
    #[derive(Debug, Clone)]
    pub struct DirectorySink {
        dir: PathBuf,
        overwrite: bool,
    }

    impl DirectorySink {
        /// Write into `dir`, replacing existing files.
        pub fn new(dir: impl Into<PathBuf>) -> Self {
            Self {
                dir: dir.into(),
                overwrite: true,
            }
        }

        /// Whether an existing file may be replaced.
        pub fn overwrite(mut self, overwrite: bool) -> Self {
            self.overwrite = overwrite;
            self
        }

        /// Target directory.
        pub fn dir(&self) -> &Path {
            &self.dir
        }

        /// Path a download named `file_name` is written to.
        pub fn path_for(&self, file_name: &str) -> PathBuf {
            self.dir.join(file_name)
        }
    }

    impl DownloadSink for DirectorySink {
        fn save(&self, file_name: &str, data_url: &str) -> Result<(), ExportError> {
            let png = decode_png_data_url(data_url)?;
            let path = self.path_for(file_name);

            if !self.overwrite && path.exists() {
                return Err(ExportError::Exists(path));
            }

            fs::create_dir_all(&self.dir)?;
            fs::write(&path, &png)?;
            debug!("Wrote {} bytes to {}", png.len(), path.display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RasterSurface;
    use image::RgbaImage;
    use pdfsnap_engine::{PageSize, Viewport};
    use pretty_assertions::assert_eq;

    fn painted_surface(width: u32, height: u32) -> RasterSurface {
        let mut surface = RasterSurface::new();
        let viewport = Viewport::for_page(
            PageSize {
                width_pt: width as f32,
                height_pt: height as f32,
            },
            1.0,
        );
        surface
            .present(RgbaImage::new(width, height), &viewport)
            .unwrap();
        surface
    }

    #[test]
    fn test_page_file_name() {
        assert_eq!(page_file_name(1), "page_1.png");
        assert_eq!(page_file_name(12), "page_12.png");
    }

    #[test]
    fn test_export_unpainted_surface_is_noop() {
        let sink = MemorySink::new();
        let result = export_page(&RasterSurface::new(), 1, &sink).unwrap();

        assert_eq!(result, None);
        assert!(sink.downloads().is_empty());
    }

    #[test]
    fn test_export_saves_named_png() {
        let sink = MemorySink::new();
        let export = export_page(&painted_surface(8, 6), 3, &sink)
            .unwrap()
            .unwrap();

        assert_eq!(export.file_name, "page_3.png");
        assert!(export.data_url.starts_with(PNG_DATA_URL_PREFIX));
        assert_eq!(sink.file_names(), vec!["page_3.png".to_string()]);
        assert!(decode_png_data_url(&export.data_url).is_ok());
    }

    #[test]
    fn test_decode_rejects_non_png_urls() {
        assert!(decode_png_data_url("data:image/jpeg;base64,AAAA").is_err());
        assert!(decode_png_data_url("data:image/png;base64,!!!").is_err());
        // Valid base64, wrong magic bytes.
        assert!(decode_png_data_url("data:image/png;base64,aGVsbG8=").is_err());
    }

    #[cfg(feature = "native")]
    #[test]
    fn test_directory_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("out"));

        let export = export_page(&painted_surface(5, 7), 2, &sink)
            .unwrap()
            .unwrap();

        let written = std::fs::read(sink.path_for(&export.file_name)).unwrap();
        let decoded = image::load_from_memory(&written).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (5, 7));
    }

    #[cfg(feature = "native")]
    #[test]
    fn test_directory_sink_respects_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page_1.png"), b"old").unwrap();
        let sink = DirectorySink::new(dir.path()).overwrite(false);

        let err = export_page(&painted_surface(2, 2), 1, &sink).unwrap_err();
        assert!(matches!(err, ExportError::Exists(_)));
        assert_eq!(std::fs::read(dir.path().join("page_1.png")).unwrap(), b"old");
    }
}
