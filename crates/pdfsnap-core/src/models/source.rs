//! User-selected source files.

use crate::error::ReadError;

/// Raw result of reading a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileData {
    /// Binary buffer, the only form the loader accepts.
    Binary(Vec<u8>),
    /// Text result, produced by hosts that read files as strings.
    Text(String),
}

/// A file picked by the user.
///
/// The read is async because browser file reads complete on the event loop.
#[allow(async_fn_in_trait)]
pub trait SourceFile {
    /// File name as shown to the user.
    fn name(&self) -> &str;

    /// MIME type reported by the host.
    fn mime_type(&self) -> &str;

    /// Read the whole file. `Ok(None)` means the read produced no data.
    async fn read(&self) -> Result<Option<FileData>, ReadError>;
}

/// A source file held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryFile {
    name: String,
    mime_type: String,
    data: Option<FileData>,
}

impl InMemoryFile {
    /// Binary file with an explicit MIME type.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: Some(FileData::Binary(bytes)),
        }
    }

    /// `application/pdf` file.
    pub fn pdf(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(name, crate::loader::PDF_MIME_TYPE, bytes)
    }

    /// Replace the read result, e.g. to model a host that yields text or nothing.
    pub fn with_data(mut self, data: Option<FileData>) -> Self {
        self.data = data;
        self
    }
}

impl SourceFile for InMemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    async fn read(&self) -> Result<Option<FileData>, ReadError> {
        Ok(self.data.clone())
    }
}

#[cfg(feature = "native")]
pub use native::PathFile;

#[cfg(feature = "native")]
mod native {
    use std::path::{Path, PathBuf};

    use tracing::debug;

    use super::{FileData, SourceFile};
    use crate::error::ReadError;

    /// A file on the local filesystem.
    ///
    /// The MIME type is guessed from the extension, the way a browser file
    /// picker reports it.
    #[derive(Debug, Clone)]
    pub struct PathFile {
        path: PathBuf,
        name: String,
        mime_type: String,
    }

    impl PathFile {
        /// Wrap a path.
        pub fn new(path: impl Into<PathBuf>) -> Self {
            let path = path.into();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let mime_type = mime_guess::from_path(&path)
                .first_or_octet_stream()
                .essence_str()
                .to_string();

            Self {
                path,
                name,
                mime_type,
            }
        }

        /// Override the guessed MIME type.
        pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
            self.mime_type = mime_type.into();
            self
        }

        /// Path of the file.
        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl SourceFile for PathFile {
        fn name(&self) -> &str {
            &self.name
        }

        fn mime_type(&self) -> &str {
            &self.mime_type
        }

        async fn read(&self) -> Result<Option<FileData>, ReadError> {
            debug!("Reading {}", self.path.display());
            let bytes = std::fs::read(&self.path)?;
            Ok(Some(FileData::Binary(bytes)))
        }
    }
}

#[cfg(all(test, feature = "native"))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_path_file_guesses_mime_from_extension() {
        assert_eq!(PathFile::new("/tmp/report.pdf").mime_type(), "application/pdf");
        assert_eq!(PathFile::new("/tmp/notes.txt").mime_type(), "text/plain");
        assert_eq!(PathFile::new("/tmp/report.pdf").name(), "report.pdf");
    }

    #[tokio::test]
    async fn test_path_file_reads_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let data = PathFile::new(&path).read().await.unwrap();
        assert_eq!(data, Some(FileData::Binary(b"%PDF-1.4".to_vec())));
    }

    #[tokio::test]
    async fn test_path_file_missing_is_io_error() {
        let err = PathFile::new("/definitely/not/here.pdf")
            .read()
            .await
            .unwrap_err();
        assert!(matches!(err, ReadError::Io(_)));
    }
}
