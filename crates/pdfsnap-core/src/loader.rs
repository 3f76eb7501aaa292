//! Document loader: source file → binary buffer → decoded document.

use std::cell::Cell;

use tracing::{debug, trace};

use pdfsnap_engine::{EngineError, PdfEngine};

use crate::error::{ReadError, ViewerError};
use crate::flight::{SingleFlight, Ticket};
use crate::models::source::{FileData, SourceFile};

/// The only MIME type the loader accepts.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// A decoded document together with its page count.
#[derive(Debug)]
pub struct LoadedDocument<D> {
    pub document: D,
    pub page_count: u32,
}

/// Reject files whose MIME type is not `application/pdf`.
///
/// Parameters such as `; charset=binary` are ignored and the comparison is
/// case-insensitive.
pub fn validate_source<F: SourceFile + ?Sized>(file: &F) -> Result<(), ViewerError> {
    let mime_type = file.mime_type();
    let essence = mime_type.split(';').next().unwrap_or_default().trim();

    if essence.eq_ignore_ascii_case(PDF_MIME_TYPE) {
        Ok(())
    } else {
        Err(ViewerError::InvalidFileType {
            mime_type: mime_type.to_string(),
        })
    }
}

/// Read the whole file as a binary buffer.
pub async fn read_source<F: SourceFile + ?Sized>(file: &F) -> Result<Vec<u8>, ReadError> {
    match file.read().await? {
        Some(FileData::Binary(bytes)) => {
            trace!("Read {} bytes from {}", bytes.len(), file.name());
            Ok(bytes)
        }
        Some(FileData::Text(_)) => Err(ReadError::NotBinary),
        None => Err(ReadError::NoData),
    }
}

/// Decode a binary buffer with `engine`.
pub async fn decode_document<E: PdfEngine>(
    engine: &E,
    bytes: Vec<u8>,
) -> Result<LoadedDocument<E::Document>, EngineError> {
    let size = bytes.len();
    let document = engine.load_document(bytes).await?;

    let page_count = engine.page_count(&document);
    if page_count == 0 {
        return Err(EngineError::NoPages);
    }

    debug!(
        "Decoded {} bytes with {}: {} pages",
        size,
        engine.name(),
        page_count
    );
    Ok(LoadedDocument {
        document,
        page_count,
    })
}

/// Validate, read and decode a source file in one step.
pub async fn load_document<E, F>(
    engine: &E,
    file: &F,
) -> Result<LoadedDocument<E::Document>, ViewerError>
where
    E: PdfEngine,
    F: SourceFile + ?Sized,
{
    validate_source(file)?;
    let bytes = read_source(file).await?;
    decode_document(engine, bytes)
        .await
        .map_err(ViewerError::Decode)
}

/// Keeps the loading flag raised for one load request.
///
/// The flag is lowered on drop, on every exit path, unless a newer request
/// has taken over in the meantime.
pub(crate) struct LoadingGuard<'a> {
    flag: &'a Cell<bool>,
    flights: &'a SingleFlight,
    ticket: Ticket,
}

impl<'a> LoadingGuard<'a> {
    pub(crate) fn raise(flag: &'a Cell<bool>, flights: &'a SingleFlight, ticket: Ticket) -> Self {
        flag.set(true);
        Self {
            flag,
            flights,
            ticket,
        }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.flights.is_current(self.ticket) {
            self.flag.set(false);
        }
    }
}
