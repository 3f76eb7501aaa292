//! Builders for small PDF documents used in tests.

use lopdf::{Dictionary, Document, Object, Stream, dictionary};

use crate::Result;
use crate::error::EngineError;

/// Build a PDF with one empty page per `(width, height)` entry, in points.
pub fn blank_pdf(page_sizes: &[(u32, u32)]) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids = page_sizes
        .iter()
        .map(|&(width, height)| {
            let content_id = doc.add_object(Stream::new(Dictionary::new(), Vec::new()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(i64::from(width)),
                    Object::Integer(i64::from(height)),
                ],
            });
            Object::Reference(page_id)
        })
        .collect::<Vec<_>>();

    let pages = dictionary! {
        "Type" => "Pages",
        "Count" => Object::Integer(kids.len() as i64),
        "Kids" => kids,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| EngineError::Backend(format!("failed to write fixture: {}", e)))?;
    Ok(bytes)
}

/// Bytes that start like a PDF but cannot be decoded.
pub fn corrupt_pdf() -> Vec<u8> {
    b"%PDF-1.7\n1 0 obj << /Type /Catalog /Pages 2 0 R\nthis is not a pdf body\n".to_vec()
}
