//! PDF page counting using lopdf.
//!
//! Only the page tree is read; text recognition happens remotely.

use std::path::Path;

use docsift_core::{DocError, DocResult};

/// Number of pages in a local PDF file.
pub fn page_count(path: &Path) -> DocResult<usize> {
    let document = lopdf::Document::load(path)
        .map_err(|e| DocError::parse(format!("Failed to open PDF {}: {}", path.display(), e)))?;
    Ok(document.get_pages().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Document, Object, Stream};

    /// Build a blank PDF with `pages` pages.
    fn blank_pdf(pages: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut kids: Vec<Object> = Vec::with_capacity(pages);
        for _ in 0..pages {
            let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            });
            kids.push(page_id.into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    #[test]
    fn test_page_count() {
        let dir = tempfile::tempdir().unwrap();
        for pages in [2, 21] {
            let path = dir.path().join(format!("{}.pdf", pages));
            std::fs::write(&path, blank_pdf(pages)).unwrap();
            assert_eq!(page_count(&path).unwrap(), pages);
        }
    }

    #[test]
    fn test_page_count_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"definitely not a pdf").unwrap();
        let err = page_count(&path).unwrap_err();
        assert_eq!(err.kind(), docsift_core::ErrorKind::Parse);
    }
}
