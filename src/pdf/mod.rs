// src/pdf/mod.rs
//
// PDF collaborator: opens a filing, reads its bookmark tree into the flat
// entry list the selector consumes, and assembles a new document from the
// selected page ranges. All object-level work goes through lopdf.

pub mod outline;
pub mod slice;

pub use outline::read_outline;
pub use slice::extract_ranges;

use crate::utils::error::PdfError;
use lopdf::Document;
use std::path::Path;

/// Loads a filing PDF from disk.
pub fn load_filing(path: &Path) -> Result<Document, PdfError> {
    Document::load(path).map_err(|e| PdfError::Parse(e.to_string()))
}

/// Total page count of a loaded document.
pub fn page_count(doc: &Document) -> u32 {
    doc.get_pages().len() as u32
}

// --- Test fixtures ---
#[cfg(test)]
pub(crate) mod fixtures {
    use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};

    /// Builds an in-memory PDF with `num_pages` pages and the given outline,
    /// specified as a flat pre-order list of (level, title, 1-based page).
    /// Sibling/child links are derived from the level sequence; every entry
    /// gets an explicit `[page /Fit]` destination.
    pub fn create_filing_pdf(num_pages: u32, outline: &[(u32, &str, u32)]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut page_ids: Vec<ObjectId> = Vec::new();
        for page_num in 0..num_pages {
            let content = format!("BT /F1 12 Tf 50 700 Td (Page-{}) Tj ET", page_num + 1);
            let content_id =
                doc.add_object(Object::Stream(Stream::new(Dictionary::new(), content.into_bytes())));

            let mut page_dict = Dictionary::new();
            page_dict.set("Type", Object::Name(b"Page".to_vec()));
            page_dict.set("Parent", Object::Reference(pages_id));
            page_dict.set("Contents", Object::Reference(content_id));
            page_dict.set(
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            );
            page_ids.push(doc.add_object(Object::Dictionary(page_dict)));
        }

        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
        pages_dict.set("Count", Object::Integer(num_pages as i64));
        pages_dict.set(
            "Kids",
            Object::Array(page_ids.iter().map(|&id| Object::Reference(id)).collect()),
        );
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let mut catalog_dict = Dictionary::new();
        catalog_dict.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog_dict.set("Pages", Object::Reference(pages_id));

        if !outline.is_empty() {
            let outlines_id = doc.new_object_id();
            let item_ids: Vec<ObjectId> = outline.iter().map(|_| doc.new_object_id()).collect();

            for (i, &(level, title, page)) in outline.iter().enumerate() {
                let mut item = Dictionary::new();
                item.set(
                    "Title",
                    Object::String(title.as_bytes().to_vec(), StringFormat::Literal),
                );
                item.set(
                    "Dest",
                    Object::Array(vec![
                        Object::Reference(page_ids[(page - 1) as usize]),
                        Object::Name(b"Fit".to_vec()),
                    ]),
                );

                // Parent is the nearest preceding shallower entry, else the root.
                let parent = outline[..i]
                    .iter()
                    .rposition(|&(l, _, _)| l < level)
                    .map(|j| item_ids[j])
                    .unwrap_or(outlines_id);
                item.set("Parent", Object::Reference(parent));

                // Next sibling: first following entry at the same level,
                // unless a shallower one closes this subtree first.
                for j in i + 1..outline.len() {
                    if outline[j].0 < level {
                        break;
                    }
                    if outline[j].0 == level {
                        item.set("Next", Object::Reference(item_ids[j]));
                        break;
                    }
                }

                // First child: immediate successor one level deeper.
                if outline.get(i + 1).map(|&(l, _, _)| l == level + 1) == Some(true) {
                    item.set("First", Object::Reference(item_ids[i + 1]));
                }

                doc.objects.insert(item_ids[i], Object::Dictionary(item));
            }

            let mut outlines_dict = Dictionary::new();
            outlines_dict.set("Type", Object::Name(b"Outlines".to_vec()));
            outlines_dict.set("First", Object::Reference(item_ids[0]));
            doc.objects.insert(outlines_id, Object::Dictionary(outlines_dict));

            catalog_dict.set("Outlines", Object::Reference(outlines_id));
        }

        let catalog_id = doc.add_object(Object::Dictionary(catalog_dict));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::SectionSelector;
    use super::fixtures::create_filing_pdf;

    #[test]
    fn page_count_of_fixture() {
        let bytes = create_filing_pdf(7, &[]);
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(page_count(&doc), 7);
    }

    #[test]
    fn outline_selection_and_slicing_end_to_end() {
        // A miniature DART filing: business overview and financial statements
        // are targeted, the footnote section is excluded, and the appendix
        // never matches.
        let bytes = create_filing_pdf(
            20,
            &[
                (1, "I. 회사의 개요", 1),
                (1, "II. 사업의 내용", 3),
                (2, "1. 개요", 3),
                (1, "III. 재무제표", 8),
                (2, "연결재무제표 주석", 12),
                (1, "XX. 부록", 15),
            ],
        );
        let doc = Document::load_mem(&bytes).unwrap();
        let outline = read_outline(&doc);
        assert_eq!(outline.len(), 6);

        let ranges = SectionSelector::default().select(&outline, page_count(&doc));
        // 사업의 내용: pages 3..=7 (0-based 2..=6); 재무제표: pages 8..=14
        // (0-based 7..=13), footnote child does not terminate the scan.
        assert_eq!(ranges.len(), 2);
        assert_eq!((ranges[0].start, ranges[0].end), (2, 6));
        assert_eq!((ranges[1].start, ranges[1].end), (7, 13));

        let sliced = extract_ranges(&doc, &ranges).unwrap();
        let sliced_doc = Document::load_mem(&sliced).unwrap();
        assert_eq!(page_count(&sliced_doc), 5 + 7);
    }
}
