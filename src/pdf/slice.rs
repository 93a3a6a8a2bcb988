// src/pdf/slice.rs
//
// Assembles the reduced filing: each selected page range becomes a
// whitelisted sub-document, and the sub-documents are appended in range
// order by remapping object IDs. Ranges are copied independently, so
// overlapping ranges duplicate their shared pages in the output — the
// selector deliberately does not coalesce them.

use crate::selector::PageRange;
use crate::utils::error::PdfError;
use lopdf::{Document, Object, ObjectId};
use std::collections::HashSet;

/// Builds a new PDF containing, for each range in list order, the
/// inclusive 0-based page span copied verbatim from `source`.
pub fn extract_ranges(source: &Document, ranges: &[PageRange]) -> Result<Vec<u8>, PdfError> {
    let total = source.get_pages().len() as u32;
    if total == 0 {
        return Err(PdfError::Empty);
    }

    for range in ranges {
        if range.end >= total {
            return Err(PdfError::Operation(format!(
                "page range {}-{} exceeds document ({} pages)",
                range.start, range.end, total
            )));
        }
    }

    let mut iter = ranges.iter();
    let first = iter
        .next()
        .ok_or_else(|| PdfError::Operation("no page ranges to extract".into()))?;

    let mut dest = whitelist_range(source, *first);
    let mut dest_pages: Vec<ObjectId> = dest.get_pages().values().copied().collect();

    let mut appended = false;
    for range in iter {
        let part = whitelist_range(source, *range);
        append_document(&mut dest, part, &mut dest_pages);
        appended = true;
    }
    if appended {
        rewrite_page_tree(&mut dest, &dest_pages)?;
    }

    dest.prune_objects();
    dest.compress();

    let mut buffer = Vec::new();
    dest.save_to(&mut buffer)
        .map_err(|e| PdfError::Operation(format!("save failed: {}", e)))?;
    Ok(buffer)
}

/// Copies `source` keeping only the pages inside `range` (0-based,
/// inclusive). Deletes in reverse so page numbering stays valid while
/// pruning, then drops orphaned objects.
fn whitelist_range(source: &Document, range: PageRange) -> Document {
    let mut doc = source.clone();
    let total = doc.get_pages().len() as u32;

    let keep: HashSet<u32> = (range.start + 1..=range.end + 1).collect();
    let mut to_delete: Vec<u32> = (1..=total).filter(|p| !keep.contains(p)).collect();
    to_delete.reverse();
    for page in to_delete {
        doc.delete_pages(&[page]);
    }

    doc.prune_objects();
    doc
}

/// Appends all of `source`'s objects to `dest`, shifting object IDs past
/// `dest.max_id`, and records the remapped page IDs in order.
fn append_document(dest: &mut Document, source: Document, dest_pages: &mut Vec<ObjectId>) {
    let offset = dest.max_id;
    let source_pages: Vec<ObjectId> = source.get_pages().values().copied().collect();
    let source_max = source.max_id;

    for (old_id, object) in source.objects.into_iter() {
        let new_id = (old_id.0 + offset, old_id.1);
        dest.objects.insert(new_id, shift_references(object, offset));
    }

    for page in source_pages {
        dest_pages.push((page.0 + offset, page.1));
    }

    dest.max_id = (source_max + offset).max(dest.max_id);
}

/// Recursively shifts every object reference by `offset`.
fn shift_references(obj: Object, offset: u32) -> Object {
    match obj {
        Object::Reference(id) => Object::Reference((id.0 + offset, id.1)),
        Object::Array(arr) => {
            Object::Array(arr.into_iter().map(|o| shift_references(o, offset)).collect())
        }
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = shift_references(value.clone(), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = shift_references(value.clone(), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

/// Points the destination's page tree at the combined page list.
fn rewrite_page_tree(doc: &mut Document, page_refs: &[ObjectId]) -> Result<(), PdfError> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .map_err(|_| PdfError::Operation("no Root in trailer".into()))?
        .as_reference()
        .map_err(|_| PdfError::Operation("Root is not a reference".into()))?;

    let pages_id = doc
        .objects
        .get(&catalog_id)
        .ok_or_else(|| PdfError::Operation("catalog not found".into()))?
        .as_dict()
        .map_err(|_| PdfError::Operation("invalid catalog".into()))?
        .get(b"Pages")
        .map_err(|_| PdfError::Operation("no Pages in catalog".into()))?
        .as_reference()
        .map_err(|_| PdfError::Operation("Pages is not a reference".into()))?;

    match doc.objects.get_mut(&pages_id) {
        Some(Object::Dictionary(pages_dict)) => {
            let kids = page_refs
                .iter()
                .map(|&id| Object::Reference(id))
                .collect::<Vec<_>>();
            pages_dict.set("Kids", Object::Array(kids));
            pages_dict.set("Count", Object::Integer(page_refs.len() as i64));
            Ok(())
        }
        _ => Err(PdfError::Operation("invalid pages dictionary".into())),
    }
}
