// src/pdf/outline.rs
//
// Walks the catalog's `/Outlines` tree via `/First`/`/Next` links and
// flattens it into the level-tagged entry list the section selector
// consumes. The list preserves document (pre-order) order; no sorting.

use crate::selector::OutlineEntry;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{BTreeMap, HashSet};

// Guards against malformed outlines with circular references.
const MAX_DEPTH: u32 = 64;
const MAX_SIBLINGS: usize = 10_000;

/// Extracts the document outline as a flat pre-order list. Each entry
/// carries its 1-based nesting level and 1-based target page.
///
/// A missing or malformed `/Outlines` tree yields an empty list, which the
/// caller treats as "keep the whole document". Bookmarks whose destination
/// cannot be resolved to a page are skipped.
pub fn read_outline(doc: &Document) -> Vec<OutlineEntry> {
    let first_id = match outline_first_child(doc) {
        Some(id) => id,
        None => return Vec::new(),
    };

    let pages_map = doc.get_pages();
    let mut entries = Vec::new();
    let mut visited = HashSet::new();
    walk_outline(doc, first_id, 1, &pages_map, &mut visited, &mut entries);
    entries
}

/// Resolves trailer -> catalog -> `/Outlines` -> `/First`.
fn outline_first_child(doc: &Document) -> Option<ObjectId> {
    let catalog = resolve_dict(doc, doc.trailer.get(b"Root").ok()?)?;
    let outlines = resolve_dict(doc, catalog.get(b"Outlines").ok()?)?;
    match outlines.get(b"First") {
        Ok(Object::Reference(id)) => Some(*id),
        _ => None,
    }
}

fn walk_outline(
    doc: &Document,
    first_id: ObjectId,
    level: u32,
    pages_map: &BTreeMap<u32, ObjectId>,
    visited: &mut HashSet<ObjectId>,
    entries: &mut Vec<OutlineEntry>,
) {
    if level > MAX_DEPTH {
        return;
    }

    let mut current = Some(first_id);
    let mut sibling_count = 0;

    while let Some(node_id) = current {
        if !visited.insert(node_id) || sibling_count >= MAX_SIBLINGS {
            break;
        }
        sibling_count += 1;

        let node = match doc.get_object(node_id).ok().and_then(|o| o.as_dict().ok()) {
            Some(dict) => dict,
            None => break,
        };

        let title = node
            .get(b"Title")
            .ok()
            .and_then(|t| decode_text(doc, t))
            .unwrap_or_default();

        match resolve_dest_page(doc, node, pages_map) {
            Some(page) => entries.push(OutlineEntry { level, title, page }),
            None => {
                tracing::debug!(%title, "skipping bookmark without resolvable page")
            }
        }

        // Children first (/First), then the next sibling (/Next).
        if let Ok(Object::Reference(child_id)) = node.get(b"First") {
            walk_outline(doc, *child_id, level + 1, pages_map, visited, entries);
        }
        current = match node.get(b"Next") {
            Ok(Object::Reference(next_id)) => Some(*next_id),
            _ => None,
        };
    }
}

/// Resolves a bookmark's target page, checking `/Dest` first and then
/// `/A` GoTo actions.
fn resolve_dest_page(
    doc: &Document,
    node: &Dictionary,
    pages_map: &BTreeMap<u32, ObjectId>,
) -> Option<u32> {
    if let Ok(dest) = node.get(b"Dest") {
        if let Some(page) = dest_array_page(doc, dest, pages_map) {
            return Some(page);
        }
    }

    if let Ok(action) = node.get(b"A") {
        let action = resolve_dict(doc, action)?;
        if let Ok(Object::Name(kind)) = action.get(b"S") {
            if kind == b"GoTo" {
                if let Ok(dest) = action.get(b"D") {
                    return dest_array_page(doc, dest, pages_map);
                }
            }
        }
    }

    None
}

/// Handles explicit destination arrays (`[page_ref /Fit ...]`). Named
/// destinations are rare in DART filings and are not resolved.
fn dest_array_page(
    doc: &Document,
    dest: &Object,
    pages_map: &BTreeMap<u32, ObjectId>,
) -> Option<u32> {
    let dest = match dest {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    let arr = dest.as_array().ok()?;
    let page_ref = match arr.first()? {
        Object::Reference(id) => *id,
        _ => return None,
    };
    // lopdf page maps are keyed by 1-based page number.
    pages_map
        .iter()
        .find_map(|(&num, &id)| (id == page_ref).then_some(num))
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok(),
        other => other.as_dict().ok(),
    }
}

/// Decodes a PDF text string: UTF-16BE when it carries a BOM, otherwise
/// treated as UTF-8/PDFDocEncoding best-effort.
fn decode_text(doc: &Document, obj: &Object) -> Option<String> {
    let obj = match obj {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    match obj {
        Object::String(bytes, _) => {
            if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
                let utf16: Vec<u16> = bytes[2..]
                    .chunks(2)
                    .filter(|c| c.len() == 2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect();
                Some(String::from_utf16_lossy(&utf16))
            } else {
                Some(String::from_utf8_lossy(bytes).into_owned())
            }
        }
        _ => None,
    }
}
