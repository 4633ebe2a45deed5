//! Bookmark (document outline) reading.
//!
//! Walks `/Root /Outlines` through `First`/`Next` links, resolving each
//! item's destination to a 1-based page number and, for `/XYZ`, `/FitH` and
//! `/FitBH` destinations, a top-down y on that page. Items whose destination
//! is a named destination or cannot be resolved are skipped; their children
//! are still visited.

use std::collections::{HashMap, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId};

use outline_core::TocEntry;

use super::backend::{decode_text_simple, page_media_box};

/// Bookmark trees deeper than this are cut off.
const MAX_DEPTH: usize = 16;

struct OutlineWalker<'a> {
    doc: &'a Document,
    page_numbers: HashMap<ObjectId, usize>,
    visited: HashSet<ObjectId>,
    entries: Vec<TocEntry>,
}

impl<'a> OutlineWalker<'a> {
    fn resolve(&self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    fn dict_ref(&self, dict: &Dictionary, key: &[u8]) -> Option<ObjectId> {
        dict.get(key).ok()?.as_reference().ok()
    }

    /// Page number and top-down y of an explicit destination array
    /// `[page /XYZ left top zoom]`.
    fn destination(&self, dest: &'a Object) -> Option<(usize, Option<f32>)> {
        let array = self.resolve(dest)?.as_array().ok()?;
        let (page, page_id) = match array.first()? {
            Object::Reference(id) => (self.page_numbers.get(id).copied()?, Some(*id)),
            // Remote-style destinations carry a 0-based page index.
            Object::Integer(i) if *i >= 0 => (*i as usize + 1, None),
            _ => return None,
        };

        let top_index = match array.get(1).and_then(|o| o.as_name().ok()) {
            Some(b"XYZ") => 3,
            Some(b"FitH") | Some(b"FitBH") => 2,
            _ => return Some((page, None)),
        };
        let top = match array.get(top_index) {
            Some(Object::Integer(i)) => Some(*i as f32),
            Some(Object::Real(f)) => Some(*f),
            _ => None,
        };
        let flipped = top.zip(page_id).and_then(|(top, id)| {
            let media_box = page_media_box(self.doc, id).ok()?;
            Some((media_box.top() - top).max(0.0))
        });
        Some((page, flipped))
    }

    fn item_destination(&self, item: &'a Dictionary) -> Option<(usize, Option<f32>)> {
        if let Ok(dest) = item.get(b"Dest") {
            return self.destination(dest);
        }
        let action = self.resolve(item.get(b"A").ok()?)?.as_dict().ok()?;
        let is_goto = action
            .get(b"S")
            .ok()
            .and_then(|s| s.as_name().ok())
            .is_some_and(|s| s == b"GoTo");
        if !is_goto {
            return None;
        }
        self.destination(action.get(b"D").ok()?)
    }

    fn item_title(&self, item: &'a Dictionary) -> Option<String> {
        match self.resolve(item.get(b"Title").ok()?)? {
            Object::String(bytes, _) => Some(decode_text_simple(bytes)),
            _ => None,
        }
    }

    /// Visit the sibling chain starting at `first`.
    fn walk(&mut self, first: Option<ObjectId>, depth: usize) {
        if depth > MAX_DEPTH {
            return;
        }

        let doc = self.doc;
        let mut next = first;
        while let Some(id) = next {
            if !self.visited.insert(id) {
                log::debug!("bookmark cycle at object {:?}", id);
                return;
            }
            let Ok(item) = doc.get_dictionary(id) else {
                return;
            };

            if let (Some(title), Some((page, top))) = (self.item_title(item), self.item_destination(item)) {
                let title = title.trim().to_string();
                if !title.is_empty() {
                    self.entries.push(TocEntry {
                        depth,
                        title,
                        page,
                        top,
                    });
                }
            }

            let child = self.dict_ref(item, b"First");
            self.walk(child, depth + 1);
            next = self.dict_ref(item, b"Next");
        }
    }
}

/// Read the document's bookmarks in outline order. Returns an empty list
/// when the document has none.
pub fn read_bookmarks(doc: &Document) -> Vec<TocEntry> {
    let Ok(catalog) = doc.catalog() else {
        return Vec::new();
    };
    let Some(outlines) = catalog
        .get(b"Outlines")
        .ok()
        .and_then(|o| match o {
            Object::Reference(id) => doc.get_dictionary(*id).ok(),
            Object::Dictionary(d) => Some(d),
            _ => None,
        })
    else {
        return Vec::new();
    };

    let page_numbers = doc
        .get_pages()
        .into_iter()
        .map(|(number, id)| (id, number as usize))
        .collect();

    let mut walker = OutlineWalker {
        doc,
        page_numbers,
        visited: HashSet::new(),
        entries: Vec::new(),
    };
    let first = walker.dict_ref(outlines, b"First");
    walker.walk(first, 1);
    walker.entries
}
