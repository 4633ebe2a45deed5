//! In-memory [`PdfBackend`] for tests: pages carry pre-decoded operators.

use std::collections::BTreeMap;

use outline_core::TocEntry;

use super::backend::{decode_text_simple, ContentOp, FontResource, MediaBox, PageId, PdfBackend, PdfValue};
use crate::PdfError;

#[derive(Default)]
pub struct MockBackend {
    pub page_ids: BTreeMap<u32, PageId>,
    pub fonts: Vec<FontResource>,
    /// Operators per page. A page missing here fails to load.
    pub ops: BTreeMap<PageId, Vec<ContentOp>>,
    pub media_box: Option<MediaBox>,
    pub metadata: BTreeMap<String, String>,
    pub bookmarks: Vec<TocEntry>,
}

impl MockBackend {
    pub fn single_page(fonts: Vec<FontResource>, ops: Vec<ContentOp>) -> Self {
        Self::with_pages(fonts, vec![ops])
    }

    /// Pages numbered from 1 with object ids `(n, 0)`.
    pub fn with_pages(fonts: Vec<FontResource>, pages: Vec<Vec<ContentOp>>) -> Self {
        let mut backend = MockBackend {
            fonts,
            ..MockBackend::default()
        };
        for (i, ops) in pages.into_iter().enumerate() {
            let id = (i as u32 + 1, 0);
            backend.page_ids.insert(i as u32 + 1, id);
            backend.ops.insert(id, ops);
        }
        backend
    }
}

impl PdfBackend for MockBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.page_ids.clone()
    }

    fn page_fonts(&self, _page: PageId) -> Result<Vec<FontResource>, PdfError> {
        Ok(self.fonts.clone())
    }

    /// The "content" of a page is its object number, resolved again in
    /// `decode_content`.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError> {
        if self.ops.contains_key(&page) {
            Ok(page.0.to_be_bytes().to_vec())
        } else {
            Err(PdfError::Parse(format!("no content for page {:?}", page)))
        }
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
        let bytes: [u8; 4] = data
            .try_into()
            .map_err(|_| PdfError::Parse("bad mock content".into()))?;
        let id = (u32::from_be_bytes(bytes), 0);
        Ok(self.ops.get(&id).cloned().unwrap_or_default())
    }

    fn decode_text(&self, _page: PageId, _font_key: &[u8], bytes: &[u8]) -> String {
        decode_text_simple(bytes)
    }

    fn media_box(&self, _page: PageId) -> Result<MediaBox, PdfError> {
        self.media_box
            .ok_or_else(|| PdfError::Parse("MediaBox not found for page".into()))
    }

    fn metadata(&self) -> BTreeMap<String, String> {
        self.metadata.clone()
    }

    fn bookmarks(&self) -> Vec<TocEntry> {
        self.bookmarks.clone()
    }
}

pub fn font(key: &[u8], base_font: &str, flags: Option<i64>) -> FontResource {
    FontResource {
        key: key.to_vec(),
        base_font: Some(base_font.to_string()),
        flags,
        encoding: None,
    }
}

pub fn helvetica_fonts() -> Vec<FontResource> {
    vec![
        font(b"F1", "Helvetica", None),
        font(b"F2", "Helvetica-Bold", None),
    ]
}

pub fn op(operator: &str, operands: Vec<PdfValue>) -> ContentOp {
    ContentOp {
        operator: operator.to_string(),
        operands,
    }
}

fn reals(values: &[f32]) -> Vec<PdfValue> {
    values.iter().map(|v| PdfValue::Real(*v)).collect()
}

pub fn bt() -> ContentOp {
    op("BT", vec![])
}

pub fn et() -> ContentOp {
    op("ET", vec![])
}

pub fn tf(key: &[u8], size: f32) -> ContentOp {
    op("Tf", vec![PdfValue::Name(key.to_vec()), PdfValue::Real(size)])
}

pub fn tm(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> ContentOp {
    op("Tm", reals(&[a, b, c, d, e, f]))
}

pub fn td(tx: f32, ty: f32) -> ContentOp {
    op("Td", reals(&[tx, ty]))
}

pub fn td_upper(tx: f32, ty: f32) -> ContentOp {
    op("TD", reals(&[tx, ty]))
}

pub fn tl(leading: f32) -> ContentOp {
    op("TL", reals(&[leading]))
}

pub fn ts(rise: f32) -> ContentOp {
    op("Ts", reals(&[rise]))
}

pub fn tstar() -> ContentOp {
    op("T*", vec![])
}

pub fn tj(text: &[u8]) -> ContentOp {
    op("Tj", vec![PdfValue::Str(text.to_vec())])
}

pub fn tj_array(items: Vec<PdfValue>) -> ContentOp {
    op("TJ", vec![PdfValue::Array(items)])
}

/// A one-line text object at `(x, y)` in PDF user space.
pub fn text_at(key: &[u8], size: f32, x: f32, y: f32, text: &str) -> Vec<ContentOp> {
    vec![
        bt(),
        tf(key, size),
        tm(1.0, 0.0, 0.0, 1.0, x, y),
        tj(text.as_bytes()),
        et(),
    ]
}
