use std::collections::BTreeMap;

use lopdf::{self, content::Content};

use outline_core::TocEntry;

use crate::PdfError;

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

/// A page identifier mirroring `lopdf::ObjectId`: (object number, generation number).
pub type PageId = (u32, u16);

/// Page height used when a page (and its ancestors) carries no MediaBox.
pub const DEFAULT_PAGE_HEIGHT: f32 = 792.0;

/// Info dictionary entries surfaced by [`PdfBackend::metadata`].
const INFO_KEYS: [&[u8]; 5] = [b"Title", b"Author", b"Creator", b"Producer", b"Subject"];

/// FontDescriptor `/Flags` bit for italic faces (bit 7, 1-based).
const FLAG_ITALIC: i64 = 1 << 6;

/// FontDescriptor `/Flags` bit forcing bold rendering (bit 19, 1-based).
const FLAG_FORCE_BOLD: i64 = 1 << 18;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// A font entry from a page's resource dictionary.
#[derive(Debug, Clone, Default)]
pub struct FontResource {
    /// The resource key as it appears in the content stream (e.g. `b"F1"`).
    pub key: Vec<u8>,
    /// Base font name, with any subset prefix (`ABCDEF+`) removed.
    pub base_font: Option<String>,
    /// FontDescriptor `/Flags`, looked up through `DescendantFonts` for
    /// composite fonts.
    pub flags: Option<i64>,
    pub encoding: Option<String>,
}

impl FontResource {
    /// Name to report on spans: the base font, or the resource key.
    pub fn display_name(&self) -> String {
        self.base_font
            .clone()
            .unwrap_or_else(|| String::from_utf8_lossy(&self.key).into_owned())
    }

    pub fn is_bold(&self) -> bool {
        let upper = self.display_name().to_uppercase();
        upper.contains("BOLD")
            || upper.contains("BLACK")
            || upper.contains("HEAVY")
            || self.flags.is_some_and(|f| f & FLAG_FORCE_BOLD != 0)
    }

    pub fn is_italic(&self) -> bool {
        let upper = self.display_name().to_uppercase();
        upper.contains("ITALIC")
            || upper.contains("OBLIQUE")
            || self.flags.is_some_and(|f| f & FLAG_ITALIC != 0)
    }
}

/// Strip the six-letter subset tag some producers prepend to font names.
fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.chars().all(|c| c.is_ascii_uppercase()) => rest,
        _ => name,
    }
}

/// A page's MediaBox in PDF user space, with corners normalised so that
/// `llx <= urx` and `lly <= ury`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaBox {
    pub llx: f32,
    pub lly: f32,
    pub urx: f32,
    pub ury: f32,
}

impl MediaBox {
    pub fn from_corners(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        MediaBox {
            llx: x0.min(x1),
            lly: y0.min(y1),
            urx: x0.max(x1),
            ury: y0.max(y1),
        }
    }

    pub fn width(&self) -> f32 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f32 {
        self.ury - self.lly
    }

    /// Top-down coordinates are measured downward from this edge.
    pub fn top(&self) -> f32 {
        self.ury
    }
}

impl Default for MediaBox {
    /// US Letter at the origin.
    fn default() -> Self {
        MediaBox::from_corners(0.0, 0.0, 612.0, DEFAULT_PAGE_HEIGHT)
    }
}

/// A simplified, lopdf-independent representation of a PDF value.
///
/// Span extraction works on these so it can be tested with a mock backend.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Dict(Vec<(Vec<u8>, PdfValue)>),
    Reference(PageId),
}

/// A single content-stream operation (operator + operands).
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

fn object_number(doc: &lopdf::Document, obj: &lopdf::Object) -> Option<f32> {
    let obj = match obj {
        lopdf::Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    match obj {
        lopdf::Object::Integer(i) => Some(*i as f32),
        lopdf::Object::Real(f) => Some(*f),
        _ => None,
    }
}

/// Walk up the page tree to find the MediaBox array.
fn find_media_box<'a>(doc: &'a lopdf::Document, dict: &'a lopdf::Dictionary) -> Option<&'a Vec<lopdf::Object>> {
    let own = dict.get(b"MediaBox").ok().and_then(|o| match o {
        lopdf::Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    });
    if let Some(arr) = own.and_then(|o| o.as_array().ok()) {
        return Some(arr);
    }

    let parent_id = dict.get(b"Parent").ok()?.as_reference().ok()?;
    let parent = doc.get_dictionary(parent_id).ok()?;
    find_media_box(doc, parent)
}

/// MediaBox of `page`, inherited from its ancestors when the page has none.
pub(crate) fn page_media_box(doc: &lopdf::Document, page: PageId) -> Result<MediaBox, PdfError> {
    let page_dict = doc
        .get_dictionary(page)
        .map_err(|e| PdfError::Parse(format!("page object is not a dictionary: {}", e)))?;

    let media_box = find_media_box(doc, page_dict)
        .ok_or_else(|| PdfError::Parse("MediaBox not found for page".into()))?;

    let nums: Vec<f32> = media_box.iter().filter_map(|o| object_number(doc, o)).collect();
    match nums[..] {
        [x0, y0, x1, y1, ..] => Ok(MediaBox::from_corners(x0, y0, x1, y1)),
        _ => Err(PdfError::Parse(format!(
            "MediaBox has {} numeric elements, expected 4",
            nums.len()
        ))),
    }
}

/// Extract an `f32` from a [`PdfValue`], accepting both `Integer` and `Real`.
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(f) => Some(*f),
        _ => None,
    }
}

/// Convert a `lopdf::Object` into a [`PdfValue`]. Stream payloads are
/// dropped; only their dictionaries survive.
pub fn convert_object(obj: &lopdf::Object) -> PdfValue {
    match obj {
        lopdf::Object::Null => PdfValue::Null,
        lopdf::Object::Boolean(b) => PdfValue::Bool(*b),
        lopdf::Object::Integer(i) => PdfValue::Integer(*i),
        lopdf::Object::Real(f) => PdfValue::Real(*f),
        lopdf::Object::Name(n) => PdfValue::Name(n.clone()),
        lopdf::Object::String(s, _) => PdfValue::Str(s.clone()),
        lopdf::Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        lopdf::Object::Dictionary(dict) => PdfValue::Dict(
            dict.iter()
                .map(|(k, v)| (k.clone(), convert_object(v)))
                .collect(),
        ),
        lopdf::Object::Stream(stream) => PdfValue::Dict(
            stream
                .dict
                .iter()
                .map(|(k, v)| (k.clone(), convert_object(v)))
                .collect(),
        ),
        lopdf::Object::Reference(id) => PdfValue::Reference(*id),
    }
}

/// Best-effort decoding of PDF string bytes: UTF-16BE with BOM, then UTF-8,
/// then Latin-1.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(payload) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let code_units: Vec<u16> = payload
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&code_units);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    bytes.iter().map(|&b| b as char).collect()
}

// ---------------------------------------------------------------------------
// PdfBackend trait
// ---------------------------------------------------------------------------

/// Abstraction over the PDF parser so span extraction can run against a
/// mock.
pub trait PdfBackend {
    /// Mapping from 1-based page number to [`PageId`].
    fn pages(&self) -> BTreeMap<u32, PageId>;

    fn page_fonts(&self, page: PageId) -> Result<Vec<FontResource>, PdfError>;

    /// Raw (possibly compressed) content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError>;

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError>;

    /// Decode string bytes from a text-showing operator using the encoding
    /// of `font_key` on `page`.
    fn decode_text(&self, page: PageId, font_key: &[u8], bytes: &[u8]) -> String;

    /// The page MediaBox, inherited from ancestors.
    fn media_box(&self, page: PageId) -> Result<MediaBox, PdfError>;

    /// Info dictionary entries (`Title`, `Author`, ...).
    fn metadata(&self) -> BTreeMap<String, String>;

    /// Document bookmarks in outline order.
    fn bookmarks(&self) -> Vec<TocEntry>;
}

// ---------------------------------------------------------------------------
// LopdfBackend
// ---------------------------------------------------------------------------

/// Concrete [`PdfBackend`] implementation backed by [`lopdf::Document`].
pub struct LopdfBackend {
    doc: lopdf::Document,
}

impl LopdfBackend {
    /// Parse a PDF from an in-memory byte slice. Encrypted documents are
    /// rejected.
    pub fn load_bytes(data: &[u8]) -> Result<Self, PdfError> {
        let doc = lopdf::Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            return Err(PdfError::Encrypted);
        }

        Ok(Self { doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    // -- private helpers ----------------------------------------------------

    /// Follow a single level of indirection.
    fn resolve<'a>(&'a self, obj: &'a lopdf::Object) -> Option<&'a lopdf::Object> {
        match obj {
            lopdf::Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    /// `/Flags` of the font's descriptor, looking through the first
    /// descendant font for composite (Type0) fonts.
    fn font_flags(&self, font: &lopdf::Dictionary) -> Option<i64> {
        let descriptor = font
            .get(b"FontDescriptor")
            .ok()
            .and_then(|o| self.resolve(o))
            .and_then(|o| o.as_dict().ok());

        if let Some(descriptor) = descriptor {
            return descriptor
                .get(b"Flags")
                .ok()
                .and_then(|o| self.resolve(o))
                .and_then(|o| o.as_i64().ok());
        }

        let descendants = font
            .get(b"DescendantFonts")
            .ok()
            .and_then(|o| self.resolve(o))
            .and_then(|o| o.as_array().ok())?;
        let first = self.resolve(descendants.first()?)?.as_dict().ok()?;
        self.font_flags(first)
    }

    fn font_encoding_name(&self, page: PageId, font_key: &[u8]) -> Option<String> {
        let fonts = self.doc.get_page_fonts(page).ok()?;
        let font_dict = fonts.get(font_key)?;
        match font_dict.get(b"Encoding").ok()? {
            lopdf::Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// PdfBackend implementation for LopdfBackend
// ---------------------------------------------------------------------------

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<FontResource>, PdfError> {
        let fonts_map = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page fonts: {}", e)))?;

        let name_of = |dict: &lopdf::Dictionary, key: &[u8]| {
            dict.get(key)
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).into_owned())
        };

        Ok(fonts_map
            .iter()
            .map(|(key, &dict)| FontResource {
                key: key.clone(),
                base_font: name_of(dict, b"BaseFont").map(|n| strip_subset_prefix(&n).to_string()),
                flags: self.font_flags(dict),
                encoding: name_of(dict, b"Encoding"),
            })
            .collect())
    }

    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError> {
        self.doc
            .get_page_content(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page content: {}", e)))
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
        let content = Content::decode(data)
            .map_err(|e| PdfError::Parse(format!("content stream decode error: {}", e)))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font_key: &[u8], bytes: &[u8]) -> String {
        // Identity-H / Identity-V fonts carry 2-byte codes; try UTF-16BE.
        if let Some(enc_name) = self.font_encoding_name(page, font_key) {
            if enc_name.contains("Identity") && bytes.len() >= 2 && bytes.len() % 2 == 0 {
                let code_units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect();
                let decoded = String::from_utf16_lossy(&code_units);
                if !decoded.chars().all(|c| c == '\u{FFFD}' || c == '\0') {
                    return decoded;
                }
            }
        }

        decode_text_simple(bytes)
    }

    fn media_box(&self, page: PageId) -> Result<MediaBox, PdfError> {
        page_media_box(&self.doc, page)
    }

    fn metadata(&self) -> BTreeMap<String, String> {
        let mut meta = BTreeMap::new();

        let Some(info_dict) = self
            .doc
            .trailer
            .get(b"Info")
            .ok()
            .and_then(|o| self.resolve(o))
            .and_then(|o| o.as_dict().ok())
        else {
            return meta;
        };

        for key in INFO_KEYS {
            let value = match info_dict.get(key).ok().and_then(|o| self.resolve(o)) {
                Some(lopdf::Object::String(bytes, _)) => decode_text_simple(bytes),
                Some(lopdf::Object::Name(bytes)) => String::from_utf8_lossy(bytes).into_owned(),
                _ => continue,
            };
            meta.insert(String::from_utf8_lossy(key).into_owned(), value);
        }

        meta
    }

    fn bookmarks(&self) -> Vec<TocEntry> {
        super::toc::read_bookmarks(&self.doc)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
