use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Provider-facing layout types
// ---------------------------------------------------------------------------

/// Axis-aligned box in top-down page coordinates: `y` grows downward, so a
/// smaller `y0` means higher on the page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        BBox { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// A run of text sharing one font and style, as emitted by a text-layout
/// provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
    pub font_name: String,
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub bbox: BBox,
    /// 0-based page index.
    pub page_index: usize,
}

/// The spans of a single page, in the provider's reading order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub spans: Vec<TextSpan>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub page_count: usize,
}

/// A bookmark entry from the document's own table of contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Nesting depth, 1 for top-level bookmarks.
    pub depth: usize,
    pub title: String,
    /// 1-based page number.
    pub page: usize,
    /// Top-down y of the destination, when the bookmark names one. `None`
    /// targets the top of the page.
    #[serde(default)]
    pub top: Option<f32>,
}

/// Everything the classification pipeline consumes for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentLayout {
    pub pages: Vec<PageLayout>,
    pub metadata: DocumentMetadata,
    pub toc: Vec<TocEntry>,
}

impl DocumentLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

// ---------------------------------------------------------------------------
// Levels and tags
// ---------------------------------------------------------------------------

/// Output heading level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Map a bookmark nesting depth onto a heading level.
    pub fn from_depth(depth: usize) -> Self {
        match depth {
            0 | 1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeadingLevel::H1 => write!(f, "H1"),
            HeadingLevel::H2 => write!(f, "H2"),
            HeadingLevel::H3 => write!(f, "H3"),
        }
    }
}

/// Structural meaning attached to a pattern rule. Only the pattern matcher
/// deals in tags; everything downstream sees a [`HeadingLevel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SemanticTag {
    Chapter,
    Part,
    Section,
    Subsection,
    Detail,
}

impl SemanticTag {
    /// Parse a tag name. Unknown names fall back to [`SemanticTag::Section`]
    /// (an H2), so a loosely written configuration never fails here.
    pub fn parse_lenient(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "chapter" | "title" | "main" | "h1" | "level_1" => SemanticTag::Chapter,
            "part" => SemanticTag::Part,
            "section" | "h2" | "level_2" => SemanticTag::Section,
            "subsection" => SemanticTag::Subsection,
            "detail" | "subsubsection" | "h3" | "level_3" | "heading" => SemanticTag::Detail,
            _ => SemanticTag::Section,
        }
    }

    pub fn heading_level(self) -> HeadingLevel {
        match self {
            SemanticTag::Chapter => HeadingLevel::H1,
            SemanticTag::Part => HeadingLevel::H2,
            SemanticTag::Section => HeadingLevel::H2,
            SemanticTag::Subsection => HeadingLevel::H2,
            SemanticTag::Detail => HeadingLevel::H3,
        }
    }
}

impl From<String> for SemanticTag {
    fn from(value: String) -> Self {
        SemanticTag::parse_lenient(&value)
    }
}

// ---------------------------------------------------------------------------
// Candidates and outline
// ---------------------------------------------------------------------------

/// Which strategy produced a candidate. The source fixes the confidence, so a
/// candidate can only ever carry one of the four ladder values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionSource {
    Pattern,
    Content,
    Typography,
    Position,
}

impl DetectionSource {
    pub fn confidence(self) -> f32 {
        match self {
            DetectionSource::Pattern => 3.0,
            DetectionSource::Content => 2.0,
            DetectionSource::Typography => 1.0,
            DetectionSource::Position => 0.5,
        }
    }
}

/// A line tentatively classified as a heading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadingCandidate {
    pub text: String,
    /// 1-based page number.
    pub page: usize,
    pub level: HeadingLevel,
    pub source: DetectionSource,
    /// Top of the line in top-down page coordinates.
    pub source_y: f32,
}

impl HeadingCandidate {
    pub fn confidence(&self) -> f32 {
        self.source.confidence()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub level: HeadingLevel,
    pub text: String,
    pub page: usize,
}

impl From<HeadingCandidate> for OutlineEntry {
    fn from(candidate: HeadingCandidate) -> Self {
        OutlineEntry {
            level: candidate.level,
            text: candidate.text,
            page: candidate.page,
        }
    }
}

/// The final per-document artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentOutline {
    pub title: String,
    pub outline: Vec<OutlineEntry>,
}

impl DocumentOutline {
    /// Pretty-printed JSON with non-ASCII text kept verbatim.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
