//! Text-layout provider for PDF files.
//!
//! Turns PDF bytes into an [`outline_core::DocumentLayout`]: positioned text
//! spans per page, Info-dictionary metadata and the bookmark tree. All PDF
//! access goes through [`parser::backend::PdfBackend`], so layout assembly can
//! be tested against an in-memory backend.

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

use outline_core::{DocumentLayout, DocumentMetadata, PageLayout};
use parser::backend::{LopdfBackend, PdfBackend};

pub mod parser;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("Document is encrypted")]
    Encrypted,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse PDF bytes and extract the full layout.
pub fn load_layout(bytes: &[u8]) -> Result<DocumentLayout, PdfError> {
    let backend = LopdfBackend::load_bytes(bytes)?;
    Ok(extract_layout(&backend))
}

/// Read a PDF from disk and extract its layout.
pub fn load_layout_file(path: &Path) -> Result<DocumentLayout, PdfError> {
    let bytes = std::fs::read(path)?;
    load_layout(&bytes)
}

/// Metadata and page count only, without walking any content stream.
pub fn info(bytes: &[u8]) -> Result<DocumentMetadata, PdfError> {
    let backend = LopdfBackend::load_bytes(bytes)?;
    Ok(extract_metadata(&backend))
}

/// Assemble a [`DocumentLayout`] from any backend.
///
/// Pages are emitted in page-number order. A page whose content cannot be
/// read or decoded is logged and contributes an empty [`PageLayout`], so page
/// indices stay aligned with page numbers.
pub fn extract_layout(backend: &dyn PdfBackend) -> DocumentLayout {
    let pages = backend
        .pages()
        .into_iter()
        .enumerate()
        .map(|(index, (page_num, page_id))| {
            match parser::spans::extract_page_spans(backend, page_id, index) {
                Ok(spans) => PageLayout { spans },
                Err(err) => {
                    log::warn!("skipping text on page {}: {}", page_num, err);
                    PageLayout::default()
                }
            }
        })
        .collect();

    DocumentLayout {
        pages,
        metadata: extract_metadata(backend),
        toc: backend.bookmarks(),
    }
}

fn extract_metadata(backend: &dyn PdfBackend) -> DocumentMetadata {
    let mut info: BTreeMap<String, String> = backend.metadata();
    let mut take = |key: &str| {
        info.remove(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    DocumentMetadata {
        title: take("Title"),
        author: take("Author"),
        creator: take("Creator"),
        page_count: backend.pages().len(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
