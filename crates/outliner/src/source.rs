use std::path::Path;

use outline_core::DocumentLayout;

use crate::prelude::*;

/// Where document layouts come from. Batch processing only depends on this
/// trait, so tests can feed it layouts (and failures) without real PDFs.
pub trait LayoutSource: Send + Sync {
    fn load(&self, path: &Path) -> Result<DocumentLayout>;
}

/// Reads PDF files through `pdf_layout`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfSource;

impl LayoutSource for PdfSource {
    fn load(&self, path: &Path) -> Result<DocumentLayout> {
        pdf_layout::load_layout_file(path).wrap_err_with(|| f!("failed to load {}", path.display()))
    }
}

/// File stem used by the title selector's filename fallback.
pub fn file_stem(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|s| s.to_str())
}
