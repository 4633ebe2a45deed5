use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use outline_core::Heuristics;

use crate::prelude::*;
use crate::source::{LayoutSource, PdfSource};

#[derive(Debug, clap::Args)]
pub struct App {
    /// Directory scanned (non-recursively) for `*.pdf` files
    #[arg(short, long, env = "OUTLINER_INPUT", default_value = "input")]
    input: PathBuf,

    /// Directory receiving one `<stem>.json` per document
    #[arg(short, long, env = "OUTLINER_OUTPUT", default_value = "output")]
    output: PathBuf,

    /// Upper bound on concurrently processed documents
    #[arg(short, long, env = "OUTLINER_WORKERS", default_value = "4")]
    workers: usize,
}

/// What happened to one input document.
#[derive(Debug)]
pub struct DocumentReport {
    pub input: PathBuf,
    /// The artifact written, or the error that stopped the document.
    pub result: std::result::Result<PathBuf, String>,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub reports: Vec<DocumentReport>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.reports.len()
    }

    pub fn failed(&self) -> impl Iterator<Item = &DocumentReport> {
        self.reports.iter().filter(|r| r.result.is_err())
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let heuristics = Arc::new(crate::heuristics::load(global.heuristics.as_deref())?);
    let source: Arc<dyn LayoutSource> = Arc::new(PdfSource);

    let summary = process_directory(source, heuristics, &app.input, &app.output, app.workers).await?;

    for report in summary.failed() {
        if let Err(err) = &report.result {
            log::error!("{}: {}", report.input.display(), err);
        }
    }
    log::info!(
        "processed {} documents: {} succeeded, {} failed",
        summary.total(),
        summary.total() - summary.failed_count(),
        summary.failed_count()
    );

    if summary.failed_count() > 0 {
        return Err(Error::BatchFailed {
            failed: summary.failed_count(),
            total: summary.total(),
        }
        .into());
    }
    Ok(())
}

/// Every `*.pdf` file (extension matched case-insensitively) directly inside
/// `dir`, sorted by path.
pub fn discover_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::InputNotFound(dir.display().to_string()).into());
    }

    let mut documents = Vec::new();
    for entry in std::fs::read_dir(dir).wrap_err_with(|| f!("failed to list {}", dir.display()))? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            documents.push(path);
        }
    }
    documents.sort();
    Ok(documents)
}

/// Number of documents processed at once: bounded by the machine, the
/// workload and the configured cap, and never zero.
pub fn pool_size(cap: usize, documents: usize) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    cores.min(documents).min(cap).max(1)
}

/// Destination of the artifact for `input`.
fn artifact_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or(input.as_os_str());
    output_dir.join(f!("{}.json", stem.to_string_lossy()))
}

/// Extract and write one document. The JSON is fully rendered before the
/// file is created, and a failed write removes the partial file.
fn process_document(
    source: &dyn LayoutSource,
    heuristics: &Heuristics,
    input: &Path,
    output_dir: &Path,
) -> Result<PathBuf> {
    log::info!("processing {}", input.display());
    let outline = crate::extract::outline_for(source, heuristics, input)?;
    let json = outline.to_json_pretty()?;

    let target = artifact_path(input, output_dir);
    if let Err(err) = std::fs::write(&target, json) {
        let _ = std::fs::remove_file(&target);
        return Err(err).wrap_err_with(|| f!("failed to write {}", target.display()));
    }
    log::info!("wrote {}", target.display());
    Ok(target)
}

/// Process every document of `input_dir` on a bounded pool of blocking
/// workers. A failing document is recorded in the summary and never stops
/// the others. Reports are returned in input order.
pub async fn process_directory(
    source: Arc<dyn LayoutSource>,
    heuristics: Arc<Heuristics>,
    input_dir: &Path,
    output_dir: &Path,
    workers: usize,
) -> Result<BatchSummary> {
    let documents = discover_documents(input_dir)?;
    std::fs::create_dir_all(output_dir)
        .wrap_err_with(|| f!("failed to create {}", output_dir.display()))?;

    if documents.is_empty() {
        log::warn!("no PDF documents found in {}", input_dir.display());
        return Ok(BatchSummary::default());
    }

    let pool = pool_size(workers, documents.len());
    log::info!("processing {} documents with {} workers", documents.len(), pool);

    let mut reports: Vec<DocumentReport> = stream::iter(documents)
        .map(|input| {
            let source = Arc::clone(&source);
            let heuristics = Arc::clone(&heuristics);
            let output_dir = output_dir.to_path_buf();
            async move {
                let task_input = input.clone();
                let joined = tokio::task::spawn_blocking(move || {
                    process_document(source.as_ref(), &heuristics, &task_input, &output_dir)
                })
                .await;
                let result = match joined {
                    Ok(Ok(path)) => Ok(path),
                    Ok(Err(err)) => Err(f!("{:#}", err)),
                    Err(err) => Err(f!("worker failed: {}", err)),
                };
                DocumentReport { input, result }
            }
        })
        .buffer_unordered(pool)
        .collect()
        .await;

    reports.sort_by(|a, b| a.input.cmp(&b.input));
    Ok(BatchSummary { reports })
}
