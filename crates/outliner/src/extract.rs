use std::path::PathBuf;
use std::sync::Arc;

use outline_core::{DocumentOutline, Heuristics};

use crate::prelude::{println, *};
use crate::source::{file_stem, LayoutSource, PdfSource};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    #[default]
    Json,
    Table,
}

#[derive(Debug, clap::Args)]
pub struct App {
    /// Path to the PDF file
    path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Write the result to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let heuristics = Arc::new(crate::heuristics::load(global.heuristics.as_deref())?);

    let path = app.path.clone();
    let outline = tokio::task::spawn_blocking(move || outline_for(&PdfSource, &heuristics, &path)).await??;

    let rendered = match app.format {
        Format::Json => outline.to_json_pretty()?,
        Format::Table => render_table(&outline),
    };

    match app.output {
        Some(out) => {
            std::fs::write(&out, rendered).wrap_err_with(|| f!("failed to write {}", out.display()))?;
            log::info!("wrote {}", out.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

/// Load one document and run the outline pipeline on it.
pub fn outline_for(
    source: &dyn LayoutSource,
    heuristics: &Heuristics,
    path: &std::path::Path,
) -> Result<DocumentOutline> {
    let layout = source.load(path)?;
    let analysis = outline_core::analyze(&layout, heuristics, file_stem(path));
    log::debug!(
        "{}: {} pages, language {}, {} candidates, {} outline entries",
        path.display(),
        layout.page_count(),
        analysis.language.language,
        analysis.candidates.len(),
        analysis.outline.outline.len()
    );
    Ok(analysis.outline)
}

fn render_table(outline: &DocumentOutline) -> String {
    let mut table = new_table();
    table.set_titles(prettytable::row!["Level", "Heading", "Page"]);
    for entry in &outline.outline {
        let indent = match entry.level {
            outline_core::HeadingLevel::H1 => "",
            outline_core::HeadingLevel::H2 => "  ",
            outline_core::HeadingLevel::H3 => "    ",
        };
        table.add_row(prettytable::row![
            entry.level,
            f!("{}{}", indent, entry.text),
            entry.page
        ]);
    }
    f!("{}\n\n{}", outline.title, table)
}
