use std::path::PathBuf;

use outline_core::Analysis;

use crate::prelude::{println, *};
use crate::source::{file_stem, LayoutSource, PdfSource};

#[derive(Debug, clap::Args)]
pub struct App {
    /// Path to the PDF file
    path: PathBuf,
}

/// Print the typography profile and the detected language of a document.
pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let heuristics = crate::heuristics::load(global.heuristics.as_deref())?;

    let path = app.path;
    let (pages, analysis) = tokio::task::spawn_blocking(move || -> Result<(usize, Analysis)> {
        let layout = PdfSource.load(&path)?;
        let analysis = outline_core::analyze(&layout, &heuristics, file_stem(&path));
        Ok((layout.page_count(), analysis))
    })
    .await??;

    println!("{}", render(pages, &analysis));
    Ok(())
}

fn render(pages: usize, analysis: &Analysis) -> String {
    let profile = &analysis.profile;
    let p = &profile.size_percentiles;

    let mut table = new_table();
    table.add_row(prettytable::row!["Title", analysis.outline.title]);
    table.add_row(prettytable::row!["Pages", pages]);
    table.add_row(prettytable::row![
        "Language",
        f!("{} (score {})", analysis.language.language, analysis.language.score)
    ]);
    table.add_row(prettytable::row!["Sampled lines", profile.sampled_lines]);
    table.add_row(prettytable::row!["Average size", f!("{:.2}", profile.avg_size)]);
    table.add_row(prettytable::row!["Size stddev", f!("{:.2}", profile.size_stddev)]);
    table.add_row(prettytable::row![
        "Percentiles",
        f!(
            "p25 {:.1} / p50 {:.1} / p75 {:.1} / p90 {:.1} / p95 {:.1}",
            p.p25,
            p.p50,
            p.p75,
            p.p90,
            p.p95
        )
    ]);
    table.add_row(prettytable::row!["Common font", profile.common_font]);
    table.add_row(prettytable::row![
        "Line length",
        f!(
            "avg {:.1}, short below {}",
            profile.avg_line_length,
            profile.short_line_threshold
        )
    ]);
    table.add_row(prettytable::row!["Candidates", analysis.candidates.len()]);
    table.add_row(prettytable::row!["Outline entries", analysis.outline.outline.len()]);
    table.to_string()
}
