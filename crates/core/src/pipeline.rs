//! The canonical outline pipeline.
//!
//! `DocumentLayout -> lines -> profile + language -> candidates -> filter ->
//! rank -> TOC backup -> placeholder`, with the title chosen on the side.

use crate::classify::pattern::Heuristics;
use crate::classify::{Classification, Classifier};
use crate::config::HeuristicConfig;
use crate::filter;
use crate::language::{detect_language, language_sample, LanguageGuess};
use crate::line::{group_spans_into_lines, page_contexts, Line};
use crate::profile::{build_profile, DocumentTypographyProfile};
use crate::rank;
use crate::title::select_title;
use crate::types::{DetectionSource, DocumentLayout, DocumentOutline, HeadingCandidate};

/// Font sizes within this many points count as the same size when a heading
/// absorbs the line after it.
const CONTINUATION_SIZE_TOLERANCE: f32 = 0.1;

/// A continuation line must start within this multiple of the previous
/// line's height.
const CONTINUATION_GAP_FACTOR: f32 = 1.5;

/// Intermediate results of one pipeline run, kept for diagnostics.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub profile: DocumentTypographyProfile,
    pub language: LanguageGuess,
    /// Candidates that passed the filter chain, before ranking.
    pub candidates: Vec<HeadingCandidate>,
    pub outline: DocumentOutline,
}

/// Whether `line` is set apart from body text, by a size above the median or
/// a bold face other than the body font.
fn stands_out(line: &Line, profile: &DocumentTypographyProfile) -> bool {
    line.avg_font_size > profile.size_percentiles.p50 + CONTINUATION_SIZE_TOLERANCE
        || (line.is_bold && line.dominant_font() != profile.common_font)
}

/// Extend a typography heading over the following lines that continue it.
/// Returns the merged text and the number of lines consumed.
///
/// Only headings that stand out from body text are extended, and a line
/// starting in lower case never continues one.
fn continue_heading(
    lines: &[Line],
    start: usize,
    profile: &DocumentTypographyProfile,
    config: &HeuristicConfig,
) -> (String, usize) {
    let first = &lines[start];
    let mut text = first.text.clone();
    if !stands_out(first, profile) {
        return (text, 1);
    }

    let mut prev = first;
    let mut end = start + 1;

    for next in &lines[start + 1..] {
        let same_style = (next.avg_font_size - first.avg_font_size).abs() <= CONTINUATION_SIZE_TOLERANCE
            && next.is_bold == first.is_bold;
        let adjacent = next.bbox.y0 - prev.bbox.y1 <= prev.height() * CONTINUATION_GAP_FACTOR;
        let lowercase_start = next.text.chars().next().is_some_and(char::is_lowercase);
        if !same_style || !adjacent || lowercase_start || filter::is_list_or_table_line(&next.text, config) {
            break;
        }

        let merged = format!("{} {}", text, next.text);
        if merged.chars().count() > config.max_heading_chars {
            break;
        }
        text = merged;
        prev = next;
        end += 1;
    }

    (text, end - start)
}

/// Classify every line of one page and return the proper candidates.
fn page_candidates(
    lines: &[Line],
    page_index: usize,
    classifier: &Classifier<'_>,
    profile: &DocumentTypographyProfile,
    config: &HeuristicConfig,
) -> Vec<HeadingCandidate> {
    let contexts = page_contexts(lines, config.position_band);
    let mut out = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = &lines[i];
        let Some(Classification { level, source }) = classifier.classify(line, &contexts[i]) else {
            i += 1;
            continue;
        };

        let (mut text, mut consumed) = if source == DetectionSource::Typography {
            continue_heading(lines, i, profile, config)
        } else {
            (line.text.clone(), 1)
        };
        if consumed > 1 && !filter::is_proper_heading(&text, config) {
            text = line.text.clone();
            consumed = 1;
        }

        if filter::is_proper_heading(&text, config) {
            out.push(HeadingCandidate {
                text,
                page: page_index + 1,
                level,
                source,
                source_y: line.bbox.y0,
            });
        }
        i += consumed;
    }

    out
}

/// Run the full pipeline and keep the intermediate results.
///
/// `file_stem` feeds the filename fallback of the title selector.
pub fn analyze(layout: &DocumentLayout, heuristics: &Heuristics, file_stem: Option<&str>) -> Analysis {
    let config = heuristics.config();

    let pages: Vec<Vec<Line>> = layout
        .pages
        .iter()
        .enumerate()
        .map(|(index, page)| group_spans_into_lines(page.spans.clone(), index))
        .collect();

    let profile = build_profile(pages.iter().take(config.sample_pages).flatten());
    let language = detect_language(&language_sample(&pages, config), config);
    let classifier = Classifier::new(heuristics, &profile, language.language);

    let candidates: Vec<HeadingCandidate> = pages
        .iter()
        .enumerate()
        .flat_map(|(index, lines)| page_candidates(lines, index, &classifier, &profile, config))
        .collect();

    let ranked = rank::rank_candidates(candidates.clone(), config.max_outline_entries);
    let mut outline = rank::merge_toc(ranked, &layout.toc, config);
    if outline.is_empty() {
        outline.push(rank::placeholder());
    }

    let first_page = pages.first().map(Vec::as_slice).unwrap_or_default();
    let title = select_title(&layout.metadata, first_page, file_stem, config);

    Analysis {
        profile,
        language,
        candidates,
        outline: DocumentOutline { title, outline },
    }
}

/// Extract the title and heading outline of one document.
pub fn extract_outline(
    layout: &DocumentLayout,
    heuristics: &Heuristics,
    file_stem: Option<&str>,
) -> DocumentOutline {
    analyze(layout, heuristics, file_stem).outline
}
