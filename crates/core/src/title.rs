//! Title selection. Runs independently of heading detection.

use crate::config::HeuristicConfig;
use crate::line::{collapse_whitespace, Line};
use crate::types::DocumentMetadata;

pub const DEFAULT_TITLE: &str = "Untitled Document";

fn metadata_title(metadata: &DocumentMetadata, config: &HeuristicConfig) -> Option<String> {
    let title = collapse_whitespace(metadata.title.as_deref()?);
    let chars = title.chars().count();
    (chars >= config.metadata_title_min_chars && chars <= config.metadata_title_max_chars)
        .then_some(title)
}

fn is_title_like(text: &str, config: &HeuristicConfig) -> bool {
    let chars = text.chars().count();
    if chars < config.title_min_chars || chars > config.title_max_chars {
        return false;
    }
    if !text.chars().any(char::is_alphabetic) {
        return false;
    }
    let lower = text.to_lowercase();
    if config.title_denylist.iter().any(|d| *d == lower) {
        return false;
    }
    !config
        .title_denied_prefixes
        .iter()
        .any(|p| text.starts_with(p.as_str()))
}

/// The most prominent title-like line on the first page. Prominence is the
/// font size plus a bonus for bold; ties keep the earliest line.
pub fn prominent_line<'a>(first_page: &'a [Line], config: &HeuristicConfig) -> Option<&'a Line> {
    let mut best: Option<(&Line, f32)> = None;
    for line in first_page {
        if !is_title_like(&line.text, config) {
            continue;
        }
        let prominence =
            line.avg_font_size + if line.is_bold { config.title_bold_bonus } else { 0.0 };
        if best.is_none_or(|(_, p)| prominence > p) {
            best = Some((line, prominence));
        }
    }
    best.map(|(line, _)| line)
}

fn filename_title(stem: &str) -> Option<String> {
    let cleaned = collapse_whitespace(&stem.replace(['_', '-'], " "));
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Pick the document title: metadata, then first-page prominence, then the
/// file name, then [`DEFAULT_TITLE`]. Never empty.
pub fn select_title(
    metadata: &DocumentMetadata,
    first_page: &[Line],
    file_stem: Option<&str>,
    config: &HeuristicConfig,
) -> String {
    metadata_title(metadata, config)
        .or_else(|| prominent_line(first_page, config).map(|l| l.text.clone()))
        .or_else(|| file_stem.and_then(filename_title))
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::test_support::{bold_line_at, line_at};

    fn metadata(title: Option<&str>) -> DocumentMetadata {
        DocumentMetadata {
            title: title.map(str::to_string),
            ..DocumentMetadata::default()
        }
    }

    #[test]
    fn test_metadata_title_preferred() {
        let page = vec![bold_line_at("Annual Report", 100.0, 28.0)];
        let title = select_title(&metadata(Some(" Fiscal  Review ")), &page, None, &HeuristicConfig::default());
        assert_eq!(title, "Fiscal Review");
    }

    #[test]
    fn test_short_metadata_title_ignored() {
        let page = vec![bold_line_at("Annual Report", 100.0, 28.0)];
        let title = select_title(&metadata(Some("x")), &page, None, &HeuristicConfig::default());
        assert_eq!(title, "Annual Report");
    }

    #[test]
    fn test_most_prominent_line() {
        let page = vec![
            line_at("Prepared for the board", 60.0, 12.0),
            bold_line_at("Annual Report", 100.0, 28.0),
            line_at("Body text of the first page goes here", 160.0, 11.0),
        ];
        let title = select_title(&metadata(None), &page, None, &HeuristicConfig::default());
        assert_eq!(title, "Annual Report");
    }

    #[test]
    fn test_non_latin_title() {
        let page = vec![
            line_at("Εισαγωγή στο θέμα της μελέτης", 160.0, 12.0),
            line_at("Σύνοψη", 100.0, 24.0),
        ];
        let title = select_title(&metadata(Some("")), &page, None, &HeuristicConfig::default());
        assert_eq!(title, "Σύνοψη");
    }

    #[test]
    fn test_bold_bonus_breaks_near_ties() {
        let page = vec![
            line_at("Plain Larger", 100.0, 15.0),
            bold_line_at("Bold Smaller", 140.0, 14.0),
        ];
        let title = select_title(&metadata(None), &page, None, &HeuristicConfig::default());
        assert_eq!(title, "Bold Smaller");
    }

    #[test]
    fn test_denylisted_lines_skipped() {
        let page = vec![
            bold_line_at("Sample", 60.0, 30.0),
            bold_line_at("Page 1", 80.0, 30.0),
            line_at("Real Title", 120.0, 18.0),
        ];
        let title = select_title(&metadata(None), &page, None, &HeuristicConfig::default());
        assert_eq!(title, "Real Title");
    }

    #[test]
    fn test_filename_then_default() {
        let config = HeuristicConfig::default();
        assert_eq!(
            select_title(&metadata(None), &[], Some("quarterly_report-2024"), &config),
            "quarterly report 2024"
        );
        assert_eq!(select_title(&metadata(None), &[], Some("__"), &config), DEFAULT_TITLE);
        assert_eq!(select_title(&metadata(None), &[], None, &config), DEFAULT_TITLE);
    }
}
