//! Deduplication, ranking and the bookmark backup.

use std::collections::HashSet;

use crate::config::HeuristicConfig;
use crate::line::collapse_whitespace;
use crate::types::{HeadingCandidate, HeadingLevel, OutlineEntry, TocEntry};

/// Text of the entry emitted when nothing survives the pipeline.
pub const PLACEHOLDER_TEXT: &str = "Document Content";

/// Deduplication key: lower-cased, whitespace-collapsed text plus page.
pub fn dedup_key(text: &str, page: usize) -> (String, usize) {
    (collapse_whitespace(text).to_lowercase(), page)
}

/// Rank candidates by `(confidence desc, page asc, y asc)`, drop repeated
/// keys keeping the best-ranked one, keep at most `max_entries`, and return
/// the survivors in reading order.
pub fn rank_candidates(
    mut candidates: Vec<HeadingCandidate>,
    max_entries: usize,
) -> Vec<HeadingCandidate> {
    candidates.sort_by(|a, b| {
        b.confidence()
            .total_cmp(&a.confidence())
            .then(a.page.cmp(&b.page))
            .then(a.source_y.total_cmp(&b.source_y))
    });

    let mut seen = HashSet::new();
    candidates.retain(|c| seen.insert(dedup_key(&c.text, c.page)));
    candidates.truncate(max_entries);

    candidates.sort_by(|a, b| a.page.cmp(&b.page).then(a.source_y.total_cmp(&b.source_y)));
    candidates
}

/// Append bookmark entries when the content outline is sparse.
///
/// Content entries keep priority: bookmarks only fill in when fewer than
/// `toc_fallback_threshold` headings were found, never replace them, and are
/// subject to the same deduplication and size cap. Takes the ranked
/// candidates so bookmarks can be placed among them by destination.
pub fn merge_toc(
    ranked: Vec<HeadingCandidate>,
    toc: &[TocEntry],
    config: &HeuristicConfig,
) -> Vec<OutlineEntry> {
    if ranked.len() >= config.toc_fallback_threshold || toc.is_empty() {
        return ranked.into_iter().map(OutlineEntry::from).collect();
    }

    let mut seen: HashSet<_> = ranked.iter().map(|c| dedup_key(&c.text, c.page)).collect();
    let mut positioned: Vec<(f32, OutlineEntry)> = ranked
        .into_iter()
        .map(|c| (c.source_y, OutlineEntry::from(c)))
        .collect();

    for entry in toc {
        let text = collapse_whitespace(&entry.title);
        if text.is_empty() {
            continue;
        }
        let page = entry.page.max(1);
        if seen.insert(dedup_key(&text, page)) {
            let entry_y = entry.top.unwrap_or(f32::NEG_INFINITY);
            positioned.push((
                entry_y,
                OutlineEntry {
                    level: HeadingLevel::from_depth(entry.depth),
                    text,
                    page,
                },
            ));
        }
    }

    positioned.sort_by(|a, b| a.1.page.cmp(&b.1.page).then(a.0.total_cmp(&b.0)));
    positioned
        .into_iter()
        .map(|(_, entry)| entry)
        .take(config.max_outline_entries)
        .collect()
}

pub fn placeholder() -> OutlineEntry {
    OutlineEntry {
        level: HeadingLevel::H1,
        text: PLACEHOLDER_TEXT.to_string(),
        page: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DetectionSource;

    fn candidate(text: &str, page: usize, y: f32, source: DetectionSource) -> HeadingCandidate {
        HeadingCandidate {
            text: text.to_string(),
            page,
            level: HeadingLevel::H2,
            source,
            source_y: y,
        }
    }

    #[test]
    fn test_repeated_header_collapses() {
        let ranked = rank_candidates(
            vec![
                candidate("Introduction", 3, 40.0, DetectionSource::Pattern),
                candidate("introduction ", 3, 700.0, DetectionSource::Pattern),
            ],
            50,
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].source_y, 40.0);
    }

    #[test]
    fn test_dedup_keeps_highest_confidence() {
        let ranked = rank_candidates(
            vec![
                candidate("Results", 2, 100.0, DetectionSource::Position),
                candidate("Results", 2, 300.0, DetectionSource::Content),
            ],
            50,
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].source, DetectionSource::Content);
    }

    #[test]
    fn test_same_text_on_different_pages_kept() {
        let ranked = rank_candidates(
            vec![
                candidate("Summary", 1, 100.0, DetectionSource::Pattern),
                candidate("Summary", 4, 100.0, DetectionSource::Pattern),
            ],
            50,
        );
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_truncation_keeps_strongest_then_reading_order() {
        let ranked = rank_candidates(
            vec![
                candidate("Weak One", 1, 10.0, DetectionSource::Position),
                candidate("Strong Late", 5, 10.0, DetectionSource::Pattern),
                candidate("Middle", 3, 50.0, DetectionSource::Typography),
                candidate("Strong Early", 2, 90.0, DetectionSource::Pattern),
            ],
            3,
        );
        let texts: Vec<_> = ranked.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["Strong Early", "Middle", "Strong Late"]);
    }

    #[test]
    fn test_bounded_size() {
        let many: Vec<_> = (0..200)
            .map(|i| candidate(&format!("Heading {i}"), i / 10 + 1, i as f32, DetectionSource::Typography))
            .collect();
        assert_eq!(rank_candidates(many, 50).len(), 50);
    }

    fn bookmark(depth: usize, title: &str, page: usize, top: Option<f32>) -> TocEntry {
        TocEntry {
            depth,
            title: title.to_string(),
            page,
            top,
        }
    }

    #[test]
    fn test_merge_toc_only_when_sparse() {
        let config = HeuristicConfig::default();
        let toc = vec![
            bookmark(1, "Preface", 1, None),
            bookmark(2, "Scope  of Work", 4, None),
            bookmark(3, "Budget", 2, None),
        ];
        let sparse = vec![candidate("Preface", 1, 80.0, DetectionSource::Pattern)];

        let merged = merge_toc(sparse, &toc, &config);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[1].text, "Budget");
        assert_eq!(merged[1].level, HeadingLevel::H3);
        assert_eq!(merged[2].text, "Scope of Work");
        assert_eq!(merged[2].level, HeadingLevel::H2);

        let rich: Vec<_> = (1..=3)
            .map(|p| candidate(&format!("Part {p}"), p, 80.0, DetectionSource::Pattern))
            .collect();
        let expected: Vec<OutlineEntry> = rich.iter().cloned().map(OutlineEntry::from).collect();
        assert_eq!(merge_toc(rich, &toc, &config), expected);
    }

    #[test]
    fn test_merge_toc_follows_reading_order_within_page() {
        let config = HeuristicConfig::default();
        let content = vec![
            candidate("Findings", 2, 300.0, DetectionSource::Content),
            candidate("Appendix Notes", 2, 600.0, DetectionSource::Typography),
        ];
        let toc = vec![
            bookmark(1, "Overview", 2, None),
            bookmark(2, "Method", 2, Some(450.0)),
        ];

        let merged = merge_toc(content, &toc, &config);
        let texts: Vec<_> = merged.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["Overview", "Findings", "Method", "Appendix Notes"]);
    }

    #[test]
    fn test_placeholder() {
        let entry = placeholder();
        assert_eq!(entry.level, HeadingLevel::H1);
        assert_eq!(entry.text, "Document Content");
        assert_eq!(entry.page, 1);
    }
}
