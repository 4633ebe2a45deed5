//! Additive typography scoring against the document profile.
//!
//! | Signal                                  | Points |
//! |-----------------------------------------|--------|
//! | extremely large (>= p95)                | +5     |
//! | else very large (>= p90)                | +4     |
//! | else z-score > 1.5                      | +3     |
//! | else size > 1.2 x average               | +2     |
//! | bold                                    | +3     |
//! | italic, not bold                        | +1     |
//! | underline                               | +2     |
//! | font differs from the body font         | +1     |
//! | very short line and <= 8 words          | +2     |
//! | else short line and <= 12 words         | +1     |
//! | title case                              | +2     |
//! | ALL CAPS shorter than 50 chars          | +2     |
//! | starts with a digit                     | +1     |
//! | isolated, whitespace before, after      | +1 each|

use crate::classify::content::bare_word;
use crate::config::HeuristicConfig;
use crate::line::{Line, LineContext};
use crate::profile::DocumentTypographyProfile;
use crate::types::HeadingLevel;

const Z_SCORE_THRESHOLD: f32 = 1.5;
const RELATIVE_SIZE_FACTOR: f32 = 1.2;
const VERY_SHORT_FACTOR: f32 = 0.7;
const ALL_CAPS_MAX_CHARS: usize = 50;

const H1_SCORE: u32 = 8;
const H2_SCORE: u32 = 6;
const H3_SCORE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypographyScore {
    pub points: u32,
    pub very_large: bool,
    pub extremely_large: bool,
    pub bold: bool,
}

impl TypographyScore {
    pub fn level(&self) -> Option<HeadingLevel> {
        if self.points >= H1_SCORE {
            if self.extremely_large || (self.very_large && self.bold) {
                Some(HeadingLevel::H1)
            } else {
                Some(HeadingLevel::H2)
            }
        } else if self.points >= H2_SCORE {
            if self.very_large {
                Some(HeadingLevel::H2)
            } else {
                Some(HeadingLevel::H3)
            }
        } else if self.points >= H3_SCORE {
            Some(HeadingLevel::H3)
        } else {
            None
        }
    }
}

/// Every word that starts with a letter starts upper-case, and the text is
/// not entirely upper-case.
pub(crate) fn is_title_case(text: &str) -> bool {
    let mut saw_word = false;
    for word in text.split_whitespace() {
        if let Some(first) = word.chars().next() {
            if first.is_alphabetic() {
                if !first.is_uppercase() {
                    return false;
                }
                saw_word = true;
            }
        }
    }
    saw_word && !is_all_caps(text)
}

pub(crate) fn is_all_caps(text: &str) -> bool {
    let mut letters = text.chars().filter(|c| c.is_alphabetic()).peekable();
    letters.peek().is_some() && letters.all(|c| c.is_uppercase())
}

/// Share of words drawn from the filler vocabulary.
pub(crate) fn filler_ratio(text: &str, config: &HeuristicConfig) -> f32 {
    let words: Vec<String> = text.split_whitespace().map(bare_word).collect();
    if words.is_empty() {
        return 0.0;
    }
    let filler = words.iter().filter(|w| config.is_filler_word(w)).count();
    filler as f32 / words.len() as f32
}

/// Score `line`. Returns `None` when the line is rejected before scoring
/// (length bounds, filler-heavy prose).
pub fn score(
    line: &Line,
    context: &LineContext,
    profile: &DocumentTypographyProfile,
    config: &HeuristicConfig,
) -> Option<TypographyScore> {
    let text = line.text.as_str();
    let chars = line.char_count();
    if chars < config.min_heading_chars || chars > config.typography_max_chars {
        return None;
    }

    let words = line.word_count();
    if words > 3 && filler_ratio(text, config) > config.filler_ratio_limit {
        return None;
    }

    let size = line.avg_font_size;
    let pct = &profile.size_percentiles;
    let above_median = size > pct.p50;
    let extremely_large = above_median && size >= pct.p95;
    let very_large = above_median && size >= pct.p90;

    let mut points = 0;

    points += if extremely_large {
        5
    } else if very_large {
        4
    } else if profile.z_score(size) > Z_SCORE_THRESHOLD {
        3
    } else if size > profile.avg_size * RELATIVE_SIZE_FACTOR {
        2
    } else {
        0
    };

    if line.is_bold {
        points += 3;
    }
    if line.is_italic && !line.is_bold {
        points += 1;
    }
    if line.is_underline {
        points += 2;
    }

    if !profile.common_font.is_empty() && line.dominant_font() != profile.common_font {
        points += 1;
    }

    let short = profile.short_line_threshold as f32;
    if (chars as f32) < short * VERY_SHORT_FACTOR && words <= 8 {
        points += 2;
    } else if (chars as f32) < short && words <= 12 {
        points += 1;
    }

    if is_title_case(text) {
        points += 2;
    }
    if chars > 3 && chars < ALL_CAPS_MAX_CHARS && is_all_caps(text) {
        points += 2;
    }
    if text.starts_with(|c: char| c.is_ascii_digit()) {
        points += 1;
    }

    points += [
        context.is_isolated,
        context.whitespace_before,
        context.whitespace_after,
    ]
    .iter()
    .filter(|flag| **flag)
    .count() as u32;

    Some(TypographyScore {
        points,
        very_large,
        extremely_large,
        bold: line.is_bold,
    })
}

pub fn classify(
    line: &Line,
    context: &LineContext,
    profile: &DocumentTypographyProfile,
    config: &HeuristicConfig,
) -> Option<HeadingLevel> {
    score(line, context, profile, config).and_then(|s| s.level())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::test_support::{bold_line_at, line_at};
    use crate::profile::build_profile;

    fn body_profile() -> DocumentTypographyProfile {
        let lines: Vec<_> = (0..40)
            .map(|i| {
                line_at(
                    "Ordinary body copy that runs most of the way across the page",
                    100.0 + i as f32 * 14.0,
                    11.0,
                )
            })
            .collect();
        build_profile(&lines)
    }

    fn quiet_context() -> LineContext {
        LineContext {
            prev_len: 60,
            next_len: 60,
            ..LineContext::default()
        }
    }

    #[test]
    fn test_large_bold_line_is_h1() {
        let mut lines: Vec<_> = (0..40)
            .map(|i| line_at("Ordinary body copy of the report", 150.0 + i as f32 * 14.0, 11.0))
            .collect();
        let title = bold_line_at("Annual Report", 100.0, 28.0);
        lines.push(title.clone());
        let profile = build_profile(&lines);

        let context = LineContext {
            is_isolated: true,
            whitespace_before: true,
            whitespace_after: true,
            ..LineContext::default()
        };
        let s = score(&title, &context, &profile, &HeuristicConfig::default()).unwrap();
        assert!(s.extremely_large);
        assert!(s.points >= 8);
        assert_eq!(s.level(), Some(HeadingLevel::H1));
    }

    #[test]
    fn test_body_line_is_not_heading() {
        let profile = body_profile();
        let line = line_at(
            "Ordinary body copy that runs most of the way across the page",
            300.0,
            11.0,
        );
        let config = HeuristicConfig::default();
        assert_eq!(classify(&line, &quiet_context(), &profile, &config), None);
    }

    #[test]
    fn test_single_size_document_has_no_large_flags() {
        let profile = body_profile();
        let line = line_at("Short Line", 300.0, 11.0);
        let s = score(&line, &quiet_context(), &profile, &HeuristicConfig::default()).unwrap();
        assert!(!s.very_large);
        assert!(!s.extremely_large);
    }

    #[test]
    fn test_bold_title_case_is_h3() {
        let profile = body_profile();
        // bold 3 + very short 2 + title case 2, no size signal.
        let mut line = bold_line_at("Data Sources", 300.0, 11.0);
        line.spans[0].font_name = "Body".to_string();
        let s = score(&line, &quiet_context(), &profile, &HeuristicConfig::default()).unwrap();
        assert_eq!(s.points, 7);
        assert_eq!(s.level(), Some(HeadingLevel::H3));
    }

    #[test]
    fn test_filler_heavy_text_rejected() {
        let profile = body_profile();
        let line = bold_line_at("This is the end of the story", 300.0, 20.0);
        assert_eq!(
            score(&line, &quiet_context(), &profile, &HeuristicConfig::default()),
            None
        );
    }

    #[test]
    fn test_over_long_line_rejected() {
        let profile = body_profile();
        let line = bold_line_at(&"Word ".repeat(40), 300.0, 20.0);
        assert_eq!(
            score(&line, &quiet_context(), &profile, &HeuristicConfig::default()),
            None
        );
    }

    #[test]
    fn test_level_mapping() {
        let s = |points, very_large, extremely_large, bold| TypographyScore {
            points,
            very_large,
            extremely_large,
            bold,
        };
        assert_eq!(s(9, true, false, true).level(), Some(HeadingLevel::H1));
        assert_eq!(s(9, true, false, false).level(), Some(HeadingLevel::H2));
        assert_eq!(s(7, true, false, false).level(), Some(HeadingLevel::H2));
        assert_eq!(s(6, false, false, true).level(), Some(HeadingLevel::H3));
        assert_eq!(s(4, false, false, false).level(), Some(HeadingLevel::H3));
        assert_eq!(s(3, true, true, true).level(), None);
    }

    #[test]
    fn test_case_helpers() {
        assert!(is_title_case("Results Of The Study"));
        assert!(is_title_case("2. Results"));
        assert!(!is_title_case("Results of the study"));
        assert!(!is_title_case("RESULTS"));
        assert!(is_all_caps("RESULTS 2024"));
        assert!(!is_all_caps("2024"));
    }
}
