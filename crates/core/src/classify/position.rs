//! Spatial-isolation fallback.

use crate::config::HeuristicConfig;
use crate::line::{Line, LineContext};
use crate::types::HeadingLevel;

/// Lines with fewer neighbours than this inside the positional band count as
/// set apart.
const MAX_SIBLINGS: usize = 2;

pub fn classify(line: &Line, context: &LineContext, config: &HeuristicConfig) -> Option<HeadingLevel> {
    let chars = line.char_count();
    let isolated = context.nearby_siblings < MAX_SIBLINGS
        && line.word_count() <= config.position_max_words
        && chars >= config.min_heading_chars
        && chars <= config.position_max_chars;

    isolated.then_some(HeadingLevel::H3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::test_support::line_at;

    #[test]
    fn test_isolated_short_line() {
        let line = line_at("Key Findings", 200.0, 11.0);
        let context = LineContext {
            nearby_siblings: 1,
            ..LineContext::default()
        };
        assert_eq!(
            classify(&line, &context, &HeuristicConfig::default()),
            Some(HeadingLevel::H3)
        );
    }

    #[test]
    fn test_crowded_line() {
        let line = line_at("Key Findings", 200.0, 11.0);
        let context = LineContext {
            nearby_siblings: 2,
            ..LineContext::default()
        };
        assert_eq!(classify(&line, &context, &HeuristicConfig::default()), None);
    }

    #[test]
    fn test_wordy_line() {
        let line = line_at(
            "one two three four five six seven eight nine ten eleven",
            200.0,
            11.0,
        );
        assert_eq!(
            classify(&line, &LineContext::default(), &HeuristicConfig::default()),
            None
        );
    }
}
