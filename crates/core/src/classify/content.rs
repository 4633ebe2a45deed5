//! Structural-vocabulary matching.

use crate::config::HeuristicConfig;
use crate::types::HeadingLevel;

/// Lower-case `word` and strip surrounding punctuation.
pub(crate) fn bare_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

/// Returns `Some(H2)` when a short line contains a structural section word
/// such as "methodology" or "results".
pub fn classify(text: &str, config: &HeuristicConfig) -> Option<HeadingLevel> {
    let chars = text.chars().count();
    if chars < config.min_heading_chars || chars > config.max_heading_chars {
        return None;
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() || words.len() > config.content_max_words {
        return None;
    }

    words
        .iter()
        .any(|w| config.is_structural_word(&bare_word(w)))
        .then_some(HeadingLevel::H2)
}
