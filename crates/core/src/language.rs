//! Dominant-language detection over an early-page text sample.
//!
//! The result only decides which extra pattern rules are appended to the
//! base list; it never suppresses detection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::HeuristicConfig;
use crate::line::Line;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Chinese,
    Spanish,
    French,
    German,
    Japanese,
    Arabic,
    Russian,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::English => "english",
            Language::Chinese => "chinese",
            Language::Spanish => "spanish",
            Language::French => "french",
            Language::German => "german",
            Language::Japanese => "japanese",
            Language::Arabic => "arabic",
            Language::Russian => "russian",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of language detection, with the winning score for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageGuess {
    pub language: Language,
    pub score: usize,
}

/// Build the lower-cased detection sample: the first `language_sample_chars`
/// characters of each of the first `language_sample_pages` pages.
pub fn language_sample(pages: &[Vec<Line>], config: &HeuristicConfig) -> String {
    let mut sample = String::new();
    for lines in pages.iter().take(config.language_sample_pages) {
        let page_text = lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        sample.extend(page_text.chars().take(config.language_sample_chars));
        sample.push('\n');
    }
    sample.to_lowercase()
}

/// Score every configured language by how many of its indicator tokens occur
/// in `sample` and return the best one.
///
/// Ties go to the language listed first in the configuration table. When no
/// language scores, the base language is returned with a score of zero.
pub fn detect_language(sample: &str, config: &HeuristicConfig) -> LanguageGuess {
    let mut best = LanguageGuess {
        language: Language::default(),
        score: 0,
    };

    for profile in &config.languages {
        let score = profile
            .indicators
            .iter()
            .filter(|token| !token.is_empty() && sample.contains(token.as_str()))
            .count();
        if score > best.score {
            best = LanguageGuess {
                language: profile.language,
                score,
            };
        }
    }

    best
}
