//! Regex rule matching, the highest-confidence strategy.
//!
//! All expressions are compiled once by [`Heuristics::compile`]; a bad
//! pattern is reported there and never during classification.

use regex::Regex;

use crate::config::{HeuristicConfig, PatternRule};
use crate::language::Language;
use crate::types::SemanticTag;
use crate::OutlineError;

#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub regex: Regex,
    pub tag: SemanticTag,
}

impl CompiledRule {
    fn compile(rule: &PatternRule) -> Result<Self, OutlineError> {
        let regex = Regex::new(&rule.pattern).map_err(|source| OutlineError::InvalidPattern {
            pattern: rule.pattern.clone(),
            source,
        })?;
        Ok(CompiledRule {
            regex,
            tag: rule.tag,
        })
    }
}

fn compile_all(rules: &[PatternRule]) -> Result<Vec<CompiledRule>, OutlineError> {
    rules.iter().map(CompiledRule::compile).collect()
}

/// A validated [`HeuristicConfig`] together with its compiled pattern
/// tables. Build once at start-up and share it across documents.
#[derive(Debug, Clone)]
pub struct Heuristics {
    config: HeuristicConfig,
    base_rules: Vec<CompiledRule>,
    language_rules: Vec<(Language, Vec<CompiledRule>)>,
}

impl Heuristics {
    pub fn compile(config: HeuristicConfig) -> Result<Self, OutlineError> {
        config.validate()?;

        let base_rules = compile_all(&config.base_rules)?;
        let language_rules = config
            .languages
            .iter()
            .map(|profile| Ok((profile.language, compile_all(&profile.rules)?)))
            .collect::<Result<Vec<_>, OutlineError>>()?;

        Ok(Heuristics {
            config,
            base_rules,
            language_rules,
        })
    }

    pub fn config(&self) -> &HeuristicConfig {
        &self.config
    }

    /// Matcher over the base rules followed by the rules of `language`.
    pub fn matcher(&self, language: Language) -> PatternMatcher<'_> {
        let extra = self
            .language_rules
            .iter()
            .filter(|(lang, _)| *lang == language)
            .flat_map(|(_, rules)| rules.iter());

        PatternMatcher {
            rules: self.base_rules.iter().chain(extra).collect(),
            max_chars: self.config.pattern_max_chars,
        }
    }
}

/// Ordered rule list for one document. First match wins.
#[derive(Debug, Clone)]
pub struct PatternMatcher<'a> {
    rules: Vec<&'a CompiledRule>,
    max_chars: usize,
}

impl PatternMatcher<'_> {
    pub fn match_text(&self, text: &str) -> Option<SemanticTag> {
        if text.chars().count() > self.max_chars {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| rule.regex.is_match(text))
            .map(|rule| rule.tag)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HeadingLevel;

    fn heuristics() -> Heuristics {
        Heuristics::compile(HeuristicConfig::default()).unwrap()
    }

    fn level_of(text: &str) -> Option<HeadingLevel> {
        heuristics()
            .matcher(Language::English)
            .match_text(text)
            .map(SemanticTag::heading_level)
    }

    #[test]
    fn test_chapter_rule() {
        assert_eq!(level_of("Chapter 1: Overview"), Some(HeadingLevel::H1));
        assert_eq!(level_of("CHAPTER IV"), Some(HeadingLevel::H1));
    }

    #[test]
    fn test_numbered_sections() {
        assert_eq!(level_of("1. Introduction to Systems"), Some(HeadingLevel::H1));
        assert_eq!(level_of("2.3 Data Collection"), Some(HeadingLevel::H2));
        assert_eq!(level_of("2.3.1 Survey Design"), Some(HeadingLevel::H3));
        assert_eq!(level_of("IV. Results"), Some(HeadingLevel::H1));
        assert_eq!(level_of("B. Related Work"), Some(HeadingLevel::H2));
    }

    #[test]
    fn test_part_maps_to_h2() {
        assert_eq!(level_of("Part 2 Implementation"), Some(HeadingLevel::H2));
    }

    #[test]
    fn test_indicator_words_and_caps() {
        assert_eq!(level_of("References"), Some(HeadingLevel::H1));
        assert_eq!(level_of("Appendix A: Tables"), Some(HeadingLevel::H1));
        assert_eq!(level_of("TABLE OF CONTENTS"), Some(HeadingLevel::H2));
    }

    #[test]
    fn test_body_text_does_not_match() {
        assert_eq!(level_of("the quick brown fox jumps"), None);
        assert_eq!(level_of("1. the first item of a list"), None);
        assert_eq!(level_of("Introduction to the topic continues here"), None);
    }

    #[test]
    fn test_over_long_text_skipped() {
        let long = format!("Chapter 1 {}", "x".repeat(300));
        assert_eq!(level_of(&long), None);
    }

    #[test]
    fn test_language_rules_appended_after_base() {
        let h = heuristics();
        let base = h.matcher(Language::English);
        let chinese = h.matcher(Language::Chinese);
        assert!(chinese.len() > base.len());
        assert_eq!(base.match_text("第三章 方法"), None);
        assert_eq!(chinese.match_text("第三章 方法"), Some(SemanticTag::Chapter));
        // Base rules still take precedence.
        assert_eq!(chinese.match_text("2.3 Data Collection"), Some(SemanticTag::Section));
    }

    #[test]
    fn test_invalid_pattern_reported_at_compile() {
        let config = HeuristicConfig {
            base_rules: vec![PatternRule::new("^(unclosed", SemanticTag::Chapter)],
            ..HeuristicConfig::default()
        };
        match Heuristics::compile(config) {
            Err(OutlineError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "^(unclosed"),
            other => panic!("expected InvalidPattern, got {:?}", other.map(|_| ())),
        }
    }
}
