//! Per-line heading strategies and the aggregator that applies them.
//!
//! Strategies run in confidence order and the first one that answers wins:
//!
//! ```text
//! pattern (3.0) -> content (2.0) -> typography (1.0) -> position (0.5)
//! ```
//!
//! This is a precedence rule, not a vote: once a strategy classifies a line
//! the lower ones never see it.

pub mod content;
pub mod pattern;
pub mod position;
pub mod typography;

use crate::config::HeuristicConfig;
use crate::language::Language;
use crate::line::{Line, LineContext};
use crate::profile::DocumentTypographyProfile;
use crate::types::{DetectionSource, HeadingLevel};

use pattern::{Heuristics, PatternMatcher};

/// Outcome of classifying one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub level: HeadingLevel,
    pub source: DetectionSource,
}

impl Classification {
    fn new(level: HeadingLevel, source: DetectionSource) -> Self {
        Classification { level, source }
    }

    pub fn confidence(&self) -> f32 {
        self.source.confidence()
    }
}

/// Everything the strategies need for one document.
#[derive(Debug, Clone)]
pub struct Classifier<'a> {
    config: &'a HeuristicConfig,
    profile: &'a DocumentTypographyProfile,
    matcher: PatternMatcher<'a>,
}

impl<'a> Classifier<'a> {
    pub fn new(
        heuristics: &'a Heuristics,
        profile: &'a DocumentTypographyProfile,
        language: Language,
    ) -> Self {
        Classifier {
            config: heuristics.config(),
            profile,
            matcher: heuristics.matcher(language),
        }
    }

    pub fn classify(&self, line: &Line, context: &LineContext) -> Option<Classification> {
        let text = line.text.as_str();

        if let Some(tag) = self.matcher.match_text(text) {
            return Some(Classification::new(
                tag.heading_level(),
                DetectionSource::Pattern,
            ));
        }
        if let Some(level) = content::classify(text, self.config) {
            return Some(Classification::new(level, DetectionSource::Content));
        }
        if let Some(level) = typography::classify(line, context, self.profile, self.config) {
            return Some(Classification::new(level, DetectionSource::Typography));
        }
        position::classify(line, context, self.config)
            .map(|level| Classification::new(level, DetectionSource::Position))
    }
}
