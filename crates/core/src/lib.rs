//! Core library for outliner
//!
//! This crate implements the **Functional Core** of the outliner application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The outliner project splits its work across three crates:
//!
//! - **`outline_core`** (this crate): the heading-classification pipeline, pure and I/O free
//! - **`pdf_layout`**: the text-layout provider that turns PDF bytes into positioned spans
//! - **`outliner`**: file system access, batch orchestration and logging (the Imperative Shell)
//!
//! ## Functional Core Principles
//!
//! - **Pure functions**: the same [`DocumentLayout`] and [`HeuristicConfig`] always
//!   produce the same [`DocumentOutline`]
//! - **No side effects**: nothing in here reads files, logs or spawns threads
//! - **Testable**: every classifier is exercised with synthetic lines, no PDF required
//!
//! # Pipeline
//!
//! ```text
//! DocumentLayout
//!   |-- profile::build_profile      (sampled page prefix)
//!   |-- language::detect_language   (sampled page prefix)
//!   |
//!   |-- per line: classify::Classifier::classify
//!   |       pattern -> content -> typography -> position   (first hit wins)
//!   |
//!   |-- filter::check
//!   |-- rank::rank_candidates
//!   |-- rank::merge_toc             (only when content is sparse)
//!   `-- title::select_title
//! ```
//!
//! # Module Organization
//!
//! - [`types`]: layout input types and the outline output contract
//! - [`config`]: the heuristic tables, overridable from TOML
//! - [`line`]: span grouping, text normalisation and line context
//! - [`profile`]: document typography statistics
//! - [`language`]: indicator-token language detection
//! - [`classify`]: the four per-line strategies and their aggregator
//! - [`filter`]: rejection predicates for non-heading text
//! - [`rank`]: deduplication, truncation and TOC backup
//! - [`title`]: title selection
//! - [`pipeline`]: ties the above together
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use outline_core::{extract_outline, HeuristicConfig, Heuristics};
//!
//! let heuristics = Heuristics::compile(HeuristicConfig::default())?;
//! let outline = extract_outline(&layout, &heuristics, Some("annual_report"));
//! println!("{}", outline.to_json_pretty()?);
//! ```

pub mod classify;
pub mod config;
pub mod filter;
pub mod language;
pub mod line;
pub mod pipeline;
pub mod profile;
pub mod rank;
pub mod title;
pub mod types;

pub use classify::pattern::Heuristics;
pub use config::HeuristicConfig;
pub use language::Language;
pub use pipeline::{analyze, extract_outline, Analysis};
pub use profile::DocumentTypographyProfile;
pub use types::{
    BBox, DocumentLayout, DocumentMetadata, DocumentOutline, HeadingCandidate, HeadingLevel,
    OutlineEntry, PageLayout, TextSpan, TocEntry,
};

/// Errors raised while preparing the heuristics. Classification itself is
/// infallible.
#[derive(Debug, thiserror::Error)]
pub enum OutlineError {
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid heuristics configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse heuristics file: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
