//! Rejection predicates applied to every candidate heading text.
//!
//! Each predicate is independent; the first that fires names the
//! [`Rejection`]. A text that passes all of them is a proper heading.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::classify::content::bare_word;
use crate::config::HeuristicConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    TooShort,
    TooLong,
    LowercaseStart,
    BulletMarker,
    ListItem,
    TableRow,
    NoAlphanumeric,
    DigitsOnly,
    Continuation,
    Question,
    FillerOnly,
    BoilerplateWord,
    Url,
    Fragment,
    DashEdge,
    BoilerplatePhrase,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejection::TooShort => "shorter than the minimum heading length",
            Rejection::TooLong => "longer than the maximum heading length",
            Rejection::LowercaseStart => "starts with a lower-case letter",
            Rejection::BulletMarker => "starts with a bullet marker",
            Rejection::ListItem => "numbered list item",
            Rejection::TableRow => "contains a table separator",
            Rejection::NoAlphanumeric => "no alphanumeric characters",
            Rejection::DigitsOnly => "only digits",
            Rejection::Continuation => "ends like a sentence continuation",
            Rejection::Question => "ends with a question mark",
            Rejection::FillerOnly => "only common filler words",
            Rejection::BoilerplateWord => "single boilerplate word",
            Rejection::Url => "URL or code-hosting link",
            Rejection::Fragment => "short fragment",
            Rejection::DashEdge => "starts or ends with a dash",
            Rejection::BoilerplatePhrase => "known boilerplate phrase",
        };
        write!(f, "{}", reason)
    }
}

fn list_item_regex() -> &'static Regex {
    static RE_LIST_ITEM: OnceLock<Regex> = OnceLock::new();
    RE_LIST_ITEM.get_or_init(|| {
        Regex::new(r"^\(?(?:\d+|[A-Za-z]|[ivxlc]+)[.)]\s*\p{Ll}").unwrap()
    })
}

fn starts_with_lowercase(text: &str) -> bool {
    text.chars()
        .find(|c| c.is_alphabetic())
        .is_some_and(|c| c.is_lowercase())
}

/// Run every predicate against `text`.
pub fn check(text: &str, config: &HeuristicConfig) -> Result<(), Rejection> {
    let text = text.trim();
    let chars = text.chars().count();
    let lower = text.to_lowercase();
    let words: Vec<String> = text.split_whitespace().map(bare_word).collect();

    if chars < config.min_heading_chars {
        return Err(Rejection::TooShort);
    }
    if chars > config.max_heading_chars {
        return Err(Rejection::TooLong);
    }
    if config
        .bullet_markers
        .iter()
        .any(|m| !m.is_empty() && text.starts_with(m.as_str()))
    {
        return Err(Rejection::BulletMarker);
    }
    if list_item_regex().is_match(text) {
        return Err(Rejection::ListItem);
    }
    if text.contains('|') || text.contains('\t') {
        return Err(Rejection::TableRow);
    }
    if !text.chars().any(char::is_alphanumeric) {
        return Err(Rejection::NoAlphanumeric);
    }
    if !text.chars().any(char::is_alphabetic) {
        return Err(Rejection::DigitsOnly);
    }
    if config.url_prefixes.iter().any(|p| lower.starts_with(p.as_str()))
        || config.code_hosts.iter().any(|h| lower.contains(h.as_str()))
    {
        return Err(Rejection::Url);
    }
    if starts_with_lowercase(text) {
        return Err(Rejection::LowercaseStart);
    }
    if text.ends_with([',', '\u{2014}', '\u{2026}']) || text.ends_with("...") {
        return Err(Rejection::Continuation);
    }
    if text.ends_with('?') {
        return Err(Rejection::Question);
    }
    if words.len() <= 3 && words.iter().all(|w| config.is_filler_word(w)) {
        return Err(Rejection::FillerOnly);
    }
    if words.len() == 1 && config.boilerplate_words.iter().any(|w| *w == words[0]) {
        return Err(Rejection::BoilerplateWord);
    }
    if (text.ends_with(':') || text.ends_with(')') || text.ends_with('.'))
        && chars < config.fragment_min_chars
    {
        return Err(Rejection::Fragment);
    }
    const DASHES: [char; 3] = ['-', '\u{2013}', '\u{2014}'];
    if text.starts_with(DASHES) || text.ends_with(DASHES) {
        return Err(Rejection::DashEdge);
    }
    if config
        .boilerplate_phrases
        .iter()
        .any(|p| lower.contains(p.as_str()))
    {
        return Err(Rejection::BoilerplatePhrase);
    }

    Ok(())
}

pub fn is_proper_heading(text: &str, config: &HeuristicConfig) -> bool {
    check(text, config).is_ok()
}

/// Lines that look like list entries or table rows. Used to stop a heading
/// from absorbing the line after it.
pub fn is_list_or_table_line(text: &str, config: &HeuristicConfig) -> bool {
    let text = text.trim();
    config
        .bullet_markers
        .iter()
        .any(|m| !m.is_empty() && text.starts_with(m.as_str()))
        || list_item_regex().is_match(text)
        || (text.starts_with(|c: char| c.is_ascii_digit()) && text.contains(". "))
        || text.contains('|')
        || text.contains('\t')
}
