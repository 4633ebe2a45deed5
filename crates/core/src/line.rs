//! Span -> line assembly and per-line neighbourhood context.
//!
//! ```text
//! TextSpan[] (one page)  ->  Line[]  ->  LineContext[]
//!                      group_spans_into_lines   page_contexts
//! ```

use std::collections::HashMap;

use unicode_normalization::UnicodeNormalization;

use crate::types::{BBox, TextSpan};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Two spans whose baselines differ by at most this many points share a line.
const BASELINE_TOLERANCE: f32 = 1.0;

/// Minimum horizontal gap (in points) between adjacent spans before a space
/// is inserted between their texts.
const MIN_WORD_GAP: f32 = 1.5;

/// A vertical gap larger than this multiple of the line height counts as
/// whitespace around the line.
const WHITESPACE_GAP_FACTOR: f32 = 1.5;

/// Neighbouring lines shorter than this many characters do not break
/// isolation.
const SHORT_NEIGHBOUR_CHARS: usize = 20;

// ---------------------------------------------------------------------------
// Line
// ---------------------------------------------------------------------------

/// A reading-order group of spans sharing a baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub spans: Vec<TextSpan>,
    /// Normalised, whitespace-collapsed text of all spans.
    pub text: String,
    /// Unweighted mean of the span font sizes.
    pub avg_font_size: f32,
    pub is_bold: bool,
    pub is_italic: bool,
    pub is_underline: bool,
    pub bbox: BBox,
    /// 0-based page index.
    pub page_index: usize,
}

impl Line {
    /// Build a line from spans already known to share a baseline. Spans are
    /// re-ordered left-to-right.
    pub fn from_spans(mut spans: Vec<TextSpan>, page_index: usize) -> Self {
        spans.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));

        let text = normalize_text(&join_span_text(&spans));
        let avg_font_size = if spans.is_empty() {
            0.0
        } else {
            spans.iter().map(|s| s.font_size).sum::<f32>() / spans.len() as f32
        };
        let bbox = spans
            .iter()
            .map(|s| s.bbox)
            .reduce(|acc, b| acc.union(&b))
            .unwrap_or_default();

        Line {
            is_bold: spans.iter().any(|s| s.bold),
            is_italic: spans.iter().any(|s| s.italic),
            is_underline: spans.iter().any(|s| s.underline),
            text,
            avg_font_size,
            bbox,
            page_index,
            spans,
        }
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Font name covering the most characters of this line.
    pub fn dominant_font(&self) -> &str {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for span in &self.spans {
            *counts.entry(span.font_name.as_str()).or_insert(0) += span.text.chars().count();
        }
        counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(a.0)))
            .map(|(name, _)| name)
            .unwrap_or("")
    }

    /// Line height, never smaller than the average font size.
    pub fn height(&self) -> f32 {
        self.bbox.height().max(self.avg_font_size)
    }
}

/// Concatenate span texts, inserting a space where the horizontal gap between
/// spans indicates a word boundary.
fn join_span_text(spans: &[TextSpan]) -> String {
    let mut out = String::new();
    let mut prev: Option<&TextSpan> = None;

    for span in spans {
        if let Some(p) = prev {
            let gap = span.bbox.x0 - p.bbox.x1;
            let already_spaced = out.ends_with(char::is_whitespace)
                || span.text.starts_with(char::is_whitespace);
            if gap > MIN_WORD_GAP && !already_spaced && !boundary_is_spaceless(&out, &span.text) {
                out.push(' ');
            }
        }
        out.push_str(&span.text);
        prev = Some(span);
    }

    out
}

fn boundary_is_spaceless(left: &str, right: &str) -> bool {
    match (left.chars().next_back(), right.chars().next()) {
        (Some(l), Some(r)) => is_spaceless_script_char(l) && is_spaceless_script_char(r),
        _ => false,
    }
}

/// Returns `true` if `c` belongs to a script written without inter-word
/// spaces (CJK ideographs, kana, Hangul, Thai and neighbours).
pub fn is_spaceless_script_char(c: char) -> bool {
    matches!(
        c as u32,
        0x4E00..=0x9FFF
            | 0x3400..=0x4DBF
            | 0x20000..=0x2A6DF
            | 0xF900..=0xFAFF
            | 0x3040..=0x309F
            | 0x30A0..=0x30FF
            | 0x31F0..=0x31FF
            | 0xAC00..=0xD7AF
            | 0x1100..=0x11FF
            | 0x3130..=0x318F
            | 0x3000..=0x303F
            | 0xFF00..=0xFFEF
            | 0x0E00..=0x0EFF
            | 0x1000..=0x109F
            | 0x1780..=0x17FF
            | 0x0F00..=0x0FFF
    )
}

/// NFC-normalise, expand ligatures, drop replacement characters and collapse
/// whitespace.
pub fn normalize_text(text: &str) -> String {
    let composed: String = text.nfc().collect();
    let mut expanded = String::with_capacity(composed.len());
    for c in composed.chars() {
        match c {
            '\u{FB00}' => expanded.push_str("ff"),
            '\u{FB01}' => expanded.push_str("fi"),
            '\u{FB02}' => expanded.push_str("fl"),
            '\u{FB03}' => expanded.push_str("ffi"),
            '\u{FB04}' => expanded.push_str("ffl"),
            '\u{FFFD}' | '\0' => {}
            other => expanded.push(other),
        }
    }
    collapse_whitespace(&expanded)
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Group one page's spans into lines, top of the page first.
///
/// Spans are ordered by baseline (`bbox.y1`) and then by `x0`; a span joins
/// the current line while its baseline is within [`BASELINE_TOLERANCE`] of
/// the line's first span. Lines whose text is shorter than two characters
/// are dropped.
pub fn group_spans_into_lines(mut spans: Vec<TextSpan>, page_index: usize) -> Vec<Line> {
    spans.retain(|s| !s.text.trim().is_empty());
    if spans.is_empty() {
        return Vec::new();
    }

    spans.sort_by(|a, b| {
        a.bbox
            .y1
            .total_cmp(&b.bbox.y1)
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    let mut lines = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut baseline = spans[0].bbox.y1;

    for span in spans {
        if !current.is_empty() && (span.bbox.y1 - baseline).abs() > BASELINE_TOLERANCE {
            lines.push(Line::from_spans(std::mem::take(&mut current), page_index));
            baseline = span.bbox.y1;
        }
        current.push(span);
    }
    if !current.is_empty() {
        lines.push(Line::from_spans(current, page_index));
    }

    lines.retain(|l| l.char_count() >= 2);
    lines
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Read-only neighbourhood facts about one line on its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineContext {
    pub prev_len: usize,
    pub next_len: usize,
    pub whitespace_before: bool,
    pub whitespace_after: bool,
    pub is_isolated: bool,
    /// Other lines whose top lies within the positional band of this line.
    pub nearby_siblings: usize,
}

/// Compute the context of every line of one page. `lines` must be in
/// top-to-bottom order.
pub fn page_contexts(lines: &[Line], band: f32) -> Vec<LineContext> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let prev = i.checked_sub(1).and_then(|p| lines.get(p));
            let next = lines.get(i + 1);
            let gap_limit = line.height() * WHITESPACE_GAP_FACTOR;

            let whitespace_before = prev.is_none_or(|p| line.bbox.y0 - p.bbox.y1 > gap_limit);
            let whitespace_after = next.is_none_or(|n| n.bbox.y0 - line.bbox.y1 > gap_limit);
            let prev_len = prev.map(Line::char_count).unwrap_or(0);
            let next_len = next.map(Line::char_count).unwrap_or(0);

            let is_isolated = (whitespace_before || prev_len < SHORT_NEIGHBOUR_CHARS)
                && (whitespace_after || next_len < SHORT_NEIGHBOUR_CHARS);

            let nearby_siblings = lines
                .iter()
                .enumerate()
                .filter(|(j, other)| *j != i && (other.bbox.y0 - line.bbox.y0).abs() < band)
                .count();

            LineContext {
                prev_len,
                next_len,
                whitespace_before,
                whitespace_after,
                is_isolated,
                nearby_siblings,
            }
        })
        .collect()
}
