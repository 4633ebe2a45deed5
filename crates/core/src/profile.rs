//! Document-wide typography statistics.
//!
//! The profile is computed once from a sampled page prefix and is the
//! baseline the typographic classifier judges every line against.

use std::collections::HashMap;

use serde::Serialize;

use crate::line::Line;

/// Font size assumed when nothing was sampled.
const DEFAULT_AVG_SIZE: f32 = 12.0;
const DEFAULT_AVG_LINE_LENGTH: f32 = 50.0;
const DEFAULT_SHORT_LINE_THRESHOLD: usize = 20;

/// Lower bound applied to the standard deviation in [`z_score`](DocumentTypographyProfile::z_score).
const MIN_STDDEV: f32 = 1.0;

/// Size percentiles used by the typographic classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizePercentiles {
    pub p25: f32,
    pub p50: f32,
    pub p75: f32,
    pub p90: f32,
    pub p95: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentTypographyProfile {
    pub avg_size: f32,
    /// Population standard deviation of line sizes. May be zero; use
    /// [`DocumentTypographyProfile::z_score`] rather than dividing by it.
    pub size_stddev: f32,
    pub size_percentiles: SizePercentiles,
    /// Font name carried by the most spans; empty when nothing was sampled.
    pub common_font: String,
    pub avg_line_length: f32,
    pub short_line_threshold: usize,
    /// Number of lines the statistics were computed from.
    pub sampled_lines: usize,
}

impl Default for DocumentTypographyProfile {
    fn default() -> Self {
        let avg = DEFAULT_AVG_SIZE;
        Self {
            avg_size: avg,
            size_stddev: MIN_STDDEV,
            size_percentiles: SizePercentiles {
                p25: avg,
                p50: avg,
                p75: avg * 1.2,
                p90: avg * 1.5,
                p95: avg * 1.8,
            },
            common_font: String::new(),
            avg_line_length: DEFAULT_AVG_LINE_LENGTH,
            short_line_threshold: DEFAULT_SHORT_LINE_THRESHOLD,
            sampled_lines: 0,
        }
    }
}

impl DocumentTypographyProfile {
    /// Standard score of `size`, with the deviation floored at 1.0.
    pub fn z_score(&self, size: f32) -> f32 {
        (size - self.avg_size) / self.size_stddev.max(MIN_STDDEV)
    }
}

/// Index lookup into a sorted slice at `numerator / denominator` of its
/// length, truncating.
fn percentile<T: Copy>(sorted: &[T], numerator: usize, denominator: usize) -> T {
    let idx = (sorted.len() * numerator / denominator).min(sorted.len() - 1);
    sorted[idx]
}

/// Build the profile from the lines of the sampled pages.
///
/// An empty sample yields [`DocumentTypographyProfile::default`].
pub fn build_profile<'a, I>(lines: I) -> DocumentTypographyProfile
where
    I: IntoIterator<Item = &'a Line>,
{
    let mut sizes: Vec<f32> = Vec::new();
    let mut lengths: Vec<usize> = Vec::new();
    let mut fonts: HashMap<&str, usize> = HashMap::new();

    for line in lines {
        if line.avg_font_size > 0.0 {
            sizes.push(line.avg_font_size);
        }
        lengths.push(line.char_count());
        for span in &line.spans {
            *fonts.entry(span.font_name.as_str()).or_insert(0) += 1;
        }
    }

    if sizes.is_empty() {
        return DocumentTypographyProfile::default();
    }

    let n = sizes.len() as f32;
    let avg_size = sizes.iter().sum::<f32>() / n;
    let variance = sizes.iter().map(|s| (s - avg_size).powi(2)).sum::<f32>() / n;

    sizes.sort_by(f32::total_cmp);
    let size_percentiles = SizePercentiles {
        p25: percentile(&sizes, 1, 4),
        p50: percentile(&sizes, 1, 2),
        p75: percentile(&sizes, 3, 4),
        p90: percentile(&sizes, 9, 10),
        p95: percentile(&sizes, 19, 20),
    };

    // Ties resolve to the lexicographically smallest name so the result does
    // not depend on hash order.
    let common_font = fonts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(a.0)))
        .map(|(name, _)| name.to_string())
        .unwrap_or_default();

    let (avg_line_length, short_line_threshold) = if lengths.is_empty() {
        (DEFAULT_AVG_LINE_LENGTH, DEFAULT_SHORT_LINE_THRESHOLD)
    } else {
        let avg = lengths.iter().sum::<usize>() as f32 / lengths.len() as f32;
        lengths.sort_unstable();
        (avg, percentile(&lengths, 1, 4))
    };

    DocumentTypographyProfile {
        avg_size,
        size_stddev: variance.sqrt(),
        size_percentiles,
        common_font,
        avg_line_length,
        short_line_threshold,
        sampled_lines: sizes.len(),
    }
}
