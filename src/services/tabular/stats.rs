use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use smallvec::SmallVec;

use super::types::{
    Cell, ColumnKind, ColumnProfile, NumericSummary, TextSummary, SAMPLE_SIZE,
};

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Descriptive statistics over a numeric column. NaN inputs are filtered
/// before aggregation; `None` when nothing numeric remains. Internal math is
/// full precision, results are rounded to 2 decimals for reports.
pub fn numeric_summary(values: &[f64]) -> Option<NumericSummary> {
    let mut clean: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if clean.is_empty() {
        return None;
    }

    let n = clean.len() as f64;
    let mean = clean.iter().sum::<f64>() / n;

    clean.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = clean.len() / 2;
    let median = if clean.len() % 2 == 0 {
        (clean[mid - 1] + clean[mid]) / 2.0
    } else {
        clean[mid]
    };

    // Population standard deviation (divide by N).
    let variance = clean.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    Some(NumericSummary {
        mean: round2(mean),
        median: round2(median),
        std_dev: round2(variance.sqrt()),
        min: round2(clean[0]),
        max: round2(clean[clean.len() - 1]),
    })
}

/// Unique count, average char length and the most common value (truncated to
/// 20 chars, ties broken by first encounter) of a text column.
pub fn text_summary(values: &[String]) -> TextSummary {
    if values.is_empty() {
        return TextSummary {
            unique_count: 0,
            avg_length: 0.0,
            most_common: String::new(),
        };
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values {
        *counts.entry(v.as_str()).or_insert(0) += 1;
    }

    let total_len: usize = values.iter().map(|v| v.chars().count()).sum();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut best: (&str, usize) = ("", 0);
    for v in values {
        if !seen.insert(v.as_str()) {
            continue;
        }
        let count = counts[v.as_str()];
        if count > best.1 {
            best = (v.as_str(), count);
        }
    }

    TextSummary {
        unique_count: counts.len(),
        avg_length: round2(total_len as f64 / values.len() as f64),
        most_common: best.0.chars().take(20).collect(),
    }
}

/// Full profile of one column: null/unique counts, lexicographic min/max and
/// leading sample values, plus the kind-appropriate statistics summary.
pub fn profile_column(name: &str, kind: ColumnKind, cells: &[Cell]) -> ColumnProfile {
    let (null_count, seen_values, min_max) = cells
        .par_iter()
        .fold(
            || (0usize, HashSet::new(), (None, None)),
            |(mut nulls, mut seen, mut min_max), cell| {
                if cell.is_missing() {
                    nulls += 1;
                } else {
                    let text = cell.to_text();
                    update_min_max(&mut min_max, &text);
                    seen.insert(text);
                }
                (nulls, seen, min_max)
            },
        )
        .reduce(
            || (0usize, HashSet::new(), (None, None)),
            |a, b| {
                let mut combined = a.1;
                combined.extend(b.1);
                (a.0 + b.0, combined, merge_min_max(a.2, b.2))
            },
        );

    let mut sample_values = SmallVec::<[String; SAMPLE_SIZE]>::new();
    for cell in cells.iter().take(SAMPLE_SIZE) {
        sample_values.push(cell.to_text());
    }

    let numeric = match kind {
        ColumnKind::Numeric => {
            let parsed: Vec<f64> = cells.iter().filter_map(|c| c.as_number()).collect();
            numeric_summary(&parsed)
        }
        ColumnKind::Text => None,
    };
    let text = match kind {
        ColumnKind::Text => {
            let non_missing: Vec<String> = cells
                .iter()
                .filter(|c| !c.is_missing())
                .map(|c| c.to_text())
                .collect();
            Some(text_summary(&non_missing))
        }
        ColumnKind::Numeric => None,
    };

    ColumnProfile {
        name: name.to_string(),
        kind,
        sample_values,
        null_count,
        unique_count: seen_values.len(),
        min_value: min_max.0,
        max_value: min_max.1,
        has_duplicates: seen_values.len() < cells.len() - null_count,
        numeric,
        text,
    }
}

fn update_min_max(min_max: &mut (Option<String>, Option<String>), value: &str) {
    match &min_max.0 {
        Some(min) if value < min.as_str() => min_max.0 = Some(value.to_string()),
        None => min_max.0 = Some(value.to_string()),
        _ => {}
    }
    match &min_max.1 {
        Some(max) if value > max.as_str() => min_max.1 = Some(value.to_string()),
        None => min_max.1 = Some(value.to_string()),
        _ => {}
    }
}

fn merge_min_max(
    a: (Option<String>, Option<String>),
    b: (Option<String>, Option<String>),
) -> (Option<String>, Option<String>) {
    let min = match (a.0, b.0) {
        (None, None) => None,
        (Some(v), None) | (None, Some(v)) => Some(v),
        (Some(v1), Some(v2)) => Some(if v1 < v2 { v1 } else { v2 }),
    };
    let max = match (a.1, b.1) {
        (None, None) => None,
        (Some(v), None) | (None, Some(v)) => Some(v),
        (Some(v1), Some(v2)) => Some(if v1 > v2 { v1 } else { v2 }),
    };
    (min, max)
}
