use std::collections::HashSet;

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;

use super::types::{Cell, ColumnIssues, QualityReport, Table};

const WEIGHT_COMPLETENESS: f64 = 0.30;
const WEIGHT_UNIQUENESS: f64 = 0.25;
const WEIGHT_CONSISTENCY: f64 = 0.25;
const WEIGHT_VALIDITY: f64 = 0.20;

/// A column takes part in a validity sub-score once at least this share of
/// its non-missing values parse as the candidate type.
const VALIDITY_CANDIDATE_THRESHOLD: f64 = 70.0;

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^\d{4}-\d{2}-\d{2}$",
        r"^\d{2}/\d{2}/\d{4}$",
        r"^\d{4}/\d{2}/\d{2}$",
        r"^\d{2}-\d{2}-\d{4}$",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%d/%m/%Y %H:%M:%S"];

pub fn is_date_string(s: &str) -> bool {
    if DATE_PATTERNS.iter().any(|re| re.is_match(s)) {
        return true;
    }
    DATETIME_FORMATS
        .iter()
        .any(|fmt| NaiveDateTime::parse_from_str(s, fmt).is_ok())
}

/// Band label applied uniformly to the completeness/uniqueness/consistency
/// gauges and the overall score.
pub fn quality_band(score: f64) -> &'static str {
    if score >= 80.0 {
        "excellent"
    } else if score >= 60.0 {
        "good"
    } else if score >= 40.0 {
        "warning"
    } else {
        "poor"
    }
}

struct ColumnAssessment {
    issues: Vec<String>,
    consistent: bool,
    numeric_pct: Option<f64>,
    date_pct: Option<f64>,
}

fn assess_column(name: &str, cells: &[Cell]) -> ColumnAssessment {
    let total = cells.len();
    let missing = cells.iter().filter(|c| c.is_missing()).count();
    let present: Vec<&Cell> = cells.iter().filter(|c| !c.is_missing()).collect();

    let mut issues = Vec::new();
    if total > 0 && missing == total {
        issues.push("All values missing".to_string());
    } else if total > 0 {
        let missing_pct = missing as f64 / total as f64 * 100.0;
        if missing_pct > 50.0 {
            issues.push(format!("High missing rate ({:.1}%)", missing_pct));
        }
    }

    let tags: HashSet<&'static str> = present.iter().map(|c| c.type_tag()).collect();
    if tags.len() > 2 {
        issues.push("Inconsistent data types".to_string());
    }

    let numbers: Vec<f64> = present.iter().filter_map(|c| c.as_number()).collect();
    if !numbers.is_empty() {
        let n = numbers.len() as f64;
        let mean = numbers.iter().sum::<f64>() / n;
        let std_dev = (numbers.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
        if std_dev > 0.0 {
            let outliers = numbers
                .iter()
                .filter(|v| (*v - mean).abs() > 3.0 * std_dev)
                .count();
            if outliers as f64 > numbers.len() as f64 * 0.05 {
                issues.push(format!("Potential outliers ({})", outliers));
            }
        }
    }

    let (numeric_pct, date_pct) = if present.is_empty() {
        (None, None)
    } else {
        let dates = present
            .iter()
            .filter(|c| matches!(c, Cell::Text(s) if is_date_string(s)))
            .count();
        (
            Some(numbers.len() as f64 / present.len() as f64 * 100.0),
            Some(dates as f64 / present.len() as f64 * 100.0),
        )
    };

    tracing::debug!(column = name, missing, issue_count = issues.len(), "column assessed");

    ColumnAssessment {
        issues,
        consistent: tags.len() <= 1,
        numeric_pct,
        date_pct,
    }
}

/// Sub-score over columns that clear the candidate threshold for one value
/// type; vacuously 100 when no column qualifies. The vacuous default
/// inflates validity for tables without any numeric or date-like columns.
fn validity_sub_score(percentages: &[f64]) -> f64 {
    let candidates: Vec<f64> = percentages
        .iter()
        .copied()
        .filter(|p| *p >= VALIDITY_CANDIDATE_THRESHOLD)
        .collect();
    if candidates.is_empty() {
        100.0
    } else {
        candidates.iter().sum::<f64>() / candidates.len() as f64
    }
}

/// Composite data-quality report. Never fails: an empty table produces the
/// zeroed "no data" report.
pub fn assess_quality(table: &Table) -> QualityReport {
    if table.is_empty() {
        return QualityReport::default();
    }

    let total_cells = table.row_count() * table.column_count();
    let missing_cells: usize = table
        .rows
        .iter()
        .flat_map(|row| row.iter())
        .filter(|c| c.is_missing())
        .count();
    let completeness = (total_cells - missing_cells) as f64 / total_cells as f64 * 100.0;

    // Row identity via canonical serialization; column order is fixed so the
    // encoding is stable across rows.
    let unique_rows: HashSet<String> = table
        .rows
        .iter()
        .filter_map(|row| serde_json::to_string(row).ok())
        .collect();
    let uniqueness = unique_rows.len() as f64 / table.row_count() as f64 * 100.0;

    let assessments: Vec<(String, ColumnAssessment)> = table
        .columns
        .par_iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells = table.column_cells(idx);
            (name.clone(), assess_column(name, &cells))
        })
        .collect();

    let consistent = assessments.iter().filter(|(_, a)| a.consistent).count();
    let consistency = consistent as f64 / table.column_count() as f64 * 100.0;

    let numeric_pcts: Vec<f64> = assessments.iter().filter_map(|(_, a)| a.numeric_pct).collect();
    let date_pcts: Vec<f64> = assessments.iter().filter_map(|(_, a)| a.date_pct).collect();
    let validity = (validity_sub_score(&numeric_pcts) + validity_sub_score(&date_pcts)) / 2.0;

    let column_issues: Vec<ColumnIssues> = assessments
        .into_iter()
        .filter(|(_, a)| !a.issues.is_empty())
        .map(|(column, a)| ColumnIssues {
            column,
            issues: a.issues,
        })
        .collect();

    let overall = WEIGHT_COMPLETENESS * completeness
        + WEIGHT_UNIQUENESS * uniqueness
        + WEIGHT_CONSISTENCY * consistency
        + WEIGHT_VALIDITY * validity;

    QualityReport {
        completeness: super::stats::round2(completeness),
        uniqueness: super::stats::round2(uniqueness),
        consistency: super::stats::round2(consistency),
        validity: super::stats::round2(validity),
        overall_score: (overall.round() as i64).clamp(0, 100) as u32,
        column_issues,
    }
}
