use chrono::{Duration, NaiveDate};

use super::tabular::types::{Cell, Table};

const SYMBOLS: &[&str] = &["AAPL", "MSFT", "GOOGL"];
const FIXTURE_DAYS: i64 = 30;

/// Deterministic stand-in for a prediction export when the real file cannot
/// be fetched and the deployment opted into mock substitution. Thirty days of
/// per-symbol closes with a synthetic predicted close and confidence, stable
/// across runs so demo charts do not jump.
pub fn prediction_fixture() -> Table {
    let columns = vec![
        "date".to_string(),
        "symbol".to_string(),
        "close".to_string(),
        "predicted_close".to_string(),
        "confidence".to_string(),
    ];

    let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default();
    let mut rows = Vec::with_capacity((FIXTURE_DAYS as usize) * SYMBOLS.len());
    for day in 0..FIXTURE_DAYS {
        let date = start + Duration::days(day);
        for (s, symbol) in SYMBOLS.iter().enumerate() {
            let base = 100.0 + 40.0 * s as f64;
            let wobble = (day as f64 * 0.7 + s as f64).sin() * 4.0;
            let close = base + day as f64 * 0.35 + wobble;
            let predicted = close + (day as f64 * 1.3 + s as f64).cos() * 2.5;
            let confidence = 0.68 + 0.25 * ((day as f64 * 0.45 + s as f64).sin() * 0.5 + 0.5);
            rows.push(vec![
                Cell::Text(date.format("%Y-%m-%d").to_string()),
                Cell::Text(symbol.to_string()),
                Cell::Number((close * 100.0).round() / 100.0),
                Cell::Number((predicted * 100.0).round() / 100.0),
                Cell::Number((confidence * 100.0).round() / 100.0),
            ]);
        }
    }

    Table::new(columns, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::tabular::{assess_quality, classify_columns};

    #[test]
    fn fixture_is_rectangular_and_deterministic() {
        let a = prediction_fixture();
        let b = prediction_fixture();
        assert_eq!(a.row_count(), 90);
        assert_eq!(a.column_count(), 5);
        assert_eq!(a.rows, b.rows);
    }

    #[test]
    fn fixture_classifies_and_scores_cleanly() {
        let table = prediction_fixture();
        let partition = classify_columns(&table);
        assert!(partition.numeric.contains(&"close".to_string()));
        assert!(partition.text.contains(&"symbol".to_string()));

        let report = assess_quality(&table);
        assert_eq!(report.completeness, 100.0);
        assert_eq!(report.uniqueness, 100.0);
    }
}
