use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub const SAMPLE_SIZE: usize = 3;
pub const TYPE_DETECTION_ROWS: usize = 100;

/// A single cell of a loaded dataset. Non-scalar JSON values are carried as
/// their serialized text in `Nested` so rows stay rectangular.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Nested(String),
}

impl Cell {
    /// Missing means null, empty text, or the literal strings "null"/"undefined"
    /// that loosely-typed producers write into CSV cells.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Text(s) => s.is_empty() || s == "null" || s == "undefined",
            _ => false,
        }
    }

    /// The value-type tag used by the consistency metric.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Cell::Null => "null",
            Cell::Bool(_) => "boolean",
            Cell::Number(_) => "number",
            Cell::Text(_) => "string",
            Cell::Nested(_) => "object",
        }
    }

    /// Finite-number view of the cell; text cells are trimmed before parsing.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Display form used by sample rows and the CSV encoder.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Bool(b) => b.to_string(),
            Cell::Number(n) => format_number(*n),
            Cell::Text(s) | Cell::Nested(s) => s.clone(),
        }
    }
}

/// Integral floats print without a trailing ".0" so CSV output matches what
/// the source file carried.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// An in-memory rectangular dataset loaded from one file. Every row holds
/// exactly `columns.len()` cells; short source rows are padded with empty text.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>, mut rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        for row in &mut rows {
            row.truncate(width);
            while row.len() < width {
                row.push(Cell::Text(String::new()));
            }
        }
        Table { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Clones one column out of the row-major storage.
    pub fn column_cells(&self, idx: usize) -> Vec<Cell> {
        self.rows
            .iter()
            .map(|row| row.get(idx).cloned().unwrap_or(Cell::Null))
            .collect()
    }
}

/// Inferred classification of a column, used to pick applicable statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Text,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ColumnPartition {
    pub numeric: Vec<String>,
    pub text: Vec<String>,
}

/// Descriptive statistics for a numeric column, rounded to 2 decimals at the
/// report boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextSummary {
    pub unique_count: usize,
    pub avg_length: f64,
    /// Truncated to 20 chars; ties broken by first encounter.
    pub most_common: String,
}

/// Full per-column profile reported alongside the quality assessment.
#[derive(Debug, Clone)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    pub sample_values: SmallVec<[String; SAMPLE_SIZE]>,
    pub null_count: usize,
    pub unique_count: usize,
    pub min_value: Option<String>,
    pub max_value: Option<String>,
    pub has_duplicates: bool,
    pub numeric: Option<NumericSummary>,
    pub text: Option<TextSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnIssues {
    pub column: String,
    pub issues: Vec<String>,
}

/// Composite 0-100 quality metric combining completeness, uniqueness, type
/// consistency and validity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QualityReport {
    pub completeness: f64,
    pub uniqueness: f64,
    pub consistency: f64,
    pub validity: f64,
    pub overall_score: u32,
    pub column_issues: Vec<ColumnIssues>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportFile {
    pub filename: String,
    pub mime_type: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Histogram {
    pub labels: Vec<String>,
    pub counts: Vec<usize>,
}
