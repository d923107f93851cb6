use serde::{Deserialize, Serialize};

use crate::services::tabular::types::{
    ColumnKind, ColumnProfile, NumericSummary, QualityReport, TextSummary,
};

#[derive(Debug, Deserialize)]
pub struct LoadRequest {
    pub source: String,
}

#[derive(Debug, Serialize)]
pub struct ColumnReport {
    pub name: String,
    pub kind: ColumnKind,
    pub sample_values: Vec<String>,
    pub null_count: usize,
    pub unique_count: usize,
    pub min_value: Option<String>,
    pub max_value: Option<String>,
    pub has_duplicates: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextSummary>,
}

impl From<ColumnProfile> for ColumnReport {
    fn from(profile: ColumnProfile) -> Self {
        ColumnReport {
            name: profile.name,
            kind: profile.kind,
            sample_values: profile.sample_values.to_vec(),
            null_count: profile.null_count,
            unique_count: profile.unique_count,
            min_value: profile.min_value,
            max_value: profile.max_value,
            has_duplicates: profile.has_duplicates,
            numeric: profile.numeric,
            text: profile.text,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoadResponse {
    pub source: String,
    pub format: &'static str,
    pub mocked: bool,
    pub row_count: usize,
    pub column_count: usize,
    pub sample_rows: Vec<Vec<String>>,
    pub columns: Vec<ColumnReport>,
    pub numeric_columns: Vec<String>,
    pub text_columns: Vec<String>,
    pub quality: QualityReport,
    pub quality_band: &'static str,
    /// Markdown sources carry their text here instead of tabular fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PageResponse {
    pub page: usize,
    pub page_size: usize,
    pub total_rows: usize,
    pub total_pages: usize,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct HistogramQuery {
    pub column: String,
    pub max_bins: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HistogramResponse {
    pub column: String,
    pub labels: Vec<String>,
    pub counts: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct CorrelationResponse {
    pub columns: Vec<String>,
    pub matrix: Vec<Vec<f64>>,
}
