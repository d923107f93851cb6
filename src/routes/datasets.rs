use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::Method,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::{
    error::AppError,
    models::{
        ColumnReport, CorrelationResponse, HistogramQuery, HistogramResponse, LoadRequest,
        LoadResponse, PageQuery, PageResponse,
    },
    services::{
        dataset_loader::{DatasetContent, LoadedDataset},
        tabular::{
            classify::classify_columns,
            export::{export_table, paginate, total_pages},
            quality::{assess_quality, quality_band},
            stats::profile_column,
            types::{ColumnKind, ExportFile, Table},
            viz::{correlation_matrix, histogram_bins, DEFAULT_MAX_BINS},
        },
    },
    AppState,
};

const SAMPLE_ROWS: usize = 5;
const DEFAULT_PAGE_SIZE: usize = 10;

pub fn routes() -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/datasets/load", post(load_dataset))
        .route("/datasets/page", get(page_dataset))
        .route("/datasets/export", get(export_dataset))
        .route("/datasets/histogram", get(histogram))
        .route("/datasets/correlation", get(correlation))
        .layer(cors)
}

fn analyze(dataset: &LoadedDataset) -> LoadResponse {
    match &dataset.content {
        DatasetContent::Document(text) => LoadResponse {
            source: dataset.source.clone(),
            format: dataset.format.name(),
            mocked: dataset.mocked,
            row_count: 0,
            column_count: 0,
            sample_rows: Vec::new(),
            columns: Vec::new(),
            numeric_columns: Vec::new(),
            text_columns: Vec::new(),
            quality: Default::default(),
            quality_band: quality_band(0.0),
            document: Some(text.clone()),
        },
        DatasetContent::Table(table) => {
            let start = std::time::Instant::now();

            let partition = classify_columns(table);
            let columns: Vec<ColumnReport> = table
                .columns
                .iter()
                .enumerate()
                .map(|(idx, name)| {
                    let kind = if partition.numeric.iter().any(|c| c == name) {
                        ColumnKind::Numeric
                    } else {
                        ColumnKind::Text
                    };
                    profile_column(name, kind, &table.column_cells(idx)).into()
                })
                .collect();

            let quality = assess_quality(table);
            let band = quality_band(quality.overall_score as f64);

            let sample_rows = table
                .rows
                .iter()
                .take(SAMPLE_ROWS)
                .map(|row| row.iter().map(|c| c.to_text()).collect())
                .collect();

            tracing::info!(
                source = %dataset.source,
                rows = table.row_count(),
                columns = table.column_count(),
                score = quality.overall_score,
                elapsed = ?start.elapsed(),
                "dataset analyzed"
            );

            LoadResponse {
                source: dataset.source.clone(),
                format: dataset.format.name(),
                mocked: dataset.mocked,
                row_count: table.row_count(),
                column_count: table.column_count(),
                sample_rows,
                columns,
                numeric_columns: partition.numeric,
                text_columns: partition.text,
                quality,
                quality_band: band,
                document: None,
            }
        }
    }
}

async fn load_dataset(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoadRequest>,
) -> Result<Json<LoadResponse>, AppError> {
    tracing::info!(source = %request.source, "loading dataset");

    let dataset = match state.loader.load(&request.source).await {
        Ok(dataset) => dataset,
        Err(err @ AppError::Fetch(_)) if state.config.fallback_to_mock => {
            tracing::warn!(source = %request.source, error = %err, "fetch failed, serving fixture");
            state.loader.substitute_fixture(&request.source)
        }
        Err(err) => {
            tracing::error!(source = %request.source, error = %err, "failed to load dataset");
            return Err(err);
        }
    };

    Ok(Json(analyze(&dataset)))
}

fn current_table(state: &AppState) -> Result<(Arc<LoadedDataset>, usize), AppError> {
    let dataset = state.loader.current()?;
    let rows = dataset.table()?.row_count();
    Ok((dataset, rows))
}

async fn page_dataset(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse>, AppError> {
    let (dataset, total_rows) = current_table(&state)?;
    let table = dataset.table()?;

    let page = query.page.unwrap_or(1);
    let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

    let rows = paginate(table, page, page_size)
        .iter()
        .map(|row| row.iter().map(|c| c.to_text()).collect())
        .collect();

    Ok(Json(PageResponse {
        page,
        page_size,
        total_rows,
        total_pages: total_pages(table, page_size),
        columns: table.columns.clone(),
        rows,
    }))
}

async fn export_dataset(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ExportFile>, AppError> {
    let dataset = state.loader.current()?;
    let table = dataset.table()?;
    let file = export_table(table, &dataset.source, dataset.format)?;
    tracing::info!(filename = %file.filename, bytes = file.content.len(), "dataset exported");
    Ok(Json(file))
}

fn numeric_values(table: &Table, column: &str) -> Result<Vec<f64>, AppError> {
    let idx = table
        .column_index(column)
        .ok_or_else(|| AppError::UnknownColumn(column.to_string()))?;
    Ok(table
        .rows
        .iter()
        .filter_map(|row| row.get(idx).and_then(|c| c.as_number()))
        .collect())
}

async fn histogram(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistogramQuery>,
) -> Result<Json<HistogramResponse>, AppError> {
    let dataset = state.loader.current()?;
    let table = dataset.table()?;

    let values = numeric_values(table, &query.column)?;
    let bins = histogram_bins(&values, query.max_bins.unwrap_or(DEFAULT_MAX_BINS));

    Ok(Json(HistogramResponse {
        column: query.column,
        labels: bins.labels,
        counts: bins.counts,
    }))
}

async fn correlation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CorrelationResponse>, AppError> {
    let dataset = state.loader.current()?;
    let table = dataset.table()?;

    let partition = classify_columns(table);
    let matrix = correlation_matrix(table, &partition.numeric);

    Ok(Json(CorrelationResponse {
        columns: partition.numeric,
        matrix,
    }))
}
