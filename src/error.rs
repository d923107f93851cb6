use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to fetch dataset: {0}")]
    Fetch(String),
    #[error("No dataset loaded")]
    NoDataset,
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Fetch(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Parse(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::UnsupportedFormat(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::UnknownColumn(name) => {
                (StatusCode::BAD_REQUEST, format!("Unknown column: {}", name))
            }
            AppError::NoDataset => (StatusCode::NOT_FOUND, "No dataset loaded".to_string()),
            AppError::Fetch(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Io(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
