use axum::http::{HeaderMap, HeaderValue};
use axum::response::IntoResponse;
use reqwest::StatusCode;
use thiserror::Error;

use crate::services::fetch_service::FetchError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),
    #[error("External error: {0}")]
    External(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg).into_response(),
            AppError::DataUnavailable(msg) => {
                let mut headers = HeaderMap::new();
                headers.insert("Retry-After", HeaderValue::from_static("60"));
                (StatusCode::SERVICE_UNAVAILABLE, headers, msg).into_response()
            }
            AppError::External(msg) => (StatusCode::BAD_GATEWAY, msg).into_response(),
        }
    }
}

impl From<FetchError> for AppError {
    fn from(value: FetchError) -> Self {
        match value {
            FetchError::DataUnavailable { .. } => AppError::DataUnavailable(value.to_string()),
            FetchError::Provider { .. } => AppError::External(value.to_string()),
        }
    }
}

impl From<String> for AppError {
    fn from(value: String) -> Self {
        AppError::Validation(value)
    }
}
