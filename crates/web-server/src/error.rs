use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use core_types::CoreError;
use database::DbError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] CoreError),
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),
    #[error("Invalid path parameter: {0}")]
    InvalidId(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidId(rejection.body_text())
    }
}

/// Converts our custom `AppError` into an HTTP response.
///
/// Store failures are logged in full here and reported to the caller with a
/// generic message only.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::Database(DbError::DuplicateNim) => {
                (StatusCode::BAD_REQUEST, "NIM already exists".to_string())
            }
            AppError::Database(DbError::NotFound) => {
                (StatusCode::NOT_FOUND, "Mahasiswa not found".to_string())
            }
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error".to_string(),
                )
            }
            AppError::InvalidBody(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            AppError::InvalidId(detail) => {
                tracing::debug!(error = %detail, "Rejected path parameter.");
                (StatusCode::BAD_REQUEST, "Invalid id".to_string())
            }
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
