use crate::{error::AppError, AppState};
use axum::{
    async_trait,
    extract::{FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    Json,
};
use axum_extra::extract::WithRejection;
use core_types::{Mahasiswa, MahasiswaPayload};
use database::DbError;
use serde::Serialize;
use std::{num::IntErrorKind, sync::Arc};

/// The `:id` path segment of a record route.
///
/// Non-integer text is rejected as `AppError::InvalidId`. An integer that does
/// not fit the key column can never name a stored row, so it resolves to
/// "not found" instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MahasiswaId(pub i32);

#[async_trait]
impl<S> FromRequestParts<S> for MahasiswaId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state).await?;
        parse_id(&raw).map(MahasiswaId)
    }
}

fn parse_id(raw: &str) -> Result<i32, AppError> {
    raw.parse::<i32>().map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            AppError::Database(DbError::NotFound)
        }
        _ => AppError::InvalidId(format!("{raw:?}: {err}")),
    })
}

/// JSON body extractor whose failures render as `AppError::InvalidBody`.
type PayloadJson = WithRejection<Json<MahasiswaPayload>, AppError>;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// # GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "Backend is running",
    })
}

/// # GET /api/mahasiswa
/// Lists every record, ordered by id.
pub async fn list_mahasiswa(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Mahasiswa>>, AppError> {
    let rows = state.repo.list_mahasiswa().await?;
    Ok(Json(rows))
}

/// # GET /api/mahasiswa/:id
pub async fn get_mahasiswa(
    State(state): State<Arc<AppState>>,
    MahasiswaId(id): MahasiswaId,
) -> Result<Json<Mahasiswa>, AppError> {
    let row = state.repo.get_mahasiswa(id).await?;
    Ok(Json(row))
}

/// # POST /api/mahasiswa
pub async fn create_mahasiswa(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): PayloadJson,
) -> Result<(StatusCode, Json<Mahasiswa>), AppError> {
    let new = payload.validate()?;
    let row = state.repo.create_mahasiswa(&new).await?;
    tracing::info!(id = row.id, nim = %row.nim, "Created mahasiswa.");
    Ok((StatusCode::CREATED, Json(row)))
}

/// # PUT /api/mahasiswa/:id
/// Replaces all four business fields. The id in the path is authoritative.
pub async fn update_mahasiswa(
    State(state): State<Arc<AppState>>,
    MahasiswaId(id): MahasiswaId,
    WithRejection(Json(payload), _): PayloadJson,
) -> Result<Json<Mahasiswa>, AppError> {
    let update = payload.validate()?;
    let row = state.repo.update_mahasiswa(id, &update).await?;
    tracing::info!(id = row.id, "Updated mahasiswa.");
    Ok(Json(row))
}

/// # DELETE /api/mahasiswa/:id
pub async fn delete_mahasiswa(
    State(state): State<Arc<AppState>>,
    MahasiswaId(id): MahasiswaId,
) -> Result<Json<MessageResponse>, AppError> {
    let row = state.repo.delete_mahasiswa(id).await?;
    tracing::info!(id = row.id, nim = %row.nim, "Deleted mahasiswa.");
    Ok(Json(MessageResponse {
        message: "Mahasiswa deleted successfully",
    }))
}

/// Fallback for routes that do not exist.
pub async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer_ids() {
        assert_eq!(parse_id("42").ok(), Some(42));
        assert_eq!(parse_id("-7").ok(), Some(-7));
        assert_eq!(parse_id("2147483647").ok(), Some(i32::MAX));
    }

    #[test]
    fn out_of_range_ids_are_not_found() {
        for raw in ["2147483648", "99999999999", "-99999999999"] {
            assert!(
                matches!(parse_id(raw), Err(AppError::Database(DbError::NotFound))),
                "raw: {raw}"
            );
        }
    }

    #[test]
    fn non_integer_ids_are_invalid() {
        for raw in ["abc", "1.5", "", "12abc"] {
            assert!(matches!(parse_id(raw), Err(AppError::InvalidId(_))), "raw: {raw}");
        }
    }
}
