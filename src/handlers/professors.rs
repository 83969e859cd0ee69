//! Professor handlers, including proctorship listing and assignment.

use crate::error::AppError;
use crate::extractors::{JsonBody, RecordId};
use crate::response::{created, deleted, ok};
use crate::service::RecordService;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse};

pub async fn list_professors(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rows = RecordService::list_professors(state.store.as_ref()).await?;
    Ok(ok(rows))
}

pub async fn read_professor(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<impl IntoResponse, AppError> {
    let professor = RecordService::professor(state.store.as_ref(), id).await?;
    Ok(ok(professor))
}

pub async fn create_professor(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let professor = RecordService::create_professor(state.store.as_ref(), body).await?;
    Ok(created(professor))
}

pub async fn update_professor(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let professor = RecordService::update_professor(state.store.as_ref(), id, body).await?;
    Ok(ok(professor))
}

pub async fn delete_professor(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<impl IntoResponse, AppError> {
    RecordService::delete_professor(state.store.as_ref(), id).await?;
    Ok(deleted("professor"))
}

pub async fn list_proctorships(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<impl IntoResponse, AppError> {
    let students = RecordService::proctored_students(state.store.as_ref(), id).await?;
    Ok(ok(students))
}

/// Body: `{ "studentId": <id> }`. Responds with the updated student.
pub async fn assign_proctorship(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let student = RecordService::assign_proctor(state.store.as_ref(), id, body).await?;
    Ok(ok(student))
}
