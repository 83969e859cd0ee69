//! Library membership handlers, keyed by the owning student's id.

use crate::error::AppError;
use crate::extractors::{JsonBody, RecordId};
use crate::response::{created, deleted, ok};
use crate::service::RecordService;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse};

pub async fn read_membership(
    State(state): State<AppState>,
    RecordId(student_id): RecordId,
) -> Result<impl IntoResponse, AppError> {
    let membership = RecordService::membership(state.store.as_ref(), student_id).await?;
    Ok(ok(membership))
}

pub async fn create_membership(
    State(state): State<AppState>,
    RecordId(student_id): RecordId,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let membership = RecordService::create_membership(state.store.as_ref(), student_id, body).await?;
    Ok(created(membership))
}

pub async fn update_membership(
    State(state): State<AppState>,
    RecordId(student_id): RecordId,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let membership = RecordService::update_membership(state.store.as_ref(), student_id, body).await?;
    Ok(ok(membership))
}

pub async fn delete_membership(
    State(state): State<AppState>,
    RecordId(student_id): RecordId,
) -> Result<impl IntoResponse, AppError> {
    RecordService::delete_membership(state.store.as_ref(), student_id).await?;
    Ok(deleted("library membership"))
}
