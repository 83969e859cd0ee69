//! Student handlers: paged lists, read, create, partial update, delete.

use crate::error::AppError;
use crate::extractors::{JsonBody, RecordId};
use crate::pagination::Page;
use crate::response::{created, deleted, ok};
use crate::service::RecordService;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use std::collections::HashMap;

pub async fn list_students(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let page = Page::from_params(&params);
    let rows = RecordService::list_students(state.store.as_ref(), page).await?;
    Ok(ok(rows))
}

pub async fn list_students_enriched(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let page = Page::from_params(&params);
    let rows = RecordService::list_students_enriched(state.store.as_ref(), page).await?;
    Ok(ok(rows))
}

pub async fn read_student(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<impl IntoResponse, AppError> {
    let student = RecordService::student(state.store.as_ref(), id).await?;
    Ok(ok(student))
}

pub async fn create_student(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let student = RecordService::create_student(state.store.as_ref(), body).await?;
    Ok(created(student))
}

pub async fn update_student(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let student = RecordService::update_student(state.store.as_ref(), id, body).await?;
    Ok(ok(student))
}

pub async fn delete_student(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<impl IntoResponse, AppError> {
    RecordService::delete_student(state.store.as_ref(), id).await?;
    Ok(deleted("student"))
}
