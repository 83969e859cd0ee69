//! Response helpers. Records and lists are returned bare, without an envelope.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

/// Confirmation body for deletes.
#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}

pub fn ok<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}

pub fn deleted(what: &str) -> (StatusCode, Json<Message>) {
    (
        StatusCode::OK,
        Json(Message {
            message: format!("{} deleted", what),
        }),
    )
}
