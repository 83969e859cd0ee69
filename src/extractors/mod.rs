//! Request extractors that reject with `AppError`, so malformed input still gets a JSON error body.

mod json;
mod record_id;

pub use json::JsonBody;
pub use record_id::RecordId;
