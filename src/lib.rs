//! Campus records: REST service for students, professors and library memberships.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod models;
pub mod pagination;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;
pub mod state;
pub mod store;

pub use error::{AppError, ConfigError, Violation};
pub use migration::apply_migrations;
pub use routes::{build_router, common_routes, record_routes};
pub use service::RecordService;
pub use settings::Settings;
pub use state::AppState;
pub use store::{ensure_database_exists, MemoryStore, PgStore, Store};
