//! Server: loads settings, prepares the store (PostgreSQL or in-memory), mounts routes and serves.

use campus_records::{
    apply_migrations, build_router, ensure_database_exists, AppState, MemoryStore, PgStore, Settings, Store,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("campus_records=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let store: Arc<dyn Store> = if settings.uses_memory_store() {
        tracing::info!("using in-memory store");
        Arc::new(MemoryStore::new())
    } else {
        ensure_database_exists(&settings.database_url).await?;
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(&settings.database_url)
            .await?;
        apply_migrations(&pool).await?;
        Arc::new(PgStore::new(pool))
    };

    let app = build_router(AppState::new(store), settings.body_limit_bytes);
    let listener = TcpListener::bind(("0.0.0.0", settings.port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
