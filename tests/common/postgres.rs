//! PostgreSQL for integration tests. One container is shared by the whole test binary;
//! every test gets its own freshly migrated database inside it.

use campus_records::{apply_migrations, ensure_database_exists};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::atomic::{AtomicUsize, Ordering};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::{Mutex, OnceCell};

struct SharedPostgres {
    /// `postgres://…@host:port`, without a database path.
    base_url: String,
    _container: ContainerAsync<Postgres>,
}

static SHARED: OnceCell<SharedPostgres> = OnceCell::const_new();
static NEXT_DB: AtomicUsize = AtomicUsize::new(0);
// CREATE DATABASE copies template1 and fails if another session is copying it at the same time.
static CREATE_LOCK: Mutex<()> = Mutex::const_new(());

impl SharedPostgres {
    async fn init() -> Self {
        // RUST_LOG=campus_records=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let container = Postgres::default()
            .with_tag("16-alpine")
            .with_cmd(["-c", "max_connections=200"])
            .start()
            .await
            .expect("failed to start Postgres container");
        let host = container.get_host().await.expect("container host");
        let port = container
            .get_host_port_ipv4(5432)
            .await
            .expect("container port");

        SharedPostgres {
            base_url: format!("postgres://postgres:postgres@{}:{}", host, port),
            _container: container,
        }
    }

    async fn get() -> &'static Self {
        SHARED.get_or_init(Self::init).await
    }
}

/// URL of a new, empty database in the shared container. The database is created, not migrated.
pub async fn fresh_database_url() -> String {
    let shared = SharedPostgres::get().await;
    let n = NEXT_DB.fetch_add(1, Ordering::SeqCst);
    let url = format!("{}/campus_{}_{}", shared.base_url, std::process::id(), n);
    let _guard = CREATE_LOCK.lock().await;
    ensure_database_exists(&url)
        .await
        .expect("failed to create test database");
    url
}

/// Pool on a fresh database with the schema applied.
pub async fn fresh_pool() -> PgPool {
    let url = fresh_database_url().await;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("failed to connect to test database");
    apply_migrations(&pool)
        .await
        .expect("failed to apply migrations");
    pool
}
