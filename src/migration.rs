//! Bootstrap DDL for the three record tables. Safe to run on every start.

use crate::error::AppError;
use sqlx::PgPool;

/// `CREATE TYPE` has no `IF NOT EXISTS`; an existing type is tolerated.
const SENIORITY_TYPE: &str = "CREATE TYPE seniority AS ENUM ('JUNIOR', 'SENIOR', 'ASSOCIATE', 'HEAD')";

const TABLES: &[(&str, &str)] = &[
    (
        "professors",
        r#"
        CREATE TABLE IF NOT EXISTS professors (
            id SERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            seniority seniority NOT NULL,
            aadhar_number TEXT NOT NULL CHECK (aadhar_number ~ '^[0-9]{12}$'),
            CONSTRAINT professors_aadhar_number_key UNIQUE (aadhar_number)
        )
        "#,
    ),
    (
        "students",
        r#"
        CREATE TABLE IF NOT EXISTS students (
            id SERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            date_of_birth DATE NOT NULL,
            aadhar_number TEXT NOT NULL CHECK (aadhar_number ~ '^[0-9]{12}$'),
            proctor_id INTEGER,
            CONSTRAINT students_aadhar_number_key UNIQUE (aadhar_number),
            CONSTRAINT students_proctor_id_fkey FOREIGN KEY (proctor_id)
                REFERENCES professors (id) ON DELETE SET NULL
        )
        "#,
    ),
    (
        "library_memberships",
        r#"
        CREATE TABLE IF NOT EXISTS library_memberships (
            id SERIAL PRIMARY KEY,
            student_id INTEGER NOT NULL,
            issue_date DATE NOT NULL,
            expiry_date DATE NOT NULL,
            CONSTRAINT library_memberships_student_id_key UNIQUE (student_id),
            CONSTRAINT library_memberships_student_id_fkey FOREIGN KEY (student_id)
                REFERENCES students (id) ON DELETE RESTRICT
        )
        "#,
    ),
];

const INDEXES: &[&str] = &["CREATE INDEX IF NOT EXISTS students_proctor_id_idx ON students (proctor_id)"];

/// Create the seniority enum, tables (dependency order) and indexes.
pub async fn apply_migrations(pool: &PgPool) -> Result<(), AppError> {
    if let Err(e) = sqlx::query(SENIORITY_TYPE).execute(pool).await {
        tracing::debug!(error = %e, "seniority type not created (likely exists)");
    }
    for (name, ddl) in TABLES {
        tracing::debug!(table = %name, "ensure table");
        sqlx::query(ddl).execute(pool).await?;
    }
    for ddl in INDEXES {
        sqlx::query(ddl).execute(pool).await?;
    }
    tracing::info!(tables = TABLES.len(), "schema ready");
    Ok(())
}
