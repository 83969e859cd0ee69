//! PostgreSQL store. Integrity rules live in the schema (see `migration`); sqlx errors propagate as `AppError::Db`.

use super::Store;
use crate::error::{AppError, ConfigError};
use crate::models::{
    LibraryMembership, MembershipPatch, NewMembership, NewProfessor, NewStudent, Professor,
    ProfessorPatch, Student, StudentPatch,
};
use crate::pagination::Page;
use async_trait::async_trait;
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

const STUDENT_COLUMNS: &str = "id, name, date_of_birth, aadhar_number, proctor_id";
const PROFESSOR_COLUMNS: &str = "id, name, seniority, aadhar_number";
const MEMBERSHIP_COLUMNS: &str = "id, student_id, issue_date, expiry_date";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

fn log_query(sql: &str) {
    tracing::debug!(sql = %sql, "query");
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }

    async fn list_students(&self, page: Page) -> Result<Vec<Student>, AppError> {
        let sql = format!("SELECT {} FROM students ORDER BY id LIMIT $1 OFFSET $2", STUDENT_COLUMNS);
        log_query(&sql);
        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, Student>(&sql)
            .bind(i64::from(page.limit))
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_student(&self, id: i32) -> Result<Option<Student>, AppError> {
        let sql = format!("SELECT {} FROM students WHERE id = $1", STUDENT_COLUMNS);
        log_query(&sql);
        let row = sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn students_by_proctor(&self, professor_id: i32) -> Result<Vec<Student>, AppError> {
        let sql = format!("SELECT {} FROM students WHERE proctor_id = $1 ORDER BY id", STUDENT_COLUMNS);
        log_query(&sql);
        let rows = sqlx::query_as::<_, Student>(&sql)
            .bind(professor_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn create_student(&self, new: &NewStudent) -> Result<Student, AppError> {
        let sql = format!(
            "INSERT INTO students (name, date_of_birth, aadhar_number, proctor_id) VALUES ($1, $2, $3, $4) RETURNING {}",
            STUDENT_COLUMNS
        );
        log_query(&sql);
        let row = sqlx::query_as::<_, Student>(&sql)
            .bind(&new.name)
            .bind(new.date_of_birth)
            .bind(&new.aadhar_number)
            .bind(new.proctor_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_student(&self, id: i32, patch: &StudentPatch) -> Result<Option<Student>, AppError> {
        let sql = format!(
            r#"
            UPDATE students SET
                name = COALESCE($2, name),
                date_of_birth = COALESCE($3, date_of_birth),
                aadhar_number = COALESCE($4, aadhar_number),
                proctor_id = CASE WHEN $5 THEN $6 ELSE proctor_id END
            WHERE id = $1
            RETURNING {}
            "#,
            STUDENT_COLUMNS
        );
        log_query(&sql);
        let row = sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .bind(patch.name.as_deref())
            .bind(patch.date_of_birth)
            .bind(patch.aadhar_number.as_deref())
            .bind(patch.proctor_id.is_some())
            .bind(patch.proctor_id.flatten())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_student(&self, id: i32) -> Result<Option<Student>, AppError> {
        let sql = format!("DELETE FROM students WHERE id = $1 RETURNING {}", STUDENT_COLUMNS);
        log_query(&sql);
        let row = sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_professors(&self) -> Result<Vec<Professor>, AppError> {
        let sql = format!("SELECT {} FROM professors ORDER BY id", PROFESSOR_COLUMNS);
        log_query(&sql);
        let rows = sqlx::query_as::<_, Professor>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn professors_by_ids(&self, ids: &[i32]) -> Result<Vec<Professor>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {} FROM professors WHERE id = ANY($1) ORDER BY id", PROFESSOR_COLUMNS);
        log_query(&sql);
        let rows = sqlx::query_as::<_, Professor>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_professor(&self, id: i32) -> Result<Option<Professor>, AppError> {
        let sql = format!("SELECT {} FROM professors WHERE id = $1", PROFESSOR_COLUMNS);
        log_query(&sql);
        let row = sqlx::query_as::<_, Professor>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_professor(&self, new: &NewProfessor) -> Result<Professor, AppError> {
        let sql = format!(
            "INSERT INTO professors (name, seniority, aadhar_number) VALUES ($1, $2, $3) RETURNING {}",
            PROFESSOR_COLUMNS
        );
        log_query(&sql);
        let row = sqlx::query_as::<_, Professor>(&sql)
            .bind(&new.name)
            .bind(new.seniority)
            .bind(&new.aadhar_number)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_professor(&self, id: i32, patch: &ProfessorPatch) -> Result<Option<Professor>, AppError> {
        let sql = format!(
            r#"
            UPDATE professors SET
                name = COALESCE($2, name),
                seniority = COALESCE($3, seniority),
                aadhar_number = COALESCE($4, aadhar_number)
            WHERE id = $1
            RETURNING {}
            "#,
            PROFESSOR_COLUMNS
        );
        log_query(&sql);
        let row = sqlx::query_as::<_, Professor>(&sql)
            .bind(id)
            .bind(patch.name.as_deref())
            .bind(patch.seniority)
            .bind(patch.aadhar_number.as_deref())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_professor(&self, id: i32) -> Result<Option<Professor>, AppError> {
        let sql = format!("DELETE FROM professors WHERE id = $1 RETURNING {}", PROFESSOR_COLUMNS);
        log_query(&sql);
        let row = sqlx::query_as::<_, Professor>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_membership(&self, student_id: i32) -> Result<Option<LibraryMembership>, AppError> {
        let sql = format!("SELECT {} FROM library_memberships WHERE student_id = $1", MEMBERSHIP_COLUMNS);
        log_query(&sql);
        let row = sqlx::query_as::<_, LibraryMembership>(&sql)
            .bind(student_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_membership(&self, student_id: i32, new: &NewMembership) -> Result<LibraryMembership, AppError> {
        let sql = format!(
            "INSERT INTO library_memberships (student_id, issue_date, expiry_date) VALUES ($1, $2, $3) RETURNING {}",
            MEMBERSHIP_COLUMNS
        );
        log_query(&sql);
        let row = sqlx::query_as::<_, LibraryMembership>(&sql)
            .bind(student_id)
            .bind(new.issue_date)
            .bind(new.expiry_date)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_membership(
        &self,
        student_id: i32,
        patch: &MembershipPatch,
    ) -> Result<Option<LibraryMembership>, AppError> {
        let sql = format!(
            r#"
            UPDATE library_memberships SET
                issue_date = COALESCE($2, issue_date),
                expiry_date = COALESCE($3, expiry_date)
            WHERE student_id = $1
            RETURNING {}
            "#,
            MEMBERSHIP_COLUMNS
        );
        log_query(&sql);
        let row = sqlx::query_as::<_, LibraryMembership>(&sql)
            .bind(student_id)
            .bind(patch.issue_date)
            .bind(patch.expiry_date)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_membership(&self, student_id: i32) -> Result<Option<LibraryMembership>, AppError> {
        let sql = format!(
            "DELETE FROM library_memberships WHERE student_id = $1 RETURNING {}",
            MEMBERSHIP_COLUMNS
        );
        log_query(&sql);
        let row = sqlx::query_as::<_, LibraryMembership>(&sql)
            .bind(student_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

/// Connect to the `postgres` maintenance database and create the target database if it does not exist.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| ConfigError::DatabaseUrl(e.to_string()))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), ConfigError> {
    let scheme_end = url
        .find("://")
        .ok_or_else(|| ConfigError::DatabaseUrl("missing scheme".into()))?
        + 3;
    let path_start = match url.get(scheme_end..).and_then(|rest| rest.find('/')) {
        Some(i) => scheme_end + i + 1,
        None => return Ok((url.to_string(), String::new())),
    };
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_database_name() {
        let (admin, db) = parse_db_name_from_url("postgres://u:p@localhost:5432/campus?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(db, "campus");
    }

    #[test]
    fn url_without_database() {
        let (_, db) = parse_db_name_from_url("postgres://localhost").unwrap();
        assert_eq!(db, "");
    }

    #[test]
    fn url_without_scheme_is_rejected() {
        assert!(parse_db_name_from_url("localhost/campus").is_err());
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
