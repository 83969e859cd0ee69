//! Record operations: validation, existence checks and enrichment over a `Store`.

use super::validation::{
    body_to_map, RequestValidator, RuleSet, MEMBERSHIP_RULES, PROFESSOR_RULES, STUDENT_RULES,
};
use crate::error::AppError;
use crate::models::{
    LibraryMembership, MembershipPatch, NewMembership, NewProfessor, NewStudent, Professor,
    ProfessorPatch, Student, StudentPatch, StudentWithProctor,
};
use crate::pagination::Page;
use crate::store::Store;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Body of `POST /professors/:id/proctorships`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProctorshipRequest {
    student_id: i32,
}

const PROCTORSHIP_RULES: RuleSet = &[("studentId", super::validation::FieldRule::integer())];

/// Validated create payload → typed value.
fn parse_new<T: DeserializeOwned>(body: Value, rules: RuleSet) -> Result<T, AppError> {
    let map = body_to_map(body)?;
    RequestValidator::validate(&map, rules)?;
    from_map(map)
}

/// Validated patch payload → typed patch. Unknown keys are rejected by the patch type.
fn parse_patch<T: DeserializeOwned>(body: Value, rules: RuleSet) -> Result<T, AppError> {
    let map = body_to_map(body)?;
    RequestValidator::validate_partial(&map, rules)?;
    from_map(map)
}

fn from_map<T: DeserializeOwned>(map: Map<String, Value>) -> Result<T, AppError> {
    serde_json::from_value(Value::Object(map)).map_err(|e| AppError::BadRequest(e.to_string()))
}

fn empty_patch() -> AppError {
    AppError::BadRequest("update body must contain at least one field".into())
}

pub struct RecordService;

impl RecordService {
    pub async fn list_students(store: &dyn Store, page: Page) -> Result<Vec<Student>, AppError> {
        store.list_students(page).await
    }

    /// One page of students, each with its proctor (batch-loaded) or `null`.
    pub async fn list_students_enriched(store: &dyn Store, page: Page) -> Result<Vec<StudentWithProctor>, AppError> {
        let students = store.list_students(page).await?;
        let mut proctor_ids: Vec<i32> = students.iter().filter_map(|s| s.proctor_id).collect();
        proctor_ids.sort_unstable();
        proctor_ids.dedup();
        let proctors: HashMap<i32, Professor> = store
            .professors_by_ids(&proctor_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        Ok(students
            .into_iter()
            .map(|student| {
                let proctor = student.proctor_id.and_then(|id| proctors.get(&id).cloned());
                StudentWithProctor { student, proctor }
            })
            .collect())
    }

    pub async fn student(store: &dyn Store, id: i32) -> Result<Student, AppError> {
        store
            .get_student(id)
            .await?
            .ok_or_else(|| AppError::not_found("student", id))
    }

    pub async fn create_student(store: &dyn Store, body: Value) -> Result<Student, AppError> {
        let new: NewStudent = parse_new(body, STUDENT_RULES)?;
        let student = store.create_student(&new).await?;
        tracing::info!(student_id = student.id, "student created");
        Ok(student)
    }

    pub async fn update_student(store: &dyn Store, id: i32, body: Value) -> Result<Student, AppError> {
        let patch: StudentPatch = parse_patch(body, STUDENT_RULES)?;
        if patch.is_empty() {
            return Err(empty_patch());
        }
        store
            .update_student(id, &patch)
            .await?
            .ok_or_else(|| AppError::not_found("student", id))
    }

    pub async fn delete_student(store: &dyn Store, id: i32) -> Result<Student, AppError> {
        let student = store
            .delete_student(id)
            .await?
            .ok_or_else(|| AppError::not_found("student", id))?;
        tracing::info!(student_id = id, "student deleted");
        Ok(student)
    }

    pub async fn list_professors(store: &dyn Store) -> Result<Vec<Professor>, AppError> {
        store.list_professors().await
    }

    pub async fn professor(store: &dyn Store, id: i32) -> Result<Professor, AppError> {
        store
            .get_professor(id)
            .await?
            .ok_or_else(|| AppError::not_found("professor", id))
    }

    pub async fn create_professor(store: &dyn Store, body: Value) -> Result<Professor, AppError> {
        let new: NewProfessor = parse_new(body, PROFESSOR_RULES)?;
        let professor = store.create_professor(&new).await?;
        tracing::info!(professor_id = professor.id, "professor created");
        Ok(professor)
    }

    pub async fn update_professor(store: &dyn Store, id: i32, body: Value) -> Result<Professor, AppError> {
        let patch: ProfessorPatch = parse_patch(body, PROFESSOR_RULES)?;
        if patch.is_empty() {
            return Err(empty_patch());
        }
        store
            .update_professor(id, &patch)
            .await?
            .ok_or_else(|| AppError::not_found("professor", id))
    }

    pub async fn delete_professor(store: &dyn Store, id: i32) -> Result<Professor, AppError> {
        let professor = store
            .delete_professor(id)
            .await?
            .ok_or_else(|| AppError::not_found("professor", id))?;
        tracing::info!(professor_id = id, "professor deleted");
        Ok(professor)
    }

    pub async fn proctored_students(store: &dyn Store, professor_id: i32) -> Result<Vec<Student>, AppError> {
        Self::professor(store, professor_id).await?;
        store.students_by_proctor(professor_id).await
    }

    /// Make `professor_id` the proctor of the student named in the body; returns the updated student.
    pub async fn assign_proctor(store: &dyn Store, professor_id: i32, body: Value) -> Result<Student, AppError> {
        let request: ProctorshipRequest = parse_new(body, PROCTORSHIP_RULES)?;
        Self::professor(store, professor_id).await?;
        let student = store
            .update_student(request.student_id, &StudentPatch::assign_proctor(professor_id))
            .await?
            .ok_or_else(|| AppError::not_found("student", request.student_id))?;
        tracing::info!(professor_id, student_id = student.id, "proctor assigned");
        Ok(student)
    }

    pub async fn membership(store: &dyn Store, student_id: i32) -> Result<LibraryMembership, AppError> {
        store
            .get_membership(student_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("library membership for student {} not found", student_id)))
    }

    pub async fn create_membership(store: &dyn Store, student_id: i32, body: Value) -> Result<LibraryMembership, AppError> {
        let new: NewMembership = parse_new(body, MEMBERSHIP_RULES)?;
        RequestValidator::validate_membership_window(new.issue_date, new.expiry_date)?;
        Self::student(store, student_id).await?;
        let membership = store.create_membership(student_id, &new).await?;
        tracing::info!(student_id, membership_id = membership.id, "library membership issued");
        Ok(membership)
    }

    /// The resulting validity window is checked against the stored dates the patch leaves untouched.
    pub async fn update_membership(store: &dyn Store, student_id: i32, body: Value) -> Result<LibraryMembership, AppError> {
        let patch: MembershipPatch = parse_patch(body, MEMBERSHIP_RULES)?;
        if patch.is_empty() {
            return Err(empty_patch());
        }
        let mut merged = Self::membership(store, student_id).await?;
        patch.apply(&mut merged);
        RequestValidator::validate_membership_window(merged.issue_date, merged.expiry_date)?;
        store
            .update_membership(student_id, &patch)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("library membership for student {} not found", student_id)))
    }

    pub async fn delete_membership(store: &dyn Store, student_id: i32) -> Result<LibraryMembership, AppError> {
        store
            .delete_membership(student_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("library membership for student {} not found", student_id)))
    }
}
