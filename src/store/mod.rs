//! Persistence gateway. Handlers only see `dyn Store`; PostgreSQL and in-memory backends implement it.

mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::{ensure_database_exists, PgStore};

use crate::error::AppError;
use crate::models::{
    LibraryMembership, MembershipPatch, NewMembership, NewProfessor, NewStudent, Professor,
    ProfessorPatch, Student, StudentPatch,
};
use crate::pagination::Page;
use async_trait::async_trait;

/// Keyed operations return `Ok(None)` on a miss; integrity violations (duplicate national ID,
/// second membership, dangling proctor) surface as errors from the backend.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<(), AppError>;

    /// Students ordered by id.
    async fn list_students(&self, page: Page) -> Result<Vec<Student>, AppError>;
    async fn get_student(&self, id: i32) -> Result<Option<Student>, AppError>;
    async fn students_by_proctor(&self, professor_id: i32) -> Result<Vec<Student>, AppError>;
    async fn create_student(&self, new: &NewStudent) -> Result<Student, AppError>;
    async fn update_student(&self, id: i32, patch: &StudentPatch) -> Result<Option<Student>, AppError>;
    async fn delete_student(&self, id: i32) -> Result<Option<Student>, AppError>;

    /// Professors ordered by id.
    async fn list_professors(&self) -> Result<Vec<Professor>, AppError>;
    async fn professors_by_ids(&self, ids: &[i32]) -> Result<Vec<Professor>, AppError>;
    async fn get_professor(&self, id: i32) -> Result<Option<Professor>, AppError>;
    async fn create_professor(&self, new: &NewProfessor) -> Result<Professor, AppError>;
    async fn update_professor(&self, id: i32, patch: &ProfessorPatch) -> Result<Option<Professor>, AppError>;
    /// Students proctored by the deleted professor lose their proctor.
    async fn delete_professor(&self, id: i32) -> Result<Option<Professor>, AppError>;

    async fn get_membership(&self, student_id: i32) -> Result<Option<LibraryMembership>, AppError>;
    async fn create_membership(&self, student_id: i32, new: &NewMembership) -> Result<LibraryMembership, AppError>;
    async fn update_membership(
        &self,
        student_id: i32,
        patch: &MembershipPatch,
    ) -> Result<Option<LibraryMembership>, AppError>;
    async fn delete_membership(&self, student_id: i32) -> Result<Option<LibraryMembership>, AppError>;
}
