//! In-process store for local runs (`DATABASE_URL=memory://`) and tests.
//! Enforces the same integrity rules as the PostgreSQL schema.

use super::Store;
use crate::error::AppError;
use crate::models::{
    LibraryMembership, MembershipPatch, NewMembership, NewProfessor, NewStudent, Professor,
    ProfessorPatch, Student, StudentPatch,
};
use crate::pagination::Page;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Tables {
    students: BTreeMap<i32, Student>,
    professors: BTreeMap<i32, Professor>,
    /// Keyed by student id: one membership per student.
    memberships: BTreeMap<i32, LibraryMembership>,
    last_student_id: i32,
    last_professor_id: i32,
    last_membership_id: i32,
}

impl Tables {
    fn check_student(&self, candidate: &Student) -> Result<(), AppError> {
        if self
            .students
            .values()
            .any(|s| s.id != candidate.id && s.aadhar_number == candidate.aadhar_number)
        {
            return Err(AppError::Constraint(format!(
                "duplicate key value violates unique constraint \"students_aadhar_number_key\": {}",
                candidate.aadhar_number
            )));
        }
        if let Some(proctor) = candidate.proctor_id {
            if !self.professors.contains_key(&proctor) {
                return Err(AppError::Constraint(format!(
                    "foreign key violation \"students_proctor_id_fkey\": professor {} does not exist",
                    proctor
                )));
            }
        }
        Ok(())
    }

    fn check_professor(&self, candidate: &Professor) -> Result<(), AppError> {
        if self
            .professors
            .values()
            .any(|p| p.id != candidate.id && p.aadhar_number == candidate.aadhar_number)
        {
            return Err(AppError::Constraint(format!(
                "duplicate key value violates unique constraint \"professors_aadhar_number_key\": {}",
                candidate.aadhar_number
            )));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn list_students(&self, page: Page) -> Result<Vec<Student>, AppError> {
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        Ok(self
            .read()
            .students
            .values()
            .skip(offset)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn get_student(&self, id: i32) -> Result<Option<Student>, AppError> {
        Ok(self.read().students.get(&id).cloned())
    }

    async fn students_by_proctor(&self, professor_id: i32) -> Result<Vec<Student>, AppError> {
        Ok(self
            .read()
            .students
            .values()
            .filter(|s| s.proctor_id == Some(professor_id))
            .cloned()
            .collect())
    }

    async fn create_student(&self, new: &NewStudent) -> Result<Student, AppError> {
        let mut t = self.write();
        let student = Student {
            id: t.last_student_id + 1,
            name: new.name.clone(),
            date_of_birth: new.date_of_birth,
            aadhar_number: new.aadhar_number.clone(),
            proctor_id: new.proctor_id,
        };
        t.check_student(&student)?;
        t.last_student_id = student.id;
        t.students.insert(student.id, student.clone());
        Ok(student)
    }

    async fn update_student(&self, id: i32, patch: &StudentPatch) -> Result<Option<Student>, AppError> {
        let mut t = self.write();
        let Some(mut student) = t.students.get(&id).cloned() else {
            return Ok(None);
        };
        patch.apply(&mut student);
        t.check_student(&student)?;
        t.students.insert(id, student.clone());
        Ok(Some(student))
    }

    async fn delete_student(&self, id: i32) -> Result<Option<Student>, AppError> {
        let mut t = self.write();
        if t.students.contains_key(&id) && t.memberships.contains_key(&id) {
            return Err(AppError::Constraint(format!(
                "foreign key violation \"library_memberships_student_id_fkey\": student {} still has a library membership",
                id
            )));
        }
        Ok(t.students.remove(&id))
    }

    async fn list_professors(&self) -> Result<Vec<Professor>, AppError> {
        Ok(self.read().professors.values().cloned().collect())
    }

    async fn professors_by_ids(&self, ids: &[i32]) -> Result<Vec<Professor>, AppError> {
        let t = self.read();
        Ok(t.professors
            .values()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn get_professor(&self, id: i32) -> Result<Option<Professor>, AppError> {
        Ok(self.read().professors.get(&id).cloned())
    }

    async fn create_professor(&self, new: &NewProfessor) -> Result<Professor, AppError> {
        let mut t = self.write();
        let professor = Professor {
            id: t.last_professor_id + 1,
            name: new.name.clone(),
            seniority: new.seniority,
            aadhar_number: new.aadhar_number.clone(),
        };
        t.check_professor(&professor)?;
        t.last_professor_id = professor.id;
        t.professors.insert(professor.id, professor.clone());
        Ok(professor)
    }

    async fn update_professor(&self, id: i32, patch: &ProfessorPatch) -> Result<Option<Professor>, AppError> {
        let mut t = self.write();
        let Some(mut professor) = t.professors.get(&id).cloned() else {
            return Ok(None);
        };
        patch.apply(&mut professor);
        t.check_professor(&professor)?;
        t.professors.insert(id, professor.clone());
        Ok(Some(professor))
    }

    async fn delete_professor(&self, id: i32) -> Result<Option<Professor>, AppError> {
        let mut t = self.write();
        let removed = t.professors.remove(&id);
        if removed.is_some() {
            for student in t.students.values_mut() {
                if student.proctor_id == Some(id) {
                    student.proctor_id = None;
                }
            }
        }
        Ok(removed)
    }

    async fn get_membership(&self, student_id: i32) -> Result<Option<LibraryMembership>, AppError> {
        Ok(self.read().memberships.get(&student_id).cloned())
    }

    async fn create_membership(&self, student_id: i32, new: &NewMembership) -> Result<LibraryMembership, AppError> {
        let mut t = self.write();
        if !t.students.contains_key(&student_id) {
            return Err(AppError::Constraint(format!(
                "foreign key violation \"library_memberships_student_id_fkey\": student {} does not exist",
                student_id
            )));
        }
        if t.memberships.contains_key(&student_id) {
            return Err(AppError::Constraint(format!(
                "duplicate key value violates unique constraint \"library_memberships_student_id_key\": {}",
                student_id
            )));
        }
        let membership = LibraryMembership {
            id: t.last_membership_id + 1,
            student_id,
            issue_date: new.issue_date,
            expiry_date: new.expiry_date,
        };
        t.last_membership_id = membership.id;
        t.memberships.insert(student_id, membership.clone());
        Ok(membership)
    }

    async fn update_membership(
        &self,
        student_id: i32,
        patch: &MembershipPatch,
    ) -> Result<Option<LibraryMembership>, AppError> {
        let mut t = self.write();
        Ok(t.memberships.get_mut(&student_id).map(|m| {
            patch.apply(m);
            m.clone()
        }))
    }

    async fn delete_membership(&self, student_id: i32) -> Result<Option<LibraryMembership>, AppError> {
        Ok(self.write().memberships.remove(&student_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Seniority;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn new_student(name: &str, aadhar: &str) -> NewStudent {
        NewStudent {
            name: name.into(),
            date_of_birth: date("2003-04-05"),
            aadhar_number: aadhar.into(),
            proctor_id: None,
        }
    }

    fn new_professor(aadhar: &str) -> NewProfessor {
        NewProfessor {
            name: "Dr. Rao".into(),
            seniority: Seniority::Senior,
            aadhar_number: aadhar.into(),
        }
    }

    #[tokio::test]
    async fn ids_are_sequential_and_listing_pages() {
        let store = MemoryStore::new();
        for i in 0..12 {
            store
                .create_student(&new_student("s", &format!("{:012}", i)))
                .await
                .unwrap();
        }
        let page = store.list_students(Page::new(2, 5)).await.unwrap();
        let ids: Vec<i32> = page.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![6, 7, 8, 9, 10]);
        let last = store.list_students(Page::new(3, 5)).await.unwrap();
        assert_eq!(last.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_national_id_rejected() {
        let store = MemoryStore::new();
        store.create_student(&new_student("a", "111111111111")).await.unwrap();
        let err = store
            .create_student(&new_student("b", "111111111111"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Constraint(_)));
    }

    #[tokio::test]
    async fn dangling_proctor_rejected() {
        let store = MemoryStore::new();
        let mut s = new_student("a", "111111111111");
        s.proctor_id = Some(42);
        assert!(store.create_student(&s).await.is_err());
        assert!(store.list_students(Page::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_professor_clears_proctor() {
        let store = MemoryStore::new();
        let p = store.create_professor(&new_professor("222222222222")).await.unwrap();
        let s = store.create_student(&new_student("a", "111111111111")).await.unwrap();
        store
            .update_student(s.id, &StudentPatch::assign_proctor(p.id))
            .await
            .unwrap();
        assert_eq!(store.students_by_proctor(p.id).await.unwrap().len(), 1);
        store.delete_professor(p.id).await.unwrap();
        assert_eq!(store.get_student(s.id).await.unwrap().unwrap().proctor_id, None);
    }

    #[tokio::test]
    async fn one_membership_per_student() {
        let store = MemoryStore::new();
        let s = store.create_student(&new_student("a", "111111111111")).await.unwrap();
        let m = NewMembership {
            issue_date: date("2024-01-01"),
            expiry_date: date("2025-01-01"),
        };
        store.create_membership(s.id, &m).await.unwrap();
        assert!(matches!(
            store.create_membership(s.id, &m).await,
            Err(AppError::Constraint(_))
        ));
    }

    #[tokio::test]
    async fn student_with_membership_cannot_be_deleted() {
        let store = MemoryStore::new();
        let s = store.create_student(&new_student("a", "111111111111")).await.unwrap();
        let m = NewMembership {
            issue_date: date("2024-01-01"),
            expiry_date: date("2025-01-01"),
        };
        store.create_membership(s.id, &m).await.unwrap();
        assert!(store.delete_student(s.id).await.is_err());
        store.delete_membership(s.id).await.unwrap();
        assert!(store.delete_student(s.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn missing_rows_are_none() {
        let store = MemoryStore::new();
        assert!(store.delete_student(9).await.unwrap().is_none());
        assert!(store
            .update_professor(9, &ProfessorPatch::default())
            .await
            .unwrap()
            .is_none());
        assert!(store.get_membership(9).await.unwrap().is_none());
    }
}
