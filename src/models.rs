//! Record types: stored rows, create payloads and partial updates.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "seniority", rename_all = "UPPERCASE")]
pub enum Seniority {
    Junior,
    Senior,
    Associate,
    Head,
}

impl Seniority {
    /// Wire names, in declaration order.
    pub const NAMES: &'static [&'static str] = &["JUNIOR", "SENIOR", "ASSOCIATE", "HEAD"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i32,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub aadhar_number: String,
    pub proctor_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Professor {
    pub id: i32,
    pub name: String,
    pub seniority: Seniority,
    pub aadhar_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LibraryMembership {
    pub id: i32,
    pub student_id: i32,
    pub issue_date: NaiveDate,
    pub expiry_date: NaiveDate,
}

/// Student row with its proctor resolved; `proctor` is `null` when unassigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentWithProctor {
    #[serde(flatten)]
    pub student: Student,
    pub proctor: Option<Professor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub aadhar_number: String,
    #[serde(default)]
    pub proctor_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfessor {
    pub name: String,
    pub seniority: Seniority,
    pub aadhar_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMembership {
    pub issue_date: NaiveDate,
    pub expiry_date: NaiveDate,
}

/// Mutable student fields. `proctorId: null` clears the proctor; an absent key leaves it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub aadhar_number: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub proctor_id: Option<Option<i32>>,
}

impl StudentPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.date_of_birth.is_none()
            && self.aadhar_number.is_none()
            && self.proctor_id.is_none()
    }

    pub fn assign_proctor(professor_id: i32) -> Self {
        StudentPatch {
            proctor_id: Some(Some(professor_id)),
            ..Default::default()
        }
    }

    pub fn apply(&self, student: &mut Student) {
        if let Some(name) = &self.name {
            student.name = name.clone();
        }
        if let Some(dob) = self.date_of_birth {
            student.date_of_birth = dob;
        }
        if let Some(aadhar) = &self.aadhar_number {
            student.aadhar_number = aadhar.clone();
        }
        if let Some(proctor) = self.proctor_id {
            student.proctor_id = proctor;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfessorPatch {
    pub name: Option<String>,
    pub seniority: Option<Seniority>,
    pub aadhar_number: Option<String>,
}

impl ProfessorPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.seniority.is_none() && self.aadhar_number.is_none()
    }

    pub fn apply(&self, professor: &mut Professor) {
        if let Some(name) = &self.name {
            professor.name = name.clone();
        }
        if let Some(seniority) = self.seniority {
            professor.seniority = seniority;
        }
        if let Some(aadhar) = &self.aadhar_number {
            professor.aadhar_number = aadhar.clone();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MembershipPatch {
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
}

impl MembershipPatch {
    pub fn is_empty(&self) -> bool {
        self.issue_date.is_none() && self.expiry_date.is_none()
    }

    pub fn apply(&self, membership: &mut LibraryMembership) {
        if let Some(issue) = self.issue_date {
            membership.issue_date = issue;
        }
        if let Some(expiry) = self.expiry_date {
            membership.expiry_date = expiry;
        }
    }
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent key (`None`, via `#[serde(default)]`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
