use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::EnrollmentStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    pub id: i64,
    #[serde(rename = "student")]
    pub student_id: i64,
    #[serde(rename = "subject")]
    pub subject_id: i64,
    pub enrollment_date: NaiveDate,
    pub grade: Option<f64>,
}

impl Enrollment {
    pub fn status(&self) -> EnrollmentStatus {
        EnrollmentStatus::from_grade(self.grade)
    }

    pub fn is_passed(&self) -> bool {
        self.status() == EnrollmentStatus::Passed
    }
}

/// Wire shape of an enrollment, with its derived status attached.
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentView {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub is_passed: bool,
    pub status: EnrollmentStatus,
}

impl From<Enrollment> for EnrollmentView {
    fn from(enrollment: Enrollment) -> Self {
        Self {
            is_passed: enrollment.is_passed(),
            status: enrollment.status(),
            enrollment,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEnrollmentRequest {
    pub student: i64,
    pub subject: i64,
    #[serde(default)]
    pub grade: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrollRequest {
    pub student_id: Option<i64>,
    pub subject_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateGradeRequest {
    #[serde(default)]
    pub grade: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeEntry {
    pub student_id: i64,
    #[serde(default)]
    pub grade: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeSubjectRequest {
    pub subject_id: i64,
    pub grades: Vec<GradeEntry>,
}
