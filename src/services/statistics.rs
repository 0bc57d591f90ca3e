use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::{enrollments, students};
use crate::error::AppError;
use crate::models::{Enrollment, EnrollmentStatus, EnrollmentView, Student, Subject};

/// Aggregates derived from a student's enrollments. Always recomputed from
/// the store; nothing here is persisted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StudentStats {
    pub approved_subjects: Vec<Subject>,
    pub failed_subjects: Vec<Subject>,
    pub in_progress_subjects: Vec<Subject>,
    pub average_grade: Option<f64>,
    pub enrollments: Vec<EnrollmentView>,
}

impl StudentStats {
    pub fn from_records(records: Vec<(Enrollment, Subject)>) -> Self {
        let average_grade = average_grade(records.iter().map(|(e, _)| e));
        let mut stats = StudentStats {
            average_grade,
            ..Default::default()
        };

        for (enrollment, subject) in records {
            match enrollment.status() {
                EnrollmentStatus::Passed => stats.approved_subjects.push(subject),
                EnrollmentStatus::Failed => stats.failed_subjects.push(subject),
                EnrollmentStatus::InProgress => stats.in_progress_subjects.push(subject),
            }
            stats.enrollments.push(enrollment.into());
        }

        stats
    }
}

/// Mean of the graded enrollments; `None` when nothing is graded.
pub fn average_grade<'a>(enrollments: impl IntoIterator<Item = &'a Enrollment>) -> Option<f64> {
    let (sum, count) = enrollments
        .into_iter()
        .filter_map(|e| e.grade)
        .fold((0.0, 0usize), |(sum, count), g| (sum + g, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentReport {
    #[serde(flatten)]
    pub student: Student,
    #[serde(flatten)]
    pub stats: StudentStats,
}

pub async fn student_report(db: &SqlitePool, student_id: i64) -> Result<StudentReport, AppError> {
    let mut conn = db.acquire().await?;
    let student = students::find_student(&mut conn, student_id)
        .await?
        .ok_or_else(|| AppError::not_found("Student"))?;
    let records = enrollments::fetch_student_records(&mut conn, student_id).await?;

    Ok(StudentReport {
        student,
        stats: StudentStats::from_records(records),
    })
}

pub async fn enrolled_subjects(db: &SqlitePool, student_id: i64) -> Result<Vec<Subject>, AppError> {
    let mut conn = db.acquire().await?;
    students::find_student(&mut conn, student_id)
        .await?
        .ok_or_else(|| AppError::not_found("Student"))?;
    let records = enrollments::fetch_student_records(&mut conn, student_id).await?;

    Ok(records.into_iter().map(|(_, subject)| subject).collect())
}
