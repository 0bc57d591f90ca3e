use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::{enrollments, professors, students};
use crate::error::AppError;
use crate::models::{StudentSummary, Subject};

/// Students per assigned subject, keyed by subject name.
pub type Roster = BTreeMap<String, Vec<StudentSummary>>;

/// Grades per assigned subject, keyed by subject name.
pub type Gradebook = BTreeMap<String, Vec<GradebookEntry>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradebookEntry {
    pub student: i64,
    pub grade: Option<f64>,
}

async fn assigned_subjects(
    conn: &mut SqliteConnection,
    professor_id: i64,
) -> Result<Vec<Subject>, AppError> {
    professors::find_professor(conn, professor_id)
        .await?
        .ok_or_else(|| AppError::not_found("Professor"))?;

    Ok(professors::fetch_professor_subjects(conn, professor_id).await?)
}

pub async fn professor_subjects(
    db: &SqlitePool,
    professor_id: i64,
) -> Result<Vec<Subject>, AppError> {
    let mut conn = db.acquire().await?;
    assigned_subjects(&mut conn, professor_id).await
}

pub async fn professor_roster(db: &SqlitePool, professor_id: i64) -> Result<Roster, AppError> {
    let mut conn = db.acquire().await?;
    let mut roster = Roster::new();

    for subject in assigned_subjects(&mut conn, professor_id).await? {
        let enrolled = students::fetch_students_enrolled_in(&mut conn, subject.id).await?;
        let entry = roster.entry(subject.name).or_default();
        for student in enrolled {
            if !entry.iter().any(|s| s.id == student.id) {
                entry.push(student);
            }
        }
    }

    Ok(roster)
}

pub async fn professor_gradebook(
    db: &SqlitePool,
    professor_id: i64,
) -> Result<Gradebook, AppError> {
    let mut conn = db.acquire().await?;
    let mut gradebook = Gradebook::new();

    for subject in assigned_subjects(&mut conn, professor_id).await? {
        let rows = enrollments::fetch_subject_enrollments(&mut conn, subject.id).await?;
        gradebook
            .entry(subject.name)
            .or_default()
            .extend(rows.into_iter().map(|e| GradebookEntry {
                student: e.student_id,
                grade: e.grade,
            }));
    }

    Ok(gradebook)
}
