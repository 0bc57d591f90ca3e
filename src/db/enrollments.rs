use chrono::NaiveDate;
use sqlx::{FromRow, SqliteConnection};

use crate::models::{Enrollment, Subject};

#[derive(Debug, FromRow)]
struct EnrollmentSubjectRow {
    id: i64,
    student_id: i64,
    subject_id: i64,
    enrollment_date: NaiveDate,
    grade: Option<f64>,
    subject_name: String,
    subject_description: String,
}

impl From<EnrollmentSubjectRow> for (Enrollment, Subject) {
    fn from(row: EnrollmentSubjectRow) -> Self {
        (
            Enrollment {
                id: row.id,
                student_id: row.student_id,
                subject_id: row.subject_id,
                enrollment_date: row.enrollment_date,
                grade: row.grade,
            },
            Subject {
                id: row.subject_id,
                name: row.subject_name,
                description: row.subject_description,
            },
        )
    }
}

pub async fn fetch_enrollments(conn: &mut SqliteConnection) -> Result<Vec<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(
        "SELECT id, student_id, subject_id, enrollment_date, grade FROM enrollments ORDER BY id",
    )
    .fetch_all(&mut *conn)
    .await
}

pub async fn find_enrollment(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(
        "SELECT id, student_id, subject_id, enrollment_date, grade FROM enrollments WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn find_enrollment_for(
    conn: &mut SqliteConnection,
    student_id: i64,
    subject_id: i64,
) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(
        r#"
        SELECT id, student_id, subject_id, enrollment_date, grade
        FROM enrollments
        WHERE student_id = ?1 AND subject_id = ?2
        "#,
    )
    .bind(student_id)
    .bind(subject_id)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn insert_enrollment(
    conn: &mut SqliteConnection,
    student_id: i64,
    subject_id: i64,
    enrollment_date: NaiveDate,
    grade: Option<f64>,
) -> Result<Enrollment, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(
        r#"
        INSERT INTO enrollments (student_id, subject_id, enrollment_date, grade)
        VALUES (?1, ?2, ?3, ?4)
        RETURNING id, student_id, subject_id, enrollment_date, grade
        "#,
    )
    .bind(student_id)
    .bind(subject_id)
    .bind(enrollment_date)
    .bind(grade)
    .fetch_one(&mut *conn)
    .await
}

pub async fn set_grade(
    conn: &mut SqliteConnection,
    id: i64,
    grade: f64,
) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(
        r#"
        UPDATE enrollments
        SET grade = ?1
        WHERE id = ?2
        RETURNING id, student_id, subject_id, enrollment_date, grade
        "#,
    )
    .bind(grade)
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
}

/// Grades every enrollment of `student_id` in `subject_id`; returns rows touched.
pub async fn set_grade_for(
    conn: &mut SqliteConnection,
    student_id: i64,
    subject_id: i64,
    grade: f64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE enrollments SET grade = ?1 WHERE student_id = ?2 AND subject_id = ?3",
    )
    .bind(grade)
    .bind(student_id)
    .bind(subject_id)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    Ok(result)
}

pub async fn delete_enrollment(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM enrollments WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn fetch_student_enrollments(
    conn: &mut SqliteConnection,
    student_id: i64,
) -> Result<Vec<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(
        r#"
        SELECT id, student_id, subject_id, enrollment_date, grade
        FROM enrollments
        WHERE student_id = ?
        ORDER BY id
        "#,
    )
    .bind(student_id)
    .fetch_all(&mut *conn)
    .await
}

/// A student's enrollments, each paired with its subject.
pub async fn fetch_student_records(
    conn: &mut SqliteConnection,
    student_id: i64,
) -> Result<Vec<(Enrollment, Subject)>, sqlx::Error> {
    let rows = sqlx::query_as::<_, EnrollmentSubjectRow>(
        r#"
        SELECT
            e.id,
            e.student_id,
            e.subject_id,
            e.enrollment_date,
            e.grade,
            s.name AS subject_name,
            s.description AS subject_description
        FROM enrollments e
        JOIN subjects s ON s.id = e.subject_id
        WHERE e.student_id = ?
        ORDER BY e.id
        "#,
    )
    .bind(student_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn fetch_subject_enrollments(
    conn: &mut SqliteConnection,
    subject_id: i64,
) -> Result<Vec<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(
        r#"
        SELECT id, student_id, subject_id, enrollment_date, grade
        FROM enrollments
        WHERE subject_id = ?
        ORDER BY id
        "#,
    )
    .bind(subject_id)
    .fetch_all(&mut *conn)
    .await
}
