use chrono::NaiveDate;
use sqlx::SqliteConnection;

use crate::models::{Student, StudentSummary};

pub async fn fetch_students(conn: &mut SqliteConnection) -> Result<Vec<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(
        "SELECT id, first_name, last_name, email, date_of_birth, enrollment_date FROM students ORDER BY id",
    )
    .fetch_all(&mut *conn)
    .await
}

pub async fn find_student(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(
        "SELECT id, first_name, last_name, email, date_of_birth, enrollment_date FROM students WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn insert_student(
    conn: &mut SqliteConnection,
    first_name: &str,
    last_name: &str,
    email: &str,
    date_of_birth: NaiveDate,
    enrollment_date: NaiveDate,
) -> Result<Student, sqlx::Error> {
    sqlx::query_as::<_, Student>(
        r#"
        INSERT INTO students
            (first_name, last_name, email, date_of_birth, enrollment_date)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING id, first_name, last_name, email, date_of_birth, enrollment_date
        "#,
    )
    .bind(first_name)
    .bind(last_name)
    .bind(email)
    .bind(date_of_birth)
    .bind(enrollment_date)
    .fetch_one(&mut *conn)
    .await
}

/// `enrollment_date` is fixed at creation and never rewritten here.
pub async fn update_student(
    conn: &mut SqliteConnection,
    id: i64,
    first_name: &str,
    last_name: &str,
    email: &str,
    date_of_birth: NaiveDate,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(
        r#"
        UPDATE students
        SET first_name = ?1,
            last_name = ?2,
            email = ?3,
            date_of_birth = ?4
        WHERE id = ?5
        RETURNING id, first_name, last_name, email, date_of_birth, enrollment_date
        "#,
    )
    .bind(first_name)
    .bind(last_name)
    .bind(email)
    .bind(date_of_birth)
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn delete_student(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM students WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok(result > 0)
}

/// Distinct students holding an enrollment in the subject.
pub async fn fetch_students_enrolled_in(
    conn: &mut SqliteConnection,
    subject_id: i64,
) -> Result<Vec<StudentSummary>, sqlx::Error> {
    sqlx::query_as::<_, StudentSummary>(
        r#"
        SELECT DISTINCT s.id, s.first_name, s.last_name, s.email
        FROM students s
        JOIN enrollments e ON e.student_id = s.id
        WHERE e.subject_id = ?
        ORDER BY s.id
        "#,
    )
    .bind(subject_id)
    .fetch_all(&mut *conn)
    .await
}
