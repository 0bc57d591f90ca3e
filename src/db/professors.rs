use sqlx::SqliteConnection;

use crate::models::{Professor, ProfessorDetail, Subject};

pub async fn fetch_professors(conn: &mut SqliteConnection) -> Result<Vec<Professor>, sqlx::Error> {
    sqlx::query_as::<_, Professor>(
        "SELECT id, first_name, last_name, email, department FROM professors ORDER BY id",
    )
    .fetch_all(&mut *conn)
    .await
}

pub async fn find_professor(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Professor>, sqlx::Error> {
    sqlx::query_as::<_, Professor>(
        "SELECT id, first_name, last_name, email, department FROM professors WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn insert_professor(
    conn: &mut SqliteConnection,
    first_name: &str,
    last_name: &str,
    email: &str,
    department: &str,
) -> Result<Professor, sqlx::Error> {
    sqlx::query_as::<_, Professor>(
        r#"
        INSERT INTO professors (first_name, last_name, email, department)
        VALUES (?1, ?2, ?3, ?4)
        RETURNING id, first_name, last_name, email, department
        "#,
    )
    .bind(first_name)
    .bind(last_name)
    .bind(email)
    .bind(department)
    .fetch_one(&mut *conn)
    .await
}

pub async fn update_professor(
    conn: &mut SqliteConnection,
    id: i64,
    first_name: &str,
    last_name: &str,
    email: &str,
    department: &str,
) -> Result<Option<Professor>, sqlx::Error> {
    sqlx::query_as::<_, Professor>(
        r#"
        UPDATE professors
        SET first_name = ?1,
            last_name = ?2,
            email = ?3,
            department = ?4
        WHERE id = ?5
        RETURNING id, first_name, last_name, email, department
        "#,
    )
    .bind(first_name)
    .bind(last_name)
    .bind(email)
    .bind(department)
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
}

/// Only the assignment links cascade; subjects stay.
pub async fn delete_professor(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM professors WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn fetch_professor_subjects(
    conn: &mut SqliteConnection,
    professor_id: i64,
) -> Result<Vec<Subject>, sqlx::Error> {
    sqlx::query_as::<_, Subject>(
        r#"
        SELECT s.id, s.name, s.description
        FROM subjects s
        JOIN professor_subjects ps ON ps.subject_id = s.id
        WHERE ps.professor_id = ?
        ORDER BY s.id
        "#,
    )
    .bind(professor_id)
    .fetch_all(&mut *conn)
    .await
}

pub async fn replace_professor_subjects(
    conn: &mut SqliteConnection,
    professor_id: i64,
    subject_ids: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM professor_subjects WHERE professor_id = ?")
        .bind(professor_id)
        .execute(&mut *conn)
        .await?;

    for subject_id in subject_ids {
        sqlx::query(
            "INSERT OR IGNORE INTO professor_subjects (professor_id, subject_id) VALUES (?1, ?2)",
        )
        .bind(professor_id)
        .bind(*subject_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub async fn fetch_professor_detail(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<ProfessorDetail>, sqlx::Error> {
    let Some(professor) = find_professor(conn, id).await? else {
        return Ok(None);
    };
    let subjects = fetch_professor_subjects(conn, id).await?;

    Ok(Some(ProfessorDetail { professor, subjects }))
}
