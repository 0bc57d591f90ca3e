use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::models::{Subject, SubjectDetail};

pub async fn fetch_subjects(conn: &mut SqliteConnection) -> Result<Vec<Subject>, sqlx::Error> {
    sqlx::query_as::<_, Subject>("SELECT id, name, description FROM subjects ORDER BY id")
        .fetch_all(&mut *conn)
        .await
}

pub async fn find_subject(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Subject>, sqlx::Error> {
    sqlx::query_as::<_, Subject>("SELECT id, name, description FROM subjects WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

/// Subjects whose id is in `ids`, ordered by id. Unknown ids are skipped.
pub async fn find_subjects_by_ids(
    conn: &mut SqliteConnection,
    ids: &[i64],
) -> Result<Vec<Subject>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder =
        QueryBuilder::<Sqlite>::new("SELECT id, name, description FROM subjects WHERE id IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY id");

    builder.build_query_as::<Subject>().fetch_all(&mut *conn).await
}

/// Returns the ids from `ids` that have no subject row, in request order.
pub async fn missing_subject_ids(
    conn: &mut SqliteConnection,
    ids: &[i64],
) -> Result<Vec<i64>, sqlx::Error> {
    let found: Vec<i64> = find_subjects_by_ids(conn, ids)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();

    Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
}

pub async fn insert_subject(
    conn: &mut SqliteConnection,
    name: &str,
    description: &str,
) -> Result<Subject, sqlx::Error> {
    sqlx::query_as::<_, Subject>(
        "INSERT INTO subjects (name, description) VALUES (?1, ?2) RETURNING id, name, description",
    )
    .bind(name)
    .bind(description)
    .fetch_one(&mut *conn)
    .await
}

pub async fn update_subject(
    conn: &mut SqliteConnection,
    id: i64,
    name: &str,
    description: &str,
) -> Result<Option<Subject>, sqlx::Error> {
    sqlx::query_as::<_, Subject>(
        r#"
        UPDATE subjects
        SET name = ?1,
            description = ?2
        WHERE id = ?3
        RETURNING id, name, description
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
}

/// Enrollments, prerequisite links and professor assignments go with it.
pub async fn delete_subject(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM subjects WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn fetch_prerequisite_ids(
    conn: &mut SqliteConnection,
    subject_id: i64,
) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT prerequisite_id FROM subject_prerequisites WHERE subject_id = ? ORDER BY prerequisite_id",
    )
    .bind(subject_id)
    .fetch_all(&mut *conn)
    .await
}

pub async fn fetch_required_for_ids(
    conn: &mut SqliteConnection,
    subject_id: i64,
) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT subject_id FROM subject_prerequisites WHERE prerequisite_id = ? ORDER BY subject_id",
    )
    .bind(subject_id)
    .fetch_all(&mut *conn)
    .await
}

pub async fn replace_prerequisites(
    conn: &mut SqliteConnection,
    subject_id: i64,
    prerequisite_ids: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM subject_prerequisites WHERE subject_id = ?")
        .bind(subject_id)
        .execute(&mut *conn)
        .await?;

    for prerequisite_id in prerequisite_ids {
        sqlx::query(
            "INSERT OR IGNORE INTO subject_prerequisites (subject_id, prerequisite_id) VALUES (?1, ?2)",
        )
        .bind(subject_id)
        .bind(*prerequisite_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub async fn fetch_subject_detail(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<SubjectDetail>, sqlx::Error> {
    let Some(subject) = find_subject(conn, id).await? else {
        return Ok(None);
    };
    let prerequisites = fetch_prerequisite_ids(conn, id).await?;
    let required_for = fetch_required_for_ids(conn, id).await?;

    Ok(Some(SubjectDetail {
        subject,
        prerequisites,
        required_for,
    }))
}
