//! Validated writes for subjects, professors and students.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::db::{professors, students, subjects};
use crate::error::{AppError, unique_violation};
use crate::models::{
    ProfessorDetail, ProfessorRequest, Student, SubjectDetail, SubjectRequest,
    UpdateStudentRequest,
};

async fn ensure_subjects_exist(
    conn: &mut SqliteConnection,
    field: &str,
    ids: &[i64],
) -> Result<(), AppError> {
    match subjects::missing_subject_ids(conn, ids).await?.first() {
        Some(id) => Err(AppError::validation(
            field,
            format!("Subject {} does not exist.", id),
        )),
        None => Ok(()),
    }
}

pub async fn create_subject(db: &SqlitePool, req: SubjectRequest) -> Result<SubjectDetail, AppError> {
    req.validate()?;

    let mut tx = crate::db::begin_write(db).await?;
    ensure_subjects_exist(&mut tx, "prerequisites", &req.prerequisites).await?;

    let subject = subjects::insert_subject(&mut tx, req.name.trim(), &req.description).await?;
    subjects::replace_prerequisites(&mut tx, subject.id, &req.prerequisites).await?;
    let detail = subjects::fetch_subject_detail(&mut tx, subject.id)
        .await?
        .ok_or_else(|| AppError::not_found("Subject"))?;

    tx.commit().await?;
    info!("created subject {} ({})", detail.subject.id, detail.subject.name);
    Ok(detail)
}

pub async fn update_subject(
    db: &SqlitePool,
    id: i64,
    req: SubjectRequest,
) -> Result<SubjectDetail, AppError> {
    req.validate()?;

    let mut tx = crate::db::begin_write(db).await?;
    subjects::update_subject(&mut tx, id, req.name.trim(), &req.description)
        .await?
        .ok_or_else(|| AppError::not_found("Subject"))?;
    ensure_subjects_exist(&mut tx, "prerequisites", &req.prerequisites).await?;
    subjects::replace_prerequisites(&mut tx, id, &req.prerequisites).await?;
    let detail = subjects::fetch_subject_detail(&mut tx, id)
        .await?
        .ok_or_else(|| AppError::not_found("Subject"))?;

    tx.commit().await?;
    Ok(detail)
}

pub async fn create_professor(
    db: &SqlitePool,
    req: ProfessorRequest,
) -> Result<ProfessorDetail, AppError> {
    req.validate()?;

    let mut tx = crate::db::begin_write(db).await?;
    ensure_subjects_exist(&mut tx, "subjects", &req.subjects).await?;

    let professor = professors::insert_professor(
        &mut tx,
        req.first_name.trim(),
        req.last_name.trim(),
        req.email.trim(),
        req.department.trim(),
    )
    .await
    .map_err(|e| unique_violation(e, "email", "professor with this email already exists."))?;
    professors::replace_professor_subjects(&mut tx, professor.id, &req.subjects).await?;
    let detail = professors::fetch_professor_detail(&mut tx, professor.id)
        .await?
        .ok_or_else(|| AppError::not_found("Professor"))?;

    tx.commit().await?;
    info!("created professor {}", detail.professor.id);
    Ok(detail)
}

pub async fn update_professor(
    db: &SqlitePool,
    id: i64,
    req: ProfessorRequest,
) -> Result<ProfessorDetail, AppError> {
    req.validate()?;

    let mut tx = crate::db::begin_write(db).await?;
    professors::update_professor(
        &mut tx,
        id,
        req.first_name.trim(),
        req.last_name.trim(),
        req.email.trim(),
        req.department.trim(),
    )
    .await
    .map_err(|e| unique_violation(e, "email", "professor with this email already exists."))?
    .ok_or_else(|| AppError::not_found("Professor"))?;
    ensure_subjects_exist(&mut tx, "subjects", &req.subjects).await?;
    professors::replace_professor_subjects(&mut tx, id, &req.subjects).await?;
    let detail = professors::fetch_professor_detail(&mut tx, id)
        .await?
        .ok_or_else(|| AppError::not_found("Professor"))?;

    tx.commit().await?;
    Ok(detail)
}

pub async fn update_student(
    db: &SqlitePool,
    id: i64,
    req: UpdateStudentRequest,
) -> Result<Student, AppError> {
    req.validate()?;

    let mut conn = db.acquire().await?;
    students::update_student(
        &mut conn,
        id,
        req.first_name.trim(),
        req.last_name.trim(),
        req.email.trim(),
        req.date_of_birth,
    )
    .await
    .map_err(|e| unique_violation(e, "email", "student with this email already exists."))?
    .ok_or_else(|| AppError::not_found("Student"))
}
