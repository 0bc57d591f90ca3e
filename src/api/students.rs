use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use super::extract::AppJson;
use crate::db::students;
use crate::error::AppError;
use crate::models::{RegisterStudentRequest, Student, Subject, UpdateStudentRequest};
use crate::services::{EnrollmentService, StudentReport, catalog, statistics};
use crate::state::AppState;

pub(super) async fn list_students(
    State(state): State<AppState>,
) -> Result<Json<Vec<Student>>, AppError> {
    let mut conn = state.db.acquire().await?;
    let students = students::fetch_students(&mut conn).await?;
    Ok(Json(students))
}

pub(super) async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Student>, AppError> {
    let mut conn = state.db.acquire().await?;
    let student = students::find_student(&mut conn, id)
        .await?
        .ok_or_else(|| AppError::not_found("Student"))?;
    Ok(Json(student))
}

pub(super) async fn register_student(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterStudentRequest>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let service = EnrollmentService::new(state.db.clone(), state.policy);
    let student = service.register_student(req).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

pub(super) async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    AppJson(req): AppJson<UpdateStudentRequest>,
) -> Result<Json<Student>, AppError> {
    let student = catalog::update_student(&state.db, id, req).await?;
    Ok(Json(student))
}

pub(super) async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let mut conn = state.db.acquire().await?;
    if students::delete_student(&mut conn, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Student"))
    }
}

pub(super) async fn stats(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<StudentReport>, AppError> {
    let report = statistics::student_report(&state.db, id).await?;
    Ok(Json(report))
}

pub(super) async fn enrolled_subjects(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let subjects = statistics::enrolled_subjects(&state.db, id).await?;
    Ok(Json(serde_json::json!({ "subjects": subjects })))
}

pub(super) async fn failed_subjects(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Subject>>, AppError> {
    let report = statistics::student_report(&state.db, id).await?;
    Ok(Json(report.stats.failed_subjects))
}
