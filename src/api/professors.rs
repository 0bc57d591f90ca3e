use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde_json::{Value, json};
use tracing::info;

use super::extract::AppJson;
use crate::auth::AuthUser;
use crate::db::professors;
use crate::error::AppError;
use crate::models::{GradeSubjectRequest, ProfessorDetail, ProfessorRequest, Subject};
use crate::services::{EnrollmentService, Gradebook, Roster, catalog, roster};
use crate::state::AppState;

pub(super) async fn list_professors(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProfessorDetail>>, AppError> {
    let mut conn = state.db.acquire().await?;
    let mut details = Vec::new();
    for professor in professors::fetch_professors(&mut conn).await? {
        let subjects = professors::fetch_professor_subjects(&mut conn, professor.id).await?;
        details.push(ProfessorDetail { professor, subjects });
    }
    Ok(Json(details))
}

pub(super) async fn get_professor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProfessorDetail>, AppError> {
    let mut conn = state.db.acquire().await?;
    let detail = professors::fetch_professor_detail(&mut conn, id)
        .await?
        .ok_or_else(|| AppError::not_found("Professor"))?;
    Ok(Json(detail))
}

pub(super) async fn create_professor(
    State(state): State<AppState>,
    AppJson(req): AppJson<ProfessorRequest>,
) -> Result<(StatusCode, Json<ProfessorDetail>), AppError> {
    let detail = catalog::create_professor(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

pub(super) async fn update_professor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    AppJson(req): AppJson<ProfessorRequest>,
) -> Result<Json<ProfessorDetail>, AppError> {
    let detail = catalog::update_professor(&state.db, id, req).await?;
    Ok(Json(detail))
}

pub(super) async fn delete_professor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let mut conn = state.db.acquire().await?;
    if professors::delete_professor(&mut conn, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Professor"))
    }
}

pub(super) async fn subjects(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Subject>>, AppError> {
    let subjects = roster::professor_subjects(&state.db, id).await?;
    Ok(Json(subjects))
}

pub(super) async fn students_per_subject(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Roster>, AppError> {
    let roster = roster::professor_roster(&state.db, id).await?;
    Ok(Json(roster))
}

pub(super) async fn student_grades(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Gradebook>, AppError> {
    let gradebook = roster::professor_gradebook(&state.db, id).await?;
    Ok(Json(gradebook))
}

pub(super) async fn grade_subject(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    AppJson(req): AppJson<GradeSubjectRequest>,
) -> Result<Json<Value>, AppError> {
    let mut conn = state.db.acquire().await?;
    professors::find_professor(&mut conn, id)
        .await?
        .ok_or_else(|| AppError::not_found("Professor"))?;
    drop(conn);

    let service = EnrollmentService::new(state.db.clone(), state.policy);
    let updated = service.bulk_grade_subject(&req).await?;
    info!(
        "{} graded subject {} via professor {}",
        user.username, req.subject_id, id
    );

    Ok(Json(json!({ "status": "Grades updated successfully.", "updated": updated })))
}
