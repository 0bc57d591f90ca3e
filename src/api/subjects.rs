use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use super::extract::AppJson;
use crate::db::subjects;
use crate::error::AppError;
use crate::models::{SubjectDetail, SubjectRequest};
use crate::services::catalog;
use crate::state::AppState;

pub(super) async fn list_subjects(
    State(state): State<AppState>,
) -> Result<Json<Vec<SubjectDetail>>, AppError> {
    let mut conn = state.db.acquire().await?;
    let mut details = Vec::new();
    for subject in subjects::fetch_subjects(&mut conn).await? {
        if let Some(detail) = subjects::fetch_subject_detail(&mut conn, subject.id).await? {
            details.push(detail);
        }
    }
    Ok(Json(details))
}

pub(super) async fn get_subject(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SubjectDetail>, AppError> {
    let mut conn = state.db.acquire().await?;
    let detail = subjects::fetch_subject_detail(&mut conn, id)
        .await?
        .ok_or_else(|| AppError::not_found("Subject"))?;
    Ok(Json(detail))
}

pub(super) async fn create_subject(
    State(state): State<AppState>,
    AppJson(req): AppJson<SubjectRequest>,
) -> Result<(StatusCode, Json<SubjectDetail>), AppError> {
    let detail = catalog::create_subject(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

pub(super) async fn update_subject(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    AppJson(req): AppJson<SubjectRequest>,
) -> Result<Json<SubjectDetail>, AppError> {
    let detail = catalog::update_subject(&state.db, id, req).await?;
    Ok(Json(detail))
}

pub(super) async fn delete_subject(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let mut conn = state.db.acquire().await?;
    if subjects::delete_subject(&mut conn, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Subject"))
    }
}
