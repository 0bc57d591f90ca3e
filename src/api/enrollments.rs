use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::{Value, json};

use super::extract::AppJson;
use crate::db::enrollments;
use crate::error::AppError;
use crate::models::{EnrollRequest, EnrollmentView, NewEnrollmentRequest, UpdateGradeRequest};
use crate::services::EnrollmentService;
use crate::state::AppState;

pub(super) async fn list_enrollments(
    State(state): State<AppState>,
) -> Result<Json<Vec<EnrollmentView>>, AppError> {
    let mut conn = state.db.acquire().await?;
    let rows = enrollments::fetch_enrollments(&mut conn).await?;
    Ok(Json(rows.into_iter().map(EnrollmentView::from).collect()))
}

pub(super) async fn get_enrollment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<EnrollmentView>, AppError> {
    let mut conn = state.db.acquire().await?;
    let enrollment = enrollments::find_enrollment(&mut conn, id)
        .await?
        .ok_or_else(|| AppError::not_found("Enrollment"))?;
    Ok(Json(enrollment.into()))
}

pub(super) async fn create_enrollment(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewEnrollmentRequest>,
) -> Result<(StatusCode, Json<EnrollmentView>), AppError> {
    let service = EnrollmentService::new(state.db.clone(), state.policy);
    let enrollment = service.create_enrollment(req).await?;
    Ok((StatusCode::CREATED, Json(enrollment.into())))
}

pub(super) async fn delete_enrollment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let mut conn = state.db.acquire().await?;
    if enrollments::delete_enrollment(&mut conn, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Enrollment"))
    }
}

pub(super) async fn enroll(
    State(state): State<AppState>,
    AppJson(req): AppJson<EnrollRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let (Some(student_id), Some(subject_ids)) = (req.student_id, req.subject_ids) else {
        return Err(AppError::validation(
            "student_id",
            "Student ID and Subject IDs are required.",
        ));
    };

    let service = EnrollmentService::new(state.db.clone(), state.policy);
    let created = service.enroll_student(student_id, &subject_ids).await?;
    let views: Vec<EnrollmentView> = created.into_iter().map(EnrollmentView::from).collect();

    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "Inscription successful.", "enrollments": views })),
    ))
}

pub(super) async fn update_grade(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    AppJson(req): AppJson<UpdateGradeRequest>,
) -> Result<Json<Value>, AppError> {
    let service = EnrollmentService::new(state.db.clone(), state.policy);
    let enrollment = service.update_grade(id, req.grade.as_ref()).await?;

    Ok(Json(json!({
        "status": "Grade updated successfully.",
        "data": EnrollmentView::from(enrollment),
    })))
}
