mod enrollments;
mod extract;
mod professors;
mod students;
mod subjects;
mod users;

use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use axum::{Router, extract::State};

use crate::auth::require_auth;
use crate::error::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/professor",
            get(professors::list_professors).post(professors::create_professor),
        )
        .route(
            "/professor/{id}",
            get(professors::get_professor)
                .put(professors::update_professor)
                .delete(professors::delete_professor),
        )
        .route("/professor/{id}/subjects", get(professors::subjects))
        .route(
            "/professor/{id}/students_per_subject",
            get(professors::students_per_subject),
        )
        .route("/professor/{id}/student_grades", get(professors::student_grades))
        .route("/professor/{id}/grade_subject", post(professors::grade_subject))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health))
        .route("/register", post(users::register))
        .route("/token", post(users::token))
        .route("/subject", get(subjects::list_subjects).post(subjects::create_subject))
        .route(
            "/subject/{id}",
            get(subjects::get_subject)
                .put(subjects::update_subject)
                .delete(subjects::delete_subject),
        )
        .route("/student", get(students::list_students).post(students::register_student))
        .route(
            "/student/{id}",
            get(students::get_student)
                .put(students::update_student)
                .delete(students::delete_student),
        )
        .route("/student/{id}/stats", get(students::stats))
        .route("/student/{id}/enrolled_subjects", get(students::enrolled_subjects))
        .route("/student/{id}/failed_subjects", get(students::failed_subjects))
        .route(
            "/enrollment",
            get(enrollments::list_enrollments).post(enrollments::create_enrollment),
        )
        .route("/enrollment/enroll", post(enrollments::enroll))
        .route(
            "/enrollment/{id}",
            get(enrollments::get_enrollment).delete(enrollments::delete_enrollment),
        )
        .route("/enrollment/{id}/update_grade", put(enrollments::update_grade))
        .merge(protected)
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}
