use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use super::extract::AppJson;
use crate::auth;
use crate::error::AppError;
use crate::models::{CreateUserRequest, TokenRequest, TokenResponse, User};
use crate::state::AppState;

pub(super) async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = auth::create_user(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub(super) async fn token(
    State(state): State<AppState>,
    AppJson(req): AppJson<TokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = auth::issue_token(&state.db, &state.tokens, req).await?;
    Ok(Json(token))
}
