//! Credential storage and bearer-token identity.

pub mod middleware;
pub mod password;
pub mod token;

pub use middleware::{AuthUser, require_auth};
pub use token::TokenKeys;

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db::users;
use crate::error::{AppError, unique_violation};
use crate::models::{CreateUserRequest, TokenRequest, TokenResponse, User};

pub async fn create_user(db: &SqlitePool, req: CreateUserRequest) -> Result<User, AppError> {
    req.validate()?;

    let password_hash = password::hash_password_blocking(req.password).await?;
    let mut conn = db.acquire().await?;
    let user = users::insert_user(&mut conn, req.username.trim(), &password_hash)
        .await
        .map_err(|e| unique_violation(e, "username", "A user with that username already exists."))?;

    info!("created user {}", user.username);
    Ok(user)
}

pub async fn issue_token(
    db: &SqlitePool,
    keys: &TokenKeys,
    req: TokenRequest,
) -> Result<TokenResponse, AppError> {
    let mut conn = db.acquire().await?;
    let user = users::find_user_by_username(&mut conn, req.username.trim()).await?;
    drop(conn);

    let verified = match &user {
        Some(user) => {
            password::verify_password_blocking(req.password, user.password_hash.clone()).await?
        }
        None => false,
    };

    match user {
        Some(user) if verified => keys.issue(&user.username),
        _ => {
            warn!("rejected credentials for {}", req.username);
            Err(AppError::Unauthorized(
                "No active account found with the given credentials".to_string(),
            ))
        }
    }
}
