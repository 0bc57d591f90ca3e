pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;

use crate::auth::TokenKeys;
use crate::config::AppConfig;
use crate::state::AppState;

/// Builds the full application around an already migrated pool.
pub fn app(db: SqlitePool, config: &AppConfig) -> Router {
    let state = AppState {
        db,
        tokens: Arc::new(TokenKeys::from_secret(
            config.jwt_secret.as_bytes(),
            config.token_ttl_secs,
        )),
        policy: config.prerequisite_policy,
    };

    api::router(state)
}
