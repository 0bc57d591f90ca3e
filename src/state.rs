use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::TokenKeys;
use crate::services::EligibilityPolicy;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub tokens: Arc<TokenKeys>,
    pub policy: EligibilityPolicy,
}
