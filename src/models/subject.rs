use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::require_text;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// A subject with both directions of the prerequisite relation.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectDetail {
    #[serde(flatten)]
    pub subject: Subject,
    pub prerequisites: Vec<i64>,
    pub required_for: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub prerequisites: Vec<i64>,
}

impl SubjectRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require_text("name", &self.name, 100)
    }
}
