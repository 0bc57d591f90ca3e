use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Subject, require_email, require_text};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Professor {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfessorDetail {
    #[serde(flatten)]
    pub professor: Professor,
    pub subjects: Vec<Subject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfessorRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    #[serde(default)]
    pub subjects: Vec<i64>,
}

impl ProfessorRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require_text("first_name", &self.first_name, 50)?;
        require_text("last_name", &self.last_name, 50)?;
        require_email("email", &self.email)?;
        require_text("department", &self.department, 100)
    }
}
