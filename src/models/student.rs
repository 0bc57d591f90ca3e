use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{require_email, require_text};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub enrollment_date: NaiveDate,
}

/// The fields a professor sees on a roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct StudentSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterStudentRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub subject_ids: Vec<i64>,
}

impl RegisterStudentRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require_text("first_name", &self.first_name, 50)?;
        require_text("last_name", &self.last_name, 50)?;
        require_email("email", &self.email)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStudentRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
}

impl UpdateStudentRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require_text("first_name", &self.first_name, 50)?;
        require_text("last_name", &self.last_name, 50)?;
        require_email("email", &self.email)
    }
}
