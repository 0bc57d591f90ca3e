use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::AppError;

pub const MIN_GRADE: f64 = 0.0;
pub const MAX_GRADE: f64 = 5.0;
/// Grades at or above this value pass.
pub const PASS_THRESHOLD: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GradeError {
    #[error("Grade is required.")]
    Missing,

    #[error("Invalid grade value.")]
    Malformed,

    #[error("Grade must be between 0.0 and 5.0.")]
    OutOfRange,
}

impl GradeError {
    pub fn into_app_error(self, field: &str) -> AppError {
        AppError::validation(field, self.to_string())
    }
}

/// A grade on the closed 0.0..=5.0 scale.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Grade(f64);

impl Grade {
    pub fn new(value: f64) -> Result<Self, GradeError> {
        if !value.is_finite() {
            return Err(GradeError::Malformed);
        }
        if !(MIN_GRADE..=MAX_GRADE).contains(&value) {
            return Err(GradeError::OutOfRange);
        }
        Ok(Self(value))
    }

    /// Accepts a JSON number or a numeric string.
    pub fn from_json(value: Option<&Value>) -> Result<Self, GradeError> {
        let raw = match value {
            None | Some(Value::Null) => return Err(GradeError::Missing),
            Some(Value::Number(n)) => n.as_f64().ok_or(GradeError::Malformed)?,
            Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| GradeError::Malformed)?,
            Some(_) => return Err(GradeError::Malformed),
        };
        Self::new(raw)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    InProgress,
    Passed,
    Failed,
}

impl EnrollmentStatus {
    pub fn from_grade(grade: Option<f64>) -> Self {
        match grade {
            None => EnrollmentStatus::InProgress,
            Some(g) if g >= PASS_THRESHOLD => EnrollmentStatus::Passed,
            Some(_) => EnrollmentStatus::Failed,
        }
    }
}
