use axum::extract::rejection::JsonRejection;
use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(format!("{} not found.", what))
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation { .. })
    }
}

/// Turns a unique-constraint failure into a validation error on `field`.
/// Any other database error passes through unchanged.
pub fn unique_violation(err: sqlx::Error, field: &str, message: &str) -> AppError {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::validation(field, message)
        }
        other => AppError::Database(other),
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let text = rejection.body_text();
        let field = match &rejection {
            JsonRejection::JsonDataError(_) => rejected_field(&text).unwrap_or("body"),
            _ => "body",
        }
        .to_string();
        AppError::validation(field, text)
    }
}

/// Pulls the top-level field out of a body deserialization message such as
/// `...target type: subject_ids[0]: invalid type: ...`.
fn rejected_field(text: &str) -> Option<&str> {
    let (_, detail) = text.split_once("target type: ")?;
    let (path, _) = detail.split_once(": ")?;
    if path.is_empty() || path.contains(' ') {
        return None;
    }
    path.split(['[', '.']).next().filter(|field| !field.is_empty())
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, field) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::Validation { field, message } => {
                (StatusCode::BAD_REQUEST, message, Some(field))
            }
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                    None,
                )
            }
            AppError::Token(e) => {
                error!("token signing failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            AppError::Internal(msg) => {
                error!("{}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
            field,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_field_strips_index_and_nesting() {
        let text = "Failed to deserialize the JSON body into the target type: \
                    subject_ids[0]: invalid type: string \"abc\", expected i64 at line 1 column 36";
        assert_eq!(rejected_field(text), Some("subject_ids"));

        let text = "Failed to deserialize the JSON body into the target type: \
                    date_of_birth: input contains invalid characters at line 1 column 80";
        assert_eq!(rejected_field(text), Some("date_of_birth"));
    }

    #[test]
    fn test_rejected_field_without_path() {
        let text = "Failed to deserialize the JSON body into the target type: \
                    invalid type: integer `1`, expected struct EnrollRequest at line 1 column 1";
        assert_eq!(rejected_field(text), None);
        assert_eq!(rejected_field("Failed to parse the request body as JSON"), None);
    }
}
