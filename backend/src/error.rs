use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::HelpKind;

/// A single failed precondition on a record field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Structured result of a record validation, checked before anything is persisted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for a given field
    #[cfg(test)]
    pub fn on(&self, field: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{} {}", e.field, e.message))
            .collect();
        write!(f, "{}", messages.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Business rule rejections raised by the game state machine
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("game is already finished")]
    Finished,
    #[error("user already has an unfinished game {0}")]
    ActiveGameExists(Uuid),
    #[error("{0} has already been used in this game")]
    HelpAlreadyUsed(HelpKind),
    #[error("no questions available for level {0}")]
    NoQuestionsForLevel(i32),
    #[error("game has no question for level {0}")]
    MissingQuestion(i32),
    #[error("unknown answer letter {0:?}")]
    UnknownAnswer(String),
    #[error("unknown help type {0:?}")]
    UnknownHelp(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("game {0} was modified by another request")]
    StaleGame(Uuid),
    #[error("user {0} not found")]
    UserNotFound(i64),
}

impl From<ValidationErrors> for StoreError {
    fn from(errors: ValidationErrors) -> Self {
        StoreError::Validation(errors)
    }
}

/// Errors surfaced by JSON endpoints
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("forbidden")]
    Forbidden,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Store(StoreError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Store(StoreError::Game(_)) | AppError::Store(StoreError::StaleGame(_)) => {
                StatusCode::CONFLICT
            }
            AppError::Store(StoreError::UserNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Store(StoreError::Database(_)) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Forbidden => "FORBIDDEN",
            AppError::Store(StoreError::Validation(_)) => "VALIDATION_ERROR",
            AppError::Store(StoreError::Game(_)) => "GAME_RULE",
            AppError::Store(StoreError::StaleGame(_)) => "STALE_GAME",
            AppError::Store(StoreError::UserNotFound(_)) => "USER_NOT_FOUND",
            AppError::Store(StoreError::Database(_)) => "DB_ERROR",
            AppError::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let mut body = json!({
            "error": self.to_string(),
            "code": self.code(),
        });
        if let AppError::Store(StoreError::Validation(errors)) = &self {
            body["errors"] = json!(errors);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_collects_per_field() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.add("text", "can't be blank");
        errors.add("level", "is not included in the list");

        assert_eq!(errors.on("text"), vec!["can't be blank"]);
        assert_eq!(errors.on("level"), vec!["is not included in the list"]);
        assert!(errors.on("answer1").is_empty());
        assert_eq!(
            errors.to_string(),
            "text can't be blank, level is not included in the list"
        );
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::NotFound("user 1".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::Store(StoreError::Validation(ValidationErrors::new())).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::Store(StoreError::StaleGame(Uuid::nil())).status(),
            StatusCode::CONFLICT
        );
    }
}
