//! API error type. Every failure reaches the client as `{"error": "..."}`.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};

use crate::content::LessonError;
use crate::db::{ActionError, DbLockError};
use crate::player::SessionError;

#[derive(Debug)]
pub enum AppError {
  NotFound(String),
  BadRequest(String),
  Forbidden(String),
  /// Request is valid but conflicts with current state
  Conflict(String),
  Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
  pub fn status(&self) -> StatusCode {
    match self {
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::Forbidden(_) => StatusCode::FORBIDDEN,
      Self::Conflict(_) => StatusCode::CONFLICT,
      Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  pub fn not_found(what: &str) -> Self {
    Self::NotFound(format!("{} not found", what))
  }
}

impl std::fmt::Display for AppError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::NotFound(msg)
      | Self::BadRequest(msg)
      | Self::Forbidden(msg)
      | Self::Conflict(msg)
      | Self::Internal(msg) => write!(f, "{}", msg),
    }
  }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      Self::Internal(detail) => {
        tracing::error!("Internal error: {}", detail);
        "Something went wrong. Please try again.".to_string()
      }
      other => other.to_string(),
    };
    (status, Json(serde_json::json!({ "error": message }))).into_response()
  }
}

impl From<rusqlite::Error> for AppError {
  fn from(e: rusqlite::Error) -> Self {
    match e {
      rusqlite::Error::QueryReturnedNoRows => Self::NotFound("Not found".to_string()),
      rusqlite::Error::SqliteFailure(err, ref msg)
        if err.code == rusqlite::ErrorCode::ConstraintViolation =>
      {
        Self::Conflict(msg.clone().unwrap_or_else(|| "Already exists".to_string()))
      }
      other => Self::Internal(other.to_string()),
    }
  }
}

impl From<ActionError> for AppError {
  fn from(e: ActionError) -> Self {
    match e {
      ActionError::NotFound(msg) => Self::NotFound(msg),
      ActionError::Invalid(msg) => Self::BadRequest(msg),
      ActionError::Forbidden(msg) => Self::Forbidden(msg),
      ActionError::Conflict(msg) => Self::Conflict(msg),
      ActionError::Db(e) => e.into(),
    }
  }
}

impl From<DbLockError> for AppError {
  fn from(e: DbLockError) -> Self {
    Self::Internal(e.to_string())
  }
}

impl From<SessionError> for AppError {
  fn from(e: SessionError) -> Self {
    Self::Conflict(e.to_string())
  }
}

impl From<LessonError> for AppError {
  fn from(e: LessonError) -> Self {
    match e {
      LessonError::InvalidId(_) => Self::BadRequest(e.to_string()),
      LessonError::NotFound(_) => Self::NotFound(e.to_string()),
      other => Self::Internal(other.to_string()),
    }
  }
}
