//! Error types for the habit tracker

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::validation::Violation;

#[derive(Debug, Error)]
pub enum Error {
  #[error("Database error: {0}")]
  Database(#[from] sea_orm::DbErr),

  #[error(transparent)]
  Validation(#[from] Violation),

  #[error("Habit not found")]
  HabitNotFound,

  #[error("User not found")]
  UserNotFound,

  #[error("Email already registered")]
  EmailTaken,

  #[error("Missing or unknown user identity")]
  Unauthorized,

  #[error("You can only manage your own records")]
  Forbidden,

  #[error("{0}")]
  InvalidArgs(String),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match &self {
      Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
      Error::Validation(_) | Error::InvalidArgs(_) => StatusCode::BAD_REQUEST,
      Error::HabitNotFound | Error::UserNotFound => StatusCode::NOT_FOUND,
      Error::EmailTaken => StatusCode::CONFLICT,
      Error::Unauthorized => StatusCode::UNAUTHORIZED,
      Error::Forbidden => StatusCode::FORBIDDEN,
    };

    let message = match &self {
      Error::Database(err) => {
        tracing::error!("Database error: {err}");
        "Database error".to_string()
      }
      other => other.to_string(),
    };

    let body = json::json!({
      "success": false,
      "error": message
    });

    (status, axum::Json(body)).into_response()
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
