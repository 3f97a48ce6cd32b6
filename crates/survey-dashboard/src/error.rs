//! Error types and axum `IntoResponse` implementation.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("survey data unavailable: {0}")]
  Unavailable(#[source] survey_core::Error),
  #[error("internal error: {0}")]
  Internal(#[source] survey_core::Error),
  #[error("invalid configuration: {0}")]
  Config(String),
}

impl From<survey_core::Error> for Error {
  fn from(e: survey_core::Error) -> Self {
    match e {
      survey_core::Error::Fetch(_) | survey_core::Error::NotFound => {
        Error::Unavailable(e)
      }
      other => Error::Internal(other),
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    tracing::error!("{self}");
    match self {
      Error::Unavailable(e) => {
        (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response()
      }
      Error::Internal(e) => {
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
      }
      Error::Config(msg) => {
        (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response()
      }
    }
  }
}
