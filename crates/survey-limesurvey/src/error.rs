//! Error type for `survey-limesurvey`.

use survey_core::FetchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("remote control error in {method}: {message}")]
  Rpc { method: &'static str, message: String },

  #[error("authentication rejected: {0}")]
  Auth(String),

  #[error("base64 decode error: {0}")]
  Base64(#[from] base64::DecodeError),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("unexpected payload: {0}")]
  Payload(String),
}

impl From<Error> for FetchError {
  fn from(e: Error) -> Self {
    match e {
      Error::Http(e) => FetchError::Network(e.to_string()),
      Error::Rpc { .. } => FetchError::Network(e.to_string()),
      Error::Auth(msg) => FetchError::Auth(msg),
      Error::Base64(_) | Error::Json(_) | Error::Payload(_) => {
        FetchError::DataFormat(e.to_string())
      }
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
