//! Error type for `survey-store-file`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("unsupported cache format version {0}")]
  UnsupportedFormat(u32),

  #[error("cache path {0:?} has no file name")]
  InvalidPath(std::path::PathBuf),
}

impl From<Error> for survey_core::Error {
  fn from(e: Error) -> Self { survey_core::Error::cache_io(e) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
