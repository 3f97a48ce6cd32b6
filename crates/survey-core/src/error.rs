//! Error types for `survey-core`.

use thiserror::Error;

/// Why a remote fetch failed. Any of these means "refresh failed".
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("network error: {0}")]
  Network(String),

  #[error("authentication failed: {0}")]
  Auth(String),

  #[error("malformed survey payload: {0}")]
  DataFormat(String),
}

#[derive(Debug, Error)]
pub enum Error {
  /// No snapshot has been written yet.
  #[error("no snapshot exists yet")]
  NotFound,

  #[error("fetch failed: {0}")]
  Fetch(#[from] FetchError),

  #[error("cache i/o error: {0}")]
  CacheIo(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("malformed cutoff input: {0:?}")]
  MalformedCutoff(String),
}

impl Error {
  /// Wrap a backend-specific storage error.
  pub fn cache_io(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::CacheIo(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
