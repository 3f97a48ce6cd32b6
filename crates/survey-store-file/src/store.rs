//! [`FileSnapshotStore`] — the file implementation of [`SnapshotStore`].

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use survey_core::{record::Snapshot, store::SnapshotStore};
use tokio::io::AsyncWriteExt as _;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{decode, encode},
};

/// File name used when no explicit cache path is configured.
pub const DEFAULT_FILE_NAME: &str = "survey_cache.json";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A snapshot cache backed by a single file.
///
/// Cloning is cheap; clones refer to the same path.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
  path: PathBuf,
}

impl FileSnapshotStore {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  /// `<system temp dir>/survey_cache.json`.
  pub fn default_path() -> PathBuf { std::env::temp_dir().join(DEFAULT_FILE_NAME) }

  pub fn path(&self) -> &Path { &self.path }

  /// Serialise `snapshot` into a temporary file next to the canonical path.
  ///
  /// Nothing is visible to readers until [`StagedWrite::commit`].
  pub(crate) async fn stage(&self, snapshot: &Snapshot) -> Result<StagedWrite> {
    let file_name = self
      .path
      .file_name()
      .ok_or_else(|| Error::InvalidPath(self.path.clone()))?
      .to_string_lossy()
      .into_owned();
    let dir = match self.path.parent() {
      Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
      _ => PathBuf::from("."),
    };
    tokio::fs::create_dir_all(&dir).await?;

    let temp_path = dir.join(format!(".{file_name}.{}.tmp", Uuid::new_v4().simple()));
    let bytes = encode(snapshot)?;

    let staged = StagedWrite { temp_path, target: self.path.clone() };
    if let Err(e) = write_synced(&staged.temp_path, &bytes).await {
      staged.abort().await;
      return Err(e.into());
    }
    Ok(staged)
  }

  async fn read_inner(&self) -> Result<Option<Snapshot>> {
    let bytes = match tokio::fs::read(&self.path).await {
      Ok(b) => b,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(e.into()),
    };
    decode(&bytes).map(Some)
  }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
  let mut file = tokio::fs::File::create(path).await?;
  file.write_all(bytes).await?;
  file.sync_all().await?;
  Ok(())
}

/// A fully written temporary file waiting to be renamed into place.
#[derive(Debug)]
pub(crate) struct StagedWrite {
  pub(crate) temp_path: PathBuf,
  target:               PathBuf,
}

impl StagedWrite {
  /// Atomically replace the canonical file with the staged one.
  pub(crate) async fn commit(self) -> Result<()> {
    if let Err(e) = tokio::fs::rename(&self.temp_path, &self.target).await {
      self.abort().await;
      return Err(e.into());
    }
    Ok(())
  }

  /// Remove the temporary file, leaving the canonical file untouched.
  pub(crate) async fn abort(&self) {
    if let Err(e) = tokio::fs::remove_file(&self.temp_path).await
      && e.kind() != ErrorKind::NotFound
    {
      tracing::warn!("failed to remove {:?}: {e}", self.temp_path);
    }
  }
}

// ─── SnapshotStore impl ──────────────────────────────────────────────────────

impl SnapshotStore for FileSnapshotStore {
  async fn write(&self, snapshot: &Snapshot) -> survey_core::Result<()> {
    self.stage(snapshot).await?.commit().await?;
    tracing::debug!(
      "wrote snapshot with {} records to {:?}",
      snapshot.len(),
      self.path
    );
    Ok(())
  }

  async fn read(&self) -> survey_core::Result<Option<Snapshot>> {
    Ok(self.read_inner().await?)
  }

  async fn last_modified(&self) -> survey_core::Result<DateTime<Utc>> {
    let metadata = match tokio::fs::metadata(&self.path).await {
      Ok(m) => m,
      Err(e) if e.kind() == ErrorKind::NotFound => {
        return Err(survey_core::Error::NotFound);
      }
      Err(e) => return Err(Error::from(e).into()),
    };
    let modified = metadata.modified().map_err(Error::from)?;
    Ok(DateTime::<Utc>::from(modified))
  }
}
