//! ETag computation for dashboard summaries.
//!
//! A summary is fully determined by the snapshot it was built from and the
//! filter arguments, so the tag hashes exactly those.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::controller::DashboardView;

/// Compute a strong ETag for `view`.
pub fn compute_etag(view: &DashboardView) -> String {
  compute_etag_from_parts(
    view.fetched_at,
    view.data_updated,
    &view.cutoff_param,
    view.completed_only,
  )
}

pub fn compute_etag_from_parts(
  fetched_at: DateTime<Utc>,
  data_updated: DateTime<Utc>,
  cutoff: &str,
  completed_only: bool,
) -> String {
  let mut hasher = Sha256::new();
  hasher.update(fetched_at.timestamp_micros().to_le_bytes());
  hasher.update(data_updated.timestamp_micros().to_le_bytes());
  hasher.update(cutoff.as_bytes());
  hasher.update([u8::from(completed_only)]);
  let hash = hasher.finalize();
  format!("\"{}\"", hex::encode(hash))
}

/// Whether an `If-None-Match` header value matches `etag`.
///
/// Accepts lists, weak validators and the bare (unquoted) form some clients
/// send.
pub fn if_none_match(header: &str, etag: &str) -> bool {
  let bare = etag.trim_matches('"');
  header.split(',').map(str::trim).any(|candidate| {
    candidate == "*"
      || candidate.trim_start_matches("W/").trim_matches('"') == bare
  })
}
