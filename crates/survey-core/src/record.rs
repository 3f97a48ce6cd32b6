//! Response records and the snapshot that holds them.
//!
//! A [`Snapshot`] is written wholesale by a refresh and never patched in
//! place. Every field of a [`ResponseRecord`] is optional on the wire so that
//! an older or oddly-shaped cache file still decodes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Record ──────────────────────────────────────────────────────────────────

/// One survey submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
  /// Participant token. Not guaranteed unique, frequently absent.
  #[serde(default)]
  pub token:        Option<String>,
  #[serde(default)]
  pub started_at:   Option<DateTime<Utc>>,
  /// Last survey page the respondent reached.
  #[serde(default)]
  pub last_page:    Option<i64>,
  /// Answer code → answer value. Null answers are not stored.
  #[serde(default)]
  pub answers:      BTreeMap<String, String>,
  /// Derived once at fetch time from `last_page` and the completion
  /// threshold; never recomputed afterwards.
  #[serde(default)]
  pub is_completed: bool,
}

impl ResponseRecord {
  /// Build a record, deriving `is_completed` from `last_page`.
  pub fn new(
    token: Option<String>,
    started_at: Option<DateTime<Utc>>,
    last_page: Option<i64>,
    answers: BTreeMap<String, String>,
    completion_threshold: i64,
  ) -> Self {
    let is_completed = last_page.is_some_and(|p| p >= completion_threshold);
    Self { token, started_at, last_page, answers, is_completed }
  }

  /// Look up a field by its question code.
  ///
  /// Besides answer codes this understands the synthetic columns `token`,
  /// `startdate`, `lastpage` and `is_completed`.
  pub fn field(&self, code: &str) -> Option<String> {
    match code {
      "token" => self.token.clone(),
      "startdate" => self.started_at.map(|t| t.to_rfc3339()),
      "lastpage" => self.last_page.map(|p| p.to_string()),
      "is_completed" => Some(self.is_completed.to_string()),
      other => self.answers.get(other).cloned(),
    }
  }
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// The single persisted copy of every fetched response at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
  pub fetched_at: DateTime<Utc>,
  #[serde(default)]
  pub records:    Vec<ResponseRecord>,
}

impl Snapshot {
  pub fn new(records: Vec<ResponseRecord>) -> Self {
    Self { fetched_at: Utc::now(), records }
  }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }
}
