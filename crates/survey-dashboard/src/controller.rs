//! Dashboard controller: turns raw request parameters into a filtered,
//! aggregated view of the current snapshot.
//!
//! The active cutoff is session state carried by the page itself (the
//! `active` parameter), never a process-wide global.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use survey_core::{
  cutoff::CutoffSetting,
  filter::filter,
  store::{ResponseSource, SnapshotStore},
  summary::{IntroSummary, QuestionCounts, aggregate},
};

use crate::{DashboardSettings, error::Error, refresh::Refresher};

/// Raw dashboard inputs, as sent by the controls form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
  /// Cutoff date, `YYYY-MM-DD` or `DD.MM.YYYY`.
  pub date:           Option<String>,
  /// Cutoff time, `HH:MM`.
  pub time:           Option<String>,
  /// Checkbox value; present and truthy means completed responses only.
  pub completed_only: Option<String>,
  /// The previously active cutoff, `YYYY-MM-DDTHH:MM`.
  pub active:         Option<String>,
}

impl DashboardQuery {
  /// Resolve the cutoff for this request.
  ///
  /// Malformed components fall back to the active cutoff, and a missing or
  /// malformed active cutoff falls back to the configured default.
  pub fn cutoff(&self, settings: &DashboardSettings) -> CutoffSetting {
    let active = self
      .active
      .as_deref()
      .and_then(|raw| CutoffSetting::parse_local(raw, settings.timezone).ok())
      .unwrap_or(settings.default_cutoff);
    active.apply(self.date.as_deref(), self.time.as_deref())
  }

  pub fn completed_only(&self) -> bool {
    matches!(
      self.completed_only.as_deref().map(str::trim),
      Some("1" | "true" | "on" | "yes")
    )
  }
}

/// Query string that reproduces a resolved filter state.
pub fn filter_query(cutoff: &CutoffSetting, completed_only: bool) -> String {
  let mut query = format!(
    "date={}&time={}&active={}",
    cutoff.date().format("%Y-%m-%d"),
    cutoff.time().format("%H:%M"),
    cutoff.to_param(),
  );
  if completed_only {
    query.push_str("&completed_only=1");
  }
  query
}

/// Everything the page and the JSON summary need.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
  #[serde(skip)]
  pub cutoff:         CutoffSetting,
  #[serde(rename = "cutoff")]
  pub cutoff_param:   String,
  pub completed_only: bool,
  pub fetched_at:     DateTime<Utc>,
  pub data_updated:   DateTime<Utc>,
  pub intro:          IntroSummary,
  pub intro_text:     String,
  pub questions:      Vec<QuestionCounts>,
}

impl DashboardView {
  pub fn is_empty(&self) -> bool { self.intro.is_empty() }

  /// Query string that reproduces this view's filter state.
  pub fn query_string(&self) -> String {
    filter_query(&self.cutoff, self.completed_only)
  }
}

/// Read the snapshot (refreshing it if absent), filter and aggregate.
pub async fn build_view<S, F>(
  refresher: &Refresher<S, F>,
  settings: &DashboardSettings,
  query: &DashboardQuery,
) -> Result<DashboardView, Error>
where
  S: SnapshotStore,
  F: ResponseSource,
{
  let cutoff = query.cutoff(settings);
  let completed_only = query.completed_only();

  let snapshot = refresher.snapshot().await?;
  let data_updated = refresher.last_modified().await?;

  let view = filter(&snapshot, cutoff.timestamp(), completed_only);
  let intro = IntroSummary::from_view(&view);
  let questions = aggregate(&view, &settings.questions);
  let intro_text = intro.describe(
    &format_freshness(data_updated, settings.timezone),
    &cutoff.to_string(),
  );

  Ok(DashboardView {
    cutoff,
    cutoff_param: cutoff.to_param(),
    completed_only,
    fetched_at: snapshot.fetched_at,
    data_updated,
    intro,
    intro_text,
    questions,
  })
}

/// `D.M.YYYY at HH:MM:SS (<zone> time)`.
pub fn format_freshness(at: DateTime<Utc>, tz: Tz) -> String {
  let local = at.with_timezone(&tz);
  format!("{} ({} time)", local.format("%-d.%-m.%Y at %H:%M:%S"), tz.name())
}
