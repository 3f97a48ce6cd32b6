//! Survey response dashboard.
//!
//! Exposes an axum [`Router`] that renders aggregate bar charts over the
//! cached survey snapshot, plus the [`Refresher`] that keeps the cache
//! fresh. Generic over any [`SnapshotStore`] and [`ResponseSource`].

pub mod controller;
pub mod error;
pub mod etag;
pub mod handlers;
pub mod refresh;
pub mod render;

#[cfg(test)]
mod testing;

pub use error::Error;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{get, post},
};
use chrono_tz::Tz;
use serde::Deserialize;
use survey_core::{
  cutoff::CutoffSetting,
  store::{ResponseSource, SnapshotStore},
  summary::Question,
};
use survey_limesurvey::LimeSurveyConfig;
use tower_http::trace::TraceLayer;

use refresh::Refresher;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `dashboard.toml` and the
/// `DASHBOARD_*` environment.
#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                     String,
  #[serde(default = "default_port")]
  pub port:                     u16,
  #[serde(default = "default_title")]
  pub title:                    String,
  /// Snapshot file; defaults to `survey_cache.json` in the temp directory.
  #[serde(default)]
  pub cache_path:               Option<PathBuf>,
  #[serde(default = "default_refresh_interval")]
  pub refresh_interval_secs:    u64,
  #[serde(default = "default_min_refresh_spacing")]
  pub min_refresh_spacing_secs: u64,
  /// IANA zone of the survey's timestamps and of the cutoff.
  #[serde(default = "default_timezone")]
  pub timezone:                 Tz,
  /// Initial cutoff, `YYYY-MM-DDTHH:MM` in `timezone`.
  #[serde(default = "default_cutoff")]
  pub default_cutoff:           String,
  pub survey:                   LimeSurveyConfig,
  /// Charted questions, in display order.
  #[serde(default)]
  pub questions:                Vec<Question>,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_title() -> String { "LimeSurvey Dashboard".to_string() }
fn default_refresh_interval() -> u64 { refresh::DEFAULT_INTERVAL.as_secs() }
fn default_min_refresh_spacing() -> u64 { refresh::DEFAULT_MIN_SPACING.as_secs() }
fn default_timezone() -> Tz { chrono_tz::Europe::Helsinki }
fn default_cutoff() -> String { "2025-05-20T18:00".to_string() }

impl ServerConfig {
  pub fn refresh_interval(&self) -> Duration {
    Duration::from_secs(self.refresh_interval_secs)
  }

  pub fn min_refresh_spacing(&self) -> Duration {
    Duration::from_secs(self.min_refresh_spacing_secs)
  }
}

/// The read-only part of the configuration used while serving pages.
#[derive(Debug, Clone)]
pub struct DashboardSettings {
  pub title:          String,
  pub timezone:       Tz,
  pub default_cutoff: CutoffSetting,
  pub questions:      Vec<Question>,
  /// How often the page reloads itself.
  pub page_reload:    Duration,
}

impl DashboardSettings {
  pub fn from_config(config: &ServerConfig) -> Result<Self, Error> {
    let default_cutoff =
      CutoffSetting::parse_local(&config.default_cutoff, config.timezone)
        .map_err(|e| Error::Config(format!("default_cutoff: {e}")))?;
    Ok(Self {
      title: config.title.clone(),
      timezone: config.timezone,
      default_cutoff,
      questions: config.questions.clone(),
      page_reload: config.refresh_interval(),
    })
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, F> {
  pub refresher: Arc<Refresher<S, F>>,
  pub settings:  Arc<DashboardSettings>,
}

impl<S, F> Clone for AppState<S, F> {
  fn clone(&self) -> Self {
    Self {
      refresher: self.refresher.clone(),
      settings:  self.settings.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the dashboard [`Router`].
pub fn router<S, F>(state: AppState<S, F>) -> Router
where
  S: SnapshotStore + 'static,
  F: ResponseSource + 'static,
{
  Router::new()
    .route("/",            get(handlers::dashboard::handler::<S, F>))
    .route("/refresh",     post(handlers::refresh::handler::<S, F>))
    .route("/api/summary", get(handlers::api::summary::<S, F>))
    .route("/healthz",     get(handlers::health))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
