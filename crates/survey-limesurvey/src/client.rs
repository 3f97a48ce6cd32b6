//! Async JSON-RPC client for the LimeSurvey RemoteControl 2 API.

use std::{fmt, time::Duration};

use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use survey_core::{FetchError, record::ResponseRecord, store::ResponseSource};

use crate::{
  Error, Result,
  decode::decode_export,
  rpc::{RpcRequest, RpcResponse, status_of},
};

/// Status LimeSurvey reports instead of a payload when a survey has no rows.
const NO_RESPONSES: &str = "No Response found";

/// Connection settings for one survey.
#[derive(Clone, Deserialize)]
pub struct LimeSurveyConfig {
  /// RemoteControl endpoint, e.g. `https://host/index.php/admin/remotecontrol`.
  pub api_url:            String,
  pub username:           String,
  pub password:           String,
  pub survey_id:          i64,
  /// Responses whose `lastpage` reaches this value count as completed.
  #[serde(default)]
  pub lastpage_threshold: i64,
}

impl fmt::Debug for LimeSurveyConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LimeSurveyConfig")
      .field("api_url", &self.api_url)
      .field("username", &self.username)
      .field("password", &"<redacted>")
      .field("survey_id", &self.survey_id)
      .field("lastpage_threshold", &self.lastpage_threshold)
      .finish()
  }
}

/// Fetches survey responses over RemoteControl 2.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct LimeSurveyClient {
  client:   Client,
  config:   LimeSurveyConfig,
  timezone: Tz,
}

impl LimeSurveyClient {
  /// `timezone` is the zone the survey server writes start dates in.
  pub fn new(config: LimeSurveyConfig, timezone: Tz) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
    Ok(Self { client, config, timezone })
  }

  async fn call(&self, method: &'static str, params: Value) -> Result<Value> {
    let resp = self
      .client
      .post(&self.config.api_url)
      .json(&RpcRequest { method, params, id: 1 })
      .send()
      .await?
      .error_for_status()?;

    let body: RpcResponse = resp.json().await?;
    if !body.error.is_null() {
      return Err(Error::Rpc { method, message: body.error.to_string() });
    }
    Ok(body.result)
  }

  async fn open_session(&self) -> Result<String> {
    let result = self
      .call(
        "get_session_key",
        json!([self.config.username, self.config.password]),
      )
      .await?;
    match result {
      Value::String(key) => Ok(key),
      other => Err(Error::Auth(
        status_of(&other).unwrap_or("no session key returned").to_string(),
      )),
    }
  }

  async fn release_session(&self, key: &str) {
    if let Err(e) = self.call("release_session_key", json!([key])).await {
      tracing::warn!("failed to release LimeSurvey session: {e}");
    }
  }

  async fn export(&self, key: &str) -> Result<Vec<ResponseRecord>> {
    let result = self
      .call(
        "export_responses",
        json!([key, self.config.survey_id, "json", null, "all", "code", "long"]),
      )
      .await?;

    match result {
      Value::String(raw) => {
        decode_export(&raw, self.timezone, self.config.lastpage_threshold)
      }
      other => match status_of(&other) {
        Some(NO_RESPONSES) => Ok(Vec::new()),
        Some(status) if status.contains("session key") => {
          Err(Error::Auth(status.to_string()))
        }
        Some(status) => Err(Error::Rpc {
          method:  "export_responses",
          message: status.to_string(),
        }),
        None => Err(Error::Payload(format!("unexpected export result: {other}"))),
      },
    }
  }

  /// Export every response of the configured survey.
  ///
  /// The session is released whether or not the export succeeds.
  pub async fn export_responses(&self) -> Result<Vec<ResponseRecord>> {
    let key = self.open_session().await?;
    let result = self.export(&key).await;
    self.release_session(&key).await;

    let records = result?;
    if records.is_empty() {
      tracing::info!("survey {} returned no responses", self.config.survey_id);
    }
    Ok(records)
  }
}

impl ResponseSource for LimeSurveyClient {
  async fn fetch_all(&self) -> Result<Vec<ResponseRecord>, FetchError> {
    Ok(self.export_responses().await?)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
