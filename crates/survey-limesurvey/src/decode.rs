//! Decoding of `export_responses` payloads.
//!
//! The API returns a base64 string wrapping `{"responses": [...]}`. Depending
//! on the LimeSurvey version each response is either a flat object or a
//! single-entry object keyed by the response id.

use std::collections::BTreeMap;

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use chrono::{NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::{Map, Value};
use survey_core::record::ResponseRecord;

use crate::{Error, Result};

const START_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Columns mapped onto dedicated record fields rather than answers.
const RESERVED: &[&str] = &["token", "startdate", "lastpage"];

#[derive(Deserialize)]
struct ExportPayload {
  responses: Vec<Value>,
}

/// Decode a base64 export into records.
///
/// Start dates are interpreted as wall-clock times in `tz`. `is_completed`
/// is derived here, once, from `lastpage >= completion_threshold`.
pub fn decode_export(
  raw_b64: &str,
  tz: Tz,
  completion_threshold: i64,
) -> Result<Vec<ResponseRecord>> {
  let bytes = B64.decode(raw_b64.trim())?;
  let payload: ExportPayload = serde_json::from_slice(&bytes)?;

  payload
    .responses
    .into_iter()
    .map(|row| decode_row(unwrap_row(row)?, tz, completion_threshold))
    .collect()
}

fn unwrap_row(row: Value) -> Result<Map<String, Value>> {
  let mut map = match row {
    Value::Object(map) => map,
    other => {
      return Err(Error::Payload(format!("response is not an object: {other}")));
    }
  };
  if map.len() == 1
    && let Some(key) = map.keys().next().cloned()
    && map[&key].is_object()
    && let Some(Value::Object(inner)) = map.remove(&key)
  {
    return Ok(inner);
  }
  Ok(map)
}

fn decode_row(
  mut row: Map<String, Value>,
  tz: Tz,
  completion_threshold: i64,
) -> Result<ResponseRecord> {
  for column in ["startdate", "lastpage"] {
    if !row.contains_key(column) {
      return Err(Error::Payload(format!("response lacks {column:?} column")));
    }
  }

  let token = row.remove("token").and_then(|v| text(&v));
  let started_at = match row.remove("startdate") {
    Some(Value::String(s)) if !s.is_empty() => {
      let naive = NaiveDateTime::parse_from_str(&s, START_DATE_FORMAT)
        .map_err(|e| Error::Payload(format!("bad startdate {s:?}: {e}")))?;
      tz.from_local_datetime(&naive).earliest().map(|t| t.with_timezone(&Utc))
    }
    _ => None,
  };
  let last_page = row.remove("lastpage").and_then(|v| match v {
    Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  });

  let answers: BTreeMap<String, String> = row
    .into_iter()
    .filter(|(code, _)| !RESERVED.contains(&code.as_str()))
    .filter_map(|(code, value)| text(&value).map(|v| (code, v)))
    .collect();

  Ok(ResponseRecord::new(token, started_at, last_page, answers, completion_threshold))
}

/// Scalar JSON values as text. Nulls and containers carry no answer.
fn text(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    Value::Null | Value::Array(_) | Value::Object(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use chrono_tz::Europe::Helsinki;
  use serde_json::json;

  use super::*;

  fn encode(payload: Value) -> String { B64.encode(payload.to_string()) }

  #[test]
  fn decodes_flat_responses() {
    let raw = encode(json!({
      "responses": [
        {"id": 1, "token": "abc", "startdate": "2025-05-21 10:00:00",
         "lastpage": 5, "q1age": "A2", "q1gender": null},
        {"id": 2, "token": null, "startdate": "2025-05-21 11:30:00",
         "lastpage": "2", "q1age": "A3"}
      ]
    }));
    let records = decode_export(&raw, Helsinki, 5).unwrap();
    assert_eq!(records.len(), 2);

    let first = &records[0];
    assert_eq!(first.token.as_deref(), Some("abc"));
    assert_eq!(
      first.started_at.unwrap().to_rfc3339(),
      "2025-05-21T07:00:00+00:00"
    );
    assert!(first.is_completed);
    assert_eq!(first.answers.get("q1age").map(String::as_str), Some("A2"));
    assert!(!first.answers.contains_key("q1gender"));
    assert_eq!(first.answers.get("id").map(String::as_str), Some("1"));

    let second = &records[1];
    assert_eq!(second.token, None);
    assert_eq!(second.last_page, Some(2));
    assert!(!second.is_completed);
  }

  #[test]
  fn decodes_id_keyed_responses() {
    let raw = encode(json!({
      "responses": [
        {"17": {"token": "t", "startdate": "2025-05-21 10:00:00", "lastpage": 1}}
      ]
    }));
    let records = decode_export(&raw, Helsinki, 1).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].token.as_deref(), Some("t"));
    assert!(records[0].is_completed);
  }

  #[test]
  fn null_lastpage_is_not_completed() {
    let raw = encode(json!({
      "responses": [{"startdate": null, "lastpage": null}]
    }));
    let records = decode_export(&raw, Helsinki, 0).unwrap();
    assert_eq!(records[0].last_page, None);
    assert_eq!(records[0].started_at, None);
    assert!(!records[0].is_completed);
  }

  #[test]
  fn empty_export_is_not_an_error() {
    let raw = encode(json!({ "responses": [] }));
    assert!(decode_export(&raw, Helsinki, 3).unwrap().is_empty());
  }

  #[test]
  fn missing_responses_key_is_a_format_error() {
    let raw = encode(json!({ "status": "whatever" }));
    assert!(matches!(decode_export(&raw, Helsinki, 3), Err(Error::Json(_))));

    let err = survey_core::FetchError::from(decode_export(&raw, Helsinki, 3).unwrap_err());
    assert!(matches!(err, survey_core::FetchError::DataFormat(_)));
  }

  #[test]
  fn empty_token_is_kept() {
    let raw = encode(json!({
      "responses": [{"token": "", "startdate": "2025-05-21 10:00:00", "lastpage": 1}]
    }));
    let records = decode_export(&raw, Helsinki, 3).unwrap();
    assert_eq!(records[0].token.as_deref(), Some(""));
  }

  #[test]
  fn missing_columns_are_a_format_error() {
    let raw = encode(json!({ "responses": [{"token": "abc"}] }));
    assert!(matches!(decode_export(&raw, Helsinki, 3), Err(Error::Payload(_))));
  }

  #[test]
  fn malformed_startdate_is_a_format_error() {
    let raw = encode(json!({
      "responses": [{"startdate": "yesterday", "lastpage": 1}]
    }));
    assert!(matches!(decode_export(&raw, Helsinki, 3), Err(Error::Payload(_))));
  }

  #[test]
  fn invalid_base64_is_rejected() {
    assert!(matches!(decode_export("%%%", Helsinki, 3), Err(Error::Base64(_))));
  }
}
