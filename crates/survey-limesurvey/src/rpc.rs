//! JSON-RPC envelope types for the RemoteControl 2 API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
  pub method: &'a str,
  pub params: Value,
  pub id:     u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse {
  #[serde(default)]
  pub result: Value,
  #[serde(default)]
  pub error:  Value,
}

/// RemoteControl reports most failures as `{"status": "..."}` in `result`.
pub(crate) fn status_of(result: &Value) -> Option<&str> {
  result.get("status").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn status_is_read_from_object_results() {
    assert_eq!(status_of(&json!({"status": "Invalid session key"})), Some("Invalid session key"));
    assert_eq!(status_of(&json!("c2Vzc2lvbg==")), None);
  }

  #[test]
  fn response_tolerates_missing_error() {
    let resp: RpcResponse = serde_json::from_str(r#"{"id":1,"result":"abc"}"#).unwrap();
    assert_eq!(resp.result, json!("abc"));
    assert!(resp.error.is_null());
  }
}
