//! LimeSurvey RemoteControl 2 client.
//!
//! Implements [`survey_core::store::ResponseSource`] by opening a session,
//! exporting every response of one survey as base64-encoded JSON and
//! decoding it into [`survey_core::record::ResponseRecord`]s.

mod client;
mod decode;
mod rpc;

pub mod error;

pub use client::{LimeSurveyClient, LimeSurveyConfig};
pub use decode::decode_export;
pub use error::{Error, Result};
