//! On-disk representation of a snapshot.
//!
//! The file holds a small versioned envelope around the serde form of
//! [`Snapshot`]. Nothing outside this crate reads the bytes.

use serde::{Deserialize, Serialize};
use survey_core::record::Snapshot;

use crate::{Error, Result};

pub(crate) const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
  format:   u32,
  snapshot: &'a Snapshot,
}

#[derive(Deserialize)]
struct Envelope {
  format:   u32,
  snapshot: Snapshot,
}

pub(crate) fn encode(snapshot: &Snapshot) -> Result<Vec<u8>> {
  Ok(serde_json::to_vec(&EnvelopeRef { format: FORMAT_VERSION, snapshot })?)
}

pub(crate) fn decode(bytes: &[u8]) -> Result<Snapshot> {
  let envelope: Envelope = serde_json::from_slice(bytes)?;
  if envelope.format != FORMAT_VERSION {
    return Err(Error::UnsupportedFormat(envelope.format));
  }
  Ok(envelope.snapshot)
}
