//! Single-file backend for the survey snapshot cache.
//!
//! The snapshot lives in one JSON file. Writes are staged in a sibling
//! temporary file and renamed over the canonical path, so a reader always
//! sees a complete snapshot.

mod encode;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::FileSnapshotStore;

#[cfg(test)]
mod tests;
