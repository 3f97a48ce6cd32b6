//! Core types and pure logic for the survey dashboard.
//!
//! This crate is deliberately free of HTTP and disk dependencies. The cache
//! backend (`survey-store-file`), the remote fetcher (`survey-limesurvey`)
//! and the web layer (`survey-dashboard`) all depend on it.

pub mod cutoff;
pub mod error;
pub mod filter;
pub mod record;
pub mod store;
pub mod summary;

pub use error::{Error, FetchError, Result};
