//! The cutoff setting and its input parsing policy.
//!
//! A cutoff is a wall-clock date and time in the survey's timezone. It is
//! session state: the dashboard carries the active value along with each
//! request instead of keeping a process-wide global.
//!
//! Raw user input never produces an error at this level. A malformed date or
//! time reverts that component to the previously active cutoff.

use std::fmt;

use chrono::{
  DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;

use crate::{Error, Result};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y"];
const LOCAL_FORMATS: &[&str] =
  &["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// A timestamp boundary: only responses started strictly after it are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutoffSetting {
  at: DateTime<Tz>,
}

impl CutoffSetting {
  pub fn new(at: DateTime<Tz>) -> Self { Self { at } }

  /// Combine a local date and time in `tz`.
  ///
  /// Ambiguous local times resolve to the earlier instant. Times that do not
  /// exist in `tz` (a DST gap) are rejected.
  pub fn from_local(date: NaiveDate, time: NaiveTime, tz: Tz) -> Result<Self> {
    let naive = NaiveDateTime::new(date, time);
    tz.from_local_datetime(&naive)
      .earliest()
      .map(Self::new)
      .ok_or_else(|| Error::MalformedCutoff(naive.to_string()))
  }

  /// Parse the `YYYY-MM-DDTHH:MM` form produced by [`Self::to_param`].
  pub fn parse_local(raw: &str, tz: Tz) -> Result<Self> {
    let raw = raw.trim();
    let naive = LOCAL_FORMATS
      .iter()
      .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
      .ok_or_else(|| Error::MalformedCutoff(raw.to_string()))?;
    Self::from_local(naive.date(), naive.time(), tz)
  }

  pub fn at(&self) -> DateTime<Tz> { self.at }

  /// The boundary as a UTC instant, as the filter engine consumes it.
  pub fn timestamp(&self) -> DateTime<Utc> { self.at.with_timezone(&Utc) }

  pub fn timezone(&self) -> Tz { self.at.timezone() }

  pub fn date(&self) -> NaiveDate { self.at.date_naive() }

  /// Local time of day, truncated to the minute.
  pub fn time(&self) -> NaiveTime {
    NaiveTime::from_hms_opt(self.at.hour(), self.at.minute(), 0)
      .unwrap_or(NaiveTime::MIN)
  }

  /// Round-trippable form used to carry the active cutoff between requests.
  pub fn to_param(&self) -> String {
    self.at.format("%Y-%m-%dT%H:%M").to_string()
  }

  /// Apply raw date and time input on top of this setting.
  ///
  /// Each component falls back independently to the current value when it
  /// is missing or malformed. If the combination does not exist in the
  /// timezone the current setting is returned unchanged.
  pub fn apply(&self, raw_date: Option<&str>, raw_time: Option<&str>) -> Self {
    let date = match raw_date.map(parse_date) {
      Some(Ok(date)) => date,
      Some(Err(e)) => {
        tracing::debug!("keeping previous cutoff date: {e}");
        self.date()
      }
      None => self.date(),
    };
    let time = match raw_time.map(parse_time) {
      Some(Ok(time)) => time,
      Some(Err(e)) => {
        tracing::debug!("keeping previous cutoff time: {e}");
        self.time()
      }
      None => self.time(),
    };

    Self::from_local(date, time, self.timezone()).unwrap_or_else(|e| {
      tracing::debug!("keeping previous cutoff: {e}");
      *self
    })
  }
}

impl fmt::Display for CutoffSetting {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.at.format("%d.%m.%Y %H:%M"))
  }
}

/// Parse a date as sent by a date picker (`YYYY-MM-DD`, optionally with a
/// time part) or typed by hand (`DD.MM.YYYY`).
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
  let raw = raw.trim();
  DATE_FORMATS
    .iter()
    .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    .or_else(|| {
      NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.date())
    })
    .ok_or_else(|| Error::MalformedCutoff(raw.to_string()))
}

/// Parse an `HH:MM` time of day.
pub fn parse_time(raw: &str) -> Result<NaiveTime> {
  let malformed = || Error::MalformedCutoff(raw.to_string());
  let (hours, minutes) = raw.trim().split_once(':').ok_or_else(malformed)?;
  let hours: u32 = hours.trim().parse().map_err(|_| malformed())?;
  let minutes: u32 = minutes.trim().parse().map_err(|_| malformed())?;
  NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(malformed)
}

#[cfg(test)]
mod tests {
  use chrono_tz::Europe::Helsinki;

  use super::*;

  fn default_cutoff() -> CutoffSetting {
    CutoffSetting::parse_local("2025-05-20T18:00", Helsinki).unwrap()
  }

  #[test]
  fn parse_local_round_trips_through_param() {
    let cutoff = default_cutoff();
    assert_eq!(cutoff.to_param(), "2025-05-20T18:00");
    assert_eq!(
      CutoffSetting::parse_local(&cutoff.to_param(), Helsinki).unwrap(),
      cutoff
    );
  }

  #[test]
  fn timestamp_is_converted_to_utc() {
    // Helsinki is UTC+3 in May.
    let cutoff = default_cutoff();
    assert_eq!(cutoff.timestamp().to_rfc3339(), "2025-05-20T15:00:00+00:00");
  }

  #[test]
  fn apply_accepts_valid_input() {
    let next = default_cutoff().apply(Some("2025-06-01"), Some("09:30"));
    assert_eq!(next.to_param(), "2025-06-01T09:30");
  }

  #[test]
  fn garbage_time_keeps_previous_time() {
    let cutoff = default_cutoff();
    let next = cutoff.apply(Some("2025-06-01"), Some("garbage"));
    assert_eq!(next.to_param(), "2025-06-01T18:00");

    let unchanged = cutoff.apply(None, Some("garbage"));
    assert_eq!(unchanged, cutoff);
  }

  #[test]
  fn garbage_date_keeps_previous_date() {
    let next = default_cutoff().apply(Some("not-a-date"), Some("07:05"));
    assert_eq!(next.to_param(), "2025-05-20T07:05");
  }

  #[test]
  fn out_of_range_time_is_malformed() {
    assert!(parse_time("24:00").is_err());
    assert!(parse_time("12:60").is_err());
    assert!(parse_time("12").is_err());
    assert!(parse_time("").is_err());
    assert_eq!(
      parse_time(" 9:5 ").unwrap(),
      NaiveTime::from_hms_opt(9, 5, 0).unwrap()
    );
  }

  #[test]
  fn dates_accept_picker_and_manual_forms() {
    let expected = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap();
    assert_eq!(parse_date("2025-05-20").unwrap(), expected);
    assert_eq!(parse_date("20.05.2025").unwrap(), expected);
    assert_eq!(parse_date("2025-05-20T00:00:00").unwrap(), expected);
    assert!(parse_date("2025-13-01").is_err());
  }

  #[test]
  fn nonexistent_local_time_keeps_previous_setting() {
    // 2025-03-30 03:30 does not exist in Helsinki (clocks jump 03:00 → 04:00).
    let cutoff = default_cutoff();
    let next = cutoff.apply(Some("2025-03-30"), Some("03:30"));
    assert_eq!(next, cutoff);
  }

  #[test]
  fn display_uses_day_first_format() {
    assert_eq!(default_cutoff().to_string(), "20.05.2025 18:00");
  }
}
