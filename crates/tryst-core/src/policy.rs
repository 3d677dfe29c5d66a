//! Business-hours policy — immutable configuration for the slot generator.
//!
//! Hours are anchored to a fixed reference timezone so that the operator's
//! working day stays locally correct across DST transitions, wherever the
//! viewer happens to be.

use chrono::Duration;
use chrono_tz::Tz;

use crate::{Error, Result};

/// Bookable hours in the operator's reference timezone.
///
/// The interval is half-open: `[start_hour, end_hour)` local time. Stride
/// between consecutive slot starts is `slot_duration_minutes +
/// buffer_minutes`. Loaded once at process start and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessHoursPolicy {
  reference_timezone:    Tz,
  start_hour:            u32,
  end_hour:              u32,
  slot_duration_minutes: u32,
  buffer_minutes:        u32,
}

impl BusinessHoursPolicy {
  /// Validate and construct a policy. `reference_timezone` must be a valid
  /// IANA identifier, hours must satisfy `start_hour < end_hour <= 24`, and
  /// the stride must be positive.
  pub fn new(
    reference_timezone: &str,
    start_hour: u32,
    end_hour: u32,
    slot_duration_minutes: u32,
    buffer_minutes: u32,
  ) -> Result<Self> {
    let tz: Tz = reference_timezone
      .parse()
      .map_err(|_| Error::UnknownTimezone(reference_timezone.to_string()))?;

    if start_hour >= end_hour {
      return Err(Error::InvalidPolicy(format!(
        "start_hour ({start_hour}) must be before end_hour ({end_hour})"
      )));
    }
    // Hours are wall-clock integers 0-23; the generator anchors the close
    // boundary with `end_hour:00` on the same civil date, so 24 has no
    // valid anchor either.
    if end_hour > 23 {
      return Err(Error::InvalidPolicy(format!(
        "end_hour ({end_hour}) must be at most 23"
      )));
    }
    if slot_duration_minutes == 0 {
      return Err(Error::InvalidPolicy(
        "slot_duration_minutes must be positive".into(),
      ));
    }

    Ok(Self {
      reference_timezone: tz,
      start_hour,
      end_hour,
      slot_duration_minutes,
      buffer_minutes,
    })
  }

  pub fn reference_timezone(&self) -> Tz { self.reference_timezone }

  pub fn start_hour(&self) -> u32 { self.start_hour }

  pub fn end_hour(&self) -> u32 { self.end_hour }

  /// Length of a single meeting.
  pub fn slot_duration(&self) -> Duration {
    Duration::minutes(i64::from(self.slot_duration_minutes))
  }

  /// Distance between consecutive slot starts: meeting plus buffer.
  pub fn stride(&self) -> Duration {
    Duration::minutes(i64::from(
      self.slot_duration_minutes + self.buffer_minutes,
    ))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn valid_policy_parses_zone_and_computes_stride() {
    let p =
      BusinessHoursPolicy::new("Africa/Dar_es_Salaam", 10, 18, 45, 15)
        .unwrap();
    assert_eq!(p.reference_timezone(), chrono_tz::Africa::Dar_es_Salaam);
    assert_eq!(p.stride(), Duration::minutes(60));
    assert_eq!(p.slot_duration(), Duration::minutes(45));
  }

  #[test]
  fn unknown_timezone_rejected() {
    let err =
      BusinessHoursPolicy::new("Mars/Olympus_Mons", 10, 18, 45, 15)
        .unwrap_err();
    assert!(matches!(err, Error::UnknownTimezone(_)));
  }

  #[test]
  fn inverted_hours_rejected() {
    let err = BusinessHoursPolicy::new("UTC", 18, 10, 45, 15).unwrap_err();
    assert!(matches!(err, Error::InvalidPolicy(_)));
  }

  #[test]
  fn equal_hours_rejected() {
    let err = BusinessHoursPolicy::new("UTC", 10, 10, 45, 15).unwrap_err();
    assert!(matches!(err, Error::InvalidPolicy(_)));
  }

  #[test]
  fn zero_duration_rejected() {
    let err = BusinessHoursPolicy::new("UTC", 10, 18, 0, 15).unwrap_err();
    assert!(matches!(err, Error::InvalidPolicy(_)));
  }

  #[test]
  fn end_hour_past_wall_clock_range_rejected() {
    for end in [24, 25] {
      let err = BusinessHoursPolicy::new("UTC", 10, end, 45, 15).unwrap_err();
      assert!(matches!(err, Error::InvalidPolicy(_)), "end_hour {end}");
    }
  }

  #[test]
  fn latest_valid_end_hour_accepted() {
    assert!(BusinessHoursPolicy::new("UTC", 10, 23, 45, 15).is_ok());
  }
}
