//! Timezone-aware slot generation and availability filtering.
//!
//! Every computation is anchored to civil time in the policy's reference
//! zone and converted to an absolute instant only at the boundary. Fixed
//! UTC-offset arithmetic would silently shift local meeting times across
//! DST transitions.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, policy::BusinessHoursPolicy};

// ─── Slot ────────────────────────────────────────────────────────────────────

/// A candidate bookable meeting window, before availability filtering.
///
/// Ephemeral: computed fresh per request and never cached, because the
/// policy or the booked set may change between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
  pub start_utc: DateTime<Utc>,
  pub end_utc:   DateTime<Utc>,
}

impl Slot {
  /// Half-open interval overlap: `[a0, a1)` and `[b0, b1)` overlap iff
  /// `a0 < b1 && b0 < a1`. Adjacent ranges do not overlap.
  pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    self.start_utc < end && start < self.end_utc
  }
}

// ─── Civil-time anchoring ────────────────────────────────────────────────────

/// Resolve a civil date-time in `zone` to an absolute instant.
///
/// An ambiguous local time (DST fall-back repeats an hour) resolves to the
/// earlier offset. A nonexistent local time (spring-forward gap) is an
/// explicit error rather than a silent shift.
pub fn local_to_utc(local: NaiveDateTime, zone: Tz) -> Result<DateTime<Utc>> {
  match zone.from_local_datetime(&local) {
    LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
    LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
    LocalResult::None => Err(Error::NonexistentLocalTime {
      local,
      zone: zone.name().to_string(),
    }),
  }
}

fn anchor_hour(day: NaiveDate, hour: u32, zone: Tz) -> Result<DateTime<Utc>> {
  let time = chrono::NaiveTime::from_hms_opt(hour, 0, 0).ok_or_else(|| {
    Error::InvalidPolicy(format!("hour {hour} out of range"))
  })?;
  local_to_utc(day.and_time(time), zone)
}

// ─── Generation ──────────────────────────────────────────────────────────────

/// Generate every candidate slot for `day` under `policy`, ascending by
/// start, expressed in UTC.
///
/// The loop is bounded only by the slot *start*: a final slot whose end
/// runs past business close is still emitted. Restartable — pure function
/// of its inputs, no clock access.
pub fn generate_slots(
  day: NaiveDate,
  policy: &BusinessHoursPolicy,
) -> Result<Vec<Slot>> {
  let zone = policy.reference_timezone();
  let open = anchor_hour(day, policy.start_hour(), zone)?;
  let close = anchor_hour(day, policy.end_hour(), zone)?;

  let duration = policy.slot_duration();
  let stride = policy.stride();

  let mut slots = Vec::new();
  let mut cursor = open;
  while cursor < close {
    slots.push(Slot {
      start_utc: cursor,
      end_utc:   cursor + duration,
    });
    cursor += stride;
  }
  Ok(slots)
}

// ─── Availability ────────────────────────────────────────────────────────────

/// Drop every slot that overlaps any booked range. `booked` holds the
/// `[start, end)` ranges of non-cancelled bookings covering the day.
///
/// Advisory only: the write-time conflict check in the booking store is
/// the final authority, because of the read-then-write race between slot
/// listing and booking creation.
pub fn filter_available(
  slots: Vec<Slot>,
  booked: &[(DateTime<Utc>, DateTime<Utc>)],
) -> Vec<Slot> {
  slots
    .into_iter()
    .filter(|slot| {
      !booked.iter().any(|&(start, end)| slot.overlaps(start, end))
    })
    .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
