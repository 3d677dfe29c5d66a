//! Local-time presentation — render absolute instants for a viewer's zone.
//!
//! Date and time formatting are deliberately separate: an instant near
//! midnight in the reference zone can fall on a different calendar date in
//! the viewer's zone, so any per-day listing must re-bucket slots by the
//! *viewer's* local date, never the reference zone's.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, slot::Slot};

/// A slot rendered for display, e.g. `"Mon, Oct 5"` / `"3:30 PM"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotDisplay {
  pub local_date: String,
  pub local_time: String,
}

/// `"3:30 PM"` in the viewer's zone. Pure; the instant is untouched.
pub fn format_local_time(instant: DateTime<Utc>, zone: Tz) -> String {
  instant.with_timezone(&zone).format("%-I:%M %p").to_string()
}

/// `"Mon, Oct 5"` in the viewer's zone. Pure; the instant is untouched.
pub fn format_local_date(instant: DateTime<Utc>, zone: Tz) -> String {
  instant.with_timezone(&zone).format("%a, %b %-d").to_string()
}

/// Parse a viewer-supplied IANA zone identifier.
pub fn parse_timezone(name: &str) -> Result<Tz> {
  name
    .parse()
    .map_err(|_| Error::UnknownTimezone(name.to_string()))
}

/// Render a slot's start for a viewer.
pub fn format_slot_for_viewer(slot: &Slot, zone: Tz) -> SlotDisplay {
  SlotDisplay {
    local_date: format_local_date(slot.start_utc, zone),
    local_time: format_local_time(slot.start_utc, zone),
  }
}
