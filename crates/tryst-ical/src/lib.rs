//! iCalendar (RFC 5545) invite encoder.
//!
//! Produces the calendar attachment ("magic ticket") for a booking
//! confirmation: a single `METHOD:REQUEST` VCALENDAR holding one VEVENT.
//! Output is deterministic given identical inputs; the UID folds in the
//! generation instant and attendee address so separately generated
//! invites for the same nominal meeting never collide in clients that
//! deduplicate by UID.

mod encode;

pub use encode::encode;

use chrono::{DateTime, Utc};

/// A named mail participant: organizer or attendee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Party {
  pub name:  String,
  pub email: String,
}

/// Inputs for one encoded invite.
///
/// `generated_at` is injected by the caller — the encoder never reads the
/// clock — and doubles as the `DTSTAMP` and the UID uniqueness token.
#[derive(Debug, Clone)]
pub struct Invite {
  pub start_utc:    DateTime<Utc>,
  pub end_utc:      DateTime<Utc>,
  pub summary:      String,
  pub description:  String,
  pub location:     Option<String>,
  pub organizer:    Party,
  pub attendee:     Party,
  pub generated_at: DateTime<Utc>,
}
