//! Error types for `tryst-core`.

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed caller input. Always names the offending field so the
  /// caller can surface it directly.
  #[error("invalid {field}: {reason}")]
  Validation {
    field:  &'static str,
    reason: String,
  },

  /// The selected slot was taken between listing and booking. Surfaced
  /// as-is so the caller can re-fetch slots; never retried with a
  /// different slot.
  #[error("slot starting at {0} is no longer available")]
  SlotTaken(DateTime<Utc>),

  #[error("booking not found: {0}")]
  BookingNotFound(Uuid),

  #[error("booking {0} is already cancelled")]
  AlreadyCancelled(Uuid),

  #[error("unknown IANA timezone: {0:?}")]
  UnknownTimezone(String),

  /// The civil time falls inside a DST spring-forward gap and has no
  /// absolute equivalent in the given zone.
  #[error("local time {local} does not exist in {zone}")]
  NonexistentLocalTime { local: NaiveDateTime, zone: String },

  #[error("invalid business-hours policy: {0}")]
  InvalidPolicy(String),

  /// Transient failure from a booking or contact store. The core performs
  /// no automatic retry; blindly retrying a non-idempotent insert risks
  /// duplicate bookings.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
