//! Error type for `tryst-store-sqlite`.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown status value: {0:?}")]
  UnknownStatus(String),

  #[error("reschedule count out of range: {0}")]
  InvalidRescheduleCount(i64),

  /// The requested range overlaps an existing non-cancelled booking.
  #[error("time range starting at {0} conflicts with an existing booking")]
  Conflict(DateTime<Utc>),

  #[error("booking not found: {0}")]
  BookingNotFound(Uuid),

  #[error("booking {0} is already cancelled")]
  AlreadyCancelled(Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Map store failures onto the core taxonomy so the engine can surface
/// conflicts distinctly from infrastructure faults.
impl From<Error> for tryst_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Conflict(start) => tryst_core::Error::SlotTaken(start),
      Error::BookingNotFound(id) => tryst_core::Error::BookingNotFound(id),
      Error::AlreadyCancelled(id) => tryst_core::Error::AlreadyCancelled(id),
      other => tryst_core::Error::Store(Box::new(other)),
    }
  }
}
