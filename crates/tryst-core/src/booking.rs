//! Booking — the persisted reservation entity.
//!
//! Bookings are never physically deleted: cancellation and rescheduling
//! are status transitions, and rows carry a soft-delete timestamp, so the
//! audit history survives every lifecycle event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle state of a booking. Cancelled bookings stop counting toward
/// availability but remain retrievable.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BookingStatus {
  Confirmed,
  Rescheduled,
  Cancelled,
  Completed,
}

// ─── Booking ─────────────────────────────────────────────────────────────────

/// A persisted reservation for one meeting slot.
///
/// `start_time < end_time` always holds, and no two non-cancelled bookings
/// may have overlapping `[start_time, end_time)` ranges — the store's
/// write-time check is the final authority on that invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
  pub booking_id:        Uuid,
  /// Weak reference to the contact resolved at booking time.
  pub contact_id:        Option<Uuid>,
  /// Weak reference to a client record, if the contact is a known client.
  pub client_id:         Option<Uuid>,
  pub name:              String,
  pub email:             String,
  pub topic:             String,
  pub start_time:        DateTime<Utc>,
  pub end_time:          DateTime<Utc>,
  pub status:            BookingStatus,
  pub reschedule_count:  u32,
  pub meeting_url:       Option<String>,
  /// Event ID in an external calendar, once synced there.
  pub calendar_event_id: Option<String>,
  /// Server-assigned; never changes after creation.
  pub created_at:        DateTime<Utc>,
  pub deleted_at:        Option<DateTime<Utc>>,
}

// ─── NewBooking ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::BookingStore::insert_booking`].
/// `booking_id`, `status`, and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewBooking {
  pub contact_id:  Option<Uuid>,
  pub client_id:   Option<Uuid>,
  pub name:        String,
  pub email:       String,
  pub topic:       String,
  pub start_time:  DateTime<Utc>,
  pub end_time:    DateTime<Utc>,
  pub meeting_url: Option<String>,
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn status_round_trips_through_column_text() {
    for status in [
      BookingStatus::Confirmed,
      BookingStatus::Rescheduled,
      BookingStatus::Cancelled,
      BookingStatus::Completed,
    ] {
      let text = status.to_string();
      assert_eq!(BookingStatus::from_str(&text).unwrap(), status);
    }
  }

  #[test]
  fn status_text_is_lowercase() {
    assert_eq!(BookingStatus::Confirmed.to_string(), "confirmed");
    assert_eq!(BookingStatus::Cancelled.to_string(), "cancelled");
  }
}
