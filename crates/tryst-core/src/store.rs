//! Store traits for bookings and contacts.
//!
//! Implemented by storage backends (e.g. `tryst-store-sqlite`). Higher
//! layers (`tryst-engine`, `tryst-cli`) depend on these abstractions, not
//! on any concrete backend.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  booking::{Booking, NewBooking},
  contact::{Contact, NewContact},
};

// ─── BookingStore ────────────────────────────────────────────────────────────

/// Abstraction over the persisted booking set.
///
/// The store is the final authority on the no-overlap invariant:
/// [`BookingStore::insert_booking`] and
/// [`BookingStore::reschedule_booking`] must perform their conflict check
/// and write as one atomic step, serialized against every other write to
/// the same time range. Availability filtering upstream is advisory UX
/// only.
pub trait BookingStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new booking with `confirmed` status and a zero reschedule
  /// count, or fail if its `[start_time, end_time)` range overlaps an
  /// existing non-cancelled booking. `booking_id` and `created_at` are
  /// assigned by the store.
  fn insert_booking(
    &self,
    input: NewBooking,
  ) -> impl Future<Output = Result<Booking, Self::Error>> + Send + '_;

  /// Retrieve a booking by ID, including cancelled ones. `None` if absent.
  fn get_booking(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Booking>, Self::Error>> + Send + '_;

  /// All non-cancelled bookings whose `start_time` falls in
  /// `[start, end)`, ascending by start.
  fn bookings_in_range(
    &self,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<Booking>, Self::Error>> + Send + '_;

  /// Every booking, descending by `start_time`. Cancelled bookings are
  /// included only when `include_cancelled` is set.
  fn list_bookings(
    &self,
    include_cancelled: bool,
  ) -> impl Future<Output = Result<Vec<Booking>, Self::Error>> + Send + '_;

  /// Transition a booking to `cancelled`. The record is retained with all
  /// original fields — cancellation is never a delete.
  fn cancel_booking(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Booking, Self::Error>> + Send + '_;

  /// Move a booking to a new conflict-checked range, set its status to
  /// `rescheduled`, and bump `reschedule_count`. Cancelled bookings
  /// cannot be rescheduled.
  fn reschedule_booking(
    &self,
    id: Uuid,
    new_start: DateTime<Utc>,
    new_end: DateTime<Utc>,
  ) -> impl Future<Output = Result<Booking, Self::Error>> + Send + '_;
}

// ─── ContactStore ────────────────────────────────────────────────────────────

/// Abstraction over the contact records bookings attach to.
pub trait ContactStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Look up a contact by normalized email. `None` if absent.
  fn find_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + 'a;

  /// Persist a contact. If the email already exists the store must return
  /// the existing record rather than create a duplicate.
  fn insert_contact(
    &self,
    input: NewContact,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + '_;
}
