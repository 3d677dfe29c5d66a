//! Integration tests for [`Scheduler`] over an in-memory SQLite store and
//! a channel delivery sink.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tokio::sync::mpsc::UnboundedReceiver;
use tryst_core::{
  Error,
  booking::BookingStatus,
  delivery::{self, ChannelDelivery, ConfirmationPayload},
  policy::BusinessHoursPolicy,
  slot::Slot,
};
use tryst_store_sqlite::SqliteStore;

use crate::{BookRequest, OrganizerConfig, Scheduler};

type TestScheduler = Scheduler<SqliteStore, SqliteStore, ChannelDelivery>;

// Business hours 10:00–18:00 in Dar es Salaam (UTC+3, no DST): the first
// slot of any day starts at 07:00 UTC.
fn policy() -> BusinessHoursPolicy {
  BusinessHoursPolicy::new("Africa/Dar_es_Salaam", 10, 18, 45, 15).unwrap()
}

fn organizer() -> OrganizerConfig {
  OrganizerConfig {
    name:        "Ephraim".into(),
    email:       "me@ephraim.dev".into(),
    meeting_url: Some("https://meet.example.com/abc".into()),
    location:    None,
  }
}

async fn scheduler()
-> (TestScheduler, UnboundedReceiver<ConfirmationPayload>) {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  let (sink, rx) = delivery::channel();
  let s = Scheduler::new(policy(), organizer(), store.clone(), store, sink);
  (s, rx)
}

fn day() -> NaiveDate { NaiveDate::from_ymd_opt(2026, 9, 1).unwrap() }

fn now() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2026, 8, 24, 12, 0, 0).unwrap()
}

fn request(slot: Slot) -> BookRequest {
  BookRequest {
    name: "Alice".into(),
    email: "alice@example.com".into(),
    topic: "Project".into(),
    slot,
    viewer_timezone: "Africa/Dar_es_Salaam".into(),
  }
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_store_lists_every_generated_slot() {
  let (s, _rx) = scheduler().await;
  let slots = s.list_available_slots(day()).await.unwrap();

  assert_eq!(slots.len(), 8);
  assert_eq!(
    slots[0].start_utc,
    Utc.with_ymd_and_hms(2026, 9, 1, 7, 0, 0).unwrap()
  );
}

#[tokio::test]
async fn booked_slot_disappears_from_listing() {
  let (s, _rx) = scheduler().await;
  let slots = s.list_available_slots(day()).await.unwrap();
  let picked = slots[3];

  s.book(request(picked), now()).await.unwrap();

  let remaining = s.list_available_slots(day()).await.unwrap();
  assert_eq!(remaining.len(), 7);
  assert!(remaining.iter().all(|slot| slot.start_utc != picked.start_utc));
}

// ─── Booking ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn booking_persists_and_enqueues_confirmation() {
  let (s, mut rx) = scheduler().await;
  let slot = s.list_available_slots(day()).await.unwrap()[0];

  let booking = s.book(request(slot), now()).await.unwrap();
  assert_eq!(booking.status, BookingStatus::Confirmed);
  assert_eq!(booking.reschedule_count, 0);
  assert_eq!(booking.start_time, slot.start_utc);
  assert_eq!(
    booking.meeting_url.as_deref(),
    Some("https://meet.example.com/abc")
  );

  let payload = rx.try_recv().expect("confirmation enqueued");
  assert_eq!(payload.booking_id, booking.booking_id);
  assert_eq!(payload.recipient_email, "alice@example.com");
  assert_eq!(payload.local_start, "Tue, Sep 1 at 10:00 AM");

  // The invite is regenerated server-side from the persisted range.
  let ics = String::from_utf8(payload.artifact).unwrap();
  assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"), "got:\n{ics}");
  assert!(ics.contains("DTSTART:20260901T070000Z\r\n"), "got:\n{ics}");
  assert!(ics.contains("DTEND:20260901T074500Z\r\n"), "got:\n{ics}");
  assert!(
    ics.contains("UID:20260824T120000Z-alice@example.com\r\n"),
    "got:\n{ics}"
  );
}

#[tokio::test]
async fn confirmation_renders_start_in_the_viewer_zone() {
  let (s, mut rx) = scheduler().await;
  let slot = s.list_available_slots(day()).await.unwrap()[0];

  let mut req = request(slot);
  // 07:00 UTC is 16:00 in Tokyo.
  req.viewer_timezone = "Asia/Tokyo".into();
  s.book(req, now()).await.unwrap();

  let payload = rx.try_recv().unwrap();
  assert_eq!(payload.local_start, "Tue, Sep 1 at 4:00 PM");
}

#[tokio::test]
async fn contact_is_reused_across_bookings_with_same_email() {
  let (s, _rx) = scheduler().await;
  let slots = s.list_available_slots(day()).await.unwrap();

  let first = s.book(request(slots[0]), now()).await.unwrap();

  // Different spelling of the same address, different slot.
  let mut req = request(slots[1]);
  req.email = "  ALICE@Example.com ".into();
  let second = s.book(req, now()).await.unwrap();

  assert_eq!(first.contact_id, second.contact_id);
  assert_eq!(second.email, "alice@example.com");
}

#[tokio::test]
async fn concurrent_double_book_admits_exactly_one() {
  let (s, _rx) = scheduler().await;
  let slot = s.list_available_slots(day()).await.unwrap()[0];

  let mut other = request(slot);
  other.name = "Bob".into();
  other.email = "bob@example.com".into();

  let (a, b) = tokio::join!(s.book(request(slot), now()), s.book(other, now()));

  let (winner, loser) = match (a, b) {
    (Ok(w), Err(l)) => (w, l),
    (Err(l), Ok(w)) => (w, l),
    (Ok(_), Ok(_)) => panic!("both bookings succeeded"),
    (Err(a), Err(b)) => panic!("both bookings failed: {a}; {b}"),
  };
  assert!(matches!(loser, Error::SlotTaken(start) if start == slot.start_utc));

  // Exactly one non-cancelled booking for the range.
  let all = s.list_bookings(false).await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].booking_id, winner.booking_id);
}

#[tokio::test]
async fn booking_survives_a_closed_delivery_sink() {
  let (s, rx) = scheduler().await;
  drop(rx); // the worker is gone

  let slot = s.list_available_slots(day()).await.unwrap()[0];
  let booking = s.book(request(slot), now()).await.unwrap();

  assert_eq!(booking.status, BookingStatus::Confirmed);
  assert!(s.get_booking(booking.booking_id).await.unwrap().is_some());
}

// ─── Validation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn validation_names_the_offending_field() {
  let (s, _rx) = scheduler().await;
  let slot = s.list_available_slots(day()).await.unwrap()[0];

  let mut req = request(slot);
  req.name = "   ".into();
  let err = s.book(req, now()).await.unwrap_err();
  assert!(matches!(err, Error::Validation { field: "name", .. }));

  let mut req = request(slot);
  req.email = "not-an-address".into();
  let err = s.book(req, now()).await.unwrap_err();
  assert!(matches!(err, Error::Validation { field: "email", .. }));

  let mut req = request(slot);
  req.topic = String::new();
  let err = s.book(req, now()).await.unwrap_err();
  assert!(matches!(err, Error::Validation { field: "topic", .. }));

  let mut req = request(slot);
  req.slot = Slot {
    start_utc: slot.end_utc,
    end_utc:   slot.start_utc,
  };
  let err = s.book(req, now()).await.unwrap_err();
  assert!(matches!(err, Error::Validation { field: "slot", .. }));
}

#[tokio::test]
async fn unknown_viewer_timezone_is_rejected_before_any_write() {
  let (s, _rx) = scheduler().await;
  let slot = s.list_available_slots(day()).await.unwrap()[0];

  let mut req = request(slot);
  req.viewer_timezone = "Atlantis/Lost_City".into();
  let err = s.book(req, now()).await.unwrap_err();
  assert!(matches!(err, Error::UnknownTimezone(_)));

  assert!(s.list_bookings(true).await.unwrap().is_empty());
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn cancelling_frees_the_slot_and_keeps_the_record() {
  let (s, _rx) = scheduler().await;
  let slot = s.list_available_slots(day()).await.unwrap()[0];
  let booking = s.book(request(slot), now()).await.unwrap();

  let cancelled = s.cancel(booking.booking_id).await.unwrap();
  assert_eq!(cancelled.status, BookingStatus::Cancelled);

  // Slot is bookable again.
  let slots = s.list_available_slots(day()).await.unwrap();
  assert_eq!(slots.len(), 8);

  // The record survives with its original fields.
  let kept = s.get_booking(booking.booking_id).await.unwrap().unwrap();
  assert_eq!(kept.start_time, slot.start_utc);
  assert_eq!(kept.email, "alice@example.com");
}

#[tokio::test]
async fn cancelling_twice_reports_already_cancelled() {
  let (s, _rx) = scheduler().await;
  let slot = s.list_available_slots(day()).await.unwrap()[0];
  let booking = s.book(request(slot), now()).await.unwrap();

  s.cancel(booking.booking_id).await.unwrap();
  let err = s.cancel(booking.booking_id).await.unwrap_err();
  assert!(matches!(err, Error::AlreadyCancelled(_)));
}

#[tokio::test]
async fn reschedule_moves_the_range_and_bumps_the_count() {
  let (s, _rx) = scheduler().await;
  let slots = s.list_available_slots(day()).await.unwrap();
  let booking = s.book(request(slots[0]), now()).await.unwrap();

  let moved = s.reschedule(booking.booking_id, slots[5]).await.unwrap();
  assert_eq!(moved.status, BookingStatus::Rescheduled);
  assert_eq!(moved.reschedule_count, 1);
  assert_eq!(moved.start_time, slots[5].start_utc);

  // The original slot is free again; the new one is not.
  let remaining = s.list_available_slots(day()).await.unwrap();
  assert!(remaining.iter().any(|sl| sl.start_utc == slots[0].start_utc));
  assert!(remaining.iter().all(|sl| sl.start_utc != slots[5].start_utc));
}

#[tokio::test]
async fn reschedule_onto_an_occupied_slot_is_a_conflict() {
  let (s, _rx) = scheduler().await;
  let slots = s.list_available_slots(day()).await.unwrap();

  let first = s.book(request(slots[0]), now()).await.unwrap();
  let mut req = request(slots[1]);
  req.email = "bob@example.com".into();
  s.book(req, now()).await.unwrap();

  let err = s.reschedule(first.booking_id, slots[1]).await.unwrap_err();
  assert!(matches!(err, Error::SlotTaken(_)));
}
