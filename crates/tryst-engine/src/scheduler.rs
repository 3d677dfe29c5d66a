//! [`Scheduler`] — the scheduling engine over any store pair and delivery
//! sink.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tryst_core::{
  Error, Result,
  booking::{Booking, NewBooking},
  contact::{ContactStatus, NewContact, normalize_email},
  delivery::{ConfirmationPayload, DeliverySink},
  policy::BusinessHoursPolicy,
  present::{
    SlotDisplay, format_local_date, format_local_time, format_slot_for_viewer,
    parse_timezone,
  },
  slot::{Slot, filter_available, generate_slots},
  store::{BookingStore, ContactStore},
};
use tryst_ical::{Invite, Party};
use uuid::Uuid;

// ─── Configuration ───────────────────────────────────────────────────────────

/// The operator side of every invite: who the meeting is with and where it
/// happens. Loaded from configuration alongside the business-hours policy.
#[derive(Debug, Clone)]
pub struct OrganizerConfig {
  pub name:        String,
  pub email:       String,
  /// Attached to every booking and surfaced in the confirmation.
  pub meeting_url: Option<String>,
  /// Invite LOCATION override; the encoder supplies a default when unset.
  pub location:    Option<String>,
}

// ─── Requests ────────────────────────────────────────────────────────────────

/// Caller input to [`Scheduler::book`].
#[derive(Debug, Clone)]
pub struct BookRequest {
  pub name:            String,
  pub email:           String,
  pub topic:           String,
  /// The slot the caller picked from [`Scheduler::list_available_slots`].
  pub slot:            Slot,
  /// IANA zone the caller was shown times in; the confirmation renders the
  /// start in this zone so it matches what they saw.
  pub viewer_timezone: String,
}

// ─── Scheduler ───────────────────────────────────────────────────────────────

/// Stateless per request: the policy and organizer config are immutable,
/// and all mutable state lives in the stores. Share it behind an `Arc` (or
/// clone the stores) as the embedding application prefers.
pub struct Scheduler<B, C, D> {
  policy:    BusinessHoursPolicy,
  organizer: OrganizerConfig,
  bookings:  B,
  contacts:  C,
  delivery:  D,
}

impl<B, C, D> Scheduler<B, C, D>
where
  B: BookingStore,
  B::Error: Into<Error>,
  C: ContactStore,
  C::Error: Into<Error>,
  D: DeliverySink,
{
  pub fn new(
    policy: BusinessHoursPolicy,
    organizer: OrganizerConfig,
    bookings: B,
    contacts: C,
    delivery: D,
  ) -> Self {
    Self {
      policy,
      organizer,
      bookings,
      contacts,
      delivery,
    }
  }

  pub fn policy(&self) -> &BusinessHoursPolicy { &self.policy }

  /// Candidate slots for `day` minus those taken by non-cancelled
  /// bookings, ascending by start.
  ///
  /// Advisory: a slot listed here can still be lost to a concurrent
  /// booking; [`Scheduler::book`] reports that as [`Error::SlotTaken`].
  pub async fn list_available_slots(
    &self,
    day: NaiveDate,
  ) -> Result<Vec<Slot>> {
    let slots = generate_slots(day, &self.policy)?;
    let Some((first, last)) = slots.first().zip(slots.last()) else {
      return Ok(slots);
    };

    // The range query is keyed by booking start time. Any booking that
    // overlaps a slot must start before the last slot ends; the window
    // opens a day early to catch long bookings spilling past midnight
    // into the first slots.
    let booked = self
      .bookings
      .bookings_in_range(first.start_utc - Duration::days(1), last.end_utc)
      .await
      .map_err(Into::into)?;
    let ranges: Vec<_> = booked
      .iter()
      .map(|b| (b.start_time, b.end_time))
      .collect();

    Ok(filter_available(slots, &ranges))
  }

  /// Render a slot's start date and time in the viewer's zone.
  pub fn format_slot_for_viewer(
    &self,
    slot: &Slot,
    viewer_timezone: &str,
  ) -> Result<SlotDisplay> {
    let zone = parse_timezone(viewer_timezone)?;
    Ok(format_slot_for_viewer(slot, zone))
  }

  /// Book a slot: resolve-or-create the contact, persist the booking
  /// (write-time conflict authority lives in the store), and enqueue the
  /// confirmation with a freshly encoded invite.
  ///
  /// `now` stamps the invite UID and is injected so the operation stays
  /// deterministic under test. The booking is successful once persisted;
  /// a failed enqueue is logged and swallowed.
  pub async fn book(
    &self,
    request: BookRequest,
    now: DateTime<Utc>,
  ) -> Result<Booking> {
    validate(&request)?;
    let viewer = parse_timezone(&request.viewer_timezone)?;
    let email = normalize_email(&request.email);

    let contact = match self
      .contacts
      .find_by_email(&email)
      .await
      .map_err(Into::into)?
    {
      Some(existing) => existing,
      None => self
        .contacts
        .insert_contact(NewContact {
          name:   request.name.clone(),
          email:  email.clone(),
          topic:  Some(request.topic.clone()),
          status: ContactStatus::New,
          source: Some("website_booking".into()),
        })
        .await
        .map_err(Into::into)?,
    };

    let booking = self
      .bookings
      .insert_booking(NewBooking {
        contact_id:  Some(contact.contact_id),
        client_id:   contact.converted_client_id,
        name:        request.name.clone(),
        email:       email.clone(),
        topic:       request.topic.clone(),
        start_time:  request.slot.start_utc,
        end_time:    request.slot.end_utc,
        meeting_url: self.organizer.meeting_url.clone(),
      })
      .await
      .map_err(Into::into)?;

    tracing::info!(
      booking_id = %booking.booking_id,
      start = %booking.start_time,
      "booking created"
    );

    // Regenerated server-side; a client-submitted artifact is never
    // trusted.
    let invite = Invite {
      start_utc:    booking.start_time,
      end_utc:      booking.end_time,
      summary:      format!(
        "Call with {}: {}",
        self.organizer.name, booking.topic
      ),
      description:  format!("Topic: {}", booking.topic),
      location:     self.organizer.location.clone(),
      organizer:    Party {
        name:  self.organizer.name.clone(),
        email: self.organizer.email.clone(),
      },
      attendee:     Party {
        name:  booking.name.clone(),
        email: email.clone(),
      },
      generated_at: now,
    };

    let payload = ConfirmationPayload {
      booking_id:      booking.booking_id,
      recipient_name:  booking.name.clone(),
      recipient_email: email,
      topic:           booking.topic.clone(),
      local_start:     format!(
        "{} at {}",
        format_local_date(booking.start_time, viewer),
        format_local_time(booking.start_time, viewer)
      ),
      meeting_url:     booking.meeting_url.clone(),
      artifact:        tryst_ical::encode(&invite).into_bytes(),
    };

    if self.delivery.enqueue(payload).is_err() {
      tracing::warn!(
        booking_id = %booking.booking_id,
        "delivery sink closed; confirmation dropped"
      );
    }

    Ok(booking)
  }

  /// Transition a booking to cancelled. The record survives with all
  /// original fields and its slot becomes bookable again.
  pub async fn cancel(&self, id: Uuid) -> Result<Booking> {
    let booking = self.bookings.cancel_booking(id).await.map_err(Into::into)?;
    tracing::info!(booking_id = %id, "booking cancelled");
    Ok(booking)
  }

  /// Move a booking to `new_slot`. Conflict-checked at write time like a
  /// fresh insert; cancelled bookings cannot be moved.
  pub async fn reschedule(&self, id: Uuid, new_slot: Slot) -> Result<Booking> {
    if new_slot.start_utc >= new_slot.end_utc {
      return Err(Error::Validation {
        field:  "slot",
        reason: "start must be before end".into(),
      });
    }
    let booking = self
      .bookings
      .reschedule_booking(id, new_slot.start_utc, new_slot.end_utc)
      .await
      .map_err(Into::into)?;
    tracing::info!(
      booking_id = %id,
      new_start = %new_slot.start_utc,
      reschedule_count = booking.reschedule_count,
      "booking rescheduled"
    );
    Ok(booking)
  }

  /// Every booking, newest start first.
  pub async fn list_bookings(
    &self,
    include_cancelled: bool,
  ) -> Result<Vec<Booking>> {
    self
      .bookings
      .list_bookings(include_cancelled)
      .await
      .map_err(Into::into)
  }

  /// Fetch one booking by ID, cancelled or not.
  pub async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>> {
    self.bookings.get_booking(id).await.map_err(Into::into)
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

fn validate(request: &BookRequest) -> Result<()> {
  if request.name.trim().is_empty() {
    return Err(Error::Validation {
      field:  "name",
      reason: "must not be empty".into(),
    });
  }
  let email = request.email.trim();
  if email.is_empty() {
    return Err(Error::Validation {
      field:  "email",
      reason: "must not be empty".into(),
    });
  }
  if !email.contains('@') {
    return Err(Error::Validation {
      field:  "email",
      reason: format!("{email:?} is not an email address"),
    });
  }
  if request.topic.trim().is_empty() {
    return Err(Error::Validation {
      field:  "topic",
      reason: "must not be empty".into(),
    });
  }
  if request.slot.start_utc >= request.slot.end_utc {
    return Err(Error::Validation {
      field:  "slot",
      reason: "start must be before end".into(),
    });
  }
  Ok(())
}
