//! [`SqliteStore`] — the SQLite implementation of the booking and contact
//! stores.

use std::path::Path;

use chrono::{DateTime, SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use tryst_core::{
  booking::{Booking, BookingStatus, NewBooking},
  contact::{Contact, NewContact, normalize_email},
  store::{BookingStore, ContactStore},
};

use crate::{
  Error, Result,
  encode::{RawBooking, RawContact, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tryst store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls
/// run on one dedicated connection thread, which is what serializes the
/// conflict check against the insert it guards.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Result of a guarded write against the bookings table, carried out of
/// the connection closure so domain errors stay distinct from database
/// errors.
enum WriteOutcome {
  Done(RawBooking),
  NotFound,
  AlreadyCancelled,
  Conflict,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn fetch_booking_raw(&self, id: Uuid) -> Result<Option<RawBooking>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM bookings WHERE booking_id = ?1",
          RawBooking::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawBooking::from_row)
            .optional()?,
        )
      })
      .await?;
    Ok(raw)
  }
}

// ─── BookingStore impl ───────────────────────────────────────────────────────

impl BookingStore for SqliteStore {
  type Error = Error;

  async fn insert_booking(&self, input: NewBooking) -> Result<Booking> {
    let booking = Booking {
      booking_id:        Uuid::new_v4(),
      contact_id:        input.contact_id,
      client_id:         input.client_id,
      name:              input.name,
      email:             input.email,
      topic:             input.topic,
      start_time:        input.start_time,
      end_time:          input.end_time,
      status:            BookingStatus::Confirmed,
      reschedule_count:  0,
      meeting_url:       input.meeting_url,
      calendar_event_id: None,
      // Whole seconds, matching the column encoding, so the returned
      // value equals what a later read decodes.
      created_at:        Utc::now().trunc_subsecs(0),
      deleted_at:        None,
    };

    let id_str         = encode_uuid(booking.booking_id);
    let contact_id_str = booking.contact_id.map(encode_uuid);
    let client_id_str  = booking.client_id.map(encode_uuid);
    let name           = booking.name.clone();
    let email          = booking.email.clone();
    let topic          = booking.topic.clone();
    let start_str      = encode_dt(booking.start_time);
    let end_str        = encode_dt(booking.end_time);
    let status_str     = booking.status.to_string();
    let meeting_url    = booking.meeting_url.clone();
    let created_str    = encode_dt(booking.created_at);

    // Check and insert inside one transaction on the single connection
    // thread: the write-time authority for the no-overlap invariant.
    let inserted: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let clash: Option<String> = tx
          .query_row(
            "SELECT booking_id FROM bookings
             WHERE status != 'cancelled'
               AND start_time < ?1 AND end_time > ?2
             LIMIT 1",
            rusqlite::params![end_str, start_str],
            |r| r.get(0),
          )
          .optional()?;

        if clash.is_some() {
          return Ok(false);
        }

        tx.execute(
          "INSERT INTO bookings (
             booking_id, contact_id, client_id, name, email, topic,
             start_time, end_time, status, reschedule_count,
             meeting_url, calendar_event_id, created_at, deleted_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, ?10, NULL, ?11, NULL)",
          rusqlite::params![
            id_str,
            contact_id_str,
            client_id_str,
            name,
            email,
            topic,
            start_str,
            end_str,
            status_str,
            meeting_url,
            created_str,
          ],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::Conflict(booking.start_time));
    }
    Ok(booking)
  }

  async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>> {
    self
      .fetch_booking_raw(id)
      .await?
      .map(RawBooking::into_booking)
      .transpose()
  }

  async fn bookings_in_range(
    &self,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
  ) -> Result<Vec<Booking>> {
    let start_str = encode_dt(start);
    let end_str = encode_dt(end);

    let raws: Vec<RawBooking> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM bookings
           WHERE start_time >= ?1 AND start_time < ?2
             AND status != 'cancelled'
           ORDER BY start_time ASC",
          RawBooking::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![start_str, end_str], RawBooking::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBooking::into_booking).collect()
  }

  async fn list_bookings(&self, include_cancelled: bool) -> Result<Vec<Booking>> {
    let raws: Vec<RawBooking> = self
      .conn
      .call(move |conn| {
        let filter = if include_cancelled {
          ""
        } else {
          "WHERE status != 'cancelled'"
        };
        let sql = format!(
          "SELECT {} FROM bookings {filter} ORDER BY start_time DESC",
          RawBooking::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawBooking::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBooking::into_booking).collect()
  }

  async fn cancel_booking(&self, id: Uuid) -> Result<Booking> {
    let id_str = encode_uuid(id);

    let outcome: WriteOutcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let status: Option<String> = tx
          .query_row(
            "SELECT status FROM bookings WHERE booking_id = ?1",
            rusqlite::params![id_str],
            |r| r.get(0),
          )
          .optional()?;

        let status = match status {
          None => return Ok(WriteOutcome::NotFound),
          Some(s) => s,
        };
        if status == "cancelled" {
          return Ok(WriteOutcome::AlreadyCancelled);
        }

        tx.execute(
          "UPDATE bookings SET status = 'cancelled' WHERE booking_id = ?1",
          rusqlite::params![id_str],
        )?;

        let sql = format!(
          "SELECT {} FROM bookings WHERE booking_id = ?1",
          RawBooking::COLUMNS
        );
        let raw =
          tx.query_row(&sql, rusqlite::params![id_str], RawBooking::from_row)?;
        tx.commit()?;
        Ok(WriteOutcome::Done(raw))
      })
      .await?;

    match outcome {
      WriteOutcome::Done(raw) => raw.into_booking(),
      WriteOutcome::NotFound => Err(Error::BookingNotFound(id)),
      WriteOutcome::AlreadyCancelled => Err(Error::AlreadyCancelled(id)),
      WriteOutcome::Conflict => unreachable!("cancel performs no range check"),
    }
  }

  async fn reschedule_booking(
    &self,
    id: Uuid,
    new_start: DateTime<Utc>,
    new_end: DateTime<Utc>,
  ) -> Result<Booking> {
    let id_str = encode_uuid(id);
    let start_str = encode_dt(new_start);
    let end_str = encode_dt(new_end);

    let outcome: WriteOutcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let status: Option<String> = tx
          .query_row(
            "SELECT status FROM bookings WHERE booking_id = ?1",
            rusqlite::params![id_str],
            |r| r.get(0),
          )
          .optional()?;

        let status = match status {
          None => return Ok(WriteOutcome::NotFound),
          Some(s) => s,
        };
        if status == "cancelled" {
          return Ok(WriteOutcome::AlreadyCancelled);
        }

        // The booking's own current range must not block its move.
        let clash: Option<String> = tx
          .query_row(
            "SELECT booking_id FROM bookings
             WHERE status != 'cancelled'
               AND booking_id != ?1
               AND start_time < ?2 AND end_time > ?3
             LIMIT 1",
            rusqlite::params![id_str, end_str, start_str],
            |r| r.get(0),
          )
          .optional()?;

        if clash.is_some() {
          return Ok(WriteOutcome::Conflict);
        }

        tx.execute(
          "UPDATE bookings
           SET start_time = ?2, end_time = ?3,
               status = 'rescheduled',
               reschedule_count = reschedule_count + 1
           WHERE booking_id = ?1",
          rusqlite::params![id_str, start_str, end_str],
        )?;

        let sql = format!(
          "SELECT {} FROM bookings WHERE booking_id = ?1",
          RawBooking::COLUMNS
        );
        let raw =
          tx.query_row(&sql, rusqlite::params![id_str], RawBooking::from_row)?;
        tx.commit()?;
        Ok(WriteOutcome::Done(raw))
      })
      .await?;

    match outcome {
      WriteOutcome::Done(raw) => raw.into_booking(),
      WriteOutcome::NotFound => Err(Error::BookingNotFound(id)),
      WriteOutcome::AlreadyCancelled => Err(Error::AlreadyCancelled(id)),
      WriteOutcome::Conflict => Err(Error::Conflict(new_start)),
    }
  }
}

// ─── ContactStore impl ───────────────────────────────────────────────────────

impl ContactStore for SqliteStore {
  type Error = Error;

  async fn find_by_email(&self, email: &str) -> Result<Option<Contact>> {
    let email = normalize_email(email);

    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM contacts WHERE email = ?1",
          RawContact::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![email], RawContact::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawContact::into_contact).transpose()
  }

  async fn insert_contact(&self, input: NewContact) -> Result<Contact> {
    let contact_id = Uuid::new_v4();
    let created_at = Utc::now();

    let id_str      = encode_uuid(contact_id);
    let name        = input.name;
    let email       = normalize_email(&input.email);
    let email_key   = email.clone();
    let topic       = input.topic;
    let status_str  = input.status.to_string();
    let source      = input.source;
    let created_str = encode_dt(created_at);

    // ON CONFLICT keeps the insert idempotent per email; the follow-up
    // select returns whichever row actually owns the address.
    let raw: RawContact = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO contacts (
             contact_id, name, email, topic, status, source,
             last_contacted_at, converted_client_id, created_at, deleted_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, NULL, ?7, NULL)
           ON CONFLICT(email) DO NOTHING",
          rusqlite::params![
            id_str,
            name,
            email,
            topic,
            status_str,
            source,
            created_str,
          ],
        )?;

        let sql = format!(
          "SELECT {} FROM contacts WHERE email = ?1",
          RawContact::COLUMNS
        );
        let raw = tx.query_row(
          &sql,
          rusqlite::params![email_key],
          RawContact::from_row,
        )?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_contact()
  }
}
