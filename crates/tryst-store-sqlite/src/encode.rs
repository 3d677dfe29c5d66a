//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 UTC strings truncated to whole
//! seconds with a `Z` suffix, so lexicographic order equals chronological
//! order and string range queries are sound. Statuses are stored as their
//! lowercase `strum` text. UUIDs are stored as hyphenated lowercase
//! strings.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use tryst_core::{
  booking::{Booking, BookingStatus},
  contact::{Contact, ContactStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Statuses ────────────────────────────────────────────────────────────────

pub fn decode_booking_status(s: &str) -> Result<BookingStatus> {
  BookingStatus::from_str(s).map_err(|_| Error::UnknownStatus(s.to_string()))
}

pub fn decode_contact_status(s: &str) -> Result<ContactStatus> {
  ContactStatus::from_str(s).map_err(|_| Error::UnknownStatus(s.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `bookings` row.
pub struct RawBooking {
  pub booking_id:        String,
  pub contact_id:        Option<String>,
  pub client_id:         Option<String>,
  pub name:              String,
  pub email:             String,
  pub topic:             String,
  pub start_time:        String,
  pub end_time:          String,
  pub status:            String,
  pub reschedule_count:  i64,
  pub meeting_url:       Option<String>,
  pub calendar_event_id: Option<String>,
  pub created_at:        String,
  pub deleted_at:        Option<String>,
}

impl RawBooking {
  /// Column list matching the field order of [`RawBooking::from_row`].
  pub const COLUMNS: &'static str = "booking_id, contact_id, client_id, \
     name, email, topic, start_time, end_time, status, reschedule_count, \
     meeting_url, calendar_event_id, created_at, deleted_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      booking_id:        row.get(0)?,
      contact_id:        row.get(1)?,
      client_id:         row.get(2)?,
      name:              row.get(3)?,
      email:             row.get(4)?,
      topic:             row.get(5)?,
      start_time:        row.get(6)?,
      end_time:          row.get(7)?,
      status:            row.get(8)?,
      reschedule_count:  row.get(9)?,
      meeting_url:       row.get(10)?,
      calendar_event_id: row.get(11)?,
      created_at:        row.get(12)?,
      deleted_at:        row.get(13)?,
    })
  }

  pub fn into_booking(self) -> Result<Booking> {
    Ok(Booking {
      booking_id:        decode_uuid(&self.booking_id)?,
      contact_id:        self.contact_id.as_deref().map(decode_uuid).transpose()?,
      client_id:         self.client_id.as_deref().map(decode_uuid).transpose()?,
      name:              self.name,
      email:             self.email,
      topic:             self.topic,
      start_time:        decode_dt(&self.start_time)?,
      end_time:          decode_dt(&self.end_time)?,
      status:            decode_booking_status(&self.status)?,
      reschedule_count:  u32::try_from(self.reschedule_count)
        .map_err(|_| Error::InvalidRescheduleCount(self.reschedule_count))?,
      meeting_url:       self.meeting_url,
      calendar_event_id: self.calendar_event_id,
      created_at:        decode_dt(&self.created_at)?,
      deleted_at:        self.deleted_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw strings read directly from a `contacts` row.
pub struct RawContact {
  pub contact_id:          String,
  pub name:                String,
  pub email:               String,
  pub topic:               Option<String>,
  pub status:              String,
  pub source:              Option<String>,
  pub last_contacted_at:   Option<String>,
  pub converted_client_id: Option<String>,
  pub created_at:          String,
  pub deleted_at:          Option<String>,
}

impl RawContact {
  /// Column list matching the field order of [`RawContact::from_row`].
  pub const COLUMNS: &'static str = "contact_id, name, email, topic, \
     status, source, last_contacted_at, converted_client_id, created_at, \
     deleted_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      contact_id:          row.get(0)?,
      name:                row.get(1)?,
      email:               row.get(2)?,
      topic:               row.get(3)?,
      status:              row.get(4)?,
      source:              row.get(5)?,
      last_contacted_at:   row.get(6)?,
      converted_client_id: row.get(7)?,
      created_at:          row.get(8)?,
      deleted_at:          row.get(9)?,
    })
  }

  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      contact_id:          decode_uuid(&self.contact_id)?,
      name:                self.name,
      email:               self.email,
      topic:               self.topic,
      status:              decode_contact_status(&self.status)?,
      source:              self.source,
      last_contacted_at:   self
        .last_contacted_at
        .as_deref()
        .map(decode_dt)
        .transpose()?,
      converted_client_id: self
        .converted_client_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      created_at:          decode_dt(&self.created_at)?,
      deleted_at:          self.deleted_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}
