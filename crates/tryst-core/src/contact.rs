//! Contact — the party a booking is made with.
//!
//! Contacts are found-or-created by exact normalized-email match at
//! booking time. The store enforces email uniqueness, so two bookings
//! from the same address always share one contact record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Pipeline stage of a contact.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ContactStatus {
  #[default]
  New,
  Contacted,
  Qualified,
  Converted,
  Archived,
}

/// A persisted contact record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
  pub contact_id:          Uuid,
  pub name:                String,
  /// Normalized (trimmed, lowercased); unique across the store.
  pub email:               String,
  pub topic:               Option<String>,
  pub status:              ContactStatus,
  /// Where the contact entered the pipeline, e.g. "website_booking".
  pub source:              Option<String>,
  pub last_contacted_at:   Option<DateTime<Utc>>,
  /// Set once the contact converts to a client.
  pub converted_client_id: Option<Uuid>,
  pub created_at:          DateTime<Utc>,
  pub deleted_at:          Option<DateTime<Utc>>,
}

/// Input to [`crate::store::ContactStore::insert_contact`].
/// `contact_id` and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewContact {
  pub name:   String,
  pub email:  String,
  pub topic:  Option<String>,
  pub status: ContactStatus,
  pub source: Option<String>,
}

/// Canonical form used for contact lookup and storage: trimmed and
/// ASCII-lowercased. Dedup would silently break if two spellings of one
/// address landed in separate rows.
pub fn normalize_email(email: &str) -> String {
  email.trim().to_ascii_lowercase()
}
