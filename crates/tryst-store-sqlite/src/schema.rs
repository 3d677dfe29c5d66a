//! SQL schema for the Tryst SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated
//! on `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS contacts (
    contact_id          TEXT PRIMARY KEY,
    name                TEXT NOT NULL,
    email               TEXT NOT NULL UNIQUE,  -- normalized: trimmed, lowercased
    topic               TEXT,
    status              TEXT NOT NULL DEFAULT 'new',
    source              TEXT,
    last_contacted_at   TEXT,
    converted_client_id TEXT,
    created_at          TEXT NOT NULL,         -- RFC 3339 UTC; server-assigned
    deleted_at          TEXT                   -- soft delete
);

-- Bookings are never physically deleted; cancellation is a status
-- transition and deleted_at is a soft-delete marker.
CREATE TABLE IF NOT EXISTS bookings (
    booking_id        TEXT PRIMARY KEY,
    contact_id        TEXT REFERENCES contacts(contact_id),
    client_id         TEXT,
    name              TEXT NOT NULL,
    email             TEXT NOT NULL,
    topic             TEXT NOT NULL,
    start_time        TEXT NOT NULL,  -- RFC 3339 UTC
    end_time          TEXT NOT NULL,  -- RFC 3339 UTC
    status            TEXT NOT NULL,  -- 'confirmed' | 'rescheduled' | 'cancelled' | 'completed'
    reschedule_count  INTEGER NOT NULL DEFAULT 0,
    meeting_url       TEXT,
    calendar_event_id TEXT,
    created_at        TEXT NOT NULL,
    deleted_at        TEXT,
    CHECK (start_time < end_time)
);

CREATE INDEX IF NOT EXISTS bookings_start_idx   ON bookings(start_time);
CREATE INDEX IF NOT EXISTS bookings_email_idx   ON bookings(email);
CREATE INDEX IF NOT EXISTS bookings_created_idx ON bookings(created_at);

PRAGMA user_version = 1;
";
