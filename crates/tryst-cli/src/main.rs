//! `tryst` — operator CLI for the booking engine.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the
//! SQLite store, and runs one scheduling command. Confirmations are
//! enqueued to an outbox-directory worker, never awaited by the booking
//! path.
//!
//! # Usage
//!
//! ```
//! tryst slots --day 2026-09-01 --viewer-timezone Asia/Tokyo
//! tryst book --start 2026-09-01T07:00:00Z \
//!   --name Alice --email alice@example.com --topic "Project kickoff"
//! tryst cancel <booking-id>
//! tryst reschedule <booking-id> --start 2026-09-02T08:00:00Z
//! tryst list --all
//! ```

mod config;
mod outbox;

use std::path::PathBuf;

use anyhow::Context as _;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tryst_core::{booking::Booking, delivery, slot::Slot};
use tryst_engine::{BookRequest, Scheduler};
use tryst_store_sqlite::SqliteStore;
use uuid::Uuid;

use crate::config::AppConfig;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Tryst booking engine")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// List available slots for a calendar day.
  Slots {
    /// Day in the reference timezone, e.g. 2026-09-01.
    #[arg(long)]
    day:             NaiveDate,
    /// IANA zone to render the slots in (default: the reference zone).
    #[arg(long)]
    viewer_timezone: Option<String>,
  },

  /// Book a slot.
  Book {
    /// Slot start as RFC 3339 UTC, e.g. 2026-09-01T07:00:00Z.
    #[arg(long)]
    start:           DateTime<Utc>,
    #[arg(long)]
    name:            String,
    #[arg(long)]
    email:           String,
    #[arg(long)]
    topic:           String,
    /// IANA zone the confirmation renders the start time in.
    #[arg(long)]
    viewer_timezone: Option<String>,
  },

  /// Cancel a booking. The record is kept; the slot frees up.
  Cancel { id: Uuid },

  /// Move a booking to a new slot.
  Reschedule {
    id:    Uuid,
    /// New slot start as RFC 3339 UTC.
    #[arg(long)]
    start: DateTime<Utc>,
  },

  /// List bookings, newest start first.
  List {
    /// Include cancelled bookings.
    #[arg(long)]
    all: bool,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = AppConfig::load(&cli.config)?;
  let policy = cfg.policy().context("invalid business-hours config")?;

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;

  let (sink, rx) = delivery::channel();
  let worker = tokio::spawn(outbox::run(cfg.outbox_path.clone(), rx));

  let reference_zone = cfg.hours.reference_timezone.clone();
  let scheduler =
    Scheduler::new(policy, cfg.organizer(), store.clone(), store, sink);

  match cli.command {
    Command::Slots {
      day,
      viewer_timezone,
    } => {
      let viewer = viewer_timezone.unwrap_or(reference_zone);
      let slots = scheduler.list_available_slots(day).await?;
      if slots.is_empty() {
        println!("no available slots on {day}");
      }
      for slot in &slots {
        let display = scheduler.format_slot_for_viewer(slot, &viewer)?;
        println!(
          "{}  {} {:>8}  ({viewer})",
          slot.start_utc.to_rfc3339(),
          display.local_date,
          display.local_time,
        );
      }
    }

    Command::Book {
      start,
      name,
      email,
      topic,
      viewer_timezone,
    } => {
      let slot = Slot {
        start_utc: start,
        end_utc:   start + scheduler.policy().slot_duration(),
      };
      let booking = scheduler
        .book(
          BookRequest {
            name,
            email,
            topic,
            slot,
            viewer_timezone: viewer_timezone.unwrap_or(reference_zone),
          },
          Utc::now(),
        )
        .await?;
      println!("booked {}", booking.booking_id);
      print_booking(&booking);
    }

    Command::Cancel { id } => {
      let booking = scheduler.cancel(id).await?;
      println!("cancelled {}", booking.booking_id);
    }

    Command::Reschedule { id, start } => {
      let slot = Slot {
        start_utc: start,
        end_utc:   start + scheduler.policy().slot_duration(),
      };
      let booking = scheduler.reschedule(id, slot).await?;
      println!(
        "rescheduled {} (move #{})",
        booking.booking_id, booking.reschedule_count
      );
      print_booking(&booking);
    }

    Command::List { all } => {
      for booking in scheduler.list_bookings(all).await? {
        println!(
          "{}  {}  {:<11}  {} <{}>  {}",
          booking.booking_id,
          booking.start_time.to_rfc3339(),
          booking.status,
          booking.name,
          booking.email,
          booking.topic,
        );
      }
    }
  }

  // Closing the scheduler's sink ends the worker once the outbox drains.
  drop(scheduler);
  worker.await.context("outbox worker panicked")?;

  Ok(())
}

fn print_booking(booking: &Booking) {
  println!(
    "  {} .. {} UTC  [{}]  {} <{}>",
    booking.start_time.to_rfc3339(),
    booking.end_time.to_rfc3339(),
    booking.status,
    booking.name,
    booking.email,
  );
}
