//! Configuration for the `tryst` binary.
//!
//! Layered from a TOML file and `TRYST_`-prefixed environment variables;
//! the environment wins. The business-hours section is validated once into
//! an immutable [`BusinessHoursPolicy`] at startup.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use tryst_core::policy::BusinessHoursPolicy;
use tryst_engine::OrganizerConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// SQLite file holding bookings and contacts.
  pub store_path:      PathBuf,
  /// Directory the delivery worker writes confirmations into.
  pub outbox_path:     PathBuf,
  pub organizer_name:  String,
  pub organizer_email: String,
  pub meeting_url:     Option<String>,
  pub location:        Option<String>,
  pub hours:           HoursConfig,
}

/// Raw business-hours section, pre-validation.
#[derive(Debug, Clone, Deserialize)]
pub struct HoursConfig {
  pub reference_timezone:    String,
  pub start_hour:            u32,
  pub end_hour:              u32,
  pub slot_duration_minutes: u32,
  pub buffer_minutes:        u32,
}

impl AppConfig {
  /// Layer the file (optional) under the environment and deserialise.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("TRYST").separator("__"))
      .build()
      .context("failed to read config")?;

    settings
      .try_deserialize()
      .context("failed to deserialise AppConfig")
  }

  pub fn policy(&self) -> tryst_core::Result<BusinessHoursPolicy> {
    BusinessHoursPolicy::new(
      &self.hours.reference_timezone,
      self.hours.start_hour,
      self.hours.end_hour,
      self.hours.slot_duration_minutes,
      self.hours.buffer_minutes,
    )
  }

  pub fn organizer(&self) -> OrganizerConfig {
    OrganizerConfig {
      name:        self.organizer_name.clone(),
      email:       self.organizer_email.clone(),
      meeting_url: self.meeting_url.clone(),
      location:    self.location.clone(),
    }
  }
}
