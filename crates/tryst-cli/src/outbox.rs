//! Outbox delivery worker.
//!
//! Drains the confirmation channel and writes each payload into a
//! directory: `<booking_id>.json` with the payload and `<booking_id>.ics`
//! with the invite. A mail integration tails this directory with its own
//! retry policy; a write failure here is logged and never touches the
//! booking that produced the payload.

use std::path::{Path, PathBuf};

use tokio::sync::mpsc::UnboundedReceiver;
use tryst_core::delivery::ConfirmationPayload;

/// Run until the sending half of the channel closes.
pub async fn run(
  dir: PathBuf,
  mut rx: UnboundedReceiver<ConfirmationPayload>,
) {
  while let Some(payload) = rx.recv().await {
    match write_confirmation(&dir, &payload) {
      Ok(()) => tracing::info!(
        booking_id = %payload.booking_id,
        recipient = %payload.recipient_email,
        "confirmation written to outbox"
      ),
      Err(e) => tracing::warn!(
        booking_id = %payload.booking_id,
        error = %e,
        "failed to write confirmation"
      ),
    }
  }
}

fn write_confirmation(
  dir: &Path,
  payload: &ConfirmationPayload,
) -> std::io::Result<()> {
  std::fs::create_dir_all(dir)?;
  std::fs::write(
    dir.join(format!("{}.ics", payload.booking_id)),
    &payload.artifact,
  )?;
  std::fs::write(
    dir.join(format!("{}.json", payload.booking_id)),
    serde_json::to_vec_pretty(payload)?,
  )?;
  Ok(())
}
