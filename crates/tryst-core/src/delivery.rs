//! Confirmation delivery — the fire-and-forget side of a booking.
//!
//! A booking is successful once persisted; confirmation delivery is
//! dispatched to a sink and never awaited, so user-facing latency is
//! independent of the email provider. Retries and idempotent resend
//! suppression belong to the consuming collaborator.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Everything a delivery worker needs to send one confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationPayload {
  pub booking_id:      Uuid,
  pub recipient_name:  String,
  pub recipient_email: String,
  pub topic:           String,
  /// The start time rendered in the viewer's zone, matching what they saw
  /// when they picked the slot.
  pub local_start:     String,
  pub meeting_url:     Option<String>,
  /// Encoded iCalendar invite, attached as `meeting.ics`.
  #[serde(with = "base64_bytes", default)]
  pub artifact:        Vec<u8>,
}

// Base64 for the attachment bytes; JSON arrays of numbers triple the
// payload size.
mod base64_bytes {
  use base64::{Engine as _, engine::general_purpose::STANDARD};
  use serde::{Deserialize, Deserializer, Serializer, de::Error};

  pub fn serialize<S: Serializer>(
    bytes: &[u8],
    ser: S,
  ) -> Result<S::Ok, S::Error> {
    ser.serialize_str(&STANDARD.encode(bytes))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    de: D,
  ) -> Result<Vec<u8>, D::Error> {
    let s = String::deserialize(de)?;
    STANDARD.decode(s).map_err(D::Error::custom)
  }
}

// ─── Sink trait ──────────────────────────────────────────────────────────────

/// Where confirmation payloads go. Enqueueing must not block and must not
/// fail the booking that produced the payload.
pub trait DeliverySink: Send + Sync {
  /// Hand a payload to the delivery worker. An error here means the
  /// payload was dropped, not that the booking failed.
  fn enqueue(&self, payload: ConfirmationPayload) -> Result<(), SinkClosed>;
}

/// The delivery worker has gone away; the payload was not queued.
#[derive(Debug, thiserror::Error)]
#[error("delivery sink closed")]
pub struct SinkClosed;

// ─── Channel implementation ──────────────────────────────────────────────────

/// A [`DeliverySink`] backed by an unbounded tokio channel. The receiving
/// half is consumed by whatever worker the embedding application spawns.
#[derive(Clone)]
pub struct ChannelDelivery {
  tx: mpsc::UnboundedSender<ConfirmationPayload>,
}

/// Create a delivery channel: the sink for the scheduler, the receiver
/// for the worker.
pub fn channel() -> (ChannelDelivery, mpsc::UnboundedReceiver<ConfirmationPayload>)
{
  let (tx, rx) = mpsc::unbounded_channel();
  (ChannelDelivery { tx }, rx)
}

impl DeliverySink for ChannelDelivery {
  fn enqueue(&self, payload: ConfirmationPayload) -> Result<(), SinkClosed> {
    self.tx.send(payload).map_err(|_| SinkClosed)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn payload() -> ConfirmationPayload {
    ConfirmationPayload {
      booking_id:      Uuid::new_v4(),
      recipient_name:  "Alice".into(),
      recipient_email: "alice@example.com".into(),
      topic:           "Project".into(),
      local_start:     "Mon, Oct 5 at 10:00 AM".into(),
      meeting_url:     None,
      artifact:        b"BEGIN:VCALENDAR".to_vec(),
    }
  }

  #[tokio::test]
  async fn enqueued_payload_reaches_the_worker() {
    let (sink, mut rx) = channel();
    sink.enqueue(payload()).unwrap();
    let received = rx.recv().await.unwrap();
    assert_eq!(received.recipient_email, "alice@example.com");
    assert_eq!(received.artifact, b"BEGIN:VCALENDAR");
  }

  #[tokio::test]
  async fn enqueue_after_worker_exit_reports_closed() {
    let (sink, rx) = channel();
    drop(rx);
    assert!(sink.enqueue(payload()).is_err());
  }

  #[test]
  fn artifact_survives_json_round_trip() {
    let p = payload();
    let json = serde_json::to_string(&p).unwrap();
    assert!(!json.contains("[66,"), "artifact should not be a byte array");
    let back: ConfirmationPayload = serde_json::from_str(&json).unwrap();
    assert_eq!(back.artifact, p.artifact);
  }
}
