//! VCALENDAR serializer.
//!
//! Line order is significant for some consumer clients and is preserved
//! exactly: version/product-id/calendar-scale/method header, one event
//! block, footer. CRLF line endings, folded at 75 octets per RFC 5545
//! §3.1.

use chrono::{DateTime, Utc};

use crate::Invite;

const PRODID: &str = "-//Tryst//Tryst Scheduler//EN";
const DEFAULT_LOCATION: &str = "Google Meet";

// ─── RFC 5545 line folding ───────────────────────────────────────────────────

/// Emit `s` as one logical line, folding at 75 octets with CRLF + SP
/// continuation.
fn fold_line(s: &str) -> String {
  if s.len() <= 75 {
    return format!("{}\r\n", s);
  }

  let mut result = String::new();
  let total = s.len();
  let mut pos = 0usize;
  let mut first = true;

  while pos < total {
    let limit = if first { 75 } else { 74 };
    let end = if pos + limit >= total {
      total
    } else {
      // Walk back to the nearest valid UTF-8 char boundary
      let mut e = pos + limit;
      while e > pos && !s.is_char_boundary(e) {
        e -= 1;
      }
      // Guarantee at least one byte per segment
      if e == pos { pos + 1 } else { e }
    };

    if !first {
      result.push(' ');
    }
    result.push_str(&s[pos..end]);
    result.push_str("\r\n");
    pos = end;
    first = false;
  }

  result
}

// ─── Value escaping ──────────────────────────────────────────────────────────

/// Escape a TEXT property value: `\`, `,`, `;`, `\n`.
fn escape_value(s: &str) -> String {
  s.replace('\\', "\\\\")
    .replace(',', "\\,")
    .replace(';', "\\;")
    .replace('\n', "\\n")
}

/// Render a parameter value such as `CN=`. TEXT escaping does not apply
/// in parameter position; values containing `:`, `;` or `,` must be
/// quoted instead (RFC 5545 §3.2). DQUOTE cannot occur in a quoted value
/// and is dropped.
fn param_value(s: &str) -> String {
  let cleaned = s.replace('"', "");
  if cleaned.contains([':', ';', ',']) {
    format!("\"{cleaned}\"")
  } else {
    cleaned
  }
}

/// Compact UTC basic format: `YYYYMMDDTHHMMSSZ`.
fn format_utc(dt: DateTime<Utc>) -> String {
  dt.format("%Y%m%dT%H%M%SZ").to_string()
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Serialize `invite` as an iCalendar document.
pub fn encode(invite: &Invite) -> String {
  let dtstamp = format_utc(invite.generated_at);
  let start = format_utc(invite.start_utc);
  let end = format_utc(invite.end_utc);
  let location = invite.location.as_deref().unwrap_or(DEFAULT_LOCATION);

  let lines = [
    "BEGIN:VCALENDAR".to_string(),
    "VERSION:2.0".to_string(),
    format!("PRODID:{PRODID}"),
    "CALSCALE:GREGORIAN".to_string(),
    "METHOD:REQUEST".to_string(),
    "BEGIN:VEVENT".to_string(),
    format!("UID:{dtstamp}-{}", invite.attendee.email),
    format!("DTSTAMP:{dtstamp}"),
    format!("DTSTART:{start}"),
    format!("DTEND:{end}"),
    format!("SUMMARY:{}", escape_value(&invite.summary)),
    format!("DESCRIPTION:{}", escape_value(&invite.description)),
    format!("LOCATION:{}", escape_value(location)),
    format!(
      "ORGANIZER;CN={}:mailto:{}",
      param_value(&invite.organizer.name),
      invite.organizer.email
    ),
    format!(
      "ATTENDEE;RSVP=TRUE;CN={};PARTSTAT=NEEDS-ACTION;ROLE=REQ-PARTICIPANT:mailto:{}",
      param_value(&invite.attendee.name),
      invite.attendee.email
    ),
    "STATUS:CONFIRMED".to_string(),
    "END:VEVENT".to_string(),
    "END:VCALENDAR".to_string(),
  ];

  lines.iter().map(|l| fold_line(l)).collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
