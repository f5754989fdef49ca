//! iCalendar event encoder.
//!
//! # Responsibility
//! - Build the fixed `VCALENDAR`/`VEVENT` envelope for one appointment.
//! - Escape free-text fields and convert instants to UTC.
//!
//! # Invariants
//! - Every call to `encode` generates a fresh random UID.
//! - `LOCATION` and `DESCRIPTION` lines are omitted when blank.
//! - No bare LF appears in the output.

use crate::config::DEFAULT_PRODUCT_ID;
use crate::extract::datetime::DateTimeExtractor;
use crate::model::appointment::ParsedAppointment;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use log::info;
use std::path::Path;
use uuid::Uuid;

const LINE_ENDING: &str = "\r\n";
const ICS_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const FALLBACK_START_HOUR: u32 = 9;

/// Fields of one event before serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub summary: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl EventDraft {
    /// Builds a draft from an appointment.
    ///
    /// An appointment without a schedule is placed at reference + 1 day,
    /// `default_start_hour`:00, for one hour.
    pub fn from_appointment(
        appointment: &ParsedAppointment,
        reference: DateTime<FixedOffset>,
        default_start_hour: u32,
    ) -> Self {
        let schedule = appointment.schedule.unwrap_or_else(|| {
            DateTimeExtractor::with_default_start_hour(default_start_hour)
                .fallback_schedule(reference)
        });
        Self {
            summary: appointment.summary.clone(),
            start: schedule.start(),
            end: schedule.end(),
            location: appointment.location.clone(),
            description: Some(appointment.description.clone()),
        }
    }
}

/// One serialized event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub uid: Uuid,
    lines: Vec<String>,
}

impl CalendarEvent {
    /// Encodes `appointment` with the default product id and start hour.
    pub fn from_appointment(
        appointment: &ParsedAppointment,
        reference: DateTime<FixedOffset>,
    ) -> Self {
        IcsEncoder::default().encode(&EventDraft::from_appointment(
            appointment,
            reference,
            FALLBACK_START_HOUR,
        ))
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Full `.ics` text, CRLF-terminated.
    pub fn to_ics_string(&self) -> String {
        let mut out = self.lines.join(LINE_ENDING);
        out.push_str(LINE_ENDING);
        out
    }
}

/// Encoder carrying the `PRODID` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcsEncoder {
    product_id: String,
}

impl Default for IcsEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_PRODUCT_ID)
    }
}

impl IcsEncoder {
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
        }
    }

    /// Encodes with a random UID and the current time as `DTSTAMP`.
    pub fn encode(&self, draft: &EventDraft) -> CalendarEvent {
        self.encode_at(draft, Uuid::new_v4(), Utc::now())
    }

    /// Deterministic variant of [`IcsEncoder::encode`].
    pub fn encode_at(&self, draft: &EventDraft, uid: Uuid, stamp: DateTime<Utc>) -> CalendarEvent {
        let mut lines = vec![
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            format!("PRODID:{}", self.product_id),
            "CALSCALE:GREGORIAN".to_string(),
            "METHOD:PUBLISH".to_string(),
            "BEGIN:VEVENT".to_string(),
            format!("UID:{uid}"),
            format!("DTSTAMP:{}", format_utc(stamp)),
            format!("DTSTART:{}", format_utc(draft.start.with_timezone(&Utc))),
            format!("DTEND:{}", format_utc(draft.end.with_timezone(&Utc))),
            format!("SUMMARY:{}", escape_text(&draft.summary)),
        ];
        if let Some(location) = non_blank(draft.location.as_deref()) {
            lines.push(format!("LOCATION:{}", escape_text(location)));
        }
        if let Some(description) = non_blank(draft.description.as_deref()) {
            lines.push(format!("DESCRIPTION:{}", escape_text(description)));
        }
        lines.push("END:VEVENT".to_string());
        lines.push("END:VCALENDAR".to_string());

        CalendarEvent { uid, lines }
    }
}

/// One-call encoder with the default product id.
pub fn build_event(
    summary: &str,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    location: Option<&str>,
    description: Option<&str>,
) -> String {
    IcsEncoder::default()
        .encode(&EventDraft {
            summary: summary.to_string(),
            start,
            end,
            location: location.map(str::to_string),
            description: description.map(str::to_string),
        })
        .to_ics_string()
}

/// Escapes backslash, `;`, `,` and line breaks for iCalendar text values.
pub fn escape_text(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace("\r\n", "\\n")
        .replace(['\r', '\n'], "\\n")
}

/// Parses a `YYYYMMDDTHHMMSSZ` value.
pub fn parse_ics_timestamp(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), ICS_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Writes `event` to `path`.
///
/// # Errors
/// - Any I/O failure from the filesystem.
pub fn write_ics_file(path: impl AsRef<Path>, event: &CalendarEvent) -> std::io::Result<()> {
    let body = event.to_ics_string();
    std::fs::write(path.as_ref(), body.as_bytes())?;
    info!(
        "event=ics_write module=calendar status=ok bytes={}",
        body.len()
    );
    Ok(())
}

fn format_utc(value: DateTime<Utc>) -> String {
    value.format(ICS_TIMESTAMP_FORMAT).to_string()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}
