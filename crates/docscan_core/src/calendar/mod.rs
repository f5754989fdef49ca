//! Calendar interchange output.
//!
//! # Responsibility
//! - Serialize assembled appointments into iCalendar text.
//!
//! # Invariants
//! - Output lines are CRLF-joined and CRLF-terminated.
//! - Timestamps are written in UTC.

mod ics;

pub use ics::{
    build_event, escape_text, parse_ics_timestamp, write_ics_file, CalendarEvent, EventDraft,
    IcsEncoder,
};
