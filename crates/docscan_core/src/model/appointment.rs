//! Appointment request/result model.
//!
//! # Responsibility
//! - Carry source text, optional pre-extracted candidates and the reference
//!   instant into the pipeline.
//! - Carry the assembled appointment out of it.
//!
//! # Invariants
//! - `ParsedAppointment::end()` is `Some` iff `start()` is `Some`, and is
//!   exactly one hour later.
//! - `summary` and `location` respect the configured character caps.
//! - `description` is never empty.

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

/// Fixed length of every appointment.
pub const EVENT_DURATION_MINUTES: i64 = 60;

/// Start and end of one appointment.
///
/// Only constructible through [`Schedule::starting_at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Schedule {
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
}

impl Schedule {
    pub fn starting_at(start: DateTime<FixedOffset>) -> Self {
        Self {
            start,
            end: start + Duration::minutes(EVENT_DURATION_MINUTES),
        }
    }

    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    pub fn end(&self) -> DateTime<FixedOffset> {
        self.end
    }
}

/// Field candidates produced by a remote extractor.
///
/// Empty lists mean "nothing supplied" for that category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionCandidates {
    pub dates: Vec<String>,
    pub times: Vec<String>,
    pub locations: Vec<String>,
}

impl ExtractionCandidates {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() && self.times.is_empty() && self.locations.is_empty()
    }
}

/// One extraction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObservation {
    /// Reading-order text, possibly multi-line.
    pub text: String,
    /// Candidates already extracted by a remote collaborator.
    pub candidates: Option<ExtractionCandidates>,
    /// "Now" used for partial dates, time-only matches and the horizon check.
    pub reference: DateTime<FixedOffset>,
    /// User-chosen vocabulary word for the title.
    pub title_word: Option<String>,
}

impl RawObservation {
    pub fn new(text: impl Into<String>, reference: DateTime<FixedOffset>) -> Self {
        Self {
            text: text.into(),
            candidates: None,
            reference,
            title_word: None,
        }
    }

    pub fn with_candidates(mut self, candidates: ExtractionCandidates) -> Self {
        self.candidates = Some(candidates);
        self
    }

    pub fn with_title_word(mut self, word: impl Into<String>) -> Self {
        self.title_word = Some(word.into());
        self
    }
}

/// Assembled appointment, ready for encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedAppointment {
    pub summary: String,
    pub schedule: Option<Schedule>,
    pub location: Option<String>,
    pub description: String,
}

impl ParsedAppointment {
    pub fn start(&self) -> Option<DateTime<FixedOffset>> {
        self.schedule.map(|schedule| schedule.start())
    }

    pub fn end(&self) -> Option<DateTime<FixedOffset>> {
        self.schedule.map(|schedule| schedule.end())
    }
}
