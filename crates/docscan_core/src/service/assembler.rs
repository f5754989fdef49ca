//! Appointment assembly use-case.
//!
//! # Responsibility
//! - Run date/time, location and summary extraction over one observation.
//! - Try the optional remote extractor once, then fall back to local
//!   patterns without surfacing the failure.
//! - Validate the resolved start against the future horizon.
//!
//! # Invariants
//! - Blank text is the only error returned.
//! - Remote failures only change `ExtractionMode` to `Degraded`.
//! - A start past the horizon is replaced by reference + 1 day at the default
//!   start hour.
//! - Logs carry lengths, modes and strategy names, never document text.

use crate::config::{ConfigError, ExtractionConfig};
use crate::extract::datetime::{exceeds_horizon, DateTimeExtraction, DateTimeExtractor};
use crate::extract::location::{LocationExtractor, LocationMatch, LocationStrategy};
use crate::extract::remote::{fetch_candidates, RemoteExtractor};
use crate::extract::summary::{build_summary, SummaryInput, SummarySource};
use crate::extract::{ExtractError, ExtractResult, NOT_FOUND};
use crate::model::appointment::{ExtractionCandidates, ParsedAppointment, RawObservation};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use log::{info, warn};
use std::sync::Arc;

/// How candidates were obtained for one assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    /// No remote extractor configured; patterns only.
    Local,
    /// Remote candidates seeded the extractors.
    AiAssisted,
    /// Remote extractor failed; patterns only.
    Degraded,
}

impl ExtractionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::AiAssisted => "ai_assisted",
            Self::Degraded => "degraded",
        }
    }

    fn provenance(self) -> &'static str {
        match self {
            Self::Local => "local pattern extraction",
            Self::AiAssisted => "AI-assisted extraction",
            Self::Degraded => "local pattern extraction (AI extraction unavailable)",
        }
    }
}

/// Result of the horizon check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    Accepted,
    /// Neither date nor time was found.
    NoSchedule,
    /// Parsed start was too far ahead and has been replaced.
    Rejected { parsed_start: DateTime<FixedOffset> },
}

impl Validation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::NoSchedule => "no_schedule",
            Self::Rejected { .. } => "rejected",
        }
    }
}

/// Assembled appointment plus diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyOutcome {
    pub appointment: ParsedAppointment,
    pub mode: ExtractionMode,
    pub validation: Validation,
    pub location_strategy: Option<LocationStrategy>,
    pub summary_source: SummarySource,
}

/// Orchestrates extraction for one observation at a time.
pub struct AppointmentAssembler {
    config: ExtractionConfig,
    remote: Option<Arc<dyn RemoteExtractor>>,
}

impl Default for AppointmentAssembler {
    fn default() -> Self {
        Self {
            config: ExtractionConfig::default(),
            remote: None,
        }
    }
}

impl AppointmentAssembler {
    /// Creates an assembler with a validated config.
    pub fn new(config: ExtractionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            remote: None,
        })
    }

    /// Attaches a remote extractor tried before local patterns.
    pub fn with_remote(mut self, remote: Arc<dyn RemoteExtractor>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extracts one appointment.
    ///
    /// Candidates already on the observation take precedence over calling the
    /// configured remote extractor.
    ///
    /// # Errors
    /// - `ExtractError::NoInput` when the text is blank.
    pub fn assemble(&self, observation: &RawObservation) -> ExtractResult<AssemblyOutcome> {
        let text = observation.text.trim();
        if text.is_empty() {
            warn!("event=appointment_assemble module=service status=error error_code=no_input");
            return Err(ExtractError::NoInput);
        }

        let (candidates, mode) = self.resolve_candidates(observation);
        let reference = observation.reference;

        let datetime = DateTimeExtractor::with_default_start_hour(self.config.default_start_hour);
        let extraction = match candidates.as_ref() {
            Some(found) => {
                datetime.extract_with_candidates(text, &found.dates, &found.times, reference)
            }
            None => datetime.extract(text, reference),
        };

        let (schedule, validation) = match extraction.schedule {
            None => (None, Validation::NoSchedule),
            Some(parsed)
                if exceeds_horizon(parsed.start(), reference, self.config.max_years_ahead) =>
            {
                (
                    Some(datetime.fallback_schedule(reference)),
                    Validation::Rejected {
                        parsed_start: parsed.start(),
                    },
                )
            }
            Some(parsed) => (Some(parsed), Validation::Accepted),
        };

        let location_candidates = candidates
            .as_ref()
            .map(|found| found.locations.as_slice())
            .unwrap_or_default();
        let location = LocationExtractor::new(self.config.location_max_chars)
            .extract_with_candidates(text, location_candidates);

        let time_label = extraction.time.map(time_label);
        let start_clock = schedule.map(|schedule| schedule.start().format("%H:%M").to_string());
        let (summary, summary_source) = build_summary(SummaryInput {
            text,
            title_word: observation.title_word.as_deref(),
            location: location.as_ref(),
            time_label: time_label.as_deref(),
            start_clock: start_clock.as_deref(),
            max_chars: self.config.summary_max_chars,
        });

        let description = describe(text, mode, &extraction, location.as_ref(), &validation);

        info!(
            "event=appointment_assemble module=service status=ok mode={} validation={} has_date={} has_time={} location_strategy={} summary_source={} text_chars={}",
            mode.as_str(),
            validation.as_str(),
            extraction.date.is_some(),
            extraction.time.is_some(),
            location
                .as_ref()
                .map_or("none", |found| found.strategy.as_str()),
            summary_source.as_str(),
            text.chars().count()
        );

        Ok(AssemblyOutcome {
            appointment: ParsedAppointment {
                summary,
                schedule,
                location: location.as_ref().map(|found| found.text.clone()),
                description,
            },
            mode,
            validation,
            location_strategy: location.map(|found| found.strategy),
            summary_source,
        })
    }

    fn resolve_candidates(
        &self,
        observation: &RawObservation,
    ) -> (Option<ExtractionCandidates>, ExtractionMode) {
        if let Some(candidates) = observation.candidates.as_ref() {
            return (Some(candidates.clone()), ExtractionMode::AiAssisted);
        }

        let Some(remote) = self.remote.as_ref() else {
            return (None, ExtractionMode::Local);
        };

        match fetch_candidates(remote.as_ref(), &observation.text) {
            Ok(candidates) => {
                info!(
                    "event=remote_extract module=service status=ok dates={} times={} locations={}",
                    candidates.dates.len(),
                    candidates.times.len(),
                    candidates.locations.len()
                );
                (Some(candidates), ExtractionMode::AiAssisted)
            }
            Err(err) => {
                warn!(
                    "event=remote_extract module=service status=fallback error_code={}",
                    err.code()
                );
                (None, ExtractionMode::Degraded)
            }
        }
    }
}

/// `March 15, 2024`
pub fn date_label(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// `2:30 PM`
pub fn time_label(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

fn describe(
    text: &str,
    mode: ExtractionMode,
    extraction: &DateTimeExtraction,
    location: Option<&LocationMatch>,
    validation: &Validation,
) -> String {
    let date = extraction
        .date
        .map(date_label)
        .unwrap_or_else(|| NOT_FOUND.to_string());
    let time = extraction
        .time
        .map(time_label)
        .unwrap_or_else(|| NOT_FOUND.to_string());
    let location = location.map_or(NOT_FOUND, |found| found.text.as_str());

    let mut lines = vec![
        format!("Created from scanned appointment details via {}", mode.provenance()),
        String::new(),
        "Extracted information:".to_string(),
        format!("Date: {date}"),
        format!("Time: {time}"),
        format!("Location: {location}"),
    ];
    if let Validation::Rejected { parsed_start } = validation {
        lines.push(format!(
            "Note: parsed start {} was too far ahead and was replaced",
            parsed_start.format("%Y-%m-%d %H:%M")
        ));
    }
    lines.push(String::new());
    lines.push(text.to_string());
    lines.join("\n")
}
