//! Remote extractor seam and response parsing.
//!
//! # Responsibility
//! - Define the capability a host injects to call a remote extraction service.
//! - Turn its line-oriented `KEY: value` response into field candidates.
//!
//! # Invariants
//! - Remote failures are values (`RemoteError`), never panics.
//! - Absent markers (`Not found`, `None`, `[none found]`) never become
//!   candidates.
//! - Location values are kept whole; addresses contain commas.

use crate::model::appointment::ExtractionCandidates;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

const ABSENT_MARKERS: &[&str] = &["not found", "none", "[none found]"];

static BARE_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}$").expect("valid bare year regex"));

/// Failure reported by a remote extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// No credential or service configured.
    Unavailable,
    /// Service signalled overload (e.g. HTTP 503).
    Overloaded,
    /// Network or protocol failure.
    Transport(String),
    /// Service answered with no usable text.
    EmptyResponse,
}

impl RemoteError {
    /// Maps a host-side error message onto a variant.
    pub fn from_message(message: &str) -> Self {
        let lowered = message.to_ascii_lowercase();
        if lowered.trim().is_empty() {
            Self::Transport("unknown remote failure".to_string())
        } else if lowered.contains("overload") || lowered.contains("503") {
            Self::Overloaded
        } else if lowered.contains("api key") || lowered.contains("unavailable") {
            Self::Unavailable
        } else {
            Self::Transport(message.trim().to_string())
        }
    }

    /// Short label for logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable => "remote_unavailable",
            Self::Overloaded => "remote_overloaded",
            Self::Transport(_) => "remote_transport",
            Self::EmptyResponse => "remote_empty_response",
        }
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "remote extractor is not configured"),
            Self::Overloaded => write!(f, "remote extractor is overloaded"),
            Self::Transport(message) => write!(f, "remote extractor failed: {message}"),
            Self::EmptyResponse => write!(f, "remote extractor returned an empty response"),
        }
    }
}

impl Error for RemoteError {}

/// Capability for calling a remote extraction service.
///
/// Implementations return the raw response text; timeouts and cancellation
/// belong to the implementation.
pub trait RemoteExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Result<String, RemoteError>;
}

/// Remote extractor that replays a response captured elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedResponse {
    response: Result<String, RemoteError>,
}

impl FixedResponse {
    pub fn ok(response: impl Into<String>) -> Self {
        Self {
            response: Ok(response.into()),
        }
    }

    pub fn failing(error: RemoteError) -> Self {
        Self {
            response: Err(error),
        }
    }
}

impl RemoteExtractor for FixedResponse {
    fn extract(&self, _text: &str) -> Result<String, RemoteError> {
        self.response.clone()
    }
}

/// Calls `remote` and parses its answer.
///
/// # Errors
/// - Whatever the extractor reports.
/// - `EmptyResponse` for a blank answer.
pub fn fetch_candidates(
    remote: &dyn RemoteExtractor,
    text: &str,
) -> Result<ExtractionCandidates, RemoteError> {
    let response = remote.extract(text)?;
    if response.trim().is_empty() {
        return Err(RemoteError::EmptyResponse);
    }
    Ok(parse_remote_response(&response))
}

/// Parses `DATE(S)`, `TIME(S)` and `LOCATION(S)` lines.
///
/// Keys are case-insensitive. Plural keys carry comma-separated values for
/// dates and times; a bare four-digit year fragment is joined back onto the
/// date before it. Unknown keys and lines without `:` are ignored.
pub fn parse_remote_response(response: &str) -> ExtractionCandidates {
    let mut candidates = ExtractionCandidates::default();

    for line in response.lines() {
        let Some((key, value)) = line.trim().split_once(':') else {
            continue;
        };
        let value = value.trim();
        if is_absent(value) {
            continue;
        }

        match key.trim().to_ascii_uppercase().as_str() {
            "DATE" => candidates.dates.push(value.to_string()),
            "DATES" => candidates.dates.extend(split_dates(value)),
            "TIME" => candidates.times.push(value.to_string()),
            "TIMES" => candidates.times.extend(split_values(value)),
            "LOCATION" | "LOCATIONS" => candidates.locations.push(value.to_string()),
            _ => {}
        }
    }

    candidates
}

fn is_absent(value: &str) -> bool {
    value.is_empty()
        || ABSENT_MARKERS
            .iter()
            .any(|marker| marker.eq_ignore_ascii_case(value))
}

fn split_values(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_dates(value: &str) -> Vec<String> {
    let mut dates: Vec<String> = Vec::new();
    for part in split_values(value) {
        match dates.last_mut() {
            Some(previous) if BARE_YEAR.is_match(&part) => {
                previous.push_str(", ");
                previous.push_str(&part);
            }
            _ => dates.push(part),
        }
    }
    dates
}
