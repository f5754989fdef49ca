//! Summary/title building.
//!
//! # Responsibility
//! - Derive a short human-readable title for an appointment.
//! - Format vocabulary-word titles (`word - location - time`).
//!
//! # Invariants
//! - The returned summary is never empty and never exceeds the cap.
//! - Sources are tried in a fixed order: vocabulary word, venue acronym,
//!   keyword line, first line, placeholder.

use crate::extract::location::LocationMatch;
use crate::extract::patterns::appointment_keyword_patterns;
use crate::extract::{truncate_chars, NOT_FOUND};

/// Title used when nothing better exists.
pub const TITLE_PLACEHOLDER: &str = "Appointment";

const SEPARATOR: &str = " - ";
const MAX_PLAIN_LOCATION_CHARS: usize = 15;
const MAX_ACRONYM_LETTERS: usize = 6;
const SHORT_LOCATION_PREFIX_CHARS: usize = 12;
const STOPWORDS: &[&str] = &["the", "and", "of", "at", "in", "on", "to", "a", "an", "for"];

/// Where a summary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarySource {
    TitleWord,
    VenueAcronym,
    KeywordLine,
    FirstLine,
    Placeholder,
}

impl SummarySource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TitleWord => "title_word",
            Self::VenueAcronym => "venue_acronym",
            Self::KeywordLine => "keyword_line",
            Self::FirstLine => "first_line",
            Self::Placeholder => "placeholder",
        }
    }
}

/// Inputs for [`build_summary`].
#[derive(Debug, Clone, Copy)]
pub struct SummaryInput<'a> {
    pub text: &'a str,
    pub title_word: Option<&'a str>,
    pub location: Option<&'a LocationMatch>,
    /// Display label of the extracted time, e.g. `2:30 PM`.
    pub time_label: Option<&'a str>,
    /// 24-hour `HH:MM` of the start, used with venue acronyms.
    pub start_clock: Option<&'a str>,
    pub max_chars: usize,
}

/// Builds a summary and reports which source produced it.
pub fn build_summary(input: SummaryInput<'_>) -> (String, SummarySource) {
    let (summary, source) = if let Some(word) = non_blank(input.title_word) {
        (
            format_title(
                word,
                input.location.map(|found| found.text.as_str()),
                input.time_label,
            ),
            SummarySource::TitleWord,
        )
    } else if let Some(title) = input.location.and_then(|found| venue_title(found, input.start_clock)) {
        (title, SummarySource::VenueAcronym)
    } else if let Some(line) = keyword_line(input.text) {
        (line.to_string(), SummarySource::KeywordLine)
    } else if let Some(line) = input.text.lines().map(str::trim).find(|line| !line.is_empty()) {
        (line.to_string(), SummarySource::FirstLine)
    } else {
        (TITLE_PLACEHOLDER.to_string(), SummarySource::Placeholder)
    };
    (truncate_chars(&summary, input.max_chars), source)
}

/// Formats `word - location - time`, skipping blank and "Not found" parts.
///
/// Locations longer than 15 characters are replaced by [`shorten_location`].
pub fn format_title(word: &str, location: Option<&str>, time: Option<&str>) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(3);
    if let Some(word) = non_blank(Some(word)) {
        parts.push(word.to_string());
    }
    if let Some(location) = non_blank(location).filter(|value| *value != NOT_FOUND) {
        parts.push(shorten_location(location));
    }
    if let Some(time) = non_blank(time).filter(|value| *value != NOT_FOUND) {
        parts.push(time.to_string());
    }

    if parts.is_empty() {
        TITLE_PLACEHOLDER.to_string()
    } else {
        parts.join(SEPARATOR)
    }
}

/// Keeps short locations; abbreviates long ones to initials plus `...`.
///
/// Short stopwords are skipped and at most six initials are kept. When fewer
/// than two initials remain, the first twelve characters are used instead.
pub fn shorten_location(location: &str) -> String {
    let location = location.trim();
    if location.chars().count() <= MAX_PLAIN_LOCATION_CHARS {
        return location.to_string();
    }

    let acronym: String = location
        .split_whitespace()
        .filter(|word| word.chars().count() > 2 || !is_stopword(word))
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(MAX_ACRONYM_LETTERS)
        .collect();

    if acronym.chars().count() >= 2 {
        format!("{acronym}...")
    } else {
        format!("{}...", truncate_chars(location, SHORT_LOCATION_PREFIX_CHARS))
    }
}

/// Uppercased initials of a venue name.
///
/// Tokens are split on whitespace, hyphen, slash, comma and period.
pub fn venue_acronym(venue: &str) -> String {
    venue
        .split(|c: char| c.is_whitespace() || matches!(c, '-' | '/' | ',' | '.'))
        .filter_map(|token| token.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

fn venue_title(found: &LocationMatch, start_clock: Option<&str>) -> Option<String> {
    if !found.strategy.is_address_shape() {
        return None;
    }
    let acronym = venue_acronym(found.venue.as_deref()?);
    if acronym.is_empty() {
        return None;
    }
    Some(match start_clock {
        Some(clock) => format!("{acronym}{SEPARATOR}{clock}"),
        None => acronym,
    })
}

fn keyword_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| {
        appointment_keyword_patterns()
            .iter()
            .any(|pattern| pattern.is_match(line))
    })
}

fn is_stopword(word: &str) -> bool {
    STOPWORDS
        .iter()
        .any(|stopword| stopword.eq_ignore_ascii_case(word))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
