//! Location extraction.
//!
//! # Responsibility
//! - Find a venue or address fragment in reading-order text.
//! - Evaluate strategies as an explicit ordered list, stopping at the first hit.
//!
//! # Invariants
//! - A remote candidate, when present, wins and is used verbatim.
//! - Address shapes (postcode, ZIP) are tried before keyword heuristics.
//! - Results are capped at the configured character budget.

use crate::extract::patterns::{address_patterns, location_keyword_patterns};
use crate::extract::truncate_chars;

/// Strategy that produced a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationStrategy {
    Remote,
    Postcode,
    Zip,
    Keyword,
    Facility,
    Street,
}

impl LocationStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Postcode => "postcode",
            Self::Zip => "zip",
            Self::Keyword => "keyword",
            Self::Facility => "facility",
            Self::Street => "street",
        }
    }

    /// True for strategies that separate a venue name from the address.
    pub fn is_address_shape(self) -> bool {
        matches!(self, Self::Postcode | Self::Zip)
    }
}

/// One extracted location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationMatch {
    /// Location as it will appear on the appointment.
    pub text: String,
    /// Venue/name part, when an address shape separated one.
    pub venue: Option<String>,
    pub strategy: LocationStrategy,
}

type LineStrategy = fn(&[&str]) -> Option<LocationMatch>;

/// Local strategies in priority order.
const LOCAL_STRATEGIES: &[LineStrategy] = &[
    by_postcode,
    by_zip,
    by_keyword,
    by_facility_line,
    by_street_line,
];

/// Location extractor with a character budget.
#[derive(Debug, Clone, Copy)]
pub struct LocationExtractor {
    max_chars: usize,
}

impl Default for LocationExtractor {
    fn default() -> Self {
        Self::new(100)
    }
}

impl LocationExtractor {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Scans `text` with the local strategies only.
    pub fn extract(&self, text: &str) -> Option<LocationMatch> {
        self.extract_with_candidates(text, &[])
    }

    /// Uses the first non-blank candidate verbatim, otherwise scans `text`.
    pub fn extract_with_candidates(
        &self,
        text: &str,
        candidates: &[String],
    ) -> Option<LocationMatch> {
        let found = candidates
            .iter()
            .map(|candidate| candidate.trim())
            .find(|candidate| !candidate.is_empty())
            .map(|candidate| LocationMatch {
                text: candidate.to_string(),
                venue: None,
                strategy: LocationStrategy::Remote,
            })
            .or_else(|| {
                let lines: Vec<&str> = text.lines().collect();
                LOCAL_STRATEGIES
                    .iter()
                    .find_map(|strategy| strategy(&lines))
            })?;

        Some(LocationMatch {
            text: truncate_chars(&found.text, self.max_chars),
            ..found
        })
    }
}

/// Uppercases a postcode and puts one space before the inward code.
pub fn normalize_postcode(outward: &str, inward: &str) -> String {
    format!(
        "{} {}",
        outward.to_ascii_uppercase(),
        inward.to_ascii_uppercase()
    )
}

fn by_postcode(lines: &[&str]) -> Option<LocationMatch> {
    let patterns = address_patterns();
    lines.iter().enumerate().find_map(|(index, line)| {
        let caps = patterns
            .postcode
            .captures_iter(line)
            .find(|caps| !is_ordinal_place(caps, line))?;
        let token = caps.get(0)?;
        let normalized = normalize_postcode(caps.get(1)?.as_str(), caps.get(2)?.as_str());

        let prefix = clean_venue(&line[..token.start()]);
        let venue = if prefix.is_empty() {
            previous_non_blank(lines, index).map(clean_venue)
        } else {
            Some(prefix)
        }
        .filter(|venue| !venue.is_empty());

        let text = match venue.as_deref() {
            Some(venue) => format!("{venue} {normalized}"),
            None => normalized,
        };
        Some(LocationMatch {
            text,
            venue,
            strategy: LocationStrategy::Postcode,
        })
    })
}

/// `B4 2nd floor` has a postcode shape but names a floor.
fn is_ordinal_place(caps: &regex::Captures<'_>, line: &str) -> bool {
    let patterns = address_patterns();
    match (caps.get(0), caps.get(2)) {
        (Some(token), Some(inward)) => {
            patterns.ordinal_inward.is_match(inward.as_str())
                && patterns.place_word.is_match(&line[token.end()..])
        }
        _ => false,
    }
}

fn by_zip(lines: &[&str]) -> Option<LocationMatch> {
    let zip_line = &address_patterns().zip_line;
    lines.iter().find_map(|line| {
        let trimmed = line.trim();
        let caps = zip_line.captures(trimmed)?;
        let venue = clean_venue(caps.name("name")?.as_str());
        Some(LocationMatch {
            text: trimmed.to_string(),
            venue: Some(venue).filter(|venue| !venue.is_empty()),
            strategy: LocationStrategy::Zip,
        })
    })
}

fn by_keyword(lines: &[&str]) -> Option<LocationMatch> {
    lines.iter().find_map(|line| {
        location_keyword_patterns().iter().find_map(|(_, pattern)| {
            let found = pattern.find(line)?;
            let remainder = line[found.end()..]
                .trim_start_matches(|c: char| c == ':' || c == '-' || c.is_whitespace())
                .trim();
            if remainder.is_empty() {
                return None;
            }
            Some(LocationMatch {
                text: remainder.to_string(),
                venue: None,
                strategy: LocationStrategy::Keyword,
            })
        })
    })
}

fn by_facility_line(lines: &[&str]) -> Option<LocationMatch> {
    whole_line(lines, &address_patterns().facility_line, LocationStrategy::Facility)
}

fn by_street_line(lines: &[&str]) -> Option<LocationMatch> {
    whole_line(lines, &address_patterns().street_line, LocationStrategy::Street)
}

fn whole_line(
    lines: &[&str],
    pattern: &regex::Regex,
    strategy: LocationStrategy,
) -> Option<LocationMatch> {
    lines
        .iter()
        .map(|line| line.trim())
        .find(|line| pattern.is_match(line))
        .map(|line| LocationMatch {
            text: line.to_string(),
            venue: None,
            strategy,
        })
}

fn previous_non_blank<'a>(lines: &[&'a str], index: usize) -> Option<&'a str> {
    lines[..index]
        .iter()
        .rev()
        .copied()
        .find(|line| !line.trim().is_empty())
}

fn clean_venue(value: &str) -> String {
    value
        .trim()
        .trim_end_matches(|c: char| c == ',' || c == '-' || c.is_whitespace())
        .to_string()
}
