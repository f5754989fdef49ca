//! Text-to-appointment extractors.
//!
//! # Responsibility
//! - Pull date/time, location and summary fields out of noisy text.
//! - Parse line-oriented responses from a remote extractor.
//!
//! # Invariants
//! - Extractors are pure functions of their inputs and the reference instant.
//! - A missing field is an absent value, never an error.
//! - Blank source text is the only extraction failure.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod datetime;
pub mod location;
pub mod patterns;
pub mod remote;
pub mod summary;

/// Placeholder rendered for fields that were not extracted.
pub const NOT_FOUND: &str = "Not found";

pub type ExtractResult<T> = Result<T, ExtractError>;

/// Extraction pipeline failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// Source text is empty or whitespace-only.
    NoInput,
}

impl Display for ExtractError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoInput => write!(f, "no text to extract an appointment from"),
        }
    }
}

impl Error for ExtractError {}

/// Caps `value` at `max_chars` characters.
pub(crate) fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::{truncate_chars, ExtractError};

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("Zoë Clinic", 3), "Zoë");
        assert_eq!(truncate_chars("short", 100), "short");
    }

    #[test]
    fn no_input_has_readable_message() {
        assert!(ExtractError::NoInput.to_string().contains("no text"));
    }
}
