//! Extraction settings.
//!
//! # Responsibility
//! - Hold the tunable constants used by the extraction pipeline and encoder.
//! - Let hosts override them from JSON without touching code.
//!
//! # Invariants
//! - `ExtractionConfig::default()` reproduces the documented pipeline defaults.
//! - A config that fails `validate()` is never used by the assembler.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default calendar product identifier.
pub const DEFAULT_PRODUCT_ID: &str = "-//DocScanICS//EN";

/// Tunables for the appointment pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Hour used when a date is found without a time, and for fallback schedules.
    pub default_start_hour: u32,
    /// Parsed starts further than this many years past the reference are rejected.
    pub max_years_ahead: u32,
    /// Cap for summaries and keyword-line titles.
    pub summary_max_chars: usize,
    /// Cap for location strings.
    pub location_max_chars: usize,
    /// `PRODID` value written by the calendar encoder.
    pub product_id: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_start_hour: 9,
            max_years_ahead: 10,
            summary_max_chars: 100,
            location_max_chars: 100,
            product_id: DEFAULT_PRODUCT_ID.to_string(),
        }
    }
}

impl ExtractionConfig {
    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_start_hour > 23 {
            return Err(ConfigError::InvalidStartHour(self.default_start_hour));
        }
        if self.max_years_ahead == 0 {
            return Err(ConfigError::ZeroValue("max_years_ahead"));
        }
        if self.summary_max_chars == 0 {
            return Err(ConfigError::ZeroValue("summary_max_chars"));
        }
        if self.location_max_chars == 0 {
            return Err(ConfigError::ZeroValue("location_max_chars"));
        }
        if self.product_id.trim().is_empty() {
            return Err(ConfigError::EmptyProductId);
        }
        Ok(())
    }
}

/// Config validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidStartHour(u32),
    ZeroValue(&'static str),
    EmptyProductId,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStartHour(hour) => {
                write!(f, "default_start_hour must be within 0..=23, got {hour}")
            }
            Self::ZeroValue(field) => write!(f, "{field} must be greater than zero"),
            Self::EmptyProductId => write!(f, "product_id must not be empty"),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ExtractionConfig};

    #[test]
    fn defaults_are_valid() {
        let config = ExtractionConfig::default();
        assert_eq!(config.default_start_hour, 9);
        assert_eq!(config.max_years_ahead, 10);
        assert_eq!(config.summary_max_chars, 100);
        config.validate().expect("defaults must validate");
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: ExtractionConfig =
            serde_json::from_str(r#"{"default_start_hour": 8}"#).expect("partial config");
        assert_eq!(config.default_start_hour, 8);
        assert_eq!(config.location_max_chars, 100);
        assert_eq!(config.product_id, "-//DocScanICS//EN");
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let config = ExtractionConfig {
            default_start_hour: 24,
            ..ExtractionConfig::default()
        };
        assert_eq!(
            config.validate().expect_err("hour 24 is invalid"),
            ConfigError::InvalidStartHour(24)
        );

        let config = ExtractionConfig {
            summary_max_chars: 0,
            ..ExtractionConfig::default()
        };
        assert_eq!(
            config.validate().expect_err("zero cap is invalid"),
            ConfigError::ZeroValue("summary_max_chars")
        );
    }
}
