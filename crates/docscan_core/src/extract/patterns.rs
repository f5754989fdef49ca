//! Pattern library shared by every extractor.
//!
//! # Responsibility
//! - Own the ordered regex sets for dates, times, locations and keywords.
//! - Compile each pattern once per process.
//!
//! # Invariants
//! - List order is priority order; callers stop at the first success.
//! - Every pattern is case-insensitive.

use once_cell::sync::Lazy;
use regex::Regex;

const MONTHS: &str = "jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec";
const WEEKDAYS: &str = "mon|tue|wed|thu|fri|sat|sun";
const ORDINAL: &str = "(?:st|nd|rd|th)?";

/// Location keywords in priority order.
pub const LOCATION_KEYWORDS: &[&str] = &[
    "at", "location", "room", "office", "building", "address", "suite", "floor",
];

/// Words that mark a line as describing the appointment itself.
pub const APPOINTMENT_KEYWORDS: &[&str] = &[
    "appointment",
    "meeting",
    "visit",
    "consultation",
    "session",
    "call",
    "conference",
];

/// Shape recognized by a date pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateShape {
    /// `12/20/2024`, `20-12-24`, `20.12.2024`
    Numeric,
    /// `15th March 2024`
    DayMonthYear,
    /// `March 15, 2024`
    MonthDayYear,
    /// `Tuesday 12 March`, year optional
    WeekdayDayMonth,
    /// `2024-12-25`
    IsoYearMonthDay,
}

/// Shape recognized by a time pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeShape {
    /// `2:30 PM`
    ClockWithMeridiem,
    /// `9 AM`
    HourWithMeridiem,
    /// `15:45`
    Clock24,
}

#[derive(Debug)]
pub struct DatePattern {
    pub shape: DateShape,
    pub regex: Regex,
}

#[derive(Debug)]
pub struct TimePattern {
    pub shape: TimeShape,
    pub regex: Regex,
}

/// Address shapes used by the location extractor.
#[derive(Debug)]
pub struct AddressPatterns {
    /// UK postcode token, groups: outward code, inward code.
    pub postcode: Regex,
    /// Inward code that also reads as an ordinal (`2nd`, `4th`).
    pub ordinal_inward: Regex,
    /// Building or street word directly after a token, e.g. ` floor`.
    pub place_word: Regex,
    /// Line ending in a US ZIP, groups: `name`, `zip`.
    pub zip_line: Regex,
    /// Line naming a care facility.
    pub facility_line: Regex,
    /// Line holding a numbered street.
    pub street_line: Regex,
}

static DATE_PATTERNS: Lazy<Vec<DatePattern>> = Lazy::new(|| {
    vec![
        date_pattern(
            DateShape::Numeric,
            r"\b(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{2,4})\b".to_string(),
        ),
        date_pattern(
            DateShape::DayMonthYear,
            format!(r"\b(\d{{1,2}}){ORDINAL}\s+((?:{MONTHS})[a-z]*)\.?,?\s+(\d{{2,4}})\b"),
        ),
        date_pattern(
            DateShape::MonthDayYear,
            format!(r"\b((?:{MONTHS})[a-z]*)\.?\s+(\d{{1,2}}){ORDINAL},?\s+(\d{{2,4}})\b"),
        ),
        date_pattern(
            DateShape::WeekdayDayMonth,
            format!(
                r"\b(?:{WEEKDAYS})[a-z]*\.?,?\s+(\d{{1,2}}){ORDINAL}\s+((?:{MONTHS})[a-z]*)\b(?:\.?,?\s+(\d{{4}})\b)?"
            ),
        ),
        date_pattern(
            DateShape::IsoYearMonthDay,
            r"\b(\d{4})[/\-.](\d{1,2})[/\-.](\d{1,2})\b".to_string(),
        ),
    ]
});

static TIME_PATTERNS: Lazy<Vec<TimePattern>> = Lazy::new(|| {
    vec![
        time_pattern(
            TimeShape::ClockWithMeridiem,
            r"\b(\d{1,2}):(\d{2})\s*([ap])\.?m\b\.?",
        ),
        time_pattern(TimeShape::HourWithMeridiem, r"\b(\d{1,2})\s*([ap])\.?m\b\.?"),
        time_pattern(TimeShape::Clock24, r"\b(\d{1,2}):(\d{2})\b"),
    ]
});

static KEYWORD_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    LOCATION_KEYWORDS
        .iter()
        .map(|keyword| (*keyword, whole_word(keyword)))
        .collect()
});

static APPOINTMENT_KEYWORD_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    APPOINTMENT_KEYWORDS
        .iter()
        .map(|keyword| {
            Regex::new(&format!("(?i){}", regex::escape(keyword)))
                .expect("valid appointment keyword regex")
        })
        .collect()
});

static ADDRESS_PATTERNS: Lazy<AddressPatterns> = Lazy::new(|| AddressPatterns {
    postcode: Regex::new(r"(?i)\b([a-z]{1,2}\d{1,2}[a-z]?)\s?(\d[a-z]{2})\b")
        .expect("valid postcode regex"),
    ordinal_inward: Regex::new(r"(?i)^(?:1st|2nd|3rd|\dth)$").expect("valid ordinal regex"),
    place_word: Regex::new(
        r"(?i)^[\s,]*(?:floor|fl|level|storey|wing|ward|block|building|entrance|street|st|road|rd|avenue|ave|lane)\b",
    )
    .expect("valid place word regex"),
    zip_line: Regex::new(r"(?i)^(?P<name>.*[a-z]\.?)[\s,]+(?P<zip>\d{5}(?:-\d{4})?)\s*$")
        .expect("valid zip regex"),
    facility_line: Regex::new(
        r"(?i)\b(?:hospital|clinic|medical\s+cent(?:re|er)|surgery|practice|health\s+cent(?:re|er))\b",
    )
    .expect("valid facility regex"),
    street_line: Regex::new(
        r"(?i)\b\d+[a-z]?,?\s+(?:[a-z'.\-]+\s+){1,4}(?:street|road|avenue|lane|drive|close|way)\b",
    )
    .expect("valid street regex"),
});

static WEEKDAY_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)^(?:{WEEKDAYS})[a-z]*\.?\s+")).expect("valid weekday regex")
});

/// Date patterns in priority order.
pub fn date_patterns() -> &'static [DatePattern] {
    &DATE_PATTERNS
}

/// Time patterns in priority order.
pub fn time_patterns() -> &'static [TimePattern] {
    &TIME_PATTERNS
}

/// Whole-word location keyword matchers, in [`LOCATION_KEYWORDS`] order.
pub fn location_keyword_patterns() -> &'static [(&'static str, Regex)] {
    &KEYWORD_PATTERNS
}

/// Substring matchers for [`APPOINTMENT_KEYWORDS`].
pub fn appointment_keyword_patterns() -> &'static [Regex] {
    &APPOINTMENT_KEYWORD_PATTERNS
}

pub fn address_patterns() -> &'static AddressPatterns {
    &ADDRESS_PATTERNS
}

/// Matches a leading weekday name such as `Tue ` or `Tuesday `.
pub fn weekday_prefix() -> &'static Regex {
    &WEEKDAY_PREFIX
}

/// Maps a month word (`Mar`, `march`, `Sept.`) to its number.
///
/// The word must be at least three letters and a prefix of the full name.
pub fn month_number(word: &str) -> Option<u32> {
    const NAMES: [&str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];
    let word = word.trim().trim_end_matches('.').to_ascii_lowercase();
    if word.len() < 3 {
        return None;
    }
    NAMES
        .iter()
        .position(|name| name.starts_with(word.as_str()))
        .and_then(|index| u32::try_from(index + 1).ok())
}

fn date_pattern(shape: DateShape, pattern: String) -> DatePattern {
    DatePattern {
        shape,
        regex: Regex::new(&format!("(?i){pattern}")).expect("valid date regex"),
    }
}

fn time_pattern(shape: TimeShape, pattern: &str) -> TimePattern {
    TimePattern {
        shape,
        regex: Regex::new(&format!("(?i){pattern}")).expect("valid time regex"),
    }
}

fn whole_word(keyword: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(keyword))).expect("valid keyword regex")
}
