//! Date and time extraction.
//!
//! # Responsibility
//! - Find the most likely appointment date and time in noisy text.
//! - Combine them into a schedule anchored on the reference instant's offset.
//!
//! # Invariants
//! - A schedule always ends exactly one hour after it starts.
//! - Missing date and time yield no schedule; this is not an error.
//! - Month is clamped to 1..=12 and day to the length of that month, so a
//!   date never moves into another month (`31 Feb 2024` is `29 Feb 2024`).

use crate::extract::patterns::{date_patterns, month_number, time_patterns, weekday_prefix};
use crate::model::appointment::Schedule;
use chrono::{DateTime, Datelike, FixedOffset, Months, NaiveDate, NaiveTime, TimeZone};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Raw findings plus the combined schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTimeExtraction {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub schedule: Option<Schedule>,
}

/// Date/time extractor with a configurable default start hour.
#[derive(Debug, Clone, Copy)]
pub struct DateTimeExtractor {
    default_start: NaiveTime,
}

impl Default for DateTimeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DateTimeExtractor {
    /// Extractor defaulting date-only matches to 09:00.
    pub fn new() -> Self {
        Self::with_default_start_hour(9)
    }

    /// Hours above 23 fall back to 09:00.
    pub fn with_default_start_hour(hour: u32) -> Self {
        let default_start = NaiveTime::from_hms_opt(hour, 0, 0)
            .unwrap_or_else(|| NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN));
        Self { default_start }
    }

    pub fn default_start(&self) -> NaiveTime {
        self.default_start
    }

    /// Scans `text` for a date and a time.
    pub fn extract(&self, text: &str, reference: DateTime<FixedOffset>) -> DateTimeExtraction {
        let date = find_date(text, reference.year());
        let time = find_time(text);
        self.combine(date, time, reference)
    }

    /// Prefers pre-extracted candidates, falling back to `text` per field.
    ///
    /// The first date candidate that parses wins. Among time candidates the
    /// earliest time of day wins.
    pub fn extract_with_candidates(
        &self,
        text: &str,
        date_candidates: &[String],
        time_candidates: &[String],
        reference: DateTime<FixedOffset>,
    ) -> DateTimeExtraction {
        let date = date_candidates
            .iter()
            .find_map(|candidate| find_date(candidate, reference.year()))
            .or_else(|| find_date(text, reference.year()));
        let time = time_candidates
            .iter()
            .filter_map(|candidate| find_time(candidate))
            .min()
            .or_else(|| find_time(text));
        self.combine(date, time, reference)
    }

    /// Schedule used when nothing usable was extracted: reference + 1 day
    /// at the default start time.
    pub fn fallback_schedule(&self, reference: DateTime<FixedOffset>) -> Schedule {
        let day = next_day(reference);
        Schedule::starting_at(at_offset(day, self.default_start, reference))
    }

    fn combine(
        &self,
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
        reference: DateTime<FixedOffset>,
    ) -> DateTimeExtraction {
        let start = match (date, time) {
            (Some(date), Some(time)) => Some(at_offset(date, time, reference)),
            (Some(date), None) => Some(at_offset(date, self.default_start, reference)),
            (None, Some(time)) => Some(at_offset(next_day(reference), time, reference)),
            (None, None) => None,
        };
        DateTimeExtraction {
            date,
            time,
            schedule: start.map(Schedule::starting_at),
        }
    }
}

/// Returns true when `start` lies more than `years` years after `reference`.
pub fn exceeds_horizon(
    start: DateTime<FixedOffset>,
    reference: DateTime<FixedOffset>,
    years: u32,
) -> bool {
    match reference.checked_add_months(Months::new(years.saturating_mul(12))) {
        Some(limit) => start > limit,
        None => false,
    }
}

/// Finds the first date in `text`, scanning patterns in priority order.
pub fn find_date(text: &str, reference_year: i32) -> Option<NaiveDate> {
    date_patterns().iter().find_map(|pattern| {
        pattern
            .regex
            .find(text)
            .and_then(|found| parse_date(found.as_str(), reference_year))
    })
}

/// Finds the first time in `text`, scanning patterns in priority order.
pub fn find_time(text: &str) -> Option<NaiveTime> {
    time_patterns().iter().find_map(|pattern| {
        pattern
            .regex
            .find(text)
            .and_then(|found| parse_time(found.as_str()))
    })
}

type LayoutFn = fn(&Captures<'_>, i32) -> Option<NaiveDate>;

struct DateLayout {
    regex: Regex,
    build: LayoutFn,
}

static DATE_LAYOUTS: Lazy<Vec<DateLayout>> = Lazy::new(|| {
    vec![
        layout(
            r"^(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{2,4})$",
            |caps, _| numeric_date(number(caps, 1)?, number(caps, 2)?, number(caps, 3)?),
        ),
        layout(
            r"^(\d{1,2})(?:st|nd|rd|th)?\s+([a-z]+)\.?\s+(\d{2,4})$",
            |caps, _| named_month_date(caps, 2, 1, Some(3), 0),
        ),
        layout(
            r"^([a-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?\s+(\d{2,4})$",
            |caps, _| named_month_date(caps, 1, 2, Some(3), 0),
        ),
        layout(r"^(\d{4})[/\-.](\d{1,2})[/\-.](\d{1,2})$", |caps, _| {
            let year = i32::try_from(number(caps, 1)?).ok()?;
            calendar_date(year, number(caps, 2)?, number(caps, 3)?)
        }),
        layout(
            r"^(\d{1,2})(?:st|nd|rd|th)?\s+([a-z]+)\.?$",
            |caps, reference_year| named_month_date(caps, 2, 1, None, reference_year),
        ),
    ]
});

static MERIDIEM_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?::(\d{2}))?\s*([ap])\.?m").expect("valid meridiem time regex")
});
static CLOCK_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2}):(\d{2})").expect("valid clock time regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Parses a matched date fragment by trying each concrete layout in order.
///
/// A leading weekday and comma noise are removed first.
pub fn parse_date(fragment: &str, reference_year: i32) -> Option<NaiveDate> {
    let without_commas = fragment.replace(',', " ");
    let collapsed = WHITESPACE.replace_all(without_commas.trim(), " ");
    let cleaned = weekday_prefix().replace(&collapsed, "");
    let cleaned = cleaned.trim();

    DATE_LAYOUTS.iter().find_map(|layout| {
        layout
            .regex
            .captures(cleaned)
            .and_then(|caps| (layout.build)(&caps, reference_year))
    })
}

/// Parses a matched time fragment.
///
/// With a meridiem marker the hour must be 1..=12: PM adds 12 except at 12,
/// and 12 AM is midnight. Without one, `H:MM` is read as a 24-hour clock.
pub fn parse_time(fragment: &str) -> Option<NaiveTime> {
    if let Some(caps) = MERIDIEM_TIME.captures(fragment) {
        let hour = number(&caps, 1)?;
        let minute = caps
            .get(2)
            .map_or(Some(0), |m| m.as_str().parse::<u32>().ok())?;
        if !(1..=12).contains(&hour) {
            return None;
        }
        let is_pm = caps
            .get(3)
            .is_some_and(|m| m.as_str().eq_ignore_ascii_case("p"));
        let hour = match (is_pm, hour) {
            (true, 12) => 12,
            (true, h) => h + 12,
            (false, 12) => 0,
            (false, h) => h,
        };
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    let caps = CLOCK_TIME.captures(fragment)?;
    NaiveTime::from_hms_opt(number(&caps, 1)?, number(&caps, 2)?, 0)
}

fn layout(pattern: &str, build: LayoutFn) -> DateLayout {
    DateLayout {
        regex: Regex::new(&format!("(?i){pattern}")).expect("valid date layout regex"),
        build,
    }
}

fn number(caps: &Captures<'_>, index: usize) -> Option<u32> {
    caps.get(index)?.as_str().parse().ok()
}

/// Day/month order for purely numeric dates.
///
/// A first field above 12 can only be a day, so the date reads day-month;
/// otherwise month-day.
fn numeric_date(first: u32, second: u32, year: u32) -> Option<NaiveDate> {
    let (month, day) = if first > 12 {
        (second, first)
    } else {
        (first, second)
    };
    calendar_date(normalize_year(i32::try_from(year).ok()?), month, day)
}

fn named_month_date(
    caps: &Captures<'_>,
    month_index: usize,
    day_index: usize,
    year_index: Option<usize>,
    reference_year: i32,
) -> Option<NaiveDate> {
    let month = month_number(caps.get(month_index)?.as_str())?;
    let day = number(caps, day_index)?;
    let year = match year_index {
        Some(index) => normalize_year(i32::try_from(number(caps, index)?).ok()?),
        None => reference_year,
    };
    calendar_date(year, month, day)
}

fn normalize_year(year: i32) -> i32 {
    if year < 100 {
        year + 2000
    } else {
        year
    }
}

fn calendar_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month.clamp(1, 12), 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    first.with_day(day.clamp(1, last.day()))
}

fn next_day(reference: DateTime<FixedOffset>) -> NaiveDate {
    let today = reference.date_naive();
    today.succ_opt().unwrap_or(today)
}

fn at_offset(
    date: NaiveDate,
    time: NaiveTime,
    reference: DateTime<FixedOffset>,
) -> DateTime<FixedOffset> {
    let offset = *reference.offset();
    let local = date.and_time(time);
    // A fixed offset maps every local time to exactly one instant.
    offset
        .from_local_datetime(&local)
        .single()
        .unwrap_or_else(|| offset.from_utc_datetime(&local))
}

#[cfg(test)]
mod tests {
    use super::{
        exceeds_horizon, find_date, find_time, parse_date, parse_time, DateTimeExtractor,
    };
    use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Timelike};

    fn reference() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("utc offset")
            .with_ymd_and_hms(2024, 1, 15, 10, 0, 0)
            .single()
            .expect("valid reference")
    }

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn hm(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
    }

    #[test]
    fn parses_every_supported_date_shape() {
        let cases = [
            ("Meeting on 03/15/2024", ymd(2024, 3, 15)),
            ("Visit on 2024-12-25", ymd(2024, 12, 25)),
            ("Call on Dec 31, 2024", ymd(2024, 12, 31)),
            ("Session on 15 Jan 2025", ymd(2025, 1, 15)),
            ("Booked for 15th March 2024", ymd(2024, 3, 15)),
            ("Tuesday, 12 March", ymd(2024, 3, 12)),
            ("Friday 5th April 2024", ymd(2024, 4, 5)),
            ("Review 20.12.2024", ymd(2024, 12, 20)),
        ];
        for (text, expected) in cases {
            assert_eq!(find_date(text, 2024), Some(expected), "text: {text}");
        }
    }

    #[test]
    fn numeric_dates_prefer_day_first_only_when_unambiguous() {
        assert_eq!(parse_date("25/12/2024", 2024), Some(ymd(2024, 12, 25)));
        // Ambiguous input keeps month-first order.
        assert_eq!(parse_date("03/04/2024", 2024), Some(ymd(2024, 3, 4)));
        assert_eq!(parse_date("12-20-24", 2024), Some(ymd(2024, 12, 20)));
    }

    #[test]
    fn overflowing_day_clamps_to_month_end() {
        assert_eq!(parse_date("31 Feb 2024", 2024), Some(ymd(2024, 2, 29)));
        assert_eq!(parse_date("31 Feb 2023", 2023), Some(ymd(2023, 2, 28)));
        assert_eq!(parse_date("2/31/2024", 2024), Some(ymd(2024, 2, 29)));
        assert_eq!(parse_date("31 Apr 2024", 2024), Some(ymd(2024, 4, 30)));
        assert_eq!(parse_date("02/45/2024", 2024), Some(ymd(2024, 2, 29)));
        assert_eq!(parse_date("December 31, 2024", 2024), Some(ymd(2024, 12, 31)));
    }

    #[test]
    fn day_month_without_year_is_not_a_date() {
        assert_eq!(find_date("Review 24/7 helpline", 2024), None);
        assert_eq!(find_date("Bring form by 3/9", 2024), None);
    }

    #[test]
    fn rejects_unknown_month_words() {
        assert_eq!(find_date("15 Mayfair 2024", 2024), None);
    }

    #[test]
    fn parses_meridiem_and_clock_times() {
        let cases = [
            ("Meeting at 2:30 PM", hm(14, 30)),
            ("Visit at 9 AM", hm(9, 0)),
            ("Call at 15:45", hm(15, 45)),
            ("Session at 8:00 am", hm(8, 0)),
            ("Drop in 7 p.m.", hm(19, 0)),
            ("Meeting at 12:00 AM", hm(0, 0)),
            ("Visit at 12:00 PM", hm(12, 0)),
            ("Call at 12:30 AM", hm(0, 30)),
            ("Session at 12:30 PM", hm(12, 30)),
        ];
        for (text, expected) in cases {
            assert_eq!(find_time(text), Some(expected), "text: {text}");
        }
    }

    #[test]
    fn rejects_out_of_range_times() {
        assert_eq!(parse_time("13:00 pm"), None);
        assert_eq!(parse_time("0 am"), None);
        assert_eq!(parse_time("25:10"), None);
        assert_eq!(find_time("no time"), None);
    }

    #[test]
    fn combines_date_and_time_with_one_hour_duration() {
        let extraction = DateTimeExtractor::new().extract(
            "Doctor appointment on March 15, 2024 at 2:30 PM",
            reference(),
        );
        let schedule = extraction.schedule.expect("schedule");
        assert_eq!(schedule.start().date_naive(), ymd(2024, 3, 15));
        assert_eq!(schedule.start().time(), hm(14, 30));
        assert_eq!(schedule.end() - schedule.start(), Duration::hours(1));
        assert_eq!(schedule.end().time(), hm(15, 30));
    }

    #[test]
    fn date_only_defaults_to_nine_and_time_only_uses_next_day() {
        let extractor = DateTimeExtractor::new();

        let date_only = extractor.extract("Consultation on January 25, 2024", reference());
        let start = date_only.schedule.expect("date-only schedule").start();
        assert_eq!(start.date_naive(), ymd(2024, 1, 25));
        assert_eq!(start.hour(), 9);
        assert_eq!(date_only.time, None);

        let time_only = extractor.extract("Appointment at 3:45 PM", reference());
        let start = time_only.schedule.expect("time-only schedule").start();
        assert_eq!(start.date_naive(), ymd(2024, 1, 16));
        assert_eq!(start.time(), hm(15, 45));
    }

    #[test]
    fn nothing_found_yields_no_schedule() {
        let extraction = DateTimeExtractor::new().extract("Some random text", reference());
        assert_eq!(extraction.schedule, None);
        assert_eq!(extraction.date, None);
        assert_eq!(extraction.time, None);
    }

    #[test]
    fn candidates_win_and_earliest_time_is_used() {
        let extraction = DateTimeExtractor::new().extract_with_candidates(
            "Follow-up on 01/02/2024 at 8:00",
            &["garbled".to_string(), "5th March 2024".to_string()],
            &["3:15 PM".to_string(), "10:30 AM".to_string()],
            reference(),
        );
        assert_eq!(extraction.date, Some(ymd(2024, 3, 5)));
        assert_eq!(extraction.time, Some(hm(10, 30)));
    }

    #[test]
    fn unusable_candidates_fall_back_to_text() {
        let extraction = DateTimeExtractor::new().extract_with_candidates(
            "Follow-up on 01/02/2024 at 8:00",
            &["soon".to_string()],
            &[],
            reference(),
        );
        assert_eq!(extraction.date, Some(ymd(2024, 1, 2)));
        assert_eq!(extraction.time, Some(hm(8, 0)));
    }

    #[test]
    fn keeps_reference_offset() {
        let offset = FixedOffset::east_opt(3600).expect("+01:00");
        let reference = offset
            .with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
            .single()
            .expect("valid reference");
        let extraction = DateTimeExtractor::new().extract("2024-06-10 at 10:00", reference);
        let start = extraction.schedule.expect("schedule").start();
        assert_eq!(start.offset(), &offset);
        assert_eq!(start.naive_utc().time(), hm(9, 0));
    }

    #[test]
    fn horizon_check_uses_calendar_years() {
        let reference = reference();
        let inside = reference + Duration::days(365 * 9);
        let outside = reference + Duration::days(365 * 11);
        assert!(!exceeds_horizon(inside, reference, 10));
        assert!(exceeds_horizon(outside, reference, 10));
    }
}
