use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use docscan_core::{
    AppointmentAssembler, ExtractError, ExtractionMode, LocationStrategy, RawObservation,
    SummarySource, Validation,
};

fn reference() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 1, 15, 10, 0, 0)
        .unwrap()
}

fn assemble(text: &str) -> docscan_core::AssemblyOutcome {
    AppointmentAssembler::default()
        .assemble(&RawObservation::new(text, reference()))
        .unwrap()
}

fn ymd_hm(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> (NaiveDate, NaiveTime) {
    (
        NaiveDate::from_ymd_opt(year, month, day).unwrap(),
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap(),
    )
}

fn start_of(outcome: &docscan_core::AssemblyOutcome) -> (NaiveDate, NaiveTime) {
    let start = outcome.appointment.start().expect("start present");
    (start.date_naive(), start.time())
}

#[test]
fn full_sentence_yields_date_time_and_summary() {
    let text = "Doctor appointment on March 15, 2024 at 2:30 PM";
    let outcome = assemble(text);

    assert_eq!(outcome.appointment.summary, text);
    assert_eq!(start_of(&outcome), ymd_hm(2024, 3, 15, 14, 30));
    let end = outcome.appointment.end().expect("end present");
    assert_eq!(end.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    assert_eq!(end.time(), NaiveTime::from_hms_opt(15, 30, 0).unwrap());
    assert_eq!(outcome.validation, Validation::Accepted);
    assert_eq!(outcome.mode, ExtractionMode::Local);
}

#[test]
fn keyword_location_takes_rest_of_line() {
    let outcome = assemble("Meeting at Room 205 on 12/20/2024 at 9 AM");

    assert_eq!(
        outcome.appointment.location.as_deref(),
        Some("Room 205 on 12/20/2024 at 9 AM")
    );
    assert_eq!(outcome.location_strategy, Some(LocationStrategy::Keyword));
    assert_eq!(start_of(&outcome), ymd_hm(2024, 12, 20, 9, 0));
}

#[test]
fn multiline_letter_is_parsed_field_by_field() {
    let outcome =
        assemble("Doctor Appointment\nMarch 20, 2024\n3:00 PM\nat Medical Center\nRoom 305");

    assert_eq!(outcome.appointment.summary, "Doctor Appointment");
    assert_eq!(outcome.summary_source, SummarySource::KeywordLine);
    assert_eq!(outcome.appointment.location.as_deref(), Some("Medical Center"));
    assert_eq!(start_of(&outcome), ymd_hm(2024, 3, 20, 15, 0));
}

#[test]
fn supported_date_shapes_resolve_to_expected_days() {
    let cases = [
        ("Meeting on 03/15/2024", ymd_hm(2024, 3, 15, 9, 0)),
        ("Visit on 2024-12-25", ymd_hm(2024, 12, 25, 9, 0)),
        ("Call on Dec 31, 2024", ymd_hm(2024, 12, 31, 9, 0)),
        ("Session on 15 Jan 2025", ymd_hm(2025, 1, 15, 9, 0)),
        ("Review Tuesday 12th March", ymd_hm(2024, 3, 12, 9, 0)),
    ];
    for (text, expected) in cases {
        assert_eq!(start_of(&assemble(text)), expected, "text: {text}");
    }
}

#[test]
fn meridiem_edges_map_to_midnight_and_noon() {
    let cases = [
        ("Meeting on 03/15/2024 at 12:00 AM", ymd_hm(2024, 3, 15, 0, 0)),
        ("Meeting on 03/15/2024 at 12:00 PM", ymd_hm(2024, 3, 15, 12, 0)),
        ("Meeting on 03/15/2024 at 12:30 AM", ymd_hm(2024, 3, 15, 0, 30)),
        ("Meeting on 03/15/2024 at 8:00 am", ymd_hm(2024, 3, 15, 8, 0)),
        ("Meeting on 03/15/2024 at 15:45", ymd_hm(2024, 3, 15, 15, 45)),
    ];
    for (text, expected) in cases {
        assert_eq!(start_of(&assemble(text)), expected, "text: {text}");
    }
}

#[test]
fn time_only_lands_on_the_next_day() {
    let outcome = assemble("Appointment at 3:45 PM");
    assert_eq!(start_of(&outcome), ymd_hm(2024, 1, 16, 15, 45));
}

#[test]
fn text_without_details_has_no_schedule() {
    let text = "Some random text with no appointment info";
    let outcome = assemble(text);

    assert_eq!(outcome.appointment.start(), None);
    assert_eq!(outcome.appointment.end(), None);
    assert_eq!(outcome.appointment.location, None);
    assert_eq!(outcome.validation, Validation::NoSchedule);
    assert!(outcome.appointment.description.contains(text));
    assert!(outcome.appointment.description.contains("Location: Not found"));
}

#[test]
fn far_future_start_is_replaced() {
    let outcome = assemble("Meeting on 12/20/2040");

    match outcome.validation {
        Validation::Rejected { parsed_start } => {
            assert_eq!(
                parsed_start.date_naive(),
                NaiveDate::from_ymd_opt(2040, 12, 20).unwrap()
            );
        }
        other => panic!("unexpected validation: {other:?}"),
    }
    assert_eq!(start_of(&outcome), ymd_hm(2024, 1, 16, 9, 0));
    assert!(outcome.appointment.description.contains("too far ahead"));
}

#[test]
fn day_overflow_clamps_to_last_day_of_month() {
    let outcome = assemble("Surgery on 31 Feb 2024");
    assert_eq!(start_of(&outcome), ymd_hm(2024, 2, 29, 9, 0));

    let outcome = assemble("Checkup 04/31/2024 at 10:15");
    assert_eq!(start_of(&outcome), ymd_hm(2024, 4, 30, 10, 15));
}

#[test]
fn round_the_clock_helpline_is_not_a_date() {
    let outcome = assemble("Review 24/7 helpline\nCall 0800 123 456");
    assert_eq!(outcome.appointment.schedule, None);
    assert_eq!(outcome.validation, Validation::NoSchedule);
}

#[test]
fn ordinal_floor_keeps_keyword_line_title() {
    let text = "Physio session Ward B4 2nd floor on 3 April 2024 at 11am";
    let outcome = assemble(text);

    assert_ne!(outcome.location_strategy, Some(LocationStrategy::Postcode));
    assert_eq!(outcome.summary_source, SummarySource::KeywordLine);
    assert_eq!(outcome.appointment.summary, text);
    assert_eq!(start_of(&outcome), ymd_hm(2024, 4, 3, 11, 0));
}

#[test]
fn postcode_venue_becomes_acronym_summary() {
    let outcome = assemble("St Thomas Hospital, SE1 7EH\n15/03/2024 10:30");

    assert_eq!(
        outcome.appointment.location.as_deref(),
        Some("St Thomas Hospital SE1 7EH")
    );
    assert_eq!(outcome.appointment.summary, "STH - 10:30");
    assert_eq!(outcome.summary_source, SummarySource::VenueAcronym);
    assert_eq!(start_of(&outcome), ymd_hm(2024, 3, 15, 10, 30));
}

#[test]
fn title_word_drives_summary() {
    let observation =
        RawObservation::new("Dental check at Smile Clinic\n03/15/2024 2:30 PM", reference())
            .with_title_word("Dental");
    let outcome = AppointmentAssembler::default()
        .assemble(&observation)
        .unwrap();

    assert_eq!(outcome.appointment.summary, "Dental - Smile Clinic - 2:30 PM");
    assert_eq!(outcome.summary_source, SummarySource::TitleWord);
}

#[test]
fn start_keeps_reference_offset() {
    let offset = FixedOffset::west_opt(5 * 3600).unwrap();
    let reference = offset.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    let outcome = AppointmentAssembler::default()
        .assemble(&RawObservation::new("Consultation 2024-06-03 at 4 PM", reference))
        .unwrap();

    let start = outcome.appointment.start().unwrap();
    assert_eq!(start.offset(), &offset);
    assert_eq!(start.to_rfc3339(), "2024-06-03T16:00:00-05:00");
    assert_eq!(
        outcome.appointment.end().unwrap() - start,
        Duration::hours(1)
    );
}

#[test]
fn repeated_runs_are_identical() {
    let text = "Follow-up visit\n5th April 2024 11:15\nat Northgate Health Centre";
    assert_eq!(assemble(text), assemble(text));
}

#[test]
fn blank_input_is_reported() {
    let err = AppointmentAssembler::default()
        .assemble(&RawObservation::new("   \n", reference()))
        .unwrap_err();
    assert_eq!(err, ExtractError::NoInput);
}
