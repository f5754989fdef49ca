//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose appointment extraction, calendar encoding and title vocabulary
//!   calls to Dart via FRB.
//! - Convert between epoch milliseconds and core date/time types.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures are reported through `ok=false` envelopes or non-empty strings.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use docscan_core::db::open_db;
use docscan_core::{
    core_version as core_version_inner, format_title as format_title_inner,
    init_logging as init_logging_inner, ping as ping_inner, AppointmentAssembler, CalendarEvent,
    FixedResponse, ParsedAppointment, RawObservation, RemoteError, Schedule, SqliteKeyValueStore,
    TitleVocabulary, TitleVocabularyStore, VocabularyResult,
};
use log::warn;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

const SETTINGS_DB_FILE_NAME: &str = "docscan_settings.sqlite3";
static SETTINGS_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
/// Serializes vocabulary calls; each call opens its own connection.
static VOCABULARY_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Sets the settings database path used by the title vocabulary.
///
/// # FFI contract
/// - First successful call wins; repeating the same path is a no-op.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_storage(db_path: String) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = SETTINGS_DB_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "storage already configured at `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// Appointment extraction envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentResponse {
    pub ok: bool,
    /// Human-readable diagnostics.
    pub message: String,
    pub summary: String,
    /// Epoch milliseconds; `None` when no date or time was found.
    pub start_epoch_ms: Option<i64>,
    /// Always `start_epoch_ms + 3_600_000` when present.
    pub end_epoch_ms: Option<i64>,
    pub location: Option<String>,
    pub description: String,
    /// `local|ai_assisted|degraded`.
    pub mode: String,
    /// `accepted|no_schedule|rejected`.
    pub validation: String,
}

impl AppointmentResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            summary: String::new(),
            start_epoch_ms: None,
            end_epoch_ms: None,
            location: None,
            description: String::new(),
            mode: String::new(),
            validation: String::new(),
        }
    }
}

/// Calendar encoding envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarResponse {
    pub ok: bool,
    pub message: String,
    /// Serialized `.ics` text; empty on failure.
    pub ics: String,
    pub uid: String,
}

/// Title vocabulary envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleWordsResponse {
    pub ok: bool,
    pub message: String,
    pub words: Vec<String>,
}

/// Extracts an appointment from OCR text.
///
/// Input semantics:
/// - `reference_epoch_ms` + `utc_offset_minutes`: the device "now".
/// - `remote_response`: raw `KEY: value` text from a remote extractor.
/// - `remote_error`: message of a failed remote call; takes precedence over
///   `remote_response` and switches to degraded local extraction.
///
/// # FFI contract
/// - Sync call, CPU-only.
/// - Never panics; blank text yields `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn extract_appointment(
    text: String,
    reference_epoch_ms: i64,
    utc_offset_minutes: i32,
    remote_response: Option<String>,
    remote_error: Option<String>,
    title_word: Option<String>,
) -> AppointmentResponse {
    let reference = match reference_instant(reference_epoch_ms, utc_offset_minutes) {
        Ok(reference) => reference,
        Err(message) => return AppointmentResponse::failure(message),
    };

    let remote = match (remote_error, remote_response) {
        (Some(error), _) => Some(FixedResponse::failing(RemoteError::from_message(&error))),
        (None, Some(response)) => Some(FixedResponse::ok(response)),
        (None, None) => None,
    };
    let mut assembler = AppointmentAssembler::default();
    if let Some(remote) = remote {
        assembler = assembler.with_remote(Arc::new(remote));
    }

    let mut observation = RawObservation::new(text, reference);
    if let Some(word) = title_word.filter(|word| !word.trim().is_empty()) {
        observation = observation.with_title_word(word);
    }

    match assembler.assemble(&observation) {
        Ok(outcome) => {
            let appointment = outcome.appointment;
            AppointmentResponse {
                ok: true,
                message: format!("Extracted using {} mode.", outcome.mode.as_str()),
                start_epoch_ms: appointment.start().map(|start| start.timestamp_millis()),
                end_epoch_ms: appointment.end().map(|end| end.timestamp_millis()),
                summary: appointment.summary,
                location: appointment.location,
                description: appointment.description,
                mode: outcome.mode.as_str().to_string(),
                validation: outcome.validation.as_str().to_string(),
            }
        }
        Err(err) => AppointmentResponse::failure(format!("extract_appointment failed: {err}")),
    }
}

/// Encodes an appointment as `.ics` text.
///
/// Without `start_epoch_ms` the event is placed at reference + 1 day, 09:00.
///
/// # FFI contract
/// - Sync call, CPU-only.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn build_calendar_event(
    summary: String,
    start_epoch_ms: Option<i64>,
    location: Option<String>,
    description: String,
    reference_epoch_ms: i64,
    utc_offset_minutes: i32,
) -> CalendarResponse {
    let encode = || -> Result<CalendarEvent, String> {
        let reference = reference_instant(reference_epoch_ms, utc_offset_minutes)?;
        let schedule = match start_epoch_ms {
            Some(start) => Some(Schedule::starting_at(reference_instant(
                start,
                utc_offset_minutes,
            )?)),
            None => None,
        };
        let appointment = ParsedAppointment {
            summary,
            schedule,
            location,
            description,
        };
        Ok(CalendarEvent::from_appointment(&appointment, reference))
    };

    match encode() {
        Ok(event) => CalendarResponse {
            ok: true,
            message: "Calendar event built.".to_string(),
            ics: event.to_ics_string(),
            uid: event.uid.to_string(),
        },
        Err(message) => CalendarResponse {
            ok: false,
            message: format!("build_calendar_event failed: {message}"),
            ics: String::new(),
            uid: String::new(),
        },
    }
}

/// Lists built-in and custom title words, sorted.
#[flutter_rust_bridge::frb(sync)]
pub fn title_words() -> TitleWordsResponse {
    match with_vocabulary(|vocabulary| vocabulary.all_words()) {
        Ok(words) => TitleWordsResponse {
            ok: true,
            message: format!("{} word(s).", words.len()),
            words,
        },
        Err(message) => TitleWordsResponse {
            ok: false,
            message: format!("title_words failed: {message}"),
            words: Vec::new(),
        },
    }
}

/// Adds a custom title word.
///
/// # FFI contract
/// - `ok=true` when the word was added; `ok=false` with a message when it
///   already exists or is invalid.
#[flutter_rust_bridge::frb(sync)]
pub fn add_title_word(word: String) -> TitleWordsResponse {
    match with_vocabulary(|vocabulary| {
        let added = vocabulary.add_word(&word)?;
        Ok((added, vocabulary.all_words()?))
    }) {
        Ok((true, words)) => TitleWordsResponse {
            ok: true,
            message: "Word added.".to_string(),
            words,
        },
        Ok((false, words)) => TitleWordsResponse {
            ok: false,
            message: "Word already exists.".to_string(),
            words,
        },
        Err(message) => {
            warn!("event=ffi_add_title_word module=ffi status=error");
            TitleWordsResponse {
                ok: false,
                message: format!("add_title_word failed: {message}"),
                words: Vec::new(),
            }
        }
    }
}

/// Formats `word - location - time` with long locations abbreviated.
#[flutter_rust_bridge::frb(sync)]
pub fn format_title(word: String, location: Option<String>, time: Option<String>) -> String {
    format_title_inner(&word, location.as_deref(), time.as_deref())
}

fn reference_instant(epoch_ms: i64, utc_offset_minutes: i32) -> Result<DateTime<FixedOffset>, String> {
    let offset = utc_offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| format!("invalid utc offset: {utc_offset_minutes} minutes"))?;
    let instant = Utc
        .timestamp_millis_opt(epoch_ms)
        .single()
        .ok_or_else(|| format!("invalid epoch milliseconds: {epoch_ms}"))?;
    Ok(instant.with_timezone(&offset))
}

fn resolve_settings_db_path() -> PathBuf {
    SETTINGS_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("DOCSCAN_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(SETTINGS_DB_FILE_NAME)
        })
        .clone()
}

fn with_vocabulary<T>(
    f: impl FnOnce(&TitleVocabulary<SqliteKeyValueStore<'_>>) -> VocabularyResult<T>,
) -> Result<T, String> {
    // Guards no data; a poisoned lock is still usable.
    let _guard = VOCABULARY_LOCK
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    let db_path = resolve_settings_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("settings DB open failed: {err}"))?;
    let vocabulary = TitleVocabulary::new(SqliteKeyValueStore::new(&conn));
    f(&vocabulary).map_err(|err| err.to_string())
}
