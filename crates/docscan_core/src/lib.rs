//! Core appointment extraction for DocScan.
//! This crate is the single source of truth for extraction and encoding rules.

pub mod calendar;
pub mod config;
pub mod db;
pub mod extract;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod vocab;

pub use calendar::{
    build_event, parse_ics_timestamp, write_ics_file, CalendarEvent, EventDraft, IcsEncoder,
};
pub use config::{ConfigError, ExtractionConfig, DEFAULT_PRODUCT_ID};
pub use extract::datetime::{DateTimeExtraction, DateTimeExtractor};
pub use extract::location::{LocationExtractor, LocationMatch, LocationStrategy};
pub use extract::remote::{
    parse_remote_response, FixedResponse, RemoteError, RemoteExtractor,
};
pub use extract::summary::{format_title, SummarySource};
pub use extract::{ExtractError, ExtractResult, NOT_FOUND};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::appointment::{ExtractionCandidates, ParsedAppointment, RawObservation, Schedule};
pub use repo::kv_repo::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StoreError, StoreResult,
};
pub use service::assembler::{AppointmentAssembler, AssemblyOutcome, ExtractionMode, Validation};
pub use vocab::{TitleVocabulary, TitleVocabularyStore, VocabularyError, VocabularyResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
