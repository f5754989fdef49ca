//! DocScan command-line entry point.
//!
//! # Responsibility
//! - Run the appointment pipeline over a text file or stdin.
//! - Optionally write the result as an `.ics` file.
//! - Manage custom title words in a local settings database.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, FixedOffset, Local};
use clap::{Args, Parser, Subcommand};
use docscan_core::db::open_db;
use docscan_core::{
    core_version, default_log_level, init_logging, write_ics_file, AppointmentAssembler,
    EventDraft, ExtractionConfig, FixedResponse, IcsEncoder, RawObservation, RemoteError,
    SqliteKeyValueStore, TitleVocabulary, TitleVocabularyStore,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "docscan", version, about = "Extract appointments from scanned text")]
struct Cli {
    /// Absolute directory for rolling log files. Logging is off when omitted.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract one appointment.
    Extract(ExtractArgs),
    /// List built-in and custom title words.
    Words {
        #[arg(long, default_value = "docscan_settings.sqlite3")]
        db: PathBuf,
    },
    /// Add a custom title word.
    AddWord {
        word: String,
        #[arg(long, default_value = "docscan_settings.sqlite3")]
        db: PathBuf,
    },
    /// Print the core version.
    Version,
}

#[derive(Args)]
struct ExtractArgs {
    /// Text file to read; stdin when omitted.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Reference instant (RFC 3339). Defaults to now.
    #[arg(long)]
    reference: Option<String>,

    /// Vocabulary word used as the title prefix.
    #[arg(long)]
    title_word: Option<String>,

    /// File holding a recorded remote extractor response.
    #[arg(long, conflicts_with = "remote_error")]
    remote_response: Option<PathBuf>,

    /// Simulate a failed remote extractor with this message.
    #[arg(long)]
    remote_error: Option<String>,

    /// JSON file overriding extraction settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the event to this `.ics` path.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli
            .log_level
            .clone()
            .unwrap_or_else(|| default_log_level().to_string());
        init_logging(&level, &log_dir.to_string_lossy())
            .with_context(|| format!("failed to start logging in {}", log_dir.display()))?;
    }

    match cli.command {
        Command::Extract(args) => run_extract(args),
        Command::Words { db } => {
            with_vocabulary(&db, |vocabulary| {
                for word in vocabulary.all_words()? {
                    println!("{word}");
                }
                Ok(())
            })
        }
        Command::AddWord { word, db } => with_vocabulary(&db, |vocabulary| {
            if vocabulary.add_word(&word)? {
                println!("added");
            } else {
                println!("exists");
            }
            Ok(())
        }),
        Command::Version => {
            println!("docscan_core version={}", core_version());
            Ok(())
        }
    }
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    let config = match args.config.as_deref() {
        Some(path) => load_config(path)?,
        None => ExtractionConfig::default(),
    };
    let reference = match args.reference.as_deref() {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("invalid --reference `{raw}`"))?,
        None => Local::now().fixed_offset(),
    };
    let text = read_input(args.input.as_deref())?;

    let mut assembler = AppointmentAssembler::new(config.clone())?;
    if let Some(message) = args.remote_error {
        assembler = assembler.with_remote(Arc::new(FixedResponse::failing(
            RemoteError::from_message(&message),
        )));
    } else if let Some(path) = args.remote_response.as_deref() {
        let response = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        assembler = assembler.with_remote(Arc::new(FixedResponse::ok(response)));
    }

    let mut observation = RawObservation::new(text, reference);
    if let Some(word) = args.title_word {
        observation = observation.with_title_word(word);
    }
    let outcome = assembler.assemble(&observation)?;
    let appointment = &outcome.appointment;

    println!("summary={}", appointment.summary);
    match appointment.schedule {
        Some(schedule) => {
            println!("start={}", schedule.start().to_rfc3339());
            println!("end={}", schedule.end().to_rfc3339());
        }
        None => println!("start=none"),
    }
    println!(
        "location={}",
        appointment.location.as_deref().unwrap_or("none")
    );
    println!("mode={}", outcome.mode.as_str());
    println!("validation={}", outcome.validation.as_str());

    if let Some(path) = args.output.as_deref() {
        let draft = EventDraft::from_appointment(appointment, reference, config.default_start_hour);
        let event = IcsEncoder::new(config.product_id).encode(&draft);
        write_ics_file(path, &event)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("ics={} uid={}", path.display(), event.uid);
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<ExtractionConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: ExtractionConfig = serde_json::from_str(&raw)
        .with_context(|| format!("invalid config in {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
    };
    if text.trim().is_empty() {
        bail!("input text is empty");
    }
    Ok(text)
}

fn with_vocabulary(
    db: &Path,
    f: impl FnOnce(&TitleVocabulary<SqliteKeyValueStore<'_>>) -> Result<()>,
) -> Result<()> {
    let conn = open_db(db).with_context(|| format!("failed to open {}", db.display()))?;
    f(&TitleVocabulary::new(SqliteKeyValueStore::new(&conn)))
}
