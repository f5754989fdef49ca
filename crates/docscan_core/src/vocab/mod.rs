//! Title vocabulary.
//!
//! # Responsibility
//! - Provide the words offered when a user picks an appointment title.
//! - Persist user-added words through an injected key-value store.
//!
//! # Invariants
//! - Words are unique case-insensitively across built-in and custom sets.
//! - Custom words are non-empty, comma-free and at most 20 characters.
//! - Custom words load on first access; every successful addition is saved
//!   before the in-memory set changes.
//! - Additions are serialized, so concurrent adds never lose a word.

use crate::repo::kv_repo::{KeyValueStore, StoreError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;

/// Store key holding the comma-joined custom words.
pub const CUSTOM_WORDS_KEY: &str = "custom_words";
pub const MAX_WORD_CHARS: usize = 20;

pub const DEFAULT_TITLE_WORDS: &[&str] = &[
    "Medical",
    "Dental",
    "Hospital",
    "Clinic",
    "Checkup",
    "Surgery",
    "Appointment",
    "Consultation",
    "Treatment",
    "Visit",
    "Therapy",
    "Screening",
    "Follow-up",
    "Emergency",
    "Specialist",
];

pub type VocabularyResult<T> = Result<T, VocabularyError>;

#[derive(Debug)]
pub enum VocabularyError {
    EmptyWord,
    WordTooLong { chars: usize, max: usize },
    /// Commas separate words in persisted form.
    ContainsComma,
    Storage(StoreError),
}

impl Display for VocabularyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyWord => write!(f, "title word cannot be empty"),
            Self::WordTooLong { chars, max } => {
                write!(f, "title word has {chars} characters; maximum is {max}")
            }
            Self::ContainsComma => write!(f, "title word cannot contain a comma"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for VocabularyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for VocabularyError {
    fn from(value: StoreError) -> Self {
        Self::Storage(value)
    }
}

/// Interface the title picker depends on.
pub trait TitleVocabularyStore {
    /// Built-in and custom words, sorted.
    fn all_words(&self) -> VocabularyResult<Vec<String>>;
    /// Adds a custom word. `Ok(false)` when it already exists.
    fn add_word(&self, word: &str) -> VocabularyResult<bool>;
}

/// Vocabulary backed by a [`KeyValueStore`].
pub struct TitleVocabulary<S: KeyValueStore> {
    store: S,
    custom: Mutex<Option<Vec<String>>>,
}

impl<S: KeyValueStore> TitleVocabulary<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            custom: Mutex::new(None),
        }
    }

    /// Custom words in insertion order.
    pub fn custom_words(&self) -> VocabularyResult<Vec<String>> {
        let mut cache = self.lock()?;
        Ok(self.loaded(&mut cache)?.clone())
    }

    fn lock(&self) -> VocabularyResult<std::sync::MutexGuard<'_, Option<Vec<String>>>> {
        self.custom
            .lock()
            .map_err(|_| VocabularyError::Storage(StoreError::LockPoisoned))
    }

    fn loaded<'a>(
        &self,
        cache: &'a mut Option<Vec<String>>,
    ) -> VocabularyResult<&'a mut Vec<String>> {
        if cache.is_none() {
            let stored = self.store.get(CUSTOM_WORDS_KEY)?;
            let words = stored.as_deref().map(split_stored).unwrap_or_default();
            info!(
                "event=vocab_load module=vocab status=ok custom_words={}",
                words.len()
            );
            *cache = Some(words);
        }
        Ok(cache.get_or_insert_with(Vec::new))
    }
}

impl<S: KeyValueStore> TitleVocabularyStore for TitleVocabulary<S> {
    fn all_words(&self) -> VocabularyResult<Vec<String>> {
        let mut cache = self.lock()?;
        let custom = self.loaded(&mut cache)?;
        let mut words: Vec<String> = DEFAULT_TITLE_WORDS
            .iter()
            .map(|word| (*word).to_string())
            .chain(custom.iter().cloned())
            .collect();
        words.sort();
        Ok(words)
    }

    fn add_word(&self, word: &str) -> VocabularyResult<bool> {
        let word = normalize_word(word)?;

        let mut cache = self.lock()?;
        let custom = self.loaded(&mut cache)?;
        let exists = DEFAULT_TITLE_WORDS
            .iter()
            .copied()
            .chain(custom.iter().map(String::as_str))
            .any(|existing| existing.to_lowercase() == word.to_lowercase());
        if exists {
            return Ok(false);
        }

        let mut updated = custom.clone();
        updated.push(word);
        if let Err(err) = self.store.put(CUSTOM_WORDS_KEY, &updated.join(",")) {
            warn!("event=vocab_add module=vocab status=error error={err}");
            return Err(err.into());
        }
        *custom = updated;
        info!(
            "event=vocab_add module=vocab status=ok custom_words={}",
            custom.len()
        );
        Ok(true)
    }
}

/// Trims, uppercases the first character and checks length/separators.
pub fn normalize_word(word: &str) -> VocabularyResult<String> {
    let trimmed = word.trim();
    let mut chars = trimmed.chars();
    let Some(first) = chars.next() else {
        return Err(VocabularyError::EmptyWord);
    };
    let normalized: String = first.to_uppercase().chain(chars).collect();

    let count = normalized.chars().count();
    if count > MAX_WORD_CHARS {
        return Err(VocabularyError::WordTooLong {
            chars: count,
            max: MAX_WORD_CHARS,
        });
    }
    if normalized.contains(',') {
        return Err(VocabularyError::ContainsComma);
    }
    Ok(normalized)
}

fn split_stored(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}
