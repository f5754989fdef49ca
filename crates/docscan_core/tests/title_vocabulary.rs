use docscan_core::db::open_db;
use docscan_core::vocab::{CUSTOM_WORDS_KEY, DEFAULT_TITLE_WORDS};
use docscan_core::{
    format_title, KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, TitleVocabulary,
    TitleVocabularyStore, VocabularyError,
};

#[test]
fn builtin_words_are_listed_sorted() {
    let vocabulary = TitleVocabulary::new(MemoryKeyValueStore::new());
    let words = vocabulary.all_words().unwrap();

    assert_eq!(words.len(), DEFAULT_TITLE_WORDS.len());
    assert_eq!(words.first().map(String::as_str), Some("Appointment"));
    assert!(words.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn added_words_are_persisted_comma_joined() {
    let store = MemoryKeyValueStore::new();
    let vocabulary = TitleVocabulary::new(&store);

    assert!(vocabulary.add_word("  ortho").unwrap());
    assert!(vocabulary.add_word("Physio").unwrap());
    assert!(!vocabulary.add_word("CLINIC").unwrap());

    assert_eq!(
        store.get(CUSTOM_WORDS_KEY).unwrap().as_deref(),
        Some("Ortho,Physio")
    );
    assert!(vocabulary
        .all_words()
        .unwrap()
        .contains(&"Ortho".to_string()));
}

#[test]
fn invalid_words_are_rejected_without_saving() {
    let store = MemoryKeyValueStore::new();
    let vocabulary = TitleVocabulary::new(&store);

    assert!(matches!(
        vocabulary.add_word(" "),
        Err(VocabularyError::EmptyWord)
    ));
    assert!(matches!(
        vocabulary.add_word("Otorhinolaryngologist"),
        Err(VocabularyError::WordTooLong { .. })
    ));
    assert_eq!(store.get(CUSTOM_WORDS_KEY).unwrap(), None);
}

#[test]
fn sqlite_vocabulary_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.db");

    {
        let conn = open_db(&path).unwrap();
        let vocabulary = TitleVocabulary::new(SqliteKeyValueStore::new(&conn));
        assert!(vocabulary.add_word("podiatry").unwrap());
    }

    let conn = open_db(&path).unwrap();
    let vocabulary = TitleVocabulary::new(SqliteKeyValueStore::new(&conn));
    assert_eq!(vocabulary.custom_words().unwrap(), vec!["Podiatry"]);
    assert!(!vocabulary.add_word("PODIATRY").unwrap());
}

#[test]
fn concurrent_additions_are_not_lost() {
    let store = MemoryKeyValueStore::new();
    let vocabulary = TitleVocabulary::new(&store);

    std::thread::scope(|scope| {
        for index in 0..8 {
            let vocabulary = &vocabulary;
            scope.spawn(move || {
                vocabulary.add_word(&format!("Word{index}")).unwrap();
            });
        }
    });

    assert_eq!(vocabulary.custom_words().unwrap().len(), 8);
    let persisted = store.get(CUSTOM_WORDS_KEY).unwrap().unwrap();
    assert_eq!(persisted.split(',').count(), 8);
}

#[test]
fn chosen_word_formats_title() {
    assert_eq!(
        format_title("Dental", Some("General Hospital, London"), Some("2:30 PM")),
        "Dental - GHL... - 2:30 PM"
    );
}
