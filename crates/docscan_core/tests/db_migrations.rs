use docscan_core::db::migrations::latest_version;
use docscan_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

fn user_version(conn: &Connection) -> u32 {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .expect("read user_version")
}

#[test]
fn fresh_database_gets_settings_table() {
    let conn = open_db_in_memory().expect("open in-memory settings db");
    assert_eq!(user_version(&conn), latest_version());

    let columns: Vec<String> = conn
        .prepare("SELECT name FROM pragma_table_info('settings') ORDER BY cid;")
        .expect("prepare table_info")
        .query_map([], |row| row.get(0))
        .expect("query table_info")
        .collect::<Result<_, _>>()
        .expect("collect columns");
    assert_eq!(columns, vec!["key", "value", "updated_at"]);
}

#[test]
fn reopening_keeps_rows_and_version() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("settings.sqlite3");

    {
        let conn = open_db(&path).expect("first open");
        conn.execute(
            "INSERT INTO settings (key, value) VALUES ('custom_words', 'Ortho');",
            [],
        )
        .expect("insert row");
    }

    let conn = open_db(&path).expect("second open");
    assert_eq!(user_version(&conn), latest_version());
    let value: String = conn
        .query_row(
            "SELECT value FROM settings WHERE key = 'custom_words';",
            [],
            |row| row.get(0),
        )
        .expect("row survives reopen");
    assert_eq!(value, "Ortho");
}

#[test]
fn database_from_newer_build_is_refused() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("newer.sqlite3");
    Connection::open(&path)
        .and_then(|conn| conn.pragma_update(None, "user_version", 42))
        .expect("stamp future version");

    let err = open_db(&path).expect_err("newer schema must be refused");
    assert!(
        matches!(
            err,
            DbError::UnsupportedSchemaVersion { db_version: 42, latest_supported } if latest_supported == latest_version()
        ),
        "unexpected error: {err}"
    );
}
