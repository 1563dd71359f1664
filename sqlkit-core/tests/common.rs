//! Common test utilities shared across integration tests.

#![allow(dead_code, missing_docs)]

use std::path::{Path, PathBuf};

use sqlkit_core::{RegisterOptions, SqlKit};
use tempfile::TempDir;

/// A scratch directory holding one database file.
pub struct Scratch {
    _dir: TempDir,
    pub path: PathBuf,
}

impl Scratch {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Creates a database file seeded through the independent `rusqlite` API.
pub fn seeded_database() -> Scratch {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("players.sqlite");
    let conn = rusqlite::Connection::open(&path).expect("open seed connection");
    conn.execute_batch(
        "CREATE TABLE players (
             id INTEGER PRIMARY KEY,
             name TEXT NOT NULL,
             level INTEGER NOT NULL,
             ratio REAL,
             avatar BLOB
         );
         INSERT INTO players (name, level, ratio, avatar) VALUES ('ada', 12, 0.75, x'0102');
         INSERT INTO players (name, level, ratio, avatar) VALUES ('bob', 3, NULL, NULL);
         INSERT INTO players (name, level, ratio, avatar) VALUES ('cyd', 7, 1.25, NULL);",
    )
    .expect("seed");
    Scratch { _dir: dir, path }
}

/// Registers a freshly seeded database under `name`.
pub fn registered(name: &str, keep_open: bool) -> (SqlKit, Scratch) {
    let scratch = seeded_database();
    let mut kit = SqlKit::new();
    assert!(kit.register(
        name,
        scratch.path(),
        RegisterOptions::new().keep_open(keep_open)
    ));
    (kit, scratch)
}

/// Counts rows of `table` through `rusqlite`, bypassing sqlkit.
pub fn count_rows(path: &Path, table: &str) -> i64 {
    let conn = rusqlite::Connection::open(path).expect("open inspect connection");
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })
    .expect("count rows")
}
