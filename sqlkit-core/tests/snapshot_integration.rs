//! Integration tests for database snapshots.

mod common;

use sqlkit_core::{DecodedValue, RegisterOptions, SqlKit};
use test_case::test_case;

#[test_case(false ; "transient")]
#[test_case(true ; "kept open")]
fn test_restore_of_dump_keeps_tables(keep_open: bool) {
    let (mut kit, scratch) = common::registered("game", keep_open);
    assert!(kit.create_table("game", "scores", &["points INTEGER"], "").created);
    let tables = ["players", "scores"];
    let before: Vec<bool> = tables.iter().map(|t| kit.table_exists("game", t)).collect();

    let image = kit.dump("game");
    assert!(!image.is_empty());
    assert!(kit.restore("game", &image));
    assert!(kit.registry().has_kept_open("game"));

    let after: Vec<bool> = tables.iter().map(|t| kit.table_exists("game", t)).collect();
    assert_eq!(before, after);
    assert_eq!(common::count_rows(scratch.path(), "players"), 3);
}

#[test]
fn test_restore_into_other_database_is_read_only() {
    let (source, _scratch) = common::registered("source", false);
    let image = source.dump("source");
    assert!(!image.is_empty());

    let dir = tempfile::tempdir().expect("tempdir");
    let empty = dir.path().join("empty.sqlite");
    assert!(SqlKit::create(&empty));

    let mut target = SqlKit::new();
    assert!(target.register("copy", &empty, RegisterOptions::default()));
    assert!(!target.table_exists("copy", "players"));
    assert!(target.restore("copy", &image));
    drop(image);

    let outcome = target.query("copy", "SELECT name FROM players ORDER BY id");
    assert!(outcome.success());
    assert_eq!(outcome.rows().len(), 3);
    assert_eq!(
        outcome.rows()[2].get("name"),
        Some(&DecodedValue::Text("cyd".to_string()))
    );

    assert!(!target.exec("copy", "INSERT INTO players (name, level) VALUES ('eve', 1)"));
    assert_eq!(target.query("copy", "SELECT * FROM players").rows().len(), 3);

    // The file on disk is untouched.
    let conn = rusqlite::Connection::open(&empty).expect("open");
    let tables: i64 = conn
        .query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get(0))
        .expect("count");
    assert_eq!(tables, 0);
}

#[test]
fn test_unregistered_snapshots_fail() {
    let mut kit = SqlKit::new();
    assert!(kit.dump("ghost").is_empty());
    assert!(!kit.restore("ghost", &[1, 2, 3]));
    assert!(kit.try_dump("ghost").is_err());
}

#[test]
fn test_unregister_drops_restored_image() {
    let (mut kit, scratch) = common::registered("game", false);
    let image = kit.dump("game");
    assert!(kit.exec("game", "DELETE FROM players"));
    assert!(kit.restore("game", &image));
    assert_eq!(kit.query("game", "SELECT * FROM players").rows().len(), 3);

    kit.unregister("game");
    assert!(kit.register("game", scratch.path(), RegisterOptions::default()));
    assert!(kit.query("game", "SELECT * FROM players").rows().is_empty());
}
