//! Integration tests for `SqlKit` registration and queries.

mod common;

use sqlkit_core::{
    projectable, DecodedValue, FieldKind, QueryDescriptor, RegisterOptions, RowField, SqlKit,
    SqlKitError,
};
use test_case::test_case;

#[derive(Debug, Default)]
struct Named {
    name: String,
}

#[derive(Debug, Default)]
struct Player {
    id: i64,
    level: i32,
    ratio: f64,
    nickname: String,
    base: Named,
}

#[derive(Debug, Default)]
struct Nothing {}

projectable!(Named { name });
projectable!(Player { id, level, ratio, nickname as "alias" } extends base);
projectable!(Nothing {});

#[test]
fn test_register_twice_keeps_one_entry() {
    let (mut kit, scratch) = common::registered("game", false);
    let other = common::seeded_database();
    assert!(kit.register("game", other.path(), RegisterOptions::default()));
    assert_eq!(kit.registry().names().count(), 1);
    assert_eq!(kit.registry().path("game"), Some(scratch.path()));
}

#[test]
fn test_register_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("missing.sqlite");
    let mut kit = SqlKit::new();

    assert!(!kit.register("game", &missing, RegisterOptions::default()));
    assert!(!kit.is_registered("game"));
    assert!(!SqlKit::validate(&missing, false));

    assert!(SqlKit::create(&missing));
    assert!(SqlKit::validate(&missing, true));
    assert!(kit.register("game", &missing, RegisterOptions::default()));
}

#[test]
fn test_unregister_unknown_is_noop() {
    let (mut kit, _scratch) = common::registered("game", true);
    kit.unregister("other");
    assert!(kit.is_registered("game"));
    kit.unregister("game");
    assert!(!kit.is_registered("game"));
    kit.unregister("game");
}

#[test]
fn test_unregistered_name_fails() {
    let kit = SqlKit::new();
    assert!(!kit.exec("ghost", "SELECT 1"));
    let outcome = kit.query("ghost", "SELECT 1");
    assert!(!outcome.success());
    assert_eq!(
        outcome.error_message(),
        Some("database 'ghost' is not registered")
    );
    assert!(matches!(
        kit.try_query("ghost", "SELECT 1"),
        Err(SqlKitError::NotRegistered(_))
    ));
}

#[test_case(false ; "transient")]
#[test_case(true ; "kept open")]
fn test_query_decodes_rows(keep_open: bool) {
    let (kit, _scratch) = common::registered("game", keep_open);
    assert_eq!(kit.registry().has_kept_open("game"), keep_open);

    let outcome = kit.query("game", "SELECT * FROM players ORDER BY id");
    assert!(outcome.success(), "{:?}", outcome.error_message());
    assert_eq!(outcome.rows().len(), 3);

    let ada = &outcome.rows()[0];
    assert_eq!(ada.get("name"), Some(&DecodedValue::Text("ada".to_string())));
    assert_eq!(ada.get("level"), Some(&DecodedValue::Integer(12)));
    assert_eq!(ada.get("ratio"), Some(&DecodedValue::Float(0.75)));
    assert_eq!(ada.get("avatar"), None);

    let bob = &outcome.rows()[1];
    assert_eq!(bob.len(), 3);
    assert!(bob
        .fields()
        .iter()
        .all(|field| field.value != DecodedValue::Unsupported));
}

#[test_case(false ; "transient")]
#[test_case(true ; "kept open")]
fn test_writes_are_visible_to_other_connections(keep_open: bool) {
    let (kit, scratch) = common::registered("game", keep_open);
    let outcome = kit.query("game", "INSERT INTO players (name, level) VALUES ('dee', 1)");
    assert!(outcome.success());
    assert_eq!(outcome.last_inserted_id(), 4);
    assert_eq!(common::count_rows(scratch.path(), "players"), 4);
}

#[test]
fn test_query_error_reports_sql() {
    let (kit, _scratch) = common::registered("game", false);
    let outcome = kit.query("game", "SELECT nope FROM players");
    assert!(!outcome.success());
    let message = outcome.error_message().expect("error message");
    assert!(message.contains("no such column: nope"), "{message}");
    assert!(message.contains("SELECT nope FROM players"), "{message}");
    assert!(outcome.rows().is_empty());
}

#[test]
fn test_select_descriptor() {
    let (kit, _scratch) = common::registered("game", false);
    let descriptor = QueryDescriptor::new(["players"], ["name", "level"])
        .filter("level > 5")
        .limit(1)
        .offset(1);
    let outcome = kit.select("game", &descriptor);
    assert!(outcome.success());
    assert_eq!(outcome.rows().len(), 1);
    assert_eq!(
        outcome.rows()[0].to_string_pairs(),
        vec![
            ("name".to_string(), "cyd".to_string()),
            ("level".to_string(), "7".to_string()),
        ]
    );

    let empty = kit.select("game", &QueryDescriptor::new(Vec::<String>::new(), ["*"]));
    assert!(!empty.success());
    assert_eq!(empty.error_message(), Some("empty input: no table given"));
}

#[test]
fn test_insert_rows_attempts_every_row() {
    let (kit, scratch) = common::registered("game", false);
    let rows = vec![
        vec![RowField::text("name", "it's"), RowField::literal("level", "1")],
        vec![RowField::text("name", "bad"), RowField::literal("missing", "1")],
        vec![
            RowField::text("name", "eve"),
            RowField::new("level", "2", FieldKind::from_type_name("integer")),
            RowField::new("ratio", "0.5", FieldKind::Real),
        ],
    ];
    assert!(!kit.insert_rows("game", "players", &rows));
    assert_eq!(common::count_rows(scratch.path(), "players"), 5);

    let outcome = kit.query("game", "SELECT name FROM players WHERE level = 1");
    assert_eq!(
        outcome.first_row().and_then(|row| row.get("name")),
        Some(&DecodedValue::Text("it's".to_string()))
    );
}

#[test]
fn test_update_and_delete_require_filter() {
    let (kit, scratch) = common::registered("game", false);
    let rows = [vec![RowField::literal("level", "99")]];

    assert!(!kit.update_rows("game", "players", &rows, "", -1, 0));
    assert!(matches!(
        kit.try_delete_rows("game", "players", ""),
        Err(SqlKitError::MissingFilter)
    ));
    assert!(!kit.delete_rows("game", "players", ""));
    assert_eq!(common::count_rows(scratch.path(), "players"), 3);
    let untouched = kit.query("game", "SELECT COUNT(*) AS n FROM players WHERE level = 99");
    assert_eq!(untouched.rows()[0].get("n"), Some(&DecodedValue::Integer(0)));

    assert!(kit.update_rows("game", "players", &rows, "name = 'bob'", -1, 0));
    let updated = kit.query("game", "SELECT level FROM players WHERE name = 'bob'");
    assert_eq!(updated.rows()[0].get("level"), Some(&DecodedValue::Integer(99)));

    assert!(kit.delete_rows("game", "players", "level = 99"));
    assert_eq!(common::count_rows(scratch.path(), "players"), 2);
}

#[test]
fn test_table_lifecycle() {
    let (kit, _scratch) = common::registered("game", true);
    assert!(!kit.table_exists("game", "scores"));

    let handle = kit.create_table(
        "game",
        "scores",
        &["id INTEGER", "player TEXT", "points INTEGER"],
        "PRIMARY KEY(id)",
    );
    assert!(handle.created);
    assert_eq!(handle.table, "scores");
    assert!(kit.table_exists("game", "scores"));

    assert!(kit.create_index(
        "game",
        "scores",
        "CREATE INDEX idx_$$$TABLE_NAME$$$_player ON $$$TABLE_NAME$$$(player)"
    ));
    assert!(!kit.create_indexes(
        "game",
        "scores",
        &[
            "",
            "CREATE INDEX idx_$$$TABLE_NAME$$$_points ON $$$TABLE_NAME$$$(points)",
            "CREATE INDEX broken ON $$$TABLE_NAME$$$(no_such_column)",
            "CREATE INDEX idx_never ON $$$TABLE_NAME$$$(points, player)",
        ],
    ));
    let indexes = kit.query(
        "game",
        "SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = 'scores' ORDER BY name",
    );
    let names: Vec<String> = indexes
        .rows()
        .iter()
        .filter_map(|row| row.get("name").and_then(DecodedValue::as_str).map(str::to_string))
        .collect();
    assert_eq!(names, ["idx_scores_player", "idx_scores_points"]);
    assert!(kit.drop_index("game", "idx_scores_points"));

    assert!(kit.insert_rows(
        "game",
        "scores",
        &[[RowField::literal("id", "1"), RowField::text("player", "ada")]],
    ));
    assert!(kit.truncate_table("game", "scores"));
    assert!(kit.query("game", "SELECT * FROM scores").rows().is_empty());
    assert!(kit.vacuum("game"));

    assert!(kit.drop_table("game", "scores"));
    assert!(!kit.table_exists("game", "scores"));
    assert!(!kit.drop_table("game", "scores"));
}

#[test]
fn test_create_table_without_fields() {
    let (kit, _scratch) = common::registered("game", false);
    let handle = kit.create_table::<&str>("game", "empty", &[], "");
    assert!(!handle.created);
    assert!(!kit.table_exists("game", "empty"));
}

#[test]
fn test_query_into_projects_first_row_only() {
    let (kit, _scratch) = common::registered("game", false);
    let mut player = Player {
        nickname: "unchanged".to_string(),
        ..Player::default()
    };
    assert!(kit.query_into(
        "game",
        "SELECT id, name, level, ratio FROM players ORDER BY level DESC",
        &mut player,
    ));
    assert_eq!(player.id, 1);
    assert_eq!(player.base.name, "ada");
    assert_eq!(player.level, 12);
    assert!((player.ratio - 0.75).abs() < f64::EPSILON);
    assert_eq!(player.nickname, "unchanged");
}

#[test]
fn test_select_into_uses_single_row() {
    let (kit, _scratch) = common::registered("game", true);
    let mut player = Player::default();
    let descriptor = QueryDescriptor::new(["players"], ["id", "name AS alias"])
        .filter("level < 10")
        .limit(50)
        .offset(7);
    assert!(kit.select_into("game", &descriptor, &mut player));
    assert_eq!(player.id, 2);
    assert_eq!(player.nickname, "bob");
    assert!(player.base.name.is_empty());
}

#[test]
fn test_projection_failures() {
    let (kit, _scratch) = common::registered("game", false);
    let mut player = Player::default();
    assert!(matches!(
        kit.try_query_into("game", "SELECT * FROM players WHERE id = 42", &mut player),
        Err(SqlKitError::EmptyResultSet)
    ));
    assert!(matches!(
        kit.try_query_into("game", "SELECT * FROM players", &mut Nothing {}),
        Err(SqlKitError::NoTargetObject)
    ));
    assert!(!kit.query_into("game", "SELECT * FROM nowhere", &mut player));
    assert_eq!(player.id, 0);
}
