//! SQL text assembled from structured descriptors.
//!
//! Table, field, index and filter fragments are pre-rendered SQL and are
//! emitted verbatim; only row values get quoted according to their
//! [`FieldKind`].

use serde::Deserialize;
use strum::{Display, EnumString};

use crate::error::{SqlKitError, SqlKitResult};

/// Token in index templates replaced with the target table name.
pub const TABLE_NAME_PLACEHOLDER: &str = "$$$TABLE_NAME$$$";

/// Fragments this short (or shorter) carry no column definition and are
/// skipped.
const TRIVIAL_FRAGMENT_LEN: usize = 2;

/// How a row value is rendered into SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Deserialize)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(from = "String")]
pub enum FieldKind {
    /// Quoted string literal.
    Text,
    /// Emitted literally.
    Integer,
    /// Emitted literally.
    Real,
    /// Emitted literally. Also used for unknown type names.
    #[default]
    Numeric,
}

impl FieldKind {
    /// Parses a SQL type name, falling back to [`FieldKind::Numeric`].
    #[must_use]
    pub fn from_type_name(name: &str) -> Self {
        name.trim().parse().unwrap_or_default()
    }
}

impl From<String> for FieldKind {
    fn from(name: String) -> Self {
        Self::from_type_name(&name)
    }
}

/// One `(name, value, kind)` entry of a row descriptor.
///
/// Pass values unescaped: [`FieldKind::Text`] values are quoted and any
/// embedded `'` is doubled when the statement is built.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RowField {
    /// Column name.
    pub name: String,
    /// Unquoted, unescaped value text.
    pub value: String,
    /// Rendering rule for [`value`](Self::value).
    #[serde(default)]
    pub kind: FieldKind,
}

impl RowField {
    /// Creates a row field.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            kind,
        }
    }

    /// A quoted text value.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, value, FieldKind::Text)
    }

    /// A value emitted as-is (numbers, `NULL`, expressions).
    #[must_use]
    pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, value, FieldKind::Numeric)
    }

    fn rendered_value(&self) -> String {
        match self.kind {
            FieldKind::Text => format!("'{}'", self.value.replace('\'', "''")),
            FieldKind::Integer | FieldKind::Real | FieldKind::Numeric => self.value.clone(),
        }
    }
}

/// A structured SELECT.
///
/// `limit < 0` means no `LIMIT` clause, `offset <= 0` means no `OFFSET`
/// clause and an empty `filter` means no `WHERE` clause.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueryDescriptor {
    /// Tables joined with `,` in the `FROM` clause.
    pub tables: Vec<String>,
    /// Result columns joined with `,`.
    pub fields: Vec<String>,
    /// `WHERE` fragment, emitted verbatim.
    pub filter: String,
    /// Maximum row count.
    pub limit: i64,
    /// Rows to skip.
    pub offset: i64,
}

impl Default for QueryDescriptor {
    fn default() -> Self {
        Self {
            tables: Vec::new(),
            fields: Vec::new(),
            filter: String::new(),
            limit: -1,
            offset: 0,
        }
    }
}

impl QueryDescriptor {
    /// Selects `fields` from `tables`, unfiltered and unbounded.
    #[must_use]
    pub fn new<T, F>(tables: T, fields: F) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self {
            tables: tables.into_iter().map(Into::into).collect(),
            fields: fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Sets the `WHERE` fragment.
    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Sets the row limit.
    #[must_use]
    pub const fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the row offset.
    #[must_use]
    pub const fn offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Checks that there is something to select from.
    ///
    /// # Errors
    ///
    /// [`SqlKitError::EmptyInput`] without tables or without fields.
    pub fn validate(&self) -> SqlKitResult<()> {
        if self.tables.is_empty() {
            return Err(SqlKitError::EmptyInput("no table given"));
        }
        if self.fields.is_empty() {
            return Err(SqlKitError::EmptyInput("no fields given"));
        }
        Ok(())
    }

    /// Renders the descriptor with [`build_select`].
    #[must_use]
    pub fn to_sql(&self) -> String {
        build_select(&self.tables, &self.fields, &self.filter, self.limit, self.offset)
    }
}

/// `SELECT <fields> FROM <tables>[ WHERE f][ LIMIT n][ OFFSET m]`.
#[must_use]
pub fn build_select<T: AsRef<str>, F: AsRef<str>>(
    tables: &[T],
    fields: &[F],
    filter: &str,
    limit: i64,
    offset: i64,
) -> String {
    let mut sql = format!("SELECT {} FROM {}", join(fields, ","), join(tables, ","));
    if !filter.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(filter);
    }
    push_paging(&mut sql, limit, offset);
    sql
}

/// `CREATE TABLE IF NOT EXISTS <table>(<fragments>);`.
///
/// `primary_key` is appended unless a field fragment already declares a
/// `PRIMARY KEY`.
///
/// # Errors
///
/// [`SqlKitError::EmptyInput`] when no non-trivial fragment remains.
pub fn build_create_table<F: AsRef<str>>(
    table: &str,
    fields: &[F],
    primary_key: &str,
) -> SqlKitResult<String> {
    let mut columns: Vec<&str> = fields
        .iter()
        .map(AsRef::as_ref)
        .filter(|fragment| fragment.len() > TRIVIAL_FRAGMENT_LEN)
        .collect();
    let has_inline_key = columns.iter().any(|fragment| fragment.contains("PRIMARY KEY"));
    if !has_inline_key && primary_key.len() > TRIVIAL_FRAGMENT_LEN {
        columns.push(primary_key);
    }
    if columns.is_empty() {
        return Err(SqlKitError::EmptyInput("no fields given"));
    }
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {table}({});",
        columns.join(", ")
    ))
}

/// `INSERT INTO t (a, b) VALUES (v1, v2);`.
///
/// # Errors
///
/// [`SqlKitError::EmptyInput`] for an empty row.
pub fn build_insert(table: &str, row: &[RowField]) -> SqlKitResult<String> {
    if row.is_empty() {
        return Err(SqlKitError::EmptyInput("no row values given"));
    }
    let names: Vec<&str> = row.iter().map(|field| field.name.as_str()).collect();
    let values: Vec<String> = row.iter().map(RowField::rendered_value).collect();
    Ok(format!(
        "INSERT INTO {table} ({}) VALUES ({});",
        names.join(", "),
        values.join(", ")
    ))
}

/// `UPDATE t SET a = v1, b = v2 WHERE f[ LIMIT n][ OFFSET m];`.
///
/// # Errors
///
/// [`SqlKitError::MissingFilter`] for an empty filter,
/// [`SqlKitError::EmptyInput`] for an empty row.
pub fn build_update(
    table: &str,
    row: &[RowField],
    filter: &str,
    limit: i64,
    offset: i64,
) -> SqlKitResult<String> {
    if filter.is_empty() {
        return Err(SqlKitError::MissingFilter);
    }
    if row.is_empty() {
        return Err(SqlKitError::EmptyInput("no row values given"));
    }
    let assignments: Vec<String> = row
        .iter()
        .map(|field| format!("{} = {}", field.name, field.rendered_value()))
        .collect();
    let mut sql = format!(
        "UPDATE {table} SET {} WHERE {filter}",
        assignments.join(", ")
    );
    push_paging(&mut sql, limit, offset);
    sql.push(';');
    Ok(sql)
}

/// `DELETE FROM t WHERE f;`.
///
/// # Errors
///
/// [`SqlKitError::MissingFilter`] for an empty filter.
pub fn build_delete(table: &str, filter: &str) -> SqlKitResult<String> {
    if filter.is_empty() {
        return Err(SqlKitError::MissingFilter);
    }
    Ok(format!("DELETE FROM {table} WHERE {filter};"))
}

/// Substitutes every [`TABLE_NAME_PLACEHOLDER`] in `template` with `table`.
#[must_use]
pub fn build_index(template: &str, table: &str) -> String {
    template.replace(TABLE_NAME_PLACEHOLDER, table)
}

/// Whether an index template is too short to hold a statement.
pub(crate) const fn is_trivial_fragment(fragment: &str) -> bool {
    fragment.len() <= TRIVIAL_FRAGMENT_LEN
}

fn push_paging(sql: &mut String, limit: i64, offset: i64) {
    if limit >= 0 {
        sql.push_str(&format!(" LIMIT {limit}"));
    }
    if offset > 0 {
        sql.push_str(&format!(" OFFSET {offset}"));
    }
}

fn join<S: AsRef<str>>(parts: &[S], separator: &str) -> String {
    parts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(&["t"], &["*"], "", -1, 0, "SELECT * FROM t" ; "bare select")]
    #[test_case(&["t"], &["a", "b"], "x>1", 10, 5, "SELECT a,b FROM t WHERE x>1 LIMIT 10 OFFSET 5" ; "all clauses")]
    #[test_case(&["t", "u"], &["t.a", "u.b"], "", 0, 0, "SELECT t.a,u.b FROM t,u LIMIT 0" ; "zero limit is kept")]
    #[test_case(&["t"], &["a"], "", -1, 3, "SELECT a FROM t OFFSET 3" ; "offset without limit")]
    #[test_case(&["t"], &["a"], "a = 'x'", -5, -1, "SELECT a FROM t WHERE a = 'x'" ; "negative paging ignored")]
    fn test_build_select(
        tables: &[&str],
        fields: &[&str],
        filter: &str,
        limit: i64,
        offset: i64,
        expected: &str,
    ) {
        assert_eq!(build_select(tables, fields, filter, limit, offset), expected);
    }

    #[test]
    fn test_descriptor_matches_build_select() {
        let descriptor = QueryDescriptor::new(["t"], ["a", "b"])
            .filter("x>1")
            .limit(10)
            .offset(5);
        assert_eq!(descriptor.to_sql(), "SELECT a,b FROM t WHERE x>1 LIMIT 10 OFFSET 5");
        assert_eq!(QueryDescriptor::new(["t"], ["*"]).to_sql(), "SELECT * FROM t");
    }

    #[test]
    fn test_descriptor_validation() {
        let no_tables = QueryDescriptor::new(Vec::<String>::new(), ["a"]);
        assert!(matches!(
            no_tables.validate(),
            Err(SqlKitError::EmptyInput("no table given"))
        ));
        let no_fields = QueryDescriptor::new(["t"], Vec::<String>::new());
        assert!(matches!(
            no_fields.validate(),
            Err(SqlKitError::EmptyInput("no fields given"))
        ));
        assert!(QueryDescriptor::new(["t"], ["*"]).validate().is_ok());
    }

    #[test]
    fn test_descriptor_deserializes_with_defaults() {
        let descriptor: QueryDescriptor =
            serde_json::from_str(r#"{"tables":["t"],"fields":["*"]}"#).unwrap();
        assert_eq!(descriptor.limit, -1);
        assert_eq!(descriptor.offset, 0);
        assert!(descriptor.filter.is_empty());
    }

    #[test_case(&["id INTEGER", "name TEXT"], "PRIMARY KEY(id)", "CREATE TABLE IF NOT EXISTS t(id INTEGER, name TEXT, PRIMARY KEY(id));" ; "separate key appended")]
    #[test_case(&["id INTEGER PRIMARY KEY", "name TEXT"], "PRIMARY KEY(name)", "CREATE TABLE IF NOT EXISTS t(id INTEGER PRIMARY KEY, name TEXT);" ; "inline key wins")]
    #[test_case(&["id INTEGER", "", "ab", "name TEXT"], "", "CREATE TABLE IF NOT EXISTS t(id INTEGER, name TEXT);" ; "trivial fragments skipped")]
    fn test_build_create_table(fields: &[&str], pk: &str, expected: &str) {
        assert_eq!(build_create_table("t", fields, pk).unwrap(), expected);
    }

    #[test]
    fn test_build_create_table_without_columns() {
        assert!(matches!(
            build_create_table("t", &["", "x"], "  "),
            Err(SqlKitError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_build_insert_quotes_text_only() {
        let row = [
            RowField::text("name", "O'Brien"),
            RowField::literal("age", "42"),
            RowField::new("score", "1.5", FieldKind::Real),
        ];
        assert_eq!(
            build_insert("people", &row).unwrap(),
            "INSERT INTO people (name, age, score) VALUES ('O''Brien', 42, 1.5);"
        );
    }

    #[test]
    fn test_text_values_are_escaped_once_by_the_builder() {
        let escaped = [RowField::text("name", "O''Brien")];
        assert_eq!(
            build_insert("people", &escaped).unwrap(),
            "INSERT INTO people (name) VALUES ('O''''Brien');"
        );
        let literal = [RowField::literal("name", "'O''Brien'")];
        assert_eq!(
            build_insert("people", &literal).unwrap(),
            "INSERT INTO people (name) VALUES ('O''Brien');"
        );
    }

    #[test]
    fn test_build_update() {
        let row = [RowField::text("name", "x"), RowField::literal("age", "1")];
        assert_eq!(
            build_update("t", &row, "id = 3", -1, 0).unwrap(),
            "UPDATE t SET name = 'x', age = 1 WHERE id = 3;"
        );
        assert_eq!(
            build_update("t", &row, "id > 3", 2, 1).unwrap(),
            "UPDATE t SET name = 'x', age = 1 WHERE id > 3 LIMIT 2 OFFSET 1;"
        );
        assert!(matches!(
            build_update("t", &row, "", -1, 0),
            Err(SqlKitError::MissingFilter)
        ));
    }

    #[test]
    fn test_build_delete() {
        assert_eq!(build_delete("t", "id = 1").unwrap(), "DELETE FROM t WHERE id = 1;");
        assert!(matches!(build_delete("t", ""), Err(SqlKitError::MissingFilter)));
    }

    #[test]
    fn test_build_index_replaces_every_placeholder() {
        let template = "CREATE INDEX IF NOT EXISTS idx_$$$TABLE_NAME$$$_a ON $$$TABLE_NAME$$$(a)";
        assert_eq!(
            build_index(template, "users"),
            "CREATE INDEX IF NOT EXISTS idx_users_a ON users(a)"
        );
    }

    #[test_case("TEXT", FieldKind::Text)]
    #[test_case("text", FieldKind::Text)]
    #[test_case("Integer", FieldKind::Integer)]
    #[test_case("REAL", FieldKind::Real)]
    #[test_case("BLOB", FieldKind::Numeric ; "unknown falls back")]
    fn test_field_kind_from_type_name(name: &str, expected: FieldKind) {
        assert_eq!(FieldKind::from_type_name(name), expected);
    }
}
