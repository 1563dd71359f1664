//! Table and index management.

use serde::Serialize;
use sqlkit_db::Value;

use crate::error::SqlKitResult;
use crate::executor;
use crate::kit::{report, SqlKit};
use crate::query::{build_create_table, build_index, is_trivial_fragment};

/// Result of [`SqlKit::create_table`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableHandle {
    /// Logical database name.
    pub database: String,
    /// Table name.
    pub table: String,
    /// Column definition fragments as passed in.
    pub fields: Vec<String>,
    /// Separate primary-key fragment as passed in.
    pub primary_key: String,
    /// Whether the `CREATE TABLE` statement succeeded.
    pub created: bool,
}

impl SqlKit {
    /// Creates `table` from column definition fragments, if it does not
    /// exist yet.
    ///
    /// `primary_key` (for instance `PRIMARY KEY(id)`) is ignored when a
    /// column fragment already declares one.
    #[must_use]
    pub fn create_table<F: AsRef<str>>(
        &self,
        name: &str,
        table: &str,
        fields: &[F],
        primary_key: &str,
    ) -> TableHandle {
        let created = report(
            "create table",
            self.try_create_table(name, table, fields, primary_key),
        );
        TableHandle {
            database: name.to_string(),
            table: table.to_string(),
            fields: fields.iter().map(|f| f.as_ref().to_string()).collect(),
            primary_key: primary_key.to_string(),
            created,
        }
    }

    /// See [`create_table`](Self::create_table).
    ///
    /// # Errors
    ///
    /// [`SqlKitError::EmptyInput`](crate::SqlKitError::EmptyInput) without
    /// usable fragments, otherwise as [`try_exec`](Self::try_exec).
    pub fn try_create_table<F: AsRef<str>>(
        &self,
        name: &str,
        table: &str,
        fields: &[F],
        primary_key: &str,
    ) -> SqlKitResult<()> {
        let sql = build_create_table(table, fields, primary_key)?;
        self.try_exec(name, &sql)
    }

    /// Drops `table`.
    #[must_use]
    pub fn drop_table(&self, name: &str, table: &str) -> bool {
        report("drop table", self.try_drop_table(name, table))
    }

    /// See [`drop_table`](Self::drop_table).
    ///
    /// # Errors
    ///
    /// As [`try_exec`](Self::try_exec).
    pub fn try_drop_table(&self, name: &str, table: &str) -> SqlKitResult<()> {
        self.try_exec(name, &format!("DROP TABLE {table}"))
    }

    /// Deletes every row of `table`.
    #[must_use]
    pub fn truncate_table(&self, name: &str, table: &str) -> bool {
        report("truncate table", self.try_truncate_table(name, table))
    }

    /// See [`truncate_table`](Self::truncate_table).
    ///
    /// # Errors
    ///
    /// As [`try_exec`](Self::try_exec).
    pub fn try_truncate_table(&self, name: &str, table: &str) -> SqlKitResult<()> {
        self.try_exec(name, &format!("DELETE FROM {table};"))
    }

    /// Runs an index template against `table`. See
    /// [`TABLE_NAME_PLACEHOLDER`](crate::query::TABLE_NAME_PLACEHOLDER).
    #[must_use]
    pub fn create_index(&self, name: &str, table: &str, template: &str) -> bool {
        report("create index", self.try_create_index(name, table, template))
    }

    /// See [`create_index`](Self::create_index).
    ///
    /// # Errors
    ///
    /// As [`try_exec`](Self::try_exec).
    pub fn try_create_index(&self, name: &str, table: &str, template: &str) -> SqlKitResult<()> {
        self.try_exec(name, &build_index(template, table))
    }

    /// Runs several index templates in order, skipping empty ones and
    /// stopping at the first failure.
    #[must_use]
    pub fn create_indexes<S: AsRef<str>>(&self, name: &str, table: &str, templates: &[S]) -> bool {
        report("create indexes", self.try_create_indexes(name, table, templates))
    }

    /// See [`create_indexes`](Self::create_indexes).
    ///
    /// # Errors
    ///
    /// The first failing index, as [`try_exec`](Self::try_exec).
    pub fn try_create_indexes<S: AsRef<str>>(
        &self,
        name: &str,
        table: &str,
        templates: &[S],
    ) -> SqlKitResult<()> {
        self.with_connection(name, |conn| {
            templates
                .iter()
                .map(AsRef::as_ref)
                .filter(|template| !is_trivial_fragment(template))
                .try_for_each(|template| executor::exec(conn, &build_index(template, table)))
        })
    }

    /// Drops index `index`.
    #[must_use]
    pub fn drop_index(&self, name: &str, index: &str) -> bool {
        report("drop index", self.try_drop_index(name, index))
    }

    /// See [`drop_index`](Self::drop_index).
    ///
    /// # Errors
    ///
    /// As [`try_exec`](Self::try_exec).
    pub fn try_drop_index(&self, name: &str, index: &str) -> SqlKitResult<()> {
        self.try_exec(name, &format!("DROP INDEX {index}"))
    }

    /// Whether `table` exists. Lookup failures count as `false`.
    #[must_use]
    pub fn table_exists(&self, name: &str, table: &str) -> bool {
        self.try_table_exists(name, table).unwrap_or_else(|e| {
            log::error!("table lookup failed: {e}");
            false
        })
    }

    /// See [`table_exists`](Self::table_exists).
    ///
    /// # Errors
    ///
    /// Resolution and query errors.
    pub fn try_table_exists(&self, name: &str, table: &str) -> SqlKitResult<bool> {
        self.with_connection(name, |conn| {
            let outcome = executor::query_with(
                conn,
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                &[Value::from(table)],
            )?;
            Ok(!outcome.rows().is_empty())
        })
    }

    /// Rebuilds the database file.
    #[must_use]
    pub fn vacuum(&self, name: &str) -> bool {
        report("vacuum", self.try_vacuum(name))
    }

    /// See [`vacuum`](Self::vacuum).
    ///
    /// # Errors
    ///
    /// As [`try_exec`](Self::try_exec).
    pub fn try_vacuum(&self, name: &str) -> SqlKitResult<()> {
        self.try_exec(name, "VACUUM;")
    }
}
