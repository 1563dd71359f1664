//! Row-level writes built from [`RowField`] descriptors.

use log::error;

use crate::error::{SqlKitError, SqlKitResult};
use crate::executor;
use crate::kit::{report, SqlKit};
use crate::query::{build_delete, build_insert, build_update, RowField};

impl SqlKit {
    /// Inserts each row with its own `INSERT`. Every row is attempted; the
    /// result is `true` only if all of them succeeded.
    #[must_use]
    pub fn insert_rows<R: AsRef<[RowField]>>(&self, name: &str, table: &str, rows: &[R]) -> bool {
        report("insert rows", self.try_insert_rows(name, table, rows))
    }

    /// See [`insert_rows`](Self::insert_rows).
    ///
    /// # Errors
    ///
    /// The first failure, after all rows were attempted.
    pub fn try_insert_rows<R: AsRef<[RowField]>>(
        &self,
        name: &str,
        table: &str,
        rows: &[R],
    ) -> SqlKitResult<()> {
        self.with_connection(name, |conn| {
            run_each(rows.iter().map(|row| {
                let sql = build_insert(table, row.as_ref())?;
                executor::exec(conn, &sql)
            }))
        })
    }

    /// Applies each row with its own `UPDATE ... WHERE filter`. Nothing runs
    /// when `filter` is empty.
    #[must_use]
    pub fn update_rows<R: AsRef<[RowField]>>(
        &self,
        name: &str,
        table: &str,
        rows: &[R],
        filter: &str,
        limit: i64,
        offset: i64,
    ) -> bool {
        report(
            "update rows",
            self.try_update_rows(name, table, rows, filter, limit, offset),
        )
    }

    /// See [`update_rows`](Self::update_rows).
    ///
    /// # Errors
    ///
    /// [`SqlKitError::MissingFilter`] before touching the database,
    /// otherwise the first failure after all rows were attempted.
    pub fn try_update_rows<R: AsRef<[RowField]>>(
        &self,
        name: &str,
        table: &str,
        rows: &[R],
        filter: &str,
        limit: i64,
        offset: i64,
    ) -> SqlKitResult<()> {
        if filter.is_empty() {
            return Err(SqlKitError::MissingFilter);
        }
        self.with_connection(name, |conn| {
            run_each(rows.iter().map(|row| {
                let sql = build_update(table, row.as_ref(), filter, limit, offset)?;
                executor::exec(conn, &sql)
            }))
        })
    }

    /// Deletes the rows of `table` matching `filter`. Nothing runs when
    /// `filter` is empty.
    #[must_use]
    pub fn delete_rows(&self, name: &str, table: &str, filter: &str) -> bool {
        report("delete rows", self.try_delete_rows(name, table, filter))
    }

    /// See [`delete_rows`](Self::delete_rows).
    ///
    /// # Errors
    ///
    /// [`SqlKitError::MissingFilter`] before touching the database,
    /// otherwise as [`try_exec`](Self::try_exec).
    pub fn try_delete_rows(&self, name: &str, table: &str, filter: &str) -> SqlKitResult<()> {
        let sql = build_delete(table, filter)?;
        self.try_exec(name, &sql)
    }
}

/// Drives every statement, logging failures past the first and returning the
/// first.
fn run_each(results: impl Iterator<Item = SqlKitResult<()>>) -> SqlKitResult<()> {
    let mut first_error = None;
    for result in results {
        if let Err(e) = result {
            if first_error.is_none() {
                first_error = Some(e);
            } else {
                error!("row statement failed: {e}");
            }
        }
    }
    first_error.map_or(Ok(()), Err)
}
