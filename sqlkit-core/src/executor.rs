//! Statement execution and result decoding.
//!
//! Callers resolve a connection first; the statement is finalized on every
//! exit path when it drops, and the connection guard decides whether the
//! handle is closed afterwards.

use log::debug;
use sqlkit_db::{ColumnType, Connection, Statement, StepResult, Value};

use crate::error::{SqlKitError, SqlKitResult};
use crate::outcome::{DecodedValue, QueryOutcome, Row};

/// Runs `sql` without collecting rows. Several `;`-separated statements are
/// allowed.
///
/// # Errors
///
/// [`SqlKitError::Execution`] with the engine's message.
pub fn exec(conn: &Connection, sql: &str) -> SqlKitResult<()> {
    debug!("{sql}");
    conn.execute_batch(sql).map_err(|source| SqlKitError::Execution {
        statement: sql.to_string(),
        source,
    })
}

/// Prepares and steps `sql`, decoding every result row.
///
/// # Errors
///
/// [`SqlKitError::PrepareOrSyntax`] when the statement does not compile,
/// [`SqlKitError::Execution`] when stepping ends with anything but
/// `SQLITE_DONE`. Rows read before the failure are discarded.
pub fn query(conn: &Connection, sql: &str) -> SqlKitResult<QueryOutcome> {
    query_with(conn, sql, &[])
}

/// Like [`query`] with `params` bound to the statement's placeholders.
///
/// # Errors
///
/// See [`query`]. Binding failures are reported as
/// [`SqlKitError::PrepareOrSyntax`].
pub fn query_with(conn: &Connection, sql: &str, params: &[Value]) -> SqlKitResult<QueryOutcome> {
    debug!("{sql}");
    let prepare_error = |source| SqlKitError::PrepareOrSyntax {
        query: sql.to_string(),
        source,
    };
    let mut stmt = conn.prepare(sql).map_err(prepare_error)?;
    stmt.bind_values(params).map_err(prepare_error)?;

    let mut rows = Vec::new();
    loop {
        match stmt.step() {
            Ok(StepResult::Row) => rows.push(decode_row(&stmt)),
            Ok(StepResult::Done) => break,
            Err(source) => {
                return Err(SqlKitError::Execution {
                    statement: sql.to_string(),
                    source,
                })
            }
        }
    }
    drop(stmt);

    Ok(QueryOutcome::completed(rows, conn.last_insert_rowid()))
}

/// Decodes the current row of `stmt`, left to right.
///
/// NULL and BLOB columns are left out.
#[must_use]
pub fn decode_row(stmt: &Statement<'_>) -> Row {
    let mut row = Row::new();
    for idx in 0..stmt.column_count() {
        let value = match stmt.column_type(idx) {
            ColumnType::Integer => DecodedValue::Integer(stmt.column_i64(idx)),
            ColumnType::Float => DecodedValue::Float(stmt.column_f64(idx)),
            ColumnType::Text => DecodedValue::Text(stmt.column_text(idx)),
            ColumnType::Blob | ColumnType::Null => DecodedValue::Unsupported,
        };
        row.push(stmt.column_name(idx), value);
    }
    row
}
