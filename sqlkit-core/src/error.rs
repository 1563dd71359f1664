//! Errors reported by sqlkit operations.

use std::path::PathBuf;

use sqlkit_db::DbError;
use thiserror::Error;

/// Result type for sqlkit operations.
pub type SqlKitResult<T> = Result<T, SqlKitError>;

/// Errors raised by the data-access layer.
///
/// None of these are fatal: the boolean/outcome surface of
/// [`SqlKit`](crate::SqlKit) logs them and reports failure to the caller.
#[derive(Debug, Error)]
pub enum SqlKitError {
    /// The logical database name has not been registered.
    #[error("database '{0}' is not registered")]
    NotRegistered(String),

    /// The engine could not open (or create) the database file.
    #[error("could not open database '{}': {source}", .path.display())]
    OpenFailed {
        /// File the engine was asked to open.
        path: PathBuf,
        /// Engine error.
        #[source]
        source: DbError,
    },

    /// The file does not exist or fails the open probe.
    #[error("'{}' is not a valid database (missing or cannot be opened)", .0.display())]
    InvalidDatabase(PathBuf),

    /// The engine rejected the SQL text.
    #[error("SQL error: {source}; the attempted query was: {query}")]
    PrepareOrSyntax {
        /// Offending query text.
        query: String,
        /// Engine error.
        #[source]
        source: DbError,
    },

    /// A non-OK status while executing or stepping a statement, or while
    /// producing/consuming a snapshot.
    #[error("execution failed: {source}; the attempted statement was: {statement}")]
    Execution {
        /// Statement (or snapshot operation) that failed.
        statement: String,
        /// Engine error.
        #[source]
        source: DbError,
    },

    /// An UPDATE or DELETE was requested without a WHERE clause.
    #[error("the statement needs a where clause, no operation")]
    MissingFilter,

    /// A structured call was missing a required part (tables, fields, row
    /// values).
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// The projection target does not expose any fields.
    #[error("the target object exposes no fields to populate")]
    NoTargetObject,

    /// A projection query matched zero rows.
    #[error("query returned zero rows, no data to assign to the target")]
    EmptyResultSet,
}
