//! Database error types for the safe `SQLite` wrapper.

use std::ffi::CStr;
use std::fmt;

use super::ffi;

/// Error code returned by `SQLite` operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbErrorCode(pub i32);

impl DbErrorCode {
    /// Returns the engine's English description of the code
    /// (`sqlite3_errstr`), e.g. `"SQL logic error"` for `1`.
    #[must_use]
    pub fn name(self) -> String {
        let ptr = unsafe { ffi::sqlite3_errstr(self.0) };
        if ptr.is_null() {
            return "unknown error".to_string();
        }
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
    }
}

impl fmt::Display for DbErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned by database operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbError {
    /// `SQLite` result code.
    pub code: DbErrorCode,
    /// Human-readable error message (from `sqlite3_errmsg` when available).
    pub message: String,
}

impl DbError {
    /// Creates a new database error.
    #[must_use]
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code: DbErrorCode(code),
            message: message.into(),
        }
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sqlite error '{}' ({}): {}",
            self.code.name(),
            self.code,
            self.message
        )
    }
}

impl std::error::Error for DbError {}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
