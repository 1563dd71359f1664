//! Safe wrapper around a `SQLite` prepared statement.

use std::ffi::CStr;
use std::marker::PhantomData;
use std::os::raw::{c_int, c_void};

use super::connection::Connection;
use super::error::{DbError, DbResult};
use super::ffi;
use super::value::Value;

/// Result of a single `sqlite3_step` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// A result row is available (`SQLITE_ROW`).
    Row,
    /// The statement has finished executing (`SQLITE_DONE`).
    Done,
}

/// Storage class of a result column, as reported by `sqlite3_column_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// `SQLITE_INTEGER`
    Integer,
    /// `SQLITE_FLOAT`
    Float,
    /// `SQLITE_TEXT`
    Text,
    /// `SQLITE_BLOB`
    Blob,
    /// `SQLITE_NULL`
    Null,
}

impl ColumnType {
    const fn from_raw(code: c_int) -> Self {
        match code {
            ffi::SQLITE_INTEGER => Self::Integer,
            ffi::SQLITE_FLOAT => Self::Float,
            ffi::SQLITE_TEXT => Self::Text,
            ffi::SQLITE_BLOB => Self::Blob,
            _ => Self::Null,
        }
    }
}

/// A prepared `SQLite` statement.
///
/// Statements are created via [`Connection::prepare`] and finalized when
/// dropped, on every exit path. Tied to the lifetime of the connection that
/// created it.
pub struct Statement<'conn> {
    /// Raw `sqlite3_stmt*` handle.
    stmt: *mut c_void,
    /// Raw `sqlite3*` handle, kept for error messages.
    db: *mut c_void,
    _conn: PhantomData<&'conn Connection>,
}

impl<'conn> Statement<'conn> {
    /// Creates a new `Statement` wrapping a raw pointer pair.
    ///
    /// # Safety
    ///
    /// `stmt` must be a valid, non-null `sqlite3_stmt*` prepared on `db`,
    /// and `db` must outlive `'conn`.
    pub(super) unsafe fn from_raw(stmt: *mut c_void, db: *mut c_void) -> Self {
        debug_assert!(!stmt.is_null());
        Self {
            stmt,
            db,
            _conn: PhantomData,
        }
    }

    // ── Binding ─────────────────────────────────────────────────────────

    /// Binds a slice of [`Value`]s to the statement parameters (1-indexed).
    ///
    /// # Errors
    ///
    /// Returns the engine error if a value cannot be bound (for instance an
    /// index past the statement's parameter count).
    pub fn bind_values(&mut self, values: &[Value]) -> DbResult<()> {
        for (i, val) in values.iter().enumerate() {
            let idx = to_c_int(i + 1)?;
            let rc = match val {
                Value::Integer(v) => unsafe { ffi::sqlite3_bind_int64(self.stmt, idx, *v) },
                Value::Real(v) => unsafe { ffi::sqlite3_bind_double(self.stmt, idx, *v) },
                Value::Text(v) => unsafe {
                    ffi::sqlite3_bind_text(self.stmt, idx, v.as_ptr().cast(), to_c_int(v.len())?)
                },
                Value::Null => unsafe { ffi::sqlite3_bind_null(self.stmt, idx) },
            };
            if rc != ffi::SQLITE_OK {
                return Err(self.last_error(rc));
            }
        }
        Ok(())
    }

    // ── Stepping ────────────────────────────────────────────────────────

    /// Executes a single step.
    ///
    /// # Errors
    ///
    /// Any code other than `SQLITE_ROW` or `SQLITE_DONE` is returned as an
    /// error carrying the engine's message.
    pub fn step(&mut self) -> DbResult<StepResult> {
        let rc = unsafe { ffi::sqlite3_step(self.stmt) };
        match rc {
            ffi::SQLITE_ROW => Ok(StepResult::Row),
            ffi::SQLITE_DONE => Ok(StepResult::Done),
            _ => Err(self.last_error(rc)),
        }
    }

    // ── Column reading ──────────────────────────────────────────────────

    /// Returns the number of columns in the result set.
    #[must_use]
    pub fn column_count(&self) -> usize {
        usize::try_from(unsafe { ffi::sqlite3_column_count(self.stmt) }).unwrap_or(0)
    }

    /// Returns the name the engine assigned to column `idx`.
    #[must_use]
    pub fn column_name(&self, idx: usize) -> String {
        let Ok(col) = to_c_int(idx) else {
            return String::new();
        };
        unsafe {
            let ptr = ffi::sqlite3_column_name(self.stmt, col);
            if ptr.is_null() {
                return String::new();
            }
            CStr::from_ptr(ptr).to_string_lossy().into_owned()
        }
    }

    /// Returns the storage class of column `idx` in the current row.
    #[must_use]
    pub fn column_type(&self, idx: usize) -> ColumnType {
        let Ok(col) = to_c_int(idx) else {
            return ColumnType::Null;
        };
        ColumnType::from_raw(unsafe { ffi::sqlite3_column_type(self.stmt, col) })
    }

    /// Reads a column as `i64`.
    #[must_use]
    pub fn column_i64(&self, idx: usize) -> i64 {
        to_c_int(idx).map_or(0, |col| unsafe { ffi::sqlite3_column_int64(self.stmt, col) })
    }

    /// Reads a column as `f64`.
    #[must_use]
    pub fn column_f64(&self, idx: usize) -> f64 {
        to_c_int(idx).map_or(0.0, |col| unsafe { ffi::sqlite3_column_double(self.stmt, col) })
    }

    /// Reads a column as a UTF-8 string. Returns an empty string for NULL.
    #[must_use]
    pub fn column_text(&self, idx: usize) -> String {
        let Ok(col) = to_c_int(idx) else {
            return String::new();
        };
        unsafe {
            let ptr = ffi::sqlite3_column_text(self.stmt, col);
            if ptr.is_null() {
                return String::new();
            }
            CStr::from_ptr(ptr).to_string_lossy().into_owned()
        }
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    fn last_error(&self, code: c_int) -> DbError {
        DbError::new(code, Connection::errmsg_raw(self.db))
    }
}

impl Drop for Statement<'_> {
    fn drop(&mut self) {
        if !self.stmt.is_null() {
            unsafe {
                ffi::sqlite3_finalize(self.stmt);
            }
            self.stmt = std::ptr::null_mut();
        }
    }
}

fn to_c_int(n: usize) -> DbResult<c_int> {
    c_int::try_from(n).map_err(|_| DbError::new(ffi::SQLITE_MISUSE, format!("{n} exceeds c_int")))
}
