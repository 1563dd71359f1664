//! Safe wrapper around a `SQLite` database connection.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_void};
use std::path::Path;

use super::error::{DbError, DbResult};
use super::ffi;
use super::statement::Statement;

/// How a database file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Read-write access; the file must exist.
    ReadWrite,
    /// Read-write access, creating the file if it does not exist.
    #[default]
    ReadWriteCreate,
}

impl OpenMode {
    const fn flags(self) -> i32 {
        match self {
            Self::ReadWrite => ffi::SQLITE_OPEN_READWRITE | ffi::SQLITE_OPEN_FULLMUTEX,
            Self::ReadWriteCreate => {
                ffi::SQLITE_OPEN_READWRITE | ffi::SQLITE_OPEN_CREATE | ffi::SQLITE_OPEN_FULLMUTEX
            }
        }
    }
}

/// A `SQLite` database connection.
///
/// The connection is closed when dropped. It is **not** `Sync`: all access
/// must happen from a single thread at a time.
pub struct Connection {
    /// Raw `sqlite3*` handle.
    db: *mut c_void,
}

// Safety: Connection is not Sync but is Send. It can be moved to another
// thread as long as only one thread accesses it at a time.
unsafe impl Send for Connection {}

impl Connection {
    /// Opens a database at `path` with the given [`OpenMode`].
    ///
    /// # Errors
    ///
    /// Returns the engine error when the file cannot be opened (or created).
    pub fn open(path: &Path, mode: OpenMode) -> DbResult<Self> {
        let path_str = path.to_string_lossy();
        let c_path = CString::new(path_str.as_bytes())
            .map_err(|e| DbError::new(ffi::SQLITE_ERROR, format!("invalid path: {e}")))?;

        let mut db: *mut c_void = std::ptr::null_mut();
        let rc =
            unsafe { ffi::sqlite3_open_v2(c_path.as_ptr(), &mut db, mode.flags(), std::ptr::null()) };
        if rc != ffi::SQLITE_OK {
            // If open failed but we got a handle, extract the error and close.
            let msg = if db.is_null() {
                format!("sqlite3_open_v2 returned {rc}")
            } else {
                let m = Self::errmsg_raw(db);
                unsafe {
                    ffi::sqlite3_close_v2(db);
                }
                m
            };
            return Err(DbError::new(rc, msg));
        }
        Ok(Self { db })
    }

    // ── execute_batch ───────────────────────────────────────────────────

    /// Executes one or more SQL statements separated by semicolons.
    ///
    /// No result rows are returned. This is suitable for DDL, PRAGMAs, and
    /// multi-statement scripts.
    ///
    /// # Errors
    ///
    /// Returns the first statement's engine error, with the message produced
    /// by `sqlite3_exec`.
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let c_sql = CString::new(sql)
            .map_err(|e| DbError::new(ffi::SQLITE_ERROR, format!("nul in SQL: {e}")))?;
        let mut errmsg: *mut c_char = std::ptr::null_mut();
        let rc = unsafe { ffi::sqlite3_exec(self.db, c_sql.as_ptr(), &mut errmsg) };
        if rc != ffi::SQLITE_OK {
            let msg = if errmsg.is_null() {
                self.errmsg()
            } else {
                let s = unsafe { CStr::from_ptr(errmsg) }.to_string_lossy().into_owned();
                unsafe {
                    ffi::sqlite3_free(errmsg.cast());
                }
                s
            };
            return Err(DbError::new(rc, msg));
        }
        Ok(())
    }

    // ── prepare ─────────────────────────────────────────────────────────

    /// Prepares a single SQL statement.
    ///
    /// # Errors
    ///
    /// Returns the engine error when the SQL does not compile. Empty input
    /// (whitespace or comments only) is reported as `SQLITE_MISUSE`.
    pub fn prepare(&self, sql: &str) -> DbResult<Statement<'_>> {
        let c_sql = CString::new(sql)
            .map_err(|e| DbError::new(ffi::SQLITE_ERROR, format!("nul in SQL: {e}")))?;
        let mut stmt: *mut c_void = std::ptr::null_mut();
        let rc = unsafe { ffi::sqlite3_prepare_v2(self.db, c_sql.as_ptr(), -1, &mut stmt) };
        if rc != ffi::SQLITE_OK {
            return Err(DbError::new(rc, self.errmsg()));
        }
        if stmt.is_null() {
            return Err(DbError::new(ffi::SQLITE_MISUSE, "no statement to prepare"));
        }
        Ok(unsafe { Statement::from_raw(stmt, self.db) })
    }

    // ── last_insert_rowid ─────────────────────────────────────

    /// Returns the rowid of the most recent successful INSERT on this
    /// connection.
    #[must_use]
    pub fn last_insert_rowid(&self) -> i64 {
        unsafe { ffi::sqlite3_last_insert_rowid(self.db) }
    }

    // ── Snapshots ───────────────────────────────────────────────────────

    /// Copies the full image of `schema` (usually `"main"`) into a byte
    /// buffer.
    ///
    /// A database without any pages serializes to an empty buffer.
    ///
    /// # Errors
    ///
    /// Returns the engine error when the image cannot be produced (unknown
    /// schema, out of memory).
    pub fn serialize(&self, schema: &str) -> DbResult<Vec<u8>> {
        let c_schema = CString::new(schema)
            .map_err(|e| DbError::new(ffi::SQLITE_ERROR, format!("nul in schema: {e}")))?;
        let mut size: i64 = 0;
        let ptr = unsafe { ffi::sqlite3_serialize(self.db, c_schema.as_ptr(), &mut size, 0) };
        if ptr.is_null() {
            let rc = unsafe { ffi::sqlite3_errcode(self.db) };
            if rc != ffi::SQLITE_OK {
                return Err(DbError::new(rc, self.errmsg()));
            }
            if size > 0 {
                return Err(DbError::new(ffi::SQLITE_NOMEM, "could not allocate snapshot buffer"));
            }
            return Ok(Vec::new());
        }
        let len = usize::try_from(size).unwrap_or(0);
        let bytes = unsafe { std::slice::from_raw_parts(ptr, len) }.to_vec();
        unsafe {
            ffi::sqlite3_free(ptr.cast());
        }
        Ok(bytes)
    }

    /// Replaces `schema` with a read-only copy of the given database image.
    ///
    /// The bytes are copied into engine-owned memory that is released when
    /// the connection closes, so `image` may be dropped right away. The
    /// engine rejects any later write to the schema.
    ///
    /// # Errors
    ///
    /// Returns the engine error when the image is rejected (for instance
    /// while a statement is active on the connection).
    pub fn deserialize(&self, schema: &str, image: &[u8]) -> DbResult<()> {
        let c_schema = CString::new(schema)
            .map_err(|e| DbError::new(ffi::SQLITE_ERROR, format!("nul in schema: {e}")))?;
        let size = i64::try_from(image.len())
            .map_err(|_| DbError::new(ffi::SQLITE_ERROR, "snapshot too large"))?;
        let buf = unsafe { ffi::sqlite3_malloc64(image.len() as u64) }.cast::<u8>();
        if buf.is_null() && !image.is_empty() {
            return Err(DbError::new(ffi::SQLITE_NOMEM, "could not allocate snapshot buffer"));
        }
        if !image.is_empty() {
            unsafe {
                std::ptr::copy_nonoverlapping(image.as_ptr(), buf, image.len());
            }
        }

        let flags = ffi::SQLITE_DESERIALIZE_FREEONCLOSE | ffi::SQLITE_DESERIALIZE_READONLY;
        // On failure the engine frees `buf` itself because of FREEONCLOSE.
        let rc = unsafe {
            ffi::sqlite3_deserialize(self.db, c_schema.as_ptr(), buf, size, size, flags)
        };
        if rc != ffi::SQLITE_OK {
            return Err(DbError::new(rc, self.errmsg()));
        }
        Ok(())
    }

    // ── Error helpers ───────────────────────────────────────────────────

    fn errmsg(&self) -> String {
        Self::errmsg_raw(self.db)
    }

    pub(super) fn errmsg_raw(db: *mut c_void) -> String {
        unsafe {
            let ptr = ffi::sqlite3_errmsg(db);
            if ptr.is_null() {
                "unknown error".to_string()
            } else {
                CStr::from_ptr(ptr).to_string_lossy().into_owned()
            }
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").field("db", &self.db).finish()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if !self.db.is_null() {
            unsafe {
                ffi::sqlite3_close_v2(self.db);
            }
            self.db = std::ptr::null_mut();
        }
    }
}
