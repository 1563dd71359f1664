//! Raw FFI bindings to `SQLite`.
//!
//! The symbols come from the amalgamation bundled by `rusqlite`
//! (`rusqlite::ffi` is its `libsqlite3-sys` re-export). These are thin
//! wrappers that normalise the backend's opaque handle types (`sqlite3`,
//! `sqlite3_stmt`) to `*mut c_void` so that they do not leak into the rest of
//! the code.

#![allow(clippy::missing_safety_doc)]

use std::os::raw::{c_char, c_int, c_uint, c_void};

use rusqlite::ffi as sys;

// ── SQLite constants ────────────────────────────────────────────────────

pub const SQLITE_OK: c_int = 0;
pub const SQLITE_ERROR: c_int = 1;
pub const SQLITE_NOMEM: c_int = 7;
pub const SQLITE_MISUSE: c_int = 21;
pub const SQLITE_ROW: c_int = 100;
pub const SQLITE_DONE: c_int = 101;

// Column type constants
pub const SQLITE_INTEGER: c_int = 1;
pub const SQLITE_FLOAT: c_int = 2;
pub const SQLITE_TEXT: c_int = 3;
pub const SQLITE_BLOB: c_int = 4;

// Open flags
pub const SQLITE_OPEN_READWRITE: c_int = 0x0000_0002;
pub const SQLITE_OPEN_CREATE: c_int = 0x0000_0004;
pub const SQLITE_OPEN_FULLMUTEX: c_int = 0x0001_0000;

// sqlite3_deserialize flags
pub const SQLITE_DESERIALIZE_FREEONCLOSE: c_uint = 1;
pub const SQLITE_DESERIALIZE_READONLY: c_uint = 4;

// ── Connection lifecycle ────────────────────────────────────────────────

pub unsafe fn sqlite3_open_v2(
    filename: *const c_char,
    pp_db: *mut *mut c_void,
    flags: c_int,
    z_vfs: *const c_char,
) -> c_int {
    let pp = pp_db.cast::<*mut sys::sqlite3>();
    sys::sqlite3_open_v2(filename, pp, flags, z_vfs)
}

// `libsqlite3-sys`'s bundled bindings omit `sqlite3_close_v2`, but the symbol
// is compiled into the bundled amalgamation.
extern "C" {
    #[link_name = "sqlite3_close_v2"]
    fn sys_sqlite3_close_v2(db: *mut sys::sqlite3) -> c_int;
}

pub unsafe fn sqlite3_close_v2(db: *mut c_void) -> c_int {
    sys_sqlite3_close_v2(db.cast())
}

// ── Execution ───────────────────────────────────────────────────────────

pub unsafe fn sqlite3_exec(
    db: *mut c_void,
    sql: *const c_char,
    errmsg: *mut *mut c_char,
) -> c_int {
    sys::sqlite3_exec(db.cast(), sql, None, std::ptr::null_mut(), errmsg)
}

pub unsafe fn sqlite3_free(ptr: *mut c_void) {
    sys::sqlite3_free(ptr);
}

pub unsafe fn sqlite3_malloc64(n: u64) -> *mut c_void {
    sys::sqlite3_malloc64(n)
}

// ── Prepared statements ─────────────────────────────────────────────────

pub unsafe fn sqlite3_prepare_v2(
    db: *mut c_void,
    z_sql: *const c_char,
    n_byte: c_int,
    pp_stmt: *mut *mut c_void,
) -> c_int {
    let pp = pp_stmt.cast::<*mut sys::sqlite3_stmt>();
    sys::sqlite3_prepare_v2(db.cast(), z_sql, n_byte, pp, std::ptr::null_mut())
}

pub unsafe fn sqlite3_step(stmt: *mut c_void) -> c_int {
    sys::sqlite3_step(stmt.cast())
}

pub unsafe fn sqlite3_finalize(stmt: *mut c_void) -> c_int {
    sys::sqlite3_finalize(stmt.cast())
}

// ── Parameter binding ───────────────────────────────────────────────────

pub unsafe fn sqlite3_bind_int64(stmt: *mut c_void, index: c_int, value: i64) -> c_int {
    sys::sqlite3_bind_int64(stmt.cast(), index, value)
}

pub unsafe fn sqlite3_bind_double(stmt: *mut c_void, index: c_int, value: f64) -> c_int {
    sys::sqlite3_bind_double(stmt.cast(), index, value)
}

/// Binds UTF-8 text; `SQLite` copies the bytes before returning.
pub unsafe fn sqlite3_bind_text(
    stmt: *mut c_void,
    index: c_int,
    value: *const c_char,
    n: c_int,
) -> c_int {
    sys::sqlite3_bind_text(stmt.cast(), index, value, n, sys::SQLITE_TRANSIENT())
}

pub unsafe fn sqlite3_bind_null(stmt: *mut c_void, index: c_int) -> c_int {
    sys::sqlite3_bind_null(stmt.cast(), index)
}

// ── Column reading ──────────────────────────────────────────────────────

pub unsafe fn sqlite3_column_count(stmt: *mut c_void) -> c_int {
    sys::sqlite3_column_count(stmt.cast())
}

pub unsafe fn sqlite3_column_name(stmt: *mut c_void, i_col: c_int) -> *const c_char {
    sys::sqlite3_column_name(stmt.cast(), i_col)
}

pub unsafe fn sqlite3_column_type(stmt: *mut c_void, i_col: c_int) -> c_int {
    sys::sqlite3_column_type(stmt.cast(), i_col)
}

pub unsafe fn sqlite3_column_int64(stmt: *mut c_void, i_col: c_int) -> i64 {
    sys::sqlite3_column_int64(stmt.cast(), i_col)
}

pub unsafe fn sqlite3_column_double(stmt: *mut c_void, i_col: c_int) -> f64 {
    sys::sqlite3_column_double(stmt.cast(), i_col)
}

pub unsafe fn sqlite3_column_text(stmt: *mut c_void, i_col: c_int) -> *const c_char {
    sys::sqlite3_column_text(stmt.cast(), i_col).cast()
}

// ── Error reporting ─────────────────────────────────────────────────────

pub unsafe fn sqlite3_errmsg(db: *mut c_void) -> *const c_char {
    sys::sqlite3_errmsg(db.cast())
}

pub unsafe fn sqlite3_errcode(db: *mut c_void) -> c_int {
    sys::sqlite3_errcode(db.cast())
}

pub unsafe fn sqlite3_errstr(code: c_int) -> *const c_char {
    sys::sqlite3_errstr(code)
}

// ── Row ids ─────────────────────────────────────────────────────────────

pub unsafe fn sqlite3_last_insert_rowid(db: *mut c_void) -> i64 {
    sys::sqlite3_last_insert_rowid(db.cast())
}

// ── Serialization ───────────────────────────────────────────────────────

pub unsafe fn sqlite3_serialize(
    db: *mut c_void,
    z_schema: *const c_char,
    pi_size: *mut i64,
    m_flags: c_uint,
) -> *mut u8 {
    sys::sqlite3_serialize(db.cast(), z_schema, pi_size, m_flags).cast()
}

pub unsafe fn sqlite3_deserialize(
    db: *mut c_void,
    z_schema: *const c_char,
    p_data: *mut u8,
    sz_db: i64,
    sz_buf: i64,
    m_flags: c_uint,
) -> c_int {
    sys::sqlite3_deserialize(db.cast(), z_schema, p_data.cast(), sz_db, sz_buf, m_flags)
}
