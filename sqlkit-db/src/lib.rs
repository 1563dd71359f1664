//! Minimal safe `SQLite` wrapper used by sqlkit.
//!
//! This crate provides a small, safe Rust API over the `SQLite` C FFI.
//! The raw symbols come from the amalgamation that `rusqlite` bundles
//! (through its `libsqlite3-sys` re-export), so no system `SQLite` is needed.
//!
//! Consumer code (registry, executor, snapshot codec) uses only the safe
//! types defined here and never touches raw FFI directly. The `ffi` module is
//! the **only** file that names the backend's C types; `unsafe` blocks are
//! confined to this crate.

mod ffi;

mod connection;
pub mod error;
mod statement;
pub mod value;

pub use connection::{Connection, OpenMode};
pub use error::{DbError, DbErrorCode, DbResult};
pub use statement::{ColumnType, Statement, StepResult};
pub use value::Value;
