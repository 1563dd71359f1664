//! Registration options and database specifications.

use std::path::PathBuf;
use std::str::FromStr;

/// Logical name used when a [`DatabaseSpec`] does not carry one.
pub const DEFAULT_DATABASE_NAME: &str = "main";

/// How a database is registered with [`SqlKit::register`](crate::SqlKit::register).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterOptions {
    /// Check that the file exists and opens before registering it.
    pub test_before_register: bool,
    /// Hold one connection for the lifetime of the registration instead of
    /// opening one per call.
    pub keep_open: bool,
}

impl Default for RegisterOptions {
    fn default() -> Self {
        Self {
            test_before_register: true,
            keep_open: false,
        }
    }
}

impl RegisterOptions {
    /// Returns the default options: validated, opened per call.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets [`test_before_register`](Self::test_before_register).
    #[must_use]
    pub const fn test_before_register(mut self, test: bool) -> Self {
        self.test_before_register = test;
        self
    }

    /// Sets [`keep_open`](Self::keep_open).
    #[must_use]
    pub const fn keep_open(mut self, keep_open: bool) -> Self {
        self.keep_open = keep_open;
        self
    }
}

/// A `name=path` pair naming a database file.
///
/// A bare path is accepted and registered under [`DEFAULT_DATABASE_NAME`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSpec {
    /// Logical name.
    pub name: String,
    /// Database file.
    pub path: PathBuf,
}

/// Errors parsing a [`DatabaseSpec`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DatabaseSpecError {
    /// The name part of `name=path` is empty.
    #[error("database name must not be empty")]
    EmptyName,
    /// The path part is empty.
    #[error("database path must not be empty")]
    EmptyPath,
}

impl FromStr for DatabaseSpec {
    type Err = DatabaseSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, path) = match s.split_once('=') {
            Some((name, path)) => (name.trim(), path.trim()),
            None => (DEFAULT_DATABASE_NAME, s.trim()),
        };
        if name.is_empty() {
            return Err(DatabaseSpecError::EmptyName);
        }
        if path.is_empty() {
            return Err(DatabaseSpecError::EmptyPath);
        }
        Ok(Self {
            name: name.to_string(),
            path: PathBuf::from(path),
        })
    }
}
