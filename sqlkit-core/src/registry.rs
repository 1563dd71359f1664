//! Named database registrations and connection lifetimes.
//!
//! A registration maps a logical name to a file and optionally holds one
//! kept-open [`Connection`]. Every operation resolves its name to a
//! [`ConnectionGuard`]: the kept-open handle when there is one, otherwise a
//! transient handle that is closed when the guard drops.

use std::collections::HashMap;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use sqlkit_db::{Connection, OpenMode};

use crate::config::RegisterOptions;
use crate::error::{SqlKitError, SqlKitResult};

#[derive(Debug)]
struct RegisteredDatabase {
    path: PathBuf,
    kept_open: Option<Connection>,
}

/// Name → database mapping, with at most one kept-open handle per name.
#[derive(Debug, Default)]
pub struct Registry {
    databases: HashMap<String, RegisteredDatabase>,
}

/// A resolved connection.
///
/// Dereferences to the [`Connection`]. Dropping the guard closes the handle
/// only if the guard owns it.
#[derive(Debug)]
pub enum ConnectionGuard<'a> {
    /// Borrowed kept-open handle, owned by the registry.
    KeptOpen(&'a Connection),
    /// Handle opened for this operation alone.
    Transient(Connection),
}

impl ConnectionGuard<'_> {
    /// `true` when dropping the guard closes the handle.
    #[must_use]
    pub const fn owns_handle(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl Deref for ConnectionGuard<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        match self {
            Self::KeptOpen(conn) => conn,
            Self::Transient(conn) => conn,
        }
    }
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` for `path`.
    ///
    /// Registering a name that already exists changes nothing, except that a
    /// missing kept-open handle is opened when `options.keep_open` asks for
    /// one. A kept-open handle that fails to open is logged and the
    /// registration proceeds without it.
    ///
    /// # Errors
    ///
    /// [`SqlKitError::InvalidDatabase`] when `options.test_before_register`
    /// is set and the file is missing or does not open.
    pub fn register(&mut self, name: &str, path: &Path, options: RegisterOptions) -> SqlKitResult<()> {
        if let Some(entry) = self.databases.get_mut(name) {
            debug!("database '{name}' already registered");
            if options.keep_open && entry.kept_open.is_none() {
                entry.kept_open = open_kept(name, &entry.path);
            }
            return Ok(());
        }

        if options.test_before_register && !validate(path, true) {
            return Err(SqlKitError::InvalidDatabase(path.to_path_buf()));
        }

        let kept_open = if options.keep_open {
            open_kept(name, path)
        } else {
            None
        };
        self.databases.insert(
            name.to_string(),
            RegisteredDatabase {
                path: path.to_path_buf(),
                kept_open,
            },
        );
        debug!("registered database '{name}' at {}", path.display());
        Ok(())
    }

    /// Removes `name`, closing its kept-open handle. Unknown names are
    /// ignored.
    pub fn unregister(&mut self, name: &str) {
        if self.databases.remove(name).is_some() {
            debug!("unregistered database '{name}'");
        }
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.databases.contains_key(name)
    }

    /// File registered under `name`.
    #[must_use]
    pub fn path(&self, name: &str) -> Option<&Path> {
        self.databases.get(name).map(|entry| entry.path.as_path())
    }

    /// Whether `name` currently holds a kept-open handle.
    #[must_use]
    pub fn has_kept_open(&self, name: &str) -> bool {
        self.databases
            .get(name)
            .is_some_and(|entry| entry.kept_open.is_some())
    }

    /// Registered names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.databases.keys().map(String::as_str)
    }

    /// Resolves `name` to a connection.
    ///
    /// # Errors
    ///
    /// [`SqlKitError::NotRegistered`] for unknown names,
    /// [`SqlKitError::OpenFailed`] when a transient handle cannot be opened.
    pub fn resolve(&self, name: &str) -> SqlKitResult<ConnectionGuard<'_>> {
        let entry = self
            .databases
            .get(name)
            .ok_or_else(|| SqlKitError::NotRegistered(name.to_string()))?;
        match &entry.kept_open {
            Some(conn) => Ok(ConnectionGuard::KeptOpen(conn)),
            None => open_transient(&entry.path).map(ConnectionGuard::Transient),
        }
    }

    /// Installs `conn` as the kept-open handle of `name`, closing any
    /// previous one.
    ///
    /// # Errors
    ///
    /// [`SqlKitError::NotRegistered`] for unknown names.
    pub fn attach_kept_open(&mut self, name: &str, conn: Connection) -> SqlKitResult<()> {
        let entry = self
            .databases
            .get_mut(name)
            .ok_or_else(|| SqlKitError::NotRegistered(name.to_string()))?;
        entry.kept_open = Some(conn);
        Ok(())
    }
}

/// Opens a handle on an existing database file.
///
/// # Errors
///
/// [`SqlKitError::OpenFailed`] with the engine error.
pub fn open_transient(path: &Path) -> SqlKitResult<Connection> {
    Connection::open(path, OpenMode::ReadWrite).map_err(|source| SqlKitError::OpenFailed {
        path: path.to_path_buf(),
        source,
    })
}

fn open_kept(name: &str, path: &Path) -> Option<Connection> {
    match open_transient(path) {
        Ok(conn) => Some(conn),
        Err(e) => {
            warn!("could not keep database '{name}' open, falling back to per-call handles: {e}");
            None
        }
    }
}

/// Checks that `path` exists and, with `test_by_opening`, that the engine
/// can open it.
#[must_use]
pub fn validate(path: &Path, test_by_opening: bool) -> bool {
    if !path.exists() {
        debug!("{} does not exist", path.display());
        return false;
    }
    if !test_by_opening {
        return true;
    }
    match open_transient(path) {
        Ok(_) => true,
        Err(e) => {
            debug!("open probe failed: {e}");
            false
        }
    }
}

/// Creates an empty database file at `path`. An existing file is left as is.
///
/// # Errors
///
/// [`SqlKitError::OpenFailed`] when the engine cannot create the file.
pub fn create(path: &Path) -> SqlKitResult<()> {
    Connection::open(path, OpenMode::ReadWriteCreate)
        .map(drop)
        .map_err(|source| SqlKitError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })
}
