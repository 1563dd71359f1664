//! The public data-access context.

use std::path::Path;

use log::error;
use sqlkit_db::Connection;

use crate::config::RegisterOptions;
use crate::error::{SqlKitError, SqlKitResult};
use crate::executor;
use crate::outcome::QueryOutcome;
use crate::projection::{project_row, Projectable};
use crate::query::QueryDescriptor;
use crate::registry::{self, Registry};

/// Named database connections and the operations run against them.
///
/// Every operation comes in two flavours: the plain one logs failures and
/// reports them as `false` (or an unsuccessful [`QueryOutcome`]), the
/// `try_*` one returns the [`SqlKitError`].
///
/// `SqlKit` is `Send` but not `Sync`; use it from one thread at a time.
/// Kept-open connections are closed when their name is unregistered or the
/// context is dropped.
#[derive(Debug, Default)]
pub struct SqlKit {
    pub(crate) registry: Registry,
}

impl SqlKit {
    /// Creates a context with no registered databases.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the registrations.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    // ── Registration ────────────────────────────────────────────────────

    /// Creates an empty database file at `path`.
    #[must_use]
    pub fn create(path: &Path) -> bool {
        report("create database", Self::try_create(path))
    }

    /// See [`create`](Self::create).
    ///
    /// # Errors
    ///
    /// [`SqlKitError::OpenFailed`] when the file cannot be created.
    pub fn try_create(path: &Path) -> SqlKitResult<()> {
        registry::create(path)
    }

    /// Registers `path` under `name`. Registering an existing name returns
    /// `true` and leaves its path unchanged.
    pub fn register(&mut self, name: &str, path: &Path, options: RegisterOptions) -> bool {
        report("register database", self.try_register(name, path, options))
    }

    /// See [`register`](Self::register).
    ///
    /// # Errors
    ///
    /// [`SqlKitError::InvalidDatabase`] when validation is requested and
    /// fails.
    pub fn try_register(
        &mut self,
        name: &str,
        path: &Path,
        options: RegisterOptions,
    ) -> SqlKitResult<()> {
        self.registry.register(name, path, options)
    }

    /// Forgets `name`, closing its kept-open connection. Unknown names are
    /// ignored.
    pub fn unregister(&mut self, name: &str) {
        self.registry.unregister(name);
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.registry.is_registered(name)
    }

    /// Checks that `path` exists and, with `test_by_opening`, opens.
    #[must_use]
    pub fn validate(path: &Path, test_by_opening: bool) -> bool {
        registry::validate(path, test_by_opening)
    }

    // ── Statements ──────────────────────────────────────────────────────

    /// Runs statements that return no rows.
    #[must_use]
    pub fn exec(&self, name: &str, sql: &str) -> bool {
        report("exec", self.try_exec(name, sql))
    }

    /// See [`exec`](Self::exec).
    ///
    /// # Errors
    ///
    /// Resolution errors and [`SqlKitError::Execution`].
    pub fn try_exec(&self, name: &str, sql: &str) -> SqlKitResult<()> {
        self.with_connection(name, |conn| executor::exec(conn, sql))
    }

    /// Runs `sql` and decodes its rows.
    #[must_use]
    pub fn query(&self, name: &str, sql: &str) -> QueryOutcome {
        outcome("query", self.try_query(name, sql))
    }

    /// See [`query`](Self::query).
    ///
    /// # Errors
    ///
    /// Resolution, prepare and step errors.
    pub fn try_query(&self, name: &str, sql: &str) -> SqlKitResult<QueryOutcome> {
        self.with_connection(name, |conn| executor::query(conn, sql))
    }

    /// Runs the SELECT described by `descriptor`.
    #[must_use]
    pub fn select(&self, name: &str, descriptor: &QueryDescriptor) -> QueryOutcome {
        outcome("select", self.try_select(name, descriptor))
    }

    /// See [`select`](Self::select).
    ///
    /// # Errors
    ///
    /// [`SqlKitError::EmptyInput`] for a descriptor without tables or
    /// fields, otherwise as [`try_query`](Self::try_query).
    pub fn try_select(&self, name: &str, descriptor: &QueryDescriptor) -> SqlKitResult<QueryOutcome> {
        descriptor.validate()?;
        self.try_query(name, &descriptor.to_sql())
    }

    // ── Projection ──────────────────────────────────────────────────────

    /// Runs `sql` and copies the first row into `target`.
    pub fn query_into<T: Projectable + ?Sized>(&self, name: &str, sql: &str, target: &mut T) -> bool {
        report("query into object", self.try_query_into(name, sql, target))
    }

    /// See [`query_into`](Self::query_into).
    ///
    /// # Errors
    ///
    /// [`SqlKitError::NoTargetObject`] when `target` has no fields,
    /// [`SqlKitError::EmptyResultSet`] when no row matched, otherwise as
    /// [`try_query`](Self::try_query).
    pub fn try_query_into<T: Projectable + ?Sized>(
        &self,
        name: &str,
        sql: &str,
        target: &mut T,
    ) -> SqlKitResult<()> {
        if target.field_slots().is_empty() {
            return Err(SqlKitError::NoTargetObject);
        }
        let outcome = self.try_query(name, sql)?;
        let row = outcome.first_row().ok_or(SqlKitError::EmptyResultSet)?;
        project_row(row, target);
        Ok(())
    }

    /// Runs `descriptor` limited to one row and copies it into `target`.
    pub fn select_into<T: Projectable + ?Sized>(
        &self,
        name: &str,
        descriptor: &QueryDescriptor,
        target: &mut T,
    ) -> bool {
        report("select into object", self.try_select_into(name, descriptor, target))
    }

    /// See [`select_into`](Self::select_into).
    ///
    /// # Errors
    ///
    /// As [`try_select`](Self::try_select) and
    /// [`try_query_into`](Self::try_query_into).
    pub fn try_select_into<T: Projectable + ?Sized>(
        &self,
        name: &str,
        descriptor: &QueryDescriptor,
        target: &mut T,
    ) -> SqlKitResult<()> {
        descriptor.validate()?;
        let single = descriptor.clone().limit(1).offset(0);
        self.try_query_into(name, &single.to_sql(), target)
    }

    /// Resolves `name` and runs `f` on the connection. A transient
    /// connection is closed when `f` returns.
    pub(crate) fn with_connection<T>(
        &self,
        name: &str,
        f: impl FnOnce(&Connection) -> SqlKitResult<T>,
    ) -> SqlKitResult<T> {
        let conn = self.registry.resolve(name)?;
        f(&conn)
    }
}

/// Logs a failed operation and converts the result to a flag.
pub(crate) fn report<T>(operation: &str, result: SqlKitResult<T>) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            error!("{operation} failed: {e}");
            false
        }
    }
}

fn outcome(operation: &str, result: SqlKitResult<QueryOutcome>) -> QueryOutcome {
    result.unwrap_or_else(|e| {
        error!("{operation} failed: {e}");
        QueryOutcome::failed(&e)
    })
}
