//! Whole-database images.
//!
//! [`SqlKit::dump`] copies the `main` schema of a registered database into a
//! byte buffer; [`SqlKit::restore`] swaps such a buffer in as a read-only
//! replacement of `main`.

use log::{debug, error};

use crate::error::{SqlKitError, SqlKitResult};
use crate::kit::SqlKit;
use crate::registry::open_transient;

const MAIN_SCHEMA: &str = "main";

impl SqlKit {
    /// Returns the full image of `name`'s `main` schema, or an empty buffer
    /// on failure.
    #[must_use]
    pub fn dump(&self, name: &str) -> Vec<u8> {
        self.try_dump(name).unwrap_or_else(|e| {
            log_snapshot_error("dump", name, &e);
            Vec::new()
        })
    }

    /// See [`dump`](Self::dump).
    ///
    /// # Errors
    ///
    /// Resolution errors, or [`SqlKitError::Execution`] when the engine
    /// cannot produce the image.
    pub fn try_dump(&self, name: &str) -> SqlKitResult<Vec<u8>> {
        self.with_connection(name, |conn| {
            let image = conn
                .serialize(MAIN_SCHEMA)
                .map_err(|source| SqlKitError::Execution {
                    statement: format!("serialize '{MAIN_SCHEMA}' of '{name}'"),
                    source,
                })?;
            debug!("dumped {} bytes from '{name}'", image.len());
            Ok(image)
        })
    }

    /// Replaces `name`'s `main` schema with `image`, read-only.
    ///
    /// When `name` has no kept-open connection a new one is opened and kept
    /// for the registration, because a transient connection would discard
    /// the image as soon as it closed.
    pub fn restore(&mut self, name: &str, image: &[u8]) -> bool {
        match self.try_restore(name, image) {
            Ok(()) => true,
            Err(e) => {
                log_snapshot_error("restore", name, &e);
                false
            }
        }
    }

    /// See [`restore`](Self::restore).
    ///
    /// # Errors
    ///
    /// Resolution errors, or [`SqlKitError::Execution`] when the engine
    /// rejects the image.
    pub fn try_restore(&mut self, name: &str, image: &[u8]) -> SqlKitResult<()> {
        let deserialize_error = |source| SqlKitError::Execution {
            statement: format!("deserialize '{MAIN_SCHEMA}' of '{name}'"),
            source,
        };

        if self.registry.has_kept_open(name) {
            let conn = self.registry.resolve(name)?;
            conn.deserialize(MAIN_SCHEMA, image)
                .map_err(deserialize_error)?;
        } else {
            let path = self
                .registry
                .path(name)
                .ok_or_else(|| SqlKitError::NotRegistered(name.to_string()))?;
            let conn = open_transient(path)?;
            conn.deserialize(MAIN_SCHEMA, image)
                .map_err(deserialize_error)?;
            self.registry.attach_kept_open(name, conn)?;
        }
        debug!("restored {} bytes into '{name}'", image.len());
        Ok(())
    }
}

fn log_snapshot_error(operation: &str, name: &str, err: &SqlKitError) {
    match err {
        SqlKitError::Execution { source, .. } => error!(
            "snapshot {operation} of '{name}' failed: code {} ({}): {}",
            source.code.0,
            source.code.name(),
            source.message
        ),
        other => error!("snapshot {operation} of '{name}' failed: {other}"),
    }
}
