//! `sqlkit` is a data-access layer over embedded `SQLite` databases.
//!
//! Databases are registered under logical names in a [`SqlKit`] context and
//! either opened per call or kept open for the registration's lifetime.
//! Queries are run as raw SQL or built from [`QueryDescriptor`]s, their rows
//! decoded into [`Row`]s, optionally copied into host structs through
//! [`Projectable`], and whole databases can be dumped to and restored from
//! byte buffers.
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use sqlkit_core::{QueryDescriptor, RegisterOptions, SqlKit};
//!
//! let mut kit = SqlKit::new();
//! let path = Path::new("game.sqlite");
//! assert!(SqlKit::create(path));
//! assert!(kit.register("game", path, RegisterOptions::default()));
//!
//! let outcome = kit.select("game", &QueryDescriptor::new(["players"], ["*"]).limit(10));
//! for row in outcome.rows() {
//!     println!("{:?}", row.to_string_pairs());
//! }
//! ```

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod config;
pub mod error;
pub mod executor;
mod kit;
pub mod logger;
pub mod outcome;
pub mod projection;
pub mod query;
pub mod registry;
mod rows;
mod schema;
mod snapshot;

pub use config::{DatabaseSpec, RegisterOptions};
pub use error::{SqlKitError, SqlKitResult};
pub use kit::SqlKit;
pub use outcome::{DecodedValue, Field, QueryOutcome, Row};
pub use projection::{FieldSlot, Projectable, SlotTarget};
pub use query::{FieldKind, QueryDescriptor, RowField};
pub use schema::TableHandle;
