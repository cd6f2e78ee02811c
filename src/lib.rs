//! Composable, injection-safe SQL fragments with pooled transactional
//! sequencing.
//!
//! The crate has two halves. [`SqlFragment`] is a pure, immutable query
//! representation built from literal text, bound parameters, quoted
//! identifiers, and nested fragments; compiling one flattens it into a single
//! SQL string plus an ordered value list for a backend's placeholder and
//! identifier conventions. [`Database`] executes compiled fragments against a
//! shared connection pool and provides [`Database::sequence`], which reserves
//! one dedicated connection for the duration of a callback so multi-statement
//! transactions never interleave with concurrent pool traffic.
//!
//! [`migrate()`] and [`CrudRepository`] are consumers of those two contracts:
//! tracked transactional schema migrations and generic persistence.

#[cfg(not(any(feature = "postgres", feature = "sqlite")))]
compile_error!("at least one backend feature (\"postgres\", \"sqlite\") must be enabled");

pub mod database;
pub mod error;
pub mod migrate;
pub mod query;
pub mod repository;
pub mod row;
pub mod value;

#[cfg(feature = "postgres")]
pub(crate) mod postgres;
#[cfg(feature = "sqlite")]
pub(crate) mod sqlite;

pub mod prelude;

pub use database::{ConnectionSource, Database, PoolStatus};
pub use error::SqlWeaveError;
pub use migrate::migrate;
pub use query::{CompiledSql, QueryPart, SqlArg, SqlDialect, SqlFragment};
pub use repository::{CrudRepository, Entity, Relationship};
pub use row::Row;
pub use value::SqlValue;
