//! Convenient imports for common functionality.

pub use crate::database::{ConnectionSource, Database, PoolStatus};
pub use crate::error::SqlWeaveError;
pub use crate::migrate::migrate;
pub use crate::query::{CompiledSql, QueryPart, SqlArg, SqlDialect, SqlFragment};
pub use crate::repository::{CrudRepository, Entity, Relationship};
pub use crate::row::Row;
pub use crate::value::SqlValue;
