//! Generic persistence over fragment composition.
//!
//! [`CrudRepository`] is a thin consumer of [`SqlFragment`] and
//! [`Database::query`]: every statement it issues is composed from
//! identifiers and bound parameters, so table and column names pass through
//! dialect quoting and attribute values are never interpolated.

use std::collections::HashMap;
use std::marker::PhantomData;

use crate::database::Database;
use crate::error::SqlWeaveError;
use crate::query::SqlFragment;
use crate::row::Row;
use crate::value::SqlValue;

/// A persisted type a [`CrudRepository`] can load and store.
pub trait Entity: Sized {
    /// Table the entity lives in.
    const TABLE: &'static str;
    /// Primary key column.
    const PRIMARY_KEY: &'static str;

    /// Build an instance from a result row.
    ///
    /// # Errors
    /// Implementations fail when a required column is missing or has an
    /// unexpected type.
    fn from_row(row: &Row) -> Result<Self, SqlWeaveError>;

    /// The value of this instance's primary key column.
    fn primary_key_value(&self) -> SqlValue;
}

/// A registered relationship: rows in `table` whose `foreign_key` column
/// points at the owning entity's primary key.
#[derive(Debug, Clone)]
pub struct Relationship {
    pub table: String,
    pub foreign_key: String,
}

/// Generic get/search/create/update/delete over one [`Entity`] type.
pub struct CrudRepository<'db, E: Entity> {
    database: &'db Database,
    scope: Option<SqlFragment>,
    relationships: HashMap<String, Relationship>,
    _entity: PhantomData<E>,
}

impl<'db, E: Entity> CrudRepository<'db, E> {
    #[must_use]
    pub fn new(database: &'db Database) -> Self {
        Self {
            database,
            scope: None,
            relationships: HashMap::new(),
            _entity: PhantomData,
        }
    }

    /// Fix a predicate fragment that is ANDed onto every `search`.
    ///
    /// The fragment must be a valid boolean sub-expression; like caller
    /// filters, it is not validated here and a malformed one surfaces as an
    /// execution error when a search runs.
    #[must_use]
    pub fn with_scope(mut self, scope: SqlFragment) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Register a named relationship for [`CrudRepository::related`].
    #[must_use]
    pub fn with_relationship(
        mut self,
        name: impl Into<String>,
        table: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        self.relationships.insert(
            name.into(),
            Relationship {
                table: table.into(),
                foreign_key: foreign_key.into(),
            },
        );
        self
    }

    /// Load the entity whose primary key equals `key`.
    ///
    /// # Errors
    /// Fails with `NotFound` on zero rows and `TooManyResults` on more than
    /// one, besides ordinary query failures.
    pub async fn get(&self, key: impl Into<SqlValue>) -> Result<E, SqlWeaveError> {
        let key = key.into();
        let query = SqlFragment::raw("SELECT * FROM ")
            .append_ident(E::TABLE)
            .append_raw(" WHERE ")
            .append_ident(E::PRIMARY_KEY)
            .append_raw(" = ")
            .append_param(key.clone());

        let rows = self.database.query(&query).await?;
        Self::exactly_one(
            rows,
            &format!("in table {} for {} = {key:?}", E::TABLE, E::PRIMARY_KEY),
        )
    }

    /// Load every entity matching the optional filter, in the optional order.
    ///
    /// The repository's scope and the caller's filter are combined as
    /// `WHERE (scope) AND (filter)`. Both are trusted to be well-formed
    /// sub-expressions; a malformed one produces an invalid statement that
    /// fails at execution time.
    ///
    /// # Errors
    /// Propagates query failures.
    pub async fn search(
        &self,
        filter: Option<SqlFragment>,
        order: Option<SqlFragment>,
    ) -> Result<Vec<E>, SqlWeaveError> {
        let mut query = SqlFragment::raw("SELECT * FROM ").append_ident(E::TABLE);

        let predicate = match (self.scope.clone(), filter) {
            (Some(scope), Some(filter)) => Some(
                SqlFragment::raw("(")
                    .append(scope)
                    .append_raw(") AND (")
                    .append(filter)
                    .append_raw(")"),
            ),
            (Some(scope), None) => Some(scope),
            (None, Some(filter)) => Some(filter),
            (None, None) => None,
        };
        if let Some(predicate) = predicate {
            query = query.append_raw(" WHERE ").append(predicate);
        }
        if let Some(order) = order {
            query = query.append_raw(" ORDER BY ").append(order);
        }

        let rows = self.database.query(&query).await?;
        rows.iter().map(E::from_row).collect()
    }

    /// Insert a row with the given attributes and return the stored entity.
    ///
    /// # Errors
    /// Propagates query failures; fails like [`CrudRepository::get`] if the
    /// backend does not return exactly the inserted row.
    pub async fn create(&self, attributes: &[(&str, SqlValue)]) -> Result<E, SqlWeaveError> {
        let fields = attributes
            .iter()
            .map(|(key, _)| SqlFragment::ident(*key));
        let values = attributes
            .iter()
            .map(|(_, value)| SqlFragment::param(value.clone()));

        let query = SqlFragment::raw("INSERT INTO ")
            .append_ident(E::TABLE)
            .append_raw(" (")
            .append(SqlFragment::join_comma(fields))
            .append_raw(") VALUES (")
            .append(SqlFragment::join_comma(values))
            .append_raw(") RETURNING *");

        let rows = self.database.query(&query).await?;
        Self::exactly_one(
            rows,
            &format!("returned from insert into table {}", E::TABLE),
        )
    }

    /// Update the entity's row with the given attributes and return the
    /// stored result.
    ///
    /// # Errors
    /// Fails with `NotFound` if the row no longer exists, `TooManyResults` if
    /// the primary key is not unique, besides ordinary query failures.
    pub async fn update(
        &self,
        entity: &E,
        attributes: &[(&str, SqlValue)],
    ) -> Result<E, SqlWeaveError> {
        let key = entity.primary_key_value();
        let context = format!("in table {} for {} = {key:?}", E::TABLE, E::PRIMARY_KEY);
        let assignments = attributes.iter().map(|(field, value)| {
            SqlFragment::ident(*field)
                .append_raw(" = ")
                .append_param(value.clone())
        });

        let query = SqlFragment::raw("UPDATE ")
            .append_ident(E::TABLE)
            .append_raw(" SET ")
            .append(SqlFragment::join_comma(assignments))
            .append_raw(" WHERE ")
            .append_ident(E::PRIMARY_KEY)
            .append_raw(" = ")
            .append_param(key)
            .append_raw(" RETURNING *");

        let rows = self.database.query(&query).await?;
        Self::exactly_one(rows, &context)
    }

    /// Delete the entity's row.
    ///
    /// # Errors
    /// Propagates query failures.
    pub async fn delete(&self, entity: &E) -> Result<(), SqlWeaveError> {
        let query = SqlFragment::raw("DELETE FROM ")
            .append_ident(E::TABLE)
            .append_raw(" WHERE ")
            .append_ident(E::PRIMARY_KEY)
            .append_raw(" = ")
            .append_param(entity.primary_key_value());

        self.database.execute(&query).await?;
        Ok(())
    }

    /// Load the rows of a registered relationship for one entity.
    ///
    /// # Errors
    /// Fails with `RelationshipNotFound` for an unregistered name, besides
    /// ordinary query failures.
    pub async fn related(&self, name: &str, entity: &E) -> Result<Vec<Row>, SqlWeaveError> {
        let relationship = self.relationships.get(name).ok_or_else(|| {
            SqlWeaveError::RelationshipNotFound(format!(
                "no relationship {name:?} registered for table {}",
                E::TABLE
            ))
        })?;

        let query = SqlFragment::raw("SELECT * FROM ")
            .append_ident(relationship.table.clone())
            .append_raw(" WHERE ")
            .append_ident(relationship.foreign_key.clone())
            .append_raw(" = ")
            .append_param(entity.primary_key_value());

        self.database.query(&query).await
    }

    fn exactly_one(rows: Vec<Row>, context: &str) -> Result<E, SqlWeaveError> {
        match rows.len() {
            0 => Err(SqlWeaveError::NotFound(format!("no row {context}"))),
            1 => E::from_row(&rows[0]),
            n => Err(SqlWeaveError::TooManyResults(format!("{n} rows {context}"))),
        }
    }
}
