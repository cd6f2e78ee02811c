use crate::error::SqlWeaveError;

/// Placeholder and identifier conventions for a SQL backend.
///
/// Each variant fixes the strategy pair used by [`SqlFragment::compile`]:
/// numbered `$n` placeholders with double-quoted identifiers for Postgres,
/// anonymous `?` placeholders with backtick identifiers for MySQL-style
/// engines, and `?` with double quotes for `SQLite`.
///
/// [`SqlFragment::compile`]: crate::SqlFragment::compile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlDialect {
    Postgres,
    MySql,
    Sqlite,
}

impl SqlDialect {
    /// The placeholder for the parameter at `index` (zero-based collection
    /// order; Postgres numbering is one-based on the wire).
    #[must_use]
    pub fn placeholder(self, index: usize) -> String {
        match self {
            SqlDialect::Postgres => format!("${}", index + 1),
            SqlDialect::MySql | SqlDialect::Sqlite => "?".to_string(),
        }
    }

    /// Quote an identifier for this dialect.
    ///
    /// The quote character itself is escaped by doubling, so a hostile name
    /// cannot close the quoting. Empty names and names containing NUL are
    /// rejected outright.
    ///
    /// # Errors
    /// Returns `SqlWeaveError::CompileError` for an empty identifier or one
    /// containing a NUL byte.
    pub fn quote_identifier(self, name: &str) -> Result<String, SqlWeaveError> {
        if name.is_empty() {
            return Err(SqlWeaveError::CompileError(
                "identifier must not be empty".to_string(),
            ));
        }
        if name.contains('\0') {
            return Err(SqlWeaveError::CompileError(format!(
                "identifier contains a NUL byte: {name:?}"
            )));
        }

        Ok(match self {
            SqlDialect::Postgres | SqlDialect::Sqlite => {
                format!("\"{}\"", name.replace('"', "\"\""))
            }
            SqlDialect::MySql => format!("`{}`", name.replace('`', "``")),
        })
    }
}
