//! Composable SQL fragments.
//!
//! A [`SqlFragment`] is an immutable sequence of parts: literal text, bound
//! parameters, quoted identifiers, and nested fragments. Fragments carry no
//! backend state; [`SqlFragment::compile`] flattens one into a single SQL
//! string plus an ordered parameter list for a specific dialect.
//!
//! Anything interpolated through [`SqlArg`] that is not already a fragment,
//! parameter, or identifier becomes a bound parameter. That default is the
//! injection-safety mechanism: raw text only enters a fragment through an
//! explicit [`SqlFragment::raw`] call.

mod compile;
mod dialect;

pub use compile::CompiledSql;
pub use dialect::SqlDialect;

use crate::value::SqlValue;

/// One part of a [`SqlFragment`].
#[derive(Debug, Clone, PartialEq)]
pub enum QueryPart {
    /// Literal SQL text, appended to the compiled statement verbatim.
    Literal(String),
    /// A bound parameter. Compiles to a backend placeholder, never to text.
    Param(SqlValue),
    /// A table or column name. Quoted per dialect, never bound as data.
    Identifier(String),
    /// A nested fragment, flattened in place during compilation.
    Nested(SqlFragment),
}

/// An immutable, recursively composable SQL statement.
///
/// Composition always produces a new fragment; existing fragments are never
/// mutated. The part order fixed at construction is the sole determinant of
/// placeholder-to-value correspondence at compile time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SqlFragment {
    parts: Vec<QueryPart>,
}

impl SqlFragment {
    /// An empty fragment. Compiles to empty text and no values.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a fragment from an explicit part list.
    #[must_use]
    pub fn from_parts(parts: Vec<QueryPart>) -> Self {
        Self { parts }
    }

    /// A fragment holding one piece of literal SQL text.
    ///
    /// This is the only way raw text enters a fragment. Never pass
    /// caller-supplied data here; bind it with [`SqlFragment::param`] instead.
    #[must_use]
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            parts: vec![QueryPart::Literal(text.into())],
        }
    }

    /// A fragment holding one bound parameter.
    #[must_use]
    pub fn param(value: impl Into<SqlValue>) -> Self {
        Self {
            parts: vec![QueryPart::Param(value.into())],
        }
    }

    /// A fragment holding one identifier (table or column name).
    #[must_use]
    pub fn ident(name: impl Into<String>) -> Self {
        Self {
            parts: vec![QueryPart::Identifier(name.into())],
        }
    }

    /// Interleave literal text with interpolated arguments.
    ///
    /// Mirrors template-string composition: `literals[0]`, `args[0]`,
    /// `literals[1]`, `args[1]`, and so on. Arguments already tagged as
    /// fragments, parameters, or identifiers are kept as-is; everything else
    /// arrives as a [`SqlArg::Param`] through its `From` conversion and is
    /// bound, not interpolated.
    ///
    /// ```rust
    /// use sqlweave::prelude::*;
    ///
    /// let q = SqlFragment::from_template(
    ///     &["SELECT * FROM ", " WHERE id = ", ""],
    ///     vec![SqlArg::ident("users"), SqlArg::from(42)],
    /// );
    /// let compiled = q.compile(SqlDialect::Postgres).unwrap();
    /// assert_eq!(compiled.text, r#"SELECT * FROM "users" WHERE id = $1"#);
    /// ```
    #[must_use]
    pub fn from_template(literals: &[&str], args: Vec<SqlArg>) -> Self {
        let mut parts = Vec::with_capacity(literals.len() + args.len());
        let mut args = args.into_iter();

        for (i, literal) in literals.iter().enumerate() {
            if i > 0 {
                if let Some(arg) = args.next() {
                    parts.push(arg.into_part());
                }
            }
            if !literal.is_empty() {
                parts.push(QueryPart::Literal((*literal).to_string()));
            }
        }
        // More args than literal gaps: append the rest in order.
        for arg in args {
            parts.push(arg.into_part());
        }

        Self { parts }
    }

    /// Join fragments with a delimiter fragment.
    ///
    /// The delimiter is a fragment rather than a raw string so that no
    /// injection path exists through the delimiter.
    #[must_use]
    pub fn join(fragments: impl IntoIterator<Item = SqlFragment>, delimiter: &SqlFragment) -> Self {
        let mut parts = Vec::new();

        for (i, fragment) in fragments.into_iter().enumerate() {
            if i > 0 {
                parts.push(QueryPart::Nested(delimiter.clone()));
            }
            parts.push(QueryPart::Nested(fragment));
        }

        Self { parts }
    }

    /// [`SqlFragment::join`] with the default `", "` delimiter.
    #[must_use]
    pub fn join_comma(fragments: impl IntoIterator<Item = SqlFragment>) -> Self {
        Self::join(fragments, &SqlFragment::raw(", "))
    }

    /// A new fragment consisting of this one followed by `other`.
    #[must_use]
    pub fn append(mut self, other: SqlFragment) -> Self {
        self.parts.push(QueryPart::Nested(other));
        self
    }

    /// A new fragment with literal text appended.
    #[must_use]
    pub fn append_raw(mut self, text: impl Into<String>) -> Self {
        self.parts.push(QueryPart::Literal(text.into()));
        self
    }

    /// A new fragment with a bound parameter appended.
    #[must_use]
    pub fn append_param(mut self, value: impl Into<SqlValue>) -> Self {
        self.parts.push(QueryPart::Param(value.into()));
        self
    }

    /// A new fragment with an identifier appended.
    #[must_use]
    pub fn append_ident(mut self, name: impl Into<String>) -> Self {
        self.parts.push(QueryPart::Identifier(name.into()));
        self
    }

    /// The ordered parts of this fragment.
    #[must_use]
    pub fn parts(&self) -> &[QueryPart] {
        &self.parts
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// An interpolation argument for [`SqlFragment::from_template`].
///
/// Fragments, parameters, and identifiers pass through unchanged. Every other
/// value reaches this type through a `From<T> for SqlValue` conversion and is
/// wrapped as a bound parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlArg {
    Fragment(SqlFragment),
    Param(SqlValue),
    Identifier(String),
}

impl SqlArg {
    /// Tag a string as an identifier instead of a bound parameter.
    #[must_use]
    pub fn ident(name: impl Into<String>) -> Self {
        SqlArg::Identifier(name.into())
    }

    fn into_part(self) -> QueryPart {
        match self {
            SqlArg::Fragment(fragment) => QueryPart::Nested(fragment),
            SqlArg::Param(value) => QueryPart::Param(value),
            SqlArg::Identifier(name) => QueryPart::Identifier(name),
        }
    }
}

impl From<SqlFragment> for SqlArg {
    fn from(fragment: SqlFragment) -> Self {
        SqlArg::Fragment(fragment)
    }
}

impl From<&SqlFragment> for SqlArg {
    fn from(fragment: &SqlFragment) -> Self {
        SqlArg::Fragment(fragment.clone())
    }
}

impl From<SqlValue> for SqlArg {
    fn from(value: SqlValue) -> Self {
        SqlArg::Param(value)
    }
}

impl From<i64> for SqlArg {
    fn from(value: i64) -> Self {
        SqlArg::Param(value.into())
    }
}

impl From<i32> for SqlArg {
    fn from(value: i32) -> Self {
        SqlArg::Param(value.into())
    }
}

impl From<f64> for SqlArg {
    fn from(value: f64) -> Self {
        SqlArg::Param(value.into())
    }
}

impl From<&str> for SqlArg {
    fn from(value: &str) -> Self {
        SqlArg::Param(value.into())
    }
}

impl From<String> for SqlArg {
    fn from(value: String) -> Self {
        SqlArg::Param(value.into())
    }
}

impl From<bool> for SqlArg {
    fn from(value: bool) -> Self {
        SqlArg::Param(value.into())
    }
}
