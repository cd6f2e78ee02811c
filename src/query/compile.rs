use crate::error::SqlWeaveError;
use crate::value::SqlValue;

use super::{QueryPart, SqlDialect, SqlFragment};

/// The flattened result of compiling a [`SqlFragment`].
///
/// Invariant: `values.len()` equals the number of placeholders in `text`, and
/// placeholder *i* corresponds to `values[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSql {
    /// A single SQL string with nested fragments flattened and every
    /// parameter replaced by a backend placeholder, in encounter order.
    pub text: String,
    /// Unwrapped parameter values, in the same order the placeholders appear
    /// in `text`.
    pub values: Vec<SqlValue>,
}

impl SqlFragment {
    /// Compile against a dialect's fixed placeholder and identifier
    /// conventions.
    ///
    /// Fragments carry no backend state, so recompiling one fragment against
    /// several dialects is always valid.
    ///
    /// # Errors
    /// Returns `SqlWeaveError::CompileError` if an identifier cannot be quoted
    /// for this dialect.
    pub fn compile(&self, dialect: SqlDialect) -> Result<CompiledSql, SqlWeaveError> {
        self.compile_with(
            |index| dialect.placeholder(index),
            |name| dialect.quote_identifier(name),
        )
    }

    /// Compile with explicit strategy functions.
    ///
    /// `placeholder` is called with the count of parameters collected so far
    /// (zero-based), not with the part's position; literal and identifier
    /// parts consume no placeholder slots. `identifier` quotes a name for the
    /// target backend and may reject it.
    ///
    /// Traversal is depth-first and left-to-right. A nested fragment
    /// contributes its own parts at the point of nesting, so placeholder
    /// numbering runs straight through nesting levels.
    ///
    /// # Errors
    /// Propagates any error the identifier strategy returns.
    pub fn compile_with<P, I>(
        &self,
        placeholder: P,
        identifier: I,
    ) -> Result<CompiledSql, SqlWeaveError>
    where
        P: Fn(usize) -> String,
        I: Fn(&str) -> Result<String, SqlWeaveError>,
    {
        let mut text = String::new();
        let mut values = Vec::new();

        append_parts(self, &mut text, &mut values, &placeholder, &identifier)?;

        Ok(CompiledSql { text, values })
    }
}

fn append_parts<P, I>(
    fragment: &SqlFragment,
    text: &mut String,
    values: &mut Vec<SqlValue>,
    placeholder: &P,
    identifier: &I,
) -> Result<(), SqlWeaveError>
where
    P: Fn(usize) -> String,
    I: Fn(&str) -> Result<String, SqlWeaveError>,
{
    for part in fragment.parts() {
        match part {
            QueryPart::Literal(literal) => text.push_str(literal),
            QueryPart::Param(value) => {
                text.push_str(&placeholder(values.len()));
                values.push(value.clone());
            }
            QueryPart::Identifier(name) => text.push_str(&identifier(name)?),
            QueryPart::Nested(nested) => {
                append_parts(nested, text, values, placeholder, identifier)?;
            }
        }
    }

    Ok(())
}
