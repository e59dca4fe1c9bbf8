// Statement builders scoped to one table.
//
// Split into one sub-module per statement kind:
// - select: projection, predicates, ordering, pagination (also used for counts)
// - insert: column/value map
// - update: assignment map plus predicates
// - delete: predicates only
//
// Builders are plain values: every mutator consumes self and returns a new
// builder, so divergent chains built from one base never interfere. Rendering
// produces PostgreSQL-style `$n` placeholders numbered left to right, with the
// parameter vector in matching order.

mod delete;
mod insert;
mod select;
mod update;

pub use delete::DeleteBuilder;
pub use insert::InsertBuilder;
pub use select::SelectBuilder;
pub use update::UpdateBuilder;

use thiserror::Error;

use crate::value::SqlValue;

/// Statement assembly failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct BuildError(pub(crate) String);

/// A raw SQL fragment with `?` placeholders and the parameters bound to them.
///
/// Fragments carry the pieces plain column predicates cannot express, such as
/// PostGIS expressions. Placeholders are rewritten to `$n` when the enclosing
/// statement renders.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub(crate) sql: String,
    pub(crate) params: Vec<SqlValue>,
}

impl Expr {
    #[must_use]
    pub fn new(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// A column assignment: either a plain parameter or a SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Value(SqlValue),
    Expr(Expr),
}

impl From<SqlValue> for Arg {
    fn from(value: SqlValue) -> Self {
        Arg::Value(value)
    }
}

impl From<Expr> for Arg {
    fn from(expr: Expr) -> Self {
        Arg::Expr(expr)
    }
}

/// Accumulates rendered SQL and its parameter vector, rewriting each `?` in
/// pushed fragments to the next `$n` placeholder.
#[derive(Debug, Default)]
pub(crate) struct SqlWriter {
    sql: String,
    params: Vec<SqlValue>,
}

impl SqlWriter {
    pub(crate) fn push_raw(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    /// Append a fragment, renumbering its `?` placeholders.
    ///
    /// # Errors
    /// Returns `BuildError` if the fragment's placeholder count does not match
    /// its parameter count.
    pub(crate) fn push_fragment(
        &mut self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<(), BuildError> {
        let holes = sql.matches('?').count();
        if holes != params.len() {
            return Err(BuildError(format!(
                "fragment {sql:?} has {holes} placeholders but {} parameters",
                params.len()
            )));
        }

        let mut remaining = params.iter();
        for piece in sql.split_inclusive('?') {
            match piece.strip_suffix('?') {
                Some(head) => {
                    self.sql.push_str(head);
                    self.params.push(
                        remaining
                            .next()
                            .cloned()
                            .unwrap_or(SqlValue::Null),
                    );
                    self.sql.push('$');
                    self.sql.push_str(&self.params.len().to_string());
                }
                None => self.sql.push_str(piece),
            }
        }
        Ok(())
    }

    pub(crate) fn push_expr(&mut self, expr: &Expr) -> Result<(), BuildError> {
        self.push_fragment(&expr.sql, &expr.params)
    }

    /// Append a WHERE clause from the accumulated conditions, if any.
    pub(crate) fn push_conditions(&mut self, conditions: &[Expr]) -> Result<(), BuildError> {
        for (i, cond) in conditions.iter().enumerate() {
            self.push_raw(if i == 0 { " WHERE " } else { " AND " });
            self.push_expr(cond)?;
        }
        Ok(())
    }

    pub(crate) fn finish(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.params)
    }
}

/// Render an equality predicate for one column.
pub(crate) fn eq(column: &str, value: SqlValue) -> Expr {
    Expr::new(format!("{column} = ?"), vec![value])
}

/// Render an IS NULL predicate for one column.
pub(crate) fn is_null(column: &str) -> Expr {
    Expr::new(format!("{column} IS NULL"), Vec::new())
}

/// Render a case-insensitive substring predicate. The needle is wrapped in
/// `%` delimiters but not escaped: embedded `%`/`_` keep their wildcard
/// meaning, and callers needing literal matching must escape beforehand.
pub(crate) fn ilike(column: &str, needle: &str) -> Expr {
    Expr::new(format!("{column} ILIKE ?"), vec![SqlValue::Text(format!("%{needle}%"))])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_renumber_placeholders_left_to_right() {
        let mut w = SqlWriter::default();
        w.push_raw("SELECT * FROM t");
        w.push_conditions(&[
            eq("a", SqlValue::Int(1)),
            Expr::new("b BETWEEN ? AND ?", vec![SqlValue::Int(2), SqlValue::Int(3)]),
        ])
        .unwrap();
        let (sql, params) = w.finish();
        assert_eq!(sql, "SELECT * FROM t WHERE a = $1 AND b BETWEEN $2 AND $3");
        assert_eq!(
            params,
            vec![SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(3)]
        );
    }

    #[test]
    fn placeholder_count_mismatch_is_an_error() {
        let mut w = SqlWriter::default();
        let err = w
            .push_fragment("a = ? AND b = ?", &[SqlValue::Int(1)])
            .unwrap_err();
        assert!(err.0.contains("2 placeholders"));
    }

    #[test]
    fn ilike_wraps_needle_in_wildcards() {
        let expr = ilike("title", "park");
        assert_eq!(expr.sql, "title ILIKE ?");
        assert_eq!(expr.params, vec![SqlValue::Text("%park%".into())]);
    }

    #[test]
    fn ilike_does_not_escape_embedded_wildcards() {
        let expr = ilike("title", "50%_off");
        assert_eq!(expr.params, vec![SqlValue::Text("%50%_off%".into())]);
    }
}
