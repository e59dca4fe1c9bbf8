use super::{BuildError, Expr, SqlWriter, eq};
use crate::value::SqlValue;

/// Builder for DELETE statements.
///
/// An unfiltered delete renders a bare `DELETE FROM table` and removes every
/// row; the builder does not guard against it.
#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    table: &'static str,
    conditions: Vec<Expr>,
}

impl DeleteBuilder {
    #[must_use]
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            conditions: Vec::new(),
        }
    }

    #[must_use]
    pub fn where_eq(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.conditions.push(eq(column, value.into()));
        self
    }

    #[must_use]
    pub fn where_null(mut self, column: &str) -> Self {
        self.conditions.push(super::is_null(column));
        self
    }

    #[must_use]
    pub fn where_expr(mut self, expr: Expr) -> Self {
        self.conditions.push(expr);
        self
    }

    /// Render the statement.
    ///
    /// # Errors
    /// Returns `BuildError` if a predicate's placeholder count does not match
    /// its parameters.
    pub fn to_sql(&self) -> Result<(String, Vec<SqlValue>), BuildError> {
        let mut w = SqlWriter::default();
        w.push_raw("DELETE FROM ");
        w.push_raw(self.table);
        w.push_conditions(&self.conditions)?;
        Ok(w.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfiltered_delete_renders_bare() {
        let (sql, params) = DeleteBuilder::new("poll_votes").to_sql().unwrap();
        assert_eq!(sql, "DELETE FROM poll_votes");
        assert!(params.is_empty());
    }

    #[test]
    fn filters_scope_the_delete() {
        let (sql, params) = DeleteBuilder::new("poll_votes")
            .where_eq("poll_id", SqlValue::Text("p".into()))
            .where_eq("user_id", SqlValue::Text("u".into()))
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "DELETE FROM poll_votes WHERE poll_id = $1 AND user_id = $2"
        );
        assert_eq!(
            params,
            vec![SqlValue::Text("p".into()), SqlValue::Text("u".into())]
        );
    }
}
