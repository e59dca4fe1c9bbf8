use super::{Arg, BuildError, Expr, SqlWriter, eq};
use crate::value::SqlValue;

/// Builder for UPDATE statements.
///
/// Like inserts, assignments form a map rendered in sorted column order;
/// predicates render after the assignment list, so their placeholders number
/// past the assignments'.
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: &'static str,
    sets: Vec<(String, Arg)>,
    conditions: Vec<Expr>,
}

impl UpdateBuilder {
    #[must_use]
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            sets: Vec::new(),
            conditions: Vec::new(),
        }
    }

    /// Assign a value to a column, replacing any earlier assignment.
    #[must_use]
    pub fn set(mut self, column: &str, value: impl Into<Arg>) -> Self {
        let value = value.into();
        match self.sets.iter_mut().find(|(c, _)| c == column) {
            Some(slot) => slot.1 = value,
            None => self.sets.push((column.to_string(), value)),
        }
        self
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
    /// Returns `BuildError` if no column was assigned or a fragment's
    /// placeholder count does not match its parameters.
    pub fn to_sql(&self) -> Result<(String, Vec<SqlValue>), BuildError> {
        if self.sets.is_empty() {
            return Err(BuildError(format!(
                "update on {} has no assignments",
                self.table
            )));
        }

        let mut sets = self.sets.clone();
        sets.sort_by(|(a, _), (b, _)| a.cmp(b));

        let mut w = SqlWriter::default();
        w.push_raw("UPDATE ");
        w.push_raw(self.table);
        w.push_raw(" SET ");
        for (i, (column, arg)) in sets.iter().enumerate() {
            if i > 0 {
                w.push_raw(", ");
            }
            w.push_raw(column);
            w.push_raw(" = ");
            match arg {
                Arg::Value(v) => w.push_fragment("?", std::slice::from_ref(v))?,
                Arg::Expr(expr) => w.push_expr(expr)?,
            }
        }
        w.push_conditions(&self.conditions)?;
        Ok(w.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignments_sort_and_predicates_number_after_them() {
        let (sql, params) = UpdateBuilder::new("petitions")
            .set("title", SqlValue::Text("new title".into()))
            .set("goal", SqlValue::Int(500))
            .where_eq("id", SqlValue::Text("x".into()))
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE petitions SET goal = $1, title = $2 WHERE id = $3"
        );
        assert_eq!(
            params,
            vec![
                SqlValue::Int(500),
                SqlValue::Text("new title".into()),
                SqlValue::Text("x".into())
            ]
        );
    }

    #[test]
    fn expression_assignment_renders_inline() {
        let (sql, params) = UpdateBuilder::new("petitions")
            .set(
                "signatures",
                Expr::new("GREATEST(signatures + ?, 0)", vec![SqlValue::Int(-3)]),
            )
            .where_eq("id", SqlValue::Text("x".into()))
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE petitions SET signatures = GREATEST(signatures + $1, 0) WHERE id = $2"
        );
        assert_eq!(
            params,
            vec![SqlValue::Int(-3), SqlValue::Text("x".into())]
        );
    }

    #[test]
    fn empty_assignment_list_is_an_error() {
        let err = UpdateBuilder::new("polls")
            .where_eq("id", SqlValue::Int(1))
            .to_sql()
            .unwrap_err();
        assert!(err.0.contains("no assignments"));
    }
}
