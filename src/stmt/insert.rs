use super::{Arg, BuildError, SqlWriter};
use crate::value::SqlValue;

/// Builder for single-row INSERT statements.
///
/// Assignments form a column/value map; rendering emits columns in sorted
/// name order so the generated SQL is deterministic regardless of call order.
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    table: &'static str,
    values: Vec<(String, Arg)>,
}

impl InsertBuilder {
    #[must_use]
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            values: Vec::new(),
        }
    }

    /// Assign a value to a column, replacing any earlier assignment.
    #[must_use]
    pub fn set(mut self, column: &str, value: impl Into<Arg>) -> Self {
        let value = value.into();
        match self.values.iter_mut().find(|(c, _)| c == column) {
            Some(slot) => slot.1 = value,
            None => self.values.push((column.to_string(), value)),
        }
        self
    }

    /// Render the statement.
    ///
    /// # Errors
    /// Returns `BuildError` if no column was assigned or an expression's
    /// placeholder count does not match its parameters.
    pub fn to_sql(&self) -> Result<(String, Vec<SqlValue>), BuildError> {
        if self.values.is_empty() {
            return Err(BuildError(format!(
                "insert into {} has no values",
                self.table
            )));
        }

        let mut values = self.values.clone();
        values.sort_by(|(a, _), (b, _)| a.cmp(b));

        let mut w = SqlWriter::default();
        w.push_raw("INSERT INTO ");
        w.push_raw(self.table);
        w.push_raw(" (");
        let columns: Vec<&str> = values.iter().map(|(c, _)| c.as_str()).collect();
        w.push_raw(&columns.join(", "));
        w.push_raw(") VALUES (");
        for (i, (_, arg)) in values.iter().enumerate() {
            if i > 0 {
                w.push_raw(", ");
            }
            match arg {
                Arg::Value(v) => w.push_fragment("?", std::slice::from_ref(v))?,
                Arg::Expr(expr) => w.push_expr(expr)?,
            }
        }
        w.push_raw(")");
        Ok(w.finish())
    }
}
