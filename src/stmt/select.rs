use super::{BuildError, Expr, SqlWriter, eq, ilike, is_null};
use crate::value::SqlValue;

/// Builder for SELECT statements, including `COUNT(*)` counters.
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    table: &'static str,
    columns: Vec<String>,
    conditions: Vec<Expr>,
    order_by: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl SelectBuilder {
    #[must_use]
    pub fn new(table: &'static str, columns: &[&str]) -> Self {
        Self {
            table,
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    #[must_use]
    pub fn where_eq(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.conditions.push(eq(column, value.into()));
        self
    }

    #[must_use]
    pub fn where_null(mut self, column: &str) -> Self {
        self.conditions.push(is_null(column));
        self
    }

    #[must_use]
    pub fn where_ilike(mut self, column: &str, needle: &str) -> Self {
        self.conditions.push(ilike(column, needle));
        self
    }

    #[must_use]
    pub fn where_expr(mut self, expr: Expr) -> Self {
        self.conditions.push(expr);
        self
    }

    /// Append one ORDER BY term. Terms accumulate in call order and are not
    /// deduplicated.
    #[must_use]
    pub fn order_by(mut self, term: &str) -> Self {
        self.order_by.push(term.to_string());
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Render the statement.
    ///
    /// # Errors
    /// Returns `BuildError` if the projection is empty or a predicate's
    /// placeholder count does not match its parameters.
    pub fn to_sql(&self) -> Result<(String, Vec<SqlValue>), BuildError> {
        if self.columns.is_empty() {
            return Err(BuildError(format!(
                "select on {} has no projection",
                self.table
            )));
        }

        let mut w = SqlWriter::default();
        w.push_raw("SELECT ");
        w.push_raw(&self.columns.join(", "));
        w.push_raw(" FROM ");
        w.push_raw(self.table);
        w.push_conditions(&self.conditions)?;
        if !self.order_by.is_empty() {
            w.push_raw(" ORDER BY ");
            w.push_raw(&self.order_by.join(", "));
        }
        if let Some(limit) = self.limit {
            w.push_raw(" LIMIT ");
            w.push_raw(&limit.to_string());
        }
        if let Some(offset) = self.offset {
            w.push_raw(" OFFSET ");
            w.push_raw(&offset.to_string());
        }
        Ok(w.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> SelectBuilder {
        SelectBuilder::new("petitions", &["id", "title"])
    }

    #[test]
    fn renders_projection_and_predicates() {
        let (sql, params) = base()
            .where_eq("status", "active")
            .where_ilike("title", "bridge")
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT id, title FROM petitions WHERE status = $1 AND title ILIKE $2"
        );
        assert_eq!(
            params,
            vec![
                SqlValue::Text("active".into()),
                SqlValue::Text("%bridge%".into())
            ]
        );
    }

    #[test]
    fn order_limit_offset_render_in_clause_order() {
        let (sql, params) = base()
            .order_by("created_at DESC")
            .order_by("id ASC")
            .limit(10)
            .offset(20)
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT id, title FROM petitions ORDER BY created_at DESC, id ASC LIMIT 10 OFFSET 20"
        );
        assert!(params.is_empty());
    }

    #[test]
    fn chains_diverge_without_touching_the_base() {
        let b = base().where_eq("city_id", SqlValue::Int(1));
        let left = b.clone().where_eq("status", "active");
        let right = b.clone().where_null("address_to_id");

        let (base_sql, _) = b.to_sql().unwrap();
        let (left_sql, _) = left.to_sql().unwrap();
        let (right_sql, _) = right.to_sql().unwrap();

        assert_eq!(base_sql, "SELECT id, title FROM petitions WHERE city_id = $1");
        assert_eq!(
            left_sql,
            "SELECT id, title FROM petitions WHERE city_id = $1 AND status = $2"
        );
        assert_eq!(
            right_sql,
            "SELECT id, title FROM petitions WHERE city_id = $1 AND address_to_id IS NULL"
        );
    }

    #[test]
    fn count_builder_supports_pagination() {
        // A COUNT selector accepts LIMIT/OFFSET like any other SELECT; whether
        // pagination reaches the counter is the repository layer's decision.
        let (sql, _) = SelectBuilder::new("polls", &["COUNT(*) AS count"])
            .where_eq("status", "open")
            .limit(5)
            .offset(10)
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT COUNT(*) AS count FROM polls WHERE status = $1 LIMIT 5 OFFSET 10"
        );
    }

    #[test]
    fn empty_projection_is_an_error() {
        let err = SelectBuilder::new("polls", &[]).to_sql().unwrap_err();
        assert!(err.0.contains("no projection"));
    }
}
