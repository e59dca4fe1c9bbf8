// Entity repositories.
//
// One generic core (TableQuery) implements filter composition, ordering,
// pagination, and the terminal operations; the per-entity modules wrap it
// with typed models, input structs, and domain-named filters.

mod petition_signatures;
mod petitions;
mod poll_options;
mod poll_votes;
mod polls;
mod proposal_votes;
mod proposals;

pub use petition_signatures::{InsertPetitionSignatureInput, PetitionSignature, PetitionSignaturesQ};
pub use petitions::{InsertPetitionInput, PetitionModel, PetitionsQ, UpdatePetitionInput};
pub use poll_options::{InsertPollOptionInput, PollOption, PollOptionsQ};
pub use poll_votes::{InsertPollVoteInput, PollVoteModel, PollVotesQ, UpdatePollVoteInput};
pub use polls::{InsertPollInput, PollModel, PollsQ, UpdatePollInput};
pub use proposal_votes::{
    InsertProposalVoteInput, ProposalVoteModel, ProposalVotesQ, UpdateProposalVoteInput,
};
pub use proposals::{InsertProposalInput, Proposal, ProposalsQ, UpdateProposalInput};

use tokio_postgres::Row;

use crate::db::{Db, UnitOfWork, run_execute, run_query};
use crate::error::StoreError;
use crate::stmt::{
    Arg, BuildError, DeleteBuilder, Expr, InsertBuilder, SelectBuilder, UpdateBuilder,
};
use crate::value::SqlValue;

/// Map one result row into an entity model.
pub(crate) trait FromRow: Sized {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error>;
}

/// The five statement snapshots scoped to one table, plus the pool handle.
///
/// A `TableQuery` is a disposable descriptor: filters and ordering accumulate
/// into fresh values, and no state survives a terminal operation beyond the
/// value itself. Equality filters apply to selector, counter, updater, and
/// deleter alike, so "update all rows matching X" and "count rows matching X"
/// cannot diverge.
#[derive(Clone)]
pub(crate) struct TableQuery {
    pub(crate) db: Db,
    pub(crate) table: &'static str,
    pub(crate) selector: SelectBuilder,
    pub(crate) inserter: InsertBuilder,
    pub(crate) updater: UpdateBuilder,
    pub(crate) deleter: DeleteBuilder,
    pub(crate) counter: SelectBuilder,
}

impl TableQuery {
    pub(crate) fn new(db: Db, table: &'static str, columns: &[&str]) -> Self {
        Self {
            selector: SelectBuilder::new(table, columns),
            inserter: InsertBuilder::new(table),
            updater: UpdateBuilder::new(table),
            deleter: DeleteBuilder::new(table),
            counter: SelectBuilder::new(table, &["COUNT(*) AS count"]),
            db,
            table,
        }
    }

    pub(crate) fn db(&self) -> Db {
        self.db.clone()
    }

    // ---- filter composition (pure value transformers)

    #[must_use]
    pub(crate) fn filter_eq(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        let value = value.into();
        self.selector = self.selector.where_eq(column, value.clone());
        self.counter = self.counter.where_eq(column, value.clone());
        self.updater = self.updater.where_eq(column, value.clone());
        self.deleter = self.deleter.where_eq(column, value);
        self
    }

    #[must_use]
    pub(crate) fn filter_null(mut self, column: &str) -> Self {
        self.selector = self.selector.where_null(column);
        self.counter = self.counter.where_null(column);
        self.updater = self.updater.where_null(column);
        self.deleter = self.deleter.where_null(column);
        self
    }

    /// Pattern filter; reads only, so selector and counter.
    #[must_use]
    pub(crate) fn filter_like(mut self, column: &str, needle: &str) -> Self {
        self.selector = self.selector.where_ilike(column, needle);
        self.counter = self.counter.where_ilike(column, needle);
        self
    }

    /// Spatial predicate; reads only, so selector and counter.
    #[must_use]
    pub(crate) fn filter_geo(mut self, predicate: Expr) -> Self {
        self.selector = self.selector.where_expr(predicate.clone());
        self.counter = self.counter.where_expr(predicate);
        self
    }

    #[must_use]
    pub(crate) fn order_by(mut self, term: &str) -> Self {
        self.selector = self.selector.order_by(term);
        self
    }

    /// LIMIT/OFFSET on the selector. The counter deliberately does not
    /// receive pagination: a paginated total count truncates to nonsense.
    #[must_use]
    pub(crate) fn page(mut self, limit: u64, offset: u64) -> Self {
        self.selector = self.selector.limit(limit).offset(offset);
        self
    }

    // ---- terminal operations (one round trip each)

    pub(crate) async fn run_insert(
        &self,
        uow: Option<&UnitOfWork<'_>>,
        values: Vec<(&'static str, Arg)>,
    ) -> Result<(), StoreError> {
        let mut inserter = self.inserter.clone();
        for (column, arg) in values {
            inserter = inserter.set(column, arg);
        }
        let (sql, params) = inserter
            .to_sql()
            .map_err(|e| self.build_err("insert", &e))?;
        run_execute(&self.db, uow, self.table, "insert", &sql, &params).await?;
        Ok(())
    }

    /// Partial update. An empty change set is a no-op with zero round trips.
    pub(crate) async fn run_update(
        &self,
        uow: Option<&UnitOfWork<'_>>,
        sets: Vec<(&'static str, Arg)>,
    ) -> Result<(), StoreError> {
        if sets.is_empty() {
            return Ok(());
        }
        let mut updater = self.updater.clone();
        for (column, arg) in sets {
            updater = updater.set(column, arg);
        }
        let (sql, params) = updater
            .to_sql()
            .map_err(|e| self.build_err("update", &e))?;
        run_execute(&self.db, uow, self.table, "update", &sql, &params).await?;
        Ok(())
    }

    /// Counter-column increment, clamped at zero, scoped by active filters.
    pub(crate) async fn increment(
        &self,
        uow: Option<&UnitOfWork<'_>>,
        column: &str,
        delta: i64,
        op: &'static str,
    ) -> Result<(), StoreError> {
        let updater = self.updater.clone().set(
            column,
            Expr::new(
                format!("GREATEST({column} + ?, 0)"),
                vec![SqlValue::Int(delta)],
            ),
        );
        let (sql, params) = updater.to_sql().map_err(|e| self.build_err(op, &e))?;
        run_execute(&self.db, uow, self.table, op, &sql, &params).await?;
        Ok(())
    }

    pub(crate) async fn get_model<T: FromRow>(
        &self,
        uow: Option<&UnitOfWork<'_>>,
    ) -> Result<T, StoreError> {
        let (sql, params) = self
            .selector
            .clone()
            .limit(1)
            .to_sql()
            .map_err(|e| self.build_err("get", &e))?;
        let rows = run_query(&self.db, uow, self.table, "get", &sql, &params).await?;
        let row = rows.first().ok_or(StoreError::NotFound {
            table: self.table,
            op: "get",
        })?;
        T::from_row(row).map_err(|e| self.scan_err("get", e))
    }

    pub(crate) async fn select_models<T: FromRow>(
        &self,
        uow: Option<&UnitOfWork<'_>>,
    ) -> Result<Vec<T>, StoreError> {
        let (sql, params) = self
            .selector
            .to_sql()
            .map_err(|e| self.build_err("select", &e))?;
        let rows = run_query(&self.db, uow, self.table, "select", &sql, &params).await?;
        rows.iter()
            .map(|row| T::from_row(row).map_err(|e| self.scan_err("select", e)))
            .collect()
    }

    pub(crate) async fn count(&self, uow: Option<&UnitOfWork<'_>>) -> Result<u64, StoreError> {
        let (sql, params) = self
            .counter
            .to_sql()
            .map_err(|e| self.build_err("count", &e))?;
        let rows = run_query(&self.db, uow, self.table, "count", &sql, &params).await?;
        let row = rows.first().ok_or(StoreError::NotFound {
            table: self.table,
            op: "count",
        })?;
        let n: i64 = row.try_get("count").map_err(|e| self.scan_err("count", e))?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    pub(crate) async fn delete(&self, uow: Option<&UnitOfWork<'_>>) -> Result<(), StoreError> {
        let (sql, params) = self
            .deleter
            .to_sql()
            .map_err(|e| self.build_err("delete", &e))?;
        run_execute(&self.db, uow, self.table, "delete", &sql, &params).await?;
        Ok(())
    }

    // ---- error wrapping

    fn build_err(&self, op: &'static str, err: &BuildError) -> StoreError {
        StoreError::QueryBuild {
            table: self.table,
            op,
            reason: err.to_string(),
        }
    }

    fn scan_err(&self, op: &'static str, err: tokio_postgres::Error) -> StoreError {
        StoreError::Scan {
            table: self.table,
            op,
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    fn q() -> TableQuery {
        TableQuery::new(test_db(), "things", &["id", "name"])
    }

    #[test]
    fn equality_filters_reach_all_four_statements() {
        let filtered = q().filter_eq("id", SqlValue::Int(7));
        let (select_sql, _) = filtered.selector.to_sql().unwrap();
        let (count_sql, _) = filtered.counter.to_sql().unwrap();
        let (delete_sql, _) = filtered.deleter.to_sql().unwrap();
        let (update_sql, _) = filtered
            .updater
            .clone()
            .set("name", SqlValue::Text("n".into()))
            .to_sql()
            .unwrap();

        assert_eq!(select_sql, "SELECT id, name FROM things WHERE id = $1");
        assert_eq!(count_sql, "SELECT COUNT(*) AS count FROM things WHERE id = $1");
        assert_eq!(delete_sql, "DELETE FROM things WHERE id = $1");
        assert_eq!(update_sql, "UPDATE things SET name = $1 WHERE id = $2");
    }

    #[test]
    fn page_reaches_the_selector_but_not_the_counter() {
        let paged = q().page(10, 20);
        let (select_sql, _) = paged.selector.to_sql().unwrap();
        let (count_sql, _) = paged.counter.to_sql().unwrap();

        assert_eq!(select_sql, "SELECT id, name FROM things LIMIT 10 OFFSET 20");
        assert_eq!(count_sql, "SELECT COUNT(*) AS count FROM things");
    }

    #[test]
    fn like_filters_stay_off_the_writers() {
        let filtered = q().filter_like("name", "bridge");
        let (select_sql, _) = filtered.selector.to_sql().unwrap();
        let (delete_sql, _) = filtered.deleter.to_sql().unwrap();

        assert!(select_sql.contains("name ILIKE $1"));
        assert_eq!(delete_sql, "DELETE FROM things");
    }

    #[test]
    fn divergent_chains_are_independent() {
        let base = q().filter_eq("id", SqlValue::Int(1));
        let a = base.clone().filter_eq("name", SqlValue::Text("a".into()));
        let b = base.clone().filter_null("name");

        let (base_sql, _) = base.selector.to_sql().unwrap();
        let (a_sql, _) = a.selector.to_sql().unwrap();
        let (b_sql, _) = b.selector.to_sql().unwrap();

        assert_eq!(base_sql, "SELECT id, name FROM things WHERE id = $1");
        assert_eq!(a_sql, "SELECT id, name FROM things WHERE id = $1 AND name = $2");
        assert_eq!(
            b_sql,
            "SELECT id, name FROM things WHERE id = $1 AND name IS NULL"
        );
    }
}
