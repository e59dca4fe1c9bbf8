use chrono::{DateTime, Utc};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::db::{Db, UnitOfWork};
use crate::error::StoreError;
use crate::value::SqlValue;

use super::{FromRow, TableQuery};

const TABLE: &str = "poll_options";

const COLUMNS: &[&str] = &["id", "poll_id", "option_text", "votes_count", "created_at"];

/// One answer option of a poll, with its vote tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOption {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub option_text: String,
    pub votes_count: i32,
    pub created_at: DateTime<Utc>,
}

impl FromRow for PollOption {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            poll_id: row.try_get("poll_id")?,
            option_text: row.try_get("option_text")?,
            votes_count: row.try_get("votes_count")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct InsertPollOptionInput {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub option_text: String,
    pub created_at: DateTime<Utc>,
}

/// Chainable query over the poll_options table. Option text is immutable
/// once written; the tally moves only through
/// [`PollOptionsQ::increment_votes`].
#[derive(Clone)]
pub struct PollOptionsQ {
    q: TableQuery,
}

impl PollOptionsQ {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            q: TableQuery::new(db, TABLE, COLUMNS),
        }
    }

    /// Fresh query over the same pool, discarding accumulated state.
    #[must_use]
    pub fn fresh(&self) -> Self {
        Self::new(self.q.db())
    }

    /// # Errors
    /// Returns `ConflictUnique` on a uniqueness violation; never upserts.
    pub async fn insert(
        &self,
        uow: Option<&UnitOfWork<'_>>,
        input: InsertPollOptionInput,
    ) -> Result<(), StoreError> {
        self.q
            .run_insert(
                uow,
                vec![
                    ("id", SqlValue::Uuid(input.id).into()),
                    ("poll_id", SqlValue::Uuid(input.poll_id).into()),
                    ("option_text", SqlValue::Text(input.option_text).into()),
                    ("created_at", SqlValue::Timestamp(input.created_at).into()),
                ],
            )
            .await
    }

    /// Adjust the vote tally by `delta`, clamped at zero, scoped by the
    /// active filters.
    ///
    /// # Errors
    /// Returns an error if the update fails.
    pub async fn increment_votes(
        &self,
        uow: Option<&UnitOfWork<'_>>,
        delta: i64,
    ) -> Result<(), StoreError> {
        self.q
            .increment(uow, "votes_count", delta, "increment votes")
            .await
    }

    /// # Errors
    /// Returns `NotFound` when no row matches the active filters.
    pub async fn get(&self, uow: Option<&UnitOfWork<'_>>) -> Result<PollOption, StoreError> {
        self.q.get_model(uow).await
    }

    /// # Errors
    /// Returns an error if the query or row decoding fails.
    pub async fn select(
        &self,
        uow: Option<&UnitOfWork<'_>>,
    ) -> Result<Vec<PollOption>, StoreError> {
        self.q.select_models(uow).await
    }

    /// # Errors
    /// Returns an error if the count query fails.
    pub async fn count(&self, uow: Option<&UnitOfWork<'_>>) -> Result<u64, StoreError> {
        self.q.count(uow).await
    }

    /// Delete rows matching the active filters.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub async fn delete(&self, uow: Option<&UnitOfWork<'_>>) -> Result<(), StoreError> {
        self.q.delete(uow).await
    }

    #[must_use]
    pub fn filter_id(mut self, id: Uuid) -> Self {
        self.q = self.q.filter_eq("id", id);
        self
    }

    #[must_use]
    pub fn filter_poll_id(mut self, poll_id: Uuid) -> Self {
        self.q = self.q.filter_eq("poll_id", poll_id);
        self
    }

    #[must_use]
    pub fn order_by_created_asc(mut self) -> Self {
        self.q = self.q.order_by("created_at ASC");
        self
    }

    #[must_use]
    pub fn order_by_created_desc(mut self) -> Self {
        self.q = self.q.order_by("created_at DESC");
        self
    }

    /// Most-voted options first.
    #[must_use]
    pub fn order_by_votes_desc(mut self) -> Self {
        self.q = self.q.order_by("votes_count DESC");
        self
    }

    #[must_use]
    pub fn page(mut self, limit: u64, offset: u64) -> Self {
        self.q = self.q.page(limit, offset);
        self
    }
}
