use chrono::{DateTime, Utc};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::db::{Db, UnitOfWork};
use crate::error::StoreError;
use crate::stmt::Arg;
use crate::value::SqlValue;

use super::{FromRow, TableQuery};

const TABLE: &str = "poll_votes";

const COLUMNS: &[&str] = &["id", "poll_id", "user_id", "option_id", "created_at"];

/// One voter's choice in one poll; UNIQUE(poll_id, user_id) holds at most one
/// row per pair, and the schema guarantees the option belongs to the poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollVoteModel {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub user_id: Uuid,
    pub option_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl FromRow for PollVoteModel {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            poll_id: row.try_get("poll_id")?,
            user_id: row.try_get("user_id")?,
            option_id: row.try_get("option_id")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct InsertPollVoteInput {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub user_id: Uuid,
    pub option_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Partial update; only the chosen option can change. created_at is never
/// touched.
#[derive(Debug, Clone, Default)]
pub struct UpdatePollVoteInput {
    pub option_id: Option<Uuid>,
}

/// Chainable query over the poll_votes table.
#[derive(Clone)]
pub struct PollVotesQ {
    q: TableQuery,
}

impl PollVotesQ {
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

    /// Strict insert; a second vote by the same user in the same poll fails
    /// with `ConflictUnique`.
    ///
    /// # Errors
    /// Returns `ConflictUnique` on a duplicate (poll, voter) pair.
    pub async fn insert(
        &self,
        uow: Option<&UnitOfWork<'_>>,
        input: InsertPollVoteInput,
    ) -> Result<(), StoreError> {
        self.q
            .run_insert(
                uow,
                vec![
                    ("id", SqlValue::Uuid(input.id).into()),
                    ("poll_id", SqlValue::Uuid(input.poll_id).into()),
                    ("user_id", SqlValue::Uuid(input.user_id).into()),
                    ("option_id", SqlValue::Uuid(input.option_id).into()),
                    ("created_at", SqlValue::Timestamp(input.created_at).into()),
                ],
            )
            .await
    }

    /// # Errors
    /// Returns an error if the update fails; an input with every field unset
    /// is a no-op that performs no round trip.
    pub async fn update(
        &self,
        uow: Option<&UnitOfWork<'_>>,
        input: UpdatePollVoteInput,
    ) -> Result<(), StoreError> {
        let mut sets: Vec<(&'static str, Arg)> = Vec::new();
        if let Some(option_id) = input.option_id {
            sets.push(("option_id", SqlValue::Uuid(option_id).into()));
        }
        self.q.run_update(uow, sets).await
    }

    /// # Errors
    /// Returns `NotFound` when no row matches the active filters.
    pub async fn get(&self, uow: Option<&UnitOfWork<'_>>) -> Result<PollVoteModel, StoreError> {
        self.q.get_model(uow).await
    }

    /// # Errors
    /// Returns an error if the query or row decoding fails.
    pub async fn select(
        &self,
        uow: Option<&UnitOfWork<'_>>,
    ) -> Result<Vec<PollVoteModel>, StoreError> {
        self.q.select_models(uow).await
    }

    /// # Errors
    /// Returns an error if the count query fails.
    pub async fn count(&self, uow: Option<&UnitOfWork<'_>>) -> Result<u64, StoreError> {
        self.q.count(uow).await
    }

    /// Delete rows matching the active filters. Unfiltered, this deletes
    /// every vote.
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
    pub fn filter_user_id(mut self, user_id: Uuid) -> Self {
        self.q = self.q.filter_eq("user_id", user_id);
        self
    }

    #[must_use]
    pub fn filter_option_id(mut self, option_id: Uuid) -> Self {
        self.q = self.q.filter_eq("option_id", option_id);
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

    #[must_use]
    pub fn page(mut self, limit: u64, offset: u64) -> Self {
        self.q = self.q.page(limit, offset);
        self
    }
}
