use chrono::{DateTime, Utc};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::db::{Db, UnitOfWork};
use crate::error::StoreError;
use crate::stmt::Arg;
use crate::value::SqlValue;

use super::{FromRow, TableQuery};

const TABLE: &str = "proposal_votes";

const COLUMNS: &[&str] = &["id", "proposal_id", "user_id", "vote", "created_at"];

/// One voter's stance on one proposal; UNIQUE(proposal_id, user_id) holds at
/// most one row per pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalVoteModel {
    pub id: Uuid,
    pub proposal_id: Uuid,
    pub user_id: Uuid,
    /// true = agree, false = disagree
    pub vote: bool,
    pub created_at: DateTime<Utc>,
}

impl FromRow for ProposalVoteModel {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            proposal_id: row.try_get("proposal_id")?,
            user_id: row.try_get("user_id")?,
            vote: row.try_get("vote")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct InsertProposalVoteInput {
    pub id: Uuid,
    pub proposal_id: Uuid,
    pub user_id: Uuid,
    pub vote: bool,
    pub created_at: DateTime<Utc>,
}

/// Partial update; only the stance can change.
#[derive(Debug, Clone, Default)]
pub struct UpdateProposalVoteInput {
    pub vote: Option<bool>,
}

/// Chainable query over the proposal_votes table.
#[derive(Clone)]
pub struct ProposalVotesQ {
    q: TableQuery,
}

impl ProposalVotesQ {
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

    /// Strict insert; a second vote by the same user on the same proposal
    /// fails with `ConflictUnique`.
    ///
    /// # Errors
    /// Returns `ConflictUnique` on a duplicate (proposal, voter) pair.
    pub async fn insert(
        &self,
        uow: Option<&UnitOfWork<'_>>,
        input: InsertProposalVoteInput,
    ) -> Result<(), StoreError> {
        self.q
            .run_insert(
                uow,
                vec![
                    ("id", SqlValue::Uuid(input.id).into()),
                    ("proposal_id", SqlValue::Uuid(input.proposal_id).into()),
                    ("user_id", SqlValue::Uuid(input.user_id).into()),
                    ("vote", SqlValue::Bool(input.vote).into()),
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
        input: UpdateProposalVoteInput,
    ) -> Result<(), StoreError> {
        let mut sets: Vec<(&'static str, Arg)> = Vec::new();
        if let Some(vote) = input.vote {
            sets.push(("vote", SqlValue::Bool(vote).into()));
        }
        self.q.run_update(uow, sets).await
    }

    /// # Errors
    /// Returns `NotFound` when no row matches the active filters.
    pub async fn get(
        &self,
        uow: Option<&UnitOfWork<'_>>,
    ) -> Result<ProposalVoteModel, StoreError> {
        self.q.get_model(uow).await
    }

    /// # Errors
    /// Returns an error if the query or row decoding fails.
    pub async fn select(
        &self,
        uow: Option<&UnitOfWork<'_>>,
    ) -> Result<Vec<ProposalVoteModel>, StoreError> {
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
    pub fn filter_proposal_id(mut self, proposal_id: Uuid) -> Self {
        self.q = self.q.filter_eq("proposal_id", proposal_id);
        self
    }

    #[must_use]
    pub fn filter_user_id(mut self, user_id: Uuid) -> Self {
        self.q = self.q.filter_eq("user_id", user_id);
        self
    }

    /// Keep only agreeing (`true`) or disagreeing (`false`) votes.
    #[must_use]
    pub fn filter_vote(mut self, vote: bool) -> Self {
        self.q = self.q.filter_eq("vote", vote);
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
