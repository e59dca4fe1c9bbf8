use chrono::{DateTime, Utc};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::db::{Db, UnitOfWork};
use crate::error::StoreError;
use crate::value::SqlValue;

use super::{FromRow, TableQuery};

const TABLE: &str = "petition_signatures";

const COLUMNS: &[&str] = &["id", "petition_id", "user_id", "created_at"];

/// One signer on one petition; UNIQUE(petition_id, user_id) holds at most one
/// row per pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetitionSignature {
    pub id: Uuid,
    pub petition_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl FromRow for PetitionSignature {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            petition_id: row.try_get("petition_id")?,
            user_id: row.try_get("user_id")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct InsertPetitionSignatureInput {
    pub id: Uuid,
    pub petition_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Chainable query over the petition_signatures table. Signatures are
/// immutable once written; there is no update operation.
#[derive(Clone)]
pub struct PetitionSignaturesQ {
    q: TableQuery,
}

impl PetitionSignaturesQ {
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

    /// Strict insert; a second signature for the same (petition, signer)
    /// pair fails with `ConflictUnique`.
    ///
    /// # Errors
    /// Returns `ConflictUnique` on a duplicate pair.
    pub async fn insert(
        &self,
        uow: Option<&UnitOfWork<'_>>,
        input: InsertPetitionSignatureInput,
    ) -> Result<(), StoreError> {
        self.q
            .run_insert(
                uow,
                vec![
                    ("id", SqlValue::Uuid(input.id).into()),
                    ("petition_id", SqlValue::Uuid(input.petition_id).into()),
                    ("user_id", SqlValue::Uuid(input.user_id).into()),
                    ("created_at", SqlValue::Timestamp(input.created_at).into()),
                ],
            )
            .await
    }

    /// # Errors
    /// Returns `NotFound` when no row matches the active filters.
    pub async fn get(
        &self,
        uow: Option<&UnitOfWork<'_>>,
    ) -> Result<PetitionSignature, StoreError> {
        self.q.get_model(uow).await
    }

    /// # Errors
    /// Returns an error if the query or row decoding fails.
    pub async fn select(
        &self,
        uow: Option<&UnitOfWork<'_>>,
    ) -> Result<Vec<PetitionSignature>, StoreError> {
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
    pub fn filter_petition_id(mut self, petition_id: Uuid) -> Self {
        self.q = self.q.filter_eq("petition_id", petition_id);
        self
    }

    #[must_use]
    pub fn filter_user_id(mut self, user_id: Uuid) -> Self {
        self.q = self.q.filter_eq("user_id", user_id);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    #[test]
    fn pair_filter_scopes_every_statement_kind() {
        let petition = Uuid::new_v4();
        let signer = Uuid::new_v4();
        let filtered = PetitionSignaturesQ::new(test_db())
            .filter_petition_id(petition)
            .filter_user_id(signer);

        let (select_sql, params) = filtered.q.selector.to_sql().unwrap();
        let (delete_sql, _) = filtered.q.deleter.to_sql().unwrap();

        assert_eq!(
            select_sql,
            "SELECT id, petition_id, user_id, created_at FROM petition_signatures \
             WHERE petition_id = $1 AND user_id = $2"
        );
        assert_eq!(
            params,
            vec![SqlValue::Uuid(petition), SqlValue::Uuid(signer)]
        );
        assert_eq!(
            delete_sql,
            "DELETE FROM petition_signatures WHERE petition_id = $1 AND user_id = $2"
        );
    }
}
