use deadpool_postgres::{Object, Transaction as PgTransaction};

use crate::error::StoreError;

/// Explicit transaction handle for atomic multi-operation sequences.
///
/// Begun from a pooled client owned by the caller; passed as
/// `Some(&uow)` to every repository terminal operation that should run
/// inside it. The repository layer never begins, commits, or rolls back on
/// its own. Not safe for concurrent in-flight calls; use strictly
/// sequentially within one logical request.
///
/// ```rust,no_run
/// # use agora_db::{Db, UnitOfWork, StoreError};
/// # async fn demo(db: &Db) -> Result<(), StoreError> {
/// let mut client = db.client().await?;
/// let uow = UnitOfWork::begin(&mut client).await?;
/// // ... repository calls with Some(&uow) ...
/// uow.commit().await?;
/// # Ok(())
/// # }
/// ```
pub struct UnitOfWork<'a> {
    tx: PgTransaction<'a>,
}

impl<'a> UnitOfWork<'a> {
    /// Begin a transaction on the provided pooled client.
    ///
    /// # Errors
    /// Returns `StoreError::Tx` if the BEGIN round trip fails.
    pub async fn begin(client: &'a mut Object) -> Result<UnitOfWork<'a>, StoreError> {
        let tx = client.transaction().await.map_err(StoreError::Tx)?;
        Ok(UnitOfWork { tx })
    }

    /// Commit the transaction.
    ///
    /// # Errors
    /// Returns `StoreError::Tx` if the commit fails.
    pub async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(StoreError::Tx)
    }

    /// Roll back the transaction.
    ///
    /// # Errors
    /// Returns `StoreError::Tx` if the rollback fails.
    pub async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await.map_err(StoreError::Tx)
    }

    pub(crate) fn tx(&self) -> &PgTransaction<'a> {
        &self.tx
    }
}
