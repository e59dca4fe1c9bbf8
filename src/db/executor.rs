use tokio_postgres::Row;
use tokio_postgres::error::SqlState;
use tokio_postgres::types::ToSql;
use tracing::debug;

use crate::error::StoreError;
use crate::value::SqlValue;

use super::{Db, UnitOfWork};

fn as_refs(params: &[SqlValue]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

fn wrap_exec(table: &'static str, op: &'static str, err: tokio_postgres::Error) -> StoreError {
    if let Some(db_err) = err.as_db_error() {
        if *db_err.code() == SqlState::UNIQUE_VIOLATION {
            return StoreError::ConflictUnique {
                table,
                op,
                source: err,
            };
        }
    }
    StoreError::Exec {
        table,
        op,
        source: err,
    }
}

/// Run a row-returning statement against the unit of work if present, else
/// against a client checked out of the pool. Exactly one round trip.
pub(crate) async fn run_query(
    db: &Db,
    uow: Option<&UnitOfWork<'_>>,
    table: &'static str,
    op: &'static str,
    sql: &str,
    params: &[SqlValue],
) -> Result<Vec<Row>, StoreError> {
    debug!(table, op, sql, "executing query");
    let refs = as_refs(params);
    let result = match uow {
        Some(uow) => uow.tx().query(sql, &refs).await,
        None => {
            let client = db.client().await?;
            client.query(sql, &refs).await
        }
    };
    result.map_err(|e| wrap_exec(table, op, e))
}

/// Run a DML statement, returning the affected row count.
pub(crate) async fn run_execute(
    db: &Db,
    uow: Option<&UnitOfWork<'_>>,
    table: &'static str,
    op: &'static str,
    sql: &str,
    params: &[SqlValue],
) -> Result<u64, StoreError> {
    debug!(table, op, sql, "executing statement");
    let refs = as_refs(params);
    let result = match uow {
        Some(uow) => uow.tx().execute(sql, &refs).await,
        None => {
            let client = db.client().await?;
            client.execute(sql, &refs).await
        }
    };
    result.map_err(|e| wrap_exec(table, op, e))
}
