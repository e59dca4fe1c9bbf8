use thiserror::Error;

/// Failure taxonomy for the repository layer.
///
/// Every statement-level failure carries the originating table and the
/// attempted operation; the layer performs no recovery and no retries.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A single-row read matched zero rows.
    #[error("no rows matched in table {table} during {op}")]
    NotFound {
        table: &'static str,
        op: &'static str,
    },

    /// An insert or update violated a uniqueness constraint.
    #[error("unique constraint violated in table {table} during {op}: {source}")]
    ConflictUnique {
        table: &'static str,
        op: &'static str,
        #[source]
        source: tokio_postgres::Error,
    },

    /// Statement assembly failed. Unreachable with well-formed inputs, but
    /// checked rather than panicked since it indicates a defect in filter
    /// composition.
    #[error("building {op} query for table {table}: {reason}")]
    QueryBuild {
        table: &'static str,
        op: &'static str,
        reason: String,
    },

    /// The driver reported a failure while executing the statement,
    /// including canceled queries.
    #[error("executing {op} on table {table}: {source}")]
    Exec {
        table: &'static str,
        op: &'static str,
        #[source]
        source: tokio_postgres::Error,
    },

    /// A result column could not be decoded into the expected type.
    #[error("decoding {op} row from table {table}: {source}")]
    Scan {
        table: &'static str,
        op: &'static str,
        #[source]
        source: tokio_postgres::Error,
    },

    /// Begin/commit/rollback on a unit of work failed.
    #[error("transaction control failed: {0}")]
    Tx(#[source] tokio_postgres::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error(transparent)]
    Pool(#[from] deadpool_postgres::PoolError),
}

impl StoreError {
    /// Check whether this error is a zero-row read.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Check whether this error is a uniqueness-constraint violation.
    #[must_use]
    pub fn is_conflict_unique(&self) -> bool {
        matches!(self, StoreError::ConflictUnique { .. })
    }
}
