// Database access plumbing:
// - mod.rs: pool handle and validated configuration
// - transaction: explicit unit-of-work handle
// - executor: pool-vs-transaction dispatch for rendered statements

mod executor;
mod transaction;

pub use transaction::UnitOfWork;

pub(crate) use executor::{run_execute, run_query};

use deadpool_postgres::{Config as PgConfig, Object, Pool, Runtime};
use serde::Deserialize;
use tokio_postgres::NoTls;

use crate::error::StoreError;

/// Cloneable handle to the Postgres connection pool.
///
/// Repositories hold a `Db` and check a client out per terminal operation
/// unless the caller supplies a [`UnitOfWork`]. The pool owns connection
/// reuse and concurrency limits.
#[derive(Clone, Debug)]
pub struct Db {
    pool: Pool,
}

impl Db {
    /// Build a pool from a deadpool config.
    ///
    /// # Errors
    /// Returns `StoreError::Config` if required config fields are missing or
    /// `StoreError::Connection` if pool creation fails.
    pub fn connect(cfg: PgConfig) -> Result<Self, StoreError> {
        if cfg.dbname.is_none() {
            return Err(StoreError::Config("dbname is required".to_string()));
        }
        if cfg.host.is_none() {
            return Err(StoreError::Config("host is required".to_string()));
        }
        if cfg.port.is_none() {
            return Err(StoreError::Config("port is required".to_string()));
        }
        if cfg.user.is_none() {
            return Err(StoreError::Config("user is required".to_string()));
        }
        if cfg.password.is_none() {
            return Err(StoreError::Config("password is required".to_string()));
        }

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| {
                StoreError::Connection(format!("failed to create Postgres pool: {e}"))
            })?;

        Ok(Db { pool })
    }

    /// Check a client out of the pool, e.g. to begin a [`UnitOfWork`].
    ///
    /// # Errors
    /// Returns the pool's checkout error.
    pub async fn client(&self) -> Result<Object, StoreError> {
        self.pool.get().await.map_err(StoreError::Pool)
    }
}

/// Connection settings as they appear in a service configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct PgSettings {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
}

impl PgSettings {
    /// Convert into a deadpool config accepted by [`Db::connect`].
    #[must_use]
    pub fn into_config(self) -> PgConfig {
        let mut cfg = PgConfig::new();
        cfg.host = Some(self.host);
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname);
        cfg.user = Some(self.user);
        cfg.password = Some(self.password);
        cfg
    }
}

#[cfg(test)]
pub(crate) fn test_db() -> Db {
    // Pool creation is lazy; no server is contacted until a checkout.
    let mut cfg = PgConfig::new();
    cfg.dbname = Some("agora_test".to_string());
    cfg.host = Some("127.0.0.1".to_string());
    cfg.port = Some(5432);
    cfg.user = Some("agora".to_string());
    cfg.password = Some(String::new());
    Db::connect(cfg).expect("test pool config")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_rejects_missing_fields() {
        let mut cfg = PgConfig::new();
        cfg.host = Some("localhost".to_string());
        let err = Db::connect(cfg).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn settings_struct_carries_all_required_fields() {
        let settings = PgSettings {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "agora".to_string(),
            user: "agora".to_string(),
            password: "secret".to_string(),
        };
        let cfg = settings.into_config();
        assert!(Db::connect(cfg).is_ok());
    }
}
