//! PostgreSQL/PostGIS repository layer for civic participation entities:
//! petitions, petition signatures, polls, poll options, poll votes,
//! proposals, and proposal votes.
//!
//! Repositories are immutable, chainable query values: each filter, ordering,
//! or pagination call returns a new independent value, and a terminal
//! operation performs exactly one round trip against either the shared pool
//! or an explicit [`UnitOfWork`].

pub mod db;
pub mod error;
pub mod geo;
pub mod prelude;
pub mod repo;
pub mod stmt;
pub mod value;

pub use db::{Db, PgSettings, UnitOfWork};
pub use error::StoreError;
pub use geo::GeoPoint;
pub use value::{Setter, SqlValue};
