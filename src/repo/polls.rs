use chrono::{DateTime, Utc};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::db::{Db, UnitOfWork};
use crate::error::StoreError;
use crate::geo::{self, GeoPoint, LAT_PROJECTION, LNG_PROJECTION};
use crate::stmt::Arg;
use crate::value::SqlValue;

use super::{FromRow, TableQuery};

const TABLE: &str = "polls";

const COLUMNS: &[&str] = &[
    "id",
    "city_id",
    "title",
    "description",
    "status",
    "initiator_id",
    "end_date",
    "created_at",
    "updated_at",
    LAT_PROJECTION,
    LNG_PROJECTION,
];

#[derive(Debug, Clone, PartialEq)]
pub struct PollModel {
    pub id: Uuid,
    pub city_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub initiator_id: Uuid,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Extracted coordinates; both `None` iff the stored location is NULL.
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl FromRow for PollModel {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            city_id: row.try_get("city_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            status: row.try_get("status")?,
            initiator_id: row.try_get("initiator_id")?,
            end_date: row.try_get("end_date")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            lat: row.try_get("lat")?,
            lng: row.try_get("lng")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct InsertPollInput {
    pub id: Uuid,
    pub city_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub initiator_id: Uuid,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// `None` stores a NULL location.
    pub location: Option<GeoPoint>,
}

/// Partial update; unset fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdatePollInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub end_date: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub location: Option<GeoPoint>,
}

/// Chainable query over the polls table.
#[derive(Clone)]
pub struct PollsQ {
    q: TableQuery,
}

impl PollsQ {
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
        input: InsertPollInput,
    ) -> Result<(), StoreError> {
        let location: Arg = match input.location {
            Some(point) => point.to_expr().into(),
            None => SqlValue::Null.into(),
        };
        self.q
            .run_insert(
                uow,
                vec![
                    ("id", SqlValue::Uuid(input.id).into()),
                    ("city_id", SqlValue::Uuid(input.city_id).into()),
                    ("title", SqlValue::Text(input.title).into()),
                    ("description", SqlValue::Text(input.description).into()),
                    ("status", SqlValue::Text(input.status).into()),
                    ("initiator_id", SqlValue::Uuid(input.initiator_id).into()),
                    ("end_date", SqlValue::Timestamp(input.end_date).into()),
                    ("created_at", SqlValue::Timestamp(input.created_at).into()),
                    ("updated_at", SqlValue::Timestamp(input.updated_at).into()),
                    ("location", location),
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
        input: UpdatePollInput,
    ) -> Result<(), StoreError> {
        let mut sets: Vec<(&'static str, Arg)> = Vec::new();
        if let Some(title) = input.title {
            sets.push(("title", SqlValue::Text(title).into()));
        }
        if let Some(description) = input.description {
            sets.push(("description", SqlValue::Text(description).into()));
        }
        if let Some(status) = input.status {
            sets.push(("status", SqlValue::Text(status).into()));
        }
        if let Some(end_date) = input.end_date {
            sets.push(("end_date", SqlValue::Timestamp(end_date).into()));
        }
        if let Some(updated_at) = input.updated_at {
            sets.push(("updated_at", SqlValue::Timestamp(updated_at).into()));
        }
        if let Some(location) = input.location {
            sets.push(("location", location.to_expr().into()));
        }
        self.q.run_update(uow, sets).await
    }

    /// Delete rows matching the active filters.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub async fn delete(&self, uow: Option<&UnitOfWork<'_>>) -> Result<(), StoreError> {
        self.q.delete(uow).await
    }

    /// # Errors
    /// Returns `NotFound` when no row matches the active filters.
    pub async fn get(&self, uow: Option<&UnitOfWork<'_>>) -> Result<PollModel, StoreError> {
        self.q.get_model(uow).await
    }

    /// # Errors
    /// Returns an error if the query or row decoding fails.
    pub async fn select(
        &self,
        uow: Option<&UnitOfWork<'_>>,
    ) -> Result<Vec<PollModel>, StoreError> {
        self.q.select_models(uow).await
    }

    /// # Errors
    /// Returns an error if the count query fails.
    pub async fn count(&self, uow: Option<&UnitOfWork<'_>>) -> Result<u64, StoreError> {
        self.q.count(uow).await
    }

    // ---- filters

    #[must_use]
    pub fn filter_id(mut self, id: Uuid) -> Self {
        self.q = self.q.filter_eq("id", id);
        self
    }

    #[must_use]
    pub fn filter_city_id(mut self, city_id: Uuid) -> Self {
        self.q = self.q.filter_eq("city_id", city_id);
        self
    }

    #[must_use]
    pub fn filter_initiator_id(mut self, initiator_id: Uuid) -> Self {
        self.q = self.q.filter_eq("initiator_id", initiator_id);
        self
    }

    #[must_use]
    pub fn filter_status(mut self, status: &str) -> Self {
        self.q = self.q.filter_eq("status", status);
        self
    }

    /// Case-insensitive substring match on the title; the needle is not
    /// escaped.
    #[must_use]
    pub fn title_like(mut self, needle: &str) -> Self {
        self.q = self.q.filter_like("title", needle);
        self
    }

    #[must_use]
    pub fn bbox(mut self, min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> Self {
        self.q = self
            .q
            .filter_geo(geo::bbox(min_lng, min_lat, max_lng, max_lat));
        self
    }

    #[must_use]
    pub fn within_radius(mut self, lng: f64, lat: f64, radius_meters: f64) -> Self {
        self.q = self.q.filter_geo(geo::within_radius(lng, lat, radius_meters));
        self
    }

    // ---- ordering and pagination

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
    fn selector_decomposes_location_into_coordinates() {
        let (sql, _) = PollsQ::new(test_db()).q.selector.to_sql().unwrap();
        assert!(sql.contains("ST_Y(location) AS lat, ST_X(location) AS lng FROM polls"));
    }

    #[test]
    fn bbox_applies_to_reads_only() {
        let filtered = PollsQ::new(test_db()).bbox(30.0, 50.0, 31.0, 51.0);
        let (count_sql, _) = filtered.q.counter.to_sql().unwrap();
        let (delete_sql, _) = filtered.q.deleter.to_sql().unwrap();
        assert!(count_sql.contains("ST_MakeEnvelope"));
        assert_eq!(delete_sql, "DELETE FROM polls");
    }
}
