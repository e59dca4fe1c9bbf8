use chrono::{DateTime, Utc};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::db::{Db, UnitOfWork};
use crate::error::StoreError;
use crate::geo::{self, GeoPoint, LAT_PROJECTION, LNG_PROJECTION};
use crate::stmt::Arg;
use crate::value::{Setter, SqlValue};

use super::{FromRow, TableQuery};

const TABLE: &str = "petitions";

// Explicit projection; the point column is decomposed into lat/lng on read.
const COLUMNS: &[&str] = &[
    "id",
    "city_id",
    "title",
    "description",
    "initiator_id",
    "address_to_id",
    "status",
    "signatures",
    "goal",
    "end_date",
    "created_at",
    "updated_at",
    LAT_PROJECTION,
    LNG_PROJECTION,
];

#[derive(Debug, Clone, PartialEq)]
pub struct PetitionModel {
    pub id: Uuid,
    pub city_id: Uuid,
    pub title: String,
    pub description: String,
    pub initiator_id: Uuid,
    pub address_to_id: Option<Uuid>,
    pub status: String,
    pub signatures: i32,
    pub goal: i32,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Extracted coordinates; both `None` iff the stored location is NULL.
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl FromRow for PetitionModel {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            city_id: row.try_get("city_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            initiator_id: row.try_get("initiator_id")?,
            address_to_id: row.try_get("address_to_id")?,
            status: row.try_get("status")?,
            signatures: row.try_get("signatures")?,
            goal: row.try_get("goal")?,
            end_date: row.try_get("end_date")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            lat: row.try_get("lat")?,
            lng: row.try_get("lng")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct InsertPetitionInput {
    pub id: Uuid,
    pub city_id: Uuid,
    pub title: String,
    pub description: String,
    pub initiator_id: Uuid,
    pub address_to_id: Option<Uuid>,
    pub status: String,
    pub signatures: i32,
    pub goal: i32,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// `None` stores a NULL location.
    pub location: Option<GeoPoint>,
}

/// Partial update; unset fields are left unchanged. The signature counter is
/// not updatable directly, use [`PetitionsQ::increment_signatures`].
#[derive(Debug, Clone, Default)]
pub struct UpdatePetitionInput {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Tri-state: keep, set NULL, or set a new addressee.
    pub address_to_id: Setter<Uuid>,
    pub status: Option<String>,
    pub goal: Option<i32>,
    pub end_date: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub location: Option<GeoPoint>,
}

/// Chainable query over the petitions table.
#[derive(Clone)]
pub struct PetitionsQ {
    q: TableQuery,
}

impl PetitionsQ {
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

    // ---- commands

    /// # Errors
    /// Returns `ConflictUnique` on a uniqueness violation; never upserts.
    pub async fn insert(
        &self,
        uow: Option<&UnitOfWork<'_>>,
        input: InsertPetitionInput,
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
                    ("initiator_id", SqlValue::Uuid(input.initiator_id).into()),
                    ("address_to_id", SqlValue::from(input.address_to_id).into()),
                    ("status", SqlValue::Text(input.status).into()),
                    ("signatures", SqlValue::from(input.signatures).into()),
                    ("goal", SqlValue::from(input.goal).into()),
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
        input: UpdatePetitionInput,
    ) -> Result<(), StoreError> {
        let mut sets: Vec<(&'static str, Arg)> = Vec::new();
        if let Some(title) = input.title {
            sets.push(("title", SqlValue::Text(title).into()));
        }
        if let Some(description) = input.description {
            sets.push(("description", SqlValue::Text(description).into()));
        }
        match input.address_to_id {
            Setter::Keep => {}
            Setter::Null => sets.push(("address_to_id", SqlValue::Null.into())),
            Setter::Set(id) => sets.push(("address_to_id", SqlValue::Uuid(id).into())),
        }
        if let Some(status) = input.status {
            sets.push(("status", SqlValue::Text(status).into()));
        }
        if let Some(goal) = input.goal {
            sets.push(("goal", SqlValue::from(goal).into()));
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

    /// Adjust the signature counter by `delta`, clamped at zero, scoped by
    /// the active filters.
    ///
    /// # Errors
    /// Returns an error if the update fails.
    pub async fn increment_signatures(
        &self,
        uow: Option<&UnitOfWork<'_>>,
        delta: i64,
    ) -> Result<(), StoreError> {
        self.q
            .increment(uow, "signatures", delta, "increment signatures")
            .await
    }

    /// Delete rows matching the active filters. Unfiltered, this deletes
    /// every petition.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub async fn delete(&self, uow: Option<&UnitOfWork<'_>>) -> Result<(), StoreError> {
        self.q.delete(uow).await
    }

    // ---- queries

    /// # Errors
    /// Returns `NotFound` when no row matches the active filters.
    pub async fn get(&self, uow: Option<&UnitOfWork<'_>>) -> Result<PetitionModel, StoreError> {
        self.q.get_model(uow).await
    }

    /// # Errors
    /// Returns an error if the query or row decoding fails.
    pub async fn select(
        &self,
        uow: Option<&UnitOfWork<'_>>,
    ) -> Result<Vec<PetitionModel>, StoreError> {
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

    /// Case-insensitive substring match on the title. The needle is not
    /// escaped; embedded wildcard characters keep their meaning.
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
