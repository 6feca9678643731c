//! The feature store seam used by the HTTP layer.

use std::sync::Arc;

use chrono::NaiveDate;
use civic_map_asset_models::{Category, Station};
use civic_map_database_models::{BusStopRow, FeatureRow, NewTouristSite, PollutantAverage};
use switchy_database::Database;

use crate::{DbError, queries};

/// Read and write operations the API needs from the feature store.
#[async_trait::async_trait]
pub trait FeatureStore: Send + Sync {
    /// Lists every feature of a category. Zero rows is a valid result.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store query fails.
    async fn list_by_category(&self, category: Category) -> Result<Vec<FeatureRow>, DbError>;

    /// Computes one station's pollutant averages for a calendar date.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store query fails.
    async fn daily_pollutant_average(
        &self,
        station: Station,
        date: NaiveDate,
    ) -> Result<PollutantAverage, DbError>;

    /// Lists a route's stops in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store query fails.
    async fn list_bus_stops_by_route(&self, route_number: i32)
    -> Result<Vec<BusStopRow>, DbError>;

    /// Lists the distinct route numbers, ascending.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store query fails.
    async fn list_route_numbers(&self) -> Result<Vec<i32>, DbError>;

    /// Inserts a tourist site.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the insert fails.
    async fn insert_tourist_site(&self, site: &NewTouristSite) -> Result<(), DbError>;
}

/// [`FeatureStore`] backed by a `PostGIS` connection.
pub struct PostgisStore {
    db: Arc<dyn Database>,
}

impl PostgisStore {
    /// Wraps an open database connection.
    #[must_use]
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl FeatureStore for PostgisStore {
    async fn list_by_category(&self, category: Category) -> Result<Vec<FeatureRow>, DbError> {
        queries::list_by_category(self.db.as_ref(), category).await
    }

    async fn daily_pollutant_average(
        &self,
        station: Station,
        date: NaiveDate,
    ) -> Result<PollutantAverage, DbError> {
        queries::daily_pollutant_average(self.db.as_ref(), station, date).await
    }

    async fn list_bus_stops_by_route(
        &self,
        route_number: i32,
    ) -> Result<Vec<BusStopRow>, DbError> {
        queries::list_bus_stops_by_route(self.db.as_ref(), route_number).await
    }

    async fn list_route_numbers(&self) -> Result<Vec<i32>, DbError> {
        queries::list_route_numbers(self.db.as_ref()).await
    }

    async fn insert_tourist_site(&self, site: &NewTouristSite) -> Result<(), DbError> {
        queries::insert_tourist_site(self.db.as_ref(), site).await
    }
}
