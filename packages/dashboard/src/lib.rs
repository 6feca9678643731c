#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Headless model of the civic map dashboard.
//!
//! Loads every category layer from the API concurrently, then tracks the
//! state the map view is driven by: enabled categories, the catchment
//! draw tool, per-category cluster indexes, the viewport, the
//! air-quality reading of a selected station, and the bus route view.

pub mod air_quality;
pub mod routes;
pub mod session;
pub mod source;

use civic_map_asset_models::UnknownStationError;
use civic_map_projection::ProjectionError;
use thiserror::Error;

pub use session::DashboardSession;
pub use source::{FeatureSource, HttpFeatureSource};

/// Errors that can occur while talking to the API.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {status} for {url}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
        /// Response body, usually `{"error": ...}`.
        body: String,
    },

    /// Response body was not the expected JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A feature could not be read back from GeoJSON.
    #[error("Projection error: {0}")]
    Projection(#[from] ProjectionError),

    /// A station display name did not match any station.
    #[error(transparent)]
    UnknownStation(#[from] UnknownStationError),
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::{BTreeMap, BTreeSet};

    use chrono::NaiveDate;
    use civic_map_asset_models::{Category, Station};
    use civic_map_server_models::{ApiBusStop, ApiPollutantAverage};
    use geojson::FeatureCollection;

    use crate::{DashboardError, FeatureSource};

    /// In-memory [`FeatureSource`] for tests.
    #[derive(Default)]
    pub struct MemorySource {
        pub collections: BTreeMap<Category, FeatureCollection>,
        pub failing: BTreeSet<Category>,
        pub averages: BTreeMap<Station, ApiPollutantAverage>,
        pub routes: BTreeMap<i32, Vec<ApiBusStop>>,
    }

    fn unavailable(url: &str) -> DashboardError {
        DashboardError::Status {
            status: 503,
            url: url.to_string(),
            body: r#"{"error":"unavailable"}"#.to_string(),
        }
    }

    pub fn point_feature(id: i32, longitude: f64, latitude: f64) -> geojson::Feature {
        serde_json::from_value(serde_json::json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [longitude, latitude]},
            "properties": {"id": id, "name": format!("asset {id}"), "capacity": 100}
        }))
        .unwrap()
    }

    pub fn collection(features: Vec<geojson::Feature>) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    #[async_trait::async_trait]
    impl FeatureSource for MemorySource {
        async fn fetch_category(
            &self,
            category: Category,
        ) -> Result<FeatureCollection, DashboardError> {
            if self.failing.contains(&category) {
                return Err(unavailable(category.as_ref()));
            }
            Ok(self
                .collections
                .get(&category)
                .cloned()
                .unwrap_or_else(|| collection(vec![])))
        }

        async fn air_quality(
            &self,
            station: Station,
            _date: NaiveDate,
        ) -> Result<ApiPollutantAverage, DashboardError> {
            self.averages
                .get(&station)
                .copied()
                .ok_or_else(|| unavailable("air-quality"))
        }

        async fn route_numbers(&self) -> Result<Vec<i32>, DashboardError> {
            Ok(self.routes.keys().copied().collect())
        }

        async fn route_stops(&self, route_number: i32) -> Result<Vec<ApiBusStop>, DashboardError> {
            self.routes
                .get(&route_number)
                .cloned()
                .ok_or_else(|| unavailable("routes"))
        }
    }
}
