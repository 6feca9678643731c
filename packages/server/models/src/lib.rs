#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the civic map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the store row types so the API contract can evolve on its own.
//! Feature collections are not modelled here; they are GeoJSON produced
//! by `civic_map_projection`.

use civic_map_asset_models::{Category, CategoryMetadata};
use civic_map_database_models::{BusStopRow, NewTouristSite, PollutantAverage};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// One entry of the category registry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCategory {
    /// URL token, e.g. `parking-lots`.
    pub token: Category,
    #[serde(flatten)]
    pub metadata: CategoryMetadata,
}

impl From<Category> for ApiCategory {
    fn from(category: Category) -> Self {
        Self {
            token: category,
            metadata: *category.metadata(),
        }
    }
}

/// Body of `POST /api/air-quality/{station}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AirQualityRequest {
    /// Calendar date as `YYYY-MM-DD`.
    pub date: Option<String>,
}

/// Daily pollutant averages for one station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApiPollutantAverage {
    pub no: f64,
    pub no2: f64,
    pub nox: f64,
    pub pm10: f64,
}

impl From<PollutantAverage> for ApiPollutantAverage {
    fn from(average: PollutantAverage) -> Self {
        Self {
            no: average.no,
            no2: average.no2,
            nox: average.nox,
            pm10: average.pm10,
        }
    }
}

/// GeoJSON point geometry of a bus stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiPointGeometry {
    /// Always `"Point"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// `[longitude, latitude]`.
    pub coordinates: [f64; 2],
}

/// One stop of a bus route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiBusStop {
    pub id: i32,
    pub route_number: i32,
    /// 1-based position along the route.
    pub sequence: usize,
    pub geometry: ApiPointGeometry,
}

impl ApiBusStop {
    /// Builds the API form of a stop at 1-based position `sequence`.
    #[must_use]
    pub fn from_row(row: &BusStopRow, sequence: usize) -> Self {
        Self {
            id: row.id,
            route_number: row.route_number,
            sequence,
            geometry: ApiPointGeometry {
                kind: "Point".to_string(),
                coordinates: [row.longitude, row.latitude],
            },
        }
    }
}

/// Body of `POST /api/tourist-sites`.
///
/// Every field is optional at the parsing layer so that a missing field
/// is reported as a validation error rather than a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouristSiteRequest {
    pub name: Option<String>,
    pub subtype: Option<String>,
    pub description: Option<String>,
    pub image_ref: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl TouristSiteRequest {
    /// Checks required fields and converts into an insertable row.
    ///
    /// # Errors
    ///
    /// Returns the name of the first missing or blank required field.
    pub fn validate(self) -> Result<NewTouristSite, &'static str> {
        let name = self
            .name
            .filter(|name| !name.trim().is_empty())
            .ok_or("name")?;
        let subtype = self
            .subtype
            .filter(|subtype| !subtype.trim().is_empty())
            .ok_or("subtype")?;
        let latitude = self.latitude.ok_or("latitude")?;
        let longitude = self.longitude.ok_or("longitude")?;

        Ok(NewTouristSite {
            name,
            subtype,
            description: self.description,
            image_ref: self.image_ref,
            longitude,
            latitude,
        })
    }
}

/// A plain `{message}` acknowledgement.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_stop_shape() {
        let row = BusStopRow {
            id: 7,
            route_number: 42,
            longitude: 32.5,
            latitude: 37.9,
        };
        let json = serde_json::to_value(ApiBusStop::from_row(&row, 1)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "routeNumber": 42,
                "sequence": 1,
                "geometry": {"type": "Point", "coordinates": [32.5, 37.9]}
            })
        );
    }

    #[test]
    fn tourist_site_requires_name_and_subtype() {
        let request: TouristSiteRequest = serde_json::from_value(serde_json::json!({
            "subtype": "museum",
            "latitude": 37.87,
            "longitude": 32.50
        }))
        .unwrap();
        assert_eq!(request.validate().unwrap_err(), "name");

        let request: TouristSiteRequest = serde_json::from_value(serde_json::json!({
            "name": "Mevlana Museum",
            "subtype": "museum",
            "imageRef": "/uploads/mevlana.jpg",
            "latitude": 37.87,
            "longitude": 32.50
        }))
        .unwrap();
        let site = request.validate().unwrap();
        assert_eq!(site.image_ref.as_deref(), Some("/uploads/mevlana.jpg"));
        assert!(site.description.is_none());
    }

    #[test]
    fn category_entry_flattens_metadata() {
        let json = serde_json::to_value(ApiCategory::from(Category::ParkingLot)).unwrap();
        assert_eq!(json["token"], "parking-lots");
        assert_eq!(json["enabledByDefault"], true);
        assert!(json["color"].is_string());
    }
}
