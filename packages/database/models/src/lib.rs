#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Row types as read from and written to the `PostGIS` feature store.
//!
//! These are distinct from the GeoJSON shapes produced by
//! `civic_map_projection` and the API types in `civic_map_server_models`.

use civic_map_asset_models::{AssetAttributes, Category};
use serde::{Deserialize, Serialize};

/// A civic asset row from one of the per-category tables.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    /// Primary key, unique within the category's table only.
    pub id: i32,
    /// Category the row was read from.
    pub category: Category,
    /// Asset name.
    pub name: String,
    /// Stored geometry in WGS84. Current tables hold points; older
    /// imports may still contain polygons.
    pub geometry: geo::Geometry<f64>,
    /// Category-specific columns.
    pub attributes: AssetAttributes,
}

/// One stop of a bus route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BusStopRow {
    /// Primary key. Ascending id is the only stop ordering the store keeps.
    pub id: i32,
    /// Route number.
    pub route_number: i32,
    /// Longitude.
    pub longitude: f64,
    /// Latitude.
    pub latitude: f64,
}

/// Daily averages of the four pollutant measures for one station.
///
/// A date without readings yields all zeros rather than an absent row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutantAverage {
    /// Nitric oxide.
    pub no: f64,
    /// Nitrogen dioxide.
    pub no2: f64,
    /// Nitrogen oxides.
    pub nox: f64,
    /// Particulate matter under 10 µm.
    pub pm10: f64,
}

/// A tourist site to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTouristSite {
    /// Site name.
    pub name: String,
    /// Subtype tag.
    pub subtype: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional image reference.
    pub image_ref: Option<String>,
    /// Longitude.
    pub longitude: f64,
    /// Latitude.
    pub latitude: f64,
}
