#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Civic asset taxonomy types shared across the civic-map system.
//!
//! Defines the 13 asset categories the dashboard understands, the 7
//! air-quality measurement stations, and the single category metadata
//! registry (label, icon, color, marker size, default visibility) used
//! by both the API and the dashboard.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One of the fixed civic asset categories.
///
/// The serialized form is the URL token used by the `GET /api/{category}`
/// endpoint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Category {
    /// Public parks and green areas
    #[serde(rename = "parks")]
    #[strum(serialize = "parks")]
    Park,
    /// Mosques
    #[serde(rename = "mosques")]
    #[strum(serialize = "mosques")]
    Mosque,
    /// Hospitals, clinics, and family health centers
    #[serde(rename = "health-facilities")]
    #[strum(serialize = "health-facilities")]
    HealthFacility,
    /// Schools
    #[serde(rename = "schools")]
    #[strum(serialize = "schools")]
    School,
    /// Public drinking-water fountains
    #[serde(rename = "drinking-fountains")]
    #[strum(serialize = "drinking-fountains")]
    DrinkingFountain,
    /// Pharmacies
    #[serde(rename = "pharmacies")]
    #[strum(serialize = "pharmacies")]
    Pharmacy,
    /// Emergency assembly areas
    #[serde(rename = "assembly-areas")]
    #[strum(serialize = "assembly-areas")]
    AssemblyArea,
    /// Bicycle parking racks
    #[serde(rename = "bike-parking")]
    #[strum(serialize = "bike-parking")]
    BikeParking,
    /// Shared bicycle rental docks
    #[serde(rename = "bike-rental-stations")]
    #[strum(serialize = "bike-rental-stations")]
    BikeRental,
    /// Car parks with capacity and occupancy
    #[serde(rename = "parking-lots")]
    #[strum(serialize = "parking-lots")]
    ParkingLot,
    /// Air-quality measurement stations
    #[serde(rename = "air-quality-stations")]
    #[strum(serialize = "air-quality-stations")]
    AirQualityStation,
    /// Traffic and city cameras
    #[serde(rename = "cameras")]
    #[strum(serialize = "cameras")]
    Camera,
    /// Historical and touristic sites
    #[serde(rename = "tourist-sites")]
    #[strum(serialize = "tourist-sites")]
    TouristSite,
}

impl Category {
    /// Returns all variants of this enum, in dashboard display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Park,
            Self::Mosque,
            Self::HealthFacility,
            Self::School,
            Self::DrinkingFountain,
            Self::Pharmacy,
            Self::AssemblyArea,
            Self::BikeParking,
            Self::BikeRental,
            Self::ParkingLot,
            Self::AirQualityStation,
            Self::Camera,
            Self::TouristSite,
        ]
    }

    /// Parses a URL token such as `"parking-lots"`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownCategoryError`] if the token names no category.
    pub fn from_token(token: &str) -> Result<Self, UnknownCategoryError> {
        token.parse().map_err(|_| UnknownCategoryError {
            token: token.to_string(),
        })
    }

    /// Returns the display metadata for this category.
    #[must_use]
    pub const fn metadata(self) -> &'static CategoryMetadata {
        match self {
            Self::Park => &PARK,
            Self::Mosque => &MOSQUE,
            Self::HealthFacility => &HEALTH_FACILITY,
            Self::School => &SCHOOL,
            Self::DrinkingFountain => &DRINKING_FOUNTAIN,
            Self::Pharmacy => &PHARMACY,
            Self::AssemblyArea => &ASSEMBLY_AREA,
            Self::BikeParking => &BIKE_PARKING,
            Self::BikeRental => &BIKE_RENTAL,
            Self::ParkingLot => &PARKING_LOT,
            Self::AirQualityStation => &AIR_QUALITY_STATION,
            Self::Camera => &CAMERA,
            Self::TouristSite => &TOURIST_SITE,
        }
    }
}

/// Error returned when a category token does not name a known category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategoryError {
    /// The token that failed to parse.
    pub token: String,
}

impl std::fmt::Display for UnknownCategoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown category: {}", self.token)
    }
}

impl std::error::Error for UnknownCategoryError {}

/// Display metadata for one [`Category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMetadata {
    /// Human-readable label.
    pub label: &'static str,
    /// Icon asset file name served by the frontend.
    pub icon: &'static str,
    /// Marker and chart color as a CSS hex string.
    pub color: &'static str,
    /// Individual marker width in pixels.
    pub marker_size: u16,
    /// Whether the category is shown when a session starts.
    pub enabled_by_default: bool,
}

const PARK: CategoryMetadata = CategoryMetadata {
    label: "Park",
    icon: "park.png",
    color: "#22c55e",
    marker_size: 60,
    enabled_by_default: true,
};

const MOSQUE: CategoryMetadata = CategoryMetadata {
    label: "Mosque",
    icon: "mosque.png",
    color: "#a21caf",
    marker_size: 40,
    enabled_by_default: false,
};

const HEALTH_FACILITY: CategoryMetadata = CategoryMetadata {
    label: "Health Facility",
    icon: "health-facility.png",
    color: "#ef4444",
    marker_size: 60,
    enabled_by_default: true,
};

const SCHOOL: CategoryMetadata = CategoryMetadata {
    label: "School",
    icon: "school.png",
    color: "#3b82f6",
    marker_size: 40,
    enabled_by_default: false,
};

const DRINKING_FOUNTAIN: CategoryMetadata = CategoryMetadata {
    label: "Drinking Fountain",
    icon: "drinking-fountain.png",
    color: "#06b6d4",
    marker_size: 40,
    enabled_by_default: true,
};

const PHARMACY: CategoryMetadata = CategoryMetadata {
    label: "Pharmacy",
    icon: "pharmacy.png",
    color: "#f59e42",
    marker_size: 40,
    enabled_by_default: false,
};

const ASSEMBLY_AREA: CategoryMetadata = CategoryMetadata {
    label: "Assembly Area",
    icon: "assembly-area.png",
    color: "#eab308",
    marker_size: 72,
    enabled_by_default: false,
};

const BIKE_PARKING: CategoryMetadata = CategoryMetadata {
    label: "Bike Parking",
    icon: "bike-parking.png",
    color: "#fde047",
    marker_size: 80,
    enabled_by_default: false,
};

const BIKE_RENTAL: CategoryMetadata = CategoryMetadata {
    label: "Bike Rental Station",
    icon: "bike-rental-station.png",
    color: "#15803d",
    marker_size: 104,
    enabled_by_default: false,
};

const PARKING_LOT: CategoryMetadata = CategoryMetadata {
    label: "Parking Lot",
    icon: "parking-lot.png",
    color: "#2563eb",
    marker_size: 60,
    enabled_by_default: true,
};

const AIR_QUALITY_STATION: CategoryMetadata = CategoryMetadata {
    label: "Air Quality Station",
    icon: "air-quality-station.png",
    color: "#ec4899",
    marker_size: 80,
    enabled_by_default: false,
};

const CAMERA: CategoryMetadata = CategoryMetadata {
    label: "Camera",
    icon: "camera.png",
    color: "#6366f1",
    marker_size: 120,
    enabled_by_default: false,
};

const TOURIST_SITE: CategoryMetadata = CategoryMetadata {
    label: "Historical/Tourist Site",
    icon: "tourist-site.png",
    color: "#a21caf",
    marker_size: 80,
    enabled_by_default: false,
};

/// Category-specific attributes carried by a feature.
///
/// Categories without extra columns use [`AssetAttributes::Plain`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AssetAttributes {
    /// No attributes beyond the name.
    #[default]
    Plain,
    /// Park attributes.
    Park {
        /// District the park belongs to.
        district: String,
        /// Name of the parent feature (e.g. the park complex).
        parent_name: String,
    },
    /// Parking lot occupancy.
    ParkingLot {
        /// Total spaces.
        capacity: i32,
        /// Occupied spaces, nominally `0..=capacity` but not enforced.
        occupied_spaces: i32,
    },
    /// Shared bike rental dock.
    BikeRental {
        /// Region name.
        region: String,
        /// Number of docks.
        dock_count: i32,
    },
    /// Camera stream.
    Camera {
        /// Stream URL.
        stream_url: String,
    },
    /// Tourist site details.
    TouristSite {
        /// Subtype tag (e.g. museum, mosque, monument).
        subtype: String,
        /// Free-text description.
        description: Option<String>,
        /// Image reference (path or URL).
        image_ref: Option<String>,
    },
}

/// A civic asset loaded into a dashboard session.
///
/// The id is only unique within its category.
#[derive(Debug, Clone, PartialEq)]
pub struct MapFeature {
    /// Row id within the category.
    pub id: i32,
    /// Category the feature was loaded from. Never changes after loading.
    pub category: Category,
    /// Asset name.
    pub name: String,
    /// Longitude in WGS84 degrees.
    pub longitude: f64,
    /// Latitude in WGS84 degrees.
    pub latitude: f64,
    /// Category-specific attributes.
    pub attributes: AssetAttributes,
}

/// Air-quality measurement stations with a daily-average endpoint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Station {
    /// Bosna station
    Bosna,
    /// Karatay station
    Karatay1,
    /// Karatay 2 station
    Karatay2,
    /// Karkent station
    Karkent,
    /// Meram station
    Meram,
    /// Sarayönü station
    Sarayonu,
    /// Central traffic station
    Trafik,
}

impl Station {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Bosna,
            Self::Karatay1,
            Self::Karatay2,
            Self::Karkent,
            Self::Meram,
            Self::Sarayonu,
            Self::Trafik,
        ]
    }

    /// Parses a station URL key such as `"meram"`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownStationError`] if the key names no station.
    pub fn from_key(key: &str) -> Result<Self, UnknownStationError> {
        key.parse().map_err(|_| UnknownStationError {
            name: key.to_string(),
        })
    }

    /// Resolves a station from the name stored in the
    /// `air_quality_stations` table.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownStationError`] if no station has that display name.
    pub fn from_display_name(name: &str) -> Result<Self, UnknownStationError> {
        Self::all()
            .iter()
            .copied()
            .find(|station| station.display_name() == name.trim())
            .ok_or_else(|| UnknownStationError {
                name: name.to_string(),
            })
    }

    /// Returns the station name as it appears on the map.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Bosna => "Bosna İstasyonu",
            Self::Karatay1 => "Karatay İstasyonu",
            Self::Karatay2 => "Karatay 2 İstasyonu",
            Self::Karkent => "Karkent İstasyonu",
            Self::Meram => "Meram İstasyonu",
            Self::Sarayonu => "Sarayönü İstasyonu",
            Self::Trafik => "Merkez Trafik İstasyonu",
        }
    }

    /// Returns the name of the table holding this station's readings.
    #[must_use]
    pub const fn readings_table(self) -> &'static str {
        match self {
            Self::Bosna => "air_quality_bosna",
            Self::Karatay1 => "air_quality_karatay1",
            Self::Karatay2 => "air_quality_karatay2",
            Self::Karkent => "air_quality_karkent",
            Self::Meram => "air_quality_meram",
            Self::Sarayonu => "air_quality_sarayonu",
            Self::Trafik => "air_quality_trafik",
        }
    }
}

/// Error returned when a station key or display name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStationError {
    /// The key or name that failed to resolve.
    pub name: String,
}

impl std::fmt::Display for UnknownStationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown air-quality station: {}", self.name)
    }
}

impl std::error::Error for UnknownStationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_tokens_roundtrip() {
        for cat in Category::all() {
            let token = cat.to_string();
            assert_eq!(Category::from_token(&token).unwrap(), *cat);
            let json = serde_json::to_string(cat).unwrap();
            assert_eq!(json, format!("\"{token}\""));
        }
        assert_eq!(Category::all().len(), 13);
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = Category::from_token("fire-stations").unwrap_err();
        assert_eq!(err.token, "fire-stations");
        assert!(Category::from_token("Parks").is_err());
    }

    #[test]
    fn default_enabled_subset() {
        let enabled: Vec<Category> = Category::all()
            .iter()
            .copied()
            .filter(|c| c.metadata().enabled_by_default)
            .collect();
        assert_eq!(
            enabled,
            vec![
                Category::Park,
                Category::HealthFacility,
                Category::DrinkingFountain,
                Category::ParkingLot,
            ]
        );
    }

    #[test]
    fn station_lookup_by_key_and_display_name() {
        assert_eq!(Station::from_key("meram").unwrap(), Station::Meram);
        assert_eq!(Station::from_key("karatay2").unwrap(), Station::Karatay2);
        assert!(Station::from_key("ankara").is_err());

        for station in Station::all() {
            assert_eq!(
                Station::from_display_name(station.display_name()).unwrap(),
                *station
            );
            assert!(station.readings_table().ends_with(station.as_ref()));
        }
        assert!(Station::from_display_name("Unknown İstasyonu").is_err());
    }
}
