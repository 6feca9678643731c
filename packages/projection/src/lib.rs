#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! GeoJSON projection for civic map features.
//!
//! [`to_feature`] and [`to_feature_collection`] turn store rows into the
//! GeoJSON served by the API. [`from_feature`] reads such a feature back
//! into a [`MapFeature`] for a known category, which is how a dashboard
//! session loads what the API returns. Both directions use the same
//! camelCase property keys, so each category's properties are defined in
//! exactly one place.

use civic_map_asset_models::{AssetAttributes, Category, MapFeature};
use civic_map_database_models::FeatureRow;
use geo::{Geometry, Point, Polygon};
use geojson::{Feature, FeatureCollection, JsonObject, JsonValue};

/// Errors produced when a GeoJSON feature cannot be read back.
#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    /// The feature has no geometry.
    #[error("Feature has no geometry")]
    MissingGeometry,

    /// The geometry is not a point or polygon.
    #[error("Unsupported geometry type: {kind}")]
    UnsupportedGeometry {
        /// GeoJSON geometry type name.
        kind: String,
    },

    /// A required property is missing or has the wrong JSON type.
    #[error("Missing or invalid property: {key}")]
    InvalidProperty {
        /// Property key.
        key: &'static str,
    },
}

/// Returns the point used to place a geometry on the map.
///
/// Points are used as-is. Polygons use [`ring_mean`], which is not a
/// true area centroid. Other geometry types have no representative
/// point.
#[must_use]
pub fn representative_point(geometry: &Geometry<f64>) -> Option<Point<f64>> {
    match geometry {
        Geometry::Point(point) => Some(*point),
        Geometry::Polygon(polygon) => ring_mean(polygon),
        _ => None,
    }
}

/// Arithmetic mean of the outer ring's vertices, closing vertex included.
///
/// Only accurate for the near-regular shapes historical imports contain.
#[must_use]
pub fn ring_mean(polygon: &Polygon<f64>) -> Option<Point<f64>> {
    let ring = polygon.exterior();
    if ring.0.is_empty() {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let n = ring.0.len() as f64;
    let (sum_x, sum_y) = ring
        .coords()
        .fold((0.0, 0.0), |(x, y), c| (x + c.x, y + c.y));

    Some(Point::new(sum_x / n, sum_y / n))
}

/// Builds the properties object for a row: `id`, `name`, `category`, and
/// the category-specific keys.
fn properties(row: &FeatureRow) -> JsonObject {
    let mut props = JsonObject::new();
    props.insert("id".to_string(), JsonValue::from(row.id));
    props.insert("name".to_string(), JsonValue::from(row.name.clone()));
    props.insert(
        "category".to_string(),
        JsonValue::from(row.category.to_string()),
    );

    match &row.attributes {
        AssetAttributes::Plain => {}
        AssetAttributes::Park {
            district,
            parent_name,
        } => {
            props.insert("district".to_string(), JsonValue::from(district.clone()));
            props.insert(
                "parentName".to_string(),
                JsonValue::from(parent_name.clone()),
            );
        }
        AssetAttributes::ParkingLot {
            capacity,
            occupied_spaces,
        } => {
            props.insert("capacity".to_string(), JsonValue::from(*capacity));
            props.insert(
                "occupiedSpaces".to_string(),
                JsonValue::from(*occupied_spaces),
            );
        }
        AssetAttributes::BikeRental { region, dock_count } => {
            props.insert("region".to_string(), JsonValue::from(region.clone()));
            props.insert("dockCount".to_string(), JsonValue::from(*dock_count));
        }
        AssetAttributes::Camera { stream_url } => {
            props.insert("streamUrl".to_string(), JsonValue::from(stream_url.clone()));
        }
        AssetAttributes::TouristSite {
            subtype,
            description,
            image_ref,
        } => {
            props.insert("subtype".to_string(), JsonValue::from(subtype.clone()));
            props.insert(
                "description".to_string(),
                description.clone().map_or(JsonValue::Null, JsonValue::from),
            );
            props.insert(
                "imageRef".to_string(),
                image_ref.clone().map_or(JsonValue::Null, JsonValue::from),
            );
        }
    }

    props
}

/// Maps a store row to a GeoJSON feature.
#[must_use]
pub fn to_feature(row: &FeatureRow) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(&row.geometry))),
        id: None,
        properties: Some(properties(row)),
        foreign_members: None,
    }
}

/// Maps rows to a feature collection, preserving row order.
#[must_use]
pub fn to_feature_collection(rows: &[FeatureRow]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: rows.iter().map(to_feature).collect(),
        foreign_members: None,
    }
}

fn string_property(feature: &Feature, key: &'static str) -> Result<String, ProjectionError> {
    feature
        .property(key)
        .and_then(JsonValue::as_str)
        .map(str::to_string)
        .ok_or(ProjectionError::InvalidProperty { key })
}

fn optional_string_property(feature: &Feature, key: &'static str) -> Option<String> {
    feature
        .property(key)
        .and_then(JsonValue::as_str)
        .map(str::to_string)
}

fn int_property(feature: &Feature, key: &'static str) -> Result<i32, ProjectionError> {
    feature
        .property(key)
        .and_then(JsonValue::as_i64)
        .and_then(|v| i32::try_from(v).ok())
        .ok_or(ProjectionError::InvalidProperty { key })
}

fn attributes(category: Category, feature: &Feature) -> Result<AssetAttributes, ProjectionError> {
    Ok(match category {
        Category::Park => AssetAttributes::Park {
            district: optional_string_property(feature, "district").unwrap_or_default(),
            parent_name: optional_string_property(feature, "parentName").unwrap_or_default(),
        },
        Category::ParkingLot => AssetAttributes::ParkingLot {
            capacity: int_property(feature, "capacity")?,
            occupied_spaces: int_property(feature, "occupiedSpaces").unwrap_or(0),
        },
        Category::BikeRental => AssetAttributes::BikeRental {
            region: optional_string_property(feature, "region").unwrap_or_default(),
            dock_count: int_property(feature, "dockCount")?,
        },
        Category::Camera => AssetAttributes::Camera {
            stream_url: optional_string_property(feature, "streamUrl").unwrap_or_default(),
        },
        Category::TouristSite => AssetAttributes::TouristSite {
            subtype: string_property(feature, "subtype")?,
            description: optional_string_property(feature, "description"),
            image_ref: optional_string_property(feature, "imageRef"),
        },
        Category::Mosque
        | Category::HealthFacility
        | Category::School
        | Category::DrinkingFountain
        | Category::Pharmacy
        | Category::AssemblyArea
        | Category::BikeParking
        | Category::AirQualityStation => AssetAttributes::Plain,
    })
}

const fn geometry_kind(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// Reads a GeoJSON feature served for `category` back into a
/// [`MapFeature`].
///
/// The category comes from the endpoint the feature was fetched from, not
/// from the feature's properties.
///
/// # Errors
///
/// Returns [`ProjectionError`] if the geometry is missing or unsupported,
/// or a required property is missing.
pub fn from_feature(category: Category, feature: &Feature) -> Result<MapFeature, ProjectionError> {
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or(ProjectionError::MissingGeometry)?;
    let kind = geometry_kind(&geometry.value).to_string();

    let geometry: Geometry<f64> = geometry
        .clone()
        .try_into()
        .map_err(|_| ProjectionError::UnsupportedGeometry { kind: kind.clone() })?;
    let point =
        representative_point(&geometry).ok_or(ProjectionError::UnsupportedGeometry { kind })?;

    Ok(MapFeature {
        id: int_property(feature, "id").unwrap_or(0),
        category,
        name: optional_string_property(feature, "name").unwrap_or_default(),
        longitude: point.x(),
        latitude: point.y(),
        attributes: attributes(category, feature)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn parking_row() -> FeatureRow {
        FeatureRow {
            id: 7,
            category: Category::ParkingLot,
            name: "Mevlana Otoparkı".to_string(),
            geometry: Geometry::Point(Point::new(32.5047, 37.8707)),
            attributes: AssetAttributes::ParkingLot {
                capacity: 120,
                occupied_spaces: 45,
            },
        }
    }

    #[test]
    fn feature_collection_shape() {
        let collection = to_feature_collection(&[parking_row()]);
        let json = serde_json::to_value(&collection).unwrap();

        assert_eq!(json["type"], "FeatureCollection");
        let feature = &json["features"][0];
        assert_eq!(feature["type"], "Feature");
        assert_eq!(feature["geometry"]["type"], "Point");
        assert_eq!(feature["geometry"]["coordinates"][0], 32.5047);
        assert_eq!(feature["geometry"]["coordinates"][1], 37.8707);
        assert_eq!(feature["properties"]["name"], "Mevlana Otoparkı");
        assert_eq!(feature["properties"]["category"], "parking-lots");
        assert_eq!(feature["properties"]["capacity"], 120);
        assert_eq!(feature["properties"]["occupiedSpaces"], 45);
    }

    #[test]
    fn empty_rows_give_empty_collection() {
        let json = serde_json::to_value(to_feature_collection(&[])).unwrap();
        assert_eq!(json["features"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn served_feature_reads_back() {
        let row = parking_row();
        let feature = from_feature(Category::ParkingLot, &to_feature(&row)).unwrap();
        assert_eq!(feature.id, 7);
        assert_eq!(feature.name, row.name);
        assert!((feature.longitude - 32.5047).abs() < 1e-12);
        assert_eq!(feature.attributes, row.attributes);
    }

    #[test]
    fn tourist_site_optional_fields() {
        let row = FeatureRow {
            id: 1,
            category: Category::TouristSite,
            name: "Mevlana Müzesi".to_string(),
            geometry: Geometry::Point(Point::new(32.5047, 37.8707)),
            attributes: AssetAttributes::TouristSite {
                subtype: "museum".to_string(),
                description: None,
                image_ref: Some("uploads/mevlana.jpg".to_string()),
            },
        };
        let feature = to_feature(&row);
        let props = feature.properties.as_ref().unwrap();
        assert_eq!(props["description"], JsonValue::Null);
        assert_eq!(props["imageRef"], "uploads/mevlana.jpg");

        let loaded = from_feature(Category::TouristSite, &feature).unwrap();
        assert_eq!(loaded.attributes, row.attributes);
    }

    #[test]
    fn polygon_uses_ring_mean() {
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 0.0, y: 2.0),
        ];
        // Five vertices including the closing one: x = (0+2+2+0+0)/5.
        let center = ring_mean(&square).unwrap();
        assert!((center.x() - 0.8).abs() < 1e-12);
        assert!((center.y() - 0.8).abs() < 1e-12);

        let row = FeatureRow {
            id: 3,
            category: Category::Park,
            name: "Kültürpark".to_string(),
            geometry: Geometry::Polygon(square),
            attributes: AssetAttributes::Park {
                district: "Selçuklu".to_string(),
                parent_name: "Kültürpark".to_string(),
            },
        };
        let loaded = from_feature(Category::Park, &to_feature(&row)).unwrap();
        assert!((loaded.longitude - 0.8).abs() < 1e-12);
    }

    #[test]
    fn missing_required_property_is_an_error() {
        let mut feature = to_feature(&parking_row());
        feature.properties.as_mut().unwrap().remove("capacity");
        assert!(matches!(
            from_feature(Category::ParkingLot, &feature),
            Err(ProjectionError::InvalidProperty { key: "capacity" })
        ));
    }

    #[test]
    fn line_geometry_is_unsupported() {
        let mut feature = to_feature(&parking_row());
        feature.geometry = Some(geojson::Geometry::new(geojson::Value::LineString(vec![
            vec![0.0, 0.0],
            vec![1.0, 1.0],
        ])));
        assert!(matches!(
            from_feature(Category::ParkingLot, &feature),
            Err(ProjectionError::UnsupportedGeometry { .. })
        ));
    }
}
