//! Query functions for the civic map feature store.
//!
//! Each category resolves through [`category_table`] to a table name and
//! its extra columns; there is one generic listing query rather than one
//! hand-written query per category.

use chrono::{NaiveDate, NaiveTime};
use civic_map_asset_models::{AssetAttributes, Category, Station};
use civic_map_database_models::{BusStopRow, FeatureRow, NewTouristSite, PollutantAverage};
use geojson::GeoJson;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};

use crate::DbError;

/// Table holding every bus route stop, one row per stop.
const BUS_STOPS_TABLE: &str = "bus_route_stops";

/// Where a category lives in the store and how its extra columns map to
/// [`AssetAttributes`].
struct CategoryTable {
    table: &'static str,
    extra_columns: &'static [&'static str],
    attributes: fn(&Row) -> Result<AssetAttributes, DbError>,
}

fn plain(table: &'static str) -> CategoryTable {
    CategoryTable {
        table,
        extra_columns: &[],
        attributes: plain_attributes,
    }
}

/// Resolves the store projection for a category.
fn category_table(category: Category) -> CategoryTable {
    match category {
        Category::Park => CategoryTable {
            table: "parks",
            extra_columns: &["district", "parent_name"],
            attributes: park_attributes,
        },
        Category::Mosque => plain("mosques"),
        Category::HealthFacility => plain("health_facilities"),
        Category::School => plain("schools"),
        Category::DrinkingFountain => plain("drinking_fountains"),
        Category::Pharmacy => plain("pharmacies"),
        Category::AssemblyArea => plain("assembly_areas"),
        Category::BikeParking => plain("bike_parking"),
        Category::BikeRental => CategoryTable {
            table: "bike_rental_stations",
            extra_columns: &["region", "dock_count"],
            attributes: bike_rental_attributes,
        },
        Category::ParkingLot => CategoryTable {
            table: "parking_lots",
            extra_columns: &["capacity", "occupied_spaces"],
            attributes: parking_lot_attributes,
        },
        Category::AirQualityStation => plain("air_quality_stations"),
        Category::Camera => CategoryTable {
            table: "cameras",
            extra_columns: &["stream_url"],
            attributes: camera_attributes,
        },
        Category::TouristSite => CategoryTable {
            table: "tourist_sites",
            extra_columns: &["subtype", "description", "image_ref"],
            attributes: tourist_site_attributes,
        },
    }
}

fn conversion(column: &str, e: impl std::fmt::Display) -> DbError {
    DbError::Conversion {
        message: format!("Failed to read column {column}: {e}"),
    }
}

#[allow(clippy::unnecessary_wraps)]
fn plain_attributes(_row: &Row) -> Result<AssetAttributes, DbError> {
    Ok(AssetAttributes::Plain)
}

#[allow(clippy::unnecessary_wraps)]
fn park_attributes(row: &Row) -> Result<AssetAttributes, DbError> {
    Ok(AssetAttributes::Park {
        district: row.to_value("district").unwrap_or_default(),
        parent_name: row.to_value("parent_name").unwrap_or_default(),
    })
}

fn bike_rental_attributes(row: &Row) -> Result<AssetAttributes, DbError> {
    Ok(AssetAttributes::BikeRental {
        region: row.to_value("region").unwrap_or_default(),
        dock_count: row
            .to_value("dock_count")
            .map_err(|e| conversion("dock_count", e))?,
    })
}

fn parking_lot_attributes(row: &Row) -> Result<AssetAttributes, DbError> {
    Ok(AssetAttributes::ParkingLot {
        capacity: row
            .to_value("capacity")
            .map_err(|e| conversion("capacity", e))?,
        occupied_spaces: row.to_value("occupied_spaces").unwrap_or(0),
    })
}

#[allow(clippy::unnecessary_wraps)]
fn camera_attributes(row: &Row) -> Result<AssetAttributes, DbError> {
    Ok(AssetAttributes::Camera {
        stream_url: row.to_value("stream_url").unwrap_or_default(),
    })
}

fn tourist_site_attributes(row: &Row) -> Result<AssetAttributes, DbError> {
    Ok(AssetAttributes::TouristSite {
        subtype: row
            .to_value("subtype")
            .map_err(|e| conversion("subtype", e))?,
        description: row.to_value("description").unwrap_or(None),
        image_ref: row.to_value("image_ref").unwrap_or(None),
    })
}

/// Builds the listing query for a category.
fn list_sql(table: &CategoryTable) -> String {
    let mut sql = String::from("SELECT id, name, ST_AsGeoJSON(location) AS geometry");
    for column in table.extra_columns {
        sql.push_str(", ");
        sql.push_str(column);
    }
    sql.push_str(" FROM ");
    sql.push_str(table.table);
    sql
}

/// Lists every row of a category in the store's natural row order.
///
/// Rows whose geometry cannot be parsed are skipped with a warning.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a required column cannot be
/// read.
pub async fn list_by_category(
    db: &dyn Database,
    category: Category,
) -> Result<Vec<FeatureRow>, DbError> {
    let table = category_table(category);
    let sql = list_sql(&table);
    log::debug!("Listing {category}: {sql}");

    let rows = db.query_raw_params(&sql, &[]).await?;
    let mut features = Vec::with_capacity(rows.len());

    for row in &rows {
        let id: i32 = row.to_value("id").map_err(|e| conversion("id", e))?;
        let geometry_json: String = row.to_value("geometry").unwrap_or_default();

        let Some(geometry) = parse_geometry(&geometry_json) else {
            log::warn!("Skipping {category} row {id}: unreadable geometry");
            continue;
        };

        features.push(FeatureRow {
            id,
            category,
            name: row.to_value("name").unwrap_or_default(),
            geometry,
            attributes: (table.attributes)(row)?,
        });
    }

    Ok(features)
}

/// Computes the daily averages of `no`, `no2`, `nox` and `pm10` for one
/// station and calendar date.
///
/// `NULL` readings are ignored by `AVG`; a date with no readings at all
/// yields zeros through `COALESCE`.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or the result cannot be read.
pub async fn daily_pollutant_average(
    db: &dyn Database,
    station: Station,
    date: NaiveDate,
) -> Result<PollutantAverage, DbError> {
    let start = date.and_time(NaiveTime::MIN);
    let end = date
        .succ_opt()
        .ok_or_else(|| DbError::Conversion {
            message: format!("No calendar day follows {date}"),
        })?
        .and_time(NaiveTime::MIN);

    let sql = format!(
        "SELECT
             COALESCE(AVG(no), 0)::double precision AS no,
             COALESCE(AVG(no2), 0)::double precision AS no2,
             COALESCE(AVG(nox), 0)::double precision AS nox,
             COALESCE(AVG(pm10), 0)::double precision AS pm10
         FROM {}
         WHERE measured_at >= $1 AND measured_at < $2",
        station.readings_table()
    );
    log::debug!("Daily average for {station} on {date}");

    let rows = db
        .query_raw_params(
            &sql,
            &[DatabaseValue::DateTime(start), DatabaseValue::DateTime(end)],
        )
        .await?;

    // COALESCE always produces one row; an empty result is still zeros.
    let Some(row) = rows.first() else {
        return Ok(PollutantAverage::default());
    };

    Ok(PollutantAverage {
        no: row.to_value("no").map_err(|e| conversion("no", e))?,
        no2: row.to_value("no2").map_err(|e| conversion("no2", e))?,
        nox: row.to_value("nox").map_err(|e| conversion("nox", e))?,
        pm10: row.to_value("pm10").map_err(|e| conversion("pm10", e))?,
    })
}

/// Lists the stops of one route ordered by row id, which is the order the
/// stops were inserted in.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn list_bus_stops_by_route(
    db: &dyn Database,
    route_number: i32,
) -> Result<Vec<BusStopRow>, DbError> {
    let rows = db
        .query_raw_params(
            &format!(
                "SELECT id, route_number, ST_X(location) AS longitude, ST_Y(location) AS latitude
                 FROM {BUS_STOPS_TABLE}
                 WHERE route_number = $1
                 ORDER BY id"
            ),
            &[DatabaseValue::Int32(route_number)],
        )
        .await?;

    let mut stops = Vec::with_capacity(rows.len());
    for row in &rows {
        stops.push(BusStopRow {
            id: row.to_value("id").map_err(|e| conversion("id", e))?,
            route_number: row.to_value("route_number").unwrap_or(route_number),
            longitude: row
                .to_value("longitude")
                .map_err(|e| conversion("longitude", e))?,
            latitude: row
                .to_value("latitude")
                .map_err(|e| conversion("latitude", e))?,
        });
    }

    log::debug!("Route {route_number}: {} stops", stops.len());
    Ok(stops)
}

/// Lists the distinct route numbers in ascending order.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn list_route_numbers(db: &dyn Database) -> Result<Vec<i32>, DbError> {
    let rows = db
        .query_raw_params(
            &format!("SELECT DISTINCT route_number FROM {BUS_STOPS_TABLE} ORDER BY route_number"),
            &[],
        )
        .await?;

    rows.iter()
        .map(|row| {
            row.to_value("route_number")
                .map_err(|e| conversion("route_number", e))
        })
        .collect()
}

/// Inserts a tourist site as an SRID 4326 point.
///
/// # Errors
///
/// Returns [`DbError`] if the insert fails.
pub async fn insert_tourist_site(db: &dyn Database, site: &NewTouristSite) -> Result<(), DbError> {
    let optional = |value: Option<&String>| {
        value.map_or(DatabaseValue::Null, |v| DatabaseValue::String(v.clone()))
    };

    db.exec_raw_params(
        "INSERT INTO tourist_sites (name, subtype, description, image_ref, location)
         VALUES ($1, $2, $3, $4, ST_SetSRID(ST_MakePoint($5, $6), 4326))",
        &[
            DatabaseValue::String(site.name.clone()),
            DatabaseValue::String(site.subtype.clone()),
            optional(site.description.as_ref()),
            optional(site.image_ref.as_ref()),
            DatabaseValue::Real64(site.longitude),
            DatabaseValue::Real64(site.latitude),
        ],
    )
    .await?;

    log::info!("Inserted tourist site {:?}", site.name);
    Ok(())
}

/// Parses an `ST_AsGeoJSON` geometry into a `geo` geometry.
fn parse_geometry(geojson_str: &str) -> Option<geo::Geometry<f64>> {
    let geojson: GeoJson = geojson_str.parse().ok()?;
    if let GeoJson::Geometry(geom) = geojson {
        geom.try_into().ok()
    } else {
        None
    }
}
