//! Circular catchment regions and per-category aggregation.
//!
//! A region is drawn by dragging from one point to another. The circle is
//! the one whose diameter runs from the drag start to the drag end along
//! the great circle, approximated by a closed 64-vertex ring. Distances
//! use the haversine formula on the mean Earth radius.

use std::collections::BTreeMap;

use civic_map_asset_models::{Category, MapFeature};
use geo::{Bearing, Destination, Distance, Haversine, Intersects, LineString, Point, Polygon};
use serde::Serialize;

use crate::filter::CategoryFilter;

/// Number of vertices in the circle approximation, closing vertex excluded.
pub const CIRCLE_STEPS: usize = 64;

/// A committed or previewed catchment circle.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchmentRegion {
    center: Point<f64>,
    radius_km: f64,
    boundary: Polygon<f64>,
}

impl CatchmentRegion {
    /// Builds a circle around `center`.
    #[must_use]
    pub fn new(center: Point<f64>, radius_km: f64) -> Self {
        let radius_m = radius_km * 1000.0;
        let mut ring: Vec<Point<f64>> = (0..CIRCLE_STEPS)
            .map(|step| {
                #[allow(clippy::cast_precision_loss)]
                let bearing = -(step as f64) * 360.0 / CIRCLE_STEPS as f64;
                Haversine.destination(center, bearing, radius_m)
            })
            .collect();
        ring.push(ring[0]);

        Self {
            center,
            radius_km,
            boundary: Polygon::new(LineString::from(ring), vec![]),
        }
    }

    /// Builds the circle whose diameter is the drag from `start` to `end`.
    ///
    /// The radius is half the haversine distance and the center is the
    /// great-circle midpoint. A zero-length drag yields a zero-radius region
    /// that contains nothing.
    #[must_use]
    pub fn from_drag(start: Point<f64>, end: Point<f64>) -> Self {
        let distance_m = Haversine.distance(start, end);
        let radius_m = distance_m / 2.0;
        let center = if distance_m > 0.0 {
            let bearing = Haversine.bearing(start, end);
            Haversine.destination(start, bearing, radius_m)
        } else {
            start
        };

        log::trace!(
            "catchment from ({}, {}) to ({}, {}): radius {radius_m:.1} m",
            start.x(),
            start.y(),
            end.x(),
            end.y()
        );

        Self::new(center, radius_m / 1000.0)
    }

    #[must_use]
    pub const fn center(&self) -> Point<f64> {
        self.center
    }

    #[must_use]
    pub const fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// The closed polygon ring approximating the circle.
    #[must_use]
    pub const fn boundary(&self) -> &Polygon<f64> {
        &self.boundary
    }

    /// Whether a point lies inside the region. Points on the boundary count
    /// as inside.
    #[must_use]
    pub fn contains(&self, longitude: f64, latitude: f64) -> bool {
        if self.radius_km <= 0.0 {
            return false;
        }
        self.boundary.intersects(&Point::new(longitude, latitude))
    }
}

/// One pie slice (or table row) of a catchment breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySlice {
    pub category: Category,
    pub label: &'static str,
    pub count: usize,
    /// Fraction of the total in `0.0..=1.0`.
    pub share: f64,
    pub color: &'static str,
}

/// Per-category counts of the features inside a catchment region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatchmentStats {
    pub total: usize,
    /// Only categories with a non-zero count appear.
    pub by_category: BTreeMap<Category, usize>,
}

impl CatchmentStats {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Slices in category order, for the pie chart and the summary table.
    #[must_use]
    pub fn slices(&self) -> Vec<CategorySlice> {
        self.by_category
            .iter()
            .map(|(category, count)| {
                let metadata = category.metadata();
                #[allow(clippy::cast_precision_loss)]
                let share = if self.total == 0 {
                    0.0
                } else {
                    *count as f64 / self.total as f64
                };
                CategorySlice {
                    category: *category,
                    label: metadata.label,
                    count: *count,
                    share,
                    color: metadata.color,
                }
            })
            .collect()
    }
}

/// Features of enabled categories that lie inside `region`.
pub fn features_within<'a>(
    region: &'a CatchmentRegion,
    features: &'a [MapFeature],
    filter: &'a CategoryFilter,
) -> impl Iterator<Item = &'a MapFeature> + 'a {
    features.iter().filter(move |feature| {
        filter.is_enabled(feature.category) && region.contains(feature.longitude, feature.latitude)
    })
}

/// Counts the enabled features inside `region`.
///
/// With no region every count is zero.
#[must_use]
pub fn aggregate(
    region: Option<&CatchmentRegion>,
    features: &[MapFeature],
    filter: &CategoryFilter,
) -> CatchmentStats {
    let Some(region) = region else {
        return CatchmentStats::default();
    };

    let mut stats = CatchmentStats::default();
    for feature in features_within(region, features, filter) {
        *stats.by_category.entry(feature.category).or_insert(0) += 1;
        stats.total += 1;
    }

    log::debug!(
        "catchment of {:.3} km contains {} features in {} categories",
        region.radius_km(),
        stats.total,
        stats.by_category.len()
    );

    stats
}
