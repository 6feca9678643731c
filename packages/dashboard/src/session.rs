//! The dashboard session: loaded layers plus the interactive map state.

use std::collections::BTreeMap;

use civic_map_asset_models::{Category, MapFeature};
use civic_map_projection::from_feature;
use civic_map_spatial::{
    BoundingBox,
    catchment::{self, CatchmentStats},
    cluster::{
        ClusterIndex, ClusterMarker, ClusterOptions, FORCE_CLUSTER_BELOW_ZOOM, cluster_marker_size,
        clustering_active,
    },
    draw::DrawTool,
    filter::CategoryFilter,
};
use futures::future::join_all;

use crate::{DashboardError, FeatureSource};

/// Viewport shown when a session starts (central Konya).
pub const INITIAL_VIEWPORT: BoundingBox = BoundingBox::new(32.3844, 37.7719, 32.5844, 37.9719);

/// Zoom shown when a session starts.
pub const INITIAL_ZOOM: f64 = 12.0;

/// Zoom reached by clicking a cluster is capped here.
pub const MAX_CLUSTER_CLICK_ZOOM: f64 = 16.0;

/// A marker to render for the current viewport.
#[derive(Debug, Clone, PartialEq)]
pub enum VisibleMarker<'a> {
    Feature(&'a MapFeature),
    Cluster {
        category: Category,
        id: u64,
        longitude: f64,
        latitude: f64,
        count: usize,
        /// Marker width in pixels at the current zoom.
        size: f64,
    },
}

pub struct DashboardSession {
    features: BTreeMap<Category, Vec<MapFeature>>,
    clusters: BTreeMap<Category, ClusterIndex>,
    filter: CategoryFilter,
    draw: DrawTool,
    cluster_mode: bool,
    viewport: BoundingBox,
    zoom: f64,
}

async fn load_category(
    source: &dyn FeatureSource,
    category: Category,
) -> Result<Vec<MapFeature>, DashboardError> {
    let collection = source.fetch_category(category).await?;

    Ok(collection
        .features
        .iter()
        .filter_map(|feature| match from_feature(category, feature) {
            Ok(feature) => Some(feature),
            Err(e) => {
                log::warn!("Skipping unreadable {category} feature: {e}");
                None
            }
        })
        .collect())
}

impl DashboardSession {
    /// Fetches all category layers concurrently and builds a session.
    ///
    /// A category whose fetch fails is logged and starts out empty; the
    /// other layers are unaffected.
    pub async fn load(source: &dyn FeatureSource) -> Self {
        let results = join_all(Category::all().iter().map(|&category| async move {
            (category, load_category(source, category).await)
        }))
        .await;

        let features = results
            .into_iter()
            .map(|(category, result)| {
                let features = result.unwrap_or_else(|e| {
                    log::warn!("Failed to load {category}: {e}");
                    Vec::new()
                });
                (category, features)
            })
            .collect::<BTreeMap<_, _>>();

        log::info!(
            "Loaded {} features across {} categories",
            features.values().map(Vec::len).sum::<usize>(),
            features.len()
        );

        Self::from_features(features)
    }

    /// Builds a session over already loaded layers.
    #[must_use]
    pub fn from_features(features: BTreeMap<Category, Vec<MapFeature>>) -> Self {
        let mut session = Self {
            features: BTreeMap::new(),
            clusters: BTreeMap::new(),
            filter: CategoryFilter::default(),
            draw: DrawTool::default(),
            cluster_mode: false,
            viewport: INITIAL_VIEWPORT,
            zoom: INITIAL_ZOOM,
        };
        for (category, list) in features {
            session.replace_category(category, list);
        }
        session.set_viewport(INITIAL_VIEWPORT, INITIAL_ZOOM);
        session
    }

    /// Swaps one category's features and rebuilds its cluster index.
    pub fn replace_category(&mut self, category: Category, features: Vec<MapFeature>) {
        let points: Vec<(f64, f64)> = features
            .iter()
            .map(|feature| (feature.longitude, feature.latitude))
            .collect();
        self.clusters
            .insert(category, ClusterIndex::new(&points, ClusterOptions::default()));
        self.features.insert(category, features);
    }

    /// Features of one category.
    #[must_use]
    pub fn features(&self, category: Category) -> &[MapFeature] {
        self.features.get(&category).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub const fn filter(&self) -> &CategoryFilter {
        &self.filter
    }

    /// Flips a category's visibility and returns its new state.
    pub fn toggle_category(&mut self, category: Category) -> bool {
        self.filter.toggle(category)
    }

    #[must_use]
    pub const fn draw(&self) -> &DrawTool {
        &self.draw
    }

    /// The draw tool, for feeding pointer events.
    pub const fn draw_mut(&mut self) -> &mut DrawTool {
        &mut self.draw
    }

    /// Counts of enabled features inside the committed catchment region.
    #[must_use]
    pub fn catchment_stats(&self) -> CatchmentStats {
        let region = self.draw.committed();
        let mut stats = CatchmentStats::default();
        for list in self.features.values() {
            let part = catchment::aggregate(region, list, &self.filter);
            stats.total += part.total;
            stats.by_category.extend(part.by_category);
        }
        stats
    }

    #[must_use]
    pub const fn viewport(&self) -> (BoundingBox, f64) {
        (self.viewport, self.zoom)
    }

    /// Records a pan or zoom. Dropping below the forced-clustering zoom
    /// switches cluster mode on, and it stays on after zooming back in.
    pub fn set_viewport(&mut self, viewport: BoundingBox, zoom: f64) {
        self.viewport = viewport;
        self.zoom = zoom;
        if zoom < FORCE_CLUSTER_BELOW_ZOOM && !self.cluster_mode {
            log::debug!("Zoom {zoom} below {FORCE_CLUSTER_BELOW_ZOOM}; forcing cluster mode");
            self.cluster_mode = true;
        }
    }

    /// Flips the user's cluster toggle. Ignored while clustering is forced.
    pub fn toggle_cluster_mode(&mut self) -> bool {
        if self.zoom >= FORCE_CLUSTER_BELOW_ZOOM {
            self.cluster_mode = !self.cluster_mode;
        }
        self.cluster_mode
    }

    #[must_use]
    pub fn clustering_active(&self) -> bool {
        clustering_active(self.zoom, self.cluster_mode)
    }

    /// Zoom to fly to after clicking a cluster.
    #[must_use]
    pub fn cluster_click_zoom(&self) -> f64 {
        (self.zoom + 2.0).min(MAX_CLUSTER_CLICK_ZOOM)
    }

    /// Zoom at which a cluster of `category` breaks apart.
    #[must_use]
    pub fn cluster_expansion_zoom(&self, category: Category, cluster_id: u64) -> Option<u8> {
        self.clusters
            .get(&category)
            .map(|index| index.expansion_zoom(cluster_id))
    }

    /// Markers for every enabled category in the current viewport.
    #[must_use]
    pub fn visible_markers(&self) -> Vec<VisibleMarker<'_>> {
        let clustered = self.clustering_active();
        let mut markers = Vec::new();

        for category in self.filter.enabled() {
            let features = self.features(category);

            if clustered {
                let Some(index) = self.clusters.get(&category) else {
                    continue;
                };
                markers.extend(
                    index
                        .clusters(&self.viewport, self.zoom)
                        .into_iter()
                        .filter_map(|marker| match marker {
                            ClusterMarker::Point { index, .. } => {
                                features.get(index).map(VisibleMarker::Feature)
                            }
                            ClusterMarker::Cluster {
                                id,
                                longitude,
                                latitude,
                                count,
                            } => Some(VisibleMarker::Cluster {
                                category,
                                id,
                                longitude,
                                latitude,
                                count,
                                size: cluster_marker_size(count, self.zoom),
                            }),
                        }),
                );
            } else {
                markers.extend(
                    features
                        .iter()
                        .filter(|f| self.viewport.contains(f.longitude, f.latitude))
                        .map(VisibleMarker::Feature),
                );
            }
        }

        markers
    }
}

#[cfg(test)]
mod tests {
    use geo::Point;

    use super::*;
    use crate::testing::{MemorySource, collection, point_feature};

    fn parking_lots() -> Vec<geojson::Feature> {
        vec![
            point_feature(1, 32.500, 37.870),
            point_feature(2, 32.501, 37.870),
            point_feature(3, 32.502, 37.871),
            point_feature(4, 32.500, 37.872),
            point_feature(5, 32.503, 37.871),
        ]
    }

    fn source() -> MemorySource {
        let mut source = MemorySource::default();
        source
            .collections
            .insert(Category::ParkingLot, collection(parking_lots()));
        source.collections.insert(
            Category::Park,
            collection((0..10).map(|i| point_feature(i, 32.41, 37.80)).collect()),
        );
        source
    }

    #[tokio::test]
    async fn load_fills_every_category() {
        let session = DashboardSession::load(&source()).await;
        assert_eq!(session.features(Category::ParkingLot).len(), 5);
        assert_eq!(session.features(Category::Park).len(), 10);
        assert!(session.features(Category::Mosque).is_empty());
    }

    #[tokio::test]
    async fn failed_category_degrades_to_empty() {
        let mut source = source();
        source.failing.insert(Category::Park);

        let session = DashboardSession::load(&source).await;
        assert!(session.features(Category::Park).is_empty());
        assert_eq!(session.features(Category::ParkingLot).len(), 5);
    }

    #[tokio::test]
    async fn catchment_counts_parks() {
        let mut session = DashboardSession::load(&source()).await;
        let draw = session.draw_mut();
        draw.arm();
        draw.pointer_down(Point::new(32.40, 37.80));
        draw.pointer_up(Point::new(32.42, 37.80));

        let stats = session.catchment_stats();
        assert_eq!(stats.total, 10);
        assert_eq!(stats.by_category.get(&Category::Park), Some(&10));
        assert_eq!(stats.by_category.len(), 1);

        session.toggle_category(Category::Park);
        assert_eq!(session.catchment_stats().total, 0);
    }

    #[tokio::test]
    async fn redraw_discards_previous_catchment() {
        let mut session = DashboardSession::load(&source()).await;
        let draw = session.draw_mut();
        draw.arm();
        draw.pointer_down(Point::new(32.40, 37.80));
        draw.pointer_up(Point::new(32.42, 37.80));
        assert_eq!(session.catchment_stats().total, 10);

        session.draw_mut().arm();
        assert_eq!(session.catchment_stats().total, 0);

        session.draw_mut().cancel();
        assert_eq!(session.catchment_stats().total, 0);
        assert!(session.draw().committed().is_none());
    }

    #[tokio::test]
    async fn no_catchment_counts_nothing() {
        let session = DashboardSession::load(&source()).await;
        assert!(session.catchment_stats().is_empty());
    }

    #[tokio::test]
    async fn low_zoom_shows_one_cluster() {
        let mut session = DashboardSession::load(&source()).await;
        session.toggle_category(Category::Park);
        session.set_viewport(BoundingBox::new(32.0, 37.5, 33.0, 38.2), 10.0);

        let markers = session.visible_markers();
        assert_eq!(markers.len(), 1);
        assert!(matches!(
            markers[0],
            VisibleMarker::Cluster {
                category: Category::ParkingLot,
                count: 5,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn high_zoom_without_clustering_shows_points_in_view() {
        let mut session = DashboardSession::load(&source()).await;
        session.toggle_category(Category::Park);
        session.set_viewport(BoundingBox::new(32.49, 37.86, 32.51, 37.88), 17.0);

        assert!(session.clustering_active());
        assert!(!session.toggle_cluster_mode());
        assert!(!session.clustering_active());

        let markers = session.visible_markers();
        assert_eq!(markers.len(), 5);
        assert!(markers.iter().all(|m| matches!(m, VisibleMarker::Feature(_))));

        session.set_viewport(BoundingBox::new(30.0, 36.0, 30.1, 36.1), 17.0);
        assert!(session.visible_markers().is_empty());
    }

    #[tokio::test]
    async fn cluster_toggle_is_locked_below_threshold() {
        let mut session = DashboardSession::load(&source()).await;
        session.set_viewport(INITIAL_VIEWPORT, 12.0);
        assert!(session.toggle_cluster_mode());
        assert!(session.clustering_active());
        assert!((session.cluster_click_zoom() - 14.0).abs() < f64::EPSILON);

        session.set_viewport(INITIAL_VIEWPORT, 15.5);
        assert!((session.cluster_click_zoom() - 16.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn disabled_category_has_no_markers() {
        let mut session = DashboardSession::load(&source()).await;
        session.toggle_category(Category::Park);
        session.toggle_category(Category::ParkingLot);
        session.set_viewport(BoundingBox::new(32.0, 37.5, 33.0, 38.2), 10.0);
        assert!(session.visible_markers().is_empty());
    }
}
