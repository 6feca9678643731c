//! Hierarchical greedy point clustering.
//!
//! Points are projected into the unit Web Mercator square and merged zoom
//! level by zoom level, from `max_zoom + 1` (raw points) down to
//! `min_zoom`. At each level a node absorbs every unprocessed neighbor
//! within `radius / (extent * 2^zoom)`; the merge only happens when the
//! result holds at least `min_points` points. Each level keeps its own
//! R-tree so a viewport query is a single envelope lookup.

use std::f64::consts::PI;

use rstar::{AABB, RTree, primitives::GeomWithData};
use serde::Serialize;

use crate::BoundingBox;

/// Below this zoom clustering is on regardless of the user's toggle.
pub const FORCE_CLUSTER_BELOW_ZOOM: f64 = 14.0;

/// Whether markers should be clustered at `zoom`.
#[must_use]
pub fn clustering_active(zoom: f64, user_enabled: bool) -> bool {
    user_enabled || zoom < FORCE_CLUSTER_BELOW_ZOOM
}

/// Pixel width of a cluster marker holding `count` points at `zoom`.
#[must_use]
pub fn cluster_marker_size(count: usize, zoom: f64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let base = ((count as f64).sqrt() * 15.0).clamp(30.0, 70.0);
    base * ((16.0 - zoom) / 8.0).max(0.6)
}

/// Clustering parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterOptions {
    /// Cluster radius in tile pixels.
    pub radius: f64,
    /// Tile extent the radius is measured against.
    pub extent: f64,
    pub min_zoom: u8,
    /// Above this zoom every point is returned individually.
    pub max_zoom: u8,
    pub min_points: usize,
}

impl ClusterOptions {
    /// Highest zoom whose level id still fits the five zoom bits of a
    /// cluster id.
    pub const ZOOM_LIMIT: u8 = 30;

    /// Caps `max_zoom` at [`Self::ZOOM_LIMIT`] and keeps `min_zoom` at or
    /// below it.
    #[must_use]
    pub fn normalized(self) -> Self {
        let max_zoom = self.max_zoom.min(Self::ZOOM_LIMIT);
        Self {
            min_zoom: self.min_zoom.min(max_zoom),
            max_zoom,
            ..self
        }
    }
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            radius: 120.0,
            extent: 512.0,
            min_zoom: 5,
            max_zoom: 16,
            min_points: 4,
        }
    }
}

/// One visible marker returned by [`ClusterIndex::clusters`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ClusterMarker {
    /// An individual input point; `index` refers to the slice passed to
    /// [`ClusterIndex::new`].
    Point {
        index: usize,
        longitude: f64,
        latitude: f64,
    },
    Cluster {
        id: u64,
        longitude: f64,
        latitude: f64,
        count: usize,
    },
}

impl ClusterMarker {
    /// Number of input points this marker stands for.
    #[must_use]
    pub const fn count(&self) -> usize {
        match self {
            Self::Point { .. } => 1,
            Self::Cluster { count, .. } => *count,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Origin {
    Point { index: usize, longitude: f64, latitude: f64 },
    Cluster { id: u64 },
}

#[derive(Debug, Clone, Copy)]
struct Node {
    x: f64,
    y: f64,
    num_points: usize,
    origin: Origin,
    parent: Option<u64>,
    processed: bool,
}

impl Node {
    const fn carried(&self) -> Self {
        Self {
            parent: None,
            processed: false,
            ..*self
        }
    }

    fn marker(&self) -> ClusterMarker {
        match self.origin {
            Origin::Point {
                index,
                longitude,
                latitude,
            } => ClusterMarker::Point {
                index,
                longitude,
                latitude,
            },
            Origin::Cluster { id } => ClusterMarker::Cluster {
                id,
                longitude: x_to_longitude(self.x),
                latitude: y_to_latitude(self.y),
                count: self.num_points,
            },
        }
    }
}

type Entry = GeomWithData<[f64; 2], usize>;

#[derive(Debug)]
struct Level {
    nodes: Vec<Node>,
    tree: RTree<Entry>,
}

impl Level {
    fn new(nodes: Vec<Node>) -> Self {
        let entries = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| GeomWithData::new([node.x, node.y], i))
            .collect();
        Self {
            nodes,
            tree: RTree::bulk_load(entries),
        }
    }
}

/// A clustering hierarchy over one category's points.
#[derive(Debug)]
pub struct ClusterIndex {
    options: ClusterOptions,
    point_count: usize,
    /// Indexed by `zoom - min_zoom`, up to `max_zoom + 1`.
    levels: Vec<Level>,
}

impl ClusterIndex {
    /// Builds the hierarchy over `(longitude, latitude)` points.
    #[must_use]
    pub fn new(points: &[(f64, f64)], options: ClusterOptions) -> Self {
        let options = options.normalized();
        let nodes = points
            .iter()
            .enumerate()
            .map(|(index, &(longitude, latitude))| Node {
                x: longitude_to_x(longitude),
                y: latitude_to_y(latitude),
                num_points: 1,
                origin: Origin::Point {
                    index,
                    longitude,
                    latitude,
                },
                parent: None,
                processed: false,
            })
            .collect();

        let depth = usize::from(options.max_zoom - options.min_zoom) + 2;
        let mut levels = Vec::with_capacity(depth);
        levels.push(Level::new(nodes));

        for zoom in (options.min_zoom..=options.max_zoom).rev() {
            let Some(previous) = levels.last_mut() else {
                break;
            };
            let next = cluster_level(previous, zoom, &options, points.len());
            levels.push(Level::new(next));
        }
        levels.reverse();

        log::debug!(
            "built cluster index over {} points, {} clusters at zoom {}",
            points.len(),
            levels.first().map_or(0, |level| level.nodes.len()),
            options.min_zoom
        );

        Self {
            options,
            point_count: points.len(),
            levels,
        }
    }

    #[must_use]
    pub const fn options(&self) -> &ClusterOptions {
        &self.options
    }

    fn level(&self, zoom: u8) -> Option<&Level> {
        let zoom = zoom.clamp(self.options.min_zoom, self.options.max_zoom + 1);
        self.levels.get(usize::from(zoom - self.options.min_zoom))
    }

    /// Markers visible inside `bbox` at `zoom`.
    ///
    /// Boxes crossing the antimeridian are split in two.
    #[must_use]
    pub fn clusters(&self, bbox: &BoundingBox, zoom: f64) -> Vec<ClusterMarker> {
        let Some(level) = self.level(zoom_level(zoom)) else {
            return vec![];
        };

        let mut min_lng = ((bbox.west + 180.0) % 360.0 + 360.0) % 360.0 - 180.0;
        let min_lat = bbox.south.clamp(-90.0, 90.0);
        let mut max_lng = if (bbox.east - 180.0).abs() < f64::EPSILON {
            180.0
        } else {
            ((bbox.east + 180.0) % 360.0 + 360.0) % 360.0 - 180.0
        };
        let max_lat = bbox.north.clamp(-90.0, 90.0);

        if bbox.east - bbox.west >= 360.0 {
            min_lng = -180.0;
            max_lng = 180.0;
        } else if min_lng > max_lng {
            let mut eastern = self.clusters(&BoundingBox::new(min_lng, min_lat, 180.0, max_lat), zoom);
            eastern.extend(self.clusters(&BoundingBox::new(-180.0, min_lat, max_lng, max_lat), zoom));
            return eastern;
        }

        let envelope = AABB::from_corners(
            [longitude_to_x(min_lng), latitude_to_y(max_lat)],
            [longitude_to_x(max_lng), latitude_to_y(min_lat)],
        );

        level
            .tree
            .locate_in_envelope(&envelope)
            .map(|entry| level.nodes[entry.data].marker())
            .collect()
    }

    /// Immediate children of a cluster, one zoom level further in.
    #[must_use]
    pub fn children(&self, cluster_id: u64) -> Vec<ClusterMarker> {
        let Some((origin_index, origin_zoom)) = self.decode(cluster_id) else {
            return vec![];
        };
        let Some(level) = self.level(origin_zoom) else {
            return vec![];
        };
        let Some(origin) = level.nodes.get(origin_index) else {
            return vec![];
        };

        let r = self.search_radius(origin_zoom - 1);
        level
            .tree
            .locate_within_distance([origin.x, origin.y], r * r)
            .map(|entry| &level.nodes[entry.data])
            .filter(|node| node.parent == Some(cluster_id))
            .map(Node::marker)
            .collect()
    }

    /// The zoom at which a cluster splits into more than one marker.
    #[must_use]
    pub fn expansion_zoom(&self, cluster_id: u64) -> u8 {
        let Some((_, origin_zoom)) = self.decode(cluster_id) else {
            return self.options.max_zoom + 1;
        };

        let mut id = cluster_id;
        let mut zoom = origin_zoom - 1;
        while zoom <= self.options.max_zoom {
            let children = self.children(id);
            zoom += 1;
            match children.as_slice() {
                [ClusterMarker::Cluster { id: child, .. }] => id = *child,
                _ => break,
            }
        }
        zoom
    }

    fn search_radius(&self, zoom: u8) -> f64 {
        self.options.radius / (self.options.extent * 2f64.powi(i32::from(zoom)))
    }

    /// Splits a cluster id into the index of its seed node and the level
    /// (`zoom + 1`) that node lives on.
    fn decode(&self, cluster_id: u64) -> Option<(usize, u8)> {
        let packed = cluster_id.checked_sub(self.point_count as u64)?;
        let origin_zoom = u8::try_from(packed % 32).ok()?;
        let origin_index = usize::try_from(packed >> 5).ok()?;
        (origin_zoom > self.options.min_zoom && origin_zoom <= self.options.max_zoom + 1)
            .then_some((origin_index, origin_zoom))
    }
}

fn cluster_level(previous: &mut Level, zoom: u8, options: &ClusterOptions, point_count: usize) -> Vec<Node> {
    let r = options.radius / (options.extent * 2f64.powi(i32::from(zoom)));
    let mut next = Vec::new();

    for i in 0..previous.nodes.len() {
        if previous.nodes[i].processed {
            continue;
        }
        previous.nodes[i].processed = true;

        let seed = previous.nodes[i];
        let neighbors: Vec<usize> = previous
            .tree
            .locate_within_distance([seed.x, seed.y], r * r)
            .map(|entry| entry.data)
            .filter(|&j| !previous.nodes[j].processed)
            .collect();

        let num_points = seed.num_points
            + neighbors
                .iter()
                .map(|&j| previous.nodes[j].num_points)
                .sum::<usize>();

        if num_points > seed.num_points && num_points >= options.min_points {
            let id = ((i as u64) << 5) + u64::from(zoom + 1) + point_count as u64;
            #[allow(clippy::cast_precision_loss)]
            let (mut wx, mut wy) = (
                seed.x * seed.num_points as f64,
                seed.y * seed.num_points as f64,
            );
            previous.nodes[i].parent = Some(id);

            for &j in &neighbors {
                let neighbor = &mut previous.nodes[j];
                neighbor.processed = true;
                neighbor.parent = Some(id);
                #[allow(clippy::cast_precision_loss)]
                {
                    wx += neighbor.x * neighbor.num_points as f64;
                    wy += neighbor.y * neighbor.num_points as f64;
                }
            }

            #[allow(clippy::cast_precision_loss)]
            let total = num_points as f64;
            next.push(Node {
                x: wx / total,
                y: wy / total,
                num_points,
                origin: Origin::Cluster { id },
                parent: None,
                processed: false,
            });
        } else {
            next.push(seed.carried());
            if num_points > 1 {
                for &j in &neighbors {
                    previous.nodes[j].processed = true;
                    next.push(previous.nodes[j].carried());
                }
            }
        }
    }

    next
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn zoom_level(zoom: f64) -> u8 {
    zoom.floor().clamp(0.0, f64::from(u8::MAX)) as u8
}

fn longitude_to_x(longitude: f64) -> f64 {
    longitude / 360.0 + 0.5
}

fn latitude_to_y(latitude: f64) -> f64 {
    let sin = latitude.to_radians().sin();
    let y = 0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / PI;
    y.clamp(0.0, 1.0)
}

fn x_to_longitude(x: f64) -> f64 {
    (x - 0.5) * 360.0
}

fn y_to_latitude(y: f64) -> f64 {
    let y2 = (180.0 - y * 360.0) * PI / 180.0;
    360.0 * y2.exp().atan() / PI - 90.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn konya_points() -> Vec<(f64, f64)> {
        vec![
            (32.500, 37.870),
            (32.501, 37.870),
            (32.502, 37.871),
            (32.500, 37.872),
            (32.503, 37.871),
        ]
    }

    fn konya_bbox() -> BoundingBox {
        BoundingBox::new(32.0, 37.5, 33.0, 38.2)
    }

    #[test]
    fn close_points_form_one_cluster_at_low_zoom() {
        let index = ClusterIndex::new(&konya_points(), ClusterOptions::default());
        let markers = index.clusters(&konya_bbox(), 10.0);

        assert_eq!(markers.len(), 1);
        assert!(matches!(markers[0], ClusterMarker::Cluster { count: 5, .. }));
    }

    #[test]
    fn points_are_individual_above_max_zoom() {
        let index = ClusterIndex::new(&konya_points(), ClusterOptions::default());
        let markers = index.clusters(&konya_bbox(), 17.0);

        assert_eq!(markers.len(), 5);
        assert!(markers.iter().all(|m| matches!(m, ClusterMarker::Point { .. })));

        let mut indices: Vec<usize> = markers
            .iter()
            .filter_map(|m| match m {
                ClusterMarker::Point { index, .. } => Some(*index),
                ClusterMarker::Cluster { .. } => None,
            })
            .collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn out_of_range_zooms_are_normalized() {
        let inverted = ClusterOptions {
            min_zoom: 10,
            max_zoom: 5,
            ..ClusterOptions::default()
        };
        let index = ClusterIndex::new(&konya_points(), inverted);
        assert_eq!(index.options().min_zoom, 5);
        assert_eq!(index.options().max_zoom, 5);
        let total: usize = index
            .clusters(&konya_bbox(), 3.0)
            .iter()
            .map(ClusterMarker::count)
            .sum();
        assert_eq!(total, 5);

        let oversized = ClusterOptions {
            max_zoom: u8::MAX,
            ..ClusterOptions::default()
        };
        let index = ClusterIndex::new(&konya_points(), oversized);
        assert_eq!(index.options().max_zoom, ClusterOptions::ZOOM_LIMIT);
        assert_eq!(index.clusters(&konya_bbox(), 40.0).len(), 5);
    }

    #[test]
    fn too_few_points_never_cluster() {
        let points = &konya_points()[..3];
        let index = ClusterIndex::new(points, ClusterOptions::default());
        let markers = index.clusters(&konya_bbox(), 5.0);

        assert_eq!(markers.len(), 3);
        assert!(markers.iter().all(|m| m.count() == 1));
    }

    #[test]
    fn bbox_excludes_points_outside() {
        let index = ClusterIndex::new(&konya_points(), ClusterOptions::default());
        let markers = index.clusters(&BoundingBox::new(30.0, 36.0, 31.0, 37.0), 10.0);
        assert!(markers.is_empty());
    }

    #[test]
    fn cluster_counts_sum_to_input_size() {
        let mut points = konya_points();
        points.extend([(32.60, 37.95), (32.45, 37.75)]);
        let index = ClusterIndex::new(&points, ClusterOptions::default());

        for zoom in [5.0, 8.0, 12.0, 14.5, 16.0, 18.0] {
            let total: usize = index
                .clusters(&konya_bbox(), zoom)
                .iter()
                .map(ClusterMarker::count)
                .sum();
            assert_eq!(total, points.len(), "zoom {zoom}");
        }
    }

    #[test]
    fn expansion_zoom_splits_cluster() {
        let index = ClusterIndex::new(&konya_points(), ClusterOptions::default());
        let markers = index.clusters(&konya_bbox(), 10.0);
        let ClusterMarker::Cluster { id, .. } = markers[0] else {
            panic!("expected a cluster");
        };

        let zoom = index.expansion_zoom(id);
        assert!(zoom > 10);
        assert!(index.clusters(&konya_bbox(), f64::from(zoom)).len() > 1);
    }

    #[test]
    fn forced_clustering_below_threshold() {
        assert!(clustering_active(13.9, false));
        assert!(!clustering_active(14.0, false));
        assert!(clustering_active(15.0, true));
    }

    #[test]
    fn marker_size_bounds() {
        assert!((cluster_marker_size(1, 16.0) - 18.0).abs() < 1e-9);
        assert!((cluster_marker_size(10_000, 8.0) - 70.0).abs() < 1e-9);
        assert!((cluster_marker_size(16, 12.0) - 60.0 * 0.6).abs() < 1e-9);
    }

    #[test]
    fn projection_round_trips() {
        let (lon, lat) = (32.4846, 37.8746);
        assert!((x_to_longitude(longitude_to_x(lon)) - lon).abs() < 1e-9);
        assert!((y_to_latitude(latitude_to_y(lat)) - lat).abs() < 1e-9);
    }
}
