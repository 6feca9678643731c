#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Client-side spatial logic for the civic map dashboard.
//!
//! - [`catchment`]: builds a circular catchment region from a two-point
//!   drag and counts the loaded features inside it per category.
//! - [`draw`]: the draw-tool state machine that produces catchment
//!   regions from pointer events.
//! - [`filter`]: which categories are currently enabled.
//! - [`cluster`]: per-category hierarchical point clustering over an
//!   R-tree, queried by viewport and zoom.

pub mod catchment;
pub mod cluster;
pub mod draw;
pub mod filter;

use serde::{Deserialize, Serialize};

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Whether a point lies inside the box, edges included.
    #[must_use]
    pub fn contains(&self, longitude: f64, latitude: f64) -> bool {
        longitude >= self.west
            && longitude <= self.east
            && latitude >= self.south
            && latitude <= self.north
    }
}
