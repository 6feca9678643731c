#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Feature store access for the civic map.
//!
//! Uses `switchy_database` against a `PostGIS` database. Every query is
//! raw SQL via `query_raw_params()`; geometries are read back through
//! `ST_AsGeoJSON` and converted to `geo` types. Schema and migrations
//! are owned by the persistence layer and are not managed here.

pub mod db;
pub mod queries;
pub mod store;

pub use store::{FeatureStore, PostgisStore};

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// Could not open a connection to the store.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of what went wrong.
        message: String,
    },

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}
