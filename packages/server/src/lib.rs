#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the civic map.
//!
//! Serves civic asset layers as GeoJSON, daily air-quality averages, bus
//! route stops, and an authenticated endpoint for adding tourist sites.
//! Uploaded images and the built `MapLibre` frontend are served as static
//! files.

pub mod auth;
pub mod config;
pub mod error;
mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use civic_map_database::{FeatureStore, PostgisStore, db};

pub use config::ServerConfig;
pub use error::ApiError;

/// Shared application state.
pub struct AppState {
    /// Feature store backing every read and write.
    pub store: Arc<dyn FeatureStore>,
    /// Bearer token accepted for writes.
    pub api_token: Option<String>,
}

/// Registers the `/api` scope.
///
/// Fixed paths are registered before the `/{category}` catch-all so they
/// are not shadowed by it.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        log::debug!("Rejecting request body: {err}");
        ApiError::BadInput("Invalid JSON body".to_string()).into()
    });

    cfg.service(
        web::scope("/api")
            .app_data(json_config)
            .route("/health", web::get().to(handlers::health))
            .route("/categories", web::get().to(handlers::categories))
            .route(
                "/air-quality/{station}",
                web::post().to(handlers::air_quality),
            )
            .route("/routes/numbers", web::get().to(handlers::route_numbers))
            .route(
                "/routes/{routeNumber}/stops",
                web::get().to(handlers::route_stops),
            )
            .service(
                web::resource("/tourist-sites")
                    .route(web::get().to(handlers::tourist_sites))
                    .route(web::post().to(handlers::create_tourist_site)),
            )
            .route("/{category}", web::get().to(handlers::features)),
    );
}

/// Starts the civic map API server.
///
/// Connects to the `PostGIS` store and serves until shutdown. The caller
/// provides the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Error` if the store connection fails or the HTTP
/// server fails to bind.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    log::info!("Connecting to database...");
    let db_conn = db::connect(&config.database_url)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to connect to database: {e}")))?;

    if config.api_token.is_none() {
        log::warn!("API_TOKEN is not set; write endpoints will reject every request");
    }

    let state = web::Data::new(AppState {
        store: Arc::new(PostgisStore::new(Arc::from(db_conn))),
        api_token: config.api_token.clone(),
    });

    let upload_dir = config.upload_dir.clone();
    let static_dir = config.static_dir.clone();

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_api)
            // Uploaded tourist-site images
            .service(Files::new("/uploads", upload_dir.clone()))
            // Serve frontend static files (production)
            .service(Files::new("/", static_dir.clone()).index_file("index.html"))
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}
