//! HTTP handler functions for the civic map API.

use actix_web::{HttpRequest, HttpResponse, web};
use chrono::NaiveDate;
use civic_map_asset_models::{Category, Station};
use civic_map_projection::to_feature_collection;
use civic_map_server_models::{
    AirQualityRequest, ApiBusStop, ApiCategory, ApiHealth, ApiMessage, ApiPollutantAverage,
    TouristSiteRequest,
};

use crate::{AppState, auth, error::ApiError};

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/categories`
///
/// Returns the category registry: token, label, icon, color, marker size,
/// and whether the category starts enabled.
pub async fn categories() -> HttpResponse {
    let registry: Vec<ApiCategory> = Category::all()
        .iter()
        .copied()
        .map(ApiCategory::from)
        .collect();

    HttpResponse::Ok().json(registry)
}

/// `GET /api/{category}`
///
/// Returns every feature of the category as a GeoJSON `FeatureCollection`.
pub async fn features(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let category = Category::from_token(&path.into_inner())
        .map_err(|e| ApiError::NotFound(e.to_string()))?;

    list_features(&state, category).await
}

/// `GET /api/tourist-sites`
pub async fn tourist_sites(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    list_features(&state, Category::TouristSite).await
}

async fn list_features(state: &AppState, category: Category) -> Result<HttpResponse, ApiError> {
    let rows = state
        .store
        .list_by_category(category)
        .await
        .map_err(|e| ApiError::unexpected(&format!("Failed to list {category}"), e))?;

    log::debug!("Serving {} {category} features", rows.len());

    Ok(HttpResponse::Ok().json(to_feature_collection(&rows)))
}

/// `POST /api/air-quality/{station}`
///
/// Averages the station's readings over the requested calendar date. A
/// date with no readings yields zeros.
pub async fn air_quality(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<AirQualityRequest>,
) -> Result<HttpResponse, ApiError> {
    let station =
        Station::from_key(&path.into_inner()).map_err(|e| ApiError::NotFound(e.to_string()))?;

    let date = body
        .date
        .as_deref()
        .filter(|date| !date.is_empty())
        .ok_or_else(|| ApiError::BadInput("date is required".to_string()))?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| ApiError::BadInput(format!("Invalid date {date:?}, expected YYYY-MM-DD")))?;

    let average = state
        .store
        .daily_pollutant_average(station, date)
        .await
        .map_err(|e| {
            ApiError::unexpected(&format!("Failed to read air quality for {station}"), e)
        })?;

    Ok(HttpResponse::Ok().json(ApiPollutantAverage::from(average)))
}

/// `GET /api/routes/numbers`
pub async fn route_numbers(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let numbers = state
        .store
        .list_route_numbers()
        .await
        .map_err(|e| ApiError::unexpected("Failed to list route numbers", e))?;

    Ok(HttpResponse::Ok().json(numbers))
}

/// `GET /api/routes/{routeNumber}/stops`
///
/// Stops come back in store order with a 1-based `sequence`.
pub async fn route_stops(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let raw = path.into_inner();
    let route_number: i32 = raw
        .parse()
        .map_err(|_| ApiError::BadInput(format!("Invalid route number {raw:?}")))?;

    let rows = state
        .store
        .list_bus_stops_by_route(route_number)
        .await
        .map_err(|e| ApiError::unexpected("Failed to list bus stops", e))?;

    if rows.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No stops found for route {route_number}"
        )));
    }

    let stops: Vec<ApiBusStop> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| ApiBusStop::from_row(row, i + 1))
        .collect();

    Ok(HttpResponse::Ok().json(stops))
}

/// `POST /api/tourist-sites`
///
/// Requires `Authorization: Bearer <API_TOKEN>`.
pub async fn create_tourist_site(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<TouristSiteRequest>,
) -> Result<HttpResponse, ApiError> {
    auth::require_bearer(&req, state.api_token.as_deref())?;

    let site = body
        .into_inner()
        .validate()
        .map_err(|field| ApiError::BadInput(format!("{field} is required")))?;

    state
        .store
        .insert_tourist_site(&site)
        .await
        .map_err(|e| ApiError::unexpected("Failed to add tourist site", e))?;

    log::info!("Added tourist site {:?} ({})", site.name, site.subtype);

    Ok(HttpResponse::Ok().json(ApiMessage {
        message: "Tourist site added".to_string(),
    }))
}
