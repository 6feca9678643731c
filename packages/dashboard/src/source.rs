//! Where the dashboard gets its data from.

use chrono::NaiveDate;
use civic_map_asset_models::{Category, Station};
use civic_map_server_models::{ApiBusStop, ApiPollutantAverage};
use geojson::FeatureCollection;
use serde::de::DeserializeOwned;

use crate::DashboardError;

/// Read access to the civic map API.
#[async_trait::async_trait]
pub trait FeatureSource: Send + Sync {
    /// Fetches one category layer.
    async fn fetch_category(&self, category: Category)
    -> Result<FeatureCollection, DashboardError>;

    /// Fetches a station's daily averages for `date`.
    async fn air_quality(
        &self,
        station: Station,
        date: NaiveDate,
    ) -> Result<ApiPollutantAverage, DashboardError>;

    /// Lists the bus route numbers.
    async fn route_numbers(&self) -> Result<Vec<i32>, DashboardError>;

    /// Lists a route's stops.
    async fn route_stops(&self, route_number: i32) -> Result<Vec<ApiBusStop>, DashboardError>;
}

/// [`FeatureSource`] over the server's HTTP API.
pub struct HttpFeatureSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFeatureSource {
    /// Creates a source for the API rooted at `base_url`
    /// (e.g. `http://localhost:8080`).
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{path}", self.base_url)
    }

    async fn read_json<T: DeserializeOwned>(
        url: String,
        resp: reqwest::Response,
    ) -> Result<T, DashboardError> {
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(DashboardError::Status {
                status: status.as_u16(),
                url,
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, DashboardError> {
        let url = self.url(path);
        log::debug!("GET {url}");
        let resp = self.client.get(&url).send().await?;
        Self::read_json(url, resp).await
    }
}

#[async_trait::async_trait]
impl FeatureSource for HttpFeatureSource {
    async fn fetch_category(
        &self,
        category: Category,
    ) -> Result<FeatureCollection, DashboardError> {
        self.get(category.as_ref()).await
    }

    async fn air_quality(
        &self,
        station: Station,
        date: NaiveDate,
    ) -> Result<ApiPollutantAverage, DashboardError> {
        let url = self.url(&format!("air-quality/{station}"));
        log::debug!("POST {url}");

        let body = serde_json::json!({ "date": date.format("%Y-%m-%d").to_string() });
        let resp = self.client.post(&url).json(&body).send().await?;
        Self::read_json(url, resp).await
    }

    async fn route_numbers(&self) -> Result<Vec<i32>, DashboardError> {
        self.get("routes/numbers").await
    }

    async fn route_stops(&self, route_number: i32) -> Result<Vec<ApiBusStop>, DashboardError> {
        self.get(&format!("routes/{route_number}/stops")).await
    }
}
