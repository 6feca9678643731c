//! Bus route view: pick a route number, show its stops as a polyline.

use civic_map_server_models::ApiBusStop;
use geo::{Coord, LineString};

use crate::{DashboardError, FeatureSource};

#[derive(Debug, Default)]
pub struct RouteView {
    numbers: Vec<i32>,
    selected: Option<i32>,
    stops: Vec<ApiBusStop>,
}

impl RouteView {
    #[must_use]
    pub fn numbers(&self) -> &[i32] {
        &self.numbers
    }

    #[must_use]
    pub const fn selected(&self) -> Option<i32> {
        self.selected
    }

    /// Stops of the selected route, ordered by `sequence`.
    #[must_use]
    pub fn stops(&self) -> &[ApiBusStop] {
        &self.stops
    }

    /// Loads the route number list for the route picker.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError`] if the request fails; the previous list
    /// is kept.
    pub async fn load_numbers(&mut self, source: &dyn FeatureSource) -> Result<(), DashboardError> {
        self.numbers = source.route_numbers().await?;
        log::debug!("Loaded {} route numbers", self.numbers.len());
        Ok(())
    }

    /// Selects a route and loads its stops. The previous route's stops are
    /// cleared before the request so a failure leaves nothing drawn.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError`] if the stops cannot be loaded, including
    /// a route with no stops (404).
    pub async fn select(
        &mut self,
        source: &dyn FeatureSource,
        route_number: i32,
    ) -> Result<(), DashboardError> {
        self.selected = Some(route_number);
        self.stops.clear();

        let mut stops = source.route_stops(route_number).await.inspect_err(|e| {
            log::warn!("Failed to load stops for route {route_number}: {e}");
        })?;
        stops.sort_by_key(|stop| stop.sequence);
        self.stops = stops;

        Ok(())
    }

    /// The route line through every stop in order, if there are at least
    /// two stops.
    #[must_use]
    pub fn polyline(&self) -> Option<LineString<f64>> {
        if self.stops.len() < 2 {
            return None;
        }
        Some(
            self.stops
                .iter()
                .map(|stop| Coord {
                    x: stop.geometry.coordinates[0],
                    y: stop.geometry.coordinates[1],
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use civic_map_server_models::ApiPointGeometry;

    use super::*;
    use crate::testing::MemorySource;

    fn stop(id: i32, sequence: usize, longitude: f64, latitude: f64) -> ApiBusStop {
        ApiBusStop {
            id,
            route_number: 7,
            sequence,
            geometry: ApiPointGeometry {
                kind: "Point".to_string(),
                coordinates: [longitude, latitude],
            },
        }
    }

    fn source() -> MemorySource {
        let mut source = MemorySource::default();
        source.routes.insert(
            7,
            vec![
                stop(12, 2, 32.49, 37.87),
                stop(10, 1, 32.48, 37.86),
                stop(15, 3, 32.50, 37.88),
            ],
        );
        source.routes.insert(3, vec![stop(20, 1, 32.40, 37.80)]);
        source
    }

    #[tokio::test]
    async fn route_numbers_load() {
        let mut view = RouteView::default();
        view.load_numbers(&source()).await.unwrap();
        assert_eq!(view.numbers(), &[3, 7]);
    }

    #[tokio::test]
    async fn selected_route_draws_ordered_polyline() {
        let mut view = RouteView::default();
        view.select(&source(), 7).await.unwrap();

        let ids: Vec<i32> = view.stops().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![10, 12, 15]);

        let line = view.polyline().unwrap();
        assert_eq!(line.0.len(), 3);
        assert_eq!(line.0[0], Coord { x: 32.48, y: 37.86 });
    }

    #[tokio::test]
    async fn single_stop_has_no_polyline() {
        let mut view = RouteView::default();
        view.select(&source(), 3).await.unwrap();
        assert_eq!(view.stops().len(), 1);
        assert!(view.polyline().is_none());
    }

    #[tokio::test]
    async fn failed_selection_clears_stops() {
        let source = source();
        let mut view = RouteView::default();
        view.select(&source, 7).await.unwrap();

        assert!(view.select(&source, 99).await.is_err());
        assert_eq!(view.selected(), Some(99));
        assert!(view.stops().is_empty());
    }
}
