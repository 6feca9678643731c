//! Air-quality reading of the selected station.

use std::{
    future::Future,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use chrono::NaiveDate;
use civic_map_asset_models::Station;
use civic_map_server_models::ApiPollutantAverage;

use crate::{DashboardError, FeatureSource};

/// What happened to a lookup once its response arrived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LookupOutcome {
    /// The reading was stored and is now shown.
    Shown(ApiPollutantAverage),
    /// The view was dropped while the request was in flight; nothing was
    /// stored.
    Discarded,
}

/// The air-quality panel of a station popup.
///
/// Lookups run detached from the view. Dropping the view flips a shared
/// liveness flag so late responses are ignored instead of written into a
/// panel nobody is looking at.
#[derive(Debug)]
pub struct AirQualityView {
    alive: Arc<AtomicBool>,
    reading: Arc<Mutex<Option<ApiPollutantAverage>>>,
}

impl Default for AirQualityView {
    fn default() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
            reading: Arc::new(Mutex::new(None)),
        }
    }
}

impl Drop for AirQualityView {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Release);
    }
}

fn store(slot: &Mutex<Option<ApiPollutantAverage>>, value: Option<ApiPollutantAverage>) {
    match slot.lock() {
        Ok(mut reading) => *reading = value,
        Err(e) => log::error!("Air-quality reading lock poisoned: {e}"),
    }
}

impl AirQualityView {
    /// The currently shown reading.
    #[must_use]
    pub fn reading(&self) -> Option<ApiPollutantAverage> {
        self.reading.lock().ok().and_then(|reading| *reading)
    }

    /// Starts a lookup for the station whose display name is
    /// `station_name` (the feature name of an air-quality station).
    ///
    /// The returned future owns everything it needs and can be spawned.
    /// Any failure clears the shown reading.
    pub fn lookup(
        &self,
        source: Arc<dyn FeatureSource>,
        station_name: &str,
        date: NaiveDate,
    ) -> impl Future<Output = Result<LookupOutcome, DashboardError>> + Send + 'static {
        let alive = Arc::clone(&self.alive);
        let reading = Arc::clone(&self.reading);
        let station = Station::from_display_name(station_name);

        async move {
            let station = match station {
                Ok(station) => station,
                Err(e) => {
                    store(&reading, None);
                    return Err(e.into());
                }
            };

            let result = source.air_quality(station, date).await;

            if !alive.load(Ordering::Acquire) {
                log::debug!("Dropping air-quality response for {station}; view discarded");
                return Ok(LookupOutcome::Discarded);
            }

            match result {
                Ok(average) => {
                    store(&reading, Some(average));
                    Ok(LookupOutcome::Shown(average))
                }
                Err(e) => {
                    log::warn!("Air-quality lookup for {station} on {date} failed: {e}");
                    store(&reading, None);
                    Err(e)
                }
            }
        }
    }
}
