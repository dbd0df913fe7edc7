//! Detached best-effort persistence.

use std::sync::Arc;
use std::time::Duration;

use city_pulse_prediction_models::{PredictionRequest, PredictionResult};
use city_pulse_traffic_models::TrafficReading;
use city_pulse_weather_models::WeatherReading;
use tokio_util::task::TaskTracker;

use crate::DataStore;

/// Each detached write gets its own fresh budget, independent of the inbound
/// request that triggered it.
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Spawns persistence writes whose lifetime is decoupled from the inbound
/// request, tracked so shutdown can drain them deterministically.
///
/// Failures are logged, never surfaced: the write is best-effort and the HTTP
/// response has typically already been sent.
#[derive(Clone)]
pub struct DetachedWriter {
    store: Arc<dyn DataStore>,
    tracker: TaskTracker,
}

impl DetachedWriter {
    /// Creates a writer over the selected store.
    #[must_use]
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self {
            store,
            tracker: TaskTracker::new(),
        }
    }

    /// The underlying store, for read paths that share the selection.
    #[must_use]
    pub fn store(&self) -> Arc<dyn DataStore> {
        Arc::clone(&self.store)
    }

    /// Spawns a tracked write of both halves of a dashboard snapshot.
    pub fn spawn_snapshot_save(&self, weather: WeatherReading, traffic: TrafficReading) {
        let store = Arc::clone(&self.store);
        self.tracker.spawn(async move {
            match tokio::time::timeout(WRITE_TIMEOUT, store.save_weather(&weather)).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => log::warn!("failed to save weather reading: {err}"),
                Err(_) => log::warn!("weather save timed out after {WRITE_TIMEOUT:?}"),
            }
            match tokio::time::timeout(WRITE_TIMEOUT, store.save_traffic(&traffic)).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => log::warn!("failed to save traffic reading: {err}"),
                Err(_) => log::warn!("traffic save timed out after {WRITE_TIMEOUT:?}"),
            }
        });
    }

    /// Spawns a tracked write of a prediction request/result pair.
    pub fn spawn_prediction_log(&self, request: PredictionRequest, result: PredictionResult) {
        let store = Arc::clone(&self.store);
        self.tracker.spawn(async move {
            match tokio::time::timeout(
                WRITE_TIMEOUT,
                store.save_prediction_log(&request, &result),
            )
            .await
            {
                Ok(Ok(())) => {}
                Ok(Err(err)) => log::warn!("failed to save prediction log: {err}"),
                Err(_) => log::warn!("prediction log save timed out after {WRITE_TIMEOUT:?}"),
            }
        });
    }

    /// Waits for every spawned write to finish. Call once during graceful
    /// shutdown; writes spawned afterwards are still accepted but shutdown
    /// no longer waits for them.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use city_pulse_traffic_models::CongestionLevel;

    use crate::MemoryStore;

    use super::*;

    fn sample_weather() -> WeatherReading {
        WeatherReading {
            temperature: -2.0,
            feels_like: -6.0,
            humidity: 70,
            description: "Light snow".to_string(),
            icon: "13d".to_string(),
            wind_speed: 3.0,
            visibility: 6000,
            pressure: 941,
            aqi: 150,
            city: "Almaty".to_string(),
            country: "KZ".to_string(),
            timestamp: Utc::now(),
            is_mock: false,
        }
    }

    fn sample_traffic() -> TrafficReading {
        TrafficReading {
            congestion_index: 55.0,
            congestion_level: CongestionLevel::Moderate,
            average_speed_kmh: 27.0,
            free_flow_speed_kmh: 60.0,
            road_segments: Vec::new(),
            incidents: Vec::new(),
            incident_count: 2,
            timestamp: Utc::now(),
            is_mock: false,
        }
    }

    #[tokio::test]
    async fn drain_waits_for_spawned_writes() {
        let store = Arc::new(MemoryStore::new());
        let writer = DetachedWriter::new(Arc::clone(&store) as Arc<dyn DataStore>);

        for _ in 0..5 {
            writer.spawn_snapshot_save(sample_weather(), sample_traffic());
        }
        writer.spawn_prediction_log(
            city_pulse_prediction_models::PredictionRequest::default(),
            city_pulse_prediction_models::PredictionResult {
                prediction: "ok".to_string(),
                confidence_score: 0.5,
                aqi_prediction: 80,
                traffic_index: 40.0,
                reasoning: String::new(),
                is_mock: true,
            },
        );

        writer.drain().await;

        let now = Utc::now();
        let from = now - chrono::Duration::hours(1);
        assert_eq!(store.weather_history(from, now).await.unwrap().len(), 5);
        assert_eq!(store.traffic_history(from, now).await.unwrap().len(), 5);
        assert_eq!(store.prediction_log_len(), 1);
    }
}
