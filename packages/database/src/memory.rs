//! In-memory stand-in store, selected when no database is reachable.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use city_pulse_prediction_models::{PredictionRequest, PredictionResult};
use city_pulse_traffic_models::TrafficReading;
use city_pulse_weather_models::WeatherReading;

use crate::store::HISTORY_ROW_CAP;
use crate::{DataStore, DbError};

/// Oldest rows are evicted beyond this bound so demo-mode memory stays flat.
const RING_CAPACITY: usize = 1000;

struct Ring<T> {
    rows: VecDeque<T>,
}

impl<T> Default for Ring<T> {
    fn default() -> Self {
        Self {
            rows: VecDeque::new(),
        }
    }
}

impl<T: Clone> Ring<T> {
    fn push(&mut self, row: T) {
        if self.rows.len() == RING_CAPACITY {
            self.rows.pop_front();
        }
        self.rows.push_back(row);
    }

    /// Rows within the range, newest first, capped like the durable store.
    fn range<F>(&self, timestamp: F, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<T>
    where
        F: Fn(&T) -> DateTime<Utc>,
    {
        let mut selected: Vec<T> = self
            .rows
            .iter()
            .filter(|row| {
                let ts = timestamp(row);
                ts >= from && ts <= to
            })
            .cloned()
            .collect();

        selected.sort_by_key(|row| std::cmp::Reverse(timestamp(row)));
        selected.truncate(HISTORY_ROW_CAP);
        selected
    }
}

/// Bounded in-memory implementation of [`DataStore`].
///
/// Fulfills the full contract — range filtering, newest-first ordering, and
/// the row cap — so demo mode behaves like the durable store, just without
/// surviving a restart.
#[derive(Default)]
pub struct MemoryStore {
    weather: Mutex<Ring<WeatherReading>>,
    traffic: Mutex<Ring<TrafficReading>>,
    predictions: Mutex<Ring<(PredictionRequest, PredictionResult)>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of prediction log entries recorded so far. A poisoned lock
    /// reads as empty.
    #[must_use]
    pub fn prediction_log_len(&self) -> usize {
        self.predictions
            .lock()
            .map_or(0, |entries| entries.rows.len())
    }
}

fn lock_err() -> DbError {
    DbError::Conversion {
        message: "memory store lock poisoned".to_string(),
    }
}

#[async_trait::async_trait]
impl DataStore for MemoryStore {
    async fn save_weather(&self, reading: &WeatherReading) -> Result<(), DbError> {
        self.weather
            .lock()
            .map_err(|_| lock_err())?
            .push(reading.clone());
        Ok(())
    }

    async fn save_traffic(&self, reading: &TrafficReading) -> Result<(), DbError> {
        self.traffic
            .lock()
            .map_err(|_| lock_err())?
            .push(reading.clone());
        Ok(())
    }

    async fn save_prediction_log(
        &self,
        request: &PredictionRequest,
        result: &PredictionResult,
    ) -> Result<(), DbError> {
        self.predictions
            .lock()
            .map_err(|_| lock_err())?
            .push((request.clone(), result.clone()));
        Ok(())
    }

    async fn weather_history(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<WeatherReading>, DbError> {
        Ok(self
            .weather
            .lock()
            .map_err(|_| lock_err())?
            .range(|r| r.timestamp, from, to))
    }

    async fn traffic_history(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<TrafficReading>, DbError> {
        Ok(self
            .traffic
            .lock()
            .map_err(|_| lock_err())?
            .range(|r| r.timestamp, from, to))
    }

    async fn health(&self) -> Result<(), DbError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn weather_at(timestamp: DateTime<Utc>) -> WeatherReading {
        WeatherReading {
            temperature: 10.0,
            feels_like: 8.0,
            humidity: 60,
            description: "Clear sky".to_string(),
            icon: "01d".to_string(),
            wind_speed: 2.0,
            visibility: 10_000,
            pressure: 940,
            aqi: 60,
            city: "Almaty".to_string(),
            country: "KZ".to_string(),
            timestamp,
            is_mock: true,
        }
    }

    #[tokio::test]
    async fn range_query_filters_sorts_and_caps() {
        let store = MemoryStore::new();
        let now = Utc::now();

        // 30 hourly rows; only the 24 most recent land in the window.
        for hours_ago in 1..=30 {
            store
                .save_weather(&weather_at(now - Duration::hours(hours_ago)))
                .await
                .unwrap();
        }

        let rows = store
            .weather_history(now - Duration::hours(24), now)
            .await
            .unwrap();

        assert_eq!(rows.len(), 24);
        for row in &rows {
            assert!(row.timestamp >= now - Duration::hours(24));
        }
        for pair in rows.windows(2) {
            assert!(pair[0].timestamp >= pair[1].timestamp, "not newest-first");
        }
    }

    #[tokio::test]
    async fn range_query_caps_at_one_hundred_rows() {
        let store = MemoryStore::new();
        let now = Utc::now();

        for minutes_ago in 1..=200 {
            store
                .save_weather(&weather_at(now - Duration::minutes(minutes_ago)))
                .await
                .unwrap();
        }

        let rows = store
            .weather_history(now - Duration::hours(24), now)
            .await
            .unwrap();

        assert_eq!(rows.len(), HISTORY_ROW_CAP);
    }

    #[tokio::test]
    async fn prediction_log_len_tracks_saves() {
        let store = MemoryStore::new();
        assert_eq!(store.prediction_log_len(), 0);

        store
            .save_prediction_log(
                &city_pulse_prediction_models::PredictionRequest::default(),
                &city_pulse_prediction_models::PredictionResult {
                    prediction: "calm".to_string(),
                    confidence_score: 0.8,
                    aqi_prediction: 60,
                    traffic_index: 30.0,
                    reasoning: String::new(),
                    is_mock: true,
                },
            )
            .await
            .unwrap();

        assert_eq!(store.prediction_log_len(), 1);
    }

    #[tokio::test]
    async fn ring_evicts_oldest_beyond_capacity() {
        let mut ring = Ring::default();
        for i in 0..(RING_CAPACITY + 5) {
            ring.push(i);
        }

        assert_eq!(ring.rows.len(), RING_CAPACITY);
        assert_eq!(*ring.rows.front().unwrap(), 5);
    }
}
