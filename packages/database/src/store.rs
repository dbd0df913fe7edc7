//! The persistence port trait.

use chrono::{DateTime, Utc};
use city_pulse_prediction_models::{PredictionRequest, PredictionResult};
use city_pulse_traffic_models::TrafficReading;
use city_pulse_weather_models::WeatherReading;

use crate::DbError;

/// Maximum rows a historical range query may return.
pub const HISTORY_ROW_CAP: usize = 100;

/// Write/read interface for snapshot and prediction-log persistence.
///
/// Implementations are interchangeable and selected once at process startup;
/// call sites never branch on the concrete store.
#[async_trait::async_trait]
pub trait DataStore: Send + Sync {
    /// Appends a weather reading.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the write fails.
    async fn save_weather(&self, reading: &WeatherReading) -> Result<(), DbError>;

    /// Appends a traffic reading. Road segments and incident details are not
    /// persisted; only the aggregate metrics and the incident count.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the write fails.
    async fn save_traffic(&self, reading: &TrafficReading) -> Result<(), DbError>;

    /// Appends a prediction request/result pair.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the write fails.
    async fn save_prediction_log(
        &self,
        request: &PredictionRequest,
        result: &PredictionResult,
    ) -> Result<(), DbError>;

    /// Weather readings with `from <= timestamp <= to`, newest first, capped
    /// at [`HISTORY_ROW_CAP`] rows.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    async fn weather_history(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<WeatherReading>, DbError>;

    /// Traffic readings with `from <= timestamp <= to`, newest first, capped
    /// at [`HISTORY_ROW_CAP`] rows.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    async fn traffic_history(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<TrafficReading>, DbError>;

    /// Checks store connectivity.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store is unreachable.
    async fn health(&self) -> Result<(), DbError>;
}
