//! Durable store backed by `PostgreSQL` via `switchy_database`.

use chrono::{DateTime, NaiveDateTime, Utc};
use city_pulse_prediction_models::{PredictionRequest, PredictionResult};
use city_pulse_traffic_models::{CongestionLevel, TrafficReading};
use city_pulse_weather_models::WeatherReading;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::store::HISTORY_ROW_CAP;
use crate::{DataStore, DbError};

/// Appends snapshots and prediction logs to the relational store.
pub struct PostgresStore {
    db: Box<dyn Database>,
}

impl PostgresStore {
    /// Wraps an established database connection.
    #[must_use]
    pub fn new(db: Box<dyn Database>) -> Self {
        Self { db }
    }
}

fn conversion<E: std::fmt::Display>(err: E) -> DbError {
    DbError::Conversion {
        message: err.to_string(),
    }
}

fn to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(naive, Utc)
}

#[async_trait::async_trait]
impl DataStore for PostgresStore {
    async fn save_weather(&self, reading: &WeatherReading) -> Result<(), DbError> {
        self.db
            .exec_raw_params(
                "INSERT INTO weather_data (
                    temperature, feels_like, humidity, description, icon,
                    wind_speed, visibility, pressure, aqi, city, country,
                    is_mock, timestamp
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
                &[
                    DatabaseValue::Real64(reading.temperature),
                    DatabaseValue::Real64(reading.feels_like),
                    DatabaseValue::Int32(reading.humidity),
                    DatabaseValue::String(reading.description.clone()),
                    DatabaseValue::String(reading.icon.clone()),
                    DatabaseValue::Real64(reading.wind_speed),
                    DatabaseValue::Int32(reading.visibility),
                    DatabaseValue::Int32(reading.pressure),
                    DatabaseValue::Int32(reading.aqi),
                    DatabaseValue::String(reading.city.clone()),
                    DatabaseValue::String(reading.country.clone()),
                    DatabaseValue::Bool(reading.is_mock),
                    DatabaseValue::DateTime(reading.timestamp.naive_utc()),
                ],
            )
            .await?;

        Ok(())
    }

    async fn save_traffic(&self, reading: &TrafficReading) -> Result<(), DbError> {
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let incident_count = reading.incident_count as i32;

        self.db
            .exec_raw_params(
                "INSERT INTO traffic_data (
                    congestion_index, congestion_level, average_speed,
                    free_flow_speed, incident_count, is_mock, timestamp
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)",
                &[
                    DatabaseValue::Real64(reading.congestion_index),
                    DatabaseValue::String(reading.congestion_level.to_string()),
                    DatabaseValue::Real64(reading.average_speed_kmh),
                    DatabaseValue::Real64(reading.free_flow_speed_kmh),
                    DatabaseValue::Int32(incident_count),
                    DatabaseValue::Bool(reading.is_mock),
                    DatabaseValue::DateTime(reading.timestamp.naive_utc()),
                ],
            )
            .await?;

        Ok(())
    }

    async fn save_prediction_log(
        &self,
        request: &PredictionRequest,
        result: &PredictionResult,
    ) -> Result<(), DbError> {
        self.db
            .exec_raw_params(
                "INSERT INTO prediction_logs (
                    query, target_date, language, live_aqi, live_traffic,
                    live_temp, prediction, confidence_score, aqi_prediction,
                    traffic_index, reasoning, is_mock, created_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
                &[
                    DatabaseValue::String(request.query.clone()),
                    request
                        .date
                        .as_ref()
                        .map_or(DatabaseValue::Null, |d| DatabaseValue::String(d.clone())),
                    request
                        .language
                        .as_ref()
                        .map_or(DatabaseValue::Null, |l| DatabaseValue::String(l.clone())),
                    request
                        .live_aqi
                        .map_or(DatabaseValue::Null, DatabaseValue::Int32),
                    request
                        .live_traffic
                        .map_or(DatabaseValue::Null, DatabaseValue::Real64),
                    request
                        .live_temp
                        .map_or(DatabaseValue::Null, DatabaseValue::Real64),
                    DatabaseValue::String(result.prediction.clone()),
                    DatabaseValue::Real64(result.confidence_score),
                    DatabaseValue::Int32(result.aqi_prediction),
                    DatabaseValue::Real64(result.traffic_index),
                    DatabaseValue::String(result.reasoning.clone()),
                    DatabaseValue::Bool(result.is_mock),
                    DatabaseValue::DateTime(Utc::now().naive_utc()),
                ],
            )
            .await?;

        Ok(())
    }

    async fn weather_history(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<WeatherReading>, DbError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT temperature, feels_like, humidity, description, icon,
                        wind_speed, visibility, pressure, aqi, city, country,
                        is_mock, timestamp
                 FROM weather_data
                 WHERE timestamp BETWEEN $1 AND $2
                 ORDER BY timestamp DESC
                 LIMIT 100",
                &[
                    DatabaseValue::DateTime(from.naive_utc()),
                    DatabaseValue::DateTime(to.naive_utc()),
                ],
            )
            .await?;

        let mut readings = Vec::with_capacity(rows.len().min(HISTORY_ROW_CAP));
        for row in &rows {
            let naive: NaiveDateTime = row.to_value("timestamp").map_err(conversion)?;

            readings.push(WeatherReading {
                temperature: row.to_value("temperature").map_err(conversion)?,
                feels_like: row.to_value("feels_like").map_err(conversion)?,
                humidity: row.to_value("humidity").map_err(conversion)?,
                description: row.to_value("description").map_err(conversion)?,
                icon: row.to_value("icon").map_err(conversion)?,
                wind_speed: row.to_value("wind_speed").map_err(conversion)?,
                visibility: row.to_value("visibility").map_err(conversion)?,
                pressure: row.to_value("pressure").map_err(conversion)?,
                aqi: row.to_value("aqi").map_err(conversion)?,
                city: row.to_value("city").map_err(conversion)?,
                country: row.to_value("country").map_err(conversion)?,
                is_mock: row.to_value("is_mock").unwrap_or(false),
                timestamp: to_utc(naive),
            });
        }

        Ok(readings)
    }

    async fn traffic_history(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<TrafficReading>, DbError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT congestion_index, congestion_level, average_speed,
                        free_flow_speed, incident_count, is_mock, timestamp
                 FROM traffic_data
                 WHERE timestamp BETWEEN $1 AND $2
                 ORDER BY timestamp DESC
                 LIMIT 100",
                &[
                    DatabaseValue::DateTime(from.naive_utc()),
                    DatabaseValue::DateTime(to.naive_utc()),
                ],
            )
            .await?;

        let mut readings = Vec::with_capacity(rows.len().min(HISTORY_ROW_CAP));
        for row in &rows {
            let naive: NaiveDateTime = row.to_value("timestamp").map_err(conversion)?;
            let congestion_index: f64 = row.to_value("congestion_index").map_err(conversion)?;
            let level_name: String = row.to_value("congestion_level").map_err(conversion)?;
            let incident_count: i32 = row.to_value("incident_count").unwrap_or(0);

            #[allow(clippy::cast_sign_loss)]
            readings.push(TrafficReading {
                congestion_index,
                congestion_level: level_name
                    .parse()
                    .unwrap_or_else(|_| CongestionLevel::from_index(congestion_index)),
                average_speed_kmh: row.to_value("average_speed").map_err(conversion)?,
                free_flow_speed_kmh: row.to_value("free_flow_speed").map_err(conversion)?,
                // Segment and incident geometry is not persisted.
                road_segments: Vec::new(),
                incidents: Vec::new(),
                incident_count: incident_count.max(0) as usize,
                is_mock: row.to_value("is_mock").unwrap_or(false),
                timestamp: to_utc(naive),
            });
        }

        Ok(readings)
    }

    async fn health(&self) -> Result<(), DbError> {
        self.db.query_raw_params("SELECT 1", &[]).await?;
        Ok(())
    }
}
