#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Aggregates the live-data providers into a single dashboard snapshot.
//!
//! The service depends on the [`WeatherSource`] and [`TrafficSource`] traits
//! rather than the concrete clients, so tests can substitute stubs with
//! controlled latency and branch tags. Both providers are queried
//! concurrently and a snapshot is handed to the detached writer before it is
//! returned, so persistence never adds to request latency.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use city_pulse_database::DetachedWriter;
use city_pulse_livedata::Sourced;
use city_pulse_traffic::TrafficClient;
use city_pulse_traffic_models::TrafficReading;
use city_pulse_weather::WeatherClient;
use city_pulse_weather_models::WeatherReading;
use serde::Serialize;

/// Anything that can produce the current weather reading.
#[async_trait::async_trait]
pub trait WeatherSource: Send + Sync {
    /// Returns the current reading, tagged with the branch that produced it.
    /// Must not fail; providers degrade to fallback data instead.
    async fn current_weather(&self) -> Sourced<WeatherReading>;
}

/// Anything that can produce the current traffic reading.
#[async_trait::async_trait]
pub trait TrafficSource: Send + Sync {
    /// Returns the current reading, tagged with the branch that produced it.
    /// Must not fail; providers degrade to fallback data instead.
    async fn current_traffic(&self) -> Sourced<TrafficReading>;
}

#[async_trait::async_trait]
impl WeatherSource for WeatherClient {
    async fn current_weather(&self) -> Sourced<WeatherReading> {
        self.fetch_current().await
    }
}

#[async_trait::async_trait]
impl TrafficSource for TrafficClient {
    async fn current_traffic(&self) -> Sourced<TrafficReading> {
        self.fetch_current().await
    }
}

/// A combined view of the city at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub weather: WeatherReading,
    pub traffic: TrafficReading,
    pub timestamp: DateTime<Utc>,
}

/// Fans a snapshot request out to both providers concurrently.
pub struct DashboardService {
    weather: Arc<dyn WeatherSource>,
    traffic: Arc<dyn TrafficSource>,
    writer: DetachedWriter,
}

impl DashboardService {
    /// Creates a service over the given providers and detached writer.
    pub fn new(
        weather: Arc<dyn WeatherSource>,
        traffic: Arc<dyn TrafficSource>,
        writer: DetachedWriter,
    ) -> Self {
        Self {
            weather,
            traffic,
            writer,
        }
    }

    /// Builds the combined snapshot.
    ///
    /// The two providers are queried concurrently, so the latency is that of
    /// the slower provider, not the sum. The snapshot is handed to the
    /// detached writer and returned without waiting for the write.
    pub async fn snapshot(&self) -> DashboardSnapshot {
        let (weather, traffic) =
            tokio::join!(self.weather.current_weather(), self.traffic.current_traffic());

        if weather.is_fallback() {
            log::info!("dashboard snapshot built with fallback weather");
        }
        if traffic.is_fallback() {
            log::info!("dashboard snapshot built with fallback traffic");
        }

        let snapshot = DashboardSnapshot {
            weather: weather.into_inner(),
            traffic: traffic.into_inner(),
            timestamp: Utc::now(),
        };

        self.writer
            .spawn_snapshot_save(snapshot.weather.clone(), snapshot.traffic.clone());

        snapshot
    }

    /// The current weather reading alone, without persistence.
    pub async fn weather(&self) -> Sourced<WeatherReading> {
        self.weather.current_weather().await
    }

    /// The current traffic reading alone, without persistence.
    pub async fn traffic(&self) -> Sourced<TrafficReading> {
        self.traffic.current_traffic().await
    }

    /// The writer backing this service, shared with the API layer for
    /// prediction logs and shutdown draining.
    #[must_use]
    pub const fn writer(&self) -> &DetachedWriter {
        &self.writer
    }
}
