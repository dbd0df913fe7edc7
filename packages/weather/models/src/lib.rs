#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Weather reading types shared between the provider client, the persistence
//! layer, and the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum air quality index value on the US EPA scale.
pub const AQI_MAX: i32 = 500;

/// An immutable weather snapshot for the monitored city.
///
/// Created once per fetch (or served from cache) and never mutated. The
/// `is_mock` flag distinguishes provider-sourced readings from locally
/// synthesized fallback readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    /// Air temperature in °C.
    pub temperature: f64,
    /// Apparent ("feels like") temperature in °C.
    pub feels_like: f64,
    /// Relative humidity in percent.
    pub humidity: i32,
    /// Human-readable conditions, e.g. "Light snow".
    pub description: String,
    /// Icon code for the frontend, e.g. "13d".
    pub icon: String,
    /// Wind speed in m/s.
    pub wind_speed: f64,
    /// Visibility in meters.
    pub visibility: i32,
    /// Surface pressure in hPa.
    pub pressure: i32,
    /// US EPA air quality index, clamped to [0, 500].
    pub aqi: i32,
    /// City the reading describes.
    pub city: String,
    /// ISO country code.
    pub country: String,
    /// When the reading was taken.
    pub timestamp: DateTime<Utc>,
    /// Whether the reading was synthesized locally.
    pub is_mock: bool,
}

impl WeatherReading {
    /// Clamps the AQI to the documented [0, 500] range.
    #[must_use]
    pub fn with_clamped_aqi(mut self) -> Self {
        self.aqi = self.aqi.clamp(0, AQI_MAX);
        self
    }
}
