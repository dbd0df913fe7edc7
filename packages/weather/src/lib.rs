#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Weather provider client for the city pulse dashboard.
//!
//! Wraps the Open-Meteo forecast and air-quality APIs (free, no API key)
//! behind a short-TTL cache. Every failure path resolves to a cached reading,
//! a provider-sourced reading, or a synthesized seasonal-average reading —
//! the client never surfaces an error to its caller.

pub mod aqi;
mod client;
pub mod synthetic;

pub use client::WeatherClient;

/// Latitude of the monitored city center (Almaty).
pub const CITY_LAT: f64 = 43.2389;
/// Longitude of the monitored city center (Almaty).
pub const CITY_LON: f64 = 76.8897;
/// City label carried on every reading.
pub const CITY_NAME: &str = "Almaty";
/// Country code carried on every reading.
pub const COUNTRY_CODE: &str = "KZ";

/// Errors internal to the weather client. These never escape
/// [`WeatherClient::fetch_current`]; they only select the fallback branch.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// HTTP request failed, timed out, returned a non-2xx status, or the
    /// response body failed to decode.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The air-quality response carried no PM2.5 concentration.
    #[error("air quality response missing PM2.5 concentration")]
    MissingPm25,
}
