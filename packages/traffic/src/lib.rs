#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Traffic provider client for the city pulse dashboard.
//!
//! Wraps the TomTom Flow and Incidents APIs behind a short-TTL cache. With no
//! API key configured, or when every flow probe fails, the client synthesizes
//! a plausible reading from time-of-day patterns over the same arterial road
//! table the live path probes — the caller always receives a renderable,
//! non-empty reading and never an error.

mod client;
pub mod roads;
pub mod synthetic;
mod tomtom;

pub use client::TrafficClient;

/// Bounding box used for incident queries, covering the monitored city.
pub const BBOX_MIN_LAT: f64 = 43.15;
/// Northern edge of the incident bounding box.
pub const BBOX_MAX_LAT: f64 = 43.35;
/// Western edge of the incident bounding box.
pub const BBOX_MIN_LON: f64 = 76.80;
/// Eastern edge of the incident bounding box.
pub const BBOX_MAX_LON: f64 = 77.00;

/// Errors internal to the traffic client. These never escape
/// [`TrafficClient::fetch_current`]; they only select the fallback branch.
#[derive(Debug, thiserror::Error)]
pub enum TrafficError {
    /// HTTP request failed, timed out, returned a non-2xx status, or the
    /// response body failed to decode.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Every road probe point failed, so no aggregate index can be computed.
    #[error("all {probes} flow probe queries failed")]
    AllProbesFailed {
        /// Number of probe points attempted.
        probes: usize,
    },
}
