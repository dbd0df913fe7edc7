#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Traffic reading types shared between the provider client, the persistence
//! layer, and the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Maximum congestion index value.
pub const CONGESTION_MAX: f64 = 100.0;

/// Qualitative congestion level derived from the 0-100 congestion index.
///
/// Variants are ordered by severity so callers can compare levels directly.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum CongestionLevel {
    /// Traffic moves at free-flow speed.
    #[serde(rename = "Free Flow")]
    #[strum(serialize = "Free Flow")]
    FreeFlow,
    /// Noticeable but minor slowdown.
    Light,
    /// Meaningful delays on arterials.
    Moderate,
    /// Significant delays across the grid.
    Heavy,
    /// Near-gridlock conditions.
    Severe,
}

impl CongestionLevel {
    /// Maps a congestion index to its qualitative level.
    ///
    /// Exact cutpoints are a presentation choice; the mapping is guaranteed
    /// monotonic in the index.
    #[must_use]
    pub fn from_index(index: f64) -> Self {
        if index >= 80.0 {
            Self::Severe
        } else if index >= 60.0 {
            Self::Heavy
        } else if index >= 40.0 {
            Self::Moderate
        } else if index >= 15.0 {
            Self::Light
        } else {
            Self::FreeFlow
        }
    }
}

/// A geographic coordinate on a road polyline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

/// Per-road congestion for map rendering: a named polyline with its own
/// congestion index and current speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadSegment {
    /// Road name, e.g. "Al-Farabi".
    pub name: String,
    /// Polyline of the segment.
    pub polyline: Vec<GeoPoint>,
    /// Congestion index for this segment, 0-100.
    pub congestion_index: f64,
    /// Current average speed on the segment in km/h.
    pub current_speed_kmh: f64,
}

/// Category of a point incident on the road network.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IncidentKind {
    /// Collision or broken-down vehicle.
    Accident,
    /// Road works, lane or road closure.
    Roadwork,
    /// Traffic control, checkpoint, or other hazard.
    Police,
}

/// A point incident: accident, roadwork, or police activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadIncident {
    /// Latitude of the incident.
    pub lat: f64,
    /// Longitude of the incident.
    pub lon: f64,
    /// Incident category.
    #[serde(rename = "type")]
    pub kind: IncidentKind,
    /// Human-readable description.
    pub description: String,
}

/// An immutable traffic snapshot for the monitored city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficReading {
    /// City-wide congestion index, clamped to [0, 100].
    pub congestion_index: f64,
    /// Qualitative level derived from the index.
    pub congestion_level: CongestionLevel,
    /// Average current speed across probed roads in km/h.
    pub average_speed_kmh: f64,
    /// Average free-flow baseline speed in km/h.
    pub free_flow_speed_kmh: f64,
    /// Per-road congestion polylines; never empty.
    pub road_segments: Vec<RoadSegment>,
    /// Point incidents on the road network.
    pub incidents: Vec<RoadIncident>,
    /// Number of incidents, denormalized for the frontend.
    pub incident_count: usize,
    /// When the reading was taken.
    pub timestamp: DateTime<Utc>,
    /// Whether the reading was synthesized locally.
    pub is_mock: bool,
}

impl TrafficReading {
    /// Clamps the congestion index to [0, 100] and rederives the level.
    #[must_use]
    pub fn with_clamped_index(mut self) -> Self {
        self.congestion_index = self.congestion_index.clamp(0.0, CONGESTION_MAX);
        self.congestion_level = CongestionLevel::from_index(self.congestion_index);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_mapping_is_monotonic() {
        let mut last = CongestionLevel::FreeFlow;
        for index in 0..=100 {
            let level = CongestionLevel::from_index(f64::from(index));
            assert!(level >= last, "severity regressed at index {index}");
            last = level;
        }
    }

    #[test]
    fn level_cutpoints() {
        assert_eq!(CongestionLevel::from_index(0.0), CongestionLevel::FreeFlow);
        assert_eq!(CongestionLevel::from_index(14.9), CongestionLevel::FreeFlow);
        assert_eq!(CongestionLevel::from_index(15.0), CongestionLevel::Light);
        assert_eq!(CongestionLevel::from_index(40.0), CongestionLevel::Moderate);
        assert_eq!(CongestionLevel::from_index(60.0), CongestionLevel::Heavy);
        assert_eq!(CongestionLevel::from_index(80.0), CongestionLevel::Severe);
        assert_eq!(CongestionLevel::from_index(100.0), CongestionLevel::Severe);
    }

    #[test]
    fn clamping_rederives_the_level() {
        let reading = TrafficReading {
            congestion_index: 250.0,
            congestion_level: CongestionLevel::FreeFlow,
            average_speed_kmh: 10.0,
            free_flow_speed_kmh: 60.0,
            road_segments: Vec::new(),
            incidents: Vec::new(),
            incident_count: 0,
            timestamp: chrono::Utc::now(),
            is_mock: true,
        }
        .with_clamped_index();

        assert!((reading.congestion_index - 100.0).abs() < f64::EPSILON);
        assert_eq!(reading.congestion_level, CongestionLevel::Severe);
    }

    #[test]
    fn incident_kind_serializes_lowercase() {
        let json = serde_json::to_string(&IncidentKind::Roadwork).unwrap();
        assert_eq!(json, "\"roadwork\"");
    }
}
