//! The TomTom backed traffic client.

use std::time::Duration;

use chrono::Utc;
use city_pulse_livedata::{Sourced, TtlCache};
use city_pulse_traffic_models::{RoadIncident, RoadSegment, TrafficReading};

use crate::roads::{self, ROAD_NETWORK, Road};
use crate::tomtom::{FlowResponse, IncidentsResponse};
use crate::{BBOX_MAX_LAT, BBOX_MAX_LON, BBOX_MIN_LAT, BBOX_MIN_LON, TrafficError, synthetic};

const FLOW_URL: &str = "https://api.tomtom.com/traffic/services/4/flowSegmentData/absolute/10/json";
const INCIDENTS_URL: &str = "https://api.tomtom.com/traffic/services/5/incidentDetails";

/// TomTom's free tier allows 2,500 requests/day; with a dozen probes per
/// refresh, a 3 minute TTL keeps the daily budget comfortable.
const CACHE_TTL: Duration = Duration::from_secs(3 * 60);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Some providers under-report free-flow speed; flooring it avoids division
/// blow-ups and nonsense congestion ratios.
const FREE_FLOW_FLOOR_KMH: f64 = 1.0;

/// Exponent of the perceptual congestion curve. Raw speed ratios understate
/// how congested a city feels; `1 - (1-raw)^K` with `K > 1` lifts the
/// midrange toward the human-perceived scale.
const PERCEPTUAL_EXPONENT: f64 = 2.0;

/// Fetches current traffic conditions, degrading to cached or synthesized
/// readings so [`TrafficClient::fetch_current`] never fails.
pub struct TrafficClient {
    api_key: Option<String>,
    http: reqwest::Client,
    cache: TtlCache<TrafficReading>,
    flow_url: String,
    incidents_url: String,
}

impl TrafficClient {
    /// Creates a client. `None` for the API key enables synthetic-only mode;
    /// that is a supported configuration, not an error.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_endpoints(api_key, FLOW_URL.to_string(), INCIDENTS_URL.to_string())
    }

    /// Creates a client against explicit endpoints, e.g. a test stub.
    #[must_use]
    pub fn with_endpoints(api_key: Option<String>, flow_url: String, incidents_url: String) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.is_empty()),
            http: reqwest::Client::new(),
            cache: TtlCache::new(CACHE_TTL),
            flow_url,
            incidents_url,
        }
    }

    /// Returns the current traffic reading.
    ///
    /// Serves from cache while the TTL holds; otherwise probes the provider
    /// and falls back to the time-of-day generator when unconfigured or when
    /// every probe fails. The resulting reading is cached either way.
    pub async fn fetch_current(&self) -> Sourced<TrafficReading> {
        self.cache.get_or_refresh(|| self.refresh()).await
    }

    async fn refresh(&self) -> Sourced<TrafficReading> {
        let Some(api_key) = self.api_key.as_deref() else {
            log::info!("no traffic API key configured, generating synthetic reading");
            return Sourced::Fallback(synthetic::generate(Utc::now()));
        };

        match self.fetch_live(api_key).await {
            Ok(reading) => Sourced::Live(reading),
            Err(err) => {
                log::warn!("TomTom fetch failed, using synthetic fallback: {err}");
                Sourced::Fallback(synthetic::generate(Utc::now()))
            }
        }
    }

    async fn fetch_live(&self, api_key: &str) -> Result<TrafficReading, TrafficError> {
        let mut total_current = 0.0;
        let mut total_free_flow = 0.0;
        let mut answered = 0usize;
        let mut road_segments = Vec::with_capacity(ROAD_NETWORK.len());

        for road in ROAD_NETWORK {
            let flow = match self.query_flow(api_key, road).await {
                Ok(flow) => flow,
                Err(err) => {
                    log::warn!("flow probe failed for {}: {err}", road.name);
                    continue;
                }
            };

            let data = flow.flow_segment_data;
            let free_flow = data.free_flow_speed.max(FREE_FLOW_FLOOR_KMH);
            let congestion = (1.0 - data.current_speed / free_flow).clamp(0.0, 1.0);

            total_current += data.current_speed;
            total_free_flow += free_flow;
            answered += 1;

            let polyline = if data.coordinates.coordinate.is_empty() {
                roads::interpolate(road, 12)
            } else {
                data.coordinates
                    .coordinate
                    .iter()
                    .map(super::tomtom::FlowCoordinate::to_point)
                    .collect()
            };

            road_segments.push(RoadSegment {
                name: road.name.to_string(),
                polyline,
                congestion_index: round_tenth(congestion * 100.0),
                current_speed_kmh: round_tenth(data.current_speed),
            });
        }

        if answered == 0 {
            return Err(TrafficError::AllProbesFailed {
                probes: ROAD_NETWORK.len(),
            });
        }

        #[allow(clippy::cast_precision_loss)]
        let count = answered as f64;
        let avg_current = total_current / count;
        let avg_free_flow = (total_free_flow / count).max(FREE_FLOW_FLOOR_KMH);

        let raw = (1.0 - avg_current / avg_free_flow).clamp(0.0, 1.0);
        let congestion_index = perceptual_index(raw);

        let incidents = self.fetch_incidents(api_key).await;

        log::info!(
            "TomTom traffic: index={congestion_index:.1}, speed={avg_current:.1}/{avg_free_flow:.1} km/h, probes={answered}/{}, incidents={}",
            ROAD_NETWORK.len(),
            incidents.len()
        );

        Ok(TrafficReading {
            congestion_index: round_tenth(congestion_index),
            congestion_level: city_pulse_traffic_models::CongestionLevel::from_index(
                congestion_index,
            ),
            average_speed_kmh: round_tenth(avg_current),
            free_flow_speed_kmh: round_tenth(avg_free_flow),
            incident_count: incidents.len(),
            road_segments,
            incidents,
            timestamp: Utc::now(),
            is_mock: false,
        }
        .with_clamped_index())
    }

    async fn query_flow(&self, api_key: &str, road: &Road) -> Result<FlowResponse, TrafficError> {
        let response = self
            .http
            .get(&self.flow_url)
            .timeout(REQUEST_TIMEOUT)
            .query(&[
                ("point", format!("{},{}", road.probe_lat, road.probe_lon)),
                ("key", api_key.to_string()),
                ("unit", "KMPH".to_string()),
                ("thickness", "1".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response)
    }

    /// Incident fetch is best-effort: a failure degrades to an empty list
    /// rather than failing the whole traffic reading.
    async fn fetch_incidents(&self, api_key: &str) -> Vec<RoadIncident> {
        let bbox = format!("{BBOX_MIN_LON},{BBOX_MIN_LAT},{BBOX_MAX_LON},{BBOX_MAX_LAT}");

        let response: Result<IncidentsResponse, TrafficError> = async {
            Ok(self
                .http
                .get(&self.incidents_url)
                .timeout(REQUEST_TIMEOUT)
                .query(&[
                    ("key", api_key),
                    ("bbox", bbox.as_str()),
                    ("categoryFilter", "1,6,7,8,9,14"),
                    ("timeValidityFilter", "present"),
                ])
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?)
        }
        .await;

        match response {
            Ok(body) => body
                .incidents
                .iter()
                .filter_map(super::tomtom::Incident::to_road_incident)
                .collect(),
            Err(err) => {
                log::warn!("incident fetch failed, continuing without incidents: {err}");
                Vec::new()
            }
        }
    }
}

/// `1 - (1-raw)^K` for raw in [0,1], scaled to the 0-100 index.
fn perceptual_index(raw: f64) -> f64 {
    (1.0 - (1.0 - raw).powf(PERCEPTUAL_EXPONENT)) * 100.0
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keyless_client_falls_back_to_synthetic() {
        let client = TrafficClient::new(None);

        let reading = client.fetch_current().await;
        assert!(reading.is_fallback());

        let reading = reading.into_inner();
        assert!(reading.is_mock);
        assert!((0.0..=100.0).contains(&reading.congestion_index));
        assert!(!reading.road_segments.is_empty());
        assert!(!reading.incidents.is_empty());
    }

    #[tokio::test]
    async fn empty_key_counts_as_unconfigured() {
        let client = TrafficClient::new(Some(String::new()));
        assert!(client.fetch_current().await.is_fallback());
    }

    #[tokio::test]
    async fn second_fetch_within_ttl_is_served_from_cache() {
        let client = TrafficClient::new(None);

        let first = client.fetch_current().await.into_inner();
        let second = client.fetch_current().await.into_inner();

        assert_eq!(first.timestamp, second.timestamp);
        assert!((first.congestion_index - second.congestion_index).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn unreachable_provider_falls_back() {
        let client = TrafficClient::with_endpoints(
            Some("test-key".to_string()),
            "http://127.0.0.1:9/flow".to_string(),
            "http://127.0.0.1:9/incidents".to_string(),
        );

        let reading = client.fetch_current().await;
        assert!(reading.is_fallback());
        assert!(reading.get().is_mock);
    }

    #[test]
    fn perceptual_curve_lifts_the_midrange() {
        assert!(perceptual_index(0.0).abs() < f64::EPSILON);
        assert!((perceptual_index(1.0) - 100.0).abs() < 1e-9);
        // K > 1 means a 30% speed drop reads as more than 30 index points.
        assert!(perceptual_index(0.3) > 30.0);

        let mut last = -1.0;
        for step in 0..=100 {
            let index = perceptual_index(f64::from(step) / 100.0);
            assert!(index >= last);
            last = index;
        }
    }
}
