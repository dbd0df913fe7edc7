//! Time-of-day synthetic traffic generation.
//!
//! Used when no provider key is configured or every flow probe fails. The
//! congestion index follows fixed rush-hour bands with bounded jitter, and
//! segments/incidents are synthesized from the shared road table so the
//! output renders exactly like a live reading.

use chrono::{DateTime, Datelike, TimeDelta, Timelike, Utc, Weekday};
use city_pulse_traffic_models::{
    CongestionLevel, IncidentKind, RoadIncident, RoadSegment, TrafficReading,
};
use rand::Rng;

use crate::roads::{self, ROAD_NETWORK};

/// The monitored city's UTC offset (Kazakhstan, single zone since 2024).
const UTC_OFFSET_SECS: i64 = 5 * 3600;

/// Free-flow baseline used for synthetic speed math, km/h.
const FREE_FLOW_SPEED: f64 = 60.0;

const ACCIDENT_DESCRIPTIONS: &[&str] = &[
    "Minor collision",
    "Stalled vehicle",
    "Rear-end collision",
    "Multi-car accident",
];
const ROADWORK_DESCRIPTIONS: &[&str] = &["Pothole repair", "Lane closure", "Utility work"];
const POLICE_DESCRIPTIONS: &[&str] = &["Speed trap", "Traffic control", "Checkpoint"];

/// Derives a congestion index from local hour and weekday.
///
/// Weekends sit below weekdays, rush-hour windows score highest, and nights
/// lowest; bounded jitter keeps consecutive fallback readings from looking
/// frozen.
pub fn congestion_index_for<R: Rng>(hour: u32, weekday: Weekday, rng: &mut R) -> f64 {
    let jitter = rng.gen_range(0.0..1.0);

    if matches!(weekday, Weekday::Sat | Weekday::Sun) {
        return 20.0f64.mul_add(jitter, 25.0);
    }

    match hour {
        7..=9 => 30.0f64.mul_add(jitter, 65.0),
        17..=19 => 25.0f64.mul_add(jitter, 70.0),
        12..=14 => 20.0f64.mul_add(jitter, 45.0),
        22.. | 0..=5 => 15.0f64.mul_add(jitter, 5.0),
        _ => 25.0f64.mul_add(jitter, 30.0),
    }
}

/// Builds a full synthetic reading for the given instant using the process
/// RNG.
#[must_use]
pub fn generate(now: DateTime<Utc>) -> TrafficReading {
    generate_with(now, &mut rand::thread_rng())
}

/// Builds a full synthetic reading with an explicit RNG, for deterministic
/// tests.
pub fn generate_with<R: Rng>(now: DateTime<Utc>, rng: &mut R) -> TrafficReading {
    // A fixed shift suffices here: only the local hour and weekday matter.
    let local = now + TimeDelta::seconds(UTC_OFFSET_SECS);

    let congestion_index = congestion_index_for(local.hour(), local.weekday(), rng);
    let road_segments = generate_segments(congestion_index, rng);
    let incidents = generate_incidents(congestion_index, rng);

    let average_speed = FREE_FLOW_SPEED * (1.0 - congestion_index / 100.0);

    TrafficReading {
        congestion_index: round_tenth(congestion_index),
        congestion_level: CongestionLevel::from_index(congestion_index),
        average_speed_kmh: round_tenth(average_speed),
        free_flow_speed_kmh: FREE_FLOW_SPEED,
        incident_count: incidents.len(),
        road_segments,
        incidents,
        timestamp: now,
        is_mock: true,
    }
    .with_clamped_index()
}

/// One segment per road in the shared table, with per-road load variation.
fn generate_segments<R: Rng>(congestion_index: f64, rng: &mut R) -> Vec<RoadSegment> {
    ROAD_NETWORK
        .iter()
        .map(|road| {
            let load = 0.4f64.mul_add(rng.gen_range(0.0..1.0), 0.6);
            let segment_index = (congestion_index * load).clamp(0.0, 100.0);

            let mut polyline = roads::interpolate(road, 12);
            for point in &mut polyline {
                point.lat += rng.gen_range(-0.0015..0.0015);
                point.lon += rng.gen_range(-0.0015..0.0015);
            }

            RoadSegment {
                name: road.name.to_string(),
                polyline,
                congestion_index: round_tenth(segment_index),
                current_speed_kmh: round_tenth(FREE_FLOW_SPEED * (1.0 - segment_index / 100.0)),
            }
        })
        .collect()
}

/// Denser traffic produces more incidents; at least one is always emitted so
/// the map layer has something to render.
fn generate_incidents<R: Rng>(congestion_index: f64, rng: &mut R) -> Vec<RoadIncident> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let base = (congestion_index / 15.0) as usize;
    let count = (base + rng.gen_range(0..3)).max(1);

    (0..count)
        .map(|_| {
            let road = &ROAD_NETWORK[rng.gen_range(0..ROAD_NETWORK.len())];
            let kind = match rng.gen_range(0..3) {
                0 => IncidentKind::Accident,
                1 => IncidentKind::Roadwork,
                _ => IncidentKind::Police,
            };
            let descriptions = match kind {
                IncidentKind::Accident => ACCIDENT_DESCRIPTIONS,
                IncidentKind::Roadwork => ROADWORK_DESCRIPTIONS,
                IncidentKind::Police => POLICE_DESCRIPTIONS,
            };
            let description = descriptions[rng.gen_range(0..descriptions.len())];

            RoadIncident {
                lat: road.start.lat + rng.gen_range(-0.025..0.025),
                lon: road.start.lon + rng.gen_range(-0.025..0.025),
                kind,
                description: format!("{description} on {}", road.name),
            }
        })
        .collect()
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;
    use rand::SeedableRng as _;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn index_bands_respect_time_of_day() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let morning = congestion_index_for(8, Weekday::Tue, &mut rng);
            let night = congestion_index_for(3, Weekday::Tue, &mut rng);
            let weekend = congestion_index_for(8, Weekday::Sat, &mut rng);

            assert!((65.0..=95.0).contains(&morning));
            assert!((5.0..=20.0).contains(&night));
            assert!((25.0..=45.0).contains(&weekend));
            assert!(night < weekend && weekend < morning);
        }
    }

    #[test]
    fn generated_reading_is_renderable_and_in_range() {
        let mut rng = StdRng::seed_from_u64(42);

        for hour in 0..24 {
            let now = Utc.with_ymd_and_hms(2025, 3, 12, hour, 30, 0).unwrap();
            let reading = generate_with(now, &mut rng);

            assert!(reading.is_mock);
            assert!((0.0..=100.0).contains(&reading.congestion_index));
            assert_eq!(reading.road_segments.len(), ROAD_NETWORK.len());
            assert!(!reading.incidents.is_empty());
            assert_eq!(reading.incident_count, reading.incidents.len());
            assert!(reading.average_speed_kmh <= reading.free_flow_speed_kmh);

            for segment in &reading.road_segments {
                assert!((0.0..=100.0).contains(&segment.congestion_index));
                assert!(!segment.polyline.is_empty());
            }
        }
    }

    #[test]
    fn generation_uses_the_local_clock() {
        let mut rng = StdRng::seed_from_u64(11);

        // 03:00 UTC on a Wednesday is 08:00 in the city: morning rush.
        let now = Utc.with_ymd_and_hms(2025, 3, 12, 3, 0, 0).unwrap();
        for _ in 0..50 {
            let reading = generate_with(now, &mut rng);
            assert!(
                reading.congestion_index >= 65.0,
                "expected rush-hour index, got {}",
                reading.congestion_index
            );
        }

        // 22:00 UTC on a Friday is 03:00 Saturday: the weekend band applies.
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 22, 0, 0).unwrap();
        for _ in 0..50 {
            let reading = generate_with(now, &mut rng);
            assert!(
                (25.0..=45.0).contains(&reading.congestion_index),
                "expected weekend index, got {}",
                reading.congestion_index
            );
        }
    }

    #[test]
    fn level_matches_index() {
        let mut rng = StdRng::seed_from_u64(3);
        let now = Utc.with_ymd_and_hms(2025, 3, 12, 8, 0, 0).unwrap();
        let reading = generate_with(now, &mut rng);

        assert_eq!(
            reading.congestion_level,
            CongestionLevel::from_index(reading.congestion_index)
        );
    }
}
