//! The arterial road table for the monitored city.
//!
//! This single table drives both the live path (one flow probe per road) and
//! the synthetic generator (segment geometry), so fallback readings render
//! the same road network as provider-sourced ones.

use city_pulse_traffic_models::GeoPoint;

/// A named arterial road: the point probed against the flow API and the
/// endpoints of the stretch rendered on the map.
pub struct Road {
    /// Road name.
    pub name: &'static str,
    /// Probe point latitude for the flow API.
    pub probe_lat: f64,
    /// Probe point longitude for the flow API.
    pub probe_lon: f64,
    /// Rendered stretch start.
    pub start: GeoPoint,
    /// Rendered stretch end.
    pub end: GeoPoint,
}

const fn road(
    name: &'static str,
    probe_lat: f64,
    probe_lon: f64,
    start_lat: f64,
    start_lon: f64,
    end_lat: f64,
    end_lon: f64,
) -> Road {
    Road {
        name,
        probe_lat,
        probe_lon,
        start: GeoPoint {
            lat: start_lat,
            lon: start_lon,
        },
        end: GeoPoint {
            lat: end_lat,
            lon: end_lon,
        },
    }
}

/// Major Almaty arterials covering the east-west and north-south grid.
pub const ROAD_NETWORK: &[Road] = &[
    road("Al-Farabi", 43.210, 76.900, 43.203, 76.850, 43.218, 76.955),
    road("Abay", 43.240, 76.905, 43.239, 76.850, 43.243, 76.960),
    road("Dostyk", 43.230, 76.957, 43.200, 76.960, 43.260, 76.955),
    road("Seifullin", 43.260, 76.933, 43.220, 76.932, 43.300, 76.935),
    road("Sain", 43.240, 76.852, 43.200, 76.850, 43.280, 76.855),
    road("Raiymbek", 43.273, 76.930, 43.270, 76.850, 43.276, 76.990),
    road("Tole Bi", 43.255, 76.905, 43.254, 76.840, 43.256, 76.970),
    road("Zhandosov", 43.225, 76.880, 43.218, 76.840, 43.232, 76.920),
    road("Rozybakiev", 43.230, 76.890, 43.195, 76.888, 43.265, 76.892),
    road("Baitursynov", 43.245, 76.920, 43.215, 76.918, 43.275, 76.922),
    road("Ryskulov", 43.285, 76.920, 43.283, 76.850, 43.287, 76.990),
    road("Momyshuly", 43.240, 76.820, 43.200, 76.818, 43.280, 76.822),
];

/// Interpolates `steps` points along the road's rendered stretch.
#[must_use]
pub fn interpolate(road: &Road, steps: usize) -> Vec<GeoPoint> {
    (0..steps)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f64 / (steps.saturating_sub(1).max(1)) as f64;
            GeoPoint {
                lat: (road.end.lat - road.start.lat).mul_add(t, road.start.lat),
                lon: (road.end.lon - road.start.lon).mul_add(t, road.start.lon),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::{BBOX_MAX_LAT, BBOX_MAX_LON, BBOX_MIN_LAT, BBOX_MIN_LON};

    use super::*;

    #[test]
    fn every_road_lies_inside_the_incident_bbox() {
        for road in ROAD_NETWORK {
            for point in [road.start, road.end] {
                assert!(
                    (BBOX_MIN_LAT..=BBOX_MAX_LAT).contains(&point.lat),
                    "{} latitude out of bbox",
                    road.name
                );
                assert!(
                    (BBOX_MIN_LON..=BBOX_MAX_LON).contains(&point.lon),
                    "{} longitude out of bbox",
                    road.name
                );
            }
        }
    }

    #[test]
    fn interpolation_spans_the_stretch() {
        let road = &ROAD_NETWORK[0];
        let points = interpolate(road, 10);

        assert_eq!(points.len(), 10);
        assert!((points[0].lat - road.start.lat).abs() < 1e-9);
        assert!((points[9].lat - road.end.lat).abs() < 1e-9);
    }
}
