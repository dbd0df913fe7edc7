//! TomTom Flow and Incidents API wire types and decoding helpers.

use city_pulse_traffic_models::{GeoPoint, IncidentKind, RoadIncident};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowResponse {
    pub flow_segment_data: FlowSegmentData,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSegmentData {
    pub current_speed: f64,
    pub free_flow_speed: f64,
    #[serde(default)]
    pub coordinates: FlowCoordinates,
}

#[derive(Deserialize, Default)]
pub struct FlowCoordinates {
    #[serde(default)]
    pub coordinate: Vec<FlowCoordinate>,
}

#[derive(Deserialize)]
pub struct FlowCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl FlowCoordinate {
    pub const fn to_point(&self) -> GeoPoint {
        GeoPoint {
            lat: self.latitude,
            lon: self.longitude,
        }
    }
}

#[derive(Deserialize)]
pub struct IncidentsResponse {
    #[serde(default)]
    pub incidents: Vec<Incident>,
}

#[derive(Deserialize)]
pub struct Incident {
    pub geometry: IncidentGeometry,
    pub properties: IncidentProperties,
}

#[derive(Deserialize)]
pub struct IncidentGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentProperties {
    #[serde(default)]
    pub icon_category: i32,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub events: Vec<IncidentEvent>,
}

#[derive(Deserialize)]
pub struct IncidentEvent {
    #[serde(default)]
    pub description: String,
}

/// Maps a TomTom `iconCategory` code onto the dashboard's incident kinds.
pub const fn map_icon_category(category: i32) -> IncidentKind {
    match category {
        // Accident, broken-down vehicle
        1 | 14 => IncidentKind::Accident,
        // Lane closed, road closed, road works
        7 | 8 | 9 => IncidentKind::Roadwork,
        // Jams and remaining hazards
        _ => IncidentKind::Police,
    }
}

impl Incident {
    /// Extracts the incident's representative position. TomTom GeoJSON uses
    /// `[lon, lat]` order; a `LineString` contributes its first vertex.
    pub fn position(&self) -> Option<(f64, f64)> {
        let pair = match self.geometry.kind.as_str() {
            "Point" => self.geometry.coordinates.as_array()?.clone(),
            "LineString" => self
                .geometry
                .coordinates
                .as_array()?
                .first()?
                .as_array()?
                .clone(),
            _ => return None,
        };

        let lon = pair.first()?.as_f64()?;
        let lat = pair.get(1)?.as_f64()?;
        Some((lat, lon))
    }

    /// Builds a human-readable description from the event text and the
    /// from/to road names, falling back to the category name.
    pub fn describe(&self) -> String {
        let mut description = self
            .properties
            .events
            .first()
            .map(|event| event.description.clone())
            .unwrap_or_default();

        if let Some(from) = self.properties.from.as_deref() {
            if !description.is_empty() {
                description.push_str(" - ");
            }
            description.push_str(from);
            if let Some(to) = self.properties.to.as_deref() {
                description.push_str(" -> ");
                description.push_str(to);
            }
        }

        if description.is_empty() {
            description = map_icon_category(self.properties.icon_category)
                .as_ref()
                .to_string();
        }

        description
    }

    /// Converts to the dashboard incident type, when a position exists.
    pub fn to_road_incident(&self) -> Option<RoadIncident> {
        let (lat, lon) = self.position()?;
        Some(RoadIncident {
            lat,
            lon,
            kind: map_icon_category(self.properties.icon_category),
            description: self.describe(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_icon_categories() {
        assert_eq!(map_icon_category(1), IncidentKind::Accident);
        assert_eq!(map_icon_category(14), IncidentKind::Accident);
        assert_eq!(map_icon_category(7), IncidentKind::Roadwork);
        assert_eq!(map_icon_category(8), IncidentKind::Roadwork);
        assert_eq!(map_icon_category(9), IncidentKind::Roadwork);
        assert_eq!(map_icon_category(6), IncidentKind::Police);
        assert_eq!(map_icon_category(0), IncidentKind::Police);
    }

    #[test]
    fn decodes_point_and_linestring_positions() {
        let point: Incident = serde_json::from_value(serde_json::json!({
            "geometry": { "type": "Point", "coordinates": [76.9, 43.2] },
            "properties": { "iconCategory": 1 }
        }))
        .unwrap();
        assert_eq!(point.position(), Some((43.2, 76.9)));

        let line: Incident = serde_json::from_value(serde_json::json!({
            "geometry": { "type": "LineString", "coordinates": [[76.91, 43.21], [76.92, 43.22]] },
            "properties": { "iconCategory": 9 }
        }))
        .unwrap();
        assert_eq!(line.position(), Some((43.21, 76.91)));
    }

    #[test]
    fn describes_with_event_and_route() {
        let incident: Incident = serde_json::from_value(serde_json::json!({
            "geometry": { "type": "Point", "coordinates": [76.9, 43.2] },
            "properties": {
                "iconCategory": 9,
                "from": "Abay",
                "to": "Dostyk",
                "events": [{ "description": "Road works" }]
            }
        }))
        .unwrap();

        assert_eq!(incident.describe(), "Road works - Abay -> Dostyk");
    }

    #[test]
    fn description_falls_back_to_category_name() {
        let incident: Incident = serde_json::from_value(serde_json::json!({
            "geometry": { "type": "Point", "coordinates": [76.9, 43.2] },
            "properties": { "iconCategory": 14 }
        }))
        .unwrap();

        assert_eq!(incident.describe(), "accident");
    }
}
