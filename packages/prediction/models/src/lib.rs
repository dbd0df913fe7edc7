#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Prediction request and result types exchanged with the external
//! LLM-backed prediction service.

use serde::{Deserialize, Serialize};

/// A structured question for the prediction service.
///
/// The `live_*` fields are a deliberate denormalization: the API layer
/// injects the latest readings from the aggregation service so the external
/// predictor can ground its answer in current conditions without depending on
/// the provider clients itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// Free-text question.
    #[serde(default)]
    pub query: String,
    /// Target date as `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Expected temperature in °C.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Answer language tag, e.g. "en", "ru", "kk".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Current AQI at the time the question was asked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_aqi: Option<i32>,
    /// Current congestion index at the time the question was asked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_traffic: Option<f64>,
    /// Current temperature at the time the question was asked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_temp: Option<f64>,
}

/// The prediction service's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Free-text answer.
    pub prediction: String,
    /// Model confidence in [0, 1].
    pub confidence_score: f64,
    /// Predicted AQI, [0, 500].
    pub aqi_prediction: i32,
    /// Predicted congestion index, [0, 100].
    #[serde(rename = "traffic_index_prediction")]
    pub traffic_index: f64,
    /// Free-text reasoning behind the answer.
    pub reasoning: String,
    /// Whether this is a canned fallback rather than a live model answer.
    pub is_mock: bool,
}

impl PredictionResult {
    /// Clamps all numeric fields to their documented ranges.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.confidence_score = self.confidence_score.clamp(0.0, 1.0);
        self.aqi_prediction = self.aqi_prediction.clamp(0, 500);
        self.traffic_index = self.traffic_index.clamp(0.0, 100.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_uses_the_wire_field_names() {
        let result = PredictionResult {
            prediction: "calm".to_string(),
            confidence_score: 0.9,
            aqi_prediction: 40,
            traffic_index: 55.0,
            reasoning: "seasonal".to_string(),
            is_mock: false,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("traffic_index_prediction").is_some());
        assert!(json.get("confidence_score").is_some());
        assert!(json.get("aqi_prediction").is_some());
    }

    #[test]
    fn clamping_bounds_all_numeric_fields() {
        let result = PredictionResult {
            prediction: String::new(),
            confidence_score: 1.7,
            aqi_prediction: 900,
            traffic_index: -5.0,
            reasoning: String::new(),
            is_mock: true,
        }
        .clamped();

        assert!((result.confidence_score - 1.0).abs() < f64::EPSILON);
        assert_eq!(result.aqi_prediction, 500);
        assert!(result.traffic_index.abs() < f64::EPSILON);
    }

    #[test]
    fn request_round_trips_optional_fields() {
        let request: PredictionRequest =
            serde_json::from_str(r#"{"query":"air tomorrow?"}"#).unwrap();
        assert_eq!(request.query, "air tomorrow?");
        assert!(request.date.is_none());
        assert!(request.live_aqi.is_none());
    }
}
