#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Bridge to the external LLM-backed prediction service.
//!
//! [`PredictionBridge::predict`] never fails: any transport error, non-2xx
//! status, or decode failure yields a canned seasonal answer tagged as a
//! fallback, so the caller's UI never needs to special-case bridge outages
//! beyond checking the `is_mock` flag.

use std::time::Duration;

use chrono::{DateTime, Datelike, Utc};
use city_pulse_livedata::Sourced;
use city_pulse_prediction_models::{PredictionRequest, PredictionResult};

const PREDICT_TIMEOUT: Duration = Duration::from_secs(30);
const STATS_TIMEOUT: Duration = Duration::from_secs(10);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from the prediction service. Only [`PredictionBridge::stats`] and
/// [`PredictionBridge::health`] surface these; `predict` folds them into the
/// fallback branch.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    /// HTTP request failed, timed out, returned a non-2xx status, or the
    /// response body failed to decode.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// HTTP client for the external prediction service.
pub struct PredictionBridge {
    base_url: String,
    http: reqwest::Client,
}

impl PredictionBridge {
    /// Creates a bridge against the service's base URL, e.g.
    /// `http://localhost:8000`.
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Base URL of the external service.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Forwards the request to the prediction service.
    ///
    /// Numeric fields of a live answer are clamped to their documented
    /// ranges; any failure produces the canned seasonal fallback instead.
    pub async fn predict(&self, request: &PredictionRequest) -> Sourced<PredictionResult> {
        match self.predict_live(request).await {
            Ok(result) => Sourced::Live(result.clamped()),
            Err(err) => {
                log::warn!("prediction service unavailable, using seasonal fallback: {err}");
                Sourced::Fallback(seasonal_fallback(Utc::now()))
            }
        }
    }

    async fn predict_live(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, PredictionError> {
        let result = self
            .http
            .post(format!("{}/predict", self.base_url))
            .timeout(PREDICT_TIMEOUT)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(result)
    }

    /// Proxies the service's aggregate-statistics endpoint verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError`] if the service is unreachable or returns
    /// an invalid body; the API layer maps this to 503.
    pub async fn stats(&self) -> Result<serde_json::Value, PredictionError> {
        let stats = self
            .http
            .get(format!("{}/stats", self.base_url))
            .timeout(STATS_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(stats)
    }

    /// Pings the service's health endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError`] if the service is unreachable or unhealthy.
    pub async fn health(&self) -> Result<(), PredictionError> {
        self.http
            .get(format!("{}/health", self.base_url))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

/// Canned historical-pattern answer used when the service is unreachable.
fn seasonal_fallback(now: DateTime<Utc>) -> PredictionResult {
    let month = now.month();

    let (aqi, traffic, prediction) = if month == 12 || month <= 2 {
        (
            160,
            70.0,
            "Winter conditions expected. High smog levels due to coal heating. \
             Recommend indoor activities and public transport.",
        )
    } else if (6..=8).contains(&month) {
        (
            45,
            50.0,
            "Summer conditions expected. Good air quality. Traffic normal with \
             vacation season reduction.",
        )
    } else {
        (
            80,
            60.0,
            "Moderate conditions expected. Normal traffic patterns and \
             acceptable air quality.",
        )
    };

    PredictionResult {
        prediction: prediction.to_string(),
        confidence_score: 0.75,
        aqi_prediction: aqi,
        traffic_index: traffic,
        reasoning: "Based on historical seasonal patterns".to_string(),
        is_mock: true,
    }
    .clamped()
}
