#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Response envelopes and request validation for the HTTP API.

use std::sync::LazyLock;

use chrono::NaiveDate;
use city_pulse_prediction_models::PredictionRequest;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Upper bound on the free-text query, in characters.
pub const MAX_QUERY_CHARS: usize = 1000;

/// Accepted temperature range in °C.
pub const TEMPERATURE_MIN: f64 = -50.0;
/// Upper temperature bound in °C.
pub const TEMPERATURE_MAX: f64 = 60.0;

/// Answer languages the prediction service supports.
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "ru", "kk"];

/// Bounds and default for the history window, in hours.
pub const HOURS_MIN: i64 = 1;
/// Upper bound of the history window (30 days).
pub const HOURS_MAX: i64 = 720;
/// Window applied when the client sends no `hours` parameter.
pub const HOURS_DEFAULT: i64 = 24;

static DATE_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern")
});

/// Successful response envelope: `{"success": true, "data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Wraps a payload in the success envelope.
    pub const fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Error response envelope: `{"error": true, "message": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: bool,
    pub message: String,
}

impl ApiError {
    /// Wraps a message in the error envelope.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
        }
    }
}

/// History response envelope, a success envelope with a row count.
#[derive(Debug, Serialize)]
pub struct HistoryResponse<T> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> HistoryResponse<T> {
    /// Wraps rows in the history envelope; `count` mirrors `data.len()`.
    #[must_use]
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// Query parameters of the history endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct HoursQuery {
    pub hours: Option<i64>,
}

impl HoursQuery {
    /// The effective window in hours: the default when absent, clamped to
    /// `[HOURS_MIN, HOURS_MAX]` otherwise. Out-of-range values are clamped
    /// rather than rejected.
    #[must_use]
    pub fn effective_hours(&self) -> i64 {
        self.hours
            .unwrap_or(HOURS_DEFAULT)
            .clamp(HOURS_MIN, HOURS_MAX)
    }
}

/// A rejected prediction request, mapped to HTTP 400 by the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Query text exceeds [`MAX_QUERY_CHARS`].
    #[error("query must be at most {MAX_QUERY_CHARS} characters")]
    QueryTooLong,

    /// Date is not a calendar-valid `YYYY-MM-DD`.
    #[error("date must be a valid YYYY-MM-DD date, got {value:?}")]
    InvalidDate {
        /// The rejected value.
        value: String,
    },

    /// Temperature outside the plausible range for the region.
    #[error("temperature must be between {TEMPERATURE_MIN} and {TEMPERATURE_MAX} °C, got {value}")]
    TemperatureOutOfRange {
        /// The rejected value.
        value: f64,
    },

    /// Language not in [`SUPPORTED_LANGUAGES`].
    #[error("language must be one of en, ru, kk, got {value:?}")]
    UnsupportedLanguage {
        /// The rejected value.
        value: String,
    },
}

/// Validates a prediction request before it is forwarded.
///
/// Absent optional fields are valid; present ones must pass their checks.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered, checking fields in
/// declaration order.
pub fn validate_prediction_request(request: &PredictionRequest) -> Result<(), ValidationError> {
    if request.query.chars().count() > MAX_QUERY_CHARS {
        return Err(ValidationError::QueryTooLong);
    }

    if let Some(date) = &request.date {
        // The regex rejects the shape, chrono rejects impossible dates like
        // February 30th.
        if !DATE_SHAPE.is_match(date) || NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            return Err(ValidationError::InvalidDate {
                value: date.clone(),
            });
        }
    }

    if let Some(temperature) = request.temperature {
        if !(TEMPERATURE_MIN..=TEMPERATURE_MAX).contains(&temperature) {
            return Err(ValidationError::TemperatureOutOfRange { value: temperature });
        }
    }

    if let Some(language) = &request.language {
        if !SUPPORTED_LANGUAGES.contains(&language.as_str()) {
            return Err(ValidationError::UnsupportedLanguage {
                value: language.clone(),
            });
        }
    }

    Ok(())
}
