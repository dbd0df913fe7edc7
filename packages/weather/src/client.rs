//! The Open-Meteo backed weather client.

use std::time::Duration;

use chrono::Utc;
use city_pulse_livedata::{Sourced, TtlCache};
use city_pulse_weather_models::WeatherReading;
use serde::Deserialize;

use crate::{CITY_LAT, CITY_LON, CITY_NAME, COUNTRY_CODE, WeatherError, aqi, synthetic};

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const AIR_QUALITY_URL: &str = "https://air-quality-api.open-meteo.com/v1/air-quality";

/// Open-Meteo refreshes observations every 15 minutes; 5 minutes keeps the
/// dashboard current while staying far under the daily request allowance.
const CACHE_TTL: Duration = Duration::from_secs(5 * 60);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct ForecastResponse {
    current: CurrentConditions,
}

#[derive(Deserialize)]
struct CurrentConditions {
    temperature_2m: f64,
    relative_humidity_2m: i32,
    apparent_temperature: f64,
    weather_code: i32,
    wind_speed_10m: f64,
    surface_pressure: f64,
}

#[derive(Deserialize)]
struct AirQualityResponse {
    current: AirQualityCurrent,
}

#[derive(Deserialize)]
struct AirQualityCurrent {
    pm2_5: Option<f64>,
}

/// Fetches current weather and air quality, degrading to cached or
/// synthesized readings so [`WeatherClient::fetch_current`] never fails.
pub struct WeatherClient {
    http: reqwest::Client,
    cache: TtlCache<WeatherReading>,
    forecast_url: String,
    air_quality_url: String,
}

impl Default for WeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherClient {
    /// Creates a client against the public Open-Meteo endpoints.
    #[must_use]
    pub fn new() -> Self {
        Self::with_endpoints(FORECAST_URL.to_string(), AIR_QUALITY_URL.to_string())
    }

    /// Creates a client against explicit endpoints, e.g. a self-hosted
    /// Open-Meteo instance or a test stub.
    #[must_use]
    pub fn with_endpoints(forecast_url: String, air_quality_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            cache: TtlCache::new(CACHE_TTL),
            forecast_url,
            air_quality_url,
        }
    }

    /// Returns the current weather reading.
    ///
    /// Serves from cache while the TTL holds; otherwise queries the upstream
    /// and falls back to a seasonal-average reading on any failure. The
    /// resulting reading is cached either way.
    pub async fn fetch_current(&self) -> Sourced<WeatherReading> {
        self.cache.get_or_refresh(|| self.refresh()).await
    }

    async fn refresh(&self) -> Sourced<WeatherReading> {
        match self.fetch_live().await {
            Ok(reading) => Sourced::Live(reading),
            Err(err) => {
                log::warn!("Open-Meteo weather fetch failed, using seasonal fallback: {err}");
                Sourced::Fallback(synthetic::seasonal_reading(Utc::now()))
            }
        }
    }

    async fn fetch_live(&self) -> Result<WeatherReading, WeatherError> {
        let mut reading = self.fetch_conditions().await?;

        // A failed air-quality sub-call degrades to an estimate instead of
        // failing the whole fetch.
        reading.aqi = match self.fetch_pm25().await {
            Ok(pm25) => {
                let aqi = aqi::pm25_to_aqi(pm25);
                log::info!("Open-Meteo AQI: PM2.5={pm25:.1} µg/m³ -> EPA AQI={aqi}");
                aqi
            }
            Err(err) => {
                log::warn!("Open-Meteo air quality fetch failed, estimating: {err}");
                aqi::estimate_aqi(reading.temperature, Utc::now())
            }
        };

        Ok(reading.with_clamped_aqi())
    }

    async fn fetch_conditions(&self) -> Result<WeatherReading, WeatherError> {
        let response: ForecastResponse = self
            .http
            .get(&self.forecast_url)
            .timeout(REQUEST_TIMEOUT)
            .query(&[
                ("latitude", CITY_LAT.to_string()),
                ("longitude", CITY_LON.to_string()),
                (
                    "current",
                    "temperature_2m,relative_humidity_2m,apparent_temperature,\
                     weather_code,wind_speed_10m,surface_pressure"
                        .to_string(),
                ),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let current = response.current;
        let (description, icon) = wmo_conditions(current.weather_code);

        #[allow(clippy::cast_possible_truncation)]
        Ok(WeatherReading {
            temperature: round_tenth(current.temperature_2m),
            feels_like: round_tenth(current.apparent_temperature),
            humidity: current.relative_humidity_2m,
            description: description.to_string(),
            icon: icon.to_string(),
            // Open-Meteo reports wind in km/h; the dashboard renders m/s.
            wind_speed: round_tenth(current.wind_speed_10m / 3.6),
            visibility: 10_000,
            pressure: current.surface_pressure.round() as i32,
            aqi: 0,
            city: CITY_NAME.to_string(),
            country: COUNTRY_CODE.to_string(),
            timestamp: Utc::now(),
            is_mock: false,
        })
    }

    async fn fetch_pm25(&self) -> Result<f64, WeatherError> {
        let response: AirQualityResponse = self
            .http
            .get(&self.air_quality_url)
            .timeout(REQUEST_TIMEOUT)
            .query(&[
                ("latitude", CITY_LAT.to_string()),
                ("longitude", CITY_LON.to_string()),
                ("current", "pm2_5,pm10".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response.current.pm2_5.ok_or(WeatherError::MissingPm25)
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Maps a WMO weather interpretation code to a description and icon code.
const fn wmo_conditions(code: i32) -> (&'static str, &'static str) {
    match code {
        0 => ("Clear sky", "01d"),
        1..=3 => ("Partly cloudy", "02d"),
        45 | 48 => ("Fog", "50d"),
        51..=57 => ("Drizzle", "09d"),
        61..=67 => ("Rain", "10d"),
        71..=77 => ("Snow", "13d"),
        80..=82 => ("Rain showers", "09d"),
        85 | 86 => ("Snow showers", "13d"),
        95..=99 => ("Thunderstorm", "11d"),
        _ => ("Cloudy", "04d"),
    }
}
