//! HTTP handler functions for the city pulse API.

use actix_web::{HttpResponse, web};
use chrono::{Duration, Utc};
use city_pulse_server_models::{
    ApiError, ApiResponse, HistoryResponse, HoursQuery, validate_prediction_request,
};

use city_pulse_prediction_models::PredictionRequest;

use crate::AppState;

/// `GET /health`
///
/// Pure liveness: static JSON with no await on any backing service, so a
/// stalled database or prediction service cannot delay the probe.
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `GET /api/v1/status`
///
/// Readiness: reports each backing service individually. Always 200; a
/// degraded deployment is still visibly alive.
pub async fn status(state: web::Data<AppState>) -> HttpResponse {
    let store = state.dashboard.writer().store();
    let (database, ml_service) = tokio::join!(store.health(), state.bridge.health());

    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "database": status_word(database.is_ok()),
        "ml_service": status_word(ml_service.is_ok()),
    }))
}

const fn status_word(up: bool) -> &'static str {
    if up { "up" } else { "down" }
}

/// `GET /api/v1/dashboard`
///
/// The combined weather and traffic snapshot. Never fails: both providers
/// degrade to fallback readings internally.
pub async fn dashboard(state: web::Data<AppState>) -> HttpResponse {
    let snapshot = state.dashboard.snapshot().await;
    HttpResponse::Ok().json(ApiResponse::new(snapshot))
}

/// `GET /api/v1/weather`
pub async fn weather(state: web::Data<AppState>) -> HttpResponse {
    let reading = state.dashboard.weather().await.into_inner();
    HttpResponse::Ok().json(ApiResponse::new(reading))
}

/// `GET /api/v1/traffic`
pub async fn traffic(state: web::Data<AppState>) -> HttpResponse {
    let reading = state.dashboard.traffic().await.into_inner();
    HttpResponse::Ok().json(ApiResponse::new(reading))
}

/// `GET /api/v1/history/weather?hours=N`
pub async fn weather_history(
    state: web::Data<AppState>,
    params: web::Query<HoursQuery>,
) -> HttpResponse {
    let to = Utc::now();
    let from = to - Duration::hours(params.effective_hours());

    match state.dashboard.writer().store().weather_history(from, to).await {
        Ok(rows) => HttpResponse::Ok().json(HistoryResponse::new(rows)),
        Err(err) => {
            log::error!("weather history query failed: {err}");
            HttpResponse::InternalServerError()
                .json(ApiError::new("Failed to query weather history"))
        }
    }
}

/// `GET /api/v1/history/traffic?hours=N`
pub async fn traffic_history(
    state: web::Data<AppState>,
    params: web::Query<HoursQuery>,
) -> HttpResponse {
    let to = Utc::now();
    let from = to - Duration::hours(params.effective_hours());

    match state.dashboard.writer().store().traffic_history(from, to).await {
        Ok(rows) => HttpResponse::Ok().json(HistoryResponse::new(rows)),
        Err(err) => {
            log::error!("traffic history query failed: {err}");
            HttpResponse::InternalServerError()
                .json(ApiError::new("Failed to query traffic history"))
        }
    }
}

/// `POST /api/v1/predict`
///
/// Validates the request, grounds it in the latest readings, forwards it to
/// the prediction service, and logs the exchange through the detached writer.
pub async fn predict(
    state: web::Data<AppState>,
    body: web::Json<PredictionRequest>,
) -> HttpResponse {
    let mut request = body.into_inner();

    if let Err(err) = validate_prediction_request(&request) {
        return HttpResponse::BadRequest().json(ApiError::new(err.to_string()));
    }

    // Ground the question in current conditions unless the caller already
    // supplied them.
    if request.live_aqi.is_none() || request.live_traffic.is_none() || request.live_temp.is_none() {
        let (weather, traffic) = tokio::join!(state.dashboard.weather(), state.dashboard.traffic());
        let weather = weather.into_inner();
        let traffic = traffic.into_inner();

        request.live_aqi = request.live_aqi.or(Some(weather.aqi));
        request.live_temp = request.live_temp.or(Some(weather.temperature));
        request.live_traffic = request.live_traffic.or(Some(traffic.congestion_index));
    }

    let result = state.bridge.predict(&request).await.into_inner();

    state
        .dashboard
        .writer()
        .spawn_prediction_log(request, result.clone());

    HttpResponse::Ok().json(ApiResponse::new(result))
}

/// `GET /api/v1/stats`
///
/// Proxies the prediction service's aggregate statistics verbatim; a 503
/// tells the frontend to hide the panel rather than render canned numbers.
pub async fn stats(state: web::Data<AppState>) -> HttpResponse {
    match state.bridge.stats().await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(err) => {
            log::warn!("stats unavailable: {err}");
            HttpResponse::ServiceUnavailable().json(ApiError::new("Prediction service unavailable"))
        }
    }
}
