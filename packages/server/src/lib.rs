#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Actix-Web API server for the city pulse dashboard.
//!
//! Serves the REST API consumed by the dashboard frontend: combined and
//! per-provider current readings, historical ranges, and the prediction
//! proxy.

pub mod handlers;

use actix_web::web;
use city_pulse_dashboard::DashboardService;
use city_pulse_prediction::PredictionBridge;

/// Shared application state.
pub struct AppState {
    /// Aggregation service over the provider clients.
    pub dashboard: DashboardService,
    /// Bridge to the external prediction service.
    pub bridge: PredictionBridge,
}

/// Registers every route of the API.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health)).service(
        web::scope("/api/v1")
            .route("/status", web::get().to(handlers::status))
            .route("/dashboard", web::get().to(handlers::dashboard))
            .route("/weather", web::get().to(handlers::weather))
            .route("/traffic", web::get().to(handlers::traffic))
            .route("/history/weather", web::get().to(handlers::weather_history))
            .route("/history/traffic", web::get().to(handlers::traffic_history))
            .route("/predict", web::post().to(handlers::predict))
            .route("/stats", web::get().to(handlers::stats)),
    );
}
