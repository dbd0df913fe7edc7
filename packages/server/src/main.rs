#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! City pulse dashboard API server.
//!
//! Starts with whatever backing services are reachable: an unreachable
//! database drops persistence to an in-memory store, a missing traffic key
//! enables synthetic traffic, and an unreachable prediction service yields
//! canned answers. The API surface stays fully functional in every case.

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use city_pulse_dashboard::DashboardService;
use city_pulse_database::{DataStore, DetachedWriter, MemoryStore, PostgresStore};
use city_pulse_prediction::PredictionBridge;
use city_pulse_server::{AppState, configure};
use city_pulse_traffic::TrafficClient;
use city_pulse_weather::WeatherClient;

/// Budget for the startup connection attempt; past it the server comes up in
/// demo mode instead of hanging.
const DB_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_ML_SERVICE_URL: &str = "http://localhost:8000";

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let store = select_store().await;
    let writer = DetachedWriter::new(store);

    let weather = Arc::new(WeatherClient::new());
    let traffic = Arc::new(TrafficClient::new(std::env::var("TOMTOM_API_KEY").ok()));

    let ml_service_url =
        std::env::var("ML_SERVICE_URL").unwrap_or_else(|_| DEFAULT_ML_SERVICE_URL.to_string());

    let state = web::Data::new(AppState {
        dashboard: DashboardService::new(weather, traffic, writer.clone()),
        bridge: PredictionBridge::new(ml_service_url),
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await?;

    log::info!("Draining detached writes...");
    writer.drain().await;

    Ok(())
}

/// Connects to Postgres when `DATABASE_URL` is set and reachable; otherwise
/// serves from the in-memory store.
async fn select_store() -> Arc<dyn DataStore> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        log::warn!("DATABASE_URL not set, using in-memory store");
        return Arc::new(MemoryStore::new());
    };

    log::info!("Connecting to database...");
    match tokio::time::timeout(DB_CONNECT_TIMEOUT, city_pulse_database::connect(&url)).await {
        Ok(Ok(db)) => {
            log::info!("Database connected");
            Arc::new(PostgresStore::new(db))
        }
        Ok(Err(err)) => {
            log::warn!("Database connection failed ({err}), using in-memory store");
            Arc::new(MemoryStore::new())
        }
        Err(_) => {
            log::warn!(
                "Database connection timed out after {DB_CONNECT_TIMEOUT:?}, using in-memory store"
            );
            Arc::new(MemoryStore::new())
        }
    }
}
