//!
//! Station service HTTP server.
//! Reads configuration from TOML file (~/.config/station-service/config.toml).

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use station_service::config::AppConfig;
use station_service::domain::service::StationService;
use station_service::infrastructure::dispatcher::{ChannelCommandDispatcher, CommandChannelRegistry};
use station_service::infrastructure::lock::VehicleLockManager;
use station_service::infrastructure::memory::{
    seed_demo_data, InMemoryReservationStore, InMemoryStationStore, InMemoryVehicleStore,
};
use station_service::interfaces::http::create_api_router;
use station_service::shared::shutdown::{listen_for_shutdown_signals, ShutdownSignal};
use station_service::default_config_path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("STATION_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting Station Service...");

    // ── Stores ─────────────────────────────────────────────────
    let stations = Arc::new(InMemoryStationStore::new());
    let vehicles = Arc::new(InMemoryVehicleStore::new());
    let reservations = Arc::new(InMemoryReservationStore::new());

    if app_cfg.station.seed_demo {
        seed_demo_data(&stations, &vehicles).await;
        info!("Demo network seeded (stations S01–S05, vehicles V001–V010)");
    }

    // ── Actuation channel & dispatcher ─────────────────────────
    let registry = CommandChannelRegistry::shared();
    let dispatcher = Arc::new(ChannelCommandDispatcher::new(
        registry.clone(),
        Duration::from_millis(app_cfg.dispatcher.send_timeout_ms),
    ));

    // ── Domain service ─────────────────────────────────────────
    let service = Arc::new(StationService::new(
        stations,
        vehicles,
        reservations,
        VehicleLockManager::shared(),
        dispatcher,
        chrono::Duration::minutes(app_cfg.station.reservation_ttl_minutes),
    ));
    info!(
        "Reservation TTL: {} minutes",
        app_cfg.station.reservation_ttl_minutes
    );

    // ── Shutdown handling ──────────────────────────────────────
    let shutdown = ShutdownSignal::new();
    tokio::spawn(listen_for_shutdown_signals(shutdown.clone()));

    // ── REST API server ────────────────────────────────────────
    let api_router = create_api_router(service);
    let api_addr = format!("{}:{}", app_cfg.server.host, app_cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("REST API server listening on http://{}", api_addr);
    info!("Swagger UI available at http://{}/docs/", api_addr);

    let api_shutdown = shutdown.clone();
    axum::serve(listener, api_router)
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 REST API server received shutdown signal");
        })
        .await?;

    info!("👋 Station Service shutdown complete");
    Ok(())
}
