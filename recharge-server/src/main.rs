use std::net::SocketAddr;

use recharge_server::amap::AmapClient;
use recharge_server::cache::{CacheConfig, CachedMapClient};
use recharge_server::catalog::StationCatalog;
use recharge_server::config::AppConfig;
use recharge_server::generator::ChatClient;
use recharge_server::web::{AppState, create_router};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "recharge_server=info,tower_http=info";

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    let catalog = match &config.catalog_path {
        Some(path) => StationCatalog::from_path(path),
        None => StationCatalog::bundled(),
    }
    .expect("Failed to load station catalog");
    info!(
        regions = catalog.region_count(),
        stations = catalog.station_count(),
        "loaded station catalog"
    );

    let amap = AmapClient::new(config.amap).expect("Failed to create AMap client");
    let maps = CachedMapClient::new(amap, &CacheConfig::default());
    let generator = ChatClient::new(config.chat).expect("Failed to create plan generator client");

    let state = AppState::new(catalog, maps, generator, config.planner);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "recharge planner listening");
    info!("  GET  /health       - Health check");
    info!("  POST /route/legs   - Segment a trip into costed legs");
    info!("  POST /plan/verify  - Check a recharging plan");
    info!("  POST /plan/trip    - Plan a trip");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
