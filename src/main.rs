mod api;
mod config;
mod models;
mod services;
mod sources;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::AppState;
use config::Config;
use services::{AssetLookup, Collector, LocalStorage, MemoryStore, Store};
use sources::{dydx, osmosis, EndpointKind, EndpointProber, EndpointRegistry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,chain_gatherer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("\n🚀 Chain Data Gatherer Starting...\n");

    let config = Config::load()?;
    tracing::info!("✓ Configuration loaded");

    let assets = Arc::new(AssetLookup::load(Path::new(&config.assets.assetlist_path)));
    if assets.is_empty() {
        tracing::warn!("Asset lookup is empty, symbols will fall back to denom placeholders");
    }
    tracing::info!("✓ {} assets in lookup", assets.len());

    let registry = Arc::new(EndpointRegistry::new());
    registry.register(osmosis::CHAIN, EndpointKind::Lcd, &config.endpoints.osmosis_lcd);
    registry.register(dydx::CHAIN, EndpointKind::Indexer, &config.endpoints.dydx_indexer);

    // Rank the endpoints once before the first fetch
    let prober = EndpointProber::new(Duration::from_secs(config.refresh.probe_timeout_secs));
    speed_test_all(&prober, &registry).await;

    let cache = Arc::new(MemoryStore::new());
    let storage = if config.storage.enabled {
        Some(Arc::new(LocalStorage::new(&config.storage.data_dir)))
    } else {
        None
    };

    let mut stores: Vec<Arc<dyn Store>> = vec![cache.clone()];
    if let Some(ref local) = storage {
        stores.push(local.clone());
    }

    let collector = Arc::new(Collector::new(
        registry.clone(),
        assets.clone(),
        cache.clone(),
        stores,
        Duration::from_secs(config.refresh.request_timeout_secs),
    ));

    // Background: fetch-and-derive cycle, single-flight
    let cycle_secs = config.refresh.cycle_secs;
    tokio::spawn({
        let collector = collector.clone();
        async move { collector.run_continuous(cycle_secs).await }
    });

    // Background: periodic endpoint re-ranking
    tokio::spawn({
        let registry = registry.clone();
        let speed_test_secs = config.refresh.speed_test_secs;
        async move {
            let mut ticker = interval(Duration::from_secs(speed_test_secs));
            // First tick fires immediately and the startup run just
            // happened, so consume it
            ticker.tick().await;
            loop {
                ticker.tick().await;
                speed_test_all(&prober, &registry).await;
            }
        }
    });

    let state = Arc::new(AppState { cache, registry, assets, storage });
    let app = api::create_router(state).layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("🌐 Server ready on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Probes every registered endpoint list and publishes the new ranking.
async fn speed_test_all(prober: &EndpointProber, registry: &EndpointRegistry) {
    tracing::info!("🏎 Speed testing Osmosis LCD endpoints...");
    let ranked = prober
        .probe(
            registry.list(osmosis::CHAIN, EndpointKind::Lcd),
            osmosis::SPEED_TEST_PATH,
        )
        .await;
    registry.replace(osmosis::CHAIN, EndpointKind::Lcd, ranked);

    tracing::info!("🏎 Speed testing dYdX indexer endpoints...");
    let ranked = prober
        .probe(
            registry.list(dydx::CHAIN, EndpointKind::Indexer),
            dydx::SPEED_TEST_PATH,
        )
        .await;
    registry.replace(dydx::CHAIN, EndpointKind::Indexer, ranked);
}
