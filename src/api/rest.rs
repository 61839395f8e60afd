use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::services::{AssetLookup, LocalStorage, MemoryStore};
use crate::sources::EndpointRegistry;

pub struct AppState {
    pub cache: Arc<MemoryStore>,
    pub registry: Arc<EndpointRegistry>,
    pub assets: Arc<AssetLookup>,
    pub storage: Option<Arc<LocalStorage>>,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/pools", get(get_pools))
        .route("/api/tokens", get(get_tokens))
        .route("/api/tokens/:symbol/pools", get(get_token_pools))
        .route("/api/prices", get(get_prices))
        .route("/api/prices/:symbol", get(get_token_price))
        .route("/api/markets", get(get_markets))
        .route("/api/endpoints", get(get_endpoints))
        .route("/api/stats", get(get_stats))
        .route("/ws", get(super::websocket::ws_handler))
        .with_state(state)
}

/// GET /api/health
async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "cache": state.cache.stats(),
        "native_usd_price": state.assets.native_usd_price(),
    }))
}

/// GET /api/pools - latest pairwise pool prices
async fn get_pools(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let pools = state.cache.latest_pool_prices();
    let latest_update = pools.iter().map(|p| p.timestamp).max().unwrap_or(0);

    Json(json!({
        "pools": pools,
        "count": pools.len(),
        "latest_update": latest_update,
    }))
}

/// GET /api/tokens - distinct tokens in the latest snapshot
async fn get_tokens(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let tokens = state.cache.unique_tokens();
    Json(json!({
        "tokens": tokens,
        "count": tokens.len(),
    }))
}

#[derive(Serialize)]
struct PairedPool {
    pool_id: String,
    paired_with: String,
    paired_denom: String,
    token_price: f64,
    inverse_price: f64,
    liquidity_usd: f64,
    timestamp: i64,
}

/// GET /api/tokens/{symbol}/pools - every pool containing the symbol, seen
/// from the symbol's side of the pair
async fn get_token_pools(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> impl IntoResponse {
    let symbol = symbol.to_uppercase();
    let pools = state.cache.pools_for_token(&symbol);

    if pools.is_empty() {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("no pools found for token {}", symbol)})),
        );
    }

    let result: Vec<PairedPool> = pools
        .iter()
        .map(|pool| {
            if pool.token0_symbol == symbol {
                PairedPool {
                    pool_id: pool.pool_id.clone(),
                    paired_with: pool.token1_symbol.clone(),
                    paired_denom: pool.token1_denom.clone(),
                    token_price: pool.price_token0_to_token1,
                    inverse_price: pool.price_token1_to_token0,
                    liquidity_usd: pool.liquidity_usd,
                    timestamp: pool.timestamp,
                }
            } else {
                PairedPool {
                    pool_id: pool.pool_id.clone(),
                    paired_with: pool.token0_symbol.clone(),
                    paired_denom: pool.token0_denom.clone(),
                    token_price: pool.price_token1_to_token0,
                    inverse_price: pool.price_token0_to_token1,
                    liquidity_usd: pool.liquidity_usd,
                    timestamp: pool.timestamp,
                }
            }
        })
        .collect();

    let latest_update = pools.iter().map(|p| p.timestamp).max().unwrap_or(0);
    (
        StatusCode::OK,
        Json(json!({
            "symbol": symbol,
            "pools": result,
            "count": result.len(),
            "latest_update": latest_update,
        })),
    )
}

/// GET /api/prices - latest token USD prices
async fn get_prices(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let prices = state.cache.latest_usd_prices();
    Json(json!({
        "prices": prices,
        "count": prices.len(),
    }))
}

/// GET /api/prices/{symbol} - latest USD price for one token
async fn get_token_price(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> impl IntoResponse {
    let symbol = symbol.to_uppercase();
    match state.cache.token_price(&symbol) {
        Some(price) => (StatusCode::OK, Json(json!(price))),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("no USD price for token {}", symbol)})),
        ),
    }
}

/// GET /api/markets - latest dYdX perpetual markets
async fn get_markets(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let markets = state.cache.latest_markets();
    Json(json!({
        "markets": markets,
        "count": markets.len(),
    }))
}

#[derive(Serialize)]
struct EndpointView {
    chain: String,
    kind: String,
    url: String,
    latency_ms: u128,
    working: bool,
}

/// GET /api/endpoints - current endpoint ranking per (chain, kind)
async fn get_endpoints(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let mut keys = state.registry.keys();
    keys.sort_by_key(|(chain, kind)| (chain.clone(), kind.to_string()));

    let mut listing = Vec::new();
    for (chain, kind) in keys {
        for endpoint in state.registry.list(&chain, kind) {
            listing.push(EndpointView {
                chain: chain.clone(),
                kind: kind.to_string(),
                url: endpoint.url,
                latency_ms: endpoint.latency.as_millis(),
                working: endpoint.working,
            });
        }
    }

    Json(json!({
        "endpoints": listing,
        "count": listing.len(),
    }))
}

/// GET /api/stats - cache and disk storage statistics
async fn get_stats(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "cache": state.cache.stats(),
        "storage": state.storage.as_ref().map(|s| s.stats()),
    }))
}
