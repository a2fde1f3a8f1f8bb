mod address;
mod arbitrage;
mod info;
mod krc20;
mod krc721;
mod wallet;

use crate::AppState;
use axum::{
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;

/// Create the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/krc20-tokens", get(krc20::krc20_tokens))
        .route("/api/token-info", get(krc20::token_info))
        .route("/api/chart-data", get(krc20::chart_data))
        .route("/api/transactions", get(address::transactions))
        .route("/api/transactions/:hash", get(address::transaction))
        .route("/api/nft-holdings", get(address::nft_holdings))
        .route("/api/krc721/holders/:tick", get(krc721::holders))
        .route(
            "/api/krc721/new-mints",
            get(krc721::new_mints).post(krc721::scan_and_list),
        )
        .route("/api/krc721/new-mints/recent", get(krc721::recent_mints))
        .route("/api/krc721/new-mints/scan", post(krc721::scan))
        .route("/api/krc721/new-mints/watch", get(krc721::watch_mints))
        .route("/api/krc721/watched/:tick", post(krc721::toggle_watched))
        .route("/api/collections", get(krc721::collections))
        .route("/api/collections/:tick/tokens", get(krc721::collection_tokens))
        .route("/api/arbitrage", get(arbitrage::arbitrage))
        .route("/api/arbitrage/refresh", post(arbitrage::refresh))
        .route(
            "/api/arbitrage/select",
            post(arbitrage::select).delete(arbitrage::clear_selection),
        )
        .route("/api/favorites/:ticker", post(arbitrage::toggle_favorite))
        .route("/api/wallet", get(wallet::snapshot))
        .route("/api/wallet/connect", post(wallet::connect))
        .route("/api/wallet/disconnect", post(wallet::disconnect))
        .route("/api/wallet/network", post(wallet::switch_network))
        .route("/api/wallet/refresh", post(wallet::refresh))
        .route("/api/airdrop/check", post(wallet::airdrop_check))
        .route("/api/info/market-data", get(info::market_data))
        .route("/api/info/blockdag", get(info::blockdag))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
