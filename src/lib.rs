// src/lib.rs

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use services::chain::ChainClient;
use services::minting::MintOrchestrator;
use services::pinning::PinningClient;
use services::store::NftStore;

/// Upload size cap for the multipart image endpoint
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub pinning: Arc<dyn PinningClient>,
    pub chain: Arc<dyn ChainClient>,
    pub store: NftStore,
    pub orchestrator: Arc<MintOrchestrator>,
}

pub mod entities {
    pub mod prelude;
    pub mod nfts;
}

pub mod services {
    pub mod address;
    pub mod chain;
    pub mod minting;
    pub mod pinning;
    pub mod store;
}

pub mod models;
pub mod handlers;

/// Full API surface; shared between the binary and the test suite
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/nft/upload", post(handlers::nft::upload_nft))
        .route("/api/nft/mint", post(handlers::nft::mint_nft))
        .route("/api/nft/list", get(handlers::nft::list_nfts))
        .route("/api/nft/my-nfts", get(handlers::nft::my_nfts))
        .route("/api/nft/by-wallet/{address}", get(handlers::nft::by_wallet))
        .route(
            "/api/nft/validate-address",
            post(handlers::nft::validate_address),
        )
        .route("/api/nft/chain/tokens", get(handlers::chain::list_chain_tokens))
        .route("/api/nft/{id}", get(handlers::nft::get_nft))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

async fn root() -> &'static str {
    "NFT Minting API is running"
}
