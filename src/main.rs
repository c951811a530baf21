use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nft_minting_backend::services::chain::{NftContractService, DEFAULT_MINT_TIMEOUT_SECS};
use nft_minting_backend::services::minting::MintOrchestrator;
use nft_minting_backend::services::pinning::PinataService;
use nft_minting_backend::services::store::NftStore;
use nft_minting_backend::{api_router, AppState};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,nft_minting_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Connect to database
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    tracing::info!("Connecting to database...");
    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    // Pinning client
    let pinata_jwt = env::var("PINATA_JWT").expect("PINATA_JWT must be set");
    let gateway_host = env::var("PINATA_GATEWAY_URL").expect("PINATA_GATEWAY_URL must be set");
    let pinning = Arc::new(PinataService::new(pinata_jwt, gateway_host));

    // Chain client
    let rpc_url = env::var("ETHEREUM_RPC_URL").expect("ETHEREUM_RPC_URL must be set");
    let contract_address =
        env::var("NFT_CONTRACT_ADDRESS").expect("NFT_CONTRACT_ADDRESS must be set");
    let minter_key = env::var("MINTER_PRIVATE_KEY").expect("MINTER_PRIVATE_KEY must be set");
    let expected_chain_id = env::var("CHAIN_ID").ok().and_then(|v| v.parse().ok());
    let mint_timeout = env::var("MINT_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MINT_TIMEOUT_SECS);

    let chain = Arc::new(
        NftContractService::new(
            &rpc_url,
            &minter_key,
            &contract_address,
            expected_chain_id,
            Duration::from_secs(mint_timeout),
        )
        .await
        .expect("Failed to initialize chain client"),
    );

    let network = env::var("NFT_NETWORK").unwrap_or_else(|_| "ethereum".to_string());

    let store = NftStore::new(db.clone());
    let orchestrator = Arc::new(MintOrchestrator::new(
        pinning.clone(),
        chain.clone(),
        store.clone(),
        contract_address,
        network,
    ));

    let state = AppState {
        db,
        pinning,
        chain,
        store,
        orchestrator,
    };

    // Build router
    let app = api_router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    // Start server
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .expect("Failed to bind listener");

    tracing::info!("Server listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
