use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use nft_minting_backend::services::chain::{ChainClient, ChainError, MintedToken, NftData};
use nft_minting_backend::services::minting::MintOrchestrator;
use nft_minting_backend::services::pinning::{PinningClient, PinningError};
use nft_minting_backend::services::store::NftStore;
use nft_minting_backend::AppState;

pub const TEST_CONTRACT: &str = "0x00000000000000000000000000000000000000aa";
pub const TEST_OWNER: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";

/// In-memory SQLite; one pooled connection so every query sees the
/// same database
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1);

    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// How the fake chain client should behave on mint
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChainBehavior {
    Succeed,
    Timeout,
    Revert,
}

/// Counting fake for the chain client
pub struct FakeChain {
    pub behavior: ChainBehavior,
    pub supply: u64,
    pub mint_calls: AtomicUsize,
    pub supply_reads: AtomicUsize,
    pub token_reads: AtomicUsize,
}

impl FakeChain {
    pub fn new(behavior: ChainBehavior) -> Self {
        Self {
            behavior,
            supply: 0,
            mint_calls: AtomicUsize::new(0),
            supply_reads: AtomicUsize::new(0),
            token_reads: AtomicUsize::new(0),
        }
    }

    pub fn with_supply(behavior: ChainBehavior, supply: u64) -> Self {
        Self {
            supply,
            ..Self::new(behavior)
        }
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    async fn mint(&self, _to: &str, _token_uri: &str) -> Result<MintedToken, ChainError> {
        self.mint_calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            ChainBehavior::Succeed => Ok(MintedToken {
                token_id: 42,
                transaction_hash: "0xdeadbeef".to_string(),
                block_number: 1234,
            }),
            ChainBehavior::Timeout => Err(ChainError::Timeout(
                "No confirmation within 120s".to_string(),
            )),
            ChainBehavior::Revert => Err(ChainError::TransactionError(
                "Transaction reverted".to_string(),
            )),
        }
    }

    async fn nft_data(&self, token_id: u64) -> Result<NftData, ChainError> {
        Ok(NftData {
            token_id,
            owner: TEST_OWNER.to_string(),
            token_uri: format!("https://gateway.test/ipfs/QmMetaFake{}", token_id),
        })
    }

    async fn total_supply(&self) -> Result<u64, ChainError> {
        self.supply_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.supply)
    }

    async fn token_uri_by_index(&self, index: u64) -> Result<String, ChainError> {
        self.token_reads.fetch_add(1, Ordering::SeqCst);
        Ok(format!("https://gateway.test/ipfs/QmToken{}", index))
    }
}

/// Counting fake for the pinning client
pub struct FakePinning {
    pub fail: bool,
    pub file_pins: AtomicUsize,
    pub json_pins: AtomicUsize,
    pub metadata_fetches: AtomicUsize,
}

impl FakePinning {
    pub fn new() -> Self {
        Self {
            fail: false,
            file_pins: AtomicUsize::new(0),
            json_pins: AtomicUsize::new(0),
            metadata_fetches: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl PinningClient for FakePinning {
    async fn pin_file(
        &self,
        _bytes: Vec<u8>,
        _name: &str,
        _key_values: Vec<(String, String)>,
    ) -> Result<String, PinningError> {
        self.file_pins.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PinningError::RequestFailed("connection refused".to_string()));
        }
        Ok("QmImageFake".to_string())
    }

    async fn pin_json(&self, _value: &serde_json::Value) -> Result<String, PinningError> {
        self.json_pins.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PinningError::RequestFailed("connection refused".to_string()));
        }
        Ok("QmMetaFake".to_string())
    }

    fn gateway_url(&self, cid: &str) -> String {
        format!("https://gateway.test/ipfs/{}", cid)
    }

    async fn fetch_metadata(&self, cid: &str) -> Result<serde_json::Value, PinningError> {
        self.metadata_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(serde_json::json!({ "name": format!("token {}", cid) }))
    }
}

pub async fn test_state(chain: Arc<FakeChain>, pinning: Arc<FakePinning>) -> AppState {
    let db = setup_test_db().await.expect("Failed to set up test DB");
    let store = NftStore::new(db.clone());

    let orchestrator = Arc::new(MintOrchestrator::new(
        pinning.clone(),
        chain.clone(),
        store.clone(),
        TEST_CONTRACT.to_string(),
        "testnet".to_string(),
    ));

    AppState {
        db,
        pinning,
        chain,
        store,
        orchestrator,
    }
}
