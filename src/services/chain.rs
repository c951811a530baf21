//! Ethereum NFT contract client
//!
//! Wraps the ERC-721 contract behind a small async interface: submit a
//! mint transaction and wait for one confirmation, read ownership and
//! token URI for a single token, and enumerate the collection through
//! totalSupply/tokenByIndex. The mint path signs with the configured
//! minter key; read paths go through a plain HTTP provider.

use alloy::{
    network::EthereumWallet,
    primitives::{Address, U256},
    providers::{Provider, ProviderBuilder, RootProvider},
    signers::local::PrivateKeySigner,
    sol,
    sol_types::SolEvent,
    transports::http::{Client, Http},
};
use async_trait::async_trait;
use futures_util::{stream, StreamExt, TryStreamExt};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Default bound on confirmation wait
pub const DEFAULT_MINT_TIMEOUT_SECS: u64 = 120;

/// Concurrent per-token reads during enumeration; each item costs two
/// RPC round trips, so this bounds in-flight requests against the node
const MAX_CONCURRENT_TOKEN_READS: usize = 4;

// ERC-721 interface exposed by the NFT contract (enumerable extension
// included; createNft is the contract's mint entry point)
sol! {
    #[sol(rpc)]
    interface INft {
        function createNft(address to, string calldata tokenURI) external returns (uint256);
        function ownerOf(uint256 tokenId) external view returns (address);
        function tokenURI(uint256 tokenId) external view returns (string);
        function totalSupply() external view returns (uint256);
        function tokenByIndex(uint256 index) external view returns (uint256);

        event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);
    }
}

/// Confirmed mint data, all-or-nothing
#[derive(Debug, Clone)]
pub struct MintedToken {
    pub token_id: u64,
    pub transaction_hash: String,
    pub block_number: u64,
}

/// On-chain state of a single token
#[derive(Debug, Clone)]
pub struct NftData {
    pub token_id: u64,
    pub owner: String,
    pub token_uri: String,
}

/// Error types for chain operations
#[derive(Debug)]
pub enum ChainError {
    ProviderError(String),
    TransactionError(String),
    Timeout(String),
    TokenNotFound(u64),
    InvalidAddress(String),
    EventParsingError(String),
    InvalidConfig(String),
}

impl std::fmt::Display for ChainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainError::ProviderError(msg) => write!(f, "Provider error: {}", msg),
            ChainError::TransactionError(msg) => write!(f, "Transaction error: {}", msg),
            ChainError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            ChainError::TokenNotFound(id) => write!(f, "Token {} does not exist", id),
            ChainError::InvalidAddress(msg) => write!(f, "Invalid address: {}", msg),
            ChainError::EventParsingError(msg) => write!(f, "Event parsing error: {}", msg),
            ChainError::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ChainError {}

/// Chain interface, injectable so tests can substitute fakes
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Mint a token to `to` pointing at `token_uri`, blocking until one
    /// confirmation. Either returns full mint data or fails.
    async fn mint(&self, to: &str, token_uri: &str) -> Result<MintedToken, ChainError>;

    /// Read owner and token URI for an existing token
    async fn nft_data(&self, token_id: u64) -> Result<NftData, ChainError>;

    /// Current collection size
    async fn total_supply(&self) -> Result<u64, ChainError>;

    /// Token URI at enumeration index `index` (tokenByIndex + tokenURI)
    async fn token_uri_by_index(&self, index: u64) -> Result<String, ChainError>;

    /// Enumerate every token URI in the collection. Re-reads supply on
    /// each call; per-token reads are bounded-concurrent. Zero supply
    /// performs no per-token calls.
    async fn list_token_uris(&self) -> Result<Vec<String>, ChainError> {
        let supply = self.total_supply().await?;
        debug!(supply = supply, "Enumerating token URIs");

        stream::iter(0..supply)
            .map(|index| self.token_uri_by_index(index))
            .buffered(MAX_CONCURRENT_TOKEN_READS)
            .try_collect()
            .await
    }
}

/// Production client bound to one contract on one RPC endpoint
pub struct NftContractService {
    provider: RootProvider<Http<Client>>,
    wallet: EthereumWallet,
    contract_address: Address,
    rpc_url: String,
    mint_timeout: Duration,
}

impl NftContractService {
    /// Connects to the RPC node and verifies it responds. When
    /// `expected_chain_id` is set, a mismatch logs a warning but does
    /// not fail construction.
    pub async fn new(
        rpc_url: &str,
        private_key: &str,
        contract_address: &str,
        expected_chain_id: Option<u64>,
        mint_timeout: Duration,
    ) -> Result<Self, ChainError> {
        info!(rpc_url = %rpc_url, contract = %contract_address, "Initializing NftContractService");

        let signer: PrivateKeySigner = private_key
            .parse()
            .map_err(|e| ChainError::InvalidConfig(format!("Invalid minter key: {}", e)))?;
        let wallet = EthereumWallet::from(signer);

        let provider = ProviderBuilder::new().on_http(
            rpc_url
                .parse()
                .map_err(|e| ChainError::InvalidConfig(format!("Invalid RPC URL: {}", e)))?,
        );

        let chain_id = provider.get_chain_id().await.map_err(|e| {
            error!(error = %e, "Failed to connect to RPC node");
            ChainError::ProviderError(format!("Connection failed: {}", e))
        })?;

        if let Some(expected) = expected_chain_id {
            if chain_id != expected {
                warn!(expected = expected, actual = chain_id, "Chain ID mismatch");
            }
        }

        let contract = Address::from_str(contract_address).map_err(|e| {
            ChainError::InvalidConfig(format!("Invalid contract address: {}", e))
        })?;

        info!(chain_id = chain_id, "NftContractService initialized");

        Ok(Self {
            provider,
            wallet,
            contract_address: contract,
            rpc_url: rpc_url.to_string(),
            mint_timeout,
        })
    }

    /// Extract the minted token id from the Transfer event's third
    /// indexed topic
    fn parse_transfer_token_id(logs: &[alloy::rpc::types::Log]) -> Result<u64, ChainError> {
        let signature = INft::Transfer::SIGNATURE_HASH;

        for log in logs {
            if log.topics().len() < 4 {
                continue;
            }
            match log.topics().first() {
                Some(topic0) if *topic0 == signature => {}
                _ => continue,
            }
            if let Some(token_topic) = log.topics().get(3) {
                let token_id = U256::from_be_bytes(token_topic.0);
                return Ok(token_id.to::<u64>());
            }
        }

        Err(ChainError::EventParsingError(
            "Transfer event not found in mint receipt".to_string(),
        ))
    }
}

#[async_trait]
impl ChainClient for NftContractService {
    async fn mint(&self, to: &str, token_uri: &str) -> Result<MintedToken, ChainError> {
        let to_address = Address::from_str(to)
            .map_err(|e| ChainError::InvalidAddress(format!("Invalid recipient: {}", e)))?;

        info!(to = %to_address, token_uri = %token_uri, "Submitting mint transaction");

        // Wallet-filled provider for signing
        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(self.wallet.clone())
            .on_http(
                self.rpc_url
                    .parse()
                    .map_err(|e| ChainError::ProviderError(format!("RPC URL error: {}", e)))?,
            );

        let contract = INft::new(self.contract_address, &provider);

        let pending_tx = contract
            .createNft(to_address, token_uri.to_string())
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send mint transaction");
                ChainError::TransactionError(format!("Send failed: {}", e))
            })?;

        let tx_hash = format!("{:?}", pending_tx.tx_hash());
        info!(tx_hash = %tx_hash, "Transaction sent, waiting for confirmation");

        let receipt = tokio::time::timeout(self.mint_timeout, pending_tx.get_receipt())
            .await
            .map_err(|_| {
                error!(tx_hash = %tx_hash, timeout_secs = self.mint_timeout.as_secs(), "Confirmation timed out");
                ChainError::Timeout(format!(
                    "No confirmation for {} within {}s",
                    tx_hash,
                    self.mint_timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                error!(error = %e, "Failed to get transaction receipt");
                ChainError::TransactionError(format!("Receipt failed: {}", e))
            })?;

        if !receipt.status() {
            return Err(ChainError::TransactionError(
                "Transaction reverted".to_string(),
            ));
        }

        let token_id = Self::parse_transfer_token_id(receipt.inner.logs())?;
        let block_number = receipt.block_number.unwrap_or(0);

        info!(
            tx_hash = %tx_hash,
            token_id = token_id,
            block_number = block_number,
            "Mint confirmed"
        );

        Ok(MintedToken {
            token_id,
            transaction_hash: tx_hash,
            block_number,
        })
    }

    async fn nft_data(&self, token_id: u64) -> Result<NftData, ChainError> {
        let contract = INft::new(self.contract_address, &self.provider);
        let id = U256::from(token_id);

        // ownerOf reverts for nonexistent tokens
        let owner = contract
            .ownerOf(id)
            .call()
            .await
            .map(|r| r._0)
            .map_err(|e| {
                debug!(token_id = token_id, error = %e, "ownerOf failed");
                ChainError::TokenNotFound(token_id)
            })?;

        let token_uri = contract
            .tokenURI(id)
            .call()
            .await
            .map(|r| r._0)
            .map_err(|e| {
                debug!(token_id = token_id, error = %e, "tokenURI failed");
                ChainError::TokenNotFound(token_id)
            })?;

        Ok(NftData {
            token_id,
            owner: owner.to_string(),
            token_uri,
        })
    }

    async fn total_supply(&self) -> Result<u64, ChainError> {
        let contract = INft::new(self.contract_address, &self.provider);

        contract
            .totalSupply()
            .call()
            .await
            .map(|r| r._0.to::<u64>())
            .map_err(|e| ChainError::ProviderError(format!("totalSupply failed: {}", e)))
    }

    async fn token_uri_by_index(&self, index: u64) -> Result<String, ChainError> {
        let contract = INft::new(self.contract_address, &self.provider);

        let token_id = contract
            .tokenByIndex(U256::from(index))
            .call()
            .await
            .map(|r| r._0)
            .map_err(|e| ChainError::ProviderError(format!("tokenByIndex failed: {}", e)))?;

        contract
            .tokenURI(token_id)
            .call()
            .await
            .map(|r| r._0)
            .map_err(|e| {
                debug!(token_id = %token_id, error = %e, "tokenURI failed");
                ChainError::TokenNotFound(token_id.to::<u64>())
            })
    }
}
