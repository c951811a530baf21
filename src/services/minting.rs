//! Mint orchestrator
//!
//! Sequences one mint attempt: validate the destination address, pin
//! the image and derived metadata JSON, persist a pending record, then
//! mint on-chain and reconcile the record to a terminal status.
//!
//! Failures before the record exists leave no trace (pinning is cheap
//! to redo). The record is created before the chain call on purpose:
//! when minting fails, the row keeps the CIDs of already-pinned
//! content so a retry can skip the uploads.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::entities::nfts;
use crate::services::address::is_valid_address;
use crate::services::chain::{ChainClient, ChainError};
use crate::services::pinning::{PinningClient, PinningError};
use crate::services::store::{NewMintRecord, NftStore, StoreError};

/// Image input for a mint attempt: fresh bytes to pin, or a CID the
/// caller already pinned (the re-mint path after a chain failure)
#[derive(Debug, Clone)]
pub enum ImageSource {
    Bytes(Vec<u8>),
    PinnedCid(String),
}

#[derive(Debug, Clone)]
pub struct MintRequest {
    pub name: String,
    pub description: Option<String>,
    pub image: ImageSource,
    pub owner_address: String,
    pub uploader_id: Option<String>,
    pub attributes: Option<serde_json::Value>,
}

/// Error types for the mint flow
#[derive(Debug)]
pub enum MintError {
    InvalidAddress(String),
    Pinning(PinningError),
    /// Minting failed after pinning and persistence; the failed record
    /// carries the CIDs so the caller can retry without re-uploading
    Chain {
        record: nfts::Model,
        source: ChainError,
    },
    Store(StoreError),
}

impl std::fmt::Display for MintError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MintError::InvalidAddress(addr) => write!(f, "Invalid owner address: {}", addr),
            MintError::Pinning(e) => write!(f, "IPFS pinning failed: {}", e),
            MintError::Chain { source, .. } => write!(f, "Minting failed: {}", source),
            MintError::Store(e) => write!(f, "Record store error: {}", e),
        }
    }
}

impl std::error::Error for MintError {}

impl From<PinningError> for MintError {
    fn from(e: PinningError) -> Self {
        MintError::Pinning(e)
    }
}

impl From<StoreError> for MintError {
    fn from(e: StoreError) -> Self {
        MintError::Store(e)
    }
}

pub struct MintOrchestrator {
    pinning: Arc<dyn PinningClient>,
    chain: Arc<dyn ChainClient>,
    store: NftStore,
    contract_address: String,
    network: String,
}

impl MintOrchestrator {
    pub fn new(
        pinning: Arc<dyn PinningClient>,
        chain: Arc<dyn ChainClient>,
        store: NftStore,
        contract_address: String,
        network: String,
    ) -> Self {
        Self {
            pinning,
            chain,
            store,
            contract_address,
            network,
        }
    }

    /// Run one mint attempt end to end. On success the returned record
    /// is terminal `minted`; a chain failure returns
    /// `MintError::Chain` with the terminal `failed` record.
    pub async fn mint_nft(&self, request: MintRequest) -> Result<nfts::Model, MintError> {
        if !is_valid_address(&request.owner_address) {
            return Err(MintError::InvalidAddress(request.owner_address));
        }

        // Pin the image (or accept content the caller already pinned)
        let image_cid = match request.image {
            ImageSource::PinnedCid(cid) => cid,
            ImageSource::Bytes(bytes) => {
                let mut key_values = vec![("name".to_string(), request.name.clone())];
                if let Some(description) = &request.description {
                    key_values.push(("description".to_string(), description.clone()));
                }
                self.pinning
                    .pin_file(bytes, &request.name, key_values)
                    .await?
            }
        };

        // Metadata document pointing at the pinned image
        let mut metadata = serde_json::Map::new();
        metadata.insert("name".into(), request.name.clone().into());
        if let Some(description) = &request.description {
            metadata.insert("description".into(), description.clone().into());
        }
        metadata.insert("image".into(), self.pinning.gateway_url(&image_cid).into());
        if let Some(attributes) = &request.attributes {
            metadata.insert("attributes".into(), attributes.clone());
        }

        let metadata_cid = self
            .pinning
            .pin_json(&serde_json::Value::Object(metadata))
            .await?;

        // Durability checkpoint: from here the attempt always reaches
        // a terminal status
        let record = self
            .store
            .create_pending(NewMintRecord {
                name: request.name,
                description: request.description,
                ipfs_hash: image_cid,
                metadata_hash: metadata_cid.clone(),
                owner_address: request.owner_address.clone(),
                user_id: request.uploader_id,
                network: self.network.clone(),
                contract_address: self.contract_address.clone(),
            })
            .await?;

        let token_uri = self.pinning.gateway_url(&metadata_cid);

        match self
            .chain
            .mint(&request.owner_address, &token_uri)
            .await
        {
            Ok(minted) => {
                let updated = self
                    .store
                    .mark_minted(
                        record.id,
                        minted.token_id as i64,
                        minted.transaction_hash,
                        minted.block_number as i64,
                    )
                    .await?;
                info!(id = updated.id, token_id = minted.token_id, "Mint completed");
                Ok(updated)
            }
            Err(source) => {
                warn!(id = record.id, error = %source, "Chain mint failed, marking record failed");
                let failed = match self.store.mark_failed(record.id).await {
                    Ok(failed) => failed,
                    Err(store_err) => {
                        // The record is still pending in the store;
                        // surface the store error rather than losing it
                        error!(
                            id = record.id,
                            error = %store_err,
                            "Failed to reconcile record after chain failure"
                        );
                        return Err(MintError::Store(store_err));
                    }
                };
                Err(MintError::Chain {
                    record: failed,
                    source,
                })
            }
        }
    }
}
