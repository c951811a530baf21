use sea_orm::entity::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};

use crate::entities::nfts::{self, MintStatus};
use crate::services::pinning::PinningClient;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A mint record as returned by the API, enriched with gateway URLs
/// derived from the stored CIDs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub ipfs_hash: String,
    pub metadata_hash: String,
    pub image_url: String,
    pub metadata_url: String,
    pub owner_address: String,
    pub user_id: Option<String>,
    pub token_id: Option<i64>,
    pub transaction_hash: Option<String>,
    pub block_number: Option<i64>,
    pub network: String,
    pub contract_address: String,
    pub status: MintStatus,
    pub minted_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

impl NftResponse {
    pub fn from_model(model: nfts::Model, pinning: &dyn PinningClient) -> Self {
        let image_url = pinning.gateway_url(&model.ipfs_hash);
        let metadata_url = pinning.gateway_url(&model.metadata_hash);

        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            ipfs_hash: model.ipfs_hash,
            metadata_hash: model.metadata_hash,
            image_url,
            metadata_url,
            owner_address: model.owner_address,
            user_id: model.user_id,
            token_id: model.token_id,
            transaction_hash: model.transaction_hash,
            block_number: model.block_number,
            network: model.network,
            contract_address: model.contract_address,
            status: model.status,
            minted_at: model.minted_at,
            created_at: model.created_at,
        }
    }
}

/// Body for POST /api/nft/mint (mint against already-pinned content)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintRequestBody {
    pub name: String,
    pub description: Option<String>,
    pub ipfs_hash: String,
    pub owner_address: String,
    pub attributes: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintSuccessResponse {
    pub success: bool,
    pub nft: NftResponse,
}

/// Returned when pinning succeeded but the chain call failed; the CIDs
/// let the caller retry minting without re-uploading
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintFailureResponse {
    pub success: bool,
    pub error: String,
    pub ipfs_hash: String,
    pub metadata_hash: String,
    pub nft: NftResponse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidateAddressRequest {
    pub address: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateAddressResponse {
    pub address: String,
    pub is_valid: bool,
}

/// Single-record view, enriched with live chain state when available
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NftDetailResponse {
    pub nft: NftResponse,
    pub current_owner: Option<String>,
    pub token_uri: Option<String>,
}

/// One entry from on-chain enumeration
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainTokenEntry {
    pub token_uri: String,
    pub metadata: Option<serde_json::Value>,
}
