//! Mint record store
//!
//! Persistence for mint attempts. Records are inserted `pending` and
//! moved to exactly one terminal state; the transition check lives
//! here so no caller can skip it.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;

use crate::entities::nfts::{self, MintStatus};
use crate::entities::prelude::Nfts;

/// Fields supplied when a mint attempt is first recorded
#[derive(Debug, Clone)]
pub struct NewMintRecord {
    pub name: String,
    pub description: Option<String>,
    pub ipfs_hash: String,
    pub metadata_hash: String,
    pub owner_address: String,
    pub user_id: Option<String>,
    pub network: String,
    pub contract_address: String,
}

/// Error types for store operations
#[derive(Debug)]
pub enum StoreError {
    Database(DbErr),
    NotFound(i32),
    IllegalTransition {
        id: i32,
        from: MintStatus,
        to: MintStatus,
    },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Database(e) => write!(f, "Database error: {}", e),
            StoreError::NotFound(id) => write!(f, "Record {} not found", id),
            StoreError::IllegalTransition { id, from, to } => {
                write!(f, "Record {}: illegal transition {:?} -> {:?}", id, from, to)
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<DbErr> for StoreError {
    fn from(e: DbErr) -> Self {
        StoreError::Database(e)
    }
}

#[derive(Clone)]
pub struct NftStore {
    db: DatabaseConnection,
}

impl NftStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert a new record; status is always forced to pending
    pub async fn create_pending(&self, fields: NewMintRecord) -> Result<nfts::Model, StoreError> {
        let record = nfts::ActiveModel {
            name: Set(fields.name),
            description: Set(fields.description),
            ipfs_hash: Set(fields.ipfs_hash),
            metadata_hash: Set(fields.metadata_hash),
            owner_address: Set(fields.owner_address),
            user_id: Set(fields.user_id),
            network: Set(fields.network),
            contract_address: Set(fields.contract_address),
            status: Set(MintStatus::Pending),
            created_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(id = record.id, owner = %record.owner_address, "Mint record created");
        Ok(record)
    }

    /// Move a pending record to minted, attaching the confirmed
    /// blockchain data
    pub async fn mark_minted(
        &self,
        id: i32,
        token_id: i64,
        transaction_hash: String,
        block_number: i64,
    ) -> Result<nfts::Model, StoreError> {
        let record = self.load_for_transition(id, MintStatus::Minted).await?;

        let mut active: nfts::ActiveModel = record.into();
        active.status = Set(MintStatus::Minted);
        active.token_id = Set(Some(token_id));
        active.transaction_hash = Set(Some(transaction_hash));
        active.block_number = Set(Some(block_number));
        active.minted_at = Set(Some(Utc::now().fixed_offset()));

        let updated = active.update(&self.db).await?;
        info!(id = id, token_id = token_id, "Mint record marked minted");
        Ok(updated)
    }

    /// Move a pending record to failed; blockchain fields stay empty
    pub async fn mark_failed(&self, id: i32) -> Result<nfts::Model, StoreError> {
        let record = self.load_for_transition(id, MintStatus::Failed).await?;

        let mut active: nfts::ActiveModel = record.into();
        active.status = Set(MintStatus::Failed);

        let updated = active.update(&self.db).await?;
        info!(id = id, "Mint record marked failed");
        Ok(updated)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<nfts::Model>, StoreError> {
        Ok(Nfts::find_by_id(id).one(&self.db).await?)
    }

    pub async fn find_by_owner(&self, owner: &str) -> Result<Vec<nfts::Model>, StoreError> {
        Ok(Nfts::find()
            .filter(nfts::Column::OwnerAddress.eq(owner))
            .order_by_desc(nfts::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    pub async fn find_by_uploader(&self, user_id: &str) -> Result<Vec<nfts::Model>, StoreError> {
        Ok(Nfts::find()
            .filter(nfts::Column::UserId.eq(user_id))
            .order_by_desc(nfts::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    pub async fn list_all(&self) -> Result<Vec<nfts::Model>, StoreError> {
        Ok(Nfts::find()
            .order_by_desc(nfts::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn load_for_transition(
        &self,
        id: i32,
        to: MintStatus,
    ) -> Result<nfts::Model, StoreError> {
        let record = Nfts::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(StoreError::NotFound(id))?;

        if !record.status.can_transition_to(to) {
            return Err(StoreError::IllegalTransition {
                id,
                from: record.status,
                to,
            });
        }

        Ok(record)
    }
}
