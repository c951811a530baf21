//! SeaORM Entity for the nfts table
//!
//! One row per mint attempt. Rows are created `pending` before the
//! on-chain call and reconciled to `minted` or `failed` afterwards.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "nfts")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub ipfs_hash: String,
    pub metadata_hash: String,
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

/// Lifecycle of a mint attempt. `Pending` is the only non-terminal
/// state; the legal transitions are `Pending -> Minted` and
/// `Pending -> Failed`, each at most once per row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum MintStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "minted")]
    Minted,
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl MintStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, MintStatus::Minted | MintStatus::Failed)
    }

    pub fn can_transition_to(self, next: MintStatus) -> bool {
        matches!(
            (self, next),
            (MintStatus::Pending, MintStatus::Minted) | (MintStatus::Pending, MintStatus::Failed)
        )
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
