//! Migration to create the nfts table for tracking mint attempts

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Nfts::Table)
                    .if_not_exists()
                    .col(pk_auto(Nfts::Id))
                    .col(string(Nfts::Name).not_null())
                    .col(text_null(Nfts::Description))
                    .col(string(Nfts::IpfsHash).not_null())
                    .col(string(Nfts::MetadataHash).not_null())
                    .col(string(Nfts::OwnerAddress).not_null())
                    .col(string_null(Nfts::UserId))
                    .col(big_integer_null(Nfts::TokenId))
                    .col(string_null(Nfts::TransactionHash))
                    .col(big_integer_null(Nfts::BlockNumber))
                    .col(string(Nfts::Network).not_null())
                    .col(string(Nfts::ContractAddress).not_null())
                    .col(string(Nfts::Status).not_null())
                    .col(timestamp_with_time_zone_null(Nfts::MintedAt))
                    .col(
                        timestamp_with_time_zone(Nfts::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index for querying by owner wallet
        manager
            .create_index(
                Index::create()
                    .name("idx_nfts_owner_address")
                    .table(Nfts::Table)
                    .col(Nfts::OwnerAddress)
                    .to_owned(),
            )
            .await?;

        // Index for querying by uploader
        manager
            .create_index(
                Index::create()
                    .name("idx_nfts_user_id")
                    .table(Nfts::Table)
                    .col(Nfts::UserId)
                    .to_owned(),
            )
            .await?;

        // Index for querying by status (pending reconciliation)
        manager
            .create_index(
                Index::create()
                    .name("idx_nfts_status")
                    .table(Nfts::Table)
                    .col(Nfts::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Nfts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Nfts {
    Table,
    Id,
    Name,
    Description,
    IpfsHash,
    MetadataHash,
    OwnerAddress,
    UserId,
    TokenId,
    TransactionHash,
    BlockNumber,
    Network,
    ContractAddress,
    Status,
    MintedAt,
    CreatedAt,
}
