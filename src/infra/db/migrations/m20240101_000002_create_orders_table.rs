//! Migration: orders.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Orders::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Orders::Uuid).uuid().null())
                    .col(
                        ColumnDef::new(Orders::Cart)
                            .array(ColumnType::BigInteger)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Orders::Destination).string().not_null())
                    .col(ColumnDef::new(Orders::Phone).string().not_null())
                    .col(ColumnDef::new(Orders::Email).string().not_null())
                    .col(ColumnDef::new(Orders::Status).string().not_null())
                    .col(ColumnDef::new(Orders::Transaction).string().null())
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Orders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_uuid")
                    .table(Orders::Table)
                    .col(Orders::Uuid)
                    .to_owned(),
            )
            .await?;

        // A checkout session pays for at most one order
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_transaction")
                    .table(Orders::Table)
                    .col(Orders::Transaction)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Orders {
    Table,
    Id,
    Uuid,
    Cart,
    Destination,
    Phone,
    Email,
    Status,
    Transaction,
    CreatedAt,
    UpdatedAt,
}
