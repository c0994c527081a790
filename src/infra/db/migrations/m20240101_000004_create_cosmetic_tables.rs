//! Migration: cosmetics and player wardrobes.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cosmetics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cosmetics::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Cosmetics::Name).string().not_null())
                    .col(ColumnDef::new(Cosmetics::Type).string().not_null())
                    .col(ColumnDef::new(Cosmetics::Model).text().null())
                    .col(ColumnDef::new(Cosmetics::Script).text().null())
                    .col(ColumnDef::new(Cosmetics::PreviewImage).string().null())
                    .to_owned(),
            )
            .await?;

        // No foreign key on cosmetic_id: virtual products are granted by
        // product id before a matching cosmetic row may exist.
        manager
            .create_table(
                Table::create()
                    .table(Wardrobes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Wardrobes::PlayerId).uuid().not_null())
                    .col(ColumnDef::new(Wardrobes::CosmeticId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Wardrobes::Equipped)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .primary_key(
                        Index::create()
                            .col(Wardrobes::PlayerId)
                            .col(Wardrobes::CosmeticId),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Wardrobes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Cosmetics::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Cosmetics {
    Table,
    Id,
    Name,
    Type,
    Model,
    Script,
    PreviewImage,
}

#[derive(Iden)]
enum Wardrobes {
    Table,
    PlayerId,
    CosmeticId,
    Equipped,
}
