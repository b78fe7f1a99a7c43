use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum FeedBatches {
    Table,
    Id,
    BatchDate,
    BatchName,
    BagSizeKg,
    TotalQuantityKg,
    TotalCost,
    TotalBags,
    CostPerBag,
    CostPerKg,
    Revision,
    CreatedAt,
}

#[derive(Iden)]
enum FeedBatchIngredients {
    Table,
    Id,
    BatchId,
    Position,
    Name,
    QuantityKg,
    TotalCost,
    Supplier,
    CostPerKg,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Decimal values are stored as TEXT to keep them exact.
        manager
            .create_table(
                Table::create()
                    .table(FeedBatches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FeedBatches::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FeedBatches::BatchDate).date().not_null())
                    .col(ColumnDef::new(FeedBatches::BatchName).string().not_null())
                    .col(ColumnDef::new(FeedBatches::BagSizeKg).string().not_null())
                    .col(
                        ColumnDef::new(FeedBatches::TotalQuantityKg)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FeedBatches::TotalCost).string().not_null())
                    .col(
                        ColumnDef::new(FeedBatches::TotalBags)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FeedBatches::CostPerBag).string().not_null())
                    .col(ColumnDef::new(FeedBatches::CostPerKg).string().not_null())
                    .col(
                        ColumnDef::new(FeedBatches::Revision)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(FeedBatches::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-feed_batches-batch_date")
                    .table(FeedBatches::Table)
                    .col(FeedBatches::BatchDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FeedBatchIngredients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FeedBatchIngredients::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FeedBatchIngredients::BatchId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FeedBatchIngredients::Position)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FeedBatchIngredients::Name).string().not_null())
                    .col(
                        ColumnDef::new(FeedBatchIngredients::QuantityKg)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FeedBatchIngredients::TotalCost)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FeedBatchIngredients::Supplier).string())
                    .col(
                        ColumnDef::new(FeedBatchIngredients::CostPerKg)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-feed_batch_ingredients-batch_id")
                            .from(FeedBatchIngredients::Table, FeedBatchIngredients::BatchId)
                            .to(FeedBatches::Table, FeedBatches::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-feed_batch_ingredients-batch_id-position")
                    .table(FeedBatchIngredients::Table)
                    .col(FeedBatchIngredients::BatchId)
                    .col(FeedBatchIngredients::Position)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FeedBatchIngredients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FeedBatches::Table).to_owned())
            .await?;
        Ok(())
    }
}
