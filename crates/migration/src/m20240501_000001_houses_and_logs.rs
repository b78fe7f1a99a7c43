use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Houses {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum DailyLogs {
    Table,
    Id,
    LogDate,
    HouseId,
    EggsTotal,
    EggsGradeA,
    EggsGradeB,
    EggsGradeC,
    FeedConsumedKg,
    MortalityCount,
    Notes,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Houses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Houses::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Houses::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DailyLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyLogs::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DailyLogs::LogDate).date().not_null())
                    .col(ColumnDef::new(DailyLogs::HouseId).string().not_null())
                    .col(ColumnDef::new(DailyLogs::EggsTotal).big_integer())
                    .col(ColumnDef::new(DailyLogs::EggsGradeA).big_integer())
                    .col(ColumnDef::new(DailyLogs::EggsGradeB).big_integer())
                    .col(ColumnDef::new(DailyLogs::EggsGradeC).big_integer())
                    .col(
                        ColumnDef::new(DailyLogs::FeedConsumedKg)
                            .string()
                            .not_null()
                            .default("0"),
                    )
                    .col(
                        ColumnDef::new(DailyLogs::MortalityCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(DailyLogs::Notes).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-daily_logs-house_id")
                            .from(DailyLogs::Table, DailyLogs::HouseId)
                            .to(Houses::Table, Houses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-daily_logs-log_date-house_id")
                    .table(DailyLogs::Table)
                    .col(DailyLogs::LogDate)
                    .col(DailyLogs::HouseId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DailyLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Houses::Table).to_owned())
            .await?;
        Ok(())
    }
}
