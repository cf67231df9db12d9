use sea_orm_migration::prelude::*;

use crate::m20250101_000001_create_table::Reports;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Report history is listed per user, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_reports_user_submitted")
                    .table(Reports::Table)
                    .col(Reports::UserId)
                    .col(Reports::SubmittedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reports_crop")
                    .table(Reports::Table)
                    .col(Reports::CropId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_reports_crop").table(Reports::Table).to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_reports_user_submitted")
                    .table(Reports::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
