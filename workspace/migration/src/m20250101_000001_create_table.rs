use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Username).unique_key())
                    .col(string(Users::Email).unique_key())
                    .col(string(Users::PasswordHash))
                    .col(string_null(Users::PhoneNumber))
                    .col(string_null(Users::County))
                    .col(string_null(Users::FarmName))
                    .col(double_null(Users::FarmSize))
                    .col(boolean(Users::IsExtensionAgent).default(false))
                    .col(timestamp_with_time_zone(Users::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create crops table
        manager
            .create_table(
                Table::create()
                    .table(Crops::Table)
                    .if_not_exists()
                    .col(pk_auto(Crops::Id))
                    .col(string(Crops::Name).unique_key())
                    .col(string_null(Crops::ScientificName))
                    .col(string_null(Crops::BaseRegion))
                    .col(string_null(Crops::CommonNames))
                    .to_owned(),
            )
            .await?;

        // Create diseases table
        manager
            .create_table(
                Table::create()
                    .table(Diseases::Table)
                    .if_not_exists()
                    .col(pk_auto(Diseases::Id))
                    .col(string(Diseases::Name).unique_key())
                    .col(text_null(Diseases::Symptoms))
                    .col(text_null(Diseases::Cause))
                    .col(double_null(Diseases::AiModelAccuracy))
                    .to_owned(),
            )
            .await?;

        // Create treatments table
        manager
            .create_table(
                Table::create()
                    .table(Treatments::Table)
                    .if_not_exists()
                    .col(pk_auto(Treatments::Id))
                    .col(string(Treatments::Name).unique_key())
                    .col(text_null(Treatments::Description))
                    .col(boolean(Treatments::OrganicStatus).default(false))
                    .col(string_null(Treatments::CostEstimate))
                    .to_owned(),
            )
            .await?;

        // Create disease_treatments table (join table with rank)
        manager
            .create_table(
                Table::create()
                    .table(DiseaseTreatments::Table)
                    .if_not_exists()
                    .col(integer(DiseaseTreatments::DiseaseId))
                    .col(integer(DiseaseTreatments::TreatmentId))
                    .col(integer(DiseaseTreatments::PriorityRank).default(1))
                    .primary_key(
                        Index::create()
                            .name("pk_disease_treatments")
                            .col(DiseaseTreatments::DiseaseId)
                            .col(DiseaseTreatments::TreatmentId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_disease_treatments_disease")
                            .from(DiseaseTreatments::Table, DiseaseTreatments::DiseaseId)
                            .to(Diseases::Table, Diseases::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_disease_treatments_treatment")
                            .from(DiseaseTreatments::Table, DiseaseTreatments::TreatmentId)
                            .to(Treatments::Table, Treatments::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create reports table
        manager
            .create_table(
                Table::create()
                    .table(Reports::Table)
                    .if_not_exists()
                    .col(pk_auto(Reports::Id))
                    .col(integer(Reports::UserId))
                    .col(integer(Reports::CropId))
                    .col(integer_null(Reports::DiseaseId))
                    .col(string(Reports::ImageUrl))
                    .col(double(Reports::ConfidenceScore))
                    .col(boolean(Reports::IsHealthy))
                    .col(boolean(Reports::IsAccurate).default(false))
                    .col(text_null(Reports::RecommendedTreatment))
                    .col(text_null(Reports::PreventionTips))
                    .col(timestamp_with_time_zone(Reports::SubmittedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_user")
                            .from(Reports::Table, Reports::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_crop")
                            .from(Reports::Table, Reports::CropId)
                            .to(Crops::Table, Crops::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_disease")
                            .from(Reports::Table, Reports::DiseaseId)
                            .to(Diseases::Table, Diseases::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(Reports::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(DiseaseTreatments::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Treatments::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Diseases::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Crops::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    PhoneNumber,
    County,
    FarmName,
    FarmSize,
    IsExtensionAgent,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Crops {
    Table,
    Id,
    Name,
    ScientificName,
    BaseRegion,
    CommonNames,
}

#[derive(DeriveIden)]
enum Diseases {
    Table,
    Id,
    Name,
    Symptoms,
    Cause,
    AiModelAccuracy,
}

#[derive(DeriveIden)]
enum Treatments {
    Table,
    Id,
    Name,
    Description,
    OrganicStatus,
    CostEstimate,
}

#[derive(DeriveIden)]
enum DiseaseTreatments {
    Table,
    DiseaseId,
    TreatmentId,
    PriorityRank,
}

#[derive(DeriveIden)]
pub(crate) enum Reports {
    Table,
    Id,
    UserId,
    CropId,
    DiseaseId,
    ImageUrl,
    ConfidenceScore,
    IsHealthy,
    IsAccurate,
    RecommendedTreatment,
    PreventionTips,
    SubmittedAt,
}
