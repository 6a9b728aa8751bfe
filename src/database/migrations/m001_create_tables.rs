use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Farms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Farms::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Farms::Name).string().not_null())
                    .col(ColumnDef::new(Farms::LegalName).string().null())
                    .col(ColumnDef::new(Farms::BusinessStructure).string().null())
                    .col(ColumnDef::new(Farms::Phone).string().null())
                    .col(ColumnDef::new(Farms::Website).string().null())
                    .col(ColumnDef::new(Farms::Approved).boolean().not_null().default(false))
                    .col(ColumnDef::new(Farms::TermsAcceptedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Farms::ApplicationSubmittedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Farms::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Farms::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FarmLocations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FarmLocations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FarmLocations::FarmId).integer().not_null().unique_key())
                    .col(ColumnDef::new(FarmLocations::Street).string().not_null())
                    .col(ColumnDef::new(FarmLocations::City).string().not_null())
                    .col(ColumnDef::new(FarmLocations::State).string().not_null())
                    .col(ColumnDef::new(FarmLocations::Zip).string().not_null())
                    .col(ColumnDef::new(FarmLocations::County).string().null())
                    .col(ColumnDef::new(FarmLocations::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(FarmLocations::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_farm_locations_farm_id")
                            .from(FarmLocations::Table, FarmLocations::FarmId)
                            .to(Farms::Table, Farms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FarmCertificates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FarmCertificates::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FarmCertificates::FarmId).integer().not_null())
                    .col(ColumnDef::new(FarmCertificates::Certifier).string().not_null())
                    .col(ColumnDef::new(FarmCertificates::CertificateNumber).string().not_null())
                    .col(ColumnDef::new(FarmCertificates::ValidUntil).date().null())
                    .col(ColumnDef::new(FarmCertificates::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(FarmCertificates::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_farm_certificates_farm_id")
                            .from(FarmCertificates::Table, FarmCertificates::FarmId)
                            .to(Farms::Table, Farms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        let mut applications = Table::create();
        applications
            .table(FarmInternalApplications::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(FarmInternalApplications::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(
                ColumnDef::new(FarmInternalApplications::FarmId)
                    .integer()
                    .not_null()
                    .unique_key(),
            )
            .col(ColumnDef::new(FarmInternalApplications::TotalAcreage).double().null())
            .col(ColumnDef::new(FarmInternalApplications::AcresInProduction).double().null())
            .col(ColumnDef::new(FarmInternalApplications::GrossIncome).double().null())
            .col(ColumnDef::new(FarmInternalApplications::YearsFarming).integer().null())
            .col(ColumnDef::new(FarmInternalApplications::MainCrops).text().not_null().default(""))
            .col(ColumnDef::new(FarmInternalApplications::FieldHistory).text().not_null().default(""));
        for answer in FarmInternalApplications::ANSWERS {
            applications.col(ColumnDef::new(answer).json().not_null());
        }
        applications
            .col(ColumnDef::new(FarmInternalApplications::CreatedAt).timestamp_with_time_zone().not_null())
            .col(ColumnDef::new(FarmInternalApplications::UpdatedAt).timestamp_with_time_zone().not_null())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_farm_internal_applications_farm_id")
                    .from(FarmInternalApplications::Table, FarmInternalApplications::FarmId)
                    .to(Farms::Table, Farms::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            );
        manager.create_table(applications.to_owned()).await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null().default("member"))
                    .col(ColumnDef::new(Users::FarmId).integer().null())
                    .col(ColumnDef::new(Users::Approved).boolean().not_null().default(false))
                    .col(ColumnDef::new(Users::PasswordHash).string().null())
                    .col(ColumnDef::new(Users::InviteTokenHash).string().null())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_farm_id")
                            .from(Users::Table, Users::FarmId)
                            .to(Farms::Table, Farms::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ManagementZones::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ManagementZones::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ManagementZones::FarmId).integer().not_null())
                    .col(ColumnDef::new(ManagementZones::Name).string().not_null())
                    .col(ColumnDef::new(ManagementZones::Acreage).double().null())
                    .col(ColumnDef::new(ManagementZones::Crop).string().null())
                    .col(ColumnDef::new(ManagementZones::Notes).text().null())
                    .col(ColumnDef::new(ManagementZones::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(ManagementZones::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_management_zones_farm_id")
                            .from(ManagementZones::Table, ManagementZones::FarmId)
                            .to(Farms::Table, Farms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_farm_id")
                    .table(Users::Table)
                    .col(Users::FarmId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_management_zones_farm_id")
                    .table(ManagementZones::Table)
                    .col(ManagementZones::FarmId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ManagementZones::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FarmInternalApplications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FarmCertificates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FarmLocations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Farms::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Farms {
    Table,
    Id,
    Name,
    LegalName,
    BusinessStructure,
    Phone,
    Website,
    Approved,
    TermsAcceptedAt,
    ApplicationSubmittedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum FarmLocations {
    Table,
    Id,
    FarmId,
    Street,
    City,
    State,
    Zip,
    County,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum FarmCertificates {
    Table,
    Id,
    FarmId,
    Certifier,
    CertificateNumber,
    ValidUntil,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum FarmInternalApplications {
    Table,
    Id,
    FarmId,
    TotalAcreage,
    AcresInProduction,
    GrossIncome,
    YearsFarming,
    MainCrops,
    FieldHistory,
    NearContaminationSource,
    WildAreas,
    OwnBranding,
    SplitOperation,
    BufferZones,
    SharedEquipment,
    LivestockOnFarm,
    ProhibitedSubstances,
    GmoNeighbors,
    SoilTesting,
    GreenhouseProduction,
    PreviousCertification,
    CertificationDenied,
    SewageSludgeApplied,
    WaterSource,
    IrrigationMethod,
    PestControl,
    SeedSource,
    FertilitySource,
    PostHarvestHandling,
    RecordKeeping,
    CreatedAt,
    UpdatedAt,
}

impl FarmInternalApplications {
    const ANSWERS: [Self; 21] = [
        Self::NearContaminationSource,
        Self::WildAreas,
        Self::OwnBranding,
        Self::SplitOperation,
        Self::BufferZones,
        Self::SharedEquipment,
        Self::LivestockOnFarm,
        Self::ProhibitedSubstances,
        Self::GmoNeighbors,
        Self::SoilTesting,
        Self::GreenhouseProduction,
        Self::PreviousCertification,
        Self::CertificationDenied,
        Self::SewageSludgeApplied,
        Self::WaterSource,
        Self::IrrigationMethod,
        Self::PestControl,
        Self::SeedSource,
        Self::FertilitySource,
        Self::PostHarvestHandling,
        Self::RecordKeeping,
    ];
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    Name,
    Role,
    FarmId,
    Approved,
    PasswordHash,
    InviteTokenHash,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ManagementZones {
    Table,
    Id,
    FarmId,
    Name,
    Acreage,
    Crop,
    Notes,
    CreatedAt,
    UpdatedAt,
}
