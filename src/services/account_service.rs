use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::database::entities::{farm_certificates, farm_locations, farms, management_zones};
use crate::errors::{AccountError, AccountResult, ValidationErrors};
use crate::services::{Identity, ValidationService};

/// Farm profile as shown on the account page
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FarmData {
    #[schema(value_type = Object)]
    pub farm: farms::Model,
    #[schema(value_type = Option<Object>)]
    pub location: Option<farm_locations::Model>,
    #[schema(value_type = Vec<Object>)]
    pub certificates: Vec<farm_certificates::Model>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationInput {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub county: Option<String>,
}

/// General-business tab of the apply form
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneralBusinessInput {
    pub name: String,
    pub legal_name: Option<String>,
    pub business_structure: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub location: Option<LocationInput>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateInput {
    pub certifier: String,
    pub certificate_number: String,
    pub valid_until: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZoneInput {
    pub name: String,
    pub acreage: Option<f64>,
    pub crop: Option<String>,
    pub notes: Option<String>,
}

const BUSINESS_STRUCTURES: &[&str] = &[
    "sole_proprietorship",
    "partnership",
    "llc",
    "corporation",
    "cooperative",
    "nonprofit",
];

impl GeneralBusinessInput {
    fn validate(&self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let name = ValidationService::required_text(&mut errors, "name", &self.name, 200);
        let legal_name = ValidationService::optional_text(
            &mut errors,
            "legalName",
            self.legal_name.as_deref(),
            200,
        );
        let business_structure = ValidationService::optional_text(
            &mut errors,
            "businessStructure",
            self.business_structure.as_deref(),
            64,
        );
        if let Some(structure) = &business_structure {
            if !BUSINESS_STRUCTURES.contains(&structure.as_str()) {
                errors.add_field(
                    "businessStructure",
                    format!("must be one of: {}", BUSINESS_STRUCTURES.join(", ")),
                );
            }
        }
        let phone = ValidationService::phone(&mut errors, "phone", self.phone.as_deref());
        let website = ValidationService::website(&mut errors, "website", self.website.as_deref());

        let location = self.location.as_ref().map(|location| {
            let mut nested = ValidationErrors::default();
            let cleaned = LocationInput {
                street: ValidationService::required_text(&mut nested, "street", &location.street, 200),
                city: ValidationService::required_text(&mut nested, "city", &location.city, 100),
                state: ValidationService::required_text(&mut nested, "state", &location.state, 50),
                zip: ValidationService::zip(&mut nested, "zip", &location.zip),
                county: ValidationService::optional_text(
                    &mut nested,
                    "county",
                    location.county.as_deref(),
                    100,
                ),
            };
            errors.nest("location", nested);
            cleaned
        });

        errors.into_result(Self {
            name,
            legal_name,
            business_structure,
            phone,
            website,
            location,
        })
    }
}

impl ZoneInput {
    fn validate(&self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let zone = Self {
            name: ValidationService::required_text(&mut errors, "name", &self.name, 100),
            acreage: ValidationService::non_negative(&mut errors, "acreage", self.acreage),
            crop: ValidationService::optional_text(&mut errors, "crop", self.crop.as_deref(), 100),
            notes: ValidationService::optional_text(
                &mut errors,
                "notes",
                self.notes.as_deref(),
                2000,
            ),
        };
        errors.into_result(zone)
    }
}

/// Farm profile, certificates and management zones
#[derive(Clone, Debug)]
pub struct AccountService {
    db: DatabaseConnection,
}

impl AccountService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The caller's farm with its location and certificates; `None` without a farm
    pub async fn get_farm_data(&self, identity: &Identity) -> AccountResult<Option<FarmData>> {
        let Some(farm_id) = identity.farm_id else {
            return Ok(None);
        };
        self.farm_data(farm_id).await.map(Some)
    }

    async fn farm_data(&self, farm_id: i32) -> AccountResult<FarmData> {
        let farm = farms::Entity::find_by_id(farm_id)
            .one(&self.db)
            .await?
            .ok_or(AccountError::FarmNotFound(farm_id))?;
        let location = farm_locations::Entity::find()
            .filter(farm_locations::Column::FarmId.eq(farm_id))
            .one(&self.db)
            .await?;
        let certificates = farm_certificates::Entity::find()
            .filter(farm_certificates::Column::FarmId.eq(farm_id))
            .order_by_asc(farm_certificates::Column::Id)
            .all(&self.db)
            .await?;
        Ok(FarmData {
            farm,
            location,
            certificates,
        })
    }

    /// Update the farm's business details and upsert its location
    pub async fn save_general_business(
        &self,
        identity: &Identity,
        input: &GeneralBusinessInput,
    ) -> AccountResult<FarmData> {
        let farm_id = identity.require_farm()?;
        let input = input.validate()?;

        let farm = farms::Entity::find_by_id(farm_id)
            .one(&self.db)
            .await?
            .ok_or(AccountError::FarmNotFound(farm_id))?;
        let now = Utc::now();

        let mut farm: farms::ActiveModel = farm.into();
        farm.name = Set(input.name);
        farm.legal_name = Set(input.legal_name);
        farm.business_structure = Set(input.business_structure);
        farm.phone = Set(input.phone);
        farm.website = Set(input.website);
        farm.updated_at = Set(now);
        farm.update(&self.db).await?;

        if let Some(location) = input.location {
            let row = farm_locations::ActiveModel {
                farm_id: Set(farm_id),
                street: Set(location.street),
                city: Set(location.city),
                state: Set(location.state),
                zip: Set(location.zip),
                county: Set(location.county),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            farm_locations::Entity::insert(row)
                .on_conflict(
                    OnConflict::column(farm_locations::Column::FarmId)
                        .update_columns([
                            farm_locations::Column::Street,
                            farm_locations::Column::City,
                            farm_locations::Column::State,
                            farm_locations::Column::Zip,
                            farm_locations::Column::County,
                            farm_locations::Column::UpdatedAt,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(&self.db)
                .await?;
        }

        info!(farm_id, user_id = identity.id, "saved general business details");
        self.farm_data(farm_id).await
    }

    pub async fn add_certificate(
        &self,
        identity: &Identity,
        input: &CertificateInput,
    ) -> AccountResult<farm_certificates::Model> {
        let farm_id = identity.require_farm()?;
        let mut errors = ValidationErrors::default();
        let certifier =
            ValidationService::required_text(&mut errors, "certifier", &input.certifier, 200);
        let certificate_number = ValidationService::required_text(
            &mut errors,
            "certificateNumber",
            &input.certificate_number,
            100,
        );
        errors.into_result(())?;

        let now = Utc::now();
        let certificate = farm_certificates::ActiveModel {
            farm_id: Set(farm_id),
            certifier: Set(certifier),
            certificate_number: Set(certificate_number),
            valid_until: Set(input.valid_until),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        Ok(certificate)
    }

    pub async fn delete_certificate(&self, identity: &Identity, id: i32) -> AccountResult<()> {
        let farm_id = identity.require_farm()?;
        let result = farm_certificates::Entity::delete_many()
            .filter(farm_certificates::Column::Id.eq(id))
            .filter(farm_certificates::Column::FarmId.eq(farm_id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AccountError::CertificateNotFound(id));
        }
        Ok(())
    }

    /// Management zones of the caller's farm; empty without a farm
    pub async fn get_account_management_data(
        &self,
        identity: &Identity,
    ) -> AccountResult<Vec<management_zones::Model>> {
        let Some(farm_id) = identity.farm_id else {
            return Ok(Vec::new());
        };
        Ok(management_zones::Entity::find()
            .filter(management_zones::Column::FarmId.eq(farm_id))
            .order_by_asc(management_zones::Column::Name)
            .all(&self.db)
            .await?)
    }

    pub async fn create_zone(
        &self,
        identity: &Identity,
        input: &ZoneInput,
    ) -> AccountResult<management_zones::Model> {
        let farm_id = identity.require_farm()?;
        let input = input.validate()?;
        let now = Utc::now();
        let zone = management_zones::ActiveModel {
            farm_id: Set(farm_id),
            name: Set(input.name),
            acreage: Set(input.acreage),
            crop: Set(input.crop),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        info!(farm_id, zone_id = zone.id, "created management zone");
        Ok(zone)
    }

    /// Zones belonging to other farms are reported as not found
    pub async fn update_zone(
        &self,
        identity: &Identity,
        id: i32,
        input: &ZoneInput,
    ) -> AccountResult<management_zones::Model> {
        let farm_id = identity.require_farm()?;
        let input = input.validate()?;
        let zone = management_zones::Entity::find_by_id(id)
            .filter(management_zones::Column::FarmId.eq(farm_id))
            .one(&self.db)
            .await?
            .ok_or(AccountError::ZoneNotFound(id))?;

        let mut zone: management_zones::ActiveModel = zone.into();
        zone.name = Set(input.name);
        zone.acreage = Set(input.acreage);
        zone.crop = Set(input.crop);
        zone.notes = Set(input.notes);
        zone.updated_at = Set(Utc::now());
        Ok(zone.update(&self.db).await?)
    }
}
