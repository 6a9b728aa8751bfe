use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "farms")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub legal_name: Option<String>,
    pub business_structure: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub approved: bool,
    pub terms_accepted_at: Option<ChronoDateTimeUtc>,
    pub application_submitted_at: Option<ChronoDateTimeUtc>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::farm_locations::Entity")]
    FarmLocation,
    #[sea_orm(has_many = "super::farm_certificates::Entity")]
    FarmCertificates,
    #[sea_orm(has_one = "super::farm_internal_applications::Entity")]
    InternalApplication,
    #[sea_orm(has_many = "super::users::Entity")]
    Users,
    #[sea_orm(has_many = "super::management_zones::Entity")]
    ManagementZones,
}

impl Related<super::farm_locations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FarmLocation.def()
    }
}

impl Related<super::farm_certificates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FarmCertificates.def()
    }
}

impl Related<super::farm_internal_applications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InternalApplication.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::management_zones::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ManagementZones.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_submitted(&self) -> bool {
        self.application_submitted_at.is_some()
    }

    /// Fields still blocking the general-business tab (location checked separately)
    pub fn missing_business_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name".to_string());
        }
        let optional = [
            ("legalName", &self.legal_name),
            ("businessStructure", &self.business_structure),
            ("phone", &self.phone),
        ];
        for (field, value) in optional {
            if value.as_deref().map_or(true, |v| v.trim().is_empty()) {
                missing.push(field.to_string());
            }
        }
        missing
    }
}

impl ActiveModel {
    pub fn new(name: impl Into<String>) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: ActiveValue::NotSet,
            name: Set(name.into()),
            legal_name: Set(None),
            business_structure: Set(None),
            phone: Set(None),
            website: Set(None),
            approved: Set(false),
            terms_accepted_at: Set(None),
            application_submitted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}
