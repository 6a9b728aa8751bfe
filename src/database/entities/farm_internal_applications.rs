//! Stored farm-information answers
//!
//! Scalars get their own columns; each questionnaire answer is kept as a
//! JSON column in the same object-per-option shape the apply form uses.

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::application::FarmInfoInternalApplication;
use crate::errors::{ApplicationError, ApplicationResult};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "farm_internal_applications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub farm_id: i32,

    pub total_acreage: Option<f64>,
    pub acres_in_production: Option<f64>,
    pub gross_income: Option<f64>,
    pub years_farming: Option<i32>,
    #[sea_orm(column_type = "Text")]
    pub main_crops: String,
    #[sea_orm(column_type = "Text")]
    pub field_history: String,

    pub near_contamination_source: Json,
    pub wild_areas: Json,
    pub own_branding: Json,
    pub split_operation: Json,
    pub buffer_zones: Json,
    pub shared_equipment: Json,
    pub livestock_on_farm: Json,
    pub prohibited_substances: Json,
    pub gmo_neighbors: Json,
    pub soil_testing: Json,
    pub greenhouse_production: Json,
    pub previous_certification: Json,
    pub certification_denied: Json,
    pub sewage_sludge_applied: Json,

    pub water_source: Json,
    pub irrigation_method: Json,
    pub pest_control: Json,
    pub seed_source: Json,
    pub fertility_source: Json,
    pub post_harvest_handling: Json,
    pub record_keeping: Json,

    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::farms::Entity",
        from = "Column::FarmId",
        to = "super::farms::Column::Id",
        on_delete = "Cascade"
    )]
    Farm,
}

impl Related<super::farms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Farm.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Answer columns written by an upsert, in storage order
pub const ANSWER_COLUMNS: &[Column] = &[
    Column::TotalAcreage,
    Column::AcresInProduction,
    Column::GrossIncome,
    Column::YearsFarming,
    Column::MainCrops,
    Column::FieldHistory,
    Column::NearContaminationSource,
    Column::WildAreas,
    Column::OwnBranding,
    Column::SplitOperation,
    Column::BufferZones,
    Column::SharedEquipment,
    Column::LivestockOnFarm,
    Column::ProhibitedSubstances,
    Column::GmoNeighbors,
    Column::SoilTesting,
    Column::GreenhouseProduction,
    Column::PreviousCertification,
    Column::CertificationDenied,
    Column::SewageSludgeApplied,
    Column::WaterSource,
    Column::IrrigationMethod,
    Column::PestControl,
    Column::SeedSource,
    Column::FertilitySource,
    Column::PostHarvestHandling,
    Column::RecordKeeping,
    Column::UpdatedAt,
];

impl Model {
    /// Rebuild the typed record, failing if a stored answer no longer parses
    pub fn to_record(&self) -> ApplicationResult<FarmInfoInternalApplication> {
        let mut object = Map::new();
        object.insert("farmId".into(), Value::from(self.farm_id));
        object.insert("totalAcreage".into(), self.total_acreage.into());
        object.insert("acresInProduction".into(), self.acres_in_production.into());
        object.insert("grossIncome".into(), self.gross_income.into());
        object.insert("yearsFarming".into(), self.years_farming.into());
        object.insert("mainCrops".into(), self.main_crops.clone().into());
        object.insert("fieldHistory".into(), self.field_history.clone().into());

        let answers = [
            ("nearContaminationSource", &self.near_contamination_source),
            ("wildAreas", &self.wild_areas),
            ("ownBranding", &self.own_branding),
            ("splitOperation", &self.split_operation),
            ("bufferZones", &self.buffer_zones),
            ("sharedEquipment", &self.shared_equipment),
            ("livestockOnFarm", &self.livestock_on_farm),
            ("prohibitedSubstances", &self.prohibited_substances),
            ("gmoNeighbors", &self.gmo_neighbors),
            ("soilTesting", &self.soil_testing),
            ("greenhouseProduction", &self.greenhouse_production),
            ("previousCertification", &self.previous_certification),
            ("certificationDenied", &self.certification_denied),
            ("sewageSludgeApplied", &self.sewage_sludge_applied),
            ("waterSource", &self.water_source),
            ("irrigationMethod", &self.irrigation_method),
            ("pestControl", &self.pest_control),
            ("seedSource", &self.seed_source),
            ("fertilitySource", &self.fertility_source),
            ("postHarvestHandling", &self.post_harvest_handling),
            ("recordKeeping", &self.record_keeping),
        ];
        for (field, value) in answers {
            object.insert(field.to_string(), value.clone());
        }

        FarmInfoInternalApplication::from_json(&Value::Object(object)).map_err(|errors| {
            ApplicationError::Corrupt(format!(
                "stored application for farm {} is invalid: {}",
                self.farm_id, errors
            ))
        })
    }
}

impl ActiveModel {
    /// Full row for `record`; `id` is left for the database
    pub fn from_record(record: &FarmInfoInternalApplication) -> Self {
        let now = chrono::Utc::now();
        let json = record.to_json();
        let answer = |field: &str| json.get(field).cloned().unwrap_or(Value::Null);

        Self {
            id: ActiveValue::NotSet,
            farm_id: Set(record.farm_id),
            total_acreage: Set(record.total_acreage),
            acres_in_production: Set(record.acres_in_production),
            gross_income: Set(record.gross_income),
            years_farming: Set(record.years_farming),
            main_crops: Set(record.main_crops.clone()),
            field_history: Set(record.field_history.clone()),
            near_contamination_source: Set(answer("nearContaminationSource")),
            wild_areas: Set(answer("wildAreas")),
            own_branding: Set(answer("ownBranding")),
            split_operation: Set(answer("splitOperation")),
            buffer_zones: Set(answer("bufferZones")),
            shared_equipment: Set(answer("sharedEquipment")),
            livestock_on_farm: Set(answer("livestockOnFarm")),
            prohibited_substances: Set(answer("prohibitedSubstances")),
            gmo_neighbors: Set(answer("gmoNeighbors")),
            soil_testing: Set(answer("soilTesting")),
            greenhouse_production: Set(answer("greenhouseProduction")),
            previous_certification: Set(answer("previousCertification")),
            certification_denied: Set(answer("certificationDenied")),
            sewage_sludge_applied: Set(answer("sewageSludgeApplied")),
            water_source: Set(answer("waterSource")),
            irrigation_method: Set(answer("irrigationMethod")),
            pest_control: Set(answer("pestControl")),
            seed_source: Set(answer("seedSource")),
            fertility_source: Set(answer("fertilitySource")),
            post_harvest_handling: Set(answer("postHarvestHandling")),
            record_keeping: Set(answer("recordKeeping")),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{WaterSource, YesNo};

    #[test]
    fn test_active_model_carries_answers_as_json() {
        let mut record = FarmInfoInternalApplication::new(5);
        record.wild_areas = YesNo::Yes("hedgerow".to_string());
        record.water_source = WaterSource::Well;

        let active = ActiveModel::from_record(&record);
        match active.wild_areas {
            ActiveValue::Set(value) => {
                assert_eq!(value["yes"]["description"], "hedgerow");
            }
            other => panic!("unexpected {:?}", other),
        }
        match active.water_source {
            ActiveValue::Set(value) => assert_eq!(value["well"], true),
            other => panic!("unexpected {:?}", other),
        }
    }
}
