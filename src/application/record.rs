//! The farm-information answer record
//!
//! [`FarmInfoInternalApplication`] maps one-to-one onto a
//! `farm_internal_applications` row. JSON in and out uses the apply form's
//! camelCase field names; parsing goes through [`FarmInfoInternalApplication::from_json`]
//! so every problem is reported against its field path.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::choice::{from_wire, AnswerSummary, Choice, YesNo};
use super::questions::{
    FertilitySource, IrrigationMethod, PestControl, PostHarvestHandling, RecordKeeping,
    SeedSource, WaterSource,
};
use crate::errors::ValidationErrors;

/// Longest free-text scalar answer
pub const MAX_TEXT_LEN: usize = 5000;

/// Keys the server manages; accepted on input and ignored
const SERVER_MANAGED: &[&str] = &["id", "createdAt", "updatedAt"];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmInfoInternalApplication {
    pub farm_id: i32,

    pub total_acreage: Option<f64>,
    pub acres_in_production: Option<f64>,
    pub gross_income: Option<f64>,
    pub years_farming: Option<i32>,
    pub main_crops: String,
    pub field_history: String,

    pub near_contamination_source: YesNo,
    pub wild_areas: YesNo,
    pub own_branding: YesNo,
    pub split_operation: YesNo,
    pub buffer_zones: YesNo,
    pub shared_equipment: YesNo,
    pub livestock_on_farm: YesNo,
    pub prohibited_substances: YesNo,
    pub gmo_neighbors: YesNo,
    pub soil_testing: YesNo,
    pub greenhouse_production: YesNo,
    pub previous_certification: YesNo,
    pub certification_denied: YesNo,
    pub sewage_sludge_applied: YesNo,

    pub water_source: WaterSource,
    pub irrigation_method: IrrigationMethod,
    pub pest_control: PestControl,
    pub seed_source: SeedSource,
    pub fertility_source: FertilitySource,
    pub post_harvest_handling: PostHarvestHandling,
    pub record_keeping: RecordKeeping,
}

impl FarmInfoInternalApplication {
    /// Every answer key the form may send, in storage order
    pub const FIELDS: &'static [&'static str] = &[
        "farmId",
        "totalAcreage",
        "acresInProduction",
        "grossIncome",
        "yearsFarming",
        "mainCrops",
        "fieldHistory",
        "nearContaminationSource",
        "wildAreas",
        "ownBranding",
        "splitOperation",
        "bufferZones",
        "sharedEquipment",
        "livestockOnFarm",
        "prohibitedSubstances",
        "gmoNeighbors",
        "soilTesting",
        "greenhouseProduction",
        "previousCertification",
        "certificationDenied",
        "sewageSludgeApplied",
        "waterSource",
        "irrigationMethod",
        "pestControl",
        "seedSource",
        "fertilitySource",
        "postHarvestHandling",
        "recordKeeping",
    ];

    /// Empty answers for a farm
    pub fn new(farm_id: i32) -> Self {
        Self {
            farm_id,
            ..Default::default()
        }
    }

    /// Parse and validate a form payload
    ///
    /// `farmId` is required; every other field defaults when absent.
    pub fn from_json(value: &Value) -> Result<Self, ValidationErrors> {
        let Some(object) = value.as_object() else {
            return Err(ValidationErrors::message("expected an object"));
        };

        let mut fields = FieldReader::new(object);
        fields.reject_unknown();

        let record = Self {
            farm_id: fields.required_id("farmId"),
            total_acreage: fields.non_negative("totalAcreage"),
            acres_in_production: fields.non_negative("acresInProduction"),
            gross_income: fields.non_negative("grossIncome"),
            years_farming: fields.small_count("yearsFarming"),
            main_crops: fields.text("mainCrops"),
            field_history: fields.text("fieldHistory"),
            near_contamination_source: fields.choice("nearContaminationSource"),
            wild_areas: fields.choice("wildAreas"),
            own_branding: fields.choice("ownBranding"),
            split_operation: fields.choice("splitOperation"),
            buffer_zones: fields.choice("bufferZones"),
            shared_equipment: fields.choice("sharedEquipment"),
            livestock_on_farm: fields.choice("livestockOnFarm"),
            prohibited_substances: fields.choice("prohibitedSubstances"),
            gmo_neighbors: fields.choice("gmoNeighbors"),
            soil_testing: fields.choice("soilTesting"),
            greenhouse_production: fields.choice("greenhouseProduction"),
            previous_certification: fields.choice("previousCertification"),
            certification_denied: fields.choice("certificationDenied"),
            sewage_sludge_applied: fields.choice("sewageSludgeApplied"),
            water_source: fields.choice("waterSource"),
            irrigation_method: fields.choice("irrigationMethod"),
            pest_control: fields.choice("pestControl"),
            seed_source: fields.choice("seedSource"),
            fertility_source: fields.choice("fertilitySource"),
            post_harvest_handling: fields.choice("postHarvestHandling"),
            record_keeping: fields.choice("recordKeeping"),
        };

        let mut errors = fields.finish();
        if let (Some(total), Some(in_production)) =
            (record.total_acreage, record.acres_in_production)
        {
            if in_production > total {
                errors.add_field("acresInProduction", "cannot exceed total acreage");
            }
        }
        errors.into_result(record)
    }

    /// The record in the form's JSON shape
    pub fn to_json(&self) -> Value {
        // Serialising plain data and string-keyed maps cannot fail
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Summaries of every questionnaire answer, keyed by field name
    pub fn answers(&self) -> Vec<(&'static str, AnswerSummary<'_>)> {
        vec![
            ("nearContaminationSource", self.near_contamination_source.summary()),
            ("wildAreas", self.wild_areas.summary()),
            ("ownBranding", self.own_branding.summary()),
            ("splitOperation", self.split_operation.summary()),
            ("bufferZones", self.buffer_zones.summary()),
            ("sharedEquipment", self.shared_equipment.summary()),
            ("livestockOnFarm", self.livestock_on_farm.summary()),
            ("prohibitedSubstances", self.prohibited_substances.summary()),
            ("gmoNeighbors", self.gmo_neighbors.summary()),
            ("soilTesting", self.soil_testing.summary()),
            ("greenhouseProduction", self.greenhouse_production.summary()),
            ("previousCertification", self.previous_certification.summary()),
            ("certificationDenied", self.certification_denied.summary()),
            ("sewageSludgeApplied", self.sewage_sludge_applied.summary()),
            ("waterSource", self.water_source.summary()),
            ("irrigationMethod", self.irrigation_method.summary()),
            ("pestControl", self.pest_control.summary()),
            ("seedSource", self.seed_source.summary()),
            ("fertilitySource", self.fertility_source.summary()),
            ("postHarvestHandling", self.post_harvest_handling.summary()),
            ("recordKeeping", self.record_keeping.summary()),
        ]
    }

    /// Field names still blocking the farm-information tab
    pub fn missing_answers(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.total_acreage.is_none() {
            missing.push("totalAcreage".to_string());
        }
        if self.main_crops.trim().is_empty() {
            missing.push("mainCrops".to_string());
        }
        for (field, summary) in self.answers() {
            if !summary.is_complete() {
                missing.push(field.to_string());
            }
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_answers().is_empty()
    }

    /// Flatten into an ordered spreadsheet row
    ///
    /// Each question becomes two columns: the selected option and its
    /// description.
    pub fn to_row(&self) -> IndexMap<String, String> {
        fn number(value: Option<f64>) -> String {
            value.map(|v| v.to_string()).unwrap_or_default()
        }

        let mut row = IndexMap::new();
        row.insert("farmId".to_string(), self.farm_id.to_string());
        row.insert("totalAcreage".to_string(), number(self.total_acreage));
        row.insert(
            "acresInProduction".to_string(),
            number(self.acres_in_production),
        );
        row.insert("grossIncome".to_string(), number(self.gross_income));
        row.insert(
            "yearsFarming".to_string(),
            self.years_farming
                .map(|v| v.to_string())
                .unwrap_or_default(),
        );
        row.insert("mainCrops".to_string(), self.main_crops.clone());
        row.insert("fieldHistory".to_string(), self.field_history.clone());
        for (field, summary) in self.answers() {
            row.insert(
                field.to_string(),
                summary.selected.unwrap_or_default().to_string(),
            );
            row.insert(
                format!("{}Description", field),
                summary.description.unwrap_or_default().to_string(),
            );
        }
        row
    }
}

impl<'de> Deserialize<'de> for FarmInfoInternalApplication {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}

/// Pulls typed fields out of a JSON object, recording failures by key
struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    errors: ValidationErrors,
}

impl<'a> FieldReader<'a> {
    fn new(object: &'a Map<String, Value>) -> Self {
        Self {
            object,
            errors: ValidationErrors::default(),
        }
    }

    fn reject_unknown(&mut self) {
        for key in self.object.keys() {
            let known = FarmInfoInternalApplication::FIELDS.contains(&key.as_str())
                || SERVER_MANAGED.contains(&key.as_str());
            if !known {
                self.errors.add_field(key, "unrecognised field");
            }
        }
    }

    fn present(&self, key: &str) -> Option<&'a Value> {
        match self.object.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    fn required_id(&mut self, key: &str) -> i32 {
        match self.present(key) {
            None => {
                self.errors.add_field(key, "is required");
                0
            }
            Some(value) => match value.as_i64().and_then(|id| i32::try_from(id).ok()) {
                Some(id) if id > 0 => id,
                _ => {
                    self.errors.add_field(key, "expected a positive integer");
                    0
                }
            },
        }
    }

    fn non_negative(&mut self, key: &str) -> Option<f64> {
        let value = self.present(key)?;
        match value.as_f64() {
            Some(number) if number.is_finite() && number >= 0.0 => Some(number),
            Some(_) => {
                self.errors.add_field(key, "must not be negative");
                None
            }
            None => {
                self.errors.add_field(key, "expected a number");
                None
            }
        }
    }

    fn small_count(&mut self, key: &str) -> Option<i32> {
        let value = self.present(key)?;
        match value.as_i64() {
            Some(count) if (0..=200).contains(&count) => Some(count as i32),
            Some(_) => {
                self.errors.add_field(key, "must be between 0 and 200");
                None
            }
            None => {
                self.errors.add_field(key, "expected an integer");
                None
            }
        }
    }

    fn text(&mut self, key: &str) -> String {
        match self.present(key) {
            None => String::new(),
            Some(Value::String(text)) if text.chars().count() > MAX_TEXT_LEN => {
                self.errors.add_field(
                    key,
                    format!("must be at most {} characters", MAX_TEXT_LEN),
                );
                String::new()
            }
            Some(Value::String(text)) => text.clone(),
            Some(_) => {
                self.errors.add_field(key, "expected a string");
                String::new()
            }
        }
    }

    fn choice<C: Choice>(&mut self, key: &str) -> C {
        let parsed = match self.object.get(key) {
            Some(value) => from_wire::<C>(value),
            None => Ok(C::default()),
        };
        match parsed {
            Ok(answer) => answer,
            Err(tree) => {
                self.errors.nest(key, tree);
                C::default()
            }
        }
    }

    fn finish(self) -> ValidationErrors {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete_record(farm_id: i32) -> FarmInfoInternalApplication {
        FarmInfoInternalApplication {
            total_acreage: Some(120.0),
            main_crops: "Garlic, winter squash".to_string(),
            near_contamination_source: YesNo::No,
            wild_areas: YesNo::Yes("Riparian strip along north edge".to_string()),
            own_branding: YesNo::No,
            split_operation: YesNo::No,
            buffer_zones: YesNo::Yes("25ft grass buffer".to_string()),
            shared_equipment: YesNo::No,
            livestock_on_farm: YesNo::No,
            prohibited_substances: YesNo::No,
            gmo_neighbors: YesNo::No,
            soil_testing: YesNo::Yes("Annual".to_string()),
            greenhouse_production: YesNo::No,
            previous_certification: YesNo::No,
            certification_denied: YesNo::No,
            sewage_sludge_applied: YesNo::No,
            water_source: WaterSource::Well,
            irrigation_method: IrrigationMethod::Drip,
            pest_control: PestControl::Mechanical,
            seed_source: SeedSource::CertifiedOrganic,
            fertility_source: FertilitySource::Compost,
            post_harvest_handling: PostHarvestHandling::NoHandling,
            record_keeping: RecordKeeping::Digital,
            ..FarmInfoInternalApplication::new(farm_id)
        }
    }

    #[test]
    fn test_minimal_payload_defaults_everything_else() {
        let record = FarmInfoInternalApplication::from_json(&json!({ "farmId": 4 })).unwrap();
        assert_eq!(record, FarmInfoInternalApplication::new(4));
    }

    #[test]
    fn test_missing_farm_id_is_a_field_error() {
        let errors = FarmInfoInternalApplication::from_json(&json!({ "mainCrops": "Kale" }))
            .unwrap_err();
        assert_eq!(errors.field_messages("farmId"), vec!["is required".to_string()]);
    }

    #[test]
    fn test_errors_are_collected_across_fields() {
        let payload = json!({
            "farmId": 2,
            "totalAcreage": -3,
            "mainCrops": 12,
            "waterSource": { "well": true, "municipal": true },
            "pestControl": { "synthetic": { "isSynthetic": true, "description": false } },
            "favouriteColour": "green"
        });
        let errors = FarmInfoInternalApplication::from_json(&payload).unwrap_err();

        assert_eq!(
            errors.field_messages("totalAcreage"),
            vec!["must not be negative".to_string()]
        );
        assert_eq!(
            errors.field_messages("mainCrops"),
            vec!["expected a string".to_string()]
        );
        assert_eq!(errors.field("waterSource").unwrap().messages().len(), 1);
        assert!(errors.at_path("pestControl.synthetic.description").is_some());
        assert_eq!(
            errors.field_messages("favouriteColour"),
            vec!["unrecognised field".to_string()]
        );
    }

    #[test]
    fn test_acres_in_production_bounded_by_total() {
        let payload = json!({ "farmId": 1, "totalAcreage": 10, "acresInProduction": 12.5 });
        let errors = FarmInfoInternalApplication::from_json(&payload).unwrap_err();
        assert_eq!(
            errors.field_messages("acresInProduction"),
            vec!["cannot exceed total acreage".to_string()]
        );
    }

    #[test]
    fn test_server_managed_keys_are_ignored() {
        let payload = json!({ "farmId": 1, "id": 9, "createdAt": "2024-01-01T00:00:00Z" });
        assert!(FarmInfoInternalApplication::from_json(&payload).is_ok());
    }

    #[test]
    fn test_json_round_trip_keeps_nested_description() {
        let mut record = FarmInfoInternalApplication::new(3);
        record.near_contamination_source = YesNo::Yes("X".to_string());

        let json = record.to_json();
        assert_eq!(
            json["nearContaminationSource"]["yes"],
            json!({ "isYes": true, "description": "X" })
        );
        assert_eq!(FarmInfoInternalApplication::from_json(&json).unwrap(), record);
    }

    #[test]
    fn test_every_field_is_listed_once() {
        let json = complete_record(1).to_json();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), FarmInfoInternalApplication::FIELDS.len());
        for field in FarmInfoInternalApplication::FIELDS {
            assert!(object.contains_key(*field), "missing {}", field);
        }
    }

    #[test]
    fn test_completeness() {
        let empty = FarmInfoInternalApplication::new(1);
        let missing = empty.missing_answers();
        assert!(missing.contains(&"totalAcreage".to_string()));
        assert!(missing.contains(&"waterSource".to_string()));
        assert_eq!(missing.len(), 2 + 21);

        let mut record = complete_record(1);
        assert!(record.is_complete());

        record.water_source = WaterSource::Other(String::new());
        assert_eq!(record.missing_answers(), vec!["waterSource".to_string()]);
    }

    #[test]
    fn test_row_has_option_and_description_columns() {
        let row = complete_record(7).to_row();
        assert_eq!(row.get_index(0).unwrap(), (&"farmId".to_string(), &"7".to_string()));
        assert_eq!(row["wildAreas"], "yes");
        assert_eq!(row["wildAreasDescription"], "Riparian strip along north edge");
        assert_eq!(row["waterSource"], "well");
        assert_eq!(row["waterSourceDescription"], "");
        assert_eq!(row.len(), 7 + 21 * 2);
    }
}
