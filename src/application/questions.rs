//! Multi-option certification questions
//!
//! Yes/no questions all share [`YesNo`](super::choice::YesNo); the enums here
//! cover questions with more than two options. Option keys are the names the
//! apply form uses on the wire.

use super::choice::{impl_choice_serde, Branch, Choice};

/// Primary source of irrigation and wash water
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WaterSource {
    #[default]
    Unanswered,
    Municipal,
    Well,
    /// River, creek, pond; description names it
    Surface(String),
    Other(String),
}

impl Choice for WaterSource {
    const BRANCHES: &'static [Branch] = &[
        Branch::plain("municipal"),
        Branch::plain("well"),
        Branch::detailed("surface"),
        Branch::detailed("other"),
    ];

    fn selection(&self) -> Option<(usize, Option<&str>)> {
        match self {
            WaterSource::Unanswered => None,
            WaterSource::Municipal => Some((0, None)),
            WaterSource::Well => Some((1, None)),
            WaterSource::Surface(description) => Some((2, Some(description))),
            WaterSource::Other(description) => Some((3, Some(description))),
        }
    }

    fn from_selection(index: usize, description: Option<String>) -> Self {
        let description = description.unwrap_or_default();
        match index {
            0 => WaterSource::Municipal,
            1 => WaterSource::Well,
            2 => WaterSource::Surface(description),
            3 => WaterSource::Other(description),
            _ => WaterSource::Unanswered,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IrrigationMethod {
    #[default]
    Unanswered,
    NotIrrigated,
    Drip,
    Sprinkler,
    Flood,
    Other(String),
}

impl Choice for IrrigationMethod {
    const BRANCHES: &'static [Branch] = &[
        Branch::plain("none"),
        Branch::plain("drip"),
        Branch::plain("sprinkler"),
        Branch::plain("flood"),
        Branch::detailed("other"),
    ];

    fn selection(&self) -> Option<(usize, Option<&str>)> {
        match self {
            IrrigationMethod::Unanswered => None,
            IrrigationMethod::NotIrrigated => Some((0, None)),
            IrrigationMethod::Drip => Some((1, None)),
            IrrigationMethod::Sprinkler => Some((2, None)),
            IrrigationMethod::Flood => Some((3, None)),
            IrrigationMethod::Other(description) => Some((4, Some(description))),
        }
    }

    fn from_selection(index: usize, description: Option<String>) -> Self {
        match index {
            0 => IrrigationMethod::NotIrrigated,
            1 => IrrigationMethod::Drip,
            2 => IrrigationMethod::Sprinkler,
            3 => IrrigationMethod::Flood,
            4 => IrrigationMethod::Other(description.unwrap_or_default()),
            _ => IrrigationMethod::Unanswered,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PestControl {
    #[default]
    Unanswered,
    NoControl,
    Mechanical,
    /// Beneficial insects, approved biologicals; description lists them
    Biological(String),
    /// Any synthetic input; description lists products used
    Synthetic(String),
}

impl Choice for PestControl {
    const BRANCHES: &'static [Branch] = &[
        Branch::plain("none"),
        Branch::plain("mechanical"),
        Branch::detailed("biological"),
        Branch::detailed("synthetic"),
    ];

    fn selection(&self) -> Option<(usize, Option<&str>)> {
        match self {
            PestControl::Unanswered => None,
            PestControl::NoControl => Some((0, None)),
            PestControl::Mechanical => Some((1, None)),
            PestControl::Biological(description) => Some((2, Some(description))),
            PestControl::Synthetic(description) => Some((3, Some(description))),
        }
    }

    fn from_selection(index: usize, description: Option<String>) -> Self {
        let description = description.unwrap_or_default();
        match index {
            0 => PestControl::NoControl,
            1 => PestControl::Mechanical,
            2 => PestControl::Biological(description),
            3 => PestControl::Synthetic(description),
            _ => PestControl::Unanswered,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SeedSource {
    #[default]
    Unanswered,
    CertifiedOrganic,
    UntreatedConventional,
    Treated(String),
}

impl Choice for SeedSource {
    const BRANCHES: &'static [Branch] = &[
        Branch::plain("certifiedOrganic"),
        Branch::plain("untreatedConventional"),
        Branch::detailed("treated"),
    ];

    fn selection(&self) -> Option<(usize, Option<&str>)> {
        match self {
            SeedSource::Unanswered => None,
            SeedSource::CertifiedOrganic => Some((0, None)),
            SeedSource::UntreatedConventional => Some((1, None)),
            SeedSource::Treated(description) => Some((2, Some(description))),
        }
    }

    fn from_selection(index: usize, description: Option<String>) -> Self {
        match index {
            0 => SeedSource::CertifiedOrganic,
            1 => SeedSource::UntreatedConventional,
            2 => SeedSource::Treated(description.unwrap_or_default()),
            _ => SeedSource::Unanswered,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FertilitySource {
    #[default]
    Unanswered,
    Compost,
    Manure(String),
    CoverCrops,
    Synthetic(String),
}

impl Choice for FertilitySource {
    const BRANCHES: &'static [Branch] = &[
        Branch::plain("compost"),
        Branch::detailed("manure"),
        Branch::plain("coverCrops"),
        Branch::detailed("synthetic"),
    ];

    fn selection(&self) -> Option<(usize, Option<&str>)> {
        match self {
            FertilitySource::Unanswered => None,
            FertilitySource::Compost => Some((0, None)),
            FertilitySource::Manure(description) => Some((1, Some(description))),
            FertilitySource::CoverCrops => Some((2, None)),
            FertilitySource::Synthetic(description) => Some((3, Some(description))),
        }
    }

    fn from_selection(index: usize, description: Option<String>) -> Self {
        let description = description.unwrap_or_default();
        match index {
            0 => FertilitySource::Compost,
            1 => FertilitySource::Manure(description),
            2 => FertilitySource::CoverCrops,
            3 => FertilitySource::Synthetic(description),
            _ => FertilitySource::Unanswered,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PostHarvestHandling {
    #[default]
    Unanswered,
    NoHandling,
    OnFarm(String),
    OffFarm(String),
}

impl Choice for PostHarvestHandling {
    const BRANCHES: &'static [Branch] = &[
        Branch::plain("none"),
        Branch::detailed("onFarm"),
        Branch::detailed("offFarm"),
    ];

    fn selection(&self) -> Option<(usize, Option<&str>)> {
        match self {
            PostHarvestHandling::Unanswered => None,
            PostHarvestHandling::NoHandling => Some((0, None)),
            PostHarvestHandling::OnFarm(description) => Some((1, Some(description))),
            PostHarvestHandling::OffFarm(description) => Some((2, Some(description))),
        }
    }

    fn from_selection(index: usize, description: Option<String>) -> Self {
        let description = description.unwrap_or_default();
        match index {
            0 => PostHarvestHandling::NoHandling,
            1 => PostHarvestHandling::OnFarm(description),
            2 => PostHarvestHandling::OffFarm(description),
            _ => PostHarvestHandling::Unanswered,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RecordKeeping {
    #[default]
    Unanswered,
    Paper,
    Digital,
    NoRecords,
}

impl Choice for RecordKeeping {
    const BRANCHES: &'static [Branch] = &[
        Branch::plain("paper"),
        Branch::plain("digital"),
        Branch::plain("none"),
    ];

    fn selection(&self) -> Option<(usize, Option<&str>)> {
        match self {
            RecordKeeping::Unanswered => None,
            RecordKeeping::Paper => Some((0, None)),
            RecordKeeping::Digital => Some((1, None)),
            RecordKeeping::NoRecords => Some((2, None)),
        }
    }

    fn from_selection(index: usize, _description: Option<String>) -> Self {
        match index {
            0 => RecordKeeping::Paper,
            1 => RecordKeeping::Digital,
            2 => RecordKeeping::NoRecords,
            _ => RecordKeeping::Unanswered,
        }
    }
}

impl_choice_serde!(
    WaterSource,
    IrrigationMethod,
    PestControl,
    SeedSource,
    FertilitySource,
    PostHarvestHandling,
    RecordKeeping,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::choice::{from_wire, to_wire};
    use serde_json::json;

    #[test]
    fn test_water_source_surface_round_trips() {
        let answer = WaterSource::Surface("Mill creek".to_string());
        let wire = to_wire(&answer);
        assert_eq!(wire["municipal"], json!(false));
        assert_eq!(
            wire["surface"],
            json!({ "isSurface": true, "description": "Mill creek" })
        );
        assert_eq!(from_wire::<WaterSource>(&wire).unwrap(), answer);
    }

    #[test]
    fn test_camel_case_option_flags() {
        let wire = to_wire(&PostHarvestHandling::OnFarm("wash station".to_string()));
        assert_eq!(
            wire["onFarm"],
            json!({ "isOnFarm": true, "description": "wash station" })
        );
        assert_eq!(wire["none"], json!(false));
    }

    #[test]
    fn test_none_option_is_distinct_from_unanswered() {
        let answer: IrrigationMethod = serde_json::from_value(json!({ "none": true })).unwrap();
        assert_eq!(answer, IrrigationMethod::NotIrrigated);
        let answer: IrrigationMethod = serde_json::from_value(json!({ "none": false })).unwrap();
        assert_eq!(answer, IrrigationMethod::Unanswered);
    }

    #[test]
    fn test_conflicting_plain_options_are_rejected() {
        let result = from_wire::<RecordKeeping>(&json!({ "paper": true, "digital": true }));
        assert!(result.is_err());
    }

    #[test]
    fn test_branch_tables_have_unique_keys() {
        fn assert_unique<C: Choice>() {
            let mut keys: Vec<&str> = C::BRANCHES.iter().map(|b| b.key).collect();
            keys.sort_unstable();
            keys.dedup();
            assert_eq!(keys.len(), C::BRANCHES.len());
        }
        assert_unique::<WaterSource>();
        assert_unique::<IrrigationMethod>();
        assert_unique::<PestControl>();
        assert_unique::<SeedSource>();
        assert_unique::<FertilitySource>();
        assert_unique::<PostHarvestHandling>();
        assert_unique::<RecordKeeping>();
    }
}
