//! Single-selection questionnaire answers
//!
//! Each certification question is a Rust enum with an `Unanswered` default
//! and one variant per option, so "at most one option selected" holds by
//! construction. The apply UI exchanges answers as an object keyed by option
//! name, e.g. `{ "no": false, "yes": { "isYes": true, "description": "X" } }`;
//! [`to_wire`] and [`from_wire`] translate between the two. Parsing rejects
//! objects where more than one option is truthy.

use serde_json::{json, Map, Value};

use crate::errors::ValidationErrors;

/// Longest free-text elaboration accepted on a single option
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// One selectable option of a question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Branch {
    pub key: &'static str,
    /// Carries a free-text description when selected
    pub detailed: bool,
}

impl Branch {
    pub const fn plain(key: &'static str) -> Self {
        Self {
            key,
            detailed: false,
        }
    }

    pub const fn detailed(key: &'static str) -> Self {
        Self {
            key,
            detailed: true,
        }
    }

    /// Flag name inside a detailed option object: `yes` -> `isYes`
    pub fn flag_key(&self) -> String {
        let mut chars = self.key.chars();
        match chars.next() {
            Some(first) => format!("is{}{}", first.to_ascii_uppercase(), chars.as_str()),
            None => "is".to_string(),
        }
    }
}

/// What a single answer currently holds, independent of its concrete type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerSummary<'a> {
    pub selected: Option<&'static str>,
    pub description: Option<&'a str>,
}

impl AnswerSummary<'_> {
    pub fn is_answered(&self) -> bool {
        self.selected.is_some()
    }

    /// Answered, and any required elaboration is filled in
    pub fn is_complete(&self) -> bool {
        match (self.selected, self.description) {
            (None, _) => false,
            (Some(_), Some(description)) => !description.trim().is_empty(),
            (Some(_), None) => true,
        }
    }
}

pub trait Choice: Sized + Default {
    const BRANCHES: &'static [Branch];

    /// Index into `BRANCHES` of the selected option and its description
    fn selection(&self) -> Option<(usize, Option<&str>)>;

    /// Build the answer for `BRANCHES[index]`
    fn from_selection(index: usize, description: Option<String>) -> Self;

    fn summary(&self) -> AnswerSummary<'_> {
        match self.selection() {
            Some((index, description)) => AnswerSummary {
                selected: Some(Self::BRANCHES[index].key),
                description,
            },
            None => AnswerSummary {
                selected: None,
                description: None,
            },
        }
    }
}

/// Encode an answer in the object-per-option shape the UI reads
pub fn to_wire<C: Choice>(answer: &C) -> Value {
    let selection = answer.selection();
    let mut map = Map::new();
    for (index, branch) in C::BRANCHES.iter().enumerate() {
        let picked = selection.filter(|(selected, _)| *selected == index);
        let value = if branch.detailed {
            let description = picked.and_then(|(_, description)| description).unwrap_or("");
            let mut detail = Map::new();
            detail.insert(branch.flag_key(), Value::Bool(picked.is_some()));
            detail.insert("description".to_string(), json!(description));
            Value::Object(detail)
        } else {
            Value::Bool(picked.is_some())
        };
        map.insert(branch.key.to_string(), value);
    }
    Value::Object(map)
}

/// Decode the object-per-option shape, collecting every problem found
///
/// `null` decodes to the unanswered state. Missing options count as not
/// selected.
pub fn from_wire<C: Choice>(value: &Value) -> Result<C, ValidationErrors> {
    let object = match value {
        Value::Null => return Ok(C::default()),
        Value::Object(object) => object,
        _ => return Err(ValidationErrors::message("expected an object")),
    };

    let mut errors = ValidationErrors::default();
    for key in object.keys() {
        if !C::BRANCHES.iter().any(|branch| branch.key == key) {
            errors.add_field(key, "unrecognised option");
        }
    }

    let mut selected: Vec<(usize, Option<String>)> = Vec::new();
    for (index, branch) in C::BRANCHES.iter().enumerate() {
        let Some(raw) = object.get(branch.key) else {
            continue;
        };
        if branch.detailed {
            match read_detailed(branch, raw) {
                Ok(Some(description)) => selected.push((index, Some(description))),
                Ok(None) => {}
                Err(child) => errors.nest(branch.key, child),
            }
        } else {
            match raw {
                Value::Bool(true) => selected.push((index, None)),
                Value::Bool(false) | Value::Null => {}
                _ => errors.add_field(branch.key, "expected a boolean"),
            }
        }
    }

    if selected.len() > 1 {
        let keys: Vec<&str> = selected
            .iter()
            .map(|(index, _)| C::BRANCHES[*index].key)
            .collect();
        errors.add(format!(
            "only one option may be selected (got {})",
            keys.join(", ")
        ));
    }

    let answer = match selected.pop() {
        Some((index, description)) => C::from_selection(index, description),
        None => C::default(),
    };
    errors.into_result(answer)
}

/// `Some(description)` when the option is selected
fn read_detailed(branch: &Branch, raw: &Value) -> Result<Option<String>, ValidationErrors> {
    let detail = match raw {
        Value::Null => return Ok(None),
        Value::Object(detail) => detail,
        _ => return Err(ValidationErrors::message("expected an object")),
    };

    let mut errors = ValidationErrors::default();
    let flag_key = branch.flag_key();
    let picked = match detail.get(&flag_key) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(_) => {
            errors.add_field(&flag_key, "expected a boolean");
            false
        }
    };
    let description = match detail.get("description") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(_) => {
            errors.add_field("description", "expected a string");
            String::new()
        }
    };
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        errors.add_field(
            "description",
            format!("must be at most {} characters", MAX_DESCRIPTION_LEN),
        );
    }

    errors.into_result(picked.then_some(description))
}

/// Plain yes/no question whose "yes" carries an explanation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum YesNo {
    #[default]
    Unanswered,
    No,
    Yes(String),
}

impl Choice for YesNo {
    const BRANCHES: &'static [Branch] = &[Branch::plain("no"), Branch::detailed("yes")];

    fn selection(&self) -> Option<(usize, Option<&str>)> {
        match self {
            YesNo::Unanswered => None,
            YesNo::No => Some((0, None)),
            YesNo::Yes(description) => Some((1, Some(description))),
        }
    }

    fn from_selection(index: usize, description: Option<String>) -> Self {
        match index {
            0 => YesNo::No,
            1 => YesNo::Yes(description.unwrap_or_default()),
            _ => YesNo::Unanswered,
        }
    }
}

/// Serde support through the wire shape for any `Choice`
macro_rules! impl_choice_serde {
    ($($ty:ty),+ $(,)?) => {$(
        impl serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serde::Serialize::serialize(&$crate::application::choice::to_wire(self), serializer)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let value = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
                $crate::application::choice::from_wire(&value).map_err(serde::de::Error::custom)
            }
        }
    )+};
}

pub(crate) use impl_choice_serde;

impl_choice_serde!(YesNo);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yes_with_description_keeps_its_shape() {
        let answer = YesNo::Yes("Highway runoff".to_string());
        let wire = to_wire(&answer);
        assert_eq!(
            wire,
            json!({ "no": false, "yes": { "isYes": true, "description": "Highway runoff" } })
        );
        assert_eq!(from_wire::<YesNo>(&wire).unwrap(), answer);
    }

    #[test]
    fn test_unanswered_encodes_every_option_false() {
        assert_eq!(
            to_wire(&YesNo::Unanswered),
            json!({ "no": false, "yes": { "isYes": false, "description": "" } })
        );
    }

    #[test]
    fn test_null_and_empty_objects_are_unanswered() {
        assert_eq!(from_wire::<YesNo>(&Value::Null).unwrap(), YesNo::Unanswered);
        assert_eq!(from_wire::<YesNo>(&json!({})).unwrap(), YesNo::Unanswered);
    }

    #[test]
    fn test_two_selected_options_are_rejected() {
        let wire = json!({ "no": true, "yes": { "isYes": true, "description": "x" } });
        let errors = from_wire::<YesNo>(&wire).unwrap_err();
        assert_eq!(
            errors.messages(),
            ["only one option may be selected (got no, yes)".to_string()]
        );
    }

    #[test]
    fn test_type_errors_point_at_the_option() {
        let wire = json!({ "no": "nope", "yes": { "isYes": 1, "description": 5 } });
        let errors = from_wire::<YesNo>(&wire).unwrap_err();
        assert_eq!(errors.field_messages("no"), vec!["expected a boolean".to_string()]);
        let yes = errors.field("yes").unwrap();
        assert_eq!(yes.field_messages("isYes"), vec!["expected a boolean".to_string()]);
        assert_eq!(
            yes.field_messages("description"),
            vec!["expected a string".to_string()]
        );
    }

    #[test]
    fn test_unknown_options_are_rejected() {
        let errors = from_wire::<YesNo>(&json!({ "maybe": true })).unwrap_err();
        assert_eq!(
            errors.field_messages("maybe"),
            vec!["unrecognised option".to_string()]
        );
    }

    #[test]
    fn test_description_on_unselected_option_is_dropped() {
        let wire = json!({ "no": true, "yes": { "isYes": false, "description": "stale" } });
        assert_eq!(from_wire::<YesNo>(&wire).unwrap(), YesNo::No);
    }

    #[test]
    fn test_summary_completeness() {
        assert!(!YesNo::Unanswered.summary().is_answered());
        assert!(YesNo::No.summary().is_complete());
        assert!(!YesNo::Yes("  ".to_string()).summary().is_complete());
        assert!(YesNo::Yes("pond".to_string()).summary().is_complete());
    }

    #[test]
    fn test_serde_goes_through_wire_shape() {
        let answer: YesNo =
            serde_json::from_value(json!({ "yes": { "isYes": true, "description": "X" } }))
                .unwrap();
        assert_eq!(answer, YesNo::Yes("X".to_string()));
        assert_eq!(
            serde_json::to_value(&answer).unwrap()["yes"],
            json!({ "isYes": true, "description": "X" })
        );
    }
}
