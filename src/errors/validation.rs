//! Field-path validation error tree
//!
//! Validation failures are collected rather than short-circuited so a form
//! can render every message next to the field that produced it. The tree
//! serialises in the shape the apply UI already understands:
//!
//! ```json
//! {
//!   "_errors": [],
//!   "totalAcreage": { "_errors": ["must not be negative"] },
//!   "waterSource": { "_errors": ["only one option may be selected"] }
//! }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use farm_portal::errors::ValidationErrors;
//!
//! let mut errors = ValidationErrors::default();
//! errors.add_field("farmId", "is required");
//! assert!(!errors.is_empty());
//! assert_eq!(errors.field_messages("farmId"), vec!["is required".to_string()]);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Recursive error tree keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<String>,
    fields: BTreeMap<String, ValidationErrors>,
}

impl ValidationErrors {
    /// Tree holding a single message at its root
    pub fn message(message: impl Into<String>) -> Self {
        let mut tree = Self::default();
        tree.add(message);
        tree
    }

    /// Add a message at this level of the tree
    pub fn add(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Add a message to a direct child field
    pub fn add_field(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .add(message);
    }

    /// Graft a subtree under `field`, merging with anything already there
    pub fn nest(&mut self, field: &str, child: ValidationErrors) {
        if child.is_empty() {
            return;
        }
        let slot = self.fields.entry(field.to_string()).or_default();
        slot.errors.extend(child.errors);
        for (name, grandchild) in child.fields {
            slot.nest(&name, grandchild);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.fields.values().all(ValidationErrors::is_empty)
    }

    /// Messages recorded at this level only
    pub fn messages(&self) -> &[String] {
        &self.errors
    }

    /// Subtree for a direct child field
    pub fn field(&self, field: &str) -> Option<&ValidationErrors> {
        self.fields.get(field)
    }

    /// Messages recorded directly on a child field
    pub fn field_messages(&self, field: &str) -> Vec<String> {
        self.fields
            .get(field)
            .map(|child| child.errors.clone())
            .unwrap_or_default()
    }

    /// Look up a subtree by dotted path, e.g. `waterSource.surface`
    pub fn at_path(&self, path: &str) -> Option<&ValidationErrors> {
        path.split('.')
            .try_fold(self, |node, segment| node.fields.get(segment))
    }

    /// Flatten into `(path, message)` pairs, depth first
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        self.flatten_into("", &mut out);
        out
    }

    fn flatten_into(&self, prefix: &str, out: &mut Vec<(String, String)>) {
        for message in &self.errors {
            out.push((prefix.to_string(), message.clone()));
        }
        for (name, child) in &self.fields {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}.{}", prefix, name)
            };
            child.flatten_into(&path, out);
        }
    }

    /// `Ok(value)` when nothing was recorded, otherwise the tree itself
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .flatten()
            .into_iter()
            .map(|(path, message)| {
                if path.is_empty() {
                    message
                } else {
                    format!("{}: {}", path, message)
                }
            })
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl Serialize for ValidationErrors {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let children: Vec<_> = self
            .fields
            .iter()
            .filter(|(_, child)| !child.is_empty())
            .collect();
        let mut map = serializer.serialize_map(Some(children.len() + 1))?;
        map.serialize_entry("_errors", &self.errors)?;
        for (name, child) in children {
            map.serialize_entry(name, child)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_paths_serialise_as_tree() {
        let mut inner = ValidationErrors::default();
        inner.add_field("description", "expected a string");

        let mut tree = ValidationErrors::default();
        tree.add_field("farmId", "is required");
        tree.nest("waterSource", inner);

        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!({
                "_errors": [],
                "farmId": { "_errors": ["is required"] },
                "waterSource": {
                    "_errors": [],
                    "description": { "_errors": ["expected a string"] }
                }
            })
        );
    }

    #[test]
    fn test_flatten_and_display() {
        let mut tree = ValidationErrors::message("payload rejected");
        tree.add_field("totalAcreage", "must not be negative");

        assert_eq!(
            tree.flatten(),
            vec![
                ("".to_string(), "payload rejected".to_string()),
                (
                    "totalAcreage".to_string(),
                    "must not be negative".to_string()
                ),
            ]
        );
        assert_eq!(
            tree.to_string(),
            "payload rejected; totalAcreage: must not be negative"
        );
    }

    #[test]
    fn test_empty_subtrees_do_not_count() {
        let mut tree = ValidationErrors::default();
        tree.nest("waterSource", ValidationErrors::default());
        assert!(tree.is_empty());
        assert_eq!(tree.into_result(7), Ok(7));
    }

    #[test]
    fn test_at_path() {
        let mut inner = ValidationErrors::default();
        inner.add_field("surface", "description is required");
        let mut tree = ValidationErrors::default();
        tree.nest("waterSource", inner);

        let node = tree.at_path("waterSource.surface").unwrap();
        assert_eq!(node.messages(), ["description is required".to_string()]);
        assert!(tree.at_path("waterSource.well").is_none());
    }
}
