// ── Status snapshot ──
//
// The full account state as the backend returns it: a mapping from
// resource category to per-resource id to raw wire fields. Temperatures
// are Celsius. Reads go through typed accessors; writes go through
// `StatusPatch`, applied only after the server confirmed the write.

use serde_json::{Map, Value};
use strum::{Display, IntoStaticStr};

use crate::error::CoreError;

/// Top-level keys of the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    Device,
    Shared,
    Structure,
    User,
    Metadata,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A confirmed field-value delta for one resource subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusPatch {
    pub category: Category,
    pub id: String,
    pub delta: Map<String, Value>,
}

impl StatusPatch {
    pub fn new(category: Category, id: impl Into<String>) -> Self {
        Self {
            category,
            id: id.into(),
            delta: Map::new(),
        }
    }

    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.delta.insert(field.to_owned(), value.into());
        self
    }
}

/// Decoded `mobile/user.<id>` response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusSnapshot {
    root: Value,
}

impl StatusSnapshot {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// The raw field map of one resource.
    pub fn resource(&self, category: Category, id: &str) -> Option<&Map<String, Value>> {
        self.root
            .get(category.as_str())
            .and_then(|c| c.get(id))
            .and_then(Value::as_object)
    }

    pub fn field(&self, category: Category, id: &str, field: &str) -> Result<&Value, CoreError> {
        self.resource(category, id)
            .and_then(|r| r.get(field))
            .ok_or_else(|| missing(category, id, field))
    }

    pub fn f64_field(&self, category: Category, id: &str, field: &str) -> Result<f64, CoreError> {
        self.field(category, id, field)?
            .as_f64()
            .ok_or_else(|| mistyped(category, id, field, "number"))
    }

    pub fn str_field(&self, category: Category, id: &str, field: &str) -> Result<&str, CoreError> {
        self.field(category, id, field)?
            .as_str()
            .ok_or_else(|| mistyped(category, id, field, "string"))
    }

    pub fn bool_field(&self, category: Category, id: &str, field: &str) -> Result<bool, CoreError> {
        self.field(category, id, field)?
            .as_bool()
            .ok_or_else(|| mistyped(category, id, field, "boolean"))
    }

    /// The string entries of an array field.
    pub fn str_list(&self, category: Category, id: &str, field: &str) -> Result<Vec<&str>, CoreError> {
        self.field(category, id, field)?
            .as_array()
            .ok_or_else(|| mistyped(category, id, field, "array"))?
            .iter()
            .map(|v| v.as_str().ok_or_else(|| mistyped(category, id, field, "array of strings")))
            .collect()
    }

    /// Merge a confirmed delta into its subtree, creating it if absent.
    pub fn apply(&mut self, patch: &StatusPatch) {
        if !self.root.is_object() {
            self.root = Value::Object(Map::new());
        }
        let Value::Object(root) = &mut self.root else {
            return;
        };

        let category = root
            .entry(patch.category.as_str())
            .or_insert_with(|| Value::Object(Map::new()));
        if !category.is_object() {
            *category = Value::Object(Map::new());
        }
        let Value::Object(category) = category else {
            return;
        };

        let resource = category
            .entry(patch.id.as_str())
            .or_insert_with(|| Value::Object(Map::new()));
        if !resource.is_object() {
            *resource = Value::Object(Map::new());
        }
        if let Value::Object(resource) = resource {
            for (field, value) in &patch.delta {
                resource.insert(field.clone(), value.clone());
            }
        }
    }
}

fn missing(category: Category, id: &str, field: &str) -> CoreError {
    CoreError::MissingField {
        path: format!("{category}.{id}.{field}"),
    }
}

fn mistyped(category: Category, id: &str, field: &str, expected: &str) -> CoreError {
    CoreError::MissingField {
        path: format!("{category}.{id}.{field} ({expected})"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn snapshot() -> StatusSnapshot {
        StatusSnapshot::new(json!({
            "shared": { "d1": { "target_temperature": 20.0, "name": "Hall" } },
            "structure": { "s1": { "away": false, "devices": ["device.d1", "device.d2"] } }
        }))
    }

    #[test]
    fn typed_reads() {
        let s = snapshot();
        assert!((s.f64_field(Category::Shared, "d1", "target_temperature").unwrap() - 20.0).abs() < 1e-9);
        assert_eq!(s.str_field(Category::Shared, "d1", "name").unwrap(), "Hall");
        assert!(!s.bool_field(Category::Structure, "s1", "away").unwrap());
        assert_eq!(
            s.str_list(Category::Structure, "s1", "devices").unwrap(),
            vec!["device.d1", "device.d2"]
        );
    }

    #[test]
    fn missing_and_mistyped_fields() {
        let s = snapshot();
        match s.field(Category::Device, "d1", "fan_mode") {
            Err(CoreError::MissingField { path }) => assert_eq!(path, "device.d1.fan_mode"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(s.f64_field(Category::Shared, "d1", "name").is_err());
    }

    #[test]
    fn apply_patches_only_named_fields() {
        let mut s = snapshot();
        s.apply(&StatusPatch::new(Category::Shared, "d1").set("target_temperature", 22.5));

        assert_eq!(
            s.as_value()["shared"]["d1"],
            json!({ "target_temperature": 22.5, "name": "Hall" })
        );
        assert_eq!(s.as_value()["structure"], snapshot().as_value()["structure"]);
    }

    #[test]
    fn apply_creates_missing_subtrees() {
        let mut s = StatusSnapshot::default();
        s.apply(&StatusPatch::new(Category::Device, "d9").set("fan_mode", "on"));
        assert_eq!(s.str_field(Category::Device, "d9", "fan_mode").unwrap(), "on");
    }
}
