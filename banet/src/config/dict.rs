//! Nested configuration dictionary with subscript and attribute style access.

use std::collections::btree_map::{self, BTreeMap};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::value::ConfigValue;
use crate::error::{BANetError, BANetResult};

/// A string-keyed configuration mapping.
///
/// Nested tables are stored as [`ConfigValue::Dict`], so every level supports the
/// same accessors. Two lookup styles are offered with matching semantics:
///
/// - [`get_item`](Self::get_item) fails with [`BANetError::MissingKey`];
/// - [`get_attr`](Self::get_attr) fails with [`BANetError::MissingAttribute`],
///   naming the container type and the attribute.
///
/// For a key that is present both return the same value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigDict {
    entries: BTreeMap<String, ConfigValue>,
}

impl ConfigDict {
    /// Name reported by attribute-style lookup failures.
    pub const TYPE_NAME: &'static str = "ConfigDict";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ConfigValue> {
        self.entries.iter()
    }

    /// Inserts a value, returning the previous one for that key.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ConfigValue>,
    ) -> Option<ConfigValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        self.entries.remove(key)
    }

    /// Inserts `value` only if `key` is absent. Returns whether it was inserted.
    pub fn set_default(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> bool {
        match self.entries.entry(key.into()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(value.into());
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Subscript-style lookup.
    pub fn get_item(&self, key: &str) -> BANetResult<&ConfigValue> {
        self.entries.get(key).ok_or_else(|| BANetError::MissingKey {
            key: key.to_string(),
        })
    }

    /// Attribute-style lookup.
    ///
    /// A missing key is reported as a missing attribute of [`ConfigDict`].
    pub fn get_attr(&self, name: &str) -> BANetResult<&ConfigValue> {
        self.get_item(name)
            .map_err(|_| BANetError::MissingAttribute {
                type_name: Self::TYPE_NAME,
                name: name.to_string(),
            })
    }

    pub fn try_get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    /// Same as [`get_item`](Self::get_item).
    pub fn get_required(&self, key: &str) -> BANetResult<&ConfigValue> {
        self.get_item(key)
    }

    /// Looks up a dotted path such as `"model.loss.type"` through nested tables.
    ///
    /// The error names the longest prefix of the path that could not be resolved.
    pub fn get_path(&self, path: &str) -> BANetResult<&ConfigValue> {
        let mut segments = path.split('.');
        let first = segments.next().unwrap_or_default();
        let mut current = self.get_item(first)?;
        let mut walked = first.to_string();

        for segment in segments {
            let dict = current.as_dict().ok_or_else(|| BANetError::InvalidValue {
                key: walked.clone(),
                expected: "a table",
            })?;
            walked.push('.');
            walked.push_str(segment);
            current = dict.try_get(segment).ok_or_else(|| BANetError::MissingKey {
                key: walked.clone(),
            })?;
        }

        Ok(current)
    }

    pub fn get_str(&self, key: &str) -> BANetResult<&str> {
        self.get_item(key)?
            .as_str()
            .ok_or_else(|| invalid(key, "a string"))
    }

    pub fn get_bool(&self, key: &str) -> BANetResult<bool> {
        self.get_item(key)?
            .as_bool()
            .ok_or_else(|| invalid(key, "a bool"))
    }

    pub fn get_i64(&self, key: &str) -> BANetResult<i64> {
        self.get_item(key)?
            .as_i64()
            .ok_or_else(|| invalid(key, "an integer"))
    }

    pub fn get_f64(&self, key: &str) -> BANetResult<f64> {
        self.get_item(key)?
            .as_f64()
            .ok_or_else(|| invalid(key, "a number"))
    }

    pub fn get_dict(&self, key: &str) -> BANetResult<&ConfigDict> {
        self.get_item(key)?
            .as_dict()
            .ok_or_else(|| invalid(key, "a table"))
    }

    /// Recursively merges `overlay` into `self`; overlay values win except
    /// where both sides hold tables, which are merged key by key.
    pub fn merge(&mut self, overlay: ConfigDict) {
        for (key, value) in overlay.entries {
            match value {
                ConfigValue::Dict(overlay) => match self.entries.get_mut(&key) {
                    Some(ConfigValue::Dict(base)) => base.merge(overlay),
                    _ => {
                        self.entries.insert(key, ConfigValue::Dict(overlay));
                    }
                },
                value => {
                    self.entries.insert(key, value);
                }
            }
        }
    }

    /// Decodes the whole dictionary into a typed structure.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.to_json())
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.entries
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }

    pub fn into_inner(self) -> BTreeMap<String, ConfigValue> {
        self.entries
    }
}

fn invalid(key: &str, expected: &'static str) -> BANetError {
    BANetError::InvalidValue {
        key: key.to_string(),
        expected,
    }
}

impl From<BTreeMap<String, ConfigValue>> for ConfigDict {
    fn from(entries: BTreeMap<String, ConfigValue>) -> Self {
        Self { entries }
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for ConfigDict {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        map.into_iter()
            .map(|(key, value)| (key, ConfigValue::from(value)))
            .collect()
    }
}

impl From<toml::Table> for ConfigDict {
    fn from(table: toml::Table) -> Self {
        table
            .into_iter()
            .map(|(key, value)| (key, ConfigValue::from(value)))
            .collect()
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for ConfigDict {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl IntoIterator for ConfigDict {
    type Item = (String, ConfigValue);
    type IntoIter = btree_map::IntoIter<String, ConfigValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ConfigDict {
    type Item = (&'a String, &'a ConfigValue);
    type IntoIter = btree_map::Iter<'a, String, ConfigValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConfigDict {
        ConfigDict::from(
            serde_json::json!({
                "epochs": 30,
                "lr": 6e-4,
                "model": {"name": "banet", "loss": {"type": "BANetLoss", "ignore_index": 255}},
                "classes": ["building", "road"],
            })
            .as_object()
            .cloned()
            .unwrap(),
        )
    }

    #[test]
    fn attribute_and_subscript_access_agree() {
        let cfg = sample();

        for key in ["epochs", "lr", "model", "classes"] {
            assert_eq!(cfg.get_attr(key).unwrap(), cfg.get_item(key).unwrap());
        }
    }

    #[test]
    fn missing_key_reports_the_key() {
        let cfg = sample();

        match cfg.get_item("batch_size") {
            Err(BANetError::MissingKey { key }) => assert_eq!(key, "batch_size"),
            other => panic!("Expected MissingKey error, got {other:?}"),
        }
    }

    #[test]
    fn missing_attribute_names_type_and_attribute() {
        let cfg = sample();

        let err = cfg.get_attr("batch_size").unwrap_err();
        match &err {
            BANetError::MissingAttribute { type_name, name } => {
                assert_eq!(*type_name, "ConfigDict");
                assert_eq!(name, "batch_size");
            }
            other => panic!("Expected MissingAttribute error, got {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "'ConfigDict' object has no attribute 'batch_size'"
        );
    }

    #[test]
    fn nested_tables_support_the_same_access() {
        let cfg = sample();

        let model = cfg.get_dict("model").unwrap();
        assert_eq!(model.get_attr("name").unwrap().as_str(), Some("banet"));
        assert!(matches!(
            model.get_attr("depth"),
            Err(BANetError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn dotted_path_lookup() {
        let cfg = sample();

        assert_eq!(
            cfg.get_path("model.loss.type").unwrap().as_str(),
            Some("BANetLoss")
        );
        assert_eq!(cfg.get_path("epochs").unwrap().as_i64(), Some(30));
    }

    #[test]
    fn dotted_path_reports_failing_prefix() {
        let cfg = sample();

        match cfg.get_path("model.loss.weight") {
            Err(BANetError::MissingKey { key }) => assert_eq!(key, "model.loss.weight"),
            other => panic!("Expected MissingKey error, got {other:?}"),
        }
        match cfg.get_path("epochs.value") {
            Err(BANetError::InvalidValue { key, .. }) => assert_eq!(key, "epochs"),
            other => panic!("Expected InvalidValue error, got {other:?}"),
        }
    }

    #[test]
    fn typed_getters_check_value_kind() {
        let cfg = sample();

        assert_eq!(cfg.get_i64("epochs").unwrap(), 30);
        assert_eq!(cfg.get_f64("epochs").unwrap(), 30.0);
        assert!(matches!(
            cfg.get_str("epochs"),
            Err(BANetError::InvalidValue { expected: "a string", .. })
        ));
    }

    #[test]
    fn set_default_never_overrides() {
        let mut cfg = sample();

        assert!(!cfg.set_default("epochs", 100));
        assert!(cfg.set_default("batch_size", 8));
        assert_eq!(cfg.get_i64("epochs").unwrap(), 30);
        assert_eq!(cfg.get_i64("batch_size").unwrap(), 8);
    }

    #[test]
    fn merge_is_recursive_for_tables() {
        let mut base = sample();
        let overlay: ConfigDict = [(
            "model",
            ConfigValue::from(ConfigDict::from_iter([("name", "banet-r18")])),
        )]
        .into_iter()
        .collect();

        base.merge(overlay);

        assert_eq!(base.get_path("model.name").unwrap().as_str(), Some("banet-r18"));
        assert_eq!(
            base.get_path("model.loss.ignore_index").unwrap().as_i64(),
            Some(255)
        );
    }

    #[test]
    fn serializes_as_a_plain_map() {
        let cfg: ConfigDict = [("a", 1)].into_iter().collect();

        assert_eq!(serde_json::to_string(&cfg).unwrap(), r#"{"a":1}"#);
    }
}
