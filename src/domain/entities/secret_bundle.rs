//! Secret bundle
//!
//! Two-level `section.key` structure (application, services, observability).
//! Values never leave the bundle through `Debug` or `Serialize`; the only way
//! to get at them is `get` or `to_payload`, which feeds the managed secret.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_yaml_ng::Value;

use crate::domain::value_objects::ContentHash;

/// Keys that must be present and non-empty after resolution
pub const REQUIRED_KEYS: [(&str, &str); 2] = [
    ("application", "secret_key"),
    ("application", "required_setting"),
];

#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretBundle {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl SecretBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a parsed YAML document
    ///
    /// The top level must be a mapping of sections, each section a mapping of
    /// leaves. Scalar leaves are stringified; sequences and mappings are
    /// JSON-encoded; null leaves become empty strings.
    pub fn from_yaml(doc: &Value) -> Result<Self, String> {
        let top = match doc {
            Value::Mapping(m) => m,
            Value::Null => return Ok(Self::default()),
            _ => return Err("top level must be a mapping of sections".to_string()),
        };

        let mut bundle = Self::default();
        for (section, entries) in top {
            let section = scalar_key(section)?;
            let entries = match entries {
                Value::Mapping(m) => m,
                Value::Null => continue,
                _ => return Err(format!("section '{}' must be a mapping", section)),
            };
            for (key, value) in entries {
                let key = scalar_key(key)?;
                bundle.insert(&section, &key, leaf_to_string(value)?);
            }
        }
        Ok(bundle)
    }

    pub fn insert(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(key))
            .map(String::as_str)
    }

    /// First required key that is missing or blank
    pub fn missing_required(&self) -> Option<String> {
        REQUIRED_KEYS
            .iter()
            .find(|(section, key)| {
                self.get(section, key)
                    .map(|v| v.trim().is_empty())
                    .unwrap_or(true)
            })
            .map(|(section, key)| format!("{}.{}", section, key))
    }

    /// Dotted key names, sorted
    pub fn keys(&self) -> Vec<String> {
        self.sections
            .iter()
            .flat_map(|(section, entries)| {
                entries.keys().map(move |key| format!("{}.{}", section, key))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sections.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// JSON payload for the managed secret resource
    pub fn to_payload(&self) -> String {
        let flat: BTreeMap<String, &str> = self
            .sections
            .iter()
            .flat_map(|(section, entries)| {
                entries
                    .iter()
                    .map(move |(key, value)| (format!("{}.{}", section, key), value.as_str()))
            })
            .collect();
        serde_json::to_string(&flat).unwrap_or_default()
    }

    pub fn digest(&self) -> ContentHash {
        ContentHash::from_content(&self.to_payload())
    }

    /// `KEY=***` preview lines
    pub fn masked(&self) -> Vec<String> {
        self.keys().into_iter().map(|k| format!("{}=***", k)).collect()
    }
}

impl fmt::Debug for SecretBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretBundle")
            .field("keys", &self.keys())
            .finish()
    }
}

impl Serialize for SecretBundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let keys = self.keys();
        let mut map = serializer.serialize_map(Some(keys.len()))?;
        for key in &keys {
            map.serialize_entry(key, "***")?;
        }
        map.end()
    }
}

fn scalar_key(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err("keys must be scalars".to_string()),
    }
}

fn leaf_to_string(value: &Value) -> Result<String, String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Sequence(_) | Value::Mapping(_) => {
            serde_json::to_string(value).map_err(|e| e.to_string())
        }
        Value::Tagged(tagged) => leaf_to_string(&tagged.value),
    }
}
