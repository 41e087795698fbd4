use std::collections::BTreeMap;

use serde::{
    Deserialize,
    Serialize,
};
use serde_json::json;

use crate::constants::TAG_NAME;
use crate::errors::SnapError;

/// Cloud resource tags. Order is irrelevant to the provider,
/// but a sorted map keeps output deterministic.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagMap(BTreeMap<String, String>);

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tag map that always has a `Name` key, empty by default
    pub fn with_name() -> Self {
        let mut tags = Self::new();
        tags.insert(TAG_NAME, "");

        tags
    }

    pub fn insert<K, V>(&mut self, key: K, value: V) -> Option<String>
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|v| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    /// Parses `key=value` and inserts it, replacing any earlier value of `key`
    pub fn insert_pair(&mut self, key_value: &str) -> Result<(), SnapError> {
        let (key, value) = parse_pair(key_value)?;
        self.insert(key, value);

        Ok(())
    }

    /// Overlays tags from `other` onto `self`, `other` wins on conflicts
    pub fn merge(&mut self, other: &TagMap) {
        for (k, v) in other.iter() {
            self.insert(k.as_str(), v.as_str());
        }
    }

    /// Tags in EC2 API shape: `[{"Key": k, "Value": v}, ...]`
    pub fn to_ec2_json(&self) -> serde_json::Value {
        let tags: Vec<serde_json::Value> = self
            .iter()
            .map(|(k, v)| json!({ "Key": k, "Value": v }))
            .collect();

        serde_json::Value::Array(tags)
    }
}

impl std::fmt::Display for TagMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lines: Vec<String> = self
            .iter()
            .map(|(k, v)| format!("{k}=\"{v}\""))
            .collect();

        write!(f, "{}", lines.join("\n"))
    }
}

/// Splits `key=value` on the first `=`. Values may contain `=`.
pub fn parse_pair(key_value: &str) -> Result<(String, String), SnapError> {
    match key_value.split_once('=') {
        Some((key, _)) if key.is_empty() => {
            Err(SnapError::BadArgs(format!("empty tag key in {key_value}")))
        }
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => {
            Err(SnapError::BadArgs(format!(
                "tag {key_value} does not contain ="
            )))
        }
    }
}
