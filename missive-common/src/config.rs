//! Flat configuration values shared by providers and address backends.
//!
//! Every backend consumes a declared subset of one flat key/value map. Values
//! are weakly typed (`Bool`/`Number`/`Text`) so configuration can come from
//! any serde source without a schema per vendor.

use core::fmt::{self, Display, Formatter};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// A single configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// Flat configuration map keyed by configuration key name.
pub type ConfigMap = AHashMap<String, ConfigValue>;

impl ConfigValue {
    /// Returns the textual value, if this is a text entry.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a boolean entry.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the numeric value, if this is a numeric entry.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Checks whether the value is "populated": non-empty text, or any
    /// boolean/numeric value.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        match self {
            Self::Text(value) => !value.trim().is_empty(),
            Self::Bool(_) | Self::Number(_) => true,
        }
    }
}

impl Display for ConfigValue {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Self::Bool(value) => write!(fmt, "{value}"),
            Self::Number(value) => write!(fmt, "{value}"),
            Self::Text(value) => write!(fmt, "{value}"),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for ConfigValue {
    #[allow(
        clippy::cast_precision_loss,
        reason = "Configuration numbers are small (prices, thresholds)"
    )]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

/// Checks whether a configuration map has no entries.
///
/// `AHashMap` only reaches `is_empty` through deref, which serde's
/// `skip_serializing_if` path resolution cannot follow, so the skip
/// attributes point here instead.
#[must_use]
pub fn map_is_empty(map: &ConfigMap) -> bool {
    map.is_empty()
}

/// Merge two configuration maps; `overrides` wins key-by-key.
#[must_use]
pub fn merged(defaults: &ConfigMap, overrides: &ConfigMap) -> ConfigMap {
    let mut result = defaults.clone();
    for (key, value) in overrides {
        result.insert(key.clone(), value.clone());
    }
    result
}

/// Render a masked preview of a configuration value for diagnostics.
///
/// Text values are assumed to be secrets: only the first and last two
/// characters survive, and short values are fully masked. Booleans and
/// numbers are rendered as-is.
#[must_use]
pub fn masked_preview(value: &ConfigValue) -> String {
    match value {
        ConfigValue::Bool(_) | ConfigValue::Number(_) => value.to_string(),
        ConfigValue::Text(text) => {
            let chars: Vec<char> = text.chars().collect();
            if chars.len() <= 6 {
                "****".to_string()
            } else {
                let head: String = chars.iter().take(2).collect();
                let tail: String = chars.iter().rev().take(2).rev().collect();
                format!("{head}…{tail}")
            }
        }
    }
}

/// Convenience constructor for a [`ConfigMap`] from key/value pairs.
#[must_use]
pub fn config_map<V: Into<ConfigValue>>(pairs: impl IntoIterator<Item = (&'static str, V)>) -> ConfigMap {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.into()))
        .collect()
}
