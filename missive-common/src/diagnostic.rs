//! Shared readiness-report shapes.
//!
//! Both the dispatch and address sides report per-backend readiness with the
//! same two building blocks: configuration-key presence (with masked
//! previews) and external-dependency availability.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigValue, masked_preview};

/// Presence of one declared configuration key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigKeyStatus {
    pub key: String,
    pub present: bool,
    /// Masked preview of the value, absent when the key is missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

impl ConfigKeyStatus {
    /// Build the status for one key, masking the value when present.
    #[must_use]
    pub fn inspect(key: &str, value: Option<&ConfigValue>) -> Self {
        let value = value.filter(|value| value.is_populated());
        Self {
            key: key.to_string(),
            present: value.is_some(),
            preview: value.map(masked_preview),
        }
    }
}

/// Availability of one declared external dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyStatus {
    pub name: String,
    pub installed: bool,
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::ConfigKeyStatus;
    use crate::config::ConfigValue;

    #[test]
    fn inspect_masks_values_and_treats_blanks_as_missing() {
        let secret = ConfigValue::from("sk_live_4242424242");
        let status = ConfigKeyStatus::inspect("api_key", Some(&secret));
        assert!(status.present);
        assert_eq!(status.preview.as_deref(), Some("sk…42"));

        let blank = ConfigValue::from("   ");
        let status = ConfigKeyStatus::inspect("api_key", Some(&blank));
        assert!(!status.present);
        assert_eq!(status.preview, None);

        assert!(!ConfigKeyStatus::inspect("api_key", None).present);
    }
}
