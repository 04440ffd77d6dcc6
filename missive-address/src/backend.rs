//! The address backend capability contract.
//!
//! A backend is a thin adapter over one geocoding vendor. Operations never
//! return `Result`: vendor trouble is reported through the `errors` list of
//! each outcome, which the engine classifies as critical or not.
//!
//! Unimplemented operations degrade to an outcome whose `errors` states the
//! capability is not implemented, which the engine treats like "nothing to
//! offer" and advances past.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::{sync::Mutex, time::Instant};

use missive_common::{Address, ConfigMap, Suggestion};

use crate::confidence::ConfidenceScale;

/// Default confidence above which a validation needs no suggestions.
pub const DEFAULT_VALIDITY_THRESHOLD: f64 = 0.6;

/// What a backend's validation call reports. Confidence is on the backend's
/// raw scale; the engine normalizes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub normalized: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<Suggestion>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl ValidationOutcome {
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            errors: vec![error.into()],
            ..Self::default()
        }
    }
}

/// What a backend's forward-geocoding call reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodeOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub formatted: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl GeocodeOutcome {
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            errors: vec![error.into()],
            ..Self::default()
        }
    }
}

/// What a backend's reverse-geocoding call reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReverseOutcome {
    pub address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ReverseOutcome {
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            errors: vec![error.into()],
            ..Self::default()
        }
    }
}

/// What a backend's lookup-by-reference call reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceOutcome {
    pub address: Address,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ReferenceOutcome {
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            errors: vec![error.into()],
            ..Self::default()
        }
    }
}

/// An interchangeable geocoding backend.
#[async_trait]
pub trait AddressBackend: Send + Sync {
    fn name(&self) -> &str;

    /// The configuration this backend was built with.
    fn config(&self) -> &ConfigMap;

    /// The configuration keys this backend requires.
    fn config_keys(&self) -> Vec<String> {
        Vec::new()
    }

    /// External dependencies this backend requires.
    fn required_dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// Required keys that are missing or blank in the configuration.
    fn missing_config(&self) -> Vec<String> {
        self.config_keys()
            .into_iter()
            .filter(|key| {
                !self
                    .config()
                    .get(key)
                    .is_some_and(missive_common::ConfigValue::is_populated)
            })
            .collect()
    }

    /// The raw scale this backend scores confidence on.
    fn confidence_scale(&self) -> ConfidenceScale {
        ConfidenceScale::Unit
    }

    /// Normalized confidence above which validation needs no suggestions.
    fn validity_threshold(&self) -> f64 {
        DEFAULT_VALIDITY_THRESHOLD
    }

    async fn validate_address(&self, _query: &crate::query::AddressQuery) -> ValidationOutcome {
        ValidationOutcome::failed(format!(
            "Address validation is not implemented by {}",
            self.name()
        ))
    }

    async fn geocode(&self, _query: &crate::query::AddressQuery) -> GeocodeOutcome {
        GeocodeOutcome::failed(format!("Geocoding is not implemented by {}", self.name()))
    }

    async fn reverse_geocode(&self, _latitude: f64, _longitude: f64) -> ReverseOutcome {
        ReverseOutcome::failed(format!(
            "Reverse geocoding is not implemented by {}",
            self.name()
        ))
    }

    async fn address_by_reference(&self, _reference: &str) -> ReferenceOutcome {
        ReferenceOutcome::failed(format!(
            "Reference lookup is not implemented by {}",
            self.name()
        ))
    }
}

/// Backend-local minimum inter-request interval.
///
/// Free vendors impose request-rate floors; a backend holds one throttle and
/// awaits it before every outbound call. State is never shared across
/// backend instances.
pub struct Throttle {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl Throttle {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::const_new(None),
        }
    }

    /// Sleep until at least the configured interval has passed since the
    /// previous call, then stamp the new request time.
    pub async fn wait(&self) {
        let mut last = self.last.lock().await;

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval - elapsed).await;
            }
        }

        *last = Some(Instant::now());
    }
}
