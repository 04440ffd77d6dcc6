//! The ordered-fallback resolution engine.
//!
//! Tries configured backends in order and returns the first result without a
//! critical error, normalized into the canonical [`Address`]. Running out of
//! candidates is a normal, representable outcome: the engine returns an
//! address whose `errors` carry the aggregate message, never an `Err`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use missive_common::{
    Address, AssumeAvailable, ConfigKeyStatus, DependencyProbe, DependencyStatus, Suggestion,
};

use crate::{
    backend::{AddressBackend, ValidationOutcome},
    query::AddressQuery,
};

/// Default normalized confidence below which a result is treated as
/// "nothing to offer" and the next backend is tried.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.4;

/// Default cap on synthesized suggestions.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// The aggregate error carried when every candidate was skipped or failed.
pub const EXHAUSTION_ERROR: &str = "All configured address backends failed to process the request";

/// Engine-level tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub min_confidence: f64,
    pub suggestion_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

/// What a validation call reports back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub address: Address,
}

/// Readiness snapshot for one configured backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendDiagnostic {
    pub backend: String,
    pub config: Vec<ConfigKeyStatus>,
    pub dependencies: Vec<DependencyStatus>,
    /// Whether this backend produced the currently selected result.
    pub selected: bool,
}

/// Resolves addresses through an ordered backend list with fallback.
pub struct ResolutionEngine {
    backends: Vec<Arc<dyn AddressBackend>>,
    probe: Arc<dyn DependencyProbe>,
    config: EngineConfig,
}

impl ResolutionEngine {
    #[must_use]
    pub fn new(backends: Vec<Arc<dyn AddressBackend>>) -> Self {
        Self {
            backends,
            probe: Arc::new(AssumeAvailable),
            config: EngineConfig::default(),
        }
    }

    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn DependencyProbe>) -> Self {
        self.probe = probe;
        self
    }

    #[must_use]
    pub const fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate structured or free-text address components.
    ///
    /// On a confident match the result carries no suggestions; below the
    /// backend's validity threshold up to `suggestion_limit` ranked
    /// alternatives are attached.
    pub async fn validate(&self, query: &AddressQuery) -> ValidationResult {
        let candidates = self.ready_backends();
        let last = candidates.len().saturating_sub(1);

        for (index, backend) in candidates.iter().enumerate() {
            let outcome = backend.validate_address(query).await;

            if let Some(critical) = outcome.errors.iter().find(|error| is_critical(error)) {
                warn!(backend = %backend.name(), "Validation failed: {critical}");
                continue;
            }

            if !outcome.errors.is_empty() {
                debug!(backend = %backend.name(), "Nothing to offer: {}", outcome.errors.join("; "));
                if index == last {
                    return ValidationResult {
                        is_valid: false,
                        address: Address {
                            backend_used: Some(backend.name().to_string()),
                            warnings: outcome.warnings,
                            errors: outcome.errors,
                            ..Address::default()
                        },
                    };
                }
                continue;
            }

            let confidence = backend.confidence_scale().normalize_opt(outcome.confidence);

            if confidence.unwrap_or(0.0) < self.config.min_confidence && index != last {
                warn!(
                    backend = %backend.name(),
                    confidence = confidence.unwrap_or(0.0),
                    "Match below minimum confidence, trying next backend"
                );
                continue;
            }

            let is_valid = outcome.is_valid;
            return ValidationResult {
                is_valid,
                address: self.finalize_validation(query, backend.as_ref(), outcome, confidence),
            };
        }

        ValidationResult {
            is_valid: false,
            address: exhausted(),
        }
    }

    /// Resolve structured or free-text components to coordinates.
    pub async fn geocode(&self, query: &AddressQuery) -> Address {
        let candidates = self.ready_backends();
        let last = candidates.len().saturating_sub(1);

        for (index, backend) in candidates.iter().enumerate() {
            let outcome = backend.geocode(query).await;

            if let Some(critical) = outcome.errors.iter().find(|error| is_critical(error)) {
                warn!(backend = %backend.name(), "Geocoding failed: {critical}");
                continue;
            }

            let found = outcome.errors.is_empty()
                && outcome.latitude.is_some()
                && outcome.longitude.is_some();
            if !found {
                if index == last {
                    return Address {
                        backend_used: Some(backend.name().to_string()),
                        errors: outcome.errors,
                        ..Address::default()
                    };
                }
                continue;
            }

            let mut address = query.to_address();
            address.latitude = outcome.latitude;
            address.longitude = outcome.longitude;
            address.formatted = outcome.formatted;
            address.confidence = backend.confidence_scale().normalize_opt(outcome.confidence);
            address.backend_reference = outcome.reference;
            address.backend_used = Some(backend.name().to_string());
            if let Some(accuracy) = outcome.accuracy {
                address.extras.insert("accuracy".to_string(), accuracy.into());
            }
            return address;
        }

        exhausted()
    }

    /// Resolve coordinates back to an address.
    pub async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Address {
        let candidates = self.ready_backends();
        let last = candidates.len().saturating_sub(1);

        for (index, backend) in candidates.iter().enumerate() {
            let outcome = backend.reverse_geocode(latitude, longitude).await;

            if let Some(critical) = outcome.errors.iter().find(|error| is_critical(error)) {
                warn!(backend = %backend.name(), "Reverse geocoding failed: {critical}");
                continue;
            }

            if !outcome.errors.is_empty() || outcome.address.is_empty() {
                if index == last {
                    return Address {
                        backend_used: Some(backend.name().to_string()),
                        errors: outcome.errors,
                        ..Address::default()
                    };
                }
                continue;
            }

            let mut address = outcome.address;
            address.confidence = backend.confidence_scale().normalize_opt(outcome.confidence);
            address.backend_used = Some(backend.name().to_string());
            if address.latitude.is_none() {
                address.latitude = Some(latitude);
                address.longitude = Some(longitude);
            }
            return address;
        }

        exhausted()
    }

    /// Re-fetch an address through the backend that originally produced it.
    pub async fn by_reference(&self, backend_name: &str, reference: &str) -> Address {
        let Some(backend) = self
            .backends
            .iter()
            .find(|backend| backend.name() == backend_name)
        else {
            return Address {
                errors: vec![format!("Unknown address backend: {backend_name}")],
                ..Address::default()
            };
        };

        let outcome = backend.address_by_reference(reference).await;
        if !outcome.errors.is_empty() {
            return Address {
                backend_used: Some(backend_name.to_string()),
                errors: outcome.errors,
                ..Address::default()
            };
        }

        let mut address = outcome.address;
        address.backend_used = Some(backend_name.to_string());
        address.backend_reference = Some(reference.to_string());
        address
    }

    /// Snapshot the readiness of every configured backend.
    #[must_use]
    pub fn describe_backends(&self, selected: Option<&str>) -> Vec<BackendDiagnostic> {
        self.backends
            .iter()
            .map(|backend| {
                let config = backend
                    .config_keys()
                    .iter()
                    .map(|key| ConfigKeyStatus::inspect(key, backend.config().get(key)))
                    .collect();

                let dependencies = backend
                    .required_dependencies()
                    .into_iter()
                    .map(|name| {
                        let installed = self.probe.is_available(&name);
                        DependencyStatus { name, installed }
                    })
                    .collect();

                BackendDiagnostic {
                    backend: backend.name().to_string(),
                    config,
                    dependencies,
                    selected: selected == Some(backend.name()),
                }
            })
            .collect()
    }

    /// The candidate list for one resolution call.
    ///
    /// Computed once per call: a backend missing configuration or a declared
    /// dependency is excluded before any network call is made.
    fn ready_backends(&self) -> Vec<Arc<dyn AddressBackend>> {
        self.backends
            .iter()
            .filter(|backend| {
                let missing = backend.missing_config();
                if !missing.is_empty() {
                    debug!(
                        backend = %backend.name(),
                        "Skipped: missing configuration keys {missing:?}"
                    );
                    return false;
                }

                if let Some(dependency) = backend
                    .required_dependencies()
                    .iter()
                    .find(|dependency| !self.probe.is_available(dependency))
                {
                    debug!(
                        backend = %backend.name(),
                        "Skipped: dependency {dependency} not installed"
                    );
                    return false;
                }

                true
            })
            .map(Arc::clone)
            .collect()
    }

    fn finalize_validation(
        &self,
        query: &AddressQuery,
        backend: &dyn AddressBackend,
        outcome: ValidationOutcome,
        confidence: Option<f64>,
    ) -> Address {
        let scale = backend.confidence_scale();

        let mut address = query.to_address().merge(&outcome.normalized, true);
        address.confidence = confidence;
        address.backend_used = Some(backend.name().to_string());
        address.backend_reference = outcome.reference;
        address.warnings = outcome.warnings;
        address.suggestions.clear();

        if confidence.unwrap_or(0.0) < backend.validity_threshold() {
            let mut suggestions: Vec<Suggestion> = outcome
                .suggestions
                .into_iter()
                .map(|mut suggestion| {
                    suggestion.confidence = scale.normalize_opt(suggestion.confidence);
                    suggestion
                })
                .collect();

            // Ranked best-first; unscored alternatives sort last.
            suggestions.sort_by(|a, b| {
                b.confidence
                    .unwrap_or(0.0)
                    .total_cmp(&a.confidence.unwrap_or(0.0))
            });
            suggestions.truncate(self.config.suggestion_limit);
            address.suggestions = suggestions;
        }

        address
    }
}

/// Whether a backend error aborts normalization of that backend's result.
///
/// "No address found" is an expected outcome, not a fault.
#[must_use]
pub fn is_critical(error: &str) -> bool {
    let lower = error.to_lowercase();

    lower.contains("not configured")
        || lower.contains("not installed")
        || (lower.contains("error") && !lower.contains("no address found"))
}

fn exhausted() -> Address {
    Address {
        errors: vec![EXHAUSTION_ERROR.to_string()],
        ..Address::default()
    }
}
