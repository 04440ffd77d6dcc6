//! The ordered-fallback dispatcher.
//!
//! Walks the candidate provider list in order, consulting the geographic
//! policy and classifying every attempt, until one provider accepts the
//! missive or the list is exhausted. Strictly sequential: a send must fully
//! resolve before the next candidate is considered, because the first
//! acceptance wins and a send must never run twice.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use missive_common::{ConfigMap, ConfigValue, Missive, config::merged};

use crate::{
    error::DispatchError,
    outcome::{AttemptOutcome, AttemptRecord, GeoDebug},
    policy::{Destination, effective_coverage},
    registry::ProviderRegistry,
};

/// The caller's provider list: either plain ordered identifiers, or
/// identifier/settings pairs whose inline metadata can drive custom ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProvidersConfig {
    Ordered(Vec<String>),
    WithSettings(Vec<(String, ConfigMap)>),
}

impl ProvidersConfig {
    /// The identifiers in their configured order.
    #[must_use]
    pub fn identifiers(&self) -> Vec<String> {
        match self {
            Self::Ordered(identifiers) => identifiers.clone(),
            Self::WithSettings(entries) => {
                entries.iter().map(|(identifier, _)| identifier.clone()).collect()
            }
        }
    }

    /// Per-provider configuration overrides, when the map form is in use.
    #[must_use]
    pub fn settings_for(&self, identifier: &str) -> Option<&ConfigMap> {
        match self {
            Self::Ordered(_) => None,
            Self::WithSettings(entries) => entries
                .iter()
                .find(|(name, _)| name == identifier)
                .map(|(_, settings)| settings),
        }
    }

    /// Reorder by a numeric inline attribute (e.g. `price`), ascending.
    ///
    /// Stable: providers without the attribute keep their relative order and
    /// sort last. A no-op for the plain ordered form.
    pub fn sort_by_attribute(&mut self, attribute: &str) {
        if let Self::WithSettings(entries) = self {
            entries.sort_by(|(_, a), (_, b)| {
                let key = |settings: &ConfigMap| {
                    settings
                        .get(attribute)
                        .and_then(ConfigValue::as_f64)
                        .unwrap_or(f64::INFINITY)
                };
                key(a).total_cmp(&key(b))
            });
        }
    }
}

/// What a successful dispatch run reports back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchReport {
    /// The provider that accepted the send.
    pub provider: String,
    /// Every candidate touched, in order, including the winning one.
    pub attempts: Vec<AttemptRecord>,
}

/// Dispatches missives through an ordered provider list with fallback.
pub struct MissiveSender {
    pub(crate) registry: Arc<ProviderRegistry>,
    pub(crate) providers: ProvidersConfig,
    pub(crate) default_config: ConfigMap,
    sandbox: bool,
}

impl MissiveSender {
    #[must_use]
    pub fn new(registry: Arc<ProviderRegistry>, providers: ProvidersConfig) -> Self {
        Self {
            registry,
            providers,
            default_config: ConfigMap::default(),
            sandbox: false,
        }
    }

    /// Global defaults merged under every provider's own settings.
    #[must_use]
    pub fn with_default_config(mut self, config: ConfigMap) -> Self {
        self.default_config = config;
        self
    }

    /// In sandbox mode every provider is built with `sandbox = true` unless
    /// its own settings already pin the key.
    #[must_use]
    pub const fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// The merged configuration a provider would be built with.
    #[must_use]
    pub fn provider_config(&self, identifier: &str) -> ConfigMap {
        let mut config = self.providers.settings_for(identifier).map_or_else(
            || self.default_config.clone(),
            |settings| merged(&self.default_config, settings),
        );

        if self.sandbox && !config.contains_key("sandbox") {
            config.insert("sandbox".to_string(), ConfigValue::Bool(true));
        }

        config
    }

    /// Resolve the ordered candidate list for a missive.
    ///
    /// An explicit provider on the missive short-circuits everything: the
    /// list is exactly that provider, unfiltered, with no fallback behind it.
    pub fn candidate_list(&self, missive: &Missive) -> Result<Vec<String>, DispatchError> {
        if let Some(explicit) = missive.provider.as_deref().map(str::trim)
            && !explicit.is_empty()
        {
            return Ok(vec![explicit.to_string()]);
        }

        let identifiers = self.providers.identifiers();
        let groups = self.registry.group_by_type(&identifiers, |identifier, error| {
            warn!("Provider {identifier} dropped from candidates: {error}");
        });

        groups
            .get(&missive.missive_type)
            .filter(|candidates| !candidates.is_empty())
            .cloned()
            .ok_or_else(|| DispatchError::NoCandidates {
                missive_type: missive.missive_type,
                available: identifiers,
            })
    }

    /// Send a missive through the candidate list.
    ///
    /// With fallback enabled, failures advance to the next candidate; with it
    /// disabled, the first soft or hard failure aborts the call. Geographic
    /// skips never abort. The missive is mutated exactly once: marked sent on
    /// the winning attempt, or marked failed on exhaustion. Early aborts with
    /// fallback disabled leave it untouched.
    pub async fn send(
        &self,
        missive: &mut Missive,
        enable_fallback: bool,
    ) -> Result<DispatchReport, DispatchError> {
        if !missive.can_send() {
            return Err(DispatchError::NotSendable(missive.status));
        }

        let candidates = self.candidate_list(missive)?;
        let destination = Destination::from_missive(missive);
        let missive_type = missive.missive_type;

        debug!(
            candidates = candidates.len(),
            %missive_type,
            "Dispatching missive"
        );

        let mut attempts: Vec<AttemptRecord> = Vec::with_capacity(candidates.len());

        for (index, identifier) in candidates.iter().enumerate() {
            let attempt = index + 1;

            let factory = match self.registry.load(identifier) {
                Ok(factory) => factory,
                Err(error) => {
                    warn!("Provider {identifier} failed to load: {error}");
                    attempts.push(AttemptRecord {
                        provider: identifier.clone(),
                        attempt,
                        outcome: AttemptOutcome::LoadFailed,
                        error: Some(error.to_string()),
                        geo: None,
                    });
                    if enable_fallback {
                        continue;
                    }
                    return Err(DispatchError::ProviderUnavailable {
                        identifier: identifier.clone(),
                        source: error,
                    });
                }
            };

            let config = self.provider_config(identifier);
            let coverage = effective_coverage(factory.descriptor(), missive_type, &config);

            if !coverage.admits(&destination) {
                debug!(
                    provider = %identifier,
                    coverage = %coverage.describe(),
                    country = destination.country.as_deref().unwrap_or(""),
                    "Destination outside provider coverage, skipping"
                );
                attempts.push(AttemptRecord {
                    provider: identifier.clone(),
                    attempt,
                    outcome: AttemptOutcome::SkippedGeo,
                    error: None,
                    geo: Some(GeoDebug {
                        coverage: coverage.describe(),
                        country: destination.country.clone(),
                        continent: destination.continent.clone(),
                    }),
                });
                continue;
            }

            let provider = match factory.build(config) {
                Ok(provider) => provider,
                Err(error) => {
                    warn!("Provider {identifier} failed to build: {error}");
                    attempts.push(AttemptRecord {
                        provider: identifier.clone(),
                        attempt,
                        outcome: AttemptOutcome::HardFailed,
                        error: Some(error.to_string()),
                        geo: None,
                    });
                    if enable_fallback {
                        continue;
                    }
                    return Err(DispatchError::ProviderFailure {
                        provider: identifier.clone(),
                        source: error,
                    });
                }
            };

            match provider.send(missive).await {
                Ok(true) => {
                    info!(provider = %identifier, attempt, "Missive sent");
                    attempts.push(AttemptRecord {
                        provider: identifier.clone(),
                        attempt,
                        outcome: AttemptOutcome::Succeeded,
                        error: None,
                        geo: None,
                    });
                    missive.mark_sent(identifier);
                    return Ok(DispatchReport {
                        provider: identifier.clone(),
                        attempts,
                    });
                }
                Ok(false) => {
                    warn!(provider = %identifier, attempt, "Provider declined the send");
                    attempts.push(AttemptRecord {
                        provider: identifier.clone(),
                        attempt,
                        outcome: AttemptOutcome::SoftFailed,
                        error: None,
                        geo: None,
                    });
                    if !enable_fallback {
                        return Err(DispatchError::SendRejected {
                            provider: identifier.clone(),
                        });
                    }
                }
                Err(error) => {
                    warn!(provider = %identifier, attempt, "Provider failed: {error}");
                    attempts.push(AttemptRecord {
                        provider: identifier.clone(),
                        attempt,
                        outcome: AttemptOutcome::HardFailed,
                        error: Some(error.to_string()),
                        geo: None,
                    });
                    if !enable_fallback {
                        return Err(DispatchError::ProviderFailure {
                            provider: identifier.clone(),
                            source: error,
                        });
                    }
                }
            }
        }

        let message = exhaustion_message(&attempts);
        warn!("{message}");
        missive.mark_failed(message.clone());

        Err(DispatchError::Exhausted { message, attempts })
    }
}

fn exhaustion_message(attempts: &[AttemptRecord]) -> String {
    let summaries: Vec<String> = attempts.iter().map(AttemptRecord::summary).collect();

    // Soft failures carry no error text and must not mask an earlier hard
    // or load failure.
    let last_error = attempts
        .iter()
        .rev()
        .find_map(|record| record.error.clone());

    match last_error {
        Some(error) => format!(
            "All providers failed. Attempts: {}. Last error: {error}",
            summaries.join("; ")
        ),
        None => format!("All providers failed. Attempts: {}", summaries.join("; ")),
    }
}
