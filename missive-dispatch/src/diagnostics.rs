//! Operability introspection for configured providers.
//!
//! Reports, per provider, which configuration keys are present and which
//! declared dependencies are installed. Secret values are never echoed; only
//! masked previews leave this module. Diagnostics never influence the
//! dispatch decision itself.

use serde::{Deserialize, Serialize};

use missive_common::{ConfigKeyStatus, DependencyProbe, DependencyStatus};

use crate::sender::MissiveSender;

/// Readiness snapshot for one configured provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDiagnostic {
    pub provider: String,
    pub config: Vec<ConfigKeyStatus>,
    pub dependencies: Vec<DependencyStatus>,
    /// Whether this provider produced the currently selected result.
    pub selected: bool,
}

impl ProviderDiagnostic {
    /// A provider is ready when every key is present and every dependency
    /// installed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.config.iter().all(|key| key.present)
            && self.dependencies.iter().all(|dependency| dependency.installed)
    }
}

impl MissiveSender {
    /// Snapshot the readiness of every configured provider.
    ///
    /// `selected` marks the provider that produced the current result, when
    /// one exists. Unresolvable identifiers are reported with empty key and
    /// dependency lists.
    #[must_use]
    pub fn describe_providers(
        &self,
        probe: &dyn DependencyProbe,
        selected: Option<&str>,
    ) -> Vec<ProviderDiagnostic> {
        self.providers
            .identifiers()
            .iter()
            .map(|identifier| {
                let Ok(factory) = self.registry.load(identifier) else {
                    return ProviderDiagnostic {
                        provider: identifier.clone(),
                        config: Vec::new(),
                        dependencies: Vec::new(),
                        selected: selected == Some(identifier.as_str()),
                    };
                };

                let config = self.provider_config(identifier);
                let descriptor = factory.descriptor();

                let config = descriptor
                    .config_keys
                    .iter()
                    .map(|key| ConfigKeyStatus::inspect(key, config.get(key)))
                    .collect();

                let dependencies = descriptor
                    .required_dependencies
                    .iter()
                    .map(|name| DependencyStatus {
                        name: name.clone(),
                        installed: probe.is_available(name),
                    })
                    .collect();

                ProviderDiagnostic {
                    provider: identifier.clone(),
                    config,
                    dependencies,
                    selected: selected == Some(identifier.as_str()),
                }
            })
            .collect()
    }
}
