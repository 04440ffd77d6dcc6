//! Provider registry.
//!
//! Maps provider identifiers to factories and validates each declared
//! contract at registration time. Resolution order is registration order;
//! candidate ordering for a dispatch comes from the caller's provider list,
//! not from the registry.

use std::sync::Arc;

use ahash::AHashMap;
use tracing::warn;

use missive_common::MissiveType;

use crate::{error::RegistryError, provider::ProviderFactory};

#[derive(Default)]
pub struct ProviderRegistry {
    factories: Vec<(String, Arc<dyn ProviderFactory>)>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under its descriptor's name.
    ///
    /// The descriptor is validated here so that a malformed contract fails
    /// at startup instead of mid-dispatch.
    pub fn register(&mut self, factory: Arc<dyn ProviderFactory>) -> Result<(), RegistryError> {
        let descriptor = factory.descriptor();

        descriptor
            .validate()
            .map_err(|reason| RegistryError::InvalidContract {
                name: descriptor.name.clone(),
                reason,
            })?;

        let name = descriptor.name.clone();
        if self.factories.iter().any(|(existing, _)| *existing == name) {
            return Err(RegistryError::Duplicate(name));
        }

        self.factories.push((name, factory));
        Ok(())
    }

    /// Resolve an identifier to its factory.
    pub fn load(&self, identifier: &str) -> Result<Arc<dyn ProviderFactory>, RegistryError> {
        self.factories
            .iter()
            .find(|(name, _)| name == identifier)
            .map(|(_, factory)| Arc::clone(factory))
            .ok_or_else(|| RegistryError::Unknown(identifier.to_string()))
    }

    /// Every registered identifier, in registration order.
    #[must_use]
    pub fn identifiers(&self) -> Vec<String> {
        self.factories.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Group identifiers by the message types they declare support for.
    ///
    /// Each identifier lands in every bucket it supports, preserving
    /// first-seen order, deduplicated per bucket. Identifiers that fail to
    /// resolve are reported through `on_error` and skipped rather than
    /// aborting the whole grouping.
    pub fn group_by_type(
        &self,
        identifiers: &[String],
        mut on_error: impl FnMut(&str, &RegistryError),
    ) -> AHashMap<MissiveType, Vec<String>> {
        let mut groups: AHashMap<MissiveType, Vec<String>> = AHashMap::default();

        for identifier in identifiers {
            let factory = match self.load(identifier) {
                Ok(factory) => factory,
                Err(error) => {
                    warn!("Skipping unresolvable provider {identifier}: {error}");
                    on_error(identifier, &error);
                    continue;
                }
            };

            for &missive_type in &factory.descriptor().supported_types {
                let bucket = groups.entry(missive_type).or_default();
                if !bucket.contains(identifier) {
                    bucket.push(identifier.clone());
                }
            }
        }

        groups
    }
}
