//! Dependency availability probing.
//!
//! Backends declare the external dependencies (SDKs, system services) they
//! need; readiness checks ask a [`DependencyProbe`] whether each one is
//! available, without issuing any network call.

use ahash::AHashSet;

/// Answers whether a named external dependency is available.
pub trait DependencyProbe: Send + Sync {
    fn is_available(&self, dependency: &str) -> bool;
}

/// Probe that reports every dependency as available.
///
/// The default for production builds, where declared dependencies are
/// compile-time linked anyway.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeAvailable;

impl DependencyProbe for AssumeAvailable {
    fn is_available(&self, _dependency: &str) -> bool {
        true
    }
}

/// Probe backed by a fixed set of available dependency names.
#[derive(Debug, Clone, Default)]
pub struct StaticProbe {
    available: AHashSet<String>,
}

impl StaticProbe {
    #[must_use]
    pub fn new(available: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            available: available.into_iter().map(Into::into).collect(),
        }
    }
}

impl DependencyProbe for StaticProbe {
    fn is_available(&self, dependency: &str) -> bool {
        self.available.contains(dependency)
    }
}
