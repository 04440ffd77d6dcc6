//! The provider capability contract.
//!
//! Every messaging vendor adapter implements [`Provider`] and describes
//! itself through a [`ProviderDescriptor`]: which message types it can send,
//! which optional operations it implements per type, its geographic coverage,
//! and the configuration keys and external dependencies it consumes.
//!
//! Optional operations are declared in an explicit capability table built at
//! registration time. An undeclared combination degrades to
//! [`ProviderError::NotImplemented`] rather than a runtime lookup failure.

use core::fmt::{self, Display, Formatter};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use missive_common::{ConfigMap, DeliveryStatus, Missive, MissiveType};

use crate::error::ProviderError;

/// Operations a provider may implement per supported message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Send,
    Cancel,
    DeliveryStatus,
    ServiceInfo,
    ValidateWebhookSignature,
    HandleWebhook,
    ExtractMissiveId,
}

impl Display for OperationKind {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        let name = match self {
            Self::Send => "send",
            Self::Cancel => "cancel",
            Self::DeliveryStatus => "delivery_status",
            Self::ServiceInfo => "service_info",
            Self::ValidateWebhookSignature => "validate_webhook_signature",
            Self::HandleWebhook => "handle_webhook",
            Self::ExtractMissiveId => "extract_missive_id",
        };
        write!(fmt, "{name}")
    }
}

/// A vendor-side delivery status snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Static information about the vendor service behind a provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_unit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "missive_common::config::map_is_empty")]
    pub details: ConfigMap,
}

/// Self-description of a provider: supported types, capability table,
/// per-type geographic coverage, and its configuration surface.
///
/// Constructed once per factory and immutable afterwards. Coverage is a
/// declared value; the dispatcher may still override it per type through the
/// `<type>_geographic_coverage` configuration key.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderDescriptor {
    pub name: String,
    pub supported_types: Vec<MissiveType>,
    capabilities: Vec<(OperationKind, MissiveType)>,
    coverage: Vec<(MissiveType, String)>,
    pub config_keys: Vec<String>,
    pub required_dependencies: Vec<String>,
}

impl ProviderDescriptor {
    /// Start a descriptor for `name`, supporting `types` with the mandatory
    /// send capability for each.
    #[must_use]
    pub fn new(name: impl Into<String>, types: impl IntoIterator<Item = MissiveType>) -> Self {
        let supported_types: Vec<MissiveType> = types.into_iter().collect();
        let capabilities = supported_types
            .iter()
            .map(|&missive_type| (OperationKind::Send, missive_type))
            .collect();

        Self {
            name: name.into(),
            supported_types,
            capabilities,
            coverage: Vec::new(),
            config_keys: Vec::new(),
            required_dependencies: Vec::new(),
        }
    }

    /// Declare an optional operation for a supported message type.
    #[must_use]
    pub fn with_capability(mut self, operation: OperationKind, missive_type: MissiveType) -> Self {
        if !self.capabilities.contains(&(operation, missive_type)) {
            self.capabilities.push((operation, missive_type));
        }
        self
    }

    /// Declare geographic coverage for one message type.
    ///
    /// The value is either `"*"`, or a comma-separated list of ISO country
    /// codes and region names. An undeclared type defaults to `"*"`.
    #[must_use]
    pub fn with_coverage(mut self, missive_type: MissiveType, coverage: impl Into<String>) -> Self {
        self.coverage.push((missive_type, coverage.into()));
        self
    }

    /// Declare the configuration keys this provider consumes.
    #[must_use]
    pub fn with_config_keys(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.config_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Declare the external dependencies this provider requires.
    #[must_use]
    pub fn with_dependencies(
        mut self,
        dependencies: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.required_dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn supports_type(&self, missive_type: MissiveType) -> bool {
        self.supported_types.contains(&missive_type)
    }

    #[must_use]
    pub fn supports(&self, operation: OperationKind, missive_type: MissiveType) -> bool {
        self.capabilities.contains(&(operation, missive_type))
    }

    /// The declared coverage value for a message type, defaulting to the
    /// wildcard when the type declares none.
    #[must_use]
    pub fn declared_coverage(&self, missive_type: MissiveType) -> &str {
        self.coverage
            .iter()
            .find(|(covered, _)| *covered == missive_type)
            .map_or("*", |(_, value)| value.as_str())
    }

    /// Checks the descriptor for internal consistency.
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("provider name is empty".to_string());
        }
        if self.supported_types.is_empty() {
            return Err("no supported message types declared".to_string());
        }

        for &(operation, missive_type) in &self.capabilities {
            if !self.supports_type(missive_type) {
                return Err(format!(
                    "capability {operation} declared for unsupported type {missive_type}"
                ));
            }
        }

        for &missive_type in &self.supported_types {
            if !self.supports(OperationKind::Send, missive_type) {
                return Err(format!("missing send capability for {missive_type}"));
            }
        }

        Ok(())
    }
}

/// A live provider instance, built per dispatch from its merged
/// configuration.
///
/// Only `send` is mandatory. The remaining operations default to a graceful
/// [`ProviderError::NotImplemented`]; implementors that declare a capability
/// in their descriptor override the matching method.
#[async_trait]
pub trait Provider: Send + Sync {
    fn descriptor(&self) -> &ProviderDescriptor;

    /// Attempt the send. `Ok(true)` means accepted, `Ok(false)` means the
    /// provider declined without raising (a soft failure for fallback
    /// purposes).
    ///
    /// A successful provider stamps `external_id` on the missive; lifecycle
    /// fields are the dispatcher's to mutate.
    async fn send(&self, missive: &mut Missive) -> Result<bool, ProviderError>;

    async fn cancel(&self, _missive: &mut Missive) -> Result<bool, ProviderError> {
        Err(ProviderError::NotImplemented(OperationKind::Cancel))
    }

    async fn delivery_status(&self, _missive: &Missive) -> Result<StatusRecord, ProviderError> {
        Err(ProviderError::NotImplemented(OperationKind::DeliveryStatus))
    }

    async fn service_info(&self, _missive_type: MissiveType) -> Result<ServiceInfo, ProviderError> {
        Err(ProviderError::NotImplemented(OperationKind::ServiceInfo))
    }

    async fn validate_webhook_signature(
        &self,
        _payload: &[u8],
        _signature: &str,
    ) -> Result<bool, ProviderError> {
        Err(ProviderError::NotImplemented(
            OperationKind::ValidateWebhookSignature,
        ))
    }

    /// Interpret a vendor webhook payload as a delivery-status update.
    async fn handle_webhook(&self, _payload: &str) -> Result<Option<StatusRecord>, ProviderError> {
        Err(ProviderError::NotImplemented(OperationKind::HandleWebhook))
    }

    /// Pull the missive's external id out of a vendor webhook payload.
    async fn extract_missive_id(&self, _payload: &str) -> Result<Option<String>, ProviderError> {
        Err(ProviderError::NotImplemented(
            OperationKind::ExtractMissiveId,
        ))
    }
}

/// Builds [`Provider`] instances from merged configuration.
///
/// Factories are what the registry holds; one instance is built per dispatch
/// so configuration stays immutable for the provider's lifetime.
pub trait ProviderFactory: Send + Sync {
    fn descriptor(&self) -> &ProviderDescriptor;

    fn build(&self, config: ConfigMap) -> Result<Box<dyn Provider>, ProviderError>;
}
