//! Typed error handling for dispatch operations.
//!
//! Three layers of failure are distinguished:
//! - Provider-level: one provider invocation went wrong
//! - Registry-level: a provider identifier could not be resolved or its
//!   declared contract is inconsistent
//! - Dispatch-level: the whole ordered-fallback run failed

use thiserror::Error;

use missive_common::{DeliveryStatus, MissiveType};

use crate::provider::OperationKind;

/// Errors a single provider invocation can produce.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider does not implement this operation for this message type.
    ///
    /// Unregistered combinations degrade here instead of panicking, so a
    /// caller probing an optional operation gets a well-defined answer.
    #[error("Operation not implemented: {0}")]
    NotImplemented(OperationKind),

    /// The provider cannot run with the configuration it was built from.
    #[error("Provider configuration error: {0}")]
    Configuration(String),

    /// The vendor call itself failed (network, timeout, 5xx).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The vendor accepted the call but rejected the message.
    #[error("Rejected by provider: {0}")]
    Rejected(String),
}

impl ProviderError {
    /// Returns `true` if the provider simply lacks the operation.
    #[must_use]
    pub const fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented(_))
    }

    /// Returns `true` if this failure is attributable to configuration
    /// rather than the message or the vendor.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Errors raised while resolving provider identifiers.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The identifier does not resolve to any registered factory.
    #[error("Unknown provider: {0}")]
    Unknown(String),

    /// The factory's declared contract is internally inconsistent.
    #[error("Invalid provider contract for {name}: {reason}")]
    InvalidContract { name: String, reason: String },

    /// The identifier is already registered.
    #[error("Provider already registered: {0}")]
    Duplicate(String),
}

/// Top-level outcome of a full dispatch run.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The missive is past the sendable part of its lifecycle.
    #[error("Missive cannot be sent in status {0}")]
    NotSendable(DeliveryStatus),

    /// No registered provider declares support for this message type.
    #[error("No provider configured for {missive_type} (available: {available:?})")]
    NoCandidates {
        missive_type: MissiveType,
        available: Vec<String>,
    },

    /// A provider declined the send and fallback was disabled.
    #[error("Provider {provider} declined the send")]
    SendRejected { provider: String },

    /// A provider raised during the send and fallback was disabled.
    #[error("Provider {provider} failed: {source}")]
    ProviderFailure {
        provider: String,
        source: ProviderError,
    },

    /// A provider identifier could not be built and fallback was disabled.
    #[error("Provider {identifier} unavailable: {source}")]
    ProviderUnavailable {
        identifier: String,
        source: RegistryError,
    },

    /// Every candidate was skipped or failed.
    #[error("{message}")]
    Exhausted {
        message: String,
        attempts: Vec<crate::outcome::AttemptRecord>,
    },
}

impl DispatchError {
    /// Returns `true` if the whole candidate list was consumed without a
    /// success.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}
