//! Ordered-fallback dispatch of missives across interchangeable providers.
//!
//! The dispatcher resolves an ordered candidate list for a missive's type,
//! filters each candidate through the geographic policy, and invokes
//! providers sequentially until one accepts. Failures are classified per
//! attempt; the aggregate exhaustion error lists every attempt made.

pub mod diagnostics;
pub mod error;
pub mod outcome;
pub mod policy;
pub mod provider;
pub mod registry;
pub mod sender;

pub use diagnostics::ProviderDiagnostic;
pub use error::{DispatchError, ProviderError, RegistryError};
pub use outcome::{AttemptOutcome, AttemptRecord, GeoDebug};
pub use policy::{Coverage, Destination};
pub use provider::{
    OperationKind, Provider, ProviderDescriptor, ProviderFactory, ServiceInfo, StatusRecord,
};
pub use registry::ProviderRegistry;
pub use sender::{DispatchReport, MissiveSender, ProvidersConfig};
