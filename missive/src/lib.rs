//! Vendor-agnostic message dispatch and address resolution.
//!
//! Two structurally identical problems share one engine shape: an ordered
//! list of interchangeable backends, tried sequentially until one produces
//! an acceptable result, with heterogeneous responses normalized into a
//! canonical model.
//!
//! - [`dispatch`]: send a [`Missive`] through ranked providers with
//!   geographic policy filtering and per-attempt outcome classification
//! - [`address`]: resolve an address through ranked geocoding backends with
//!   confidence normalization and suggestion synthesis
//!
//! Call [`missive_common::logging::init`] once at startup to enable
//! structured log output.

pub use missive_address as address;
pub use missive_common as common;
pub use missive_dispatch as dispatch;

pub use missive_common::{
    Address, ConfigMap, ConfigValue, DeliveryStatus, Missive, MissiveType, Recipient, Suggestion,
};

pub use missive_address::{AddressBackend, AddressQuery, ResolutionEngine};
pub use missive_dispatch::{
    MissiveSender, Provider, ProviderFactory, ProviderRegistry, ProvidersConfig,
};
