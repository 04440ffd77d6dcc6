//! Canonical models for vendor-agnostic message dispatch and address
//! resolution.
//!
//! This crate holds the backend-agnostic data shapes every provider or
//! geocoding backend normalizes into:
//!
//! - [`Missive`]: a message-to-send value object with lifecycle stamps
//! - [`DeliveryStatus`]: the message lifecycle enum
//! - [`Address`]: a structured postal address with confidence and provenance
//! - [`ConfigValue`]/[`ConfigMap`]: flat configuration with secret masking
//! - [`country`]: the process-wide, read-only country reference index
//! - [`probe`]: dependency availability probing for readiness checks

pub mod address;
pub mod config;
pub mod country;
pub mod diagnostic;
pub mod logging;
pub mod missive;
pub mod probe;
pub mod status;

pub use address::{Address, Suggestion};
pub use config::{ConfigMap, ConfigValue, masked_preview, merged};
pub use diagnostic::{ConfigKeyStatus, DependencyStatus};
pub use missive::{Missive, MissiveType, Recipient};
pub use probe::{AssumeAvailable, DependencyProbe, StaticProbe};
pub use status::DeliveryStatus;
