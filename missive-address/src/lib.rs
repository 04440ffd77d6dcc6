//! Ordered-fallback address resolution across interchangeable geocoding
//! backends.
//!
//! Each vendor adapter implements [`AddressBackend`] and reports results in
//! its own scale and shape; the [`ResolutionEngine`] walks the configured
//! backends in order, skips the unready ones, classifies errors, and
//! normalizes the first acceptable result into the canonical
//! [`missive_common::Address`].

pub mod backend;
pub mod confidence;
pub mod engine;
pub mod query;

pub use backend::{
    AddressBackend, GeocodeOutcome, ReferenceOutcome, ReverseOutcome, Throttle, ValidationOutcome,
};
pub use confidence::ConfidenceScale;
pub use engine::{
    BackendDiagnostic, EngineConfig, ResolutionEngine, ValidationResult, EXHAUSTION_ERROR,
};
pub use query::AddressQuery;
