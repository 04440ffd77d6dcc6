//! End-to-end resolution behavior over scripted backends.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use missive_address::{
    AddressBackend, AddressQuery, ConfidenceScale, EXHAUSTION_ERROR, GeocodeOutcome,
    ReferenceOutcome, ResolutionEngine, ReverseOutcome, ValidationOutcome,
};
use missive_common::{Address, ConfigMap, StaticProbe, Suggestion, config::config_map};

struct ScriptedBackend {
    name: String,
    config: ConfigMap,
    config_keys: Vec<String>,
    dependencies: Vec<String>,
    scale: ConfidenceScale,
    validation: ValidationOutcome,
    geocoding: GeocodeOutcome,
    reverse: ReverseOutcome,
    reference: ReferenceOutcome,
    calls: Arc<AtomicUsize>,
}

impl ScriptedBackend {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            config: ConfigMap::default(),
            config_keys: Vec::new(),
            dependencies: Vec::new(),
            scale: ConfidenceScale::Unit,
            validation: ValidationOutcome::default(),
            geocoding: GeocodeOutcome::default(),
            reverse: ReverseOutcome::default(),
            reference: ReferenceOutcome::default(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn validating(name: &str, confidence: f64) -> Self {
        let mut backend = Self::named(name);
        backend.validation = ValidationOutcome {
            is_valid: true,
            normalized: Address {
                line1: "5 Avenue Anatole France".to_string(),
                postal_code: "75007".to_string(),
                city: "Paris".to_string(),
                country: "FR".to_string(),
                ..Address::default()
            },
            confidence: Some(confidence),
            reference: Some(format!("{name}-ref")),
            ..ValidationOutcome::default()
        };
        backend
    }

    fn failing_validation(name: &str, error: &str) -> Self {
        let mut backend = Self::named(name);
        backend.validation = ValidationOutcome::failed(error);
        backend
    }

    fn call_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl AddressBackend for ScriptedBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> &ConfigMap {
        &self.config
    }

    fn config_keys(&self) -> Vec<String> {
        self.config_keys.clone()
    }

    fn required_dependencies(&self) -> Vec<String> {
        self.dependencies.clone()
    }

    fn confidence_scale(&self) -> ConfidenceScale {
        self.scale
    }

    async fn validate_address(&self, _query: &AddressQuery) -> ValidationOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.validation.clone()
    }

    async fn geocode(&self, _query: &AddressQuery) -> GeocodeOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.geocoding.clone()
    }

    async fn reverse_geocode(&self, _latitude: f64, _longitude: f64) -> ReverseOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reverse.clone()
    }

    async fn address_by_reference(&self, _reference: &str) -> ReferenceOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reference.clone()
    }
}

fn engine(backends: Vec<ScriptedBackend>) -> ResolutionEngine {
    ResolutionEngine::new(
        backends
            .into_iter()
            .map(|backend| Arc::new(backend) as Arc<dyn AddressBackend>)
            .collect(),
    )
}

fn paris_query() -> AddressQuery {
    AddressQuery::free_text("Champ de Mars, 75007 Paris, FR")
}

#[tokio::test]
async fn confident_match_needs_no_suggestions() {
    let mut backend = ScriptedBackend::validating("b1", 0.9);
    backend.validation.suggestions = vec![Suggestion {
        formatted: "Champ de Mars, Paris".to_string(),
        confidence: Some(0.5),
        ..Suggestion::default()
    }];

    let result = engine(vec![backend]).validate(&paris_query()).await;

    assert!(result.is_valid);
    assert_eq!(result.address.backend_used.as_deref(), Some("b1"));
    assert_eq!(result.address.backend_reference.as_deref(), Some("b1-ref"));
    assert_eq!(result.address.confidence, Some(0.9));
    assert!(result.address.suggestions.is_empty());
    assert_eq!(result.address.city, "Paris");
}

#[tokio::test]
async fn not_found_is_non_critical_and_advances_the_loop() {
    let b1 = ScriptedBackend::failing_validation("b1", "No address found");
    let b2 = ScriptedBackend::validating("b2", 0.6);

    let result = engine(vec![b1, b2]).validate(&paris_query()).await;

    assert!(result.is_valid);
    assert_eq!(result.address.backend_used.as_deref(), Some("b2"));
    assert_eq!(result.address.confidence, Some(0.6));
}

#[tokio::test]
async fn critical_errors_advance_the_loop() {
    let b1 = ScriptedBackend::failing_validation("b1", "Internal error: upstream timeout");
    let b2 = ScriptedBackend::validating("b2", 0.8);

    let result = engine(vec![b1, b2]).validate(&paris_query()).await;

    assert_eq!(result.address.backend_used.as_deref(), Some("b2"));
}

#[tokio::test]
async fn not_found_from_the_last_candidate_is_carried_through() {
    let b1 = ScriptedBackend::failing_validation("b1", "No address found");

    let result = engine(vec![b1]).validate(&paris_query()).await;

    assert!(!result.is_valid);
    assert_eq!(result.address.backend_used.as_deref(), Some("b1"));
    assert_eq!(result.address.errors, vec!["No address found"]);
}

#[tokio::test]
async fn missing_configuration_excludes_a_backend_before_any_call() {
    let mut b1 = ScriptedBackend::validating("b1", 0.9);
    b1.config_keys = vec!["api_key".to_string()];
    let b1_calls = b1.call_count();

    let b2 = ScriptedBackend::validating("b2", 0.7);

    let result = engine(vec![b1, b2]).validate(&paris_query()).await;

    assert_eq!(b1_calls.load(Ordering::SeqCst), 0);
    assert_eq!(result.address.backend_used.as_deref(), Some("b2"));
}

#[tokio::test]
async fn missing_dependency_excludes_a_backend_before_any_call() {
    let mut b1 = ScriptedBackend::validating("b1", 0.9);
    b1.dependencies = vec!["vendor-sdk".to_string()];
    let b1_calls = b1.call_count();

    let b2 = ScriptedBackend::validating("b2", 0.7);

    let engine = engine(vec![b1, b2]).with_probe(Arc::new(StaticProbe::new(["other-sdk"])));
    let result = engine.validate(&paris_query()).await;

    assert_eq!(b1_calls.load(Ordering::SeqCst), 0);
    assert_eq!(result.address.backend_used.as_deref(), Some("b2"));
}

#[tokio::test]
async fn exhaustion_is_a_representable_result() {
    let b1 = ScriptedBackend::failing_validation("b1", "API key not configured");
    let b2 = ScriptedBackend::failing_validation("b2", "Internal error: boom");

    let result = engine(vec![b1, b2]).validate(&paris_query()).await;

    assert!(!result.is_valid);
    assert_eq!(result.address.errors, vec![EXHAUSTION_ERROR]);
    assert!(result.address.is_empty());
}

#[tokio::test]
async fn raw_scales_are_normalized_to_the_unit_interval() {
    let mut backend = ScriptedBackend::validating("b1", 85.0);
    backend.scale = ConfidenceScale::Percent;

    let result = engine(vec![backend]).validate(&paris_query()).await;
    assert_eq!(result.address.confidence, Some(0.85));

    let mut backend = ScriptedBackend::validating("b2", 6.0);
    backend.scale = ConfidenceScale::ZeroToTen;

    let result = engine(vec![backend]).validate(&paris_query()).await;
    assert_eq!(result.address.confidence, Some(0.6));
}

#[tokio::test]
async fn low_confidence_match_attaches_ranked_bounded_suggestions() {
    let mut backend = ScriptedBackend::validating("b1", 45.0);
    backend.scale = ConfidenceScale::Percent;
    backend.validation.suggestions = (1..=7)
        .map(|i| Suggestion {
            formatted: format!("Alternative {i}"),
            confidence: Some(f64::from(i) * 10.0),
            ..Suggestion::default()
        })
        .collect();

    let result = engine(vec![backend]).validate(&paris_query()).await;

    // 0.45 is below the default validity threshold of 0.6.
    assert_eq!(result.address.confidence, Some(0.45));
    assert_eq!(result.address.suggestions.len(), 5);
    assert_eq!(result.address.suggestions[0].formatted, "Alternative 7");
    assert_eq!(result.address.suggestions[0].confidence, Some(0.7));
    assert_eq!(result.address.suggestions[4].formatted, "Alternative 3");
}

#[tokio::test]
async fn below_minimum_confidence_tries_the_next_backend() {
    let b1 = ScriptedBackend::validating("b1", 0.2);
    let b2 = ScriptedBackend::validating("b2", 0.8);

    let result = engine(vec![b1, b2]).validate(&paris_query()).await;

    assert_eq!(result.address.backend_used.as_deref(), Some("b2"));
    assert_eq!(result.address.confidence, Some(0.8));
}

#[tokio::test]
async fn the_last_candidate_may_return_a_low_confidence_match() {
    let b1 = ScriptedBackend::validating("b1", 0.2);

    let result = engine(vec![b1]).validate(&paris_query()).await;

    assert_eq!(result.address.backend_used.as_deref(), Some("b1"));
    assert_eq!(result.address.confidence, Some(0.2));
}

#[tokio::test]
async fn geocoding_keeps_the_structured_seed() {
    let mut backend = ScriptedBackend::named("b1");
    backend.geocoding = GeocodeOutcome {
        latitude: Some(48.855_74),
        longitude: Some(2.298_82),
        accuracy: Some("rooftop".to_string()),
        confidence: Some(0.9),
        formatted: "Champ de Mars, 75007 Paris, France".to_string(),
        reference: Some("b1-geo".to_string()),
        errors: Vec::new(),
    };

    let query = AddressQuery {
        line1: "Champ de Mars".to_string(),
        postal_code: "75007".to_string(),
        city: "Paris".to_string(),
        country: "FR".to_string(),
        ..AddressQuery::default()
    };

    let address = engine(vec![backend]).geocode(&query).await;

    assert_eq!(address.latitude, Some(48.855_74));
    assert_eq!(address.city, "Paris");
    assert_eq!(address.backend_used.as_deref(), Some("b1"));
    assert_eq!(address.backend_reference.as_deref(), Some("b1-geo"));
    assert_eq!(
        address.extras.get("accuracy").and_then(|value| value.as_str()),
        Some("rooftop")
    );
}

#[tokio::test]
async fn geocoding_without_coordinates_advances_the_loop() {
    let b1 = ScriptedBackend::named("b1");
    let mut b2 = ScriptedBackend::named("b2");
    b2.geocoding = GeocodeOutcome {
        latitude: Some(35.658_58),
        longitude: Some(139.745_44),
        ..GeocodeOutcome::default()
    };

    let address = engine(vec![b1, b2]).geocode(&AddressQuery::free_text("Tokyo Tower")).await;

    assert_eq!(address.backend_used.as_deref(), Some("b2"));
}

#[tokio::test]
async fn reverse_geocoding_normalizes_and_stamps_coordinates() {
    let mut backend = ScriptedBackend::named("b1");
    backend.scale = ConfidenceScale::ZeroToTen;
    backend.reverse = ReverseOutcome {
        address: Address {
            line1: "5 Avenue Anatole France".to_string(),
            city: "Paris".to_string(),
            country: "FR".to_string(),
            ..Address::default()
        },
        confidence: Some(8.0),
        errors: Vec::new(),
    };

    let address = engine(vec![backend]).reverse_geocode(48.858_37, 2.294_48).await;

    assert_eq!(address.confidence, Some(0.8));
    assert_eq!(address.latitude, Some(48.858_37));
    assert_eq!(address.backend_used.as_deref(), Some("b1"));
}

#[tokio::test]
async fn reference_lookup_routes_to_the_named_backend() {
    let b1 = ScriptedBackend::named("b1");
    let b1_calls = b1.call_count();

    let mut b2 = ScriptedBackend::named("b2");
    b2.reference = ReferenceOutcome {
        address: Address {
            city: "Paris".to_string(),
            ..Address::default()
        },
        errors: Vec::new(),
    };

    let engine = engine(vec![b1, b2]);
    let address = engine.by_reference("b2", "ref-42").await;

    assert_eq!(address.backend_used.as_deref(), Some("b2"));
    assert_eq!(address.backend_reference.as_deref(), Some("ref-42"));
    assert_eq!(b1_calls.load(Ordering::SeqCst), 0);

    let unknown = engine.by_reference("ghost", "ref-42").await;
    assert_eq!(unknown.errors, vec!["Unknown address backend: ghost"]);
}

#[tokio::test]
async fn diagnostics_report_readiness_without_echoing_secrets() {
    let mut backend = ScriptedBackend::validating("b1", 0.9);
    backend.config = config_map([("api_key", "sk_live_4242424242")]);
    backend.config_keys = vec!["api_key".to_string(), "endpoint".to_string()];
    backend.dependencies = vec!["vendor-sdk".to_string()];

    let engine = engine(vec![backend]).with_probe(Arc::new(StaticProbe::new(["vendor-sdk"])));
    let diagnostics = engine.describe_backends(Some("b1"));

    assert_eq!(diagnostics.len(), 1);
    let diagnostic = &diagnostics[0];
    assert!(diagnostic.selected);
    assert!(diagnostic.config[0].present);
    assert_eq!(diagnostic.config[0].preview.as_deref(), Some("sk…42"));
    assert!(!diagnostic.config[1].present);
    assert!(diagnostic.dependencies[0].installed);
}
