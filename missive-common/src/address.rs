//! Canonical structured postal address.
//!
//! Every address backend returns its own response schema; the resolution
//! engine normalizes all of them into [`Address`]. Provenance (`backend_used`,
//! `backend_reference`) records which backend produced the result so a later
//! reverse-lookup can be routed back to it.

use serde::{Deserialize, Serialize};

use crate::config::ConfigMap;

/// A ranked alternative produced during validation when the top match is not
/// confident enough.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub formatted: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// Backend-agnostic structured address with confidence and provenance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub line1: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub line2: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub line3: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub postal_code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub city: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub state: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub formatted: String,
    /// Identifier of the backend that produced this result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_used: Option<String>,
    /// Opaque backend-side id usable for a later reverse-lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_reference: Option<String>,
    /// Normalized confidence in `[0, 1]`, absent when the backend reported
    /// none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<Suggestion>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    /// Backend-specific leftovers that have no canonical field.
    #[serde(default, skip_serializing_if = "crate::config::map_is_empty")]
    pub extras: ConfigMap,
}

impl Address {
    /// Checks whether no user-level field is populated.
    ///
    /// Confidence, coordinates, provenance, and diagnostics never count as
    /// "populated" on their own.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.line1.is_empty()
            && self.line2.is_empty()
            && self.line3.is_empty()
            && self.postal_code.is_empty()
            && self.city.is_empty()
            && self.state.is_empty()
            && self.country.is_empty()
    }

    /// Combine two addresses field-by-field into a new value.
    ///
    /// With `prefer_other` the populated fields of `other` win; otherwise the
    /// populated fields of `self` win. Either way an empty field on the
    /// preferred side falls back to the other side. Provenance always prefers
    /// `other` when set, and `extras` are unioned with `other` overriding.
    /// Neither input is mutated.
    #[must_use]
    pub fn merge(&self, other: &Self, prefer_other: bool) -> Self {
        let mut extras = self.extras.clone();
        for (key, value) in &other.extras {
            extras.insert(key.clone(), value.clone());
        }

        Self {
            line1: pick_str(&self.line1, &other.line1, prefer_other),
            line2: pick_str(&self.line2, &other.line2, prefer_other),
            line3: pick_str(&self.line3, &other.line3, prefer_other),
            postal_code: pick_str(&self.postal_code, &other.postal_code, prefer_other),
            city: pick_str(&self.city, &other.city, prefer_other),
            state: pick_str(&self.state, &other.state, prefer_other),
            country: pick_str(&self.country, &other.country, prefer_other),
            latitude: pick_opt(self.latitude, other.latitude, prefer_other),
            longitude: pick_opt(self.longitude, other.longitude, prefer_other),
            formatted: pick_str(&self.formatted, &other.formatted, prefer_other),
            backend_used: other.backend_used.clone().or_else(|| self.backend_used.clone()),
            backend_reference: other
                .backend_reference
                .clone()
                .or_else(|| self.backend_reference.clone()),
            confidence: pick_opt(self.confidence, other.confidence, prefer_other),
            suggestions: if other.suggestions.is_empty() {
                self.suggestions.clone()
            } else {
                other.suggestions.clone()
            },
            warnings: if other.warnings.is_empty() {
                self.warnings.clone()
            } else {
                other.warnings.clone()
            },
            errors: if other.errors.is_empty() {
                self.errors.clone()
            } else {
                other.errors.clone()
            },
            extras,
        }
    }

    /// Format the populated components into a single display string.
    #[must_use]
    pub fn format_single_line(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if !self.line1.is_empty() {
            parts.push(self.line1.clone());
        }
        if !self.line2.is_empty() {
            parts.push(self.line2.clone());
        }

        let city_line: Vec<&str> = [self.postal_code.as_str(), self.city.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect();
        if !city_line.is_empty() {
            parts.push(city_line.join(" "));
        }

        if !self.state.is_empty() {
            parts.push(self.state.clone());
        }
        if !self.country.is_empty() {
            parts.push(self.country.clone());
        }

        parts.join(", ")
    }
}

fn pick_str(current: &str, new_value: &str, prefer_other: bool) -> String {
    if prefer_other && !new_value.is_empty() {
        new_value.to_string()
    } else if !prefer_other && !current.is_empty() {
        current.to_string()
    } else if new_value.is_empty() {
        current.to_string()
    } else {
        new_value.to_string()
    }
}

fn pick_opt<T: Copy>(current: Option<T>, new_value: Option<T>, prefer_other: bool) -> Option<T> {
    if prefer_other && new_value.is_some() {
        new_value
    } else if !prefer_other && current.is_some() {
        current
    } else {
        new_value.or(current)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{Address, Suggestion};

    fn populated() -> Address {
        Address {
            line1: "5 Avenue Anatole France".to_string(),
            postal_code: "75007".to_string(),
            city: "Paris".to_string(),
            country: "FR".to_string(),
            latitude: Some(48.858_37),
            longitude: Some(2.294_48),
            confidence: Some(0.92),
            ..Default::default()
        }
    }

    #[test]
    fn empty_ignores_confidence_and_coordinates() {
        let address = Address {
            confidence: Some(0.9),
            latitude: Some(48.0),
            longitude: Some(2.0),
            backend_used: Some("nominatim".to_string()),
            ..Default::default()
        };

        assert!(address.is_empty());
        assert!(!populated().is_empty());
    }

    #[test]
    fn merge_is_idempotent() {
        let address = populated();
        assert_eq!(address.merge(&address, true), address);
    }

    #[test]
    fn merge_prefers_the_requested_side() {
        let a = Address {
            line1: "A".to_string(),
            ..Default::default()
        };
        let b = Address {
            line1: "B".to_string(),
            ..Default::default()
        };

        assert_eq!(a.merge(&b, true).line1, "B");
        assert_eq!(a.merge(&b, false).line1, "A");
    }

    #[test]
    fn merge_falls_back_to_the_populated_side() {
        let sparse = Address::default();
        let full = populated();

        // Preferring the empty side still keeps the populated values.
        assert_eq!(full.merge(&sparse, true).city, "Paris");
        assert_eq!(sparse.merge(&full, false).city, "Paris");
    }

    #[test]
    fn merge_provenance_prefers_other() {
        let mut a = populated();
        a.backend_used = Some("here".to_string());
        let mut b = Address::default();
        b.backend_used = Some("nominatim".to_string());

        assert_eq!(a.merge(&b, false).backend_used.as_deref(), Some("nominatim"));
    }

    #[test]
    fn serialization_skips_empty_fields() {
        let address = Address {
            city: "Paris".to_string(),
            suggestions: vec![Suggestion {
                formatted: "Paris, FR".to_string(),
                confidence: Some(0.4),
                ..Default::default()
            }],
            ..Default::default()
        };

        let json = serde_json::to_string(&address).unwrap();
        assert!(json.contains("\"city\""));
        assert!(!json.contains("\"line1\""));
        assert!(!json.contains("\"errors\""));
        assert!(!json.contains("\"latitude\":null"));
        assert!(!json.contains("\"extras\""));
    }

    #[test]
    fn single_line_format() {
        assert_eq!(
            populated().format_single_line(),
            "5 Avenue Anatole France, 75007 Paris, FR"
        );
    }
}
