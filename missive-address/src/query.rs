//! The address resolution request.

use serde::{Deserialize, Serialize};

use missive_common::Address;

/// Structured or free-text address components submitted for resolution.
///
/// Populated structured fields seed the canonical result, so a backend that
/// returns only coordinates still yields a usable address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressQuery {
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
    /// Unstructured query; wins over the structured fields when set.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub free_text: String,
}

impl AddressQuery {
    /// A query holding only free text.
    #[must_use]
    pub fn free_text(text: impl Into<String>) -> Self {
        Self {
            free_text: text.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.free_text.trim().is_empty()
            && self.line1.is_empty()
            && self.line2.is_empty()
            && self.line3.is_empty()
            && self.postal_code.is_empty()
            && self.city.is_empty()
            && self.state.is_empty()
            && self.country.is_empty()
    }

    /// The textual query handed to a backend.
    #[must_use]
    pub fn query_string(&self) -> String {
        if !self.free_text.trim().is_empty() {
            return self.free_text.trim().to_string();
        }

        let mut parts: Vec<String> = Vec::new();
        for line in [&self.line1, &self.line2, &self.line3] {
            if !line.is_empty() {
                parts.push(line.clone());
            }
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

    /// The structured components as a canonical address seed.
    #[must_use]
    pub fn to_address(&self) -> Address {
        Address {
            line1: self.line1.clone(),
            line2: self.line2.clone(),
            line3: self.line3.clone(),
            postal_code: self.postal_code.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            country: self.country.clone(),
            ..Address::default()
        }
    }
}
