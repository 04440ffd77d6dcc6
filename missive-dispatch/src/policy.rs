//! Geographic admission policy.
//!
//! A provider declares coverage per message type as either the wildcard or a
//! comma-separated list of ISO country codes and region names. The policy
//! admits a destination when its continent or country matches a token
//! case-insensitively. An empty declaration denies everything; only the
//! explicit wildcard admits everything.
//!
//! The filter is pure. It never raises and never performs I/O.

use missive_common::{ConfigMap, Missive, MissiveType, country};

use crate::provider::ProviderDescriptor;

pub const WILDCARD: &str = "*";

/// A parsed coverage declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coverage {
    Wildcard,
    Tokens(Vec<String>),
}

impl Coverage {
    /// Parse a declared coverage value.
    ///
    /// Tokens are trimmed and lowercased. A blank value parses to an empty
    /// token list, which admits nothing.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.trim() == WILDCARD {
            return Self::Wildcard;
        }

        Self::Tokens(
            value
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_lowercase)
                .collect(),
        )
    }

    /// Decide whether a destination is admissible under this coverage.
    #[must_use]
    pub fn admits(&self, destination: &Destination) -> bool {
        let tokens = match self {
            Self::Wildcard => return true,
            Self::Tokens(tokens) => tokens,
        };

        let continent_matches = destination
            .continent
            .as_ref()
            .is_some_and(|continent| tokens.iter().any(|token| *token == continent.to_lowercase()));
        let country_matches = destination
            .country
            .as_ref()
            .is_some_and(|country| tokens.iter().any(|token| *token == country.to_lowercase()));

        continent_matches || country_matches
    }

    /// Render the declaration back into its textual form for diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Wildcard => WILDCARD.to_string(),
            Self::Tokens(tokens) => tokens.join(","),
        }
    }
}

/// Where a missive is going, for admission purposes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Destination {
    pub country: Option<String>,
    pub continent: Option<String>,
}

impl Destination {
    /// Derive the destination from a missive.
    ///
    /// Explicit provider options win over recipient metadata. A missing
    /// continent is derived from the country through the reference index.
    #[must_use]
    pub fn from_missive(missive: &Missive) -> Self {
        let country = first_option(missive, &["country", "country_code", "destination_country"])
            .or_else(|| first_metadata(missive, &["country_code", "country"]));
        let continent = first_option(missive, &["continent", "destination_continent"])
            .or_else(|| first_metadata(missive, &["continent", "region"]))
            .or_else(|| {
                country
                    .as_deref()
                    .and_then(country::continent_of)
                    .map(str::to_string)
            });

        Self { country, continent }
    }
}

fn first_option(missive: &Missive, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| missive.provider_option(key))
        .filter_map(|value| value.as_str())
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

fn first_metadata(missive: &Missive, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| missive.recipient_metadata(key))
        .filter_map(|value| value.as_str())
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// The coverage in force for a provider and message type.
///
/// Configuration can override the declared value per type through the
/// `<type>_geographic_coverage` key.
#[must_use]
pub fn effective_coverage(
    descriptor: &ProviderDescriptor,
    missive_type: MissiveType,
    config: &ConfigMap,
) -> Coverage {
    let key = format!("{}_geographic_coverage", missive_type.as_config_key());

    let declared = config
        .get(&key)
        .filter(|value| value.is_populated())
        .and_then(|value| value.as_str())
        .unwrap_or_else(|| descriptor.declared_coverage(missive_type));

    Coverage::parse(declared)
}
