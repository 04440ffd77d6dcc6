//! Process-wide country reference index.
//!
//! Built once from an embedded reference table and immutable thereafter, so
//! it is safe for concurrent readers. Lookups are keyed by ISO 3166-1 alpha-2
//! code, case-insensitively.

use std::sync::OnceLock;

use ahash::AHashMap;

const REFERENCE_TABLE: &str = include_str!("countries.csv");

#[derive(Debug)]
struct CountryRecord {
    continent: String,
    phone: String,
}

#[derive(Debug)]
struct CountryIndex {
    by_code: AHashMap<String, CountryRecord>,
}

static COUNTRY_INDEX: OnceLock<CountryIndex> = OnceLock::new();

fn index() -> &'static CountryIndex {
    COUNTRY_INDEX.get_or_init(|| {
        let mut by_code = AHashMap::default();

        for line in REFERENCE_TABLE.lines().skip(1) {
            let mut fields = line.split(',');
            let (Some(code), Some(continent), Some(phone)) =
                (fields.next(), fields.next(), fields.next())
            else {
                continue;
            };

            by_code.insert(
                code.trim().to_uppercase(),
                CountryRecord {
                    continent: continent.trim().to_string(),
                    phone: phone.trim().to_string(),
                },
            );
        }

        CountryIndex { by_code }
    })
}

/// Continent/region name for an ISO country code, if known.
#[must_use]
pub fn continent_of(country_code: &str) -> Option<&'static str> {
    index()
        .by_code
        .get(&country_code.trim().to_uppercase())
        .map(|record| record.continent.as_str())
}

/// International dialing prefix for an ISO country code, if known.
#[must_use]
pub fn phone_code(country_code: &str) -> Option<&'static str> {
    index()
        .by_code
        .get(&country_code.trim().to_uppercase())
        .map(|record| record.phone.as_str())
}

/// Best-effort E.164 formatting for a phone number.
///
/// An existing `+` prefix is kept as-is. A national number with a leading
/// zero is mapped through the dialing-prefix table when the country is known.
#[must_use]
pub fn format_phone_international(phone: &str, country_code: Option<&str>) -> String {
    if phone.trim().is_empty() {
        return String::new();
    }
    if phone.starts_with('+') {
        return phone.to_string();
    }

    let cleaned: String = phone.chars().filter(char::is_ascii_digit).collect();

    if let Some(code) = country_code.and_then(phone_code)
        && let Some(national) = cleaned.strip_prefix('0')
    {
        return format!("+{code}{national}");
    }

    format!("+{cleaned}")
}
