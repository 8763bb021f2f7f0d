//! Country table loaded from embedded TOML.
//!
//! The table is baked into the binary at compile time via
//! [`include_str!`]. Adding a country means adding a `[[country]]` entry
//! to `countries/lac.toml`.

use serde::Deserialize;

use crate::{Country, SourceError};

/// Number of registered countries. Enforced by a test.
#[cfg(test)]
const EXPECTED_COUNTRY_COUNT: usize = 26;

/// Embedded country table.
const COUNTRIES_TOML: &str = include_str!("../countries/lac.toml");

#[derive(Deserialize)]
struct CountryTable {
    country: Vec<Country>,
}

/// Returns every registered country, in table order.
///
/// # Panics
///
/// Panics if the embedded TOML fails to parse. Since it is a compile-time
/// constant, a parse failure is a development error caught by the tests.
#[must_use]
pub fn all_countries() -> Vec<Country> {
    toml::de::from_str::<CountryTable>(COUNTRIES_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse country table: {e}"))
        .country
}

/// Looks up a country by ISO alpha-3 or alpha-2 code, case-insensitively.
///
/// # Errors
///
/// Returns [`SourceError::UnknownCountry`] if the code is not registered.
pub fn find_country(code: &str) -> Result<Country, SourceError> {
    all_countries()
        .into_iter()
        .find(|country| country.matches_pcode(code))
        .ok_or_else(|| SourceError::UnknownCountry {
            code: code.to_string(),
        })
}
