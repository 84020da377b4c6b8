//! Language code to country heuristic for externally sourced reviews.
//!
//! The provider reports the language a review was written in, not where the
//! reviewer lives. This table picks one representative country per language,
//! which is wrong for every Spanish speaker outside Costa Rica. Treat the
//! result as display flavour only.

pub(crate) const UNKNOWN_COUNTRY: &str = "Unknown";

const LANGUAGE_COUNTRIES: &[(&str, &str)] = &[
    ("en", "USA"),
    ("es", "Costa Rica"),
    ("fr", "France"),
    ("de", "Germany"),
    ("it", "Italy"),
    ("pt", "Brazil"),
    ("nl", "Netherlands"),
    ("sv", "Sweden"),
    ("no", "Norway"),
    ("da", "Denmark"),
    ("fi", "Finland"),
    ("pl", "Poland"),
    ("ru", "Russia"),
    ("ja", "Japan"),
    ("ko", "South Korea"),
    ("zh", "China"),
    ("ar", "Saudi Arabia"),
    ("hi", "India"),
    ("th", "Thailand"),
    ("vi", "Vietnam"),
    ("id", "Indonesia"),
    ("ms", "Malaysia"),
    ("tl", "Philippines"),
];

/// Map a language tag (`"es"`, `"en-GB"`, `"pt_BR"`) to a representative
/// country name. Only the primary subtag is consulted.
#[must_use]
pub fn country_from_language(language: &str) -> &'static str {
    let primary = language
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    LANGUAGE_COUNTRIES
        .iter()
        .find(|(code, _)| *code == primary)
        .map_or(UNKNOWN_COUNTRY, |(_, country)| country)
}
