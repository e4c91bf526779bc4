//! Country table
//!
//! Maps country names to ISO 3166-1 alpha-2 codes and flag glyphs for
//! presentation. Not used by address normalization.

use serde::{Deserialize, Serialize};

/// A country with its ISO code and flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    pub code: String,
    pub flag: String,
}

const COUNTRIES: &[(&str, &str)] = &[
    ("Afghanistan", "AF"),
    ("Algeria", "DZ"),
    ("Angola", "AO"),
    ("Argentina", "AR"),
    ("Bangladesh", "BD"),
    ("Brazil", "BR"),
    ("Cameroon", "CM"),
    ("China", "CN"),
    ("Colombia", "CO"),
    ("Egypt", "EG"),
    ("Ethiopia", "ET"),
    ("France", "FR"),
    ("Germany", "DE"),
    ("Ghana", "GH"),
    ("India", "IN"),
    ("Indonesia", "ID"),
    ("Iran", "IR"),
    ("Italy", "IT"),
    ("Ivory Coast", "CI"),
    ("Japan", "JP"),
    ("Kenya", "KE"),
    ("Madagascar", "MG"),
    ("Malaysia", "MY"),
    ("Mexico", "MX"),
    ("Morocco", "MA"),
    ("Mozambique", "MZ"),
    ("Myanmar", "MM"),
    ("Nepal", "NP"),
    ("Nigeria", "NG"),
    ("Pakistan", "PK"),
    ("Peru", "PE"),
    ("Philippines", "PH"),
    ("Poland", "PL"),
    ("Russia", "RU"),
    ("Saudi Arabia", "SA"),
    ("South Africa", "ZA"),
    ("South Korea", "KR"),
    ("Spain", "ES"),
    ("Sri Lanka", "LK"),
    ("Sudan", "SD"),
    ("Tanzania", "TZ"),
    ("Thailand", "TH"),
    ("Turkey", "TR"),
    ("Ukraine", "UA"),
    ("United Kingdom", "GB"),
    ("United States", "US"),
    ("Uzbekistan", "UZ"),
    ("Venezuela", "VE"),
    ("Vietnam", "VN"),
];

/// Regional-indicator flag for a two-letter code, or None if the code is not A-Z
pub fn flag_emoji(code: &str) -> Option<String> {
    let code = code.trim().to_uppercase();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return None;
    }
    code.chars()
        .map(|c| char::from_u32(0x1F1E6 + (c as u32 - 'A' as u32)))
        .collect()
}

fn build(name: &str, code: &str) -> Country {
    Country {
        name: name.to_string(),
        code: code.to_string(),
        flag: flag_emoji(code).unwrap_or_default(),
    }
}

/// All known countries, sorted by name
pub fn all() -> Vec<Country> {
    COUNTRIES.iter().map(|(name, code)| build(name, code)).collect()
}

/// Look up a country by ISO code (case-insensitive)
pub fn by_code(code: &str) -> Option<Country> {
    COUNTRIES
        .iter()
        .find(|(_, c)| c.eq_ignore_ascii_case(code.trim()))
        .map(|(name, code)| build(name, code))
}

/// Look up a country by name (case-insensitive)
pub fn by_name(name: &str) -> Option<Country> {
    COUNTRIES
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name.trim()))
        .map(|(name, code)| build(name, code))
}
