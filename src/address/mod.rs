//! Country-specific display addresses
//!
//! A [`RawAddress`](crate::geo::RawAddress) is normalized into one of the
//! [`DisplayAddress`] variants by the dispatch table in [`registry`]. Display
//! addresses are immutable values: every edit returns a new address with
//! exactly one field changed.

pub mod form;
pub mod india;
pub mod registry;
pub mod us;

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use form::AddressForm;
pub use india::IndiaAddress;
pub use registry::{normalize, AddressFormats};
pub use us::UsAddress;

/// Editable address fields shared by every variant
///
/// Each variant maps these onto its own field names (the US "additional
/// address info" and the Indian "apartment/suite/unit" are both `Unit`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressField {
    StreetAddress,
    Unit,
    City,
    State,
    PostalCode,
    Country,
    CountryCode,
}

impl AddressField {
    pub fn all() -> &'static [AddressField] {
        &[
            Self::StreetAddress,
            Self::Unit,
            Self::City,
            Self::State,
            Self::PostalCode,
            Self::Country,
            Self::CountryCode,
        ]
    }
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StreetAddress => "street_address",
            Self::Unit => "unit",
            Self::City => "city",
            Self::State => "state",
            Self::PostalCode => "postal_code",
            Self::Country => "country",
            Self::CountryCode => "country_code",
        };
        f.write_str(name)
    }
}

impl FromStr for AddressField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "street" | "street_address" => Ok(Self::StreetAddress),
            "unit" | "apt" | "suite" | "additional_address_info" | "apt_suite_unit" => {
                Ok(Self::Unit)
            }
            "city" => Ok(Self::City),
            "state" => Ok(Self::State),
            "postal_code" | "zip" | "zip_code" | "pin" | "pin_code" => Ok(Self::PostalCode),
            "country" => Ok(Self::Country),
            "country_code" => Ok(Self::CountryCode),
            _ => Err(Error::UnknownField(s.to_string())),
        }
    }
}

/// A normalized, country-specific address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum DisplayAddress {
    Us(UsAddress),
    India(IndiaAddress),
}

impl Default for DisplayAddress {
    fn default() -> Self {
        Self::Us(UsAddress::default())
    }
}

impl DisplayAddress {
    pub fn country_code(&self) -> &str {
        match self {
            Self::Us(a) => &a.country_code,
            Self::India(a) => &a.country_code,
        }
    }

    pub fn country(&self) -> &str {
        match self {
            Self::Us(a) => &a.country,
            Self::India(a) => &a.country,
        }
    }

    /// Read one field
    pub fn field(&self, field: AddressField) -> &str {
        match self {
            Self::Us(a) => a.field(field),
            Self::India(a) => a.field(field),
        }
    }

    /// Copy of this address with exactly one field replaced
    pub fn with_field(&self, field: AddressField, value: impl Into<String>) -> Self {
        match self {
            Self::Us(a) => Self::Us(a.with_field(field, value)),
            Self::India(a) => Self::India(a.with_field(field, value)),
        }
    }

    /// Multi-line rendering for display
    pub fn to_formatted_address(&self) -> String {
        match self {
            Self::Us(a) => a.to_formatted_address(),
            Self::India(a) => a.to_formatted_address(),
        }
    }
}

impl fmt::Display for DisplayAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_formatted_address())
    }
}

/// Join non-blank lines with newlines
pub(crate) fn join_lines(lines: impl IntoIterator<Item = String>) -> String {
    lines
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// "City, State Postal" with separators only between present parts
pub(crate) fn locality_line(city: &str, state: &str, postal_code: &str) -> String {
    let region = crate::geo::component::join_parts([state, postal_code]);
    match (city.trim().is_empty(), region.is_empty()) {
        (false, false) => format!("{}, {}", city.trim(), region),
        (false, true) => city.trim().to_string(),
        (true, _) => region,
    }
}
