//! United States address schema
//!
//! Also the fallback schema for countries without a dedicated format.

use crate::address::{join_lines, locality_line, AddressField, DisplayAddress};
use crate::geo::component::{join_parts, AddressComponentType::*, RawAddress};
use serde::{Deserialize, Serialize};

pub const DEFAULT_COUNTRY: &str = "United States";
pub const DEFAULT_COUNTRY_CODE: &str = "US";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsAddress {
    pub street_address: String,
    /// Suite, unit, floor, etc.
    pub additional_address_info: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub country_code: String,
}

impl Default for UsAddress {
    fn default() -> Self {
        Self {
            street_address: String::new(),
            additional_address_info: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
        }
    }
}

impl UsAddress {
    pub fn from_raw(raw: &RawAddress) -> Self {
        Self {
            street_address: raw.join_long(&[StreetNumber, Route]),
            additional_address_info: raw.join_long(&[Subpremise, Premise]),
            city: raw.first_long(&[Locality]).unwrap_or_default(),
            state: raw
                .short_name(AdministrativeAreaLevel1)
                .map(|s| join_parts([s]))
                .unwrap_or_default(),
            zip_code: raw.join_long(&[PostalCode]),
            country: raw
                .first_long(&[Country])
                .unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
            country_code: raw
                .country_code()
                .unwrap_or_else(|| DEFAULT_COUNTRY_CODE.to_string()),
        }
    }

    pub fn field(&self, field: AddressField) -> &str {
        match field {
            AddressField::StreetAddress => &self.street_address,
            AddressField::Unit => &self.additional_address_info,
            AddressField::City => &self.city,
            AddressField::State => &self.state,
            AddressField::PostalCode => &self.zip_code,
            AddressField::Country => &self.country,
            AddressField::CountryCode => &self.country_code,
        }
    }

    pub fn with_field(&self, field: AddressField, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        let value = value.into();
        match field {
            AddressField::StreetAddress => next.street_address = value,
            AddressField::Unit => next.additional_address_info = value,
            AddressField::City => next.city = value,
            AddressField::State => next.state = value,
            AddressField::PostalCode => next.zip_code = value,
            AddressField::Country => next.country = value,
            AddressField::CountryCode => next.country_code = value,
        }
        next
    }

    /// ```text
    /// 101 The Embarcadero suite 200
    /// San Francisco, CA 94105
    /// United States
    /// ```
    pub fn to_formatted_address(&self) -> String {
        join_lines([
            join_parts([&self.street_address, &self.additional_address_info]),
            locality_line(&self.city, &self.state, &self.zip_code),
            self.country.clone(),
        ])
    }
}

impl From<UsAddress> for DisplayAddress {
    fn from(address: UsAddress) -> Self {
        DisplayAddress::Us(address)
    }
}
