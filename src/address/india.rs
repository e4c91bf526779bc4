//! India address schema
//!
//! Indian geocoder results rarely have a street number; the building and
//! flat live in premise/subpremise and the street line is built from the
//! route plus the sublocality hierarchy, narrowest first.

use crate::address::{join_lines, locality_line, AddressField, DisplayAddress};
use crate::geo::component::{AddressComponentType::*, RawAddress};
use serde::{Deserialize, Serialize};

pub const DEFAULT_COUNTRY: &str = "India";
pub const DEFAULT_COUNTRY_CODE: &str = "IN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndiaAddress {
    pub apt_suite_unit: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub pin_code: String,
    pub country: String,
    pub country_code: String,
}

impl Default for IndiaAddress {
    fn default() -> Self {
        Self {
            apt_suite_unit: String::new(),
            street_address: String::new(),
            city: String::new(),
            state: String::new(),
            pin_code: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
        }
    }
}

impl IndiaAddress {
    pub fn from_raw(raw: &RawAddress) -> Self {
        Self {
            apt_suite_unit: raw.join_long(&[Subpremise, Premise, StreetNumber]),
            street_address: raw.join_long(&[
                Route,
                SublocalityLevel3,
                SublocalityLevel2,
                SublocalityLevel1,
            ]),
            city: raw
                .first_long(&[Locality, AdministrativeAreaLevel3])
                .unwrap_or_default(),
            state: raw.join_long(&[AdministrativeAreaLevel1]),
            pin_code: raw.join_long(&[PostalCode]),
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
            AddressField::Unit => &self.apt_suite_unit,
            AddressField::City => &self.city,
            AddressField::State => &self.state,
            AddressField::PostalCode => &self.pin_code,
            AddressField::Country => &self.country,
            AddressField::CountryCode => &self.country_code,
        }
    }

    pub fn with_field(&self, field: AddressField, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        let value = value.into();
        match field {
            AddressField::StreetAddress => next.street_address = value,
            AddressField::Unit => next.apt_suite_unit = value,
            AddressField::City => next.city = value,
            AddressField::State => next.state = value,
            AddressField::PostalCode => next.pin_code = value,
            AddressField::Country => next.country = value,
            AddressField::CountryCode => next.country_code = value,
        }
        next
    }

    pub fn to_formatted_address(&self) -> String {
        join_lines([
            self.apt_suite_unit.clone(),
            self.street_address.clone(),
            locality_line(&self.city, &self.state, &self.pin_code),
            self.country.clone(),
        ])
    }
}

impl From<IndiaAddress> for DisplayAddress {
    fn from(address: IndiaAddress) -> Self {
        DisplayAddress::India(address)
    }
}
