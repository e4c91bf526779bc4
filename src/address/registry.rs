//! Country dispatch table for address normalization
//!
//! Maps an ISO country code to the function that builds its
//! [`DisplayAddress`]. Codes without an entry use the fallback (US schema).

use crate::address::{DisplayAddress, IndiaAddress, UsAddress};
use crate::geo::component::RawAddress;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

/// Builds a display address from a raw one
pub type Normalizer = fn(&RawAddress) -> DisplayAddress;

fn normalize_us(raw: &RawAddress) -> DisplayAddress {
    UsAddress::from_raw(raw).into()
}

fn normalize_india(raw: &RawAddress) -> DisplayAddress {
    IndiaAddress::from_raw(raw).into()
}

/// Registry of country-specific normalizers
#[derive(Debug, Clone)]
pub struct AddressFormats {
    table: HashMap<String, Normalizer>,
    fallback: Normalizer,
}

impl Default for AddressFormats {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressFormats {
    /// Table with the built-in formats (US, IN)
    pub fn new() -> Self {
        let mut formats = Self {
            table: HashMap::new(),
            fallback: normalize_us,
        };
        formats.register("US", normalize_us);
        formats.register("IN", normalize_india);
        formats
    }

    /// Add or replace the format for a country code
    pub fn register(&mut self, country_code: &str, normalizer: Normalizer) {
        self.table
            .insert(country_code.trim().to_uppercase(), normalizer);
    }

    /// Whether a dedicated format exists for a country code
    pub fn supports(&self, country_code: &str) -> bool {
        self.table.contains_key(&country_code.trim().to_uppercase())
    }

    /// Registered country codes, sorted
    pub fn country_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.table.keys().cloned().collect();
        codes.sort();
        codes
    }

    /// Normalize a raw address into its country's display schema
    pub fn normalize(&self, raw: &RawAddress) -> DisplayAddress {
        let code = raw.country_code_or_default();
        let normalizer = match self.table.get(&code) {
            Some(normalizer) => *normalizer,
            None => {
                debug!(country_code = %code, "No address format registered, using fallback");
                self.fallback
            }
        };
        normalizer(raw)
    }
}

/// Normalize with the built-in formats
pub fn normalize(raw: &RawAddress) -> DisplayAddress {
    static BUILTIN: OnceLock<AddressFormats> = OnceLock::new();
    BUILTIN.get_or_init(AddressFormats::new).normalize(raw)
}
