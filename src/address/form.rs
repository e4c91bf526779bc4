//! Editable address form
//!
//! Reconciles addresses produced by geocoding with edits made by the user.
//! Fields the user has touched keep their value when a new geocode arrives
//! for the same country. The touched set is cleared when the session ends
//! (an explicit location change, a reset, a place selection, or a geocode
//! that lands in another country).

use crate::address::{AddressField, DisplayAddress};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AddressForm {
    address: Option<DisplayAddress>,
    touched: HashSet<AddressField>,
}

impl AddressForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(&self) -> Option<&DisplayAddress> {
        self.address.as_ref()
    }

    pub fn is_touched(&self, field: AddressField) -> bool {
        self.touched.contains(&field)
    }

    pub fn touched_count(&self) -> usize {
        self.touched.len()
    }

    /// Take a freshly geocoded address, keeping touched fields
    pub fn apply_geocoded(&mut self, geocoded: DisplayAddress) {
        let merged = match &self.address {
            Some(current)
                if !self.touched.is_empty() && current.country_code() == geocoded.country_code() =>
            {
                debug!(touched = self.touched.len(), "Keeping user edits over geocoded address");
                self.touched
                    .iter()
                    .fold(geocoded, |acc, field| acc.with_field(*field, current.field(*field)))
            }
            _ => {
                self.touched.clear();
                geocoded
            }
        };
        self.address = Some(merged);
    }

    /// Change one field and mark it as touched
    ///
    /// Editing before any address is known starts from the default (US) schema.
    pub fn edit(&mut self, field: AddressField, value: impl Into<String>) {
        let current = self.address.take().unwrap_or_default();
        self.address = Some(current.with_field(field, value));
        self.touched.insert(field);
    }

    /// Replace the whole address, dropping any edit state
    pub fn replace(&mut self, address: DisplayAddress) {
        self.address = Some(address);
        self.touched.clear();
    }

    /// Forget which fields were edited, keeping the current values
    pub fn end_session(&mut self) {
        self.touched.clear();
    }

    pub fn reset(&mut self) {
        self.address = None;
        self.touched.clear();
    }
}
