//! landmark-address: landmark-aware address resolution
//!
//! Turns a location into a country-specific, editable address together with
//! the landmarks and areas around it ("across the road from Ferry Building").
//!
//! ## Features
//!
//! - Reverse geocoding with nearby landmark and area descriptors
//! - Per-country address schemas (US, India) with a registry for more
//! - Mock, dropped-pin and device location sources
//! - A reactive pipeline that coalesces nearby fixes, keeps only the latest
//!   request and preserves the user's edits
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use landmark_address::address::{normalize, AddressField};
//! use landmark_address::geo::{AddressComponent, AddressComponentType, RawAddress};
//!
//! let components = vec![
//!     AddressComponent::new("1600", "1600", &[AddressComponentType::StreetNumber]),
//!     AddressComponent::new("Pearl Street", "Pearl St", &[AddressComponentType::Route]),
//!     AddressComponent::new("Boulder", "Boulder", &[AddressComponentType::Locality]),
//!     AddressComponent::new("United States", "US", &[AddressComponentType::Country]),
//! ];
//! let raw = RawAddress::from_components(&components);
//!
//! let address = normalize(&raw);
//! assert_eq!(address.field(AddressField::StreetAddress), "1600 Pearl Street");
//! assert_eq!(address.country_code(), "US");
//! ```

pub mod address;
pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod format;
pub mod geo;
pub mod location;
pub mod pipeline;
pub mod server;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use address::DisplayAddress;
pub use config::Config;
pub use coord::{Coordinates, LabeledLocation};
pub use error::{Error, Result};
pub use pipeline::{AddressPipeline, PipelineEvent, ViewState};
