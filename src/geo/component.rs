//! Address components and the raw address multimap
//!
//! A geocoder returns a flat list of components, each tagged with one or more
//! types. [`RawAddress`] groups them by type so that normalizers can look up
//! "the route" or "all sublocality level 2 entries" without caring about order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Country code used when the geocoder returns no country component
pub const DEFAULT_COUNTRY_CODE: &str = "US";

/// Component types understood by the normalizers
///
/// See <https://developers.google.com/maps/documentation/geocoding/requests-geocoding#Types>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressComponentType {
    StreetNumber,
    StreetAddress,
    Route,
    Intersection,
    Political,
    Country,
    #[serde(rename = "administrative_area_level_1")]
    AdministrativeAreaLevel1,
    #[serde(rename = "administrative_area_level_2")]
    AdministrativeAreaLevel2,
    #[serde(rename = "administrative_area_level_3")]
    AdministrativeAreaLevel3,
    #[serde(rename = "administrative_area_level_4")]
    AdministrativeAreaLevel4,
    #[serde(rename = "administrative_area_level_5")]
    AdministrativeAreaLevel5,
    #[serde(rename = "administrative_area_level_6")]
    AdministrativeAreaLevel6,
    #[serde(rename = "administrative_area_level_7")]
    AdministrativeAreaLevel7,
    ColloquialArea,
    Locality,
    Sublocality,
    #[serde(rename = "sublocality_level_1")]
    SublocalityLevel1,
    #[serde(rename = "sublocality_level_2")]
    SublocalityLevel2,
    #[serde(rename = "sublocality_level_3")]
    SublocalityLevel3,
    Neighborhood,
    Premise,
    Subpremise,
    PlusCode,
    PostalCode,
    NaturalFeature,
    Airport,
    Park,
    PointOfInterest,
    Landmark,
    Establishment,
    Floor,
}

impl AddressComponentType {
    /// Wire name of this type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StreetNumber => "street_number",
            Self::StreetAddress => "street_address",
            Self::Route => "route",
            Self::Intersection => "intersection",
            Self::Political => "political",
            Self::Country => "country",
            Self::AdministrativeAreaLevel1 => "administrative_area_level_1",
            Self::AdministrativeAreaLevel2 => "administrative_area_level_2",
            Self::AdministrativeAreaLevel3 => "administrative_area_level_3",
            Self::AdministrativeAreaLevel4 => "administrative_area_level_4",
            Self::AdministrativeAreaLevel5 => "administrative_area_level_5",
            Self::AdministrativeAreaLevel6 => "administrative_area_level_6",
            Self::AdministrativeAreaLevel7 => "administrative_area_level_7",
            Self::ColloquialArea => "colloquial_area",
            Self::Locality => "locality",
            Self::Sublocality => "sublocality",
            Self::SublocalityLevel1 => "sublocality_level_1",
            Self::SublocalityLevel2 => "sublocality_level_2",
            Self::SublocalityLevel3 => "sublocality_level_3",
            Self::Neighborhood => "neighborhood",
            Self::Premise => "premise",
            Self::Subpremise => "subpremise",
            Self::PlusCode => "plus_code",
            Self::PostalCode => "postal_code",
            Self::NaturalFeature => "natural_feature",
            Self::Airport => "airport",
            Self::Park => "park",
            Self::PointOfInterest => "point_of_interest",
            Self::Landmark => "landmark",
            Self::Establishment => "establishment",
            Self::Floor => "floor",
        }
    }

    /// All known component types
    pub fn all() -> &'static [AddressComponentType] {
        use AddressComponentType::*;
        &[
            StreetNumber,
            StreetAddress,
            Route,
            Intersection,
            Political,
            Country,
            AdministrativeAreaLevel1,
            AdministrativeAreaLevel2,
            AdministrativeAreaLevel3,
            AdministrativeAreaLevel4,
            AdministrativeAreaLevel5,
            AdministrativeAreaLevel6,
            AdministrativeAreaLevel7,
            ColloquialArea,
            Locality,
            Sublocality,
            SublocalityLevel1,
            SublocalityLevel2,
            SublocalityLevel3,
            Neighborhood,
            Premise,
            Subpremise,
            PlusCode,
            PostalCode,
            NaturalFeature,
            Airport,
            Park,
            PointOfInterest,
            Landmark,
            Establishment,
            Floor,
        ]
    }
}

impl fmt::Display for AddressComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressComponentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown address component type: {}", s))
    }
}

/// One component as returned by a geocoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressComponent {
    #[serde(default)]
    pub long_name: String,
    #[serde(default)]
    pub short_name: String,
    /// Raw type strings; types outside the known vocabulary are kept but ignored
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressComponent {
    pub fn new(
        long_name: impl Into<String>,
        short_name: impl Into<String>,
        types: &[AddressComponentType],
    ) -> Self {
        Self {
            long_name: long_name.into(),
            short_name: short_name.into(),
            types: types.iter().map(|t| t.as_str().to_string()).collect(),
        }
    }
}

/// Long and short spellings of one component value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentName {
    pub long_name: String,
    pub short_name: String,
}

/// Address components grouped by type
///
/// A type may map to zero, one or many values. Lookups never fail: an absent
/// type simply yields `None` or an empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAddress {
    components: HashMap<AddressComponentType, Vec<ComponentName>>,
}

impl RawAddress {
    /// Build the multimap from a geocoder's component list
    pub fn from_components<'a, I>(components: I) -> Self
    where
        I: IntoIterator<Item = &'a AddressComponent>,
    {
        let mut map: HashMap<AddressComponentType, Vec<ComponentName>> = HashMap::new();
        for component in components {
            for raw_type in &component.types {
                let Ok(kind) = raw_type.parse::<AddressComponentType>() else {
                    continue;
                };
                map.entry(kind).or_default().push(ComponentName {
                    long_name: component.long_name.clone(),
                    short_name: component.short_name.clone(),
                });
            }
        }
        Self { components: map }
    }

    /// All values recorded for a type, in response order
    pub fn get(&self, kind: AddressComponentType) -> &[ComponentName] {
        self.components
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Long names of a type joined by a space, or None if the type is absent
    pub fn long_name(&self, kind: AddressComponentType) -> Option<String> {
        self.joined(kind, |c| &c.long_name)
    }

    /// Short names of a type joined by a space, or None if the type is absent
    pub fn short_name(&self, kind: AddressComponentType) -> Option<String> {
        self.joined(kind, |c| &c.short_name)
    }

    /// Long names of several types joined by single spaces, skipping blanks
    pub fn join_long(&self, kinds: &[AddressComponentType]) -> String {
        join_parts(kinds.iter().filter_map(|k| self.long_name(*k)))
    }

    /// First non-blank long name among `kinds`
    pub fn first_long(&self, kinds: &[AddressComponentType]) -> Option<String> {
        kinds
            .iter()
            .filter_map(|k| self.long_name(*k))
            .map(|v| join_parts([v]))
            .find(|v| !v.is_empty())
    }

    /// ISO country code from the country component's short name
    pub fn country_code(&self) -> Option<String> {
        self.short_name(AddressComponentType::Country)
            .map(|code| code.trim().to_uppercase())
            .filter(|code| !code.is_empty())
    }

    /// Country code with the documented fallback
    pub fn country_code_or_default(&self) -> String {
        self.country_code()
            .unwrap_or_else(|| DEFAULT_COUNTRY_CODE.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    fn joined<F>(&self, kind: AddressComponentType, pick: F) -> Option<String>
    where
        F: Fn(&ComponentName) -> &String,
    {
        let values = self.components.get(&kind)?;
        Some(join_parts(values.iter().map(|c| pick(c).as_str())))
    }
}

impl FromIterator<AddressComponent> for RawAddress {
    fn from_iter<I: IntoIterator<Item = AddressComponent>>(iter: I) -> Self {
        let components: Vec<AddressComponent> = iter.into_iter().collect();
        Self::from_components(&components)
    }
}

/// Join parts with single spaces
///
/// Every part is split on whitespace first, so blank parts disappear and the
/// result never has doubled, leading or trailing spaces.
pub fn join_parts<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for part in parts {
        for word in part.as_ref().split_whitespace() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(word);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use AddressComponentType::*;

    fn sample() -> RawAddress {
        [
            AddressComponent::new("101", "101", &[StreetNumber]),
            AddressComponent::new("The Embarcadero", "The Embarcadero", &[Route]),
            AddressComponent::new("Nana Varachha", "Nana Varachha", &[Sublocality, SublocalityLevel2, Political]),
            AddressComponent::new("Sector 47", "Sector 47", &[Sublocality, SublocalityLevel2, Political]),
            AddressComponent::new("United States", "US", &[Country, Political]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_component_type_round_trip_names() {
        for kind in AddressComponentType::all() {
            assert_eq!(kind.as_str().parse::<AddressComponentType>().unwrap(), *kind);
            let json = serde_json::to_string(kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
        assert_eq!(AddressComponentType::all().len(), 31);
    }

    #[test]
    fn test_unknown_types_are_ignored() {
        let component = AddressComponent {
            long_name: "Somewhere".to_string(),
            short_name: "Somewhere".to_string(),
            types: vec!["not_a_type".to_string(), "locality".to_string()],
        };
        let raw = RawAddress::from_components([&component]);
        assert_eq!(raw.long_name(Locality).as_deref(), Some("Somewhere"));
        assert_eq!(raw.get(Route).len(), 0);
    }

    #[test]
    fn test_multiple_values_per_type() {
        let raw = sample();
        assert_eq!(raw.get(SublocalityLevel2).len(), 2);
        assert_eq!(raw.long_name(SublocalityLevel2).as_deref(), Some("Nana Varachha Sector 47"));
        assert_eq!(raw.get(Sublocality).len(), 2);
    }

    #[test]
    fn test_absent_lookups() {
        let raw = RawAddress::default();
        assert!(raw.long_name(Route).is_none());
        assert!(raw.short_name(Country).is_none());
        assert_eq!(raw.join_long(&[Route, Premise]), "");
        assert!(raw.first_long(&[Locality]).is_none());
        assert_eq!(raw.country_code_or_default(), "US");
    }

    #[test]
    fn test_country_code() {
        assert_eq!(sample().country_code().as_deref(), Some("US"));
    }

    #[test]
    fn test_join_parts_skips_blanks() {
        assert_eq!(join_parts(["", "  a ", " ", "b  c", ""]), "a b c");
        assert_eq!(join_parts(Vec::<String>::new()), "");
    }

    #[test]
    fn test_first_long_skips_blank_values() {
        let raw: RawAddress = [
            AddressComponent::new("  ", "", &[Locality]),
            AddressComponent::new("Khadsad", "Khadsad", &[AdministrativeAreaLevel3]),
        ]
        .into_iter()
        .collect();
        assert_eq!(raw.first_long(&[Locality, AdministrativeAreaLevel3]).as_deref(), Some("Khadsad"));
    }
}
