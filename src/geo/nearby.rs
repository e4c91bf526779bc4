//! Nearby landmarks and areas
//!
//! The geocoder's address descriptor describes a point relative to things a
//! person would recognise ("across the road from the Ferry Building", "within
//! Financial District"). These are used to confirm an address, not to build it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Localized name of a landmark or area
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayName {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub language_code: String,
}

/// A recognisable place near the geocoded point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    #[serde(default)]
    pub place_id: String,
    #[serde(default)]
    pub display_name: DisplayName,
    #[serde(default)]
    pub spatial_relationship: String,
    #[serde(default)]
    pub straight_line_distance_meters: f64,
    #[serde(default)]
    pub travel_distance_meters: Option<f64>,
    #[serde(default)]
    pub types: Vec<String>,
}

impl Landmark {
    /// Distance to show to a person: travel distance when known, else straight line
    pub fn distance_meters(&self) -> f64 {
        match self.travel_distance_meters {
            Some(travel) if travel > 0.0 => travel,
            _ => self.straight_line_distance_meters,
        }
    }
}

/// An area (neighbourhood, district) containing or bordering the point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Area {
    #[serde(default)]
    pub place_id: String,
    #[serde(default)]
    pub display_name: DisplayName,
    #[serde(default)]
    pub containment: String,
}

/// How the geocoded point relates to a nearby object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpatialRelationship {
    Near,
    Within,
    Beside,
    AcrossTheRoad,
    DownTheRoad,
    AroundTheCorner,
    Behind,
    Outskirts,
}

impl SpatialRelationship {
    /// Relationship of a landmark; unknown values read as "near"
    pub fn for_landmark(value: &str) -> Self {
        match value {
            "WITHIN" => Self::Within,
            "BESIDE" => Self::Beside,
            "ACROSS_THE_ROAD" => Self::AcrossTheRoad,
            "DOWN_THE_ROAD" => Self::DownTheRoad,
            "AROUND_THE_CORNER" => Self::AroundTheCorner,
            "BEHIND" => Self::Behind,
            _ => Self::Near,
        }
    }

    /// Relationship of an area from its containment value
    pub fn for_area(containment: &str) -> Self {
        match containment {
            "WITHIN" => Self::Within,
            "OUTSKIRTS" => Self::Outskirts,
            _ => Self::Near,
        }
    }

    /// Description template; `{}` is replaced by the object's name
    pub fn template(&self) -> &'static str {
        match self {
            Self::Near => "Near {}",
            Self::Within => "Within {}",
            Self::Beside => "Beside {}",
            Self::AcrossTheRoad => "Across the road from {}",
            Self::DownTheRoad => "Down the road from {}",
            Self::AroundTheCorner => "Around the corner from {}",
            Self::Behind => "Behind {}",
            Self::Outskirts => "On the outskirts of {}",
        }
    }

    pub fn describe(&self, name: &str) -> String {
        self.template().replacen("{}", name, 1)
    }
}

/// A landmark or an area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NearbyObject {
    Landmark(Landmark),
    Area(Area),
}

impl NearbyObject {
    pub fn place_id(&self) -> &str {
        match self {
            Self::Landmark(l) => &l.place_id,
            Self::Area(a) => &a.place_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Landmark(l) => &l.display_name.text,
            Self::Area(a) => &a.display_name.text,
        }
    }

    pub fn relationship(&self) -> SpatialRelationship {
        match self {
            Self::Landmark(l) => SpatialRelationship::for_landmark(&l.spatial_relationship),
            Self::Area(a) => SpatialRelationship::for_area(&a.containment),
        }
    }

    /// e.g. "Across the road from Ferry Building"
    pub fn description(&self) -> String {
        self.relationship().describe(self.name())
    }

    /// Human-readable distance; empty for areas
    pub fn distance_string(&self) -> String {
        match self {
            Self::Landmark(l) => format_distance(l.distance_meters()),
            Self::Area(_) => String::new(),
        }
    }
}

impl fmt::Display for NearbyObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let distance = self.distance_string();
        if distance.is_empty() {
            write!(f, "{}", self.description())
        } else {
            write!(f, "{} ({})", self.description(), distance)
        }
    }
}

/// Format meters as "120 m" or "1.4 km"
///
/// Rounds to whole meters first, so 999.6 m is shown as "1.0 km".
/// Kilometres are shown to one decimal, rounding half away from zero.
pub fn format_distance(meters: f64) -> String {
    let meters = meters.max(0.0).round();
    if meters < 1000.0 {
        format!("{} m", meters)
    } else {
        format!("{:.1} km", (meters / 100.0).round() / 10.0)
    }
}
