//! View-state composition
//!
//! [`compose`] is a pure function from the pipeline's current inputs to the
//! snapshot a presentation layer renders.

use crate::address::DisplayAddress;
use crate::coord::Coordinates;
use crate::geo::nearby::NearbyObject;
use crate::location::CurrentLocation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonState {
    #[default]
    Normal,
    Selected,
}

impl ButtonState {
    fn selected_if(selected: bool) -> Self {
        if selected {
            Self::Selected
        } else {
            Self::Normal
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonStates {
    pub current_location: ButtonState,
    pub mock_location: ButtonState,
    pub map: ButtonState,
}

/// Toggles owned by the presentation layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiToggles {
    pub show_map: bool,
}

/// A nearby object placed on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub place_id: String,
    pub title: String,
    pub coords: Coordinates,
}

impl MapMarker {
    pub fn new(object: &NearbyObject, coords: Coordinates) -> Self {
        Self {
            place_id: object.place_id().to_string(),
            title: object.name().to_string(),
            coords,
        }
    }
}

/// Where the address currently stands
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AddressState<'a> {
    Pending,
    Failed(&'a str),
    Resolved(&'a DisplayAddress),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Status {
    Loading,
    Error {
        message: String,
    },
    Ready {
        address: DisplayAddress,
        formatted_address: String,
        nearby: Vec<NearbyObject>,
        markers: Vec<MapMarker>,
    },
}

/// Snapshot rendered by the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub location: Option<Coordinates>,
    pub location_label: String,
    pub buttons: ButtonStates,
    pub show_map: bool,
    /// Device location problem (e.g. permission denied), shown alongside the
    /// status rather than replacing it
    pub location_error: Option<String>,
    pub status: Status,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            location: None,
            location_label: String::new(),
            buttons: ButtonStates::default(),
            show_map: false,
            location_error: None,
            status: Status::Loading,
        }
    }
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        matches!(self.status, Status::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.status, Status::Ready { .. })
    }

    pub fn address(&self) -> Option<&DisplayAddress> {
        match &self.status {
            Status::Ready { address, .. } => Some(address),
            _ => None,
        }
    }

    pub fn nearby(&self) -> &[NearbyObject] {
        match &self.status {
            Status::Ready { nearby, .. } => nearby,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            Status::Error { message } => Some(message),
            _ => None,
        }
    }
}

/// Everything the view depends on
#[derive(Debug, Clone, Copy)]
pub struct ViewInputs<'a> {
    pub location: Option<&'a CurrentLocation>,
    pub address: AddressState<'a>,
    pub nearby: &'a [NearbyObject],
    pub markers: &'a [MapMarker],
    pub toggles: UiToggles,
    pub location_error: Option<&'a str>,
}

pub fn compose(inputs: &ViewInputs<'_>) -> ViewState {
    let is_mock = inputs.location.map(|l| l.is_mock);
    let buttons = ButtonStates {
        current_location: ButtonState::selected_if(is_mock == Some(false)),
        mock_location: ButtonState::selected_if(is_mock == Some(true)),
        map: ButtonState::selected_if(inputs.toggles.show_map),
    };

    let status = match (inputs.location, inputs.address) {
        (None, _) | (_, AddressState::Pending) => Status::Loading,
        (Some(_), AddressState::Failed(message)) => Status::Error {
            message: message.to_string(),
        },
        (Some(_), AddressState::Resolved(address)) => Status::Ready {
            address: address.clone(),
            formatted_address: address.to_formatted_address(),
            nearby: inputs.nearby.to_vec(),
            markers: if inputs.toggles.show_map {
                inputs.markers.to_vec()
            } else {
                Vec::new()
            },
        },
    };

    ViewState {
        location: inputs.location.map(|l| l.location.coords),
        location_label: inputs
            .location
            .map(|l| l.location.label.clone())
            .unwrap_or_default(),
        buttons,
        show_map: inputs.toggles.show_map,
        location_error: inputs.location_error.map(str::to_string),
        status,
    }
}
