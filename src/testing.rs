//! Test doubles for the pipeline's collaborators

use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geo::component::{AddressComponent, AddressComponentType};
use crate::geo::nearby::{Area, DisplayName, NearbyObject};
use crate::geo::places::PlaceDetails;
use crate::geo::response::{AddressResult, ReverseGeocodingResponse, STATUS_OK};
use crate::geo::{PlaceLookup, ReverseGeocoder};
use crate::location::LocationProvider;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SF_RESPONSE_JSON: &str = include_str!("../tests/fixtures/sf_reverse_geocode.json");
pub const INDIA_RESPONSE_JSON: &str = include_str!("../tests/fixtures/india_reverse_geocode.json");

pub fn sf_response() -> ReverseGeocodingResponse {
    serde_json::from_str(SF_RESPONSE_JSON).unwrap()
}

pub fn india_response() -> ReverseGeocodingResponse {
    serde_json::from_str(INDIA_RESPONSE_JSON).unwrap()
}

/// A single-result response naming only a locality and a country
pub fn response_for_locality(locality: &str, country_code: &str) -> ReverseGeocodingResponse {
    use AddressComponentType::*;
    ReverseGeocodingResponse {
        status: STATUS_OK.to_string(),
        results: vec![AddressResult {
            address_components: vec![
                AddressComponent::new(locality, locality, &[Locality, Political]),
                AddressComponent::new(country_code, country_code, &[Country, Political]),
            ],
            formatted_address: format!("{}, {}", locality, country_code),
            ..Default::default()
        }],
        ..Default::default()
    }
}

pub fn area(place_id: &str, name: &str) -> NearbyObject {
    NearbyObject::Area(Area {
        place_id: place_id.to_string(),
        display_name: DisplayName {
            text: name.to_string(),
            language_code: "en".to_string(),
        },
        containment: "WITHIN".to_string(),
    })
}

#[derive(Clone)]
enum Reply {
    Respond(ReverseGeocodingResponse),
    Fail(Arc<dyn Fn() -> Error + Send + Sync>),
}

impl Reply {
    fn produce(&self) -> Result<ReverseGeocodingResponse> {
        match self {
            Self::Respond(response) => Ok(response.clone()),
            Self::Fail(make) => Err(make()),
        }
    }
}

/// Scriptable reverse geocoder
///
/// Replies are chosen in order: the next scripted reply, then a response
/// registered for the exact coordinate, then the default.
pub struct FakeGeocoder {
    default: Reply,
    by_coords: Vec<(Coordinates, ReverseGeocodingResponse)>,
    delays: Vec<(Coordinates, Duration)>,
    script: Mutex<VecDeque<Reply>>,
    requested: Mutex<Vec<Coordinates>>,
}

impl FakeGeocoder {
    pub fn new(default: ReverseGeocodingResponse) -> Self {
        Self::with_default(Reply::Respond(default))
    }

    pub fn failing(message: &str) -> Self {
        let message = message.to_string();
        Self::failing_with(move || Error::Geocoding(message.clone()))
    }

    pub fn failing_with(make: impl Fn() -> Error + Send + Sync + 'static) -> Self {
        Self::with_default(Reply::Fail(Arc::new(make)))
    }

    fn with_default(default: Reply) -> Self {
        Self {
            default,
            by_coords: Vec::new(),
            delays: Vec::new(),
            script: Mutex::new(VecDeque::new()),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response_at(mut self, coords: Coordinates, response: ReverseGeocodingResponse) -> Self {
        self.by_coords.push((coords, response));
        self
    }

    pub fn with_delay(mut self, coords: Coordinates, delay: Duration) -> Self {
        self.delays.push((coords, delay));
        self
    }

    pub fn then_reply(self, response: ReverseGeocodingResponse) -> Self {
        self.script.lock().unwrap().push_back(Reply::Respond(response));
        self
    }

    pub fn then_fail(self, message: &str) -> Self {
        let message = message.to_string();
        self.script
            .lock()
            .unwrap()
            .push_back(Reply::Fail(Arc::new(move || Error::Geocoding(message.clone()))));
        self
    }

    pub fn calls(&self) -> usize {
        self.requested.lock().unwrap().len()
    }

    pub fn requested(&self) -> Vec<Coordinates> {
        self.requested.lock().unwrap().clone()
    }
}

impl ReverseGeocoder for FakeGeocoder {
    async fn reverse_geocode(
        &self,
        coords: Coordinates,
        _include_descriptors: bool,
    ) -> Result<ReverseGeocodingResponse> {
        self.requested.lock().unwrap().push(coords);

        let delay = self
            .delays
            .iter()
            .find(|(c, _)| *c == coords)
            .map(|(_, d)| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.script.lock().unwrap().pop_front();
        if let Some(reply) = scripted {
            return reply.produce();
        }
        match self.by_coords.iter().find(|(c, _)| *c == coords) {
            Some((_, response)) => Ok(response.clone()),
            None => self.default.produce(),
        }
    }
}

/// In-memory place details
#[derive(Default)]
pub struct FakePlaces {
    places: HashMap<String, PlaceDetails>,
    calls: AtomicUsize,
}

impl FakePlaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(
        mut self,
        place_id: &str,
        location: Option<Coordinates>,
        components: Vec<AddressComponent>,
    ) -> Self {
        self.places.insert(
            place_id.to_string(),
            PlaceDetails {
                place_id: place_id.to_string(),
                formatted_address: String::new(),
                location,
                components,
            },
        );
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PlaceLookup for FakePlaces {
    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.places
            .get(place_id)
            .cloned()
            .ok_or_else(|| Error::PlaceLookup(format!("Unknown place {}", place_id)))
    }
}

/// Device location that is fixed, movable, denied or unavailable
pub enum FakeLocationProvider {
    At(Coordinates),
    Tracking(Arc<Mutex<Coordinates>>),
    Denied,
    Unavailable,
}

impl FakeLocationProvider {
    pub fn at(coords: Coordinates) -> Self {
        Self::At(coords)
    }

    /// Provider whose position the test can move through the returned handle
    pub fn tracking(start: Coordinates) -> (Self, Arc<Mutex<Coordinates>>) {
        let position = Arc::new(Mutex::new(start));
        (Self::Tracking(Arc::clone(&position)), position)
    }

    pub fn denied() -> Self {
        Self::Denied
    }

    pub fn unavailable() -> Self {
        Self::Unavailable
    }
}

impl LocationProvider for FakeLocationProvider {
    async fn current_location(&self) -> Result<Coordinates> {
        match self {
            Self::At(coords) => Ok(*coords),
            Self::Tracking(position) => Ok(*position.lock().unwrap()),
            Self::Denied => Err(Error::PermissionDenied("location access not granted".to_string())),
            Self::Unavailable => Err(Error::LocationUnavailable("no fix".to_string())),
        }
    }
}

/// Wait for a watch value to satisfy `pred`, failing the test after two seconds
pub async fn wait_for<T, F>(rx: &mut tokio::sync::watch::Receiver<T>, pred: F) -> T
where
    T: Clone,
    F: FnMut(&T) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(pred))
        .await
        .expect("timed out waiting for watch value")
        .expect("watch sender dropped")
        .clone()
}

/// Poll `cond` until it holds, failing the test after two seconds
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !cond() {
        assert!(tokio::time::Instant::now() < deadline, "condition not met in time");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
