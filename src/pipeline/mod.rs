//! Address resolution pipeline
//!
//! Wires the stages together:
//!
//! ```text
//! location source -> geocoding stage -> normalization -> view composition
//!        ^                                    ^
//!        |------------ UI events -------------|
//! ```
//!
//! A single driver task owns every piece of mutable state. It reacts to
//! three inputs: UI events, location changes and the results of the async
//! work it started. After each one it recomposes the [`ViewState`] and
//! publishes it if it differs from the last published value.

pub mod geocode;
pub mod resolve;
pub mod view;

use crate::address::{AddressField, AddressForm, AddressFormats};
use crate::config::{Config, LocationSourceKind};
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geo::nearby::NearbyObject;
use crate::geo::places::{resolve_nearby_locations, PlaceDetails};
use crate::geo::{PlaceLookup, ReverseGeocoder};
use crate::location::{CurrentLocation, IpLocator, LocationProvider, LocationSource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub use geocode::{FailureKind, GeocodeOutcome, GeocodeSettings, GeocodingStage};
pub use resolve::{resolve_location, Resolution};
pub use view::{compose, AddressState, ButtonState, ButtonStates, MapMarker, Status, UiToggles, ViewState};

const EVENT_BUFFER: usize = 64;

/// Input from the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    NextMockLocation,
    UseSystemLocation,
    SetMockLocation { coords: Coordinates },
    DropPin { coords: Coordinates },
    ToggleMap,
    SetMapVisible { visible: bool },
    EditField { field: AddressField, value: String },
    /// Replace the address with a place's address (autocomplete selection)
    SelectPlace { place_id: String },
    /// Geocode the current location again after a failure
    Retry,
    Reset,
}

/// Results of work the driver spawned
enum Completion {
    Geocoded { seq: u64, outcome: GeocodeOutcome },
    Located { seq: u64, markers: Vec<MapMarker> },
    PlaceSelected(Result<PlaceDetails>),
    SystemLocation(Result<Coordinates>),
}

/// Handle to a running pipeline
///
/// Cheap to share behind an `Arc`; any number of observers can
/// [`subscribe`](Self::subscribe).
pub struct AddressPipeline {
    events: mpsc::Sender<PipelineEvent>,
    view: watch::Receiver<ViewState>,
    driver: JoinHandle<()>,
    /// Device polling task, when the pipeline follows the device
    device_updates: Option<JoinHandle<()>>,
}

impl AddressPipeline {
    /// Start the driver task
    pub fn spawn<G, L, P>(
        source: Arc<LocationSource<P>>,
        stage: GeocodingStage<G>,
        places: Arc<L>,
        formats: AddressFormats,
    ) -> Self
    where
        G: ReverseGeocoder,
        L: PlaceLookup,
        P: LocationProvider,
    {
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let (view_tx, view_rx) = watch::channel(ViewState::default());
        let (driver, done_rx) = Driver::new(source, stage, places, formats, view_tx);

        Self {
            events: events_tx,
            view: view_rx,
            driver: tokio::spawn(driver.run(events_rx, done_rx)),
            device_updates: None,
        }
    }

    /// Pipeline backed by the Google services and the configured location source
    pub fn from_config(config: &Config) -> Result<Self> {
        let geocoder = Arc::new(crate::geo::get_geocoder(config)?);
        let places = Arc::new(crate::geo::get_place_lookup(config)?);
        let stage = GeocodingStage::new(geocoder, GeocodeSettings::from(&config.geocoder));

        let kind = config.location_source()?;
        let source = Arc::new(match kind {
            LocationSourceKind::Mock => LocationSource::new(IpLocator::new()),
            LocationSourceKind::System => LocationSource::on_device(IpLocator::new()),
        });

        let mut pipeline = Self::spawn(Arc::clone(&source), stage, places, AddressFormats::new());
        if config.location.poll_interval_secs > 0 {
            let every = Duration::from_secs(config.location.poll_interval_secs);
            pipeline.device_updates = Some(source.follow_device(every));
        }
        if kind == LocationSourceKind::System {
            pipeline.try_send(PipelineEvent::UseSystemLocation)?;
        }
        Ok(pipeline)
    }

    pub async fn send(&self, event: PipelineEvent) -> Result<()> {
        self.events
            .send(event)
            .await
            .map_err(|_| Error::Pipeline("pipeline has stopped".to_string()))
    }

    /// Send without waiting; fails when the event buffer is full
    pub fn try_send(&self, event: PipelineEvent) -> Result<()> {
        self.events
            .try_send(event)
            .map_err(|e| Error::Pipeline(format!("could not queue event: {}", e)))
    }

    /// Receiver replaying the latest view state
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.view.clone()
    }

    pub fn current(&self) -> ViewState {
        self.view.borrow().clone()
    }

    /// Stop accepting events and wait for the driver to finish
    pub async fn shutdown(self) {
        let Self {
            events,
            driver,
            device_updates,
            ..
        } = self;
        if let Some(task) = device_updates {
            task.abort();
        }
        drop(events);
        if let Err(e) = driver.await {
            warn!("Pipeline driver ended abnormally: {}", e);
        }
    }
}

struct Driver<G, L, P> {
    source: Arc<LocationSource<P>>,
    location_rx: watch::Receiver<Option<CurrentLocation>>,
    stage: GeocodingStage<G>,
    places: Arc<L>,
    formats: AddressFormats,
    form: AddressForm,
    location: Option<CurrentLocation>,
    nearby: Vec<NearbyObject>,
    markers: Vec<MapMarker>,
    toggles: UiToggles,
    /// Last geocode or place lookup failure
    error: Option<String>,
    location_error: Option<String>,
    /// A geocode for the current location is in flight; the form still holds
    /// the previous location's address
    awaiting_geocode: bool,
    /// Identifies the latest geocode; completions carrying another value are stale
    seq: u64,
    in_flight: Option<JoinHandle<()>>,
    done_tx: mpsc::UnboundedSender<Completion>,
    view_tx: watch::Sender<ViewState>,
}

impl<G, L, P> Driver<G, L, P>
where
    G: ReverseGeocoder,
    L: PlaceLookup,
    P: LocationProvider,
{
    fn new(
        source: Arc<LocationSource<P>>,
        stage: GeocodingStage<G>,
        places: Arc<L>,
        formats: AddressFormats,
        view_tx: watch::Sender<ViewState>,
    ) -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        let driver = Self {
            location_rx: source.subscribe(),
            source,
            stage,
            places,
            formats,
            form: AddressForm::new(),
            location: None,
            nearby: Vec::new(),
            markers: Vec::new(),
            toggles: UiToggles::default(),
            error: None,
            location_error: None,
            awaiting_geocode: false,
            seq: 0,
            in_flight: None,
            done_tx,
            view_tx,
        };
        (driver, done_rx)
    }

    async fn run(
        mut self,
        mut events: mpsc::Receiver<PipelineEvent>,
        mut done: mpsc::UnboundedReceiver<Completion>,
    ) {
        let initial = self.location_rx.borrow_and_update().clone();
        self.on_location(initial);
        self.publish();

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.on_event(event),
                    None => break,
                },
                changed = self.location_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let location = self.location_rx.borrow_and_update().clone();
                    self.on_location(location);
                }
                Some(completion) = done.recv() => self.on_completion(completion),
            }
            self.publish();
        }

        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
        debug!("Pipeline driver stopped");
    }

    fn publish(&self) {
        let address = match (&self.error, self.form.address()) {
            (Some(message), _) => AddressState::Failed(message),
            _ if self.awaiting_geocode => AddressState::Pending,
            (None, Some(address)) => AddressState::Resolved(address),
            (None, None) => AddressState::Pending,
        };
        let next = compose(&view::ViewInputs {
            location: self.location.as_ref(),
            address,
            nearby: &self.nearby,
            markers: &self.markers,
            toggles: self.toggles,
            location_error: self.location_error.as_deref(),
        });

        self.view_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    fn on_location(&mut self, location: Option<CurrentLocation>) {
        self.location = location;
        let Some(current) = &self.location else {
            return;
        };
        let coords = current.location.coords;
        if self.stage.claim(coords) {
            self.start_geocode(coords);
        }
    }

    fn start_geocode(&mut self, coords: Coordinates) {
        if let Some(task) = self.in_flight.take() {
            debug!("Cancelling superseded geocode");
            task.abort();
        }
        self.seq += 1;
        self.error = None;
        self.awaiting_geocode = true;
        self.nearby.clear();
        self.markers.clear();

        let seq = self.seq;
        let request = self.stage.request(coords);
        let done = self.done_tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let outcome = request.await;
            let _ = done.send(Completion::Geocoded { seq, outcome });
        }));
    }

    fn start_marker_lookup(&self) {
        if self.nearby.is_empty() {
            return;
        }
        let seq = self.seq;
        let places = Arc::clone(&self.places);
        let nearby = self.nearby.clone();
        let done = self.done_tx.clone();
        tokio::spawn(async move {
            let markers = resolve_nearby_locations(places, &nearby)
                .await
                .iter()
                .map(|(object, coords)| MapMarker::new(object, *coords))
                .collect();
            let _ = done.send(Completion::Located { seq, markers });
        });
    }

    /// An explicit location choice ends the current edit session
    fn end_session(&mut self) {
        self.form.end_session();
        self.location_error = None;
    }

    fn on_event(&mut self, event: PipelineEvent) {
        debug!(?event, "Pipeline event");
        match event {
            PipelineEvent::NextMockLocation => {
                self.end_session();
                self.source.next_mock_location();
            }
            PipelineEvent::UseSystemLocation => {
                self.end_session();
                let source = Arc::clone(&self.source);
                let done = self.done_tx.clone();
                tokio::spawn(async move {
                    let result = source.use_system_location().await;
                    let _ = done.send(Completion::SystemLocation(result));
                });
            }
            PipelineEvent::SetMockLocation { coords } => {
                self.end_session();
                if let Err(e) = self.source.set_mock_location(coords) {
                    warn!("Ignoring mock location: {}", e);
                }
            }
            PipelineEvent::DropPin { coords } => {
                self.end_session();
                if let Err(e) = self.source.drop_pin(coords) {
                    warn!("Ignoring dropped pin: {}", e);
                }
            }
            PipelineEvent::ToggleMap => self.set_map_visible(!self.toggles.show_map),
            PipelineEvent::SetMapVisible { visible } => self.set_map_visible(visible),
            PipelineEvent::EditField { field, value } => self.form.edit(field, value),
            PipelineEvent::SelectPlace { place_id } => {
                let places = Arc::clone(&self.places);
                let done = self.done_tx.clone();
                tokio::spawn(async move {
                    let result = places.place_details(&place_id).await;
                    let _ = done.send(Completion::PlaceSelected(result));
                });
            }
            PipelineEvent::Retry => {
                if let Some(coords) = self.location.as_ref().map(|l| l.location.coords) {
                    if self.error.is_some() {
                        self.stage.release(coords);
                    }
                    if self.stage.claim(coords) {
                        self.start_geocode(coords);
                    }
                }
            }
            PipelineEvent::Reset => {
                info!("Resetting address");
                self.form.reset();
                self.nearby.clear();
                self.markers.clear();
                self.error = None;
                self.stage.forget();
                if let Some(coords) = self.location.as_ref().map(|l| l.location.coords) {
                    if self.stage.claim(coords) {
                        self.start_geocode(coords);
                    }
                }
            }
        }
    }

    fn set_map_visible(&mut self, visible: bool) {
        if self.toggles.show_map == visible {
            return;
        }
        self.toggles.show_map = visible;
        if visible && self.markers.is_empty() {
            self.start_marker_lookup();
        }
    }

    fn on_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Geocoded { seq, outcome } => {
                if seq != self.seq {
                    debug!(seq, latest = self.seq, "Dropping stale geocode result");
                    return;
                }
                self.in_flight = None;
                self.awaiting_geocode = false;
                self.on_geocoded(outcome);
            }
            Completion::Located { seq, markers } => {
                if seq == self.seq {
                    self.markers = markers;
                }
            }
            Completion::PlaceSelected(Ok(details)) => {
                info!(place_id = %details.place_id, "Place selected");
                self.form.replace(self.formats.normalize(&details.raw_address()));
                self.error = None;
            }
            Completion::PlaceSelected(Err(e)) => {
                warn!("Place lookup failed: {}", e);
                self.error = Some(e.to_string());
            }
            Completion::SystemLocation(Ok(_)) => self.location_error = None,
            Completion::SystemLocation(Err(e)) => self.location_error = Some(e.to_string()),
        }
    }

    fn on_geocoded(&mut self, outcome: GeocodeOutcome) {
        match outcome {
            GeocodeOutcome::Resolved { address, nearby, .. } => {
                let normalized = self.formats.normalize(&address);
                debug!(country_code = normalized.country_code(), "Address normalized");
                self.form.apply_geocoded(normalized);
                self.nearby = nearby;
                self.error = None;
                if self.toggles.show_map {
                    self.start_marker_lookup();
                }
            }
            failed => {
                self.stage.release(failed.coords());
                self.error = failed.error_message();
            }
        }
    }
}

#[cfg(test)]
mod tests;
