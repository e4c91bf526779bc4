use super::*;
use crate::address::{AddressField, DisplayAddress};
use crate::geo::AddressComponentType;
use crate::geo::component::AddressComponent;
use crate::location::MockLocations;
use crate::testing::{
    india_response, response_for_locality, sf_response, wait_for, wait_until, FakeGeocoder,
    FakeLocationProvider, FakePlaces,
};
use std::time::Duration;

fn settings() -> GeocodeSettings {
    GeocodeSettings {
        include_descriptors: true,
        coalesce_meters: 50.0,
        max_retries: 0,
        retry_delay: Duration::from_millis(1),
    }
}

fn boulder() -> Coordinates {
    MockLocations::entries()[0].coords
}

fn louisville() -> Coordinates {
    Coordinates::new(39.9778, -105.1319)
}

struct Harness {
    pipeline: AddressPipeline,
    geocoder: Arc<FakeGeocoder>,
    source: Arc<LocationSource<FakeLocationProvider>>,
}

fn start(geocoder: FakeGeocoder, provider: FakeLocationProvider) -> Harness {
    start_with(geocoder, LocationSource::new(provider), FakePlaces::new(), settings())
}

fn start_with(
    geocoder: FakeGeocoder,
    source: LocationSource<FakeLocationProvider>,
    places: FakePlaces,
    settings: GeocodeSettings,
) -> Harness {
    let geocoder = Arc::new(geocoder);
    let source = Arc::new(source);
    let pipeline = AddressPipeline::spawn(
        Arc::clone(&source),
        GeocodingStage::new(Arc::clone(&geocoder), settings),
        Arc::new(places),
        AddressFormats::new(),
    );
    Harness {
        pipeline,
        geocoder,
        source,
    }
}

fn city(view: &ViewState) -> Option<String> {
    view.address().map(|a| a.field(AddressField::City).to_string())
}

#[tokio::test]
async fn test_initial_mock_location_resolves() {
    let h = start(
        FakeGeocoder::new(response_for_locality("Boulder", "US")),
        FakeLocationProvider::at(boulder()),
    );
    let mut rx = h.pipeline.subscribe();

    let view = wait_for(&mut rx, ViewState::is_ready).await;
    assert_eq!(view.location_label, "Boulder, CO");
    assert_eq!(view.location, Some(boulder()));
    assert_eq!(city(&view).as_deref(), Some("Boulder"));
    assert_eq!(view.buttons.mock_location, ButtonState::Selected);
    assert_eq!(h.geocoder.calls(), 1);
}

#[tokio::test]
async fn test_nearby_move_is_coalesced() {
    let h = start(
        FakeGeocoder::new(response_for_locality("Boulder", "US")),
        FakeLocationProvider::at(boulder()),
    );
    let mut rx = h.pipeline.subscribe();
    wait_for(&mut rx, ViewState::is_ready).await;

    let nearby = Coordinates::new(boulder().lat + 0.0002, boulder().lng);
    h.pipeline
        .send(PipelineEvent::SetMockLocation { coords: nearby })
        .await
        .unwrap();

    let view = wait_for(&mut rx, |v| v.location == Some(nearby)).await;
    assert_eq!(view.location_label, "User selected");
    assert!(view.is_ready());
    assert_eq!(h.geocoder.calls(), 1);
}

#[tokio::test]
async fn test_far_move_geocodes_again() {
    let h = start(
        FakeGeocoder::new(response_for_locality("Boulder", "US"))
            .with_response_at(louisville(), response_for_locality("Louisville", "US")),
        FakeLocationProvider::at(boulder()),
    );
    let mut rx = h.pipeline.subscribe();
    wait_for(&mut rx, ViewState::is_ready).await;

    h.pipeline
        .send(PipelineEvent::DropPin { coords: louisville() })
        .await
        .unwrap();

    let view = wait_for(&mut rx, |v| city(v).as_deref() == Some("Louisville")).await;
    assert_eq!(view.location_label, "Dropped Pin");
    assert_eq!(h.geocoder.calls(), 2);
}

#[tokio::test]
async fn test_latest_location_wins() {
    let slow = Coordinates::new(39.7392, -104.9903);
    let fast = louisville();
    let h = start(
        FakeGeocoder::new(response_for_locality("Boulder", "US"))
            .with_response_at(slow, response_for_locality("Denver", "US"))
            .with_delay(slow, Duration::from_millis(200))
            .with_response_at(fast, response_for_locality("Louisville", "US")),
        FakeLocationProvider::at(boulder()),
    );
    let mut rx = h.pipeline.subscribe();
    wait_for(&mut rx, ViewState::is_ready).await;

    h.pipeline
        .send(PipelineEvent::SetMockLocation { coords: slow })
        .await
        .unwrap();
    let geocoder = Arc::clone(&h.geocoder);
    wait_until(|| geocoder.requested().contains(&slow)).await;

    h.pipeline
        .send(PipelineEvent::SetMockLocation { coords: fast })
        .await
        .unwrap();
    wait_for(&mut rx, |v| city(v).as_deref() == Some("Louisville")).await;

    tokio::time::sleep(Duration::from_millis(300)).await;
    let view = h.pipeline.current();
    assert_eq!(city(&view).as_deref(), Some("Louisville"));
    assert_eq!(view.location, Some(fast));

    let requested = h.geocoder.requested();
    assert_eq!(requested.iter().filter(|c| **c == slow || **c == fast).count(), 2);
}

#[tokio::test]
async fn test_superseded_result_is_dropped() {
    let source = Arc::new(LocationSource::new(FakeLocationProvider::at(boulder())));
    let stage = GeocodingStage::new(
        Arc::new(
            FakeGeocoder::new(sf_response())
                .with_response_at(louisville(), response_for_locality("Louisville", "US")),
        ),
        settings(),
    );
    let (view_tx, view_rx) = watch::channel(ViewState::default());
    let (mut driver, mut done) = Driver::new(
        Arc::clone(&source),
        stage,
        Arc::new(FakePlaces::new()),
        AddressFormats::new(),
        view_tx,
    );

    let initial = driver.location_rx.borrow_and_update().clone();
    driver.on_location(initial);
    let superseded = driver.seq;

    source.drop_pin(louisville()).unwrap();
    let moved = driver.location_rx.borrow_and_update().clone();
    driver.on_location(moved);
    assert_ne!(driver.seq, superseded);

    loop {
        let completion = done.recv().await.unwrap();
        if matches!(completion, Completion::Geocoded { seq, .. } if seq == driver.seq) {
            driver.on_completion(completion);
            break;
        }
    }
    driver.publish();
    assert_eq!(city(&view_rx.borrow()).as_deref(), Some("Louisville"));

    // the older request reports after the newer one
    driver.on_completion(Completion::Geocoded {
        seq: superseded,
        outcome: GeocodeOutcome::from_response(boulder(), sf_response()),
    });
    driver.publish();

    let view = view_rx.borrow().clone();
    assert_eq!(city(&view).as_deref(), Some("Louisville"));
    assert_eq!(view.location, Some(louisville()));
    assert!(view.nearby().is_empty());
}

#[tokio::test]
async fn test_loading_while_new_location_geocodes() {
    let source = LocationSource::on_device(FakeLocationProvider::at(boulder()));
    source.apply_device_fix(boulder());
    let h = start_with(
        FakeGeocoder::new(sf_response())
            .with_response_at(louisville(), response_for_locality("Louisville", "US"))
            .with_delay(louisville(), Duration::from_millis(200)),
        source,
        FakePlaces::new(),
        settings(),
    );
    let mut rx = h.pipeline.subscribe();
    let view = wait_for(&mut rx, ViewState::is_ready).await;
    assert_eq!(view.nearby().len(), 4);

    h.pipeline
        .send(PipelineEvent::EditField {
            field: AddressField::Unit,
            value: "Suite 5".to_string(),
        })
        .await
        .unwrap();
    wait_for(&mut rx, |v| {
        v.address().map(|a| a.field(AddressField::Unit)) == Some("Suite 5")
    })
    .await;

    assert!(h.source.apply_device_fix(louisville()));
    let view = wait_for(&mut rx, |v| v.location == Some(louisville())).await;
    assert!(view.is_loading());
    assert!(view.address().is_none());

    let view = wait_for(&mut rx, |v| city(v).as_deref() == Some("Louisville")).await;
    assert_eq!(view.location, Some(louisville()));
    assert_eq!(view.address().unwrap().field(AddressField::Unit), "Suite 5");
    assert!(view.nearby().is_empty());
}

#[tokio::test]
async fn test_mock_cycle_returns_to_start() {
    let h = start(
        FakeGeocoder::new(response_for_locality("Somewhere", "US")),
        FakeLocationProvider::at(boulder()),
    );
    let mut rx = h.pipeline.subscribe();
    wait_for(&mut rx, ViewState::is_ready).await;

    for _ in 0..MockLocations::new().len() {
        h.pipeline.send(PipelineEvent::NextMockLocation).await.unwrap();
    }
    h.pipeline
        .send(PipelineEvent::SetMapVisible { visible: true })
        .await
        .unwrap();
    wait_for(&mut rx, |v| v.show_map).await;

    assert_eq!(h.source.current().unwrap().location, MockLocations::entries()[0]);

    h.pipeline.send(PipelineEvent::NextMockLocation).await.unwrap();
    let view = wait_for(&mut rx, |v| v.location_label == "San Francisco").await;
    assert_eq!(view.location, Some(MockLocations::entries()[1].coords));
}

#[tokio::test]
async fn test_edits_survive_continuous_updates() {
    let source = LocationSource::on_device(FakeLocationProvider::at(boulder()));
    source.apply_device_fix(boulder());
    let h = start_with(
        FakeGeocoder::new(response_for_locality("Boulder", "US"))
            .with_response_at(louisville(), response_for_locality("Louisville", "US")),
        source,
        FakePlaces::new(),
        settings(),
    );
    let mut rx = h.pipeline.subscribe();
    let view = wait_for(&mut rx, ViewState::is_ready).await;
    assert_eq!(view.buttons.current_location, ButtonState::Selected);

    h.pipeline
        .send(PipelineEvent::EditField {
            field: AddressField::Unit,
            value: "Suite 5".to_string(),
        })
        .await
        .unwrap();
    wait_for(&mut rx, |v| {
        v.address().map(|a| a.field(AddressField::Unit)) == Some("Suite 5")
    })
    .await;

    assert!(h.source.apply_device_fix(louisville()));
    let view = wait_for(&mut rx, |v| city(v).as_deref() == Some("Louisville")).await;
    assert_eq!(view.address().unwrap().field(AddressField::Unit), "Suite 5");

    // an explicit location choice ends the edit session
    h.pipeline.send(PipelineEvent::NextMockLocation).await.unwrap();
    let view = wait_for(&mut rx, |v| city(v).as_deref() == Some("Boulder")).await;
    assert_eq!(view.address().unwrap().field(AddressField::Unit), "");
}

#[tokio::test]
async fn test_error_after_retries_then_retry() {
    let mut settings = settings();
    settings.max_retries = 1;
    let h = start_with(
        FakeGeocoder::new(response_for_locality("Boulder", "US"))
            .then_fail("connection refused")
            .then_fail("connection refused"),
        LocationSource::new(FakeLocationProvider::at(boulder())),
        FakePlaces::new(),
        settings,
    );
    let mut rx = h.pipeline.subscribe();

    let view = wait_for(&mut rx, |v| v.error().is_some()).await;
    assert!(view.error().unwrap().contains("connection refused"));
    assert_eq!(h.geocoder.calls(), 2);

    h.pipeline.send(PipelineEvent::Retry).await.unwrap();
    let view = wait_for(&mut rx, ViewState::is_ready).await;
    assert_eq!(city(&view).as_deref(), Some("Boulder"));
    assert_eq!(h.geocoder.calls(), 3);
}

#[tokio::test]
async fn test_edit_during_error_kept_for_retry() {
    let h = start_with(
        FakeGeocoder::new(response_for_locality("Boulder", "US")).then_fail("connection refused"),
        LocationSource::new(FakeLocationProvider::at(boulder())),
        FakePlaces::new(),
        settings(),
    );
    let mut rx = h.pipeline.subscribe();
    wait_for(&mut rx, |v| v.error().is_some()).await;

    h.pipeline
        .send(PipelineEvent::EditField {
            field: AddressField::Unit,
            value: "Suite 5".to_string(),
        })
        .await
        .unwrap();
    h.pipeline.send(PipelineEvent::Retry).await.unwrap();

    let view = wait_for(&mut rx, ViewState::is_ready).await;
    assert_eq!(city(&view).as_deref(), Some("Boulder"));
    assert_eq!(view.address().unwrap().field(AddressField::Unit), "Suite 5");
}

#[tokio::test]
async fn test_permission_denied_is_surfaced() {
    let h = start(
        FakeGeocoder::new(response_for_locality("Boulder", "US")),
        FakeLocationProvider::denied(),
    );
    let mut rx = h.pipeline.subscribe();
    wait_for(&mut rx, ViewState::is_ready).await;

    h.pipeline.send(PipelineEvent::UseSystemLocation).await.unwrap();
    let view = wait_for(&mut rx, |v| v.location_error.is_some()).await;

    assert!(view.location_error.as_deref().unwrap().contains("permission denied"));
    assert!(view.is_ready());
    assert_eq!(view.location_label, "Boulder, CO");
}

#[tokio::test]
async fn test_select_place_replaces_address() {
    use AddressComponentType::*;
    let places = FakePlaces::new().with_place(
        "surat-place",
        Some(Coordinates::new(21.234, 72.907)),
        vec![
            AddressComponent::new("Sarthana - Kamrej Road", "Sarthana - Kamrej Rd", &[Route]),
            AddressComponent::new("Surat", "Surat", &[Locality]),
            AddressComponent::new("Gujarat", "GJ", &[AdministrativeAreaLevel1]),
            AddressComponent::new("India", "IN", &[Country]),
        ],
    );
    let h = start_with(
        FakeGeocoder::new(response_for_locality("Boulder", "US")),
        LocationSource::new(FakeLocationProvider::at(boulder())),
        places,
        settings(),
    );
    let mut rx = h.pipeline.subscribe();
    wait_for(&mut rx, ViewState::is_ready).await;

    h.pipeline
        .send(PipelineEvent::SelectPlace {
            place_id: "surat-place".to_string(),
        })
        .await
        .unwrap();
    let view = wait_for(&mut rx, |v| matches!(v.address(), Some(DisplayAddress::India(_)))).await;

    let address = view.address().unwrap();
    assert_eq!(address.field(AddressField::City), "Surat");
    assert_eq!(address.field(AddressField::State), "Gujarat");
    assert_eq!(address.country_code(), "IN");
}

#[tokio::test]
async fn test_unknown_place_is_an_error() {
    let h = start(
        FakeGeocoder::new(response_for_locality("Boulder", "US")),
        FakeLocationProvider::at(boulder()),
    );
    let mut rx = h.pipeline.subscribe();
    wait_for(&mut rx, ViewState::is_ready).await;

    h.pipeline
        .send(PipelineEvent::SelectPlace {
            place_id: "nope".to_string(),
        })
        .await
        .unwrap();
    let view = wait_for(&mut rx, |v| v.error().is_some()).await;
    assert!(view.error().unwrap().contains("nope"));
}

#[tokio::test]
async fn test_map_markers_for_nearby_objects() {
    let response = sf_response();
    let ferry = response.nearby_objects()[0].place_id().to_string();
    let places = FakePlaces::new().with_place(&ferry, Some(Coordinates::new(37.7955, -122.3937)), vec![]);
    let h = start_with(
        FakeGeocoder::new(response),
        LocationSource::new(FakeLocationProvider::at(boulder())),
        places,
        settings(),
    );
    let mut rx = h.pipeline.subscribe();
    let view = wait_for(&mut rx, ViewState::is_ready).await;
    assert_eq!(view.nearby().len(), 4);

    h.pipeline.send(PipelineEvent::ToggleMap).await.unwrap();
    let view = wait_for(&mut rx, |v| match &v.status {
        Status::Ready { markers, .. } => !markers.is_empty(),
        _ => false,
    })
    .await;

    let Status::Ready { markers, .. } = view.status else {
        unreachable!()
    };
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].title, "Ferry Building");
    assert_eq!(view.buttons.map, ButtonState::Selected);
}

#[tokio::test]
async fn test_india_location_uses_india_schema() {
    let akshardham = MockLocations::entries()[4].coords;
    let h = start(
        FakeGeocoder::new(response_for_locality("Boulder", "US"))
            .with_response_at(akshardham, india_response()),
        FakeLocationProvider::at(boulder()),
    );
    let mut rx = h.pipeline.subscribe();
    wait_for(&mut rx, ViewState::is_ready).await;

    h.pipeline
        .send(PipelineEvent::SetMockLocation { coords: akshardham })
        .await
        .unwrap();
    let view = wait_for(&mut rx, |v| matches!(v.address(), Some(DisplayAddress::India(_)))).await;
    let address = view.address().unwrap();
    assert_eq!(address.field(AddressField::Unit), "akshardham society 2/3");
    assert_eq!(address.field(AddressField::PostalCode), "395006");
}

#[tokio::test]
async fn test_every_observer_sees_updates() {
    let h = start(
        FakeGeocoder::new(response_for_locality("Boulder", "US")),
        FakeLocationProvider::at(boulder()),
    );
    let mut first = h.pipeline.subscribe();
    let mut second = h.pipeline.subscribe();

    let a = wait_for(&mut first, ViewState::is_ready).await;
    let b = wait_for(&mut second, ViewState::is_ready).await;
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_reset_geocodes_again() {
    let h = start(
        FakeGeocoder::new(response_for_locality("Boulder", "US")),
        FakeLocationProvider::at(boulder()),
    );
    let mut rx = h.pipeline.subscribe();
    wait_for(&mut rx, ViewState::is_ready).await;
    h.pipeline
        .send(PipelineEvent::EditField {
            field: AddressField::City,
            value: "Nowhere".to_string(),
        })
        .await
        .unwrap();
    wait_for(&mut rx, |v| city(v).as_deref() == Some("Nowhere")).await;

    h.pipeline.send(PipelineEvent::Reset).await.unwrap();
    wait_for(&mut rx, |v| city(v).as_deref() == Some("Boulder")).await;
    assert_eq!(h.geocoder.calls(), 2);
}

#[tokio::test]
async fn test_shutdown_stops_driver() {
    let h = start(
        FakeGeocoder::new(response_for_locality("Boulder", "US")),
        FakeLocationProvider::at(boulder()),
    );
    let rx = h.pipeline.subscribe();
    h.pipeline.shutdown().await;

    assert!(rx.has_changed().is_err());
}

#[test]
fn test_event_wire_format() {
    let event: PipelineEvent = serde_json::from_value(serde_json::json!({
        "type": "edit_field",
        "field": "postal_code",
        "value": "80302"
    }))
    .unwrap();
    assert_eq!(
        event,
        PipelineEvent::EditField {
            field: AddressField::PostalCode,
            value: "80302".to_string()
        }
    );

    let event: PipelineEvent = serde_json::from_str(r#"{"type":"drop_pin","coords":{"lat":1.0,"lng":2.0}}"#).unwrap();
    assert_eq!(event, PipelineEvent::DropPin { coords: Coordinates::new(1.0, 2.0) });
}
