//! Resolve command handler
//!
//! Geocodes a single location and prints the normalized address.

use crate::address::AddressFormats;
use crate::config::Config;
use crate::constants::labels;
use crate::coord::{Coordinates, LabeledLocation};
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter};
use crate::geo::get_geocoder;
use crate::location::{IpLocator, LocationProvider, MockLocations};
use crate::pipeline::{resolve_location, GeocodeSettings, GeocodingStage};
use clap::Args;
use std::sync::Arc;

/// Resolve command arguments
#[derive(Args)]
pub struct ResolveArgs {
    /// Latitude
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lng: Option<f64>,

    /// Use mock location N (see --list-mock)
    #[arg(long, short = 'm', conflicts_with_all = ["lat", "lng", "here"])]
    pub mock: Option<usize>,

    /// Use current location (IP geolocation)
    #[arg(long, conflicts_with_all = ["lat", "lng", "mock"])]
    pub here: bool,

    /// Output format
    #[arg(long, short = 'f', default_value = "text")]
    pub format: String,

    /// Skip nearby landmarks and areas
    #[arg(long)]
    pub no_descriptors: bool,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// List mock locations
    #[arg(long = "list-mock")]
    pub list_mock: bool,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,
}

/// Run the resolve command
pub async fn run(args: ResolveArgs) -> Result<()> {
    if args.list_mock {
        list_mock_locations();
        return Ok(());
    }

    if args.list_formats {
        list_formats();
        return Ok(());
    }

    let formatter = get_formatter(&args.format)
        .ok_or_else(|| Error::Config(format!("Unknown format: {}", args.format)))?;

    let config = Config::load()?;
    let location = choose_location(&args).await?;

    let mut settings = GeocodeSettings::from(&config.geocoder);
    if args.no_descriptors {
        settings.include_descriptors = false;
    }
    let stage = GeocodingStage::new(Arc::new(get_geocoder(&config)?), settings);

    let resolution = resolve_location(&stage, &AddressFormats::new(), location).await?;
    let output = formatter.format_resolution(&resolution, &config)?;

    if let Some(path) = args.output {
        std::fs::write(&path, &output)?;
        eprintln!("Output written to {}", path);
    } else {
        println!("{}", output);
    }

    Ok(())
}

async fn choose_location(args: &ResolveArgs) -> Result<LabeledLocation> {
    if args.here {
        let coords = IpLocator::new().current_location().await?;
        eprintln!("Using IP location: {}", coords);
        return Ok(LabeledLocation::new(coords, labels::CURRENT_LOCATION));
    }

    if let Some(index) = args.mock {
        let mocks = MockLocations::new();
        if index >= mocks.len() {
            return Err(Error::Config(format!(
                "Mock location {} does not exist (0-{})",
                index,
                mocks.len() - 1
            )));
        }
        return Ok(MockLocations::starting_at(index).current());
    }

    match (args.lat, args.lng) {
        (Some(lat), Some(lng)) => Ok(LabeledLocation::new(
            Coordinates::new(lat, lng),
            labels::USER_SELECTED,
        )),
        _ => Err(Error::Config(
            "No location specified. Use --lat/--lng, --mock, or --here".to_string(),
        )),
    }
}

/// Print the mock locations with their indices
fn list_mock_locations() {
    println!("Mock locations:");
    for (index, location) in MockLocations::entries().iter().enumerate() {
        println!("  {}  {:<40} {}", index, location.label, location.coords);
    }
}

/// Print available output formats
fn list_formats() {
    println!("Available output formats:");
    for format in available_formats() {
        println!("  {:10} - {}", format.name, format.description);
    }
}
