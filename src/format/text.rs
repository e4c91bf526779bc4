//! Human-readable text output formatter

use crate::address::DisplayAddress;
use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::geo::country;
use crate::geo::nearby::NearbyObject;
use crate::pipeline::{Resolution, Status, ViewState};

/// Text formatter - outputs human-readable summary
pub struct TextFormatter;

fn push_address(output: &mut String, address: &DisplayAddress) {
    let code = address.country_code();
    match country::flag_emoji(code) {
        Some(flag) => output.push_str(&format!("{} {}\n", flag, code)),
        None => output.push_str(&format!("{}\n", code)),
    }
    for line in address.to_formatted_address().lines() {
        output.push_str(&format!("  {}\n", line));
    }
}

fn push_nearby(output: &mut String, nearby: &[NearbyObject]) {
    if nearby.is_empty() {
        return;
    }
    output.push_str("\nNearby:\n");
    for object in nearby {
        output.push_str(&format!("  {}\n", object));
    }
}

fn push_map_link(output: &mut String, coords: Coordinates, config: &Config) {
    if let Ok(url) = config.format_url(None, coords.lat, coords.lng) {
        output.push_str(&format!("\nMap: {}\n", url));
    }
}

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn format_resolution(&self, resolution: &Resolution, config: &Config) -> Result<String> {
        let mut output = String::new();
        let location = &resolution.location;

        output.push_str(&format!("{} ({})\n\n", location.label, location.coords));
        push_address(&mut output, &resolution.address);
        push_nearby(&mut output, &resolution.nearby);
        push_map_link(&mut output, location.coords, config);

        Ok(output)
    }

    fn format_view(&self, view: &ViewState, config: &Config) -> Result<String> {
        let mut output = String::new();

        match view.location {
            Some(coords) => {
                let source = if view.location_label.is_empty() {
                    String::new()
                } else {
                    format!("{} ", view.location_label)
                };
                output.push_str(&format!("Location: {}({})\n", source, coords));
            }
            None => output.push_str("Location: waiting for a fix\n"),
        }
        if let Some(error) = &view.location_error {
            output.push_str(&format!("Location error: {}\n", error));
        }
        output.push('\n');

        match &view.status {
            Status::Loading => output.push_str("Resolving address...\n"),
            Status::Error { message } => {
                output.push_str(&format!("Error: {}\n", message));
                output.push_str("Use 'retry' to try again.\n");
            }
            Status::Ready {
                address,
                nearby,
                markers,
                ..
            } => {
                push_address(&mut output, address);
                push_nearby(&mut output, nearby);
                if view.show_map {
                    if let Some(coords) = view.location {
                        push_map_link(&mut output, coords, config);
                    }
                    for marker in markers {
                        output.push_str(&format!("  * {} ({})\n", marker.title, marker.coords));
                    }
                }
            }
        }

        Ok(output)
    }
}
