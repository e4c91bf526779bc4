//! JSON output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::pipeline::{Resolution, ViewState};
use serde_json::json;

/// JSON formatter - outputs the full value as pretty-printed JSON
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Full JSON response"
    }

    fn format_resolution(&self, resolution: &Resolution, config: &Config) -> Result<String> {
        let coords = resolution.location.coords;
        let value = json!({
            "location": resolution.location,
            "geocoder_address": resolution.geocoder_address,
            "address": resolution.address,
            "formatted_address": resolution.address.to_formatted_address(),
            "nearby": resolution.nearby.iter().map(|n| json!({
                "object": n,
                "description": n.description(),
                "distance": n.distance_string(),
            })).collect::<Vec<_>>(),
            "map_url": config.format_url(None, coords.lat, coords.lng).ok(),
        });
        Ok(serde_json::to_string_pretty(&value)?)
    }

    fn format_view(&self, view: &ViewState, _config: &Config) -> Result<String> {
        Ok(serde_json::to_string_pretty(view)?)
    }
}
