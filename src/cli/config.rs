//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::constants::api::API_KEY_ENV;
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "geocoder.coalesce_meters")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    // Show path
    if args.path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    // Reset config
    if args.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (&args.key, &args.value) {
        // No arguments: show all config
        (None, None) => {
            show_all_config(&config);
        }

        // Key only: show that value
        (Some(key), None) => {
            if let Some(value) = config.get(key) {
                println!("{}", value);
            } else {
                eprintln!("Available keys:");
                for k in Config::available_keys() {
                    eprintln!("  {}", k);
                }
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        // Key and value: set the value
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        // Value without key: not valid
        (None, Some(_)) => {
            return Err(Error::Config(
                "Must specify a key to set a value".to_string(),
            ));
        }
    }

    Ok(())
}

/// Display all configuration values
fn show_all_config(config: &Config) {
    println!("[geocoder]");
    if config.geocoder.api_key.is_empty() {
        println!("api_key = \"\" # not configured");
    } else {
        println!("api_key = \"***\" # configured");
    }
    println!("base_url = \"{}\"", config.geocoder.base_url);
    println!("include_descriptors = {}", config.geocoder.include_descriptors);
    println!("coalesce_meters = {}", config.geocoder.coalesce_meters);
    println!("max_retries = {}", config.geocoder.max_retries);
    println!("retry_delay_ms = {}", config.geocoder.retry_delay_ms);
    println!("timeout_secs = {}", config.geocoder.timeout_secs);
    println!();

    println!("[places]");
    println!("base_url = \"{}\"", config.places.base_url);
    println!();

    println!("[location]");
    println!("source = \"{}\"", config.location.source);
    println!("poll_interval_secs = {}", config.location.poll_interval_secs);
    println!();

    println!("[server]");
    println!("host = \"{}\"", config.server.host);
    println!("port = {}", config.server.port);
    println!();

    println!("[url]");
    println!("default = \"{}\"", config.url.default);
    println!();

    println!("[url.providers]");
    let mut providers: Vec<_> = config.url.providers.iter().collect();
    providers.sort();
    for (name, template) in providers {
        println!("{} = \"{}\"", name, template);
    }

    if config.geocoder.api_key.is_empty() && config.api_key().is_some() {
        println!();
        println!("# api key taken from {}", API_KEY_ENV);
    }
}
