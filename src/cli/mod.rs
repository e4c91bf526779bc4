//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod resolve;
pub mod serve;
pub mod watch;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Reverse geocode locations into country-specific addresses
#[derive(Parser)]
#[command(name = "landmark-address")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve one location to an address and print it
    Resolve(resolve::ResolveArgs),

    /// Run the interactive pipeline and print the view as it changes
    Watch(watch::WatchArgs),

    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Install the tracing subscriber
///
/// `RUST_LOG` wins over `default_level`. Logs go to stderr so command output
/// on stdout stays machine-readable.
pub fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve(args) => {
            init_logging("warn");
            resolve::run(args).await
        }
        Commands::Watch(args) => {
            init_logging("warn");
            watch::run(args).await
        }
        Commands::Serve(args) => {
            init_logging("info");
            serve::run(args).await
        }
        Commands::Config(args) => config::run(args),
    }
}
