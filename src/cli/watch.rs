//! Watch command handler
//!
//! Runs the reactive pipeline against stdin commands and reprints the view
//! whenever it changes.

use crate::address::AddressField;
use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::format::get_formatter;
use crate::pipeline::{AddressPipeline, PipelineEvent};
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

const HELP: &str = "\
Commands:
  next                 Next mock location
  system               Use the device location
  pin <lat> <lng>      Set a mock location
  drop <lat> <lng>     Drop a pin
  map                  Toggle the map
  edit <field> <value> Edit an address field
  place <place_id>     Use a place's address
  retry                Geocode the current location again
  reset                Clear edits and the error
  help                 Show this help
  quit                 Exit";

/// Watch command arguments
#[derive(Args)]
pub struct WatchArgs {
    /// Output format
    #[arg(long, short = 'f', default_value = "text")]
    pub format: String,

    /// Start from the device location instead of the mock list
    #[arg(long)]
    pub system: bool,
}

/// A parsed stdin line
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Event(PipelineEvent),
    Help,
    Quit,
}

fn parse_coords(lat: Option<&str>, lng: Option<&str>) -> Result<Coordinates> {
    let parse = |value: Option<&str>, name: &str| -> Result<f64> {
        value
            .ok_or_else(|| Error::Config(format!("Missing {}", name)))?
            .parse()
            .map_err(|_| Error::Config(format!("Invalid {}", name)))
    };
    let coords = Coordinates::new(parse(lat, "latitude")?, parse(lng, "longitude")?);
    coords.validate()?;
    Ok(coords)
}

/// Parse one line of input; blank lines yield `None`
fn parse_command(line: &str) -> Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };

    let event = match name.to_lowercase().as_str() {
        "next" | "n" => PipelineEvent::NextMockLocation,
        "system" | "here" => PipelineEvent::UseSystemLocation,
        "pin" => PipelineEvent::SetMockLocation {
            coords: parse_coords(words.next(), words.next())?,
        },
        "drop" => PipelineEvent::DropPin {
            coords: parse_coords(words.next(), words.next())?,
        },
        "map" => PipelineEvent::ToggleMap,
        "edit" => {
            let field: AddressField = words
                .next()
                .ok_or_else(|| Error::Config("Missing field name".to_string()))?
                .parse()?;
            PipelineEvent::EditField {
                field,
                value: words.collect::<Vec<_>>().join(" "),
            }
        }
        "place" => PipelineEvent::SelectPlace {
            place_id: words
                .next()
                .ok_or_else(|| Error::Config("Missing place id".to_string()))?
                .to_string(),
        },
        "retry" => PipelineEvent::Retry,
        "reset" => PipelineEvent::Reset,
        "help" | "?" => return Ok(Some(Command::Help)),
        "quit" | "exit" | "q" => return Ok(Some(Command::Quit)),
        other => return Err(Error::Config(format!("Unknown command: {}", other))),
    };

    Ok(Some(Command::Event(event)))
}

/// Run the watch command
pub async fn run(args: WatchArgs) -> Result<()> {
    let formatter = get_formatter(&args.format)
        .ok_or_else(|| Error::Config(format!("Unknown format: {}", args.format)))?;

    let mut config = Config::load()?;
    if args.system {
        config.location.source = "system".to_string();
    }

    let pipeline = AddressPipeline::from_config(&config)?;
    let mut view = pipeline.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprintln!("{}", HELP);
    println!("{}", formatter.format_view(&view.borrow_and_update(), &config)?);

    loop {
        tokio::select! {
            changed = view.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = view.borrow_and_update().clone();
                println!("{}", formatter.format_view(&state, &config)?);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };
                match parse_command(&line) {
                    Ok(Some(Command::Event(event))) => pipeline.send(event).await?,
                    Ok(Some(Command::Help)) => eprintln!("{}", HELP),
                    Ok(Some(Command::Quit)) => break,
                    Ok(None) => {}
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
        }
    }

    pipeline.shutdown().await;
    Ok(())
}
