//! fuelmap — operator CLI driving the engine over an LMDB data directory.
//!
//! Command results are printed to stdout as JSON; logs go to stderr.

use anyhow::Context;
use clap::Parser;
use rand::Rng;
use serde_json::{json, Value};
use std::path::PathBuf;

use fuelmap_engine::{init_logging, EngineConfig, LogFormat, StationEngine, Submission};
use fuelmap_store_lmdb::{LmdbEnvironment, LmdbStationStore};
use fuelmap_types::{ActorId, Coordinates, FuelType, NewStation, StationId, Timestamp};

#[derive(Parser)]
#[command(name = "fuelmap", about = "Station trust and price consensus engine")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "FUELMAP_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory holding the LMDB environment.
    #[arg(long, env = "FUELMAP_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "FUELMAP_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "FUELMAP_LOG_FORMAT")]
    log_format: Option<String>,

    /// Votes needed to confirm a community price.
    #[arg(long, env = "FUELMAP_CONFIRMATION_THRESHOLD")]
    confirmation_threshold: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Register a new station.
    Register {
        #[arg(long)]
        name: String,
        /// Station id; generated from the name when omitted.
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        cnpj: Option<String>,
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Actor id of the owner; owner-registered stations start verified.
        #[arg(long)]
        owner: Option<String>,
    },
    /// Report a price. The station owner sets it directly; anyone else
    /// opens or joins a pending change.
    Propose {
        station: String,
        /// gasoline, ethanol or diesel.
        fuel: FuelType,
        price: f64,
        #[arg(long)]
        actor: String,
    },
    /// Vote for the pending price of a fuel.
    Vote {
        station: String,
        fuel: FuelType,
        #[arg(long)]
        actor: String,
    },
    /// Recompute trust and best value for every station and save them.
    Refresh,
    /// Show the current best-value station.
    Best,
    /// Show a station.
    Show {
        station: String,
        /// Include the trust score breakdown.
        #[arg(long)]
        explain: bool,
    },
    /// List a station's confirmed price changes, oldest first.
    History { station: String },
    /// Stations near a point, nearest first.
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Radius in km (defaults to the configured search radius).
        #[arg(long)]
        radius: Option<f64>,
    },
    /// Search stations by name or CNPJ.
    Search { query: String },
    /// Delete a station and its price history.
    Delete { station: String },
    /// Print the effective configuration as TOML.
    Config,
}

fn load_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    if let Some(threshold) = cli.confirmation_threshold {
        config.params.confirmation_threshold = threshold;
    }
    config.validate()?;
    Ok(config)
}

/// Lowercase, dash-separated slug of `name` plus a random suffix.
fn generate_station_id(name: &str) -> String {
    let slug = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    let suffix: u32 = rand::thread_rng().gen();
    if slug.is_empty() {
        format!("station-{suffix:08x}")
    } else {
        format!("{slug}-{suffix:08x}")
    }
}

fn submission_json(submission: &Submission) -> Value {
    match submission {
        Submission::Owner(update) => json!({
            "path": "owner",
            "fuel": update.fuel_type,
            "price": update.price.value(),
            "previous": update.previous.map(|p| p.value()),
            "superseded_pending": update.superseded.is_some(),
        }),
        Submission::Community(outcome) => json!({
            "path": "community",
            "opened": outcome.opened,
            "result": outcome.vote.result,
            "fuel": outcome.vote.change.fuel_type,
            "proposed_price": outcome.vote.change.proposed_price.value(),
            "votes": outcome.vote.change.votes,
        }),
    }
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(engine: &StationEngine<LmdbStationStore>, command: Command) -> anyhow::Result<()> {
    let now = Timestamp::now();
    match command {
        Command::Register {
            name,
            id,
            cnpj,
            lat,
            lon,
            owner,
        } => {
            let id = id.unwrap_or_else(|| generate_station_id(&name));
            let location = match (lat, lon) {
                (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)?),
                _ => None,
            };
            let request = NewStation {
                id: StationId::new(id)?,
                name,
                cnpj,
                location,
                owner: owner.map(ActorId::new).transpose()?,
            };
            print_json(&engine.register_station(request, now)?)
        }
        Command::Propose {
            station,
            fuel,
            price,
            actor,
        } => {
            let (station, actor) = (StationId::new(station)?, ActorId::new(actor)?);
            let submission = engine.propose_price(&station, fuel, price, actor, now)?;
            print_json(&submission_json(&submission))
        }
        Command::Vote {
            station,
            fuel,
            actor,
        } => {
            let (station, actor) = (StationId::new(station)?, ActorId::new(actor)?);
            let result = engine.vote_on_pending_price(&station, fuel, actor, now)?;
            print_json(&json!({ "result": result }))
        }
        Command::Refresh => {
            let summary = engine.refresh(now)?;
            print_json(&json!({
                "stations": summary.stations,
                "updated": summary.updated,
                "best_value": summary.best_value,
            }))
        }
        Command::Best => match engine.best_value_station(now)? {
            Some(station) => print_json(&station),
            None => print_json(&Value::Null),
        },
        Command::Show { station, explain } => {
            let station = engine.station(&StationId::new(station)?)?;
            if explain {
                let breakdown = engine.trust_breakdown(&station, now);
                print_json(&json!({ "station": station, "trust": breakdown }))
            } else {
                print_json(&station)
            }
        }
        Command::History { station } => {
            print_json(&engine.price_history(&StationId::new(station)?)?)
        }
        Command::Nearby { lat, lon, radius } => {
            let center = Coordinates::new(lat, lon)?;
            let found: Vec<Value> = engine
                .nearby(&center, radius)?
                .into_iter()
                .map(|n| json!({ "distance_km": n.distance_km, "station": n.station }))
                .collect();
            print_json(&found)
        }
        Command::Search { query } => print_json(&engine.search(&query)?),
        Command::Delete { station } => {
            let id = StationId::new(station)?;
            let removed = engine.delete_station(&id)?;
            print_json(&json!({ "deleted": id, "history_removed": removed }))
        }
        // Printed by main before storage is opened.
        Command::Config => Ok(()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if matches!(cli.command, Command::Config) {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let format: LogFormat = config.log_format()?;
    init_logging(format, &config.log_level)?;

    let env = LmdbEnvironment::open(&config.data_dir, config.map_size_bytes())
        .with_context(|| format!("opening data dir {}", config.data_dir.display()))?;
    tracing::debug!(data_dir = %config.data_dir.display(), "storage ready");

    let engine = StationEngine::new(env.station_store(), config.params.clone())?;
    run(&engine, cli.command)
}
