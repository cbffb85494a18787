//! Command line front end
//!
//! ```bash
//! tempcast forecast --dataset history.json --latitude -12.05 --longitude -77.03 \
//!     --date 2025-06-01 --time 12:00
//! echo '{"latitude": -12.05, "longitude": -77.03}' | tempcast report --dataset history.json
//! ```
//!
//! Logging is controlled with `RUST_LOG`.

use clap::{Args, Parser, Subcommand};
use log::info;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tempcast::precipitation::SimulatedPrecipitation;
use tempcast::report::{LocationRequest, LocationService, NoObservations, OfflineGeocoder};
use tempcast::{describe, ForecastEngine, ForecastResult};
use tempcast_core::dataset::HistoricalDataset;
use tempcast_core::parameters::ForecastParameters;

/// Hourly temperature forecasts from historical station data
#[derive(Parser, Debug)]
#[command(name = "tempcast")]
#[command(about = "Forecast hourly temperatures from historical measurements")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Forecast the temperature at a point
    Forecast {
        #[command(flatten)]
        engine: EngineArgs,

        #[arg(long, allow_hyphen_values = true)]
        latitude: f64,

        #[arg(long, allow_hyphen_values = true)]
        longitude: f64,

        /// YYYY-MM-DD
        #[arg(long)]
        date: String,

        /// HH:MM
        #[arg(long)]
        time: String,
    },
    /// Build a location report from a JSON request
    Report {
        #[command(flatten)]
        engine: EngineArgs,

        /// Request file; reads stdin when omitted
        #[arg(short, long)]
        request: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct EngineArgs {
    /// Historical dataset (JSON). A missing file runs the engine without data.
    #[arg(short, long)]
    dataset: PathBuf,

    /// Forecast parameters (TOML)
    #[arg(short, long)]
    parameters: Option<PathBuf>,
}

impl EngineArgs {
    fn engine(&self) -> Result<ForecastEngine, String> {
        let parameters = match &self.parameters {
            Some(path) => ForecastParameters::from_toml_file(path)
                .map_err(|e| format!("Invalid parameters in {}: {}", path.display(), e))?,
            None => ForecastParameters::default(),
        };
        let dataset = HistoricalDataset::load_or_degraded(&self.dataset);
        info!(
            "Using {} historical records for years {:?}",
            dataset.len(),
            parameters.history_years()
        );
        Ok(ForecastEngine::new(Arc::new(dataset), parameters))
    }
}

fn read_request(path: Option<&PathBuf>) -> Result<LocationRequest, String> {
    let mut contents = String::new();
    let read = match path {
        Some(path) => BufReader::new(
            File::open(path).map_err(|e| format!("Cannot open {}: {}", path.display(), e))?,
        )
        .read_to_string(&mut contents),
        None => io::stdin().read_to_string(&mut contents),
    };
    read.map_err(|e| format!("Cannot read request: {}", e))?;

    serde_json::from_str(&contents).map_err(|e| format!("Invalid request: {}", e))
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Forecast {
            engine,
            latitude,
            longitude,
            date,
            time,
        } => {
            let engine = engine.engine()?;
            let result = engine.forecast(latitude, longitude, &format!("{} {}", date, time));
            if let ForecastResult::Available(estimate) = &result {
                let years: Vec<i32> = estimate.years.iter().map(|e| e.year).collect();
                println!("Estimate: {:.2}°C from years {:?}", estimate.value, years);
            }
            println!("{}", describe(result.value(), None));
        }
        Command::Report { engine, request } => {
            let service = LocationService::new(
                engine.engine()?,
                Box::new(OfflineGeocoder),
                Box::new(NoObservations),
                Box::new(SimulatedPrecipitation::default()),
            );
            let request = read_request(request.as_ref())?;
            let report = service.report(&request).map_err(|e| e.to_string())?;
            let body = serde_json::to_string_pretty(&report)
                .map_err(|e| format!("Cannot encode report: {}", e))?;
            println!("{}", body);
        }
    }
    Ok(())
}

fn main() {
    pretty_env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("{}", e);
        process::exit(1);
    }
}
