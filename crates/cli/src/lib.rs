pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use wearcast_core::config::{AppConfig, LoadOptions};

use commands::normalize::NormalizeArgs;
use commands::rank::RankArgs;
use commands::recommend::RecommendArgs;

#[derive(Debug, Parser)]
#[command(
    name = "wearcast",
    about = "Weather-driven outfit recommendations",
    long_about = "Rank top and bottom garment pairs for the current weather using a trained outfit model.",
    after_help = "Examples:\n  wearcast recommend --weather-code 3 --temperature 14.5 --wind-speed 2.1\n  wearcast rank --top-scores 2,1 --bottom-scores 1,0 --top-labels A,B --bottom-labels X,Y\n  wearcast doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Recommend outfits for a weather reading using the configured model")]
    Recommend(RecommendArgs),
    #[command(about = "Rank garment pairs from raw per-slot scores without a model")]
    Rank(RankArgs),
    #[command(about = "Map raw garment labels onto the canonical vocabulary")]
    Normalize(NormalizeArgs),
    #[command(about = "List WMO weather codes and their descriptions")]
    WeatherCodes,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, model artifacts, and a smoke inference")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match &cli.command {
        Command::Recommend(args) => commands::recommend::run(args),
        Command::Rank(args) => commands::rank::run(args),
        Command::Normalize(args) => commands::normalize::run(args),
        Command::WeatherCodes => commands::weather_codes::run(),
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(*json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so command output on stdout stays machine-readable.
/// An invalid config falls back to defaults here; the command reports the error itself.
fn init_logging() {
    use tracing::Level;
    use wearcast_core::config::LogFormat::*;

    let config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(log_level);

    let _ = match config.logging.format {
        Compact => builder.compact().try_init(),
        Pretty => builder.pretty().try_init(),
        Json => builder.json().try_init(),
    };
}
