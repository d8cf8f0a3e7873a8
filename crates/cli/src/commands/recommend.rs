use clap::Args;
use wearcast_core::advisor::{Advice, OutfitAdvisor, WeatherObservation};
use wearcast_core::config::{AppConfig, LoadOptions};
use wearcast_core::errors::ApplicationError;
use wearcast_core::ml::ModelArtifacts;

use crate::commands::{CommandResult, RankingFlags};

const COMMAND: &str = "recommend";

#[derive(Debug, Clone, Args)]
pub struct RecommendArgs {
    #[arg(long, allow_negative_numbers = true, help = "WMO weather interpretation code")]
    pub weather_code: i64,
    #[arg(long, allow_negative_numbers = true, help = "Air temperature in degrees Celsius")]
    pub temperature: f64,
    #[arg(long, allow_negative_numbers = true, help = "Wind speed as reported by the forecast")]
    pub wind_speed: f64,
    #[command(flatten)]
    pub ranking: RankingFlags,
    #[arg(long, help = "Include the full advice payload under `data`")]
    pub json: bool,
}

pub fn run(args: &RecommendArgs) -> CommandResult {
    match advise(args) {
        Ok(advice) => {
            let data = if args.json {
                match serde_json::to_value(&advice) {
                    Ok(value) => Some(value),
                    Err(error) => {
                        return CommandResult::failure(
                            COMMAND,
                            "serialization",
                            error.to_string(),
                            1,
                        )
                    }
                }
            } else {
                None
            };
            CommandResult::success_with_data(COMMAND, render(&advice), data)
        }
        Err(error) => CommandResult::from_error(COMMAND, &error),
    }
}

fn advise(args: &RecommendArgs) -> Result<Advice, ApplicationError> {
    let config = AppConfig::load(LoadOptions::default())?;
    let artifacts = ModelArtifacts::load(&config.artifacts.path)?;
    let options = args.ranking.apply(config.recommend_options());
    let advisor = OutfitAdvisor::new(artifacts, options);

    let observation = WeatherObservation {
        weather_code: args.weather_code,
        temperature: args.temperature,
        wind_speed: args.wind_speed,
    };
    Ok(advisor.advise(&observation)?)
}

fn render(advice: &Advice) -> String {
    let description = advice.weather_description.as_deref().unwrap_or("unknown weather");
    let mut lines = vec![format!(
        "weather code {} ({description})",
        advice.weather.requested_code()
    )];
    if advice.used_fallback() {
        lines.push(format!(
            "note: code {} was not seen in training; used fallback index {}",
            advice.weather.requested_code(),
            advice.weather.index()
        ));
    }
    for (rank, combo) in advice.ranking.iter().enumerate() {
        lines.push(format!(
            "{}. {} + {} (score {:.4})",
            rank + 1,
            combo.top_label,
            combo.bottom_label,
            combo.joint_score
        ));
    }
    lines.join("\n")
}
