use serde::Serialize;
use wearcast_core::ml::weather::weather_descriptions;

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct WeatherCodeEntry {
    code: i64,
    description: &'static str,
}

pub fn run() -> CommandResult {
    let entries: Vec<WeatherCodeEntry> = weather_descriptions()
        .iter()
        .map(|&(code, description)| WeatherCodeEntry { code, description })
        .collect();

    let message = entries
        .iter()
        .map(|entry| format!("{:>3} {}", entry.code, entry.description))
        .collect::<Vec<_>>()
        .join("\n");
    CommandResult::success_with_data("weather-codes", message, serde_json::to_value(&entries).ok())
}
