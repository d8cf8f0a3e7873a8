use clap::Args;
use wearcast_core::normalize::{normalize_batch, GarmentSlot};

use crate::commands::CommandResult;

const COMMAND: &str = "normalize";

#[derive(Debug, Clone, Args)]
pub struct NormalizeArgs {
    #[arg(long, help = "Garment slot whose vocabulary applies (top|bottom)")]
    pub slot: GarmentSlot,
    #[arg(required = true, help = "Raw garment labels")]
    pub labels: Vec<String>,
}

pub fn run(args: &NormalizeArgs) -> CommandResult {
    let report = normalize_batch(args.slot, &args.labels);

    let mut lines = vec![format!(
        "{} {} labels: {} rewritten, {} unchanged",
        report.labels.len(),
        report.slot,
        report.changed,
        report.unchanged
    )];
    for (raw, normalized) in args.labels.iter().zip(&report.labels) {
        lines.push(format!("- {raw} -> {normalized}"));
    }

    CommandResult::success_with_data(COMMAND, lines.join("\n"), serde_json::to_value(&report).ok())
}
