//! Ranks raw per-slot logits without a trained model.

use clap::Args;
use wearcast_core::config::{AppConfig, LoadOptions};
use wearcast_core::errors::{ApplicationError, RecommendError};
use wearcast_core::ml::LabelSpace;
use wearcast_core::recommend::{ComboRanking, ComboRecommender};

use crate::commands::{CommandResult, RankingFlags};

const COMMAND: &str = "rank";

#[derive(Debug, Clone, Args)]
pub struct RankArgs {
    #[arg(long, required = true, value_delimiter = ',', allow_negative_numbers = true)]
    pub top_scores: Vec<f64>,
    #[arg(long, required = true, value_delimiter = ',', allow_negative_numbers = true)]
    pub bottom_scores: Vec<f64>,
    #[arg(long, required = true, value_delimiter = ',')]
    pub top_labels: Vec<String>,
    #[arg(long, required = true, value_delimiter = ',')]
    pub bottom_labels: Vec<String>,
    #[command(flatten)]
    pub ranking: RankingFlags,
}

pub fn run(args: &RankArgs) -> CommandResult {
    match rank(args) {
        Ok(ranking) => {
            let message = ranking
                .iter()
                .map(|combo| {
                    format!("{} + {} = {:.6}", combo.top_label, combo.bottom_label, combo.joint_score)
                })
                .collect::<Vec<_>>()
                .join("\n");
            CommandResult::success_with_data(COMMAND, message, serde_json::to_value(&ranking).ok())
        }
        Err(error) => CommandResult::from_error(COMMAND, &error),
    }
}

fn rank(args: &RankArgs) -> Result<ComboRanking, ApplicationError> {
    let config = AppConfig::load(LoadOptions::default())?;
    let options = args.ranking.apply(config.recommend_options());

    let top_labels = label_space("top", &args.top_labels)?;
    let bottom_labels = label_space("bottom", &args.bottom_labels)?;

    Ok(ComboRecommender::recommend_with(
        &options,
        &args.top_scores,
        &args.bottom_scores,
        &top_labels,
        &bottom_labels,
    )?)
}

/// Labels typed on the command line are caller input, not model data.
fn label_space(slot: &str, labels: &[String]) -> Result<LabelSpace, RecommendError> {
    let labels = labels.iter().map(|label| label.trim().to_string()).collect();
    LabelSpace::new(labels)
        .map_err(|error| RecommendError::InvalidInput(format!("{slot} labels: {error}")))
}
