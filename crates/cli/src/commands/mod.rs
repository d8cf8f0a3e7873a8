pub mod config;
pub mod doctor;
pub mod normalize;
pub mod rank;
pub mod recommend;
pub mod weather_codes;

use clap::Args;
use serde::Serialize;
use wearcast_core::errors::ApplicationError;
use wearcast_core::recommend::{RecommendOptions, SearchStrategy};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_data(command, message, None)
    }

    /// Success envelope carrying a structured payload under `data`.
    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: Option<serde_json::Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        Self::failure(
            command,
            error.error_class(),
            format!("{} ({error})", error.user_message()),
            error.exit_code(),
        )
    }
}

/// Ranking knobs shared by `recommend` and `rank`; unset flags fall back to config.
#[derive(Debug, Clone, Default, Args)]
pub struct RankingFlags {
    #[arg(long, help = "Top-garment candidates kept before pairing")]
    pub k_each_top: Option<usize>,
    #[arg(long, help = "Bottom-garment candidates kept before pairing")]
    pub k_each_bottom: Option<usize>,
    #[arg(long, help = "Number of combinations to return")]
    pub combo_k: Option<usize>,
    #[arg(long, help = "Search the full joint ranking instead of the pruned cross product")]
    pub exact: bool,
}

impl RankingFlags {
    pub fn apply(&self, mut options: RecommendOptions) -> RecommendOptions {
        if let Some(k_each_top) = self.k_each_top {
            options.k_each_top = k_each_top;
        }
        if let Some(k_each_bottom) = self.k_each_bottom {
            options.k_each_bottom = k_each_bottom;
        }
        if let Some(combo_k) = self.combo_k {
            options.combo_k = combo_k;
        }
        if self.exact {
            options.strategy = SearchStrategy::Exact;
        }
        options
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

#[cfg(test)]
mod tests {
    use super::{CommandResult, RankingFlags};
    use wearcast_core::errors::{ApplicationError, RecommendError};
    use wearcast_core::recommend::{RecommendOptions, SearchStrategy};

    #[test]
    fn failure_envelope_carries_error_class() {
        let error = ApplicationError::from(RecommendError::InvalidInput("bad".to_string()));
        let result = CommandResult::from_error("rank", &error);

        assert_eq!(result.exit_code, 4);
        let payload: serde_json::Value =
            serde_json::from_str(&result.output).expect("envelope is json");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "invalid_input");
        assert!(payload.get("data").is_none());
    }

    #[test]
    fn flags_only_override_what_was_given() {
        let base = RecommendOptions::default().with_combo_k(7);
        let flags = RankingFlags { k_each_top: Some(2), exact: true, ..RankingFlags::default() };

        let options = flags.apply(base);
        assert_eq!(options.k_each_top, 2);
        assert_eq!(options.k_each_bottom, base.k_each_bottom);
        assert_eq!(options.combo_k, 7);
        assert_eq!(options.strategy, SearchStrategy::Exact);
    }
}
