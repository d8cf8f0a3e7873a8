use anyhow::{bail, Context, Result};
use serde::Serialize;
use wearcast_core::advisor::{OutfitAdvisor, WeatherObservation};
use wearcast_core::config::{AppConfig, LoadOptions};
use wearcast_core::ml::ModelArtifacts;

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            match ModelArtifacts::load(&config.artifacts.path) {
                Ok(artifacts) => {
                    checks.push(DoctorCheck {
                        name: "artifact_load",
                        status: CheckStatus::Pass,
                        details: format!(
                            "loaded `{}` (version {}, {} top labels, {} bottom labels, {} weather codes, fingerprint {})",
                            config.artifacts.path.display(),
                            artifacts.version,
                            artifacts.top_labels.len(),
                            artifacts.bottom_labels.len(),
                            artifacts.weather_codes.len(),
                            artifacts.fingerprint()
                        ),
                    });
                    checks.push(check_inference(&config, artifacts));
                }
                Err(error) => {
                    checks.push(DoctorCheck {
                        name: "artifact_load",
                        status: CheckStatus::Fail,
                        details: error.to_string(),
                    });
                    checks.push(skipped("smoke_inference", "artifacts did not load"));
                }
            }
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("artifact_load", "configuration did not load"));
            checks.push(skipped("smoke_inference", "configuration did not load"));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_inference(config: &AppConfig, artifacts: ModelArtifacts) -> DoctorCheck {
    match smoke_inference(config, artifacts) {
        Ok(details) => DoctorCheck { name: "smoke_inference", status: CheckStatus::Pass, details },
        Err(error) => DoctorCheck {
            name: "smoke_inference",
            status: CheckStatus::Fail,
            details: format!("{error:#}"),
        },
    }
}

/// Runs one advice request at the training means for the first known weather code.
fn smoke_inference(config: &AppConfig, artifacts: ModelArtifacts) -> Result<String> {
    let weather_code =
        artifacts.weather_codes.code_at(0).context("artifacts list no weather codes")?;
    let &[temperature, wind_speed] = artifacts.scaler.mean.as_slice() else {
        bail!("scaler covers {} features, expected 2", artifacts.scaler.dimension());
    };
    let observation = WeatherObservation { weather_code, temperature, wind_speed };

    let advisor = OutfitAdvisor::new(artifacts, config.recommend_options());
    let advice = advisor
        .advise(&observation)
        .with_context(|| format!("advice failed for weather code {weather_code}"))?;
    let best = advice.ranking.best().context("ranking came back empty")?;

    Ok(format!(
        "weather code {weather_code}: {} + {} (score {:.4})",
        best.top_label, best.bottom_label, best.joint_score
    ))
}

fn skipped(name: &'static str, reason: &str) -> DoctorCheck {
    DoctorCheck {
        name,
        status: CheckStatus::Skipped,
        details: format!("skipped because {reason}"),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
