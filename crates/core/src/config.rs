use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::recommend::{
    RecommendOptions, SearchStrategy, DEFAULT_COMBO_K, DEFAULT_K_EACH_BOTTOM, DEFAULT_K_EACH_TOP,
};

/// Upper bound for every `k` setting
pub const MAX_K: usize = 1000;

pub const DEFAULT_ARTIFACTS_PATH: &str = "artifacts/model.json";

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub artifacts: ArtifactsConfig,
    pub recommend: RecommendConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArtifactsConfig {
    pub path: PathBuf,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecommendConfig {
    pub k_each_top: usize,
    pub k_each_bottom: usize,
    pub combo_k: usize,
    pub strategy: SearchStrategy,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub artifacts_path: Option<PathBuf>,
    pub k_each_top: Option<usize>,
    pub k_each_bottom: Option<usize>,
    pub combo_k: Option<usize>,
    pub strategy: Option<SearchStrategy>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            artifacts: ArtifactsConfig { path: PathBuf::from(DEFAULT_ARTIFACTS_PATH) },
            recommend: RecommendConfig {
                k_each_top: DEFAULT_K_EACH_TOP,
                k_each_bottom: DEFAULT_K_EACH_BOTTOM,
                combo_k: DEFAULT_COMBO_K,
                strategy: SearchStrategy::default(),
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("wearcast.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn recommend_options(&self) -> RecommendOptions {
        RecommendOptions {
            k_each_top: self.recommend.k_each_top,
            k_each_bottom: self.recommend.k_each_bottom,
            combo_k: self.recommend.combo_k,
            strategy: self.recommend.strategy,
        }
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(artifacts) = patch.artifacts {
            if let Some(path) = artifacts.path {
                self.artifacts.path = path;
            }
        }

        if let Some(recommend) = patch.recommend {
            if let Some(k_each_top) = recommend.k_each_top {
                self.recommend.k_each_top = k_each_top;
            }
            if let Some(k_each_bottom) = recommend.k_each_bottom {
                self.recommend.k_each_bottom = k_each_bottom;
            }
            if let Some(combo_k) = recommend.combo_k {
                self.recommend.combo_k = combo_k;
            }
            if let Some(strategy) = recommend.strategy {
                self.recommend.strategy = strategy;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("WEARCAST_ARTIFACTS_PATH") {
            self.artifacts.path = PathBuf::from(value);
        }

        if let Some(value) = read_env("WEARCAST_RECOMMEND_K_EACH_TOP") {
            self.recommend.k_each_top = parse_usize("WEARCAST_RECOMMEND_K_EACH_TOP", &value)?;
        }
        if let Some(value) = read_env("WEARCAST_RECOMMEND_K_EACH_BOTTOM") {
            self.recommend.k_each_bottom =
                parse_usize("WEARCAST_RECOMMEND_K_EACH_BOTTOM", &value)?;
        }
        if let Some(value) = read_env("WEARCAST_RECOMMEND_COMBO_K") {
            self.recommend.combo_k = parse_usize("WEARCAST_RECOMMEND_COMBO_K", &value)?;
        }
        if let Some(value) = read_env("WEARCAST_RECOMMEND_STRATEGY") {
            self.recommend.strategy = value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                key: "WEARCAST_RECOMMEND_STRATEGY".to_string(),
                value: value.clone(),
            })?;
        }

        let log_level =
            read_env("WEARCAST_LOGGING_LEVEL").or_else(|| read_env("WEARCAST_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("WEARCAST_LOGGING_FORMAT").or_else(|| read_env("WEARCAST_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(path) = overrides.artifacts_path {
            self.artifacts.path = path;
        }
        if let Some(k_each_top) = overrides.k_each_top {
            self.recommend.k_each_top = k_each_top;
        }
        if let Some(k_each_bottom) = overrides.k_each_bottom {
            self.recommend.k_each_bottom = k_each_bottom;
        }
        if let Some(combo_k) = overrides.combo_k {
            self.recommend.combo_k = combo_k;
        }
        if let Some(strategy) = overrides.strategy {
            self.recommend.strategy = strategy;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_artifacts(&self.artifacts)?;
        validate_recommend(&self.recommend)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("wearcast.toml"), PathBuf::from("config/wearcast.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_artifacts(artifacts: &ArtifactsConfig) -> Result<(), ConfigError> {
    if artifacts.path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("artifacts.path must not be empty".to_string()));
    }
    Ok(())
}

fn validate_recommend(recommend: &RecommendConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("recommend.k_each_top", recommend.k_each_top),
        ("recommend.k_each_bottom", recommend.k_each_bottom),
        ("recommend.combo_k", recommend.combo_k),
    ] {
        if value == 0 || value > MAX_K {
            return Err(ConfigError::Validation(format!("{name} must be in range 1..={MAX_K}")));
        }
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    artifacts: Option<ArtifactsPatch>,
    recommend: Option<RecommendPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ArtifactsPatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct RecommendPatch {
    k_each_top: Option<usize>,
    k_each_bottom: Option<usize>,
    combo_k: Option<usize>,
    strategy: Option<SearchStrategy>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
