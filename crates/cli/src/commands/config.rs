use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use toml::Value;
use wearcast_core::config::{AppConfig, LoadOptions};

use crate::commands::CommandResult;

const COMMAND: &str = "config";

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "config_validation",
                format!("config validation failed: {error}"),
                2,
            )
        }
    };

    CommandResult::success(COMMAND, render(&config))
}

fn render(config: &AppConfig) -> String {
    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let fields = [
        (
            "artifacts.path",
            config.artifacts.path.display().to_string(),
            source("artifacts.path", &["WEARCAST_ARTIFACTS_PATH"]),
        ),
        (
            "recommend.k_each_top",
            config.recommend.k_each_top.to_string(),
            source("recommend.k_each_top", &["WEARCAST_RECOMMEND_K_EACH_TOP"]),
        ),
        (
            "recommend.k_each_bottom",
            config.recommend.k_each_bottom.to_string(),
            source("recommend.k_each_bottom", &["WEARCAST_RECOMMEND_K_EACH_BOTTOM"]),
        ),
        (
            "recommend.combo_k",
            config.recommend.combo_k.to_string(),
            source("recommend.combo_k", &["WEARCAST_RECOMMEND_COMBO_K"]),
        ),
        (
            "recommend.strategy",
            format!("{:?}", config.recommend.strategy).to_ascii_lowercase(),
            source("recommend.strategy", &["WEARCAST_RECOMMEND_STRATEGY"]),
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            source("logging.level", &["WEARCAST_LOGGING_LEVEL", "WEARCAST_LOG_LEVEL"]),
        ),
        (
            "logging.format",
            config.logging.format.as_str().to_string(),
            source("logging.format", &["WEARCAST_LOGGING_FORMAT", "WEARCAST_LOG_FORMAT"]),
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(fields.into_iter().map(|(key, value, source)| render_line(key, &value, source)));
    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("wearcast.toml"), PathBuf::from("config/wearcast.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use toml::Value;

    use super::{contains_path, field_source};

    #[test]
    fn file_keys_are_attributed_to_the_file() {
        let doc: Value = "[recommend]\ncombo_k = 3\n".parse().expect("valid toml");

        assert!(contains_path(&doc, "recommend.combo_k"));
        assert!(!contains_path(&doc, "recommend.k_each_top"));
        assert_eq!(
            field_source("recommend.combo_k", &[], Some(&doc), None),
            "file (config file)"
        );
        assert_eq!(field_source("logging.level", &[], Some(&doc), None), "default");
    }
}
