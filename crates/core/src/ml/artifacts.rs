use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::network::{MultiHeadNet, NetworkShape, NUMERIC_FEATURES};
use super::{FeatureScaler, LabelSpace, WeatherCodeIndex};
use crate::errors::ModelError;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("could not read model artifacts `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not write model artifacts `{path}`: {source}")]
    WriteFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse model artifacts: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("could not serialize model artifacts: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("model artifacts are inconsistent: {0}")]
    Invalid(#[from] ModelError),
}

/// Everything inference needs from a training run, persisted as one JSON file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifacts {
    pub version: String,
    pub trained_at: DateTime<Utc>,
    pub top_labels: LabelSpace,
    pub bottom_labels: LabelSpace,
    pub weather_codes: WeatherCodeIndex,
    pub scaler: FeatureScaler,
    pub network: MultiHeadNet,
}

impl ModelArtifacts {
    pub fn new(
        version: impl Into<String>,
        top_labels: LabelSpace,
        bottom_labels: LabelSpace,
        weather_codes: WeatherCodeIndex,
        scaler: FeatureScaler,
        network: MultiHeadNet,
    ) -> Result<Self, ModelError> {
        let artifacts = Self {
            version: version.into(),
            trained_at: Utc::now(),
            top_labels,
            bottom_labels,
            weather_codes,
            scaler,
            network,
        };
        artifacts.validate()?;
        Ok(artifacts)
    }

    pub fn shape(&self) -> NetworkShape {
        NetworkShape {
            weather_codes: self.weather_codes.len(),
            numeric_features: NUMERIC_FEATURES.len(),
            hidden_width: self.network.trunk.last().map(|layer| layer.outputs()).unwrap_or(0),
            top_classes: self.top_labels.len(),
            bottom_classes: self.bottom_labels.len(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        self.scaler.validate()?;
        if self.scaler.dimension() != NUMERIC_FEATURES.len() {
            return Err(ModelError::FeatureDimension {
                expected: NUMERIC_FEATURES.len(),
                actual: self.scaler.dimension(),
            });
        }
        self.network.validate(&self.shape())
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ArtifactError> {
        let artifacts: Self = serde_json::from_str(raw).map_err(ArtifactError::Parse)?;
        artifacts.validate()?;
        Ok(artifacts)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|source| ArtifactError::ReadFile { path: path.to_path_buf(), source })?;
        let artifacts = Self::from_json_str(&raw)?;

        info!(
            event_name = "model.artifacts.loaded",
            path = %path.display(),
            version = %artifacts.version,
            fingerprint = %artifacts.fingerprint(),
            top_labels = artifacts.top_labels.len(),
            bottom_labels = artifacts.bottom_labels.len(),
            weather_codes = artifacts.weather_codes.len(),
            "model artifacts loaded"
        );
        Ok(artifacts)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        let path = path.as_ref();
        let raw = serde_json::to_string_pretty(self).map_err(ArtifactError::Serialize)?;
        fs::write(path, raw)
            .map_err(|source| ArtifactError::WriteFile { path: path.to_path_buf(), source })
    }

    /// blake3 digest of the serialized artifacts, hex encoded
    pub fn fingerprint(&self) -> String {
        match serde_json::to_vec(self) {
            Ok(bytes) => blake3::hash(&bytes).to_hex().to_string(),
            Err(_) => "unavailable".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{ArtifactError, ModelArtifacts};
    use crate::errors::ModelError;
    use crate::ml::{FeatureScaler, LabelSpace, MultiHeadNet, NetworkShape, WeatherCodeIndex};

    fn artifacts() -> ModelArtifacts {
        let top = LabelSpace::fit(["코트", "패딩", "반팔 티셔츠"]).expect("labels");
        let bottom = LabelSpace::fit(["청바지", "반바지"]).expect("labels");
        let codes = WeatherCodeIndex::from_observed([0, 3, 61]).expect("codes");
        let scaler = FeatureScaler::new(vec![12.0, 2.5], vec![8.0, 1.5]).expect("scaler");
        let network = MultiHeadNet::zeroed(NetworkShape::new(3, 3, 2));
        ModelArtifacts::new("2024.1", top, bottom, codes, scaler, network).expect("consistent")
    }

    #[test]
    fn save_then_load_preserves_artifacts() -> Result<(), String> {
        let dir = TempDir::new().map_err(|err| err.to_string())?;
        let path = dir.path().join("model.json");
        let original = artifacts();

        original.save(&path).map_err(|err| err.to_string())?;
        let loaded = ModelArtifacts::load(&path).map_err(|err| err.to_string())?;

        assert_eq!(loaded, original);
        assert_eq!(loaded.fingerprint(), original.fingerprint());
        Ok(())
    }

    #[test]
    fn fingerprint_changes_with_parameters() {
        let original = artifacts();
        let mut tweaked = original.clone();
        tweaked.network.head_top.bias[0] = 0.25;

        assert_ne!(original.fingerprint(), tweaked.fingerprint());
        assert_eq!(original.fingerprint().len(), 64);
    }

    #[test]
    fn label_and_head_mismatch_is_rejected_on_parse() {
        let mut value = serde_json::to_value(artifacts()).expect("serialize");
        value["top_labels"] = serde_json::json!(["코트", "패딩"]);

        let error = ModelArtifacts::from_json_str(&value.to_string()).expect_err("mismatch");
        assert!(matches!(error, ArtifactError::Invalid(ModelError::ShapeMismatch(_))));
    }

    #[test]
    fn scaler_must_cover_numeric_features() {
        let mut value = serde_json::to_value(artifacts()).expect("serialize");
        value["scaler"] = serde_json::json!({ "mean": [1.0], "std": [1.0] });

        let error = ModelArtifacts::from_json_str(&value.to_string()).expect_err("one feature");
        assert!(matches!(
            error,
            ArtifactError::Invalid(ModelError::FeatureDimension { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn missing_and_malformed_files_are_reported() -> Result<(), String> {
        let dir = TempDir::new().map_err(|err| err.to_string())?;

        let missing = ModelArtifacts::load(dir.path().join("absent.json"));
        assert!(matches!(missing, Err(ArtifactError::ReadFile { .. })));

        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").map_err(|err| err.to_string())?;
        assert!(matches!(ModelArtifacts::load(&path), Err(ArtifactError::Parse(_))));

        let empty_codes = serde_json::to_value(artifacts())
            .map(|mut value| {
                value["weather_codes"] = serde_json::json!([]);
                value
            })
            .map_err(|err| err.to_string())?;
        assert!(matches!(
            ModelArtifacts::from_json_str(&empty_codes.to_string()),
            Err(ArtifactError::Parse(_))
        ));
        Ok(())
    }
}
