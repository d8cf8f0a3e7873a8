use thiserror::Error;

use crate::config::ConfigError;
use crate::ml::ArtifactError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RecommendError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("network shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("feature dimension mismatch: expected {expected}, got {actual}")]
    FeatureDimension { expected: usize, actual: usize },
    #[error("weather index {index} is out of range for {len} known codes")]
    WeatherIndexOutOfRange { index: usize, len: usize },
    #[error("invalid label space: {0}")]
    InvalidLabelSpace(String),
    #[error("invalid weather code index: {0}")]
    InvalidWeatherIndex(String),
    #[error("invalid scaler: {0}")]
    InvalidScaler(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AdviceError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Recommend(#[from] RecommendError),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Advice(#[from] AdviceError),
    #[error("artifact failure: {0}")]
    Artifact(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl From<RecommendError> for ApplicationError {
    fn from(value: RecommendError) -> Self {
        Self::Advice(AdviceError::Recommend(value))
    }
}

impl From<ModelError> for ApplicationError {
    fn from(value: ModelError) -> Self {
        Self::Advice(AdviceError::Model(value))
    }
}

impl From<ArtifactError> for ApplicationError {
    fn from(value: ArtifactError) -> Self {
        Self::Artifact(value.to_string())
    }
}

impl From<ConfigError> for ApplicationError {
    fn from(value: ConfigError) -> Self {
        Self::Configuration(value.to_string())
    }
}

impl ApplicationError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Advice(AdviceError::Recommend(_)) => "invalid_input",
            Self::Advice(AdviceError::Model(_)) => "model",
            Self::Artifact(_) => "artifact",
            Self::Configuration(_) => "config_validation",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::Artifact(_) | Self::Advice(AdviceError::Model(_)) => 3,
            Self::Advice(AdviceError::Recommend(_)) => 4,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Advice(AdviceError::Recommend(_)) => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::Advice(AdviceError::Model(_)) | Self::Artifact(_) => {
                "The trained model could not be used. Check the artifact file."
            }
            Self::Configuration(_) => "The configuration is invalid.",
        }
    }
}
