//! Outfit model inference
//!
//! Loads the artifacts produced by a training run (label spaces, weather
//! code index, feature scaler, network parameters) and evaluates the
//! multi-head network. Training itself happens elsewhere.

mod artifacts;
mod labels;
pub mod network;
mod scaler;
pub mod weather;

pub use artifacts::{ArtifactError, ModelArtifacts};
pub use labels::LabelSpace;
pub use network::{DenseLayer, GarmentScorer, MultiHeadNet, NetworkShape, SlotScores};
pub use scaler::{FeatureScaler, SCALE_EPSILON};
pub use weather::{describe_weather_code, WeatherCodeIndex, WeatherCodeLookup};
