pub mod advisor;
pub mod config;
pub mod errors;
pub mod ml;
pub mod normalize;
pub mod recommend;

pub use advisor::{Advice, OutfitAdvisor, WeatherObservation};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use errors::{AdviceError, ApplicationError, ModelError, RecommendError};
pub use ml::{ArtifactError, LabelSpace, ModelArtifacts, WeatherCodeIndex, WeatherCodeLookup};
pub use normalize::{canonical_labels, normalize_batch, normalize_label, GarmentSlot};
pub use recommend::{ComboRanking, ComboRecommender, ComboResult, RecommendOptions, SearchStrategy};
