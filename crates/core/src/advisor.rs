//! End-to-end outfit advice: weather reading in, ranked garment pairs out.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::{AdviceError, RecommendError};
use crate::ml::{describe_weather_code, GarmentScorer, ModelArtifacts, WeatherCodeLookup};
use crate::recommend::{ComboRanking, ComboRecommender, RecommendOptions};

/// Current weather as fed to the model
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    /// WMO weather interpretation code
    pub weather_code: i64,
    /// Degrees Celsius
    pub temperature: f64,
    pub wind_speed: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    pub correlation_id: String,
    pub weather: WeatherCodeLookup,
    pub weather_description: Option<String>,
    pub ranking: ComboRanking,
}

impl Advice {
    /// True when the model never saw the requested weather code
    pub fn used_fallback(&self) -> bool {
        self.weather.is_fallback()
    }
}

/// Holds one loaded model and answers advice requests against it.
#[derive(Clone, Debug)]
pub struct OutfitAdvisor {
    artifacts: ModelArtifacts,
    recommender: ComboRecommender,
}

impl OutfitAdvisor {
    pub fn new(artifacts: ModelArtifacts, options: RecommendOptions) -> Self {
        Self { artifacts, recommender: ComboRecommender::new(options) }
    }

    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }

    pub fn advise(&self, observation: &WeatherObservation) -> Result<Advice, AdviceError> {
        self.advise_with(observation, self.recommender.options())
    }

    pub fn advise_with(
        &self,
        observation: &WeatherObservation,
        options: &RecommendOptions,
    ) -> Result<Advice, AdviceError> {
        validate_observation(observation)?;
        let correlation_id = Uuid::new_v4().to_string();
        let artifacts = &self.artifacts;

        let weather = artifacts.weather_codes.lookup(observation.weather_code);
        if let WeatherCodeLookup::Fallback { requested, index } = weather {
            warn!(
                event_name = "advice.weather.fallback",
                correlation_id = %correlation_id,
                requested_code = requested,
                fallback_index = index,
                fallback_code = ?artifacts.weather_codes.code_at(index),
                "weather code was not seen in training; using fallback index"
            );
        }

        let features =
            artifacts.scaler.transform(&[observation.temperature, observation.wind_speed])?;
        let scores = artifacts.network.score(weather.index(), &features)?;
        let ranking = ComboRecommender::recommend_with(
            options,
            &scores.top,
            &scores.bottom,
            &artifacts.top_labels,
            &artifacts.bottom_labels,
        )?;

        debug!(
            event_name = "advice.completed",
            correlation_id = %correlation_id,
            weather_code = observation.weather_code,
            combos = ranking.len(),
            best_top = ranking.best().map(|combo| combo.top_label.as_str()).unwrap_or("none"),
            best_bottom = ranking.best().map(|combo| combo.bottom_label.as_str()).unwrap_or("none"),
            "outfit advice computed"
        );

        Ok(Advice {
            correlation_id,
            weather,
            weather_description: describe_weather_code(observation.weather_code).map(str::to_string),
            ranking,
        })
    }
}

fn validate_observation(observation: &WeatherObservation) -> Result<(), RecommendError> {
    for (name, value) in
        [("temperature", observation.temperature), ("wind_speed", observation.wind_speed)]
    {
        if !value.is_finite() {
            return Err(RecommendError::InvalidInput(format!("{name} must be a finite number")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{OutfitAdvisor, WeatherObservation};
    use crate::errors::{AdviceError, RecommendError};
    use crate::ml::{
        FeatureScaler, LabelSpace, ModelArtifacts, MultiHeadNet, NetworkShape, WeatherCodeIndex,
        WeatherCodeLookup,
    };
    use crate::recommend::RecommendOptions;

    /// Head biases pick the winners; the weather embedding shifts the top head
    /// through a single trunk unit.
    fn advisor() -> OutfitAdvisor {
        let top = LabelSpace::new(vec!["패딩".into(), "코트".into(), "반팔 티셔츠".into()])
            .expect("labels");
        let bottom = LabelSpace::new(vec!["청바지".into(), "반바지".into()]).expect("labels");
        let codes = WeatherCodeIndex::from_observed([0, 3, 71]).expect("codes");
        let scaler = FeatureScaler::new(vec![10.0, 3.0], vec![5.0, 2.0]).expect("scaler");

        let mut network = MultiHeadNet::zeroed(NetworkShape::new(3, 3, 2));
        // code 71 (index 2) lights embedding unit 0, which trunk unit 0 passes on
        network.embedding[2][0] = 1.0;
        network.trunk[0].weights[0][0] = 1.0;
        network.trunk[1].weights[0][0] = 1.0;
        network.head_top.weights[0][0] = 5.0;
        network.head_top.bias = vec![0.0, 1.0, 0.5];
        network.head_bottom.bias = vec![2.0, 0.0];

        let artifacts =
            ModelArtifacts::new("test", top, bottom, codes, scaler, network).expect("consistent");
        OutfitAdvisor::new(artifacts, RecommendOptions::default())
    }

    #[test]
    fn known_weather_code_ranks_by_model_output() {
        let advice = advisor()
            .advise(&WeatherObservation { weather_code: 3, temperature: 14.0, wind_speed: 1.0 })
            .expect("valid observation");

        assert_eq!(advice.weather, WeatherCodeLookup::Known { code: 3, index: 1 });
        assert!(!advice.used_fallback());
        assert_eq!(advice.weather_description.as_deref(), Some("overcast"));
        assert_eq!(advice.ranking.len(), 6);
        let best = advice.ranking.best().expect("non-empty");
        assert_eq!((best.top_label.as_str(), best.bottom_label.as_str()), ("코트", "청바지"));
    }

    #[test]
    fn embedding_changes_the_top_pick() {
        let advice = advisor()
            .advise(&WeatherObservation { weather_code: 71, temperature: -4.0, wind_speed: 6.0 })
            .expect("valid observation");

        let best = advice.ranking.best().expect("non-empty");
        assert_eq!(best.top_label, "패딩");
        assert_eq!(advice.weather_description.as_deref(), Some("slight snow fall"));
    }

    #[test]
    fn unseen_weather_code_uses_fallback_and_still_answers() {
        let advice = advisor()
            .advise(&WeatherObservation { weather_code: 95, temperature: 20.0, wind_speed: 2.0 })
            .expect("fallback is not an error");

        assert!(advice.used_fallback());
        assert_eq!(advice.weather, WeatherCodeLookup::Fallback { requested: 95, index: 0 });
        assert!(!advice.ranking.is_empty());
    }

    #[test]
    fn per_call_options_override_defaults() {
        let advisor = advisor();
        let observation = WeatherObservation { weather_code: 0, temperature: 25.0, wind_speed: 0.5 };

        let advice = advisor
            .advise_with(&observation, &RecommendOptions::default().with_k_each(1).with_combo_k(3))
            .expect("valid observation");
        assert_eq!(advice.ranking.len(), 1);

        let error = advisor
            .advise_with(&observation, &RecommendOptions::default().with_combo_k(0))
            .expect_err("zero combo_k");
        assert!(matches!(error, AdviceError::Recommend(_)));
    }

    #[test]
    fn non_finite_readings_are_invalid_input() {
        let error = advisor()
            .advise(&WeatherObservation { weather_code: 0, temperature: f64::NAN, wind_speed: 1.0 })
            .expect_err("NaN temperature");
        assert_eq!(
            error,
            AdviceError::Recommend(RecommendError::InvalidInput(
                "temperature must be a finite number".to_string()
            ))
        );
    }

    #[test]
    fn correlation_ids_are_unique_per_request() {
        let advisor = advisor();
        let observation = WeatherObservation { weather_code: 3, temperature: 10.0, wind_speed: 3.0 };

        let first = advisor.advise(&observation).expect("valid");
        let second = advisor.advise(&observation).expect("valid");
        assert_ne!(first.correlation_id, second.correlation_id);
        assert_eq!(first.ranking, second.ranking);
    }
}
