//! Weather code handling
//!
//! The model embeds weather as a contiguous index over the WMO weather
//! interpretation codes seen in training. Codes the model never saw are
//! mapped to index 0 and reported as a fallback.

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Index substituted for weather codes absent from training
pub const FALLBACK_WEATHER_INDEX: usize = 0;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<i64>")]
pub struct WeatherCodeIndex {
    codes: Vec<i64>,
}

/// Outcome of mapping a raw weather code to a model index
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeatherCodeLookup {
    Known { code: i64, index: usize },
    Fallback { requested: i64, index: usize },
}

impl WeatherCodeLookup {
    pub fn index(&self) -> usize {
        match self {
            Self::Known { index, .. } | Self::Fallback { index, .. } => *index,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// The code the caller asked for
    pub fn requested_code(&self) -> i64 {
        match self {
            Self::Known { code, .. } => *code,
            Self::Fallback { requested, .. } => *requested,
        }
    }
}

impl WeatherCodeIndex {
    /// Codes in index order. Must be non-empty and free of duplicates.
    pub fn new(codes: Vec<i64>) -> Result<Self, ModelError> {
        if codes.is_empty() {
            return Err(ModelError::InvalidWeatherIndex(
                "at least one weather code is required".to_string(),
            ));
        }
        let mut sorted = codes.clone();
        sorted.sort_unstable();
        if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(ModelError::InvalidWeatherIndex(format!(
                "duplicate weather code {}",
                pair[0]
            )));
        }
        Ok(Self { codes })
    }

    /// Sorted distinct codes, as seen in training rows.
    pub fn from_observed<I>(observed: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = i64>,
    {
        let mut codes: Vec<i64> = observed.into_iter().collect();
        codes.sort_unstable();
        codes.dedup();
        Self::new(codes)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn codes(&self) -> &[i64] {
        &self.codes
    }

    pub fn code_at(&self, index: usize) -> Option<i64> {
        self.codes.get(index).copied()
    }

    pub fn lookup(&self, code: i64) -> WeatherCodeLookup {
        match self.codes.iter().position(|known| *known == code) {
            Some(index) => WeatherCodeLookup::Known { code, index },
            None => WeatherCodeLookup::Fallback { requested: code, index: FALLBACK_WEATHER_INDEX },
        }
    }
}

impl TryFrom<Vec<i64>> for WeatherCodeIndex {
    type Error = ModelError;

    fn try_from(value: Vec<i64>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WeatherCodeIndex> for Vec<i64> {
    fn from(value: WeatherCodeIndex) -> Self {
        value.codes
    }
}

const WEATHER_DESCRIPTIONS: &[(i64, &str)] = &[
    (0, "clear sky"),
    (1, "mainly clear"),
    (2, "partly cloudy"),
    (3, "overcast"),
    (45, "fog"),
    (48, "depositing rime fog"),
    (51, "light drizzle"),
    (53, "moderate drizzle"),
    (55, "dense drizzle"),
    (56, "light freezing drizzle"),
    (57, "dense freezing drizzle"),
    (61, "slight rain"),
    (63, "moderate rain"),
    (65, "heavy rain"),
    (66, "light freezing rain"),
    (67, "heavy freezing rain"),
    (71, "slight snow fall"),
    (73, "moderate snow fall"),
    (75, "heavy snow fall"),
    (77, "snow grains"),
    (80, "slight rain showers"),
    (81, "moderate rain showers"),
    (82, "violent rain showers"),
    (85, "slight snow showers"),
    (86, "heavy snow showers"),
    (95, "thunderstorm"),
    (96, "thunderstorm with slight hail"),
    (99, "thunderstorm with heavy hail"),
];

/// Human-readable WMO description
pub fn describe_weather_code(code: i64) -> Option<&'static str> {
    WEATHER_DESCRIPTIONS
        .binary_search_by_key(&code, |(known, _)| *known)
        .ok()
        .map(|position| WEATHER_DESCRIPTIONS[position].1)
}

/// All described codes in ascending order
pub fn weather_descriptions() -> &'static [(i64, &'static str)] {
    WEATHER_DESCRIPTIONS
}

#[cfg(test)]
mod tests {
    use super::{describe_weather_code, weather_descriptions, WeatherCodeIndex, WeatherCodeLookup};

    #[test]
    fn known_codes_map_to_their_position() {
        let index = WeatherCodeIndex::from_observed([61, 0, 3, 61, 1]).expect("non-empty");

        assert_eq!(index.codes(), &[0, 1, 3, 61]);
        assert_eq!(index.lookup(3), WeatherCodeLookup::Known { code: 3, index: 2 });
        assert_eq!(index.code_at(3), Some(61));
    }

    #[test]
    fn unseen_code_falls_back_to_first_index() {
        let index = WeatherCodeIndex::from_observed([1, 2, 3]).expect("non-empty");

        let lookup = index.lookup(95);
        assert!(lookup.is_fallback());
        assert_eq!(lookup.index(), 0);
        assert_eq!(lookup.requested_code(), 95);
        assert_eq!(lookup, WeatherCodeLookup::Fallback { requested: 95, index: 0 });
    }

    #[test]
    fn empty_and_duplicate_codes_are_rejected() {
        assert!(WeatherCodeIndex::new(Vec::new()).is_err());
        assert!(WeatherCodeIndex::new(vec![3, 1, 3]).is_err());
        assert!(WeatherCodeIndex::from_observed(std::iter::empty()).is_err());
    }

    #[test]
    fn lookup_serializes_with_kind_tag() {
        let json = serde_json::to_value(WeatherCodeLookup::Fallback { requested: 7, index: 0 })
            .expect("serialize");
        assert_eq!(json["kind"], "fallback");
        assert_eq!(json["requested"], 7);
    }

    #[test]
    fn descriptions_cover_wmo_codes() {
        assert_eq!(describe_weather_code(0), Some("clear sky"));
        assert_eq!(describe_weather_code(99), Some("thunderstorm with heavy hail"));
        assert_eq!(describe_weather_code(4), None);

        let codes: Vec<i64> = weather_descriptions().iter().map(|(code, _)| *code).collect();
        let mut sorted = codes.clone();
        sorted.sort_unstable();
        assert_eq!(codes, sorted, "binary search requires ascending codes");
    }
}
