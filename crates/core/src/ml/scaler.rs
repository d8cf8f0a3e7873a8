use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Added to every standard deviation so near-constant features stay finite
pub const SCALE_EPSILON: f64 = 1e-8;

/// Per-feature standardization statistics.
///
/// Fitted once on the training partition and persisted with the model;
/// inference reuses the stored statistics unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    pub mean: Vec<f64>,
    /// Population standard deviation, without the epsilon
    pub std: Vec<f64>,
}

impl FeatureScaler {
    pub fn new(mean: Vec<f64>, std: Vec<f64>) -> Result<Self, ModelError> {
        let scaler = Self { mean, std };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Column mean and population standard deviation of `rows`.
    pub fn fit<R>(rows: &[R]) -> Result<Self, ModelError>
    where
        R: AsRef<[f64]>,
    {
        let Some(first) = rows.first() else {
            return Err(ModelError::InvalidScaler("cannot fit on zero rows".to_string()));
        };
        let width = first.as_ref().len();

        let mut sums = vec![0.0; width];
        for row in rows {
            let row = row.as_ref();
            if row.len() != width {
                return Err(ModelError::FeatureDimension { expected: width, actual: row.len() });
            }
            for (sum, value) in sums.iter_mut().zip(row) {
                *sum += value;
            }
        }

        let n = rows.len() as f64;
        let mean: Vec<f64> = sums.into_iter().map(|sum| sum / n).collect();

        let mut squared = vec![0.0; width];
        for row in rows {
            for ((acc, value), mu) in squared.iter_mut().zip(row.as_ref()).zip(&mean) {
                *acc += (value - mu).powi(2);
            }
        }
        let std = squared.into_iter().map(|acc| (acc / n).sqrt()).collect();

        Self::new(mean, std)
    }

    pub fn dimension(&self) -> usize {
        self.mean.len()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.mean.is_empty() {
            return Err(ModelError::InvalidScaler("scaler has no features".to_string()));
        }
        if self.mean.len() != self.std.len() {
            return Err(ModelError::InvalidScaler(format!(
                "mean has {} entries but std has {}",
                self.mean.len(),
                self.std.len()
            )));
        }
        if self.mean.iter().any(|value| !value.is_finite()) {
            return Err(ModelError::InvalidScaler("mean must be finite".to_string()));
        }
        if self.std.iter().any(|value| !value.is_finite() || *value < 0.0) {
            return Err(ModelError::InvalidScaler(
                "std must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// `(x - mean) / (std + eps)`
    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.check_dimension(features)?;
        Ok(features
            .iter()
            .zip(self.mean.iter().zip(&self.std))
            .map(|(x, (mean, std))| (x - mean) / (std + SCALE_EPSILON))
            .collect())
    }

    /// `x * (std + eps) + mean`
    pub fn inverse_transform(&self, scaled: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.check_dimension(scaled)?;
        Ok(scaled
            .iter()
            .zip(self.mean.iter().zip(&self.std))
            .map(|(x, (mean, std))| x * (std + SCALE_EPSILON) + mean)
            .collect())
    }

    fn check_dimension(&self, features: &[f64]) -> Result<(), ModelError> {
        if features.len() != self.dimension() {
            return Err(ModelError::FeatureDimension {
                expected: self.dimension(),
                actual: features.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{FeatureScaler, SCALE_EPSILON};
    use crate::errors::ModelError;

    #[test]
    fn fit_uses_population_statistics() {
        let rows = [[1.0, 10.0], [3.0, 10.0], [5.0, 10.0]];
        let scaler = FeatureScaler::fit(&rows).expect("non-empty rows");

        assert_eq!(scaler.mean, vec![3.0, 10.0]);
        assert!((scaler.std[0] - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(scaler.std[1], 0.0);
    }

    #[test]
    fn constant_feature_stays_finite() {
        let scaler = FeatureScaler::fit(&[[4.0], [4.0]]).expect("non-empty rows");
        let scaled = scaler.transform(&[5.0]).expect("matching dimension");

        assert!(scaled[0].is_finite());
        assert!((scaled[0] - 1.0 / SCALE_EPSILON).abs() < 1.0);
    }

    #[test]
    fn inverse_transform_recovers_input() {
        let rows = vec![vec![-3.5, 1.2], vec![12.0, 4.8], vec![27.1, 0.3], vec![5.0, 9.9]];
        let scaler = FeatureScaler::fit(&rows).expect("non-empty rows");

        for original in [[5.0, 3.2], [-10.0, 0.0], [31.4, 15.5]] {
            let scaled = scaler.transform(&original).expect("dimension");
            let restored = scaler.inverse_transform(&scaled).expect("dimension");
            for (a, b) in original.iter().zip(&restored) {
                assert!((a - b).abs() < 1e-9, "{a} vs {b}");
            }
        }
    }

    #[test]
    fn statistics_do_not_move_with_inference_inputs() {
        let scaler = FeatureScaler::fit(&[[0.0, 0.0], [2.0, 4.0]]).expect("non-empty rows");
        let before = scaler.clone();

        scaler.transform(&[100.0, -100.0]).expect("dimension");
        assert_eq!(scaler, before);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let empty: [[f64; 2]; 0] = [];
        assert!(matches!(FeatureScaler::fit(&empty), Err(ModelError::InvalidScaler(_))));

        let ragged = vec![vec![1.0, 2.0], vec![1.0]];
        assert_eq!(
            FeatureScaler::fit(&ragged),
            Err(ModelError::FeatureDimension { expected: 2, actual: 1 })
        );

        let scaler = FeatureScaler::new(vec![0.0, 0.0], vec![1.0, 1.0]).expect("valid");
        assert!(scaler.transform(&[1.0]).is_err());
        assert!(FeatureScaler::new(vec![0.0], vec![-1.0]).is_err());
        assert!(FeatureScaler::new(vec![0.0, 1.0], vec![1.0]).is_err());
    }
}
