//! Multi-head garment classifier (inference only)
//!
//! Architecture:
//!   - weather embedding `[weather_codes x emb_dim]`
//!   - concat(embedding, standardized numeric features)
//!   - trunk of dense layers, each followed by ReLU (two layers of 64 by default)
//!   - two linear heads: top-garment logits and bottom-garment logits

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Numeric inputs fed next to the weather embedding, in order
pub const NUMERIC_FEATURES: [&str; 2] = ["temperature", "wind_speed"];

/// Trunk width used by the reference training setup
pub const DEFAULT_HIDDEN_WIDTH: usize = 64;

/// Logits for both garment slots
#[derive(Clone, Debug, PartialEq)]
pub struct SlotScores {
    pub top: Vec<f64>,
    pub bottom: Vec<f64>,
}

/// Anything that maps (weather index, scaled features) to per-slot logits.
pub trait GarmentScorer {
    fn score(&self, weather_index: usize, features: &[f64]) -> Result<SlotScores, ModelError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkShape {
    pub weather_codes: usize,
    pub numeric_features: usize,
    pub hidden_width: usize,
    pub top_classes: usize,
    pub bottom_classes: usize,
}

impl NetworkShape {
    pub fn new(weather_codes: usize, top_classes: usize, bottom_classes: usize) -> Self {
        Self {
            weather_codes,
            numeric_features: NUMERIC_FEATURES.len(),
            hidden_width: DEFAULT_HIDDEN_WIDTH,
            top_classes,
            bottom_classes,
        }
    }

    /// `min(16, max(4, (codes + 1) / 2))`
    pub fn embedding_dim(&self) -> usize {
        ((self.weather_codes + 1) / 2).clamp(4, 16)
    }
}

/// Fully connected layer with `weights[out][in]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

impl DenseLayer {
    pub fn zeroed(inputs: usize, outputs: usize) -> Self {
        Self { weights: vec![vec![0.0; inputs]; outputs], bias: vec![0.0; outputs] }
    }

    pub fn inputs(&self) -> usize {
        self.weights.first().map(Vec::len).unwrap_or(0)
    }

    pub fn outputs(&self) -> usize {
        self.bias.len()
    }

    fn validate(&self, name: &str, expected_inputs: usize) -> Result<(), ModelError> {
        if self.weights.len() != self.bias.len() {
            return Err(ModelError::ShapeMismatch(format!(
                "{name} has {} weight rows but {} biases",
                self.weights.len(),
                self.bias.len()
            )));
        }
        if self.bias.is_empty() {
            return Err(ModelError::ShapeMismatch(format!("{name} has no outputs")));
        }
        if let Some(row) = self.weights.iter().position(|row| row.len() != expected_inputs) {
            return Err(ModelError::ShapeMismatch(format!(
                "{name} row {row} has {} inputs, expected {expected_inputs}",
                self.weights[row].len()
            )));
        }
        Ok(())
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, bias)| row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + bias)
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MultiHeadNet {
    /// One row per weather index
    pub embedding: Vec<Vec<f64>>,
    pub trunk: Vec<DenseLayer>,
    pub head_top: DenseLayer,
    pub head_bottom: DenseLayer,
}

impl MultiHeadNet {
    /// All-zero parameters; every class gets the same logit.
    pub fn zeroed(shape: NetworkShape) -> Self {
        let embedding_dim = shape.embedding_dim();
        let hidden = shape.hidden_width;
        Self {
            embedding: vec![vec![0.0; embedding_dim]; shape.weather_codes],
            trunk: vec![
                DenseLayer::zeroed(embedding_dim + shape.numeric_features, hidden),
                DenseLayer::zeroed(hidden, hidden),
            ],
            head_top: DenseLayer::zeroed(hidden, shape.top_classes),
            head_bottom: DenseLayer::zeroed(hidden, shape.bottom_classes),
        }
    }

    pub fn embedding_dim(&self) -> usize {
        self.embedding.first().map(Vec::len).unwrap_or(0)
    }

    /// Checks every layer chains into the next and the heads match `shape`.
    pub fn validate(&self, shape: &NetworkShape) -> Result<(), ModelError> {
        if self.embedding.len() != shape.weather_codes {
            return Err(ModelError::ShapeMismatch(format!(
                "embedding has {} rows but there are {} weather codes",
                self.embedding.len(),
                shape.weather_codes
            )));
        }
        let embedding_dim = self.embedding_dim();
        if embedding_dim == 0 || self.embedding.iter().any(|row| row.len() != embedding_dim) {
            return Err(ModelError::ShapeMismatch(
                "embedding rows must share one non-zero width".to_string(),
            ));
        }
        if self.trunk.is_empty() {
            return Err(ModelError::ShapeMismatch("trunk needs at least one layer".to_string()));
        }

        let mut width = embedding_dim + shape.numeric_features;
        for (position, layer) in self.trunk.iter().enumerate() {
            layer.validate(&format!("trunk layer {position}"), width)?;
            width = layer.outputs();
        }

        self.head_top.validate("top head", width)?;
        self.head_bottom.validate("bottom head", width)?;
        if self.head_top.outputs() != shape.top_classes {
            return Err(ModelError::ShapeMismatch(format!(
                "top head emits {} logits for {} labels",
                self.head_top.outputs(),
                shape.top_classes
            )));
        }
        if self.head_bottom.outputs() != shape.bottom_classes {
            return Err(ModelError::ShapeMismatch(format!(
                "bottom head emits {} logits for {} labels",
                self.head_bottom.outputs(),
                shape.bottom_classes
            )));
        }
        Ok(())
    }

    pub fn forward(&self, weather_index: usize, features: &[f64]) -> Result<SlotScores, ModelError> {
        let embedded = self.embedding.get(weather_index).ok_or(
            ModelError::WeatherIndexOutOfRange { index: weather_index, len: self.embedding.len() },
        )?;
        let expected = self.trunk.first().map(DenseLayer::inputs).unwrap_or(0);
        if embedded.len() + features.len() != expected {
            return Err(ModelError::FeatureDimension {
                expected: expected.saturating_sub(embedded.len()),
                actual: features.len(),
            });
        }

        let mut hidden: Vec<f64> = embedded.iter().chain(features).copied().collect();
        for layer in &self.trunk {
            hidden = layer.forward(&hidden).into_iter().map(|value| value.max(0.0)).collect();
        }

        Ok(SlotScores { top: self.head_top.forward(&hidden), bottom: self.head_bottom.forward(&hidden) })
    }
}

impl GarmentScorer for MultiHeadNet {
    fn score(&self, weather_index: usize, features: &[f64]) -> Result<SlotScores, ModelError> {
        self.forward(weather_index, features)
    }
}

#[cfg(test)]
mod tests {
    use super::{DenseLayer, GarmentScorer, MultiHeadNet, NetworkShape};
    use crate::errors::ModelError;

    #[test]
    fn embedding_dim_follows_code_count() {
        assert_eq!(NetworkShape::new(1, 2, 2).embedding_dim(), 4);
        assert_eq!(NetworkShape::new(11, 2, 2).embedding_dim(), 6);
        assert_eq!(NetworkShape::new(28, 2, 2).embedding_dim(), 14);
        assert_eq!(NetworkShape::new(40, 2, 2).embedding_dim(), 16);
    }

    #[test]
    fn zeroed_network_validates_and_emits_uniform_logits() {
        let shape = NetworkShape::new(3, 4, 2);
        let net = MultiHeadNet::zeroed(shape);
        net.validate(&shape).expect("zeroed network matches its shape");

        let scores = net.score(1, &[0.5, -0.5]).expect("valid input");
        assert_eq!(scores.top, vec![0.0; 4]);
        assert_eq!(scores.bottom, vec![0.0; 2]);
    }

    #[test]
    fn forward_applies_relu_between_layers() {
        let net = MultiHeadNet {
            embedding: vec![vec![1.0], vec![-1.0]],
            trunk: vec![DenseLayer { weights: vec![vec![2.0, 1.0]], bias: vec![0.0] }],
            head_top: DenseLayer { weights: vec![vec![1.0], vec![-1.0]], bias: vec![0.5, 0.0] },
            head_bottom: DenseLayer { weights: vec![vec![3.0]], bias: vec![1.0] },
        };
        let shape = NetworkShape {
            weather_codes: 2,
            numeric_features: 1,
            hidden_width: 1,
            top_classes: 2,
            bottom_classes: 1,
        };
        net.validate(&shape).expect("hand-built network is consistent");

        // index 0: relu(2*1 + 1*0.5) = 2.5
        let scores = net.forward(0, &[0.5]).expect("valid input");
        assert_eq!(scores.top, vec![3.0, -2.5]);
        assert_eq!(scores.bottom, vec![8.5]);

        // index 1: relu(2*-1 + 0.5) = 0
        let scores = net.forward(1, &[0.5]).expect("valid input");
        assert_eq!(scores.top, vec![0.5, 0.0]);
        assert_eq!(scores.bottom, vec![1.0]);
    }

    #[test]
    fn forward_rejects_bad_inputs() {
        let net = MultiHeadNet::zeroed(NetworkShape::new(2, 3, 3));

        assert_eq!(
            net.forward(5, &[0.0, 0.0]),
            Err(ModelError::WeatherIndexOutOfRange { index: 5, len: 2 })
        );
        assert_eq!(
            net.forward(0, &[0.0]),
            Err(ModelError::FeatureDimension { expected: 2, actual: 1 })
        );
    }

    #[test]
    fn validate_reports_head_mismatch() {
        let net = MultiHeadNet::zeroed(NetworkShape::new(2, 3, 3));
        let error = net.validate(&NetworkShape::new(2, 4, 3)).expect_err("top head too small");
        assert_eq!(error.to_string(), "network shape mismatch: top head emits 3 logits for 4 labels");

        let mut broken = MultiHeadNet::zeroed(NetworkShape::new(2, 3, 3));
        broken.trunk[1].weights[7].pop();
        let error = broken.validate(&NetworkShape::new(2, 3, 3)).expect_err("ragged row");
        assert!(error.to_string().contains("trunk layer 1 row 7"));
    }
}
