//! Types for the Combination Recommender

use serde::{Deserialize, Serialize};

/// How the joint ranking is searched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Keep the top `k_each` entries per slot, then rank their cross product.
    ///
    /// A pair can be missed when one of its garments falls outside its own
    /// slot's top `k_each`.
    #[default]
    Pruned,
    /// Best-first search over the full marginals; `k_each` is ignored.
    Exact,
}

impl std::str::FromStr for SearchStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pruned" => Ok(Self::Pruned),
            "exact" => Ok(Self::Exact),
            other => Err(format!("unsupported search strategy `{other}` (expected pruned|exact)")),
        }
    }
}

/// Knobs for a single recommendation call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendOptions {
    /// Candidates kept from the top-garment distribution
    pub k_each_top: usize,
    /// Candidates kept from the bottom-garment distribution
    pub k_each_bottom: usize,
    /// Combinations returned
    pub combo_k: usize,
    pub strategy: SearchStrategy,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            k_each_top: super::DEFAULT_K_EACH_TOP,
            k_each_bottom: super::DEFAULT_K_EACH_BOTTOM,
            combo_k: super::DEFAULT_COMBO_K,
            strategy: SearchStrategy::Pruned,
        }
    }
}

impl RecommendOptions {
    /// Use the same candidate count for both slots
    pub fn with_k_each(mut self, k_each: usize) -> Self {
        self.k_each_top = k_each;
        self.k_each_bottom = k_each;
        self
    }

    pub fn with_combo_k(mut self, combo_k: usize) -> Self {
        self.combo_k = combo_k;
        self
    }

    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// One entry of a slot's candidate set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Index into the slot's label space
    pub index: usize,
    pub probability: f64,
}

/// A recommended (top, bottom) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboResult {
    pub top_label: String,
    pub bottom_label: String,
    /// `top_probability * bottom_probability`
    pub joint_score: f64,
    pub top_probability: f64,
    pub bottom_probability: f64,
    pub top_index: usize,
    pub bottom_index: usize,
}

/// Combinations sorted by descending joint score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComboRanking {
    combos: Vec<ComboResult>,
}

impl ComboRanking {
    pub(crate) fn new(combos: Vec<ComboResult>) -> Self {
        Self { combos }
    }

    pub fn len(&self) -> usize {
        self.combos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combos.is_empty()
    }

    /// Highest-scoring combination
    pub fn best(&self) -> Option<&ComboResult> {
        self.combos.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ComboResult> {
        self.combos.iter()
    }

    pub fn as_slice(&self) -> &[ComboResult] {
        &self.combos
    }

    pub fn into_vec(self) -> Vec<ComboResult> {
        self.combos
    }
}

impl<'a> IntoIterator for &'a ComboRanking {
    type Item = &'a ComboResult;
    type IntoIter = std::slice::Iter<'a, ComboResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.combos.iter()
    }
}
