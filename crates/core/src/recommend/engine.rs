//! Combination Recommender implementation

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use super::scoring::{softmax, top_candidates};
use super::types::*;
use super::RecommendResult;
use crate::errors::RecommendError;
use crate::ml::LabelSpace;

/// Ranks (top, bottom) garment pairs from two independent slot distributions.
///
/// The joint score assumes the two heads are conditionally independent given
/// the weather, so a pair scores `P(top) * P(bottom)`.
#[derive(Debug, Clone, Default)]
pub struct ComboRecommender {
    options: RecommendOptions,
}

/// A cell of the (top rank, bottom rank) grid
#[derive(Debug, Clone, Copy)]
struct RankedPair {
    top_rank: usize,
    bottom_rank: usize,
    score: f64,
}

impl RankedPair {
    /// Higher score first, then lower (top rank, bottom rank).
    fn priority(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.top_rank.cmp(&self.top_rank))
            .then_with(|| other.bottom_rank.cmp(&self.bottom_rank))
    }
}

impl PartialEq for RankedPair {
    fn eq(&self, other: &Self) -> bool {
        self.priority(other) == Ordering::Equal
    }
}

impl Eq for RankedPair {}

impl PartialOrd for RankedPair {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankedPair {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority(other)
    }
}

impl ComboRecommender {
    pub fn new(options: RecommendOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RecommendOptions {
        &self.options
    }

    /// Rank combinations with the recommender's own options.
    pub fn recommend(
        &self,
        top_scores: &[f64],
        bottom_scores: &[f64],
        top_labels: &LabelSpace,
        bottom_labels: &LabelSpace,
    ) -> RecommendResult<ComboRanking> {
        Self::recommend_with(&self.options, top_scores, bottom_scores, top_labels, bottom_labels)
    }

    /// Rank combinations with explicit options.
    pub fn recommend_with(
        options: &RecommendOptions,
        top_scores: &[f64],
        bottom_scores: &[f64],
        top_labels: &LabelSpace,
        bottom_labels: &LabelSpace,
    ) -> RecommendResult<ComboRanking> {
        validate_options(options)?;
        validate_scores("top", top_scores, top_labels)?;
        validate_scores("bottom", bottom_scores, bottom_labels)?;

        let top_probabilities = softmax(top_scores)?;
        let bottom_probabilities = softmax(bottom_scores)?;

        let (tops, bottoms, pairs) = match options.strategy {
            SearchStrategy::Pruned => {
                let tops = top_candidates(&top_probabilities, options.k_each_top);
                let bottoms = top_candidates(&bottom_probabilities, options.k_each_bottom);
                let pairs = pruned_pairs(&tops, &bottoms, options.combo_k);
                (tops, bottoms, pairs)
            }
            SearchStrategy::Exact => {
                let tops = top_candidates(&top_probabilities, top_probabilities.len());
                let bottoms = top_candidates(&bottom_probabilities, bottom_probabilities.len());
                let pairs = best_first_pairs(&tops, &bottoms, options.combo_k);
                (tops, bottoms, pairs)
            }
        };

        let combos = pairs
            .into_iter()
            .map(|pair| {
                let top = tops[pair.top_rank];
                let bottom = bottoms[pair.bottom_rank];
                Ok(ComboResult {
                    top_label: label_at(top_labels, top.index, "top")?.to_string(),
                    bottom_label: label_at(bottom_labels, bottom.index, "bottom")?.to_string(),
                    joint_score: pair.score,
                    top_probability: top.probability,
                    bottom_probability: bottom.probability,
                    top_index: top.index,
                    bottom_index: bottom.index,
                })
            })
            .collect::<RecommendResult<Vec<_>>>()?;

        Ok(ComboRanking::new(combos))
    }
}

fn validate_options(options: &RecommendOptions) -> RecommendResult<()> {
    for (name, value) in [
        ("k_each_top", options.k_each_top),
        ("k_each_bottom", options.k_each_bottom),
        ("combo_k", options.combo_k),
    ] {
        if value == 0 {
            return Err(RecommendError::InvalidInput(format!("{name} must be greater than zero")));
        }
    }
    Ok(())
}

fn validate_scores(slot: &str, scores: &[f64], labels: &LabelSpace) -> RecommendResult<()> {
    if scores.is_empty() {
        return Err(RecommendError::InvalidInput(format!("{slot} scores must not be empty")));
    }
    if scores.len() != labels.len() {
        return Err(RecommendError::InvalidInput(format!(
            "{slot} scores have {} entries but the label space has {}",
            scores.len(),
            labels.len()
        )));
    }
    Ok(())
}

fn label_at<'a>(labels: &'a LabelSpace, index: usize, slot: &str) -> RecommendResult<&'a str> {
    labels.label(index).ok_or_else(|| {
        RecommendError::InvalidInput(format!("{slot} label index {index} is out of range"))
    })
}

/// Dense cross product of both candidate sets, best `combo_k` kept.
fn pruned_pairs(tops: &[Candidate], bottoms: &[Candidate], combo_k: usize) -> Vec<RankedPair> {
    let mut pairs = Vec::with_capacity(tops.len() * bottoms.len());
    for (top_rank, top) in tops.iter().enumerate() {
        for (bottom_rank, bottom) in bottoms.iter().enumerate() {
            pairs.push(RankedPair {
                top_rank,
                bottom_rank,
                score: top.probability * bottom.probability,
            });
        }
    }

    pairs.sort_by(|a, b| b.cmp(a));
    pairs.truncate(combo_k);
    pairs
}

/// Best-first walk of the rank grid.
///
/// Both candidate lists are sorted descending, so every unvisited cell is
/// dominated by a frontier cell to its upper left.
fn best_first_pairs(tops: &[Candidate], bottoms: &[Candidate], combo_k: usize) -> Vec<RankedPair> {
    let limit = combo_k.min(tops.len() * bottoms.len());
    let mut pairs = Vec::with_capacity(limit);
    if limit == 0 {
        return pairs;
    }

    let score = |top_rank: usize, bottom_rank: usize| RankedPair {
        top_rank,
        bottom_rank,
        score: tops[top_rank].probability * bottoms[bottom_rank].probability,
    };

    let mut frontier = BinaryHeap::new();
    let mut seen = HashSet::new();
    frontier.push(score(0, 0));
    seen.insert((0, 0));

    while pairs.len() < limit {
        let Some(pair) = frontier.pop() else {
            break;
        };

        for (top_rank, bottom_rank) in
            [(pair.top_rank + 1, pair.bottom_rank), (pair.top_rank, pair.bottom_rank + 1)]
        {
            let in_grid = top_rank < tops.len() && bottom_rank < bottoms.len();
            if in_grid && seen.insert((top_rank, bottom_rank)) {
                frontier.push(score(top_rank, bottom_rank));
            }
        }

        pairs.push(pair);
    }

    pairs
}
