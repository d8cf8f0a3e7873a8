//! Probability normalization and per-slot candidate selection

use super::types::Candidate;
use super::RecommendResult;
use crate::errors::RecommendError;

/// Numerically stable softmax.
///
/// Rejects empty input and non-finite scores.
pub fn softmax(scores: &[f64]) -> RecommendResult<Vec<f64>> {
    if scores.is_empty() {
        return Err(RecommendError::InvalidInput("score vector must not be empty".to_string()));
    }
    if let Some(position) = scores.iter().position(|score| !score.is_finite()) {
        return Err(RecommendError::InvalidInput(format!(
            "score at index {position} is not a finite number"
        )));
    }

    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|score| (score - max).exp()).collect();
    // The max entry contributes exp(0) = 1, so the sum is at least 1.
    let total: f64 = exps.iter().sum();

    Ok(exps.into_iter().map(|value| value / total).collect())
}

/// Top `k` entries by probability, clamped to the vector length.
///
/// Equal probabilities keep ascending index order.
pub fn top_candidates(probabilities: &[f64], k: usize) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = probabilities
        .iter()
        .enumerate()
        .map(|(index, &probability)| Candidate { index, probability })
        .collect();

    candidates.sort_by(|a, b| b.probability.total_cmp(&a.probability).then(a.index.cmp(&b.index)));
    candidates.truncate(k.min(probabilities.len()));
    candidates
}

#[cfg(test)]
mod tests {
    use super::{softmax, top_candidates};
    use crate::errors::RecommendError;

    #[test]
    fn softmax_sums_to_one_and_is_non_negative() {
        let cases: [&[f64]; 4] =
            [&[2.0, 1.0, 0.1], &[0.0], &[-1000.0, 1000.0, 3.5, -2.25], &[7.0, 7.0, 7.0, 7.0]];

        for scores in cases {
            let probabilities = softmax(scores).expect("finite scores");
            let total: f64 = probabilities.iter().sum();
            assert!((total - 1.0).abs() < 1e-6, "sum was {total} for {scores:?}");
            assert!(probabilities.iter().all(|p| *p >= 0.0));
            assert_eq!(probabilities.len(), scores.len());
        }
    }

    #[test]
    fn softmax_survives_large_logits() {
        let probabilities = softmax(&[1e4, 1e4 - 1.0]).expect("finite scores");
        assert!(probabilities.iter().all(|p| p.is_finite()));
        assert!(probabilities[0] > probabilities[1]);
    }

    #[test]
    fn softmax_rejects_empty_and_non_finite() {
        assert!(matches!(softmax(&[]), Err(RecommendError::InvalidInput(_))));

        let error = softmax(&[1.0, f64::NAN]).expect_err("NaN must be rejected");
        assert_eq!(error.to_string(), "invalid input: score at index 1 is not a finite number");

        assert!(softmax(&[f64::INFINITY]).is_err());
    }

    #[test]
    fn top_candidates_orders_by_probability_then_index() {
        let candidates = top_candidates(&[0.2, 0.4, 0.2, 0.2], 3);
        let indices: Vec<usize> = candidates.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![1, 0, 2]);
    }

    #[test]
    fn top_candidates_clamps_to_label_space() {
        let candidates = top_candidates(&[0.5, 0.3, 0.2], 10);
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].index, 0);
        assert_eq!(candidates[2].index, 2);
    }
}
