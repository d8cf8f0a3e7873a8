//! Garment Combination Recommender
//!
//! Turns the two per-slot logit vectors produced by the outfit model into a
//! ranked list of (top, bottom) pairs scored by `P(top) * P(bottom)`.

mod engine;
mod scoring;
mod types;

pub use engine::ComboRecommender;
pub use scoring::{softmax, top_candidates};
pub use types::*;

use crate::errors::RecommendError;

/// Result type for recommendation operations
pub type RecommendResult<T> = Result<T, RecommendError>;

/// Default number of top-garment candidates kept before combination
pub const DEFAULT_K_EACH_TOP: usize = 5;

/// Default number of bottom-garment candidates kept before combination
pub const DEFAULT_K_EACH_BOTTOM: usize = 5;

/// Default number of combinations returned
pub const DEFAULT_COMBO_K: usize = 10;
