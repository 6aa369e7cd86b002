pub mod als;
pub mod engine;
pub mod initializer;
pub mod matrix;
pub mod selector;

pub use als::{fit, AlsFactorizer, AlsParams, FactorModel};
pub use engine::{recommend_for_user, similar_items, RecommendationEngine};
pub use matrix::{build_matrix, ConfidenceMatrix, InteractionMatrixBuilder};
pub use selector::{select_similar_for_seeds, SimilarItemSelector};

use crate::error::RecResult;
use crate::models::ScoredItem;
use std::collections::HashSet;

/// Query surface of a fitted model.
pub trait Recommender: Send + Sync {
    fn recommend_for_user(
        &self,
        user: usize,
        exclude: &HashSet<usize>,
        n: usize,
    ) -> RecResult<Vec<ScoredItem>>;

    fn similar_items(&self, item: usize, n: usize) -> RecResult<Vec<ScoredItem>>;
}
