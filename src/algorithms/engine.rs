use super::als::FactorModel;
use super::Recommender;
use crate::error::{RecError, RecResult};
use crate::models::ScoredItem;
use crate::utils::top_n;
use nalgebra::DVector;
use std::collections::HashSet;

/// Serves queries from one fitted [`FactorModel`].
///
/// Scores are raw dot products in latent space, for user-item affinity as
/// well as item-item similarity.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    model: FactorModel,
}

impl RecommendationEngine {
    pub fn new(model: FactorModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &FactorModel {
        &self.model
    }

    pub fn num_users(&self) -> usize {
        self.model.num_users()
    }

    pub fn num_items(&self) -> usize {
        self.model.num_items()
    }

    fn user_vector(&self, user: usize) -> RecResult<DVector<f32>> {
        if user >= self.num_users() {
            return Err(RecError::UnknownUser { index: user, num_users: self.num_users() });
        }
        Ok(self.model.user_factors().row(user).transpose())
    }

    fn item_vector(&self, item: usize) -> RecResult<DVector<f32>> {
        if item >= self.num_items() {
            return Err(RecError::UnknownItem { index: item, num_items: self.num_items() });
        }
        Ok(self.model.item_factors().row(item).transpose())
    }

    /// Scores of every item against `query`, indexed by item.
    fn score_all(&self, query: &DVector<f32>) -> DVector<f32> {
        self.model.item_factors() * query
    }

    pub fn score(&self, user: usize, item: usize) -> RecResult<f32> {
        let user_vec = self.user_vector(user)?;
        let item_vec = self.item_vector(item)?;
        Ok(user_vec.dot(&item_vec))
    }
}

impl Recommender for RecommendationEngine {
    fn recommend_for_user(
        &self,
        user: usize,
        exclude: &HashSet<usize>,
        n: usize,
    ) -> RecResult<Vec<ScoredItem>> {
        let query = self.user_vector(user)?;
        let scores = self.score_all(&query);
        Ok(top_n(
            scores
                .iter()
                .enumerate()
                .filter(|(item, _)| !exclude.contains(item))
                .map(|(item, &score)| ScoredItem { item, score }),
            n,
        ))
    }

    fn similar_items(&self, item: usize, n: usize) -> RecResult<Vec<ScoredItem>> {
        let query = self.item_vector(item)?;
        let scores = self.score_all(&query);
        Ok(top_n(
            scores
                .iter()
                .enumerate()
                .filter(|&(other, _)| other != item)
                .map(|(other, &score)| ScoredItem { item: other, score }),
            n,
        ))
    }
}

/// Top-`n` items for `user`, skipping `exclude`.
pub fn recommend_for_user(
    engine: &RecommendationEngine,
    user: usize,
    exclude: &HashSet<usize>,
    n: usize,
) -> RecResult<Vec<ScoredItem>> {
    engine.recommend_for_user(user, exclude, n)
}

/// Top-`n` items most similar to `item`, never including `item`.
pub fn similar_items(engine: &RecommendationEngine, item: usize, n: usize) -> RecResult<Vec<ScoredItem>> {
    engine.similar_items(item, n)
}
