use crate::algorithms::{Recommender, SimilarItemSelector};
use crate::config::RecommendationConfig;
use crate::models::{Catalog, RecommendationItem};
use crate::services::catalog::IdentifierMap;
use crate::services::training::TrainedModel;
use anyhow::{anyhow, Result};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Holds the active value behind a single `Arc`.
///
/// Readers clone the `Arc` and drop the lock before doing any work, so a
/// query that started on the old model finishes on it after a swap.
pub struct ModelHandle<T> {
    current: RwLock<Option<Arc<T>>>,
}

impl<T> Default for ModelHandle<T> {
    fn default() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }
}

impl<T> ModelHandle<T> {
    pub fn current(&self) -> Option<Arc<T>> {
        self.current.read().clone()
    }

    /// Install `next`, returning the model it replaced.
    pub fn swap(&self, next: Arc<T>) -> Option<Arc<T>> {
        self.current.write().replace(next)
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }
}

/// A trained model and the identifiers it was trained against.
pub struct CatalogModel {
    pub ids: IdentifierMap,
    pub trained: TrainedModel,
}

pub struct RecommendationService {
    config: RecommendationConfig,
    selector: SimilarItemSelector,
    models: HashMap<Catalog, ModelHandle<CatalogModel>>,
    stats: DashMap<String, u64>,
}

impl RecommendationService {
    pub fn new(config: RecommendationConfig) -> Self {
        let selector = SimilarItemSelector::new(config.over_fetch_margin);
        let models = Catalog::ALL
            .iter()
            .map(|&catalog| (catalog, ModelHandle::default()))
            .collect();

        Self {
            config,
            selector,
            models,
            stats: DashMap::new(),
        }
    }

    pub fn config(&self) -> &RecommendationConfig {
        &self.config
    }

    fn handle(&self, catalog: Catalog) -> &ModelHandle<CatalogModel> {
        // Every catalog gets a handle in `new`.
        &self.models[&catalog]
    }

    fn active(&self, catalog: Catalog) -> Result<Arc<CatalogModel>> {
        self.handle(catalog)
            .current()
            .ok_or_else(|| anyhow!("no {} model has been trained yet", catalog))
    }

    /// Replace the catalog's model wholesale.
    pub fn install(&self, catalog: Catalog, ids: IdentifierMap, trained: TrainedModel) {
        let users = trained.engine().num_users();
        let items = trained.engine().num_items();
        let replaced = self
            .handle(catalog)
            .swap(Arc::new(CatalogModel { ids, trained }))
            .is_some();

        self.increment_stat("model_swaps");
        info!(
            "Installed {} model ({} users, {} items, replaced previous: {})",
            catalog, users, items, replaced
        );
    }

    pub fn is_ready(&self, catalog: Catalog) -> bool {
        self.handle(catalog).is_loaded()
    }

    pub fn model(&self, catalog: Catalog) -> Option<Arc<CatalogModel>> {
        self.handle(catalog).current()
    }

    /// Personalized top-`n`, skipping items the user already interacted with.
    pub fn recommend_for_user(
        &self,
        catalog: Catalog,
        user: usize,
        n: usize,
    ) -> Result<Vec<RecommendationItem>> {
        self.increment_stat("user_requests");
        let model = self.active(catalog)?;
        let exclude = model.trained.interacted(user);

        let scored = model
            .trained
            .engine()
            .recommend_for_user(user, &exclude, n)
            .inspect_err(|_| self.increment_stat("failed_requests"))?;

        Ok(scored
            .into_iter()
            .filter_map(|s| {
                model.ids.id_of(s.item).map(|id| RecommendationItem {
                    id: id.to_string(),
                    score: s.score,
                })
            })
            .collect())
    }

    /// Items similar to a set of external ids. Ids the catalog does not know
    /// are skipped; if none remain the result is empty.
    pub fn similar_to_many(&self, catalog: Catalog, ids: &[String], n: usize) -> Result<Vec<String>> {
        self.increment_stat("similar_many_requests");
        let model = self.active(catalog)?;

        let seeds: Vec<usize> = ids.iter().filter_map(|id| model.ids.index_of(id)).collect();
        debug!("Resolved {} of {} seed ids for {} similarity", seeds.len(), ids.len(), catalog);
        if seeds.is_empty() {
            return Ok(Vec::new());
        }

        let selected = self
            .selector
            .select(model.trained.engine(), &seeds, n)
            .inspect_err(|_| self.increment_stat("failed_requests"))?;

        Ok(self.to_ids(&model, selected))
    }

    /// Items similar to a single external id.
    pub fn similar_to_one(&self, catalog: Catalog, id: &str, n: usize) -> Result<Vec<String>> {
        self.increment_stat("similar_one_requests");
        let model = self.active(catalog)?;
        let item = model
            .ids
            .index_of(id)
            .ok_or_else(|| anyhow!("unknown {} id '{}'", catalog, id))?;

        let similar = model
            .trained
            .engine()
            .similar_items(item, n)
            .inspect_err(|_| self.increment_stat("failed_requests"))?;

        Ok(self.to_ids(&model, similar.into_iter().map(|s| s.item)))
    }

    fn to_ids<I>(&self, model: &CatalogModel, items: I) -> Vec<String>
    where
        I: IntoIterator<Item = usize>,
    {
        items
            .into_iter()
            .filter_map(|item| model.ids.id_of(item).map(str::to_string))
            .collect()
    }

    pub fn stats(&self) -> HashMap<String, u64> {
        self.stats
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    fn increment_stat(&self, key: &str) {
        *self.stats.entry(key.to_string()).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AlsConfig, Config};
    use crate::models::Interaction;
    use crate::services::training::TrainingService;

    fn trainer() -> TrainingService {
        TrainingService::new(&AlsConfig {
            factors: 2,
            iterations: 5,
            num_threads: 1,
            ..Config::default().als
        })
        .unwrap()
    }

    fn ids(n: usize) -> IdentifierMap {
        IdentifierMap::from_pairs((0..n).map(|i| (format!("t{}", i), i))).unwrap()
    }

    fn loaded_service() -> RecommendationService {
        let interactions = vec![
            Interaction::new(0, 0, 4.0),
            Interaction::new(0, 1, 2.0),
            Interaction::new(1, 1, 3.0),
            Interaction::new(1, 2, 1.0),
            Interaction::new(2, 3, 5.0),
            Interaction::new(2, 4, 5.0),
        ];
        let service = RecommendationService::new(Config::default().recommendation);
        let trained = trainer().train(&interactions, Some(5)).unwrap();
        service.install(Catalog::Track, ids(5), trained);
        service
    }

    #[test]
    fn test_not_ready_until_installed() {
        let service = RecommendationService::new(Config::default().recommendation);
        assert!(!service.is_ready(Catalog::Track));
        assert!(service.recommend_for_user(Catalog::Track, 0, 3).is_err());
    }

    #[test]
    fn test_user_recommendations_skip_history() {
        let service = loaded_service();
        let recs = service.recommend_for_user(Catalog::Track, 0, 10).unwrap();
        assert_eq!(recs.len(), 3);
        assert!(recs.iter().all(|r| r.id != "t0" && r.id != "t1"));
    }

    #[test]
    fn test_unknown_user_is_an_error() {
        let service = loaded_service();
        let err = service.recommend_for_user(Catalog::Track, 42, 3).unwrap_err();
        assert!(err.downcast_ref::<crate::error::RecError>().is_some_and(|e| e.is_query_error()));
        assert_eq!(service.stats().get("failed_requests"), Some(&1));
    }

    #[test]
    fn test_similar_to_many_skips_unknown_and_seeds() {
        let service = loaded_service();
        let seeds = vec!["t0".to_string(), "nope".to_string(), "t3".to_string()];
        let similar = service.similar_to_many(Catalog::Track, &seeds, 2).unwrap();
        assert_eq!(similar.len(), 2);
        assert!(similar.iter().all(|id| id != "t0" && id != "t3"));

        let none = service.similar_to_many(Catalog::Track, &["nope".to_string()], 2).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_similar_to_one() {
        let service = loaded_service();
        let similar = service.similar_to_one(Catalog::Track, "t2", 10).unwrap();
        assert_eq!(similar.len(), 4);
        assert!(!similar.contains(&"t2".to_string()));
        assert!(service.similar_to_one(Catalog::Track, "missing", 3).is_err());
    }

    #[test]
    fn test_swap_keeps_old_model_alive_for_readers() {
        let service = loaded_service();
        let before = service.model(Catalog::Track).unwrap();

        let trained = trainer().train(&[Interaction::new(0, 0, 1.0)], Some(2)).unwrap();
        service.install(Catalog::Track, ids(2), trained);

        assert_eq!(before.trained.engine().num_items(), 5);
        assert_eq!(service.model(Catalog::Track).unwrap().trained.engine().num_items(), 2);
        assert_eq!(service.stats().get("model_swaps"), Some(&2));
    }
}
