use crate::algorithms::{AlsFactorizer, AlsParams, InteractionMatrixBuilder, RecommendationEngine};
use crate::config::{AlsConfig, DataConfig};
use crate::models::{Catalog, Interaction};
use crate::services::catalog::IdentifierMap;
use crate::services::ingest::load_interactions_tsv;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// A fitted engine plus what it needs to answer personalized queries.
#[derive(Debug)]
pub struct TrainedModel {
    engine: RecommendationEngine,
    interacted: Vec<Vec<usize>>,
    nnz: usize,
    trained_at: DateTime<Utc>,
}

impl TrainedModel {
    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    /// Items the user interacted with in the training data.
    pub fn interacted(&self, user: usize) -> HashSet<usize> {
        self.interacted
            .get(user)
            .map(|items| items.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn nnz(&self) -> usize {
        self.nnz
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }
}

/// Where a catalog's training data lives and how its columns are named.
#[derive(Debug, Clone)]
pub struct CatalogSource {
    pub interactions: PathBuf,
    pub identifiers: PathBuf,
    pub item_column: String,
    pub id_column: String,
}

impl CatalogSource {
    pub fn for_catalog(data: &DataConfig, catalog: Catalog) -> Self {
        match catalog {
            Catalog::Track => Self {
                interactions: data.track_interactions.clone(),
                identifiers: data.track_ids.clone(),
                item_column: "songNo".to_string(),
                id_column: "trackId".to_string(),
            },
            Catalog::Artist => Self {
                interactions: data.artist_interactions.clone(),
                identifiers: data.artist_ids.clone(),
                item_column: "artistNo".to_string(),
                id_column: "artistId".to_string(),
            },
        }
    }
}

/// Batch trainer. Fits run on a dedicated rayon pool so they never compete
/// with request handling for the global pool.
pub struct TrainingService {
    params: AlsParams,
    pool: Arc<rayon::ThreadPool>,
}

impl TrainingService {
    pub fn new(config: &AlsConfig) -> Result<Self> {
        let params = config.params();
        params.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.num_threads)
            .thread_name(|i| format!("als-worker-{}", i))
            .build()
            .context("failed to build ALS thread pool")?;

        Ok(Self {
            params,
            pool: Arc::new(pool),
        })
    }

    pub fn params(&self) -> &AlsParams {
        &self.params
    }

    /// Blocking: build the matrix and fit. `num_items` widens the item axis
    /// so every catalog index gets a factor row even without interactions.
    pub fn train(&self, interactions: &[Interaction], num_items: Option<usize>) -> Result<TrainedModel> {
        fit_on(&self.pool, &self.params, interactions, num_items)
    }

    /// Load a catalog from disk and fit it on a blocking task.
    pub async fn load_and_train(&self, source: CatalogSource) -> Result<(IdentifierMap, TrainedModel)> {
        let pool = self.pool.clone();
        let params = self.params.clone();

        tokio::task::spawn_blocking(move || -> Result<(IdentifierMap, TrainedModel)> {
            let ids = IdentifierMap::load_tsv(&source.identifiers, &source.id_column)?;
            let interactions = load_interactions_tsv(&source.interactions, &source.item_column)?;
            let observed_items = interactions.iter().map(|i| i.item + 1).max().unwrap_or(0);
            let trained = fit_on(&pool, &params, &interactions, Some(observed_items.max(ids.universe())))?;
            Ok((ids, trained))
        })
        .await
        .context("training task failed to complete")?
    }
}

fn fit_on(
    pool: &rayon::ThreadPool,
    params: &AlsParams,
    interactions: &[Interaction],
    num_items: Option<usize>,
) -> Result<TrainedModel> {
    let started = Instant::now();

    let mut builder = InteractionMatrixBuilder::new();
    if let Some(n) = num_items {
        builder = builder.with_num_items(n);
    }
    let matrix = builder.build(interactions)?;
    let interacted = (0..matrix.num_users()).map(|u| matrix.user_items(u)).collect();
    let nnz = matrix.nnz();

    let factorizer = AlsFactorizer::new(params.clone());
    let model = pool.install(|| factorizer.fit(&matrix))?;

    info!(
        "Trained model for {} users x {} items ({} interactions) in {:?}",
        model.num_users(),
        model.num_items(),
        nnz,
        started.elapsed()
    );

    Ok(TrainedModel {
        engine: RecommendationEngine::new(model),
        interacted,
        nnz,
        trained_at: Utc::now(),
    })
}
