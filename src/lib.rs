pub mod algorithms;
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{RecError, RecResult};
pub use models::*;

use anyhow::Result;
use services::training::CatalogSource;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub recommendation_service: Arc<services::recommendation::RecommendationService>,
    pub training_service: Arc<services::training::TrainingService>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);

        let training_service = Arc::new(services::training::TrainingService::new(&config.als)?);

        let recommendation_service = Arc::new(
            services::recommendation::RecommendationService::new(config.recommendation.clone()),
        );

        Ok(Self {
            config,
            recommendation_service,
            training_service,
        })
    }

    /// Load the catalog's data, fit it and make it the active model.
    pub async fn train_catalog(&self, catalog: Catalog) -> Result<()> {
        let source = CatalogSource::for_catalog(&self.config.data, catalog);
        info!("Training {} model from {}", catalog, source.interactions.display());

        let (ids, trained) = self.training_service.load_and_train(source).await?;
        self.recommendation_service.install(catalog, ids, trained);
        Ok(())
    }
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
