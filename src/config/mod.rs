use crate::algorithms::AlsParams;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub als: AlsConfig,
    pub recommendation: RecommendationConfig,
    pub data: DataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlsConfig {
    pub factors: usize,
    pub iterations: usize,
    pub regularization: f32,
    pub alpha: f32,
    pub seed: u64,
    pub num_threads: usize,
}

impl AlsConfig {
    pub fn params(&self) -> AlsParams {
        AlsParams::new(self.factors, self.iterations, self.regularization, self.alpha).with_seed(self.seed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    pub default_n: usize,
    pub similar_tracks_n: usize,
    pub similar_artists_n: usize,
    pub over_fetch_margin: usize,
    pub max_n: usize,
    pub max_seeds: usize,
}

/// Tab-separated inputs for each catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub track_interactions: PathBuf,
    pub track_ids: PathBuf,
    pub artist_interactions: PathBuf,
    pub artist_ids: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            als: AlsConfig {
                factors: 50,
                iterations: 10,
                regularization: 0.01,
                alpha: 1.0,
                seed: crate::algorithms::als::DEFAULT_SEED,
                num_threads: num_cpus::get(),
            },
            recommendation: RecommendationConfig {
                default_n: 10,
                similar_tracks_n: 25,
                similar_artists_n: 10,
                over_fetch_margin: crate::algorithms::selector::DEFAULT_OVER_FETCH_MARGIN,
                max_n: 1000,
                max_seeds: 500,
            },
            data: DataConfig {
                track_interactions: PathBuf::from("extracted-data/track/playlist_track.dat"),
                track_ids: PathBuf::from("extracted-data/track/track_id_to_num.dat"),
                artist_interactions: PathBuf::from("extracted-data/artist/playlist_artist.dat"),
                artist_ids: PathBuf::from("extracted-data/artist/artist_id_to_num.dat"),
            },
        }
    }
}

impl Config {
    /// File values on top of the defaults, then `SONGREC_*` environment
    /// overrides (`SONGREC_ALS__FACTORS=64`).
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let defaults = config::Config::try_from(&Config::default())?;
        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("SONGREC")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("failed to load configuration from {}", path))?;

        Ok(settings.try_deserialize()?)
    }

    /// The file at `path` if it exists, otherwise the defaults.
    pub fn load_or_default(path: &str) -> anyhow::Result<Self> {
        if std::path::Path::new(path).exists() {
            Self::from_file(path)
        } else {
            tracing::info!("Config file {} not found, using default configuration", path);
            Ok(Self::default())
        }
    }
}
