use crate::config::RecommendationConfig;
use crate::models::{SimilarArtistRequest, SimilarTracksRequest};
use anyhow::{anyhow, Result};

const MAX_ID_LEN: usize = 128;

pub fn validate_n(n: usize, config: &RecommendationConfig) -> Result<()> {
    if n == 0 {
        return Err(anyhow!("Number of recommendations must be greater than 0"));
    }

    if n > config.max_n {
        return Err(anyhow!("Number of recommendations too large (max {})", config.max_n));
    }

    Ok(())
}

pub fn validate_external_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(anyhow!("Identifier cannot be empty"));
    }

    if id.len() > MAX_ID_LEN {
        return Err(anyhow!("Identifier too long (max {} characters)", MAX_ID_LEN));
    }

    Ok(())
}

pub fn validate_similar_tracks_request(request: &SimilarTracksRequest, config: &RecommendationConfig) -> Result<()> {
    if request.track_ids.is_empty() {
        return Err(anyhow!("At least one track id is required"));
    }

    if request.track_ids.len() > config.max_seeds {
        return Err(anyhow!("Too many seed tracks (max {})", config.max_seeds));
    }

    for id in &request.track_ids {
        validate_external_id(id)?;
    }

    Ok(())
}

pub fn validate_similar_artist_request(request: &SimilarArtistRequest) -> Result<()> {
    validate_external_id(&request.artist_id)
}
