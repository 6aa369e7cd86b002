use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One observed (user, item) signal, e.g. a play count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub user: usize,
    pub item: usize,
    pub weight: f32,
}

impl Interaction {
    pub fn new(user: usize, item: usize, weight: f32) -> Self {
        Self { user, item, weight }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub item: usize,
    pub score: f32,
}

/// The item universes the service keeps a model for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Catalog {
    Track,
    Artist,
}

impl Catalog {
    pub const ALL: [Catalog; 2] = [Catalog::Track, Catalog::Artist];

    pub fn as_str(&self) -> &'static str {
        match self {
            Catalog::Track => "track",
            Catalog::Artist => "artist",
        }
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Catalog {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "track" | "tracks" => Ok(Catalog::Track),
            "artist" | "artists" => Ok(Catalog::Artist),
            other => Err(anyhow::anyhow!("unknown catalog '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarTracksRequest {
    pub track_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarArtistRequest {
    pub artist_id: String,
}

/// Response body shared by every endpoint: `{"result": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultResponse<T> {
    pub result: Vec<T>,
}

impl<T> ResultResponse<T> {
    pub fn new(result: Vec<T>) -> Self {
        Self { result }
    }

    pub fn empty() -> Self {
        Self { result: Vec::new() }
    }
}

/// A recommended item translated back to its external identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub id: String,
    pub score: f32,
}
