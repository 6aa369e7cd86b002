//! HTTP surface over the recommendation service.

use crate::utils::validation::{validate_n, validate_similar_artist_request, validate_similar_tracks_request};
use crate::{AppState, Catalog, RecommendationItem, ResultResponse, SimilarArtistRequest, SimilarTracksRequest};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::collections::HashMap;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

#[derive(Debug, Deserialize)]
struct RecommendationQuery {
    n: Option<usize>,
}

async fn health_check(State(state): State<AppState>) -> Json<HashMap<String, String>> {
    let service = &state.recommendation_service;
    let mut status = HashMap::new();
    status.insert("status".to_string(), "healthy".to_string());
    status.insert("service".to_string(), "songrec".to_string());
    for catalog in Catalog::ALL {
        status.insert(format!("{}_model", catalog), service.is_ready(catalog).to_string());
    }

    Json(status)
}

// Failures here are logged and answered with an empty result, so clients
// always get a well-formed body.
async fn recommend_similar_tracks(
    State(state): State<AppState>,
    Json(request): Json<SimilarTracksRequest>,
) -> Json<ResultResponse<String>> {
    let service = &state.recommendation_service;
    if let Err(e) = validate_similar_tracks_request(&request, service.config()) {
        warn!("Rejected similar-tracks request: {}", e);
        return Json(ResultResponse::empty());
    }

    match service.similar_to_many(Catalog::Track, &request.track_ids, service.config().similar_tracks_n) {
        Ok(tracks) => Json(ResultResponse::new(tracks)),
        Err(e) => {
            warn!("Similar-tracks query failed: {:#}", e);
            Json(ResultResponse::empty())
        }
    }
}

async fn recommend_similar_artists(
    State(state): State<AppState>,
    Json(request): Json<SimilarArtistRequest>,
) -> Json<ResultResponse<String>> {
    let service = &state.recommendation_service;
    if let Err(e) = validate_similar_artist_request(&request) {
        warn!("Rejected similar-artists request: {}", e);
        return Json(ResultResponse::empty());
    }

    match service.similar_to_one(Catalog::Artist, &request.artist_id, service.config().similar_artists_n) {
        Ok(artists) => Json(ResultResponse::new(artists)),
        Err(e) => {
            warn!("Similar-artists query failed: {:#}", e);
            Json(ResultResponse::empty())
        }
    }
}

async fn get_user_recommendations(
    State(state): State<AppState>,
    Path((user_id, catalog)): Path<(usize, String)>,
    Query(params): Query<RecommendationQuery>,
) -> Result<Json<ResultResponse<RecommendationItem>>, StatusCode> {
    let service = &state.recommendation_service;
    let catalog: Catalog = catalog.parse().map_err(|_| StatusCode::NOT_FOUND)?;
    let n = params.n.unwrap_or(service.config().default_n);
    if let Err(e) = validate_n(n, service.config()) {
        warn!("Rejected recommendation request: {}", e);
        return Err(StatusCode::BAD_REQUEST);
    }

    match service.recommend_for_user(catalog, user_id, n) {
        Ok(items) => Ok(Json(ResultResponse::new(items))),
        Err(e) => {
            warn!("Recommendations for user {} failed: {:#}", user_id, e);
            Ok(Json(ResultResponse::empty()))
        }
    }
}

async fn retrain(State(state): State<AppState>, Path(catalog): Path<String>) -> StatusCode {
    let Ok(catalog) = catalog.parse::<Catalog>() else {
        return StatusCode::NOT_FOUND;
    };

    tokio::spawn(async move {
        if let Err(e) = state.train_catalog(catalog).await {
            error!("Retraining {} model failed: {:#}", catalog, e);
        }
    });

    StatusCode::ACCEPTED
}

async fn get_stats(State(state): State<AppState>) -> Json<HashMap<String, u64>> {
    Json(state.recommendation_service.stats())
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/recommend-similar-tracks", post(recommend_similar_tracks))
        .route("/recommend-similar-artists", post(recommend_similar_artists))
        .route("/users/:user_id/recommendations/:catalog", get(get_user_recommendations))
        .route("/retrain/:catalog", post(retrain))
        .route("/stats", get(get_stats))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
