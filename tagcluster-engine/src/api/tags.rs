//! GET /tags

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ApiError, ApiResult, MatchError};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TagQuery {
    pub artist: Option<String>,
    pub track: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub artist: String,
    pub track: String,
    pub provider: String,
    pub tags: Vec<String>,
}

/// GET /tags?artist=..&track=..
///
/// Unlike the clustering pipeline, a failed lookup is surfaced to the caller.
pub async fn get_tags(
    State(state): State<AppState>,
    Query(query): Query<TagQuery>,
) -> ApiResult<Json<TagResponse>> {
    let artist = non_empty(query.artist, "artist")?;
    let track = non_empty(query.track, "track")?;

    let matcher = state.matcher.as_ref().ok_or_else(|| {
        MatchError::MissingConfiguration("Last.fm API key is not configured".to_string())
    })?;
    let provider = matcher.provider();

    match provider.get_tags(&artist, &track).await {
        Ok(tags) => Ok(Json(TagResponse {
            artist,
            track,
            provider: provider.name().to_string(),
            tags,
        })),
        Err(e) => {
            warn!(artist = %artist, track = %track, error = %e, "Tag lookup failed");
            state.record_error(e.to_string()).await;
            Err(ApiError::Upstream(e))
        }
    }
}

fn non_empty(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("query parameter '{}' is required", name)))
}

pub fn tag_routes() -> Router<AppState> {
    Router::new().route("/tags", get(get_tags))
}
