//! POST /cluster

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::clustering::{ClusteringAlgorithm, KSelection};
use crate::error::{ApiError, ApiResult, MatchError};
use crate::models::{ClusteringResult, Track};
use crate::pipeline::MatchOptions;
use crate::AppState;

/// Request body for POST /cluster
///
/// Every field is optional at the serde level so that a missing
/// `track_metadata` is reported as 400 in the API error format.
#[derive(Debug, Default, Deserialize)]
pub struct ClusterRequest {
    #[serde(default)]
    pub track_metadata: Option<Vec<TrackMetadata>>,
    #[serde(default)]
    pub algorithm: Option<String>,
    #[serde(default)]
    pub k_selection: Option<String>,
    #[serde(default)]
    pub merge_threshold: Option<f64>,
    #[serde(default)]
    pub max_clusters: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrackMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
}

impl ClusterRequest {
    /// Options for this request layered over the service defaults
    ///
    /// The algorithm is checked first so an unsupported strategy fails
    /// before anything else is looked at.
    pub fn options(&self, defaults: &MatchOptions) -> Result<MatchOptions, ApiError> {
        let algorithm = match &self.algorithm {
            Some(name) => name.parse::<ClusteringAlgorithm>()?,
            None => defaults.algorithm,
        };
        let k_selection = match &self.k_selection {
            Some(name) => name.parse::<KSelection>()?,
            None => defaults.k_selection,
        };
        let options = MatchOptions {
            algorithm,
            k_selection,
            merge_threshold: self.merge_threshold.unwrap_or(defaults.merge_threshold),
            max_clusters: self.max_clusters.unwrap_or(defaults.max_clusters),
        };
        options.validate()?;
        Ok(options)
    }

    /// Validated track list; every entry needs a non-empty name and artist
    pub fn tracks(&self) -> Result<Vec<Track>, ApiError> {
        let metadata = self
            .track_metadata
            .as_ref()
            .ok_or_else(|| ApiError::BadRequest("track_metadata is required".to_string()))?;

        metadata
            .iter()
            .enumerate()
            .map(|(i, entry)| -> Result<Track, ApiError> {
                let name = required_field(entry.name.as_deref(), i, "name")?;
                let artist = required_field(entry.artist.as_deref(), i, "artist")?;
                let track = Track::new(name, artist);
                Ok(match &entry.genres {
                    Some(genres) => track.with_genres(genres.clone()),
                    None => track,
                })
            })
            .collect()
    }
}

fn required_field<'a>(value: Option<&'a str>, index: usize, field: &str) -> Result<&'a str, ApiError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::BadRequest(format!(
            "track_metadata[{}] is missing '{}'",
            index, field
        ))),
    }
}

/// POST /cluster
pub async fn cluster_tracks(
    State(state): State<AppState>,
    payload: Result<Json<ClusterRequest>, JsonRejection>,
) -> ApiResult<Json<ClusteringResult>> {
    let result = run_cluster(&state, payload).await;
    if let Err(e) = &result {
        warn!(error = %e, "Cluster request failed");
        state.record_error(e.to_string()).await;
    }
    result.map(Json)
}

async fn run_cluster(
    state: &AppState,
    payload: Result<Json<ClusterRequest>, JsonRejection>,
) -> ApiResult<ClusteringResult> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let options = request.options(&state.default_options)?;
    let tracks = request.tracks()?;

    let matcher = state.matcher.as_ref().ok_or_else(|| {
        MatchError::MissingConfiguration("Last.fm API key is not configured".to_string())
    })?;

    info!(tracks = tracks.len(), k_selection = ?options.k_selection, "Clustering tracks");
    let result = matcher.match_tracks(&tracks, &options).await?;
    Ok(result)
}

pub fn cluster_routes() -> Router<AppState> {
    Router::new().route("/cluster", post(cluster_tracks))
}
