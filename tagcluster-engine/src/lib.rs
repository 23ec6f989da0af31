//! tagcluster-engine library interface
//!
//! Groups music tracks into genre-coherent clusters from community tags.
//! The HTTP layer in `api` is a thin wrapper around `pipeline::TrackMatcher`.

pub mod api;
pub mod clustering;
pub mod config;
pub mod error;
pub mod features;
pub mod genre;
pub mod merge;
pub mod models;
pub mod pipeline;
pub mod tags;

pub use crate::error::{ApiError, ApiResult, MatchError, MatchResult};
pub use crate::pipeline::{MatchOptions, TrackMatcher};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Configured matcher; `None` when no API credential was resolved
    pub matcher: Option<Arc<TrackMatcher>>,
    /// Defaults applied to request options that are not supplied
    pub default_options: MatchOptions,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(matcher: Option<Arc<TrackMatcher>>, default_options: MatchOptions) -> Self {
        Self {
            matcher,
            default_options,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Remember the most recent failure for the health endpoint
    pub async fn record_error(&self, message: impl Into<String>) {
        *self.last_error.write().await = Some(message.into());
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::root_routes())
        .merge(api::cluster_routes())
        .merge(api::tag_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
