//! HTTP API handlers for tagcluster-engine

pub mod cluster;
pub mod health;
pub mod tags;

pub use cluster::cluster_routes;
pub use health::health_routes;
pub use tags::tag_routes;

use axum::{routing::get, Router};

use crate::AppState;

/// GET /
pub async fn root() -> &'static str {
    "tagcluster-engine"
}

pub fn root_routes() -> Router<AppState> {
    Router::new().route("/", get(root))
}
