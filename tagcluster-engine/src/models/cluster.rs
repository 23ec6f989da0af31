//! Cluster and result types

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::WorkingTrack;

/// Genre label used when no tag maps to a canonical genre
pub const UNCLASSIFIED: &str = "unclassified";

/// A group of tracks sharing a genre label
///
/// `id` is assigned at emission and is not stable across merging.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Cluster {
    pub id: usize,
    pub genre: String,
    /// Lowercase tags of every member track (serialized sorted)
    pub tags: BTreeSet<String>,
    pub tracks: Vec<WorkingTrack>,
}

impl Cluster {
    /// Build a cluster from member tracks, collecting their lowercase tags
    pub fn from_tracks(id: usize, genre: impl Into<String>, tracks: Vec<WorkingTrack>) -> Self {
        let tags = tracks
            .iter()
            .flat_map(|t| t.tags.iter())
            .map(|tag| tag.to_lowercase())
            .collect();
        Self {
            id,
            genre: genre.into(),
            tags,
            tracks,
        }
    }

    /// Number of member tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Clustering quality metrics
///
/// Each is `None` when clustering did not produce a partition the metric is
/// defined for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct QualityMetrics {
    pub silhouette_score: Option<f64>,
    pub davies_bouldin: Option<f64>,
    pub calinski_harabasz: Option<f64>,
}

/// Final output of one matching invocation
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClusteringResult {
    pub clusters: Vec<Cluster>,
    pub silhouette_score: Option<f64>,
    pub davies_bouldin: Option<f64>,
    pub calinski_harabasz: Option<f64>,
}

impl ClusteringResult {
    /// Result for an empty input: no clusters, no metrics
    pub fn empty() -> Self {
        Self {
            clusters: Vec::new(),
            silhouette_score: None,
            davies_bouldin: None,
            calinski_harabasz: None,
        }
    }

    /// Total number of tracks across all clusters
    pub fn track_count(&self) -> usize {
        self.clusters.iter().map(Cluster::len).sum()
    }
}
