//! Clustering engine
//!
//! Partitions feature vectors with k-means and scores the partition.
//!
//! # Components
//! 1. **count_selector** - chooses k (linear or silhouette policy)
//! 2. **kmeans** - seeded Lloyd's algorithm with restarts
//! 3. **metrics** - silhouette, Davies–Bouldin, Calinski–Harabasz

pub mod count_selector;
pub mod kmeans;
pub mod metrics;

pub use count_selector::{linear_cluster_count, ClusterCountSelector, KSelection};
pub use kmeans::{KMeansConfig, KMeansFit};
pub use metrics::compute_metrics;

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use crate::error::{MatchError, MatchResult};
use crate::models::QualityMetrics;

/// Supported clustering strategies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusteringAlgorithm {
    #[default]
    KMeans,
}

impl FromStr for ClusteringAlgorithm {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kmeans" | "k-means" => Ok(ClusteringAlgorithm::KMeans),
            other => Err(MatchError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Labels and quality metrics for one clustering run
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterOutcome {
    /// One label in `[0, k)` per input vector
    pub labels: Vec<usize>,
    pub k: usize,
    pub inertia: f64,
    pub metrics: QualityMetrics,
}

/// Runs k-means with a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct ClusterEngine {
    config: KMeansConfig,
}

impl ClusterEngine {
    pub fn new(config: KMeansConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }

    /// Partition `vectors` into `k` clusters
    ///
    /// Metrics are computed only when `k > 1` and there are more than two
    /// vectors; otherwise they are `None`.
    pub fn cluster(&self, vectors: &[Vec<f64>], k: usize) -> MatchResult<ClusterOutcome> {
        let fit = kmeans::fit(vectors, k, &self.config)?;

        let metrics = if k > 1 && vectors.len() > 2 {
            compute_metrics(vectors, &fit.labels)
        } else {
            QualityMetrics::default()
        };

        debug!(
            k = k,
            inertia = fit.inertia,
            iterations = fit.iterations,
            silhouette = ?metrics.silhouette_score,
            "Clustering complete"
        );

        Ok(ClusterOutcome {
            labels: fit.labels,
            k,
            inertia: fit.inertia,
            metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_algorithm() {
        assert_eq!("kmeans".parse::<ClusteringAlgorithm>().unwrap(), ClusteringAlgorithm::KMeans);
        assert_eq!("K-Means".parse::<ClusteringAlgorithm>().unwrap(), ClusteringAlgorithm::KMeans);
        assert!(matches!(
            "dbscan".parse::<ClusteringAlgorithm>(),
            Err(MatchError::UnsupportedAlgorithm(ref name)) if name == "dbscan"
        ));
    }

    #[test]
    fn test_five_point_example() {
        let vectors: Vec<Vec<f64>> = [[1.0, 1.0], [1.0, 2.0], [2.0, 1.0], [2.0, 2.0], [3.0, 3.0]]
            .iter()
            .map(|p| p.to_vec())
            .collect();

        let k = linear_cluster_count(vectors.len(), 8);
        assert_eq!(k, 2);

        let outcome = ClusterEngine::default().cluster(&vectors, k).unwrap();
        assert_eq!(outcome.labels.len(), 5);
        assert_eq!(outcome.k, 2);
        assert!(outcome.inertia > 0.0 && outcome.inertia.is_finite());
        assert!(outcome.labels.iter().all(|&l| l < 2));

        let silhouette = outcome.metrics.silhouette_score.unwrap();
        assert!((-1.0..=1.0).contains(&silhouette));
        assert!(outcome.metrics.davies_bouldin.unwrap() >= 0.0);
        assert!(outcome.metrics.calinski_harabasz.is_some());
    }

    #[test]
    fn test_metrics_skipped_for_two_points() {
        let vectors = vec![vec![0.0], vec![1.0]];
        let outcome = ClusterEngine::default().cluster(&vectors, 2).unwrap();
        assert_eq!(outcome.metrics, QualityMetrics::default());
    }

    #[test]
    fn test_metrics_skipped_for_single_cluster() {
        let vectors = vec![vec![0.0], vec![1.0], vec![2.0]];
        let outcome = ClusterEngine::default().cluster(&vectors, 1).unwrap();
        assert_eq!(outcome.labels, vec![0, 0, 0]);
        assert_eq!(outcome.metrics, QualityMetrics::default());
    }
}
