//! Cluster count selection

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use super::kmeans::{self, KMeansConfig};
use super::metrics::silhouette_score;
use crate::error::{MatchError, MatchResult};

/// Smallest number of clusters ever requested
pub const MIN_CLUSTERS: usize = 2;

/// Default upper bound on the number of clusters
pub const DEFAULT_MAX_CLUSTERS: usize = 8;

/// Policy for choosing k
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KSelection {
    /// `clamp(n / 3, 2, max)`
    #[default]
    Linear,
    /// Best silhouette over `[2, min(max, n - 1)]`
    Silhouette,
}

impl FromStr for KSelection {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linear" => Ok(KSelection::Linear),
            "silhouette" => Ok(KSelection::Silhouette),
            other => Err(MatchError::InvalidInput(format!(
                "Unknown k selection policy: {}",
                other
            ))),
        }
    }
}

/// Linear policy: one cluster per three tracks, bounded to `[2, max_clusters]`
pub fn linear_cluster_count(track_count: usize, max_clusters: usize) -> usize {
    (track_count / 3).clamp(MIN_CLUSTERS, max_clusters.max(MIN_CLUSTERS))
}

/// Decides how many clusters to request
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterCountSelector {
    policy: KSelection,
    max_clusters: usize,
}

impl Default for ClusterCountSelector {
    fn default() -> Self {
        Self::new(KSelection::Linear, DEFAULT_MAX_CLUSTERS)
    }
}

impl ClusterCountSelector {
    pub fn new(policy: KSelection, max_clusters: usize) -> Self {
        Self {
            policy,
            max_clusters: max_clusters.max(MIN_CLUSTERS),
        }
    }

    pub fn policy(&self) -> KSelection {
        self.policy
    }

    /// Choose k for `vectors`
    ///
    /// Callers handle fewer than 2 tracks before getting here.
    pub fn select(&self, vectors: &[Vec<f64>], config: &KMeansConfig) -> MatchResult<usize> {
        let n = vectors.len();
        match self.policy {
            KSelection::Linear => Ok(linear_cluster_count(n, self.max_clusters)),
            KSelection::Silhouette => self.select_by_silhouette(vectors, config),
        }
    }

    /// Scan k upwards and keep the first k with the highest silhouette
    ///
    /// Falls back to the linear policy when the range is empty or no k
    /// yields a defined silhouette.
    fn select_by_silhouette(
        &self,
        vectors: &[Vec<f64>],
        config: &KMeansConfig,
    ) -> MatchResult<usize> {
        let n = vectors.len();
        let upper = self.max_clusters.min(n.saturating_sub(1));

        let mut best: Option<(usize, f64)> = None;
        for k in MIN_CLUSTERS..=upper {
            let fit = kmeans::fit(vectors, k, config)?;
            let Some(score) = silhouette_score(vectors, &fit.labels) else {
                debug!(k = k, "Silhouette undefined, skipping");
                continue;
            };
            debug!(k = k, silhouette = score, "Scored cluster count");
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((k, score));
            }
        }

        Ok(best
            .map(|(k, _)| k)
            .unwrap_or_else(|| linear_cluster_count(n, self.max_clusters)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_policy_bounds() {
        assert_eq!(linear_cluster_count(2, 8), 2);
        assert_eq!(linear_cluster_count(5, 8), 2);
        assert_eq!(linear_cluster_count(9, 8), 3);
        assert_eq!(linear_cluster_count(24, 8), 8);
        assert_eq!(linear_cluster_count(300, 8), 8);
        assert_eq!(linear_cluster_count(300, 5), 5);
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!("Linear".parse::<KSelection>().unwrap(), KSelection::Linear);
        assert_eq!(" silhouette ".parse::<KSelection>().unwrap(), KSelection::Silhouette);
        assert!(matches!(
            "elbow".parse::<KSelection>(),
            Err(MatchError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_silhouette_policy_finds_three_groups() {
        let vectors: Vec<Vec<f64>> = [
            [0.0, 0.0],
            [0.0, 0.2],
            [0.2, 0.0],
            [10.0, 0.0],
            [10.0, 0.2],
            [10.2, 0.0],
            [0.0, 10.0],
            [0.2, 10.0],
            [0.0, 10.2],
        ]
        .iter()
        .map(|p| p.to_vec())
        .collect();

        let selector = ClusterCountSelector::new(KSelection::Silhouette, 8);
        let k = selector.select(&vectors, &KMeansConfig::default()).unwrap();
        assert_eq!(k, 3);
    }

    #[test]
    fn test_silhouette_policy_falls_back_on_tiny_input() {
        let vectors = vec![vec![0.0], vec![1.0]];
        let selector = ClusterCountSelector::new(KSelection::Silhouette, 8);
        let k = selector.select(&vectors, &KMeansConfig::default()).unwrap();
        assert_eq!(k, linear_cluster_count(2, 8));
    }
}
