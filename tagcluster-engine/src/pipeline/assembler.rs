//! Result assembly

use crate::models::{Cluster, ClusteringResult, QualityMetrics};

/// Packages merged clusters and quality metrics into the caller-facing result
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAssembler;

impl ResultAssembler {
    pub fn assemble(&self, clusters: Vec<Cluster>, metrics: QualityMetrics) -> ClusteringResult {
        ClusteringResult {
            clusters,
            silhouette_score: metrics.silhouette_score,
            davies_bouldin: metrics.davies_bouldin,
            calinski_harabasz: metrics.calinski_harabasz,
        }
    }
}
