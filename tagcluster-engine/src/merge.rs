//! Same-genre cluster merging
//!
//! k-means tends to split one genre across several clusters. The merger
//! folds clusters that share a genre label and overlap enough in tags.
//!
//! Each genre group is processed in a single pass per base: the base is
//! compared using its own tag set as it was before any absorption, so a
//! candidate never benefits from tags another candidate brought in. As a
//! consequence two clusters with the same genre can survive unmerged.

use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::models::Cluster;

/// Default minimum Jaccard similarity for merging
pub const DEFAULT_MERGE_THRESHOLD: f64 = 0.3;

/// `|a ∩ b| / |a ∪ b|`, with two empty sets defined as 0
pub fn jaccard_similarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

/// Merges over-segmented clusters
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterMerger {
    threshold: f64,
}

impl Default for ClusterMerger {
    fn default() -> Self {
        Self::new(DEFAULT_MERGE_THRESHOLD)
    }
}

impl ClusterMerger {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Merge clusters and renumber ids in emission order
    ///
    /// Genre groups are emitted in first-seen order; no track is dropped or
    /// duplicated.
    pub fn merge(&self, clusters: Vec<Cluster>) -> Vec<Cluster> {
        let input_count = clusters.len();

        let mut genre_order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<Cluster>> = HashMap::new();
        for cluster in clusters {
            if !groups.contains_key(&cluster.genre) {
                genre_order.push(cluster.genre.clone());
            }
            groups.entry(cluster.genre.clone()).or_default().push(cluster);
        }

        let mut merged = Vec::with_capacity(input_count);
        for genre in genre_order {
            let Some(group) = groups.remove(&genre) else {
                continue;
            };
            merged.extend(self.merge_group(group));
        }

        for (id, cluster) in merged.iter_mut().enumerate() {
            cluster.id = id;
        }

        debug!(
            before = input_count,
            after = merged.len(),
            threshold = self.threshold,
            "Merged same-genre clusters"
        );
        merged
    }

    fn merge_group(&self, group: Vec<Cluster>) -> Vec<Cluster> {
        let mut remaining = group;
        let mut emitted = Vec::new();

        while !remaining.is_empty() {
            let mut base = remaining.remove(0);
            let base_tags = base.tags.clone();

            let mut kept = Vec::with_capacity(remaining.len());
            for candidate in remaining {
                let similarity = jaccard_similarity(&base_tags, &candidate.tags);
                if similarity >= self.threshold {
                    debug!(
                        genre = %base.genre,
                        similarity = similarity,
                        absorbed_tracks = candidate.tracks.len(),
                        "Absorbing cluster"
                    );
                    base.tracks.extend(candidate.tracks);
                    base.tags.extend(candidate.tags);
                } else {
                    kept.push(candidate);
                }
            }

            emitted.push(base);
            remaining = kept;
        }

        emitted
    }
}
