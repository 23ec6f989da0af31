//! Track matching pipeline
//!
//! tracks → tags → vocabulary → vectors → k → k-means → per-label groups →
//! genre per group → merge → result.
//!
//! Tag lookups run strictly one track at a time. A failed lookup degrades
//! that track to an empty tag list and the run continues.

pub mod assembler;

pub use assembler::ResultAssembler;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tagcluster_common::config::ClusteringConfig;
use tracing::{debug, info, warn};

use crate::clustering::{
    ClusterCountSelector, ClusterEngine, ClusteringAlgorithm, KMeansConfig, KSelection,
};
use crate::error::{MatchError, MatchResult};
use crate::features::{vectorize_all, Vocabulary};
use crate::genre::GenreClassifier;
use crate::merge::{ClusterMerger, DEFAULT_MERGE_THRESHOLD};
use crate::models::{Cluster, ClusteringResult, QualityMetrics, Track, WorkingTrack, UNCLASSIFIED};
use crate::tags::TagProvider;

/// Per-invocation clustering controls
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MatchOptions {
    #[serde(default)]
    pub algorithm: ClusteringAlgorithm,
    #[serde(default)]
    pub k_selection: KSelection,
    #[serde(default = "default_merge_threshold")]
    pub merge_threshold: f64,
    #[serde(default = "default_max_clusters")]
    pub max_clusters: usize,
}

fn default_merge_threshold() -> f64 {
    DEFAULT_MERGE_THRESHOLD
}

fn default_max_clusters() -> usize {
    crate::clustering::count_selector::DEFAULT_MAX_CLUSTERS
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            algorithm: ClusteringAlgorithm::default(),
            k_selection: KSelection::default(),
            merge_threshold: default_merge_threshold(),
            max_clusters: default_max_clusters(),
        }
    }
}

impl MatchOptions {
    /// Options seeded from the service configuration
    pub fn from_config(config: &ClusteringConfig) -> Self {
        Self {
            merge_threshold: config.merge_threshold,
            max_clusters: config.max_clusters,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> MatchResult<()> {
        if !(0.0..=1.0).contains(&self.merge_threshold) {
            return Err(MatchError::InvalidInput(format!(
                "merge_threshold must be within [0, 1], got {}",
                self.merge_threshold
            )));
        }
        if self.max_clusters < 2 {
            return Err(MatchError::InvalidInput(format!(
                "max_clusters must be at least 2, got {}",
                self.max_clusters
            )));
        }
        Ok(())
    }
}

/// Split tracks into one group per label, in ascending label order
///
/// Labels that received no track produce no group.
pub fn group_by_label(tracks: Vec<WorkingTrack>, labels: &[usize]) -> Vec<Vec<WorkingTrack>> {
    let group_count = labels.iter().max().map_or(0, |&max| max + 1);
    let mut groups: Vec<Vec<WorkingTrack>> = vec![Vec::new(); group_count];
    for (track, &label) in tracks.into_iter().zip(labels) {
        groups[label].push(track);
    }
    groups.retain(|g| !g.is_empty());
    groups
}

/// Matches tracks to genre-coherent clusters
pub struct TrackMatcher {
    provider: Arc<dyn TagProvider>,
    engine: ClusterEngine,
    classifier: GenreClassifier,
    assembler: ResultAssembler,
}

impl TrackMatcher {
    /// Matcher with the default k-means configuration and genre table
    pub fn new(provider: Arc<dyn TagProvider>) -> Self {
        Self::with_components(provider, ClusterEngine::default(), GenreClassifier::default())
    }

    pub fn with_components(
        provider: Arc<dyn TagProvider>,
        engine: ClusterEngine,
        classifier: GenreClassifier,
    ) -> Self {
        Self {
            provider,
            engine,
            classifier,
            assembler: ResultAssembler,
        }
    }

    /// Matcher using the k-means parameters of the service configuration
    pub fn from_config(provider: Arc<dyn TagProvider>, config: &ClusteringConfig) -> Self {
        Self::with_components(
            provider,
            ClusterEngine::new(KMeansConfig::from(config)),
            GenreClassifier::default(),
        )
    }

    pub fn provider(&self) -> &Arc<dyn TagProvider> {
        &self.provider
    }

    /// Resolve tags for every track, one lookup at a time
    pub async fn fetch_tags(&self, tracks: &[Track]) -> Vec<WorkingTrack> {
        let mut working = Vec::with_capacity(tracks.len());
        for track in tracks {
            let tags = match self.provider.get_tags(&track.artist, &track.name).await {
                Ok(tags) => tags,
                Err(e) => {
                    warn!(
                        provider = self.provider.name(),
                        artist = %track.artist,
                        title = %track.name,
                        error = %e,
                        "Tag lookup failed, continuing with no tags"
                    );
                    Vec::new()
                }
            };
            working.push(WorkingTrack::from_track(track, tags));
        }
        working
    }

    /// Run the full pipeline for one invocation
    pub async fn match_tracks(
        &self,
        tracks: &[Track],
        options: &MatchOptions,
    ) -> MatchResult<ClusteringResult> {
        options.validate()?;

        if tracks.is_empty() {
            debug!("No tracks supplied, returning empty result");
            return Ok(ClusteringResult::empty());
        }

        let working = self.fetch_tags(tracks).await;
        self.cluster_working_tracks(working, options)
    }

    /// Cluster tracks whose tags are already resolved
    pub fn cluster_working_tracks(
        &self,
        working: Vec<WorkingTrack>,
        options: &MatchOptions,
    ) -> MatchResult<ClusteringResult> {
        options.validate()?;
        if working.is_empty() {
            return Ok(ClusteringResult::empty());
        }

        if working.len() < 2 {
            let genre = self.classifier.classify(&working[0].tags);
            debug!(genre = %genre, "Single track, skipping clustering");
            let cluster = Cluster::from_tracks(0, genre, working);
            return Ok(self.assembler.assemble(vec![cluster], QualityMetrics::default()));
        }

        let tag_lists: Vec<Vec<String>> = working.iter().map(|t| t.tags.clone()).collect();
        let vocabulary = Vocabulary::build(&tag_lists);
        if vocabulary.is_empty() {
            warn!(
                tracks = working.len(),
                "No tags collected for any track, returning a single unclassified cluster"
            );
            let cluster = Cluster::from_tracks(0, UNCLASSIFIED, working);
            return Ok(self.assembler.assemble(vec![cluster], QualityMetrics::default()));
        }

        let vectors = vectorize_all(&tag_lists, &vocabulary);
        let selector = ClusterCountSelector::new(options.k_selection, options.max_clusters);
        let k = selector.select(&vectors, self.engine.config())?;
        debug!(
            vocabulary_size = vocabulary.len(),
            policy = ?selector.policy(),
            k = k,
            "Selected cluster count"
        );

        let outcome = self.engine.cluster(&vectors, k)?;
        let track_count = working.len();

        let clusters: Vec<Cluster> = group_by_label(working, &outcome.labels)
            .into_iter()
            .enumerate()
            .map(|(id, tracks)| {
                let raw: Vec<&str> = tracks
                    .iter()
                    .flat_map(|t| t.tags.iter().map(String::as_str))
                    .collect();
                let genre = self.classifier.classify(&raw);
                Cluster::from_tracks(id, genre, tracks)
            })
            .collect();
        let pre_merge = clusters.len();

        let merged = ClusterMerger::new(options.merge_threshold).merge(clusters);

        info!(
            tracks = track_count,
            k = outcome.k,
            inertia = outcome.inertia,
            clusters_before_merge = pre_merge,
            clusters_after_merge = merged.len(),
            silhouette = ?outcome.metrics.silhouette_score,
            "Track matching complete"
        );

        Ok(self.assembler.assemble(merged, outcome.metrics))
    }
}
