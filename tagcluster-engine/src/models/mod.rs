//! Data model shared by the pipeline stages

mod cluster;
mod track;

pub use cluster::{Cluster, ClusteringResult, QualityMetrics, UNCLASSIFIED};
pub use track::{Track, WorkingTrack};
