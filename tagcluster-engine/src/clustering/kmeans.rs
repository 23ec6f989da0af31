//! K-means (Lloyd's algorithm) with k-means++ seeding
//!
//! Every restart draws from a single `StdRng` seeded from the configuration,
//! so identical input always produces identical labels and centroids.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tagcluster_common::config::ClusteringConfig;
use tracing::debug;

use crate::error::{MatchError, MatchResult};

/// K-means run parameters
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansConfig {
    /// Number of independent initializations; lowest inertia wins
    pub restarts: usize,
    /// Maximum assignment/update rounds per restart
    pub max_iterations: usize,
    /// Seed for centroid initialization
    pub seed: u64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            restarts: 10,
            max_iterations: 300,
            seed: 42,
        }
    }
}

impl From<&ClusteringConfig> for KMeansConfig {
    fn from(config: &ClusteringConfig) -> Self {
        Self {
            restarts: config.restarts,
            max_iterations: config.max_iterations,
            seed: config.seed,
        }
    }
}

/// Outcome of a k-means fit
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    /// One label in `[0, k)` per input vector
    pub labels: Vec<usize>,
    pub centroids: Vec<Vec<f64>>,
    /// Sum of squared distances of points to their centroid
    pub inertia: f64,
    /// Iterations used by the winning restart
    pub iterations: usize,
}

pub(crate) fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

pub(crate) fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    squared_distance(a, b).sqrt()
}

/// Index of the nearest centroid; ties go to the lowest index
fn nearest_centroid(vector: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (i, centroid) in centroids.iter().enumerate() {
        let d = squared_distance(vector, centroid);
        if d < best_distance {
            best = i;
            best_distance = d;
        }
    }
    best
}

fn assign(vectors: &[Vec<f64>], centroids: &[Vec<f64>]) -> Vec<usize> {
    vectors
        .iter()
        .map(|v| nearest_centroid(v, centroids))
        .collect()
}

fn inertia(vectors: &[Vec<f64>], centroids: &[Vec<f64>], labels: &[usize]) -> f64 {
    vectors
        .iter()
        .zip(labels)
        .map(|(v, &label)| squared_distance(v, &centroids[label]))
        .sum()
}

/// Recompute centroids as member means; a centroid with no members keeps its
/// previous position
fn update_centroids(vectors: &[Vec<f64>], labels: &[usize], centroids: &mut [Vec<f64>]) {
    let dims = centroids.first().map(Vec::len).unwrap_or(0);
    let mut sums = vec![vec![0.0; dims]; centroids.len()];
    let mut counts = vec![0usize; centroids.len()];

    for (vector, &label) in vectors.iter().zip(labels) {
        counts[label] += 1;
        for (sum, value) in sums[label].iter_mut().zip(vector) {
            *sum += value;
        }
    }

    for ((centroid, sum), count) in centroids.iter_mut().zip(sums).zip(counts) {
        if count > 0 {
            *centroid = sum.into_iter().map(|s| s / count as f64).collect();
        }
    }
}

/// k-means++ seeding: first centroid uniform, the rest weighted by squared
/// distance to the nearest chosen centroid
fn kmeans_plus_plus(vectors: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(vectors[rng.gen_range(0..vectors.len())].clone());

    let mut min_distances: Vec<f64> = vectors
        .iter()
        .map(|v| squared_distance(v, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = min_distances.iter().sum();
        let selected = if total > 0.0 {
            let target = rng.gen::<f64>() * total;
            let mut cumulative = 0.0;
            let mut chosen = vectors.len() - 1;
            for (i, d) in min_distances.iter().enumerate() {
                cumulative += d;
                if cumulative > target {
                    chosen = i;
                    break;
                }
            }
            chosen
        } else {
            // Every point coincides with a chosen centroid
            rng.gen_range(0..vectors.len())
        };

        let centroid = vectors[selected].clone();
        for (d, v) in min_distances.iter_mut().zip(vectors) {
            *d = d.min(squared_distance(v, &centroid));
        }
        centroids.push(centroid);
    }

    centroids
}

fn run_once(
    vectors: &[Vec<f64>],
    k: usize,
    max_iterations: usize,
    rng: &mut StdRng,
) -> KMeansFit {
    let mut centroids = kmeans_plus_plus(vectors, k, rng);
    let mut labels: Vec<usize> = Vec::new();
    let mut iterations = 0;

    while iterations < max_iterations {
        iterations += 1;
        let next = assign(vectors, &centroids);
        if next == labels {
            break;
        }
        labels = next;
        update_centroids(vectors, &labels, &mut centroids);
    }

    let labels = assign(vectors, &centroids);
    let inertia = inertia(vectors, &centroids, &labels);
    KMeansFit {
        labels,
        centroids,
        inertia,
        iterations,
    }
}

/// Fit k-means to `vectors`
///
/// Runs `config.restarts` initializations and keeps the lowest inertia
/// (first one wins on ties).
pub fn fit(vectors: &[Vec<f64>], k: usize, config: &KMeansConfig) -> MatchResult<KMeansFit> {
    if vectors.is_empty() {
        return Err(MatchError::Clustering("Cannot cluster empty dataset".to_string()));
    }
    if k == 0 {
        return Err(MatchError::Clustering("k must be at least 1".to_string()));
    }
    if k > vectors.len() {
        return Err(MatchError::Clustering(format!(
            "k ({}) cannot exceed number of vectors ({})",
            k,
            vectors.len()
        )));
    }

    let dims = vectors[0].len();
    if let Some((i, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != dims) {
        return Err(MatchError::Clustering(format!(
            "Vector {} has {} dimensions, expected {}",
            i,
            v.len(),
            dims
        )));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut best: Option<KMeansFit> = None;

    for restart in 0..config.restarts.max(1) {
        let candidate = run_once(vectors, k, config.max_iterations.max(1), &mut rng);
        debug!(
            restart = restart,
            inertia = candidate.inertia,
            iterations = candidate.iterations,
            "k-means restart finished"
        );
        let better = best
            .as_ref()
            .map_or(true, |current| candidate.inertia < current.inertia);
        if better {
            best = Some(candidate);
        }
    }

    best.ok_or_else(|| MatchError::Clustering("k-means produced no result".to_string()))
}
