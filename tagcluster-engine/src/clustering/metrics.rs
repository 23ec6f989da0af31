//! Unsupervised clustering quality metrics
//!
//! All metrics use Euclidean distance and accept arbitrary (possibly
//! non-contiguous) label values. Each returns `None` unless the labelling
//! has between 2 and n-1 distinct clusters.

use std::collections::BTreeMap;

use super::kmeans::{euclidean_distance, squared_distance};
use crate::models::QualityMetrics;

/// Members grouped per distinct label, in ascending label order
struct Partition<'a> {
    groups: Vec<Vec<&'a [f64]>>,
    /// Position of each point's group in `groups`
    membership: Vec<usize>,
}

impl<'a> Partition<'a> {
    fn new(vectors: &'a [Vec<f64>], labels: &[usize]) -> Option<Self> {
        if vectors.len() != labels.len() || vectors.is_empty() {
            return None;
        }

        let mut positions: BTreeMap<usize, usize> = BTreeMap::new();
        for &label in labels {
            let next = positions.len();
            positions.entry(label).or_insert(next);
        }
        // Re-number in ascending label order
        for (i, position) in positions.values_mut().enumerate() {
            *position = i;
        }

        let cluster_count = positions.len();
        if cluster_count < 2 || cluster_count >= vectors.len() {
            return None;
        }

        let mut groups = vec![Vec::new(); cluster_count];
        let mut membership = Vec::with_capacity(labels.len());
        for (vector, label) in vectors.iter().zip(labels) {
            let position = positions[label];
            groups[position].push(vector.as_slice());
            membership.push(position);
        }

        Some(Self { groups, membership })
    }

    fn cluster_count(&self) -> usize {
        self.groups.len()
    }

    fn centroids(&self) -> Vec<Vec<f64>> {
        self.groups.iter().map(|members| mean(members)).collect()
    }
}

fn mean(members: &[&[f64]]) -> Vec<f64> {
    let dims = members.first().map(|m| m.len()).unwrap_or(0);
    let mut centroid = vec![0.0; dims];
    for member in members {
        for (c, value) in centroid.iter_mut().zip(member.iter()) {
            *c += value;
        }
    }
    let n = members.len().max(1) as f64;
    centroid.iter_mut().for_each(|c| *c /= n);
    centroid
}

/// Mean silhouette coefficient, in `[-1, 1]` (higher is better)
///
/// Points in singleton clusters contribute 0.
pub fn silhouette_score(vectors: &[Vec<f64>], labels: &[usize]) -> Option<f64> {
    let partition = Partition::new(vectors, labels)?;
    let n = vectors.len();

    let mut total = 0.0;
    for (i, vector) in vectors.iter().enumerate() {
        let own = partition.membership[i];
        if partition.groups[own].len() <= 1 {
            continue;
        }

        let mut a = 0.0;
        let mut b = f64::INFINITY;
        for (position, members) in partition.groups.iter().enumerate() {
            let sum: f64 = members
                .iter()
                .map(|other| euclidean_distance(vector, other))
                .sum();
            if position == own {
                // Distance to itself is zero, so only the count needs adjusting
                a = sum / (members.len() - 1) as f64;
            } else {
                b = b.min(sum / members.len() as f64);
            }
        }

        let denominator = a.max(b);
        if denominator > 0.0 {
            total += (b - a) / denominator;
        }
    }

    Some(total / n as f64)
}

/// Davies–Bouldin index, non-negative (lower is better)
pub fn davies_bouldin_index(vectors: &[Vec<f64>], labels: &[usize]) -> Option<f64> {
    let partition = Partition::new(vectors, labels)?;
    let centroids = partition.centroids();

    let scatter: Vec<f64> = partition
        .groups
        .iter()
        .zip(&centroids)
        .map(|(members, centroid)| {
            members
                .iter()
                .map(|m| euclidean_distance(m, centroid))
                .sum::<f64>()
                / members.len() as f64
        })
        .collect();

    let k = partition.cluster_count();
    let mut separations = vec![vec![0.0; k]; k];
    for i in 0..k {
        for j in 0..k {
            separations[i][j] = euclidean_distance(&centroids[i], &centroids[j]);
        }
    }

    let all_compact = scatter.iter().all(|&s| s == 0.0);
    let all_coincident = separations.iter().flatten().all(|&d| d == 0.0);
    if all_compact || all_coincident {
        return Some(0.0);
    }

    let total: f64 = (0..k)
        .map(|i| {
            (0..k)
                .filter(|&j| j != i)
                .map(|j| {
                    let d = separations[i][j];
                    if d == 0.0 {
                        0.0
                    } else {
                        (scatter[i] + scatter[j]) / d
                    }
                })
                .fold(0.0, f64::max)
        })
        .sum();

    Some(total / k as f64)
}

/// Calinski–Harabasz index (variance ratio criterion), higher is better
pub fn calinski_harabasz_index(vectors: &[Vec<f64>], labels: &[usize]) -> Option<f64> {
    let partition = Partition::new(vectors, labels)?;
    let n = vectors.len() as f64;
    let k = partition.cluster_count() as f64;

    let all: Vec<&[f64]> = vectors.iter().map(Vec::as_slice).collect();
    let overall = mean(&all);
    let centroids = partition.centroids();

    let mut between = 0.0;
    let mut within = 0.0;
    for (members, centroid) in partition.groups.iter().zip(&centroids) {
        between += members.len() as f64 * squared_distance(centroid, &overall);
        within += members
            .iter()
            .map(|m| squared_distance(m, centroid))
            .sum::<f64>();
    }

    if within == 0.0 {
        return Some(1.0);
    }
    Some(between * (n - k) / (within * (k - 1.0)))
}

/// Compute all three metrics for a labelling
pub fn compute_metrics(vectors: &[Vec<f64>], labels: &[usize]) -> QualityMetrics {
    QualityMetrics {
        silhouette_score: silhouette_score(vectors, labels),
        davies_bouldin: davies_bouldin_index(vectors, labels),
        calinski_harabasz: calinski_harabasz_index(vectors, labels),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(raw: &[[f64; 2]]) -> Vec<Vec<f64>> {
        raw.iter().map(|p| p.to_vec()).collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_silhouette_hand_computed() {
        // Clusters {0, 1} and {4, 5} on a line
        let vectors = vec![vec![0.0], vec![1.0], vec![4.0], vec![5.0]];
        let labels = vec![0, 0, 1, 1];

        // Point 0: a = 1, b = (4 + 5) / 2 = 4.5 -> 3.5 / 4.5
        // Point 1: a = 1, b = (3 + 4) / 2 = 3.5 -> 2.5 / 3.5
        // Symmetric for the other cluster
        let expected = (3.5 / 4.5 + 2.5 / 3.5) / 2.0;
        assert_close(silhouette_score(&vectors, &labels).unwrap(), expected);
    }

    #[test]
    fn test_silhouette_in_range() {
        let vectors = points(&[[1.0, 1.0], [1.0, 2.0], [2.0, 1.0], [2.0, 2.0], [3.0, 3.0]]);
        let labels = vec![0, 0, 1, 1, 1];
        let score = silhouette_score(&vectors, &labels).unwrap();
        assert!((-1.0..=1.0).contains(&score));
    }

    #[test]
    fn test_singleton_cluster_contributes_zero() {
        let vectors = vec![vec![0.0], vec![1.0], vec![10.0]];
        let labels = vec![0, 0, 1];
        // Points 0 and 1: a = 1, b = 10 and 9
        let expected = ((10.0 - 1.0) / 10.0 + (9.0 - 1.0) / 9.0) / 3.0;
        assert_close(silhouette_score(&vectors, &labels).unwrap(), expected);
    }

    #[test]
    fn test_davies_bouldin_hand_computed() {
        let vectors = vec![vec![0.0], vec![2.0], vec![10.0], vec![12.0]];
        let labels = vec![0, 0, 1, 1];
        // Scatter 1.0 each, centroids 1 and 11 -> (1 + 1) / 10
        assert_close(davies_bouldin_index(&vectors, &labels).unwrap(), 0.2);
    }

    #[test]
    fn test_calinski_harabasz_hand_computed() {
        let vectors = vec![vec![0.0], vec![2.0], vec![10.0], vec![12.0]];
        let labels = vec![0, 0, 1, 1];
        // Overall mean 6; between = 2*25 + 2*25 = 100; within = 4
        // (100 / 1) / (4 / 2) = 50
        assert_close(calinski_harabasz_index(&vectors, &labels).unwrap(), 50.0);
    }

    #[test]
    fn test_zero_within_dispersion() {
        let vectors = vec![vec![0.0], vec![0.0], vec![5.0]];
        let labels = vec![0, 0, 1];
        assert_eq!(calinski_harabasz_index(&vectors, &labels), Some(1.0));
        assert_eq!(davies_bouldin_index(&vectors, &labels), Some(0.0));
    }

    #[test]
    fn test_undefined_for_degenerate_labellings() {
        let vectors = vec![vec![0.0], vec![1.0], vec![2.0]];
        let metrics = compute_metrics(&vectors, &[0, 0, 0]);
        assert_eq!(metrics, QualityMetrics::default());

        let metrics = compute_metrics(&vectors, &[0, 1, 2]);
        assert_eq!(metrics, QualityMetrics::default());
    }

    #[test]
    fn test_non_contiguous_labels() {
        let vectors = vec![vec![0.0], vec![1.0], vec![4.0], vec![5.0]];
        let contiguous = compute_metrics(&vectors, &[0, 0, 1, 1]);
        let sparse = compute_metrics(&vectors, &[3, 3, 7, 7]);
        assert_eq!(contiguous, sparse);
    }
}
