//! Seeded k-means clustering over embedding vectors.
//!
//! Small, dependency-free Lloyd's algorithm with k-means++ seeding. The
//! caller supplies the RNG seed, so the same input always produces the
//! same clusters.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Maximum Lloyd iterations before giving up on convergence.
const MAX_ITERATIONS: usize = 100;

/// Error type for clustering operations.
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    /// No vectors were supplied.
    #[error("cannot cluster an empty set of vectors")]
    EmptyInput,

    /// The requested cluster count is zero or exceeds the point count.
    #[error("invalid cluster count {k} for {n} vectors")]
    InvalidK { k: usize, n: usize },

    /// Input vectors do not all share the same dimension.
    #[error("vector dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}

/// Cluster `vectors` into `k` groups, returning one cluster index per vector.
///
/// Uses k-means++ initialization and runs Lloyd iterations until the
/// assignments stabilize or [`MAX_ITERATIONS`] is reached. Clusters that
/// empty out mid-run are reseeded to the point currently farthest from its
/// centroid, so every returned index is in `0..k` and every cluster holds
/// at least one point.
pub fn kmeans(vectors: &[Vec<f32>], k: usize, seed: u64) -> Result<Vec<usize>, ClusterError> {
    if vectors.is_empty() {
        return Err(ClusterError::EmptyInput);
    }
    let n = vectors.len();
    if k == 0 || k > n {
        return Err(ClusterError::InvalidK { k, n });
    }
    let dim = vectors[0].len();
    for vector in vectors {
        if vector.len() != dim {
            return Err(ClusterError::DimensionMismatch {
                expected: dim,
                found: vector.len(),
            });
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut centroids = init_plus_plus(vectors, k, &mut rng);
    let mut assignments = vec![0usize; n];

    for _ in 0..MAX_ITERATIONS {
        let mut changed = false;
        for (i, vector) in vectors.iter().enumerate() {
            let nearest = nearest_centroid(vector, &centroids);
            if assignments[i] != nearest {
                assignments[i] = nearest;
                changed = true;
            }
        }

        // Recompute centroids as cluster means.
        let mut sums = vec![vec![0.0f32; dim]; k];
        let mut counts = vec![0usize; k];
        for (i, vector) in vectors.iter().enumerate() {
            let cluster = assignments[i];
            counts[cluster] += 1;
            for (s, v) in sums[cluster].iter_mut().zip(vector.iter()) {
                *s += v;
            }
        }
        for cluster in 0..k {
            if counts[cluster] == 0 {
                // Reseed an empty cluster to the point farthest from its
                // current centroid.
                let farthest = farthest_point(vectors, &assignments, &centroids);
                centroids[cluster] = vectors[farthest].clone();
                assignments[farthest] = cluster;
                changed = true;
            } else {
                for (c, s) in centroids[cluster].iter_mut().zip(sums[cluster].iter()) {
                    *c = s / counts[cluster] as f32;
                }
            }
        }

        if !changed {
            break;
        }
    }

    Ok(assignments)
}

/// k-means++ seeding: the first centroid is uniform random, each later one
/// is drawn with probability proportional to its squared distance from the
/// nearest centroid chosen so far.
fn init_plus_plus(vectors: &[Vec<f32>], k: usize, rng: &mut StdRng) -> Vec<Vec<f32>> {
    let n = vectors.len();
    let mut centroids: Vec<Vec<f32>> = Vec::with_capacity(k);
    centroids.push(vectors[rng.gen_range(0..n)].clone());

    while centroids.len() < k {
        let distances: Vec<f64> = vectors
            .iter()
            .map(|vector| {
                centroids
                    .iter()
                    .map(|c| squared_distance(vector, c) as f64)
                    .fold(f64::INFINITY, f64::min)
            })
            .collect();
        let total: f64 = distances.iter().sum();
        if total <= 0.0 {
            // All points coincide with existing centroids; any pick works.
            centroids.push(vectors[rng.gen_range(0..n)].clone());
            continue;
        }
        let mut target = rng.r#gen::<f64>() * total;
        let mut chosen = n - 1;
        for (i, d) in distances.iter().enumerate() {
            target -= d;
            if target <= 0.0 {
                chosen = i;
                break;
            }
        }
        centroids.push(vectors[chosen].clone());
    }
    centroids
}

fn nearest_centroid(vector: &[f32], centroids: &[Vec<f32>]) -> usize {
    let mut best = 0;
    let mut best_dist = f32::INFINITY;
    for (i, centroid) in centroids.iter().enumerate() {
        let dist = squared_distance(vector, centroid);
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }
    best
}

fn farthest_point(vectors: &[Vec<f32>], assignments: &[usize], centroids: &[Vec<f32>]) -> usize {
    let mut worst = 0;
    let mut worst_dist = -1.0f32;
    for (i, vector) in vectors.iter().enumerate() {
        let dist = squared_distance(vector, &centroids[assignments[i]]);
        if dist > worst_dist {
            worst_dist = dist;
            worst = i;
        }
    }
    worst
}

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}
