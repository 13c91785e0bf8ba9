//! Keyword grouping: semantic clusters with a chunk-based fallback.
//!
//! The grouper never fails. When the embedding backend or the clusterer
//! reports an error, the keywords are split into fixed-size chunks instead
//! and the lower confidence score records which path produced each group.

use std::collections::HashMap;

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::embedding::{cosine_similarity, Embedder, EmbeddingError};
use crate::kmeans::{kmeans, ClusterError};

/// Confidence score for a batch too small to cluster (one group).
pub const SCORE_SINGLE_GROUP: f64 = 1.0;
/// Confidence score for groups produced by semantic clustering.
pub const SCORE_SEMANTIC: f64 = 0.8;
/// Confidence score for groups produced by the chunk fallback.
pub const SCORE_FALLBACK: f64 = 0.5;

/// Fixed RNG seed so clustering is reproducible across runs.
const CLUSTER_SEED: u64 = 42;
/// Minimum chunk size used by the fallback path.
const MIN_FALLBACK_CHUNK: usize = 3;

/// One named group of keywords with a confidence score in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedCluster {
    pub name: String,
    pub keywords: Vec<String>,
    pub score: f64,
}

#[derive(Debug, thiserror::Error)]
enum GroupingError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error(transparent)]
    Cluster(#[from] ClusterError),
}

/// Groups keywords into semantically related clusters.
///
/// Embeddings are memoized per keyword set, so regenerating groups for the
/// same batch within one process does not re-run the embedder.
pub struct KeywordGrouper {
    embedder: Box<dyn Embedder>,
    max_groups: usize,
    memo: DashMap<String, Vec<Vec<f32>>>,
}

impl KeywordGrouper {
    /// Create a grouper over the given embedding backend. `max_groups`
    /// caps how many clusters a single batch can produce.
    pub fn new(embedder: Box<dyn Embedder>, max_groups: usize) -> Self {
        Self {
            embedder,
            max_groups: max_groups.max(1),
            memo: DashMap::new(),
        }
    }

    /// Group keywords into named clusters.
    ///
    /// Every input keyword lands in exactly one returned group. Batches of
    /// three or fewer keywords form a single group at full confidence;
    /// larger batches are clustered over their embeddings, falling back to
    /// chunking when the embedder or clusterer fails.
    pub fn group(&self, keywords: &[String]) -> Vec<GroupedCluster> {
        let n = keywords.len();
        if n == 0 {
            return Vec::new();
        }

        let k = self.cluster_count(n);
        if k <= 1 {
            return vec![GroupedCluster {
                name: derive_group_name(keywords),
                keywords: keywords.to_vec(),
                score: SCORE_SINGLE_GROUP,
            }];
        }

        match self.semantic_clusters(keywords, k) {
            Ok(clusters) => clusters,
            Err(err) => {
                warn!(error = %err, "semantic grouping failed, using chunk fallback");
                fallback_chunks(keywords)
            }
        }
    }

    /// Target cluster count: one cluster per three keywords, capped by the
    /// configured maximum.
    fn cluster_count(&self, n: usize) -> usize {
        self.max_groups.min((n / 3).max(1))
    }

    fn semantic_clusters(
        &self,
        keywords: &[String],
        k: usize,
    ) -> Result<Vec<GroupedCluster>, GroupingError> {
        let vectors = self.embed_cached(keywords)?;
        let assignments = kmeans(&vectors, k, CLUSTER_SEED)?;

        let mut buckets: Vec<Vec<String>> = vec![Vec::new(); k];
        for (i, keyword) in keywords.iter().enumerate() {
            buckets[assignments[i]].push(keyword.clone());
        }

        let cohesion = mean_intra_cluster_cosine(&vectors, &assignments, k);
        debug!(clusters = k, cohesion, "clustered keywords");

        Ok(buckets
            .into_iter()
            .filter(|bucket| !bucket.is_empty())
            .map(|bucket| GroupedCluster {
                name: derive_group_name(&bucket),
                keywords: bucket,
                score: SCORE_SEMANTIC,
            })
            .collect())
    }

    fn embed_cached(&self, keywords: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let key = memo_key(keywords);
        if let Some(hit) = self.memo.get(&key) {
            return Ok(hit.clone());
        }

        let texts: Vec<&str> = keywords.iter().map(String::as_str).collect();
        let vectors = self.embedder.embed_batch(&texts)?;
        if vectors.len() != keywords.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: keywords.len(),
                found: vectors.len(),
            });
        }
        self.memo.insert(key, vectors.clone());
        Ok(vectors)
    }
}

/// Split keywords into fixed-size chunks, one group per chunk.
fn fallback_chunks(keywords: &[String]) -> Vec<GroupedCluster> {
    let chunk_size = MIN_FALLBACK_CHUNK.max(keywords.len() / 5);
    keywords
        .chunks(chunk_size)
        .map(|chunk| GroupedCluster {
            name: derive_group_name(chunk),
            keywords: chunk.to_vec(),
            score: SCORE_FALLBACK,
        })
        .collect()
}

/// Name a group after its most frequent word longer than two characters,
/// as "{word} related". A single-keyword group is named after the keyword
/// itself; a group with no qualifying words becomes "{first keyword} group".
/// Frequency ties go to the word seen first.
pub fn derive_group_name(keywords: &[String]) -> String {
    let Some(first) = keywords.first() else {
        return String::from("unnamed group");
    };
    if keywords.len() == 1 {
        return first.clone();
    }

    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    let mut position = 0usize;
    for keyword in keywords {
        for word in keyword.split_whitespace() {
            if word.chars().count() > 2 {
                let entry = counts.entry(word).or_insert((0, position));
                entry.0 += 1;
            }
            position += 1;
        }
    }

    let best = counts
        .into_iter()
        .max_by_key(|&(_, (count, first_seen))| (count, std::cmp::Reverse(first_seen)))
        .map(|(word, _)| word);

    match best {
        Some(word) => format!("{word} related"),
        None => format!("{first} group"),
    }
}

fn memo_key(keywords: &[String]) -> String {
    let mut hasher = Sha256::new();
    for keyword in keywords {
        hasher.update(keyword.as_bytes());
        hasher.update([0x1f]);
    }
    format!("{:x}", hasher.finalize())
}

/// Mean cosine similarity of each vector to its cluster centroid. Purely
/// diagnostic; logged at debug level after clustering.
fn mean_intra_cluster_cosine(vectors: &[Vec<f32>], assignments: &[usize], k: usize) -> f64 {
    if vectors.is_empty() {
        return 0.0;
    }
    let dim = vectors[0].len();
    let mut sums = vec![vec![0.0f32; dim]; k];
    let mut counts = vec![0usize; k];
    for (vector, &cluster) in vectors.iter().zip(assignments.iter()) {
        counts[cluster] += 1;
        for (s, v) in sums[cluster].iter_mut().zip(vector.iter()) {
            *s += v;
        }
    }
    for (sum, &count) in sums.iter_mut().zip(counts.iter()) {
        if count > 0 {
            for value in sum.iter_mut() {
                *value /= count as f32;
            }
        }
    }

    let total: f64 = vectors
        .iter()
        .zip(assignments.iter())
        .map(|(vector, &cluster)| f64::from(cosine_similarity(vector, &sums[cluster])))
        .sum();
    total / vectors.len() as f64
}
