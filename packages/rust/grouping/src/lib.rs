//! Semantic keyword grouping for KeywordForge.
//!
//! Embeds keywords into vectors, clusters them with seeded k-means, and
//! names each resulting group after its dominant word. When embedding or
//! clustering fails the grouper degrades to fixed-size chunks rather than
//! failing the batch; the per-group confidence score records which path
//! produced the group.

mod embedding;
mod grouper;
mod kmeans;

pub use embedding::{cosine_similarity, Embedder, EmbeddingError, HashEmbedder};
#[cfg(feature = "embeddings")]
pub use embedding::FastEmbedEmbedder;
pub use grouper::{
    derive_group_name, GroupedCluster, KeywordGrouper, SCORE_FALLBACK, SCORE_SEMANTIC,
    SCORE_SINGLE_GROUP,
};
pub use kmeans::{kmeans, ClusterError};
