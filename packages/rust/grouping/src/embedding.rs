//! Embedding backends for the similarity engine.
//!
//! Keywords are embedded through the [`Embedder`] trait so the clustering
//! code never depends on a concrete model. The default backend is
//! [`HashEmbedder`], a deterministic feature-hash embedder that needs no
//! model download; the `embeddings` feature adds [`FastEmbedEmbedder`]
//! backed by a real sentence-transformer via ONNX.

use sha2::{Digest, Sha256};

/// Error type for embedding operations.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    /// The embedding backend returned no results.
    #[error("embedding returned no results")]
    EmptyResult,

    /// The backend returned a different number of vectors than texts.
    #[error("embedding count mismatch: {expected} texts, {found} vectors")]
    CountMismatch { expected: usize, found: usize },

    /// Model loading or inference failed.
    #[error("embedding model error: {0}")]
    Model(String),
}

/// Trait for embedding text into fixed-length vectors.
///
/// Implementations handle model loading and inference. The grouper treats
/// any error here as a signal to fall back to chunk-based grouping.
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, returning one vector per text.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

// ---------------------------------------------------------------------------
// HashEmbedder — deterministic feature hashing
// ---------------------------------------------------------------------------

/// Deterministic feature-hash embedder.
///
/// Each word and each character trigram of the input hashes to a signed
/// bucket of the output vector; the result is L2-normalized. Keywords that
/// share words or word fragments land near each other, which gives the
/// clusterer usable structure without any model download. Identical input
/// always produces the identical vector.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Weight given to trigram features relative to whole-word features.
    const TRIGRAM_WEIGHT: f32 = 0.5;

    /// Create a hash embedder producing vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(8),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for word in text.to_lowercase().split_whitespace() {
            self.add_feature(&mut vector, word, 1.0);

            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                self.add_feature(&mut vector, &trigram, Self::TRIGRAM_WEIGHT);
            }
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let digest = Sha256::digest(feature.as_bytes());
        let hash = u64::from_le_bytes(digest[..8].try_into().expect("8 digest bytes"));
        let bucket = (hash % self.dimension as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Embedder for HashEmbedder {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}

// ---------------------------------------------------------------------------
// FastEmbedEmbedder — model-backed embedder behind `embeddings` feature
// ---------------------------------------------------------------------------

#[cfg(feature = "embeddings")]
mod fastembed_impl {
    use super::{Embedder, EmbeddingError};
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
    use std::sync::Mutex;

    /// Sentence-transformer embedder backed by fastembed (ONNX Runtime).
    ///
    /// Wraps `fastembed::TextEmbedding` in a `Mutex` because its `embed`
    /// method requires `&mut self`, while the `Embedder` trait uses `&self`.
    pub struct FastEmbedEmbedder {
        model: Mutex<TextEmbedding>,
    }

    impl FastEmbedEmbedder {
        /// Create a new FastEmbedEmbedder with a specific model.
        pub fn new(model: EmbeddingModel) -> Result<Self, EmbeddingError> {
            let options = InitOptions::new(model).with_show_download_progress(false);
            let embedding = TextEmbedding::try_new(options)
                .map_err(|e| EmbeddingError::Model(e.to_string()))?;
            Ok(Self {
                model: Mutex::new(embedding),
            })
        }

        /// Create a new FastEmbedEmbedder with the default model
        /// (all-MiniLM-L6-v2).
        pub fn default_model() -> Result<Self, EmbeddingError> {
            Self::new(EmbeddingModel::AllMiniLML6V2)
        }
    }

    impl Embedder for FastEmbedEmbedder {
        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }
            let mut model = self
                .model
                .lock()
                .map_err(|_| EmbeddingError::Model("embedder mutex poisoned".into()))?;
            let embeddings = model
                .embed(texts.to_vec(), None)
                .map_err(|e| EmbeddingError::Model(e.to_string()))?;
            if embeddings.is_empty() {
                return Err(EmbeddingError::EmptyResult);
            }
            Ok(embeddings)
        }
    }
}

#[cfg(feature = "embeddings")]
pub use fastembed_impl::FastEmbedEmbedder;

/// Cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
