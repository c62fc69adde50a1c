//! Text embedding support.
//!
//! Sagitta does not ship a model; it consumes an embedding provider through
//! the [`Embedder`] trait, used both to embed queries and, during
//! reranking, candidate content. Implementations must return a zero vector
//! (not an error) for empty input text so downstream similarity math never
//! divides by an undefined norm.

use async_trait::async_trait;

use crate::error::Result;

/// Interface to an external embedding provider.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text into a vector of [`dimension`](Embedder::dimension)
    /// components.
    ///
    /// Empty or whitespace-only input yields a zero vector by convention.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts. The default implementation embeds
    /// sequentially; providers with a batch endpoint should override it.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Fixed dimension of the produced vectors.
    fn dimension(&self) -> usize;
}

/// An embedder that returns zero vectors for all input.
///
/// Useful for tests and for running the engine lexical-only.
#[derive(Debug, Clone)]
pub struct NoopEmbedder {
    dimension: usize,
}

impl NoopEmbedder {
    /// Create a no-op embedder producing vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        NoopEmbedder { dimension }
    }
}

#[async_trait]
impl Embedder for NoopEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![0.0; self.dimension])
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 when either vector has zero norm or the lengths differ, so a
/// zero vector (the empty-input convention) contributes no signal.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}
