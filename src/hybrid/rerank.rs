//! Semantic reranking of fused results.
//!
//! A second pass that blends a direct query/content similarity signal into
//! the fused ranking. The pass is a pure reordering: it never adds or
//! removes chunk IDs. Embedding failures are isolated per candidate — a
//! chunk whose embedding call fails or times out keeps its fusion score.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use log::warn;
use tokio::time::timeout;

use crate::embedding::{Embedder, cosine_similarity};
use crate::hybrid::types::ScoredChunk;

/// Blend factor for the fusion score in the rerank score.
const FUSION_BLEND: f32 = 0.7;

/// Blend factor for the semantic similarity in the rerank score.
const SIMILARITY_BLEND: f32 = 0.3;

/// Reranker with bounded embedding fan-out and per-call timeouts.
pub struct Reranker {
    embedder: Arc<dyn Embedder>,
    embed_timeout: Duration,
    concurrency: usize,
}

impl Reranker {
    /// Create a reranker.
    pub fn new(embedder: Arc<dyn Embedder>, embed_timeout: Duration, concurrency: usize) -> Self {
        Reranker {
            embedder,
            embed_timeout,
            concurrency: concurrency.max(1),
        }
    }

    /// Reorder `chunks` by `0.7 * fusion_score + 0.3 * cosine_similarity`.
    ///
    /// The query is embedded once; candidate embeddings are issued
    /// concurrently up to the configured fan-out, each under its own
    /// timeout. If the query embedding itself fails, the fused order is
    /// returned unchanged.
    pub async fn rerank(&self, query_text: &str, mut chunks: Vec<ScoredChunk>) -> Vec<ScoredChunk> {
        if chunks.is_empty() {
            return chunks;
        }

        let query_vector = match timeout(self.embed_timeout, self.embedder.embed(query_text)).await
        {
            Ok(Ok(vector)) => vector,
            Ok(Err(e)) => {
                warn!("rerank skipped: query embedding failed: {e}");
                return chunks;
            }
            Err(_) => {
                warn!("rerank skipped: query embedding timed out");
                return chunks;
            }
        };

        let embed_timeout = self.embed_timeout;
        let embeddings: Vec<Option<Vec<f32>>> = futures::stream::iter(chunks.iter().map(|chunk| {
            let embedder = Arc::clone(&self.embedder);
            let content = chunk.content.clone();
            let chunk_id = chunk.id.clone();
            async move {
                match timeout(embed_timeout, embedder.embed(&content)).await {
                    Ok(Ok(vector)) => Some(vector),
                    Ok(Err(e)) => {
                        warn!("rerank embedding failed for chunk {chunk_id}: {e}");
                        None
                    }
                    Err(_) => {
                        warn!("rerank embedding timed out for chunk {chunk_id}");
                        None
                    }
                }
            }
        }))
        .buffered(self.concurrency)
        .collect()
        .await;

        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            match embedding {
                Some(vector) => {
                    let similarity = cosine_similarity(&query_vector, &vector);
                    chunk.semantic_similarity = Some(similarity);
                    chunk.rerank_score =
                        Some(FUSION_BLEND * chunk.fusion_score + SIMILARITY_BLEND * similarity);
                }
                // Failed candidates keep their fusion-order position.
                None => {
                    chunk.rerank_score = Some(chunk.fusion_score);
                }
            }
        }

        chunks.sort_by(|a, b| {
            b.score()
                .partial_cmp(&a.score())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        chunks
    }
}
