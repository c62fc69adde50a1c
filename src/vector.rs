//! Adapter interface to an external vector-similarity backend.
//!
//! The engine consumes a similarity-search capability through the
//! [`VectorRetriever`] trait; it never owns the embedding store itself.
//! `store`/`delete` exist for the ingestion pipeline and are not called on
//! the query path.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chunk::ChunkMetadata;
use crate::error::Result;

/// Typed payload carried alongside every stored vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkPayload {
    /// ID of the document the chunk belongs to.
    pub document_id: String,
    /// Raw chunk text.
    pub content: String,
    /// Display/filter metadata.
    pub metadata: ChunkMetadata,
}

/// A single hit returned by the vector backend, with its raw similarity
/// score (already bounded for cosine distance).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorHit {
    /// Chunk ID.
    pub chunk_id: String,
    /// Raw similarity score.
    pub score: f32,
    /// Stored payload.
    pub payload: ChunkPayload,
}

/// A vector plus payload, as handed to the backend at ingestion time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Chunk ID.
    pub chunk_id: String,
    /// Embedding vector.
    pub vector: Vec<f32>,
    /// Payload to store with the vector.
    pub payload: ChunkPayload,
}

/// Interface to an external similarity-search backend.
#[async_trait]
pub trait VectorRetriever: Send + Sync {
    /// Search for the nearest stored vectors.
    ///
    /// When `document_filter` is supplied, only chunks belonging to the
    /// listed documents are eligible.
    async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
        score_threshold: Option<f32>,
        document_filter: Option<&[String]>,
    ) -> Result<Vec<VectorHit>>;

    /// Store vectors. Ingestion-time operation.
    async fn store(&self, records: Vec<VectorRecord>) -> Result<()>;

    /// Delete all vectors belonging to the given documents. Ingestion-time
    /// operation.
    async fn delete(&self, document_ids: &[String]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_hit_serde() {
        let hit = VectorHit {
            chunk_id: "c1".to_string(),
            score: 0.83,
            payload: ChunkPayload {
                document_id: "d1".to_string(),
                content: "chunk text".to_string(),
                metadata: ChunkMetadata::default(),
            },
        };
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["chunk_id"], "c1");
        assert_eq!(json["payload"]["document_id"], "d1");
    }
}
