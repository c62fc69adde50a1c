//! Types and data structures for hybrid search results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chunk::ChunkMetadata;

/// Which retrieval source(s) actually contributed to a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMethod {
    /// Only the dense (vector) branch contributed.
    Vector,
    /// Only the sparse (BM25) branch contributed.
    Bm25,
    /// Both branches were consulted.
    Hybrid,
    /// Both branches failed; the (empty) result is degraded, not an error.
    Degraded,
}

impl fmt::Display for RetrievalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RetrievalMethod::Vector => "vector",
            RetrievalMethod::Bm25 => "bm25",
            RetrievalMethod::Hybrid => "hybrid",
            RetrievalMethod::Degraded => "degraded",
        };
        f.write_str(name)
    }
}

/// A fused (and optionally reranked) candidate chunk.
///
/// Fields absent from one retrieval source are typed absences, never
/// errors: a chunk seen only by the vector branch has `bm25_score: None`,
/// `bm25_rank: None`, and a zero BM25 contribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// Chunk ID, unique within one fused result.
    pub id: String,
    /// ID of the document the chunk belongs to.
    pub document_id: String,
    /// Raw chunk text.
    pub content: String,
    /// Raw similarity score from the vector branch.
    pub vector_score: Option<f32>,
    /// Raw BM25 score from the lexical branch.
    pub bm25_score: Option<f32>,
    /// 1-based rank in the vector branch result list.
    pub vector_rank: Option<usize>,
    /// 1-based rank in the lexical branch result list.
    pub bm25_rank: Option<usize>,
    /// Summed reciprocal-rank contribution across both sources.
    pub rrf_score: f32,
    /// Weighted raw-score contribution.
    pub weighted_score: f32,
    /// Blended fusion score used for ordering.
    pub fusion_score: f32,
    /// Rerank score, when the rerank pass ran for this chunk.
    pub rerank_score: Option<f32>,
    /// Cosine similarity between query and content embeddings.
    pub semantic_similarity: Option<f32>,
    /// Query terms matched by the lexical branch, for highlighting.
    pub matched_terms: Vec<String>,
    /// Display/filter metadata.
    pub metadata: ChunkMetadata,
}

impl ScoredChunk {
    /// Create a chunk with no per-source signals yet.
    pub fn new(
        id: impl Into<String>,
        document_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        ScoredChunk {
            id: id.into(),
            document_id: document_id.into(),
            content: content.into(),
            vector_score: None,
            bm25_score: None,
            vector_rank: None,
            bm25_rank: None,
            rrf_score: 0.0,
            weighted_score: 0.0,
            fusion_score: 0.0,
            rerank_score: None,
            semantic_similarity: None,
            matched_terms: Vec::new(),
            metadata: ChunkMetadata::default(),
        }
    }

    /// The effective ordering score: rerank score when present, fusion
    /// score otherwise.
    pub fn score(&self) -> f32 {
        self.rerank_score.unwrap_or(self.fusion_score)
    }
}

/// An ordered, deduplicated hybrid search result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    /// Chunks ordered by effective score (descending).
    pub chunks: Vec<ScoredChunk>,
    /// Number of chunks returned.
    pub total_results: usize,
    /// Wall-clock search time in seconds.
    pub search_time: f64,
    /// Which source(s) contributed.
    pub retrieval_method: RetrievalMethod,
}

impl SearchResults {
    /// Create a result set; `total_results` tracks the chunk count.
    pub fn new(chunks: Vec<ScoredChunk>, search_time: f64, method: RetrievalMethod) -> Self {
        let total_results = chunks.len();
        SearchResults {
            chunks,
            total_results,
            search_time,
            retrieval_method: method,
        }
    }

    /// An empty result set.
    pub fn empty(method: RetrievalMethod) -> Self {
        SearchResults::new(Vec::new(), 0.0, method)
    }

    /// Number of returned chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the result set is empty.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// The best-scoring chunk.
    pub fn best_result(&self) -> Option<&ScoredChunk> {
        self.chunks.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scored_chunk_defaults_are_typed_absences() {
        let chunk = ScoredChunk::new("c1", "d1", "text");
        assert_eq!(chunk.vector_score, None);
        assert_eq!(chunk.bm25_rank, None);
        assert_eq!(chunk.rrf_score, 0.0);
        assert_eq!(chunk.score(), 0.0);
    }

    #[test]
    fn test_effective_score_prefers_rerank() {
        let mut chunk = ScoredChunk::new("c1", "d1", "text");
        chunk.fusion_score = 0.4;
        assert_eq!(chunk.score(), 0.4);
        chunk.rerank_score = Some(0.9);
        assert_eq!(chunk.score(), 0.9);
    }

    #[test]
    fn test_retrieval_method_serialization() {
        assert_eq!(
            serde_json::to_string(&RetrievalMethod::Hybrid).unwrap(),
            "\"hybrid\""
        );
        assert_eq!(
            serde_json::to_string(&RetrievalMethod::Bm25).unwrap(),
            "\"bm25\""
        );
        assert_eq!(RetrievalMethod::Degraded.to_string(), "degraded");
    }

    #[test]
    fn test_search_results_wire_shape() {
        let mut chunk = ScoredChunk::new("c1", "d1", "...");
        chunk.fusion_score = 0.83;
        let results = SearchResults::new(vec![chunk], 0.042, RetrievalMethod::Hybrid);

        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json["total_results"], 1);
        assert_eq!(json["retrieval_method"], "hybrid");
        assert_eq!(json["chunks"][0]["id"], "c1");
        assert_eq!(json["chunks"][0]["document_id"], "d1");
        assert!(json["search_time"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_empty_results() {
        let results = SearchResults::empty(RetrievalMethod::Degraded);
        assert!(results.is_empty());
        assert_eq!(results.total_results, 0);
        assert!(results.best_result().is_none());
    }
}
