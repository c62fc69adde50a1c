//! Hybrid search orchestrator.
//!
//! The single public entry point of the engine: dispatches the vector and
//! lexical branches concurrently, fuses their rankings, optionally reranks,
//! then filters and truncates. Per request the flow is
//! `Dispatch → Fuse → Rerank → Filter/Limit → Done`; failures downgrade
//! rather than abort wherever possible. A branch that errors or exceeds its
//! timeout contributes an empty list; only when both branches fail is the
//! (still well-formed, empty) result tagged as degraded.

use std::sync::Arc;
use std::time::Instant;

use log::{error, warn};
use serde::Serialize;
use tokio::time::timeout;

use crate::embedding::Embedder;
use crate::error::Result;
use crate::hybrid::config::HybridSearchConfig;
use crate::hybrid::fusion::fuse;
use crate::hybrid::rerank::Reranker;
use crate::hybrid::types::{RetrievalMethod, ScoredChunk, SearchResults};
use crate::lexical::engine::{LexicalSearcher, LexicalStats};
use crate::lexical::index::LexicalHit;
use crate::query::Query;
use crate::vector::{VectorHit, VectorRetriever};

/// Combined engine statistics, for diagnostics endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    /// Lexical index statistics.
    pub lexical: LexicalStats,
    /// Whether the hybrid path (both branches) is wired up.
    pub hybrid_enabled: bool,
}

/// The hybrid retrieval and ranking engine.
pub struct HybridSearchEngine {
    lexical: Arc<dyn LexicalSearcher>,
    vector: Arc<dyn VectorRetriever>,
    embedder: Arc<dyn Embedder>,
    reranker: Reranker,
    config: HybridSearchConfig,
}

impl HybridSearchEngine {
    /// Create an engine from its collaborators.
    pub fn new(
        lexical: Arc<dyn LexicalSearcher>,
        vector: Arc<dyn VectorRetriever>,
        embedder: Arc<dyn Embedder>,
        config: HybridSearchConfig,
    ) -> Result<Self> {
        config.fusion.validate()?;
        let reranker = Reranker::new(
            Arc::clone(&embedder),
            config.embed_timeout,
            config.rerank_concurrency,
        );
        Ok(HybridSearchEngine {
            lexical,
            vector,
            embedder,
            reranker,
            config,
        })
    }

    /// Execute a hybrid search.
    ///
    /// Both retrieval branches run concurrently, each under an independent
    /// timeout. The fused (and optionally reranked) list is filtered by the
    /// stricter of the query threshold and the configured score threshold,
    /// applied to the fusion score, then truncated to the smaller of the
    /// query limit and `max_results`.
    pub async fn search(
        &self,
        query: &Query,
        document_filter: Option<&[String]>,
    ) -> Result<SearchResults> {
        query.validate()?;
        let start = Instant::now();
        let fetch_limit = self.config.fusion.max_results.max(query.limit);
        let branch_budget = self.config.branch_timeout.min(self.config.request_deadline);

        let (vector_branch, lexical_branch) = tokio::join!(
            timeout(
                branch_budget,
                self.vector_search(&query.text, fetch_limit, document_filter),
            ),
            timeout(
                branch_budget,
                self.lexical.search(&query.text, fetch_limit, document_filter),
            ),
        );

        let vector_hits = match vector_branch {
            Ok(Ok(hits)) => Some(hits),
            Ok(Err(e)) => {
                error!("vector branch failed: {e}");
                None
            }
            Err(_) => {
                error!("vector branch timed out after {branch_budget:?}");
                None
            }
        };
        let lexical_hits = match lexical_branch {
            Ok(Ok(hits)) => Some(hits),
            Ok(Err(e)) => {
                error!("lexical branch failed: {e}");
                None
            }
            Err(_) => {
                error!("lexical branch timed out after {branch_budget:?}");
                None
            }
        };

        if vector_hits.is_none() && lexical_hits.is_none() {
            error!("both retrieval branches failed; returning degraded empty result");
            let mut results = SearchResults::empty(RetrievalMethod::Degraded);
            results.search_time = start.elapsed().as_secs_f64();
            return Ok(results);
        }

        let method = Self::contributing_method(&vector_hits, &lexical_hits);
        let vector_hits = vector_hits.unwrap_or_default();
        let lexical_hits = lexical_hits.unwrap_or_default();

        let fused = fuse(&vector_hits, &lexical_hits, &self.config.fusion);

        let ranked = if self.config.fusion.enable_rerank && !fused.is_empty() {
            let remaining = self
                .config
                .request_deadline
                .saturating_sub(start.elapsed());
            match timeout(remaining, self.reranker.rerank(&query.text, fused.clone())).await {
                Ok(reranked) => reranked,
                Err(_) => {
                    warn!("request deadline hit during rerank; keeping fused order");
                    fused
                }
            }
        } else {
            fused
        };

        let chunks = self.filter_and_limit(ranked, query);
        Ok(SearchResults::new(
            chunks,
            start.elapsed().as_secs_f64(),
            method,
        ))
    }

    /// Vector-only search: the dense branch's raw ranking, no fusion or
    /// rerank. Diagnostics path; branch failure yields an empty result.
    pub async fn search_vector_only(
        &self,
        query: &Query,
        document_filter: Option<&[String]>,
    ) -> Result<SearchResults> {
        query.validate()?;
        let start = Instant::now();

        let hits = match self
            .vector_search(&query.text, query.limit, document_filter)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                error!("vector-only search failed: {e}");
                Vec::new()
            }
        };

        let chunks = hits
            .iter()
            .enumerate()
            .map(|(i, hit)| Self::chunk_from_vector(hit, i + 1))
            .collect();
        Ok(SearchResults::new(
            chunks,
            start.elapsed().as_secs_f64(),
            RetrievalMethod::Vector,
        ))
    }

    /// BM25-only search: the sparse branch's raw ranking, no fusion or
    /// rerank. Diagnostics path; branch failure yields an empty result.
    pub async fn search_bm25_only(
        &self,
        query: &Query,
        document_filter: Option<&[String]>,
    ) -> Result<SearchResults> {
        query.validate()?;
        let start = Instant::now();

        let hits = match self
            .lexical
            .search(&query.text, query.limit, document_filter)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                error!("bm25-only search failed: {e}");
                Vec::new()
            }
        };

        let chunks = hits
            .iter()
            .enumerate()
            .map(|(i, hit)| Self::chunk_from_lexical(hit, i + 1))
            .collect();
        Ok(SearchResults::new(
            chunks,
            start.elapsed().as_secs_f64(),
            RetrievalMethod::Bm25,
        ))
    }

    /// Current engine statistics.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            lexical: self.lexical.stats(),
            hybrid_enabled: true,
        }
    }

    /// Embed the query and run the dense branch.
    async fn vector_search(
        &self,
        query_text: &str,
        limit: usize,
        document_filter: Option<&[String]>,
    ) -> Result<Vec<VectorHit>> {
        let query_vector = self.embedder.embed(query_text).await?;
        self.vector
            .search(&query_vector, limit, None, document_filter)
            .await
    }

    fn contributing_method(
        vector_hits: &Option<Vec<VectorHit>>,
        lexical_hits: &Option<Vec<LexicalHit>>,
    ) -> RetrievalMethod {
        let vector_contributed = vector_hits.as_ref().is_some_and(|h| !h.is_empty());
        let lexical_contributed = lexical_hits.as_ref().is_some_and(|h| !h.is_empty());
        match (vector_contributed, lexical_contributed) {
            (true, false) => RetrievalMethod::Vector,
            (false, true) => RetrievalMethod::Bm25,
            // Both contributed, or a soft miss on both live branches.
            _ => RetrievalMethod::Hybrid,
        }
    }

    fn filter_and_limit(&self, mut chunks: Vec<ScoredChunk>, query: &Query) -> Vec<ScoredChunk> {
        // The cutoff keys on the fusion score even after reranking; the
        // rerank pass reorders but never disqualifies a candidate whose
        // fused relevance clears the threshold.
        let threshold = self.config.fusion.min_score_threshold.max(query.threshold);
        chunks.retain(|chunk| chunk.fusion_score >= threshold);
        chunks.truncate(query.limit.min(self.config.fusion.max_results));
        chunks
    }

    fn chunk_from_vector(hit: &VectorHit, rank: usize) -> ScoredChunk {
        let mut chunk = ScoredChunk::new(
            hit.chunk_id.clone(),
            hit.payload.document_id.clone(),
            hit.payload.content.clone(),
        );
        chunk.metadata = hit.payload.metadata.clone();
        chunk.vector_score = Some(hit.score);
        chunk.vector_rank = Some(rank);
        chunk.fusion_score = hit.score;
        chunk
    }

    fn chunk_from_lexical(hit: &LexicalHit, rank: usize) -> ScoredChunk {
        let mut chunk = ScoredChunk::new(
            hit.chunk_id.clone(),
            hit.document_id.clone(),
            hit.content.clone(),
        );
        chunk.metadata = hit.metadata.clone();
        chunk.bm25_score = Some(hit.score);
        chunk.bm25_rank = Some(rank);
        chunk.matched_terms = hit.matched_terms.clone();
        chunk.fusion_score = hit.score;
        chunk
    }
}
