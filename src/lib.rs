//! # Sagitta
//!
//! A hybrid retrieval and ranking engine for Rust.
//!
//! Given a query, Sagitta concurrently gathers candidate text chunks from a
//! dense (vector-similarity) retriever and a sparse (lexical/BM25)
//! retriever, merges the two ranked lists with Reciprocal Rank Fusion
//! blended with normalized raw scores, and optionally applies a semantic
//! reranking pass.
//!
//! ## Features
//!
//! - Deterministic fusion of heterogeneous rankings with stable tie-breaks
//! - Partial-failure tolerance across two independent retrieval backends
//! - Latency-bounded fan-out/fan-in with per-branch and per-request budgets
//! - Atomically-published BM25 index with full-rebuild semantics and
//!   checksummed persistence
//! - Pluggable vector backend and embedding provider traits

pub mod analysis;
pub mod chunk;
pub mod embedding;
pub mod error;
pub mod hybrid;
pub mod lexical;
pub mod query;
pub mod vector;

pub use chunk::{ChunkMetadata, IndexedChunk};
pub use error::{Result, SagittaError};
pub use hybrid::{
    FusionConfig, HybridSearchConfig, HybridSearchEngine, RetrievalMethod, ScoredChunk,
    SearchResults,
};
pub use lexical::{LexicalEngine, LexicalEngineConfig, LexicalHit, LexicalSearcher};
pub use query::Query;
pub use vector::{ChunkPayload, VectorHit, VectorRecord, VectorRetriever};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
