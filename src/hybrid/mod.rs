//! Hybrid search: concurrent dense + sparse retrieval, RRF/weighted
//! fusion, and optional semantic reranking.
//!
//! # Architecture
//!
//! - **Configuration and types**: [`config`] (fusion parameters, time and
//!   fan-out budget) and [`types`] (scored chunks, result sets).
//! - **Fusion**: [`fusion`] merges the two raw-ranked lists into one
//!   ordered, deduplicated list.
//! - **Rerank**: [`rerank`] optionally blends a query/content similarity
//!   signal into the fused order.
//! - **Engine**: [`engine`] coordinates concurrent dispatch, failure
//!   isolation, fusion, rerank, thresholding, and truncation.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sagitta::embedding::NoopEmbedder;
//! use sagitta::error::Result;
//! use sagitta::hybrid::config::HybridSearchConfig;
//! use sagitta::hybrid::engine::HybridSearchEngine;
//! use sagitta::lexical::{LexicalEngine, LexicalEngineConfig};
//! use sagitta::query::Query;
//! use sagitta::vector::VectorRetriever;
//!
//! async fn example(vector_backend: Arc<dyn VectorRetriever>) -> Result<()> {
//!     let lexical = Arc::new(LexicalEngine::new(LexicalEngineConfig::default())?);
//!     let engine = HybridSearchEngine::new(
//!         lexical,
//!         vector_backend,
//!         Arc::new(NoopEmbedder::new(384)),
//!         HybridSearchConfig::default(),
//!     )?;
//!
//!     let results = engine.search(&Query::new("rust ownership"), None).await?;
//!     println!("{} results via {}", results.total_results, results.retrieval_method);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod fusion;
pub mod rerank;
pub mod types;

pub use config::{FusionConfig, HybridSearchConfig};
pub use engine::{EngineStats, HybridSearchEngine};
pub use rerank::Reranker;
pub use types::{RetrievalMethod, ScoredChunk, SearchResults};
