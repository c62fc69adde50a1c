//! Lexical search engine: snapshot publication, writer serialization, and
//! CPU offload.
//!
//! The engine owns one published [`LexicalSnapshot`] behind an atomic
//! reference swap: readers clone the current `Arc` and score against a
//! fully-built index, while rebuilds construct a replacement off to the
//! side on a bounded worker pool and publish it in a single swap. Writers
//! are serialized against each other; readers never wait on a rebuild.

use std::path::PathBuf;
use std::sync::Arc;

use ahash::AHashSet;
use async_trait::async_trait;
use log::{error, info, warn};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::{Mutex, oneshot};

use crate::analysis::analyze;
use crate::chunk::IndexedChunk;
use crate::error::{Result, SagittaError};
use crate::lexical::index::{LexicalHit, LexicalSnapshot};
use crate::lexical::store::IndexStore;

/// Read-side interface to the lexical index, the seam the orchestrator
/// dispatches through.
#[async_trait]
pub trait LexicalSearcher: Send + Sync {
    /// Tokenize the query text and score it against the indexed corpus.
    async fn search(
        &self,
        query_text: &str,
        limit: usize,
        document_filter: Option<&[String]>,
    ) -> Result<Vec<LexicalHit>>;

    /// Current index statistics.
    fn stats(&self) -> LexicalStats;
}

/// Statistics about the current lexical index.
#[derive(Debug, Clone, Serialize)]
pub struct LexicalStats {
    /// Number of indexed chunks.
    pub chunk_count: usize,
    /// Total tokens across the corpus.
    pub total_tokens: u64,
    /// Whether a persisted index file exists.
    pub persisted: bool,
}

/// Configuration for [`LexicalEngine`].
#[derive(Debug, Clone)]
pub struct LexicalEngineConfig {
    /// Size of the worker pool for tokenization, scoring, and rebuilds.
    /// Bounds achievable parallelism; saturated work queues rather than
    /// spawning unbounded concurrency.
    pub worker_threads: usize,
    /// Where to persist the index. `None` disables persistence.
    pub index_path: Option<PathBuf>,
}

impl Default for LexicalEngineConfig {
    fn default() -> Self {
        LexicalEngineConfig {
            worker_threads: num_cpus::get(),
            index_path: None,
        }
    }
}

/// The lexical (BM25) retrieval engine.
pub struct LexicalEngine {
    snapshot: RwLock<Arc<LexicalSnapshot>>,
    // Serializes build/add/remove; a single rebuild is in flight at a time.
    writer: Mutex<()>,
    pool: rayon::ThreadPool,
    store: Option<IndexStore>,
}

impl LexicalEngine {
    /// Create an engine, recovering any persisted index.
    ///
    /// A missing or corrupt persisted index is not fatal; the engine starts
    /// empty with a logged warning.
    pub fn new(config: LexicalEngineConfig) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .build()
            .map_err(|e| {
                SagittaError::invalid_operation(format!("failed to create worker pool: {e}"))
            })?;

        let store = config.index_path.map(IndexStore::new);
        let snapshot = match &store {
            Some(store) => store.load()?.unwrap_or_else(LexicalSnapshot::empty),
            None => LexicalSnapshot::empty(),
        };

        Ok(LexicalEngine {
            snapshot: RwLock::new(Arc::new(snapshot)),
            writer: Mutex::new(()),
            pool,
            store,
        })
    }

    /// The currently-published snapshot.
    fn current(&self) -> Arc<LexicalSnapshot> {
        self.snapshot.read().clone()
    }

    /// Run a CPU-bound closure on the worker pool.
    async fn offload<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.pool.spawn(move || {
            let _ = tx.send(f());
        });
        rx.await
            .map_err(|_| SagittaError::invalid_operation("lexical worker dropped its result"))
    }

    /// Build a fresh snapshot from `corpus` and publish it.
    ///
    /// Caller must hold the writer lock.
    async fn rebuild(&self, corpus: Vec<IndexedChunk>) -> Result<()> {
        let count = corpus.len();
        let snapshot = Arc::new(self.offload(move || LexicalSnapshot::build(corpus)).await?);

        *self.snapshot.write() = Arc::clone(&snapshot);
        info!("published rebuilt lexical index ({count} chunks)");

        if let Some(store) = self.store.clone() {
            // Persistence failure keeps the in-memory index live.
            let saved = self.offload(move || store.save(&snapshot)).await?;
            if let Err(e) = saved {
                error!("failed to persist lexical index: {e}");
            }
        }
        Ok(())
    }

    /// Replace the whole index with a new corpus.
    pub async fn build_index(&self, chunks: Vec<IndexedChunk>) -> Result<()> {
        let _guard = self.writer.lock().await;
        self.rebuild(chunks).await
    }

    /// Append chunks to the corpus and rebuild.
    ///
    /// BM25 statistics are corpus-global, so this is a full rebuild, not an
    /// incremental patch.
    pub async fn add_chunks(&self, chunks: Vec<IndexedChunk>) -> Result<()> {
        let _guard = self.writer.lock().await;
        let mut corpus = self.current().corpus();
        corpus.extend(chunks);
        self.rebuild(corpus).await
    }

    /// Remove every chunk belonging to the given documents and rebuild.
    ///
    /// Returns the number of chunks removed; removing nothing skips the
    /// rebuild.
    pub async fn remove_chunks(&self, document_ids: &[String]) -> Result<usize> {
        let _guard = self.writer.lock().await;

        let removed_ids: AHashSet<&String> = document_ids.iter().collect();
        let corpus = self.current().corpus();
        let before = corpus.len();
        let corpus: Vec<IndexedChunk> = corpus
            .into_iter()
            .filter(|chunk| !removed_ids.contains(&chunk.document_id))
            .collect();
        let removed = before - corpus.len();

        if removed > 0 {
            self.rebuild(corpus).await?;
            info!("removed {removed} chunks from lexical index");
        }
        Ok(removed)
    }
}

#[async_trait]
impl LexicalSearcher for LexicalEngine {
    async fn search(
        &self,
        query_text: &str,
        limit: usize,
        document_filter: Option<&[String]>,
    ) -> Result<Vec<LexicalHit>> {
        let snapshot = self.current();
        if snapshot.is_empty() {
            warn!("lexical index is empty; returning no hits");
            return Ok(Vec::new());
        }

        let text = query_text.to_string();
        let filter: Option<AHashSet<String>> =
            document_filter.map(|ids| ids.iter().cloned().collect());

        self.offload(move || {
            let tokens = analyze(&text);
            snapshot.search(&tokens, limit, filter.as_ref())
        })
        .await
    }

    fn stats(&self) -> LexicalStats {
        let snapshot = self.current();
        LexicalStats {
            chunk_count: snapshot.len(),
            total_tokens: snapshot.total_tokens(),
            persisted: self.store.as_ref().is_some_and(|s| s.exists()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> LexicalEngine {
        LexicalEngine::new(LexicalEngineConfig {
            worker_threads: 2,
            index_path: None,
        })
        .unwrap()
    }

    fn corpus() -> Vec<IndexedChunk> {
        vec![
            IndexedChunk::new("c1", "d1", "rust ownership model"),
            IndexedChunk::new("c2", "d2", "tokio async runtime"),
            IndexedChunk::new("c3", "d2", "rust async await syntax"),
        ]
    }

    #[tokio::test]
    async fn test_search_before_build_is_soft() {
        let engine = engine();
        let hits = engine.search("rust", 10, None).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_build_and_search() {
        let engine = engine();
        engine.build_index(corpus()).await.unwrap();

        let hits = engine.search("rust async", 10, None).await.unwrap();
        assert_eq!(hits.len(), 3);
        // c3 matches both terms.
        assert_eq!(hits[0].chunk_id, "c3");
    }

    #[tokio::test]
    async fn test_add_chunks_rebuilds() {
        let engine = engine();
        engine.build_index(corpus()).await.unwrap();
        engine
            .add_chunks(vec![IndexedChunk::new("c4", "d3", "rust macros explained")])
            .await
            .unwrap();

        let hits = engine.search("macros", 10, None).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk_id, "c4");
        assert_eq!(engine.stats().chunk_count, 4);
    }

    #[tokio::test]
    async fn test_remove_chunks() {
        let engine = engine();
        engine.build_index(corpus()).await.unwrap();

        let removed = engine.remove_chunks(&["d2".to_string()]).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(engine.stats().chunk_count, 1);

        let hits = engine.search("tokio", 10, None).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_remove_nothing_skips_rebuild() {
        let engine = engine();
        engine.build_index(corpus()).await.unwrap();
        let removed = engine.remove_chunks(&["d9".to_string()]).await.unwrap();
        assert_eq!(removed, 0);
        assert_eq!(engine.stats().chunk_count, 3);
    }

    #[tokio::test]
    async fn test_document_filter() {
        let engine = engine();
        engine.build_index(corpus()).await.unwrap();

        let filter = vec!["d1".to_string()];
        let hits = engine.search("rust", 10, Some(&filter)).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document_id, "d1");
    }

    #[tokio::test]
    async fn test_persistence_across_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexical.idx");

        let config = LexicalEngineConfig {
            worker_threads: 2,
            index_path: Some(path.clone()),
        };

        let engine = LexicalEngine::new(config.clone()).unwrap();
        engine.build_index(corpus()).await.unwrap();
        assert!(engine.stats().persisted);
        drop(engine);

        let restarted = LexicalEngine::new(config).unwrap();
        assert_eq!(restarted.stats().chunk_count, 3);
        let hits = restarted.search("tokio", 10, None).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_persisted_index_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexical.idx");
        std::fs::write(&path, b"garbage").unwrap();

        let engine = LexicalEngine::new(LexicalEngineConfig {
            worker_threads: 2,
            index_path: Some(path),
        })
        .unwrap();
        assert_eq!(engine.stats().chunk_count, 0);
    }

    #[tokio::test]
    async fn test_concurrent_reads_during_rebuild() {
        let engine = Arc::new(engine());
        engine.build_index(corpus()).await.unwrap();

        let reader = {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                for _ in 0..20 {
                    let hits = engine.search("rust", 10, None).await.unwrap();
                    // Reader sees either the old corpus or the new one,
                    // never a torn index.
                    assert!(hits.len() == 2 || hits.len() == 3);
                }
            })
        };

        engine
            .add_chunks(vec![IndexedChunk::new("c4", "d3", "more rust content")])
            .await
            .unwrap();
        reader.await.unwrap();
    }
}
