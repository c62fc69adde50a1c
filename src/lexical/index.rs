//! Immutable BM25 index snapshot.
//!
//! A [`LexicalSnapshot`] holds the tokenized corpus together with the
//! corpus-global BM25 statistics (document frequencies, average length).
//! Those statistics cannot be patched incrementally, so every structural
//! change to the corpus produces a whole new snapshot; publication of the
//! replacement is the engine's job (see [`super::engine`]).

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::analysis::analyze;
use crate::chunk::{ChunkMetadata, IndexedChunk};

/// BM25 k1 parameter (term-frequency saturation).
const BM25_K1: f32 = 1.2;

/// BM25 b parameter (length normalization).
const BM25_B: f32 = 0.75;

/// A single scored hit from the lexical index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalHit {
    /// Chunk ID.
    pub chunk_id: String,
    /// ID of the document the chunk belongs to.
    pub document_id: String,
    /// Raw chunk text.
    pub content: String,
    /// Raw BM25 score (unbounded above).
    pub score: f32,
    /// Query terms that occur in the chunk, for highlighting.
    pub matched_terms: Vec<String>,
    /// Display/filter metadata.
    pub metadata: ChunkMetadata,
}

/// One indexed chunk plus its term statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChunkEntry {
    chunk: IndexedChunk,
    term_freq: AHashMap<String, u32>,
    token_count: u32,
}

/// An immutable, fully-built BM25 index over a chunk corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalSnapshot {
    entries: Vec<ChunkEntry>,
    doc_freq: AHashMap<String, u32>,
    avg_token_count: f64,
}

impl LexicalSnapshot {
    /// Build a snapshot from a corpus, tokenizing every chunk.
    ///
    /// This is CPU-bound and intended to run on a worker pool, never on the
    /// request path.
    pub fn build(chunks: Vec<IndexedChunk>) -> Self {
        let mut entries = Vec::with_capacity(chunks.len());
        let mut doc_freq: AHashMap<String, u32> = AHashMap::new();
        let mut total_tokens: u64 = 0;

        for chunk in chunks {
            let tokens = analyze(&chunk.content);
            total_tokens += tokens.len() as u64;

            let mut term_freq: AHashMap<String, u32> = AHashMap::new();
            for token in &tokens {
                *term_freq.entry(token.clone()).or_insert(0) += 1;
            }
            for term in term_freq.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }

            entries.push(ChunkEntry {
                chunk,
                token_count: tokens.len() as u32,
                term_freq,
            });
        }

        let avg_token_count = if entries.is_empty() {
            0.0
        } else {
            total_tokens as f64 / entries.len() as f64
        };

        LexicalSnapshot {
            entries,
            doc_freq,
            avg_token_count,
        }
    }

    /// An empty snapshot (index never built).
    pub fn empty() -> Self {
        LexicalSnapshot::build(Vec::new())
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot contains no chunks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of tokens across the corpus.
    pub fn total_tokens(&self) -> u64 {
        self.entries.iter().map(|e| e.token_count as u64).sum()
    }

    /// Clone the corpus out of the snapshot, for rebuilds.
    pub fn corpus(&self) -> Vec<IndexedChunk> {
        self.entries.iter().map(|e| e.chunk.clone()).collect()
    }

    /// Inverse document frequency of a term.
    ///
    /// Uses the always-positive `ln(1 + (N - df + 0.5) / (df + 0.5))`
    /// variant so that dropping non-positive scores filters on relevance
    /// rather than on formula artifacts for very common terms.
    fn idf(&self, term: &str) -> f32 {
        let df = match self.doc_freq.get(term) {
            Some(&df) if df > 0 => df as f32,
            _ => return 0.0,
        };
        let n = self.entries.len() as f32;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    /// BM25 score of one chunk against the deduplicated query terms.
    fn score_entry(&self, entry: &ChunkEntry, terms: &[String]) -> f32 {
        let avg_len = self.avg_token_count as f32;
        let mut score = 0.0f32;

        for term in terms {
            let tf = match entry.term_freq.get(term) {
                Some(&tf) => tf as f32,
                None => continue,
            };
            let norm = 1.0 - BM25_B + BM25_B * (entry.token_count as f32 / avg_len);
            score += self.idf(term) * (tf * (BM25_K1 + 1.0)) / (tf + BM25_K1 * norm);
        }

        score
    }

    /// Score every indexed chunk against the query tokens.
    ///
    /// Chunks outside `document_filter` (when supplied) are skipped,
    /// non-positive scores are discarded, and the hits are ordered by score
    /// descending with chunk ID as a deterministic tie-break before being
    /// truncated to `limit`.
    pub fn search(
        &self,
        query_tokens: &[String],
        limit: usize,
        document_filter: Option<&AHashSet<String>>,
    ) -> Vec<LexicalHit> {
        if query_tokens.is_empty() || self.entries.is_empty() || limit == 0 {
            return Vec::new();
        }

        // Deduplicate query terms, preserving first-seen order.
        let mut seen: AHashSet<&str> = AHashSet::new();
        let terms: Vec<String> = query_tokens
            .iter()
            .filter(|t| seen.insert(t.as_str()))
            .cloned()
            .collect();

        let mut hits: Vec<LexicalHit> = Vec::new();
        for entry in &self.entries {
            if let Some(filter) = document_filter {
                if !filter.contains(&entry.chunk.document_id) {
                    continue;
                }
            }

            let score = self.score_entry(entry, &terms);
            if score <= 0.0 {
                continue;
            }

            let matched_terms: Vec<String> = terms
                .iter()
                .filter(|t| entry.term_freq.contains_key(t.as_str()))
                .cloned()
                .collect();

            hits.push(LexicalHit {
                chunk_id: entry.chunk.id.clone(),
                document_id: entry.chunk.document_id.clone(),
                content: entry.chunk.content.clone(),
                score,
                matched_terms,
                metadata: entry.chunk.metadata.clone(),
            });
        }

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk_id.cmp(&b.chunk_id))
        });
        hits.truncate(limit);
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<IndexedChunk> {
        vec![
            IndexedChunk::new("c1", "d1", "rust ownership borrowing lifetimes"),
            IndexedChunk::new("c2", "d1", "rust async runtimes and executors"),
            IndexedChunk::new("c3", "d2", "python garbage collection internals"),
        ]
    }

    #[test]
    fn test_build_statistics() {
        let snapshot = LexicalSnapshot::build(corpus());
        assert_eq!(snapshot.len(), 3);
        assert!(!snapshot.is_empty());
        assert!(snapshot.total_tokens() > 0);
        assert!(snapshot.avg_token_count > 0.0);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = LexicalSnapshot::empty();
        assert!(snapshot.is_empty());
        let tokens = vec!["rust".to_string()];
        assert!(snapshot.search(&tokens, 10, None).is_empty());
    }

    #[test]
    fn test_search_ranks_by_relevance() {
        let snapshot = LexicalSnapshot::build(corpus());
        let tokens = analyze("rust ownership");
        let hits = snapshot.search(&tokens, 10, None);

        assert_eq!(hits.len(), 2);
        // c1 matches both terms, c2 only "rust".
        assert_eq!(hits[0].chunk_id, "c1");
        assert_eq!(hits[1].chunk_id, "c2");
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn test_search_matched_terms() {
        let snapshot = LexicalSnapshot::build(corpus());
        let tokens = analyze("rust ownership");
        let hits = snapshot.search(&tokens, 10, None);
        assert_eq!(hits[0].matched_terms, vec!["rust", "ownership"]);
        assert_eq!(hits[1].matched_terms, vec!["rust"]);
    }

    #[test]
    fn test_search_document_filter() {
        let snapshot = LexicalSnapshot::build(corpus());
        let tokens = analyze("rust python");
        let filter: AHashSet<String> = ["d2".to_string()].into_iter().collect();
        let hits = snapshot.search(&tokens, 10, Some(&filter));

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk_id, "c3");
    }

    #[test]
    fn test_search_no_match() {
        let snapshot = LexicalSnapshot::build(corpus());
        let tokens = analyze("haskell monads");
        assert!(snapshot.search(&tokens, 10, None).is_empty());
    }

    #[test]
    fn test_search_empty_query_tokens() {
        let snapshot = LexicalSnapshot::build(corpus());
        assert!(snapshot.search(&[], 10, None).is_empty());
    }

    #[test]
    fn test_search_limit_truncates() {
        let snapshot = LexicalSnapshot::build(corpus());
        let tokens = analyze("rust");
        let hits = snapshot.search(&tokens, 1, None);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_tie_break_by_chunk_id() {
        // Two identical chunks score identically; order must be by ID.
        let chunks = vec![
            IndexedChunk::new("c9", "d1", "identical text body"),
            IndexedChunk::new("c1", "d1", "identical text body"),
        ];
        let snapshot = LexicalSnapshot::build(chunks);
        let tokens = analyze("identical text");
        let hits = snapshot.search(&tokens, 10, None);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk_id, "c1");
        assert_eq!(hits[1].chunk_id, "c9");
    }

    #[test]
    fn test_duplicate_query_terms_scored_once() {
        let snapshot = LexicalSnapshot::build(corpus());
        let single = snapshot.search(&analyze("ownership"), 10, None);
        let doubled = snapshot.search(&analyze("ownership ownership"), 10, None);
        assert_eq!(single.len(), doubled.len());
        assert!((single[0].score - doubled[0].score).abs() < 1e-6);
    }

    #[test]
    fn test_corpus_round_trip() {
        let original = corpus();
        let snapshot = LexicalSnapshot::build(original.clone());
        assert_eq!(snapshot.corpus(), original);
    }
}
