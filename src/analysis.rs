//! Text analysis for lexical indexing and querying.
//!
//! Both indexing and query-time tokenization go through [`analyze`] so that
//! the BM25 statistics and the query terms live in the same token space:
//! Unicode word segmentation, lowercasing, then short-token and stopword
//! filtering.
//!
//! # Examples
//!
//! ```
//! use sagitta::analysis::analyze;
//!
//! let tokens = analyze("The Quick brown fox");
//! assert_eq!(tokens, vec!["quick", "brown", "fox"]);
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use unicode_segmentation::UnicodeSegmentation;

/// Tokens shorter than this (in characters) are dropped.
const MIN_TOKEN_CHARS: usize = 2;

/// Default English stop words list.
///
/// Common English words that are typically filtered out during indexing.
const DEFAULT_ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

static STOP_WORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| DEFAULT_ENGLISH_STOP_WORDS.iter().copied().collect());

/// Tokenize `text` into the normalized terms used for BM25 scoring.
///
/// Pathological input (empty or whitespace-only text) yields an empty token
/// list, never an error.
pub fn analyze(text: &str) -> Vec<String> {
    text.unicode_words()
        .map(|word| word.to_lowercase())
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .filter(|token| !STOP_WORDS.contains(token.as_str()))
        .collect()
}

/// Check whether a term is in the default stopword set.
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word)
}
