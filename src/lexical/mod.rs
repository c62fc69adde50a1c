//! Lexical (BM25) retrieval.
//!
//! - `index`: the immutable snapshot — tokenized corpus plus corpus-global
//!   BM25 statistics and scoring.
//! - `engine`: snapshot publication via atomic reference swap, serialized
//!   writers, bounded CPU offload, and the [`LexicalSearcher`] seam.
//! - `store`: checksummed persistence with non-fatal recovery.

pub mod engine;
pub mod index;
pub mod store;

pub use engine::{LexicalEngine, LexicalEngineConfig, LexicalSearcher, LexicalStats};
pub use index::{LexicalHit, LexicalSnapshot};
pub use store::IndexStore;
