//! Corpus data model: document chunks as the atomic retrievable unit.

use serde::{Deserialize, Serialize};

/// Per-chunk metadata used for filtering and display, never for scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Position of the chunk within its document.
    pub chunk_index: usize,
    /// Page number in the source document, when known.
    pub page_number: Option<u32>,
    /// Section heading the chunk falls under, when known.
    pub section_title: Option<String>,
    /// Detected language of the chunk content.
    pub language: Option<String>,
}

/// A bounded span of a document's text, as stored in the lexical corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedChunk {
    /// Chunk ID, unique across the corpus.
    pub id: String,
    /// ID of the document this chunk belongs to.
    pub document_id: String,
    /// Raw chunk text.
    pub content: String,
    /// Display/filter metadata.
    pub metadata: ChunkMetadata,
}

impl IndexedChunk {
    /// Create a new chunk with default metadata.
    pub fn new(
        id: impl Into<String>,
        document_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        IndexedChunk {
            id: id.into(),
            document_id: document_id.into(),
            content: content.into(),
            metadata: ChunkMetadata::default(),
        }
    }

    /// Attach metadata.
    pub fn with_metadata(mut self, metadata: ChunkMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_creation() {
        let chunk = IndexedChunk::new("c1", "d1", "some text");
        assert_eq!(chunk.id, "c1");
        assert_eq!(chunk.document_id, "d1");
        assert_eq!(chunk.content, "some text");
        assert_eq!(chunk.metadata, ChunkMetadata::default());
    }

    #[test]
    fn test_chunk_with_metadata() {
        let metadata = ChunkMetadata {
            chunk_index: 3,
            page_number: Some(12),
            section_title: Some("Results".to_string()),
            language: Some("en".to_string()),
        };
        let chunk = IndexedChunk::new("c1", "d1", "text").with_metadata(metadata.clone());
        assert_eq!(chunk.metadata, metadata);
    }

    #[test]
    fn test_chunk_serde_round_trip() {
        let chunk = IndexedChunk::new("c1", "d1", "text");
        let json = serde_json::to_string(&chunk).unwrap();
        let back: IndexedChunk = serde_json::from_str(&json).unwrap();
        assert_eq!(chunk, back);
    }
}
