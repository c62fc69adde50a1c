//! Reciprocal Rank Fusion blended with normalized raw scores.
//!
//! Pure RRF is scale-free and robust when the two retrievers' scores are
//! not comparable, but it discards magnitude information; the weighted term
//! restores sensitivity to each retriever's confidence. The fixed 0.6/0.4
//! blend favors rank agreement over raw-magnitude comparability.

use ahash::AHashMap;

use crate::hybrid::config::FusionConfig;
use crate::hybrid::types::ScoredChunk;
use crate::lexical::index::LexicalHit;
use crate::vector::VectorHit;

/// Blend factor for the combined RRF score.
const RRF_BLEND: f32 = 0.6;

/// Blend factor for the weighted raw-score term.
const WEIGHTED_BLEND: f32 = 0.4;

/// RRF contribution of an item at 1-based `rank`: `1 / (k + rank)`.
pub fn rrf_contribution(rank: usize, rrf_k: u32) -> f32 {
    1.0 / (rrf_k as f32 + rank as f32)
}

/// Clamp a raw BM25 score into [0, 1] by dividing by `scale` and capping.
/// BM25 scores are unbounded above; similarity scores are already bounded.
fn normalize_bm25(raw: f32, scale: f32) -> f32 {
    (raw / scale).clamp(0.0, 1.0)
}

/// Merge a vector-ranked list and a BM25-ranked list into one ordered,
/// deduplicated list of [`ScoredChunk`].
///
/// A chunk present in only one source keeps a `None` rank and zero
/// contribution for the missing source; it is never penalized beyond
/// lacking that source's signal. Ordering is deterministic: fusion score
/// descending, chunk ID ascending on ties.
pub fn fuse(
    vector_hits: &[VectorHit],
    lexical_hits: &[LexicalHit],
    config: &FusionConfig,
) -> Vec<ScoredChunk> {
    let mut table: AHashMap<String, ScoredChunk> = AHashMap::new();

    for (i, hit) in vector_hits.iter().enumerate() {
        let entry = table.entry(hit.chunk_id.clone()).or_insert_with(|| {
            let mut chunk = ScoredChunk::new(
                hit.chunk_id.clone(),
                hit.payload.document_id.clone(),
                hit.payload.content.clone(),
            );
            chunk.metadata = hit.payload.metadata.clone();
            chunk
        });
        entry.vector_score = Some(hit.score);
        entry.vector_rank = Some(i + 1);
    }

    for (i, hit) in lexical_hits.iter().enumerate() {
        let entry = table.entry(hit.chunk_id.clone()).or_insert_with(|| {
            let mut chunk = ScoredChunk::new(
                hit.chunk_id.clone(),
                hit.document_id.clone(),
                hit.content.clone(),
            );
            chunk.metadata = hit.metadata.clone();
            chunk
        });
        entry.bm25_score = Some(hit.score);
        entry.bm25_rank = Some(i + 1);
        entry.matched_terms = hit.matched_terms.clone();
    }

    for chunk in table.values_mut() {
        let rrf = chunk
            .vector_rank
            .map_or(0.0, |r| rrf_contribution(r, config.rrf_k))
            + chunk
                .bm25_rank
                .map_or(0.0, |r| rrf_contribution(r, config.rrf_k));

        let weighted = config.vector_weight * chunk.vector_score.unwrap_or(0.0)
            + config.bm25_weight
                * normalize_bm25(chunk.bm25_score.unwrap_or(0.0), config.bm25_scale);

        chunk.rrf_score = rrf;
        chunk.weighted_score = weighted;
        chunk.fusion_score = RRF_BLEND * rrf + WEIGHTED_BLEND * weighted;
    }

    let mut fused: Vec<ScoredChunk> = table.into_values().collect();
    fused.sort_by(|a, b| {
        b.fusion_score
            .partial_cmp(&a.fusion_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    fused
}
