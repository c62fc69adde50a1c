//! Configuration for hybrid search.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SagittaError};

/// Default RRF rank-decay constant.
pub const DEFAULT_RRF_K: u32 = 60;

/// Configuration for the fusion stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Weight for raw vector similarity scores (0.0-1.0).
    pub vector_weight: f32,
    /// Weight for normalized BM25 scores (0.0-1.0). Need not sum to 1.0
    /// with `vector_weight`.
    pub bm25_weight: f32,
    /// Post-fusion/rerank score cutoff.
    pub min_score_threshold: f32,
    /// Hard cap on returned chunks.
    pub max_results: usize,
    /// Whether to run the semantic reranking pass.
    pub enable_rerank: bool,
    /// RRF rank-decay constant; larger values flatten rank sensitivity.
    pub rrf_k: u32,
    /// Divisor clamping raw BM25 scores into [0, 1]. Corpus-dependent;
    /// tunable pending empirical calibration.
    pub bm25_scale: f32,
}

impl Default for FusionConfig {
    fn default() -> Self {
        FusionConfig {
            vector_weight: 0.7,
            bm25_weight: 0.3,
            min_score_threshold: 0.1,
            max_results: 20,
            enable_rerank: true,
            rrf_k: DEFAULT_RRF_K,
            bm25_scale: 10.0,
        }
    }
}

impl FusionConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.vector_weight) {
            return Err(SagittaError::query(
                "vector_weight must be within [0.0, 1.0]",
            ));
        }
        if !(0.0..=1.0).contains(&self.bm25_weight) {
            return Err(SagittaError::query(
                "bm25_weight must be within [0.0, 1.0]",
            ));
        }
        if self.min_score_threshold < 0.0 {
            return Err(SagittaError::query(
                "min_score_threshold must be non-negative",
            ));
        }
        if self.max_results == 0 {
            return Err(SagittaError::query("max_results must be positive"));
        }
        if self.rrf_k == 0 {
            return Err(SagittaError::query("rrf_k must be positive"));
        }
        if self.bm25_scale <= 0.0 {
            return Err(SagittaError::query("bm25_scale must be positive"));
        }
        Ok(())
    }
}

/// Configuration for the whole hybrid search engine: fusion parameters plus
/// the per-request time and fan-out budget.
#[derive(Debug, Clone)]
pub struct HybridSearchConfig {
    /// Fusion-stage parameters.
    pub fusion: FusionConfig,
    /// Timeout applied to each retrieval branch independently; an expired
    /// branch degrades, it does not abort the request.
    pub branch_timeout: Duration,
    /// Timeout for each reranking embedding call.
    pub embed_timeout: Duration,
    /// Overall request deadline. On expiry the orchestrator returns the
    /// partial ranked result it has.
    pub request_deadline: Duration,
    /// Bounded fan-out for concurrent reranking embedding calls.
    pub rerank_concurrency: usize,
}

impl Default for HybridSearchConfig {
    fn default() -> Self {
        HybridSearchConfig {
            fusion: FusionConfig::default(),
            branch_timeout: Duration::from_secs(5),
            embed_timeout: Duration::from_secs(2),
            request_deadline: Duration::from_secs(15),
            rerank_concurrency: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fusion_config_default_is_valid() {
        let config = FusionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.vector_weight, 0.7);
        assert_eq!(config.bm25_weight, 0.3);
        assert_eq!(config.rrf_k, 60);
        assert!(config.enable_rerank);
    }

    #[test]
    fn test_weight_bounds_rejected() {
        let mut config = FusionConfig::default();
        config.vector_weight = 1.5;
        assert!(config.validate().is_err());

        let mut config = FusionConfig::default();
        config.bm25_weight = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_max_results_rejected() {
        let mut config = FusionConfig::default();
        config.max_results = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_rrf_k_rejected() {
        let mut config = FusionConfig::default();
        config.rrf_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_scale_rejected() {
        let mut config = FusionConfig::default();
        config.bm25_scale = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_hybrid_config_defaults() {
        let config = HybridSearchConfig::default();
        assert_eq!(config.branch_timeout, Duration::from_secs(5));
        assert_eq!(config.rerank_concurrency, 8);
    }
}
