//! Query data model and request validation.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SagittaError};

/// Default number of results a query asks for.
pub const DEFAULT_LIMIT: usize = 10;

/// Hard upper bound on a caller-supplied limit.
pub const MAX_LIMIT: usize = 100;

/// A search request, scoped to a single call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// Request ID, minted per call.
    pub id: String,
    /// Query text. Must be non-empty after trimming.
    pub text: String,
    /// Requested number of results (1..=[`MAX_LIMIT`]).
    pub limit: usize,
    /// Relevance threshold in [0, 1]; results scoring below it are dropped.
    pub threshold: f32,
}

impl Query {
    /// Create a query with default limit and threshold.
    pub fn new(text: impl Into<String>) -> Self {
        Query {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            limit: DEFAULT_LIMIT,
            threshold: 0.0,
        }
    }

    /// Set the result limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the relevance threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Validate the query before dispatch.
    ///
    /// Invalid queries are rejected up front as request errors; they are
    /// never retried or downgraded.
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(SagittaError::query("query text must not be empty"));
        }
        if self.limit == 0 {
            return Err(SagittaError::query("limit must be at least 1"));
        }
        if self.limit > MAX_LIMIT {
            return Err(SagittaError::query(format!(
                "limit must not exceed {MAX_LIMIT}"
            )));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(SagittaError::query(
                "threshold must be within [0.0, 1.0]",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let query = Query::new("rust search");
        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert_eq!(query.threshold, 0.0);
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_query_ids_are_unique() {
        let a = Query::new("rust");
        let b = Query::new("rust");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_query_builder() {
        let query = Query::new("rust").with_limit(5).with_threshold(0.25);
        assert_eq!(query.limit, 5);
        assert_eq!(query.threshold, 0.25);
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_empty_text_rejected() {
        assert!(Query::new("").validate().is_err());
        assert!(Query::new("   ").validate().is_err());
    }

    #[test]
    fn test_zero_limit_rejected() {
        assert!(Query::new("rust").with_limit(0).validate().is_err());
    }

    #[test]
    fn test_oversized_limit_rejected() {
        assert!(
            Query::new("rust")
                .with_limit(MAX_LIMIT + 1)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_threshold_range() {
        assert!(Query::new("rust").with_threshold(1.0).validate().is_ok());
        assert!(Query::new("rust").with_threshold(1.01).validate().is_err());
        assert!(Query::new("rust").with_threshold(-0.1).validate().is_err());
    }
}
