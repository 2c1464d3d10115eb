//! Embedding retrieval over the knowledge base. The index returns cosine
//! distance; scores exposed here are similarities (`1 - distance`), so the
//! threshold is a floor on similarity.

use std::sync::Arc;

use maildesk_core::ports::{PortError, VectorIndex};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::llm::{EmbeddingBackend, LlmError};

#[derive(Debug, Error)]
pub enum RagError {
    #[error("query embedding failed: {0}")]
    Embedding(#[from] LlmError),
    #[error("vector index query failed: {0}")]
    Index(#[from] PortError),
}

#[derive(Clone, Debug, PartialEq)]
pub struct RagResult {
    pub id: String,
    pub content: String,
    pub category: String,
    pub title: Option<String>,
    pub score: f32,
    pub metadata: Value,
}

pub struct RagEngine {
    embedder: Arc<dyn EmbeddingBackend>,
    index: Arc<dyn VectorIndex>,
    top_k: usize,
    threshold: f32,
}

impl RagEngine {
    pub fn new(
        embedder: Arc<dyn EmbeddingBackend>,
        index: Arc<dyn VectorIndex>,
        top_k: usize,
        threshold: f32,
    ) -> Self {
        Self { embedder, index, top_k, threshold }
    }

    /// Top candidates by similarity, best first, without threshold
    /// filtering.
    pub async fn search(
        &self,
        query: &str,
        category: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<RagResult>, RagError> {
        let limit = limit.unwrap_or(self.top_k);
        let vector = self.embedder.embed(query).await?;
        let hits = self.index.query(&vector, category, limit).await?;

        debug!(
            event_name = "rag_search",
            candidates = hits.len(),
            category = category.unwrap_or("any"),
            "vector index query complete"
        );

        Ok(hits
            .into_iter()
            .map(|hit| RagResult {
                id: hit.id,
                content: hit.content,
                category: hit.category,
                title: hit.title,
                score: 1.0 - hit.distance,
                metadata: hit.metadata,
            })
            .collect())
    }

    /// `search` filtered to results at or above the similarity threshold.
    /// Relative order is preserved; the result is a prefix-respecting
    /// subset of the unfiltered list.
    pub async fn search_with_threshold(
        &self,
        query: &str,
        category: Option<&str>,
        threshold: Option<f32>,
        limit: Option<usize>,
    ) -> Result<Vec<RagResult>, RagError> {
        let threshold = threshold.unwrap_or(self.threshold);
        let results = self.search(query, category, limit).await?;
        Ok(results.into_iter().filter(|result| result.score >= threshold).collect())
    }
}
