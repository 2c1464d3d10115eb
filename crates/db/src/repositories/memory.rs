//! In-memory vector index for tests and offline retrieval experiments.

use async_trait::async_trait;
use maildesk_core::domain::knowledge::KnowledgeEntry;
use maildesk_core::ports::{PortError, VectorHit, VectorIndex};
use tokio::sync::RwLock;

use super::knowledge::cosine_distance;

/// Brute-force vector index over a fixed entry set. Ranks hits the same
/// way `SqlKnowledgeBaseRepository` does, without a database.
#[derive(Default)]
pub struct InMemoryVectorIndex {
    entries: RwLock<Vec<KnowledgeEntry>>,
}

impl InMemoryVectorIndex {
    pub fn new(entries: Vec<KnowledgeEntry>) -> Self {
        Self { entries: RwLock::new(entries) }
    }

    pub async fn insert(&self, entry: KnowledgeEntry) {
        self.entries.write().await.push(entry);
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn query(
        &self,
        vector: &[f32],
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<VectorHit>, PortError> {
        let entries = self.entries.read().await;

        let mut hits: Vec<VectorHit> = entries
            .iter()
            .filter(|entry| category.map_or(true, |category| entry.category == category))
            .filter(|entry| entry.embedding.len() == vector.len())
            .map(|entry| VectorHit {
                id: entry.id.clone(),
                content: entry.content.clone(),
                category: entry.category.clone(),
                title: entry.title.clone(),
                metadata: entry.metadata.clone(),
                distance: cosine_distance(vector, &entry.embedding),
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(limit);
        Ok(hits)
    }
}
