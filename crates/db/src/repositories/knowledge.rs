//! Knowledge base storage and vector search. Embeddings live in SQLite as
//! JSON float arrays; the category filter runs in SQL, distance ranking
//! runs here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use maildesk_core::domain::knowledge::KnowledgeEntry;
use maildesk_core::ports::{PortError, VectorHit, VectorIndex};
use serde_json::Value;
use sqlx::{sqlite::SqliteRow, Row};

use super::RepositoryError;
use crate::DbPool;

#[derive(Clone)]
pub struct SqlKnowledgeBaseRepository {
    pool: DbPool,
}

impl SqlKnowledgeBaseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, entry: &KnowledgeEntry) -> Result<(), RepositoryError> {
        let embedding = serde_json::to_string(&entry.embedding)
            .map_err(|err| RepositoryError::Decode(err.to_string()))?;

        sqlx::query(
            "INSERT INTO knowledge_base
                (id, content, category, title, metadata, embedding, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(&entry.content)
        .bind(&entry.category)
        .bind(&entry.title)
        .bind(entry.metadata.to_string())
        .bind(embedding)
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM knowledge_base")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("count"))
    }

    /// Seed idempotence check: does an article with this title already
    /// exist in the category?
    pub async fn exists(&self, title: &str, category: &str) -> Result<bool, RepositoryError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM knowledge_base WHERE title = ? AND category = ?",
        )
        .bind(title)
        .bind(category)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get::<i64, _>("count") > 0)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<KnowledgeEntry>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, content, category, title, metadata, embedding, created_at
             FROM knowledge_base WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(entry_from_row).transpose()
    }

    pub async fn list_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<KnowledgeEntry>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, content, category, title, metadata, embedding, created_at
             FROM knowledge_base WHERE category = ? ORDER BY created_at ASC",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(entry_from_row).collect()
    }
}

#[async_trait]
impl VectorIndex for SqlKnowledgeBaseRepository {
    async fn query(
        &self,
        vector: &[f32],
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<VectorHit>, PortError> {
        let rows = if let Some(category) = category {
            sqlx::query(
                "SELECT id, content, category, title, metadata, embedding
                 FROM knowledge_base WHERE category = ?",
            )
            .bind(category)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query(
                "SELECT id, content, category, title, metadata, embedding FROM knowledge_base",
            )
            .fetch_all(&self.pool)
            .await
        }
        .map_err(|err| PortError::Store(err.to_string()))?;

        let mut hits = Vec::with_capacity(rows.len());
        for row in rows {
            let embedding = decode_embedding(&row.get::<String, _>("embedding"))?;
            // Dimension mismatches mean a stale index; skip rather than
            // rank garbage.
            if embedding.len() != vector.len() {
                continue;
            }

            hits.push(VectorHit {
                id: row.get::<String, _>("id"),
                content: row.get::<String, _>("content"),
                category: row.get::<String, _>("category"),
                title: row.get::<Option<String>, _>("title"),
                metadata: decode_metadata(&row.get::<String, _>("metadata")),
                distance: cosine_distance(vector, &embedding),
            });
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(limit);
        Ok(hits)
    }
}

fn entry_from_row(row: SqliteRow) -> Result<KnowledgeEntry, RepositoryError> {
    let embedding = decode_embedding(&row.get::<String, _>("embedding"))
        .map_err(|err| RepositoryError::Decode(err.to_string()))?;
    let created_at = parse_timestamp(&row.get::<String, _>("created_at"))?;

    Ok(KnowledgeEntry {
        id: row.get::<String, _>("id"),
        content: row.get::<String, _>("content"),
        category: row.get::<String, _>("category"),
        title: row.get::<Option<String>, _>("title"),
        metadata: decode_metadata(&row.get::<String, _>("metadata")),
        embedding,
        created_at,
    })
}

fn decode_embedding(raw: &str) -> Result<Vec<f32>, PortError> {
    serde_json::from_str(raw)
        .map_err(|err| PortError::Decode(format!("embedding column is not a float array: {err}")))
}

fn decode_metadata(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or(Value::Null)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|err| RepositoryError::Decode(format!("bad timestamp `{raw}`: {err}")))
}

/// Cosine distance (`1 - cosine similarity`). Zero vectors are treated as
/// maximally distant.
pub(crate) fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator == 0.0 {
        return 1.0;
    }

    1.0 - dot / denominator
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use maildesk_core::config::DatabaseConfig;
    use maildesk_core::domain::knowledge::KnowledgeEntry;
    use maildesk_core::ports::VectorIndex;
    use serde_json::json;

    use super::{cosine_distance, SqlKnowledgeBaseRepository};
    use crate::connect;
    use crate::migrations::run_pending;

    fn entry(id: &str, category: &str, embedding: Vec<f32>) -> KnowledgeEntry {
        KnowledgeEntry {
            id: id.to_string(),
            content: format!("content for {id}"),
            category: category.to_string(),
            title: Some(format!("title for {id}")),
            metadata: json!({"source": "test"}),
            embedding,
            created_at: Utc::now(),
        }
    }

    async fn memory_pool() -> crate::DbPool {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            timeout_secs: 30,
        };
        connect(&config).await.expect("connect")
    }

    async fn repository() -> SqlKnowledgeBaseRepository {
        let pool = memory_pool().await;
        run_pending(&pool).await.expect("run migrations");
        SqlKnowledgeBaseRepository::new(pool)
    }

    #[test]
    fn identical_vectors_have_zero_distance() {
        let distance = cosine_distance(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        assert!(distance.abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_have_unit_distance() {
        let distance = cosine_distance(&[1.0, 0.0], &[0.0, 1.0]);
        assert!((distance - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_is_maximally_distant() {
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
    }

    #[tokio::test]
    async fn query_ranks_by_ascending_distance() {
        let repo = repository().await;
        repo.insert(&entry("far", "faq", vec![0.0, 1.0])).await.expect("insert");
        repo.insert(&entry("near", "faq", vec![1.0, 0.1])).await.expect("insert");
        repo.insert(&entry("exact", "faq", vec![1.0, 0.0])).await.expect("insert");

        let hits = repo.query(&[1.0, 0.0], None, 10).await.expect("query");
        let ids: Vec<&str> = hits.iter().map(|hit| hit.id.as_str()).collect();

        assert_eq!(ids, vec!["exact", "near", "far"]);
    }

    #[tokio::test]
    async fn category_filter_constrains_candidates() {
        let repo = repository().await;
        repo.insert(&entry("faq-1", "faq", vec![1.0, 0.0])).await.expect("insert");
        repo.insert(&entry("policy-1", "policy", vec![1.0, 0.0])).await.expect("insert");

        let hits = repo.query(&[1.0, 0.0], Some("policy"), 10).await.expect("query");

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "policy-1");
    }

    #[tokio::test]
    async fn mismatched_dimensions_are_skipped() {
        let repo = repository().await;
        repo.insert(&entry("stale", "faq", vec![1.0, 0.0, 0.0])).await.expect("insert");
        repo.insert(&entry("fresh", "faq", vec![1.0, 0.0])).await.expect("insert");

        let hits = repo.query(&[1.0, 0.0], None, 10).await.expect("query");

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "fresh");
    }

    #[tokio::test]
    async fn limit_truncates_the_ranked_list() {
        let repo = repository().await;
        for i in 0..5 {
            let embedding = vec![1.0, i as f32 * 0.1];
            repo.insert(&entry(&format!("kb-{i}"), "faq", embedding)).await.expect("insert");
        }

        let hits = repo.query(&[1.0, 0.0], None, 2).await.expect("query");
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn round_trip_preserves_entry_fields() {
        let repo = repository().await;
        let original = entry("kb-1", "shipping", vec![0.5, 0.5]);
        repo.insert(&original).await.expect("insert");

        let loaded = repo.find_by_id("kb-1").await.expect("find").expect("present");
        assert_eq!(loaded.content, original.content);
        assert_eq!(loaded.category, original.category);
        assert_eq!(loaded.metadata, original.metadata);
        assert_eq!(loaded.embedding, original.embedding);

        assert!(repo.exists("title for kb-1", "shipping").await.expect("exists"));
        assert!(!repo.exists("title for kb-1", "faq").await.expect("exists"));
    }
}
