//! Interaction audit log persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use maildesk_core::domain::interaction::InteractionRecord;
use maildesk_core::ports::{InteractionStore, PortError};
use sqlx::{sqlite::SqliteRow, Row};

use super::RepositoryError;
use crate::DbPool;

#[derive(Clone)]
pub struct SqlInteractionRepository {
    pool: DbPool,
}

impl SqlInteractionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<InteractionRecord>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, email_id, sender_email, subject, body, intent, complexity,
                    model_used, tools_used, response, tokens_input, tokens_output,
                    response_time_ms, created_at
             FROM interaction_logs WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(record_from_row).transpose()
    }

    pub async fn recent(&self, limit: usize) -> Result<Vec<InteractionRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, email_id, sender_email, subject, body, intent, complexity,
                    model_used, tools_used, response, tokens_input, tokens_output,
                    response_time_ms, created_at
             FROM interaction_logs ORDER BY created_at DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(record_from_row).collect()
    }
}

#[async_trait]
impl InteractionStore for SqlInteractionRepository {
    async fn append(&self, record: &InteractionRecord) -> Result<(), PortError> {
        let tools_used = serde_json::to_string(&record.tools_used)
            .map_err(|err| PortError::Decode(err.to_string()))?;

        sqlx::query(
            "INSERT INTO interaction_logs
                (id, email_id, sender_email, subject, body, intent, complexity,
                 model_used, tools_used, response, tokens_input, tokens_output,
                 response_time_ms, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.email_id)
        .bind(&record.sender_email)
        .bind(&record.subject)
        .bind(&record.body)
        .bind(&record.intent)
        .bind(&record.complexity)
        .bind(&record.model_used)
        .bind(tools_used)
        .bind(&record.response)
        .bind(record.tokens_input)
        .bind(record.tokens_output)
        .bind(record.response_time_ms as i64)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|err| PortError::Store(err.to_string()))?;

        Ok(())
    }
}

fn record_from_row(row: SqliteRow) -> Result<InteractionRecord, RepositoryError> {
    let tools_used: Vec<String> = serde_json::from_str(&row.get::<String, _>("tools_used"))
        .map_err(|err| RepositoryError::Decode(format!("tools_used column: {err}")))?;
    let created_at = parse_timestamp(&row.get::<String, _>("created_at"))?;

    Ok(InteractionRecord {
        id: row.get::<String, _>("id"),
        email_id: row.get::<Option<String>, _>("email_id"),
        sender_email: row.get::<String, _>("sender_email"),
        subject: row.get::<String, _>("subject"),
        body: row.get::<String, _>("body"),
        intent: row.get::<String, _>("intent"),
        complexity: row.get::<String, _>("complexity"),
        model_used: row.get::<String, _>("model_used"),
        tools_used,
        response: row.get::<String, _>("response"),
        tokens_input: row.get::<u32, _>("tokens_input"),
        tokens_output: row.get::<u32, _>("tokens_output"),
        response_time_ms: row.get::<i64, _>("response_time_ms") as u64,
        created_at,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|err| RepositoryError::Decode(format!("bad timestamp `{raw}`: {err}")))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use maildesk_core::config::DatabaseConfig;
    use maildesk_core::domain::interaction::InteractionRecord;
    use maildesk_core::ports::InteractionStore;

    use super::SqlInteractionRepository;
    use crate::connect;
    use crate::migrations::run_pending;

    fn record(id: &str) -> InteractionRecord {
        InteractionRecord {
            id: id.to_string(),
            email_id: Some("msg-1".to_string()),
            sender_email: "jane@example.com".to_string(),
            subject: "Where is my order?".to_string(),
            body: "Order #12345 has not arrived.".to_string(),
            intent: "order_status".to_string(),
            complexity: "simple".to_string(),
            model_used: "gpt-4o-mini".to_string(),
            tools_used: vec!["get_order".to_string(), "get_fulfillment".to_string()],
            response: "Your order is in transit.".to_string(),
            tokens_input: 820,
            tokens_output: 140,
            response_time_ms: 2300,
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

    async fn repository() -> SqlInteractionRepository {
        let pool = memory_pool().await;
        run_pending(&pool).await.expect("run migrations");
        SqlInteractionRepository::new(pool)
    }

    #[tokio::test]
    async fn append_then_find_round_trips_all_fields() {
        let repo = repository().await;
        let original = record("int-1");

        repo.append(&original).await.expect("append");
        let loaded = repo.find_by_id("int-1").await.expect("find").expect("present");

        assert_eq!(loaded.tools_used, original.tools_used);
        assert_eq!(loaded.tokens_input, 820);
        assert_eq!(loaded.response_time_ms, 2300);
        assert_eq!(loaded.sender_email, original.sender_email);
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let repo = repository().await;
        repo.append(&record("int-1")).await.expect("append");

        let duplicate = repo.append(&record("int-1")).await;
        assert!(duplicate.is_err());
    }
}
