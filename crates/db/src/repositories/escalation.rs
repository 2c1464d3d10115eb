//! Escalation queue persistence and the admin listing queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use maildesk_core::domain::interaction::{
    EscalationPriority, EscalationRecord, EscalationStatus,
};
use maildesk_core::ports::{EscalationStore, PortError};
use serde_json::Value;
use sqlx::{sqlite::SqliteRow, Row};

use super::RepositoryError;
use crate::DbPool;

#[derive(Clone)]
pub struct SqlEscalationRepository {
    pool: DbPool,
}

impl SqlEscalationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<EscalationRecord>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, interaction_id, reason, priority, customer_email, summary,
                    context, status, assigned_to, resolution_notes, resolved_at, created_at
             FROM escalations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(record_from_row).transpose()
    }

    /// Escalations with the given status, oldest first so the queue drains
    /// in arrival order.
    pub async fn list_by_status(
        &self,
        status: EscalationStatus,
        limit: usize,
    ) -> Result<Vec<EscalationRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, interaction_id, reason, priority, customer_email, summary,
                    context, status, assigned_to, resolution_notes, resolved_at, created_at
             FROM escalations WHERE status = ? ORDER BY created_at ASC LIMIT ?",
        )
        .bind(status.as_str())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(record_from_row).collect()
    }

    pub async fn count_by_status(
        &self,
        status: EscalationStatus,
    ) -> Result<i64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM escalations WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("count"))
    }
}

#[async_trait]
impl EscalationStore for SqlEscalationRepository {
    async fn append(&self, record: &EscalationRecord) -> Result<(), PortError> {
        sqlx::query(
            "INSERT INTO escalations
                (id, interaction_id, reason, priority, customer_email, summary,
                 context, status, assigned_to, resolution_notes, resolved_at, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.interaction_id)
        .bind(&record.reason)
        .bind(record.priority.as_str())
        .bind(&record.customer_email)
        .bind(&record.summary)
        .bind(record.context.to_string())
        .bind(record.status.as_str())
        .bind(&record.assigned_to)
        .bind(&record.resolution_notes)
        .bind(record.resolved_at.map(|value| value.to_rfc3339()))
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|err| PortError::Store(err.to_string()))?;

        Ok(())
    }
}

fn record_from_row(row: SqliteRow) -> Result<EscalationRecord, RepositoryError> {
    let priority_raw = row.get::<String, _>("priority");
    let priority = EscalationPriority::parse(&priority_raw)
        .ok_or_else(|| RepositoryError::Decode(format!("unknown priority `{priority_raw}`")))?;

    let status_raw = row.get::<String, _>("status");
    let status = parse_status(&status_raw)
        .ok_or_else(|| RepositoryError::Decode(format!("unknown status `{status_raw}`")))?;

    let context: Value = serde_json::from_str(&row.get::<String, _>("context"))
        .map_err(|err| RepositoryError::Decode(format!("context column: {err}")))?;

    let resolved_at = row
        .get::<Option<String>, _>("resolved_at")
        .map(|raw| parse_timestamp(&raw))
        .transpose()?;
    let created_at = parse_timestamp(&row.get::<String, _>("created_at"))?;

    Ok(EscalationRecord {
        id: row.get::<String, _>("id"),
        interaction_id: row.get::<Option<String>, _>("interaction_id"),
        reason: row.get::<String, _>("reason"),
        priority,
        customer_email: row.get::<String, _>("customer_email"),
        summary: row.get::<String, _>("summary"),
        context,
        status,
        assigned_to: row.get::<Option<String>, _>("assigned_to"),
        resolution_notes: row.get::<Option<String>, _>("resolution_notes"),
        resolved_at,
        created_at,
    })
}

fn parse_status(value: &str) -> Option<EscalationStatus> {
    match value {
        "pending" => Some(EscalationStatus::Pending),
        "in_progress" => Some(EscalationStatus::InProgress),
        "resolved" => Some(EscalationStatus::Resolved),
        _ => None,
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|err| RepositoryError::Decode(format!("bad timestamp `{raw}`: {err}")))
}

#[cfg(test)]
mod tests {
    use maildesk_core::config::DatabaseConfig;
    use maildesk_core::domain::interaction::{
        EscalationPriority, EscalationRecord, EscalationStatus,
    };
    use maildesk_core::ports::EscalationStore;
    use serde_json::json;

    use super::SqlEscalationRepository;
    use crate::connect;
    use crate::migrations::run_pending;

    async fn memory_pool() -> crate::DbPool {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            timeout_secs: 30,
        };
        connect(&config).await.expect("connect")
    }

    async fn repository() -> SqlEscalationRepository {
        let pool = memory_pool().await;
        run_pending(&pool).await.expect("run migrations");
        SqlEscalationRepository::new(pool)
    }

    fn pending(reason: &str) -> EscalationRecord {
        let mut record = EscalationRecord::pending(
            reason,
            EscalationPriority::High,
            "jane@example.com",
            "Subject: broken item",
            None,
        );
        record.context = json!({"priority": "high"});
        record
    }

    #[tokio::test]
    async fn append_then_find_round_trips_the_record() {
        let repo = repository().await;
        let original = pending("complaint");

        repo.append(&original).await.expect("append");
        let loaded = repo.find_by_id(&original.id).await.expect("find").expect("present");

        assert_eq!(loaded.priority, EscalationPriority::High);
        assert_eq!(loaded.status, EscalationStatus::Pending);
        assert_eq!(loaded.context, original.context);
        assert!(loaded.resolved_at.is_none());
    }

    #[tokio::test]
    async fn pending_queue_lists_in_arrival_order() {
        let repo = repository().await;
        let mut first = pending("first");
        first.created_at = first.created_at - chrono::Duration::seconds(60);
        let second = pending("second");

        repo.append(&second).await.expect("append");
        repo.append(&first).await.expect("append");

        let queue =
            repo.list_by_status(EscalationStatus::Pending, 10).await.expect("list");
        let reasons: Vec<&str> = queue.iter().map(|record| record.reason.as_str()).collect();

        assert_eq!(reasons, vec!["first", "second"]);
        assert_eq!(
            repo.count_by_status(EscalationStatus::Pending).await.expect("count"),
            2
        );
        assert_eq!(
            repo.count_by_status(EscalationStatus::Resolved).await.expect("count"),
            0
        );
    }
}
