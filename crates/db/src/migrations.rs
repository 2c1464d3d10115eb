use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Highest applied migration version, or `None` before the first run.
pub async fn current_version(pool: &DbPool) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations").fetch_one(pool).await
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use maildesk_core::config::DatabaseConfig;

    use super::{current_version, run_pending};
    use crate::{connect, migrations::MIGRATOR, DbPool};

    async fn memory_pool() -> DbPool {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            timeout_secs: 30,
        };
        connect(&config).await.expect("connect")
    }

    const MANAGED_SCHEMA_OBJECTS: &[&str] = &[
        "knowledge_base",
        "interaction_logs",
        "escalations",
        "idx_knowledge_base_category",
        "idx_interaction_logs_sender",
        "idx_interaction_logs_created_at",
        "idx_escalations_status",
    ];

    async fn table_count(pool: &sqlx::SqlitePool, name: &str) -> i64 {
        sqlx::query(
            "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = ?1",
        )
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("check table")
        .get::<i64, _>("count")
    }

    #[tokio::test]
    async fn migrations_create_baseline_tables() {
        let pool = memory_pool().await;
        run_pending(&pool).await.expect("run migrations");

        assert_eq!(table_count(&pool, "knowledge_base").await, 1);
        assert_eq!(table_count(&pool, "interaction_logs").await, 1);
        assert_eq!(table_count(&pool, "escalations").await, 1);
    }

    #[tokio::test]
    async fn current_version_reports_the_applied_baseline() {
        let pool = memory_pool().await;
        run_pending(&pool).await.expect("run migrations");

        assert_eq!(current_version(&pool).await.expect("version"), Some(1));
    }

    #[tokio::test]
    async fn migrations_are_reversible() {
        let pool = memory_pool().await;
        run_pending(&pool).await.expect("run migrations");

        MIGRATOR.undo(&pool, 0).await.expect("undo migrations");

        assert_eq!(table_count(&pool, "knowledge_base").await, 0);
        assert_eq!(table_count(&pool, "interaction_logs").await, 0);
        assert_eq!(table_count(&pool, "escalations").await, 0);
    }

    #[tokio::test]
    async fn migrations_up_down_up_preserves_schema_signature() {
        let pool = memory_pool().await;
        run_pending(&pool).await.expect("run migrations");

        let initial_signature = managed_schema_signature(&pool).await;
        assert_eq!(
            initial_signature.len(),
            MANAGED_SCHEMA_OBJECTS.len(),
            "initial migration pass should create all managed schema objects",
        );

        MIGRATOR.undo(&pool, 0).await.expect("undo migrations");

        let after_down_signature = managed_schema_signature(&pool).await;
        assert!(
            after_down_signature.is_empty(),
            "managed schema objects should be removed after full undo",
        );

        run_pending(&pool).await.expect("re-run migrations");

        let after_second_up_signature = managed_schema_signature(&pool).await;
        assert_eq!(
            after_second_up_signature, initial_signature,
            "up/down/up should preserve migration-managed schema signature",
        );
    }

    async fn managed_schema_signature(pool: &sqlx::SqlitePool) -> Vec<(String, String, String)> {
        let mut signature: Vec<(String, String, String)> = sqlx::query(
            "SELECT type, name, IFNULL(sql, '') AS sql
             FROM sqlite_master
             WHERE type IN ('table', 'index')",
        )
        .fetch_all(pool)
        .await
        .expect("load schema objects")
        .into_iter()
        .filter_map(|row| {
            let name = row.get::<String, _>("name");
            if MANAGED_SCHEMA_OBJECTS.contains(&name.as_str()) {
                Some((row.get::<String, _>("type"), name, row.get::<String, _>("sql")))
            } else {
                None
            }
        })
        .collect();
        signature.sort();
        signature
    }
}
