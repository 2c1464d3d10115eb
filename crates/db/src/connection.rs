//! SQLite pool construction driven by [`DatabaseConfig`].

use std::time::Duration;

use maildesk_core::config::DatabaseConfig;
use sqlx::sqlite::SqlitePoolOptions;

pub type DbPool = sqlx::SqlitePool;

/// Opens a pool with the configured limits. Every new connection enables
/// foreign keys and WAL journaling, and gets a busy timeout equal to the
/// pool acquire timeout so a locked database gives up on the same horizon
/// either way.
pub async fn connect(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let acquire_timeout = Duration::from_secs(config.timeout_secs.max(1));
    let busy_timeout_pragma = format!("PRAGMA busy_timeout = {}", acquire_timeout.as_millis());

    SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .acquire_timeout(acquire_timeout)
        .after_connect(move |conn, _meta| {
            let busy_timeout_pragma = busy_timeout_pragma.clone();
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *conn).await?;
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query(&busy_timeout_pragma).execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect(&config.url)
        .await
}
