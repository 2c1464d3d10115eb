use maildesk_db::{connect, migrations};

use crate::commands::{execute, load_config, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config("migrate") {
        Ok(config) => config,
        Err(report) => return report,
    };

    let outcome = execute("migrate", async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;
        let version = migrations::current_version(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;
        pool.close().await;
        Ok(version)
    });

    match outcome {
        Ok(Some(version)) => CommandResult::success(
            "migrate",
            format!("database schema is up to date at version {version}"),
        ),
        Ok(None) => CommandResult::success("migrate", "no migrations are registered"),
        Err(report) => report,
    }
}
