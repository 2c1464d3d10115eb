use maildesk_agent::llm::EmbeddingBackend;
use maildesk_agent::openai::OpenAiClient;
use maildesk_db::repositories::SqlKnowledgeBaseRepository;
use maildesk_db::{connect, fixtures, migrations};

use crate::commands::{execute, load_config, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(report) => return report,
    };

    let outcome = execute("seed", async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let openai = OpenAiClient::new(&config.llm)
            .map_err(|error| ("llm_client", error.to_string(), 6u8))?;
        let repository = SqlKnowledgeBaseRepository::new(pool.clone());

        let mut inserted = 0usize;
        let mut skipped = 0usize;
        for article in fixtures::seed_articles() {
            let present = repository
                .exists(article.title, article.category)
                .await
                .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;
            if present {
                skipped += 1;
                continue;
            }

            let embedding = openai
                .embed(article.content)
                .await
                .map_err(|error| ("embedding", error.to_string(), 6u8))?;
            repository
                .insert(&article.into_entry(embedding))
                .await
                .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;
            inserted += 1;
        }

        pool.close().await;
        Ok((inserted, skipped))
    });

    match outcome {
        Ok((inserted, skipped)) => CommandResult::success(
            "seed",
            format!("seeded {inserted} knowledge base articles ({skipped} already present)"),
        ),
        Err(report) => report,
    }
}
