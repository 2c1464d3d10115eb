use std::sync::Arc;

use maildesk_agent::llm::{ChatBackend, EmbeddingBackend};
use maildesk_agent::openai::OpenAiClient;
use maildesk_agent::processor::{EmailProcessor, ProcessedEmail};
use maildesk_agent::rag::RagEngine;
use maildesk_agent::router::ModelRouter;
use maildesk_agent::runtime::SupportAgent;
use maildesk_agent::tools::escalation::EscalateToHumanTool;
use maildesk_agent::tools::knowledge_base::SearchKnowledgeBaseTool;
use maildesk_agent::tools::orders::{GetCustomerOrdersTool, GetFulfillmentTool, GetOrderTool};
use maildesk_agent::tools::ToolRegistry;
use maildesk_core::ports::OrderDirectory;
use maildesk_db::repositories::{
    SqlEscalationRepository, SqlInteractionRepository, SqlKnowledgeBaseRepository,
};
use maildesk_db::{connect, migrations, StaticOrderBook};

use crate::commands::{execute, load_config, CommandResult};

pub fn run(
    from: &str,
    subject: &str,
    body: &str,
    sender_name: Option<&str>,
    email_id: Option<&str>,
) -> CommandResult {
    let config = match load_config("process") {
        Ok(config) => config,
        Err(report) => return report,
    };

    let outcome = execute("process", async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let openai = Arc::new(
            OpenAiClient::new(&config.llm)
                .map_err(|error| ("llm_client", error.to_string(), 6u8))?,
        );

        let order_book: Arc<dyn OrderDirectory> = match &config.orders.data_path {
            Some(path) => Arc::new(
                StaticOrderBook::from_file(path)
                    .await
                    .map_err(|error| ("order_fixture", error.to_string(), 4u8))?,
            ),
            None => Arc::new(StaticOrderBook::sample()),
        };

        let knowledge = SqlKnowledgeBaseRepository::new(pool.clone());
        let escalations = Arc::new(SqlEscalationRepository::new(pool.clone()));
        let interactions = SqlInteractionRepository::new(pool.clone());

        let rag = Arc::new(RagEngine::new(
            openai.clone() as Arc<dyn EmbeddingBackend>,
            Arc::new(knowledge),
            config.rag.top_k,
            config.rag.similarity_threshold,
        ));

        let mut registry = ToolRegistry::new();
        registry.register(SearchKnowledgeBaseTool::new(rag));
        registry.register(GetOrderTool::new(order_book.clone()));
        registry.register(GetFulfillmentTool::new(order_book.clone()));
        registry.register(GetCustomerOrdersTool::new(order_book));
        registry.register(EscalateToHumanTool::new(escalations.clone()));

        let agent = Arc::new(SupportAgent::new(
            openai as Arc<dyn ChatBackend>,
            config.llm.classifier_model.clone(),
            ModelRouter::new(&config.llm),
            registry,
            escalations,
        ));
        let processor = EmailProcessor::new(agent, Arc::new(interactions));

        let result = processor
            .process(from, subject, body, sender_name, email_id)
            .await
            .map_err(|error| ("processing", error.to_string(), 7u8))?;

        pool.close().await;
        Ok(result)
    });

    match outcome {
        Ok(result) if result.success => CommandResult::success("process", render(&result)),
        Ok(result) => CommandResult::failure(
            "process",
            "rejected",
            result.error.unwrap_or_else(|| "email processing failed".to_string()),
            1,
        ),
        Err(report) => report,
    }
}

fn render(outcome: &ProcessedEmail) -> String {
    serde_json::json!({
        "intent": outcome.intent,
        "complexity": outcome.complexity,
        "model_used": outcome.model_used,
        "tools_used": outcome.tools_used,
        "tokens_input": outcome.tokens_input,
        "tokens_output": outcome.tokens_output,
        "response_time_ms": outcome.response_time_ms,
        "escalated": outcome.escalated,
        "escalation_reason": outcome.escalation_reason,
        "interaction_id": outcome.interaction_id,
        "response_text": outcome.response_text,
    })
    .to_string()
}
