//! Application wiring: config, database, LLM client, tool registry, and
//! the HTTP router.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use maildesk_agent::llm::{ChatBackend, EmbeddingBackend, LlmError};
use maildesk_agent::openai::OpenAiClient;
use maildesk_agent::processor::EmailProcessor;
use maildesk_agent::rag::RagEngine;
use maildesk_agent::router::ModelRouter;
use maildesk_agent::runtime::SupportAgent;
use maildesk_agent::tools::escalation::EscalateToHumanTool;
use maildesk_agent::tools::knowledge_base::SearchKnowledgeBaseTool;
use maildesk_agent::tools::orders::{GetCustomerOrdersTool, GetFulfillmentTool, GetOrderTool};
use maildesk_agent::tools::ToolRegistry;
use maildesk_core::config::AppConfig;
use maildesk_core::ports::OrderDirectory;
use maildesk_db::orders::OrderBookError;
use maildesk_db::repositories::{
    SqlEscalationRepository, SqlInteractionRepository, SqlKnowledgeBaseRepository,
};
use maildesk_db::{connect, migrations, DbPool, StaticOrderBook};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub agent: Arc<SupportAgent>,
    pub processor: Arc<EmailProcessor>,
    pub escalations: SqlEscalationRepository,
    pub interactions: SqlInteractionRepository,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("llm client initialization failed: {0}")]
    Llm(#[from] LlmError),
    #[error("order fixture load failed: {0}")]
    Orders(#[from] OrderBookError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "bootstrap_start", "starting application bootstrap");

    let db_pool = connect(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "bootstrap_database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "bootstrap_migrations_applied", "database migrations applied");

    let openai = Arc::new(OpenAiClient::new(&config.llm)?);

    let order_book: Arc<dyn OrderDirectory> = match &config.orders.data_path {
        Some(path) => Arc::new(StaticOrderBook::from_file(path).await?),
        None => Arc::new(StaticOrderBook::sample()),
    };

    let knowledge = SqlKnowledgeBaseRepository::new(db_pool.clone());
    let escalations = SqlEscalationRepository::new(db_pool.clone());
    let interactions = SqlInteractionRepository::new(db_pool.clone());

    let rag = Arc::new(RagEngine::new(
        openai.clone() as Arc<dyn EmbeddingBackend>,
        Arc::new(knowledge),
        config.rag.top_k,
        config.rag.similarity_threshold,
    ));

    let escalation_store = Arc::new(escalations.clone());
    let mut registry = ToolRegistry::new();
    registry.register(SearchKnowledgeBaseTool::new(rag));
    registry.register(GetOrderTool::new(order_book.clone()));
    registry.register(GetFulfillmentTool::new(order_book.clone()));
    registry.register(GetCustomerOrdersTool::new(order_book));
    registry.register(EscalateToHumanTool::new(escalation_store.clone()));

    let agent = Arc::new(SupportAgent::new(
        openai as Arc<dyn ChatBackend>,
        config.llm.classifier_model.clone(),
        ModelRouter::new(&config.llm),
        registry,
        escalation_store,
    ));
    let processor = Arc::new(EmailProcessor::new(agent.clone(), Arc::new(interactions.clone())));

    info!(event_name = "bootstrap_complete", "application bootstrap complete");

    Ok(Application { config, db_pool, agent, processor, escalations, interactions })
}

pub fn router(app: &Application) -> Router {
    Router::new()
        .merge(crate::health::router(app.db_pool.clone()))
        .nest(
            "/api",
            Router::new()
                .route("/email/process", post(crate::email::process_email))
                .with_state(app.processor.clone())
                .merge(crate::admin::router(
                    app.escalations.clone(),
                    app.interactions.clone(),
                    app.agent.clone(),
                )),
        )
}
