//! Admin endpoints: escalation queue, interaction audit log, and the
//! model routing table.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use maildesk_agent::runtime::SupportAgent;
use maildesk_core::domain::interaction::{EscalationRecord, EscalationStatus, InteractionRecord};
use maildesk_db::repositories::{
    RepositoryError, SqlEscalationRepository, SqlInteractionRepository,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

const DEFAULT_PAGE_LIMIT: usize = 20;
const MAX_PAGE_LIMIT: usize = 100;

#[derive(Clone)]
struct AdminState {
    escalations: SqlEscalationRepository,
    interactions: SqlInteractionRepository,
    agent: Arc<SupportAgent>,
}

pub fn router(
    escalations: SqlEscalationRepository,
    interactions: SqlInteractionRepository,
    agent: Arc<SupportAgent>,
) -> Router {
    Router::new()
        .route("/admin/escalations", get(list_escalations))
        .route("/admin/escalations/{id}", get(get_escalation))
        .route("/admin/interactions", get(list_interactions))
        .route("/admin/interactions/{id}", get(get_interaction))
        .route("/admin/routing", get(routing_table))
        .with_state(AdminState { escalations, interactions, agent })
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    status: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

type ErrorReply = (StatusCode, Json<ErrorBody>);

#[derive(Debug, Serialize)]
struct EscalationSummary {
    id: String,
    interaction_id: Option<String>,
    reason: String,
    priority: &'static str,
    customer_email: String,
    summary: String,
    status: &'static str,
    assigned_to: Option<String>,
    created_at: String,
    resolved_at: Option<String>,
}

#[derive(Debug, Serialize)]
struct EscalationDetail {
    #[serde(flatten)]
    summary: EscalationSummary,
    context: Value,
    resolution_notes: Option<String>,
}

#[derive(Debug, Serialize)]
struct EscalationListResponse {
    escalations: Vec<EscalationSummary>,
    total: i64,
    status: &'static str,
    limit: usize,
}

#[derive(Debug, Serialize)]
struct InteractionSummary {
    id: String,
    email_id: Option<String>,
    sender_email: String,
    subject: String,
    intent: String,
    complexity: String,
    model_used: String,
    tools_used: Vec<String>,
    tokens_input: u32,
    tokens_output: u32,
    response_time_ms: u64,
    created_at: String,
}

#[derive(Debug, Serialize)]
struct InteractionDetail {
    #[serde(flatten)]
    summary: InteractionSummary,
    body: String,
    response: String,
}

#[derive(Debug, Serialize)]
struct InteractionListResponse {
    interactions: Vec<InteractionSummary>,
    limit: usize,
}

async fn list_escalations(
    State(state): State<AdminState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<EscalationListResponse>, ErrorReply> {
    let status = match query.status.as_deref() {
        None => EscalationStatus::Pending,
        Some(raw) => parse_status(raw).ok_or_else(|| {
            bad_request(format!("unknown escalation status `{raw}`"))
        })?,
    };
    let limit = page_limit(query.limit);

    let records =
        state.escalations.list_by_status(status, limit).await.map_err(unavailable)?;
    let total = state.escalations.count_by_status(status).await.map_err(unavailable)?;

    Ok(Json(EscalationListResponse {
        escalations: records.iter().map(escalation_summary).collect(),
        total,
        status: status.as_str(),
        limit,
    }))
}

async fn get_escalation(
    State(state): State<AdminState>,
    Path(id): Path<String>,
) -> Result<Json<EscalationDetail>, ErrorReply> {
    let record = state
        .escalations
        .find_by_id(&id)
        .await
        .map_err(unavailable)?
        .ok_or_else(|| not_found("Escalation not found"))?;

    Ok(Json(EscalationDetail {
        summary: escalation_summary(&record),
        context: record.context,
        resolution_notes: record.resolution_notes,
    }))
}

async fn list_interactions(
    State(state): State<AdminState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<InteractionListResponse>, ErrorReply> {
    let limit = page_limit(query.limit);
    let records = state.interactions.recent(limit).await.map_err(unavailable)?;

    Ok(Json(InteractionListResponse {
        interactions: records.iter().map(interaction_summary).collect(),
        limit,
    }))
}

async fn get_interaction(
    State(state): State<AdminState>,
    Path(id): Path<String>,
) -> Result<Json<InteractionDetail>, ErrorReply> {
    let record = state
        .interactions
        .find_by_id(&id)
        .await
        .map_err(unavailable)?
        .ok_or_else(|| not_found("Interaction not found"))?;

    Ok(Json(InteractionDetail {
        summary: interaction_summary(&record),
        body: record.body,
        response: record.response,
    }))
}

async fn routing_table(State(state): State<AdminState>) -> Json<Value> {
    Json(state.agent.routing_stats())
}

fn escalation_summary(record: &EscalationRecord) -> EscalationSummary {
    EscalationSummary {
        id: record.id.clone(),
        interaction_id: record.interaction_id.clone(),
        reason: record.reason.clone(),
        priority: record.priority.as_str(),
        customer_email: record.customer_email.clone(),
        summary: record.summary.clone(),
        status: record.status.as_str(),
        assigned_to: record.assigned_to.clone(),
        created_at: record.created_at.to_rfc3339(),
        resolved_at: record.resolved_at.map(|value| value.to_rfc3339()),
    }
}

fn interaction_summary(record: &InteractionRecord) -> InteractionSummary {
    InteractionSummary {
        id: record.id.clone(),
        email_id: record.email_id.clone(),
        sender_email: record.sender_email.clone(),
        subject: record.subject.clone(),
        intent: record.intent.clone(),
        complexity: record.complexity.clone(),
        model_used: record.model_used.clone(),
        tools_used: record.tools_used.clone(),
        tokens_input: record.tokens_input,
        tokens_output: record.tokens_output,
        response_time_ms: record.response_time_ms,
        created_at: record.created_at.to_rfc3339(),
    }
}

fn parse_status(value: &str) -> Option<EscalationStatus> {
    match value {
        "pending" => Some(EscalationStatus::Pending),
        "in_progress" => Some(EscalationStatus::InProgress),
        "resolved" => Some(EscalationStatus::Resolved),
        _ => None,
    }
}

fn page_limit(requested: Option<usize>) -> usize {
    requested.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT)
}

fn bad_request(message: String) -> ErrorReply {
    (StatusCode::BAD_REQUEST, Json(ErrorBody { error: message }))
}

fn not_found(message: &str) -> ErrorReply {
    (StatusCode::NOT_FOUND, Json(ErrorBody { error: message.to_string() }))
}

fn unavailable(err: RepositoryError) -> ErrorReply {
    error!(event_name = "admin_query_failed", error = %err, "admin query failed");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorBody { error: "storage temporarily unavailable".to_string() }),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use maildesk_agent::llm::{ChatBackend, ChatRequest, ChatResponse, LlmError};
    use maildesk_agent::router::ModelRouter;
    use maildesk_agent::runtime::SupportAgent;
    use maildesk_agent::tools::ToolRegistry;
    use maildesk_core::config::{DatabaseConfig, LlmConfig, LlmProvider};
    use maildesk_core::domain::interaction::{EscalationPriority, EscalationRecord};
    use maildesk_core::ports::EscalationStore;
    use maildesk_db::repositories::{SqlEscalationRepository, SqlInteractionRepository};
    use maildesk_db::{connect, migrations};
    use tower::util::ServiceExt;

    use super::router;

    struct OfflineBackend;

    #[async_trait]
    impl ChatBackend for OfflineBackend {
        async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse, LlmError> {
            Err(LlmError::Transport("offline".to_string()))
        }
    }

    fn llm_config() -> LlmConfig {
        LlmConfig {
            provider: LlmProvider::Compatible,
            api_key: None,
            base_url: Some("http://localhost:9".to_string()),
            classifier_model: "gpt-4o-mini".to_string(),
            simple_model: "gpt-4o-mini".to_string(),
            medium_model: "gpt-4o-mini".to_string(),
            complex_model: "gpt-4o".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_dimensions: 1536,
            timeout_secs: 30,
        }
    }

    async fn admin_app() -> (axum::Router, SqlEscalationRepository) {
        let database = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            timeout_secs: 30,
        };
        let pool = connect(&database).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");

        let escalations = SqlEscalationRepository::new(pool.clone());
        let interactions = SqlInteractionRepository::new(pool);
        let agent = Arc::new(SupportAgent::new(
            Arc::new(OfflineBackend),
            "gpt-4o-mini",
            ModelRouter::new(&llm_config()),
            ToolRegistry::new(),
            Arc::new(escalations.clone()),
        ));

        (router(escalations.clone(), interactions, agent), escalations)
    }

    #[tokio::test]
    async fn escalation_queue_defaults_to_pending() {
        let (app, escalations) = admin_app().await;
        let record = EscalationRecord::pending(
            "complaint",
            EscalationPriority::High,
            "jane@example.com",
            "Subject: broken item",
            None,
        );
        escalations.append(&record).await.expect("append");

        let response = app
            .oneshot(
                Request::builder().uri("/admin/escalations").body(Body::empty()).expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let payload: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(payload["total"], 1);
        assert_eq!(payload["status"], "pending");
        assert_eq!(payload["escalations"][0]["priority"], "high");
    }

    #[tokio::test]
    async fn unknown_status_filter_is_rejected() {
        let (app, _escalations) = admin_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/admin/escalations?status=archived")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_interaction_returns_not_found() {
        let (app, _escalations) = admin_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/admin/interactions/no-such-id")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn routing_table_lists_all_tiers() {
        let (app, _escalations) = admin_app().await;

        let response = app
            .oneshot(
                Request::builder().uri("/admin/routing").body(Body::empty()).expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let payload: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert!(payload["tiers"]["simple"].is_object());
        assert!(payload["tiers"]["complex"].is_object());
    }
}
