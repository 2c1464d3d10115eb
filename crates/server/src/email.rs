//! Inbound email processing endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use maildesk_agent::processor::{EmailProcessor, ProcessedEmail};
use maildesk_core::errors::InterfaceError;
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Debug, Deserialize)]
pub struct EmailProcessRequest {
    #[serde(rename = "from")]
    pub from_email: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub email_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenBreakdown {
    pub input: u32,
    pub output: u32,
    pub total: u32,
}

#[derive(Debug, Serialize)]
pub struct EmailProcessResponse {
    pub success: bool,
    pub response_text: String,
    pub intent: String,
    pub complexity: String,
    pub tools_used: Vec<String>,
    pub model_used: String,
    pub tokens: TokenBreakdown,
    pub response_time_ms: u64,
    pub escalated: bool,
    pub escalation_reason: Option<String>,
    pub interaction_id: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub async fn process_email(
    State(processor): State<Arc<EmailProcessor>>,
    Json(request): Json<EmailProcessRequest>,
) -> Result<Json<EmailProcessResponse>, (StatusCode, Json<ErrorResponse>)> {
    let result = processor
        .process(
            &request.from_email,
            &request.subject,
            &request.body,
            request.sender_name.as_deref(),
            request.email_id.as_deref(),
        )
        .await
        .map_err(|err| {
            error!(event_name = "email_endpoint_failed", error = %err, "processing failed");
            let interface = InterfaceError::from(err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { error: interface.user_message().to_string() }),
            )
        })?;

    if !result.success {
        let detail =
            result.error.unwrap_or_else(|| "Email processing failed".to_string());
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: detail })));
    }

    Ok(Json(into_response(result)))
}

fn into_response(result: ProcessedEmail) -> EmailProcessResponse {
    EmailProcessResponse {
        success: result.success,
        response_text: result.response_text,
        intent: result.intent,
        complexity: result.complexity,
        tools_used: result.tools_used,
        model_used: result.model_used,
        tokens: TokenBreakdown {
            input: result.tokens_input,
            output: result.tokens_output,
            total: result.tokens_input + result.tokens_output,
        },
        response_time_ms: result.response_time_ms,
        escalated: result.escalated,
        escalation_reason: result.escalation_reason,
        interaction_id: result.interaction_id,
    }
}
