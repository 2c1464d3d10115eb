//! Email processing service: parse, run the agent, write the audit row.
//! One record per processed email; a failed audit write is reported in
//! the result but does not withhold the drafted response.

use std::sync::Arc;

use chrono::Utc;
use maildesk_core::domain::email::{EmailParser, ParsedEmail};
use maildesk_core::domain::interaction::InteractionRecord;
use maildesk_core::errors::{ApplicationError, DomainError};
use maildesk_core::ports::InteractionStore;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::runtime::{AgentError, AgentResponse, SupportAgent};

#[derive(Clone, Debug)]
pub struct ProcessedEmail {
    pub success: bool,
    pub response_text: String,
    pub intent: String,
    pub complexity: String,
    pub tools_used: Vec<String>,
    pub model_used: String,
    pub tokens_input: u32,
    pub tokens_output: u32,
    pub response_time_ms: u64,
    pub escalated: bool,
    pub escalation_reason: Option<String>,
    /// Empty when the audit write failed or processing never reached the
    /// agent.
    pub interaction_id: String,
    pub error: Option<String>,
}

impl ProcessedEmail {
    fn rejected(error: String) -> Self {
        Self {
            success: false,
            response_text: String::new(),
            intent: "unknown".to_string(),
            complexity: "unknown".to_string(),
            tools_used: Vec::new(),
            model_used: "none".to_string(),
            tokens_input: 0,
            tokens_output: 0,
            response_time_ms: 0,
            escalated: false,
            escalation_reason: None,
            interaction_id: String::new(),
            error: Some(error),
        }
    }
}

pub struct EmailProcessor {
    parser: EmailParser,
    agent: Arc<SupportAgent>,
    interactions: Arc<dyn InteractionStore>,
}

impl EmailProcessor {
    pub fn new(agent: Arc<SupportAgent>, interactions: Arc<dyn InteractionStore>) -> Self {
        Self { parser: EmailParser::new(), agent, interactions }
    }

    /// Processes one inbound email end to end. Invalid input and agent
    /// failures come back as unsuccessful results, not errors; the HTTP
    /// and CLI layers decide how to present them.
    #[instrument(skip_all, fields(from_email = %from_email))]
    pub async fn process(
        &self,
        from_email: &str,
        subject: &str,
        body: &str,
        sender_name: Option<&str>,
        email_id: Option<&str>,
    ) -> Result<ProcessedEmail, ApplicationError> {
        let parsed = match self.parser.parse(from_email, subject, body, sender_name, email_id) {
            Ok(parsed) => parsed,
            Err(DomainError::InvalidSenderAddress { address }) => {
                return Ok(ProcessedEmail::rejected(format!(
                    "Invalid sender email address: {address}"
                )));
            }
            Err(error) => return Ok(ProcessedEmail::rejected(error.to_string())),
        };

        let agent_response = match self
            .agent
            .process_email(
                &parsed.subject,
                &parsed.body,
                &parsed.sender_email,
                parsed.sender_name.as_deref(),
            )
            .await
        {
            Ok(response) => response,
            Err(AgentError::Llm(error)) => {
                error!(
                    event_name = "agent_processing_failed",
                    error = %error,
                    "agent could not process email"
                );
                return Ok(ProcessedEmail::rejected(format!("Processing error: {error}")));
            }
        };

        let interaction_id = self.log_interaction(&parsed, &agent_response).await;

        info!(
            event_name = "email_processed",
            intent = agent_response.classification.intent.as_str(),
            model = %agent_response.model_used,
            escalated = agent_response.escalated,
            response_time_ms = agent_response.response_time_ms,
            "email processing complete"
        );

        Ok(ProcessedEmail {
            success: true,
            response_text: agent_response.response_text,
            intent: agent_response.classification.intent.as_str().to_string(),
            complexity: agent_response.classification.complexity.as_str().to_string(),
            tools_used: agent_response.tools_used,
            model_used: agent_response.model_used,
            tokens_input: agent_response.tokens_input,
            tokens_output: agent_response.tokens_output,
            response_time_ms: agent_response.response_time_ms,
            escalated: agent_response.escalated,
            escalation_reason: agent_response.escalation_reason,
            interaction_id,
            error: None,
        })
    }

    /// Returns the stored record id, or empty string if the write failed.
    async fn log_interaction(&self, parsed: &ParsedEmail, response: &AgentResponse) -> String {
        let record = InteractionRecord {
            id: Uuid::new_v4().to_string(),
            email_id: parsed.email_id.clone(),
            sender_email: parsed.sender_email.clone(),
            subject: parsed.subject.clone(),
            body: parsed.body.clone(),
            intent: response.classification.intent.as_str().to_string(),
            complexity: response.classification.complexity.as_str().to_string(),
            model_used: response.model_used.clone(),
            tools_used: response.tools_used.clone(),
            response: response.response_text.clone(),
            tokens_input: response.tokens_input,
            tokens_output: response.tokens_output,
            response_time_ms: response.response_time_ms,
            created_at: Utc::now(),
        };

        match self.interactions.append(&record).await {
            Ok(()) => record.id,
            Err(error) => {
                error!(
                    event_name = "interaction_log_failed",
                    error = %error,
                    "audit record could not be written"
                );
                String::new()
            }
        }
    }
}
