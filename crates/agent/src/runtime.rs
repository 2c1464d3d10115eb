//! Orchestration loop: classify, maybe escalate immediately, route to a
//! model tier, then run a bounded tool-calling conversation.

use std::sync::Arc;
use std::time::Instant;

use maildesk_core::domain::classification::{Classification, Intent};
use maildesk_core::ports::EscalationStore;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::classifier::{should_escalate, IntentClassifier};
use crate::llm::{ChatBackend, ChatMessage, ChatRequest, LlmError, TokenUsage};
use crate::prompts::{agent_system_prompt, email_context_prompt};
use crate::router::ModelRouter;
use crate::tools::escalation::EscalateToHumanTool;
use crate::tools::{Tool, ToolRegistry};

/// Hard bound on responder model calls per email.
const MAX_ITERATIONS: usize = 5;

const EXHAUSTION_RESPONSE: &str = "I apologize, but I'm having difficulty processing your \
     request. Your inquiry has been forwarded to our support team for assistance.";

const EMPTY_RESPONSE: &str = "I apologize, I was unable to generate a response.";

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("llm call failed: {0}")]
    Llm(#[from] LlmError),
}

#[derive(Clone, Debug)]
pub struct AgentResponse {
    pub response_text: String,
    pub classification: Classification,
    pub tools_used: Vec<String>,
    pub tool_results: Vec<Value>,
    pub model_used: String,
    pub tokens_input: u32,
    pub tokens_output: u32,
    pub response_time_ms: u64,
    pub escalated: bool,
    pub escalation_reason: Option<String>,
}

pub struct SupportAgent {
    backend: Arc<dyn ChatBackend>,
    classifier: IntentClassifier<Arc<dyn ChatBackend>>,
    router: ModelRouter,
    registry: ToolRegistry,
    escalations: Arc<dyn EscalationStore>,
}

impl SupportAgent {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        classifier_model: impl Into<String>,
        router: ModelRouter,
        registry: ToolRegistry,
        escalations: Arc<dyn EscalationStore>,
    ) -> Self {
        let classifier = IntentClassifier::new(backend.clone(), classifier_model);
        Self { backend, classifier, router, registry, escalations }
    }

    /// Full pipeline for one email. Only LLM transport failures error out;
    /// everything else degrades inside the response.
    #[instrument(skip_all, fields(sender_email = %sender_email))]
    pub async fn process_email(
        &self,
        subject: &str,
        body: &str,
        sender_email: &str,
        sender_name: Option<&str>,
    ) -> Result<AgentResponse, AgentError> {
        let started = Instant::now();

        let classification = self.classifier.classify(subject, body, sender_email).await?;
        info!(
            event_name = "email_classified",
            intent = classification.intent.as_str(),
            complexity = classification.complexity.as_str(),
            confidence = classification.confidence,
            "classification complete"
        );

        if should_escalate(&classification) {
            return Ok(self
                .immediate_escalation(&classification, subject, body, sender_email, started)
                .await);
        }

        let model_config = self
            .router
            .model_config(classification.complexity, Some(classification.intent))
            .clone();

        let mut messages = vec![
            ChatMessage::system(agent_system_prompt(true)),
            ChatMessage::user(email_context_prompt(subject, body, sender_email, sender_name)),
        ];

        let mut usage = TokenUsage::default();
        let mut tools_used: Vec<String> = Vec::new();
        let mut tool_results: Vec<Value> = Vec::new();
        let mut response_text: Option<String> = None;

        for _ in 0..MAX_ITERATIONS {
            let response = self
                .backend
                .chat(ChatRequest {
                    model: model_config.model.clone(),
                    messages: messages.clone(),
                    temperature: model_config.temperature,
                    max_tokens: Some(model_config.max_tokens),
                    tools: self.registry.schemas(),
                })
                .await?;

            usage.accumulate(response.usage);

            if response.tool_calls.is_empty() {
                response_text = Some(
                    response
                        .text
                        .filter(|text| !text.trim().is_empty())
                        .unwrap_or_else(|| EMPTY_RESPONSE.to_string()),
                );
                break;
            }

            messages.push(ChatMessage::assistant_tool_calls(response.tool_calls.clone()));

            for call in &response.tool_calls {
                tools_used.push(call.name.clone());

                let arguments = if call.arguments.is_object() {
                    call.arguments.clone()
                } else {
                    json!({})
                };

                let result = self.registry.execute(&call.name, arguments.clone()).await;
                tool_results.push(json!({
                    "tool": call.name,
                    "args": arguments,
                    "result": result.to_value(),
                }));

                // A successful escalation ends the conversation; remaining
                // tool calls in this batch are dropped.
                if call.name == "escalate_to_human" && result.success {
                    let message = result
                        .data
                        .as_ref()
                        .and_then(|data| data.get("message"))
                        .and_then(Value::as_str)
                        .unwrap_or("Escalated to human agent.")
                        .to_string();
                    let reason = arguments
                        .get("reason")
                        .and_then(Value::as_str)
                        .unwrap_or("Agent escalation")
                        .to_string();

                    return Ok(AgentResponse {
                        response_text: message,
                        classification,
                        tools_used,
                        tool_results,
                        model_used: model_config.model,
                        tokens_input: usage.input,
                        tokens_output: usage.output,
                        response_time_ms: elapsed_ms(started),
                        escalated: true,
                        escalation_reason: Some(reason),
                    });
                }

                messages.push(ChatMessage::tool_result(
                    call.id.clone(),
                    result.to_value().to_string(),
                ));
            }
        }

        let response_text = response_text.unwrap_or_else(|| {
            warn!(
                event_name = "agent_loop_exhausted",
                iterations = MAX_ITERATIONS,
                "tool loop hit the iteration bound without a final answer"
            );
            EXHAUSTION_RESPONSE.to_string()
        });

        Ok(AgentResponse {
            response_text,
            classification,
            tools_used,
            tool_results,
            model_used: model_config.model,
            tokens_input: usage.input,
            tokens_output: usage.output,
            response_time_ms: elapsed_ms(started),
            escalated: false,
            escalation_reason: None,
        })
    }

    /// Escalation before any responder call: no routing, zero responder
    /// tokens, `model_used` reported as "none".
    async fn immediate_escalation(
        &self,
        classification: &Classification,
        subject: &str,
        body: &str,
        sender_email: &str,
        started: Instant,
    ) -> AgentResponse {
        let priority =
            if classification.intent == Intent::Complaint { "high" } else { "medium" };
        let truncated: String = body.chars().take(500).collect();

        let tool = EscalateToHumanTool::new(self.escalations.clone());
        let result = tool
            .execute(json!({
                "reason": format!("Immediate escalation: {}", classification.intent.as_str()),
                "priority": priority,
                "customer_email": sender_email,
                "summary": format!("Subject: {subject}\n\nBody: {truncated}"),
            }))
            .await;

        let message = result
            .data
            .as_ref()
            .and_then(|data| data.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("Your request has been escalated to our support team.")
            .to_string();

        if !result.success {
            warn!(
                event_name = "immediate_escalation_persist_failed",
                error = result.error.as_deref().unwrap_or("unknown"),
                "escalation record could not be stored"
            );
        }

        AgentResponse {
            response_text: message,
            classification: classification.clone(),
            tools_used: vec!["escalate_to_human".to_string()],
            tool_results: vec![result.to_value()],
            model_used: "none".to_string(),
            tokens_input: 0,
            tokens_output: 0,
            response_time_ms: elapsed_ms(started),
            escalated: true,
            escalation_reason: Some(classification.reasoning.clone()),
        }
    }

    pub fn routing_stats(&self) -> Value {
        self.router.routing_stats()
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
