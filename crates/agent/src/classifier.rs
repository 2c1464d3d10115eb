//! Intent classification. One cheap-model call with a strict JSON reply;
//! any parse failure degrades to a safe general-inquiry default instead of
//! surfacing an error.

use maildesk_core::domain::classification::{Classification, Complexity, Intent};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::llm::{ChatBackend, ChatMessage, ChatRequest, LlmError};
use crate::prompts::classification_prompt;

const CLASSIFIER_TEMPERATURE: f32 = 0.1;

pub struct IntentClassifier<B> {
    backend: B,
    model: String,
}

impl<B: ChatBackend> IntentClassifier<B> {
    pub fn new(backend: B, model: impl Into<String>) -> Self {
        Self { backend, model: model.into() }
    }

    /// Classifies an email. Transport errors propagate; malformed model
    /// output does not.
    pub async fn classify(
        &self,
        subject: &str,
        body: &str,
        sender_email: &str,
    ) -> Result<Classification, LlmError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(classification_prompt(subject, body, sender_email))],
            temperature: CLASSIFIER_TEMPERATURE,
            max_tokens: None,
            tools: Vec::new(),
        };

        let response = self.backend.chat(request).await?;
        let text = response.text.unwrap_or_default();

        Ok(parse_classification(&text))
    }
}

/// Immediate-escalation predicate, applied before any model routing:
/// explicit escalation requests, complex complaints, and low-confidence
/// classifications all go straight to a human.
pub fn should_escalate(classification: &Classification) -> bool {
    if classification.intent == Intent::EscalationRequest {
        return true;
    }
    if classification.intent == Intent::Complaint
        && classification.complexity == Complexity::Complex
    {
        return true;
    }
    classification.confidence < 0.5
}

fn parse_classification(text: &str) -> Classification {
    let stripped = strip_code_fences(text);

    let raw: RawClassification = match serde_json::from_str(stripped) {
        Ok(raw) => raw,
        Err(error) => {
            warn!(
                event_name = "classification_parse_failed",
                error = %error,
                "classifier output was not valid JSON, using fallback"
            );
            return fallback_classification();
        }
    };

    let suggested_tools = raw
        .suggested_tools
        .unwrap_or_else(|| vec![Value::String("search_knowledge_base".to_string())])
        .into_iter()
        .filter_map(|value| value.as_str().map(str::to_string))
        .collect();

    Classification {
        intent: Intent::from_wire(raw.intent.as_deref().unwrap_or("general_inquiry")),
        complexity: Complexity::from_wire(raw.complexity.as_deref().unwrap_or("medium")),
        confidence: raw.confidence.unwrap_or(0.8).clamp(0.0, 1.0),
        requires_order_lookup: raw.requires_order_lookup.unwrap_or(false),
        requires_knowledge_base: raw.requires_knowledge_base.unwrap_or(true),
        suggested_tools,
        reasoning: raw.reasoning.unwrap_or_default(),
    }
}

fn fallback_classification() -> Classification {
    Classification {
        intent: Intent::GeneralInquiry,
        complexity: Complexity::Medium,
        confidence: 0.5,
        requires_order_lookup: false,
        requires_knowledge_base: true,
        suggested_tools: vec!["search_knowledge_base".to_string()],
        reasoning: "Failed to parse classification, defaulting to general inquiry".to_string(),
    }
}

/// Strips a markdown code fence (with optional `json` language tag) that
/// models sometimes wrap JSON replies in.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

#[derive(Deserialize)]
struct RawClassification {
    intent: Option<String>,
    complexity: Option<String>,
    confidence: Option<f64>,
    requires_order_lookup: Option<bool>,
    requires_knowledge_base: Option<bool>,
    suggested_tools: Option<Vec<Value>>,
    reasoning: Option<String>,
}
