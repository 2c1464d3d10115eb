//! Human escalation tool. Persists a pending case and returns a
//! confirmation the model relays to the customer.

use std::sync::Arc;

use async_trait::async_trait;
use maildesk_core::domain::interaction::{EscalationPriority, EscalationRecord};
use maildesk_core::ports::EscalationStore;
use serde_json::{json, Value};
use tracing::info;

use crate::tools::{required_str, Tool, ToolResult};

pub struct EscalateToHumanTool {
    store: Arc<dyn EscalationStore>,
}

impl EscalateToHumanTool {
    pub fn new(store: Arc<dyn EscalationStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for EscalateToHumanTool {
    fn name(&self) -> &'static str {
        "escalate_to_human"
    }

    fn description(&self) -> &'static str {
        "Escalate a customer issue to a human support agent. Use this when: \
         1) The customer explicitly requests to speak with a human, \
         2) The issue is too complex to resolve automatically, \
         3) The customer is frustrated or angry, \
         4) The query involves sensitive matters like refunds over $100 or complaints, \
         5) You cannot find relevant information to help the customer."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "reason": {
                    "type": "string",
                    "description": "Brief explanation of why escalation is needed",
                },
                "priority": {
                    "type": "string",
                    "enum": ["low", "medium", "high", "urgent"],
                    "description": "Priority level based on issue severity",
                },
                "customer_email": {
                    "type": "string",
                    "description": "Customer's email address",
                },
                "summary": {
                    "type": "string",
                    "description": "Summary of the customer's issue and any actions already taken",
                },
            },
            "required": ["reason", "priority", "customer_email", "summary"],
        })
    }

    async fn execute(&self, arguments: Value) -> ToolResult {
        let reason = match required_str(&arguments, "reason") {
            Ok(value) => value,
            Err(failure) => return failure,
        };
        let customer_email = match required_str(&arguments, "customer_email") {
            Ok(value) => value,
            Err(failure) => return failure,
        };
        let summary = match required_str(&arguments, "summary") {
            Ok(value) => value,
            Err(failure) => return failure,
        };

        // Invalid priorities degrade to medium rather than failing the call.
        let priority = arguments
            .get("priority")
            .and_then(Value::as_str)
            .and_then(EscalationPriority::parse)
            .unwrap_or(EscalationPriority::Medium);

        let interaction_id = arguments
            .get("interaction_id")
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut record =
            EscalationRecord::pending(reason, priority, customer_email, summary, interaction_id);
        record.context = json!({
            "priority": priority.as_str(),
            "customer_email": customer_email,
            "summary": summary,
        });

        if let Err(error) = self.store.append(&record).await {
            return ToolResult::fail(format!("Failed to create escalation: {error}"));
        }

        info!(
            event_name = "escalation_created",
            escalation_id = %record.id,
            priority = priority.as_str(),
            "escalation persisted"
        );

        ToolResult::ok(json!({
            "escalated": true,
            "escalation": {
                "id": record.id,
                "reason": record.reason,
                "priority": priority.as_str(),
                "customer_email": record.customer_email,
                "summary": record.summary,
                "created_at": record.created_at.to_rfc3339(),
            },
            "message": format!(
                "Your request has been escalated to our support team. \
                 A human agent will review your case with {} priority \
                 and respond within 24 hours.",
                priority.as_str()
            ),
        }))
    }
}
