use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Audit row written after every processed email.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub id: String,
    #[serde(default)]
    pub email_id: Option<String>,
    pub sender_email: String,
    pub subject: String,
    pub body: String,
    pub intent: String,
    pub complexity: String,
    pub model_used: String,
    pub tools_used: Vec<String>,
    pub response: String,
    pub tokens_input: u32,
    pub tokens_output: u32,
    pub response_time_ms: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl EscalationPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationStatus {
    Pending,
    InProgress,
    Resolved,
}

impl EscalationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
        }
    }
}

/// A case handed to a human agent. Optionally references the interaction
/// that produced it; the interaction's lifecycle is independent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EscalationRecord {
    pub id: String,
    #[serde(default)]
    pub interaction_id: Option<String>,
    pub reason: String,
    pub priority: EscalationPriority,
    pub customer_email: String,
    pub summary: String,
    #[serde(default)]
    pub context: Value,
    pub status: EscalationStatus,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub resolution_notes: Option<String>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl EscalationRecord {
    /// New pending escalation with a generated id.
    pub fn pending(
        reason: impl Into<String>,
        priority: EscalationPriority,
        customer_email: impl Into<String>,
        summary: impl Into<String>,
        interaction_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            interaction_id,
            reason: reason.into(),
            priority,
            customer_email: customer_email.into(),
            summary: summary.into(),
            context: Value::Null,
            status: EscalationStatus::Pending,
            assigned_to: None,
            resolution_notes: None,
            resolved_at: None,
            created_at: Utc::now(),
        }
    }
}
