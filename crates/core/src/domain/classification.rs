use serde::{Deserialize, Serialize};

/// What the customer wants from this email.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    OrderStatus,
    ShippingTracking,
    ReturnRequest,
    RefundRequest,
    ProductQuestion,
    PolicyQuestion,
    Complaint,
    GeneralInquiry,
    EscalationRequest,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderStatus => "order_status",
            Self::ShippingTracking => "shipping_tracking",
            Self::ReturnRequest => "return_request",
            Self::RefundRequest => "refund_request",
            Self::ProductQuestion => "product_question",
            Self::PolicyQuestion => "policy_question",
            Self::Complaint => "complaint",
            Self::GeneralInquiry => "general_inquiry",
            Self::EscalationRequest => "escalation_request",
        }
    }

    /// Maps a model-produced label to an intent. Unknown or malformed labels
    /// fall back to `GeneralInquiry` so an invalid value never enters the
    /// system.
    pub fn from_wire(value: &str) -> Self {
        match value.trim() {
            "order_status" => Self::OrderStatus,
            "shipping_tracking" => Self::ShippingTracking,
            "return_request" => Self::ReturnRequest,
            "refund_request" => Self::RefundRequest,
            "product_question" => Self::ProductQuestion,
            "policy_question" => Self::PolicyQuestion,
            "complaint" => Self::Complaint,
            "escalation_request" => Self::EscalationRequest,
            _ => Self::GeneralInquiry,
        }
    }
}

/// Complexity bucket driving tiered model routing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Medium => "medium",
            Self::Complex => "complex",
        }
    }

    /// Numeric rank used for upgrade-only tier comparisons.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Simple => 1,
            Self::Medium => 2,
            Self::Complex => 3,
        }
    }

    pub fn from_wire(value: &str) -> Self {
        match value.trim() {
            "simple" => Self::Simple,
            "complex" => Self::Complex,
            _ => Self::Medium,
        }
    }
}

/// Result of classifying one inbound email. Produced exactly once per
/// processed email and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: Intent,
    pub complexity: Complexity,
    pub confidence: f64,
    pub requires_order_lookup: bool,
    pub requires_knowledge_base: bool,
    pub suggested_tools: Vec<String>,
    pub reasoning: String,
}
