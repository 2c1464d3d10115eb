//! Capability traits the agent consumes. `maildesk-db` provides the
//! production implementations; tests inject doubles through the same
//! seams.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::interaction::{EscalationRecord, InteractionRecord};
use crate::domain::order::{Fulfillment, Order};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PortError {
    #[error("backing store failure: {0}")]
    Store(String),
    #[error("decode failure: {0}")]
    Decode(String),
}

/// Order/fulfillment data provider. Lookups are by *normalized* order
/// number; normalization is the implementation's responsibility.
#[async_trait]
pub trait OrderDirectory: Send + Sync {
    async fn find_by_number(&self, order_number: &str) -> Result<Option<Order>, PortError>;

    /// Case-insensitive match on customer email, newest first, truncated
    /// to `limit`.
    async fn find_by_customer(
        &self,
        customer_email: &str,
        limit: usize,
    ) -> Result<Vec<Order>, PortError>;

    async fn fulfillment_for(&self, order_number: &str) -> Result<Option<Fulfillment>, PortError>;
}

/// One candidate from a vector-similarity query. `distance` is cosine
/// distance (0 = identical); the retrieval engine converts it to a
/// similarity score before anything else sees it.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorHit {
    pub id: String,
    pub content: String,
    pub category: String,
    pub title: Option<String>,
    pub metadata: Value,
    pub distance: f32,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Nearest candidates for `vector`, ordered by ascending distance.
    /// A category, when given, is an equality constraint applied before
    /// ranking.
    async fn query(
        &self,
        vector: &[f32],
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<VectorHit>, PortError>;
}

#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// Appends one interaction record; atomic per record.
    async fn append(&self, record: &InteractionRecord) -> Result<(), PortError>;
}

#[async_trait]
pub trait EscalationStore: Send + Sync {
    /// Appends one escalation record; atomic per record.
    async fn append(&self, record: &EscalationRecord) -> Result<(), PortError>;
}
