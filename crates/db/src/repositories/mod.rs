use maildesk_core::ports::PortError;
use thiserror::Error;

pub mod escalation;
pub mod interaction;
pub mod knowledge;
pub mod memory;

pub use escalation::SqlEscalationRepository;
pub use interaction::SqlInteractionRepository;
pub use knowledge::SqlKnowledgeBaseRepository;
pub use memory::InMemoryVectorIndex;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for PortError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Database(inner) => PortError::Store(inner.to_string()),
            RepositoryError::Decode(message) => PortError::Decode(message),
        }
    }
}
