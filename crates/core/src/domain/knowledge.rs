use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A knowledge-base article with its embedding vector. Created by the
/// seeding process and immutable during agent runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub id: String,
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub metadata: Value,
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

/// Categories the seeded knowledge base uses. Stored as plain strings;
/// this list backs the tool parameter enumeration.
pub const KNOWLEDGE_CATEGORIES: &[&str] = &["faq", "policy", "product", "shipping"];
