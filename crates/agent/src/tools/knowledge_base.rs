//! Knowledge-base search tool backed by the retrieval engine.

use std::sync::Arc;

use async_trait::async_trait;
use maildesk_core::domain::knowledge::KNOWLEDGE_CATEGORIES;
use serde_json::{json, Value};

use crate::rag::RagEngine;
use crate::tools::{required_str, Tool, ToolResult};

pub struct SearchKnowledgeBaseTool {
    rag: Arc<RagEngine>,
}

impl SearchKnowledgeBaseTool {
    pub fn new(rag: Arc<RagEngine>) -> Self {
        Self { rag }
    }
}

#[async_trait]
impl Tool for SearchKnowledgeBaseTool {
    fn name(&self) -> &'static str {
        "search_knowledge_base"
    }

    fn description(&self) -> &'static str {
        "Search the company knowledge base for FAQs, policies, product information, \
         and shipping details. Use this tool to find accurate information before \
         responding to customer queries about policies, returns, shipping, products, etc."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query to find relevant information",
                },
                "category": {
                    "type": "string",
                    "enum": KNOWLEDGE_CATEGORIES,
                    "description": "Optional category to filter search results",
                },
            },
            "required": ["query"],
        })
    }

    async fn execute(&self, arguments: Value) -> ToolResult {
        let query = match required_str(&arguments, "query") {
            Ok(query) => query,
            Err(failure) => return failure,
        };
        let category = arguments.get("category").and_then(Value::as_str);

        let results = match self.rag.search_with_threshold(query, category, None, None).await {
            Ok(results) => results,
            Err(error) => {
                return ToolResult::fail(format!("Knowledge base search failed: {error}"))
            }
        };

        if results.is_empty() {
            return ToolResult::ok(json!({
                "results": [],
                "message": "No relevant information found in knowledge base.",
            }));
        }

        let formatted: Vec<Value> = results
            .iter()
            .map(|result| {
                json!({
                    "title": result.title.as_deref().unwrap_or("Untitled"),
                    "category": result.category,
                    "content": result.content,
                    "relevance_score": round3(result.score),
                })
            })
            .collect();

        ToolResult::ok(json!({
            "count": formatted.len(),
            "results": formatted,
        }))
    }
}

fn round3(score: f32) -> f64 {
    (f64::from(score) * 1000.0).round() / 1000.0
}
