//! Provider-neutral chat and embedding seams. `openai` implements them
//! against the OpenAI wire format; tests script them directly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm transport failure: {0}")]
    Transport(String),
    #[error("llm returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("llm response could not be decoded: {0}")]
    Decode(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

/// A tool invocation requested by the model. `arguments` is the decoded
/// JSON object, not the raw string the wire format carries.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    /// Set on `Tool` messages to tie the result back to the request.
    pub tool_call_id: Option<String>,
    /// Set on `Assistant` messages that requested tool calls.
    pub tool_calls: Vec<ToolCallRequest>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(ChatRole::Assistant, content)
    }

    pub fn assistant_tool_calls(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self { role: ChatRole::Assistant, content: String::new(), tool_call_id: None, tool_calls }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Tool,
            content: content.into(),
            tool_call_id: Some(tool_call_id.into()),
            tool_calls: Vec::new(),
        }
    }

    fn plain(role: ChatRole, content: impl Into<String>) -> Self {
        Self { role, content: content.into(), tool_call_id: None, tool_calls: Vec::new() }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input: u32,
    pub output: u32,
}

impl TokenUsage {
    /// Saturating: wire-supplied counters are untrusted.
    pub fn accumulate(&mut self, other: TokenUsage) {
        self.input = self.input.saturating_add(other.input);
        self.output = self.output.saturating_add(other.output);
    }
}

#[derive(Clone, Debug)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// Tool schemas in the provider's function-declaration format; empty
    /// means plain completion.
    pub tools: Vec<Value>,
}

#[derive(Clone, Debug)]
pub struct ChatResponse {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
    pub usage: TokenUsage,
}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LlmError>;
}

#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError>;
}

#[async_trait]
impl<T: ChatBackend + ?Sized> ChatBackend for std::sync::Arc<T> {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        (**self).chat(request).await
    }
}

#[async_trait]
impl<T: EmbeddingBackend + ?Sized> EmbeddingBackend for std::sync::Arc<T> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        (**self).embed(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatMessage, ChatRole, TokenUsage};

    #[test]
    fn tool_result_messages_carry_the_call_id() {
        let message = ChatMessage::tool_result("call_1", "{\"found\":true}");

        assert_eq!(message.role, ChatRole::Tool);
        assert_eq!(message.tool_call_id.as_deref(), Some("call_1"));
        assert!(message.tool_calls.is_empty());
    }

    #[test]
    fn usage_accumulates_across_turns() {
        let mut usage = TokenUsage { input: 100, output: 20 };
        usage.accumulate(TokenUsage { input: 250, output: 80 });

        assert_eq!(usage.input, 350);
        assert_eq!(usage.output, 100);
    }

    #[test]
    fn usage_saturates_on_absurd_provider_counters() {
        let mut usage = TokenUsage { input: 10, output: u32::MAX };
        usage.accumulate(TokenUsage { input: u32::MAX, output: 1 });

        assert_eq!(usage.input, u32::MAX);
        assert_eq!(usage.output, u32::MAX);
    }
}
