//! OpenAI-compatible HTTP client implementing both LLM seams. Works
//! against api.openai.com and any server speaking the same chat/embedding
//! routes when `base_url` points elsewhere.

use std::time::Duration;

use async_trait::async_trait;
use maildesk_core::config::LlmConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm::{
    ChatBackend, ChatMessage, ChatRequest, ChatResponse, ChatRole, EmbeddingBackend, LlmError,
    TokenUsage, ToolCallRequest,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    embedding_model: String,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| LlmError::Transport(err.to_string()))?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
            embedding_model: config.embedding_model.clone(),
        })
    }

    async fn post<B, R>(&self, route: &str, body: &B) -> Result<R, LlmError>
    where
        B: Serialize,
        R: for<'de> Deserialize<'de>,
    {
        let mut request = self.http.post(format!("{}{route}", self.base_url)).json(body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response =
            request.send().await.map_err(|err| LlmError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status: status.as_u16(), body });
        }

        response.json::<R>().await.map_err(|err| LlmError::Decode(err.to_string()))
    }
}

#[async_trait]
impl ChatBackend for OpenAiClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        let wire = WireChatRequest::from(&request);
        let reply: WireChatResponse = self.post("/chat/completions", &wire).await?;

        let choice = reply
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Decode("chat response contained no choices".to_string()))?;

        let mut tool_calls = Vec::new();
        for call in choice.message.tool_calls.unwrap_or_default() {
            let arguments: Value = serde_json::from_str(&call.function.arguments)
                .map_err(|err| LlmError::Decode(format!("tool call arguments: {err}")))?;
            tool_calls.push(ToolCallRequest { id: call.id, name: call.function.name, arguments });
        }

        let usage = reply
            .usage
            .map(|usage| TokenUsage { input: usage.prompt_tokens, output: usage.completion_tokens })
            .unwrap_or_default();

        Ok(ChatResponse {
            text: choice.message.content.filter(|text| !text.is_empty()),
            tool_calls,
            usage,
        })
    }
}

#[async_trait]
impl EmbeddingBackend for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let wire = WireEmbeddingRequest { model: &self.embedding_model, input: text };
        let reply: WireEmbeddingResponse = self.post("/embeddings", &wire).await?;

        reply
            .data
            .into_iter()
            .next()
            .map(|row| row.embedding)
            .ok_or_else(|| LlmError::Decode("embedding response contained no data".to_string()))
    }
}

#[derive(Serialize)]
struct WireChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
}

impl<'a> From<&'a ChatRequest> for WireChatRequest<'a> {
    fn from(request: &'a ChatRequest) -> Self {
        Self {
            model: &request.model,
            messages: request.messages.iter().map(WireMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            tools: request.tools.clone(),
        }
    }
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCallOut>>,
}

impl<'a> From<&'a ChatMessage> for WireMessage<'a> {
    fn from(message: &'a ChatMessage) -> Self {
        let role = match message.role {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
            ChatRole::Tool => "tool",
        };

        let tool_calls = if message.tool_calls.is_empty() {
            None
        } else {
            Some(
                message
                    .tool_calls
                    .iter()
                    .map(|call| WireToolCallOut {
                        id: call.id.clone(),
                        kind: "function",
                        function: WireFunctionOut {
                            name: call.name.clone(),
                            arguments: call.arguments.to_string(),
                        },
                    })
                    .collect(),
            )
        };

        Self { role, content: &message.content, tool_call_id: message.tool_call_id.as_deref(), tool_calls }
    }
}

#[derive(Serialize)]
struct WireToolCallOut {
    id: String,
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunctionOut,
}

#[derive(Serialize)]
struct WireFunctionOut {
    name: String,
    arguments: String,
}

#[derive(Deserialize)]
struct WireChatResponse {
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireChoiceMessage,
}

#[derive(Deserialize)]
struct WireChoiceMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCallIn>>,
}

#[derive(Deserialize)]
struct WireToolCallIn {
    id: String,
    function: WireFunctionIn,
}

#[derive(Deserialize)]
struct WireFunctionIn {
    name: String,
    arguments: String,
}

#[derive(Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Serialize)]
struct WireEmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct WireEmbeddingResponse {
    data: Vec<WireEmbeddingRow>,
}

#[derive(Deserialize)]
struct WireEmbeddingRow {
    embedding: Vec<f32>,
}
