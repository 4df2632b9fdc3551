//! AnthropicChatGateway - direct REST client for the Anthropic Messages API.
//!
//! The Messages API takes the system prompt as a top-level field, so system
//! turns are lifted out of the conversation before sending.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use repochat_core::chat::MessageRole;
use repochat_core::gateway::{ChatGateway, ChatTurn, CompletionRequest};
use repochat_core::{ChatError, Result};
use repochat_infrastructure::GatewayConfig;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const PROMPT_TOO_LONG: &str = "prompt is too long";
const FALLBACK_ERROR: &str = "Failed to get response from Anthropic";

#[derive(Clone)]
pub struct AnthropicChatGateway {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl AnthropicChatGateway {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.anthropic_endpoint.clone(),
            model: config.anthropic_model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn build_request<'a>(&'a self, turns: &'a [ChatTurn]) -> MessagesRequest<'a> {
        let system: Vec<&str> = turns
            .iter()
            .filter(|turn| turn.role == MessageRole::System)
            .map(|turn| turn.content.as_str())
            .collect();
        // The Messages API requires the conversation to open with a user turn;
        // a history window cut mid-exchange can start with an assistant reply.
        let messages = turns
            .iter()
            .filter(|turn| turn.role != MessageRole::System)
            .skip_while(|turn| turn.role != MessageRole::User)
            .map(|turn| RequestMessage {
                role: turn.role.as_str(),
                content: &turn.content,
            })
            .collect();

        MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: (!system.is_empty()).then(|| system.join("\n\n")),
            messages,
        }
    }
}

#[async_trait]
impl ChatGateway for AnthropicChatGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = self.build_request(&request.messages);
        tracing::info!(
            model = %self.model,
            turns = body.messages.len(),
            "Sending chat completion to Anthropic"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &request.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|err| ChatError::provider(format!("Anthropic API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &body_text));
        }

        let parsed: MessagesResponse = response.json().await.map_err(|err| {
            ChatError::provider(format!("Failed to parse Anthropic response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn extract_text_response(response: MessagesResponse) -> Result<String> {
    response
        .content
        .into_iter()
        .find(|block| block.kind == "text")
        .and_then(|block| block.text)
        .ok_or_else(|| ChatError::provider("Anthropic API returned no text content"))
}

fn map_http_error(status: StatusCode, body: &str) -> ChatError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|wrapper| wrapper.error.message)
        .filter(|message| !message.is_empty());
    tracing::warn!(status = status.as_u16(), "Anthropic request failed");

    match message {
        Some(message) if message.to_lowercase().contains(PROMPT_TOO_LONG) => {
            ChatError::ContextTooLarge
        }
        Some(message) => ChatError::provider(message),
        None => ChatError::provider(FALLBACK_ERROR),
    }
}
