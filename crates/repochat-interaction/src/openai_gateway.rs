//! OpenAiChatGateway - direct REST client for the OpenAI Chat Completions API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use repochat_core::gateway::{ChatGateway, ChatTurn, CompletionRequest};
use repochat_core::{ChatError, Result};
use repochat_infrastructure::GatewayConfig;

const CONTEXT_LENGTH_EXCEEDED: &str = "context_length_exceeded";
const FALLBACK_ERROR: &str = "Failed to get response from OpenAI";

/// Gateway implementation that talks to the OpenAI HTTP API.
#[derive(Clone)]
pub struct OpenAiChatGateway {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiChatGateway {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.openai_endpoint.clone(),
            model: config.openai_model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Overrides the endpoint after construction.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn build_request<'a>(&'a self, messages: &'a [ChatTurn]) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    async fn send_request(&self, api_key: &str, body: &ChatCompletionRequest<'_>) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| ChatError::provider(format!("OpenAI API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &body_text));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| ChatError::provider(format!("Failed to parse OpenAI response: {err}")))?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl ChatGateway for OpenAiChatGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = self.build_request(&request.messages);
        tracing::info!(
            model = %self.model,
            turns = request.messages.len(),
            "Sending chat completion to OpenAI"
        );
        self.send_request(&request.api_key, &body).await
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    code: Option<serde_json::Value>,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ChatError::provider("OpenAI API returned no content in the response"))
}

fn map_http_error(status: StatusCode, body: &str) -> ChatError {
    let Ok(wrapper) = serde_json::from_str::<ErrorResponse>(body) else {
        tracing::warn!(status = status.as_u16(), "OpenAI returned an unparseable error body");
        return ChatError::provider(FALLBACK_ERROR);
    };

    let code = wrapper.error.code.as_ref().and_then(|code| code.as_str());
    tracing::warn!(status = status.as_u16(), code = ?code, "OpenAI request failed");

    if code == Some(CONTEXT_LENGTH_EXCEEDED) {
        return ChatError::ContextTooLarge;
    }
    match wrapper.error.message {
        Some(message) if !message.is_empty() => ChatError::provider(message),
        _ => ChatError::provider(FALLBACK_ERROR),
    }
}
