//! ProviderGateway - routes each request to the gateway of its provider.

use async_trait::async_trait;

use repochat_core::Result;
use repochat_core::gateway::{ChatGateway, CompletionRequest};
use repochat_core::settings::AiProvider;
use repochat_infrastructure::GatewayConfig;

use crate::anthropic_gateway::AnthropicChatGateway;
use crate::openai_gateway::OpenAiChatGateway;

/// The gateway the application uses: the provider is chosen per request from
/// the current settings, so switching providers needs no restart.
#[derive(Clone)]
pub struct ProviderGateway {
    openai: OpenAiChatGateway,
    anthropic: AnthropicChatGateway,
}

impl ProviderGateway {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            openai: OpenAiChatGateway::new(config),
            anthropic: AnthropicChatGateway::new(config),
        }
    }

    pub fn from_parts(openai: OpenAiChatGateway, anthropic: AnthropicChatGateway) -> Self {
        Self { openai, anthropic }
    }
}

#[async_trait]
impl ChatGateway for ProviderGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        tracing::debug!(provider = %request.provider, "Dispatching completion request");
        match request.provider {
            AiProvider::OpenAI => self.openai.complete(request).await,
            AiProvider::Anthropic => self.anthropic.complete(request).await,
        }
    }
}
