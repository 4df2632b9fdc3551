//! Outbound LLM provider gateways.
//!
//! Each gateway implements [`repochat_core::gateway::ChatGateway`] over plain
//! HTTP with `reqwest`: one request per send, no retries and no streaming.

pub mod anthropic_gateway;
pub mod openai_gateway;
pub mod provider_gateway;

pub use anthropic_gateway::AnthropicChatGateway;
pub use openai_gateway::OpenAiChatGateway;
pub use provider_gateway::ProviderGateway;
