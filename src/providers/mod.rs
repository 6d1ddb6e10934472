/*!
 * Provider implementations for chat-completion services.
 *
 * This module contains client implementations for the supported LLM providers:
 * - OpenAI-compatible: Volcengine ARK (Doubao), OpenAI and LM Studio
 * - Anthropic: Anthropic messages API
 * - Ollama: Local LLM server
 * - Mock: scripted provider used by the test suite
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// A single chat-completion call: one system instruction, one user message
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model name or endpoint id
    pub model: String,
    /// System instruction
    pub system: String,
    /// User message
    pub user: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
}

/// Text returned by a provider, with token usage when the API reports it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    /// The generated text
    pub text: String,
    /// Prompt tokens consumed
    pub prompt_tokens: Option<u64>,
    /// Completion tokens generated
    pub completion_tokens: Option<u64>,
}

impl Completion {
    /// Completion without usage information
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the correction pipeline.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<Completion, ProviderError>` - The response text or an error
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError>;

    /// Test the connection to the provider with a minimal request
    async fn test_connection(&self, model: &str) -> Result<(), ProviderError>;

    /// Human readable provider name for logs
    fn name(&self) -> &str;
}

pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;
