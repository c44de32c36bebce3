//! services/api/src/adapters/description_llm.rs
//!
//! This module contains the adapter for the description-generating LLM.
//! It implements the `DescriptionGenerationService` port from the `core` crate
//! against any OpenAI-compatible chat-completions endpoint.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};
use async_trait::async_trait;
use gakbbul_core::description::build_description_prompt;
use gakbbul_core::ports::{DescriptionGenerationService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `DescriptionGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiDescriptionAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiDescriptionAdapter {
    /// Creates a new `OpenAiDescriptionAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `DescriptionGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DescriptionGenerationService for OpenAiDescriptionAdapter {
    /// Sends the fixed description prompt as a single, non-streaming request.
    async fn generate_description(&self, title: &str, url: &str) -> PortResult<String> {
        let messages = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(build_description_prompt(title, url))
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Description LLM response contained no text content.".to_string())
            })?;

        Ok(text.trim().to_string())
    }
}
