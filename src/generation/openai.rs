//! OpenAI chat completion generator.

use super::{GenerationOptions, Generator};
use crate::error::{DataCommitError, Result};
use crate::openai::create_client;
use async_openai::types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs};
use async_trait::async_trait;
use tracing::instrument;

/// Generator backed by OpenAI chat completions.
pub struct OpenAIGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl OpenAIGenerator {
    pub fn new(model: &str) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    #[instrument(skip(self, prompt, options), fields(model = %self.model))]
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| DataCommitError::Generation(e.to_string()))?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.model)
            .messages(vec![message.into()])
            .temperature(options.temperature);
        if let Some(top_p) = options.top_p {
            builder.top_p(top_p);
        }

        let request = builder
            .build()
            .map_err(|e| DataCommitError::Generation(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            DataCommitError::OpenAI(format!("Failed to generate response: {}", e))
        })?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| DataCommitError::Generation("Empty response from LLM".to_string()))
    }

    fn model(&self) -> &str {
        &self.model
    }
}
