//! Hosted text generation.
//!
//! Both the question-answering path and transcript cleaning send a single
//! prompt and read back a single completion.

mod gemini;
mod openai;

pub use gemini::{GeminiGenerator, API_KEY_ENV as GEMINI_API_KEY_ENV};
pub use openai::OpenAIGenerator;

use crate::config::GenerationProvider;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Sampling options for one generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub top_p: Option<f32>,
    /// Reasoning token budget. `Some(0)` disables thinking on models that support it.
    pub thinking_budget: Option<u32>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.5,
            top_p: None,
            thinking_budget: Some(0),
        }
    }
}

/// Trait for hosted text generators.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Send `prompt` and return the generated text.
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String>;

    /// Model identifier used for requests.
    fn model(&self) -> &str;
}

/// Create a generator for the given provider.
///
/// `gemini_base_url` is only used by the Gemini provider.
pub fn create_generator(
    provider: GenerationProvider,
    model: &str,
    gemini_base_url: &str,
) -> Result<Arc<dyn Generator>> {
    match provider {
        GenerationProvider::Gemini => Ok(Arc::new(
            GeminiGenerator::from_env(model)?.with_base_url(gemini_base_url),
        )),
        GenerationProvider::OpenAI => Ok(Arc::new(OpenAIGenerator::new(model)?)),
    }
}
