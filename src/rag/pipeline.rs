//! The question-answering pipeline.

use super::context::{build_prompt, dedupe_sources};
use super::RagAnswer;
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{DataCommitError, Result};
use crate::generation::{create_generator, GenerationOptions, Generator};
use crate::vector_store::{SearchResult, VectorStore};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Embeds a question, retrieves matching chunks and generates an answer.
///
/// Built once at startup and shared behind an `Arc`.
pub struct QueryPipeline {
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    generator: Arc<dyn Generator>,
    prompts: Prompts,
    options: GenerationOptions,
    top_k: usize,
}

impl QueryPipeline {
    /// Create a new pipeline.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            embedder,
            vector_store,
            generator,
            prompts: Prompts::default(),
            options: GenerationOptions::default(),
            top_k: 5,
        }
    }

    /// Build the pipeline described by the settings on top of an opened store.
    pub fn from_settings(settings: &Settings, vector_store: Arc<dyn VectorStore>) -> Result<Self> {
        let embedder = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding)?);
        let generator = create_generator(
            settings.rag.provider,
            &settings.rag.model,
            &settings.rag.gemini_base_url,
        )?;
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        Ok(Self::new(embedder, vector_store, generator)
            .with_prompts(prompts)
            .with_options(GenerationOptions {
                temperature: settings.rag.temperature,
                top_p: None,
                thinking_budget: settings.rag.thinking_budget,
            })
            .with_top_k(settings.rag.top_k))
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Set the generation options used for every answer.
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the default number of chunks to retrieve.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Default number of chunks retrieved per question.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Number of chunks in the underlying store.
    pub async fn document_count(&self) -> Result<usize> {
        self.vector_store.count().await
    }

    /// Embed a question with the same model used at ingestion.
    pub async fn embed(&self, query: &str) -> Result<Vec<f32>> {
        if query.trim().is_empty() {
            return Err(DataCommitError::InvalidInput("Empty query".to_string()));
        }
        self.embedder.embed(query).await
    }

    /// Up to `k` chunks ranked by descending similarity.
    pub async fn retrieve(&self, embedding: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        self.vector_store.search(embedding, k).await
    }

    pub fn build_prompt(&self, results: &[SearchResult], question: &str) -> String {
        build_prompt(&self.prompts, results, question)
    }

    /// Single generation call. Failures are not retried.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        self.generator.generate(prompt, &self.options).await
    }

    /// Answer `query` from the `k` best matching chunks.
    ///
    /// A blank query yields an empty answer without calling any service.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn respond(&self, query: &str, k: usize) -> Result<RagAnswer> {
        if query.trim().is_empty() {
            return Ok(RagAnswer::default());
        }

        info!("Processing question");

        let embedding = self.embed(query).await?;
        let results = self.retrieve(&embedding, k).await?;
        debug!("Retrieved {} chunks", results.len());

        let prompt = self.build_prompt(&results, query);
        let response = self.generate(&prompt).await?;
        let sources = dedupe_sources(&results);

        debug!("Generated response with {} sources", sources.len());
        Ok(RagAnswer { response, sources })
    }

    /// Retrieval only, for inspecting what the generator would see.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn inspect(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        let embedding = self.embed(query).await?;
        self.retrieve(&embedding, k).await
    }
}
