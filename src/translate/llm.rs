//! LLM-backed translator and vocabulary extractor.
//!
//! Text is split into paragraph-aligned chunks of `chunk_size` characters and
//! each chunk is sent as one chat completion. Transient provider errors are
//! retried with exponential backoff (`retry_backoff_ms * 2^(attempt-1)`).

use crate::config::ProcessingConfig;
use crate::error::PdfNotesError;
use crate::prompts::{
    extract_translation_section, extract_vocabulary_section, translation_system_prompt,
    translation_user_prompt, vocabulary_system_prompt, vocabulary_user_prompt, NO_VOCABULARY,
};
use crate::translate::{split_text, Translator, VocabularyExtractor};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::fmt;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

/// Resolve the LLM provider: a pre-built one from the config wins, else the
/// translator model's `(provider, model)` pair goes through `ProviderFactory`.
pub fn resolve_provider(config: &ProcessingConfig) -> Result<Arc<dyn LLMProvider>, PdfNotesError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }
    let (name, model) = config.translator_model.provider_and_model();
    ProviderFactory::create_llm_provider(name, model).map_err(|e| {
        PdfNotesError::ProviderNotConfigured {
            provider: name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Chat settings shared by the translator and the vocabulary extractor.
struct ChatClient {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
    max_retries: u32,
    retry_backoff_ms: u64,
}

impl ChatClient {
    fn new(provider: Arc<dyn LLMProvider>, config: &ProcessingConfig) -> Self {
        Self {
            provider,
            options: CompletionOptions {
                temperature: Some(config.temperature),
                max_tokens: Some(config.max_tokens),
                ..Default::default()
            },
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
        }
    }

    /// One system + user exchange, retried on failure. Returns the reply text.
    async fn complete(&self, system: &str, user: &str) -> Result<String, String> {
        let messages = vec![ChatMessage::system(system), ChatMessage::user(user)];
        let mut last_err: Option<String> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = self.retry_backoff_ms * 2u64.pow(attempt - 1);
                warn!(
                    "LLM retry {}/{} after {}ms",
                    attempt, self.max_retries, backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }

            match self.provider.chat(&messages, Some(&self.options)).await {
                Ok(response) => {
                    debug!(
                        "{} input tokens, {} output tokens",
                        response.prompt_tokens, response.completion_tokens
                    );
                    return Ok(response.content);
                }
                Err(e) => {
                    let err_msg = format!("{}", e);
                    warn!("LLM attempt {} failed: {}", attempt + 1, err_msg);
                    last_err = Some(err_msg);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| "Unknown error".to_string()))
    }
}

/// Translator that sends each chunk to an LLM and keeps the marked section
/// of each reply.
pub struct LlmTranslator {
    name: String,
    client: ChatClient,
    target_language: String,
    chunk_size: usize,
    vocabulary: LlmVocabularyExtractor,
}

impl LlmTranslator {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &ProcessingConfig) -> Self {
        Self {
            name: config.translator_model.to_string(),
            client: ChatClient::new(Arc::clone(&provider), config),
            target_language: config.target_language.clone(),
            chunk_size: config.chunk_size,
            vocabulary: LlmVocabularyExtractor::new(provider, config),
        }
    }

    /// Build from the config, resolving the provider.
    pub fn from_config(config: &ProcessingConfig) -> Result<Self, PdfNotesError> {
        Ok(Self::new(resolve_provider(config)?, config))
    }
}

impl fmt::Debug for LlmTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmTranslator")
            .field("name", &self.name)
            .field("target_language", &self.target_language)
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn translate(&self, text: &str) -> Result<String, PdfNotesError> {
        let chunks = split_text(text, self.chunk_size);
        let system = translation_system_prompt(&self.target_language);
        let mut translated = Vec::with_capacity(chunks.len());

        for (idx, chunk) in chunks.iter().enumerate() {
            info!("Translating chunk {}/{}", idx + 1, chunks.len());
            let reply = self
                .client
                .complete(&system, &translation_user_prompt(chunk))
                .await
                .map_err(|e| {
                    PdfNotesError::TranslationFailed(format!("chunk {}: {}", idx + 1, e))
                })?;
            translated.push(extract_translation_section(&reply));
        }

        Ok(translated.join("\n\n"))
    }

    fn vocabulary(&self) -> Option<&dyn VocabularyExtractor> {
        Some(&self.vocabulary)
    }
}

/// Standalone vocabulary extractor over an LLM.
pub struct LlmVocabularyExtractor {
    client: ChatClient,
    target_language: String,
    chunk_size: usize,
}

impl LlmVocabularyExtractor {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &ProcessingConfig) -> Self {
        Self {
            client: ChatClient::new(provider, config),
            target_language: config.target_language.clone(),
            chunk_size: config.chunk_size,
        }
    }

    pub fn from_config(config: &ProcessingConfig) -> Result<Self, PdfNotesError> {
        Ok(Self::new(resolve_provider(config)?, config))
    }
}

#[async_trait]
impl VocabularyExtractor for LlmVocabularyExtractor {
    async fn extract_vocabulary(&self, text: &str) -> Result<String, PdfNotesError> {
        let chunks = split_text(text, self.chunk_size);
        let system = vocabulary_system_prompt(&self.target_language);
        let mut sections = Vec::with_capacity(chunks.len());

        for (idx, chunk) in chunks.iter().enumerate() {
            debug!("Extracting vocabulary from chunk {}/{}", idx + 1, chunks.len());
            let reply = self
                .client
                .complete(&system, &vocabulary_user_prompt(chunk))
                .await
                .map_err(|e| {
                    PdfNotesError::VocabularyFailed(format!("chunk {}: {}", idx + 1, e))
                })?;
            sections.push(extract_vocabulary_section(&reply));
        }

        Ok(combine_vocabulary(sections))
    }
}

/// Join the per-chunk vocabulary sections; chunks without one contribute nothing.
fn combine_vocabulary(sections: Vec<Option<String>>) -> String {
    let found: Vec<String> = sections.into_iter().flatten().collect();
    if found.is_empty() {
        NO_VOCABULARY.to_string()
    } else {
        found.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_sections_are_joined() {
        let combined = combine_vocabulary(vec![
            Some("Key vocabulary:\n1. a: x".into()),
            None,
            Some("Key vocabulary:\n1. b: y".into()),
        ]);
        assert_eq!(combined, "Key vocabulary:\n1. a: x\n\nKey vocabulary:\n1. b: y");
    }

    #[test]
    fn no_sections_yields_placeholder() {
        assert_eq!(combine_vocabulary(vec![None, None]), NO_VOCABULARY);
        assert_eq!(combine_vocabulary(Vec::new()), NO_VOCABULARY);
    }
}
