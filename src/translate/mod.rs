//! Translation and vocabulary collaborators.
//!
//! The job worker only sees the two traits below. [`llm`] provides the
//! LLM-backed implementations; [`DisabledTranslator`] stands in when the
//! caller opts out of translation.

pub mod llm;

use crate::error::PdfNotesError;
use async_trait::async_trait;

pub use llm::{resolve_provider, LlmTranslator, LlmVocabularyExtractor};

/// Turns extracted English text into the target language.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Short name shown in logs.
    fn name(&self) -> &str;

    async fn translate(&self, text: &str) -> Result<String, PdfNotesError>;

    /// Vocabulary extraction native to this translator, if it has one.
    ///
    /// The job worker prefers this over the generic extractor.
    fn vocabulary(&self) -> Option<&dyn VocabularyExtractor> {
        None
    }
}

/// Produces an annotated word list for a text.
#[async_trait]
pub trait VocabularyExtractor: Send + Sync {
    async fn extract_vocabulary(&self, text: &str) -> Result<String, PdfNotesError>;
}

/// Translator used when translation is switched off; every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledTranslator;

#[async_trait]
impl Translator for DisabledTranslator {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn translate(&self, _text: &str) -> Result<String, PdfNotesError> {
        Err(PdfNotesError::TranslationFailed(
            "translation is disabled".into(),
        ))
    }
}

/// Split `text` into chunks of at most `max_chars` characters on paragraph
/// boundaries (`\n\n`).
///
/// Text no longer than `max_chars` is returned as a single chunk. A single
/// paragraph longer than `max_chars` becomes its own oversized chunk.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    if text.is_empty() || text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for paragraph in text.split("\n\n") {
        let len = paragraph.chars().count();
        if current_len + len <= max_chars {
            if !current.is_empty() {
                current.push_str("\n\n");
                current_len += 2;
            }
            current.push_str(paragraph);
            current_len += len;
        } else {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            current.push_str(paragraph);
            current_len = len;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
