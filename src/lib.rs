//! # pdfnotes
//!
//! Turn PDF lecture notes and papers into study material: annotated page
//! images with a blank note margin, normalised text, a translation and a
//! list of key vocabulary.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Annotate   rasterise (pdfium), crop at QR marker, add note margin
//!  ├─ 2. Extract    one of five methods, with a fallback chain ending at pypdf2
//!  ├─ 3. Translate  chunked LLM translation        (failure is logged, not fatal)
//!  ├─ 4. Vocabulary chunked LLM vocabulary list    (failure is logged, not fatal)
//!  └─ 5. Typeset    optional translated PDF via a renderer ladder
//! ```
//!
//! Each run is a *job* with a status (`uploaded → processing → completed`
//! or `error`), a progress log and artefact flags, polled through the
//! [`JobStore`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfnotes::{ExtractionMethod, JobRequest, LlmTranslator, ProcessingConfig, Processor};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProcessingConfig::builder().margin_percentage(30).build()?;
//!     let translator = Arc::new(LlmTranslator::from_config(&config)?);
//!     let processor = Processor::new(config);
//!
//!     let request = JobRequest::new(ExtractionMethod::PdfPlumber, translator);
//!     let job = processor.process("lecture.pdf", request).await?;
//!     for line in &job.progress {
//!         println!("{line}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfnotes` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## Native dependencies
//!
//! Rendering needs a pdfium shared library (see [`pdfium`]); the `ocr` and
//! `image` extraction methods need the `tesseract` executable on `PATH`.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod document;
pub mod error;
pub mod job;
pub mod orchestrator;
pub mod pdfium;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod translate;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionMethod, PageSize, ProcessingConfig, ProcessingConfigBuilder, TranslatorModel};
pub use document::Document;
pub use error::{MethodFailure, PdfNotesError};
pub use job::{JobId, JobRecord, JobSnapshot, JobStatus, JobStore, COMPLETION_MARKER};
pub use orchestrator::{JobRequest, Processor};
pub use pipeline::assemble::images_to_pdf;
pub use pipeline::extract::ExtractionEngine;
pub use pipeline::margin::add_margin;
pub use pipeline::normalize::normalize;
pub use progress::{JobProgressCallback, NoopProgressCallback, ProgressCallback};
pub use translate::{
    split_text, DisabledTranslator, LlmTranslator, LlmVocabularyExtractor, Translator,
    VocabularyExtractor,
};
