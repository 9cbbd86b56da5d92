//! Error types for the pdfnotes library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PdfNotesError`]: **Fatal**: the operation cannot proceed at all
//!   (source PDF missing or unreadable, pdfium unavailable, nothing could be
//!   written). Returned as `Err(PdfNotesError)` from the public entry points
//!   and recorded on a job as its terminal `error` state.
//!
//! * [`MethodFailure`]: **Non-fatal**: one extraction method failed after
//!   walking its whole fallback chain, but sibling methods are unaffected.
//!   Stored inside the map returned by
//!   [`crate::pipeline::extract::ExtractionEngine::extract_all`].
//!
//! Step-local failures (translation, vocabulary, translated-PDF rendering)
//! and per-item failures (one bad image during reassembly) are logged and
//! written to the job's progress log rather than surfaced as errors.

use crate::config::ExtractionMethod;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdfnotes library.
#[derive(Debug, Error)]
pub enum PdfNotesError {
    // ── Source document ───────────────────────────────────────────────────
    /// Source PDF does not exist.
    #[error("PDF file not found: '{path}'")]
    SourceNotFound { path: PathBuf },

    /// Source PDF exists but cannot be opened or parsed.
    #[error("PDF '{path}' is unreadable: {detail}")]
    SourceUnreadable { path: PathBuf, detail: String },

    /// pdfium failed to render a page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or place the library next to the executable."
    )]
    PdfiumBindingFailed(String),

    // ── Extraction ────────────────────────────────────────────────────────
    /// Every method in a fallback chain failed; carries the last error.
    #[error("Text extraction with {method} failed: {detail}")]
    ExtractionFailed {
        method: ExtractionMethod,
        detail: String,
    },

    /// The OCR engine could not be run or returned an error.
    #[error("OCR failed: {0}")]
    OcrFailed(String),

    // ── Reassembly ────────────────────────────────────────────────────────
    /// `images_to_pdf` was called with an empty image list.
    #[error("No images provided")]
    NoImagesProvided,

    /// A referenced image file does not exist.
    #[error("Image file does not exist: '{path}'")]
    MissingImage { path: PathBuf },

    /// Every image failed individually; the output would be empty.
    #[error("No pages could be written to '{path}'")]
    NoPagesWritten { path: PathBuf },

    /// Image decoding / encoding failed.
    #[error("Image error for '{path}': {detail}")]
    Image { path: PathBuf, detail: String },

    /// Could not create or write an output artefact.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No TrueType/OpenType font could be loaded for text rendering.
    #[error("No usable font: {0}")]
    FontUnavailable(String),

    /// Every rung of the translated-PDF renderer ladder failed.
    #[error("All translated-PDF renderers failed: {}", attempts.join("; "))]
    RenderLadderExhausted { attempts: Vec<String> },

    // ── Collaborators ─────────────────────────────────────────────────────
    /// The translation collaborator failed.
    #[error("Translation failed: {0}")]
    TranslationFailed(String),

    /// The vocabulary collaborator failed.
    #[error("Vocabulary extraction failed: {0}")]
    VocabularyFailed(String),

    /// The configured LLM provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Jobs ──────────────────────────────────────────────────────────────
    /// No job with this identity is known to the store.
    #[error("Job '{0}' not found")]
    JobNotFound(String),

    /// A state change that the job state machine does not allow.
    #[error("Job '{id}' cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: &'static str,
        to: &'static str,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed, or a request argument is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PdfNotesError {
    /// True for failures that concern the source document itself.
    ///
    /// These are the only errors `extract_all` propagates.
    pub fn is_document_level(&self) -> bool {
        matches!(
            self,
            PdfNotesError::SourceNotFound { .. } | PdfNotesError::SourceUnreadable { .. }
        )
    }
}

/// A non-fatal failure for a single extraction method.
///
/// Produced by `extract_all` when a method's whole fallback chain fails.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[error("extraction failed: {detail}")]
pub struct MethodFailure {
    pub method: ExtractionMethod,
    pub detail: String,
}
