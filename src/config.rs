//! Configuration types for note-page generation and text extraction.
//!
//! All processing behaviour is controlled through [`ProcessingConfig`], built
//! via its [`ProcessingConfigBuilder`]. Setters clamp out-of-range values;
//! `build()` rejects combinations that cannot work at all.

use crate::error::PdfNotesError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Configuration for processing PDFs into note pages, text and translations.
///
/// # Example
/// ```rust
/// use pdfnotes::ProcessingConfig;
///
/// let config = ProcessingConfig::builder()
///     .margin_percentage(40)
///     .output_root("notes")
///     .build()
///     .unwrap();
/// assert_eq!(config.margin_percentage, 40);
/// ```
#[derive(Clone)]
pub struct ProcessingConfig {
    /// Width of the blank note margin as a percentage of page width. Range: 0–100. Default: 30.
    pub margin_percentage: i32,

    /// DPI used when rasterising pages for the annotated images. Default: 200.
    pub annotation_dpi: u32,

    /// DPI used when rasterising pages for OCR-based extraction. Default: 300.
    pub extraction_dpi: u32,

    /// Tesseract language code. Default: "eng".
    pub ocr_language: String,

    /// Page segmentation mode for the `ocr` method. Default: 3 (fully automatic).
    pub ocr_psm: u8,

    /// Page segmentation mode for the `image` method. Default: 1 (automatic with OSD).
    pub image_psm: u8,

    /// Directory under which each job gets its own output directory. Default: "output".
    pub output_root: PathBuf,

    /// Maximum characters sent to the translator per request. Default: 3000.
    pub chunk_size: usize,

    /// Translator model catalogue entry. Default: [`TranslatorModel::Auto`].
    pub translator_model: TranslatorModel,

    /// Pre-constructed LLM provider. Takes precedence over `translator_model`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Language the text is translated into. Default: "Simplified Chinese".
    pub target_language: String,

    /// Sampling temperature for translation requests. Default: 0.5.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate per chunk. Default: 4096.
    pub max_tokens: usize,

    /// Retry attempts per chunk on provider failure. Default: 2.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled per attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Upper bound on jobs running at once. Default: None (unbounded).
    pub max_concurrent_jobs: Option<usize>,

    /// Produce `<name>_translation.pdf` as step 5. Default: false.
    /// A [`JobRequest`](crate::JobRequest) may override it per job.
    pub render_translated_pdf: bool,

    /// Also pack the annotated pages into `<name>_notes.pdf` in step 1.
    /// Default: false.
    pub notes_pdf: bool,

    /// Optional job event sink.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            margin_percentage: 30,
            annotation_dpi: 200,
            extraction_dpi: 300,
            ocr_language: "eng".to_string(),
            ocr_psm: 3,
            image_psm: 1,
            output_root: PathBuf::from("output"),
            chunk_size: 3000,
            translator_model: TranslatorModel::default(),
            provider: None,
            target_language: "Simplified Chinese".to_string(),
            temperature: 0.5,
            max_tokens: 4096,
            max_retries: 2,
            retry_backoff_ms: 500,
            max_concurrent_jobs: None,
            render_translated_pdf: false,
            notes_pdf: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ProcessingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessingConfig")
            .field("margin_percentage", &self.margin_percentage)
            .field("annotation_dpi", &self.annotation_dpi)
            .field("extraction_dpi", &self.extraction_dpi)
            .field("ocr_language", &self.ocr_language)
            .field("ocr_psm", &self.ocr_psm)
            .field("image_psm", &self.image_psm)
            .field("output_root", &self.output_root)
            .field("chunk_size", &self.chunk_size)
            .field("translator_model", &self.translator_model)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("target_language", &self.target_language)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("max_concurrent_jobs", &self.max_concurrent_jobs)
            .field("render_translated_pdf", &self.render_translated_pdf)
            .field("notes_pdf", &self.notes_pdf)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn JobProgressCallback>"),
            )
            .finish()
    }
}

impl ProcessingConfig {
    /// Create a new builder for `ProcessingConfig`.
    pub fn builder() -> ProcessingConfigBuilder {
        ProcessingConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ProcessingConfig`].
#[derive(Debug)]
pub struct ProcessingConfigBuilder {
    config: ProcessingConfig,
}

impl ProcessingConfigBuilder {
    pub fn margin_percentage(mut self, pct: i32) -> Self {
        self.config.margin_percentage = pct.clamp(0, 100);
        self
    }

    pub fn annotation_dpi(mut self, dpi: u32) -> Self {
        self.config.annotation_dpi = dpi.clamp(72, 600);
        self
    }

    pub fn extraction_dpi(mut self, dpi: u32) -> Self {
        self.config.extraction_dpi = dpi.clamp(72, 600);
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn ocr_psm(mut self, psm: u8) -> Self {
        self.config.ocr_psm = psm.min(13);
        self
    }

    pub fn image_psm(mut self, psm: u8) -> Self {
        self.config.image_psm = psm.min(13);
        self
    }

    pub fn output_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_root = dir.into();
        self
    }

    pub fn chunk_size(mut self, chars: usize) -> Self {
        self.config.chunk_size = chars.max(1);
        self
    }

    pub fn translator_model(mut self, model: TranslatorModel) -> Self {
        self.config.translator_model = model;
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn target_language(mut self, lang: impl Into<String>) -> Self {
        self.config.target_language = lang.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn max_concurrent_jobs(mut self, n: usize) -> Self {
        self.config.max_concurrent_jobs = Some(n.max(1));
        self
    }

    pub fn render_translated_pdf(mut self, v: bool) -> Self {
        self.config.render_translated_pdf = v;
        self
    }

    pub fn notes_pdf(mut self, v: bool) -> Self {
        self.config.notes_pdf = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ProcessingConfig, PdfNotesError> {
        let c = &self.config;
        if c.ocr_language.trim().is_empty() {
            return Err(PdfNotesError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        if c.output_root.as_os_str().is_empty() {
            return Err(PdfNotesError::InvalidConfig(
                "Output root must not be empty".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(PdfNotesError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// The closed set of text-extraction strategies.
///
/// Each method declares at most one fallback target in [`ExtractionMethod::fallback`];
/// every chain ends at [`ExtractionMethod::PyPdf2`], which has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    /// Page-by-page content-stream text (lopdf).
    #[serde(rename = "pypdf2")]
    PyPdf2,
    /// Layout-aware text regrouped into lines by position (pdfium).
    #[serde(rename = "pdfplumber")]
    PdfPlumber,
    /// Whole-document stream extraction (pdf-extract).
    #[serde(rename = "pdfminer")]
    PdfMiner,
    /// 300 DPI rasterisation + QR crop + OCR.
    Ocr,
    /// Same as `Ocr` with free-form page segmentation.
    Image,
}

impl ExtractionMethod {
    /// Every method, in declaration order.
    pub const ALL: [ExtractionMethod; 5] = [
        ExtractionMethod::PyPdf2,
        ExtractionMethod::PdfPlumber,
        ExtractionMethod::PdfMiner,
        ExtractionMethod::Ocr,
        ExtractionMethod::Image,
    ];

    /// Next method to try when this one fails.
    pub fn fallback(self) -> Option<ExtractionMethod> {
        match self {
            ExtractionMethod::PyPdf2 => None,
            ExtractionMethod::PdfPlumber => Some(ExtractionMethod::PyPdf2),
            ExtractionMethod::PdfMiner => Some(ExtractionMethod::PdfPlumber),
            ExtractionMethod::Ocr => Some(ExtractionMethod::PyPdf2),
            ExtractionMethod::Image => Some(ExtractionMethod::PyPdf2),
        }
    }

    /// The method followed by its whole fallback chain.
    pub fn chain(self) -> Vec<ExtractionMethod> {
        let mut chain = vec![self];
        let mut current = self;
        while let Some(next) = current.fallback() {
            if chain.contains(&next) || chain.len() > Self::ALL.len() {
                break;
            }
            chain.push(next);
            current = next;
        }
        chain
    }

    /// Wire name used on the command line and in serialised output.
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionMethod::PyPdf2 => "pypdf2",
            ExtractionMethod::PdfPlumber => "pdfplumber",
            ExtractionMethod::PdfMiner => "pdfminer",
            ExtractionMethod::Ocr => "ocr",
            ExtractionMethod::Image => "image",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionMethod {
    type Err = PdfNotesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pypdf2" => Ok(ExtractionMethod::PyPdf2),
            "pdfplumber" => Ok(ExtractionMethod::PdfPlumber),
            "pdfminer" => Ok(ExtractionMethod::PdfMiner),
            "ocr" => Ok(ExtractionMethod::Ocr),
            "image" => Ok(ExtractionMethod::Image),
            other => Err(PdfNotesError::InvalidConfig(format!(
                "Unknown extraction method '{other}' (expected pypdf2, pdfplumber, pdfminer, ocr or image)"
            ))),
        }
    }
}

/// Catalogue of translation models.
///
/// `Auto` resolves to the reasoner model; there is no runtime failover
/// between entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranslatorModel {
    #[default]
    Auto,
    DeepseekReasoner,
    DeepseekChat,
    OpenRouterDeepseek,
}

impl TranslatorModel {
    /// `(provider, model)` pair handed to `ProviderFactory`.
    pub fn provider_and_model(self) -> (&'static str, &'static str) {
        match self {
            TranslatorModel::Auto | TranslatorModel::DeepseekReasoner => {
                ("deepseek", "deepseek-reasoner")
            }
            TranslatorModel::DeepseekChat => ("deepseek", "deepseek-chat"),
            TranslatorModel::OpenRouterDeepseek => ("openrouter", "deepseek/deepseek-chat"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TranslatorModel::Auto => "auto",
            TranslatorModel::DeepseekReasoner => "deepseek-reasoner",
            TranslatorModel::DeepseekChat => "deepseek-chat",
            TranslatorModel::OpenRouterDeepseek => "openrouter-deepseek",
        }
    }
}

impl fmt::Display for TranslatorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranslatorModel {
    type Err = PdfNotesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(TranslatorModel::Auto),
            "deepseek" | "deepseek-reasoner" => Ok(TranslatorModel::DeepseekReasoner),
            "deepseek-chat" => Ok(TranslatorModel::DeepseekChat),
            "openrouter" | "openrouter-deepseek" => Ok(TranslatorModel::OpenRouterDeepseek),
            other => Err(PdfNotesError::InvalidConfig(format!(
                "Unknown translator '{other}'"
            ))),
        }
    }
}

/// Fixed PDF page size in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width: 595.0,
        height: 842.0,
    };
}
