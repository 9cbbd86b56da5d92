//! Text extraction: five strategies over the same PDF, with a data-driven
//! fallback table.
//!
//! ## Strategies
//!
//! | Method | Backend | Falls back to |
//! |--------|---------|---------------|
//! | `pypdf2` | lopdf content-stream text, page by page | nothing |
//! | `pdfplumber` | pdfium text segments regrouped into lines | `pypdf2` |
//! | `pdfminer` | pdf-extract whole-document stream | `pdfplumber` |
//! | `ocr` | 300 DPI render + QR crop + tesseract | `pypdf2` |
//! | `image` | as `ocr`, free-form segmentation | `pypdf2` |
//!
//! A strategy returns raw per-page text; [`ExtractionEngine`] normalises each
//! page and joins the non-empty ones with a blank line.

use crate::config::{ExtractionMethod, ProcessingConfig};
use crate::document::Document;
use crate::error::{MethodFailure, PdfNotesError};
use crate::pdfium::{load_error, load_pdfium};
use crate::pipeline::normalize::normalize;
use crate::pipeline::ocr::{OcrEngine, TesseractCli};
use crate::pipeline::qr::QrCropper;
use crate::pipeline::render::{PageRenderer, PdfiumRenderer};
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One way of pulling raw text out of a document.
pub trait ExtractionStrategy: Send + Sync {
    /// The method this strategy implements.
    fn method(&self) -> ExtractionMethod;

    /// Raw text, one entry per page (or a single entry for whole-document
    /// backends).
    fn extract_pages(&self, document: &Document) -> Result<Vec<String>, PdfNotesError>;
}

fn failed(method: ExtractionMethod, detail: impl Into<String>) -> PdfNotesError {
    PdfNotesError::ExtractionFailed {
        method,
        detail: detail.into(),
    }
}

// ── pypdf2: lopdf content streams ────────────────────────────────────────────

/// Page-by-page text from the PDF content streams.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContentStreamStrategy;

impl ExtractionStrategy for ContentStreamStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::PyPdf2
    }

    fn extract_pages(&self, document: &Document) -> Result<Vec<String>, PdfNotesError> {
        let doc = lopdf::Document::load(document.path()).map_err(|e| {
            PdfNotesError::SourceUnreadable {
                path: document.path().to_path_buf(),
                detail: e.to_string(),
            }
        })?;

        let pages = doc.get_pages();
        debug!("lopdf: {} pages", pages.len());
        pages
            .keys()
            .map(|&page_num| {
                doc.extract_text(&[page_num])
                    .map_err(|e| failed(self.method(), format!("page {page_num}: {e}")))
            })
            .collect()
    }
}

// ── pdfplumber: pdfium text segments grouped by position ─────────────────────

/// A run of text with its vertical extent in PDF user space (origin bottom-left).
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub left: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Rebuild reading-order lines from positioned runs.
///
/// Runs are sorted top to bottom, then left to right. A run joins the
/// current line when its vertical centre lies inside the line's extent.
pub fn group_into_lines(mut runs: Vec<TextRun>) -> String {
    runs.retain(|r| !r.text.trim().is_empty());
    runs.sort_by(|a, b| {
        b.top
            .partial_cmp(&a.top)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.left.partial_cmp(&b.left).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<(f32, f32, Vec<TextRun>)> = Vec::new();
    for run in runs {
        let centre = (run.top + run.bottom) / 2.0;
        match lines.last_mut() {
            Some((top, bottom, members)) if centre <= *top && centre >= *bottom => {
                members.push(run);
            }
            _ => lines.push((run.top, run.bottom, vec![run])),
        }
    }

    lines
        .into_iter()
        .map(|(_, _, mut members)| {
            members.sort_by(|a, b| a.left.partial_cmp(&b.left).unwrap_or(std::cmp::Ordering::Equal));
            members
                .iter()
                .map(|r| r.text.trim())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Layout-aware text from pdfium's positioned text segments.
#[derive(Debug, Default, Clone, Copy)]
pub struct LayoutStrategy;

impl ExtractionStrategy for LayoutStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::PdfPlumber
    }

    fn extract_pages(&self, document: &Document) -> Result<Vec<String>, PdfNotesError> {
        let pdfium = load_pdfium()?;
        let pdf = pdfium
            .load_pdf_from_file(document.path(), None)
            .map_err(|e| load_error(document.path(), e))?;

        let mut pages = Vec::new();
        for (idx, page) in pdf.pages().iter().enumerate() {
            let text_page = page
                .text()
                .map_err(|e| failed(self.method(), format!("page {}: {e:?}", idx + 1)))?;
            let runs = text_page
                .segments()
                .iter()
                .map(|segment| {
                    let bounds = segment.bounds();
                    TextRun {
                        text: segment.text(),
                        left: bounds.left().value,
                        top: bounds.top().value,
                        bottom: bounds.bottom().value,
                    }
                })
                .collect();
            pages.push(group_into_lines(runs));
        }
        Ok(pages)
    }
}

// ── pdfminer: pdf-extract ────────────────────────────────────────────────────

/// Whole-document stream extraction via `pdf-extract`.
///
/// `pdf-extract` panics on some malformed fonts; panics become errors.
#[derive(Debug, Default, Clone, Copy)]
pub struct StreamStrategy;

impl ExtractionStrategy for StreamStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::PdfMiner
    }

    fn extract_pages(&self, document: &Document) -> Result<Vec<String>, PdfNotesError> {
        let bytes = std::fs::read(document.path()).map_err(|e| PdfNotesError::SourceUnreadable {
            path: document.path().to_path_buf(),
            detail: e.to_string(),
        })?;

        match catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(&bytes))) {
            Ok(Ok(text)) => Ok(vec![text]),
            Ok(Err(e)) => Err(failed(self.method(), format!("{e:?}"))),
            Err(_) => Err(failed(self.method(), "pdf-extract panicked")),
        }
    }
}

// ── ocr / image: rasterise + crop + OCR ──────────────────────────────────────

/// Rasterise every page, crop at the QR marker and OCR the result.
///
/// Built for either `ocr` (any page failure fails the strategy) or `image`
/// (failed pages are skipped; only all pages failing is an error).
#[derive(Clone)]
pub struct OcrStrategy {
    method: ExtractionMethod,
    renderer: Arc<dyn PageRenderer>,
    cropper: QrCropper,
    engine: Arc<dyn OcrEngine>,
    dpi: u32,
    language: String,
    psm: u8,
}

impl OcrStrategy {
    pub fn ocr(
        renderer: Arc<dyn PageRenderer>,
        cropper: QrCropper,
        engine: Arc<dyn OcrEngine>,
        config: &ProcessingConfig,
    ) -> Self {
        Self {
            method: ExtractionMethod::Ocr,
            renderer,
            cropper,
            engine,
            dpi: config.extraction_dpi,
            language: config.ocr_language.clone(),
            psm: config.ocr_psm,
        }
    }

    pub fn image(
        renderer: Arc<dyn PageRenderer>,
        cropper: QrCropper,
        engine: Arc<dyn OcrEngine>,
        config: &ProcessingConfig,
    ) -> Self {
        Self {
            method: ExtractionMethod::Image,
            psm: config.image_psm,
            ..Self::ocr(renderer, cropper, engine, config)
        }
    }
}

impl ExtractionStrategy for OcrStrategy {
    fn method(&self) -> ExtractionMethod {
        self.method
    }

    fn extract_pages(&self, document: &Document) -> Result<Vec<String>, PdfNotesError> {
        let images = self.renderer.render(document, self.dpi)?;
        let total = images.len();
        let mut pages = Vec::with_capacity(total);
        let mut last_err = None;

        for (idx, image) in images.into_iter().enumerate() {
            let image = self.cropper.crop_at_marker(image);
            match self.engine.image_to_text(&image, &self.language, self.psm) {
                Ok(text) => pages.push(text),
                Err(e) if self.method == ExtractionMethod::Image => {
                    warn!("{}: page {}/{} skipped: {}", self.method, idx + 1, total, e);
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        if pages.is_empty() {
            if let Some(e) = last_err {
                return Err(failed(self.method, format!("every page failed OCR, last: {e}")));
            }
        }
        Ok(pages)
    }
}

// ── Engine ───────────────────────────────────────────────────────────────────

/// Runs extraction strategies and applies the fallback table.
#[derive(Clone)]
pub struct ExtractionEngine {
    strategies: BTreeMap<ExtractionMethod, Arc<dyn ExtractionStrategy>>,
}

impl std::fmt::Debug for ExtractionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionEngine")
            .field("methods", &self.strategies.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ExtractionEngine {
    /// Engine with the default backends: pdfium rendering, rqrr QR
    /// detection and the `tesseract` binary.
    pub fn new(config: &ProcessingConfig) -> Self {
        Self::with_backends(
            config,
            Arc::new(PdfiumRenderer),
            QrCropper::default(),
            Arc::new(TesseractCli::default()),
        )
    }

    /// Engine whose OCR-based strategies use the given collaborators.
    pub fn with_backends(
        config: &ProcessingConfig,
        renderer: Arc<dyn PageRenderer>,
        cropper: QrCropper,
        ocr: Arc<dyn OcrEngine>,
    ) -> Self {
        let engine = Self {
            strategies: BTreeMap::new(),
        };
        engine
            .with_strategy(Arc::new(ContentStreamStrategy))
            .with_strategy(Arc::new(LayoutStrategy))
            .with_strategy(Arc::new(StreamStrategy))
            .with_strategy(Arc::new(OcrStrategy::ocr(
                Arc::clone(&renderer),
                cropper.clone(),
                Arc::clone(&ocr),
                config,
            )))
            .with_strategy(Arc::new(OcrStrategy::image(renderer, cropper, ocr, config)))
    }

    /// Replace the strategy registered for `strategy.method()`.
    pub fn with_strategy(mut self, strategy: Arc<dyn ExtractionStrategy>) -> Self {
        self.strategies.insert(strategy.method(), strategy);
        self
    }

    /// Extract with `method`, walking its fallback chain on failure.
    ///
    /// Returns the error of the last method tried when the whole chain fails.
    pub fn extract(
        &self,
        document: &Document,
        method: ExtractionMethod,
    ) -> Result<String, PdfNotesError> {
        let mut last_err = None;
        for current in method.chain() {
            let Some(strategy) = self.strategies.get(&current) else {
                last_err = Some(PdfNotesError::Internal(format!(
                    "no strategy registered for {current}"
                )));
                continue;
            };
            match strategy.extract_pages(document) {
                Ok(pages) => {
                    if current != method {
                        info!("{} failed, used {} instead", method, current);
                    }
                    return Ok(join_pages(&pages));
                }
                Err(e) => {
                    match current.fallback() {
                        Some(next) => warn!("{} extraction failed ({}), falling back to {}", current, e, next),
                        None => warn!("{} extraction failed: {}", current, e),
                    }
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| failed(method, "no strategy ran")))
    }

    /// Run every method independently.
    ///
    /// The document is validated once up front; that is the only error
    /// returned. A method whose whole chain fails gets a [`MethodFailure`].
    pub fn extract_all(
        &self,
        document: &Document,
    ) -> Result<BTreeMap<ExtractionMethod, Result<String, MethodFailure>>, PdfNotesError> {
        Document::open(document.path(), document.margin_percentage())?;

        Ok(ExtractionMethod::ALL
            .into_iter()
            .map(|method| {
                let result = self.extract(document, method).map_err(|e| MethodFailure {
                    method,
                    detail: e.to_string(),
                });
                (method, result)
            })
            .collect())
    }
}

/// Normalise each page, drop empty ones, join with a blank line.
fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|p| normalize(p))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
        .trim()
        .to_string()
}
