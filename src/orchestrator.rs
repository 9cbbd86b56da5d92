//! Job orchestration: submit a PDF, run the pipeline in the background and
//! expose its progress through the [`JobStore`].
//!
//! ## Steps
//!
//! ```text
//! 1. rasterise + QR crop + note margin   → page_{n}.png      (fatal)
//!    optional notes PDF                  → <name>_notes.pdf
//! 2. extract text with the chosen method → <name>.txt        (fatal)
//! 3. translate                           → <name>_translation.txt
//! 4. vocabulary                          → <name>_vocabulary.txt
//! 5. translated PDF (optional)           → <name>_translation.pdf
//! ```
//!
//! Only failures in steps 1–2 move a job to `error`. Steps 3–5 log their
//! failure and the job carries on to `completed`, and so does a failed
//! notes PDF. A panicking collaborator counts as a failure of its step.
//!
//! Each job runs on its own tokio task. The CPU-bound stages (pdfium,
//! tesseract, image encoding) run on the blocking pool.

use crate::config::{ExtractionMethod, ProcessingConfig};
use crate::document::{export_file_name, Document};
use crate::error::{MethodFailure, PdfNotesError};
use crate::job::{new_job_id, JobId, JobRecord, JobSnapshot, JobStore};
use crate::pipeline::annotate::{annotate, notes_pdf};
use crate::pipeline::assemble::images_to_pdf;
use crate::pipeline::extract::ExtractionEngine;
use crate::pipeline::qr::QrCropper;
use crate::pipeline::render::{PageRenderer, PdfiumRenderer};
use crate::pipeline::typeset::{
    default_ladder, render_with_fallback, TranslationDocument, TranslationRenderer,
};
use crate::progress::ProgressCallback;
use crate::translate::{Translator, VocabularyExtractor};
use futures::FutureExt;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// What to run for one job.
#[derive(Clone)]
pub struct JobRequest {
    pub method: ExtractionMethod,
    pub translator: Arc<dyn Translator>,
    /// Used in step 4 when the translator has no vocabulary of its own.
    pub vocabulary: Option<Arc<dyn VocabularyExtractor>>,
    /// Step 5 on or off for this job; `None` follows
    /// [`ProcessingConfig::render_translated_pdf`].
    pub render_translated_pdf: Option<bool>,
}

impl JobRequest {
    pub fn new(method: ExtractionMethod, translator: Arc<dyn Translator>) -> Self {
        Self {
            method,
            translator,
            vocabulary: None,
            render_translated_pdf: None,
        }
    }

    pub fn with_vocabulary(mut self, extractor: Arc<dyn VocabularyExtractor>) -> Self {
        self.vocabulary = Some(extractor);
        self
    }

    pub fn with_translated_pdf(mut self, enabled: bool) -> Self {
        self.render_translated_pdf = Some(enabled);
        self
    }

    fn renders_translated_pdf(&self, config: &ProcessingConfig) -> bool {
        self.render_translated_pdf
            .unwrap_or(config.render_translated_pdf)
    }

    fn total_steps(&self, config: &ProcessingConfig) -> usize {
        if self.renders_translated_pdf(config) {
            5
        } else {
            4
        }
    }
}

impl fmt::Debug for JobRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobRequest")
            .field("method", &self.method)
            .field("translator", &self.translator.name())
            .field("vocabulary", &self.vocabulary.as_ref().map(|_| "<dyn VocabularyExtractor>"))
            .field("render_translated_pdf", &self.render_translated_pdf)
            .finish()
    }
}

/// The single processing core behind every front-end.
#[derive(Clone)]
pub struct Processor {
    config: Arc<ProcessingConfig>,
    store: JobStore,
    renderer: Arc<dyn PageRenderer>,
    cropper: QrCropper,
    engine: ExtractionEngine,
    ladder: Arc<Vec<Box<dyn TranslationRenderer>>>,
    limiter: Option<Arc<Semaphore>>,
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Processor")
            .field("config", &self.config)
            .field("jobs", &self.store.len())
            .field("engine", &self.engine)
            .field("ladder", &self.ladder.iter().map(|r| r.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl Processor {
    /// Processor with the default backends (pdfium, rqrr, tesseract).
    pub fn new(config: ProcessingConfig) -> Self {
        let engine = ExtractionEngine::new(&config);
        Self {
            limiter: config
                .max_concurrent_jobs
                .map(|n| Arc::new(Semaphore::new(n))),
            config: Arc::new(config),
            store: JobStore::new(),
            renderer: Arc::new(PdfiumRenderer),
            cropper: QrCropper::default(),
            engine,
            ladder: Arc::new(default_ladder()),
        }
    }

    /// Replace the page renderer used for the annotated images.
    pub fn with_renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_cropper(mut self, cropper: QrCropper) -> Self {
        self.cropper = cropper;
        self
    }

    pub fn with_engine(mut self, engine: ExtractionEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_ladder(mut self, ladder: Vec<Box<dyn TranslationRenderer>>) -> Self {
        self.ladder = Arc::new(ladder);
        self
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// The job table; clone it to poll from elsewhere.
    pub fn store(&self) -> &JobStore {
        &self.store
    }

    /// Status query for one job.
    pub fn status(&self, id: &str) -> Result<JobSnapshot, PdfNotesError> {
        self.store.snapshot(id)
    }

    /// Record a new job in `uploaded` state.
    ///
    /// The source is not checked here; a missing file fails the job in step 1.
    pub fn submit(&self, source: impl AsRef<Path>) -> JobId {
        let record = JobRecord::new(new_job_id(), source, &self.config.output_root);
        info!("Job {} submitted for {}", record.id(), record.source().display());
        self.store.insert(record)
    }

    /// Mark the job `processing` and spawn its worker. Returns immediately.
    pub fn start(&self, id: &str, request: JobRequest) -> Result<JoinHandle<()>, PdfNotesError> {
        let total_steps = request.total_steps(&self.config);
        self.store.update(id, |r| r.begin(total_steps))??;
        if let Some(cb) = &self.config.progress_callback {
            cb.on_job_start(id, total_steps);
        }

        let processor = self.clone();
        let id = id.to_string();
        Ok(tokio::spawn(async move {
            let _permit = match &processor.limiter {
                Some(limiter) => Arc::clone(limiter).acquire_owned().await.ok(),
                None => None,
            };
            processor.run_job(&id, request).await;
        }))
    }

    /// Submit, start and wait for the job; returns its final snapshot.
    pub async fn process(
        &self,
        source: impl AsRef<Path>,
        request: JobRequest,
    ) -> Result<JobSnapshot, PdfNotesError> {
        let id = self.submit(source);
        let handle = self.start(&id, request)?;
        handle
            .await
            .map_err(|e| PdfNotesError::Internal(format!("job task panicked: {}", e)))?;
        self.store.snapshot(&id)
    }

    async fn run_job(&self, id: &str, request: JobRequest) {
        let ctx = JobContext {
            id,
            store: &self.store,
            callback: self.config.progress_callback.as_ref(),
            total_steps: request.total_steps(&self.config),
        };

        let outcome = AssertUnwindSafe(self.run_steps(&ctx, &request))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| {
                Err(PdfNotesError::Internal(format!(
                    "job worker panicked: {}",
                    panic_detail(payload.as_ref())
                )))
            });

        match outcome {
            Ok(()) => {
                if let Err(e) = self.store.update(id, |r| r.complete()).and_then(|r| r) {
                    warn!("Job {}: {}", id, e);
                    return;
                }
                info!("Job {} completed", id);
                if let Some(cb) = ctx.callback {
                    cb.on_job_complete(id);
                }
            }
            Err(e) => {
                let message = e.to_string();
                warn!("Job {} failed: {}", id, message);
                if let Err(e) = self.store.update(id, |r| r.fail(message.clone())).and_then(|r| r) {
                    warn!("Job {}: {}", id, e);
                    return;
                }
                if let Some(cb) = ctx.callback {
                    cb.on_job_error(id, &message);
                }
            }
        }
    }

    async fn run_steps(&self, ctx: &JobContext<'_>, request: &JobRequest) -> Result<(), PdfNotesError> {
        let record = self.store.get(ctx.id)?;
        let out_dir = record.output_dir().to_path_buf();

        // ── Step 1: annotated page images ────────────────────────────────
        ctx.step(1, "Rasterising PDF pages and adding note margins...")?;
        let document = Document::open(record.source(), self.config.margin_percentage)?;
        let images = {
            let document = document.clone();
            let renderer = Arc::clone(&self.renderer);
            let cropper = self.cropper.clone();
            let dpi = self.config.annotation_dpi;
            let out_dir = out_dir.clone();
            tokio::task::spawn_blocking(move || {
                annotate(&document, renderer.as_ref(), &cropper, dpi, &out_dir)
            })
            .await
            .map_err(|e| PdfNotesError::Internal(format!("annotate task panicked: {}", e)))??
        };
        self.store
            .update(ctx.id, |r| r.artifacts.page_images = images.clone())?;
        ctx.log(format!("✓ PDF processed, {} page images generated", images.len()))?;
        if self.config.notes_pdf {
            let pages = images.clone();
            let document = document.clone();
            let out_dir = out_dir.clone();
            let packed = tokio::task::spawn_blocking(move || {
                notes_pdf(&document, &pages, &out_dir, None)
            })
            .await
            .map_err(|e| PdfNotesError::Internal(format!("notes task panicked: {}", e)))
            .and_then(|r| r);
            match packed {
                Ok(path) => {
                    self.store
                        .update(ctx.id, |r| r.artifacts.notes_pdf = Some(path.clone()))?;
                    ctx.log(format!("✓ Notes PDF saved to {}", file_name(&path)))?;
                }
                Err(e) => ctx.recoverable(format!("❌ Notes PDF generation failed: {e}"))?,
            }
        }

        // ── Step 2: text extraction ──────────────────────────────────────
        ctx.step(2, &format!("Extracting text using {} method...", request.method))?;
        let text = {
            let document = document.clone();
            let engine = self.engine.clone();
            let method = request.method;
            tokio::task::spawn_blocking(move || engine.extract(&document, method))
                .await
                .map_err(|e| PdfNotesError::Internal(format!("extract task panicked: {}", e)))??
        };
        let text_path = out_dir.join(document.text_file_name());
        write_artifact(&text_path, &text).await?;
        self.store
            .update(ctx.id, |r| r.artifacts.text = Some(text_path.clone()))?;
        ctx.log(format!(
            "✓ Text extracted and saved to {}",
            file_name(&text_path)
        ))?;

        // ── Step 3: translation ──────────────────────────────────────────
        ctx.step(
            3,
            &format!("Translating text with {}...", request.translator.name()),
        )?;
        let translation_path = out_dir.join(document.translation_file_name());
        let translated = AssertUnwindSafe(request.translator.translate(&text))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| {
                Err(PdfNotesError::TranslationFailed(format!(
                    "translator panicked: {}",
                    panic_detail(payload.as_ref())
                )))
            });
        let saved = match translated {
            Ok(translation) => write_artifact(&translation_path, &translation)
                .await
                .map(|()| translation),
            Err(e) => Err(e),
        };
        let translation = match saved {
            Ok(translation) => {
                self.store.update(ctx.id, |r| {
                    r.artifacts.translation = Some(translation_path.clone())
                })?;
                ctx.log(format!(
                    "✓ Translation completed and saved to {}",
                    file_name(&translation_path)
                ))?;
                Some(translation)
            }
            Err(e) => {
                ctx.recoverable(format!("❌ Translation failed: {e}"))?;
                ctx.log("Continuing with next step...")?;
                None
            }
        };

        // ── Step 4: vocabulary ───────────────────────────────────────────
        ctx.step(4, "Extracting vocabulary...")?;
        let extractor: Option<&dyn VocabularyExtractor> = request
            .translator
            .vocabulary()
            .or_else(|| request.vocabulary.as_deref());
        let vocabulary = match extractor {
            Some(extractor) => AssertUnwindSafe(extractor.extract_vocabulary(&text))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| {
                    Err(PdfNotesError::VocabularyFailed(format!(
                        "vocabulary extractor panicked: {}",
                        panic_detail(payload.as_ref())
                    )))
                }),
            None => Err(PdfNotesError::VocabularyFailed(
                "no vocabulary extractor available".into(),
            )),
        };
        let vocabulary_path = out_dir.join(document.vocabulary_file_name());
        let written = match vocabulary {
            Ok(vocabulary) => write_artifact(&vocabulary_path, &vocabulary).await,
            Err(e) => Err(e),
        };
        match written {
            Ok(()) => {
                self.store.update(ctx.id, |r| {
                    r.artifacts.vocabulary = Some(vocabulary_path.clone())
                })?;
                ctx.log(format!(
                    "✓ Vocabulary extracted and saved to {}",
                    file_name(&vocabulary_path)
                ))?;
            }
            Err(e) => ctx.recoverable(format!("❌ Vocabulary extraction failed: {e}"))?,
        }

        // ── Step 5: translated PDF ───────────────────────────────────────
        if request.renders_translated_pdf(&self.config) {
            ctx.step(5, "Generating translated PDF...")?;
            match translation {
                Some(translation) => {
                    let output = out_dir.join(document.translated_pdf_file_name());
                    match self.render_translation(text, translation, images, output).await {
                        Ok((path, rung)) => {
                            self.store.update(ctx.id, |r| {
                                r.artifacts.translated_pdf = Some(path.clone())
                            })?;
                            ctx.log(format!(
                                "✓ Translated PDF generated with the {} renderer: {}",
                                rung,
                                file_name(&path)
                            ))?;
                        }
                        Err(e) => {
                            ctx.recoverable(format!("❌ Translated PDF generation failed: {e}"))?
                        }
                    }
                }
                None => ctx.recoverable(
                    "❌ Translated PDF generation skipped: no translation available",
                )?,
            }
        }

        Ok(())
    }

    async fn render_translation(
        &self,
        original: String,
        translation: String,
        page_images: Vec<PathBuf>,
        output: PathBuf,
    ) -> Result<(PathBuf, &'static str), PdfNotesError> {
        let ladder = Arc::clone(&self.ladder);
        tokio::task::spawn_blocking(move || {
            let doc = TranslationDocument {
                original: &original,
                translation: &translation,
                page_images: &page_images,
            };
            render_with_fallback(&ladder, &doc, &output)
        })
        .await
        .map_err(|e| PdfNotesError::Internal(format!("render task panicked: {}", e)))?
    }

    /// Write the selected pages (0-based indices into the job's page images)
    /// to `<name>_export.pdf` in the job's output directory.
    ///
    /// Out-of-range indices are ignored. An empty or entirely invalid
    /// selection is `InvalidConfig`.
    pub async fn export(&self, id: &str, selected: &[usize]) -> Result<PathBuf, PdfNotesError> {
        let record = self.store.get(id)?;
        let pages = &record.artifacts.page_images;
        if pages.is_empty() {
            return Err(PdfNotesError::InvalidConfig(format!(
                "job {id} has no page images to export"
            )));
        }
        if selected.is_empty() {
            return Err(PdfNotesError::InvalidConfig("no pages selected".into()));
        }
        let chosen: Vec<PathBuf> = selected
            .iter()
            .filter_map(|&i| pages.get(i).cloned())
            .collect();
        if chosen.is_empty() {
            return Err(PdfNotesError::InvalidConfig(
                "selected pages are out of range".into(),
            ));
        }

        let output = record.output_dir().join(export_file_name(record.name()));
        let count = chosen.len();
        let written = tokio::task::spawn_blocking(move || images_to_pdf(&chosen, &output, None))
            .await
            .map_err(|e| PdfNotesError::Internal(format!("export task panicked: {}", e)))??;

        let line = format!("✓ Exported {} pages to {}", count, file_name(&written));
        self.store.update(id, |r| {
            r.artifacts.export = Some(written.clone());
            r.log(line.clone());
        })?;
        if let Some(cb) = &self.config.progress_callback {
            cb.on_log(id, &line);
        }
        Ok(written)
    }

    /// Run every extraction method on `source` for side-by-side comparison.
    pub async fn compare_methods(
        &self,
        source: impl AsRef<Path>,
    ) -> Result<BTreeMap<ExtractionMethod, Result<String, MethodFailure>>, PdfNotesError> {
        let document = Document::open(source, self.config.margin_percentage)?;
        let engine = self.engine.clone();
        tokio::task::spawn_blocking(move || engine.extract_all(&document))
            .await
            .map_err(|e| PdfNotesError::Internal(format!("compare task panicked: {}", e)))?
    }
}

/// Writes progress for one running job to the store and the callback.
struct JobContext<'a> {
    id: &'a str,
    store: &'a JobStore,
    callback: Option<&'a ProgressCallback>,
    total_steps: usize,
}

impl JobContext<'_> {
    fn step(&self, step: usize, label: &str) -> Result<(), PdfNotesError> {
        let line = format!("Step {}/{}: {}", step, self.total_steps, label);
        info!("Job {}: {}", self.id, line);
        self.store
            .update(self.id, |r| r.enter_step(step, line.clone()))??;
        if let Some(cb) = self.callback {
            cb.on_step_start(self.id, step, self.total_steps, label);
            cb.on_log(self.id, &line);
        }
        Ok(())
    }

    fn log(&self, line: impl Into<String>) -> Result<(), PdfNotesError> {
        let line = line.into();
        info!("Job {}: {}", self.id, line);
        self.push(line)
    }

    /// Log a step-local failure that does not stop the job.
    fn recoverable(&self, line: impl Into<String>) -> Result<(), PdfNotesError> {
        let line = line.into();
        warn!("Job {}: {}", self.id, line);
        self.push(line)
    }

    fn push(&self, line: String) -> Result<(), PdfNotesError> {
        self.store.update(self.id, |r| r.log(line.clone()))?;
        if let Some(cb) = self.callback {
            cb.on_log(self.id, &line);
        }
        Ok(())
    }
}

async fn write_artifact(path: &Path, contents: &str) -> Result<(), PdfNotesError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| PdfNotesError::OutputWriteFailed {
            path: path.to_path_buf(),
            source,
        })
}

/// Message carried by a panic payload, when it has one.
fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
