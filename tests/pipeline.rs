//! Integration tests for the job pipeline.
//!
//! Test PDFs are synthesised with lopdf. The `pypdf2` method needs no native
//! library, so most tests swap in a fake page renderer and run without
//! pdfium. Tests that do need pdfium print SKIP and return when it cannot be
//! bound.
//!
//! Run with:
//!   cargo test --test pipeline -- --nocapture

use async_trait::async_trait;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream};
use pdfnotes::pdfium::pdfium_available;
use pdfnotes::pipeline::annotate::annotate;
use pdfnotes::pipeline::extract::ExtractionStrategy;
use pdfnotes::pipeline::qr::QrCropper;
use pdfnotes::pipeline::render::{PageRenderer, PdfiumRenderer};
use pdfnotes::pipeline::typeset::{PagesRenderer, TranslationDocument, TranslationRenderer};
use pdfnotes::{
    DisabledTranslator, Document, ExtractionEngine, ExtractionMethod, JobProgressCallback,
    JobRequest, JobStatus, PdfNotesError, ProcessingConfig, Processor, Translator,
    VocabularyExtractor, COMPLETION_MARKER,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Write a PDF with one line of Helvetica text per page.
fn write_text_pdf(path: &Path, pages: &[&str]) {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 18.into()]),
                Operation::new("Td", vec![20.into(), 50.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 200.into(), 100.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

fn lecture_pdf(dir: &Path) -> PathBuf {
    let path = dir.join("lecture.pdf");
    write_text_pdf(&path, &["Hello World", "Second Page"]);
    path
}

/// Two flat pages whose width is half the DPI.
struct FakeRenderer;

impl PageRenderer for FakeRenderer {
    fn render(&self, _doc: &Document, dpi: u32) -> Result<Vec<DynamicImage>, PdfNotesError> {
        let (w, h) = (dpi / 2, dpi / 4);
        Ok(vec![
            DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([20, 20, 20]))),
            DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([200, 10, 10]))),
        ])
    }
}

struct PrefixTranslator;

#[async_trait]
impl Translator for PrefixTranslator {
    fn name(&self) -> &str {
        "prefix"
    }

    async fn translate(&self, text: &str) -> Result<String, PdfNotesError> {
        Ok(format!("TRANSLATED:{text}"))
    }
}

struct WordList;

#[async_trait]
impl VocabularyExtractor for WordList {
    async fn extract_vocabulary(&self, text: &str) -> Result<String, PdfNotesError> {
        let words: Vec<String> = text
            .split_whitespace()
            .enumerate()
            .map(|(i, w)| format!("{}. {}: -", i + 1, w))
            .collect();
        Ok(format!("Key vocabulary:\n{}", words.join("\n")))
    }
}

struct PanickingTranslator;

#[async_trait]
impl Translator for PanickingTranslator {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn translate(&self, _text: &str) -> Result<String, PdfNotesError> {
        panic!("model exploded")
    }
}

struct PanickingVocabulary;

#[async_trait]
impl VocabularyExtractor for PanickingVocabulary {
    async fn extract_vocabulary(&self, _text: &str) -> Result<String, PdfNotesError> {
        panic!("word list exploded")
    }
}

struct PanickingRenderer;

impl PageRenderer for PanickingRenderer {
    fn render(&self, _doc: &Document, _dpi: u32) -> Result<Vec<DynamicImage>, PdfNotesError> {
        panic!("rasteriser exploded")
    }
}

struct FailingStrategy(ExtractionMethod);

impl ExtractionStrategy for FailingStrategy {
    fn method(&self) -> ExtractionMethod {
        self.0
    }

    fn extract_pages(&self, _doc: &Document) -> Result<Vec<String>, PdfNotesError> {
        Err(PdfNotesError::ExtractionFailed {
            method: self.0,
            detail: "forced failure".into(),
        })
    }
}

struct FailingRenderer;

impl TranslationRenderer for FailingRenderer {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn render(&self, _doc: &TranslationDocument<'_>, _output: &Path) -> Result<PathBuf, PdfNotesError> {
        Err(PdfNotesError::FontUnavailable("none".into()))
    }
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl JobProgressCallback for Recorder {
    fn on_job_start(&self, _job_id: &str, total_steps: usize) {
        self.events.lock().unwrap().push(format!("start {total_steps}"));
    }

    fn on_step_start(&self, _job_id: &str, step: usize, _total: usize, _label: &str) {
        self.events.lock().unwrap().push(format!("step {step}"));
    }

    fn on_job_complete(&self, _job_id: &str) {
        self.events.lock().unwrap().push("complete".into());
    }

    fn on_job_error(&self, _job_id: &str, _error: &str) {
        self.events.lock().unwrap().push("error".into());
    }
}

fn config(out: &Path) -> ProcessingConfig {
    ProcessingConfig::builder().output_root(out).build().unwrap()
}

fn processor(out: &Path) -> Processor {
    Processor::new(config(out)).with_renderer(Arc::new(FakeRenderer))
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

// ── Job pipeline ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn two_page_pdf_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = lecture_pdf(dir.path());
    let processor = processor(&dir.path().join("out"));

    let request = JobRequest::new(ExtractionMethod::PyPdf2, Arc::new(PrefixTranslator))
        .with_vocabulary(Arc::new(WordList));
    let snap = processor.process(&pdf, request).await.unwrap();

    assert_eq!(snap.status, JobStatus::Completed, "log: {:#?}", snap.progress);
    assert_eq!(snap.image_count, 2);
    assert_eq!((snap.current_step, snap.total_steps), (4, 4));
    assert!(snap.has_text && snap.has_translation && snap.has_vocabulary);
    assert!(!snap.has_translated_pdf && !snap.has_notes_pdf);
    assert_eq!(snap.progress.last().map(String::as_str), Some(COMPLETION_MARKER));
    assert_eq!(snap.progress[0], "Step 1/4: Rasterising PDF pages and adding note margins...");
    assert!(snap.progress.contains(&"✓ PDF processed, 2 page images generated".to_string()));

    let record = processor.store().get(&snap.id).unwrap();
    let out_dir = record.output_dir().to_path_buf();
    let short: String = snap.id.chars().take(8).collect();
    assert_eq!(out_dir.file_name().unwrap().to_string_lossy(), format!("lecture_{short}"));

    // 200 DPI → 100 px wide pages, 1.3× with the default margin.
    for (i, image) in record.artifacts.page_images.iter().enumerate() {
        assert_eq!(image, &out_dir.join(format!("page_{}.png", i + 1)));
        assert_eq!(image::open(image).unwrap().dimensions(), (130, 50));
    }

    let text = read(&out_dir.join("lecture.txt"));
    assert!(text.contains("Hello World"), "text: {text:?}");
    assert!(text.contains("Second Page"), "text: {text:?}");
    assert_eq!(read(&out_dir.join("lecture_translation.txt")), format!("TRANSLATED:{text}"));
    assert!(read(&out_dir.join("lecture_vocabulary.txt")).starts_with("Key vocabulary:"));
}

#[tokio::test]
async fn translation_failure_still_completes() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = lecture_pdf(dir.path());
    let processor = processor(&dir.path().join("out"));

    let request = JobRequest::new(ExtractionMethod::PyPdf2, Arc::new(DisabledTranslator));
    let snap = processor.process(&pdf, request).await.unwrap();

    assert_eq!(snap.status, JobStatus::Completed);
    assert!(snap.error.is_none());
    assert!(snap.has_text);
    assert!(!snap.has_translation);
    assert!(!snap.has_vocabulary);
    assert!(snap.progress.iter().any(|l| l.starts_with("❌ Translation failed")));
    assert!(snap.progress.contains(&"Continuing with next step...".to_string()));
    assert!(snap
        .progress
        .iter()
        .any(|l| l.starts_with("❌ Vocabulary extraction failed")));
}

#[tokio::test]
async fn collaborator_panics_are_step_failures() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = lecture_pdf(dir.path());
    let processor = processor(&dir.path().join("out"));

    let id = processor.submit(&pdf);
    let request = JobRequest::new(ExtractionMethod::PyPdf2, Arc::new(PanickingTranslator))
        .with_vocabulary(Arc::new(PanickingVocabulary));
    processor.start(&id, request).unwrap().await.unwrap();

    let snap = processor.status(&id).unwrap();
    assert_eq!(snap.status, JobStatus::Completed, "log: {:#?}", snap.progress);
    assert_eq!(snap.current_step, 4);
    assert!(snap.has_text);
    assert!(!snap.has_translation && !snap.has_vocabulary);
    assert!(snap
        .progress
        .iter()
        .any(|l| l.starts_with("❌ Translation failed") && l.contains("model exploded")));
    assert!(snap
        .progress
        .iter()
        .any(|l| l.starts_with("❌ Vocabulary extraction failed") && l.contains("word list exploded")));
}

#[tokio::test]
async fn renderer_panic_fails_job_at_step_one() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = lecture_pdf(dir.path());
    let processor = Processor::new(config(&dir.path().join("out")))
        .with_renderer(Arc::new(PanickingRenderer));

    let request = JobRequest::new(ExtractionMethod::PyPdf2, Arc::new(PrefixTranslator));
    let snap = processor.process(&pdf, request).await.unwrap();

    assert!(snap.status.is_terminal());
    assert_eq!(snap.status, JobStatus::Error);
    assert_eq!(snap.current_step, 1);
    assert!(snap.error.unwrap().contains("panicked"));
}

#[tokio::test]
async fn unwritable_translation_logs_like_a_failed_translation() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = lecture_pdf(dir.path());
    let processor = processor(&dir.path().join("out"));

    let id = processor.submit(&pdf);
    let out_dir = processor.store().get(&id).unwrap().output_dir().to_path_buf();
    // A directory where the translation file should go.
    std::fs::create_dir_all(out_dir.join("lecture_translation.txt")).unwrap();

    let request = JobRequest::new(ExtractionMethod::PyPdf2, Arc::new(PrefixTranslator));
    processor.start(&id, request).unwrap().await.unwrap();

    let snap = processor.status(&id).unwrap();
    assert_eq!(snap.status, JobStatus::Completed);
    assert!(!snap.has_translation);
    let failed = snap
        .progress
        .iter()
        .position(|l| l.starts_with("❌ Translation failed"))
        .expect("translation failure logged");
    assert_eq!(snap.progress[failed + 1], "Continuing with next step...");
}

#[tokio::test]
async fn missing_source_fails_at_step_one() {
    let dir = tempfile::tempdir().unwrap();
    let processor = processor(&dir.path().join("out"));

    let request = JobRequest::new(ExtractionMethod::PyPdf2, Arc::new(PrefixTranslator));
    let snap = processor
        .process(dir.path().join("absent.pdf"), request)
        .await
        .unwrap();

    assert_eq!(snap.status, JobStatus::Error);
    assert_eq!(snap.current_step, 1);
    assert_eq!(snap.image_count, 0);
    let error = snap.error.as_deref().unwrap();
    assert!(error.contains("not found"), "error: {error}");
    assert!(snap.progress.last().unwrap().starts_with("❌ Processing failed:"));
}

#[tokio::test]
async fn extraction_failure_is_fatal_at_step_two() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = lecture_pdf(dir.path());
    let cfg = config(&dir.path().join("out"));
    let engine = ExtractionMethod::ALL
        .into_iter()
        .fold(ExtractionEngine::new(&cfg), |engine, m| {
            engine.with_strategy(Arc::new(FailingStrategy(m)))
        });
    let processor = Processor::new(cfg)
        .with_renderer(Arc::new(FakeRenderer))
        .with_engine(engine);

    let request = JobRequest::new(ExtractionMethod::PdfMiner, Arc::new(PrefixTranslator));
    let snap = processor.process(&pdf, request).await.unwrap();

    assert_eq!(snap.status, JobStatus::Error);
    assert_eq!(snap.current_step, 2);
    assert_eq!(snap.image_count, 2);
    assert!(!snap.has_text);
    assert!(snap.error.unwrap().contains("pypdf2"));
}

#[tokio::test]
async fn translated_pdf_from_ladder() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = lecture_pdf(dir.path());
    let processor = processor(&dir.path().join("out"))
        .with_ladder(vec![Box::new(FailingRenderer), Box::new(PagesRenderer)]);

    let request = JobRequest::new(ExtractionMethod::PyPdf2, Arc::new(PrefixTranslator))
        .with_translated_pdf(true);
    let snap = processor.process(&pdf, request).await.unwrap();

    assert_eq!(snap.status, JobStatus::Completed);
    assert_eq!((snap.current_step, snap.total_steps), (5, 5));
    assert!(snap.has_translated_pdf);
    assert!(snap.progress.iter().any(|l| l.contains("pages renderer")));

    let record = processor.store().get(&snap.id).unwrap();
    let pdf_out = record.artifacts.translated_pdf.unwrap();
    assert_eq!(pdf_out.file_name().unwrap(), "lecture_translation.pdf");
    assert_eq!(lopdf::Document::load(&pdf_out).unwrap().get_pages().len(), 2);
}

#[tokio::test]
async fn config_switches_on_translated_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = lecture_pdf(dir.path());
    let cfg = ProcessingConfig::builder()
        .output_root(dir.path().join("out"))
        .render_translated_pdf(true)
        .build()
        .unwrap();
    let processor = Processor::new(cfg)
        .with_renderer(Arc::new(FakeRenderer))
        .with_ladder(vec![Box::new(PagesRenderer)]);

    let request = JobRequest::new(ExtractionMethod::PyPdf2, Arc::new(PrefixTranslator));
    let snap = processor.process(&pdf, request.clone()).await.unwrap();
    assert_eq!(snap.total_steps, 5);
    assert!(snap.has_translated_pdf);

    // A per-job choice wins over the config.
    let snap = processor
        .process(&pdf, request.with_translated_pdf(false))
        .await
        .unwrap();
    assert_eq!(snap.total_steps, 4);
    assert!(!snap.has_translated_pdf);
}

#[tokio::test]
async fn notes_pdf_packs_annotated_pages() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = lecture_pdf(dir.path());
    let cfg = ProcessingConfig::builder()
        .output_root(dir.path().join("out"))
        .notes_pdf(true)
        .build()
        .unwrap();
    let processor = Processor::new(cfg).with_renderer(Arc::new(FakeRenderer));

    let request = JobRequest::new(ExtractionMethod::PyPdf2, Arc::new(DisabledTranslator));
    let snap = processor.process(&pdf, request).await.unwrap();

    assert_eq!(snap.status, JobStatus::Completed);
    assert!(snap.has_notes_pdf);
    assert!(snap.progress.contains(&"✓ Notes PDF saved to lecture_notes.pdf".to_string()));
    let notes = processor.store().get(&snap.id).unwrap().artifacts.notes_pdf.unwrap();
    assert_eq!(lopdf::Document::load(&notes).unwrap().get_pages().len(), 2);

}

#[tokio::test]
async fn exhausted_ladder_does_not_fail_job() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = lecture_pdf(dir.path());
    let processor = processor(&dir.path().join("out")).with_ladder(vec![Box::new(FailingRenderer)]);

    let request = JobRequest::new(ExtractionMethod::PyPdf2, Arc::new(PrefixTranslator))
        .with_translated_pdf(true);
    let snap = processor.process(&pdf, request).await.unwrap();

    assert_eq!(snap.status, JobStatus::Completed);
    assert!(!snap.has_translated_pdf);
    assert!(snap
        .progress
        .iter()
        .any(|l| l.starts_with("❌ Translated PDF generation failed")));
}

#[tokio::test]
async fn export_selected_pages() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = lecture_pdf(dir.path());
    let processor = processor(&dir.path().join("out"));

    let request = JobRequest::new(ExtractionMethod::PyPdf2, Arc::new(DisabledTranslator));
    let snap = processor.process(&pdf, request).await.unwrap();

    let err = processor.export(&snap.id, &[]).await.unwrap_err();
    assert!(matches!(err, PdfNotesError::InvalidConfig(_)));
    let err = processor.export(&snap.id, &[7, 9]).await.unwrap_err();
    assert!(matches!(err, PdfNotesError::InvalidConfig(_)));

    let path = processor.export(&snap.id, &[1, 42]).await.unwrap();
    assert_eq!(path.file_name().unwrap(), "lecture_export.pdf");
    assert_eq!(lopdf::Document::load(&path).unwrap().get_pages().len(), 1);
    assert!(processor.status(&snap.id).unwrap().has_export);

    assert!(matches!(
        processor.export("no-such-job", &[0]).await,
        Err(PdfNotesError::JobNotFound(_))
    ));
}

#[tokio::test]
async fn callback_sees_every_step() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = lecture_pdf(dir.path());
    let recorder = Arc::new(Recorder::default());
    let cfg = ProcessingConfig::builder()
        .output_root(dir.path().join("out"))
        .progress_callback(recorder.clone() as Arc<dyn JobProgressCallback>)
        .build()
        .unwrap();
    let processor = Processor::new(cfg).with_renderer(Arc::new(FakeRenderer));

    let request = JobRequest::new(ExtractionMethod::PyPdf2, Arc::new(PrefixTranslator));
    processor.process(&pdf, request).await.unwrap();

    let events = recorder.events.lock().unwrap();
    assert_eq!(
        *events,
        vec!["start 4", "step 1", "step 2", "step 3", "step 4", "complete"]
    );
}

#[tokio::test]
async fn submit_then_start_is_pollable() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = lecture_pdf(dir.path());
    let processor = processor(&dir.path().join("out"));

    let id = processor.submit(&pdf);
    assert_eq!(processor.status(&id).unwrap().status, JobStatus::Uploaded);

    let request = JobRequest::new(ExtractionMethod::PyPdf2, Arc::new(PrefixTranslator));
    let handle = processor.start(&id, request.clone()).unwrap();
    assert_ne!(processor.status(&id).unwrap().status, JobStatus::Uploaded);
    handle.await.unwrap();
    assert_eq!(processor.status(&id).unwrap().status, JobStatus::Completed);

    let again = processor.start(&id, request);
    assert!(matches!(again, Err(PdfNotesError::InvalidTransition { .. })));
    assert!(matches!(processor.status("nope"), Err(PdfNotesError::JobNotFound(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn bounded_pool_runs_every_job() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = lecture_pdf(dir.path());
    let cfg = ProcessingConfig::builder()
        .output_root(dir.path().join("out"))
        .max_concurrent_jobs(1)
        .build()
        .unwrap();
    let processor = Processor::new(cfg).with_renderer(Arc::new(FakeRenderer));

    let mut handles = Vec::new();
    let mut ids = Vec::new();
    for _ in 0..3 {
        let id = processor.submit(&pdf);
        let request = JobRequest::new(ExtractionMethod::PyPdf2, Arc::new(PrefixTranslator));
        handles.push(processor.start(&id, request).unwrap());
        ids.push(id);
    }
    for handle in handles {
        handle.await.unwrap();
    }
    for id in ids {
        assert_eq!(processor.status(&id).unwrap().status, JobStatus::Completed);
    }
}

#[tokio::test]
async fn compare_methods_reports_every_method() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = lecture_pdf(dir.path());
    let cfg = config(&dir.path().join("out"));
    let engine = ExtractionEngine::new(&cfg)
        .with_strategy(Arc::new(FailingStrategy(ExtractionMethod::PdfPlumber)))
        .with_strategy(Arc::new(FailingStrategy(ExtractionMethod::Ocr)));
    let processor = Processor::new(cfg).with_engine(engine);

    let results = processor.compare_methods(&pdf).await.unwrap();
    assert_eq!(results.len(), ExtractionMethod::ALL.len());
    let pypdf2 = results[&ExtractionMethod::PyPdf2].as_ref().unwrap();
    assert!(pypdf2.contains("Hello World"));
    // Both fall back to pypdf2.
    assert_eq!(results[&ExtractionMethod::PdfPlumber].as_ref().unwrap(), pypdf2);
    assert_eq!(results[&ExtractionMethod::Ocr].as_ref().unwrap(), pypdf2);

    let missing = processor.compare_methods(dir.path().join("gone.pdf")).await;
    assert!(matches!(missing, Err(PdfNotesError::SourceNotFound { .. })));
}

// ── pdfium-backed stages ─────────────────────────────────────────────────────

#[test]
fn pdfium_annotated_pages_are_wider_by_margin() {
    if !pdfium_available() {
        println!("SKIP — pdfium library not available (set PDFIUM_LIB_PATH)");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let doc = Document::open(lecture_pdf(dir.path()), 30).unwrap();

    let raw = PdfiumRenderer.render(&doc, 200).unwrap();
    assert_eq!(raw.len(), 2);

    let pages = annotate(&doc, &PdfiumRenderer, &QrCropper::default(), 200, &dir.path().join("pages")).unwrap();
    assert_eq!(pages.len(), 2);
    for (path, source) in pages.iter().zip(&raw) {
        let (w, h) = source.dimensions();
        assert_eq!(image::open(path).unwrap().dimensions(), (w + w * 30 / 100, h));
    }
}

#[test]
fn pdfium_layout_extraction_reads_text() {
    if !pdfium_available() {
        println!("SKIP — pdfium library not available (set PDFIUM_LIB_PATH)");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let doc = Document::open(lecture_pdf(dir.path()), 30).unwrap();
    let engine = ExtractionEngine::new(&ProcessingConfig::default())
        .with_strategy(Arc::new(FailingStrategy(ExtractionMethod::PyPdf2)));

    let text = engine.extract(&doc, ExtractionMethod::PdfPlumber).unwrap();
    assert!(text.contains("Hello World"), "text: {text:?}");
}
