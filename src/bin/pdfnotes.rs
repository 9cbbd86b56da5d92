//! CLI binary for pdfnotes.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ProcessingConfig` + `JobRequest`, runs one job and prints the result.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdfnotes::{
    DisabledTranslator, ExtractionMethod, JobProgressCallback, JobRequest, JobSnapshot, JobStatus,
    LlmTranslator, ProcessingConfig, Processor, ProgressCallback, Translator, TranslatorModel,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

/// Colour a progress-log line by its leading marker.
fn paint(line: &str) -> String {
    if line.starts_with('✓') {
        green(line)
    } else if line.starts_with('❌') {
        red(line)
    } else if line.starts_with("Step ") {
        bold(line)
    } else {
        dim(line)
    }
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner anchored at the bottom of the terminal; every progress-log line
/// is printed above it as it arrives.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl JobProgressCallback for CliProgressCallback {
    fn on_job_start(&self, _job_id: &str, total_steps: usize) {
        self.bar.set_prefix("Processing");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Starting job ({total_steps} steps)…"))
        ));
    }

    fn on_step_start(&self, _job_id: &str, step: usize, total_steps: usize, label: &str) {
        self.bar.set_prefix(format!("Step {step}/{total_steps}"));
        self.bar.set_message(label.to_string());
    }

    fn on_log(&self, _job_id: &str, line: &str) {
        self.bar.println(format!("  {}", paint(line)));
    }

    fn on_job_complete(&self, _job_id: &str) {
        self.bar.finish_and_clear();
    }

    fn on_job_error(&self, _job_id: &str, _error: &str) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Note pages, text, translation and vocabulary into ./output
  pdfnotes lecture.pdf

  # Layout-aware extraction, wider margin, custom output root
  pdfnotes --method pdfplumber --margin 40 --output-dir notes lecture.pdf

  # Skip the LLM entirely (steps 3-4 are logged as failed)
  pdfnotes --no-translate lecture.pdf

  # Also render the translation as a PDF
  pdfnotes --translated-pdf lecture.pdf

  # Also collect every note page into <name>_notes.pdf
  pdfnotes --notes-pdf lecture.pdf

  # Export pages 1, 3 and 5 of the note pages to one PDF
  pdfnotes --export 1,3,5 lecture.pdf

  # Compare every extraction method side by side
  pdfnotes --compare-methods lecture.pdf

  # Machine-readable job snapshot
  pdfnotes --json lecture.pdf > job.json

EXTRACTION METHODS:
  pypdf2      content-stream text, page by page (final fallback)
  pdfplumber  layout-aware lines          → falls back to pypdf2
  pdfminer    whole-document stream text  → falls back to pdfplumber
  ocr         300 DPI render + tesseract  → falls back to pypdf2
  image       ocr with free-form layout   → falls back to pypdf2

TRANSLATORS:
  auto / deepseek     deepseek-reasoner  (DEEPSEEK_API_KEY)
  deepseek-chat       deepseek-chat      (DEEPSEEK_API_KEY)
  openrouter          deepseek/deepseek-chat via OpenRouter (OPENROUTER_API_KEY)

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH     Path to libpdfium (file or directory)
  RUST_LOG            Override the log filter
"#;

/// Turn PDFs into note pages, extracted text, translations and vocabulary lists.
#[derive(Parser, Debug)]
#[command(
    name = "pdfnotes",
    version,
    about = "Turn PDFs into note pages, extracted text, translations and vocabulary lists",
    long_about = "Rasterise each page of a PDF, crop it at a QR marker and add a blank note \
margin; extract the text with one of five methods; translate it and extract key vocabulary \
with an LLM.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Text extraction method: pypdf2, pdfplumber, pdfminer, ocr, image.
    #[arg(short, long, env = "PDFNOTES_METHOD", default_value = "pypdf2")]
    method: ExtractionMethod,

    /// Translator: auto, deepseek, deepseek-chat, openrouter.
    #[arg(short, long, env = "PDFNOTES_TRANSLATOR", default_value = "auto")]
    translator: TranslatorModel,

    /// Note margin as a percentage of page width (0–100).
    #[arg(long, env = "PDFNOTES_MARGIN", default_value_t = 30)]
    margin: i32,

    /// Directory under which each job gets its own output folder.
    #[arg(short, long, env = "PDFNOTES_OUTPUT_DIR", default_value = "output")]
    output_dir: PathBuf,

    /// Language the text is translated into.
    #[arg(long, env = "PDFNOTES_TARGET_LANGUAGE", default_value = "Simplified Chinese")]
    target_language: String,

    /// Tesseract language code for the ocr and image methods.
    #[arg(long, env = "PDFNOTES_OCR_LANGUAGE", default_value = "eng")]
    ocr_language: String,

    /// Characters per translation request.
    #[arg(long, env = "PDFNOTES_CHUNK_SIZE", default_value_t = 3000)]
    chunk_size: usize,

    /// Retries per LLM request.
    #[arg(long, env = "PDFNOTES_MAX_RETRIES", default_value_t = 2)]
    max_retries: u32,

    /// Also render the translation as `<name>_translation.pdf`.
    #[arg(long, env = "PDFNOTES_TRANSLATED_PDF")]
    translated_pdf: bool,

    /// Also pack the annotated pages into `<name>_notes.pdf`.
    #[arg(long, env = "PDFNOTES_NOTES_PDF")]
    notes_pdf: bool,

    /// Do not call the translation / vocabulary LLM.
    #[arg(long, env = "PDFNOTES_NO_TRANSLATE")]
    no_translate: bool,

    /// Run every extraction method and print the results, then exit.
    #[arg(long)]
    compare_methods: bool,

    /// After processing, export these 1-based pages to `<name>_export.pdf` (e.g. 1,3,5).
    #[arg(long, value_delimiter = ',')]
    export: Vec<usize>,

    /// Print the final job snapshot as JSON.
    #[arg(long, env = "PDFNOTES_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFNOTES_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFNOTES_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.json && !cli.compare_methods;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn JobProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;
    let processor = Processor::new(config.clone());

    // ── Compare-methods mode ─────────────────────────────────────────────
    if cli.compare_methods {
        let results = processor
            .compare_methods(&cli.input)
            .await
            .context("Failed to compare extraction methods")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&results).context("Failed to serialise results")?
            );
        } else {
            for (method, result) in &results {
                match result {
                    Ok(text) => {
                        println!("{} {}", green("●"), bold(method.as_str()));
                        println!("{}\n", text);
                    }
                    Err(failure) => {
                        println!("{} {}", red("●"), bold(method.as_str()));
                        println!("{}\n", red(&failure.to_string()));
                    }
                }
            }
        }
        return Ok(());
    }

    // ── Run the job ──────────────────────────────────────────────────────
    let translator: Arc<dyn Translator> = if cli.no_translate {
        Arc::new(DisabledTranslator)
    } else {
        match LlmTranslator::from_config(&config) {
            Ok(t) => Arc::new(t),
            Err(e) => {
                if !cli.quiet {
                    eprintln!("{} {}", cyan("⚠"), e);
                }
                Arc::new(DisabledTranslator)
            }
        }
    };
    let request = JobRequest::new(cli.method, translator);

    let mut snapshot = processor
        .process(&cli.input, request)
        .await
        .context("Processing failed")?;

    if !cli.export.is_empty() && snapshot.status == JobStatus::Completed {
        let indices: Vec<usize> = cli
            .export
            .iter()
            .filter(|&&p| p >= 1)
            .map(|p| p - 1)
            .collect();
        let path = processor
            .export(&snapshot.id, &indices)
            .await
            .context("Export failed")?;
        if !cli.quiet && !cli.json {
            eprintln!("{} Exported → {}", green("✔"), bold(&path.display().to_string()));
        }
        snapshot = processor.status(&snapshot.id)?;
    }

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot).context("Failed to serialise snapshot")?
        );
    } else if !cli.quiet {
        if !show_progress {
            for line in &snapshot.progress {
                eprintln!("  {}", paint(line));
            }
        }
        print_summary(&snapshot, &processor);
    }

    if snapshot.status == JobStatus::Error {
        anyhow::bail!(
            "job {} failed: {}",
            snapshot.id,
            snapshot.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

fn print_summary(snapshot: &JobSnapshot, processor: &Processor) {
    let mark = |present: bool| if present { green("✓") } else { red("✗") };
    let dir = processor
        .store()
        .get(&snapshot.id)
        .map(|r| r.output_dir().display().to_string())
        .unwrap_or_default();

    eprintln!(
        "{}  {} page images  →  {}",
        if snapshot.status == JobStatus::Completed {
            green("✔")
        } else {
            red("✘")
        },
        snapshot.image_count,
        bold(&dir),
    );
    eprintln!(
        "   text {}  translation {}  vocabulary {}  translated pdf {}  notes pdf {}",
        mark(snapshot.has_text),
        mark(snapshot.has_translation),
        mark(snapshot.has_vocabulary),
        mark(snapshot.has_translated_pdf),
        mark(snapshot.has_notes_pdf),
    );
}

/// Map CLI args to `ProcessingConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ProcessingConfig> {
    let mut builder = ProcessingConfig::builder()
        .margin_percentage(cli.margin)
        .output_root(&cli.output_dir)
        .translator_model(cli.translator)
        .target_language(&cli.target_language)
        .ocr_language(&cli.ocr_language)
        .chunk_size(cli.chunk_size)
        .max_retries(cli.max_retries)
        .render_translated_pdf(cli.translated_pdf)
        .notes_pdf(cli.notes_pdf);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
