//! Progress-callback trait for job events.
//!
//! Inject an [`Arc<dyn JobProgressCallback>`] via
//! [`crate::config::ProcessingConfigBuilder::progress_callback`] to receive
//! the same events that are written to a job's progress log, as they happen.
//! The CLI uses this to drive its spinner; a web front-end could forward the
//! events to a socket instead of polling the job store.
//!
//! # Example
//!
//! ```rust
//! use pdfnotes::{JobProgressCallback, ProcessingConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct StepCounter {
//!     steps: AtomicUsize,
//! }
//!
//! impl JobProgressCallback for StepCounter {
//!     fn on_step_start(&self, _job_id: &str, step: usize, total_steps: usize, _label: &str) {
//!         self.steps.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("step {step}/{total_steps}");
//!     }
//! }
//!
//! let counter = Arc::new(StepCounter { steps: AtomicUsize::new(0) });
//! let config = ProcessingConfig::builder()
//!     .progress_callback(counter as Arc<dyn JobProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the job worker as a job moves through its steps.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Several jobs may run at once, so events for
/// different job ids can arrive concurrently from different threads.
pub trait JobProgressCallback: Send + Sync {
    /// The job moved from `uploaded` to `processing`.
    fn on_job_start(&self, job_id: &str, total_steps: usize) {
        let _ = (job_id, total_steps);
    }

    /// A step (1-indexed) is about to run.
    fn on_step_start(&self, job_id: &str, step: usize, total_steps: usize, label: &str) {
        let _ = (job_id, step, total_steps, label);
    }

    /// A line was appended to the job's progress log.
    fn on_log(&self, job_id: &str, line: &str) {
        let _ = (job_id, line);
    }

    /// The job reached `completed`.
    fn on_job_complete(&self, job_id: &str) {
        let _ = job_id;
    }

    /// The job reached `error`.
    fn on_job_error(&self, job_id: &str, error: &str) {
        let _ = (job_id, error);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl JobProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ProcessingConfig`].
pub type ProgressCallback = Arc<dyn JobProgressCallback>;
