//! Job records and the shared job store.
//!
//! A job moves `uploaded → processing → completed`, or `processing → error`.
//! Nothing leaves `completed` or `error`. [`JobRecord`] enforces those rules
//! and the monotonic step counter; [`JobStore`] shares records between the
//! worker that owns a job and any number of status pollers.
//!
//! ## Concurrency contract
//!
//! Each record has exactly one writer, the worker task running that job.
//! Readers get cloned snapshots. Every access is a short critical section
//! under one `RwLock`; no lock is held across an `.await`.

use crate::document::document_name;
use crate::error::PdfNotesError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Opaque job identity (a v4 UUID string).
pub type JobId = String;

/// Final line appended to the progress log of a successful job.
pub const COMPLETION_MARKER: &str = "✓✓✓ All processing steps completed! ✓✓✓";

/// Generate a fresh job identity.
pub fn new_job_id() -> JobId {
    uuid::Uuid::new_v4().to_string()
}

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Uploaded,
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Uploaded => "uploaded",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
        }
    }

    /// `completed` and `error` are final.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Files a job has produced so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobArtifacts {
    pub page_images: Vec<PathBuf>,
    pub text: Option<PathBuf>,
    pub translation: Option<PathBuf>,
    pub vocabulary: Option<PathBuf>,
    pub translated_pdf: Option<PathBuf>,
    pub notes_pdf: Option<PathBuf>,
    pub export: Option<PathBuf>,
}

/// Mutable per-job state driving the worker and exposed to polling.
#[derive(Debug, Clone)]
pub struct JobRecord {
    id: JobId,
    source: PathBuf,
    name: String,
    output_dir: PathBuf,
    status: JobStatus,
    progress: Vec<String>,
    current_step: usize,
    total_steps: usize,
    error: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    /// Written by the worker as each step produces files.
    pub artifacts: JobArtifacts,
}

impl JobRecord {
    /// A freshly uploaded job whose outputs go to
    /// `<output_root>/<name>_<first 8 chars of id>/`.
    pub fn new(id: impl Into<JobId>, source: impl AsRef<Path>, output_root: &Path) -> Self {
        let id = id.into();
        let source = source.as_ref().to_path_buf();
        let name = document_name(&source);
        let short: String = id.chars().take(8).collect();
        let now = Utc::now();
        Self {
            output_dir: output_root.join(format!("{name}_{short}")),
            id,
            source,
            name,
            status: JobStatus::Uploaded,
            progress: Vec::new(),
            current_step: 0,
            total_steps: 0,
            error: None,
            created_at: now,
            updated_at: now,
            artifacts: JobArtifacts::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Artefact base name (the source file stem).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn progress(&self) -> &[String] {
        &self.progress
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn transition(&self, to: JobStatus) -> PdfNotesError {
        PdfNotesError::InvalidTransition {
            id: self.id.clone(),
            from: self.status.as_str(),
            to: to.as_str(),
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// `uploaded → processing` with the number of steps this run will take.
    pub fn begin(&mut self, total_steps: usize) -> Result<(), PdfNotesError> {
        if self.status != JobStatus::Uploaded {
            return Err(self.transition(JobStatus::Processing));
        }
        self.status = JobStatus::Processing;
        self.total_steps = total_steps;
        self.touch();
        Ok(())
    }

    /// Advance to `step` (1-indexed) and log its label.
    ///
    /// Steps only move forward and never past `total_steps`.
    pub fn enter_step(&mut self, step: usize, label: impl Into<String>) -> Result<(), PdfNotesError> {
        if self.status != JobStatus::Processing {
            return Err(self.transition(JobStatus::Processing));
        }
        if step <= self.current_step || step > self.total_steps {
            return Err(PdfNotesError::Internal(format!(
                "job {}: step {} is out of order (current {}, total {})",
                self.id, step, self.current_step, self.total_steps
            )));
        }
        self.current_step = step;
        self.log(label);
        Ok(())
    }

    /// Append a line to the progress log.
    pub fn log(&mut self, line: impl Into<String>) {
        self.progress.push(line.into());
        self.touch();
    }

    /// `processing → completed`; appends [`COMPLETION_MARKER`].
    pub fn complete(&mut self) -> Result<(), PdfNotesError> {
        if self.status != JobStatus::Processing {
            return Err(self.transition(JobStatus::Completed));
        }
        self.status = JobStatus::Completed;
        self.log(COMPLETION_MARKER);
        Ok(())
    }

    /// `processing → error`; records the error and logs it.
    ///
    /// `current_step` stays at the step that was running.
    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), PdfNotesError> {
        if self.status != JobStatus::Processing {
            return Err(self.transition(JobStatus::Error));
        }
        let error = error.into();
        self.status = JobStatus::Error;
        self.log(format!("❌ Processing failed: {error}"));
        self.error = Some(error);
        Ok(())
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            id: self.id.clone(),
            status: self.status,
            progress: self.progress.clone(),
            current_step: self.current_step,
            total_steps: self.total_steps,
            has_text: self.artifacts.text.is_some(),
            has_translation: self.artifacts.translation.is_some(),
            has_vocabulary: self.artifacts.vocabulary.is_some(),
            has_translated_pdf: self.artifacts.translated_pdf.is_some(),
            has_notes_pdf: self.artifacts.notes_pdf.is_some(),
            has_export: self.artifacts.export.is_some(),
            image_count: self.artifacts.page_images.len(),
            error: self.error.clone(),
        }
    }
}

/// Read-only view of a job returned to status pollers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub id: JobId,
    pub status: JobStatus,
    pub progress: Vec<String>,
    pub current_step: usize,
    pub total_steps: usize,
    pub has_text: bool,
    pub has_translation: bool,
    pub has_vocabulary: bool,
    pub has_translated_pdf: bool,
    pub has_notes_pdf: bool,
    pub has_export: bool,
    pub image_count: usize,
    pub error: Option<String>,
}

/// Process-wide table of jobs, cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct JobStore {
    inner: Arc<RwLock<HashMap<JobId, JobRecord>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record, returning its id.
    pub fn insert(&self, record: JobRecord) -> JobId {
        let id = record.id.clone();
        let mut jobs = self.inner.write().unwrap_or_else(|e| e.into_inner());
        jobs.insert(id.clone(), record);
        id
    }

    /// Mutate one record under the write lock.
    pub fn update<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut JobRecord) -> R,
    ) -> Result<R, PdfNotesError> {
        let mut jobs = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let record = jobs
            .get_mut(id)
            .ok_or_else(|| PdfNotesError::JobNotFound(id.to_string()))?;
        Ok(f(record))
    }

    /// Clone of the full record.
    pub fn get(&self, id: &str) -> Result<JobRecord, PdfNotesError> {
        let jobs = self.inner.read().unwrap_or_else(|e| e.into_inner());
        jobs.get(id)
            .cloned()
            .ok_or_else(|| PdfNotesError::JobNotFound(id.to_string()))
    }

    /// The status-query surface.
    pub fn snapshot(&self, id: &str) -> Result<JobSnapshot, PdfNotesError> {
        let jobs = self.inner.read().unwrap_or_else(|e| e.into_inner());
        jobs.get(id)
            .map(JobRecord::snapshot)
            .ok_or_else(|| PdfNotesError::JobNotFound(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
