//! OCR engine interface and the tesseract command-line backend.

use crate::error::PdfNotesError;
use image::{DynamicImage, ImageFormat};
use std::io::Write;
use std::process::Command;
use tracing::debug;

/// Turns a page image into text.
pub trait OcrEngine: Send + Sync {
    /// Recognise the text in `image` using `language` and page
    /// segmentation mode `psm`.
    fn image_to_text(
        &self,
        image: &DynamicImage,
        language: &str,
        psm: u8,
    ) -> Result<String, PdfNotesError>;
}

/// [`OcrEngine`] that shells out to the `tesseract` binary.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    program: String,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self {
            program: "tesseract".to_string(),
        }
    }
}

impl TesseractCli {
    /// Use a specific tesseract executable instead of the one on `PATH`.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// True when the executable can be launched.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

impl OcrEngine for TesseractCli {
    fn image_to_text(
        &self,
        image: &DynamicImage,
        language: &str,
        psm: u8,
    ) -> Result<String, PdfNotesError> {
        let mut tmp = tempfile::Builder::new()
            .suffix(".png")
            .tempfile()
            .map_err(|e| PdfNotesError::OcrFailed(format!("temp file: {e}")))?;
        image
            .write_to(&mut tmp, ImageFormat::Png)
            .map_err(|e| PdfNotesError::OcrFailed(format!("encode page: {e}")))?;
        tmp.flush()
            .map_err(|e| PdfNotesError::OcrFailed(format!("flush page: {e}")))?;

        let output = Command::new(&self.program)
            .arg(tmp.path())
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .arg("--psm")
            .arg(psm.to_string())
            .output()
            .map_err(|e| {
                PdfNotesError::OcrFailed(format!("failed to run {} (is it installed?): {e}", self.program))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PdfNotesError::OcrFailed(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("OCR produced {} chars (psm {})", text.len(), psm);
        Ok(text)
    }
}
