//! The source document handed to every pipeline stage.

use crate::error::PdfNotesError;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// An immutable reference to a source PDF plus its note-margin width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: PathBuf,
    margin_percentage: i32,
}

impl Document {
    /// Open a document, checking that the file exists and looks like a PDF.
    ///
    /// The margin is clamped to 0–100.
    pub fn open(path: impl AsRef<Path>, margin_percentage: i32) -> Result<Self, PdfNotesError> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(PdfNotesError::SourceNotFound { path });
        }

        let mut magic = [0u8; 5];
        let readable = File::open(&path).and_then(|mut f| f.read_exact(&mut magic));
        match readable {
            Ok(()) if &magic == b"%PDF-" => {}
            Ok(()) => {
                return Err(PdfNotesError::SourceUnreadable {
                    path,
                    detail: "missing %PDF header".into(),
                })
            }
            Err(e) => {
                return Err(PdfNotesError::SourceUnreadable {
                    path,
                    detail: e.to_string(),
                })
            }
        }

        Ok(Self {
            path,
            margin_percentage: margin_percentage.clamp(0, 100),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn margin_percentage(&self) -> i32 {
        self.margin_percentage
    }

    /// File stem used to name every artefact of this document.
    pub fn name(&self) -> String {
        document_name(&self.path)
    }

    pub fn text_file_name(&self) -> String {
        format!("{}.txt", self.name())
    }

    pub fn translation_file_name(&self) -> String {
        format!("{}_translation.txt", self.name())
    }

    pub fn vocabulary_file_name(&self) -> String {
        format!("{}_vocabulary.txt", self.name())
    }

    pub fn translated_pdf_file_name(&self) -> String {
        format!("{}_translation.pdf", self.name())
    }

    pub fn export_file_name(&self) -> String {
        export_file_name(&self.name())
    }

    pub fn notes_pdf_file_name(&self) -> String {
        format!("{}_notes.pdf", self.name())
    }
}

/// Artefact base name for a source path: its file stem, or "document".
pub fn document_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string())
}

/// File name of the page export for a document base name.
pub fn export_file_name(name: &str) -> String {
    format!("{name}_export.pdf")
}

/// File name of the annotated image for a 1-indexed page.
pub fn page_image_name(page_num: usize) -> String {
    format!("page_{page_num}.png")
}
