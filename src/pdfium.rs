//! Binding to the native pdfium library.
//!
//! Lookup order: `PDFIUM_LIB_PATH` (a file or a directory), the current
//! directory, then the system library search path.

use crate::error::PdfNotesError;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::debug;

/// Environment variable naming the pdfium library or its directory.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind to pdfium, trying each location in turn.
pub fn load_pdfium() -> Result<Pdfium, PdfNotesError> {
    let mut attempts = Vec::new();

    if let Ok(custom) = std::env::var(PDFIUM_LIB_PATH_ENV) {
        let p = Path::new(&custom);
        let lib = if p.is_dir() {
            Pdfium::pdfium_platform_library_name_at_path(p)
        } else {
            p.to_path_buf()
        };
        match Pdfium::bind_to_library(&lib) {
            Ok(bindings) => {
                debug!("pdfium bound from {}", lib.display());
                return Ok(Pdfium::new(bindings));
            }
            Err(e) => attempts.push(format!("{}: {e:?}", lib.display())),
        }
    }

    let local = Pdfium::pdfium_platform_library_name_at_path("./");
    match Pdfium::bind_to_library(&local) {
        Ok(bindings) => return Ok(Pdfium::new(bindings)),
        Err(e) => attempts.push(format!("{}: {e:?}", local.display())),
    }

    match Pdfium::bind_to_system_library() {
        Ok(bindings) => Ok(Pdfium::new(bindings)),
        Err(e) => {
            attempts.push(format!("system: {e:?}"));
            Err(PdfNotesError::PdfiumBindingFailed(attempts.join("; ")))
        }
    }
}

/// True when a pdfium library can be bound in this environment. Tests that
/// need pdfium check it and skip otherwise.
pub fn pdfium_available() -> bool {
    load_pdfium().is_ok()
}

/// Map a pdfium load error onto the document-level error variants.
pub(crate) fn load_error(path: &Path, e: PdfiumError) -> PdfNotesError {
    PdfNotesError::SourceUnreadable {
        path: path.to_path_buf(),
        detail: format!("{e:?}"),
    }
}
