//! Page rasterisation: render every page of a PDF to a `DynamicImage` via pdfium.
//!
//! Rendering is blocking and CPU-bound. Async callers move it onto the
//! blocking pool with `tokio::task::spawn_blocking`, as the job worker does.

use crate::document::Document;
use crate::error::PdfNotesError;
use crate::pdfium::{load_error, load_pdfium};
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, info};

/// Points per inch in PDF user space.
const POINTS_PER_INCH: f32 = 72.0;

/// Renders the pages of a document to raster images.
pub trait PageRenderer: Send + Sync {
    /// One image per page, in page order, at `dpi`.
    ///
    /// A document with zero pages is `SourceUnreadable`.
    fn render(&self, document: &Document, dpi: u32) -> Result<Vec<DynamicImage>, PdfNotesError>;
}

/// [`PageRenderer`] backed by the pdfium library.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfiumRenderer;

impl PageRenderer for PdfiumRenderer {
    fn render(&self, document: &Document, dpi: u32) -> Result<Vec<DynamicImage>, PdfNotesError> {
        let pdfium = load_pdfium()?;
        let pdf = pdfium
            .load_pdf_from_file(document.path(), None)
            .map_err(|e| load_error(document.path(), e))?;

        let pages = pdf.pages();
        let total_pages = pages.len() as usize;
        if total_pages == 0 {
            return Err(PdfNotesError::SourceUnreadable {
                path: document.path().to_path_buf(),
                detail: "document has no pages".into(),
            });
        }
        info!("PDF loaded: {} pages, rendering at {} DPI", total_pages, dpi);

        let render_config =
            PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / POINTS_PER_INCH);

        let mut images = Vec::with_capacity(total_pages);
        for (idx, page) in pages.iter().enumerate() {
            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                PdfNotesError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{e:?}"),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );
            images.push(image);
        }

        Ok(images)
    }
}
