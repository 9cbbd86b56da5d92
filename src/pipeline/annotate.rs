//! Annotated note pages: rasterise, crop at the QR marker, add the margin
//! and save each page as `page_{n}.png`.

use crate::config::PageSize;
use crate::document::{page_image_name, Document};
use crate::error::PdfNotesError;
use crate::pipeline::assemble::images_to_pdf;
use crate::pipeline::margin::add_margin;
use crate::pipeline::qr::QrCropper;
use crate::pipeline::render::PageRenderer;
use image::ImageFormat;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Produce one annotated PNG per page in `out_dir`, in page order.
pub fn annotate(
    document: &Document,
    renderer: &dyn PageRenderer,
    cropper: &QrCropper,
    dpi: u32,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, PdfNotesError> {
    std::fs::create_dir_all(out_dir).map_err(|source| PdfNotesError::OutputWriteFailed {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let pages = renderer.render(document, dpi)?;
    let mut paths = Vec::with_capacity(pages.len());

    for (idx, page) in pages.into_iter().enumerate() {
        let cropped = cropper.crop_at_marker(page);
        let annotated = add_margin(&cropped, document.margin_percentage());
        let path = out_dir.join(page_image_name(idx + 1));
        annotated
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| PdfNotesError::Image {
                path: path.clone(),
                detail: e.to_string(),
            })?;
        debug!(
            "Annotated page {} → {}x{} px",
            idx + 1,
            annotated.width(),
            annotated.height()
        );
        paths.push(path);
    }

    info!("{} annotated pages written to {}", paths.len(), out_dir.display());
    Ok(paths)
}

/// Collect annotated pages into `<name>_notes.pdf` in `out_dir`.
pub fn notes_pdf(
    document: &Document,
    pages: &[PathBuf],
    out_dir: &Path,
    page_size: Option<PageSize>,
) -> Result<PathBuf, PdfNotesError> {
    images_to_pdf(pages, &out_dir.join(document.notes_pdf_file_name()), page_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView, Rgb, RgbImage};

    struct TwoPages;

    impl PageRenderer for TwoPages {
        fn render(&self, _d: &Document, dpi: u32) -> Result<Vec<DynamicImage>, PdfNotesError> {
            let w = dpi / 2;
            Ok(vec![
                DynamicImage::ImageRgb8(RgbImage::from_pixel(w, 50, Rgb([0, 0, 0]))),
                DynamicImage::ImageRgb8(RgbImage::from_pixel(w, 60, Rgb([90, 90, 90]))),
            ])
        }
    }

    fn doc_in(dir: &Path) -> Document {
        let path = dir.join("unit.pdf");
        std::fs::write(&path, b"%PDF-1.4\n%%EOF\n").unwrap();
        Document::open(&path, 30).unwrap()
    }

    #[test]
    fn writes_numbered_pngs_with_margin() {
        let dir = tempfile::tempdir().unwrap();
        let doc = doc_in(dir.path());
        let out = dir.path().join("pages");
        let paths = annotate(&doc, &TwoPages, &QrCropper::default(), 200, &out).unwrap();

        assert_eq!(paths, vec![out.join("page_1.png"), out.join("page_2.png")]);
        let first = image::open(&paths[0]).unwrap();
        assert_eq!(first.dimensions(), (130, 50));
        assert_eq!(first.to_rgb8().get_pixel(129, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn notes_pdf_has_every_page() {
        let dir = tempfile::tempdir().unwrap();
        let doc = doc_in(dir.path());
        let pages = annotate(&doc, &TwoPages, &QrCropper::default(), 200, dir.path()).unwrap();
        let pdf = notes_pdf(&doc, &pages, dir.path(), None).unwrap();
        assert_eq!(pdf, dir.path().join("unit_notes.pdf"));
        assert_eq!(lopdf::Document::load(&pdf).unwrap().get_pages().len(), 2);
    }
}
