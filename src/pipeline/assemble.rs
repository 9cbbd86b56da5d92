//! Image → PDF reassembly: one page per image, built with `lopdf`.
//!
//! Used to re-emit the annotated pages, to export a user-selected subset and
//! as the last step of the translated-PDF renderers.

use crate::config::PageSize;
use crate::error::PdfNotesError;
use image::{DynamicImage, Rgb, RgbImage};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Build a PDF at `output` from `images`, one page per readable image.
///
/// Without `page_size` each page is sized to its image's pixel dimensions
/// (one pixel per point). With it, every page has that size and the image
/// is drawn unscaled at the origin.
///
/// Unreadable images are skipped with a warning. Fails when the list is
/// empty, when a file is missing (naming the first one), when no page could
/// be written, or when the output cannot be written; a partial output file
/// is removed before returning the error.
pub fn images_to_pdf<P: AsRef<Path>>(
    images: &[P],
    output: &Path,
    page_size: Option<PageSize>,
) -> Result<PathBuf, PdfNotesError> {
    if images.is_empty() {
        return Err(PdfNotesError::NoImagesProvided);
    }
    if let Some(missing) = images.iter().map(AsRef::as_ref).find(|p| !p.exists()) {
        return Err(PdfNotesError::MissingImage {
            path: missing.to_path_buf(),
        });
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| PdfNotesError::OutputWriteFailed {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut builder = PdfBuilder::new();
    for path in images.iter().map(AsRef::as_ref) {
        match image::open(path) {
            Ok(img) => builder.add_page(&flatten_to_rgb(&img), page_size),
            Err(e) => warn!("Skipping image {}: {}", path.display(), e),
        }
    }

    if builder.page_count() == 0 {
        remove_partial(output);
        return Err(PdfNotesError::NoPagesWritten {
            path: output.to_path_buf(),
        });
    }

    let pages = builder.page_count();
    if let Err(e) = builder.save(output) {
        remove_partial(output);
        return Err(e);
    }
    info!("Wrote {} pages to {}", pages, output.display());
    Ok(output.to_path_buf())
}

/// Composite any alpha channel onto white and return 8-bit RGB.
pub fn flatten_to_rgb(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |c: u8| ((c as u16 * a as u16 + 255 * (255 - a as u16)) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

fn remove_partial(output: &Path) {
    if output.exists() {
        if let Err(e) = std::fs::remove_file(output) {
            warn!("Could not remove partial output {}: {}", output.display(), e);
        }
    }
}

/// Incrementally builds a document of full-page images.
struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
}

impl PdfBuilder {
    fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    fn page_count(&self) -> usize {
        self.kids.len()
    }

    fn add_page(&mut self, image: &RgbImage, page_size: Option<PageSize>) {
        let (w, h) = (image.width(), image.height());
        let (page_w, page_h) = match page_size {
            Some(size) => (size.width, size.height),
            None => (w as f32, h as f32),
        };

        let mut image_stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => w as i64,
                "Height" => h as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8i64,
            },
            image.as_raw().clone(),
        );
        if let Err(e) = image_stream.compress() {
            warn!("Page {} image stored uncompressed: {}", self.kids.len() + 1, e);
        }
        let image_id = self.doc.add_object(Object::Stream(image_stream));

        let content = format!("q {w} 0 0 {h} 0 0 cm /Im0 Do Q");
        let content_id = self
            .doc
            .add_object(Stream::new(lopdf::Dictionary::new(), content.into_bytes()));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(page_w), Object::Real(page_h)],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    "Im0" => image_id,
                },
            },
        });
        debug!("Added {}x{} image as page {}", w, h, self.kids.len() + 1);
        self.kids.push(page_id.into());
    }

    fn save(mut self, output: &Path) -> Result<(), PdfNotesError> {
        let count = self.kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let write_err = |source| PdfNotesError::OutputWriteFailed {
            path: output.to_path_buf(),
            source,
        };
        let file = File::create(output).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        self.doc.save_to(&mut writer).map_err(write_err)?;
        Ok(())
    }
}
