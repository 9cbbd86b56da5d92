//! QR marker location and cropping.
//!
//! Source documents carry a printed QR code separating the content from an
//! answer-key region below it. A page with a marker is cut at the marker's
//! top edge; everything from that row down is discarded.

use image::{DynamicImage, GrayImage};
use std::sync::Arc;
use tracing::debug;

/// Corner points of one detected marker.
pub type Corners = Vec<(i32, i32)>;

/// Locates QR markers in a grayscale page.
pub trait QrDetector: Send + Sync {
    /// Corner points of every marker found, first marker first.
    /// `None` or an empty list means no marker.
    fn detect(&self, gray: &GrayImage) -> Option<Vec<Corners>>;
}

/// [`QrDetector`] using `rqrr` grid localisation. Decoding is not required.
#[derive(Debug, Default, Clone, Copy)]
pub struct RqrrDetector;

impl QrDetector for RqrrDetector {
    fn detect(&self, gray: &GrayImage) -> Option<Vec<Corners>> {
        let (w, h) = gray.dimensions();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            w as usize,
            h as usize,
            |x, y| gray.get_pixel(x as u32, y as u32).0[0],
        );
        let grids = prepared.detect_grids();
        if grids.is_empty() {
            return None;
        }
        Some(
            grids
                .iter()
                .map(|g| g.bounds.iter().map(|p| (p.x, p.y)).collect())
                .collect(),
        )
    }
}

/// Crops pages at the first detected QR marker.
#[derive(Clone)]
pub struct QrCropper {
    detector: Arc<dyn QrDetector>,
}

impl Default for QrCropper {
    fn default() -> Self {
        Self::new(Arc::new(RqrrDetector))
    }
}

impl std::fmt::Debug for QrCropper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QrCropper").finish_non_exhaustive()
    }
}

impl QrCropper {
    pub fn new(detector: Arc<dyn QrDetector>) -> Self {
        Self { detector }
    }

    /// True when at least one marker with corner points is present.
    pub fn has_marker(&self, image: &DynamicImage) -> bool {
        self.cut_row(image).is_some()
    }

    /// The page truncated to `[0, y)` rows, or the input unchanged.
    pub fn crop_at_marker(&self, image: DynamicImage) -> DynamicImage {
        match self.cut_row(&image) {
            Some(y) => {
                debug!("QR marker found, cropping at y={}", y);
                image.crop_imm(0, 0, image.width(), y)
            }
            None => image,
        }
    }

    /// Row of the first marker's first corner, clamped to the image height.
    /// Row 0 would leave an empty page and counts as no usable marker.
    fn cut_row(&self, image: &DynamicImage) -> Option<u32> {
        let gray = image.to_luma8();
        let markers = self.detector.detect(&gray)?;
        let &(_, y) = markers.first()?.first()?;
        let y = y.clamp(0, image.height() as i32) as u32;
        if y == 0 {
            debug!("QR marker at top edge ignored");
            return None;
        }
        Some(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    struct FixedDetector(Option<Vec<Corners>>);

    impl QrDetector for FixedDetector {
        fn detect(&self, _gray: &GrayImage) -> Option<Vec<Corners>> {
            self.0.clone()
        }
    }

    fn page(w: u32, h: u32) -> DynamicImage {
        let mut img = RgbImage::new(w, h);
        for (x, y, px) in img.enumerate_pixels_mut() {
            *px = Rgb([(x % 256) as u8, (y % 256) as u8, 7]);
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn no_marker_is_identity() {
        let cropper = QrCropper::new(Arc::new(FixedDetector(None)));
        let input = page(40, 60);
        assert!(!cropper.has_marker(&input));
        let out = cropper.crop_at_marker(input.clone());
        assert_eq!(out, input);
    }

    #[test]
    fn blank_page_has_no_marker_with_rqrr() {
        let cropper = QrCropper::default();
        let input = DynamicImage::ImageRgb8(RgbImage::from_pixel(120, 160, Rgb([255, 255, 255])));
        let out = cropper.crop_at_marker(input.clone());
        assert_eq!(out.as_bytes(), input.as_bytes());
    }

    /// White page with a real QR code whose top-left module sits at
    /// `(left, top)`, drawn at `module` px per module.
    fn page_with_qr(w: u32, h: u32, left: u32, top: u32, module: u32) -> DynamicImage {
        let code = qrcode::QrCode::new(b"answer key").unwrap();
        let modules = code.width() as u32;
        let colors = code.to_colors();
        let mut img = RgbImage::from_pixel(w, h, Rgb([255, 255, 255]));
        for my in 0..modules {
            for mx in 0..modules {
                if colors[(my * modules + mx) as usize] != qrcode::Color::Dark {
                    continue;
                }
                for dy in 0..module {
                    for dx in 0..module {
                        img.put_pixel(left + mx * module + dx, top + my * module + dy, Rgb([0, 0, 0]));
                    }
                }
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn rqrr_cuts_at_top_of_printed_code() {
        let cropper = QrCropper::default();
        let input = page_with_qr(320, 480, 60, 240, 6);
        assert!(cropper.has_marker(&input));

        let out = cropper.crop_at_marker(input.clone());
        assert_eq!(out.width(), 320);
        assert!(
            (238..=242).contains(&out.height()),
            "cut at row {}, expected about 240",
            out.height()
        );
        assert_eq!(out.get_pixel(100, 100), input.get_pixel(100, 100));
    }

    #[test]
    fn crops_at_first_marker_top() {
        let markers = vec![
            vec![(5, 30), (25, 30), (25, 50), (5, 50)],
            vec![(5, 10), (25, 10), (25, 20), (5, 20)],
        ];
        let cropper = QrCropper::new(Arc::new(FixedDetector(Some(markers))));
        let input = page(40, 60);
        assert!(cropper.has_marker(&input));
        let out = cropper.crop_at_marker(input.clone());
        assert_eq!(out.dimensions(), (40, 30));
        assert_eq!(out.get_pixel(3, 29), input.get_pixel(3, 29));
    }

    #[test]
    fn marker_at_top_edge_leaves_page_unchanged() {
        let cropper = QrCropper::new(Arc::new(FixedDetector(Some(vec![vec![(0, 0)]]))));
        let input = page(10, 10);
        assert!(!cropper.has_marker(&input));
        assert_eq!(cropper.crop_at_marker(input.clone()), input);
    }

    #[test]
    fn cut_row_clamped_to_height() {
        let cropper =
            QrCropper::new(Arc::new(FixedDetector(Some(vec![vec![(0, 500)]]))));
        let out = cropper.crop_at_marker(page(10, 20));
        assert_eq!(out.height(), 20);
    }
}
