//! Note-margin compositing: append a blank white strip to the right of a page.

use image::{imageops, DynamicImage, Rgb, RgbImage};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Width after appending a margin of `percentage` percent.
///
/// Integer arithmetic: `W + W * p / 100`, which equals `floor(W * (1 + p/100))`.
/// `percentage` is clamped to 0–100.
pub fn margin_width(width: u32, percentage: i32) -> u32 {
    let p = percentage.clamp(0, 100) as u64;
    let w = width as u64;
    (w + w * p / 100) as u32
}

/// Pad `image` on the right with white canvas.
///
/// The original pixels occupy `[0, W) × [0, H)` unchanged; the result is RGB8.
pub fn add_margin(image: &DynamicImage, percentage: i32) -> DynamicImage {
    let (w, h) = (image.width(), image.height());
    let mut canvas = RgbImage::from_pixel(margin_width(w, percentage), h, WHITE);
    imageops::replace(&mut canvas, &image.to_rgb8(), 0, 0);
    DynamicImage::ImageRgb8(canvas)
}
