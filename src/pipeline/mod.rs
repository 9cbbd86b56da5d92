//! Pipeline stages for turning a PDF into note pages and text.
//!
//! Each submodule implements one transformation and is usable on its own;
//! [`crate::orchestrator`] strings them together into a job.
//!
//! ## Data Flow
//!
//! ```text
//!            ┌─▶ qr ──▶ margin ──▶ annotate ──▶ page_{n}.png ──▶ assemble (PDF)
//! render ────┤
//! (pdfium)   └─▶ ocr ─┐
//!                     ├─▶ extract ──▶ normalize ──▶ <name>.txt
//! lopdf / pdfium / ───┘
//! pdf-extract
//!
//! translation text ──▶ typeset ──▶ assemble ──▶ <name>_translation.pdf
//! ```
//!
//! 1. [`render`]    rasterise every page; blocking, so async callers use
//!    `spawn_blocking`
//! 2. [`qr`]        find a QR marker and cut the page at it
//! 3. [`margin`]    append the blank note margin on the right
//! 4. [`annotate`]  render + crop + margin, saved as numbered PNGs
//! 5. [`extract`]   the five text-extraction strategies and their fallback table
//! 6. [`normalize`] deterministic spacing clean-up of extracted text
//! 7. [`ocr`]       the OCR engine interface used by the OCR strategies
//! 8. [`assemble`]  images back into a PDF, one page per image
//! 9. [`typeset`]   text drawn onto page images for the translated PDF

pub mod annotate;
pub mod assemble;
pub mod extract;
pub mod margin;
pub mod normalize;
pub mod ocr;
pub mod qr;
pub mod render;
pub mod typeset;
