//! Translated-PDF rendering: text → page images → PDF, with an ordered
//! ladder of renderers tried until one succeeds.
//!
//! ```text
//! LayoutRenderer   "Original" + "Translation" panels, CJK-capable font
//!       │ on error
//! PlainRenderer    translation only, any system TrueType/OpenType font
//!       │ on error
//! PagesRenderer    the annotated page images, unchanged
//! ```

use crate::error::PdfNotesError;
use crate::pipeline::assemble::images_to_pdf;
use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Fonts with CJK coverage, tried in order.
pub const CJK_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/droid/DroidSansFallbackFull.ttf",
    "C:\\Windows\\Fonts\\simhei.ttf",
    "/System/Library/Fonts/PingFang.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
];

/// Directories searched by [`PlainRenderer`].
pub const SYSTEM_FONT_DIRS: &[&str] = &[
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/Library/Fonts",
    "/System/Library/Fonts",
    "C:\\Windows\\Fonts",
];

const MAX_FONT_SCAN_DEPTH: usize = 4;

/// Everything a renderer may draw from.
#[derive(Debug, Clone, Copy)]
pub struct TranslationDocument<'a> {
    pub original: &'a str,
    pub translation: &'a str,
    /// Annotated page images of the source document.
    pub page_images: &'a [PathBuf],
}

/// One rung of the translated-PDF ladder.
pub trait TranslationRenderer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Write a PDF to `output` and return its path.
    fn render(&self, doc: &TranslationDocument<'_>, output: &Path) -> Result<PathBuf, PdfNotesError>;
}

/// Try each renderer in order; return the first success and the rung's name.
pub fn render_with_fallback(
    ladder: &[Box<dyn TranslationRenderer>],
    doc: &TranslationDocument<'_>,
    output: &Path,
) -> Result<(PathBuf, &'static str), PdfNotesError> {
    let mut attempts = Vec::with_capacity(ladder.len());
    for renderer in ladder {
        match renderer.render(doc, output) {
            Ok(path) => {
                info!("Translated PDF rendered with {}", renderer.name());
                return Ok((path, renderer.name()));
            }
            Err(e) => {
                warn!("{} renderer failed: {}", renderer.name(), e);
                attempts.push(format!("{}: {}", renderer.name(), e));
            }
        }
    }
    Err(PdfNotesError::RenderLadderExhausted { attempts })
}

/// Layout → plain text → original pages.
pub fn default_ladder() -> Vec<Box<dyn TranslationRenderer>> {
    vec![
        Box::new(LayoutRenderer::default()),
        Box::new(PlainRenderer::default()),
        Box::new(PagesRenderer),
    ]
}

// ── Text layout ──────────────────────────────────────────────────────────────

/// Geometry of a rendered text page, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font_size: f32,
    pub line_spacing: f32,
    pub margin: u32,
    pub page_width: u32,
    pub page_height: u32,
    pub title_size: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            line_spacing: 1.5,
            margin: 50,
            page_width: 1600,
            page_height: 2263,
            title_size: 24.0,
        }
    }
}

/// Greedy word wrap. Tokens wider than `max_width` are broken between
/// characters, which is also how unspaced CJK text wraps.
/// Each paragraph is followed by an empty line.
pub fn wrap_text(text: &str, max_width: u32, measure: impl Fn(&str) -> u32) -> Vec<String> {
    let mut lines = Vec::new();
    for para in text.lines().filter(|p| !p.trim().is_empty()) {
        let mut current = String::new();
        for word in para.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if measure(&candidate) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            for ch in word.chars() {
                current.push(ch);
                if measure(&current) > max_width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                }
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines.push(String::new());
    }
    lines
}

/// Render `text` onto as many pages as it needs.
fn render_text_pages(
    font: &FontVec,
    title: Option<&str>,
    text: &str,
    background: Rgb<u8>,
    style: &TextStyle,
) -> Vec<RgbImage> {
    let ink = Rgb([0, 0, 0]);
    let body = PxScale::from(style.font_size);
    let heading = PxScale::from(style.title_size);
    let line_height = (style.font_size * style.line_spacing).ceil() as u32;
    let usable = style.page_width.saturating_sub(style.margin * 2);

    let lines = wrap_text(text, usable, |s| text_size(body, font, s).0);
    let title_block = title.map_or(0, |_| style.title_size as u32 + 30);
    let per_page = ((style.page_height.saturating_sub(style.margin * 2 + title_block)) / line_height.max(1))
        .max(1) as usize;

    let chunks: Vec<&[String]> = if lines.is_empty() {
        vec![&lines[..]]
    } else {
        lines.chunks(per_page).collect()
    };

    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let mut page = RgbImage::from_pixel(style.page_width, style.page_height, background);
            let mut y = style.margin as i32;
            if let (0, Some(t)) = (i, title) {
                draw_text_mut(&mut page, ink, style.margin as i32, y, heading, font, t);
                y += title_block as i32;
            }
            for line in chunk {
                if !line.is_empty() {
                    draw_text_mut(&mut page, ink, style.margin as i32, y, body, font, line);
                }
                y += line_height as i32;
            }
            page
        })
        .collect()
}

fn load_font(path: &Path) -> Result<FontVec, PdfNotesError> {
    let data = std::fs::read(path)
        .map_err(|e| PdfNotesError::FontUnavailable(format!("{}: {e}", path.display())))?;
    FontVec::try_from_vec_and_index(data, 0)
        .map_err(|e| PdfNotesError::FontUnavailable(format!("{}: {e}", path.display())))
}

/// Save rendered pages as PNGs in a scratch directory and assemble them.
fn pages_to_pdf(pages: &[RgbImage], output: &Path) -> Result<PathBuf, PdfNotesError> {
    let scratch = tempfile::tempdir().map_err(|source| PdfNotesError::OutputWriteFailed {
        path: std::env::temp_dir(),
        source,
    })?;
    let mut paths = Vec::with_capacity(pages.len());
    for (i, page) in pages.iter().enumerate() {
        let path = scratch.path().join(format!("typeset_{}.png", i + 1));
        page.save(&path).map_err(|e| PdfNotesError::Image {
            path: path.clone(),
            detail: e.to_string(),
        })?;
        paths.push(path);
    }
    images_to_pdf(&paths, output, None)
}

// ── Rungs ────────────────────────────────────────────────────────────────────

/// Titled "Original" and "Translation" panels in a CJK-capable font.
#[derive(Debug, Clone)]
pub struct LayoutRenderer {
    pub font_candidates: Vec<PathBuf>,
    pub style: TextStyle,
}

impl Default for LayoutRenderer {
    fn default() -> Self {
        Self {
            font_candidates: CJK_FONT_CANDIDATES.iter().map(PathBuf::from).collect(),
            style: TextStyle::default(),
        }
    }
}

impl TranslationRenderer for LayoutRenderer {
    fn name(&self) -> &'static str {
        "layout"
    }

    fn render(&self, doc: &TranslationDocument<'_>, output: &Path) -> Result<PathBuf, PdfNotesError> {
        let path = self
            .font_candidates
            .iter()
            .find(|p| p.is_file())
            .ok_or_else(|| PdfNotesError::FontUnavailable("no CJK font installed".into()))?;
        let font = load_font(path)?;
        debug!("layout renderer using {}", path.display());

        let mut pages = render_text_pages(
            &font,
            Some("Original"),
            doc.original,
            Rgb([245, 245, 245]),
            &self.style,
        );
        pages.extend(render_text_pages(
            &font,
            Some("Translation"),
            doc.translation,
            Rgb([240, 248, 255]),
            &self.style,
        ));
        pages_to_pdf(&pages, output)
    }
}

/// Translation only, in the first usable font under the system font directories.
#[derive(Debug, Clone)]
pub struct PlainRenderer {
    pub font_dirs: Vec<PathBuf>,
    pub style: TextStyle,
}

impl Default for PlainRenderer {
    fn default() -> Self {
        Self {
            font_dirs: SYSTEM_FONT_DIRS.iter().map(PathBuf::from).collect(),
            style: TextStyle::default(),
        }
    }
}

impl PlainRenderer {
    fn find_font(&self) -> Result<FontVec, PdfNotesError> {
        let mut files = Vec::new();
        for dir in &self.font_dirs {
            collect_font_files(dir, MAX_FONT_SCAN_DEPTH, &mut files);
        }
        files.sort();
        files
            .iter()
            .find_map(|p| load_font(p).ok())
            .ok_or_else(|| PdfNotesError::FontUnavailable("no TrueType/OpenType font found".into()))
    }
}

fn collect_font_files(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if depth > 0 {
                collect_font_files(&path, depth - 1, out);
            }
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"))
        {
            out.push(path);
        }
    }
}

impl TranslationRenderer for PlainRenderer {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn render(&self, doc: &TranslationDocument<'_>, output: &Path) -> Result<PathBuf, PdfNotesError> {
        let font = self.find_font()?;
        let pages = render_text_pages(&font, None, doc.translation, Rgb([255, 255, 255]), &self.style);
        pages_to_pdf(&pages, output)
    }
}

/// The annotated page images re-emitted as a PDF.
#[derive(Debug, Default, Clone, Copy)]
pub struct PagesRenderer;

impl TranslationRenderer for PagesRenderer {
    fn name(&self) -> &'static str {
        "pages"
    }

    fn render(&self, doc: &TranslationDocument<'_>, output: &Path) -> Result<PathBuf, PdfNotesError> {
        images_to_pdf(doc.page_images, output, None)
    }
}
