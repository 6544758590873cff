//! MuPDF-backed pages.
//!
//! MuPDF supplies literal search, structured text and true redaction:
//! each erase zone becomes a `Redact` annotation and a commit applies them
//! with `pdf_redact_page`, physically removing the covered glyphs. Images
//! under a zone are kept or removed per [`ImageMode`], never blanked. MuPDF's
//! safe bindings cannot place text, so the zone fills, replacement text
//! and outline rectangles go into an [`Overlay`] that is written into the
//! saved file with lopdf.

use super::glyphs::{self, Glyph, GlyphLine};
use super::overlay::{Overlay, OverlayOp};
use super::{copy_unchanged, utf8_path, DocumentBackend};
use crate::engine::{LabelHit, MarkSummary, PatchEngine, PatchSummary};
use crate::error::{PatchError, PatchResult};
use crate::geometry::Rect;
use crate::page::{Color, ImageMode, InsertStyle, PatchPage, StrokeStyle, TextRun};
use log::{debug, info};
use std::path::{Path, PathBuf};

use mupdf::pdf::{PdfAnnotationType, PdfDocument, PdfPage};
use mupdf::{Page, Quad, TextPageFlags};

/// Backend that patches PDFs through MuPDF.
#[derive(Debug, Clone)]
pub struct MupdfBackend {
    /// Maximum search hits per needle and page
    max_hits: u32,
    /// TrueType file tried first for right-to-left and non-Latin text
    unicode_font: Option<PathBuf>,
}

impl Default for MupdfBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self {
            max_hits: 100,
            unicode_font: None,
        }
    }

    /// Sets the maximum number of search hits per needle.
    pub fn with_max_hits(mut self, max_hits: u32) -> Self {
        self.max_hits = max_hits;
        self
    }

    pub fn max_hits(&self) -> u32 {
        self.max_hits
    }

    /// Sets the TrueType font used for text Helvetica cannot show.
    pub fn with_unicode_font(mut self, path: impl Into<PathBuf>) -> Self {
        self.unicode_font = Some(path.into());
        self
    }

    /// Opens `input`, trying the empty password on encrypted files.
    fn open(&self, input: &Path) -> PatchResult<PdfDocument> {
        let input_str = utf8_path(input, "input")?;
        let mut doc = PdfDocument::open(input_str).map_err(|e| PatchError::PdfProcessing {
            message: "Failed to open PDF with MuPDF".to_string(),
            page: None,
            source: Some(Box::new(e)),
        })?;

        let locked = doc
            .needs_password()
            .map_err(|e| PatchError::mupdf("Failed to query encryption", e))?;
        if locked {
            let opened = doc
                .authenticate("")
                .map_err(|e| PatchError::mupdf("Failed to authenticate", e))?;
            if !opened {
                return Err(PatchError::Encrypted {
                    path: input.to_path_buf(),
                });
            }
            debug!("{}: opened with the empty password", input.display());
        }
        Ok(doc)
    }

    /// Runs `visit` over every PDF page and collects the overlays.
    fn visit_pages<F>(&self, doc: &PdfDocument, mut visit: F) -> PatchResult<Overlay>
    where
        F: FnMut(&mut MupdfPage) -> PatchResult<()>,
    {
        let page_count = doc
            .page_count()
            .map_err(|e| PatchError::mupdf("Failed to get page count", e))?;

        let mut overlay = Overlay::new().with_font_file(self.unicode_font.clone());
        for page_idx in 0..page_count {
            let page = doc.load_page(page_idx).map_err(|e| {
                PatchError::on_page(
                    page_idx as usize + 1,
                    format!("Failed to load page {}", page_idx + 1),
                    e,
                )
            })?;
            let pdf_page = match PdfPage::try_from(page.clone()) {
                Ok(p) => p,
                Err(_) => continue,
            };

            let mut patch_page = MupdfPage {
                index: page_idx as usize,
                page,
                pdf_page,
                max_hits: self.max_hits,
                pending: Vec::new(),
                ops: Vec::new(),
            };
            visit(&mut patch_page)?;
            overlay.extend(patch_page.index, patch_page.ops);
        }
        Ok(overlay)
    }

    fn save(&self, doc: &PdfDocument, overlay: &Overlay, output: &Path) -> PatchResult<()> {
        let output_str = utf8_path(output, "output")?;
        doc.save(output_str).map_err(|e| PatchError::PdfProcessing {
            message: "Failed to save patched PDF".to_string(),
            page: None,
            source: Some(Box::new(e)),
        })?;
        overlay.apply_to_file(output)
    }
}

impl DocumentBackend for MupdfBackend {
    fn patch(
        &self,
        input: &Path,
        output: &Path,
        engine: &PatchEngine,
    ) -> PatchResult<PatchSummary> {
        let doc = self.open(input)?;
        let mut summary = PatchSummary::none();
        let overlay = self.visit_pages(&doc, |page| {
            let report = engine.patch_page(page)?;
            for outcome in &report.outcomes {
                debug!(
                    "page {}: '{}' -> '{}' x{}",
                    report.page_index + 1,
                    outcome.old,
                    outcome.new,
                    outcome.occurrences
                );
            }
            summary.absorb(&report);
            Ok(())
        })?;

        if summary.has_changes() {
            self.save(&doc, &overlay, output)?;
        } else {
            copy_unchanged(input, output)?;
        }
        info!(
            "{}: {} occurrence(s) on {} of {} page(s)",
            input.display(),
            summary.occurrences,
            summary.pages_modified,
            summary.pages_processed
        );
        Ok(summary)
    }

    fn mark(
        &self,
        input: &Path,
        output: &Path,
        engine: &PatchEngine,
        labels: &[String],
        stroke: StrokeStyle,
    ) -> PatchResult<(MarkSummary, Vec<LabelHit>)> {
        let doc = self.open(input)?;
        let mut summary = MarkSummary::default();
        let mut hits = Vec::new();
        let overlay = self.visit_pages(&doc, |page| {
            let page_hits = engine.mark_page(page, labels, stroke)?;
            summary.absorb(&page_hits);
            hits.extend(page_hits);
            Ok(())
        })?;

        if overlay.is_empty() {
            copy_unchanged(input, output)?;
        } else {
            self.save(&doc, &overlay, output)?;
        }
        info!(
            "{}: {} label(s), {} amount(s), {} fallback(s)",
            input.display(),
            summary.labels_found,
            summary.amounts_found,
            summary.fallbacks
        );
        Ok((summary, hits))
    }

    fn name(&self) -> &str {
        "MuPDF"
    }
}

/// One PDF page under patch.
pub struct MupdfPage {
    index: usize,
    page: Page,
    pdf_page: PdfPage,
    max_hits: u32,
    pending: Vec<(Rect, Color)>,
    ops: Vec<OverlayOp>,
}

fn quad_rect(quad: &Quad) -> Rect {
    Rect {
        x0: quad.ul.x.min(quad.ll.x).min(quad.ur.x).min(quad.lr.x),
        y0: quad.ul.y.min(quad.ll.y).min(quad.ur.y).min(quad.lr.y),
        x1: quad.ul.x.max(quad.ll.x).max(quad.ur.x).max(quad.lr.x),
        y1: quad.ul.y.max(quad.ll.y).max(quad.ur.y).max(quad.lr.y),
    }
}

impl MupdfPage {
    fn page_error<E>(&self, message: &str, source: E) -> PatchError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        PatchError::on_page(self.index + 1, message, source)
    }

    fn glyph_lines(&self) -> PatchResult<Vec<GlyphLine>> {
        let text_page = self
            .page
            .to_text_page(TextPageFlags::empty())
            .map_err(|e| self.page_error("Failed to extract structured text", e))?;

        let mut lines = Vec::new();
        for (block_id, block) in text_page.blocks().enumerate() {
            for (line_id, line) in block.lines().enumerate() {
                let glyphs = line
                    .chars()
                    .filter_map(|c| {
                        Some(Glyph {
                            ch: c.char()?,
                            rect: quad_rect(&c.quad()),
                            size: c.size(),
                        })
                    })
                    .collect();
                lines.push(GlyphLine {
                    block_id,
                    line_id,
                    // not exposed by the bindings; measurement falls back to Helvetica
                    font_name: String::new(),
                    glyphs,
                });
            }
        }
        Ok(lines)
    }
}

impl PatchPage for MupdfPage {
    fn index(&self) -> usize {
        self.index
    }

    fn search_text(&self, needle: &str) -> PatchResult<Vec<Rect>> {
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let hits = self.page.search(needle, self.max_hits).map_err(|e| PatchError::BackendError {
            backend: "MuPDF".to_string(),
            message: format!("Search failed for '{}'", needle),
            source: Some(Box::new(e)),
        })?;
        Ok(hits.into_iter().map(|quad| quad_rect(&quad)).collect())
    }

    fn text_runs(&self) -> PatchResult<Vec<TextRun>> {
        Ok(glyphs::spans(&self.glyph_lines()?))
    }

    fn words(&self) -> PatchResult<Vec<TextRun>> {
        Ok(glyphs::words(&self.glyph_lines()?))
    }

    fn schedule_erase(&mut self, zone: Rect, fill: Color) -> PatchResult<()> {
        self.pending.push((zone, fill));
        Ok(())
    }

    fn commit_erasures(&mut self, images: ImageMode) -> PatchResult<usize> {
        let zones = std::mem::take(&mut self.pending);
        let mut annots = Vec::with_capacity(zones.len());
        for (zone, _) in &zones {
            let annot = self
                .pdf_page
                .create_annotation(PdfAnnotationType::Redact)
                .map_err(|e| self.page_error("Failed to create redaction annotation", e))?;

            unsafe {
                ffi::set_annotation_rect(&annot, zone);
            }
            annots.push(annot);
        }
        let Some(first) = annots.first() else {
            return Ok(0);
        };

        let applied = unsafe { ffi::redact_page(first, images) };
        if !applied {
            return Err(PatchError::PdfProcessing {
                message: "Failed to apply redactions".to_string(),
                page: Some(self.index + 1),
                source: None,
            });
        }
        debug!(
            "page {}: {} zone(s) redacted, images {:?}",
            self.index + 1,
            zones.len(),
            images
        );

        for (rect, color) in &zones {
            self.ops.push(OverlayOp::Fill {
                rect: *rect,
                color: *color,
            });
        }
        Ok(zones.len())
    }

    fn insert_text(&mut self, rect: Rect, text: &str, style: &InsertStyle) -> PatchResult<()> {
        if !self.pending.is_empty() {
            return Err(PatchError::PdfProcessing {
                message: "text inserted while erasures are still pending".to_string(),
                page: Some(self.index + 1),
                source: None,
            });
        }
        self.ops.push(OverlayOp::Text {
            rect,
            text: text.to_string(),
            style: style.clone(),
        });
        Ok(())
    }

    fn draw_rect(&mut self, rect: Rect, stroke: StrokeStyle) -> PatchResult<()> {
        self.ops.push(OverlayOp::Stroke { rect, style: stroke });
        Ok(())
    }
}

/// FFI helpers for MuPDF operations the safe bindings do not expose.
mod ffi {
    use crate::geometry::Rect;
    use crate::page::ImageMode;
    use mupdf::pdf::PdfAnnotation;
    use mupdf::Context;
    use std::os::raw::c_int;

    // PDF_REDACT_IMAGE_*, PDF_REDACT_LINE_ART_* and PDF_REDACT_TEXT_* values
    const REDACT_IMAGE_NONE: c_int = 0;
    const REDACT_IMAGE_REMOVE: c_int = 1;
    const REDACT_LINE_ART_NONE: c_int = 0;
    const REDACT_TEXT_REMOVE: c_int = 0;

    #[repr(C)]
    struct PdfAnnotRaw {
        inner: *mut mupdf_sys::pdf_annot,
    }

    #[repr(C)]
    struct ContextRaw {
        inner: *mut mupdf_sys::fz_context,
    }

    /// The calling thread's MuPDF context, the one owning its documents.
    unsafe fn thread_context() -> *mut mupdf_sys::fz_context {
        let ctx = Context::get();
        std::mem::transmute::<&Context, &ContextRaw>(&ctx).inner
    }

    unsafe fn raw_annot(annot: &PdfAnnotation) -> *mut mupdf_sys::pdf_annot {
        std::mem::transmute::<&PdfAnnotation, &PdfAnnotRaw>(annot).inner
    }

    /// Redaction options for `images`: glyphs under a zone are removed,
    /// vector art is kept, no black boxes are drawn.
    pub fn redact_options(images: ImageMode) -> mupdf_sys::pdf_redact_options {
        mupdf_sys::pdf_redact_options {
            black_boxes: 0,
            image_method: match images {
                ImageMode::None => REDACT_IMAGE_NONE,
                ImageMode::Remove => REDACT_IMAGE_REMOVE,
            },
            line_art: REDACT_LINE_ART_NONE,
            text: REDACT_TEXT_REMOVE,
        }
    }

    /// Sets the rectangle for a PDF annotation via FFI.
    ///
    /// # Safety
    /// This function uses unsafe FFI calls to access MuPDF's C API.
    /// The annotation must be valid and owned by the calling thread's context.
    pub unsafe fn set_annotation_rect(annot: &PdfAnnotation, rect: &Rect) {
        let ctx = thread_context();
        if !ctx.is_null() {
            let fz_rect = mupdf_sys::fz_rect {
                x0: rect.x0,
                y0: rect.y0,
                x1: rect.x1,
                y1: rect.y1,
            };
            mupdf_sys::pdf_set_annot_rect(ctx, raw_annot(annot), fz_rect);
        }
    }

    /// Applies every redaction annotation on the page holding `annot`.
    /// Returns false when nothing could be applied.
    ///
    /// # Safety
    /// `annot` must be a live annotation of a page loaded on this thread.
    /// MuPDF exceptions are not caught here.
    pub unsafe fn redact_page(annot: &PdfAnnotation, images: ImageMode) -> bool {
        let ctx = thread_context();
        if ctx.is_null() {
            return false;
        }
        let page = mupdf_sys::pdf_annot_page(ctx, raw_annot(annot));
        if page.is_null() {
            return false;
        }
        let mut opts = redact_options(images);
        mupdf_sys::pdf_redact_page(ctx, (*page).doc, page, &mut opts) != 0
    }
}
