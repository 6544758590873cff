//! Page overlays written with lopdf.
//!
//! Fills, replacement text and outline rectangles are collected per page
//! while a document is patched and drawn afterwards into the saved file as
//! one form XObject per page, painted on top of the existing content.
//!
//! Operations are recorded in MuPDF's page space (origin at the top left of
//! the crop box, y down, `/Rotate` applied). Each form carries the inverse
//! of MuPDF's page transform as its `/Matrix`, so the drawing lands where
//! search and structured text reported it. Text is set in base-14
//! Helvetica with WinAnsi encoding, or in an embedded TrueType font when
//! it is right-to-left or has characters WinAnsi lacks.

use super::unicode_font::{FontEmbedding, UnicodeFont};
use crate::engine::visual_order;
use crate::error::{PatchError, PatchResult};
use crate::geometry::Rect;
use crate::metrics::{StandardMetrics, TextMeasure};
use crate::page::{Align, Color, InsertStyle, StrokeStyle};
use log::{debug, warn};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, StringFormat};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const HELVETICA: &str = "FPatch";
const UNICODE: &str = "FPatchU";

/// Helvetica descender, in 1/1000 em.
const DESCENT: f32 = 0.207;

/// Page size MuPDF assumes when a page has no usable box.
const LETTER: Rect = Rect {
    x0: 0.0,
    y0: 0.0,
    x1: 612.0,
    y1: 792.0,
};

/// A drawing operation in page space (y down).
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayOp {
    Fill { rect: Rect, color: Color },
    Stroke { rect: Rect, style: StrokeStyle },
    Text { rect: Rect, text: String, style: InsertStyle },
}

/// Operations for every touched page, in drawing order.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    pages: BTreeMap<usize, Vec<OverlayOp>>,
    font_file: Option<PathBuf>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// TrueType file to try first for text Helvetica cannot show.
    pub fn with_font_file(mut self, font_file: Option<PathBuf>) -> Self {
        self.font_file = font_file;
        self
    }

    pub fn push(&mut self, page_index: usize, op: OverlayOp) {
        self.pages.entry(page_index).or_default().push(op);
    }

    pub fn extend(&mut self, page_index: usize, ops: Vec<OverlayOp>) {
        if !ops.is_empty() {
            self.pages.entry(page_index).or_default().extend(ops);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pages.values().all(Vec::is_empty)
    }

    pub fn ops(&self, page_index: usize) -> &[OverlayOp] {
        self.pages.get(&page_index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Draws the overlay into the PDF at `path`, rewriting it in place.
    pub fn apply_to_file(&self, path: &Path) -> PatchResult<()> {
        if self.is_empty() {
            return Ok(());
        }
        let mut doc = Document::load(path)?;
        self.apply(&mut doc)?;
        doc.save(path)?;
        Ok(())
    }

    /// Draws the overlay into a loaded document.
    pub fn apply(&self, doc: &mut Document) -> PatchResult<()> {
        let helvetica = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let mut unicode = self.unicode_font().map(|font| FontEmbedding::new(font, doc));
        let page_ids = doc.get_pages();

        for (&index, ops) in &self.pages {
            if ops.is_empty() {
                continue;
            }
            let page_id = *page_ids
                .get(&(index as u32 + 1))
                .ok_or_else(|| PatchError::PdfProcessing {
                    message: "overlay refers to a missing page".to_string(),
                    page: Some(index + 1),
                    source: None,
                })?;
            let space = PageSpace::of(doc, page_id);

            let mut operations: Vec<Operation> = Vec::new();
            for op in ops {
                operations.extend(draw(op, unicode.as_mut()));
            }
            let content = Content { operations };

            let mut fonts = dictionary! { HELVETICA => helvetica };
            if let Some(embedding) = &unicode {
                fonts.set(UNICODE, embedding.id());
            }
            let mut form = lopdf::xobject::form(space.bbox(), space.matrix(), content.encode()?);
            form.dict.set("Resources", dictionary! { "Font" => fonts });
            doc.insert_form_object(page_id, form)?;
            debug!("page {}: {} overlay operations", index + 1, ops.len());
        }

        if let Some(embedding) = unicode {
            embedding.write(doc)?;
        }
        Ok(())
    }

    /// Font for the text ops Helvetica cannot show, if there are any.
    fn unicode_font(&self) -> Option<UnicodeFont> {
        let mut wanted = self.pages.values().flatten().filter_map(|op| match op {
            OverlayOp::Text { text, style, .. } if needs_unicode(text, style) => {
                Some((text.as_str(), style.family_hint))
            }
            _ => None,
        });
        let (first, family_hint) = wanted.next()?;
        let mut text = first.to_string();
        for (more, _) in wanted {
            text.push_str(more);
        }

        match UnicodeFont::locate(self.font_file.as_deref(), &text, family_hint) {
            Some(font) => {
                debug!("text '{}' set in {}", text, font.path().display());
                Some(font)
            }
            None => {
                warn!(
                    "no installed font covers '{}' (tried {}); using Helvetica",
                    text, family_hint
                );
                None
            }
        }
    }
}

fn needs_unicode(text: &str, style: &InsertStyle) -> bool {
    style.rtl || !text.chars().all(|c| win_ansi_code(c).is_some())
}

/// 2x3 affine matrix `[a b c d e f]`, as in PDF.
type Matrix = [f32; 6];

fn concat(one: &Matrix, two: &Matrix) -> Matrix {
    [
        one[0] * two[0] + one[1] * two[2],
        one[0] * two[1] + one[1] * two[3],
        one[2] * two[0] + one[3] * two[2],
        one[2] * two[1] + one[3] * two[3],
        one[4] * two[0] + one[5] * two[2] + two[4],
        one[4] * two[1] + one[5] * two[3] + two[5],
    ]
}

fn invert(m: &Matrix) -> Matrix {
    let det = m[0] * m[3] - m[1] * m[2];
    if det.abs() < f32::EPSILON {
        return [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
    }
    [
        m[3] / det,
        -m[1] / det,
        -m[2] / det,
        m[0] / det,
        (m[2] * m[5] - m[3] * m[4]) / det,
        (m[1] * m[4] - m[0] * m[5]) / det,
    ]
}

/// Rotates `m` by a multiple of 90 degrees before its own transform.
fn pre_rotate(m: &Matrix, degrees: i32) -> Matrix {
    let [a, b, c, d, e, f] = *m;
    match degrees.rem_euclid(360) {
        90 => [c, d, -a, -b, e, f],
        180 => [-a, -b, -c, -d, e, f],
        270 => [-c, -d, a, b, e, f],
        _ => *m,
    }
}

fn transform_rect(r: &Rect, m: &Matrix) -> Rect {
    let corners = [(r.x0, r.y0), (r.x1, r.y0), (r.x0, r.y1), (r.x1, r.y1)];
    let points: Vec<(f32, f32)> = corners
        .iter()
        .map(|&(x, y)| (x * m[0] + y * m[2] + m[4], x * m[1] + y * m[3] + m[5]))
        .collect();
    let fold = |pick: fn(&(f32, f32)) -> f32, init: f32, f: fn(f32, f32) -> f32| {
        points.iter().map(pick).fold(init, f)
    };
    Rect {
        x0: fold(|p| p.0, f32::INFINITY, f32::min),
        y0: fold(|p| p.1, f32::INFINITY, f32::min),
        x1: fold(|p| p.0, f32::NEG_INFINITY, f32::max),
        y1: fold(|p| p.1, f32::NEG_INFINITY, f32::max),
    }
}

/// Snaps `/Rotate` to 0, 90, 180 or 270.
fn snap_rotation(rotate: i32) -> i32 {
    (90 * ((rotate.rem_euclid(360) + 45) / 90)) % 360
}

/// MuPDF's page space for one page.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PageSpace {
    /// PDF user space to page space.
    ctm: Matrix,
    /// Visible area (crop box clipped to the media box) in page space.
    bounds: Rect,
}

impl PageSpace {
    fn of(doc: &Document, page_id: ObjectId) -> Self {
        let boxed = |key: &[u8]| {
            inherited(doc, page_id, key)
                .and_then(|o| rect_of(doc, o))
                .filter(|r| r.width() >= 1.0 && r.height() >= 1.0)
        };
        let media = boxed(b"MediaBox").unwrap_or(LETTER);
        let crop = boxed(b"CropBox");
        let visible = crop.and_then(|c| c.intersection(&media)).unwrap_or(media);
        let rotate = inherited(doc, page_id, b"Rotate")
            .and_then(number)
            .map_or(0, |r| r as i32);
        let unit = doc
            .get_dictionary(page_id)
            .ok()
            .and_then(|d| d.get(b"UserUnit").ok())
            .and_then(number)
            .unwrap_or(1.0);

        let flipped = pre_rotate(&[unit, 0.0, 0.0, -unit, 0.0, 0.0], -snap_rotation(rotate));
        // the crop box sets the origin even where it overhangs the media box
        let origin = transform_rect(&crop.unwrap_or(media), &flipped);
        let ctm = concat(&flipped, &[1.0, 0.0, 0.0, 1.0, -origin.x0, -origin.y0]);
        Self {
            ctm,
            bounds: transform_rect(&visible, &ctm),
        }
    }

    /// Form `/Matrix`: page space back to user space.
    fn matrix(&self) -> Vec<f32> {
        invert(&self.ctm).to_vec()
    }

    fn bbox(&self) -> Vec<f32> {
        vec![self.bounds.x0, self.bounds.y0, self.bounds.x1, self.bounds.y1]
    }
}

/// Page dictionary entry, following `/Parent` for inherited attributes.
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    // bounded in case of a cyclic page tree
    for _ in 0..64 {
        if let Ok(value) = node.get(key) {
            return resolve(doc, value);
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn rect_of(doc: &Document, obj: &Object) -> Option<Rect> {
    let values: Vec<f32> = resolve(doc, obj)?
        .as_array()
        .ok()?
        .iter()
        .filter_map(|o| resolve(doc, o).and_then(number))
        .collect();
    match values.as_slice() {
        [x0, y0, x1, y1] => Some(Rect::new(*x0, *y0, *x1, *y1)),
        _ => None,
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn rgb(color: &Color) -> Vec<Object> {
    vec![color.r.into(), color.g.into(), color.b.into()]
}

/// `re` operands for a page-space rect.
fn re(rect: &Rect) -> Vec<Object> {
    vec![
        rect.x0.into(),
        rect.y0.into(),
        rect.width().into(),
        rect.height().into(),
    ]
}

/// Content operations for one overlay op. Text that needs more than
/// WinAnsi goes through `unicode` when a font was found.
fn draw(op: &OverlayOp, unicode: Option<&mut FontEmbedding>) -> Vec<Operation> {
    match op {
        OverlayOp::Fill { rect, color } => vec![
            Operation::new("q", vec![]),
            Operation::new("rg", rgb(color)),
            Operation::new("re", re(rect)),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ],
        OverlayOp::Stroke { rect, style } => vec![
            Operation::new("q", vec![]),
            Operation::new("RG", rgb(&style.color)),
            Operation::new("w", vec![style.width.into()]),
            Operation::new("re", re(rect)),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ],
        OverlayOp::Text { rect, text, style } => {
            let size = style.font_size;
            let visual = if style.rtl {
                visual_order(text)
            } else {
                text.clone()
            };
            let (font, shown, width, descent) =
                match unicode.filter(|_| needs_unicode(text, style)) {
                    Some(embedding) => {
                        let (glyphs, advance) = embedding.show(&visual);
                        (
                            UNICODE,
                            Object::String(glyphs, StringFormat::Hexadecimal),
                            advance as f32 * size / 1000.0,
                            embedding.font().descent_ratio(),
                        )
                    }
                    None => (
                        HELVETICA,
                        Object::String(win_ansi(&visual), StringFormat::Literal),
                        StandardMetrics.text_width(&visual, "Helvetica", size),
                        DESCENT,
                    ),
                };
            let x = match style.align {
                Align::Right => rect.x1 - width,
                Align::Left => rect.x0,
            };
            let baseline = rect.y1 - descent * size;
            vec![
                Operation::new("q", vec![]),
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![font.into(), size.into()]),
                Operation::new("rg", rgb(&style.color)),
                // flip glyphs back upright in the y-down space
                Operation::new(
                    "Tm",
                    vec![
                        1.into(),
                        0.into(),
                        0.into(),
                        (-1).into(),
                        x.into(),
                        baseline.into(),
                    ],
                ),
                Operation::new("Tj", vec![shown]),
                Operation::new("ET", vec![]),
                Operation::new("Q", vec![]),
            ]
        }
    }
}

fn win_ansi_code(c: char) -> Option<u8> {
    match c as u32 {
        code @ 0x20..=0x7e | code @ 0xa0..=0xff => Some(code as u8),
        _ => None,
    }
}

/// WinAnsi bytes for `text`; characters outside Latin-1 become `?`.
pub fn win_ansi(text: &str) -> Vec<u8> {
    let mut lossy = 0;
    let bytes = text
        .chars()
        .map(|c| {
            win_ansi_code(c).unwrap_or_else(|| {
                lossy += 1;
                b'?'
            })
        })
        .collect();
    if lossy > 0 {
        warn!("{} character(s) of '{}' have no WinAnsi glyph", lossy, text);
    }
    bytes
}
