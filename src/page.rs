//! Page collaborator contract and the two-phase erase protocol.
//!
//! The patch engine never touches a document format directly. It sees a
//! page through [`PatchPage`]: literal search, structured text runs,
//! scheduled erasure with a single commit, and styled text insertion.
//! [`ErasureBatch`] turns the erase-all-then-insert-all ordering into a
//! sequencing contract: text can only be inserted through the
//! [`CommittedErasures`] handle that `commit` returns.

use crate::error::PatchResult;
use crate::geometry::Rect;
use serde::{Deserialize, Serialize};

/// A contiguous run of text as laid out on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub bbox: Rect,
    pub font_size: f32,
    pub font_name: String,
    pub block_id: usize,
    pub line_id: usize,
}

/// RGB colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Horizontal alignment inside an insertion box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Right,
}

/// What a committed erase does to images under a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageMode {
    /// Images are left untouched.
    #[default]
    None,
    /// Images overlapping a zone are removed.
    Remove,
}

/// Style for a single-line text insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStyle {
    pub font_name: String,
    pub font_size: f32,
    pub align: Align,
    pub color: Color,
    /// Right-to-left script; backends that shape text reverse visual order.
    pub rtl: bool,
    /// Preferred font families, first match wins.
    pub family_hint: &'static str,
}

/// Outline style for annotation rectangles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color::RED,
            width: 2.0,
        }
    }
}

/// One page of a document as seen by the engine.
pub trait PatchPage {
    /// Zero-based page index, used in logs and errors.
    fn index(&self) -> usize;

    /// Rectangles of every literal occurrence of `needle`. Empty when absent.
    fn search_text(&self, needle: &str) -> PatchResult<Vec<Rect>>;

    /// Structured text runs for the current page state.
    fn text_runs(&self) -> PatchResult<Vec<TextRun>>;

    /// Whitespace-separated tokens with their block and line ids.
    fn words(&self) -> PatchResult<Vec<TextRun>>;

    /// Schedules an opaque erase of `zone`. Nothing changes until commit.
    fn schedule_erase(&mut self, zone: Rect, fill: Color) -> PatchResult<()>;

    /// Applies every scheduled erase in one pass.
    fn commit_erasures(&mut self, images: ImageMode) -> PatchResult<usize>;

    /// Places a single line of text inside `rect`.
    fn insert_text(&mut self, rect: Rect, text: &str, style: &InsertStyle) -> PatchResult<()>;

    /// Outlines `rect`.
    fn draw_rect(&mut self, rect: Rect, stroke: StrokeStyle) -> PatchResult<()>;
}

/// Erase zones collected for one replacement on one page.
pub struct ErasureBatch<'p, P: PatchPage + ?Sized> {
    page: &'p mut P,
    fill: Color,
    scheduled: usize,
}

impl<'p, P: PatchPage + ?Sized> ErasureBatch<'p, P> {
    pub fn new(page: &'p mut P, fill: Color) -> Self {
        Self {
            page,
            fill,
            scheduled: 0,
        }
    }

    pub fn schedule(&mut self, zone: Rect) -> PatchResult<()> {
        self.page.schedule_erase(zone, self.fill)?;
        self.scheduled += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.scheduled
    }

    pub fn is_empty(&self) -> bool {
        self.scheduled == 0
    }

    /// Commits all zones and hands back the page for insertion.
    pub fn commit(self, images: ImageMode) -> PatchResult<CommittedErasures<'p, P>> {
        let erased = if self.scheduled > 0 {
            self.page.commit_erasures(images)?
        } else {
            0
        };
        Ok(CommittedErasures {
            page: self.page,
            erased,
        })
    }
}

/// A page whose scheduled erasures have been applied.
pub struct CommittedErasures<'p, P: PatchPage + ?Sized> {
    page: &'p mut P,
    erased: usize,
}

impl<'p, P: PatchPage + ?Sized> CommittedErasures<'p, P> {
    /// Number of zones the backend reported as applied.
    pub fn erased(&self) -> usize {
        self.erased
    }

    pub fn insert_text(&mut self, rect: Rect, text: &str, style: &InsertStyle) -> PatchResult<()> {
        self.page.insert_text(rect, text, style)
    }
}
