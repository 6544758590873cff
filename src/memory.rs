//! In-memory page model.
//!
//! [`MemoryPage`] keeps positioned text runs with per-glyph extents and
//! implements [`PatchPage`] directly: search walks the runs, a committed
//! erase drops every glyph whose centre falls inside a zone (splitting
//! runs around the hole), and insertion adds a new run. It is what the
//! engine is tested against, and it lets callers that already hold
//! extracted layout run the engine without a PDF backend.

use crate::error::{PatchError, PatchResult};
use crate::geometry::Rect;
use crate::metrics::{StandardMetrics, TextMeasure};
use crate::page::{Align, Color, ImageMode, InsertStyle, PatchPage, StrokeStyle, TextRun};

#[derive(Debug, Clone)]
struct Glyph {
    ch: char,
    x0: f32,
    x1: f32,
}

#[derive(Debug, Clone)]
struct Run {
    glyphs: Vec<Glyph>,
    y0: f32,
    y1: f32,
    font_size: f32,
    font_name: String,
    block_id: usize,
    line_id: usize,
}

impl Run {
    fn text(&self) -> String {
        self.glyphs.iter().map(|g| g.ch).collect()
    }

    fn span(&self, from: usize, to: usize) -> Rect {
        Rect::new(self.glyphs[from].x0, self.y0, self.glyphs[to - 1].x1, self.y1)
    }

    fn to_text_run(&self, from: usize, to: usize) -> TextRun {
        TextRun {
            text: self.glyphs[from..to].iter().map(|g| g.ch).collect(),
            bbox: self.span(from, to),
            font_size: self.font_size,
            font_name: self.font_name.clone(),
            block_id: self.block_id,
            line_id: self.line_id,
        }
    }
}

/// A text insertion recorded by [`MemoryPage`].
#[derive(Debug, Clone, PartialEq)]
pub struct Insertion {
    pub rect: Rect,
    pub text: String,
    pub style: InsertStyle,
}

/// A page held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
    index: usize,
    runs: Vec<Run>,
    pending: Vec<(Rect, Color)>,
    erased: Vec<(Rect, Color)>,
    insertions: Vec<Insertion>,
    drawings: Vec<(Rect, StrokeStyle)>,
    commits: usize,
}

impl MemoryPage {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    /// Adds a run whose glyphs are spread across `bbox` in proportion to
    /// their standard advance widths.
    pub fn with_run(
        mut self,
        text: &str,
        bbox: Rect,
        font_size: f32,
        font_name: &str,
        block_id: usize,
        line_id: usize,
    ) -> Self {
        self.push_run(text, bbox, font_size, font_name, block_id, line_id);
        self
    }

    pub fn push_run(
        &mut self,
        text: &str,
        bbox: Rect,
        font_size: f32,
        font_name: &str,
        block_id: usize,
        line_id: usize,
    ) {
        let metrics = StandardMetrics;
        let advances: Vec<f32> = text
            .chars()
            .map(|c| metrics.text_width(&c.to_string(), font_name, font_size))
            .collect();
        let natural: f32 = advances.iter().sum();
        let count = advances.len().max(1) as f32;

        let mut x = bbox.x0;
        let glyphs = text
            .chars()
            .zip(advances)
            .map(|(ch, adv)| {
                let w = if natural > 0.0 {
                    adv / natural * bbox.width()
                } else {
                    bbox.width() / count
                };
                let g = Glyph {
                    ch,
                    x0: x,
                    x1: x + w,
                };
                x += w;
                g
            })
            .collect();

        self.runs.push(Run {
            glyphs,
            y0: bbox.y0,
            y1: bbox.y1,
            font_size,
            font_name: font_name.to_string(),
            block_id,
            line_id,
        });
    }

    /// Zones applied so far, in commit order.
    pub fn erased_zones(&self) -> Vec<Rect> {
        self.erased.iter().map(|(r, _)| *r).collect()
    }

    pub fn insertions(&self) -> &[Insertion] {
        &self.insertions
    }

    pub fn drawings(&self) -> &[(Rect, StrokeStyle)] {
        &self.drawings
    }

    /// Number of times scheduled erasures were committed.
    pub fn commit_count(&self) -> usize {
        self.commits
    }

    /// Concatenated page text, one run per line.
    pub fn plain_text(&self) -> String {
        self.runs
            .iter()
            .map(Run::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn next_block_id(&self) -> usize {
        self.runs.iter().map(|r| r.block_id + 1).max().unwrap_or(0)
    }
}

impl PatchPage for MemoryPage {
    fn index(&self) -> usize {
        self.index
    }

    fn search_text(&self, needle: &str) -> PatchResult<Vec<Rect>> {
        let needle: Vec<char> = needle.chars().collect();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits = Vec::new();
        for run in &self.runs {
            let mut start = 0;
            while start + needle.len() <= run.glyphs.len() {
                let matched = run.glyphs[start..start + needle.len()]
                    .iter()
                    .zip(&needle)
                    .all(|(g, c)| g.ch == *c);
                if matched {
                    hits.push(run.span(start, start + needle.len()));
                    start += needle.len();
                } else {
                    start += 1;
                }
            }
        }
        Ok(hits)
    }

    fn text_runs(&self) -> PatchResult<Vec<TextRun>> {
        Ok(self
            .runs
            .iter()
            .filter(|r| !r.glyphs.is_empty())
            .map(|r| r.to_text_run(0, r.glyphs.len()))
            .collect())
    }

    fn words(&self) -> PatchResult<Vec<TextRun>> {
        let mut words = Vec::new();
        for run in &self.runs {
            let mut start: Option<usize> = None;
            for (i, g) in run.glyphs.iter().enumerate() {
                match (g.ch.is_whitespace(), start) {
                    (true, Some(s)) => {
                        words.push(run.to_text_run(s, i));
                        start = None;
                    }
                    (false, None) => start = Some(i),
                    _ => {}
                }
            }
            if let Some(s) = start {
                words.push(run.to_text_run(s, run.glyphs.len()));
            }
        }
        Ok(words)
    }

    fn schedule_erase(&mut self, zone: Rect, fill: Color) -> PatchResult<()> {
        self.pending.push((zone, fill));
        Ok(())
    }

    fn commit_erasures(&mut self, _images: ImageMode) -> PatchResult<usize> {
        let zones: Vec<(Rect, Color)> = self.pending.drain(..).collect();
        if zones.is_empty() {
            return Ok(0);
        }

        let mut kept_runs = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            let cy = (run.y0 + run.y1) / 2.0;
            let mut segment: Vec<Glyph> = Vec::new();
            for g in &run.glyphs {
                let cx = (g.x0 + g.x1) / 2.0;
                if zones.iter().any(|(z, _)| z.contains_point(cx, cy)) {
                    if !segment.is_empty() {
                        kept_runs.push(Run {
                            glyphs: std::mem::take(&mut segment),
                            ..run.clone()
                        });
                    }
                } else {
                    segment.push(g.clone());
                }
            }
            if !segment.is_empty() {
                kept_runs.push(Run {
                    glyphs: segment,
                    ..run
                });
            }
        }
        self.runs = kept_runs;

        let applied = zones.len();
        self.erased.extend(zones);
        self.commits += 1;
        Ok(applied)
    }

    fn insert_text(&mut self, rect: Rect, text: &str, style: &InsertStyle) -> PatchResult<()> {
        if !self.pending.is_empty() {
            return Err(PatchError::PdfProcessing {
                message: "text inserted while erasures are still pending".to_string(),
                page: Some(self.index + 1),
                source: None,
            });
        }

        let width = StandardMetrics.text_width(text, &style.font_name, style.font_size);
        let x0 = match style.align {
            Align::Right => rect.x1 - width,
            Align::Left => rect.x0,
        };
        let block_id = self.next_block_id();
        self.push_run(
            text,
            Rect::new(x0, rect.y0, x0 + width, rect.y1),
            style.font_size,
            &style.font_name,
            block_id,
            0,
        );
        self.insertions.push(Insertion {
            rect,
            text: text.to_string(),
            style: style.clone(),
        });
        Ok(())
    }

    fn draw_rect(&mut self, rect: Rect, stroke: StrokeStyle) -> PatchResult<()> {
        self.drawings.push((rect, stroke));
        Ok(())
    }
}

/// An ordered sequence of in-memory pages.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    pages: Vec<MemoryPage>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `page`, renumbering it to its position.
    pub fn with_page(mut self, mut page: MemoryPage) -> Self {
        page.index = self.pages.len();
        self.pages.push(page);
        self
    }

    /// Appends an empty page and returns it for filling.
    pub fn add_page(&mut self) -> &mut MemoryPage {
        let index = self.pages.len();
        self.pages.push(MemoryPage::new(index));
        &mut self.pages[index]
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[MemoryPage] {
        &self.pages
    }

    pub fn pages_mut(&mut self) -> &mut [MemoryPage] {
        &mut self.pages
    }

    /// Text of every page, separated by form feeds.
    pub fn plain_text(&self) -> String {
        self.pages
            .iter()
            .map(MemoryPage::plain_text)
            .collect::<Vec<_>>()
            .join("\u{c}")
    }
}
