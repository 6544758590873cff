//! Grouping positioned glyphs into spans and words.
//!
//! Structured text comes out of the backend one character at a time, each
//! with its own box and size. Spans are maximal same-size stretches of a
//! line; words are maximal non-whitespace stretches. Both carry the
//! block/line ids of the line they came from.

use crate::geometry::Rect;
use crate::page::TextRun;

/// One positioned character.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub ch: char,
    pub rect: Rect,
    pub size: f32,
}

/// The glyphs of one text line, in reading order.
#[derive(Debug, Clone, Default)]
pub struct GlyphLine {
    pub block_id: usize,
    pub line_id: usize,
    pub font_name: String,
    pub glyphs: Vec<Glyph>,
}

const SIZE_EPSILON: f32 = 0.01;

impl GlyphLine {
    fn run(&self, glyphs: &[Glyph]) -> TextRun {
        let bbox = glyphs
            .iter()
            .skip(1)
            .fold(glyphs[0].rect, |acc, g| acc.union(&g.rect));
        TextRun {
            text: glyphs.iter().map(|g| g.ch).collect(),
            bbox,
            font_size: glyphs[0].size,
            font_name: self.font_name.clone(),
            block_id: self.block_id,
            line_id: self.line_id,
        }
    }

    /// Same-size stretches of this line.
    pub fn spans(&self) -> Vec<TextRun> {
        let mut spans = Vec::new();
        let mut start = 0;
        for i in 1..=self.glyphs.len() {
            let boundary = i == self.glyphs.len()
                || (self.glyphs[i].size - self.glyphs[start].size).abs() > SIZE_EPSILON;
            if boundary && start < i {
                spans.push(self.run(&self.glyphs[start..i]));
                start = i;
            }
        }
        spans
    }

    /// Whitespace-separated tokens of this line.
    pub fn words(&self) -> Vec<TextRun> {
        self.glyphs
            .split(|g| g.ch.is_whitespace())
            .filter(|w| !w.is_empty())
            .map(|w| self.run(w))
            .collect()
    }
}

pub fn spans(lines: &[GlyphLine]) -> Vec<TextRun> {
    lines.iter().flat_map(GlyphLine::spans).collect()
}

pub fn words(lines: &[GlyphLine]) -> Vec<TextRun> {
    lines.iter().flat_map(GlyphLine::words).collect()
}
