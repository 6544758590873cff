//! The text patch engine.
//!
//! For each page and each configured replacement the engine searches for
//! the old text, recovers a font size per occurrence, erases every
//! occurrence in one committed batch and then writes the new text into a
//! right-anchored box. Marking is a separate, read-mostly pipeline that
//! finds the amount next to each label occurrence and outlines it.

pub mod config;
pub mod direction;
pub mod erasure;
pub mod layout;
pub mod proximity;
pub mod report;
pub mod style;

pub use config::{FontBounds, PatchConfig, ProximityConfig, Replacement};
pub use direction::{is_right_to_left, visual_order, TextDirection};
pub use erasure::{plan_erasure, RedactionZone};
pub use layout::{layout_replacement_box, replacement_style};
pub use proximity::{find_amount_near, locate_amount, AmountMatch};
pub use report::{LabelHit, MarkSummary, PageReport, PatchSummary, ReplacementOutcome};
pub use style::infer_font_size;

use crate::error::PatchResult;
use crate::geometry::Rect;
use crate::metrics::{StandardMetrics, TextMeasure};
use crate::page::{ErasureBatch, PatchPage, StrokeStyle, TextRun};
use log::{debug, warn};

/// Runs replacements and label marking against [`PatchPage`]s.
pub struct PatchEngine {
    config: PatchConfig,
    metrics: Box<dyn TextMeasure>,
}

impl PatchEngine {
    /// Engine measuring text with the base-14 metrics.
    pub fn new(config: PatchConfig) -> Self {
        Self::with_metrics(config, Box::new(StandardMetrics))
    }

    pub fn with_metrics(config: PatchConfig, metrics: Box<dyn TextMeasure>) -> Self {
        Self { config, metrics }
    }

    pub fn config(&self) -> &PatchConfig {
        &self.config
    }

    /// Applies every configured replacement to `page`, in order.
    pub fn patch_page<P: PatchPage + ?Sized>(&self, page: &mut P) -> PatchResult<PageReport> {
        let mut report = PageReport::new(page.index());
        for replacement in &self.config.replacements {
            let outcome = self.apply_replacement(page, replacement)?;
            if outcome.occurrences > 0 {
                report.outcomes.push(outcome);
            }
        }
        Ok(report)
    }

    /// Patches a sequence of pages, one after another.
    pub fn patch_pages<P: PatchPage>(&self, pages: &mut [P]) -> PatchResult<PatchSummary> {
        let mut summary = PatchSummary::none();
        for page in pages.iter_mut() {
            summary.absorb(&self.patch_page(page)?);
        }
        Ok(summary)
    }

    /// Search, erase-all, then insert-all for one replacement on one page.
    pub fn apply_replacement<P: PatchPage + ?Sized>(
        &self,
        page: &mut P,
        replacement: &Replacement,
    ) -> PatchResult<ReplacementOutcome> {
        let mut outcome = ReplacementOutcome {
            old: replacement.old.clone(),
            new: replacement.new.clone(),
            ..Default::default()
        };

        let hits = page.search_text(&replacement.old)?;
        if hits.is_empty() {
            return Ok(outcome);
        }
        outcome.occurrences = hits.len();

        let occurrences = self.occurrences(page, hits);
        let config = &self.config;
        let font = config.font_name.as_str();

        let mut batch = ErasureBatch::new(page, config.fill);
        for (rect, size) in &occurrences {
            let zone = plan_erasure(
                rect,
                &replacement.new,
                &replacement.old,
                *size,
                config.pad,
                config.slack,
                self.metrics.as_ref(),
                font,
            );
            debug!(
                "erase '{}' at ({:.2}, {:.2}, {:.2}, {:.2}) size {:.2}, extra left {:.2}",
                replacement.old,
                zone.rect.x0,
                zone.rect.y0,
                zone.rect.x1,
                zone.rect.y1,
                size,
                zone.extra_left
            );
            batch.schedule(zone.rect)?;
        }
        let mut committed = batch.commit(config.images)?;
        outcome.erased = committed.erased();

        if replacement.is_deletion() {
            return Ok(outcome);
        }

        for (rect, size) in &occurrences {
            let target = layout_replacement_box(
                rect,
                &replacement.new,
                *size,
                config.slack,
                self.metrics.as_ref(),
                font,
            );
            let style = replacement_style(&replacement.new, font, *size, config.text_color);
            committed.insert_text(target, &replacement.new, &style)?;
            outcome.inserted += 1;
        }
        Ok(outcome)
    }

    /// Pairs each search hit with its inferred font size.
    fn occurrences<P: PatchPage + ?Sized>(&self, page: &P, hits: Vec<Rect>) -> Vec<(Rect, f32)> {
        let bounds = self.config.font_bounds();
        match page.text_runs() {
            Ok(runs) => hits
                .into_iter()
                .map(|r| {
                    let size = infer_font_size(&runs, &r, &bounds);
                    (r, size)
                })
                .collect(),
            Err(_) => hits
                .into_iter()
                .map(|r| (r, style::infer_from_page(page, &r, &bounds)))
                .collect(),
        }
    }

    /// Finds every label occurrence and the amount next to it. Nothing is drawn.
    pub fn locate_labels<P: PatchPage + ?Sized>(
        &self,
        page: &P,
        labels: &[String],
    ) -> PatchResult<Vec<LabelHit>> {
        let words: Vec<TextRun> = page.words().unwrap_or_else(|e| {
            warn!("page {}: words unavailable ({}), labels will be outlined", page.index() + 1, e);
            Vec::new()
        });

        let mut hits = Vec::new();
        for label in labels {
            for label_rect in page.search_text(label)? {
                let found = locate_amount(&words, &label_rect, &self.config.proximity);
                if found.is_none() {
                    debug!("page {}: no amount next to '{}'", page.index() + 1, label);
                }
                hits.push(LabelHit {
                    page_index: page.index(),
                    label: label.clone(),
                    label_rect,
                    amount: found.as_ref().map(|m| m.rect),
                    value: found.and_then(|m| m.value),
                });
            }
        }
        Ok(hits)
    }

    /// Outlines the amount next to each label occurrence, or the label
    /// itself when no amount qualifies.
    pub fn mark_page<P: PatchPage + ?Sized>(
        &self,
        page: &mut P,
        labels: &[String],
        stroke: StrokeStyle,
    ) -> PatchResult<Vec<LabelHit>> {
        let hits = self.locate_labels(page, labels)?;
        for hit in &hits {
            page.draw_rect(hit.target(), stroke)?;
        }
        Ok(hits)
    }
}
