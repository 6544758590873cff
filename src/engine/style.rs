//! Font size recovery for search hits.
//!
//! A search hit is a bare rectangle. Its size comes from the text run it
//! overlaps most; a hit straddling several runs takes the dominant one.

use super::config::FontBounds;
use crate::geometry::Rect;
use crate::page::{PatchPage, TextRun};
use log::{debug, warn};

/// Font size of the run with the largest overlap with `rect`.
///
/// Every run competes, including ones that do not touch `rect` at all;
/// ties keep the earliest run. With no runs the size is estimated from
/// the rectangle height.
pub fn infer_font_size(runs: &[TextRun], rect: &Rect, bounds: &FontBounds) -> f32 {
    let mut best: Option<&TextRun> = None;
    let mut best_area = -1.0_f32;
    for run in runs {
        let area = rect.intersection_area(&run.bbox);
        if area > best_area {
            best = Some(run);
            best_area = area;
        }
    }

    match best {
        Some(run) if run.font_size.is_finite() && run.font_size > 0.0 => run.font_size,
        Some(_) => bounds.default,
        None => fallback_font_size(rect, bounds),
    }
}

/// 90% of the rectangle height, clamped to `bounds`.
pub fn fallback_font_size(rect: &Rect, bounds: &FontBounds) -> f32 {
    bounds.clamp(rect.height() * 0.90)
}

/// Same as [`infer_font_size`] but reads the runs from `page`; an
/// extraction failure degrades to the height estimate.
pub fn infer_from_page<P: PatchPage + ?Sized>(page: &P, rect: &Rect, bounds: &FontBounds) -> f32 {
    match page.text_runs() {
        Ok(runs) => infer_font_size(&runs, rect, bounds),
        Err(e) => {
            warn!(
                "page {}: text runs unavailable ({}), estimating font size",
                page.index() + 1,
                e
            );
            let size = fallback_font_size(rect, bounds);
            debug!("estimated font size {:.2} from height {:.2}", size, rect.height());
            size
        }
    }
}
