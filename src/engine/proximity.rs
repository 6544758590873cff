//! Locating an amount next to a label.
//!
//! The value beside a label changes from document to document, so it
//! cannot be searched for. Instead every amount-shaped token sharing the
//! label's line competes on horizontal distance; the winner is then grown
//! over adjacent amount pieces and currency fragments on the same line.

use super::config::ProximityConfig;
use crate::domain::{AmountMatcher, CurrencyFragmentMatcher, PatternMatcher};
use crate::geometry::Rect;
use crate::page::TextRun;
use log::debug;

/// An amount located next to a label.
#[derive(Debug, Clone, PartialEq)]
pub struct AmountMatch {
    /// Union of the merged tokens, padded.
    pub rect: Rect,
    /// Token texts in merge order, starting with the winner.
    pub tokens: Vec<String>,
    /// Canonical value of the winning token, e.g. `1234.56`.
    pub value: Option<String>,
}

/// True if the rows of `a` and `b` overlap by more than `ratio` of the
/// smaller height.
fn shares_row(a: &Rect, b: &Rect, ratio: f32) -> bool {
    a.vertical_overlap(b) >= ratio * a.height().min(b.height())
}

/// Box around the amount nearest to `label`, or `None` if no amount-shaped
/// token sits on the label's line.
pub fn find_amount_near(words: &[TextRun], label: &Rect, config: &ProximityConfig) -> Option<Rect> {
    locate_amount(words, label, config).map(|m| m.rect)
}

/// Full form of [`find_amount_near`], keeping the merged token texts.
pub fn locate_amount(
    words: &[TextRun],
    label: &Rect,
    config: &ProximityConfig,
) -> Option<AmountMatch> {
    let amounts = AmountMatcher::new();
    let fragments = CurrencyFragmentMatcher::new();
    let label_center = label.center_x();

    // (gap, centre distance, word)
    let mut best: Option<(f32, f32, &TextRun)> = None;
    for word in words {
        if !shares_row(label, &word.bbox, config.overlap_ratio) {
            continue;
        }
        if !amounts.is_match(&word.text) {
            continue;
        }
        let gap = label.horizontal_gap(&word.bbox);
        let center = (word.bbox.center_x() - label_center).abs();
        let better = match best {
            None => true,
            Some((g, c, _)) => gap < g || (gap == g && center < c),
        };
        if better {
            best = Some((gap, center, word));
        }
    }

    let (gap, _, winner) = best?;
    debug!(
        "amount '{}' at gap {:.1} from label at x {:.1}..{:.1}",
        winner.text, gap, label.x0, label.x1
    );

    let mut merged = winner.bbox;
    let mut tokens = vec![winner.text.clone()];
    for word in words {
        if std::ptr::eq(word, winner)
            || word.block_id != winner.block_id
            || word.line_id != winner.line_id
        {
            continue;
        }
        let shorter = word.bbox.height().min(merged.height());
        let same_line = merged.vertical_overlap(&word.bbox) > config.merge_overlap_ratio * shorter;
        if !same_line {
            continue;
        }
        if !(amounts.is_match(&word.text) || fragments.is_match(&word.text)) {
            continue;
        }
        let left_gap = merged.x0 - word.bbox.x1;
        let right_gap = word.bbox.x0 - merged.x1;
        let adjacent = (0.0..config.merge_gap).contains(&left_gap)
            || (0.0..config.merge_gap).contains(&right_gap);
        if adjacent {
            merged = merged.union(&word.bbox);
            tokens.push(word.text.clone());
        }
    }

    Some(AmountMatch {
        rect: merged.pad(config.padding),
        value: amounts.normalize(&winner.text),
        tokens,
    })
}
