//! Outcome records for patch and mark runs.

use crate::geometry::Rect;
use serde::Serialize;

/// What one replacement did on one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplacementOutcome {
    pub old: String,
    pub new: String,
    /// Search hits for `old`
    pub occurrences: usize,
    /// Zones the page reported as erased
    pub erased: usize,
    /// Replacement strings written
    pub inserted: usize,
}

/// Per-page results, one entry per replacement that matched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageReport {
    pub page_index: usize,
    pub outcomes: Vec<ReplacementOutcome>,
}

impl PageReport {
    pub fn new(page_index: usize) -> Self {
        Self {
            page_index,
            outcomes: Vec::new(),
        }
    }

    pub fn occurrences(&self) -> usize {
        self.outcomes.iter().map(|o| o.occurrences).sum()
    }

    pub fn insertions(&self) -> usize {
        self.outcomes.iter().map(|o| o.inserted).sum()
    }

    pub fn is_modified(&self) -> bool {
        self.occurrences() > 0
    }
}

/// Statistics about a patched document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatchSummary {
    /// Pages processed
    pub pages_processed: usize,

    /// Pages with at least one occurrence
    pub pages_modified: usize,

    /// Occurrences erased across all replacements
    pub occurrences: usize,

    /// Replacement strings written
    pub insertions: usize,
}

impl PatchSummary {
    /// Creates a summary indicating nothing was patched.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn absorb(&mut self, page: &PageReport) {
        self.pages_processed += 1;
        if page.is_modified() {
            self.pages_modified += 1;
        }
        self.occurrences += page.occurrences();
        self.insertions += page.insertions();
    }

    /// Returns true if any occurrence was patched.
    pub fn has_changes(&self) -> bool {
        self.occurrences > 0
    }
}

/// A located label and what was outlined for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelHit {
    pub page_index: usize,
    pub label: String,
    pub label_rect: Rect,
    /// Box of the amount next to the label, if one qualified.
    pub amount: Option<Rect>,
    /// Canonical amount value, e.g. `4349.00`.
    pub value: Option<String>,
}

impl LabelHit {
    /// The rectangle to outline: the amount, or the label when none was found.
    pub fn target(&self) -> Rect {
        self.amount.unwrap_or(self.label_rect)
    }
}

/// Statistics about a mark run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarkSummary {
    pub pages_processed: usize,
    pub labels_found: usize,
    pub amounts_found: usize,
    /// Labels outlined themselves because no amount qualified
    pub fallbacks: usize,
}

impl MarkSummary {
    pub fn absorb(&mut self, hits: &[LabelHit]) {
        self.pages_processed += 1;
        self.labels_found += hits.len();
        let amounts = hits.iter().filter(|h| h.amount.is_some()).count();
        self.amounts_found += amounts;
        self.fallbacks += hits.len() - amounts;
    }
}
