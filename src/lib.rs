//! Column-preserving PDF text replacement.
//!
//! This library replaces text in existing PDFs without disturbing the
//! layout around it: every occurrence is erased for real (MuPDF
//! redaction, not a white box over live text) and the new text is written
//! at the original font size, right-anchored at the original right edge
//! so tabular amounts stay aligned whatever their new width.
//!
//! # Features
//!
//! - **Style recovery**: font size taken from the text run a hit overlaps most
//! - **Batched erasure**: all occurrences of a replacement are erased in one commit
//!   before any new text is written
//! - **Right-anchored layout**: the replacement grows leftward from the old right edge
//! - **RTL aware**: Hebrew and Arabic replacements are detected and shaped accordingly
//! - **Amount location**: finds the amount printed next to a label, even when it
//!   is split into several tokens
//! - **Bulk runs**: whole directories, skip-and-report per document
//!
//! # Architecture
//!
//! - [`geometry`] and [`metrics`]: rectangles and standard font widths
//! - [`page`]: the page contract and the two-phase erase protocol
//! - [`engine`]: the patch engine and the amount locator
//! - [`domain`]: token classifiers
//! - [`memory`]: an in-memory page model
//! - [`backend`]: the MuPDF backend and the lopdf overlay writer
//! - [`service`] and [`batch`]: file-level entry points
//! - [`error`]: error handling
//!
//! # Quick Start
//!
//! ```no_run
//! use pdfpatch::{PatchConfig, PatchService, Replacement};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = PatchService::with_mupdf();
//! let config = PatchConfig::with_replacements(vec![Replacement::new("4704.32", "2723.00")]);
//!
//! service.patch(Path::new("slip.pdf"), Path::new("slip-edited.pdf"), &config)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Engine without a PDF
//!
//! ```
//! use pdfpatch::memory::MemoryPage;
//! use pdfpatch::{PatchConfig, PatchEngine, PatchPage, Rect, Replacement};
//!
//! let mut page = MemoryPage::new(0)
//!     .with_run("4704.32", Rect::new(412.0, 300.0, 452.0, 312.0), 11.0, "helv", 0, 0);
//! let engine = PatchEngine::new(PatchConfig::with_replacements(vec![
//!     Replacement::new("4704.32", "2723.00"),
//! ]));
//!
//! engine.patch_page(&mut page).unwrap();
//! assert!(page.search_text("4704.32").unwrap().is_empty());
//! assert_eq!(page.search_text("2723.00").unwrap().len(), 1);
//! ```

// Public API
pub mod backend;
pub mod batch;
pub mod domain;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod memory;
pub mod metrics;
pub mod page;
pub mod service;

// Re-exports for convenient access
pub use backend::{DocumentBackend, MupdfBackend};
pub use domain::{AmountMatcher, CurrencyFragmentMatcher, PatternMatcher};
pub use engine::{
    find_amount_near, is_right_to_left, LabelHit, MarkSummary, PageReport, PatchConfig,
    PatchEngine, PatchSummary, ProximityConfig, Replacement,
};
pub use error::{PatchError, PatchResult};
pub use geometry::Rect;
pub use metrics::{StandardMetrics, TextMeasure};
pub use page::{
    Align, Color, CommittedErasures, ErasureBatch, ImageMode, InsertStyle, PatchPage,
    StrokeStyle, TextRun,
};
pub use service::PatchService;
