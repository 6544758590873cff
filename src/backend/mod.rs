//! Document backends.
//!
//! A backend turns a file on disk into [`PatchPage`](crate::page::PatchPage)s,
//! runs the engine over them and writes the result, allowing for different
//! document libraries behind the same service.

pub mod glyphs;
pub mod mupdf_backend;
pub mod overlay;
pub mod unicode_font;

pub use mupdf_backend::MupdfBackend;
pub use overlay::{Overlay, OverlayOp};
pub use unicode_font::UnicodeFont;

use crate::engine::{LabelHit, MarkSummary, PatchEngine, PatchSummary};
use crate::error::{PatchError, PatchResult};
use crate::page::StrokeStyle;
use std::path::Path;

/// A document library able to patch and annotate whole files.
pub trait DocumentBackend: Send + Sync {
    /// Applies the engine's replacements to every page of `input` and
    /// writes the result to `output`.
    fn patch(&self, input: &Path, output: &Path, engine: &PatchEngine) -> PatchResult<PatchSummary>;

    /// Outlines the amount next to each label occurrence.
    fn mark(
        &self,
        input: &Path,
        output: &Path,
        engine: &PatchEngine,
        labels: &[String],
        stroke: StrokeStyle,
    ) -> PatchResult<(MarkSummary, Vec<LabelHit>)>;

    /// Plain text of the document, for verification.
    fn extract_text(&self, input: &Path) -> PatchResult<String> {
        let bytes = std::fs::read(input).map_err(|e| PatchError::Io {
            path: input.to_path_buf(),
            source: e,
        })?;

        pdf_extract::extract_text_from_mem(&bytes).map_err(|e| PatchError::TextExtraction {
            path: input.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Returns a human-readable name for this backend.
    fn name(&self) -> &str;
}

/// Path as UTF-8, as the MuPDF bindings require.
pub(crate) fn utf8_path<'a>(path: &'a Path, parameter: &str) -> PatchResult<&'a str> {
    path.to_str().ok_or_else(|| PatchError::InvalidInput {
        parameter: parameter.to_string(),
        reason: "Path contains invalid UTF-8".to_string(),
    })
}

/// Copies an untouched document to its destination.
pub(crate) fn copy_unchanged(input: &Path, output: &Path) -> PatchResult<()> {
    std::fs::copy(input, output).map_err(|e| PatchError::Io {
        path: output.to_path_buf(),
        source: e,
    })?;
    Ok(())
}
