//! Patch service coordinating backend execution.

use crate::backend::{DocumentBackend, MupdfBackend};
use crate::engine::{LabelHit, MarkSummary, PatchConfig, PatchEngine, PatchSummary};
use crate::error::{PatchError, PatchResult};
use crate::page::StrokeStyle;
use std::path::Path;

/// High-level API for patching and marking documents.
///
/// The service validates inputs before handing them to the backend, so
/// every backend sees an existing input file and a non-empty workload.
pub struct PatchService {
    backend: Box<dyn DocumentBackend>,
}

impl PatchService {
    pub fn new(backend: Box<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    /// Creates a service backed by MuPDF.
    pub fn with_mupdf() -> Self {
        Self::new(Box::new(MupdfBackend::default()))
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    fn ensure_input(input: &Path) -> PatchResult<()> {
        if !input.exists() {
            return Err(PatchError::Io {
                path: input.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Input file does not exist",
                ),
            });
        }
        Ok(())
    }

    /// Applies `config`'s replacements to `input`, writing `output`.
    pub fn patch(
        &self,
        input: &Path,
        output: &Path,
        config: &PatchConfig,
    ) -> PatchResult<PatchSummary> {
        Self::ensure_input(input)?;
        if config.replacements.is_empty() {
            return Err(PatchError::InvalidInput {
                parameter: "replacements".to_string(),
                reason: "No replacements specified".to_string(),
            });
        }
        config.validate()?;

        let engine = PatchEngine::new(config.clone());
        self.backend.patch(input, output, &engine)
    }

    /// Outlines the amount next to each label occurrence in `input`.
    pub fn mark(
        &self,
        input: &Path,
        output: &Path,
        config: &PatchConfig,
        labels: &[String],
        stroke: StrokeStyle,
    ) -> PatchResult<(MarkSummary, Vec<LabelHit>)> {
        Self::ensure_input(input)?;
        if labels.iter().all(|l| l.trim().is_empty()) {
            return Err(PatchError::InvalidInput {
                parameter: "labels".to_string(),
                reason: "No labels specified".to_string(),
            });
        }
        config.validate()?;

        let labels: Vec<String> = labels
            .iter()
            .filter(|l| !l.trim().is_empty())
            .cloned()
            .collect();
        let engine = PatchEngine::new(config.clone());
        self.backend.mark(input, output, &engine, &labels, stroke)
    }

    /// Extracts text from a PDF for verification.
    pub fn extract_text(&self, input: &Path) -> PatchResult<String> {
        Self::ensure_input(input)?;
        self.backend.extract_text(input)
    }
}
